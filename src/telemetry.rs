//! Optional local trace logging used for debugging sessions and engine traffic.
//!
//! The operator's terminal is the debugger UI, so nothing here ever writes to
//! stdout/stderr: events go to a JSON-lines trace file when `--logs` is set.

use crate::config::DebuggerConfig;
use std::env;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, OnceLock};
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<()> = OnceLock::new();
static LOG_CONTENT_ENABLED: AtomicBool = AtomicBool::new(false);

pub const TRACE_LOG_ENV: &str = "ESCARGOT_DEBUGGER_TRACE_LOG";

/// Trace file location, overridable through `ESCARGOT_DEBUGGER_TRACE_LOG`.
pub fn log_file_path() -> PathBuf {
    env::var(TRACE_LOG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("escargot_debugger_trace.jsonl"))
}

#[inline]
fn tracing_enabled(config: &DebuggerConfig) -> bool {
    config.logs && !config.no_logs
}

fn install_trace_subscriber(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_timer(UtcTime::rfc_3339())
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(Mutex::new(file))
        .with_current_span(false)
        .with_span_list(false)
        .finish();
    // A subscriber installed earlier keeps priority.
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}

/// Configure logging from CLI flags. Safe to call more than once; only the
/// first enabled call opens the trace file.
pub fn init_logging(config: &DebuggerConfig) {
    let enabled = tracing_enabled(config);
    LOG_CONTENT_ENABLED.store(enabled && config.log_content, Ordering::Relaxed);
    if !enabled {
        return;
    }
    TRACING_INIT.get_or_init(|| {
        // Unwritable trace paths leave logging off; the terminal stays clean.
        let _ = install_trace_subscriber(&log_file_path());
    });
}

/// Diagnostic message with no operator or script content in it.
pub fn log_debug(msg: &str) {
    tracing::debug!(target: "escargot_debugger", "{msg}");
}

/// Messages that may carry script output, expressions, or typed commands.
pub fn log_debug_content(msg: &str) {
    if !LOG_CONTENT_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    log_debug(msg);
}
