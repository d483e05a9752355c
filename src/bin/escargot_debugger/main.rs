//! escargot-debugger entrypoint: connect to the engine, then hand the terminal
//! to the session driver until the operator or the engine ends the session.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io;
use std::path::Path;
use std::process;

use escargot_debugger::config::DebuggerConfig;
use escargot_debugger::engine::{DebugEngine, WsEngine};
use escargot_debugger::exit::{session_report, transport_report, ExitReport};
use escargot_debugger::session::{SessionDriver, SessionState, StdinLines, TerminalKeys};
use escargot_debugger::terminal_restore::install_terminal_panic_hook;
use escargot_debugger::{init_logging, log_debug, log_file_path};

fn main() -> Result<()> {
    let config = DebuggerConfig::parse();
    init_logging(&config);
    install_terminal_panic_hook();
    if config.logs && !config.no_logs {
        log_debug(&format!("trace log at {}", log_file_path().display()));
    }

    let address = config.resolved_address();
    println!("Connecting to: {address}");
    let mut engine = match WsEngine::connect(&address) {
        Ok(engine) => engine,
        Err(err) => {
            log_debug(&format!("connect to {address} failed: {err}"));
            finish(&transport_report(&err));
        }
    };
    println!("Connection created!!!");

    for path in &config.client_source {
        let (name, source) = read_client_source(path)?;
        if let Err(err) = engine.send_client_source(&name, &source) {
            finish(&transport_report(&err));
        }
    }

    if let Some(enabled) = config.exception_stop() {
        match engine.set_exception_stop(enabled) {
            Ok(reply) => print!("{reply}"),
            Err(err) => finish(&transport_report(&err)),
        }
    }

    let mut driver = SessionDriver::new(
        engine,
        StdinLines,
        TerminalKeys,
        io::stdout(),
        SessionState::from_config(&config),
        config.step_delay(),
    );
    let end = driver.run().context("operator terminal failed")?;
    finish(&session_report(&end));
}

fn read_client_source(path: &Path) -> Result<(String, String)> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read client source {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, source))
}

fn finish(report: &ExitReport) -> ! {
    if !report.is_success() {
        log_debug(&format!("exiting with status {}", report.code));
    }
    eprintln!("{}", report.message);
    process::exit(report.code);
}
