//! Shared escargot-debugger library exports: engine transport, session logic,
//! and the CLI/logging plumbing the binary wires together.

pub mod config;
pub mod engine;
pub mod exit;
pub mod session;
mod telemetry;
pub mod terminal_restore;

pub use telemetry::{init_logging, log_debug, log_debug_content, log_file_path, TRACE_LOG_ENV};
