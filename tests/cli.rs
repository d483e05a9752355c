//! Integration tests that lock binary startup and connection-failure behavior.

use std::net::TcpListener;
use std::process::{Command, Stdio};

fn closed_port_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let address = listener.local_addr().expect("local addr").to_string();
    drop(listener);
    address
}

#[test]
fn help_lists_connection_flags() {
    let bin = env!("CARGO_BIN_EXE_escargot-debugger");
    let output = Command::new(bin)
        .arg("--help")
        .output()
        .expect("run escargot-debugger");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--address"));
    assert!(stdout.contains("--non-interactive"));
    assert!(stdout.contains("--display"));
}

#[test]
fn rejects_exception_values_other_than_zero_or_one() {
    let bin = env!("CARGO_BIN_EXE_escargot-debugger");
    let output = Command::new(bin)
        .args(["--exception", "2"])
        .output()
        .expect("run escargot-debugger");
    assert!(!output.status.success());
}

#[test]
fn refused_connection_reports_failure_and_exits_nonzero() {
    let bin = env!("CARGO_BIN_EXE_escargot-debugger");
    let address = closed_port_address();
    let output = Command::new(bin)
        .args(["--address", &address, "--no-logs"])
        .stdin(Stdio::null())
        .output()
        .expect("run escargot-debugger");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains(&format!("Connecting to: {address}")));
    assert!(stderr.contains("Failed to connect to the Escargot debugger."));
}
