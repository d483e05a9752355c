//! CLI flag schema so debugger startup behavior is explicit and discoverable.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ADDRESS: &str = "localhost:6501";
pub const DEFAULT_PORT: u16 = 6501;
pub const DEFAULT_STEP_DELAY_MS: u64 = 100;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "escargot-debugger",
    about = "Interactive front end for the Escargot remote debugger",
    version
)]
pub struct DebuggerConfig {
    /// Engine debugger address (`host:port`, port defaults to 6501)
    #[arg(long = "address", env = "ESCARGOT_DEBUGGER_ADDRESS", default_value = DEFAULT_ADDRESS)]
    pub address: String,

    /// Echo every command before running it and skip interactive hints
    #[arg(long = "non-interactive", default_value_t = false)]
    pub non_interactive: bool,

    /// Source lines to show when the engine stops (0 = off)
    #[arg(long = "display", default_value_t = 0)]
    pub display: u32,

    /// Stop when an exception is thrown (1) or not (0)
    #[arg(long = "exception", value_parser = clap::value_parser!(u8).range(0..=1))]
    pub exception: Option<u8>,

    /// Script files uploaded to the engine before the session starts
    #[arg(long = "client-source", num_args = 1..)]
    pub client_source: Vec<PathBuf>,

    /// Pause between a repeated step request and the first poll (ms)
    #[arg(long = "step-delay-ms", default_value_t = DEFAULT_STEP_DELAY_MS)]
    pub step_delay_ms: u64,

    /// Write a JSON trace log (see ESCARGOT_DEBUGGER_TRACE_LOG)
    #[arg(long = "logs", default_value_t = false)]
    pub logs: bool,

    /// Disable all logging, overriding --logs
    #[arg(long = "no-logs", default_value_t = false)]
    pub no_logs: bool,

    /// Include commands, expressions and script output in the trace log
    #[arg(long = "log-content", default_value_t = false)]
    pub log_content: bool,
}

impl DebuggerConfig {
    /// Address with the default debugger port appended when none was given.
    #[must_use]
    pub fn resolved_address(&self) -> String {
        let address = self.address.trim();
        if has_port(address) {
            address.to_string()
        } else if is_bare_ipv6(address) {
            format!("[{address}]:{DEFAULT_PORT}")
        } else {
            format!("{address}:{DEFAULT_PORT}")
        }
    }

    #[must_use]
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    #[must_use]
    pub fn exception_stop(&self) -> Option<bool> {
        self.exception.map(|value| value == 1)
    }
}

fn has_port(address: &str) -> bool {
    // `[::1]:6501` style or plain `host:port`; a bare IPv6 literal has no port.
    if let Some(rest) = address.strip_prefix('[') {
        return rest.contains("]:");
    }
    matches!(address.split(':').count(), 2)
}

fn is_bare_ipv6(address: &str) -> bool {
    address.parse::<std::net::Ipv6Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_documented_values() {
        let config = DebuggerConfig::parse_from(["escargot-debugger"]);
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert!(!config.non_interactive);
        assert_eq!(config.display, 0);
        assert_eq!(config.exception_stop(), None);
        assert!(config.client_source.is_empty());
        assert_eq!(config.step_delay(), Duration::from_millis(100));
    }

    #[rstest]
    #[case("localhost", "localhost:6501")]
    #[case("localhost:7000", "localhost:7000")]
    #[case("10.0.0.2", "10.0.0.2:6501")]
    #[case("[::1]", "[::1]:6501")]
    #[case("[::1]:7000", "[::1]:7000")]
    #[case("::1", "[::1]:6501")]
    #[case("fe80::2", "[fe80::2]:6501")]
    fn resolved_address_appends_default_port(#[case] input: &str, #[case] expected: &str) {
        let config = DebuggerConfig::parse_from(["escargot-debugger", "--address", input]);
        assert_eq!(config.resolved_address(), expected);
    }

    #[test]
    fn exception_flag_accepts_only_zero_or_one() {
        let on = DebuggerConfig::parse_from(["escargot-debugger", "--exception", "1"]);
        assert_eq!(on.exception_stop(), Some(true));
        let off = DebuggerConfig::parse_from(["escargot-debugger", "--exception", "0"]);
        assert_eq!(off.exception_stop(), Some(false));
        assert!(DebuggerConfig::try_parse_from(["escargot-debugger", "--exception", "2"]).is_err());
    }

    #[test]
    fn display_rejects_negative_values() {
        assert!(DebuggerConfig::try_parse_from(["escargot-debugger", "--display", "-1"]).is_err());
        let config = DebuggerConfig::parse_from(["escargot-debugger", "--display", "9"]);
        assert_eq!(config.display, 9);
    }
}
