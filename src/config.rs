use clap::Parser;

use std::time::Duration;

/// Command line and environment configuration of a ledger node
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pow_ledger",
    version,
    about = "A proof-of-work balance ledger node"
)]
pub struct Config {
    /// Interface the HTTP server binds to
    #[arg(long, env = "LEDGER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port the HTTP server listens on
    #[arg(short, long, env = "LEDGER_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Seconds a mining request may search for a proof before giving up
    #[arg(long, env = "LEDGER_MINING_TIMEOUT_SECS", default_value_t = 60)]
    pub mining_timeout_secs: u64,

    /// Maximum number of pending transfers waiting for the next block
    #[arg(long, env = "LEDGER_MAX_PENDING")]
    pub max_pending: Option<usize>,
}

impl Config {
    pub fn mining_timeout(&self) -> Duration {
        Duration::from_secs(self.mining_timeout_secs)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["pow_ledger"]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.mining_timeout(), Duration::from_secs(60));
        assert_eq!(config.max_pending, None);
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "pow_ledger",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--mining-timeout-secs",
            "5",
            "--max-pending",
            "100",
        ])
        .unwrap();
        assert_eq!(config.bind_address(), ("0.0.0.0".to_string(), 8080));
        assert_eq!(config.mining_timeout(), Duration::from_secs(5));
        assert_eq!(config.max_pending, Some(100));
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["pow_ledger", "--port", "eighty"]).is_err());
    }
}
