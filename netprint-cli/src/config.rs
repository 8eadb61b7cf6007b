use netprint::{DEFAULT_PORT, DEFAULT_SCAN_CONCURRENCY, SCAN_PROBE_TIMEOUT, SINGLE_CHECK_TIMEOUT};

/// CLI configuration
///
/// # Environment variables
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | NETPRINT_PORT | 9100 | Printer port when the target has none |
/// | NETPRINT_NETWORK | 192.168.1 | Network scanned by default |
/// | NETPRINT_SCAN_CONCURRENCY | 50 | Scan workers |
/// | NETPRINT_SCAN_TIMEOUT_MS | 300 | Per-host scan timeout |
/// | NETPRINT_CHECK_TIMEOUT_MS | 500 | Single-host check timeout |
/// | NETPRINT_PRINT_TIMEOUT_MS | (2000 text / 3000 QR) | Print session timeout |
/// | NETPRINT_LOG_LEVEL | warn | Log level (`RUST_LOG` wins if set) |
/// | NETPRINT_LOG_JSON | false | JSON log lines |
/// | NETPRINT_LOG_DIR | (none) | Directory for daily rolling log files |
///
/// Command-line flags override these values.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub network: String,
    pub scan_concurrency: usize,
    pub scan_timeout_ms: u64,
    pub check_timeout_ms: u64,
    /// Unset means per-job defaults
    pub print_timeout_ms: Option<u64>,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Missing or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            port: env_parse("NETPRINT_PORT").unwrap_or(DEFAULT_PORT),
            network: std::env::var("NETPRINT_NETWORK").unwrap_or_else(|_| "192.168.1".into()),
            scan_concurrency: env_parse("NETPRINT_SCAN_CONCURRENCY")
                .unwrap_or(DEFAULT_SCAN_CONCURRENCY),
            scan_timeout_ms: env_parse("NETPRINT_SCAN_TIMEOUT_MS")
                .unwrap_or(SCAN_PROBE_TIMEOUT.as_millis() as u64),
            check_timeout_ms: env_parse("NETPRINT_CHECK_TIMEOUT_MS")
                .unwrap_or(SINGLE_CHECK_TIMEOUT.as_millis() as u64),
            print_timeout_ms: env_parse("NETPRINT_PRINT_TIMEOUT_MS"),
            log_level: std::env::var("NETPRINT_LOG_LEVEL").unwrap_or_else(|_| "warn".into()),
            log_json: env_parse("NETPRINT_LOG_JSON").unwrap_or(false),
            log_dir: std::env::var("NETPRINT_LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }
}
