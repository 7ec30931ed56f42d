//! Configuration loading and constants.
//!
//! Loads application configuration from a TOML file, applies environment
//! overrides, and defines the fixed constants of the health policy, the stress
//! endpoint and the response envelope. `AppConfig` is the root configuration
//! struct containing all settings.

use const_format::formatcp;
use serde::Deserialize;
use std::path::Path;

// =============================================================================
// Health Policy
// =============================================================================

/// Any metric at or above this percentage marks the instance unhealthy
pub const HEALTH_THRESHOLD_PERCENT: f64 = 90.0;

// =============================================================================
// Stress Endpoint
// =============================================================================

/// Hard ceiling for a single stress run, regardless of the requested value
pub const MAX_STRESS_SECONDS: u64 = 60;

/// Grace period for draining connections on shutdown. Covers a full stress run.
pub const SHUTDOWN_GRACE_SECS: u64 = MAX_STRESS_SECONDS + 5;

// =============================================================================
// Response Headers and Messages
// =============================================================================

/// `Server` response header value
pub const SERVER_HEADER: &str = "ViewPost Test App";

/// Greeting returned by the root route
pub const WELCOME_MESSAGE: &str = "Welcome to ViewPost Test Application";

/// Message returned by the synthetic error route
pub const SIMULATED_ERROR_MESSAGE: &str = "Test error endpoint";

// =============================================================================
// Default Paths and Strings
// =============================================================================

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Default listen host (all interfaces)
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_HTTP_PORT: u16 = 5000;

/// Default listen address
pub const DEFAULT_LISTEN_ADDR: &str = formatcp!("{}:{}", DEFAULT_HTTP_HOST, DEFAULT_HTTP_PORT);

/// Extra `--help` text describing where the server listens
pub const LISTEN_HELP: &str = formatcp!(
    "Listens on {} unless the [http] section of the config file says otherwise.",
    DEFAULT_LISTEN_ADDR
);

/// Default CPU sampling window in milliseconds
pub const DEFAULT_CPU_SAMPLE_MS: u64 = 1000;

/// Default path whose filesystem usage is reported as disk usage
pub const DEFAULT_DISK_MOUNT: &str = "/";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "viewpost=info,tower_http=info";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Secret key used when none is configured. Only acceptable in testing.
pub const DEFAULT_SECRET_KEY: &str = "dev";

/// Environment variable overriding `app.secret_key`
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";

/// Environment variable overriding `logging.file`
pub const ENV_LOG_FILE: &str = "VIEWPOST_LOG_FILE";

/// Environment variable overriding `app.testing`
pub const ENV_TESTING: &str = "VIEWPOST_TESTING";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub http: HttpServerConfig,
    /// Metric sampling settings
    #[serde(default)]
    pub metrics: MetricsConfig,
    /// Health evaluation settings
    #[serde(default)]
    pub health: HealthConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Bootstrap settings (secret key, testing mode)
    #[serde(default)]
    pub app: BootstrapConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "HttpServerConfig::default_host")]
    pub host: String,
    #[serde(default = "HttpServerConfig::default_port")]
    pub port: u16,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

impl HttpServerConfig {
    fn default_host() -> String {
        DEFAULT_HTTP_HOST.to_string()
    }

    fn default_port() -> u16 {
        DEFAULT_HTTP_PORT
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// CPU sampling window in milliseconds. 0 uses the shortest window sysinfo can measure.
    #[serde(default = "MetricsConfig::default_cpu_sample_ms")]
    pub cpu_sample_ms: u64,
    /// Path whose filesystem usage is reported as disk usage
    #[serde(default = "MetricsConfig::default_disk_mount")]
    pub disk_mount: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            cpu_sample_ms: Self::default_cpu_sample_ms(),
            disk_mount: Self::default_disk_mount(),
        }
    }
}

impl MetricsConfig {
    fn default_cpu_sample_ms() -> u64 {
        DEFAULT_CPU_SAMPLE_MS
    }

    fn default_disk_mount() -> String {
        DEFAULT_DISK_MOUNT.to_string()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    /// Include disk usage in the health verdict (default: true)
    #[serde(default = "HealthConfig::default_check_disk")]
    pub check_disk: bool,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_disk: Self::default_check_disk(),
        }
    }
}

impl HealthConfig {
    fn default_check_disk() -> bool {
        true
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    #[serde(default = "LoggingConfig::default_format")]
    pub format: String,
    /// Optional log file, written in addition to stdout
    #[serde(default)]
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    fn default_format() -> String {
        DEFAULT_LOG_FORMAT.to_string()
    }
}

/// Settings consumed only during process bootstrap
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "BootstrapConfig::default_secret_key")]
    pub secret_key: String,
    /// Testing mode: no log file, no secret key warning
    #[serde(default)]
    pub testing: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            secret_key: Self::default_secret_key(),
            testing: false,
        }
    }
}

impl BootstrapConfig {
    fn default_secret_key() -> String {
        DEFAULT_SECRET_KEY.to_string()
    }

    /// True when the secret key was never changed from the built-in default
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

impl AppConfig {
    /// Load configuration from a TOML file and apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load from `path`, falling back to defaults when the default path is absent.
    ///
    /// A missing file is only tolerated for [`DEFAULT_CONFIG_PATH`]; an explicitly
    /// requested file that does not exist is an error.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
            let mut config = Self::default();
            config.apply_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            return Ok(config);
        }
        Self::load(path)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply environment-style overrides using the given lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(secret) = lookup(ENV_SECRET_KEY).filter(|s| !s.is_empty()) {
            self.app.secret_key = secret;
        }
        if let Some(file) = lookup(ENV_LOG_FILE) {
            self.logging.file = if file.is_empty() { None } else { Some(file) };
        }
        if let Some(testing) = lookup(ENV_TESTING) {
            self.app.testing = matches!(testing.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(ConfigError::Validation(
                "http.port must be non-zero".to_string(),
            ));
        }
        if self.metrics.disk_mount.trim().is_empty() {
            return Err(ConfigError::Validation(
                "metrics.disk_mount must not be empty".to_string(),
            ));
        }
        match self.logging.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(ConfigError::Validation(format!(
                "logging.format must be \"text\" or \"json\", got \"{}\"",
                other
            ))),
        }
    }

    /// Log file to write to, if any. Testing mode never writes a log file.
    pub fn log_file(&self) -> Option<&str> {
        if self.app.testing {
            None
        } else {
            self.logging.file.as_deref()
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Configuration error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.http.host, "0.0.0.0");
        assert_eq!(config.http.port, 5000);
        assert_eq!(config.metrics.cpu_sample_ms, 1000);
        assert_eq!(config.metrics.disk_mount, "/");
        assert!(config.health.check_disk);
        assert_eq!(config.logging.format, "text");
        assert!(config.logging.file.is_none());
        assert_eq!(config.app.secret_key, "dev");
        assert!(!config.app.testing);
    }

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml(
            r#"
            [http]
            host = "127.0.0.1"
            port = 80

            [metrics]
            cpu_sample_ms = 0
            disk_mount = "/data"

            [health]
            check_disk = false

            [logging]
            format = "json"
            file = "/var/log/viewpost/application.log"

            [app]
            secret_key = "s3cret"
            testing = true
            "#,
        )
        .unwrap();

        assert_eq!(config.http.port, 80);
        assert_eq!(config.metrics.cpu_sample_ms, 0);
        assert_eq!(config.metrics.disk_mount, "/data");
        assert!(!config.health.check_disk);
        assert_eq!(config.logging.format, "json");
        assert_eq!(
            config.logging.file.as_deref(),
            Some("/var/log/viewpost/application.log")
        );
        assert!(!config.app.uses_default_secret());
        assert!(config.app.testing);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = AppConfig::from_toml("[http\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config.apply_overrides(env(&[
            ("SECRET_KEY", "from-env"),
            ("VIEWPOST_LOG_FILE", "/tmp/viewpost.log"),
            ("VIEWPOST_TESTING", "true"),
        ]));
        assert_eq!(config.app.secret_key, "from-env");
        assert_eq!(config.logging.file.as_deref(), Some("/tmp/viewpost.log"));
        assert!(config.app.testing);
    }

    #[test]
    fn test_empty_log_file_override_disables_file() {
        let mut config = AppConfig::default();
        config.logging.file = Some("/var/log/viewpost/application.log".to_string());
        config.apply_overrides(env(&[("VIEWPOST_LOG_FILE", "")]));
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_testing_mode_suppresses_log_file() {
        let mut config = AppConfig::default();
        config.logging.file = Some("/var/log/viewpost/application.log".to_string());
        assert!(config.log_file().is_some());
        config.app.testing = true;
        assert!(config.log_file().is_none());
    }

    #[test]
    fn test_validation_rejects_zero_port() {
        let config = AppConfig::from_toml("[http]\nport = 0").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_validation_rejects_unknown_log_format() {
        let config = AppConfig::from_toml("[logging]\nformat = \"xml\"").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[http]\nport = 8080\n[health]\ncheck_disk = false").unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.http.port, 8080);
        assert!(!config.health.check_disk);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = AppConfig::load_or_default(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_default_listen_addr() {
        assert_eq!(DEFAULT_LISTEN_ADDR, "0.0.0.0:5000");
    }
}
