// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub probes: ProbesConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 8080;
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: Self::DEFAULT_PORT,
            workers: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    pub error_log_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            access_log: true,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        }
    }
}

/// Performance configuration
///
/// `read_timeout` bounds how long a client may take to send a request head,
/// in seconds (0 disables it). Request and response bodies are never timed.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            read_timeout: 30,
            max_connections: None,
        }
    }
}

/// Optional probe endpoints
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProbesConfig {
    /// Serve `/healthz`
    pub healthz: bool,
    /// Serve `/healthz-fail`
    pub healthz_fail: bool,
    /// Uptime in seconds after which `/healthz-fail` starts failing
    pub fail_after_secs: f64,
    /// Serve `/exit/{code}`
    pub exit: bool,
}

impl Default for ProbesConfig {
    fn default() -> Self {
        Self {
            healthz: true,
            healthz_fail: true,
            fail_after_secs: 10.0,
            exit: true,
        }
    }
}
