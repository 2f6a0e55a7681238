// Configuration module entry point
// Loads the server configuration and builds the shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

pub use state::AppState;
pub use types::{Config, LoggingConfig, PerformanceConfig, ProbesConfig, ServerConfig};

use crate::diag::FailureSimulation;
use crate::logger;

impl Config {
    /// Load configuration from the given file path (extension optional)
    ///
    /// A missing file is not an error. `DIAG_`-prefixed environment
    /// variables override the file (`DIAG_LOGGING__LEVEL=debug`), and a
    /// valid `PORT` overrides everything.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut cfg = Self::build(config_path)?;
        cfg.apply_port_override(std::env::var("PORT").ok().as_deref());
        Ok(cfg)
    }

    fn build(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("DIAG")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Use `raw` as the listening port if it is a non-zero port number
    pub fn apply_port_override(&mut self, raw: Option<&str>) {
        let Some(raw) = raw else { return };
        match raw.trim().parse::<u16>() {
            Ok(port) if port != 0 => self.server.port = port,
            _ => logger::log_debug(&format!(
                "Ignoring PORT={raw:?}, keeping port {}",
                self.server.port
            )),
        }
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// Failure probe threshold; invalid values fall back to the default
    pub fn failure_simulation(&self) -> FailureSimulation {
        match Duration::try_from_secs_f64(self.probes.fail_after_secs) {
            Ok(threshold) => FailureSimulation::new(threshold),
            Err(e) => {
                logger::log_warning(&format!(
                    "Invalid probes.fail_after_secs {}: {e}, using {}s",
                    self.probes.fail_after_secs,
                    FailureSimulation::DEFAULT_THRESHOLD.as_secs()
                ));
                FailureSimulation::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert!(cfg.probes.healthz && cfg.probes.healthz_fail && cfg.probes.exit);
        assert_eq!(
            cfg.failure_simulation().threshold(),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn test_port_override() {
        let mut cfg = Config::default();
        cfg.apply_port_override(Some("9000"));
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn test_invalid_port_override_keeps_port() {
        for raw in ["", "abc", "0", "70000", "-1", "80.5"] {
            let mut cfg = Config::default();
            cfg.apply_port_override(Some(raw));
            assert_eq!(cfg.server.port, 8080, "PORT={raw:?}");
        }

        let mut cfg = Config::default();
        cfg.apply_port_override(None);
        assert_eq!(cfg.server.port, 8080);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = Config::build("/nonexistent/diag-server-config").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.logging.access_log_format, "combined");
    }

    #[test]
    fn test_load_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diag.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9090\nworkers = 2\n\n[probes]\nexit = false\nfail_after_secs = 2.5"
        )
        .unwrap();

        let cfg = Config::build(path.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.workers, Some(2));
        assert!(!cfg.probes.exit);
        assert!(cfg.probes.healthz);
        assert_eq!(
            cfg.failure_simulation().threshold(),
            Duration::from_millis(2500)
        );
    }

    #[test]
    fn test_invalid_threshold_falls_back() {
        let mut cfg = Config::default();
        cfg.probes.fail_after_secs = -1.0;
        assert_eq!(
            cfg.failure_simulation().threshold(),
            FailureSimulation::DEFAULT_THRESHOLD
        );
        cfg.probes.fail_after_secs = f64::NAN;
        assert_eq!(
            cfg.failure_simulation().threshold(),
            FailureSimulation::DEFAULT_THRESHOLD
        );
    }

    #[test]
    fn test_socket_addr() {
        let mut cfg = Config::default();
        cfg.server.host = "127.0.0.1".to_string();
        assert_eq!(
            cfg.get_socket_addr().unwrap(),
            "127.0.0.1:8080".parse().unwrap()
        );
        cfg.server.host = "not a host".to_string();
        assert!(cfg.get_socket_addr().is_err());
    }
}
