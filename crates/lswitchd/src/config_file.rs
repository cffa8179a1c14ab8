//! Configuration file support for lswitchd
//!
//! Loads and validates lswitchd configuration from TOML files.
//! Default location: /etc/lswitch/lswitchd.conf

use crate::diagnostics::DiagnosticsConfig;
use crate::error::{LswitchError, Result};
use lswitch_fdb::AgingConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/lswitch/lswitchd.conf";

/// Complete lswitchd configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LswitchConfig {
    /// FDB aging
    #[serde(default)]
    pub aging: AgingConfig,

    /// Packet dumps
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

impl LswitchConfig {
    /// Load configuration from file, falling back to defaults if file not found
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content).map_err(|e| {
                LswitchError::Configuration(format!(
                    "Failed to parse config file {}: {}",
                    path.display(),
                    e
                ))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(LswitchError::Io(e)),
        }
    }

    /// Load from default location or defaults
    pub fn load() -> Result<Self> {
        Self::load_or_default(DEFAULT_CONFIG_PATH)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            LswitchError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.aging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = LswitchConfig::default();
        assert_eq!(config.aging.sweep_interval(), Duration::from_secs(5));
        assert_eq!(config.aging.ttl_secs, 300);
        assert!(config.diagnostics.enabled);
        assert_eq!(config.diagnostics.watch_addresses.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_toml_deserialization_with_partial_sections() {
        let toml_str = r#"
[aging]
ttl_secs = 120

[diagnostics]
watch_addresses = ["10.0.0.1"]
"#;
        let config = LswitchConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.aging.ttl_secs, 120);
        // Unspecified values should use defaults
        assert_eq!(config.aging.sweep_interval_secs, 5);
        assert!(config.diagnostics.enabled);
        assert_eq!(
            config.diagnostics.watch_addresses,
            vec![Ipv4Addr::new(10, 0, 0, 1)]
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = LswitchConfig::from_toml("").unwrap();
        assert_eq!(config, LswitchConfig::default());
    }

    #[test]
    fn test_validate_rejects_short_ttl() {
        let mut config = LswitchConfig::default();
        config.aging.ttl_secs = 5;
        assert!(matches!(config.validate(), Err(LswitchError::Aging(_))));
    }

    #[test]
    fn test_load_nonexistent_file_defaults() {
        let config = LswitchConfig::load_or_default("/nonexistent/lswitchd.conf").unwrap();
        assert_eq!(config, LswitchConfig::default());
    }

    #[test]
    fn test_load_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lswitchd.conf");
        fs::write(&path, "[aging\nttl_secs = ").unwrap();

        let err = LswitchConfig::load_or_default(&path).unwrap_err();
        assert!(matches!(err, LswitchError::Configuration(_)));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lswitchd.conf");

        let mut config = LswitchConfig::default();
        config.aging.ttl_secs = 600;
        config.diagnostics.enabled = false;
        config.save(&path).unwrap();

        let loaded = LswitchConfig::load_or_default(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
