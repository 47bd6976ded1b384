use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the remote ledger service.
    pub api_base_url: String,
    /// Identifier tagged onto every push so the remote can scope records.
    pub client_id: String,
    pub sync_interval_secs: u64,
    /// When set, every reconciliation first resets all records to pending —
    /// a repair mode for suspected local/remote drift.
    pub force_resync: bool,
    /// Optional TOML file overriding the built-in category keyword table.
    pub rules_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000".to_string(),
            client_id: "local-device".to_string(),
            sync_interval_secs: 900,
            force_resync: false,
            rules_path: None,
        }
    }
}

impl AppConfig {
    /// Read the config file, falling back to defaults when it does not exist.
    /// A present-but-malformed file is an error, not a silent default.
    pub fn load(path: &Path) -> anyhow::Result<AppConfig> {
        if !path.exists() {
            return Ok(AppConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.client_id, "local-device");
        assert_eq!(config.sync_interval_secs, 900);
        assert!(!config.force_resync);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "client_id = \"pixel-7\"\nforce_resync = true\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.client_id, "pixel-7");
        assert!(config.force_resync);
        assert_eq!(config.api_base_url, "http://localhost:3000");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "client_id = [not toml").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
