//! Runtime configuration.
//!
//! Stored as TOML in `~/.shitposter/config.toml`. A missing file means
//! defaults; every table and key is optional.
//!
//! ```toml
//! protocol = "v2-directional"
//! suite = "aes-256-gcm"
//!
//! [scanner]
//! min_candidate_len = 12
//! sparse_floor = 16
//!
//! [stealth]
//! connector_probability = 0.3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::crypto::cipher::CipherSuite;
use crate::crypto::session::ProtocolVersion;
use crate::text::scanner::ScannerConfig;
use crate::text::stealth::{
    StealthError, TemplateCatalog, DEFAULT_CONNECTORS, DEFAULT_CONNECTOR_PROBABILITY,
    DEFAULT_TEMPLATES,
};
use crate::text::vocabulary::Vocabulary;

/// Name of the per-user config directory under `$HOME`.
pub const CONFIG_DIR_NAME: &str = ".shitposter";

/// Config file name inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors that can occur when loading or saving configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found. Unable to determine home directory.")]
    NoConfigDir,

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),

    #[error("Stealth catalog error: {0}")]
    Stealth(#[from] StealthError),
}

/// Prose wrapper settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthConfig {
    /// Chance of prefixing each sentence with a connector phrase.
    pub connector_probability: f64,

    /// Replaces the built-in templates when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub templates: Option<Vec<String>>,

    /// Replaces the built-in connector phrases when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectors: Option<Vec<String>>,
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            connector_probability: DEFAULT_CONNECTOR_PROBABILITY,
            templates: None,
            connectors: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CipherConfig {
    /// Session derivation scheme.
    pub protocol: ProtocolVersion,

    /// Payload AEAD.
    pub suite: CipherSuite,

    pub scanner: ScannerConfig,

    pub stealth: StealthConfig,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            protocol: ProtocolVersion::V2Directional,
            suite: CipherSuite::default(),
            scanner: ScannerConfig::default(),
            stealth: StealthConfig::default(),
        }
    }
}

impl CipherConfig {
    /// Loads from the default location, falling back to defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads from `path`, falling back to defaults if the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: CipherConfig = toml::from_str(&content)?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Whether the file at `path` selects a protocol itself.
    ///
    /// Defaults fill in a missing `protocol` key, so callers that must not
    /// pick a derivation scheme silently check this first.
    pub fn declares_protocol(path: &Path) -> Result<bool, ConfigError> {
        if !path.exists() {
            return Ok(false);
        }
        let table: toml::Table = toml::from_str(&fs::read_to_string(path)?)?;
        Ok(table.contains_key("protocol"))
    }

    /// Writes to `path` with owner-only permissions, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Path to the default config file.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.stealth.connector_probability;
        if !(0.0..=1.0).contains(&p) {
            return Err(ConfigError::Invalid(format!(
                "stealth.connector_probability must be within [0, 1], got {}",
                p
            )));
        }
        if self.scanner.min_candidate_len == 0 {
            return Err(ConfigError::Invalid(
                "scanner.min_candidate_len must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Builds the template catalog, checking every filler word against `vocab`.
    pub fn build_catalog(&self, vocab: &Vocabulary) -> Result<TemplateCatalog, ConfigError> {
        let templates: Vec<String> = match &self.stealth.templates {
            Some(t) => t.clone(),
            None => DEFAULT_TEMPLATES.iter().map(|s| s.to_string()).collect(),
        };
        let connectors: Vec<String> = match &self.stealth.connectors {
            Some(c) => c.clone(),
            None => DEFAULT_CONNECTORS.iter().map(|s| s.to_string()).collect(),
        };
        Ok(TemplateCatalog::new(
            templates.as_slice(),
            connectors.as_slice(),
            vocab,
        )?)
    }
}

/// Get the config directory (`~/.shitposter`).
pub fn get_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(CONFIG_DIR_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CipherConfig::default();
        assert_eq!(config.protocol, ProtocolVersion::V2Directional);
        assert_eq!(config.suite, CipherSuite::Aes256Gcm);
        assert_eq!(config.scanner.min_candidate_len, 12);
        assert_eq!(config.scanner.sparse_floor, 16);
        assert_eq!(config.stealth.connector_probability, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CipherConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CipherConfig::default());
    }

    #[test]
    fn test_partial_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            "suite = \"chacha20-poly1305\"\n\n[scanner]\nsparse_floor = 20\n",
        )
        .unwrap();

        let config = CipherConfig::load_from(&path).unwrap();
        assert_eq!(config.suite, CipherSuite::ChaCha20Poly1305);
        assert_eq!(config.scanner.sparse_floor, 20);
        assert_eq!(config.scanner.min_candidate_len, 12);
        assert_eq!(config.protocol, ProtocolVersion::V2Directional);
    }

    #[test]
    fn test_declares_protocol() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert!(!CipherConfig::declares_protocol(&path).unwrap());

        fs::write(&path, "suite = \"aes-256-gcm\"\n").unwrap();
        assert!(!CipherConfig::declares_protocol(&path).unwrap());

        fs::write(&path, "protocol = \"v1-shared\"\n").unwrap();
        assert!(CipherConfig::declares_protocol(&path).unwrap());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);

        let mut config = CipherConfig::default();
        config.protocol = ProtocolVersion::V1Shared;
        config.stealth.connector_probability = 0.0;
        config.save_to(&path).unwrap();

        assert_eq!(CipherConfig::load_from(&path).unwrap(), config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        fs::write(&path, "[stealth]\nconnector_probability = 1.5\n").unwrap();
        assert!(matches!(
            CipherConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, "[scanner]\nmin_candidate_len = 0\n").unwrap();
        assert!(matches!(
            CipherConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));

        fs::write(&path, "protocol = \"v9\"\n").unwrap();
        assert!(matches!(
            CipherConfig::load_from(&path),
            Err(ConfigError::TomlParseError(_))
        ));
    }

    #[test]
    fn test_custom_template_collision_is_fatal() {
        let vocab = Vocabulary::standard();
        let mut config = CipherConfig::default();
        config.stealth.templates = Some(vec!["The {} pipeline is slow.".to_string()]);

        assert!(matches!(
            config.build_catalog(&vocab),
            Err(ConfigError::Stealth(StealthError::VocabularyCollision { .. }))
        ));

        config.stealth.templates = Some(vec!["The {} is slow.".to_string()]);
        let catalog = config.build_catalog(&vocab).unwrap();
        assert_eq!(catalog.templates().len(), 1);
    }

    #[test]
    fn test_custom_template_fused_slot_is_fatal() {
        let vocab = Vocabulary::standard();
        let mut config = CipherConfig::default();

        config.stealth.templates = Some(vec!["The {}s are slow.".to_string()]);
        assert!(matches!(
            config.build_catalog(&vocab),
            Err(ConfigError::Stealth(StealthError::FusedSlot(_)))
        ));

        config.stealth.templates = Some(vec!["{}{}".to_string(), "The {} is slow.".to_string()]);
        assert!(matches!(
            config.build_catalog(&vocab),
            Err(ConfigError::Stealth(StealthError::FusedSlot(_)))
        ));
    }
}
