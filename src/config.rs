// Tue Jan 13 2026 - Alex

use crate::memory::{Address, DEFAULT_SECTION_NAMES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Load address reported for raw metadata dumps.
    pub base_address: Option<Address>,
    /// Metadata section names tried in order when loading an executable; the
    /// first one present wins.
    pub section_names: Vec<String>,
    /// Resolve batches of names through a prebuilt index instead of one scan
    /// per name.
    pub use_index: bool,
    /// Hex digits used when printing addresses.
    pub address_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_address: None,
            section_names: DEFAULT_SECTION_NAMES.iter().map(|s| s.to_string()).collect(),
            use_index: false,
            address_width: 16,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate().map_err(ConfigError::Invalid)?;
        log::debug!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn with_base_address(mut self, base: Address) -> Self {
        self.base_address = Some(base);
        self
    }

    pub fn with_section_names(mut self, names: Vec<String>) -> Self {
        self.section_names = names;
        self
    }

    pub fn with_index(mut self, use_index: bool) -> Self {
        self.use_index = use_index;
        self
    }

    pub fn with_address_width(mut self, width: usize) -> Self {
        self.address_width = width;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.section_names.is_empty() {
            return Err("section_names must name at least one section".to_string());
        }
        if self.section_names.iter().any(|name| name.is_empty()) {
            return Err("section_names must not contain empty names".to_string());
        }
        if self.address_width == 0 || self.address_width > 16 {
            return Err("address_width must be between 1 and 16".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.section_names, vec![".gopclntab", "__gopclntab"]);
        assert!(!config.use_index);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(Config::new().with_section_names(Vec::new()).validate().is_err());
        assert!(Config::new().with_section_names(vec![String::new()]).validate().is_err());
        assert!(Config::new().with_address_width(0).validate().is_err());
        assert!(Config::new().with_address_width(17).validate().is_err());
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"base_address": 4194304, "use_index": true}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.base_address, Some(Address::new(0x40_0000)));
        assert!(config.use_index);
        assert_eq!(config.address_width, 16);
        assert_eq!(config.section_names.len(), 2);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"section_names": []}}"#).unwrap();
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));

        let mut broken = NamedTempFile::new().unwrap();
        write!(broken, "not json").unwrap();
        assert!(matches!(Config::load(broken.path()), Err(ConfigError::Parse(_))));
    }
}
