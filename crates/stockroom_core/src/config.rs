//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Describe database, logging, and SKU layout settings.
//! - Load them from a JSON file with every field defaulted.
//!
//! # Invariants
//! - A config only yields a `SkuFormat` after layout validation.

use crate::logging::default_log_level;
use crate::sku::format::{DEFAULT_SKU_PREFIX, DEFAULT_SKU_WIDTH};
use crate::sku::{OverflowPolicy, SkuFormat, SkuFormatError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DB_FILE_NAME: &str = "stockroom.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(SkuFormatError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(err) => write!(f, "invalid sku config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(err) => Some(err),
        }
    }
}

/// SKU layout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkuConfig {
    pub prefix: String,
    pub width: usize,
    pub overflow: OverflowPolicy,
}

impl Default for SkuConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_SKU_PREFIX.to_string(),
            width: DEFAULT_SKU_WIDTH,
            overflow: OverflowPolicy::default(),
        }
    }
}

impl SkuConfig {
    pub fn to_format(&self) -> Result<SkuFormat, ConfigError> {
        SkuFormat::new(self.prefix.clone(), self.width, self.overflow).map_err(ConfigError::Invalid)
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockroomConfig {
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files. Logging stays off when unset.
    pub log_dir: Option<String>,
    pub sku: SkuConfig,
}

impl StockroomConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME))
    }

    pub fn resolved_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SkuConfig, StockroomConfig};
    use crate::sku::{OverflowPolicy, SkuFormatError};

    #[test]
    fn empty_document_uses_defaults() {
        let config = StockroomConfig::from_json_str("{}").unwrap();
        assert_eq!(config, StockroomConfig::default());
        assert_eq!(config.sku.prefix, "PC-");
        assert_eq!(config.sku.width, 6);
        assert_eq!(config.sku.overflow, OverflowPolicy::Widen);
    }

    #[test]
    fn partial_sku_section_keeps_other_defaults() {
        let config = StockroomConfig::from_json_str(r#"{"sku": {"overflow": "reject"}}"#).unwrap();
        assert_eq!(config.sku.prefix, "PC-");
        assert_eq!(config.sku.overflow, OverflowPolicy::Reject);
    }

    #[test]
    fn to_format_rejects_invalid_layout() {
        let config = SkuConfig {
            width: 0,
            ..SkuConfig::default()
        };
        assert!(matches!(config.to_format(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn to_format_rejects_digit_in_prefix() {
        let config = SkuConfig {
            prefix: "PC-1".to_string(),
            ..SkuConfig::default()
        };
        assert!(matches!(
            config.to_format(),
            Err(ConfigError::Invalid(SkuFormatError::DigitInPrefix(_)))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            StockroomConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
    }
}
