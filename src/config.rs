//! Configuration Module
//! Loads `config.toml` (or the embedded default) and resolves relative paths.

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[dataset]
path = "Sample-Superstore.csv"
encoding = "ISO-8859-1"
date_format = "%m/%d/%Y"

[help_document]
path = "Superstore Sales Dashboard Insights.docx"
label = "Superstore Sales Dashboard Insights"

[display]
currency_symbol = "$"
contact_email = "niveditap494@gmail.com"
"#;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unknown text encoding label: {0}")]
    UnknownEncoding(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub help_document: HelpDocumentConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub path: PathBuf,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelpDocumentConfig {
    pub path: PathBuf,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub contact_email: Option<String>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: default_currency_symbol(),
            contact_email: None,
        }
    }
}

fn default_encoding() -> String {
    "ISO-8859-1".to_string()
}

fn default_date_format() -> String {
    "%m/%d/%Y".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl DatasetConfig {
    /// Look up the configured encoding label (WHATWG names, e.g. "ISO-8859-1").
    ///
    /// WHATWG maps "ISO-8859-1" and "latin1" to windows-1252, so bytes
    /// 0x80-0x9F decode to typographic characters (0x96 is `–`) instead of
    /// C1 control codes. Bytes 0xA0-0xFF decode as in ISO-8859-1.
    pub fn text_encoding(&self) -> Result<&'static Encoding, ConfigError> {
        Encoding::for_label(self.encoding.trim().as_bytes())
            .ok_or_else(|| ConfigError::UnknownEncoding(self.encoding.clone()))
    }
}

impl Config {
    /// Parse a config document; relative paths are resolved against `base_dir`.
    pub fn from_toml_str(contents: &str, base_dir: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(contents)?;
        config.dataset.text_encoding()?;
        config.resolve_paths(base_dir);
        Ok(config)
    }

    /// Read a config file from disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_toml_str(&contents, base_dir)
    }

    /// Load configuration.
    ///
    /// Search order:
    /// 1. The explicit path, if given
    /// 2. `config.toml` in the working directory
    /// 3. `config.toml` next to the executable
    /// 4. The embedded default config
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            tracing::info!("Loading config from: {}", path.display());
            return Self::from_file(path);
        }

        let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
        if cwd_config.exists() {
            tracing::info!("Loading config from: {}", cwd_config.display());
            return Self::from_file(&cwd_config);
        }

        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let config_path = exe_dir.join(CONFIG_FILE_NAME);
                if config_path.exists() {
                    tracing::info!("Loading config from: {}", config_path.display());
                    return Self::from_file(&config_path);
                }
                tracing::debug!("config.toml not found at: {}", config_path.display());
            }
        }

        tracing::info!("Using default embedded configuration");
        Self::from_toml_str(DEFAULT_CONFIG, Path::new("."))
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        self.dataset.path = resolve(base_dir, &self.dataset.path);
        self.help_document.path = resolve(base_dir, &self.help_document.path);
    }
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
