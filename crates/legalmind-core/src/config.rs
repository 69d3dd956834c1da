//! Analyzer configuration
//!
//! Read from `<data_dir>/config.toml` (or an explicit path). A missing file
//! yields defaults; a present but invalid file is an error. CLI flags and
//! environment variables are layered on top by the binary.
//!
//! ```toml
//! max_input_chars = 10000
//! history_limit = 50
//!
//! [summarizer]
//! endpoint = "https://api-inference.huggingface.co"
//! model = "facebook/bart-large-cnn"
//! fallback_model = "t5-small"
//! timeout_secs = 120
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name inside the data directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Characters of input handed to the summarizer; longer inputs are truncated
    pub max_input_chars: usize,

    /// Records shown by history views
    pub history_limit: usize,

    pub summarizer: SummarizerConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            max_input_chars: 10_000,
            history_limit: 50,
            summarizer: SummarizerConfig::default(),
        }
    }
}

/// Remote summarizer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub endpoint: String,
    pub model: String,
    /// Tried once when the primary model fails
    pub fallback_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    pub timeout_secs: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co".to_string(),
            model: "facebook/bart-large-cnn".to_string(),
            fallback_model: Some("t5-small".to_string()),
            api_token: None,
            timeout_secs: 120,
        }
    }
}

impl AnalyzerConfig {
    /// Load `<data_dir>/config.toml`, defaults if absent
    pub fn load_from_dir(data_dir: &Path) -> Result<Self, ConfigError> {
        Self::load(&data_dir.join(CONFIG_FILE_NAME))
    }

    /// Load a config file, defaults if absent
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_input_chars == 0 {
            return Err(ConfigError::Invalid {
                message: "max_input_chars must be greater than 0".to_string(),
            });
        }
        if self.summarizer.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "summarizer.timeout_secs must be greater than 0".to_string(),
            });
        }
        if self.summarizer.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "summarizer.endpoint must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Effective configuration as TOML (api token omitted)
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        let mut redacted = self.clone();
        redacted.summarizer.api_token = None;
        toml::to_string_pretty(&redacted)
    }
}

/// Platform data directory for legalmind (e.g. `~/.local/share/legalmind`)
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("legalmind"))
}
