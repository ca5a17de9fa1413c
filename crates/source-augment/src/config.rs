use crate::error::{AugmentError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for source augmentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// File extensions (without the dot) treated as Go source
    pub source_extensions: Vec<String>,

    /// Files larger than this are never parsed
    pub max_file_bytes: u64,

    /// Decode the frame's own signature when the call site leaves raw words
    /// unconsumed
    pub signature_completion: bool,
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            source_extensions: vec!["go".to_string()],
            max_file_bytes: 16 * 1024 * 1024,
            signature_completion: true,
        }
    }
}

impl AugmentConfig {
    /// Parse configuration from TOML text; missing keys take defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_extensions.is_empty() {
            return Err(AugmentError::invalid_config(
                "source_extensions must not be empty",
            ));
        }

        for ext in &self.source_extensions {
            if ext.is_empty() {
                return Err(AugmentError::invalid_config(
                    "source_extensions must not contain empty entries",
                ));
            }
            if ext.starts_with('.') {
                return Err(AugmentError::invalid_config(format!(
                    "source extension {ext:?} must not start with '.'"
                )));
            }
        }

        if self.max_file_bytes == 0 {
            return Err(AugmentError::invalid_config("max_file_bytes must be > 0"));
        }

        Ok(())
    }

    /// Whether `path` has one of the configured source extensions
    pub fn is_source_path(&self, path: impl AsRef<Path>) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.source_extensions.iter().any(|e| e == ext))
    }
}
