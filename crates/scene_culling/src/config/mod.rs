//! Configuration file handling
//!
//! Settings structs implement [`Config`] to be read from and written to
//! TOML or RON files. The format is chosen by file extension.

pub use serde::{Serialize, Deserialize};

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.toml`
    Toml,
    /// `.ron`
    Ron,
}

impl ConfigFormat {
    /// Pick the format from the extension of `path`
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        match std::path::Path::new(path).extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("ron") => Ok(Self::Ron),
            _ => Err(ConfigError::UnsupportedFormat(path.to_string())),
        }
    }
}

/// Settings that can be stored in a TOML or RON file
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Read and parse a settings file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str_with_format(&contents, path)
    }

    /// Parse settings text in the format implied by `path`
    fn from_str_with_format(contents: &str, path: &str) -> Result<Self, ConfigError> {
        match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
            ConfigFormat::Ron => ron::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string())),
        }
    }

    /// Write settings to `path`, pretty-printed
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = match ConfigFormat::from_path(path)? {
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            ConfigFormat::Ron => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
        };
        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Errors from reading, writing or validating settings
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// File could not be read or written
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Text is not valid for the format
    #[error("Parse error: {0}")]
    Parse(String),

    /// Settings could not be serialized
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Extension is neither `.toml` nor `.ron`
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid value: {0}")]
    Invalid(String),
}
