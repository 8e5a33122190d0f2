//! # API Configuration
//!
//! ```toml
//! link_base = "http://api.example.com"
//! concurrent_includes = true
//! store_buffer = 64
//! ```
//!
//! Every key is optional.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Settings shared by every registered resource.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Prefix of relation `href` templates. Without it links carry only a type.
    pub link_base: Option<String>,
    /// Fetch independent relations of a request concurrently.
    pub concurrent_includes: bool,
    /// Channel capacity of each store actor.
    pub store_buffer: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            link_base: None,
            concurrent_includes: true,
            store_buffer: 32,
        }
    }
}

impl ApiConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn with_link_base(mut self, base: impl Into<String>) -> Self {
        self.link_base = Some(base.into());
        self
    }

    pub fn with_concurrent_includes(mut self, concurrent: bool) -> Self {
        self.concurrent_includes = concurrent;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        assert_eq!(ApiConfig::from_toml_str("").unwrap(), ApiConfig::default());
    }

    #[test]
    fn test_partial_document() {
        let config = ApiConfig::from_toml_str(
            r#"
            link_base = "http://api.test"
            store_buffer = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.link_base.as_deref(), Some("http://api.test"));
        assert_eq!(config.store_buffer, 8);
        assert!(config.concurrent_includes);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ApiConfig::from_toml_str("linkbase = \"x\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ApiConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
