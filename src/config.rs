//! Store configuration

use std::path::PathBuf;

use serde::Deserialize;

use crate::query::ParseMode;

/// Configuration for opening a catalog store.
///
/// Every field has a default, so a partial config deserializes cleanly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file location.
    pub path: PathBuf,
    /// How filter queries handle malformed clauses.
    pub parse_mode: ParseMode,
    /// Page size applied when a list call does not ask for one.
    pub default_page_size: u32,
    /// Upper bound on any requested page size.
    pub max_page_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("catalog.db"),
            parse_mode: ParseMode::default(),
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: StoreConfig =
            serde_json::from_str(r#"{"path": "/tmp/catalog.db", "parse_mode": "lenient"}"#)
                .unwrap();
        assert_eq!(config.path, PathBuf::from("/tmp/catalog.db"));
        assert_eq!(config.parse_mode, ParseMode::Lenient);
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.parse_mode, ParseMode::Strict);
        assert_eq!(config.path, PathBuf::from("catalog.db"));
    }
}
