//! Comparison settings: which columns hold the key, quantity and price
//!
//! Settings can be kept in a small JSON file so the same column names are
//! reused across runs:
//!
//! ```json
//! { "key_column": "Item Code", "quantity_column": "Quantity", "price_column": "Price" }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default key column name
pub const DEFAULT_KEY_COLUMN: &str = "Item Code";
/// Default quantity column name
pub const DEFAULT_QUANTITY_COLUMN: &str = "Quantity";
/// Default price column name
pub const DEFAULT_PRICE_COLUMN: &str = "Price";

/// Column names used by a comparison run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Column identifying an item in both invoices
    pub key_column: String,
    /// Column holding the ordered quantity
    pub quantity_column: String,
    /// Column holding the unit price
    pub price_column: String,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            key_column: DEFAULT_KEY_COLUMN.to_string(),
            quantity_column: DEFAULT_QUANTITY_COLUMN.to_string(),
            price_column: DEFAULT_PRICE_COLUMN.to_string(),
        }
    }
}

impl CompareConfig {
    /// Load a config file from JSON. Missing fields fall back to defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the config file to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Replace column names with any explicitly given values
    pub fn with_overrides(
        mut self,
        key: Option<String>,
        quantity: Option<String>,
        price: Option<String>,
    ) -> Self {
        if let Some(key) = key {
            self.key_column = key;
        }
        if let Some(quantity) = quantity {
            self.quantity_column = quantity;
        }
        if let Some(price) = price {
            self.price_column = price;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompareConfig::default();
        assert_eq!(config.key_column, "Item Code");
        assert_eq!(config.quantity_column, "Quantity");
        assert_eq!(config.price_column, "Price");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CompareConfig = serde_json::from_str(r#"{ "key_column": "SKU" }"#).unwrap();
        assert_eq!(config.key_column, "SKU");
        assert_eq!(config.quantity_column, "Quantity");
    }

    #[test]
    fn test_overrides() {
        let config = CompareConfig::default().with_overrides(None, Some("Qty".to_string()), None);
        assert_eq!(config.key_column, "Item Code");
        assert_eq!(config.quantity_column, "Qty");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compare.json");

        let config = CompareConfig::default().with_overrides(Some("SKU".to_string()), None, None);
        config.save(&path).unwrap();

        assert_eq!(CompareConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = CompareConfig::load("/nonexistent/compare.json").unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
