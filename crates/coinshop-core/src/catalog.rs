//! The item catalog.
//!
//! A static `name -> price` table loaded once at startup and shared
//! read-only. The ledger engine receives it as an explicit dependency so
//! tests can substitute their own prices.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{LedgerError, Result};

/// Merch sold when no catalog file is configured.
const BUILTIN_ITEMS: &[(&str, i64)] = &[
    ("t-shirt", 80),
    ("cup", 20),
    ("book", 50),
    ("pen", 10),
    ("powerbank", 200),
    ("hoody", 300),
    ("umbrella", 200),
    ("socks", 10),
    ("wallet", 50),
    ("pink-hoody", 500),
];

/// Read-only item price table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    prices: BTreeMap<String, i64>,
}

impl Catalog {
    /// Build a catalog from `(name, price)` pairs.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidCatalog` if a name is empty or a price is
    /// not positive.
    pub fn from_items<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut prices = BTreeMap::new();
        for (name, price) in items {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(LedgerError::InvalidCatalog("empty item name".into()));
            }
            if price <= 0 {
                return Err(LedgerError::InvalidCatalog(format!(
                    "item {name:?} has non-positive price {price}"
                )));
            }
            prices.insert(name, price);
        }
        Ok(Self { prices })
    }

    /// Parse a JSON object of the form `{"cup": 20, "pen": 10}`.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidCatalog` on malformed JSON or invalid entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, i64> =
            serde_json::from_str(json).map_err(|e| LedgerError::InvalidCatalog(e.to_string()))?;
        Self::from_items(raw)
    }

    /// Load a catalog file.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::InvalidCatalog` if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            LedgerError::InvalidCatalog(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&contents)
    }

    /// Price of an item, if it is sold.
    #[must_use]
    pub fn price(&self, item: &str) -> Option<i64> {
        self.prices.get(item).copied()
    }

    /// Iterate items in name order.
    pub fn items(&self) -> impl Iterator<Item = (&str, i64)> {
        self.prices.iter().map(|(name, price)| (name.as_str(), *price))
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Whether the catalog sells nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            prices: BUILTIN_ITEMS
                .iter()
                .map(|(name, price)| ((*name).to_string(), *price))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_prices() {
        let catalog = Catalog::default();
        assert_eq!(catalog.len(), 10);
        assert_eq!(catalog.price("book"), Some(50));
        assert_eq!(catalog.price("pink-hoody"), Some(500));
        assert_eq!(catalog.price("yacht"), None);
    }

    #[test]
    fn parses_json_object() {
        let catalog = Catalog::from_json(r#"{"sticker": 5, "mug": 25}"#).unwrap();
        assert_eq!(catalog.price("sticker"), Some(5));
        let names: Vec<_> = catalog.items().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["mug", "sticker"]);
    }

    #[test]
    fn rejects_non_positive_price() {
        let err = Catalog::from_json(r#"{"freebie": 0}"#).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCatalog(_)));
    }

    #[test]
    fn rejects_empty_name() {
        let err = Catalog::from_items([(" ", 10)]).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCatalog(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(Catalog::from_json("[1, 2]").is_err());
        assert!(Catalog::from_json(r#"{"cup": "twenty"}"#).is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"cup": 20}}"#).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.price("cup"), Some(20));
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = Catalog::load(dir.path().join("items.json")).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidCatalog(_)));
    }
}
