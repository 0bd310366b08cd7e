//! Item catalog loaded from the shop's JSON config

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

/// One purchasable extra-jump item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Display name shown in the shop
    #[serde(default)]
    pub name: Option<String>,
    /// Shop category to list the item under instead of the configured one
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default, rename = "sellprice")]
    pub sell_price: i64,
    #[serde(default)]
    pub duration: i64,
    /// Kept raw so a bad value is reported at lookup instead of failing the whole file
    #[serde(default)]
    jumps: Option<Value>,
}

impl CatalogItem {
    /// Extra jumps this item grants
    pub fn jumps(&self, unique_name: &str) -> Result<u32, CatalogError> {
        let value = self
            .jumps
            .as_ref()
            .ok_or_else(|| CatalogError::MissingJumps(unique_name.to_string()))?;

        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| CatalogError::InvalidJumps {
                unique_name: unique_name.to_string(),
                value: value.to_string(),
            })
    }

    pub fn display_name<'a>(&'a self, unique_name: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(unique_name)
    }
}

/// Read-only catalog keyed by unique item name
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: BTreeMap<String, CatalogItem>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let items: BTreeMap<String, CatalogItem> = serde_json::from_str(raw)?;
        Ok(Self { items })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&raw)?;
        info!(path = %path.display(), items = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Load the catalog, treating a missing file as an empty catalog
    pub fn load_or_empty(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            warn!(path = %path.display(), "Catalog file not found, no items will be registered");
            return Ok(Self::empty());
        }
        Self::load(path)
    }

    pub fn get(&self, unique_name: &str) -> Option<&CatalogItem> {
        self.items.get(unique_name)
    }

    /// Jump count for an item, or why it can't be used
    pub fn lookup(&self, unique_name: &str) -> Result<u32, CatalogError> {
        self.get(unique_name)
            .ok_or_else(|| CatalogError::NotFound(unique_name.to_string()))?
            .jumps(unique_name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogItem)> {
        self.items.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Items with a usable jump count, ascending by jumps then name.
    /// Unusable entries are logged and left out.
    pub fn registration_order(&self) -> Vec<(&str, &CatalogItem, u32)> {
        let mut items: Vec<(&str, &CatalogItem, u32)> = self
            .iter()
            .filter_map(|(unique_name, item)| match item.jumps(unique_name) {
                Ok(jumps) => Some((unique_name, item, jumps)),
                Err(e) => {
                    error!(unique_name, error = %e, "Skipping catalog item");
                    None
                }
            })
            .collect();

        items.sort_by(|a, b| a.2.cmp(&b.2).then_with(|| a.0.cmp(b.0)));
        items
    }
}

/// Catalog errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Item {0} not found in catalog")]
    NotFound(String),

    #[error("{0} has missing 'jumps' in config")]
    MissingJumps(String),

    #[error("{unique_name} has invalid 'jumps' in config: {value}")]
    InvalidJumps { unique_name: String, value: String },
}
