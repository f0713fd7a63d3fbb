use std::{collections::HashMap, path::Path};

use anyhow::Context;

use crate::{foundation::error::DrapeResult, outfit::category::Category};

#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
/// Catalog metadata the engine cares about: identity and slot.
///
/// Catalog files may carry more fields per garment; they are ignored.
pub struct CatalogItem {
    /// Opaque identity.
    pub id: String,
    /// Slot the garment belongs in.
    pub category: Category,
}

/// Read-only view of the user's garments.
///
/// Lookups are synchronous: implementations answer from a local snapshot so
/// selection never waits on the network.
pub trait Catalog: Send + Sync {
    /// Category of `id`, or `None` when the catalog does not know it.
    fn resolve_item(&self, id: &str) -> Option<Category>;
}

#[derive(Clone, Debug, Default)]
/// Catalog backed by a hash map.
pub struct InMemoryCatalog {
    items: HashMap<String, Category>,
}

impl InMemoryCatalog {
    /// Build from a list; later duplicates win.
    pub fn new(items: impl IntoIterator<Item = CatalogItem>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id, i.category)).collect(),
        }
    }

    /// Load a JSON array of [`CatalogItem`].
    pub fn from_json_file(path: &Path) -> DrapeResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read catalog '{}'", path.display()))?;
        let items: Vec<CatalogItem> = serde_json::from_slice(&bytes)?;
        tracing::debug!(count = items.len(), path = %path.display(), "catalog loaded");
        Ok(Self::new(items))
    }

    /// Add or replace one item.
    pub fn insert(&mut self, item: CatalogItem) {
        self.items.insert(item.id, item.category);
    }

    /// Number of known items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Catalog for InMemoryCatalog {
    fn resolve_item(&self, id: &str) -> Option<Category> {
        self.items.get(id).copied()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/catalog.rs"]
mod tests;
