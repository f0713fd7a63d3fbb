use chrono::{DateTime, Utc};

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    outfit::category::Category,
    outfit::serialize::{self, PersistedItem},
    outfit::store::PlacementStore,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A composition as the persistence layer stores it.
pub struct CompositionRecord {
    /// Gateway-assigned identity.
    pub id: String,
    /// Account that owns the composition.
    pub owner_id: String,
    /// User-facing name.
    pub name: String,
    /// Reference to the stored thumbnail image, if one was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_ref: Option<String>,
    /// Placed garments; order carries no meaning.
    pub items: Vec<PersistedItem>,
    /// Server-assigned creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl CompositionRecord {
    /// Check record-level integrity without building a store.
    pub fn validate(&self) -> DrapeResult<()> {
        if self.id.trim().is_empty() {
            return Err(DrapeError::malformed("composition id must be non-empty"));
        }
        let mut seen: Vec<Category> = Vec::with_capacity(self.items.len());
        for item in &self.items {
            item.validate()?;
            if seen.contains(&item.category) {
                return Err(DrapeError::malformed(format!(
                    "category {} appears more than once",
                    item.category
                )));
            }
            seen.push(item.category);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Snapshot of a composition handed to [`crate::PersistenceGateway::save`].
///
/// `id` is `None` for a composition that was never saved; the gateway assigns one.
pub struct CompositionDraft {
    /// Existing identity to overwrite, if any.
    pub id: Option<String>,
    /// Owning account.
    pub owner_id: String,
    /// User-facing name.
    pub name: String,
    /// Placed garments.
    pub items: Vec<PersistedItem>,
}

#[derive(Debug)]
/// Working copy of a composition inside an editing session.
pub struct Composition {
    /// Identity once saved or loaded.
    pub id: Option<String>,
    /// User-facing name.
    pub name: String,
    /// Thumbnail reference from the last save or load.
    pub thumbnail_ref: Option<String>,
    /// Live placement state.
    pub store: PlacementStore,
}

impl Composition {
    /// Empty, never-saved composition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            thumbnail_ref: None,
            store: PlacementStore::new(),
        }
    }

    /// Rebuild a working copy from a persisted record.
    pub fn from_record(record: &CompositionRecord) -> DrapeResult<Self> {
        let store = serialize::deserialize(&record.items)?;
        Ok(Self {
            id: Some(record.id.clone()),
            name: record.name.clone(),
            thumbnail_ref: record.thumbnail_ref.clone(),
            store,
        })
    }

    /// Flatten the working copy for a save.
    pub fn draft(&self, owner_id: &str) -> CompositionDraft {
        CompositionDraft {
            id: self.id.clone(),
            owner_id: owner_id.to_string(),
            name: self.name.clone(),
            items: serialize::serialize(&self.store),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/outfit/model.rs"]
mod tests;
