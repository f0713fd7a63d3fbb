use std::collections::BTreeMap;

use crate::{
    foundation::core::{Transform, Vec2, scale_in_range},
    foundation::error::{DrapeError, DrapeResult},
    outfit::category::Category,
    outfit::store::{PlacedEntry, PlacementStore},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Flat persisted form of one [`PlacedEntry`].
///
/// Paint order travels in `z_order`; position in the list carries no meaning.
pub struct PersistedItem {
    /// Catalog identity.
    pub item_identity: String,
    /// Slot; unique within one list.
    pub category: Category,
    /// Horizontal offset from canvas center.
    pub x: f64,
    /// Vertical offset from canvas center.
    pub y: f64,
    /// Scale; must lie in `[0.5, 5.0]`.
    pub scale: f64,
    /// Rotation in degrees, unnormalized.
    pub rotation: f64,
    /// Paint order.
    pub z_order: i32,
}

impl From<&PlacedEntry> for PersistedItem {
    fn from(e: &PlacedEntry) -> Self {
        Self {
            item_identity: e.item_id.clone(),
            category: e.category,
            x: e.transform.translate.x,
            y: e.transform.translate.y,
            scale: e.transform.scale,
            rotation: e.transform.rotation_deg,
            z_order: e.z_order,
        }
    }
}

impl PersistedItem {
    /// Check integrity rules that apply to a single record.
    pub fn validate(&self) -> DrapeResult<()> {
        if self.item_identity.trim().is_empty() {
            return Err(DrapeError::malformed(format!(
                "{} item has an empty identity",
                self.category
            )));
        }
        if !scale_in_range(self.scale) {
            return Err(DrapeError::malformed(format!(
                "{} item '{}' has scale {} outside [0.5, 5.0]",
                self.category, self.item_identity, self.scale
            )));
        }
        if !(self.x.is_finite() && self.y.is_finite() && self.rotation.is_finite()) {
            return Err(DrapeError::malformed(format!(
                "{} item '{}' has a non-finite position or rotation",
                self.category, self.item_identity
            )));
        }
        Ok(())
    }

    fn into_entry(self) -> PlacedEntry {
        PlacedEntry {
            category: self.category,
            item_id: self.item_identity,
            transform: Transform {
                translate: Vec2::new(self.x, self.y),
                rotation_deg: self.rotation,
                scale: self.scale,
            },
            z_order: self.z_order,
        }
    }
}

/// Flatten the store into persisted records, one per occupied slot.
///
/// Records come out in paint order for stable diffs; readers must not rely on it.
pub fn serialize(store: &PlacementStore) -> Vec<PersistedItem> {
    store
        .current_entries()
        .into_iter()
        .map(PersistedItem::from)
        .collect()
}

/// Rebuild a store from persisted records. The selection starts empty.
///
/// Duplicate categories and out-of-range values fail the whole load; nothing is
/// clamped or skipped.
pub fn deserialize(items: &[PersistedItem]) -> DrapeResult<PlacementStore> {
    let mut store = PlacementStore::new();
    deserialize_into(&mut store, items)?;
    Ok(store)
}

/// Like [`deserialize`], but swaps the entries of an existing store so its
/// subscribers keep listening. On error the store is left untouched.
#[tracing::instrument(skip_all, fields(count = items.len()))]
pub fn deserialize_into(store: &mut PlacementStore, items: &[PersistedItem]) -> DrapeResult<()> {
    let entries = decode_entries(items)?;
    store.replace_all(entries);
    Ok(())
}

fn decode_entries(items: &[PersistedItem]) -> DrapeResult<BTreeMap<Category, PlacedEntry>> {
    let mut entries = BTreeMap::new();
    for item in items {
        item.validate()?;
        if entries.contains_key(&item.category) {
            return Err(DrapeError::malformed(format!(
                "category {} appears more than once",
                item.category
            )));
        }
        entries.insert(item.category, item.clone().into_entry());
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "../../tests/unit/outfit/serialize.rs"]
mod tests;
