use std::collections::BTreeMap;

use tokio::sync::broadcast;

use crate::{
    foundation::core::Transform,
    outfit::category::{Category, defaults_for},
};

const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq)]
/// A garment bound to one category slot.
pub struct PlacedEntry {
    /// Slot this garment occupies.
    pub category: Category,
    /// Opaque catalog identity.
    pub item_id: String,
    /// Current placement.
    pub transform: Transform,
    /// Paint order; higher values draw on top.
    pub z_order: i32,
}

impl PlacedEntry {
    /// Fresh entry at the category's default placement.
    pub fn with_defaults(category: Category, item_id: impl Into<String>) -> Self {
        let defaults = defaults_for(category);
        Self {
            category,
            item_id: item_id.into(),
            transform: defaults.transform(),
            z_order: defaults.z_order,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// Change notification published by [`PlacementStore`].
pub enum StoreEvent {
    /// A new entry was created (or replaced a different item) in this slot.
    Placed {
        /// Affected slot.
        category: Category,
        /// Identity now occupying the slot.
        item_id: String,
    },
    /// The slot was cleared.
    Removed(Category),
    /// A gesture delta changed the entry's transform.
    Transformed(Category),
    /// The entry's transform went back to the category default.
    Reset(Category),
    /// The active selection changed.
    Selected(Option<Category>),
    /// The whole entry set was swapped out (load).
    Replaced,
}

/// Authoritative holder of the placed entries and the active selection.
///
/// The store is a plain owned value: every mutation takes `&mut self` and runs
/// synchronously. Observers subscribe through [`PlacementStore::subscribe`].
pub struct PlacementStore {
    entries: BTreeMap<Category, PlacedEntry>,
    active: Option<Category>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for PlacementStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PlacementStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementStore")
            .field("entries", &self.entries)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl PlacementStore {
    /// Empty store with nothing selected.
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            entries: BTreeMap::new(),
            active: None,
            events,
        }
    }

    /// Receive every subsequent [`StoreEvent`].
    ///
    /// Slow receivers observe `Lagged` rather than blocking the editor.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Place `item_id` in `category`, or clear the slot with `None`.
    ///
    /// Re-placing the identity already in the slot keeps its transform. A different
    /// identity starts over from the category defaults. The selection is untouched.
    pub fn set_item(&mut self, category: Category, item_id: Option<&str>) {
        let Some(item_id) = item_id else {
            if self.entries.remove(&category).is_some() {
                tracing::debug!(%category, "slot cleared");
                self.notify(StoreEvent::Removed(category));
            }
            return;
        };

        if self
            .entries
            .get(&category)
            .is_some_and(|e| e.item_id == item_id)
        {
            return;
        }

        tracing::debug!(%category, item_id, "slot placed");
        self.entries
            .insert(category, PlacedEntry::with_defaults(category, item_id));
        self.notify(StoreEvent::Placed {
            category,
            item_id: item_id.to_string(),
        });
    }

    /// Shorthand for `set_item(category, None)`.
    pub fn clear(&mut self, category: Category) {
        self.set_item(category, None);
    }

    /// Set the active selection. Empty slots may be selected.
    pub fn select(&mut self, category: Option<Category>) {
        if self.active == category {
            return;
        }
        self.active = category;
        self.notify(StoreEvent::Selected(category));
    }

    /// Currently selected slot, if any.
    pub fn active(&self) -> Option<Category> {
        self.active
    }

    /// Entry occupying `category`.
    pub fn entry(&self, category: Category) -> Option<&PlacedEntry> {
        self.entries.get(&category)
    }

    /// Entries in paint order: z-order ascending, ties by category order.
    pub fn current_entries(&self) -> Vec<&PlacedEntry> {
        let mut out: Vec<&PlacedEntry> = self.entries.values().collect();
        // Stable sort over a category-ordered map keeps ties deterministic.
        out.sort_by_key(|e| e.z_order);
        out
    }

    /// Put `category` back at its default transform, keeping the item.
    pub fn reset_transform(&mut self, category: Category) {
        let Some(entry) = self.entries.get_mut(&category) else {
            return;
        };
        entry.transform = defaults_for(category).transform();
        self.notify(StoreEvent::Reset(category));
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when both stores hold the same entries, ignoring selection.
    pub fn same_entries(&self, other: &PlacementStore) -> bool {
        self.entries == other.entries
    }

    pub(crate) fn active_entry_mut(&mut self) -> Option<&mut PlacedEntry> {
        let category = self.active?;
        self.entries.get_mut(&category)
    }

    pub(crate) fn replace_all(&mut self, entries: BTreeMap<Category, PlacedEntry>) {
        self.entries = entries;
        self.active = None;
        self.notify(StoreEvent::Replaced);
    }

    pub(crate) fn notify(&self, event: StoreEvent) {
        // No subscribers is the common case outside a UI; nothing to deliver.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/outfit/store.rs"]
mod tests;
