use crate::{
    foundation::core::{Vec2, clamp_scale},
    outfit::category::Category,
    outfit::store::{PlacedEntry, PlacementStore, StoreEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// One discrete message from the gesture source.
///
/// Deltas are relative to the previous message of the same gesture.
pub enum GestureMessage {
    /// A continuous gesture starts. `on` is the item under the pointer, if any;
    /// starting a drag on an item selects it.
    Begin {
        /// Item the gesture started on.
        #[serde(default)]
        on: Option<Category>,
    },
    /// Drag increment in canvas units.
    Translate {
        /// Horizontal increment.
        dx: f64,
        /// Vertical increment.
        dy: f64,
    },
    /// Pinch increment added to the scale factor.
    Scale {
        /// Scale increment.
        ds: f64,
    },
    /// Twist increment in degrees.
    Rotate {
        /// Rotation increment.
        degrees: f64,
    },
    /// The gesture ended.
    End,
}

#[derive(Clone, Copy, Debug, Default)]
struct GestureLock {
    target: Option<Category>,
}

#[derive(Debug, Default)]
/// Applies gesture deltas to the active entry of a [`PlacementStore`].
///
/// Between `Begin` and `End` the controller pins the selection it started with;
/// if the selection moves mid-gesture, the rest of that gesture is dropped. Every
/// miss is a silent no-op.
pub struct TransformController {
    lock: Option<GestureLock>,
}

impl TransformController {
    /// Controller with no gesture in progress.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a `Begin` has been seen without its `End`.
    pub fn in_gesture(&self) -> bool {
        self.lock.is_some()
    }

    /// Feed one message; returns the updated entry when the message changed one.
    pub fn handle(
        &mut self,
        store: &mut PlacementStore,
        msg: GestureMessage,
    ) -> Option<PlacedEntry> {
        match msg {
            GestureMessage::Begin { on } => {
                self.begin(store, on);
                None
            }
            GestureMessage::Translate { dx, dy } => self.apply_translation_delta(store, dx, dy),
            GestureMessage::Scale { ds } => self.apply_scale_delta(store, ds),
            GestureMessage::Rotate { degrees } => self.apply_rotation_delta(store, degrees),
            GestureMessage::End => {
                self.end();
                None
            }
        }
    }

    /// Start a continuous gesture, selecting `on` when the pointer landed on an item.
    pub fn begin(&mut self, store: &mut PlacementStore, on: Option<Category>) {
        if on.is_some() {
            store.select(on);
        }
        self.lock = Some(GestureLock {
            target: store.active(),
        });
    }

    /// Finish the current gesture.
    pub fn end(&mut self) {
        self.lock = None;
    }

    /// Add `(dx, dy)` to the active entry's translation.
    pub fn apply_translation_delta(
        &self,
        store: &mut PlacementStore,
        dx: f64,
        dy: f64,
    ) -> Option<PlacedEntry> {
        if !(dx.is_finite() && dy.is_finite()) {
            tracing::trace!(dx, dy, "non-finite translation delta dropped");
            return None;
        }
        self.mutate(store, |e| e.transform.translate += Vec2::new(dx, dy))
    }

    /// Add `ds` to the active entry's scale, then clamp into bounds.
    pub fn apply_scale_delta(&self, store: &mut PlacementStore, ds: f64) -> Option<PlacedEntry> {
        if !ds.is_finite() {
            tracing::trace!(ds, "non-finite scale delta dropped");
            return None;
        }
        self.mutate(store, |e| {
            e.transform.scale = clamp_scale(e.transform.scale + ds);
        })
    }

    /// Add `degrees` to the active entry's rotation. No normalization.
    pub fn apply_rotation_delta(
        &self,
        store: &mut PlacementStore,
        degrees: f64,
    ) -> Option<PlacedEntry> {
        if !degrees.is_finite() {
            tracing::trace!(degrees, "non-finite rotation delta dropped");
            return None;
        }
        self.mutate(store, |e| e.transform.rotation_deg += degrees)
    }

    fn target(&self, store: &PlacementStore) -> Option<Category> {
        let active = store.active()?;
        match self.lock {
            Some(lock) if lock.target != Some(active) => None,
            _ => Some(active),
        }
    }

    fn mutate(
        &self,
        store: &mut PlacementStore,
        f: impl FnOnce(&mut PlacedEntry),
    ) -> Option<PlacedEntry> {
        let category = self.target(store)?;
        let entry = store.active_entry_mut()?;
        f(entry);
        let updated = entry.clone();
        store.notify(StoreEvent::Transformed(category));
        Some(updated)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/outfit/controller.rs"]
mod tests;
