//! Drape is the outfit composition engine behind a wardrobe app.
//!
//! Users place garments in four fixed slots (shoes, bottom, top, accessories),
//! then drag, pinch and twist each layer on a canvas. Drape owns the state and
//! rules of that canvas; it does not paint pixels or recognize gestures.
//!
//! # Pieces
//!
//! 1. **Place**: [`PlacementStore`] maps each [`Category`] to at most one
//!    [`PlacedEntry`] and tracks the active selection.
//! 2. **Transform**: [`TransformController`] consumes [`GestureMessage`] deltas and
//!    applies them to the active entry (scale clamped to `[0.5, 5.0]`).
//! 3. **Stack**: [`defaults_for`] fixes paint order and first placement per slot.
//! 4. **Persist**: [`serialize`] / [`deserialize`] flatten the store to
//!    [`PersistedItem`] records and back; [`PersistenceGateway`] stores them.
//!
//! [`EditorSession`] ties these together with a [`Catalog`] and a gateway.
//! [`BackgroundRemoval`] coordinates the asynchronous foreground extraction used
//! when photographing garments.
//!
//! The store and controller are synchronous and single-owner. Only gateway calls
//! are `async`.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod gateway;
mod outfit;
mod session;

/// JSON configuration for file-backed gateways and the CLI.
pub mod config;

pub use config::DrapeConfig;
pub use foundation::core::{
    Affine, SCALE_MAX, SCALE_MIN, Transform, Vec2, clamp_scale, scale_in_range,
};
pub use foundation::error::{DrapeError, DrapeResult};
pub use gateway::catalog::{Catalog, CatalogItem, InMemoryCatalog};
pub use gateway::extract::{
    BackdropKeyExtractor, BackgroundRemoval, ExtractionSnapshot, ExtractionStatus,
    ForegroundExtractor, ImageRef, RequestToken,
};
pub use gateway::file::FileGateway;
pub use gateway::persist::{
    MemoryGateway, PersistenceGateway, SaveGuard, SavePermit, SaveReceipt, Thumbnail,
};
pub use outfit::category::{Category, CategoryDefaults, defaults_for};
pub use outfit::command::{EditCommand, apply_command, replay};
pub use outfit::controller::{GestureMessage, TransformController};
pub use outfit::model::{Composition, CompositionDraft, CompositionRecord};
pub use outfit::serialize::{PersistedItem, deserialize, deserialize_into, serialize};
pub use outfit::store::{PlacedEntry, PlacementStore, StoreEvent};
pub use session::editor::EditorSession;
