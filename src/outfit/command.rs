use crate::{
    outfit::category::Category,
    outfit::controller::{GestureMessage, TransformController},
    outfit::store::PlacementStore,
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
/// One user action against a composition, in replayable form.
pub enum EditCommand {
    /// Put a catalog item in a slot.
    Place {
        /// Target slot.
        category: Category,
        /// Catalog identity.
        item: String,
    },
    /// Empty a slot.
    Clear {
        /// Target slot.
        category: Category,
    },
    /// Change the active selection (`null` deselects).
    Select {
        /// New selection.
        #[serde(default)]
        category: Option<Category>,
    },
    /// Return a slot to its default placement.
    Reset {
        /// Target slot.
        category: Category,
    },
    /// Forward a gesture message to the controller.
    Gesture {
        /// The message.
        gesture: GestureMessage,
    },
}

/// Apply one command. Misses are no-ops, matching the store and controller.
pub fn apply_command(
    store: &mut PlacementStore,
    controller: &mut TransformController,
    cmd: &EditCommand,
) {
    match cmd {
        EditCommand::Place { category, item } => store.set_item(*category, Some(item.as_str())),
        EditCommand::Clear { category } => store.clear(*category),
        EditCommand::Select { category } => store.select(*category),
        EditCommand::Reset { category } => store.reset_transform(*category),
        EditCommand::Gesture { gesture } => {
            controller.handle(store, *gesture);
        }
    }
}

/// Apply a whole script in order with a fresh controller.
pub fn replay(store: &mut PlacementStore, script: &[EditCommand]) {
    let mut controller = TransformController::new();
    for cmd in script {
        apply_command(store, &mut controller, cmd);
    }
    tracing::debug!(commands = script.len(), entries = store.len(), "script replayed");
}

#[cfg(test)]
#[path = "../../tests/unit/outfit/command.rs"]
mod tests;
