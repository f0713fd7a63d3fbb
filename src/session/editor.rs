use std::{future::Future, sync::Arc};

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    gateway::catalog::Catalog,
    gateway::persist::{PersistenceGateway, SaveGuard, SaveReceipt, Thumbnail},
    outfit::category::Category,
    outfit::command::{EditCommand, apply_command},
    outfit::controller::{GestureMessage, TransformController},
    outfit::model::Composition,
    outfit::store::{PlacedEntry, PlacementStore},
};

/// One user editing one composition.
///
/// The session owns the working copy exclusively. Edits are synchronous; only
/// [`EditorSession::open`] and saves touch the gateway.
pub struct EditorSession<P, C> {
    composition: Composition,
    controller: TransformController,
    owner_id: String,
    gateway: Arc<P>,
    catalog: Arc<C>,
    saves: SaveGuard,
}

impl<P: PersistenceGateway + 'static, C: Catalog> EditorSession<P, C> {
    /// Session over a new, empty composition.
    pub fn new(
        name: impl Into<String>,
        owner_id: impl Into<String>,
        gateway: Arc<P>,
        catalog: Arc<C>,
    ) -> Self {
        Self {
            composition: Composition::new(name),
            controller: TransformController::new(),
            owner_id: owner_id.into(),
            gateway,
            catalog,
            saves: SaveGuard::new(),
        }
    }

    /// Load a stored composition for editing.
    ///
    /// Any load or integrity failure is returned and no session exists; the caller
    /// shows a retry affordance. Entries the catalog does not resolve are kept as
    /// stored and reported by [`Self::unresolved_entries`]; only new selections go
    /// through the catalog.
    #[tracing::instrument(skip(gateway, catalog))]
    pub async fn open(id: &str, gateway: Arc<P>, catalog: Arc<C>) -> DrapeResult<Self> {
        let record = gateway.load(id).await?;
        let composition = Composition::from_record(&record)?;

        let session = Self {
            composition,
            controller: TransformController::new(),
            owner_id: record.owner_id,
            gateway,
            catalog,
            saves: SaveGuard::new(),
        };
        for entry in session.unresolved_entries() {
            tracing::warn!(
                category = %entry.category,
                item_id = %entry.item_id,
                "garment not resolved by catalog; keeping stored placement"
            );
        }
        Ok(session)
    }

    /// Entries whose garment the catalog does not know, or files under another
    /// slot. They stay in the composition until the caller clears or replaces them.
    pub fn unresolved_entries(&self) -> Vec<&PlacedEntry> {
        self.composition
            .store
            .current_entries()
            .into_iter()
            .filter(|e| self.catalog.resolve_item(&e.item_id) != Some(e.category))
            .collect()
    }

    /// Working copy.
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Live placement state.
    pub fn store(&self) -> &PlacementStore {
        &self.composition.store
    }

    /// Owning account.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Rename the working copy.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.composition.name = name.into();
    }

    /// Place a catalog item after checking it exists and belongs in `category`;
    /// `None` clears the slot.
    ///
    /// On error the store is untouched.
    pub fn choose_item(&mut self, category: Category, item_id: Option<&str>) -> DrapeResult<()> {
        if let Some(id) = item_id {
            match self.catalog.resolve_item(id) {
                None => {
                    return Err(DrapeError::validation(format!(
                        "unknown catalog item '{id}'"
                    )));
                }
                Some(actual) if actual != category => {
                    return Err(DrapeError::validation(format!(
                        "item '{id}' is a {actual}, not a {category}"
                    )));
                }
                Some(_) => {}
            }
        }
        self.composition.store.set_item(category, item_id);
        Ok(())
    }

    /// Change the active selection.
    pub fn select(&mut self, category: Option<Category>) {
        self.composition.store.select(category);
    }

    /// Put `category` back at its default placement.
    pub fn reset_transform(&mut self, category: Category) {
        self.composition.store.reset_transform(category);
    }

    /// Route one gesture message through the controller.
    pub fn handle_gesture(&mut self, msg: GestureMessage) -> Option<PlacedEntry> {
        self.controller.handle(&mut self.composition.store, msg)
    }

    /// Apply a replayable command. `Place` goes through the catalog check.
    pub fn apply_command(&mut self, cmd: &EditCommand) -> DrapeResult<()> {
        if let EditCommand::Place { category, item } = cmd {
            return self.choose_item(*category, Some(item.as_str()));
        }
        apply_command(&mut self.composition.store, &mut self.controller, cmd);
        Ok(())
    }

    /// Snapshot the working copy and start a save that runs independently of the
    /// session, so editing can continue while it is in flight.
    ///
    /// Fails with [`DrapeError::SaveInFlight`] if an earlier save has not finished.
    /// Pass the receipt to [`Self::finish_save`] afterwards.
    pub fn begin_save(
        &self,
        thumbnail: Option<Thumbnail>,
    ) -> DrapeResult<impl Future<Output = DrapeResult<SaveReceipt>> + Send + use<P, C>> {
        let permit = self.saves.try_begin()?;
        let draft = self.composition.draft(&self.owner_id);
        let gateway = Arc::clone(&self.gateway);
        Ok(async move {
            let result = gateway.save(draft, thumbnail).await;
            drop(permit);
            result
        })
    }

    /// Record the identity and thumbnail a completed save reported.
    pub fn finish_save(&mut self, receipt: &SaveReceipt) {
        self.composition.id = Some(receipt.id.clone());
        if receipt.thumbnail_ref.is_some() {
            self.composition.thumbnail_ref = receipt.thumbnail_ref.clone();
        }
    }

    /// Save and wait. On failure the working copy is left exactly as it was.
    #[tracing::instrument(skip_all, fields(id = ?self.composition.id))]
    pub async fn save(&mut self, thumbnail: Option<Thumbnail>) -> DrapeResult<SaveReceipt> {
        let receipt = self.begin_save(thumbnail)?.await.inspect_err(|err| {
            tracing::warn!(%err, "save failed; working copy kept");
        })?;
        self.finish_save(&receipt);
        Ok(receipt)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/editor.rs"]
mod tests;
