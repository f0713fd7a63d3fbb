use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    outfit::model::{CompositionDraft, CompositionRecord},
};

/// Thumbnail image handed to a save.
pub type Thumbnail = image::RgbaImage;

#[derive(Clone, Debug, PartialEq, Eq)]
/// What a successful save reports back.
pub struct SaveReceipt {
    /// Identity of the stored composition.
    pub id: String,
    /// Thumbnail reference now attached to the record.
    pub thumbnail_ref: Option<String>,
}

/// Durable storage for compositions.
///
/// Failures come back as [`DrapeError::Gateway`]; a missing composition is
/// [`DrapeError::NotFound`]. Nothing here retries.
pub trait PersistenceGateway: Send + Sync {
    /// Store `draft`, creating an identity when `draft.id` is `None`. When
    /// `thumbnail` is `None` any previously stored thumbnail is kept.
    fn save(
        &self,
        draft: CompositionDraft,
        thumbnail: Option<Thumbnail>,
    ) -> impl Future<Output = DrapeResult<SaveReceipt>> + Send;

    /// Fetch a stored composition.
    fn load(&self, id: &str) -> impl Future<Output = DrapeResult<CompositionRecord>> + Send;
}

#[derive(Clone, Debug, Default)]
/// Single-flight guard for saves of one composition.
///
/// A second save while one is outstanding is rejected with
/// [`DrapeError::SaveInFlight`] rather than queued.
pub struct SaveGuard {
    lock: Arc<Mutex<()>>,
}

/// Held for the duration of one save.
#[derive(Debug)]
pub struct SavePermit {
    _guard: OwnedMutexGuard<()>,
}

impl SaveGuard {
    /// Fresh, idle guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the guard or fail immediately.
    pub fn try_begin(&self) -> DrapeResult<SavePermit> {
        let guard = Arc::clone(&self.lock)
            .try_lock_owned()
            .map_err(|_| DrapeError::SaveInFlight)?;
        Ok(SavePermit { _guard: guard })
    }

    /// Whether a save currently holds the guard.
    pub fn is_busy(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}

#[derive(Debug, Clone)]
struct StoredComposition {
    record: CompositionRecord,
    thumbnail: Option<Thumbnail>,
}

#[derive(Debug, Default)]
/// In-process persistence, used by tests and offline sessions.
pub struct MemoryGateway {
    records: Mutex<HashMap<String, StoredComposition>>,
    offline: AtomicBool,
}

impl MemoryGateway {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the backend being unreachable: every call fails with a gateway error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert a record as-is, bypassing validation. Handy for seeding bad data.
    pub async fn insert_raw(&self, record: CompositionRecord) {
        self.records.lock().await.insert(
            record.id.clone(),
            StoredComposition {
                record,
                thumbnail: None,
            },
        );
    }

    /// Stored thumbnail for `id`.
    pub async fn thumbnail(&self, id: &str) -> Option<Thumbnail> {
        self.records
            .lock()
            .await
            .get(id)
            .and_then(|s| s.thumbnail.clone())
    }

    /// Number of stored compositions.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    fn check_online(&self) -> DrapeResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DrapeError::gateway("memory gateway is offline"));
        }
        Ok(())
    }
}

impl PersistenceGateway for MemoryGateway {
    #[tracing::instrument(skip_all, fields(id = ?draft.id, items = draft.items.len()))]
    async fn save(
        &self,
        draft: CompositionDraft,
        thumbnail: Option<Thumbnail>,
    ) -> DrapeResult<SaveReceipt> {
        self.check_online()?;
        let mut records = self.records.lock().await;

        let id = draft
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let previous = records.remove(&id);
        let created_at = previous
            .as_ref()
            .and_then(|p| p.record.created_at)
            .or_else(|| Some(chrono::Utc::now()));
        let (thumbnail, thumbnail_ref) = match thumbnail {
            Some(t) => (Some(t), Some(format!("memory://{id}/thumbnail.png"))),
            None => match previous {
                Some(p) => (p.thumbnail, p.record.thumbnail_ref),
                None => (None, None),
            },
        };

        let record = CompositionRecord {
            id: id.clone(),
            owner_id: draft.owner_id,
            name: draft.name,
            thumbnail_ref: thumbnail_ref.clone(),
            items: draft.items,
            created_at,
        };
        records.insert(id.clone(), StoredComposition { record, thumbnail });
        tracing::debug!(%id, "composition saved");
        Ok(SaveReceipt { id, thumbnail_ref })
    }

    #[tracing::instrument(skip(self))]
    async fn load(&self, id: &str) -> DrapeResult<CompositionRecord> {
        self.check_online()?;
        self.records
            .lock()
            .await
            .get(id)
            .map(|s| s.record.clone())
            .ok_or_else(|| DrapeError::not_found(format!("composition '{id}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/persist.rs"]
mod tests;
