use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::error::{DrapeError, DrapeResult},
    gateway::persist::{PersistenceGateway, SaveReceipt, Thumbnail},
    outfit::model::{CompositionDraft, CompositionRecord},
};

#[derive(Clone, Debug)]
/// Persistence in a local directory: `<id>.json` records and `<id>.png` thumbnails.
pub struct FileGateway {
    root: PathBuf,
}

impl FileGateway {
    /// Gateway rooted at `root`; the directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Library directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> DrapeResult<PathBuf> {
        check_id(id)?;
        Ok(self.root.join(format!("{id}.json")))
    }

    fn thumbnail_name(id: &str) -> String {
        format!("{id}.png")
    }

    /// Every readable record in the library, oldest first.
    ///
    /// Files that fail to parse are skipped with a warning; use [`Self::load`] to
    /// see the error for a specific id.
    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn list(&self) -> DrapeResult<Vec<CompositionRecord>> {
        let mut dir = match tokio::fs::read_dir(&self.root).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_failure("read library", &self.root, e)),
        };

        let mut out = Vec::new();
        while let Some(ent) = dir
            .next_entry()
            .await
            .map_err(|e| io_failure("scan library", &self.root, e))?
        {
            let path = ent.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path).await {
                Ok(r) => out.push(r),
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "skipping unreadable record");
                }
            }
        }
        out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(out)
    }
}

impl PersistenceGateway for FileGateway {
    #[tracing::instrument(skip_all, fields(id = ?draft.id, root = %self.root.display()))]
    async fn save(
        &self,
        draft: CompositionDraft,
        thumbnail: Option<Thumbnail>,
    ) -> DrapeResult<SaveReceipt> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| io_failure("create library", &self.root, e))?;

        let id = draft
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let path = self.record_path(&id)?;
        let previous = match read_record(&path).await {
            Ok(r) => Some(r),
            Err(DrapeError::NotFound(_)) => None,
            // An unreadable previous version is overwritten, not merged.
            Err(err) => {
                tracing::warn!(%id, %err, "previous record unreadable; overwriting");
                None
            }
        };

        let thumbnail_name = Self::thumbnail_name(&id);
        let thumbnail_ref = match &thumbnail {
            Some(_) => Some(thumbnail_name.clone()),
            None => previous.as_ref().and_then(|p| p.thumbnail_ref.clone()),
        };

        let record = CompositionRecord {
            id: id.clone(),
            owner_id: draft.owner_id,
            name: draft.name,
            thumbnail_ref: thumbnail_ref.clone(),
            items: draft.items,
            created_at: previous
                .and_then(|p| p.created_at)
                .or_else(|| Some(chrono::Utc::now())),
        };

        let bytes = serde_json::to_vec_pretty(&record)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|e| io_failure("write record", &tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_failure("commit record", &path, e))?;

        // Only a committed record gets a thumbnail file.
        if let Some(img) = thumbnail {
            write_png(self.root.join(&thumbnail_name), img).await?;
        }

        tracing::info!(%id, items = record.items.len(), "composition saved");
        Ok(SaveReceipt { id, thumbnail_ref })
    }

    #[tracing::instrument(skip(self), fields(root = %self.root.display()))]
    async fn load(&self, id: &str) -> DrapeResult<CompositionRecord> {
        read_record(&self.record_path(id)?).await
    }
}

async fn read_record(path: &Path) -> DrapeResult<CompositionRecord> {
    let bytes = match tokio::fs::read(path).await {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(DrapeError::not_found(format!(
                "composition file '{}'",
                path.display()
            )));
        }
        Err(e) => return Err(io_failure("read record", path, e)),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

async fn write_png(path: PathBuf, img: Thumbnail) -> DrapeResult<()> {
    tokio::task::spawn_blocking(move || {
        img.save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("encode thumbnail '{}'", path.display()))
    })
    .await
    .map_err(|e| DrapeError::gateway(format!("thumbnail task failed: {e}")))?
    .map_err(|e| DrapeError::gateway(format!("{e:#}")))
}

/// Ids name files directly under the library root.
fn check_id(id: &str) -> DrapeResult<()> {
    let bad = id.is_empty()
        || id == "."
        || id.contains(['/', '\\'])
        || id.contains("..");
    if bad {
        return Err(DrapeError::validation(format!(
            "composition id '{id}' is not a plain file name"
        )));
    }
    Ok(())
}

fn io_failure(what: &str, path: &Path, err: std::io::Error) -> DrapeError {
    DrapeError::gateway(format!("{what} '{}': {err}", path.display()))
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/file.rs"]
mod tests;
