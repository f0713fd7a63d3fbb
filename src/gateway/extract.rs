use std::{
    future::Future,
    path::{Path, PathBuf},
};

use anyhow::Context;
use tokio::sync::watch;

use crate::foundation::error::{DrapeError, DrapeResult};

/// Opaque reference to a stored image (a path, URL, or storage key).
pub type ImageRef = String;

/// Background removal: turns a garment photo into a foreground-only image.
pub trait ForegroundExtractor: Send + Sync {
    /// Produce a foreground image for `source`.
    fn extract(&self, source: &str) -> impl Future<Output = DrapeResult<ImageRef>> + Send;
}

#[derive(Clone, Debug)]
/// Local extractor that makes pixels near the border color transparent.
///
/// Works for garments shot on a plain backdrop. The result is written next to the
/// source as `<stem>.fg.png`.
pub struct BackdropKeyExtractor {
    tolerance: u8,
}

impl BackdropKeyExtractor {
    /// Per-channel distance from the backdrop color still treated as backdrop.
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }
}

impl Default for BackdropKeyExtractor {
    fn default() -> Self {
        Self::new(24)
    }
}

impl ForegroundExtractor for BackdropKeyExtractor {
    #[tracing::instrument(skip(self), fields(tolerance = self.tolerance))]
    async fn extract(&self, source: &str) -> DrapeResult<ImageRef> {
        let src = PathBuf::from(source);
        let tolerance = self.tolerance;
        let out = tokio::task::spawn_blocking(move || key_out_backdrop(&src, tolerance))
            .await
            .map_err(|e| DrapeError::gateway(format!("extraction task failed: {e}")))?
            .map_err(|e| DrapeError::gateway(format!("{e:#}")))?;
        Ok(out.to_string_lossy().into_owned())
    }
}

fn key_out_backdrop(src: &Path, tolerance: u8) -> anyhow::Result<PathBuf> {
    let mut img = image::open(src)
        .with_context(|| format!("open image '{}'", src.display()))?
        .to_rgba8();
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        anyhow::bail!("image '{}' is empty", src.display());
    }

    let corners = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)];
    let mut sum = [0u32; 3];
    for (x, y) in corners {
        let p = img.get_pixel(x, y);
        for (acc, v) in sum.iter_mut().zip(p.0) {
            *acc += u32::from(v);
        }
    }
    let backdrop = sum.map(|s| (s / 4) as u8);

    for px in img.pixels_mut() {
        let close = (0..3).all(|c| px[c].abs_diff(backdrop[c]) <= tolerance);
        if close {
            *px = image::Rgba([0, 0, 0, 0]);
        }
    }

    let stem = src
        .file_stem()
        .and_then(|s| s.to_str())
        .context("source image has no file name")?;
    let out = src.with_file_name(format!("{stem}.fg.png"));
    img.save_with_format(&out, image::ImageFormat::Png)
        .with_context(|| format!("write '{}'", out.display()))?;
    Ok(out)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Ticket for one extraction request; only the newest ticket may publish a result.
pub struct RequestToken(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
/// Where the current background-removal request stands.
pub enum ExtractionStatus {
    /// Removal is off or nothing was requested.
    Idle,
    /// Waiting on the extractor.
    Pending {
        /// Image being processed.
        source: ImageRef,
    },
    /// The newest request finished.
    Ready {
        /// Image that was processed.
        source: ImageRef,
        /// Foreground image.
        result: ImageRef,
    },
    /// The newest request failed.
    Failed {
        /// Image that was processed.
        source: ImageRef,
        /// Failure description.
        message: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Observable state: the current generation and its status.
pub struct ExtractionSnapshot {
    /// Bumped by every new request and by turning removal off.
    pub generation: u64,
    /// Status of the request for `generation`.
    pub status: ExtractionStatus,
}

/// Coordinates background removal for one editing surface.
///
/// Each request takes a new generation. A completion whose token is older than
/// the current generation is dropped, so a slow earlier request can never
/// overwrite a newer one or resurrect a result after removal was turned off.
pub struct BackgroundRemoval<E> {
    extractor: E,
    state: watch::Sender<ExtractionSnapshot>,
}

impl<E: ForegroundExtractor> BackgroundRemoval<E> {
    /// Idle coordinator over `extractor`.
    pub fn new(extractor: E) -> Self {
        let (state, _) = watch::channel(ExtractionSnapshot {
            generation: 0,
            status: ExtractionStatus::Idle,
        });
        Self { extractor, state }
    }

    /// Current status.
    pub fn status(&self) -> ExtractionStatus {
        self.state.borrow().status.clone()
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<ExtractionSnapshot> {
        self.state.subscribe()
    }

    /// Start a request for `source`, superseding any request in flight.
    pub fn begin(&self, source: impl Into<ImageRef>) -> RequestToken {
        let source = source.into();
        let mut token = RequestToken(0);
        self.state.send_modify(|s| {
            s.generation += 1;
            s.status = ExtractionStatus::Pending { source };
            token = RequestToken(s.generation);
        });
        token
    }

    /// Turn removal off; anything still in flight becomes stale.
    pub fn disable(&self) {
        self.state.send_modify(|s| {
            s.generation += 1;
            s.status = ExtractionStatus::Idle;
        });
    }

    /// Publish the outcome of `token`'s request. Returns `false` when the token
    /// was superseded and the outcome was dropped.
    pub fn complete(&self, token: RequestToken, outcome: &DrapeResult<ImageRef>) -> bool {
        self.state.send_if_modified(|s| {
            if s.generation != token.0 {
                return false;
            }
            let ExtractionStatus::Pending { source } = &s.status else {
                return false;
            };
            let source = source.clone();
            s.status = match outcome {
                Ok(result) => ExtractionStatus::Ready {
                    source,
                    result: result.clone(),
                },
                Err(err) => ExtractionStatus::Failed {
                    source,
                    message: err.to_string(),
                },
            };
            true
        })
    }

    /// Run one request end to end.
    ///
    /// `Ok(Some(image))` when this request is still the newest; `Ok(None)` when it
    /// was superseded (its outcome, success or failure, is dropped); `Err` when the
    /// newest request failed.
    pub async fn request(&self, source: impl Into<ImageRef>) -> DrapeResult<Option<ImageRef>> {
        let source = source.into();
        let token = self.begin(source.clone());
        let outcome = self.extractor.extract(&source).await;
        if !self.complete(token, &outcome) {
            tracing::warn!(%source, "stale background-removal result discarded");
            return Ok(None);
        }
        outcome.map(Some)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/gateway/extract.rs"]
mod tests;
