//! Debounced persistence of the working document and viewport.
//!
//! Snapshots never carry the background image itself: the handle behind it is only valid
//! for the session that loaded it. `hasImage` tells the restoring session that a background
//! has to be supplied again.

mod debounce;

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::document::{Document, TextLayer};
use crate::geometry::Size;
use crate::storage::{KeyValueStore, StorageError};
use crate::viewport::Viewport;

pub use debounce::Debouncer;

pub const AUTOSAVE_KEY: &str = "png-editor-autosave";
pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(2000);
pub const RESTORE_LABEL: &str = "Restore from autosave";

#[derive(Debug, Error)]
pub enum AutosaveError {
    #[error("autosave storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("autosave snapshot could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type AutosaveResult<T> = std::result::Result<T, AutosaveError>;

/// Placeholder for the background location; always written as `null`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DetachedImageUrl;

impl Serialize for DetachedImageUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_none()
    }
}

impl<'de> Deserialize<'de> for DetachedImageUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde::de::IgnoredAny::deserialize(deserializer)?;
        Ok(Self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveSnapshot {
    pub layers: Vec<TextLayer>,
    #[serde(default)]
    image_url: DetachedImageUrl,
    pub stage_size: Size,
    pub stage_scale: f64,
    pub timestamp: u64,
    pub has_image: bool,
}

impl AutosaveSnapshot {
    pub fn capture(document: &Document, viewport: Viewport, timestamp: u64) -> Self {
        Self {
            layers: document.layers().to_vec(),
            image_url: DetachedImageUrl,
            stage_size: viewport.stage_size,
            stage_scale: viewport.stage_scale,
            timestamp,
            has_image: document.background().is_some(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            stage_size: self.stage_size,
            stage_scale: self.stage_scale,
        }
    }

    /// Layers as a document without background; the caller re-supplies the image.
    pub fn to_document(&self) -> Document {
        Document::from_layers(self.layers.clone(), None)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ObservedState {
    document: Document,
    viewport: Viewport,
}

pub struct Autosaver<S> {
    store: S,
    key: String,
    debouncer: Debouncer<ObservedState>,
    last_observed: Option<ObservedState>,
}

impl<S: KeyValueStore> Autosaver<S> {
    pub fn new(store: S, key: impl Into<String>, delay: Duration) -> Self {
        Self {
            store,
            key: key.into(),
            debouncer: Debouncer::new(delay),
            last_observed: None,
        }
    }

    pub fn with_defaults(store: S) -> Self {
        Self::new(store, AUTOSAVE_KEY, AUTOSAVE_DELAY)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Restarts the debounce when `(document, viewport)` differs from the last observation.
    pub fn observe(&mut self, document: &Document, viewport: Viewport, now: Instant) -> bool {
        let unchanged = self.last_observed.as_ref().is_some_and(|last| {
            last.viewport == viewport && last.document == *document
        });
        if unchanged {
            return false;
        }
        let observed = ObservedState {
            document: document.clone(),
            viewport,
        };
        self.last_observed = Some(observed.clone());
        if self.debouncer.schedule(now, observed) {
            tracing::trace!("autosave timer restarted");
        }
        true
    }

    /// Writes the pending snapshot once its delay has elapsed. Failures are logged and dropped.
    pub fn poll(&mut self, now: Instant) -> Option<AutosaveResult<()>> {
        let observed = self.debouncer.poll(now)?;
        let snapshot =
            AutosaveSnapshot::capture(&observed.document, observed.viewport, epoch_millis());
        let result = self.write(&snapshot);
        match &result {
            Ok(()) => tracing::info!(
                key = %self.key,
                layers = snapshot.layers.len(),
                has_image = snapshot.has_image,
                "autosave written"
            ),
            Err(err) => tracing::warn!(key = %self.key, %err, "autosave failed; skipping"),
        }
        Some(result)
    }

    fn write(&self, snapshot: &AutosaveSnapshot) -> AutosaveResult<()> {
        let encoded = serde_json::to_string(snapshot)?;
        self.store.set(&self.key, &encoded)?;
        Ok(())
    }

    /// Reads the stored snapshot. Missing, unreadable and corrupt records all yield `None`.
    pub fn load(&self) -> Option<AutosaveSnapshot> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "failed to read autosave");
                return None;
            }
        };
        match serde_json::from_str::<AutosaveSnapshot>(&raw) {
            Ok(snapshot) => {
                tracing::info!(
                    key = %self.key,
                    layers = snapshot.layers.len(),
                    timestamp = snapshot.timestamp,
                    "autosave loaded"
                );
                Some(snapshot)
            }
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "ignoring corrupt autosave");
                None
            }
        }
    }

    /// Removes the durable record. In-memory state is untouched.
    pub fn clear(&self) -> bool {
        match self.store.remove(&self.key) {
            Ok(()) => {
                tracing::info!(key = %self.key, "autosave cleared");
                true
            }
            Err(err) => {
                tracing::warn!(key = %self.key, %err, "failed to clear autosave");
                false
            }
        }
    }

    /// Drops any pending write. Called when the session closes.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.debouncer.cancel();
        if cancelled {
            tracing::debug!(key = %self.key, "pending autosave cancelled");
        }
        cancelled
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
