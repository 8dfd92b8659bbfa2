use super::storage::{MemoryBackend, RatingBackend, StoreDocument};
use super::types::{Rating, RatingKey};
use crate::error::{RaterError, Result};
use std::path::PathBuf;
use tracing::{debug, info};

/// Append-only store of ratings keyed by (label, site, technician).
///
/// The backend is the source of truth: every append re-reads it, adds one
/// rating and writes the whole document back. In-memory state only changes
/// once that write has succeeded.
pub struct RatingStore {
    backend: Box<dyn RatingBackend>,
    buckets: StoreDocument,
    read_only: bool,
}

impl RatingStore {
    /// Open a store, failing if the persisted document cannot be loaded
    pub fn open(backend: Box<dyn RatingBackend>) -> Result<Self> {
        let buckets = backend.load()?.unwrap_or_default();
        Ok(Self {
            backend,
            buckets,
            read_only: false,
        })
    }

    /// Open a store, falling back to an empty read-only store when the
    /// persisted document is unusable. The load error is returned for display.
    pub fn open_or_degraded(backend: Box<dyn RatingBackend>) -> (Self, Option<RaterError>) {
        match backend.load() {
            Ok(doc) => (
                Self {
                    backend,
                    buckets: doc.unwrap_or_default(),
                    read_only: false,
                },
                None,
            ),
            Err(e) => {
                debug!(error = %e, "Rating store opened read-only");
                (
                    Self {
                        backend,
                        buckets: StoreDocument::new(),
                        read_only: true,
                    },
                    Some(e),
                )
            }
        }
    }

    /// Empty store backed by memory only
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryBackend::new()),
            buckets: StoreDocument::new(),
            read_only: false,
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn location(&self) -> PathBuf {
        self.backend.location()
    }

    /// Ratings for a key in submission order; empty when the key was never rated
    pub fn get(&self, key: &RatingKey) -> &[Rating] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Validate, append and persist one rating.
    ///
    /// Returns the stored rating. On any error nothing is persisted and the
    /// store is left exactly as it was.
    pub fn append(
        &mut self,
        key: RatingKey,
        responsiveness: i64,
        quality: i64,
        timeliness: i64,
    ) -> Result<Rating> {
        let rating = Rating::new(responsiveness, quality, timeliness)?;

        if self.read_only {
            return Err(RaterError::persistence(
                self.location(),
                "store is read-only because its document could not be loaded",
            ));
        }

        // Pick up anything another process wrote since we loaded
        let mut latest = match self.backend.load() {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => return Err(RaterError::persistence(self.location(), e)),
        };

        latest.entry(key.clone()).or_default().push(rating.clone());
        self.backend.save(&latest)?;
        self.buckets = latest;

        info!(
            key = %key,
            average = rating.average,
            count = self.get(&key).len(),
            "Rating recorded"
        );
        Ok(rating)
    }

    /// Re-read the backend, replacing in-memory state
    pub fn reload(&mut self) -> Result<()> {
        self.buckets = self.backend.load()?.unwrap_or_default();
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &RatingKey> {
        self.buckets.keys()
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total_ratings(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}
