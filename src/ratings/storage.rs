use super::types::{Rating, RatingKey};
use crate::error::{RaterError, Result};
use atomic_write_file::AtomicWriteFile;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// All rating buckets, ordered by key.
pub type StoreDocument = BTreeMap<RatingKey, Vec<Rating>>;

const STORE_WHAT: &str = "rating store";

/// Durable home of the rating document.
///
/// `load` returns `Ok(None)` when nothing has been persisted yet. A document
/// that exists but cannot be parsed is `DataUnavailable`.
pub trait RatingBackend {
    fn load(&self) -> Result<Option<StoreDocument>>;

    /// Replace the persisted document with `doc` in one step.
    fn save(&self, doc: &StoreDocument) -> Result<()>;

    /// Where the document lives, for messages.
    fn location(&self) -> PathBuf;
}

impl<B: RatingBackend + ?Sized> RatingBackend for Rc<B> {
    fn load(&self) -> Result<Option<StoreDocument>> {
        (**self).load()
    }

    fn save(&self, doc: &StoreDocument) -> Result<()> {
        (**self).save(doc)
    }

    fn location(&self) -> PathBuf {
        (**self).location()
    }
}

/// Get the default store path (<data_dir>/tech-rater/ratings.json)
pub fn get_store_path() -> PathBuf {
    crate::config::get_data_dir().join("ratings.json")
}

/// Render a document in the flat `"{label}_{site}_{technician}"` key format
pub fn render_document(doc: &StoreDocument) -> serde_json::Result<String> {
    let flat: BTreeMap<String, &Vec<Rating>> =
        doc.iter().map(|(key, ratings)| (key.encode(), ratings)).collect();
    serde_json::to_string_pretty(&flat)
}

/// Parse a flat document, checking every key and every rating
pub fn parse_document(content: &str) -> std::result::Result<StoreDocument, String> {
    let flat: BTreeMap<String, Vec<Rating>> =
        serde_json::from_str(content).map_err(|e| format!("invalid JSON: {}", e))?;

    let mut doc = StoreDocument::new();
    for (encoded, ratings) in flat {
        let key = RatingKey::decode(&encoded)
            .ok_or_else(|| format!("malformed key '{}'", encoded))?;
        for (i, rating) in ratings.iter().enumerate() {
            rating
                .check()
                .map_err(|e| format!("'{}' rating #{}: {}", encoded, i + 1, e))?;
        }
        if doc.insert(key, ratings).is_some() {
            return Err(format!("duplicate key '{}'", encoded));
        }
    }
    Ok(doc)
}

/// JSON file on disk, replaced atomically on every save.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RatingBackend for JsonFileBackend {
    fn load(&self) -> Result<Option<StoreDocument>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No rating store yet");
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            RaterError::data_unavailable(
                STORE_WHAT,
                format!("cannot read {}: {}", self.path.display(), e),
            )
        })?;

        let doc = parse_document(&content).map_err(|reason| {
            RaterError::data_unavailable(
                STORE_WHAT,
                format!("{} is corrupt: {}", self.path.display(), reason),
            )
        })?;

        debug!(path = %self.path.display(), buckets = doc.len(), "Loaded rating store");
        Ok(Some(doc))
    }

    fn save(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| RaterError::persistence(&self.path, e))?;
        }

        let json = render_document(doc).map_err(|e| RaterError::persistence(&self.path, e))?;

        let mut file =
            AtomicWriteFile::open(&self.path).map_err(|e| RaterError::persistence(&self.path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| RaterError::persistence(&self.path, e))?;
        // Nothing is visible at `path` until commit renames the temp file over it
        file.commit()
            .map_err(|e| RaterError::persistence(&self.path, e))?;

        debug!(path = %self.path.display(), buckets = doc.len(), "Saved rating store");
        Ok(())
    }

    fn location(&self) -> PathBuf {
        self.path.clone()
    }
}

/// In-process backend holding the rendered JSON text.
///
/// Goes through the same encoding as the file backend. Writes can be made
/// to fail to exercise rollback.
#[derive(Default)]
pub struct MemoryBackend {
    content: RefCell<Option<String>>,
    fail_writes: Cell<bool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from raw document text (which may be deliberately corrupt)
    pub fn from_json(content: impl Into<String>) -> Self {
        Self {
            content: RefCell::new(Some(content.into())),
            fail_writes: Cell::new(false),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Current persisted text, if anything was saved
    pub fn contents(&self) -> Option<String> {
        self.content.borrow().clone()
    }
}

impl RatingBackend for MemoryBackend {
    fn load(&self) -> Result<Option<StoreDocument>> {
        match self.content.borrow().as_deref() {
            None => Ok(None),
            Some(content) => parse_document(content)
                .map(Some)
                .map_err(|reason| RaterError::data_unavailable(STORE_WHAT, reason)),
        }
    }

    fn save(&self, doc: &StoreDocument) -> Result<()> {
        if self.fail_writes.get() {
            return Err(RaterError::persistence(self.location(), "write refused"));
        }
        let json = render_document(doc).map_err(|e| RaterError::persistence(self.location(), e))?;
        *self.content.borrow_mut() = Some(json);
        Ok(())
    }

    fn location(&self) -> PathBuf {
        PathBuf::from(":memory:")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> StoreDocument {
        let mut doc = StoreDocument::new();
        doc.insert(
            RatingKey::new("HPI", "ALF", "Alice Smith").unwrap(),
            vec![Rating::new(8, 9, 7).unwrap(), Rating::new(3, 4, 5).unwrap()],
        );
        doc.insert(
            RatingKey::new("HPI", "BOS", "Mary_Ann Lee").unwrap(),
            vec![Rating::new(10, 10, 10).unwrap()],
        );
        doc
    }

    #[test]
    fn test_render_uses_flat_keys() {
        let json = render_document(&sample_doc()).unwrap();
        assert!(json.contains("\"HPI_ALF_Alice Smith\""));
        assert!(json.contains("\"HPI_BOS_Mary_Ann Lee\""));
        assert!(json.contains("\"quality_of_work\": 9"));
    }

    #[test]
    fn test_parse_original_format() {
        let json = r#"{
            "HPI_ALF_Alice Smith": [
                {"responsiveness": 8, "quality_of_work": 9, "timeliness": 7, "average": 8.0}
            ]
        }"#;
        let doc = parse_document(json).unwrap();
        let key = RatingKey::new("HPI", "ALF", "Alice Smith").unwrap();
        assert_eq!(doc[&key].len(), 1);
        assert_eq!(doc[&key][0].average, 8.0);
    }

    #[test]
    fn test_parse_rejects_malformed_key() {
        let json = r#"{"HPI": []}"#;
        let err = parse_document(json).unwrap_err();
        assert!(err.contains("malformed key"));
    }

    #[test]
    fn test_parse_rejects_out_of_range_rating() {
        let json = r#"{"HPI_ALF_Alice": [
            {"responsiveness": 12, "quality_of_work": 9, "timeliness": 7, "average": 9.3}
        ]}"#;
        let err = parse_document(json).unwrap_err();
        assert!(err.contains("rating #1"), "got: {}", err);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_document("not json").is_err());
        assert!(parse_document("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_parse_rejects_keys_colliding_after_trim() {
        let json = r#"{"HPI_ALF_Alice": [], "HPI_ALF_Alice ": []}"#;
        let err = parse_document(json).unwrap_err();
        assert!(err.contains("duplicate key"));
    }

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert!(backend.load().unwrap().is_none());

        let doc = sample_doc();
        backend.save(&doc).unwrap();
        assert_eq!(backend.load().unwrap(), Some(doc));
    }

    #[test]
    fn test_memory_backend_fail_writes() {
        let backend = MemoryBackend::new();
        backend.set_fail_writes(true);
        let err = backend.save(&sample_doc()).unwrap_err();
        assert!(matches!(err, RaterError::Persistence { .. }));
        assert!(backend.contents().is_none());
    }

    #[test]
    fn test_memory_backend_corrupt_is_unavailable() {
        let backend = MemoryBackend::from_json("{ broken");
        let err = backend.load().unwrap_err();
        assert!(matches!(err, RaterError::DataUnavailable { .. }));
    }

    #[test]
    fn test_file_backend_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("ratings.json"));
        assert!(backend.load().unwrap().is_none());
    }

    #[test]
    fn test_file_backend_creates_parent_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ratings.json");
        let backend = JsonFileBackend::new(&path);

        let doc = sample_doc();
        backend.save(&doc).unwrap();
        assert!(path.exists());
        assert_eq!(backend.load().unwrap(), Some(doc));
    }

    #[test]
    fn test_file_backend_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        fs::write(&path, "{\"HPI_ALF_Alice\": 3}").unwrap();

        let err = JsonFileBackend::new(&path).load().unwrap_err();
        match err {
            RaterError::DataUnavailable { what, reason } => {
                assert_eq!(what, "rating store");
                assert!(reason.contains("corrupt"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_file_backend_save_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("data");
        fs::write(&blocker, "not a directory").unwrap();
        let path = blocker.join("ratings.json");

        let err = JsonFileBackend::new(&path).save(&sample_doc()).unwrap_err();
        match err {
            RaterError::Persistence { path: failed, .. } => assert_eq!(failed, path),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }

    #[test]
    fn test_file_backend_failed_save_keeps_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ratings.json");
        // A directory at the target path cannot be replaced by the renamed file
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep.txt"), "old").unwrap();

        let err = JsonFileBackend::new(&path).save(&sample_doc()).unwrap_err();
        assert!(matches!(err, RaterError::Persistence { .. }));
        assert_eq!(fs::read_to_string(path.join("keep.txt")).unwrap(), "old");
    }

    #[test]
    fn test_store_append_rolls_back_on_file_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("data");
        fs::write(&blocker, "").unwrap();
        let backend = JsonFileBackend::new(blocker.join("ratings.json"));

        let mut store = crate::ratings::RatingStore::open(Box::new(backend)).unwrap();
        let key = RatingKey::new("HPI", "ALF", "Alice Smith").unwrap();
        let err = store.append(key.clone(), 8, 9, 7).unwrap_err();
        assert!(matches!(err, RaterError::Persistence { .. }));
        assert!(store.get(&key).is_empty());
    }
}
