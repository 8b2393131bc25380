use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::write_text_atomic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::LevelRecord;

pub(crate) const STORE_FILE_NAME: &str = "levels.json";
pub(crate) const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;
const STORE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("read level store '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write level store '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encode level store json: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("parse level store '{path}' at {location}: {message}")]
    Decode {
        path: PathBuf,
        location: String,
        message: String,
    },
    #[error("level store quota exceeded: {size} bytes exceeds limit of {limit} bytes")]
    QuotaExceeded { size: usize, limit: usize },
    #[error("unsupported level store version: expected {expected}, got {found}")]
    UnsupportedVersion { expected: u32, found: u32 },
}

/// Name-keyed level persistence plus the single "last used" slot.
///
/// Implementations must leave their visible state unchanged when a mutation returns an error.
pub(crate) trait LevelRepository {
    fn get(&self, name: &str) -> Result<Option<LevelRecord>, StorageError>;
    fn put(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError>;
    /// Stores `record` and marks `name` last used as one mutation: either both land or neither.
    fn put_as_last_used(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError>;
    fn list(&self) -> Result<Vec<String>, StorageError>;
    /// Returns whether a record existed under `name`.
    fn delete(&mut self, name: &str) -> Result<bool, StorageError>;
    fn last_used(&self) -> Result<Option<String>, StorageError>;
    fn set_last_used(&mut self, name: &str) -> Result<(), StorageError>;
}

impl<R: LevelRepository + ?Sized> LevelRepository for Box<R> {
    fn get(&self, name: &str) -> Result<Option<LevelRecord>, StorageError> {
        (**self).get(name)
    }

    fn put(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError> {
        (**self).put(name, record)
    }

    fn put_as_last_used(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError> {
        (**self).put_as_last_used(name, record)
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        (**self).list()
    }

    fn delete(&mut self, name: &str) -> Result<bool, StorageError> {
        (**self).delete(name)
    }

    fn last_used(&self) -> Result<Option<String>, StorageError> {
        (**self).last_used()
    }

    fn set_last_used(&mut self, name: &str) -> Result<(), StorageError> {
        (**self).set_last_used(name)
    }
}

#[derive(Debug, Default)]
pub(crate) struct MemoryLevelRepository {
    levels: BTreeMap<String, LevelRecord>,
    last_used: Option<String>,
}

impl LevelRepository for MemoryLevelRepository {
    fn get(&self, name: &str) -> Result<Option<LevelRecord>, StorageError> {
        Ok(self.levels.get(name).cloned())
    }

    fn put(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError> {
        self.levels.insert(name.to_string(), record);
        Ok(())
    }

    fn put_as_last_used(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError> {
        self.levels.insert(name.to_string(), record);
        self.last_used = Some(name.to_string());
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.levels.keys().cloned().collect())
    }

    fn delete(&mut self, name: &str) -> Result<bool, StorageError> {
        Ok(self.levels.remove(name).is_some())
    }

    fn last_used(&self) -> Result<Option<String>, StorageError> {
        Ok(self.last_used.clone())
    }

    fn set_last_used(&mut self, name: &str) -> Result<(), StorageError> {
        self.last_used = Some(name.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    version: u32,
    #[serde(default)]
    levels: BTreeMap<String, LevelRecord>,
    #[serde(default)]
    last_used: Option<String>,
}

impl StoreDocument {
    fn empty() -> Self {
        Self {
            version: STORE_VERSION,
            levels: BTreeMap::new(),
            last_used: None,
        }
    }
}

/// Single JSON document on disk. Every mutation rewrites the whole file atomically and only
/// updates the cached copy once the write succeeded.
#[derive(Debug)]
pub(crate) struct FileLevelRepository {
    path: PathBuf,
    quota_bytes: usize,
    document: StoreDocument,
}

impl FileLevelRepository {
    pub(crate) fn open(dir: &Path) -> Result<Self, StorageError> {
        Self::open_with_quota(dir, DEFAULT_QUOTA_BYTES)
    }

    pub(crate) fn open_with_quota(dir: &Path, quota_bytes: usize) -> Result<Self, StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(STORE_FILE_NAME);
        let document = match fs::read_to_string(&path) {
            Ok(raw) => parse_store_document(&path, &raw)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => StoreDocument::empty(),
            Err(source) => return Err(StorageError::Read { path, source }),
        };
        Ok(Self {
            path,
            quota_bytes,
            document,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&mut self, next: StoreDocument) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(&next).map_err(StorageError::Encode)?;
        if json.len() > self.quota_bytes {
            return Err(StorageError::QuotaExceeded {
                size: json.len(),
                limit: self.quota_bytes,
            });
        }
        write_text_atomic(&self.path, &json).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })?;
        self.document = next;
        Ok(())
    }
}

impl LevelRepository for FileLevelRepository {
    fn get(&self, name: &str) -> Result<Option<LevelRecord>, StorageError> {
        Ok(self.document.levels.get(name).cloned())
    }

    fn put(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError> {
        let mut next = self.document.clone();
        next.levels.insert(name.to_string(), record);
        self.commit(next)
    }

    fn put_as_last_used(&mut self, name: &str, record: LevelRecord) -> Result<(), StorageError> {
        let mut next = self.document.clone();
        next.levels.insert(name.to_string(), record);
        next.last_used = Some(name.to_string());
        self.commit(next)
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.document.levels.keys().cloned().collect())
    }

    fn delete(&mut self, name: &str) -> Result<bool, StorageError> {
        if !self.document.levels.contains_key(name) {
            return Ok(false);
        }
        let mut next = self.document.clone();
        next.levels.remove(name);
        self.commit(next)?;
        Ok(true)
    }

    fn last_used(&self) -> Result<Option<String>, StorageError> {
        Ok(self.document.last_used.clone())
    }

    fn set_last_used(&mut self, name: &str) -> Result<(), StorageError> {
        if self.document.last_used.as_deref() == Some(name) {
            return Ok(());
        }
        let mut next = self.document.clone();
        next.last_used = Some(name.to_string());
        self.commit(next)
    }
}

fn parse_store_document(path: &Path, raw: &str) -> Result<StoreDocument, StorageError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let document = serde_path_to_error::deserialize::<_, StoreDocument>(&mut deserializer)
        .map_err(|error| {
            let location = error.path().to_string();
            StorageError::Decode {
                path: path.to_path_buf(),
                location: if location.is_empty() {
                    ".".to_string()
                } else {
                    location
                },
                message: error.into_inner().to_string(),
            }
        })?;
    if document.version != STORE_VERSION {
        return Err(StorageError::UnsupportedVersion {
            expected: STORE_VERSION,
            found: document.version,
        });
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::record::{EntityRecord, SavedVec2};
    use super::*;

    fn level(name: &str, entity_count: usize) -> LevelRecord {
        LevelRecord {
            name: name.to_string(),
            entities: (0..entity_count)
                .map(|index| EntityRecord {
                    kind: Some("star".to_string()),
                    x: Some(index as f32),
                    y: Some(0.0),
                    collected: Some(false),
                    ..EntityRecord::default()
                })
                .collect(),
            start_position: SavedVec2 { x: 1.0, y: 2.0 },
        }
    }

    #[test]
    fn memory_repository_put_get_delete() {
        let mut repo = MemoryLevelRepository::default();
        repo.put("b", level("b", 1)).expect("put");
        repo.put("a", level("a", 2)).expect("put");

        assert_eq!(repo.list().expect("list"), vec!["a", "b"]);
        assert_eq!(repo.get("a").expect("get").map(|l| l.entities.len()), Some(2));
        assert!(repo.delete("a").expect("delete"));
        assert!(!repo.delete("a").expect("delete again"));
        assert!(repo.get("a").expect("get").is_none());
    }

    #[test]
    fn file_repository_persists_across_reopen() {
        let dir = TempDir::new().expect("tempdir");
        {
            let mut repo = FileLevelRepository::open(dir.path()).expect("open");
            repo.put("First", level("First", 3)).expect("put");
            repo.set_last_used("First").expect("last used");
        }

        let repo = FileLevelRepository::open(dir.path()).expect("reopen");

        assert_eq!(repo.list().expect("list"), vec!["First"]);
        assert_eq!(repo.get("First").expect("get"), Some(level("First", 3)));
        assert_eq!(repo.last_used().expect("last used"), Some("First".to_string()));
        let raw = fs::read_to_string(repo.path()).expect("read");
        assert!(raw.contains("\"lastUsed\""));
        assert!(raw.contains("\"startPosition\""));
    }

    #[test]
    fn quota_rejection_leaves_store_unchanged() {
        let dir = TempDir::new().expect("tempdir");
        let mut repo = FileLevelRepository::open_with_quota(dir.path(), 600).expect("open");
        repo.put("small", level("small", 1)).expect("small put");

        let error = repo
            .put("huge", level("huge", 50))
            .expect_err("quota should reject");

        assert!(matches!(error, StorageError::QuotaExceeded { limit: 600, .. }));
        assert_eq!(repo.list().expect("list"), vec!["small"]);
        let reopened = FileLevelRepository::open(dir.path()).expect("reopen");
        assert_eq!(reopened.list().expect("list"), vec!["small"]);
    }

    #[test]
    fn decode_error_reports_json_path() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join(STORE_FILE_NAME),
            r#"{"version":1,"levels":{"L":{"name":"L","entities":[],"startPosition":{"x":"left","y":0}}}}"#,
        )
        .expect("seed");

        let error = FileLevelRepository::open(dir.path()).expect_err("decode should fail");

        match error {
            StorageError::Decode { location, .. } => {
                assert_eq!(location, "levels.L.startPosition.x");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_entity_does_not_hide_other_levels() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            dir.path().join(STORE_FILE_NAME),
            r#"{"version":1,"levels":{
                "Good":{"name":"Good","entities":[{"type":"star","x":1,"y":2}],"startPosition":{"x":0,"y":0}},
                "Bad":{"name":"Bad","entities":[{"type":"star","x":1,"y":2},{"type":"star","x":null,"y":2}],"startPosition":{"x":0,"y":0}}
            },"lastUsed":"Bad"}"#,
        )
        .expect("seed");

        let repo = FileLevelRepository::open(dir.path()).expect("open");

        assert_eq!(repo.list().expect("list"), vec!["Bad", "Good"]);
        let good = repo.get("Good").expect("get").expect("good level");
        assert_eq!(good.entities.len(), 1);
        let bad = repo.get("Bad").expect("get").expect("bad level");
        assert_eq!(bad.entities[1].x, None);
    }

    #[test]
    fn future_version_is_rejected() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join(STORE_FILE_NAME), r#"{"version":9}"#).expect("seed");

        let error = FileLevelRepository::open(dir.path()).expect_err("version should fail");

        assert!(matches!(
            error,
            StorageError::UnsupportedVersion {
                expected: 1,
                found: 9
            }
        ));
    }

    #[test]
    fn boxed_repository_delegates() {
        let mut repo: Box<dyn LevelRepository> = Box::new(MemoryLevelRepository::default());
        repo.put("x", level("x", 0)).expect("put");
        repo.set_last_used("x").expect("last used");
        assert_eq!(repo.last_used().expect("last used"), Some("x".to_string()));
    }
}
