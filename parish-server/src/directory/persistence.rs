//! Persistence collaborators
//!
//! The store only needs `load`/`persist` over the whole collection. The JSON
//! file adapter is the production backend; [`MemoryPersistence`] backs tests.
//! A remote file-host adapter would implement the same trait.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use shared::models::Member;
use tempfile::NamedTempFile;

use super::error::PersistenceError;

/// Whole-collection storage backend
pub trait Persistence: Send + Sync {
    /// Read the persisted collection; a collection that was never written is empty.
    fn load(&self) -> Result<Vec<Member>, PersistenceError>;

    /// Replace the persisted collection.
    ///
    /// Either the full document is durably written or the previous one stays readable.
    fn persist(&self, members: &[Member]) -> Result<(), PersistenceError>;

    /// Human-readable location, for logs
    fn location(&self) -> String;
}

/// JSON array in a single file, replaced atomically (tmp file + rename)
#[derive(Debug, Clone)]
pub struct JsonFilePersistence {
    path: PathBuf,
}

impl JsonFilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        }
    }
}

/// 4-space indentation, the layout existing directory files already use
pub fn encode_document(members: &[Member]) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    members.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

impl Persistence for JsonFilePersistence {
    fn load(&self) -> Result<Vec<Member>, PersistenceError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Directory file absent, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| PersistenceError::format(&self.path, e))
    }

    fn persist(&self, members: &[Member]) -> Result<(), PersistenceError> {
        let dir = self.parent_dir();
        std::fs::create_dir_all(dir).map_err(|e| PersistenceError::io(dir, e))?;

        let document = encode_document(members).map_err(|e| PersistenceError::format(&self.path, e))?;

        // Temp file must live in the target directory for rename to be atomic
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PersistenceError::io(dir, e))?;
        tmp.write_all(&document)
            .map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| PersistenceError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| PersistenceError::io(&self.path, e.error))?;

        tracing::debug!(path = %self.path.display(), count = members.len(), "Directory persisted");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-process backend; holds the last persisted snapshot
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    members: Mutex<Option<Vec<Member>>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection (e.g. legacy records)
    pub fn with_members(members: Vec<Member>) -> Self {
        Self {
            members: Mutex::new(Some(members)),
        }
    }
}

impl Persistence for MemoryPersistence {
    fn load(&self) -> Result<Vec<Member>, PersistenceError> {
        Ok(self.members.lock().clone().unwrap_or_default())
    }

    fn persist(&self, members: &[Member]) -> Result<(), PersistenceError> {
        *self.members.lock() = Some(members.to_vec());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn member(id: i64, name: &str) -> Member {
        Member {
            id,
            name: name.to_string(),
            phone: "08000000000".to_string(),
            email: None,
            address: None,
            birthday: "01-01-2000".to_string(),
            photo: None,
            joined: None,
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFilePersistence::new(dir.path().join("members.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_blank_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.json");
        std::fs::write(&path, "  \n").unwrap();
        assert!(JsonFilePersistence::new(path).load().unwrap().is_empty());
    }

    #[test]
    fn test_persist_creates_parent_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/data/members.json");
        let store = JsonFilePersistence::new(&path);

        store.persist(&[member(1, "Ada"), member(2, "Ben")]).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "Ada");
        assert_eq!(loaded[1].id, 2);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {"));
    }

    #[test]
    fn test_persist_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.json");
        let store = JsonFilePersistence::new(&path);
        store.persist(&[member(1, "Ada")]).unwrap();
        store.persist(&[member(1, "Ada"), member(2, "Ben")]).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_malformed_document_is_format_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("members.json");
        std::fs::write(&path, "[{\"name\": ").unwrap();
        let err = JsonFilePersistence::new(path).load().unwrap_err();
        assert!(matches!(err, PersistenceError::Format { .. }));
    }

    #[test]
    fn test_memory_persistence_snapshot() {
        let store = MemoryPersistence::new();
        assert!(store.load().unwrap().is_empty());
        store.persist(&[member(5, "Eve")]).unwrap();
        assert_eq!(store.load().unwrap()[0].id, 5);
    }
}
