//! Photo Store
//!
//! Out-of-band storage for member photos. The directory only keeps a
//! reference (`<sha256>.<ext>`); identical uploads share one file. A
//! reference whose file is gone is treated as "no photo" by callers.
//! Older documents store `photos/<name>`; only the final file name is
//! looked up inside the photo directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error("Empty file provided")]
    Empty,

    #[error("File too large ({0} bytes, max {MAX_FILE_SIZE})")]
    TooLarge(usize),

    #[error("Unsupported file format '{0}'. Supported: png, jpg, jpeg")]
    UnsupportedFormat(String),

    #[error("Invalid photo reference: {0}")]
    InvalidReference(String),

    #[error("Photo I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Photo storage collaborator
pub trait PhotoStore: Send + Sync + std::fmt::Debug {
    /// Store `bytes`; the extension of `suggested_name` picks the format
    fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, PhotoError>;

    fn exists(&self, reference: &str) -> bool;

    /// Stored bytes, `None` when the reference dangles
    fn read(&self, reference: &str) -> Result<Option<Vec<u8>>, PhotoError>;

    /// Removing a missing photo is not an error
    fn delete(&self, reference: &str) -> Result<(), PhotoError>;
}

/// Photos as files in one directory
#[derive(Debug, Clone)]
pub struct LocalPhotoStore {
    photos_dir: PathBuf,
}

impl LocalPhotoStore {
    pub fn new(photos_dir: impl Into<PathBuf>) -> Self {
        Self {
            photos_dir: photos_dir.into(),
        }
    }

    /// File path for a reference, rejecting anything that could escape the directory
    pub fn resolve(&self, reference: &str) -> Result<PathBuf, PhotoError> {
        let name = stored_file_name(reference)
            .ok_or_else(|| PhotoError::InvalidReference(reference.to_string()))?;
        Ok(self.photos_dir.join(name))
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// File name a reference points at inside the photo directory.
///
/// `photos/face.jpg` and `face.jpg` name the same file. Absolute paths,
/// drive prefixes and `..` components yield `None`.
pub fn stored_file_name(reference: &str) -> Option<&str> {
    if reference.is_empty()
        || reference.starts_with(is_separator)
        || reference.contains(':')
    {
        return None;
    }
    if reference.split(is_separator).any(|part| part == "..") {
        return None;
    }
    let name = reference.rsplit(is_separator).next()?;
    (!name.is_empty() && name != ".").then_some(name)
}

/// Lowercased extension, normalising `jpeg` to `jpg`
fn photo_extension(suggested_name: &str) -> Result<String, PhotoError> {
    let ext = Path::new(suggested_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(PhotoError::UnsupportedFormat(ext));
    }
    Ok(if ext == "jpeg" { "jpg".to_string() } else { ext })
}

fn calculate_hash(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

impl PhotoStore for LocalPhotoStore {
    fn store(&self, bytes: &[u8], suggested_name: &str) -> Result<String, PhotoError> {
        if bytes.is_empty() {
            return Err(PhotoError::Empty);
        }
        if bytes.len() > MAX_FILE_SIZE {
            return Err(PhotoError::TooLarge(bytes.len()));
        }
        let ext = photo_extension(suggested_name)?;

        let reference = format!("{}.{}", calculate_hash(bytes), ext);
        let file_path = self.resolve(&reference)?;
        if file_path.exists() {
            tracing::debug!(reference = %reference, "Duplicate photo, reusing stored file");
            return Ok(reference);
        }

        std::fs::create_dir_all(&self.photos_dir)?;

        // Atomic write: uniquely named tmp file + rename. Concurrent uploads of
        // the same image each publish a complete copy of identical bytes.
        let mut tmp = NamedTempFile::new_in(&self.photos_dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        if let Err(e) = tmp.persist(&file_path) {
            if file_path.is_file() {
                tracing::debug!(
                    reference = %reference,
                    "Photo stored concurrently, reusing it"
                );
                return Ok(reference);
            }
            return Err(e.error.into());
        }

        tracing::info!(
            original_name = %suggested_name,
            reference = %reference,
            size = bytes.len(),
            "Photo stored"
        );
        Ok(reference)
    }

    fn exists(&self, reference: &str) -> bool {
        self.resolve(reference).map(|p| p.is_file()).unwrap_or(false)
    }

    fn read(&self, reference: &str) -> Result<Option<Vec<u8>>, PhotoError> {
        let path = self.resolve(reference)?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, reference: &str) -> Result<(), PhotoError> {
        let path = self.resolve(reference)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(reference = %reference, "Photo deleted");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
