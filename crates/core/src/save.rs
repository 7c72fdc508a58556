//! Save-game persistence.

use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use tempfile::NamedTempFile;

/// Directory under `~/.config` used for the saved session.
pub const DEFAULT_SAVE_DIR: &str = "banker";

/// File name of the saved session inside [`DEFAULT_SAVE_DIR`].
pub const DEFAULT_SAVE_FILE: &str = "session.json";

/// Durable home for one serialized session.
///
/// Implementations treat the payload as opaque bytes; encoding is the
/// caller's business.
pub trait SessionStore {
    /// Replace whatever is stored with `bytes`.
    fn save(&self, bytes: &[u8]) -> Result<()>;

    /// Stored bytes, or `None` when nothing has been saved.
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Remove the stored session, if any.
    fn clear(&self) -> Result<()>;

    /// Human readable location, used in log lines.
    fn describe(&self) -> String;
}

/// Stores the session as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_SAVE_DIR)
            .join(DEFAULT_SAVE_FILE)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileStore {
    fn save(&self, bytes: &[u8]) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;

        // Staged beside the target so the rename stays on one filesystem.
        let mut staged = NamedTempFile::new_in(&parent)
            .with_context(|| format!("failed to stage save in {}", parent.display()))?;
        staged
            .write_all(bytes)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        staged
            .persist(&self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("failed to remove {}", self.path.display()))
            }
        }
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps the session in memory. Used by tests and throwaway games.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `bytes`.
    pub fn with_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            slot: Mutex::new(Some(bytes.into())),
        }
    }
}

impl SessionStore for MemoryStore {
    fn save(&self, bytes: &[u8]) -> Result<()> {
        *self.slot.lock() = Some(bytes.to_vec());
        Ok(())
    }

    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.slot.lock().clone())
    }

    fn clear(&self) -> Result<()> {
        self.slot.lock().take();
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_store_round_trip() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path().join("nested").join("session.json"));
        assert_eq!(store.load()?, None);

        store.save(br#"{"players":[]}"#)?;
        assert!(store.path().exists());
        assert_eq!(store.load()?.as_deref(), Some(&br#"{"players":[]}"#[..]));

        store.save(b"{}")?;
        assert_eq!(store.load()?.as_deref(), Some(&b"{}"[..]));

        store.clear()?;
        assert!(!store.path().exists());
        assert_eq!(store.load()?, None);
        store.clear()?;
        Ok(())
    }

    #[test]
    fn memory_store_round_trip() -> Result<()> {
        let store = MemoryStore::with_bytes(b"seed".to_vec());
        assert_eq!(store.load()?, Some(b"seed".to_vec()));
        store.save(b"next")?;
        assert_eq!(store.load()?, Some(b"next".to_vec()));
        store.clear()?;
        assert_eq!(store.load()?, None);
        assert_eq!(store.describe(), "memory");
        Ok(())
    }

    #[test]
    fn default_path_ends_with_session_file() {
        let path = FileStore::default_path();
        assert!(path.ends_with(Path::new(DEFAULT_SAVE_DIR).join(DEFAULT_SAVE_FILE)));
    }
}
