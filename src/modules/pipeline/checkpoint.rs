use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::log_warn;
use crate::shared::errors::AppResult;
use crate::shared::utils::durable;

/// Index of the last input line whose processing completed.
///
/// Stored as a single base-10 integer. Writes go through a sibling temp file
/// and a rename, and the directory is synced afterwards, so a crash leaves
/// either the old or the new value.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `None` when the file is absent or does not hold an index
    pub fn load(&self) -> AppResult<Option<usize>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match content.trim().parse::<usize>() {
            Ok(index) => Ok(Some(index)),
            Err(_) => {
                log_warn!(
                    "Ignoring malformed checkpoint {}: {:?}",
                    self.path.display(),
                    content.trim()
                );
                Ok(None)
            }
        }
    }

    /// First line index still to be processed
    pub fn resume_index(&self) -> AppResult<usize> {
        Ok(self.load()?.map_or(0, |last| last + 1))
    }

    pub fn save(&self, index: usize) -> AppResult<()> {
        durable::write_atomic(&self.path, index.to_string().as_bytes())?;
        Ok(())
    }

    pub fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    #[cfg(test)]
    fn temp_path(&self) -> PathBuf {
        durable::temp_path(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, CheckpointStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(dir.path().join("checkpoint.txt"));
        (dir, store)
    }

    #[test]
    fn absent_checkpoint_starts_at_zero() {
        let (_dir, store) = store();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.resume_index().unwrap(), 0);
    }

    #[test]
    fn saved_index_resumes_at_next_line() {
        let (_dir, store) = store();
        store.save(41).unwrap();
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "41");
        assert_eq!(store.resume_index().unwrap(), 42);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn save_overwrites_previous_index() {
        let (_dir, store) = store();
        store.save(0).unwrap();
        store.save(7).unwrap();
        assert_eq!(store.load().unwrap(), Some(7));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn malformed_checkpoint_is_treated_as_absent() {
        let (_dir, store) = store();
        fs::write(store.path(), "not a number").unwrap();
        assert_eq!(store.resume_index().unwrap(), 0);
    }

    #[test]
    fn clear_is_idempotent() {
        let (_dir, store) = store();
        store.save(3).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.path().exists());
    }
}
