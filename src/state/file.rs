//! File-based state persistence implementation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{LoadResult, StateError, StateStore};

/// File-based implementation of [`StateStore`].
///
/// The file is plain text holding the address on its first line, with no
/// trailing newline.
///
/// # Atomic Writes
///
/// Uses write-to-temp-then-rename pattern to prevent corruption:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
///
/// Two checks running at the same time can still race on the rename; the
/// scheduler is expected to serialize runs.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    path: PathBuf,
}

impl FileStateStore {
    /// Creates a new file-based state store at the given path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the state file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for FileStateStore {
    fn load(&self) -> LoadResult {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadResult::NotFound,
            Err(e) => {
                return LoadResult::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                };
            }
        };

        match content.lines().next().map(str::trim) {
            Some(ip) if !ip.is_empty() => LoadResult::Loaded(ip.to_string()),
            _ => LoadResult::Corrupted {
                reason: "State file is empty".to_string(),
            },
        }
    }

    fn save(&self, ip: &str) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StateError::Write)?;
            }
        }

        // Append .tmp instead of replacing the extension (ip.log -> ip.log.tmp)
        let temp_path = PathBuf::from(format!("{}.tmp", self.path.display()));

        std::fs::write(&temp_path, ip.trim()).map_err(StateError::Write)?;
        std::fs::rename(&temp_path, &self.path).map_err(StateError::Write)?;

        Ok(())
    }
}
