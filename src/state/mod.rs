//! Last-known public IP persistence.
//!
//! This module provides abstractions for storing and retrieving the
//! address observed by the previous check.

mod file;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use file::FileStateStore;

use std::io;

use thiserror::Error;

/// Result of loading state from persistent storage.
///
/// Explicitly models all valid states to avoid ambiguity:
/// - Successfully loaded a previous address
/// - No previous state exists (first run)
/// - State exists but is corrupted/unreadable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// The previously saved address.
    Loaded(String),

    /// No state file exists (first run or explicitly deleted).
    NotFound,

    /// State file exists but holds no usable address.
    /// Callers should report it and leave the file alone.
    Corrupted {
        /// Reason for corruption (for logging/debugging).
        reason: String,
    },
}

/// Errors that can occur during state persistence operations.
///
/// Only covers write-side errors; read-side issues are modeled
/// as [`LoadResult`] variants.
#[derive(Debug, Error)]
pub enum StateError {
    /// Failed to write the state file.
    #[error("Failed to write state file: {0}")]
    Write(#[source] io::Error),
}

/// Abstraction for persisting the last known IP between runs.
///
/// Implementations should:
/// - Overwrite the whole record on save (never append)
/// - Handle missing files gracefully (return `LoadResult::NotFound`)
/// - Report unreadable/empty state as `LoadResult::Corrupted`
pub trait StateStore {
    /// Loads the previously saved address.
    fn load(&self) -> LoadResult;

    /// Replaces the saved address with `ip`.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be written.
    fn save(&self, ip: &str) -> Result<(), StateError>;
}
