//! Persistent author directory.
//!
//! Maps sender identifiers (phone numbers) to display names. The mapping
//! is loaded from a JSON key-value file at session start and flushed as a
//! single rewrite at session end, so an interrupted run loses only the
//! current session's additions.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, NameSource, Result};

/// Identifier→display-name cache backed by a JSON file.
#[derive(Debug)]
pub struct AuthorDirectory {
    path: PathBuf,
    entries: HashMap<String, String>,
    dirty: bool,
}

impl AuthorDirectory {
    /// Loads the directory, treating a missing file as empty.
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read or parsed.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        let entries = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                AppError::io(format!("Failed to read {}", path.display()), e)
            })?;
            serde_json::from_str(&content).map_err(AppError::json_parse)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    /// Resolves an identifier to a display name, asking the injected
    /// `NameSource` for identifiers not yet in the directory.
    ///
    /// # Errors
    /// Returns error if the name source fails.
    pub fn resolve(&mut self, identifier: &str, source: &mut dyn NameSource) -> Result<String> {
        let key = normalize(identifier);

        if let Some(name) = self.entries.get(key) {
            return Ok(name.clone());
        }

        let name = source.name_for(key)?;
        self.entries.insert(key.to_string(), name.clone());
        self.dirty = true;

        Ok(name)
    }

    /// Flushes the directory back to disk in one rewrite. A session that
    /// added nothing leaves the file untouched.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub fn save(&self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }

        let content = serde_json::to_string_pretty(&self.entries).map_err(AppError::json_parse)?;
        fs::write(&self.path, content)
            .map_err(|e| AppError::io(format!("Failed to write {}", self.path.display()), e))?;

        tracing::info!(path = %self.path.display(), "Author directory saved");

        Ok(())
    }

    /// Number of known identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the directory has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Normalizes an identifier so the same physical sender never produces
/// two directory entries.
fn normalize(identifier: &str) -> &str {
    identifier.trim_start_matches('+')
}
