//! # Ignore Store
//!
//! The durable list of authors who asked the bot to leave them alone.
//! The in-memory set is authoritative; the YAML file (`~/.vierzehn/ignore.yaml`)
//! is rewritten in full, atomically, whenever the set changes.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::strings::logs;

#[derive(Debug, Error)]
pub enum IgnoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize ignore list: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

#[derive(Debug)]
pub struct IgnoreStore {
    path: PathBuf,
    users: BTreeSet<String>,
}

impl IgnoreStore {
    /// Loads the ignore list from `path`. Never fails: a missing file is created
    /// empty, unreadable or malformed content yields an empty list.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let users = if path.exists() {
            read_users(&path)
        } else {
            tracing::debug!("{}", logs::ignore_file_created(&path.display().to_string()));
            if let Err(e) = create_empty(&path) {
                tracing::warn!(
                    "{}",
                    logs::ignore_file_unreadable(&path.display().to_string(), &e.to_string())
                );
            }
            BTreeSet::new()
        };
        Self { path, users }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains(&self, user: &str) -> bool {
        self.users.contains(user)
    }

    /// Adds `user` and rewrites the file. Returns `Ok(false)` if the user was already ignored.
    /// On a persist error the user stays ignored in memory.
    pub fn add(&mut self, user: &str) -> Result<bool, IgnoreError> {
        if !self.users.insert(user.to_string()) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Writes the whole set to a temp file next to the target, then renames it into place.
    pub fn persist(&self) -> Result<(), IgnoreError> {
        let content = serde_yaml::to_string(&self.users)?;
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let io_err = |source: std::io::Error| IgnoreError::Io {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(&dir).map_err(io_err)?;
        let mut tmp = NamedTempFile::new_in(&dir).map_err(io_err)?;
        tmp.write_all(content.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }
}

fn create_empty(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::File::create(path)?;
    Ok(())
}

fn read_users(path: &Path) -> BTreeSet<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(
                "{}",
                logs::ignore_file_unreadable(&path.display().to_string(), &e.to_string())
            );
            return BTreeSet::new();
        }
    };
    if content.trim().is_empty() {
        return BTreeSet::new();
    }
    match serde_yaml::from_str::<Option<Vec<String>>>(&content) {
        Ok(users) => users.unwrap_or_default().into_iter().collect(),
        Err(e) => {
            tracing::warn!(
                "{}",
                logs::ignore_file_unreadable(&path.display().to_string(), &e.to_string())
            );
            BTreeSet::new()
        }
    }
}
