//! Device-local starred exercises
//!
//! The starred set is a list of slugs kept on the reader's machine, never on
//! the server. It is persisted as a JSON array of slugs.

use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Storage key / file stem for the starred set
pub const STARRED_KEY: &str = "starred_exercises";

/// Where the starred slug set lives
pub trait StarredStore {
    fn load(&self) -> Result<BTreeSet<String>>;
    fn save(&self, slugs: &BTreeSet<String>) -> Result<()>;
}

/// JSON file store (`<dir>/starred_exercises.json`)
#[derive(Debug, Clone)]
pub struct JsonFileStarredStore {
    path: PathBuf,
}

impl JsonFileStarredStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{}.json", STARRED_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StarredStore for JsonFileStarredStore {
    fn load(&self) -> Result<BTreeSet<String>> {
        if !self.path.exists() {
            debug!("No starred file at {}", self.path.display());
            return Ok(BTreeSet::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeSet::new());
        }
        let slugs: Vec<String> = serde_json::from_str(&content)?;
        Ok(slugs.into_iter().collect())
    }

    fn save(&self, slugs: &BTreeSet<String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let list: Vec<&String> = slugs.iter().collect();
        fs::write(&self.path, serde_json::to_string(&list)?)?;
        Ok(())
    }
}

/// Volatile store, for tests and one-shot sessions
#[derive(Debug, Default)]
pub struct MemoryStarredStore {
    slugs: Mutex<BTreeSet<String>>,
}

fn poisoned<T>(_: T) -> Error {
    Error::Internal("starred store lock poisoned".to_string())
}

impl StarredStore for MemoryStarredStore {
    fn load(&self) -> Result<BTreeSet<String>> {
        Ok(self.slugs.lock().map_err(poisoned)?.clone())
    }

    fn save(&self, slugs: &BTreeSet<String>) -> Result<()> {
        *self.slugs.lock().map_err(poisoned)? = slugs.clone();
        Ok(())
    }
}

/// Starred slugs plus the store they persist to
#[derive(Debug)]
pub struct StarredSet<S: StarredStore> {
    store: S,
    slugs: BTreeSet<String>,
}

impl<S: StarredStore> StarredSet<S> {
    pub fn open(store: S) -> Result<Self> {
        let slugs = store.load()?;
        Ok(Self { store, slugs })
    }

    /// Flip a slug's starred state and persist; returns the new state
    ///
    /// The in-memory set only changes once the store has accepted it.
    pub fn toggle(&mut self, slug: &str) -> Result<bool> {
        let mut next = self.slugs.clone();
        let now_starred = if next.remove(slug) {
            false
        } else {
            next.insert(slug.to_string());
            true
        };
        self.store.save(&next)?;
        self.slugs = next;
        Ok(now_starred)
    }

    pub fn is_starred(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    pub fn slugs(&self) -> &BTreeSet<String> {
        &self.slugs
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}
