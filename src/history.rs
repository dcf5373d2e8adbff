//! Capped, persisted most-recently-used lists (search keywords and the like).
//!
//! Storage goes through [`HistoryStore`]: [`FileStore`] keeps one JSON file per
//! key in the platform data directory, [`MemoryStore`] is for tests. Nothing
//! here ever returns an error to the caller; unreadable data loads as empty and
//! failed writes are logged and dropped.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::constants::constants;

/// Keyed text storage backing a history cache.
pub trait HistoryStore: Send + Sync {
  fn get(&self, key: &str) -> Option<String>;
  fn set(&self, key: &str, text: &str) -> Result<()>;
}

/// One `<key>.json` file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  /// Store under the platform data directory, e.g. `~/.local/share/hubsearch/history`.
  pub fn in_data_dir() -> Option<Self> {
    ProjectDirs::from("", "", "hubsearch").map(|p| Self::new(p.data_dir().join("history")))
  }

  fn path(&self, key: &str) -> PathBuf {
    let safe: String = key.chars().map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' }).collect();
    self.dir.join(format!("{safe}.json"))
  }
}

impl HistoryStore for FileStore {
  fn get(&self, key: &str) -> Option<String> {
    std::fs::read_to_string(self.path(key)).ok()
  }

  fn set(&self, key: &str, text: &str) -> Result<()> {
    std::fs::create_dir_all(&self.dir).with_context(|| format!("Failed to create {}", self.dir.display()))?;
    let path = self.path(key);
    std::fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))
  }
}

/// In-process store; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl HistoryStore for MemoryStore {
  fn get(&self, key: &str) -> Option<String> {
    self.entries.lock().ok()?.get(key).cloned()
  }

  fn set(&self, key: &str, text: &str) -> Result<()> {
    let mut entries = self.entries.lock().map_err(|_| anyhow::anyhow!("history store poisoned"))?;
    entries.insert(key.to_string(), text.to_string());
    Ok(())
  }
}

type Validator = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// A capped list persisted as JSON under one key.
///
/// Loaded once in [`HistoryCache::open`]; afterwards the in-memory copy is the
/// source of truth and storage is only written.
pub struct HistoryCache<T> {
  key: String,
  limit: usize,
  store: Arc<dyn HistoryStore>,
  validator: Option<Validator>,
  entries: Vec<T>,
}

impl<T: Serialize + DeserializeOwned + PartialEq> HistoryCache<T> {
  pub fn open(store: Arc<dyn HistoryStore>, key: &str) -> Self {
    Self::builder(store, key).build()
  }

  pub fn builder(store: Arc<dyn HistoryStore>, key: &str) -> HistoryCacheBuilder<T> {
    HistoryCacheBuilder {
      key: key.to_string(),
      limit: constants().history_limit,
      store,
      validator: None,
      _entries: std::marker::PhantomData,
    }
  }

  pub fn entries(&self) -> &[T] {
    &self.entries
  }

  pub fn limit(&self) -> usize {
    self.limit
  }

  /// Read and decode the persisted list. Anything unreadable is an empty list.
  pub fn load(&self) -> Vec<T> {
    let Some(raw) = self.store.get(&self.key) else { return Vec::new() };
    if raw.trim().is_empty() {
      return Vec::new();
    }
    let parsed: Value = match serde_json::from_str(&raw) {
      Ok(v) => v,
      Err(e) => {
        debug!(key = %self.key, err = %e, "history: unparsable, treating as empty");
        return Vec::new();
      }
    };
    if let Some(ref valid) = self.validator
      && !valid(&parsed)
    {
      debug!(key = %self.key, "history: rejected by validator");
      return Vec::new();
    }
    if !parsed.is_array() {
      debug!(key = %self.key, "history: not an array, treating as empty");
      return Vec::new();
    }
    serde_json::from_value(parsed).unwrap_or_else(|e| {
      debug!(key = %self.key, err = %e, "history: wrong element shape, treating as empty");
      Vec::new()
    })
  }

  /// Keep the first `limit` entries of `next` and persist them.
  pub fn save(&mut self, mut next: Vec<T>) {
    next.truncate(self.limit);
    self.entries = next;
    let text = match serde_json::to_string(&self.entries) {
      Ok(t) => t,
      Err(e) => {
        warn!(key = %self.key, err = %e, "history: encode failed");
        return;
      }
    };
    if let Err(e) = self.store.set(&self.key, &text) {
      warn!(key = %self.key, err = %format!("{e:#}"), "history: persist failed");
    }
  }

  pub fn clear(&mut self) {
    self.save(Vec::new());
  }

  /// Move `entry` to the front (dropping any equal entry) and persist.
  pub fn push(&mut self, entry: T) {
    let mut rest = std::mem::take(&mut self.entries);
    rest.retain(|e| *e != entry);
    let mut next = Vec::with_capacity(rest.len() + 1);
    next.push(entry);
    next.extend(rest);
    self.save(next);
  }
}

pub struct HistoryCacheBuilder<T> {
  key: String,
  limit: usize,
  store: Arc<dyn HistoryStore>,
  validator: Option<Validator>,
  _entries: std::marker::PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned + PartialEq> HistoryCacheBuilder<T> {
  pub fn limit(mut self, limit: usize) -> Self {
    self.limit = limit;
    self
  }

  /// Reject persisted values that fail `valid` before decoding.
  pub fn validator(mut self, valid: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
    self.validator = Some(Box::new(valid));
    self
  }

  pub fn build(self) -> HistoryCache<T> {
    let mut cache =
      HistoryCache { key: self.key, limit: self.limit, store: self.store, validator: self.validator, entries: Vec::new() };
    cache.entries = cache.load();
    cache
  }
}
