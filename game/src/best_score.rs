use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::settings::config_dir;

pub const BEST_SCORE_KEY: &str = "bestScore";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("score file i/o: {0}")]
    Io(#[from] io::Error),
    #[error("score file encoding: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Small persistent key/value store for scores.
pub trait BestScoreStore {
    /// Stored value, or 0 when the key was never written.
    fn get(&self, key: &str) -> u64;

    fn set(&mut self, key: &str, value: u64) -> Result<(), StoreError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, u64>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl BestScoreStore for MemoryStore {
    fn get(&self, key: &str) -> u64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.writes += 1;
        Ok(())
    }
}

/// Scores kept as a flat JSON object, e.g. `{"bestScore": 12}`.
///
/// The file is read once when the store is opened and rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, u64>,
}

impl JsonFileStore {
    /// A missing or corrupt file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|err| {
                log::warn!("ignoring invalid score file {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    /// `RUNNER_SCORES_PATH`, else `scores.json` in the config directory.
    pub fn from_env() -> Self {
        match std::env::var_os("RUNNER_SCORES_PATH") {
            Some(explicit) => Self::open(explicit),
            None => Self::open(config_dir().join("scores.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text)?;
        Ok(())
    }
}

impl BestScoreStore for JsonFileStore {
    fn get(&self, key: &str) -> u64 {
        self.values.get(key).copied().unwrap_or(0)
    }

    fn set(&mut self, key: &str, value: u64) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("gesture-runner-scores-{}-{name}", std::process::id()))
            .join("scores.json")
    }

    #[test]
    fn absent_key_reads_as_zero() {
        assert_eq!(MemoryStore::new().get(BEST_SCORE_KEY), 0);
        assert_eq!(JsonFileStore::open(temp_path("absent")).get(BEST_SCORE_KEY), 0);
    }

    #[test]
    fn file_store_survives_reopen() {
        let path = temp_path("reopen");
        let mut store = JsonFileStore::open(&path);
        store.set(BEST_SCORE_KEY, 12).unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get(BEST_SCORE_KEY), 12);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "[1, 2").unwrap();

        assert_eq!(JsonFileStore::open(&path).get(BEST_SCORE_KEY), 0);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn unwritable_path_reports_an_error() {
        let dir = temp_path("blocked");
        let parent = dir.parent().unwrap().to_path_buf();
        fs::create_dir_all(&parent).unwrap();
        // A directory where the file should go makes the write fail.
        fs::create_dir_all(&dir).unwrap();

        let mut store = JsonFileStore::open(&dir);
        assert!(matches!(store.set(BEST_SCORE_KEY, 3), Err(StoreError::Io(_))));
        let _ = fs::remove_dir_all(parent);
    }
}
