//! Best score / best level records
//!
//! Two scalar slots stored as decimal strings (LocalStorage on web). Reads that are
//! missing or not a finite number fall back to defaults.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const BEST_LEVEL_KEY: &str = "warpspot.bestLevel";
pub const BEST_SCORE_KEY: &str = "warpspot.bestScore";

pub const DEFAULT_BEST_LEVEL: u32 = 1;
pub const DEFAULT_BEST_SCORE: u64 = 0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage is not available")]
    Unavailable,
    #[error("failed to write {key}: {message}")]
    Write { key: String, message: String },
}

/// Named string slots (get/set), the only persistence the game needs
pub trait BestStatsStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store for native runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, key: &str, value: &str) -> Self {
        self.slots.insert(key.to_string(), value.to_string());
        self
    }
}

impl BestStatsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read a slot as a number, `fallback` when missing or not finite
fn read_number(store: &impl BestStatsStore, key: &str, fallback: f64) -> f64 {
    store
        .get(key)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .unwrap_or(fallback)
}

/// Persisted records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestStats {
    pub best_score: u64,
    pub best_level: u32,
}

impl Default for BestStats {
    fn default() -> Self {
        Self {
            best_score: DEFAULT_BEST_SCORE,
            best_level: DEFAULT_BEST_LEVEL,
        }
    }
}

impl BestStats {
    /// Read both records. Fractions are floored; negative scores read as 0 and
    /// levels never go below 1, the level every run starts at.
    pub fn load(store: &impl BestStatsStore) -> Self {
        let best_score = read_number(store, BEST_SCORE_KEY, DEFAULT_BEST_SCORE as f64);
        let best_level = read_number(store, BEST_LEVEL_KEY, DEFAULT_BEST_LEVEL as f64);
        Self {
            best_score: best_score.max(0.0).floor() as u64,
            best_level: (best_level.max(0.0).floor() as u32).max(DEFAULT_BEST_LEVEL),
        }
    }

    /// Read-modify-write: keep the max of the stored records and this run.
    ///
    /// Returns the records as they were before and after. A failed write is logged
    /// and the in-memory result is still returned.
    pub fn record(store: &mut impl BestStatsStore, score: u64, level: u32) -> (Self, Self) {
        let previous = Self::load(store);
        let next = Self {
            best_score: previous.best_score.max(score),
            best_level: previous.best_level.max(level),
        };

        for (key, value) in [
            (BEST_SCORE_KEY, next.best_score.to_string()),
            (BEST_LEVEL_KEY, next.best_level.to_string()),
        ] {
            if let Err(e) = store.set(key, &value) {
                log::warn!("Could not persist {}: {}", key, e);
            }
        }

        log::info!(
            "Best stats: score {} -> {}, level {} -> {}",
            previous.best_score,
            next.best_score,
            previous.best_level,
            next.best_level
        );
        (previous, next)
    }
}

/// LocalStorage-backed store (WASM only)
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
    }
}

#[cfg(target_arch = "wasm32")]
impl BestStatsStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let storage = Self::storage().ok_or(StoreError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                message: format!("{:?}", e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnlyStore(MemoryStore);

    impl BestStatsStore for ReadOnlyStore {
        fn get(&self, key: &str) -> Option<String> {
            self.0.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable)
        }
    }

    #[test]
    fn test_defaults_when_missing() {
        let store = MemoryStore::new();
        assert_eq!(BestStats::load(&store), BestStats::default());
        assert_eq!(BestStats::default().best_level, 1);
    }

    #[test]
    fn test_defaults_when_garbage() {
        let store = MemoryStore::new()
            .with_slot(BEST_SCORE_KEY, "lots")
            .with_slot(BEST_LEVEL_KEY, "NaN");
        let stats = BestStats::load(&store);
        assert_eq!(stats.best_score, 0);
        assert_eq!(stats.best_level, 1);

        let store = MemoryStore::new().with_slot(BEST_SCORE_KEY, "inf");
        assert_eq!(BestStats::load(&store).best_score, 0);
    }

    #[test]
    fn test_odd_numbers_are_floored_and_clamped() {
        let store = MemoryStore::new()
            .with_slot(BEST_SCORE_KEY, "2.5")
            .with_slot(BEST_LEVEL_KEY, "0");
        let stats = BestStats::load(&store);
        assert_eq!(stats.best_score, 2);
        assert_eq!(stats.best_level, 1);

        let store = MemoryStore::new()
            .with_slot(BEST_SCORE_KEY, "-3")
            .with_slot(BEST_LEVEL_KEY, "7.9");
        let stats = BestStats::load(&store);
        assert_eq!(stats.best_score, 0);
        assert_eq!(stats.best_level, 7);
    }

    #[test]
    fn test_record_keeps_max_and_writes_decimal() {
        let mut store = MemoryStore::new()
            .with_slot(BEST_SCORE_KEY, "12")
            .with_slot(BEST_LEVEL_KEY, "9");

        let (previous, next) = BestStats::record(&mut store, 8, 14);
        assert_eq!(previous.best_score, 12);
        assert_eq!(next.best_score, 12);
        assert_eq!(next.best_level, 14);
        assert_eq!(store.get(BEST_SCORE_KEY).as_deref(), Some("12"));
        assert_eq!(store.get(BEST_LEVEL_KEY).as_deref(), Some("14"));
    }

    #[test]
    fn test_failed_write_still_reports() {
        let mut store = ReadOnlyStore(MemoryStore::new());
        let (_, next) = BestStats::record(&mut store, 5, 6);
        assert_eq!(next.best_score, 5);
        assert_eq!(next.best_level, 6);
        assert_eq!(BestStats::load(&store), BestStats::default());
    }
}
