//! Player preferences
//!
//! Stored as one JSON slot next to the best-stats slots, through the same
//! [`BestStatsStore`] the session uses.

use serde::{Deserialize, Serialize};

use crate::best_stats::BestStatsStore;

/// Storage slot holding the settings as JSON
pub const SETTINGS_KEY: &str = "warpspot.settings";

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Cue volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no slow-mo, no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective slow-mo flag (respects reduced_motion)
    pub fn effective_slow_mo(&self, slow_mo: bool) -> bool {
        slow_mo && !self.reduced_motion
    }

    /// Effective shake flag (respects reduced_motion)
    pub fn effective_shake(&self, shake: bool) -> bool {
        shake && !self.reduced_motion
    }

    /// Parse stored settings, falling back to defaults
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
                settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
                settings
            }
            Err(e) => {
                log::debug!("Ignoring unreadable settings: {}", e);
                Self::default()
            }
        }
    }

    /// Read the settings slot, defaults when it is empty
    pub fn load_from(store: &impl BestStatsStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Some(json) => Self::from_json(&json),
            None => Self::default(),
        }
    }

    /// Write the settings slot. Failures are logged; the in-memory settings stay
    /// authoritative for the rest of the page session.
    pub fn save_to(&self, store: &mut impl BestStatsStore) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Could not serialize settings: {}", e);
                return;
            }
        };
        match store.set(SETTINGS_KEY, &json) {
            Ok(()) => log::debug!("Settings saved"),
            Err(e) => log::warn!("Could not persist settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::best_stats::{MemoryStore, StoreError};

    #[test]
    fn test_reduced_motion_masks_cosmetics() {
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        assert!(!settings.effective_slow_mo(true));
        assert!(!settings.effective_shake(true));
        assert!(Settings::default().effective_shake(true));
    }

    #[test]
    fn test_from_json_clamps_and_falls_back() {
        let settings = Settings::from_json(r#"{ "master_volume": 3.0, "muted": true }"#);
        assert_eq!(settings.master_volume, 1.0);
        assert!(settings.muted);
        assert_eq!(settings.sfx_volume, 1.0);

        assert_eq!(Settings::from_json("{oops"), Settings::default());
    }

    #[test]
    fn test_settings_survive_a_store_round_trip() {
        let mut store = MemoryStore::new();
        assert_eq!(Settings::load_from(&store), Settings::default());

        let settings = Settings {
            muted: true,
            master_volume: 0.25,
            ..Settings::default()
        };
        settings.save_to(&mut store);
        assert_eq!(Settings::load_from(&store), settings);
    }

    #[test]
    fn test_failed_settings_write_is_survivable() {
        struct FullStore;

        impl BestStatsStore for FullStore {
            fn get(&self, _key: &str) -> Option<String> {
                None
            }

            fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
                Err(StoreError::Write {
                    key: key.to_string(),
                    message: "quota exceeded".to_string(),
                })
            }
        }

        let mut store = FullStore;
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        settings.save_to(&mut store);
        assert!(settings.reduced_motion);
        assert_eq!(Settings::load_from(&store), Settings::default());
    }
}
