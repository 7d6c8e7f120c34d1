//! Data-driven game balance
//!
//! Every threshold the round generator and session controller use lives here so a
//! host can rebalance the game from JSON without touching the simulation.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// One distortion regime: `max(floor, max_distortion * decay^(level - 1))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistortionRegime {
    pub floor: f32,
    pub decay: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Grid ===
    /// Upper level bound (inclusive) for each grid size step, smallest first.
    /// Levels past the last step use `max_grid_size`.
    pub grid_steps: Vec<(u32, usize)>,
    pub max_grid_size: usize,

    // === Shapes ===
    pub min_sides: usize,
    pub max_sides: usize,
    /// Resample attempts when the side count repeats the previous round
    pub side_retry_limit: u32,
    /// Circumscribed radius in percent of the tile box
    pub radius: f32,
    pub saturation: u8,
    pub lightness: u8,

    // === Distortion ===
    pub max_distortion: f32,
    /// Last level (inclusive) using the `early` regime
    pub early_regime_max_level: u32,
    pub early: DistortionRegime,
    pub late: DistortionRegime,
    /// First level that distorts two vertices instead of one
    pub multi_vertex_level: u32,

    // === Session timing (ms) ===
    pub total_time_ms: u64,
    pub round_advance_ms: u64,
    pub wrong_reveal_ms: u64,
    pub timeout_reveal_ms: u64,
    pub slow_mo_ms: u64,
    pub score_pop_ms: u64,
    pub slow_mo_window_secs: u32,
    pub countdown_cue_ms: u64,
    pub countdown_window_secs: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            grid_steps: vec![(2, 2), (5, 3), (15, 4)],
            max_grid_size: 5,

            min_sides: 3,
            max_sides: 8,
            side_retry_limit: 10,
            radius: 40.0,
            saturation: 80,
            lightness: 60,

            max_distortion: 20.0,
            early_regime_max_level: 15,
            early: DistortionRegime {
                floor: 4.0,
                decay: 0.90,
            },
            late: DistortionRegime {
                floor: 2.0,
                decay: 0.85,
            },
            multi_vertex_level: 16,

            total_time_ms: TOTAL_TIME_MS,
            round_advance_ms: ROUND_ADVANCE_MS,
            wrong_reveal_ms: WRONG_REVEAL_MS,
            timeout_reveal_ms: TIMEOUT_REVEAL_MS,
            slow_mo_ms: SLOW_MO_MS,
            score_pop_ms: SCORE_POP_MS,
            slow_mo_window_secs: SLOW_MO_WINDOW_SECS,
            countdown_cue_ms: COUNTDOWN_CUE_MS,
            countdown_window_secs: COUNTDOWN_WINDOW_SECS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut tuning: Tuning = serde_json::from_str(json)?;
        tuning.sanitize();
        Ok(tuning)
    }

    /// Clamp values that would otherwise break generation (empty grids, bad side ranges).
    pub fn sanitize(&mut self) {
        self.max_grid_size = self.max_grid_size.max(1);
        for (_, size) in &mut self.grid_steps {
            *size = (*size).max(1);
        }
        self.grid_steps.sort_by_key(|(level, _)| *level);
        self.min_sides = self.min_sides.max(3);
        self.max_sides = self.max_sides.max(self.min_sides);
        self.multi_vertex_level = self.multi_vertex_level.max(1);
        // A zero period would reschedule the cue forever within one tick
        self.countdown_cue_ms = self.countdown_cue_ms.max(1);
    }

    /// Whole seconds in one session
    pub fn total_time_secs(&self) -> u32 {
        self.total_time_ms.div_ceil(1000) as u32
    }

    /// Distortion regime for a level
    pub fn regime(&self, level: u32) -> DistortionRegime {
        if level <= self.early_regime_max_level {
            self.early
        } else {
            self.late
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_distortion": 12.5 }"#).unwrap();
        assert_eq!(tuning.max_distortion, 12.5);
        assert_eq!(tuning.max_grid_size, 5);
        assert_eq!(tuning.total_time_ms, 40_000);
    }

    #[test]
    fn test_sanitize_rejects_empty_grid() {
        let tuning =
            Tuning::from_json(r#"{ "max_grid_size": 0, "grid_steps": [[3, 0]], "min_sides": 1 }"#)
                .unwrap();
        assert_eq!(tuning.max_grid_size, 1);
        assert_eq!(tuning.grid_steps, vec![(3, 1)]);
        assert_eq!(tuning.min_sides, 3);
        assert!(tuning.max_sides >= tuning.min_sides);
    }

    #[test]
    fn test_regime_switches_after_level_15() {
        let tuning = Tuning::default();
        assert_eq!(tuning.regime(15).floor, 4.0);
        assert_eq!(tuning.regime(16).floor, 2.0);
    }

    #[test]
    fn test_sanitize_keeps_countdown_period_positive() {
        let tuning = Tuning::from_json(r#"{ "countdown_cue_ms": 0 }"#).unwrap();
        assert_eq!(tuning.countdown_cue_ms, 1);
        assert_eq!(Tuning::default().countdown_cue_ms, 1000);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("not json").is_err());
    }
}
