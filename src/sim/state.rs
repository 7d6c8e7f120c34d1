//! Session state and end-of-run summary types

use serde::{Deserialize, Serialize};

use super::round::RoundData;

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Menu (or results) shown, no run in progress
    Idle,
    /// Waiting for a click on the current round
    Playing,
    /// Correct click shown; next round is pending
    RoundTransition,
    /// Run is over; the answer is revealed until the summary appears.
    /// Entering this phase is the one-shot guard for ending a run.
    Ending { reason: EndReason },
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndReason {
    Timeout,
    Wrong,
}

impl EndReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EndReason::Timeout => "timeout",
            EndReason::Wrong => "wrong",
        }
    }
}

/// Tiles to highlight after a click or a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub correct_index: usize,
    pub wrong_index: Option<usize>,
}

/// Mutable state of one run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub level: u32,
    pub score: u64,
    pub attempts: u32,
    pub hits: u32,
    pub misses: u32,
    /// Whole seconds left, rounded up
    pub time_left: u32,
    /// Absolute deadline of the run (host clock, ms)
    pub end_time_ms: u64,
    pub feedback: Option<Feedback>,
    pub round: RoundData,

    // Cosmetic only; never read by the timing or scoring logic
    pub slow_mo: bool,
    pub shake: bool,
    /// Id of the "+1" popup currently shown
    pub score_pop: Option<u64>,
}

impl SessionState {
    pub fn new(total_time_secs: u32) -> Self {
        Self {
            phase: SessionPhase::Idle,
            level: 1,
            score: 0,
            attempts: 0,
            hits: 0,
            misses: 0,
            time_left: total_time_secs,
            end_time_ms: 0,
            feedback: None,
            round: RoundData::default(),
            slow_mo: false,
            shake: false,
            score_pop: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase != SessionPhase::Idle
    }

    pub fn input_locked(&self) -> bool {
        matches!(
            self.phase,
            SessionPhase::RoundTransition | SessionPhase::Ending { .. }
        )
    }

    /// True once a run has started ending (by timeout or wrong click)
    pub fn is_ending(&self) -> bool {
        matches!(self.phase, SessionPhase::Ending { .. })
    }

    pub fn accuracy(&self) -> f64 {
        accuracy(self.hits, self.attempts)
    }
}

/// `hits / attempts`, or 0 when nothing was clicked
pub fn accuracy(hits: u32, attempts: u32) -> f64 {
    if attempts == 0 {
        0.0
    } else {
        hits as f64 / attempts as f64
    }
}

/// Results shown after a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub reason: EndReason,
    pub score: u64,
    pub level: u32,
    pub attempts: u32,
    pub hits: u32,
    pub misses: u32,
    pub accuracy: f64,
    pub best_score: u64,
    /// How far this run beat the previous best score (0 if it didn't)
    pub improved_by: u64,
    pub best_level: u32,
    pub improved_level_by: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(0, 0), 0.0);
        assert!((accuracy(7, 10) - 0.7).abs() < 1e-12);
        assert_eq!(accuracy(3, 3), 1.0);
    }

    #[test]
    fn test_lock_follows_phase() {
        let mut state = SessionState::new(40);
        assert!(!state.is_playing());
        assert!(!state.input_locked());

        state.phase = SessionPhase::Playing;
        assert!(state.is_playing());
        assert!(!state.input_locked());

        state.phase = SessionPhase::RoundTransition;
        assert!(state.input_locked());

        state.phase = SessionPhase::Ending {
            reason: EndReason::Wrong,
        };
        assert!(state.input_locked());
        assert!(state.is_ending());
        assert!(state.is_playing());
    }

    #[test]
    fn test_reason_serializes_lowercase() {
        let json = serde_json::to_string(&EndReason::Timeout).unwrap();
        assert_eq!(json, "\"timeout\"");
        assert_eq!(EndReason::Wrong.as_str(), "wrong");
    }
}
