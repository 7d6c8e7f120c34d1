//! Warp Spot - spot the warped polygon before the clock runs out
//!
//! Core modules:
//! - `sim`: Round generation and the session state machine (pure, platform-free)
//! - `tuning`: Data-driven game balance
//! - `best_stats`: Persisted best score / best level
//! - `audio`: Semantic audio cues (Web Audio on wasm)
//! - `render`: Presentation helpers and the view snapshot handed to the page
//! - `platform`: Browser bindings

pub mod audio;
pub mod best_stats;
pub mod platform;
pub mod render;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use best_stats::{BestStats, BestStatsStore, MemoryStore};
pub use settings::Settings;
pub use sim::{EndReason, RoundData, RunSummary, Session, SessionPhase};
pub use tuning::Tuning;

/// Session timing constants (milliseconds unless noted)
pub mod consts {
    /// Length of one session in seconds
    pub const TOTAL_TIME_SECS: u32 = 40;
    pub const TOTAL_TIME_MS: u64 = TOTAL_TIME_SECS as u64 * 1000;

    /// Pause after a correct click before the next round appears
    pub const ROUND_ADVANCE_MS: u64 = 220;
    /// How long a wrong click (and the correct tile) stays revealed
    pub const WRONG_REVEAL_MS: u64 = 3000;
    /// How long the correct tile stays revealed after time runs out
    pub const TIMEOUT_REVEAL_MS: u64 = 1200;

    /// Cosmetic flags
    pub const SLOW_MO_MS: u64 = 900;
    pub const SCORE_POP_MS: u64 = 900;
    /// A hit with this many seconds (or fewer) left triggers slow-mo
    pub const SLOW_MO_WINDOW_SECS: u32 = 5;

    /// Host clock period driving `Session::tick`
    pub const CLOCK_PERIOD_MS: u64 = 200;
    /// Final countdown cue: repeats every second while time left is in (0, 10]
    pub const COUNTDOWN_CUE_MS: u64 = 1000;
    pub const COUNTDOWN_WINDOW_SECS: u32 = 10;
}
