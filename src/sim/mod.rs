//! Game core
//!
//! Round generation and the session state machine. This module is pure:
//! - Time is passed in by the host, never read from a clock
//! - Randomness comes from a seeded RNG owned by the session
//! - No rendering, storage or audio dependencies beyond the injected traits

pub mod round;
pub mod session;
pub mod state;
pub mod timers;

pub use round::{
    Color, Polygon, RoundData, ShapeTile, distort_polygon, distort_vertex_count,
    distortion_amount, generate_round, grid_size, regular_polygon,
};
pub use session::{ClickOutcome, Session};
pub use state::{EndReason, Feedback, RunSummary, SessionPhase, SessionState};
pub use timers::{Deferred, TimerId, TimerQueue};
