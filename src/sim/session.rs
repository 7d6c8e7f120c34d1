//! Session controller
//!
//! Drives one run: countdown, click validation, scoring, feedback sequencing and
//! the end-of-run summary. All time is passed in explicitly (host clock, ms) and
//! every delayed transition goes through the session's own [`TimerQueue`], so the
//! host only has to call [`Session::tick`] periodically and forward clicks.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::round::{RoundData, generate_round};
use super::state::{EndReason, Feedback, RunSummary, SessionPhase, SessionState, accuracy};
use super::timers::{Deferred, TimerId, TimerQueue};
use crate::audio::{Cue, CueSink};
use crate::best_stats::{BestStats, BestStatsStore};
use crate::tuning::Tuning;

/// What a click did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Not playing, input locked, or not a tile
    Ignored,
    Hit,
    Miss,
}

pub struct Session<S: BestStatsStore, A: CueSink> {
    state: SessionState,
    tuning: Tuning,
    timers: TimerQueue,
    rng: Pcg32,
    store: S,
    audio: A,
    best: BestStats,
    summary: Option<RunSummary>,
    /// Side count of the last generated round (kept across runs)
    last_sides: Option<usize>,
    /// Pending round advance, cancelled if the run times out first
    advance_timer: Option<TimerId>,
    /// Set while the final-countdown cue is repeating
    countdown_timer: Option<TimerId>,
    next_pop_id: u64,
}

impl<S: BestStatsStore, A: CueSink> Session<S, A> {
    pub fn new(store: S, audio: A, seed: u64) -> Self {
        Self::with_tuning(store, audio, seed, Tuning::default())
    }

    pub fn with_tuning(store: S, audio: A, seed: u64, mut tuning: Tuning) -> Self {
        tuning.sanitize();
        let best = BestStats::load(&store);
        Self {
            state: SessionState::new(tuning.total_time_secs()),
            tuning,
            timers: TimerQueue::new(),
            rng: Pcg32::seed_from_u64(seed),
            store,
            audio,
            best,
            summary: None,
            last_sides: None,
            advance_timer: None,
            countdown_timer: None,
            next_pop_id: 1,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn round(&self) -> &RoundData {
        &self.state.round
    }

    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    pub fn best(&self) -> BestStats {
        self.best
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    /// Number of deferred actions still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Best-effort cue; errors never reach the state machine
    fn cue(&mut self, cue: Cue, volume: f32) {
        if let Err(e) = self.audio.play(cue, volume) {
            log::debug!("Cue {} dropped: {}", cue.name(), e);
        }
    }

    /// Play a cue outside the run (e.g. hovering the start button)
    pub fn ui_cue(&mut self, cue: Cue, volume: f32) {
        self.cue(cue, volume);
    }

    /// Reset counters and begin a new run at level 1
    pub fn start(&mut self, now_ms: u64) {
        self.cue(Cue::Celebration, 0.95);

        self.timers.clear();
        self.advance_timer = None;
        self.countdown_timer = None;

        let previous_round_id = self.state.round.round_id;
        self.state = SessionState::new(self.tuning.total_time_secs());
        self.state.round.round_id = previous_round_id;
        self.state.end_time_ms = now_ms.saturating_add(self.tuning.total_time_ms);
        self.state.phase = SessionPhase::Playing;
        self.summary = None;

        self.next_round();
        log::info!(
            "Run started: {}s on the clock, round {}",
            self.state.time_left,
            self.state.round.round_id
        );
    }

    fn next_round(&mut self) {
        let (round, sides) = generate_round(
            &mut self.rng,
            self.state.level,
            self.last_sides,
            self.state.round.round_id,
            &self.tuning,
        );
        self.last_sides = Some(sides);
        self.state.round = round;
    }

    /// Periodic clock: fire due transitions, refresh the countdown, and start the
    /// timeout ending once the deadline has passed. Safe to call at any rate.
    pub fn tick(&mut self, now_ms: u64) {
        // A timeout ending pins the clock at zero
        let timed_out = matches!(
            self.state.phase,
            SessionPhase::Ending {
                reason: EndReason::Timeout
            }
        );
        if self.state.is_playing() && !timed_out {
            self.refresh_time_left(now_ms);
        }

        self.catch_up(now_ms, now_ms >= self.state.end_time_ms);
        self.sync_countdown(now_ms);
    }

    fn refresh_time_left(&mut self, now_ms: u64) {
        let remaining_ms = self.state.end_time_ms.saturating_sub(now_ms);
        self.state.time_left = remaining_ms.div_ceil(1000) as u32;
    }

    /// Fire transitions due by `now_ms`. Once the deadline has passed, anything due
    /// after it only runs after the timeout ending has begun, so the outcome does
    /// not depend on where the host's ticks fall.
    fn catch_up(&mut self, now_ms: u64, deadline_passed: bool) {
        let deadline = self.state.end_time_ms;
        if self.state.is_playing() && deadline_passed {
            self.poll_timers(now_ms.min(deadline));
            self.begin_timeout_end(deadline);
        }
        self.poll_timers(now_ms);
    }

    fn poll_timers(&mut self, now_ms: u64) {
        while let Some(action) = self.timers.pop_due(now_ms) {
            self.fire(action, now_ms);
        }
    }

    fn fire(&mut self, action: Deferred, now_ms: u64) {
        match action {
            Deferred::AdvanceRound {
                from_round,
                next_level,
            } => {
                self.advance_timer = None;
                if self.state.phase != SessionPhase::RoundTransition
                    || self.state.round.round_id != from_round
                {
                    log::debug!("Dropping stale advance from round {}", from_round);
                    return;
                }
                self.state.level = next_level;
                self.next_round();
                self.state.feedback = None;
                self.state.phase = SessionPhase::Playing;
            }
            Deferred::EndSession { reason } => {
                if self.state.phase != (SessionPhase::Ending { reason }) {
                    log::debug!("Dropping stale {} ending", reason.as_str());
                    return;
                }
                if reason == EndReason::Timeout {
                    self.cue(Cue::Notification, 0.9);
                }
                self.end_game(reason);
            }
            Deferred::ClearSlowMo => self.state.slow_mo = false,
            Deferred::ClearScorePop { pop_id } => {
                if self.state.score_pop == Some(pop_id) {
                    self.state.score_pop = None;
                }
            }
            Deferred::CountdownCue => {
                self.countdown_timer = None;
                if self.in_countdown_window() {
                    self.cue(Cue::Caution, 0.9);
                    self.countdown_timer = Some(self.timers.schedule(
                        now_ms,
                        self.tuning.countdown_cue_ms,
                        Deferred::CountdownCue,
                    ));
                }
            }
        }
    }

    fn in_countdown_window(&self) -> bool {
        self.state.is_playing()
            && self.state.time_left > 0
            && self.state.time_left <= self.tuning.countdown_window_secs
    }

    /// Start the repeating cue on entering the last seconds, stop it on leaving
    fn sync_countdown(&mut self, now_ms: u64) {
        let in_window = self.in_countdown_window();
        match (in_window, self.countdown_timer) {
            (true, None) => {
                self.cue(Cue::Caution, 0.9);
                self.countdown_timer = Some(self.timers.schedule(
                    now_ms,
                    self.tuning.countdown_cue_ms,
                    Deferred::CountdownCue,
                ));
            }
            (false, Some(id)) => {
                self.timers.cancel(id);
                self.countdown_timer = None;
            }
            _ => {}
        }
    }

    fn stop_countdown(&mut self) {
        if let Some(id) = self.countdown_timer.take() {
            self.timers.cancel(id);
        }
    }

    /// Handle a click on tile `index`
    pub fn handle_click(&mut self, index: usize, now_ms: u64) -> ClickOutcome {
        // A click can land between ticks; catch up on due transitions first.
        // A click exactly on the deadline still counts.
        self.catch_up(now_ms, now_ms > self.state.end_time_ms);

        if self.state.phase != SessionPhase::Playing {
            log::debug!("Click on {} ignored in {:?}", index, self.state.phase);
            return ClickOutcome::Ignored;
        }
        if index >= self.state.round.tile_count() {
            log::debug!("Click on missing tile {}", index);
            return ClickOutcome::Ignored;
        }

        self.state.attempts += 1;

        if self.state.round.is_target(index) {
            self.on_hit(index, now_ms);
            ClickOutcome::Hit
        } else {
            self.on_miss(index, now_ms);
            ClickOutcome::Miss
        }
    }

    fn on_hit(&mut self, index: usize, now_ms: u64) {
        self.cue(Cue::Notification, 0.95);
        self.state.hits += 1;
        self.state.score += 1;

        let pop_id = self.next_pop_id;
        self.next_pop_id += 1;
        self.state.score_pop = Some(pop_id);
        self.timers.schedule(
            now_ms,
            self.tuning.score_pop_ms,
            Deferred::ClearScorePop { pop_id },
        );

        if self.state.time_left <= self.tuning.slow_mo_window_secs {
            self.state.slow_mo = true;
            self.timers
                .schedule(now_ms, self.tuning.slow_mo_ms, Deferred::ClearSlowMo);
        }

        self.state.phase = SessionPhase::RoundTransition;
        self.state.feedback = Some(Feedback {
            correct_index: index,
            wrong_index: None,
        });
        self.advance_timer = Some(self.timers.schedule(
            now_ms,
            self.tuning.round_advance_ms,
            Deferred::AdvanceRound {
                from_round: self.state.round.round_id,
                next_level: self.state.level + 1,
            },
        ));
    }

    fn on_miss(&mut self, index: usize, now_ms: u64) {
        self.cue(Cue::Disabled, 0.95);
        self.state.misses += 1;
        self.state.shake = true;

        // Entering Ending here keeps a concurrent timeout from starting a second ending
        self.state.phase = SessionPhase::Ending {
            reason: EndReason::Wrong,
        };
        self.state.feedback = Some(Feedback {
            correct_index: self.state.round.target_index,
            wrong_index: Some(index),
        });
        self.timers.schedule(
            now_ms,
            self.tuning.wrong_reveal_ms,
            Deferred::EndSession {
                reason: EndReason::Wrong,
            },
        );
    }

    /// Reveal the answer and schedule the timeout ending.
    ///
    /// One-shot: returns false (and does nothing) if the run is not in progress or
    /// is already ending.
    pub fn begin_timeout_end(&mut self, now_ms: u64) -> bool {
        if !matches!(
            self.state.phase,
            SessionPhase::Playing | SessionPhase::RoundTransition
        ) {
            return false;
        }

        self.stop_countdown();
        self.cue(Cue::StopCountdown, 1.0);

        if let Some(id) = self.advance_timer.take() {
            self.timers.cancel(id);
        }

        self.state.time_left = 0;
        self.state.phase = SessionPhase::Ending {
            reason: EndReason::Timeout,
        };
        self.state.feedback = Some(Feedback {
            correct_index: self.state.round.target_index,
            wrong_index: None,
        });
        self.timers.schedule(
            now_ms,
            self.tuning.timeout_reveal_ms,
            Deferred::EndSession {
                reason: EndReason::Timeout,
            },
        );
        log::info!("Time up at level {}", self.state.level);
        true
    }

    /// Finish the run: clear transient state, update the persisted bests and build
    /// the summary. Returns `None` if no run is in progress.
    pub fn end_game(&mut self, reason: EndReason) -> Option<RunSummary> {
        if !self.state.is_playing() {
            return None;
        }

        self.state.phase = SessionPhase::Idle;
        self.state.feedback = None;
        self.state.slow_mo = false;
        self.state.shake = false;
        self.state.score_pop = None;

        // Nothing may fire once the run is over
        self.timers.clear();
        self.advance_timer = None;
        self.countdown_timer = None;

        let (previous, next) =
            BestStats::record(&mut self.store, self.state.score, self.state.level);
        self.best = next;

        let summary = RunSummary {
            reason,
            score: self.state.score,
            level: self.state.level,
            attempts: self.state.attempts,
            hits: self.state.hits,
            misses: self.state.misses,
            accuracy: accuracy(self.state.hits, self.state.attempts),
            best_score: next.best_score,
            improved_by: self.state.score.saturating_sub(previous.best_score),
            best_level: next.best_level,
            improved_level_by: self.state.level.saturating_sub(previous.best_level),
        };

        log::info!(
            "Run over ({}): score {}, level {}, {}/{} hits",
            reason.as_str(),
            summary.score,
            summary.level,
            summary.hits,
            summary.attempts
        );

        // Results panel reveal
        self.cue(Cue::Caution, 0.9);

        self.summary = Some(summary.clone());
        Some(summary)
    }
}
