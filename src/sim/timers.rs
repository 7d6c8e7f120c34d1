//! Deferred actions
//!
//! The session never calls back into the host. Delayed transitions are queued here
//! as plain data and fired by `Session::tick` once their deadline has passed.

use serde::{Deserialize, Serialize};

use super::state::EndReason;

/// Handle returned by [`TimerQueue::schedule`], used to cancel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// A transition to run later. Each variant carries the snapshot it needs so the
/// handler never depends on state that may have changed in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deferred {
    /// Move on after a correct click in round `from_round`
    AdvanceRound { from_round: u64, next_level: u32 },
    /// Finish the session
    EndSession { reason: EndReason },
    /// Cosmetic flags
    ClearSlowMo,
    ClearScorePop { pop_id: u64 },
    /// Repeating final-countdown cue
    CountdownCue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Timer {
    id: TimerId,
    due_ms: u64,
    action: Deferred,
}

/// Pending deferred actions ordered by deadline, then by scheduling order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerQueue {
    pending: Vec<Timer>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once `after_ms` has elapsed from `now_ms`
    pub fn schedule(&mut self, now_ms: u64, after_ms: u64, action: Deferred) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Timer {
            id,
            due_ms: now_ms.saturating_add(after_ms),
            action,
        });
        id
    }

    /// Drop a pending action. Cancelling a fired or unknown timer is a no-op.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|t| t.id != id);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the earliest action due at `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Deferred> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= now_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id.0))
            .map(|(i, _)| i)?;
        Some(self.pending.remove(index).action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_in_deadline_order() {
        let mut timers = TimerQueue::new();
        timers.schedule(0, 300, Deferred::ClearSlowMo);
        timers.schedule(0, 100, Deferred::CountdownCue);
        timers.schedule(0, 100, Deferred::ClearScorePop { pop_id: 1 });

        assert_eq!(timers.pop_due(50), None);
        assert_eq!(timers.pop_due(100), Some(Deferred::CountdownCue));
        assert_eq!(
            timers.pop_due(100),
            Some(Deferred::ClearScorePop { pop_id: 1 })
        );
        assert_eq!(timers.pop_due(299), None);
        assert_eq!(timers.pop_due(1000), Some(Deferred::ClearSlowMo));
        assert!(timers.is_empty());
    }

    #[test]
    fn test_cancel() {
        let mut timers = TimerQueue::new();
        let id = timers.schedule(
            10,
            3000,
            Deferred::EndSession {
                reason: EndReason::Wrong,
            },
        );
        assert!(timers.is_pending(id));
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert_eq!(timers.pop_due(u64::MAX), None);
    }
}
