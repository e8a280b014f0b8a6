//! Bookkeeping shared by every polling loop
//!
//! A loop fetches once on start and then on a fixed interval. Each fetch is
//! issued a [`PollTicket`]; completions are applied through
//! [`PollState::apply`], which drops results older than the newest one
//! already shown and skips results whose serialized form did not change.

use serde::Serialize;
use std::time::Duration;

/// Live shuttle position and other fast-moving status
pub const LIVE_STATUS_INTERVAL: Duration = Duration::from_millis(500);

/// Occupancy, power and other slow-changing aggregates
pub const AGGREGATES_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Header clock
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);

/// Identifies one fetch issued by a loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PollTicket(u64);

impl PollTicket {
    pub const fn generation(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The value replaced what was shown
    Updated,
    /// Same payload as before; nothing to render
    Unchanged,
    /// A newer fetch already completed
    Stale,
    /// The loop was torn down
    Closed,
}

impl ApplyOutcome {
    pub const fn changed(self) -> bool {
        matches!(self, Self::Updated)
    }
}

#[derive(Debug, Clone)]
pub struct PollState<T> {
    value: Option<T>,
    snapshot: Option<String>,
    issued: u64,
    applied: Option<u64>,
    closed: bool,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            value: None,
            snapshot: None,
            issued: 0,
            applied: None,
            closed: false,
        }
    }
}

impl<T: Serialize> PollState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for the next fetch
    pub fn begin(&mut self) -> PollTicket {
        let ticket = PollTicket(self.issued);
        self.issued += 1;
        ticket
    }

    /// Apply a completed fetch
    pub fn apply(&mut self, ticket: PollTicket, value: T) -> ApplyOutcome {
        if self.closed {
            return ApplyOutcome::Closed;
        }
        if self.applied.is_some_and(|latest| ticket.0 < latest) {
            tracing::trace!(generation = ticket.0, "discarding stale poll result");
            return ApplyOutcome::Stale;
        }
        self.applied = Some(ticket.0);

        // Unserializable payloads are always treated as new
        let snapshot = serde_json::to_string(&value).ok();
        if snapshot.is_some() && snapshot == self.snapshot {
            return ApplyOutcome::Unchanged;
        }
        self.snapshot = snapshot;
        self.value = Some(value);
        ApplyOutcome::Updated
    }

    /// A fetch failed; the shown value stays until the next successful tick
    pub fn fail(&mut self, ticket: PollTicket) -> ApplyOutcome {
        if self.closed {
            ApplyOutcome::Closed
        } else if self.applied.is_some_and(|latest| ticket.0 < latest) {
            ApplyOutcome::Stale
        } else {
            ApplyOutcome::Unchanged
        }
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intervals() {
        assert_eq!(LIVE_STATUS_INTERVAL.as_millis(), 500);
        assert_eq!(AGGREGATES_INTERVAL.as_secs(), 3600);
    }

    #[test]
    fn test_latest_value_wins() {
        let mut state = PollState::new();
        let first = state.begin();
        let second = state.begin();
        assert_eq!(state.apply(first, vec![1]), ApplyOutcome::Updated);
        assert_eq!(state.apply(second, vec![2]), ApplyOutcome::Updated);
        assert_eq!(state.value(), Some(&vec![2]));
    }

    #[test]
    fn test_out_of_order_completion_is_dropped() {
        let mut state = PollState::new();
        let first = state.begin();
        let second = state.begin();
        assert_eq!(state.apply(second, "new"), ApplyOutcome::Updated);
        assert_eq!(state.apply(first, "old"), ApplyOutcome::Stale);
        assert_eq!(state.value(), Some(&"new"));
        assert_eq!(state.fail(first), ApplyOutcome::Stale);
    }

    #[test]
    fn test_identical_payload_skips_render() {
        let mut state = PollState::new();
        let a = state.begin();
        let b = state.begin();
        assert!(state.apply(a, vec!["x", "y"]).changed());
        assert_eq!(state.apply(b, vec!["x", "y"]), ApplyOutcome::Unchanged);

        let c = state.begin();
        assert!(state.apply(c, vec!["x"]).changed());
    }

    #[test]
    fn test_empty_result_replaces_rows() {
        let mut state = PollState::new();
        let a = state.begin();
        state.apply(a, vec![1, 2, 3]);
        let b = state.begin();
        assert!(state.apply(b, Vec::<i32>::new()).changed());
        assert_eq!(state.value(), Some(&Vec::new()));
    }

    #[test]
    fn test_closed_state_ignores_late_results() {
        let mut state = PollState::new();
        let ticket = state.begin();
        state.close();
        assert!(state.is_closed());
        assert_eq!(state.apply(ticket, 1), ApplyOutcome::Closed);
        assert_eq!(state.value(), None);
    }
}
