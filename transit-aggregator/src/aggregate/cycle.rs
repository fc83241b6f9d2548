//! Cycle state shared by every refresh running on one aggregator.
//!
//! Cycles may overlap (a timer tick and a manual refresh, say), and a cycle
//! may be dropped half way through. Each running cycle holds a
//! [`CycleGuard`]; the published state is the earliest stage any running
//! cycle is in, and `Idle` once the last guard is gone.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::watch;

/// Where a cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleState {
    Idle,
    CheckingConnectivity,
    Fetching,
    Reporting,
}

/// Running stages in cycle order.
const STAGES: [CycleState; 3] = [
    CycleState::CheckingConnectivity,
    CycleState::Fetching,
    CycleState::Reporting,
];

impl CycleState {
    fn stage_index(self) -> Option<usize> {
        STAGES.iter().position(|s| *s == self)
    }
}

/// Counts running cycles per stage and publishes the combined state.
#[derive(Debug)]
pub(crate) struct CycleTracker {
    tx: watch::Sender<CycleState>,
    running: Mutex<[usize; STAGES.len()]>,
}

impl CycleTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(CycleState::Idle);
        Self {
            tx,
            running: Mutex::new([0; STAGES.len()]),
        }
    }

    pub fn current(&self) -> CycleState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CycleState> {
        self.tx.subscribe()
    }

    /// Register a new cycle in `CheckingConnectivity`.
    pub fn start(&self) -> CycleGuard<'_> {
        let mut guard = CycleGuard {
            tracker: self,
            stage: CycleState::Idle,
        };
        guard.advance(CycleState::CheckingConnectivity);
        guard
    }

    fn shift(&self, from: CycleState, to: CycleState) {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(i) = from.stage_index() {
            running[i] = running[i].saturating_sub(1);
        }
        if let Some(i) = to.stage_index() {
            running[i] += 1;
        }

        let combined = STAGES
            .iter()
            .zip(running.iter())
            .find(|(_, count)| **count > 0)
            .map_or(CycleState::Idle, |(stage, _)| *stage);

        // Publish while still holding the lock so concurrent shifts land in order
        self.tx.send_if_modified(|current| {
            if *current == combined {
                false
            } else {
                *current = combined;
                true
            }
        });
    }
}

/// One running cycle. Dropping it, finished or not, deregisters the cycle.
#[derive(Debug)]
pub(crate) struct CycleGuard<'a> {
    tracker: &'a CycleTracker,
    stage: CycleState,
}

impl CycleGuard<'_> {
    pub fn advance(&mut self, to: CycleState) {
        self.tracker.shift(self.stage, to);
        self.stage = to;
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.tracker.shift(self.stage, CycleState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_cycle_walks_the_stages() {
        let tracker = CycleTracker::new();
        assert_eq!(tracker.current(), CycleState::Idle);

        let mut cycle = tracker.start();
        assert_eq!(tracker.current(), CycleState::CheckingConnectivity);
        cycle.advance(CycleState::Fetching);
        assert_eq!(tracker.current(), CycleState::Fetching);
        cycle.advance(CycleState::Reporting);
        assert_eq!(tracker.current(), CycleState::Reporting);

        drop(cycle);
        assert_eq!(tracker.current(), CycleState::Idle);
    }

    #[test]
    fn abandoned_cycle_returns_to_idle() {
        let tracker = CycleTracker::new();
        let mut cycle = tracker.start();
        cycle.advance(CycleState::Fetching);
        drop(cycle);
        assert_eq!(tracker.current(), CycleState::Idle);
    }

    #[test]
    fn finishing_cycle_does_not_hide_a_running_one() {
        let tracker = CycleTracker::new();
        let mut slow = tracker.start();
        slow.advance(CycleState::Fetching);

        let mut fast = tracker.start();
        assert_eq!(tracker.current(), CycleState::CheckingConnectivity);
        fast.advance(CycleState::Fetching);
        fast.advance(CycleState::Reporting);
        assert_eq!(tracker.current(), CycleState::Fetching);
        drop(fast);
        assert_eq!(tracker.current(), CycleState::Fetching);

        slow.advance(CycleState::Reporting);
        assert_eq!(tracker.current(), CycleState::Reporting);
        drop(slow);
        assert_eq!(tracker.current(), CycleState::Idle);
    }

    #[test]
    fn unchanged_state_is_not_republished() {
        let tracker = CycleTracker::new();
        let mut rx = tracker.subscribe();

        let mut first = tracker.start();
        first.advance(CycleState::Fetching);
        rx.borrow_and_update();

        let mut second = tracker.start();
        second.advance(CycleState::Fetching);
        drop(second);
        // Dipped to CheckingConnectivity and back, so a change was seen
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        let mut third = tracker.start();
        third.advance(CycleState::Fetching);
        rx.borrow_and_update();
        drop(third);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(tracker.current(), CycleState::Fetching);
    }
}
