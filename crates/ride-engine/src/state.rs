//! Ride state machine.
//!
//! [`RideState`] holds the mutable half of a ride (status, cycle timer, line
//! and boarded visitors) and is the only place where status changes. Callers
//! serialize access through the ride's lock, so every method here sees and
//! leaves a consistent state:
//!
//! - `boarded` is empty unless the ride is `Running`
//! - `cycle_ends_at` is set exactly when the ride is `Running`
//!
//! ```text
//!            open              start_cycle
//!  Closed ─────────▶ Open ─────────────────▶ Running
//!    ▲                ▲  ◀─────────────────    │
//!    │ close          │     complete_cycle     │ close
//!    └────────────────┴────────────────────────┘
//!
//!  any ──to_maintenance──▶ Maintenance ──open──▶ Open
//!                          Maintenance ──close─▶ Closed
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use ride_types::{RideId, RideStatus, VisitorId, VisitorRecord};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Transitions a ride can be asked to make.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Open,
    StartCycle,
    CompleteCycle,
    Close,
    ToMaintenance,
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transition::Open => write!(f, "open"),
            Transition::StartCycle => write!(f, "start cycle of"),
            Transition::CompleteCycle => write!(f, "complete cycle of"),
            Transition::Close => write!(f, "close"),
            Transition::ToMaintenance => write!(f, "move to maintenance"),
        }
    }
}

/// Mutable state of one ride.
#[derive(Debug, Clone)]
pub struct RideState {
    ride_id: RideId,
    cycle_duration: Duration,
    status: RideStatus,
    cycle_ends_at: Option<DateTime<Utc>>,
    waiting_line: VecDeque<VisitorRecord>,
    boarded: Vec<VisitorRecord>,
}

impl RideState {
    /// A closed ride with an empty line.
    pub fn new(ride_id: RideId, cycle_duration: Duration) -> Self {
        Self {
            ride_id,
            cycle_duration,
            status: RideStatus::Closed,
            cycle_ends_at: None,
            waiting_line: VecDeque::new(),
            boarded: Vec::new(),
        }
    }

    pub fn status(&self) -> RideStatus {
        self.status
    }

    pub fn cycle_ends_at(&self) -> Option<DateTime<Utc>> {
        self.cycle_ends_at
    }

    pub fn waiting_line(&self) -> impl Iterator<Item = &VisitorRecord> {
        self.waiting_line.iter()
    }

    pub fn line_len(&self) -> usize {
        self.waiting_line.len()
    }

    pub fn boarded(&self) -> &[VisitorRecord] {
        &self.boarded
    }

    /// Whether the current cycle is still running at `now`.
    pub fn cycle_in_progress(&self, now: DateTime<Utc>) -> bool {
        matches!(self.cycle_ends_at, Some(ends_at) if now < ends_at)
    }

    /// Append a visitor to the back of the line. Returns the visitor's
    /// 1-based position.
    pub fn enqueue(&mut self, visitor: VisitorRecord) -> usize {
        self.waiting_line.push_back(visitor);
        self.waiting_line.len()
    }

    /// `Closed` or `Maintenance` → `Open`.
    pub fn open(&mut self) -> EngineResult<()> {
        match self.status {
            RideStatus::Closed | RideStatus::Maintenance => {
                self.status = RideStatus::Open;
                Ok(())
            }
            status => Err(self.invalid(Transition::Open, status)),
        }
    }

    /// `Open` → `Running`, boarding the whole line. Returns how many
    /// visitors boarded.
    pub fn start_cycle(&mut self, now: DateTime<Utc>) -> EngineResult<usize> {
        if self.status != RideStatus::Open {
            return Err(self.invalid(Transition::StartCycle, self.status));
        }
        let ends_at = now
            .checked_add_signed(self.cycle_duration)
            .ok_or(EngineError::CycleEndOutOfRange(self.ride_id))?;

        self.boarded.extend(self.waiting_line.drain(..));
        self.cycle_ends_at = Some(ends_at);
        self.status = RideStatus::Running;
        Ok(self.boarded.len())
    }

    /// `Running` → `Open` once the cycle has ended, returning everybody
    /// who was on board.
    pub fn complete_cycle(&mut self, now: DateTime<Utc>) -> EngineResult<Vec<VisitorRecord>> {
        if self.status != RideStatus::Running || self.cycle_in_progress(now) {
            return Err(self.invalid(Transition::CompleteCycle, self.status));
        }

        self.cycle_ends_at = None;
        self.status = RideStatus::Open;
        Ok(std::mem::take(&mut self.boarded))
    }

    /// `Open`, `Running` or `Maintenance` → `Closed`. Returns boarded
    /// visitors followed by the waiting line.
    pub fn close(&mut self) -> EngineResult<Vec<VisitorRecord>> {
        match self.status {
            RideStatus::Open | RideStatus::Running | RideStatus::Maintenance => {
                self.status = RideStatus::Closed;
                Ok(self.release_all())
            }
            status => Err(self.invalid(Transition::Close, status)),
        }
    }

    /// Any status → `Maintenance`. Returns released visitors like [`close`](Self::close).
    pub fn to_maintenance(&mut self) -> Vec<VisitorRecord> {
        self.status = RideStatus::Maintenance;
        self.release_all()
    }

    fn release_all(&mut self) -> Vec<VisitorRecord> {
        self.cycle_ends_at = None;
        let mut released = std::mem::take(&mut self.boarded);
        released.extend(self.waiting_line.drain(..));
        released
    }

    fn invalid(&self, transition: Transition, status: RideStatus) -> EngineError {
        EngineError::InvalidTransition {
            ride_id: self.ride_id,
            transition,
            status,
        }
    }

    pub(crate) fn line_ids(&self) -> Vec<VisitorId> {
        self.waiting_line.iter().map(|v| v.id).collect()
    }

    pub(crate) fn boarded_ids(&self) -> Vec<VisitorId> {
        self.boarded.iter().map(|v| v.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn visitor(name: &str) -> VisitorRecord {
        VisitorRecord::new(VisitorId::generate(), name)
    }

    fn closed_state() -> RideState {
        RideState::new(RideId::generate(), Duration::seconds(90))
    }

    fn assert_invariants(state: &RideState) {
        if state.status() != RideStatus::Running {
            assert!(state.boarded().is_empty(), "boarded outside Running");
        }
        assert_eq!(
            state.cycle_ends_at().is_some(),
            state.status() == RideStatus::Running,
            "cycle timer out of sync with status"
        );
    }

    #[test]
    fn test_open_from_closed() {
        let mut state = closed_state();
        state.open().unwrap();
        assert_eq!(state.status(), RideStatus::Open);
        assert!(state.cycle_ends_at().is_none());
    }

    #[test]
    fn test_open_twice_is_invalid() {
        let mut state = closed_state();
        state.open().unwrap();

        let err = state.open().unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidTransition {
                transition: Transition::Open,
                status: RideStatus::Open,
                ..
            }
        ));
    }

    #[test]
    fn test_start_cycle_requires_open() {
        let mut state = closed_state();
        assert!(state.start_cycle(Utc::now()).is_err());
        assert_eq!(state.status(), RideStatus::Closed);
    }

    #[test]
    fn test_boarding_drains_the_line() {
        let mut state = closed_state();
        state.open().unwrap();
        let v1 = visitor("Anna");
        let v2 = visitor("Bram");
        state.enqueue(v1.clone());
        state.enqueue(v2.clone());

        let now = Utc::now();
        assert_eq!(state.start_cycle(now).unwrap(), 2);
        assert_eq!(state.line_len(), 0);
        assert_eq!(state.cycle_ends_at(), Some(now + Duration::seconds(90)));

        let unboarded = state
            .complete_cycle(now + Duration::seconds(90))
            .unwrap();
        assert_eq!(unboarded, vec![v1, v2]);
        assert!(state.boarded().is_empty());
        assert_eq!(state.status(), RideStatus::Open);
    }

    #[test]
    fn test_cycle_end_out_of_range_leaves_ride_open() {
        let mut state = RideState::new(RideId::generate(), Duration::seconds(1_000_000_000_000_000));
        state.open().unwrap();
        state.enqueue(visitor("Anna"));

        assert!(matches!(
            state.start_cycle(Utc::now()),
            Err(EngineError::CycleEndOutOfRange(_))
        ));
        assert_eq!(state.status(), RideStatus::Open);
        assert_eq!(state.line_len(), 1);
        assert_invariants(&state);
    }

    #[test]
    fn test_complete_cycle_before_end_is_invalid() {
        let mut state = closed_state();
        state.open().unwrap();
        state.enqueue(visitor("Anna"));
        let now = Utc::now();
        state.start_cycle(now).unwrap();

        assert!(state.complete_cycle(now + Duration::seconds(30)).is_err());
        assert_eq!(state.status(), RideStatus::Running);
        assert_eq!(state.boarded().len(), 1);
    }

    #[test]
    fn test_close_releases_boarded_and_line() {
        let mut state = closed_state();
        state.open().unwrap();
        let rider = visitor("Anna");
        state.enqueue(rider.clone());
        state.start_cycle(Utc::now()).unwrap();
        let waiting = visitor("Bram");
        state.enqueue(waiting.clone());

        let released = state.close().unwrap();
        assert_eq!(released, vec![rider, waiting]);
        assert_eq!(state.status(), RideStatus::Closed);
        assert_invariants(&state);
    }

    #[test]
    fn test_close_when_closed_is_invalid() {
        let mut state = closed_state();
        assert!(matches!(
            state.close(),
            Err(EngineError::InvalidTransition {
                transition: Transition::Close,
                status: RideStatus::Closed,
                ..
            })
        ));

        state.to_maintenance();
        assert!(state.close().unwrap().is_empty());
        assert_eq!(state.status(), RideStatus::Closed);
    }

    #[test]
    fn test_maintenance_is_idempotent() {
        let mut state = closed_state();
        state.to_maintenance();
        state.to_maintenance();
        assert_eq!(state.status(), RideStatus::Maintenance);

        state.open().unwrap();
        assert_eq!(state.status(), RideStatus::Open);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Open,
        Enqueue,
        Start,
        Complete(i64),
        Close,
        Maintenance,
    }

    fn arb_op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Open),
            Just(Op::Enqueue),
            Just(Op::Start),
            (0i64..180).prop_map(Op::Complete),
            Just(Op::Close),
            Just(Op::Maintenance),
        ]
    }

    proptest! {
        #[test]
        fn prop_invariants_hold_after_every_transition(ops in prop::collection::vec(arb_op(), 1..60)) {
            let mut state = closed_state();
            let mut clock = Utc::now();

            for op in ops {
                match op {
                    Op::Open => { let _ = state.open(); }
                    Op::Enqueue => { state.enqueue(visitor("guest")); }
                    Op::Start => { let _ = state.start_cycle(clock); }
                    Op::Complete(elapsed) => {
                        clock += Duration::seconds(elapsed);
                        let _ = state.complete_cycle(clock);
                    }
                    Op::Close => { let _ = state.close(); }
                    Op::Maintenance => { state.to_maintenance(); }
                }
                assert_invariants(&state);
            }
        }

        #[test]
        fn prop_no_visitor_lost_or_duplicated(ops in prop::collection::vec(arb_op(), 1..60)) {
            let mut state = closed_state();
            let mut clock = Utc::now();
            let mut admitted = 0usize;
            let mut released = 0usize;

            for op in ops {
                match op {
                    Op::Open => { let _ = state.open(); }
                    Op::Enqueue => { state.enqueue(visitor("guest")); admitted += 1; }
                    Op::Start => { let _ = state.start_cycle(clock); }
                    Op::Complete(elapsed) => {
                        clock += Duration::seconds(elapsed);
                        if let Ok(out) = state.complete_cycle(clock) { released += out.len(); }
                    }
                    Op::Close => { if let Ok(out) = state.close() { released += out.len(); } }
                    Op::Maintenance => { released += state.to_maintenance().len(); }
                }
            }

            prop_assert_eq!(admitted, released + state.line_len() + state.boarded().len());
        }
    }
}
