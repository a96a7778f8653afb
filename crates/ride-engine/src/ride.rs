//! The ride aggregate.
//!
//! Identity, location and the distance table are fixed at startup. Staff
//! assignments live in a concurrent map; everything the dispatch cycle
//! touches sits behind the ride's own lock.

use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use ride_types::{Coordinates, EmployeeId, RideId, RideStatus, VisitorId, WorkplaceSkill};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

use crate::distance::DistanceTable;
use crate::error::{EngineError, EngineResult};
use crate::state::RideState;

/// Longest run cycle a ride may have.
pub const MAX_CYCLE_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Static description of a ride, as loaded from fixtures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RideDefinition {
    pub id: RideId,
    pub name: String,
    pub location: Coordinates,
    pub cycle_duration: Duration,
}

/// A ride and its live state.
pub struct Ride {
    id: RideId,
    name: String,
    location: Coordinates,
    cycle_duration: Duration,
    distance_to: DistanceTable,
    staff: DashMap<EmployeeId, WorkplaceSkill>,
    state: Mutex<RideState>,
}

impl Ride {
    pub fn new(definition: RideDefinition, distance_to: DistanceTable) -> EngineResult<Self> {
        let cycle = chrono::Duration::from_std(definition.cycle_duration)
            .ok()
            .filter(|_| definition.cycle_duration <= MAX_CYCLE_DURATION)
            .ok_or_else(|| {
                EngineError::Fixture(format!(
                    "cycle duration of ride {} is out of range ({:?}, at most {:?})",
                    definition.name, definition.cycle_duration, MAX_CYCLE_DURATION
                ))
            })?;

        Ok(Self {
            id: definition.id,
            name: definition.name,
            location: definition.location,
            cycle_duration: definition.cycle_duration,
            distance_to,
            staff: DashMap::new(),
            state: Mutex::new(RideState::new(definition.id, cycle)),
        })
    }

    pub fn id(&self) -> RideId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Coordinates {
        self.location
    }

    pub fn cycle_duration(&self) -> Duration {
        self.cycle_duration
    }

    pub fn distance_to(&self) -> &DistanceTable {
        &self.distance_to
    }

    /// Lock the ride's mutable state. All transitions go through this guard.
    pub async fn lock(&self) -> MutexGuard<'_, RideState> {
        self.state.lock().await
    }

    pub async fn status(&self) -> RideStatus {
        self.state.lock().await.status()
    }

    /// Assign (or reassign) an employee to this ride.
    pub fn assign_staff(&self, employee_id: EmployeeId, skill: WorkplaceSkill) {
        self.staff.insert(employee_id, skill);
    }

    pub fn staff_skill(&self, employee_id: &EmployeeId) -> Option<WorkplaceSkill> {
        self.staff.get(employee_id).map(|s| *s)
    }

    pub fn staff(&self) -> Vec<(EmployeeId, WorkplaceSkill)> {
        self.staff.iter().map(|e| (*e.key(), *e.value())).collect()
    }

    /// Point-in-time read model of this ride.
    pub async fn snapshot(&self) -> RideSnapshot {
        let state = self.state.lock().await;
        RideSnapshot {
            id: self.id,
            name: self.name.clone(),
            location: self.location,
            status: state.status(),
            cycle_ends_at: state.cycle_ends_at(),
            waiting_line: state.line_ids(),
            boarded: state.boarded_ids(),
            staff_count: self.staff.len(),
        }
    }
}

impl std::fmt::Debug for Ride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ride")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("location", &self.location)
            .field("cycle_duration", &self.cycle_duration)
            .finish_non_exhaustive()
    }
}

/// Serializable view of a ride at one moment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideSnapshot {
    pub id: RideId,
    pub name: String,
    pub location: Coordinates,
    pub status: RideStatus,
    pub cycle_ends_at: Option<DateTime<Utc>>,
    pub waiting_line: Vec<VisitorId>,
    pub boarded: Vec<VisitorId>,
    pub staff_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(name: &str) -> RideDefinition {
        RideDefinition {
            id: RideId::generate(),
            name: name.to_string(),
            location: Coordinates::new(51.6498, 5.0437),
            cycle_duration: Duration::from_secs(120),
        }
    }

    #[tokio::test]
    async fn test_new_ride_is_closed() {
        let ride = Ride::new(definition("Baron 1898"), DistanceTable::default()).unwrap();
        assert_eq!(ride.status().await, RideStatus::Closed);

        let snapshot = ride.snapshot().await;
        assert_eq!(snapshot.name, "Baron 1898");
        assert!(snapshot.cycle_ends_at.is_none());
        assert!(snapshot.waiting_line.is_empty());
    }

    #[test]
    fn test_staff_assignment_upserts() {
        let ride = Ride::new(definition("Python"), DistanceTable::default()).unwrap();
        let employee = EmployeeId::generate();

        ride.assign_staff(employee, WorkplaceSkill::Host);
        ride.assign_staff(employee, WorkplaceSkill::Control);

        assert_eq!(ride.staff().len(), 1);
        assert_eq!(ride.staff_skill(&employee), Some(WorkplaceSkill::Control));
    }

    #[test]
    fn test_out_of_range_cycle_is_rejected() {
        for cycle in [
            Duration::MAX,
            Duration::from_secs(1_000_000_000_000_000),
            MAX_CYCLE_DURATION + Duration::from_secs(1),
        ] {
            let mut def = definition("Joris en de Draak");
            def.cycle_duration = cycle;
            assert!(matches!(
                Ride::new(def, DistanceTable::default()),
                Err(EngineError::Fixture(_))
            ));
        }

        let mut def = definition("Joris en de Draak");
        def.cycle_duration = MAX_CYCLE_DURATION;
        assert!(Ride::new(def, DistanceTable::default()).is_ok());
    }
}
