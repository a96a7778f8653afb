//! Shared fixtures for the ride engine integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ride_engine::{
    EngineError, EngineResult, EventPublisher, NoStaffingRequirements, RideAdmin,
    RideDefinition, RideRegistry, VisitorLookup,
};
use ride_types::{Coordinates, RideEvent, RideEventEnvelope, RideId, VisitorId, VisitorRecord};

/// Publisher that keeps every event for later inspection.
#[derive(Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<RideEventEnvelope>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<RideEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|envelope| envelope.event.clone())
            .collect()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: RideEventEnvelope) -> EngineResult<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Visitor service backed by a map. Unknown visitors get a generated name
/// unless `strict` is set.
#[derive(Default)]
pub struct InMemoryVisitors {
    known: Mutex<HashMap<VisitorId, VisitorRecord>>,
    strict: bool,
    unavailable: bool,
}

impl InMemoryVisitors {
    pub fn lenient() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, record: VisitorRecord) {
        self.known.lock().unwrap().insert(record.id, record);
    }
}

#[async_trait]
impl VisitorLookup for InMemoryVisitors {
    async fn get_visitor(&self, visitor_id: VisitorId) -> EngineResult<VisitorRecord> {
        if self.unavailable {
            return Err(EngineError::VisitorLookupFailed {
                visitor_id,
                reason: "connection refused".to_string(),
            });
        }

        // Give other tasks a chance to interleave with the lookup.
        tokio::task::yield_now().await;

        match self.known.lock().unwrap().get(&visitor_id) {
            Some(record) => Ok(record.clone()),
            None if self.strict => Err(EngineError::VisitorNotFound(visitor_id)),
            None => Ok(VisitorRecord::new(visitor_id, format!("guest-{}", visitor_id.as_uuid()))),
        }
    }
}

/// Route engine logs to the test harness. `RUST_LOG=ride_engine=debug`
/// shows dispatch decisions for a failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn ride(name: &str, latitude: f64, longitude: f64, cycle_secs: u64) -> RideDefinition {
    init_tracing();
    RideDefinition {
        id: RideId::generate(),
        name: name.to_string(),
        location: Coordinates::new(latitude, longitude),
        cycle_duration: Duration::from_secs(cycle_secs),
    }
}

/// Single-ride registry with a 60 second cycle.
pub fn single_ride() -> (Arc<RideRegistry>, RideId) {
    let def = ride("Python", 51.6498, 5.0437, 60);
    let id = def.id;
    (Arc::new(RideRegistry::new(vec![def]).unwrap()), id)
}

pub fn admin(registry: &Arc<RideRegistry>, publisher: Arc<RecordingPublisher>) -> RideAdmin {
    RideAdmin::new(registry.clone(), publisher, Arc::new(NoStaffingRequirements))
}
