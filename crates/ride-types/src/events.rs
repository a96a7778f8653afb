//! Event types published by the ride engine
//!
//! Events tell the rest of the park which visitors became free again, either
//! because a run cycle ended or because a ride turned them away.

use crate::{RideId, RideStatus, VisitorId};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Envelope wrapping every ride event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideEventEnvelope {
    /// Unique event ID
    pub id: Uuid,

    /// Event timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Event source
    pub source: EventSource,

    /// The actual event
    pub event: RideEvent,
}

impl RideEventEnvelope {
    /// Wrap an event emitted by a ride.
    pub fn from_ride(event: RideEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Utc::now(),
            source: EventSource::Ride,
            event,
        }
    }

    pub fn event_type(&self) -> EventType {
        self.event.event_type()
    }

    /// Flat key/value view for transports that do not carry typed events.
    pub fn payload(&self) -> BTreeMap<String, Value> {
        self.event.payload()
    }
}

/// Event sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    /// Ride lifecycle and queueing
    Ride,
}

/// Type tag carried alongside the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// Visitors left a ride and are free for their next activity
    VisitorsUnboarded,
    /// A visitor was not admitted to a ride's line
    VisitorRejected,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventType::VisitorsUnboarded => write!(f, "visitors_unboarded"),
            EventType::VisitorRejected => write!(f, "visitor_rejected"),
        }
    }
}

/// Ride events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RideEvent {
    /// A cycle completed or the ride was taken out of service with visitors on it.
    VisitorsUnboarded {
        ride_id: RideId,
        visitor_ids: Vec<VisitorId>,
    },

    /// The ride was not accepting visitors when one tried to join the line.
    VisitorRejected {
        ride_id: RideId,
        visitor_id: VisitorId,
        status: RideStatus,
    },
}

impl RideEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            RideEvent::VisitorsUnboarded { .. } => EventType::VisitorsUnboarded,
            RideEvent::VisitorRejected { .. } => EventType::VisitorRejected,
        }
    }

    pub fn ride_id(&self) -> RideId {
        match self {
            RideEvent::VisitorsUnboarded { ride_id, .. } => *ride_id,
            RideEvent::VisitorRejected { ride_id, .. } => *ride_id,
        }
    }

    /// Visitors this event frees up.
    pub fn visitor_ids(&self) -> Vec<VisitorId> {
        match self {
            RideEvent::VisitorsUnboarded { visitor_ids, .. } => visitor_ids.clone(),
            RideEvent::VisitorRejected { visitor_id, .. } => vec![*visitor_id],
        }
    }

    /// Key/value payload: always `rideId` and `visitorIds`, plus `status` for rejections.
    pub fn payload(&self) -> BTreeMap<String, Value> {
        let mut payload = BTreeMap::new();
        payload.insert(
            "rideId".to_string(),
            json!(self.ride_id().as_uuid().to_string()),
        );
        payload.insert(
            "visitorIds".to_string(),
            Value::Array(
                self.visitor_ids()
                    .iter()
                    .map(|id| json!(id.as_uuid().to_string()))
                    .collect(),
            ),
        );
        if let RideEvent::VisitorRejected { status, .. } = self {
            payload.insert("status".to_string(), json!(status.to_string()));
        }
        payload
    }
}
