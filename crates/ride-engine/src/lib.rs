//! # Ride Engine - Ride Lifecycle and Queueing
//!
//! Runtime core of a theme park's ride operations: every ride's status, its
//! waiting line, the board → run → unboard dispatch cycle, and routing of
//! visitors and staff to the nearest ride they have not been sent to yet.
//!
//! ## Key Components
//!
//! - [`RideRegistry`]: all rides, fixed at startup
//! - [`RideState`]: the per-ride state machine
//! - [`QueueGateway`]: visitors joining lines, staff moving between rides
//! - [`DispatchScheduler`]: the background dispatch loop
//! - [`NearestRideResolver`]: greedy nearest-ride routing with exclusions
//! - [`RideAdmin`]: opening, closing and maintenance
//! - [`RideEngine`]: all of the above wired around one registry
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ride_engine::{
//!     BroadcastEventPublisher, EngineConfig, NoStaffingRequirements, RideEngine,
//!     VisitorLookup,
//! };
//!
//! # async fn example(visitors: Arc<dyn VisitorLookup>) -> ride_engine::EngineResult<()> {
//! let config = EngineConfig::load(Some("rides.toml"))?;
//! let publisher = Arc::new(BroadcastEventPublisher::default());
//! let mut events = publisher.subscribe();
//!
//! let engine = RideEngine::from_fixtures(
//!     config,
//!     visitors,
//!     publisher,
//!     Arc::new(NoStaffingRequirements),
//! )?;
//!
//! engine.admin().open_all().await;
//! let dispatch = engine.start();
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{:?}", event.event);
//! }
//!
//! engine.admin().close_all().await;
//! dispatch.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Each ride has its own async mutex around its [`RideState`]. The dispatch
//! loop, admission and admin operations all go through it, and no event is
//! published while it is held. Visitor lookups happen before the lock is
//! taken.

pub mod admin;
pub mod collaborators;
pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod gateway;
pub mod registry;
pub mod resolver;
pub mod ride;
pub mod scheduler;
pub mod state;

// Re-export main types
pub use admin::RideAdmin;
pub use collaborators::{
    BroadcastEventPublisher, EventPublisher, NoOpEventPublisher, NoStaffingRequirements,
    StaffingPolicy, VisitorLookup,
};
pub use config::{
    DispatchConfig, EngineConfig, FixtureConfig, LoggingConfig, VisitorServiceConfig,
};
pub use distance::{DistanceIndex, DistanceTable};
pub use engine::RideEngine;
pub use error::{EngineError, EngineResult};
pub use fixtures::{load_fixtures, parse_fixtures, RideFixture};
pub use gateway::{Admission, QueueGateway};
pub use registry::RideRegistry;
pub use resolver::NearestRideResolver;
pub use ride::{Ride, RideDefinition, RideSnapshot, MAX_CYCLE_DURATION};
pub use scheduler::{DispatchScheduler, SchedulerHandle, TickReport};
pub use state::{RideState, Transition};
