//! Engine wiring.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::admin::RideAdmin;
use crate::collaborators::{EventPublisher, StaffingPolicy, VisitorLookup};
use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::fixtures::load_fixtures;
use crate::gateway::QueueGateway;
use crate::registry::RideRegistry;
use crate::resolver::NearestRideResolver;
use crate::ride::RideDefinition;
use crate::scheduler::{DispatchScheduler, SchedulerHandle};

/// All engine services around one shared registry.
pub struct RideEngine {
    config: EngineConfig,
    registry: Arc<RideRegistry>,
    gateway: Arc<QueueGateway>,
    resolver: Arc<NearestRideResolver>,
    admin: Arc<RideAdmin>,
    scheduler: Arc<DispatchScheduler>,
}

impl RideEngine {
    pub fn new(
        config: EngineConfig,
        definitions: Vec<RideDefinition>,
        visitors: Arc<dyn VisitorLookup>,
        publisher: Arc<dyn EventPublisher>,
        staffing: Arc<dyn StaffingPolicy>,
    ) -> EngineResult<Self> {
        let registry = Arc::new(RideRegistry::new(definitions)?);

        let gateway = Arc::new(QueueGateway::new(
            registry.clone(),
            visitors,
            publisher.clone(),
        ));
        let resolver = Arc::new(NearestRideResolver::new(registry.clone()));
        let admin = Arc::new(RideAdmin::new(
            registry.clone(),
            publisher.clone(),
            staffing,
        ));
        let scheduler = Arc::new(DispatchScheduler::new(
            registry.clone(),
            publisher,
            config.dispatch.clone(),
        ));

        Ok(Self {
            config,
            registry,
            gateway,
            resolver,
            admin,
            scheduler,
        })
    }

    /// Build the engine from the fixture file named in `config`.
    pub fn from_fixtures(
        config: EngineConfig,
        visitors: Arc<dyn VisitorLookup>,
        publisher: Arc<dyn EventPublisher>,
        staffing: Arc<dyn StaffingPolicy>,
    ) -> EngineResult<Self> {
        let default_cycle = Duration::from_secs(config.fixtures.default_cycle_duration_secs);
        let definitions = load_fixtures(&config.fixtures.path, default_cycle)?;
        info!(path = %config.fixtures.path.display(), rides = definitions.len(), "Ride fixtures loaded");
        Self::new(config, definitions, visitors, publisher, staffing)
    }

    /// Spawn the dispatch loop.
    pub fn start(&self) -> SchedulerHandle {
        self.scheduler.clone().spawn()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<RideRegistry> {
        &self.registry
    }

    pub fn gateway(&self) -> &Arc<QueueGateway> {
        &self.gateway
    }

    pub fn resolver(&self) -> &Arc<NearestRideResolver> {
        &self.resolver
    }

    pub fn admin(&self) -> &Arc<RideAdmin> {
        &self.admin
    }

    pub fn scheduler(&self) -> &Arc<DispatchScheduler> {
        &self.scheduler
    }
}
