//! Dispatch loop.
//!
//! Every tick visits all rides concurrently. A running ride whose cycle has
//! ended unboards its riders, and any open ride boards its whole line and
//! starts the next cycle. Rides that are closed or in maintenance are left
//! alone.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use ride_types::{RideEvent, RideEventEnvelope, RideId, RideStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::collaborators::{publish_logged, EventPublisher};
use crate::config::DispatchConfig;
use crate::error::{EngineError, EngineResult};
use crate::registry::RideRegistry;
use crate::ride::Ride;

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Rides whose cycle ended this tick.
    pub completed: Vec<RideId>,

    /// Rides that boarded their line and started a cycle.
    pub started: Vec<RideId>,

    /// Rides left untouched (mid-cycle, closed or in maintenance).
    pub skipped: Vec<RideId>,

    /// Rides that could not be processed this tick.
    pub failed: Vec<RideId>,
}

impl TickReport {
    pub fn is_idle(&self) -> bool {
        self.completed.is_empty() && self.started.is_empty()
    }
}

#[derive(Debug)]
enum RideOutcome {
    Skipped,
    /// A cycle started; `completed` when a previous one ended first.
    Started { completed: bool },
}

/// Drives the board → run → unboard cycle of every ride.
pub struct DispatchScheduler {
    registry: Arc<RideRegistry>,
    publisher: Arc<dyn EventPublisher>,
    config: DispatchConfig,
}

impl DispatchScheduler {
    pub fn new(
        registry: Arc<RideRegistry>,
        publisher: Arc<dyn EventPublisher>,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            publisher,
            config,
        }
    }

    /// Run one pass over all rides as of `now`.
    pub async fn tick(&self, now: DateTime<Utc>) -> TickReport {
        let rides = self.registry.all();
        let outcomes = join_all(rides.iter().map(|ride| self.advance(ride, now))).await;

        let mut report = TickReport::default();
        for (ride, outcome) in rides.iter().zip(outcomes) {
            match outcome {
                Ok(RideOutcome::Skipped) => report.skipped.push(ride.id()),
                Ok(RideOutcome::Started { completed }) => {
                    if completed {
                        report.completed.push(ride.id());
                    }
                    report.started.push(ride.id());
                }
                Err(e) => {
                    warn!(ride_id = %ride.id(), ride = ride.name(), error = %e, "Dispatch failed for ride");
                    report.failed.push(ride.id());
                }
            }
        }

        report
    }

    async fn advance(&self, ride: &Ride, now: DateTime<Utc>) -> EngineResult<RideOutcome> {
        let (unboarded, outcome) = {
            let mut state = tokio::time::timeout(self.config.lock_wait(), ride.lock())
                .await
                .map_err(|_| EngineError::LockTimeout(ride.id()))?;

            let status = state.status();
            if !status.is_dispatchable() || state.cycle_in_progress(now) {
                return Ok(RideOutcome::Skipped);
            }

            let (unboarded, completed) = if status == RideStatus::Running {
                let unboarded = state.complete_cycle(now)?;
                debug!(ride_id = %ride.id(), unboarded = unboarded.len(), "Cycle completed");
                (unboarded, true)
            } else {
                (Vec::new(), false)
            };

            let boarded = state.start_cycle(now)?;
            debug!(
                ride_id = %ride.id(),
                boarded,
                cycle_ends_at = ?state.cycle_ends_at(),
                "Cycle started"
            );

            (unboarded, RideOutcome::Started { completed })
        };

        if !unboarded.is_empty() {
            publish_logged(
                self.publisher.as_ref(),
                RideEventEnvelope::from_ride(RideEvent::VisitorsUnboarded {
                    ride_id: ride.id(),
                    visitor_ids: unboarded.into_iter().map(|v| v.id).collect(),
                }),
            )
            .await;
        }

        Ok(outcome)
    }

    /// Tick on the configured interval until `shutdown` flips to `true` or
    /// its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.config.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            ride_count = self.registry.len(),
            tick_interval_ms = self.config.tick_interval_ms,
            "Dispatch scheduler started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let report = self.tick(Utc::now()).await;
                    if !report.is_idle() || !report.failed.is_empty() {
                        debug!(
                            completed = report.completed.len(),
                            started = report.started.len(),
                            failed = report.failed.len(),
                            "Dispatch tick"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Dispatch scheduler stopped");
    }

    /// Start the loop on its own task.
    pub fn spawn(self: Arc<Self>) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move { self.run(shutdown_rx).await });
        SchedulerHandle { shutdown_tx, task }
    }
}

/// Handle to a running dispatch loop.
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the loop to stop and wait for it. A tick in progress finishes
    /// first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            warn!(error = %e, "Dispatch task ended abnormally");
        }
    }
}
