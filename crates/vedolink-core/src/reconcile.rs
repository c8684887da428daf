// ── Reconciliation loop ──
//
// Polls the controller on a fixed delay and applies what it finds onto
// the entity registry. The delay is measured from the end of one tick to
// the start of the next, so ticks never overlap however slow the
// controller is. Failures end the tick, never the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::client::RemoteStateClient;
use crate::error::CoreError;
use crate::store::EntityRegistry;

/// What one tick observed and applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Areas applied to the alarm entity.
    pub areas: usize,
    /// Zones routed to a registered entity.
    pub zones_applied: usize,
    /// Zone descriptions with no registered entity.
    pub zones_missing: Vec<String>,
    /// The alarm read returned nothing; no update was made.
    pub alarm_absent: bool,
    /// The zone read returned nothing.
    pub zones_absent: bool,
}

/// Loop progress, observable through [`ReconcileHandle::status`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopStatus {
    /// Completed ticks, failed ones included.
    pub ticks: u64,
    pub failures: u64,
    pub last_report: Option<TickReport>,
    pub last_error: Option<String>,
}

/// The poll-fetch-reconcile engine.
///
/// Holds shared references to the client and the registry: enough to
/// mutate entities, never to create or drop them.
pub struct ReconciliationLoop {
    client: Arc<dyn RemoteStateClient>,
    registry: Arc<EntityRegistry>,
    interval: Duration,
    map_sensors: bool,
    tick_timeout: Option<Duration>,
}

impl ReconciliationLoop {
    pub fn new(
        client: Arc<dyn RemoteStateClient>,
        registry: Arc<EntityRegistry>,
        interval: Duration,
        map_sensors: bool,
    ) -> Self {
        Self {
            client,
            registry,
            interval,
            map_sensors,
            tick_timeout: None,
        }
    }

    /// Bound each whole tick by `timeout`.
    pub fn with_tick_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.tick_timeout = timeout;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one poll-fetch-reconcile pass.
    ///
    /// Alarm state is applied before zones. Zones are only read when the
    /// alarm read reported something and zone mapping is enabled.
    pub async fn tick(&self) -> Result<TickReport, CoreError> {
        let mut report = TickReport::default();

        let Some(areas) = self.client.check_alarm().await? else {
            report.alarm_absent = true;
            return Ok(report);
        };

        debug!(
            count = areas.len(),
            areas = %join_descriptions(areas.iter().map(|a| a.description.as_str())),
            "found areas"
        );
        self.registry.apply_areas(&areas);
        report.areas = areas.len();

        if !self.map_sensors {
            return Ok(report);
        }

        match self.client.fetch_zones().await? {
            Some(zones) if !zones.is_empty() => {
                debug!(
                    count = zones.len(),
                    zones = %join_descriptions(
                        zones.iter().map(|z| z.description.as_str()).filter(|d| !d.is_empty())
                    ),
                    "found zones"
                );
                let outcome = self.registry.apply_zones(&zones);
                report.zones_applied = outcome.applied;
                report.zones_missing = outcome.missing;
            }
            _ => {
                warn!("no zone found");
                report.zones_absent = true;
            }
        }

        Ok(report)
    }

    /// [`tick`](Self::tick) under the optional per-tick timeout.
    async fn bounded_tick(&self) -> Result<TickReport, CoreError> {
        match self.tick_timeout {
            Some(limit) => tokio::time::timeout(limit, self.tick())
                .await
                .unwrap_or_else(|_| {
                    Err(CoreError::TickTimeout {
                        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                    })
                }),
            None => self.tick().await,
        }
    }

    /// Spawn the loop onto the current runtime.
    ///
    /// The first tick fires one interval after this call. Cancelling
    /// `cancel` stops the loop at the next tick boundary; a tick in
    /// flight always completes.
    pub fn spawn(self, cancel: CancellationToken) -> ReconcileHandle {
        let (status_tx, status_rx) = watch::channel(LoopStatus::default());
        let task = tokio::spawn(self.run(cancel.clone(), status_tx));
        ReconcileHandle {
            cancel,
            status: status_rx,
            task,
        }
    }

    async fn run(self, cancel: CancellationToken, status: watch::Sender<LoopStatus>) {
        info!(
            interval_secs = self.interval.as_secs_f64(),
            map_sensors = self.map_sensors,
            "polling started"
        );

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.interval) => {
                    let result = self.bounded_tick().await;
                    if let Err(ref e) = result {
                        error!(error = %e, detail = ?e, "poll tick failed");
                    }
                    status.send_modify(|s| {
                        s.ticks += 1;
                        match result {
                            Ok(report) => s.last_report = Some(report),
                            Err(e) => {
                                s.failures += 1;
                                s.last_error = Some(e.to_string());
                            }
                        }
                    });
                }
            }
        }

        info!("polling stopped");
    }
}

fn join_descriptions<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// Owner's handle on a running loop.
pub struct ReconcileHandle {
    cancel: CancellationToken,
    status: watch::Receiver<LoopStatus>,
    task: JoinHandle<()>,
}

impl ReconcileHandle {
    /// Progress of the loop.
    pub fn status(&self) -> watch::Receiver<LoopStatus> {
        self.status.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the loop and wait for the task to end.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "polling task ended abnormally");
        }
    }
}
