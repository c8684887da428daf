// ── Platform controller ──
//
// Startup ordering for one alarm controller: validate configuration,
// discover entities exactly once, then start polling when the host
// says it is ready.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::client::{RemoteStateClient, build_vedo_client};
use crate::config::PlatformConfig;
use crate::error::CoreError;
use crate::model::{ALARM_ENTITY_NAME, AlarmEntity, ZoneEntity};
use crate::reconcile::{ReconcileHandle, ReconciliationLoop};
use crate::store::{Entity, EntityRegistry};

/// Owns the entity registry and the polling loop for one controller.
///
/// Lifecycle: [`discover()`](Self::discover) once, then
/// [`start()`](Self::start) once after the host's own initialization.
pub struct Platform {
    config: PlatformConfig,
    /// `None` when the configuration is unusable.
    client: Option<Arc<dyn RemoteStateClient>>,
    registry: OnceLock<Arc<EntityRegistry>>,
    discovered: AtomicBool,
    started: AtomicBool,
    cancel: CancellationToken,
}

impl Platform {
    /// Create a platform around an existing client.
    pub fn new(config: PlatformConfig, client: Arc<dyn RemoteStateClient>) -> Self {
        Self::with_client(config, Some(client))
    }

    /// Create a platform talking HTTP to the configured controller.
    ///
    /// An incomplete configuration is not an error here: the platform is
    /// built without a client and [`discover()`](Self::discover) yields no
    /// entities. A malformed address is.
    pub fn connect(config: PlatformConfig) -> Result<Self, CoreError> {
        let client: Option<Arc<dyn RemoteStateClient>> = if config.has_valid_config() {
            Some(Arc::new(build_vedo_client(&config)?))
        } else {
            None
        };
        Ok(Self::with_client(config, client))
    }

    fn with_client(config: PlatformConfig, client: Option<Arc<dyn RemoteStateClient>>) -> Self {
        info!(
            address = %config.alarm_address,
            port = config.alarm_port,
            code = "******",
            map_sensors = config.map_sensors,
            update_interval = ?config.update_interval,
            area_mapping = ?config.area_mapping,
            "initializing platform"
        );
        Self {
            config,
            client,
            registry: OnceLock::new(),
            discovered: AtomicBool::new(false),
            started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// The registry, once discovery produced one.
    pub fn registry(&self) -> Option<&Arc<EntityRegistry>> {
        self.registry.get()
    }

    /// Build the entity set: the alarm, plus one zone entity per described
    /// zone when `map_sensors` is on.
    ///
    /// Returns all entities in one list, alarm first. An invalid
    /// configuration yields an empty list. May only run once.
    pub async fn discover(&self) -> Result<Vec<Entity>, CoreError> {
        if self.discovered.swap(true, Ordering::SeqCst) {
            return Err(CoreError::AlreadyDiscovered);
        }

        let client = match &self.client {
            Some(client) if self.config.has_valid_config() => client,
            _ => {
                error!(
                    address = %self.config.alarm_address,
                    "invalid configuration: alarm_address and alarm_code are required"
                );
                return Ok(Vec::new());
            }
        };

        info!(
            address = %self.config.alarm_address,
            port = self.config.alarm_port,
            "mapping VEDO alarm"
        );
        let alarm = AlarmEntity::new(ALARM_ENTITY_NAME, self.config.area_mapping.clone());

        let zones = if self.config.map_sensors {
            match client.fetch_zones().await {
                Ok(Some(zones)) => zones
                    .into_iter()
                    .filter(|z| !z.description.is_empty())
                    .map(|z| ZoneEntity::new(z.description.clone(), z))
                    .collect(),
                Ok(None) => {
                    info!("controller reported no zones");
                    Vec::new()
                }
                Err(e) => {
                    warn!(error = %e, "zone discovery failed, registering the alarm only");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let registry = Arc::new(EntityRegistry::new(alarm, zones));
        info!(zones = registry.zone_count(), "entities discovered");
        let entities = registry.entities();
        // `discovered` guards this, so the cell is always empty here.
        let _ = self.registry.set(registry);
        Ok(entities)
    }

    /// Host ready signal: arm the polling loop.
    ///
    /// Returns `None` when discovery produced nothing to poll (invalid
    /// configuration or discovery never ran). May only succeed once.
    pub fn start(&self) -> Result<Option<ReconcileHandle>, CoreError> {
        let (Some(registry), Some(client)) = (self.registry.get(), self.client.as_ref()) else {
            warn!("nothing registered, polling not started");
            return Ok(None);
        };

        if self.started.swap(true, Ordering::SeqCst) {
            return Err(CoreError::AlreadyStarted);
        }

        let reconciler = ReconciliationLoop::new(
            Arc::clone(client),
            Arc::clone(registry),
            self.config.poll_interval(),
            self.config.map_sensors,
        )
        .with_tick_timeout(self.config.tick_timeout);
        info!(
            every_secs = reconciler.interval().as_secs_f64(),
            zones = registry.zone_count(),
            "setting up polling"
        );

        Ok(Some(reconciler.spawn(self.cancel.child_token())))
    }

    /// Stop polling (if running) and release the controller session.
    pub async fn shutdown(&self, handle: Option<ReconcileHandle>) {
        self.cancel.cancel();
        if let Some(handle) = handle {
            handle.shutdown().await;
        }
        if let Some(client) = &self.client {
            if let Err(e) = client.close().await {
                warn!(error = %e, "logout failed (non-fatal)");
            }
        }
    }
}
