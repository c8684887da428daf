// ── Zone (sensor) entity ──

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use vedolink_api::{ZoneState, ZoneStatus};

use crate::stream::EntityStream;

/// Last applied zone state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneSnapshot {
    pub zone: ZoneState,
    pub updated_at: DateTime<Utc>,
}

/// One sensor point, identified by its description on the controller.
///
/// The name is fixed at creation; only the status moves, through
/// [`update`](Self::update).
pub struct ZoneEntity {
    name: String,
    state: watch::Sender<Arc<ZoneSnapshot>>,
    revision: AtomicU64,
}

impl ZoneEntity {
    /// Create an entity seeded with the zone's state at discovery time.
    pub fn new(name: impl Into<String>, initial: ZoneState) -> Self {
        let (state, _) = watch::channel(Arc::new(ZoneSnapshot {
            zone: initial,
            updated_at: Utc::now(),
        }));
        Self {
            name: name.into(),
            state,
            revision: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Apply this zone's state from a poll. No-op when nothing moved.
    pub fn update(&self, zone: &ZoneState) {
        let changed = self.state.send_if_modified(|snap| {
            if snap.zone == *zone {
                return false;
            }
            *snap = Arc::new(ZoneSnapshot {
                zone: zone.clone(),
                updated_at: Utc::now(),
            });
            true
        });

        if changed {
            self.revision.fetch_add(1, Ordering::Relaxed);
            debug!(zone = %self.name, status = ?zone.status, "zone state changed");
        }
    }

    pub fn snapshot(&self) -> Arc<ZoneSnapshot> {
        self.state.borrow().clone()
    }

    pub fn status(&self) -> ZoneStatus {
        self.state.borrow().zone.status
    }

    pub fn is_open(&self) -> bool {
        self.state.borrow().zone.is_open()
    }

    pub fn is_faulted(&self) -> bool {
        self.state.borrow().zone.is_faulted()
    }

    /// Number of effective state changes since discovery.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    pub fn subscribe(&self) -> EntityStream<ZoneSnapshot> {
        EntityStream::new(self.state.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kitchen(status: ZoneStatus) -> ZoneState {
        ZoneState {
            index: 3,
            description: "Kitchen".into(),
            area: 1,
            status,
        }
    }

    #[test]
    fn update_tracks_status_changes_only() {
        let entity = ZoneEntity::new("Kitchen", kitchen(ZoneStatus::empty()));
        assert!(!entity.is_open());

        entity.update(&kitchen(ZoneStatus::empty()));
        assert_eq!(entity.revision(), 0);

        entity.update(&kitchen(ZoneStatus::OPEN));
        assert_eq!(entity.revision(), 1);
        assert!(entity.is_open());
        assert!(!entity.is_faulted());

        entity.update(&kitchen(ZoneStatus::OPEN | ZoneStatus::ALARM));
        assert!(entity.is_faulted());
        assert_eq!(entity.name(), "Kitchen");
    }
}
