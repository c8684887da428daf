// ── Alarm entity ──

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use vedolink_api::AreaState;

use crate::config::AreaMapping;
use crate::stream::EntityStream;

/// Name of the singleton alarm entity.
pub const ALARM_ENTITY_NAME: &str = "VEDO Alarm";

/// Semantic arming mode derived from the area list and the area mapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlarmMode {
    #[default]
    Disarmed,
    Away,
    Night,
    Home,
    Triggered,
}

impl AlarmMode {
    /// Classify the current area list.
    ///
    /// A triggered area wins. Otherwise the first mapping (away, then
    /// night, then home) naming an armed area decides; armed areas that no
    /// mapping names count as away.
    pub fn classify(areas: &[AreaState], mapping: &AreaMapping) -> Self {
        if areas.iter().any(AreaState::triggered) {
            return Self::Triggered;
        }

        let armed: Vec<&str> = areas
            .iter()
            .filter(|a| a.armed())
            .map(|a| a.description.as_str())
            .collect();
        if armed.is_empty() {
            return Self::Disarmed;
        }

        let names_armed = |list: &[String]| list.iter().any(|name| armed.contains(&name.as_str()));
        if names_armed(&mapping.away_areas) {
            Self::Away
        } else if names_armed(&mapping.night_areas) {
            Self::Night
        } else if names_armed(&mapping.home_areas) {
            Self::Home
        } else {
            Self::Away
        }
    }

    pub fn is_armed(self) -> bool {
        matches!(self, Self::Away | Self::Night | Self::Home)
    }
}

/// Last applied area list and its derived mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmSnapshot {
    pub areas: Vec<AreaState>,
    pub mode: AlarmMode,
    /// `None` until the first update.
    pub updated_at: Option<DateTime<Utc>>,
}

/// The singleton alarm entity.
///
/// Created once at startup and mutated only through [`update`](Self::update).
pub struct AlarmEntity {
    name: String,
    mapping: AreaMapping,
    state: watch::Sender<Arc<AlarmSnapshot>>,
    /// Bumped on every update that changed the snapshot.
    revision: AtomicU64,
}

impl AlarmEntity {
    pub fn new(name: impl Into<String>, mapping: AreaMapping) -> Self {
        let (state, _) = watch::channel(Arc::new(AlarmSnapshot::default()));
        Self {
            name: name.into(),
            mapping,
            state,
            revision: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapping(&self) -> &AreaMapping {
        &self.mapping
    }

    /// Apply the full area list from a poll.
    ///
    /// Idempotent: re-applying the last known list changes nothing and
    /// notifies no subscriber.
    pub fn update(&self, areas: &[AreaState]) {
        let changed = self.state.send_if_modified(|snap| {
            if snap.updated_at.is_some() && snap.areas == areas {
                return false;
            }
            *snap = Arc::new(AlarmSnapshot {
                areas: areas.to_vec(),
                mode: AlarmMode::classify(areas, &self.mapping),
                updated_at: Some(Utc::now()),
            });
            true
        });

        if changed {
            self.revision.fetch_add(1, Ordering::Relaxed);
            debug!(entity = %self.name, mode = %self.mode(), "alarm state changed");
        }
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<AlarmSnapshot> {
        self.state.borrow().clone()
    }

    pub fn mode(&self) -> AlarmMode {
        self.state.borrow().mode
    }

    /// Number of effective state changes so far.
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::Relaxed)
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> EntityStream<AlarmSnapshot> {
        EntityStream::new(self.state.subscribe())
    }
}
