use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use tracing::warn;

use crate::model::{AlarmEntity, ZoneEntity};

/// One registered entity, as handed to the host on discovery.
#[derive(Clone)]
pub enum Entity {
    Alarm(Arc<AlarmEntity>),
    Zone(Arc<ZoneEntity>),
}

impl Entity {
    pub fn name(&self) -> &str {
        match self {
            Self::Alarm(alarm) => alarm.name(),
            Self::Zone(zone) => zone.name(),
        }
    }

    pub fn as_alarm(&self) -> Option<&Arc<AlarmEntity>> {
        match self {
            Self::Alarm(alarm) => Some(alarm),
            Self::Zone(_) => None,
        }
    }

    pub fn as_zone(&self) -> Option<&Arc<ZoneEntity>> {
        match self {
            Self::Zone(zone) => Some(zone),
            Self::Alarm(_) => None,
        }
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Alarm(alarm) => f.debug_tuple("Alarm").field(&alarm.name()).finish(),
            Self::Zone(zone) => f.debug_tuple("Zone").field(&zone.name()).finish(),
        }
    }
}

/// The alarm entity and the zone entities keyed by correlation name.
///
/// Built once from the discovery snapshot and never resized: zones that
/// appear on the controller later are not represented. Entities are
/// mutated in place through their own `update` methods.
pub struct EntityRegistry {
    alarm: Arc<AlarmEntity>,
    /// Zone description -> entity, in discovery order.
    zones: IndexMap<String, Arc<ZoneEntity>>,
}

impl EntityRegistry {
    /// Build the registry. Zones with an empty name are skipped; when two
    /// zones share a name the first one keeps it.
    pub fn new(alarm: AlarmEntity, zones: impl IntoIterator<Item = ZoneEntity>) -> Self {
        let mut by_name = IndexMap::new();
        for zone in zones {
            if zone.name().is_empty() {
                continue;
            }
            match by_name.entry(zone.name().to_owned()) {
                Entry::Vacant(slot) => {
                    slot.insert(Arc::new(zone));
                }
                Entry::Occupied(_) => {
                    warn!(zone = %zone.name(), "duplicate zone description, keeping the first");
                }
            }
        }

        Self {
            alarm: Arc::new(alarm),
            zones: by_name,
        }
    }

    pub fn alarm(&self) -> &Arc<AlarmEntity> {
        &self.alarm
    }

    /// Look up a zone entity by its correlation name (exact match).
    pub fn zone(&self, name: &str) -> Option<&Arc<ZoneEntity>> {
        self.zones.get(name)
    }

    pub fn zones(&self) -> impl Iterator<Item = &Arc<ZoneEntity>> {
        self.zones.values()
    }

    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// All entities, alarm first, zones in discovery order.
    pub fn entities(&self) -> Vec<Entity> {
        std::iter::once(Entity::Alarm(Arc::clone(&self.alarm)))
            .chain(self.zones().map(|z| Entity::Zone(Arc::clone(z))))
            .collect()
    }
}
