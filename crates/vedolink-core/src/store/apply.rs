// ── Poll result application ──
//
// Routes polled area and zone state onto the registered entities.
// Zones are correlated purely by description equality.

use tracing::warn;

use vedolink_api::{AreaState, ZoneState};

use super::EntityRegistry;
use crate::error::CoreError;

/// What happened to one batch of zone states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneApplyOutcome {
    /// Zones routed to a registered entity.
    pub applied: usize,
    /// Descriptions with no registered entity.
    pub missing: Vec<String>,
}

impl EntityRegistry {
    /// Hand the full area list to the alarm entity.
    pub fn apply_areas(&self, areas: &[AreaState]) {
        self.alarm().update(areas);
    }

    /// Route each described zone to the entity of the same name.
    ///
    /// Blank descriptions are skipped. A description with no entity is
    /// logged as [`CoreError::ZoneNotRegistered`] and the rest of the
    /// batch still applies.
    pub fn apply_zones(&self, zones: &[ZoneState]) -> ZoneApplyOutcome {
        let mut outcome = ZoneApplyOutcome::default();

        for zone in zones.iter().filter(|z| !z.description.is_empty()) {
            if let Some(entity) = self.zone(&zone.description) {
                entity.update(zone);
                outcome.applied += 1;
            } else {
                let miss = CoreError::ZoneNotRegistered {
                    description: zone.description.clone(),
                };
                warn!(error = %miss, index = zone.index, "zone update dropped");
                outcome.missing.push(zone.description.clone());
            }
        }

        outcome
    }
}
