// ── Domain model ──
//
// Locally held representations of the controller's areas and zones.

pub mod alarm;
pub mod zone;

pub use alarm::{ALARM_ENTITY_NAME, AlarmEntity, AlarmMode, AlarmSnapshot};
pub use zone::{ZoneEntity, ZoneSnapshot};

pub use vedolink_api::{AreaFlags, AreaState, ZoneState, ZoneStatus};
