// ── Entity registry ──
//
// The fixed set of local entities built at discovery, plus the logic
// that applies polled state onto them.

mod apply;
mod registry;

pub use apply::ZoneApplyOutcome;
pub use registry::{Entity, EntityRegistry};
