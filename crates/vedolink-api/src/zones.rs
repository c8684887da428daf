// VEDO zone endpoints
//
// Zone layout and status words, merged into `ZoneState` records.

use tracing::debug;

use crate::client::VedoClient;
use crate::error::Error;
use crate::models::{ZoneDesc, ZoneStat};
use crate::types::{ZoneState, ZoneStatus};

impl VedoClient {
    /// Fetch the static zone layout.
    ///
    /// `GET {zone_desc}`
    pub async fn zone_desc(&self) -> Result<ZoneDesc, Error> {
        debug!("fetching zone descriptions");
        self.read(&self.endpoints().zone_desc).await
    }

    /// Fetch live zone status words.
    ///
    /// `GET {zone_stat}`
    pub async fn zone_stat(&self) -> Result<ZoneStat, Error> {
        debug!("fetching zone status");
        self.read(&self.endpoints().zone_stat).await
    }

    /// Fetch the current state of every configured zone.
    ///
    /// Zones with an empty description are returned as-is; filtering is
    /// the caller's concern. Returns `None` when no zone is configured.
    pub async fn fetch_zones(&self) -> Result<Option<Vec<ZoneState>>, Error> {
        let desc = self.zone_desc().await?;
        let stat = self.zone_stat().await?;
        let zones = merge_zones(&desc, &stat)?;
        Ok((!zones.is_empty()).then_some(zones))
    }
}

/// Fold index-aligned desc/stat payloads into one record per present zone.
///
/// A zone without a status word reads as all-clear.
pub fn merge_zones(desc: &ZoneDesc, stat: &ZoneStat) -> Result<Vec<ZoneState>, Error> {
    let statuses = ZoneStatus::parse_list(&stat.status)?;

    Ok(desc
        .description
        .iter()
        .enumerate()
        .filter(|(idx, _)| desc.present.is_present(*idx))
        .map(|(idx, description)| ZoneState {
            index: u32::try_from(idx).unwrap_or(u32::MAX),
            description: description.clone(),
            area: desc.in_area.get(idx).copied().unwrap_or_default(),
            status: statuses.get(idx).copied().unwrap_or_default(),
        })
        .collect())
}
