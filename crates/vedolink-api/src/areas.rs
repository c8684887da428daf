// VEDO area endpoints
//
// Area layout and live flags, merged into `AreaState` records.

use tracing::debug;

use crate::client::VedoClient;
use crate::error::Error;
use crate::models::{AreaDesc, AreaStat};
use crate::types::{AreaFlags, AreaState};

impl VedoClient {
    /// Fetch the static area layout.
    ///
    /// `GET {area_desc}`
    pub async fn area_desc(&self) -> Result<AreaDesc, Error> {
        debug!("fetching area descriptions");
        self.read(&self.endpoints().area_desc).await
    }

    /// Fetch live area flags.
    ///
    /// `GET {area_stat}`
    pub async fn area_stat(&self) -> Result<AreaStat, Error> {
        debug!("fetching area status");
        self.read(&self.endpoints().area_stat).await
    }

    /// Fetch the current state of every configured area.
    ///
    /// Returns `None` when the panel reports no configured areas.
    pub async fn check_alarm(&self) -> Result<Option<Vec<AreaState>>, Error> {
        let desc = self.area_desc().await?;
        let stat = self.area_stat().await?;
        let areas = merge_areas(&desc, &stat);
        Ok((!areas.is_empty()).then_some(areas))
    }
}

/// Fold index-aligned desc/stat arrays into one record per present area.
pub fn merge_areas(desc: &AreaDesc, stat: &AreaStat) -> Vec<AreaState> {
    let flag = |values: &[u8], idx: usize| values.get(idx).is_some_and(|v| *v != 0);
    let columns = [
        (&stat.ready, AreaFlags::READY),
        (&stat.armed, AreaFlags::ARMED),
        (&stat.alarm, AreaFlags::TRIGGERED),
        (&stat.sabotage, AreaFlags::SABOTAGED),
        (&stat.alarm_memory, AreaFlags::ALARM_MEMORY),
        (&stat.anomaly, AreaFlags::ANOMALY),
        (&stat.in_time, AreaFlags::IN_TIME),
        (&stat.out_time, AreaFlags::OUT_TIME),
    ];

    desc.description
        .iter()
        .enumerate()
        .filter(|(idx, _)| flag(&desc.present, *idx))
        .map(|(idx, description)| AreaState {
            index: u32::try_from(idx).unwrap_or(u32::MAX),
            description: description.clone(),
            flags: columns
                .iter()
                .filter(|(values, _)| flag(values.as_slice(), idx))
                .fold(AreaFlags::empty(), |acc, (_, bit)| acc | *bit),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_skips_absent_slots() {
        let desc = AreaDesc {
            logged: 1,
            present: vec![1, 0, 1],
            description: vec!["House".into(), "Unused".into(), "Garage".into()],
            ..AreaDesc::default()
        };
        let stat = AreaStat {
            logged: 1,
            armed: vec![0, 0, 1],
            alarm: vec![0, 0, 0],
            ready: vec![1, 0, 1],
            ..AreaStat::default()
        };

        let areas = merge_areas(&desc, &stat);
        assert_eq!(areas.len(), 2);
        assert_eq!(areas[0].description, "House");
        assert!(!areas[0].armed());
        assert_eq!(areas[1].index, 2);
        assert_eq!(areas[1].flags, AreaFlags::READY | AreaFlags::ARMED);
    }
}
