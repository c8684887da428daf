// ── Merged area and zone state ──
//
// Index-aligned desc/stat payloads folded into one record per area or
// zone. These are what the rest of the workspace consumes.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::Error;

bitflags! {
    /// Live flags of one area, one bit per `area_stat.json` array.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AreaFlags: u16 {
        const READY        = 0x0001;
        const ARMED        = 0x0002;
        const TRIGGERED    = 0x0004;
        const SABOTAGED    = 0x0008;
        const ALARM_MEMORY = 0x0010;
        const ANOMALY      = 0x0020;
        /// Entry delay running.
        const IN_TIME      = 0x0040;
        /// Exit delay running.
        const OUT_TIME     = 0x0080;
    }
}

/// One configured area (partition) with its live flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaState {
    pub index: u32,
    pub description: String,
    pub flags: AreaFlags,
}

impl AreaState {
    pub fn ready(&self) -> bool {
        self.flags.contains(AreaFlags::READY)
    }

    pub fn armed(&self) -> bool {
        self.flags.contains(AreaFlags::ARMED)
    }

    pub fn triggered(&self) -> bool {
        self.flags.contains(AreaFlags::TRIGGERED)
    }
}

bitflags! {
    /// Decoded zone status word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct ZoneStatus: u32 {
        const OPEN         = 0x0001;
        const ALARM        = 0x0002;
        const ALARM_MEMORY = 0x0004;
        const SABOTAGED    = 0x0008;
        const EXCLUDED     = 0x0010;
        const ISOLATED     = 0x0020;
        const INHIBITED    = 0x0040;
        const ANOMALY      = 0x0080;
    }
}

impl ZoneStatus {
    /// Parse one hex status word (`"0x0011"` or `"0011"`).
    pub fn parse_hex(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bits = u32::from_str_radix(digits, 16).map_err(|e| Error::Deserialization {
            message: format!("invalid zone status word {trimmed:?}: {e}"),
            body: raw.to_owned(),
        })?;
        Ok(Self::from_bits_retain(bits))
    }

    /// Parse the comma-separated `status` field of `zone_stat.json`.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>, Error> {
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        raw.split(',').map(Self::parse_hex).collect()
    }
}

/// One configured zone (sensor point) with its live status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneState {
    pub index: u32,
    /// Human-readable label; empty when the installer left it blank.
    pub description: String,
    /// Owning area index.
    pub area: u32,
    pub status: ZoneStatus,
}

impl ZoneState {
    pub fn is_open(&self) -> bool {
        self.status.contains(ZoneStatus::OPEN)
    }

    /// Alarm, tamper or anomaly.
    pub fn is_faulted(&self) -> bool {
        self.status
            .intersects(ZoneStatus::ALARM | ZoneStatus::SABOTAGED | ZoneStatus::ANOMALY)
    }

    pub fn is_excluded(&self) -> bool {
        self.status
            .intersects(ZoneStatus::EXCLUDED | ZoneStatus::ISOLATED | ZoneStatus::INHIBITED)
    }
}
