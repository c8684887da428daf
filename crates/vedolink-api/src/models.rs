// VEDO web interface response types
//
// Raw JSON payloads served under `/user/*.json`. Every reply carries the
// same session header fields (`logged`, `rt_stat`, `vedo_auth`, `life`);
// the payload arrays are index-aligned, one slot per area or zone. Fields use
// `#[serde(default)]` liberally because firmware revisions omit arrays
// for features the panel does not have.

use serde::{Deserialize, Serialize};

/// Session header shared by every VEDO JSON reply.
pub trait SessionInfo {
    /// `true` while the session cookie is still accepted.
    fn logged(&self) -> bool;
}

macro_rules! impl_session_info {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl SessionInfo for $ty {
                fn logged(&self) -> bool {
                    self.logged == 1
                }
            }
        )+
    };
}

impl_session_info!(LoginResponse, AreaDesc, AreaStat, ZoneDesc, ZoneStat);

// ── Login ────────────────────────────────────────────────────────────

/// Reply to `POST /login.cgi`. Older firmware answers with an empty body,
/// so every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub logged: u8,
    #[serde(default)]
    pub rt_stat: u8,
    #[serde(default)]
    pub life: u32,
}

// ── Areas ────────────────────────────────────────────────────────────

/// `GET /user/area_desc.json`: static area layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaDesc {
    #[serde(default)]
    pub logged: u8,
    #[serde(default)]
    pub rt_stat: u8,
    #[serde(default)]
    pub vedo_auth: Vec<u8>,
    #[serde(default)]
    pub life: u32,
    /// 1 if the slot is configured on the panel.
    #[serde(default)]
    pub present: Vec<u8>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub p1_pres: Vec<u8>,
    #[serde(default)]
    pub p2_pres: Vec<u8>,
}

/// `GET /user/area_stat.json`: live area flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AreaStat {
    #[serde(default)]
    pub logged: u8,
    #[serde(default)]
    pub rt_stat: u8,
    #[serde(default)]
    pub vedo_auth: Vec<u8>,
    #[serde(default)]
    pub life: u32,
    /// Number of zones currently open across all areas.
    #[serde(default)]
    pub zone_open: u32,
    #[serde(default)]
    pub ready: Vec<u8>,
    #[serde(default)]
    pub armed: Vec<u8>,
    #[serde(default)]
    pub alarm: Vec<u8>,
    #[serde(default)]
    pub alarm_memory: Vec<u8>,
    #[serde(default)]
    pub sabotage: Vec<u8>,
    #[serde(default)]
    pub anomaly: Vec<u8>,
    #[serde(default)]
    pub in_time: Vec<u8>,
    #[serde(default)]
    pub out_time: Vec<u8>,
}

// ── Zones ────────────────────────────────────────────────────────────

/// Zone presence flags. Most firmware sends a comma-separated string
/// (`"1,1,0,..."`); some send a plain JSON array.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Presence {
    List(Vec<u8>),
    Csv(String),
}

impl Default for Presence {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl Presence {
    /// Whether slot `index` is configured. Missing slots are absent.
    pub fn is_present(&self, index: usize) -> bool {
        match self {
            Self::List(flags) => flags.get(index).is_some_and(|f| *f != 0),
            Self::Csv(raw) => raw
                .split(',')
                .nth(index)
                .is_some_and(|f| f.trim() != "0" && !f.trim().is_empty()),
        }
    }
}

/// `GET /user/zone_desc.json`: static zone layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneDesc {
    #[serde(default)]
    pub logged: u8,
    #[serde(default)]
    pub rt_stat: u8,
    #[serde(default)]
    pub vedo_auth: Vec<u8>,
    #[serde(default)]
    pub life: u32,
    #[serde(default)]
    pub present: Presence,
    /// Owning area index for each zone slot.
    #[serde(default)]
    pub in_area: Vec<u32>,
    #[serde(default)]
    pub description: Vec<String>,
}

/// `GET /user/zone_stat.json`: live zone status words.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneStat {
    #[serde(default)]
    pub logged: u8,
    #[serde(default)]
    pub rt_stat: u8,
    #[serde(default)]
    pub vedo_auth: Vec<u8>,
    #[serde(default)]
    pub life: u32,
    /// Comma-separated hex status words, one per zone slot.
    #[serde(default)]
    pub status: String,
}
