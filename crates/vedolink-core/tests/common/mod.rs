#![allow(dead_code)]

use secrecy::SecretString;

use vedolink_core::{AreaFlags, AreaState, PlatformConfig, ZoneState, ZoneStatus};

pub fn area(description: &str, armed: bool) -> AreaState {
    AreaState {
        index: 0,
        description: description.into(),
        flags: if armed {
            AreaFlags::ARMED
        } else {
            AreaFlags::READY
        },
    }
}

pub fn zone(index: u32, description: &str, status: ZoneStatus) -> ZoneState {
    ZoneState {
        index,
        description: description.into(),
        area: 0,
        status,
    }
}

pub fn config(map_sensors: bool, update_interval: Option<u64>) -> PlatformConfig {
    PlatformConfig {
        alarm_address: "10.0.0.5".into(),
        alarm_code: SecretString::from("1234".to_string()),
        map_sensors,
        update_interval,
        ..PlatformConfig::default()
    }
}
