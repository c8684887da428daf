#![allow(clippy::unwrap_used)]
// Startup ordering: configuration gate, one-shot discovery, ready signal.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use tokio::time::Instant;

use vedolink_core::{
    ALARM_ENTITY_NAME, Call, CoreError, MockStateClient, Platform, PlatformConfig, Reply,
    ZoneStatus,
};

use common::{area, config, zone};

fn names(entities: &[vedolink_core::Entity]) -> Vec<String> {
    entities.iter().map(|e| e.name().to_owned()).collect()
}

#[tokio::test]
async fn invalid_config_registers_nothing_and_never_polls() {
    for cfg in [
        PlatformConfig {
            alarm_address: String::new(),
            ..config(true, None)
        },
        PlatformConfig {
            alarm_code: SecretString::from(String::new()),
            ..config(true, None)
        },
    ] {
        let client = Arc::new(MockStateClient::new());
        let platform = Platform::new(cfg, client.clone());

        assert!(platform.discover().await.unwrap().is_empty());
        assert!(platform.start().unwrap().is_none());
        assert!(platform.registry().is_none());
        assert!(client.calls().is_empty());
    }
}

#[tokio::test]
async fn connect_without_address_degrades_to_no_entities() {
    let platform = Platform::connect(PlatformConfig::default()).unwrap();
    assert!(platform.discover().await.unwrap().is_empty());
    assert!(platform.start().unwrap().is_none());
}

#[tokio::test]
async fn map_sensors_off_yields_only_the_alarm() {
    let client = Arc::new(MockStateClient::new());
    let platform = Platform::new(config(false, None), client.clone());

    let entities = platform.discover().await.unwrap();

    assert_eq!(names(&entities), [ALARM_ENTITY_NAME]);
    assert_eq!(client.call_count(Call::FetchZones), 0);
}

#[tokio::test]
async fn no_zones_at_discovery_is_not_an_error() {
    let client = Arc::new(MockStateClient::new());
    client.set_zones(Reply::Nothing);
    let platform = Platform::new(config(true, None), client.clone());

    let entities = platform.discover().await.unwrap();
    assert_eq!(names(&entities), [ALARM_ENTITY_NAME]);
}

#[tokio::test]
async fn zone_discovery_failure_keeps_the_alarm() {
    let client = Arc::new(MockStateClient::new());
    client.set_zones(Reply::Fail("controller offline".into()));
    let platform = Platform::new(config(true, None), client.clone());

    let entities = platform.discover().await.unwrap();
    assert_eq!(names(&entities), [ALARM_ENTITY_NAME]);
}

#[tokio::test]
async fn discovery_runs_once() {
    let platform = Platform::new(config(false, None), Arc::new(MockStateClient::new()));
    platform.discover().await.unwrap();

    assert!(matches!(
        platform.discover().await,
        Err(CoreError::AlreadyDiscovered)
    ));
}

#[tokio::test(start_paused = true)]
async fn start_before_discovery_does_nothing_and_second_start_fails() {
    let platform = Platform::new(config(false, None), Arc::new(MockStateClient::new()));
    assert!(platform.start().unwrap().is_none());

    platform.discover().await.unwrap();
    let handle = platform.start().unwrap();
    assert!(handle.is_some());
    assert!(matches!(platform.start(), Err(CoreError::AlreadyStarted)));

    platform.shutdown(handle).await;
}

#[tokio::test(start_paused = true)]
async fn kitchen_scenario() {
    let client = Arc::new(MockStateClient::new());
    client.set_zones(Reply::Data(vec![
        zone(0, "Kitchen", ZoneStatus::empty()),
        zone(1, "", ZoneStatus::OPEN),
    ]));
    client.set_areas(Reply::Data(vec![area("House", false)]));

    let platform = Platform::new(config(true, Some(2)), client.clone());
    let entities = platform.discover().await.unwrap();

    assert_eq!(names(&entities), [ALARM_ENTITY_NAME, "Kitchen"]);
    assert!(entities[0].as_alarm().is_some());
    assert!(entities[1].as_zone().is_some());

    let started = Instant::now();
    let handle = platform.start().unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;

    let first_check = client
        .calls()
        .into_iter()
        .find(|(call, _)| *call == Call::CheckAlarm)
        .map(|(_, at)| at.duration_since(started))
        .unwrap();
    assert_eq!(first_check, Duration::from_millis(2000));

    let status = handle.as_ref().unwrap().status().borrow().clone();
    assert_eq!(status.ticks, 1);
    assert_eq!(status.last_report.unwrap().zones_applied, 1);

    platform.shutdown(handle).await;
    assert_eq!(client.close_count(), 1);
}
