#![allow(clippy::unwrap_used)]
// Poll loop behaviour under a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use vedolink_core::{
    ALARM_ENTITY_NAME, AlarmEntity, AlarmMode, AreaMapping, Call, CoreError, EntityRegistry,
    MockStateClient, Reply, ReconciliationLoop, ZoneEntity, ZoneStatus,
};

use common::{area, zone};

fn registry(zones: &[&str]) -> Arc<EntityRegistry> {
    let alarm = AlarmEntity::new(ALARM_ENTITY_NAME, AreaMapping::default());
    let zones = zones
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let index = u32::try_from(i).unwrap();
            ZoneEntity::new(*name, zone(index, name, ZoneStatus::empty()))
        });
    Arc::new(EntityRegistry::new(alarm, zones))
}

fn offsets(client: &MockStateClient, kind: Call, since: Instant) -> Vec<u128> {
    client
        .calls()
        .into_iter()
        .filter(|(call, _)| *call == kind)
        .map(|(_, at)| at.duration_since(since).as_millis())
        .collect()
}

#[tokio::test]
async fn null_alarm_skips_everything() {
    let client = Arc::new(MockStateClient::new());
    client.set_zones(Reply::Data(vec![zone(0, "Kitchen", ZoneStatus::OPEN)]));
    let registry = registry(&["Kitchen"]);
    let reconciler = ReconciliationLoop::new(
        client.clone(),
        Arc::clone(&registry),
        Duration::from_secs(5),
        true,
    );

    let report = reconciler.tick().await.unwrap();

    assert!(report.alarm_absent);
    assert_eq!(registry.alarm().revision(), 0);
    assert_eq!(registry.zone("Kitchen").unwrap().revision(), 0);
    assert_eq!(client.call_count(Call::FetchZones), 0);
}

#[tokio::test]
async fn alarm_is_applied_before_zones() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", true)]));
    client.set_zones(Reply::Data(vec![
        zone(0, "Kitchen", ZoneStatus::OPEN),
        zone(1, "", ZoneStatus::OPEN),
    ]));
    let registry = registry(&["Kitchen"]);
    let reconciler = ReconciliationLoop::new(
        client.clone(),
        Arc::clone(&registry),
        Duration::from_secs(5),
        true,
    );

    let report = reconciler.tick().await.unwrap();

    let order: Vec<Call> = client.calls().into_iter().map(|(c, _)| c).collect();
    assert_eq!(order, [Call::CheckAlarm, Call::FetchZones]);
    assert_eq!(report.areas, 1);
    assert_eq!(report.zones_applied, 1);
    assert!(report.zones_missing.is_empty());
    assert_eq!(registry.alarm().mode(), AlarmMode::Away);
    assert!(registry.zone("Kitchen").unwrap().is_open());
}

#[tokio::test]
async fn unknown_zone_is_reported_not_fatal() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", false)]));
    client.set_zones(Reply::Data(vec![
        zone(0, "Kitchen", ZoneStatus::OPEN),
        zone(1, "Garage", ZoneStatus::OPEN),
    ]));
    let registry = registry(&["Kitchen"]);
    let reconciler = ReconciliationLoop::new(
        client.clone(),
        Arc::clone(&registry),
        Duration::from_secs(5),
        true,
    );

    let report = reconciler.tick().await.unwrap();

    assert_eq!(report.zones_applied, 1);
    assert_eq!(report.zones_missing, ["Garage".to_string()]);
    assert!(registry.zone("Garage").is_none());
    assert_eq!(registry.zone_count(), 1);
}

#[tokio::test]
async fn empty_zone_read_is_flagged() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", false)]));
    client.set_zones(Reply::Nothing);
    let reconciler = ReconciliationLoop::new(
        client.clone(),
        registry(&["Kitchen"]),
        Duration::from_secs(5),
        true,
    );

    let report = reconciler.tick().await.unwrap();

    assert!(report.zones_absent);
    assert_eq!(report.areas, 1);
}

#[tokio::test]
async fn map_sensors_off_never_reads_zones() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", false)]));
    let reconciler =
        ReconciliationLoop::new(client.clone(), registry(&[]), Duration::from_secs(5), false);

    reconciler.tick().await.unwrap();
    reconciler.tick().await.unwrap();

    assert_eq!(client.call_count(Call::CheckAlarm), 2);
    assert_eq!(client.call_count(Call::FetchZones), 0);
}

#[tokio::test]
async fn failed_read_surfaces_as_error() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Fail("boom".into()));
    let reconciler =
        ReconciliationLoop::new(client.clone(), registry(&[]), Duration::from_secs(5), true);

    let err = reconciler.tick().await.unwrap_err();
    assert!(matches!(err, CoreError::Api { .. }));
}

#[tokio::test(start_paused = true)]
async fn loop_survives_failures() {
    let client = Arc::new(MockStateClient::new());
    client.push_areas(Reply::Fail("controller offline".into()));
    client.set_areas(Reply::Data(vec![area("House", false)]));
    let registry = registry(&[]);

    let started = Instant::now();
    let handle = ReconciliationLoop::new(
        client.clone(),
        Arc::clone(&registry),
        Duration::from_secs(2),
        false,
    )
    .spawn(CancellationToken::new());
    tokio::time::sleep(Duration::from_millis(6500)).await;

    assert_eq!(offsets(&client, Call::CheckAlarm, started), [2000, 4000, 6000]);
    let status = handle.status().borrow().clone();
    assert_eq!(status.ticks, 3);
    assert_eq!(status.failures, 1);
    assert_eq!(status.last_error.as_deref(), Some("API error: controller offline"));
    assert_eq!(registry.alarm().revision(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn zone_failure_keeps_applied_alarm() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", true)]));
    client.push_zones(Reply::Fail("zones down".into()));
    client.set_zones(Reply::Data(vec![zone(0, "Kitchen", ZoneStatus::OPEN)]));
    let registry = registry(&["Kitchen"]);

    let handle = ReconciliationLoop::new(
        client.clone(),
        Arc::clone(&registry),
        Duration::from_secs(1),
        true,
    )
    .spawn(CancellationToken::new());

    // First tick at 1s: areas land, then the zone read fails.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    let status = handle.status().borrow().clone();
    assert_eq!(status.ticks, 1);
    assert_eq!(status.failures, 1);
    assert_eq!(status.last_error.as_deref(), Some("API error: zones down"));
    assert_eq!(registry.alarm().mode(), AlarmMode::Away);
    assert_eq!(registry.alarm().revision(), 1);
    assert!(!registry.zone("Kitchen").unwrap().is_open());

    // Second tick at 2s recovers the zone without touching the alarm.
    tokio::time::sleep(Duration::from_secs(1)).await;
    let status = handle.status().borrow().clone();
    assert_eq!(status.ticks, 2);
    assert_eq!(status.failures, 1);
    assert_eq!(registry.alarm().revision(), 1);
    assert!(registry.zone("Kitchen").unwrap().is_open());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn slow_ticks_never_overlap() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", false)]));
    client.set_latency(Duration::from_secs(3));

    let started = Instant::now();
    let handle = ReconciliationLoop::new(
        client.clone(),
        registry(&[]),
        Duration::from_secs(1),
        false,
    )
    .spawn(CancellationToken::new());
    tokio::time::sleep(Duration::from_millis(9500)).await;

    assert_eq!(offsets(&client, Call::CheckAlarm, started), [1000, 5000, 9000]);
    assert_eq!(client.max_in_flight(), 1);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn tick_timeout_fails_the_tick_only() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", false)]));
    client.set_latency(Duration::from_secs(5));

    let handle = ReconciliationLoop::new(
        client.clone(),
        registry(&[]),
        Duration::from_secs(1),
        false,
    )
    .with_tick_timeout(Some(Duration::from_secs(1)))
    .spawn(CancellationToken::new());

    // First tick starts at 1s and is abandoned at 2s.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    let status = handle.status().borrow().clone();
    assert_eq!(status.ticks, 1);
    assert_eq!(status.failures, 1);
    assert_eq!(status.last_error.as_deref(), Some("Poll tick exceeded 1000ms"));

    // Next tick starts at 3s and completes.
    client.set_latency(Duration::ZERO);
    tokio::time::sleep(Duration::from_secs(1)).await;
    let status = handle.status().borrow().clone();
    assert_eq!(status.ticks, 2);
    assert_eq!(status.failures, 1);
    assert!(status.last_report.is_some());

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_polling() {
    let client = Arc::new(MockStateClient::new());
    client.set_areas(Reply::Data(vec![area("House", false)]));
    let cancel = CancellationToken::new();

    let handle = ReconciliationLoop::new(
        client.clone(),
        registry(&[]),
        Duration::from_secs(1),
        false,
    )
    .spawn(cancel.clone());
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(client.call_count(Call::CheckAlarm), 2);

    cancel.cancel();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(handle.is_finished());
    assert_eq!(client.call_count(Call::CheckAlarm), 2);

    handle.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn subscribers_see_alarm_changes() {
    let client = Arc::new(MockStateClient::new());
    client.push_areas(Reply::Data(vec![area("House", false)]));
    client.set_areas(Reply::Data(vec![area("House", true)]));
    let registry = registry(&[]);
    let mut stream = registry.alarm().subscribe();

    let handle = ReconciliationLoop::new(
        client.clone(),
        Arc::clone(&registry),
        Duration::from_secs(1),
        false,
    )
    .spawn(CancellationToken::new());

    stream.changed().await.unwrap();
    assert_eq!(stream.current().mode, AlarmMode::Disarmed);
    stream.changed().await.unwrap();
    assert_eq!(stream.current().mode, AlarmMode::Away);

    // Identical reads afterwards do not notify.
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(!stream.has_changed());
    assert_eq!(registry.alarm().revision(), 2);

    handle.shutdown().await;
}
