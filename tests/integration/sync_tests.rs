//! StateSync against a live ConnectionManager.

use flemlink::adapters::memory_store::MemoryStore;
use flemlink::adapters::time::FixedClock;
use flemlink::app::sync::StateSync;
use flemlink::config::BridgeConfig;
use flemlink::link::connection::{ConnectionManager, Delivery};
use flemlink::protocol::command::ProtocolRevision;
use flemlink::protocol::sample::SensorSample;
use serde_json::json;

use super::mock_link::{MockChannel, RecordingIngest};

fn open_manager(config: &BridgeConfig) -> (ConnectionManager<MockChannel, FixedClock>, MockChannel) {
    let channel = MockChannel::new();
    let mut conn = ConnectionManager::new(channel.clone(), config.serial.clone(), FixedClock(0));
    conn.start().unwrap();
    (conn, channel)
}

#[test]
fn hysteresis_revision_reaches_the_wire() {
    let config = BridgeConfig {
        protocol: ProtocolRevision::TargetWithHysteresis,
        ..BridgeConfig::default()
    };
    let (mut conn, channel) = open_manager(&config);
    let mut store = MemoryStore::new();
    store.set("ScheduleTarget", "temperature", json!(19.5));
    store.set("ScheduleTarget", "hysteresis", json!(0.25));

    let mut sync = StateSync::new(&config);
    sync.start(&mut store);
    let delivery = sync
        .on_state_change("ScheduleTarget", &store, &mut conn)
        .unwrap();

    assert_eq!(delivery, Some(Delivery::Written));
    // 19.5 * 16 = 312 = 0x0138, 0.25 * 16 = 4
    assert_eq!(
        channel.log.borrow().writes(),
        vec![b"@CSP01O/\n@CTP04\x38\x01\x04\x00/\n".to_vec()]
    );
}

#[test]
fn custom_bindings_are_honoured() {
    let mut config = BridgeConfig::default();
    config.switch.slice = "Heater".into();
    config.switch.field = "enabled".into();
    let (mut conn, channel) = open_manager(&config);
    let mut store = MemoryStore::new();
    store.set("Heater", "enabled", json!(1));

    let mut sync = StateSync::new(&config);
    sync.start(&mut store);

    assert_eq!(
        sync.on_state_change("Switcher", &store, &mut conn).unwrap(),
        None
    );
    assert_eq!(
        sync.on_state_change("Heater", &store, &mut conn).unwrap(),
        Some(Delivery::Written)
    );
    assert_eq!(channel.log.borrow().writes(), vec![b"@CSP01I/\n".to_vec()]);
}

#[test]
fn push_while_closed_is_dropped_not_queued() {
    let config = BridgeConfig::default();
    let (mut conn, channel) = open_manager(&config);
    conn.stop().unwrap();
    let store = MemoryStore::new();

    let sync = StateSync::new(&config);
    assert_eq!(sync.push_all(&store, &mut conn), Ok(Delivery::Dropped));

    conn.start().unwrap();
    assert!(channel.log.borrow().writes().is_empty());
}

#[test]
fn forward_wraps_sample_in_single_batch() {
    let sync = StateSync::new(&BridgeConfig::default());
    let mut ingest = RecordingIngest::default();

    sync.forward(SensorSample::local(18.0625, 5), &mut ingest);

    assert_eq!(ingest.batches.len(), 1);
    assert_eq!(ingest.batches[0].0, "FlemDuino");
    assert_eq!(ingest.batches[0].1, vec![SensorSample::local(18.0625, 5)]);
}
