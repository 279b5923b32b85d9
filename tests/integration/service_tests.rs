//! BridgeService lifecycle and data-path tests.

use flemlink::adapters::memory_store::MemoryStore;
use flemlink::adapters::time::FixedClock;
use flemlink::app::service::BridgeService;
use flemlink::config::BridgeConfig;
use flemlink::link::connection::{ConnectionState, Delivery};
use flemlink::{ChannelError, ConnectionError, EncodeError, Error};
use serde_json::json;

use super::mock_link::{
    ChannelCall, MockChannel, RecordingEvents, RecordingIngest, frame, local_frame, remote_frame,
};

const ACK: &[u8] = &[0x2a, 0x0a];

fn make_bridge(config: &BridgeConfig) -> (BridgeService<MockChannel, FixedClock>, MockChannel) {
    let channel = MockChannel::new();
    let bridge = BridgeService::new(config, channel.clone(), FixedClock(1_700_000_000_000));
    (bridge, channel)
}

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store.set("Switcher", "realValue", json!(true));
    store.set("ZonesMean", "temperature", json!(21.5));
    store
}

// ── Lifecycle ─────────────────────────────────────────────────

#[test]
fn start_opens_subscribes_and_pushes_state() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();

    bridge.start(&mut store, &mut events).unwrap();

    assert_eq!(bridge.state(), ConnectionState::Open);
    assert_eq!(store.subscription_count(), 1);
    let log = channel.log.borrow();
    assert_eq!(log.calls[0], ChannelCall::Open("/dev/ttyUSB0".into()));
    assert_eq!(log.writes(), vec![b"@CSP01I/\n@CCP02\x58\x01/\n".to_vec()]);
    assert!(events.events[0].starts_with("Started"));
    assert!(events.events[1].contains("Written"));
}

#[test]
fn start_without_initial_sync_sends_nothing() {
    let config = BridgeConfig {
        sync_on_start: false,
        ..BridgeConfig::default()
    };
    let (mut bridge, channel) = make_bridge(&config);
    let mut store = seeded_store();
    bridge
        .start(&mut store, &mut RecordingEvents::default())
        .unwrap();
    assert!(channel.log.borrow().writes().is_empty());
}

#[test]
fn second_start_fails_and_does_not_reopen() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();

    bridge.start(&mut store, &mut events).unwrap();
    assert_eq!(
        bridge.start(&mut store, &mut events),
        Err(ConnectionError::AlreadyOpen)
    );
    assert_eq!(channel.log.borrow().opens(), 1);
    assert_eq!(store.subscription_count(), 1);
}

#[test]
fn open_failure_leaves_bridge_inactive() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    channel.log.borrow_mut().fail_open = Some(ChannelError::PermissionDenied);
    let mut store = seeded_store();

    let result = bridge.start(&mut store, &mut RecordingEvents::default());

    assert_eq!(
        result,
        Err(ConnectionError::Open(ChannelError::PermissionDenied))
    );
    assert_eq!(bridge.state(), ConnectionState::Closed);
    assert_eq!(store.subscription_count(), 0);
    assert!(channel.log.borrow().writes().is_empty());
}

#[test]
fn stop_unsubscribes_and_closes_even_when_close_fails() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    bridge.start(&mut store, &mut events).unwrap();
    channel.log.borrow_mut().fail_close = Some(ChannelError::Io);

    let result = bridge.stop(&mut store, &mut events);

    assert_eq!(result, Err(ConnectionError::Close(ChannelError::Io)));
    assert_eq!(bridge.state(), ConnectionState::Closed);
    assert_eq!(store.subscription_count(), 0);
    assert_eq!(channel.log.borrow().closes(), 1);
    assert!(events.events.last().unwrap().contains("Close(Io)"));
}

// ── Outbound ──────────────────────────────────────────────────

#[test]
fn state_change_renders_full_command() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    bridge.start(&mut store, &mut events).unwrap();

    store.set("ScheduleTarget", "temperature", json!(22.0));
    let delivery = bridge
        .on_state_change("ScheduleTarget", &store, &mut events)
        .unwrap();

    assert_eq!(delivery, Some(Delivery::Written));
    let writes = channel.log.borrow().writes();
    assert_eq!(
        writes.last().unwrap(),
        b"@CSP01I/\n@CCP02\x58\x01/\n@CTP02\x60\x01/\n"
    );
}

#[test]
fn unrelated_slice_is_ignored() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    bridge.start(&mut store, &mut events).unwrap();
    let before = channel.log.borrow().writes().len();

    store.set("Lights", "on", json!(true));
    assert_eq!(
        bridge.on_state_change("Lights", &store, &mut events),
        Ok(None)
    );
    assert_eq!(channel.log.borrow().writes().len(), before);
}

#[test]
fn out_of_range_value_skips_the_tick() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    bridge.start(&mut store, &mut events).unwrap();
    let before = channel.log.borrow().writes().len();

    store.set("ZonesMean", "temperature", json!(-12.0));
    let result = bridge.on_state_change("ZonesMean", &store, &mut events);

    assert_eq!(result, Err(Error::Encode(EncodeError::OutOfRange)));
    assert_eq!(channel.log.borrow().writes().len(), before);
    assert!(events.events.last().unwrap().starts_with("CommandSkipped"));
}

#[test]
fn write_failure_skips_the_command() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    bridge.start(&mut store, &mut events).unwrap();
    channel.log.borrow_mut().fail_write = Some(ChannelError::Disconnected);

    store.set("Switcher", "realValue", json!(false));
    let result = bridge.on_state_change("Switcher", &store, &mut events);

    assert_eq!(
        result,
        Err(Error::Connection(ConnectionError::Write(
            ChannelError::Disconnected
        )))
    );
    assert!(events.events.last().unwrap().starts_with("CommandSkipped"));
    assert_eq!(bridge.state(), ConnectionState::Open);
}

#[test]
fn notifications_after_stop_send_nothing() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    bridge.start(&mut store, &mut events).unwrap();
    bridge.stop(&mut store, &mut events).unwrap();
    let before = channel.log.borrow().writes().len();

    assert_eq!(
        bridge.on_state_change("Switcher", &store, &mut events),
        Ok(None)
    );
    assert_eq!(channel.log.borrow().writes().len(), before);
}

// ── Inbound ───────────────────────────────────────────────────

#[test]
fn remote_frame_is_forwarded_and_acknowledged() {
    let config = BridgeConfig {
        sync_on_start: false,
        ..BridgeConfig::default()
    };
    let (mut bridge, channel) = make_bridge(&config);
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    let mut ingest = RecordingIngest::default();
    bridge.start(&mut store, &mut events).unwrap();

    channel.push_inbound(&remote_frame([0x05, 0x07, 0x10, 0x00, 0x64, 0x1e]));
    assert_eq!(bridge.poll(&mut ingest, &mut events), Ok(1));

    assert_eq!(ingest.batches.len(), 1);
    let (reader, samples) = &ingest.batches[0];
    assert_eq!(reader, "FlemDuino");
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].sensor_id, "DRF5150-5-7");
    assert_eq!(samples[0].value, 1.0);
    assert_eq!(samples[0].timestamp_ms, 1_700_000_000_000);
    let meta = samples[0].meta.unwrap();
    assert_eq!(meta.battery_voltage, 3.0);
    assert_eq!(meta.signal_strength, 30);

    assert_eq!(channel.log.borrow().writes(), vec![ACK.to_vec()]);
}

#[test]
fn every_valid_frame_gets_exactly_one_ack() {
    let config = BridgeConfig {
        sync_on_start: false,
        ..BridgeConfig::default()
    };
    let (mut bridge, channel) = make_bridge(&config);
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    let mut ingest = RecordingIngest::default();
    bridge.start(&mut store, &mut events).unwrap();

    let mut stream = local_frame([0x10, 0x00]);
    stream.extend(frame(0x5a, &[0x10, 0x00])); // unknown tag
    stream.extend([0x41, 0x43, 0x4c, 0, 0, 0, 0x10, 0x00, 0x0d, 0x0a]); // bad marker
    stream.extend(frame(0x52, &[0x01])); // short remote
    stream.extend(local_frame([0xff, 0xff]));

    // Split mid-record to exercise reassembly.
    let (a, b) = stream.split_at(13);
    let mut forwarded = bridge.on_bytes(a, &mut ingest, &mut events);
    forwarded += bridge.on_bytes(b, &mut ingest, &mut events);

    assert_eq!(forwarded, 2);
    assert_eq!(ingest.batches[0].1[0].value, 1.0);
    assert_eq!(ingest.batches[1].1[0].value, 4095.9375);
    assert_eq!(channel.log.borrow().writes(), vec![ACK.to_vec(), ACK.to_vec()]);
}

#[test]
fn failed_ack_still_forwards_the_sample() {
    let config = BridgeConfig {
        sync_on_start: false,
        ..BridgeConfig::default()
    };
    let (mut bridge, channel) = make_bridge(&config);
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    let mut ingest = RecordingIngest::default();
    bridge.start(&mut store, &mut events).unwrap();
    channel.log.borrow_mut().fail_write = Some(ChannelError::Io);

    let n = bridge.on_bytes(&local_frame([0x10, 0x00]), &mut ingest, &mut events);

    assert_eq!(n, 1);
    assert_eq!(ingest.batches.len(), 1);
    assert_eq!(ingest.batches[0].1[0].value, 1.0);
    assert_eq!(bridge.state(), ConnectionState::Open);
    assert!(channel.log.borrow().writes().is_empty());
}

#[test]
fn inbound_bytes_before_start_are_ignored() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut ingest = RecordingIngest::default();
    let mut events = RecordingEvents::default();

    let n = bridge.on_bytes(&local_frame([0x10, 0x00]), &mut ingest, &mut events);

    assert_eq!(n, 0);
    assert!(ingest.batches.is_empty());
    assert!(channel.log.borrow().calls.is_empty());
}

#[test]
fn read_failure_is_surfaced_without_retry() {
    let (mut bridge, channel) = make_bridge(&BridgeConfig::default());
    let mut store = seeded_store();
    let mut events = RecordingEvents::default();
    bridge.start(&mut store, &mut events).unwrap();
    channel.log.borrow_mut().fail_read = Some(ChannelError::Disconnected);

    let result = bridge.poll(&mut RecordingIngest::default(), &mut events);

    assert_eq!(
        result,
        Err(ConnectionError::Read(ChannelError::Disconnected))
    );
    assert_eq!(channel.log.borrow().opens(), 1);
}
