//! Matching acknowledgements to requests by packet number.

mod common;

use std::time::Duration;

use common::open_device;
use sciencemode_host::{LayerConfig, LayerError};
use sciencemode_protocol::{Command, Packet, Reset};

fn device_id_payload(id: &str) -> Vec<u8> {
    let mut payload = vec![0];
    payload.extend(id.as_bytes());
    payload.resize(11, 0);
    payload
}

#[tokio::test]
async fn test_out_of_order_acknowledgements() {
    let config = LayerConfig {
        max_in_flight: 2,
        ..Default::default()
    };
    let (device, mut sim) = open_device(config);
    let general = device.general();

    let (id, version, _) = tokio::join!(general.get_device_id(), general.get_version(), async {
        let first = sim.expect(Command::GetDeviceId).await;
        let second = sim.expect(Command::GetVersion).await;
        assert_ne!(first.packet_number, second.packet_number);
        // answer the later request first
        sim.reply(&second, &[0, 2, 0, 1, 3, 0, 7]);
        sim.reply(&first, &device_id_payload("ABCDEFGHIJ"));
    });

    assert_eq!(id.unwrap(), "ABCDEFGHIJ");
    let version = version.unwrap();
    assert_eq!(version.main.to_string(), "2.0.1");
    assert_eq!(version.stimulation.to_string(), "3.0.7");
    assert_eq!(device.statistics().acknowledged, 2);
}

#[tokio::test]
async fn test_late_acknowledgement_is_dropped() {
    let config = LayerConfig {
        response_timeout_ms: 30,
        ..Default::default()
    };
    let (device, mut sim) = open_device(config);
    let general = device.general();

    let (first, late) = tokio::join!(general.get_device_id(), sim.expect(Command::GetDeviceId));
    assert!(matches!(
        first.unwrap_err(),
        LayerError::Timeout { command: Command::GetDeviceId, .. }
    ));
    assert_eq!(device.layer().pending_count(), 0);

    let (second, _) = tokio::join!(general.get_device_id(), async {
        let request = sim.expect(Command::GetDeviceId).await;
        assert_ne!(request.packet_number, late.packet_number);
        sim.reply(&late, &device_id_payload("stale-0000"));
        sim.reply(&request, &device_id_payload("fresh-0001"));
    });
    assert_eq!(second.unwrap(), "fresh-0001");

    let stats = device.statistics();
    assert_eq!(stats.timed_out, 1);
    assert_eq!(stats.acknowledged, 1);
    assert_eq!(stats.discarded_acks, 1);
}

#[tokio::test]
async fn test_ack_of_other_command_is_not_matched() {
    let config = LayerConfig {
        response_timeout_ms: 100,
        ..Default::default()
    };
    let (device, mut sim) = open_device(config);

    let general = device.general();
    let (result, _) = tokio::join!(general.reset(), async {
        let request = sim.expect(Command::Reset).await;
        sim.send(Command::GetVersionAck, request.packet_number, &[0, 1, 1, 1, 1, 1, 1]);
        sim.reply(&request, &[0]);
    });
    result.unwrap();
    assert_eq!(device.statistics().discarded_acks, 1);
}

#[tokio::test]
async fn test_noise_before_acknowledgement() {
    let (device, mut sim) = open_device(LayerConfig::default());

    let general = device.general();
    let (result, _) = tokio::join!(general.reset(), async {
        let request = sim.expect(Command::Reset).await;
        sim.inject(&[0x00, 0x42, 0x0F]);
        // a start byte followed by a header that is not stuffed
        sim.inject(&[0xF0, 0x12, 0x34]);
        sim.reply(&request, &[0]);
    });
    result.unwrap();
    assert!(device.statistics().framing_errors >= 1);
}

#[tokio::test]
async fn test_packet_numbers_exhausted() {
    let config = LayerConfig {
        packet_number_count: 1,
        response_timeout_ms: 200,
        ..Default::default()
    };
    let (device, mut sim) = open_device(config);
    let layer = device.layer();

    let general = device.general();
    let (waiting, late) = tokio::join!(general.reset(), async {
        let request = sim.expect(Command::Reset).await;
        let packet = Packet::new(&Reset).unwrap();
        assert!(matches!(
            layer.send_packet(&packet),
            Err(LayerError::NoFreePacketNumber)
        ));
        request
    });
    assert!(matches!(waiting, Err(LayerError::Timeout { .. })));

    // the timed-out number stays held back while its answer may still come
    let packet = Packet::new(&Reset).unwrap();
    assert!(matches!(
        layer.send_packet(&packet),
        Err(LayerError::NoFreePacketNumber)
    ));
    sim.reply(&late, &[0]);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(device.statistics().discarded_acks, 1);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(layer.send_packet(&packet).unwrap(), 0);
}

#[tokio::test]
async fn test_late_ack_does_not_resolve_request_on_same_number() {
    let config = LayerConfig {
        packet_number_count: 2,
        response_timeout_ms: 100,
        ..Default::default()
    };
    let (device, mut sim) = open_device(config);
    let general = device.general();

    let (first, late) = tokio::join!(general.get_device_id(), sim.expect(Command::GetDeviceId));
    assert!(matches!(first, Err(LayerError::Timeout { packet_number: 0, .. })));

    let (second, _) = tokio::join!(general.get_device_id(), async {
        let request = sim.expect(Command::GetDeviceId).await;
        assert_eq!(request.packet_number, 1);
        sim.reply(&request, &device_id_payload("second-001"));
    });
    assert_eq!(second.unwrap(), "second-001");

    // #0 is held back, so the next request goes out on #1 again
    let (third, _) = tokio::join!(general.get_device_id(), async {
        let request = sim.expect(Command::GetDeviceId).await;
        assert_eq!(request.packet_number, 1);
        sim.reply(&late, &device_id_payload("stale-0000"));
        sim.reply(&request, &device_id_payload("fresh-0002"));
    });
    assert_eq!(third.unwrap(), "fresh-0002");

    let stats = device.statistics();
    assert_eq!(stats.acknowledged, 2);
    assert_eq!(stats.discarded_acks, 1);
}

#[tokio::test]
async fn test_abandoned_request_releases_number() {
    let config = LayerConfig {
        packet_number_count: 1,
        response_timeout_ms: 100,
        ..Default::default()
    };
    let (device, mut sim) = open_device(config);
    let layer = device.layer();

    let general = device.general();
    let (abandoned, _) = tokio::join!(
        tokio::time::timeout(Duration::from_millis(20), general.reset()),
        sim.expect(Command::Reset)
    );
    assert!(abandoned.is_err());
    assert_eq!(layer.pending_count(), 0);
    assert_eq!(device.statistics().cancelled, 1);

    // held back like a timed-out number, then free again
    let packet = Packet::new(&Reset).unwrap();
    assert!(matches!(
        layer.send_packet(&packet),
        Err(LayerError::NoFreePacketNumber)
    ));
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(layer.send_packet(&packet).unwrap(), 0);
}

#[tokio::test]
async fn test_close_fails_waiting_request() {
    let (device, mut sim) = open_device(LayerConfig::default());

    let general = device.general();
    let (result, _) = tokio::join!(general.get_version(), async {
        sim.expect(Command::GetVersion).await;
        device.close().unwrap();
    });
    assert!(matches!(result, Err(LayerError::ConnectionLost)));
    assert!(!sim.peer().is_open());
    assert!(!device.layer().is_running());

    let err = device.general().reset().await.unwrap_err();
    assert!(matches!(err, LayerError::ConnectionLost));
}

#[tokio::test]
async fn test_disconnect_stops_read_loop() {
    let config = LayerConfig {
        response_timeout_ms: 500,
        ..Default::default()
    };
    let (device, mut sim) = open_device(config);

    let general = device.general();
    let (result, _) = tokio::join!(general.reset(), async {
        sim.expect(Command::Reset).await;
        sim.peer().disconnect();
    });
    assert!(matches!(result, Err(LayerError::ConnectionLost)));
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!device.layer().is_running());
}
