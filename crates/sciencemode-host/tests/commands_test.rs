//! Command layers against a scripted device.

mod common;

use common::{open_device, spawn_responder};
use sciencemode_host::{LayerConfig, LayerError};
use sciencemode_protocol::{
    Channel, ChannelConfiguration, ChannelPoint, Command, Connector, DyscomEnergyState,
    DyscomInitParams, DyscomOperationMode, DyscomPowerModulePowerType, DyscomPowerModuleType,
    HighVoltage, ResultAndError, DYSCOM_DEVICE_ID_SIZE,
};

fn padded(text: &str, size: usize) -> Vec<u8> {
    let mut bytes = text.as_bytes().to_vec();
    bytes.resize(size, 0);
    bytes
}

#[tokio::test]
async fn test_general_commands() {
    let (device, sim) = open_device(LayerConfig::default());
    let responder = spawn_responder(sim, |command, _| match command {
        Command::GetDeviceId => {
            let mut payload = vec![0];
            payload.extend(padded("0123456789", 10));
            Some(payload)
        }
        Command::GetVersion => Some(vec![0, 1, 2, 3, 4, 5, 6]),
        Command::Reset => Some(vec![0]),
        _ => None,
    });

    let general = device.general();
    assert_eq!(general.get_device_id().await.unwrap(), "0123456789");
    let version = general.get_version().await.unwrap();
    assert_eq!(version.main.to_string(), "1.2.3");
    assert_eq!(version.stimulation.to_string(), "4.5.6");
    general.reset().await.unwrap();

    let stats = device.statistics();
    assert_eq!(stats.sent, 3);
    assert_eq!(stats.acknowledged, 3);
    device.close().unwrap();
    responder.await.unwrap();
}

#[tokio::test]
async fn test_device_error_is_propagated() {
    let (device, sim) = open_device(LayerConfig::default());
    let responder = spawn_responder(sim, |command, _| match command {
        Command::LlInit => Some(vec![8]),
        Command::DlStart => Some(vec![21]),
        _ => None,
    });

    let err = device.low_level().init(HighVoltage::Default).await.unwrap_err();
    assert!(matches!(
        err,
        LayerError::Device { label: "LowLevelInit", code: ResultAndError::HvError }
    ));
    let err = device.dyscom().start().await.unwrap_err();
    assert!(matches!(err, LayerError::Device { code: ResultAndError::Busy, .. }));

    device.close().unwrap();
    responder.await.unwrap();
}

#[tokio::test]
async fn test_unknown_command_rejection() {
    let (device, sim) = open_device(LayerConfig::default());
    let responder = tokio::spawn(async move {
        let mut sim = sim;
        let request = sim.expect(Command::Reset).await;
        sim.send(Command::UnknownCommand, request.packet_number, &[]);
    });

    let err = device.general().reset().await.unwrap_err();
    assert!(matches!(
        err,
        LayerError::Device { code: ResultAndError::InvalidCmdError, .. }
    ));
    responder.await.unwrap();
}

#[tokio::test]
async fn test_low_level_channel_config() {
    let (device, mut sim) = open_device(LayerConfig::default());
    let points = vec![ChannelPoint::new(200, 20), ChannelPoint::new(200, -20)];

    let low_level = device.low_level();
    let (ack, request) = tokio::join!(
        low_level.channel_config(Channel::Black, Connector::Green, points.clone()),
        async {
            let request = sim.expect(Command::LlChannelConfig).await;
            sim.reply(&request, &[0, 0, 0b0110]);
            request
        }
    );
    let ack = ack.unwrap();
    assert!(ack.result_error.is_ok());
    assert_eq!(ack.channel, Channel::Black);
    assert_eq!(ack.connector, Connector::Green);
    // two header bytes plus four bytes per point
    assert_eq!(request.payload.len(), 2 + 4 * points.len());

    low_level
        .send_channel_config(Channel::Red, Connector::Yellow, points)
        .unwrap();
    let pulse = sim.expect(Command::LlChannelConfig).await;
    assert_ne!(pulse.packet_number, request.packet_number);
    assert_eq!(device.layer().pending_count(), 0);
}

#[tokio::test]
async fn test_mid_level_pattern() {
    let (device, sim) = open_device(LayerConfig::default());
    let responder = spawn_responder(sim, |command, frame| match command {
        Command::MlInit | Command::MlStop => Some(vec![0]),
        Command::MlUpdate => {
            // only channel 0 is active
            assert_eq!(frame.payload[0], 0b0001);
            Some(vec![0])
        }
        Command::MlGetCurrentData => Some(vec![0, 1, 0b0001, 0]),
        _ => None,
    });

    let pattern = ChannelConfiguration::new(
        3,
        20.0,
        vec![ChannelPoint::new(100, 10), ChannelPoint::new(100, -10)],
    );
    let mid_level = device.mid_level();
    mid_level.init(false).await.unwrap();
    mid_level
        .update(&[pattern, ChannelConfiguration::default()])
        .await
        .unwrap();
    assert_eq!(
        mid_level.get_current_data().await.unwrap(),
        [true, false, false, false]
    );
    mid_level.stop().await.unwrap();

    device.close().unwrap();
    responder.await.unwrap();
}

#[tokio::test]
async fn test_mid_level_channel_error() {
    let (device, sim) = open_device(LayerConfig::default());
    let responder = spawn_responder(sim, |command, _| match command {
        Command::MlGetCurrentData => Some(vec![0, 1, 0b0011, 0b0010]),
        _ => None,
    });

    let err = device.mid_level().get_current_data().await.unwrap_err();
    match err {
        LayerError::ChannelError { channels, .. } => {
            assert_eq!(channels, [false, true, false, false]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    device.close().unwrap();
    responder.await.unwrap();
}

#[tokio::test]
async fn test_dyscom_queries() {
    let (device, sim) = open_device(LayerConfig::default());
    let responder = spawn_responder(sim, |command, frame| match command {
        Command::DlGet => {
            let kind = frame.payload[0];
            let mut payload = vec![0, kind];
            match kind {
                // operation mode
                4 => payload.push(3),
                // device id
                5 => payload.extend(padded("dyscom-0001", DYSCOM_DEVICE_ID_SIZE)),
                // battery
                8 => {
                    payload.extend(3700u16.to_le_bytes());
                    payload.extend((-120i16).to_le_bytes());
                    payload.extend([87, 25, 1]);
                }
                _ => return Some(vec![2, kind]),
            }
            Some(payload)
        }
        Command::DlPowerModule => Some(vec![0, frame.payload[0], frame.payload[1]]),
        Command::DlInit => {
            let mut payload = vec![0, 2, 4];
            payload.extend(padded("measurement", 60));
            Some(payload)
        }
        _ => None,
    });

    let dyscom = device.dyscom();
    assert_eq!(
        dyscom.get_operation_mode().await.unwrap(),
        DyscomOperationMode::LiveMeasuring
    );
    assert_eq!(dyscom.get_device_id().await.unwrap(), "dyscom-0001");

    let battery = dyscom.get_battery().await.unwrap();
    assert_eq!(battery.voltage_mv, 3700);
    assert_eq!(battery.current_ma, -120);
    assert_eq!(battery.percentage, 87);
    assert_eq!(battery.energy_state, DyscomEnergyState::Discharging);

    let err = dyscom.get_file_info().await.unwrap_err();
    assert!(matches!(err, LayerError::Device { code: ResultAndError::ParameterError, .. }));

    let echoed = dyscom
        .power_module(
            DyscomPowerModuleType::MemoryCard,
            DyscomPowerModulePowerType::SwitchOn,
        )
        .await
        .unwrap();
    assert_eq!(
        echoed,
        (DyscomPowerModuleType::MemoryCard, DyscomPowerModulePowerType::SwitchOn)
    );

    let result = dyscom.init(DyscomInitParams::default()).await.unwrap();
    assert_eq!(result.measurement_file_id, "measurement");

    device.close().unwrap();
    responder.await.unwrap();
}

#[tokio::test]
async fn test_dyscom_get_wrong_echo() {
    let (device, sim) = open_device(LayerConfig::default());
    let responder = spawn_responder(sim, |command, _| match command {
        // answers an operation mode query with a list count
        Command::DlGet => Some(vec![0, 2, 7, 0]),
        _ => None,
    });

    let err = device.dyscom().get_operation_mode().await.unwrap_err();
    assert!(matches!(err, LayerError::UnexpectedGetType { .. }));

    device.close().unwrap();
    responder.await.unwrap();
}

#[tokio::test]
async fn test_send_get_operation_mode_does_not_wait() {
    let (device, mut sim) = open_device(LayerConfig::default());

    device.dyscom().send_get_operation_mode().unwrap();
    let request = sim.expect(Command::DlGet).await;
    assert_eq!(request.payload.as_ref(), &[4]);
    assert_eq!(device.layer().pending_count(), 0);

    // a later answer has nobody to go to
    sim.reply(&request, &[0, 4, 1]);
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert_eq!(device.statistics().discarded_acks, 1);
}
