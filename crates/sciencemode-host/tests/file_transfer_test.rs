//! Receiving a measurement file block by block.

mod common;

use common::{open_device, SimulatedDevice};
use sciencemode_host::{FileTransferError, LayerConfig, LayerError};
use sciencemode_protocol::{Command, DyscomFileByName, DyscomFileByNameMode, FILE_NAME_SIZE};

const CONTENT: &[u8] = b"0123456789";

fn file_by_name_payload(name: &str, offset: u32, size: u64, blocks: u32) -> Vec<u8> {
    let mut payload = vec![0, 3];
    let mut name = name.as_bytes().to_vec();
    name.resize(FILE_NAME_SIZE, 0);
    payload.extend(name);
    payload.extend(offset.to_le_bytes());
    payload.extend(size.to_le_bytes());
    payload.extend(blocks.to_le_bytes());
    payload.push(1);
    payload
}

fn send_block(sim: &SimulatedDevice, number: u32, data: &[u8]) {
    let mut payload = number.to_be_bytes().to_vec();
    payload.extend((data.len() as u16).to_be_bytes());
    payload.extend(data);
    sim.send(Command::DlSendFile, 0, &payload);
}

async fn expect_confirmation(sim: &mut SimulatedDevice) -> u32 {
    let frame = sim.expect(Command::DlSendFileAck).await;
    u32::from_be_bytes([frame.payload[0], frame.payload[1], frame.payload[2], frame.payload[3]])
}

#[tokio::test]
async fn test_receive_file_with_repeated_and_early_blocks() {
    let (device, mut sim) = open_device(LayerConfig::default());
    let dyscom = device.dyscom();

    let (file, _) = tokio::join!(dyscom.get_file_by_name(), async {
        let request = sim.expect(Command::DlGet).await;
        sim.reply(&request, &file_by_name_payload("rec_0001.bin", 0, 10, 3));
    });
    let file = file.unwrap();
    assert_eq!(file.file_name, "rec_0001.bin");
    assert_eq!(file.file_size, 10);
    assert_eq!(file.number_of_blocks, 3);
    assert_eq!(file.mode, DyscomFileByNameMode::MultiBlock);

    let (received, _) = tokio::join!(dyscom.receive_file(&file), async {
        send_block(&sim, 0, &CONTENT[..4]);
        assert_eq!(expect_confirmation(&mut sim).await, 0);

        // the confirmation got lost, the device repeats the block
        send_block(&sim, 0, &CONTENT[..4]);
        assert_eq!(expect_confirmation(&mut sim).await, 0);

        // a block from the future is ignored and not confirmed
        send_block(&sim, 2, &CONTENT[8..]);
        send_block(&sim, 1, &CONTENT[4..8]);
        assert_eq!(expect_confirmation(&mut sim).await, 1);

        send_block(&sim, 2, &CONTENT[8..]);
        assert_eq!(expect_confirmation(&mut sim).await, 2);
    });

    let received = received.unwrap();
    assert_eq!(received.name, "rec_0001.bin");
    assert_eq!(received.data, CONTENT);
    assert_eq!(received.blocks, 3);
    assert_eq!(device.statistics().file_blocks, 5);
    assert_eq!(device.layer().pending_count(), 0);
}

#[tokio::test]
async fn test_receive_file_from_block_offset() {
    let (device, mut sim) = open_device(LayerConfig::default());
    let file = DyscomFileByName {
        file_name: "resume.bin".to_string(),
        block_offset: 7,
        file_size: 3,
        number_of_blocks: 1,
        mode: DyscomFileByNameMode::SingleBlock,
    };

    let dyscom = device.dyscom();
    let (received, _) = tokio::join!(dyscom.receive_file(&file), async {
        send_block(&sim, 7, b"abc");
        assert_eq!(expect_confirmation(&mut sim).await, 7);
    });
    let received = received.unwrap();
    assert_eq!(received.data, b"abc");
    assert_eq!(received.blocks, 1);
}

#[tokio::test]
async fn test_block_timeout() {
    let config = LayerConfig {
        file_block_timeout_ms: 50,
        ..Default::default()
    };
    let (device, sim) = open_device(config);
    let file = DyscomFileByName {
        file_name: "silent.bin".to_string(),
        file_size: 8,
        number_of_blocks: 2,
        ..Default::default()
    };

    let dyscom = device.dyscom();
    let (received, _) = tokio::join!(dyscom.receive_file(&file), async {
        send_block(&sim, 0, &CONTENT[..4]);
    });
    match received.unwrap_err() {
        LayerError::FileTransfer(FileTransferError::BlockTimeout { block, .. }) => {
            assert_eq!(block, 1);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[tokio::test]
async fn test_block_larger_than_file() {
    let (device, sim) = open_device(LayerConfig::default());
    let file = DyscomFileByName {
        file_name: "short.bin".to_string(),
        file_size: 4,
        number_of_blocks: 1,
        ..Default::default()
    };

    let dyscom = device.dyscom();
    let (received, _) = tokio::join!(dyscom.receive_file(&file), async {
        send_block(&sim, 0, CONTENT);
    });
    assert!(matches!(
        received.unwrap_err(),
        LayerError::FileTransfer(FileTransferError::SizeExceeded { expected: 4, actual: 10 })
    ));
}

#[tokio::test]
async fn test_block_number_space_exhausted() {
    let (device, sim) = open_device(LayerConfig::default());
    let file = DyscomFileByName {
        file_name: "wrap.bin".to_string(),
        block_offset: u32::MAX,
        file_size: 8,
        number_of_blocks: 2,
        ..Default::default()
    };

    let dyscom = device.dyscom();
    let (received, _) = tokio::join!(dyscom.receive_file(&file), async {
        send_block(&sim, u32::MAX, &CONTENT[..4]);
    });
    assert!(matches!(
        received.unwrap_err(),
        LayerError::FileTransfer(FileTransferError::BlockNumberOverflow { block: u32::MAX })
    ));
}

#[tokio::test]
async fn test_blocks_do_not_resolve_requests() {
    let (device, mut sim) = open_device(LayerConfig::default());

    let dyscom = device.dyscom();
    let (status, _) = tokio::join!(dyscom.get_list_of_measurement_meta_info(), async {
        let request = sim.expect(Command::DlGet).await;
        // a block reusing the request's packet number
        let mut block = 0u32.to_be_bytes().to_vec();
        block.extend([0, 1, 0xAA]);
        sim.send(Command::DlSendFile, request.packet_number, &block);
        sim.reply(&request, &[0, 2, 5, 0]);
    });
    assert_eq!(status.unwrap(), 5);
    assert_eq!(device.statistics().discarded_acks, 0);
    assert_eq!(device.layer().drain_file_blocks().await, 1);
}
