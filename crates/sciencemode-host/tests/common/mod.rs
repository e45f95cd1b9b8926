//! Scripted device on the far end of a memory connection.

#![allow(dead_code)]

use std::time::Duration;

use sciencemode_host::{Device, LayerConfig, MemoryConnection, MemoryPeer};
use sciencemode_protocol::{Command, Frame, FrameCodec};
use tokio::task::JoinHandle;

/// Time a test waits for the host before giving up.
pub const DEVICE_WAIT: Duration = Duration::from_secs(2);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The device side of a test connection.
pub struct SimulatedDevice {
    peer: MemoryPeer,
    codec: FrameCodec,
}

impl SimulatedDevice {
    pub fn new(peer: MemoryPeer) -> Self {
        SimulatedDevice {
            peer,
            codec: FrameCodec::new(),
        }
    }

    /// Next frame written by the host, or `None` after `wait`.
    pub async fn try_next_request(&mut self, wait: Duration) -> Option<Frame> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            self.codec.push(&self.peer.take_written());
            if let Some(frame) = self.codec.decode() {
                return Some(frame.expect("host sent a malformed frame"));
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }

    /// Next frame written by the host; panics after [`DEVICE_WAIT`].
    pub async fn next_request(&mut self) -> Frame {
        self.try_next_request(DEVICE_WAIT)
            .await
            .expect("host sent nothing")
    }

    /// Next request, which must carry `command`.
    pub async fn expect(&mut self, command: Command) -> Frame {
        let frame = self.next_request().await;
        assert_eq!(
            Command::from_code(frame.code),
            Some(command),
            "unexpected request code {}",
            frame.code
        );
        frame
    }

    /// Send a frame to the host.
    pub fn send(&self, command: Command, packet_number: u8, payload: &[u8]) {
        let frame = Frame::new(command.code(), packet_number, payload.to_vec());
        self.peer
            .inject(&FrameCodec::encode(&frame).expect("frame encodes"));
    }

    /// Answer `request` with the acknowledgement of its command.
    pub fn reply(&self, request: &Frame, payload: &[u8]) {
        let command = Command::from_code(request.code)
            .and_then(|c| c.ack())
            .expect("request has an acknowledgement");
        self.send(command, request.packet_number, payload);
    }

    /// Send raw bytes to the host.
    pub fn inject(&self, data: &[u8]) {
        self.peer.inject(data);
    }

    pub fn peer(&self) -> &MemoryPeer {
        &self.peer
    }
}

/// Open a device over a memory connection.
pub fn open_device(config: LayerConfig) -> (Device, SimulatedDevice) {
    init_tracing();
    let (connection, peer) = MemoryConnection::new();
    let device = Device::open(connection, config).expect("device opens");
    (device, SimulatedDevice::new(peer))
}

/// Answer every request with the payload returned by `handler`.
pub fn spawn_responder<F>(mut sim: SimulatedDevice, mut handler: F) -> JoinHandle<()>
where
    F: FnMut(Command, &Frame) -> Option<Vec<u8>> + Send + 'static,
{
    tokio::spawn(async move {
        while sim.peer().is_open() {
            let Some(frame) = sim.try_next_request(Duration::from_millis(20)).await else {
                continue;
            };
            let Some(command) = Command::from_code(frame.code) else {
                continue;
            };
            if let Some(payload) = handler(command, &frame) {
                sim.reply(&frame, &payload);
            }
        }
    })
}
