//! Request/response correlation.
//!
//! The [`Layer`] owns the connection and a background read loop. Each
//! request gets a packet number and a waiter; the read loop decodes frames
//! and hands each acknowledgement to the waiter registered for its packet
//! number. Acknowledgements nobody waits for are dropped. File blocks
//! pushed by the device bypass correlation and go to a separate channel.
//!
//! A packet number whose request timed out or was abandoned by its caller
//! is held back for one response timeout before it is reused, so a late
//! acknowledgement cannot resolve the next request on that number.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sciencemode_protocol::{
    AckPayload, Command, DecodedFrame, DyscomSendFile, Packet, PacketAck, PacketNumberGenerator,
    Protocol, Request,
};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, trace, warn};

use crate::config::LayerConfig;
use crate::connection::Connection;
use crate::error::{check_result, LayerError, LayerResult};

// ============================================================================
// Types
// ============================================================================

/// Lifecycle of one request waiting for its acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Sent, waiting.
    Sent,
    /// Matching acknowledgement received and decoded.
    Acknowledged,
    /// No acknowledgement within the timeout.
    TimedOut,
    /// Acknowledgement received but its payload failed to decode, or the
    /// connection went away.
    Errored,
}

/// Traffic counters of a [`Layer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Statistics {
    /// Frames written.
    pub sent: u64,
    /// Requests resolved by their acknowledgement.
    pub acknowledged: u64,
    /// Requests that timed out.
    pub timed_out: u64,
    /// Requests that failed after sending.
    pub errored: u64,
    /// Requests abandoned by their caller before they resolved.
    pub cancelled: u64,
    /// Acknowledgements without a waiting request.
    pub discarded_acks: u64,
    /// Recoverable framing errors.
    pub framing_errors: u64,
    /// File blocks received.
    pub file_blocks: u64,
}

type Outcome = LayerResult<PacketAck>;

struct Pending {
    id: u64,
    command: Command,
    waiter: oneshot::Sender<Outcome>,
}

/// State shared between callers and the read loop.
struct Shared {
    connection: Mutex<Box<dyn Connection>>,
    protocol: Mutex<Protocol>,
    generator: Mutex<PacketNumberGenerator>,
    pending: Mutex<HashMap<u8, Pending>>,
    /// Numbers held back until the given instant.
    held_back: Mutex<HashMap<u8, Instant>>,
    reuse_delay: Duration,
    next_id: AtomicU64,
    statistics: Mutex<Statistics>,
    files: mpsc::Sender<DyscomSendFile>,
    running: AtomicBool,
}

impl Shared {
    /// Resolve the request waiting on `packet_number`, if any.
    ///
    /// Returns false if no request was waiting.
    fn finish(&self, packet_number: u8, state: RequestState, outcome: Outcome) -> bool {
        let Some(pending) = self.pending.lock().remove(&packet_number) else {
            return false;
        };
        self.resolve(pending, packet_number, state, outcome);
        true
    }

    /// Remove the entry on `packet_number` if it still belongs to request `id`.
    fn take(&self, packet_number: u8, id: u64) -> Option<Pending> {
        let mut pending = self.pending.lock();
        let owned = pending
            .get(&packet_number)
            .is_some_and(|entry| entry.id == id);
        if owned {
            pending.remove(&packet_number)
        } else {
            None
        }
    }

    fn resolve(&self, pending: Pending, packet_number: u8, state: RequestState, outcome: Outcome) {
        trace!("Layer: {:?} #{} -> {:?}", pending.command, packet_number, state);
        {
            let mut stats = self.statistics.lock();
            match state {
                RequestState::Acknowledged => stats.acknowledged += 1,
                RequestState::TimedOut => stats.timed_out += 1,
                RequestState::Errored => stats.errored += 1,
                RequestState::Sent => {}
            }
        }
        if state == RequestState::TimedOut {
            self.hold_back(packet_number);
        }
        // the caller may have given up already
        let _ = pending.waiter.send(outcome);
    }

    /// Keep `packet_number` out of use for one response timeout.
    fn hold_back(&self, packet_number: u8) {
        let until = Instant::now() + self.reuse_delay;
        self.held_back.lock().insert(packet_number, until);
    }

    /// Pick a number that is neither pending nor held back.
    ///
    /// `pending` is the locked pending table.
    fn allocate(&self, pending: &HashMap<u8, Pending>) -> LayerResult<u8> {
        let now = Instant::now();
        let mut held_back = self.held_back.lock();
        held_back.retain(|_, until| *until > now);
        self.generator
            .lock()
            .next_free(|n| pending.contains_key(&n) || held_back.contains_key(&n))
            .ok_or(LayerError::NoFreePacketNumber)
    }

    /// Fail every waiting request.
    fn fail_all(&self, reason: &str) {
        let numbers: Vec<u8> = self.pending.lock().keys().copied().collect();
        if !numbers.is_empty() {
            debug!("Layer: failing {} pending requests: {}", numbers.len(), reason);
        }
        for number in numbers {
            self.finish(number, RequestState::Errored, Err(LayerError::ConnectionLost));
        }
    }

    fn write_packet(&self, packet: &Packet, packet_number: u8) -> LayerResult<()> {
        let bytes = self.protocol.lock().encode_packet(packet, packet_number)?;
        self.connection.lock().write(&bytes)?;
        self.statistics.lock().sent += 1;
        Ok(())
    }

    /// Read once from the connection and dispatch every complete frame.
    fn poll(&self) -> LayerResult<()> {
        let data = self.connection.lock().read()?;
        if data.is_empty() {
            return Ok(());
        }
        trace!("Layer: rx {}", hex::encode(&data));

        let mut frames = Vec::new();
        {
            let mut protocol = self.protocol.lock();
            protocol.feed(&data);
            while let Some(result) = protocol.next_frame() {
                match result {
                    Ok(frame) => frames.push(frame),
                    Err(err) if err.is_fatal() => return Err(err.into()),
                    Err(err) => {
                        warn!("Layer: {}", err);
                        self.statistics.lock().framing_errors += 1;
                    }
                }
            }
        }
        for frame in frames {
            self.dispatch(frame);
        }
        Ok(())
    }

    fn dispatch(&self, frame: DecodedFrame) {
        if frame.command.is_unsolicited() {
            self.deliver_file_block(frame);
            return;
        }

        // match and remove under one lock
        let matched = {
            let mut pending = self.pending.lock();
            let matches = pending.get(&frame.packet_number).is_some_and(|entry| {
                entry.command.ack() == Some(frame.command)
                    || frame.command == Command::UnknownCommand
            });
            if matches {
                pending.remove(&frame.packet_number)
            } else {
                None
            }
        };
        let Some(pending) = matched else {
            debug!(
                "Layer: dropping {:?} #{} without waiting request",
                frame.command, frame.packet_number
            );
            self.statistics.lock().discarded_acks += 1;
            return;
        };

        match frame.ack {
            Ok(ack) => {
                self.resolve(pending, frame.packet_number, RequestState::Acknowledged, Ok(ack));
            }
            Err(err) => {
                self.resolve(pending, frame.packet_number, RequestState::Errored, Err(err.into()));
            }
        }
    }

    fn deliver_file_block(&self, frame: DecodedFrame) {
        let block = match frame.ack {
            Ok(PacketAck::DyscomSendFile(block)) => block,
            Ok(other) => {
                warn!("Layer: unexpected unsolicited {:?}", other.command());
                return;
            }
            Err(err) => {
                warn!("Layer: bad file block: {}", err);
                return;
            }
        };
        trace!("Layer: file block {} ({} bytes)", block.block_number, block.data.len());
        self.statistics.lock().file_blocks += 1;
        if let Err(err) = self.files.try_send(block) {
            warn!("Layer: file block dropped: {}", err);
        }
    }
}

async fn read_loop(shared: Arc<Shared>, config: LayerConfig) {
    let mut ticker = tokio::time::interval(config.poll_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    while shared.running.load(Ordering::Acquire) {
        ticker.tick().await;
        if let Err(err) = shared.poll() {
            error!("Layer: read loop stopped: {}", err);
            shared.running.store(false, Ordering::Release);
            shared.fail_all("read loop stopped");
            break;
        }
    }
    debug!("Layer: read loop finished");
}

/// Removes a request from the pending table if its caller drops the
/// future before the request resolved.
struct PendingGuard<'a> {
    shared: &'a Shared,
    packet_number: u8,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if let Some(entry) = self.shared.take(self.packet_number, self.id) {
            debug!("Layer: {:?} #{} abandoned by caller", entry.command, self.packet_number);
            self.shared.statistics.lock().cancelled += 1;
            self.shared.hold_back(self.packet_number);
        }
    }
}

// ============================================================================
// Layer
// ============================================================================

/// Request/response layer over one connection.
pub struct Layer {
    shared: Arc<Shared>,
    config: LayerConfig,
    permits: Semaphore,
    reader: Mutex<Option<JoinHandle<()>>>,
    files: tokio::sync::Mutex<mpsc::Receiver<DyscomSendFile>>,
}

impl Layer {
    /// Open `connection` if needed and start the read loop.
    ///
    /// Must be called within a tokio runtime.
    pub fn start<C: Connection + 'static>(mut connection: C, config: LayerConfig) -> LayerResult<Self> {
        config.validate()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| LayerError::NoRuntime)?;
        let generator = PacketNumberGenerator::with_count(config.packet_number_count)?;
        if !connection.is_open() {
            connection.open()?;
        }

        let connection: Box<dyn Connection> = Box::new(connection);
        let (files_tx, files_rx) = mpsc::channel(config.file_block_capacity);
        let shared = Arc::new(Shared {
            connection: Mutex::new(connection),
            protocol: Mutex::new(Protocol::new()),
            generator: Mutex::new(generator),
            pending: Mutex::new(HashMap::new()),
            held_back: Mutex::new(HashMap::new()),
            reuse_delay: config.response_timeout(),
            next_id: AtomicU64::new(0),
            statistics: Mutex::new(Statistics::default()),
            files: files_tx,
            running: AtomicBool::new(true),
        });
        let reader = runtime.spawn(read_loop(shared.clone(), config.clone()));
        debug!("Layer: started, timeout {:?}", config.response_timeout());

        Ok(Layer {
            shared,
            permits: Semaphore::new(config.max_in_flight),
            config,
            reader: Mutex::new(Some(reader)),
            files: tokio::sync::Mutex::new(files_rx),
        })
    }

    /// Layer settings.
    pub fn config(&self) -> &LayerConfig {
        &self.config
    }

    /// Whether the read loop is running.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Traffic counters.
    pub fn statistics(&self) -> Statistics {
        *self.shared.statistics.lock()
    }

    /// Number of requests waiting for an acknowledgement.
    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().len()
    }

    fn ensure_running(&self) -> LayerResult<()> {
        if self.is_running() {
            Ok(())
        } else {
            Err(LayerError::ConnectionLost)
        }
    }

    /// Send `packet` without waiting for an acknowledgement.
    ///
    /// Returns the packet number used. An acknowledgement arriving later is
    /// dropped.
    pub fn send_packet(&self, packet: &Packet) -> LayerResult<u8> {
        self.ensure_running()?;
        let packet_number = {
            let pending = self.shared.pending.lock();
            self.shared.allocate(&pending)?
        };
        self.shared.write_packet(packet, packet_number)?;
        trace!("Layer: sent {:?} #{} without waiting", packet.command(), packet_number);
        Ok(packet_number)
    }

    /// Send `packet` and wait for its acknowledgement.
    ///
    /// The returned acknowledgement is not checked for its result code.
    pub async fn send_packet_and_wait(&self, packet: &Packet) -> LayerResult<PacketAck> {
        let command = packet.command();
        if command.ack().is_none() {
            return Err(sciencemode_protocol::ProtocolError::invalid_argument(format!(
                "{:?} is not answered by the device",
                command
            ))
            .into());
        }
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| LayerError::ConnectionLost)?;
        self.ensure_running()?;

        let (tx, mut rx) = oneshot::channel();
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let packet_number = {
            let mut pending = self.shared.pending.lock();
            let packet_number = self.shared.allocate(&pending)?;
            pending.insert(
                packet_number,
                Pending {
                    id,
                    command,
                    waiter: tx,
                },
            );
            packet_number
        };
        let _guard = PendingGuard {
            shared: &self.shared,
            packet_number,
            id,
        };

        if let Err(err) = self.shared.write_packet(packet, packet_number) {
            self.shared.take(packet_number, id);
            return Err(err);
        }

        let timeout = self.config.response_timeout();
        match tokio::time::timeout(timeout, &mut rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(LayerError::ConnectionLost),
            Err(_) => {
                let timed_out = match self.shared.take(packet_number, id) {
                    Some(entry) => {
                        self.shared.resolve(
                            entry,
                            packet_number,
                            RequestState::TimedOut,
                            Err(LayerError::Timeout {
                                command,
                                packet_number,
                                timeout,
                            }),
                        );
                        true
                    }
                    None => false,
                };
                if !timed_out {
                    // resolved between the timeout firing and now
                    if let Ok(outcome) = rx.try_recv() {
                        return outcome;
                    }
                }
                warn!("Layer: {:?} #{} timed out after {:?}", command, packet_number, timeout);
                Err(LayerError::Timeout {
                    command,
                    packet_number,
                    timeout,
                })
            }
        }
    }

    /// Send `request`, wait for its typed acknowledgement and check the
    /// device result code. `label` names the operation in errors.
    pub async fn request<R: Request>(&self, request: &R, label: &'static str) -> LayerResult<R::Ack> {
        let packet = Packet::new(request)?;
        let ack = self.send_packet_and_wait(&packet).await?;
        Self::check_ack::<R::Ack>(ack, label)
    }

    /// Convert `ack` to `A` and check its result code.
    ///
    /// The device answers requests it does not know with an unknown-command
    /// acknowledgement; that is reported as [`LayerError::Device`].
    pub fn check_ack<A: AckPayload>(ack: PacketAck, label: &'static str) -> LayerResult<A> {
        if let PacketAck::UnknownCommand(unknown) = &ack {
            debug!("Layer: {} rejected, device reports unknown command {}", label, unknown.command_code);
            return Err(LayerError::Device {
                label,
                code: unknown.result_error(),
            });
        }
        let typed = A::try_from(ack).map_err(|other| LayerError::UnexpectedAck {
            label,
            actual: other.command(),
        })?;
        check_result(typed.result_error(), label)?;
        Ok(typed)
    }

    /// Wait for the next file block pushed by the device.
    pub async fn next_file_block(&self) -> Option<DyscomSendFile> {
        self.files.lock().await.recv().await
    }

    /// Drop file blocks that arrived but were not consumed.
    pub async fn drain_file_blocks(&self) -> usize {
        let mut files = self.files.lock().await;
        let mut count = 0;
        while files.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    /// Stop the read loop, fail waiting requests and close the connection.
    pub fn close(&self) -> LayerResult<()> {
        self.shared.running.store(false, Ordering::Release);
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }
        self.shared.fail_all("layer closed");
        self.permits.close();
        self.shared.connection.lock().close()?;
        debug!("Layer: closed");
        Ok(())
    }
}

impl Drop for Layer {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(reader) = self.reader.lock().take() {
            reader.abort();
        }
    }
}
