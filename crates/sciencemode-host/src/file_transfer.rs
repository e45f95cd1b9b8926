//! Reassembly of files pushed by the device.
//!
//! After a file has been selected, the device sends it as numbered blocks
//! and waits for the host to confirm each block before sending the next.
//! Block numbers start at the block offset announced by file-by-name and
//! have nothing to do with packet numbers.

use sciencemode_protocol::{DyscomFileByName, DyscomSendFile, DyscomSendFileAck, Packet};
use tracing::{debug, trace, warn};

use crate::error::{FileTransferError, LayerResult};
use crate::layer::Layer;

/// A completely received file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReceivedFile {
    /// File name.
    pub name: String,
    /// File contents.
    pub data: Vec<u8>,
    /// Number of blocks received.
    pub blocks: u32,
}

/// What happened to one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Appended; more data expected.
    Accepted,
    /// Appended; the file is complete.
    Complete,
    /// Seen before; confirmed again and ignored.
    Duplicate,
    /// Ahead of the next expected block; ignored without confirmation.
    OutOfSequence {
        /// Block number expected instead.
        expected: u32,
    },
}

/// Collects the blocks of one file and confirms each of them.
pub struct FileReceiver<'a> {
    layer: &'a Layer,
    name: String,
    expected_size: u64,
    first_block: u32,
    next_block: u32,
    data: Vec<u8>,
}

impl<'a> FileReceiver<'a> {
    /// Prepare to receive `file`.
    pub fn new(layer: &'a Layer, file: &DyscomFileByName) -> Self {
        FileReceiver {
            layer,
            name: file.file_name.clone(),
            expected_size: file.file_size,
            first_block: file.block_offset,
            next_block: file.block_offset,
            data: Vec::new(),
        }
    }

    /// Bytes received so far.
    pub fn received(&self) -> u64 {
        self.data.len() as u64
    }

    /// Whether the announced size has been reached.
    pub fn is_complete(&self) -> bool {
        self.received() >= self.expected_size
    }

    fn confirm(&self, block_number: u32) -> LayerResult<()> {
        let packet = Packet::new(&DyscomSendFileAck { block_number })?;
        self.layer.send_packet(&packet)?;
        Ok(())
    }

    /// Process one block and confirm it if it is new or repeated.
    pub fn handle_block(&mut self, block: &DyscomSendFile) -> LayerResult<BlockOutcome> {
        if block.block_number < self.next_block {
            debug!("FileReceiver[{}]: block {} repeated", self.name, block.block_number);
            self.confirm(block.block_number)?;
            return Ok(BlockOutcome::Duplicate);
        }
        if block.block_number > self.next_block {
            warn!(
                "FileReceiver[{}]: block {} out of sequence, expected {}",
                self.name, block.block_number, self.next_block
            );
            return Ok(BlockOutcome::OutOfSequence {
                expected: self.next_block,
            });
        }

        let received = self.received() + block.data.len() as u64;
        if received > self.expected_size {
            return Err(FileTransferError::SizeExceeded {
                expected: self.expected_size,
                actual: received,
            }
            .into());
        }
        let next_block = self.next_block.checked_add(1).ok_or(
            FileTransferError::BlockNumberOverflow {
                block: block.block_number,
            },
        )?;
        self.data.extend_from_slice(&block.data);
        self.next_block = next_block;
        self.confirm(block.block_number)?;
        trace!(
            "FileReceiver[{}]: block {} accepted, {}/{} bytes",
            self.name,
            block.block_number,
            received,
            self.expected_size
        );

        if self.is_complete() {
            Ok(BlockOutcome::Complete)
        } else {
            Ok(BlockOutcome::Accepted)
        }
    }

    /// Receive blocks until the file is complete.
    ///
    /// Fails if no block arrives within the configured block timeout.
    pub async fn receive(mut self) -> LayerResult<ReceivedFile> {
        let timeout = self.layer.config().file_block_timeout();
        while !self.is_complete() {
            let block = match tokio::time::timeout(timeout, self.layer.next_file_block()).await {
                Ok(Some(block)) => block,
                Ok(None) => return Err(FileTransferError::StreamClosed.into()),
                Err(_) => {
                    return Err(FileTransferError::BlockTimeout {
                        block: self.next_block,
                        timeout,
                    }
                    .into())
                }
            };
            self.handle_block(&block)?;
        }
        Ok(self.finish())
    }

    /// Take the data received so far.
    pub fn finish(self) -> ReceivedFile {
        debug!("FileReceiver[{}]: {} bytes received", self.name, self.data.len());
        ReceivedFile {
            blocks: self.next_block - self.first_block,
            name: self.name,
            data: self.data,
        }
    }
}
