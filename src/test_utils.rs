//! Test utilities: a scripted in-memory bus and reply frame builders
//!
//! These helpers stand in for a real sensor. Replies are queued up front and
//! released one per host write, which is how the half-duplex protocol behaves
//! on the wire.

#![cfg(any(test, feature = "benchmark"))]

use std::collections::VecDeque;
use std::time::Duration;

use crate::bus::Bus;
use crate::clock::ManualClock;
use crate::protocol::{DEFAULT_ADDRESS, encode_frame};
use crate::types::{Arrow, Block, Command};
use crate::{Result, SensorError};

/// In-memory [`Bus`] that replays scripted replies.
///
/// Each call to `write_bytes` releases the next queued reply (if any) into the
/// incoming byte queue. When a [`ManualClock`] is attached, every read that
/// finds nothing advances it by a fixed step, so a silent sensor drives the
/// poller into its timeout without real waiting.
#[derive(Debug, Default)]
pub struct ScriptedBus {
    incoming: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
    writes: Vec<Vec<u8>>,
    idle: Option<(ManualClock, Duration)>,
    idle_reads: usize,
    fail_writes: bool,
}

impl ScriptedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance `clock` by `step` on every empty read.
    pub fn with_clock(mut self, clock: ManualClock, step: Duration) -> Self {
        self.idle = Some((clock, step));
        self
    }

    /// Queue a reply released by the next unanswered write.
    pub fn with_reply(mut self, bytes: Vec<u8>) -> Self {
        self.queue_reply(bytes);
        self
    }

    /// Bytes already waiting on the bus before any write.
    pub fn with_incoming(mut self, bytes: &[u8]) -> Self {
        self.incoming.extend(bytes);
        self
    }

    pub fn queue_reply(&mut self, bytes: Vec<u8>) {
        self.replies.push_back(bytes);
    }

    /// Make every write fail with a bus error.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Frames written by the host, in order.
    pub fn writes(&self) -> &[Vec<u8>] {
        &self.writes
    }

    /// Reads that returned no bytes.
    pub fn idle_reads(&self) -> usize {
        self.idle_reads
    }

    /// Bytes still waiting to be read.
    pub fn pending(&self) -> usize {
        self.incoming.len()
    }
}

#[async_trait::async_trait]
impl Bus for ScriptedBus {
    async fn read_available(&mut self, max: usize) -> Result<Vec<u8>> {
        let count = max.min(self.incoming.len());
        if count == 0 {
            self.idle_reads += 1;
            if let Some((clock, step)) = &self.idle {
                clock.advance(*step);
            }
            return Ok(Vec::new());
        }
        Ok(self.incoming.drain(..count).collect())
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(SensorError::bus_failed("scripted write failure"));
        }
        self.writes.push(bytes.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            self.incoming.extend(reply);
        }
        Ok(())
    }
}

/// Encode a reply frame whose payload is a list of 16-bit fields.
pub fn reply(command: Command, fields: &[u16]) -> Vec<u8> {
    let payload: Vec<u8> = fields.iter().flat_map(|field| field.to_le_bytes()).collect();
    encode_frame(DEFAULT_ADDRESS, command.code(), &payload).expect("reply frames fit the buffer")
}

/// Summary frame opening a result cycle.
pub fn info_reply(record_count: u16, learned_count: u16) -> Vec<u8> {
    reply(Command::ReturnInfo, &[record_count, learned_count, 0, 0, 0])
}

pub fn block_reply(block: Block) -> Vec<u8> {
    reply(
        Command::ReturnBlock,
        &[
            block.x_center as u16,
            block.y_center as u16,
            block.width as u16,
            block.height as u16,
            block.id,
        ],
    )
}

pub fn arrow_reply(arrow: Arrow) -> Vec<u8> {
    reply(
        Command::ReturnArrow,
        &[
            arrow.x_origin as u16,
            arrow.y_origin as u16,
            arrow.x_target as u16,
            arrow.y_target as u16,
            arrow.id,
        ],
    )
}

pub fn ok_reply() -> Vec<u8> {
    reply(Command::ReturnOk, &[])
}

/// A whole cycle's worth of replies concatenated, as the sensor streams them.
pub fn cycle_reply(learned_count: u16, blocks: &[Block], arrows: &[Arrow]) -> Vec<u8> {
    let mut bytes = info_reply((blocks.len() + arrows.len()) as u16, learned_count);
    for block in blocks {
        bytes.extend(block_reply(*block));
    }
    for arrow in arrows {
        bytes.extend(arrow_reply(*arrow));
    }
    bytes
}

pub fn block(x_center: i16, y_center: i16, width: i16, height: i16, id: u16) -> Block {
    Block { x_center, y_center, width, height, id }
}

pub fn arrow(x_origin: i16, y_origin: i16, x_target: i16, y_target: i16, id: u16) -> Arrow {
    Arrow { x_origin, y_origin, x_target, y_target, id }
}

/// Install a test subscriber; repeated calls are harmless.
#[cfg(test)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
