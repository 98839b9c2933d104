//! Transport poller: bridges a [`Bus`] to the frame decoder under a time budget

use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, trace};

use crate::bus::Bus;
use crate::clock::{Clock, SystemClock};
use crate::protocol::{DecoderStats, FrameDecoder};
use crate::types::{Command, Frame};
use crate::{Result, SensorConfig, SensorError};

/// Owns the bus, the decoder and any bytes read but not yet decoded.
///
/// Reads are batched (`read_chunk` bytes at a time) but bytes reach the
/// decoder one by one in arrival order. Bytes left over after a frame
/// completes stay queued for the next wait, as does a partially decoded frame.
#[derive(Debug)]
pub struct Transport<B, C = SystemClock> {
    bus: B,
    clock: C,
    decoder: FrameDecoder,
    pending: VecDeque<u8>,
    read_chunk: usize,
    timeout: Duration,
}

impl<B: Bus, C: Clock> Transport<B, C> {
    pub fn new(bus: B, clock: C, config: &SensorConfig) -> Self {
        Self {
            bus,
            clock,
            decoder: FrameDecoder::new(),
            pending: VecDeque::with_capacity(config.read_chunk),
            read_chunk: config.read_chunk,
            timeout: config.timeout,
        }
    }

    /// Write one encoded frame.
    pub async fn send(&mut self, frame: &[u8]) -> Result<()> {
        trace!("Sending {} byte frame {:02x?}", frame.len(), frame);
        self.bus.write_bytes(frame).await
    }

    /// Poll until a frame arrives or the budget runs out.
    ///
    /// With `expected` set, valid frames carrying another command are
    /// discarded and polling continues. The budget covers the whole call, so
    /// this never waits longer than the configured timeout plus one bus read.
    pub async fn wait_for(&mut self, expected: Option<Command>) -> Result<Frame> {
        let started = self.clock.now();

        loop {
            while let Some(byte) = self.pending.pop_front() {
                let Some(frame) = self.decoder.push(byte) else {
                    continue;
                };
                match expected {
                    Some(command) if !frame.is(command) => {
                        debug!(
                            "Ignoring reply {:#04x} while waiting for {:?}",
                            frame.command, command
                        );
                    }
                    _ => return Ok(frame),
                }
            }

            if self.clock.now().duration_since(started) > self.timeout {
                let awaiting = match expected {
                    Some(command) => format!("{:?}", command),
                    None => "any frame".to_string(),
                };
                debug!("Wait for {} expired after {:?}", awaiting, self.timeout);
                return Err(SensorError::timeout(awaiting, self.timeout));
            }

            let bytes = self.bus.read_available(self.read_chunk).await?;
            if bytes.is_empty() {
                tokio::task::yield_now().await;
            } else {
                self.pending.extend(bytes);
            }
        }
    }

    /// Drop undecoded bytes and any partial frame left by an earlier wait.
    ///
    /// Returns the number of bytes dropped. Bytes still queued on the bus
    /// itself are not touched, so a reply arriving later than its wait
    /// budget can still be read by the next exchange.
    pub fn discard_pending(&mut self) -> usize {
        let dropped = self.pending.len();
        if dropped > 0 || !self.decoder.is_idle() {
            debug!("Discarding {} stale bytes before the next exchange", dropped);
        }
        self.pending.clear();
        self.decoder.reset();
        dropped
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Release the bus, dropping any undecoded bytes.
    pub fn into_bus(self) -> B {
        self.bus
    }
}
