//! Streaming frame decoder
//!
//! The decoder consumes one byte at a time and yields a [`Frame`] whenever a
//! complete frame with a matching checksum has been seen. Anything else is
//! dropped silently: a bad header byte is skipped, an impossible length or a
//! checksum mismatch discards the frame in progress. Scanning resumes with the
//! next byte, so noise on the bus costs at most one frame.

use tracing::trace;

use super::{
    ADDRESS_INDEX, COMMAND_INDEX, CONTENT_INDEX, FRAME_BUFFER_SIZE, HEADER_0, HEADER_0_INDEX,
    HEADER_1, HEADER_1_INDEX, LENGTH_INDEX, MAX_PAYLOAD_LEN, checksum,
};
use crate::types::Frame;

/// Counters for frames accepted and discarded by a [`FrameDecoder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Frames that passed the checksum
    pub frames: u64,
    /// Bytes rejected at a header position
    pub header_mismatches: u64,
    /// Frames dropped because the declared length exceeds the buffer
    pub oversized: u64,
    /// Frames dropped on checksum mismatch
    pub checksum_failures: u64,
}

/// Byte-at-a-time frame decoder.
///
/// Differs from a strict scanner in one place: a `0x55` that breaks the
/// header at position 1 is kept as the first header byte of a new frame
/// rather than rejected, so `55 55 AA ...` still yields the frame.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    buffer: [u8; FRAME_BUFFER_SIZE],
    position: usize,
    stats: DecoderStats,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self { buffer: [0; FRAME_BUFFER_SIZE], position: 0, stats: DecoderStats::default() }
    }

    /// Feed one byte; returns a frame when this byte completes a valid one.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.position {
            HEADER_0_INDEX => {
                if byte != HEADER_0 {
                    self.stats.header_mismatches += 1;
                    return None;
                }
            }
            HEADER_1_INDEX => {
                if byte != HEADER_1 {
                    self.stats.header_mismatches += 1;
                    // A repeated first header byte may itself start the next frame
                    self.position = if byte == HEADER_0 { HEADER_1_INDEX } else { HEADER_0_INDEX };
                    return None;
                }
            }
            ADDRESS_INDEX => {}
            LENGTH_INDEX => {
                if byte as usize > MAX_PAYLOAD_LEN {
                    self.stats.oversized += 1;
                    trace!("Dropping frame with oversized length {}", byte);
                    self.position = HEADER_0_INDEX;
                    return None;
                }
            }
            _ => {}
        }

        self.buffer[self.position] = byte;

        if self.position > LENGTH_INDEX
            && self.position == CONTENT_INDEX + self.buffer[LENGTH_INDEX] as usize
        {
            self.position = HEADER_0_INDEX;
            return self.finish();
        }

        self.position += 1;
        None
    }

    /// Feed a slice, yielding every frame it completes in order.
    pub fn feed<'a>(&'a mut self, bytes: &'a [u8]) -> impl Iterator<Item = Frame> + 'a {
        bytes.iter().filter_map(move |byte| self.push(*byte))
    }

    /// Abandon any partially received frame.
    pub fn reset(&mut self) {
        self.position = HEADER_0_INDEX;
    }

    /// True when no frame is in progress.
    pub fn is_idle(&self) -> bool {
        self.position == HEADER_0_INDEX
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    fn finish(&mut self) -> Option<Frame> {
        let end = CONTENT_INDEX + self.buffer[LENGTH_INDEX] as usize;
        let expected = checksum(&self.buffer[..end]);

        if expected != self.buffer[end] {
            self.stats.checksum_failures += 1;
            trace!(
                "Checksum mismatch on command {:#04x}: expected {:#04x}, got {:#04x}",
                self.buffer[COMMAND_INDEX],
                expected,
                self.buffer[end]
            );
            return None;
        }

        self.stats.frames += 1;
        let frame = Frame::new(
            self.buffer[ADDRESS_INDEX],
            self.buffer[COMMAND_INDEX],
            self.buffer[CONTENT_INDEX..end].to_vec(),
        );
        trace!("Decoded frame {:#04x} with {} payload bytes", frame.command, frame.payload.len());

        Some(frame)
    }
}
