//! Wire protocol: frame layout, encoding and streaming decode.
//!
//! Every frame on the bus has the same layout. Multi-byte integers are
//! little-endian.
//!
//! ```text
//! offset  0      1      2        3        4        5 .. 5+len-1   5+len
//!         0x55   0xAA   address  len      command  payload        checksum
//! ```
//!
//! The checksum is the sum of every preceding byte modulo 256. Frames must
//! fit the fixed [`FRAME_BUFFER_SIZE`] byte buffer with room to spare, which
//! caps the payload at [`MAX_PAYLOAD_LEN`] bytes in both directions.

mod decode;
mod encode;
mod payload;

pub use decode::{DecoderStats, FrameDecoder};
pub use encode::{encode_command, encode_frame};
pub use payload::PayloadReader;

/// First header byte.
pub const HEADER_0: u8 = 0x55;
/// Second header byte.
pub const HEADER_1: u8 = 0xAA;
/// Address byte written into outgoing frames.
pub const DEFAULT_ADDRESS: u8 = 0x11;

pub(crate) const HEADER_0_INDEX: usize = 0;
pub(crate) const HEADER_1_INDEX: usize = 1;
pub(crate) const ADDRESS_INDEX: usize = 2;
pub(crate) const LENGTH_INDEX: usize = 3;
pub(crate) const COMMAND_INDEX: usize = 4;
pub(crate) const CONTENT_INDEX: usize = 5;

/// Bytes in a frame besides the payload: two headers, address, length,
/// command and checksum.
pub const PROTOCOL_OVERHEAD: usize = 6;
/// Size of the receive and send buffers.
pub const FRAME_BUFFER_SIZE: usize = 128;
/// Largest frame either side accepts. A frame must be strictly smaller than
/// the buffer.
pub const MAX_FRAME_SIZE: usize = FRAME_BUFFER_SIZE - 1;
/// Largest payload either side accepts.
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_SIZE - PROTOCOL_OVERHEAD;

/// Sum of `bytes` modulo 256.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte))
}
