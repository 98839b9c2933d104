//! Outgoing frame encoding

use super::{
    DEFAULT_ADDRESS, HEADER_0, HEADER_1, MAX_FRAME_SIZE, MAX_PAYLOAD_LEN, PROTOCOL_OVERHEAD,
    checksum,
};
use crate::types::Command;
use crate::{Result, SensorError};

/// Encode a frame with an arbitrary payload.
///
/// Fails with [`SensorError::FrameTooLarge`] when the payload would not fit
/// the frame buffer.
pub fn encode_frame(address: u8, command: u8, payload: &[u8]) -> Result<Vec<u8>> {
    let size = PROTOCOL_OVERHEAD + payload.len();
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(SensorError::FrameTooLarge { size, max: MAX_FRAME_SIZE });
    }

    let mut frame = Vec::with_capacity(size);
    frame.extend_from_slice(&[HEADER_0, HEADER_1, address, payload.len() as u8, command]);
    frame.extend_from_slice(payload);
    frame.push(checksum(&frame));

    Ok(frame)
}

/// Encode a command with at most one 16-bit argument.
pub fn encode_command(address: u8, command: Command, value: Option<u16>) -> Result<Vec<u8>> {
    match value {
        Some(value) => encode_frame(address, command.code(), &value.to_le_bytes()),
        None => encode_frame(address, command.code(), &[]),
    }
}

impl Command {
    /// Encode this command for the default bus address.
    pub fn encode(self, value: Option<u16>) -> Result<Vec<u8>> {
        encode_command(DEFAULT_ADDRESS, self, value)
    }
}
