//! Decoded protocol frames

use super::Command;
use crate::protocol::PayloadReader;

/// One checksum-validated frame received from the bus.
///
/// Header bytes and checksum are stripped; only the variable fields remain.
/// The command is kept as the raw byte so a well-formed frame with a code the
/// driver does not know can still be reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bus address byte as sent by the device
    pub address: u8,

    /// Raw command byte
    pub command: u8,

    /// Payload bytes (declared length)
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a new frame
    pub fn new(address: u8, command: u8, payload: Vec<u8>) -> Self {
        Self { address, command, payload }
    }

    /// Typed command, if the code is part of the protocol.
    pub fn command(&self) -> Option<Command> {
        Command::try_from(self.command).ok()
    }

    /// Check the command byte against a known command.
    pub fn is(&self, command: Command) -> bool {
        self.command == command.code()
    }

    /// Reader over the payload's little-endian 16-bit fields.
    pub fn reader(&self) -> PayloadReader<'_> {
        PayloadReader::new(self.command, &self.payload)
    }
}
