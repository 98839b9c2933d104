//! Sequential reads over a reply payload

use crate::{Result, SensorError};

/// Reads little-endian 16-bit fields from a frame payload in order.
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    command: u8,
    payload: &'a [u8],
    offset: usize,
}

impl<'a> PayloadReader<'a> {
    pub fn new(command: u8, payload: &'a [u8]) -> Self {
        Self { command, payload, offset: 0 }
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.payload.get(self.offset..self.offset + 2).ok_or_else(|| {
            SensorError::malformed_payload(
                self.command,
                format!(
                    "need 2 bytes at offset {}, payload has {}",
                    self.offset,
                    self.payload.len()
                ),
            )
        })?;
        self.offset += 2;

        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.read_u16().map(|value| value as i16)
    }

    /// Bytes not read yet.
    pub fn remaining(&self) -> usize {
        self.payload.len().saturating_sub(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_fields_in_order() {
        let payload = [0x34, 0x12, 0xFF, 0xFF, 0x07];
        let mut reader = PayloadReader::new(0x29, &payload);

        assert_eq!(reader.read_u16().unwrap(), 0x1234);
        assert_eq!(reader.read_i16().unwrap(), -1);
        assert_eq!(reader.remaining(), 1);
    }

    #[test]
    fn short_read_names_the_command() {
        let payload = [0x01];
        let mut reader = PayloadReader::new(0x2B, &payload);

        let error = reader.read_u16().unwrap_err();
        assert!(matches!(error, SensorError::MalformedPayload { command: 0x2B, .. }));
        assert!(error.to_string().contains("offset 0"));
    }
}
