//! Bus trait for byte transports

use crate::Result;

/// Byte-oriented link to the sensor
///
/// Abstracts over the physical transport (I2C, UART, a test double). The
/// driver only ever needs two operations, and the protocol is half-duplex:
/// one command goes out, then replies are read until the exchange completes.
#[async_trait::async_trait]
pub trait Bus: Send {
    /// Read whatever bytes are available, at most `max`
    ///
    /// Must not wait for data. Returning an empty vector is the normal answer
    /// when the sensor has nothing queued; the poller decides how long to keep
    /// asking.
    async fn read_available(&mut self, max: usize) -> Result<Vec<u8>>;

    /// Write a complete frame
    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()>;
}

#[async_trait::async_trait]
impl<B: Bus + ?Sized> Bus for Box<B> {
    async fn read_available(&mut self, max: usize) -> Result<Vec<u8>> {
        (**self).read_available(max).await
    }

    async fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes).await
    }
}
