//! Driver configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::protocol::DEFAULT_ADDRESS;
use crate::{Result, SensorError};

/// Tunables for one sensor connection.
///
/// Every field has a default matching the sensor's stock behaviour, so
/// `SensorConfig::default()` is a working configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Address byte written into outgoing frames
    pub address: u8,

    /// Budget for each wait on a reply frame
    pub timeout: Duration,

    /// Attempts made by `knock` before reporting the sensor absent
    pub knock_attempts: u32,

    /// Bytes requested from the bus per read
    pub read_chunk: usize,

    /// Largest result set a cycle may commit
    pub result_capacity: usize,

    /// Pause between attempts of the until-success loops
    pub retry_interval: Duration,

    /// Consecutive failed cycles after which a background driver stops
    pub max_consecutive_failures: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            timeout: Duration::from_millis(100),
            knock_attempts: 5,
            read_chunk: 16,
            result_capacity: 10,
            retry_interval: Duration::from_millis(500),
            max_consecutive_failures: 10,
        }
    }
}

impl SensorConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_knock_attempts(mut self, attempts: u32) -> Self {
        self.knock_attempts = attempts;
        self
    }

    pub fn with_read_chunk(mut self, read_chunk: usize) -> Self {
        self.read_chunk = read_chunk;
        self
    }

    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn with_max_consecutive_failures(mut self, failures: u32) -> Self {
        self.max_consecutive_failures = failures;
        self
    }

    /// Reject values the driver cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(SensorError::invalid_config("timeout must be greater than zero"));
        }
        if self.knock_attempts == 0 {
            return Err(SensorError::invalid_config("knock_attempts must be at least 1"));
        }
        if self.read_chunk == 0 {
            return Err(SensorError::invalid_config("read_chunk must be at least 1"));
        }
        if self.result_capacity == 0 {
            return Err(SensorError::invalid_config("result_capacity must be at least 1"));
        }
        if self.max_consecutive_failures == 0 {
            return Err(SensorError::invalid_config("max_consecutive_failures must be at least 1"));
        }
        Ok(())
    }
}
