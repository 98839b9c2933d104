//! Error types for sensor communication.
//!
//! Every failure the driver can surface is a [`SensorError`]. Framing noise on
//! the bus (bad headers, oversized lengths, checksum mismatches) never shows up
//! here: the decoder drops those frames and keeps scanning. What reaches the
//! caller are cycle-level failures.
//!
//! ## Error Categories
//!
//! - **Bus Errors**: the byte transport itself failed
//! - **Timeouts**: no matching reply arrived within the wait budget
//! - **Protocol Errors**: a reply had the wrong command or a short payload
//! - **Capacity Errors**: an outgoing frame or an incoming result set is too large
//! - **Configuration Errors**: invalid [`SensorConfig`](crate::SensorConfig) values
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use huskylens::SensorError;
//!
//! let error = SensorError::not_responding(5);
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::time::Duration;
use thiserror::Error;

/// Result type alias for sensor operations.
pub type Result<T, E = SensorError> = std::result::Result<T, E>;

/// Main error type for sensor operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SensorError {
    #[error("Bus transfer failed: {reason}")]
    Bus {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Timed out after {duration:?} waiting for {awaiting}")]
    Timeout { awaiting: String, duration: Duration },

    #[error("Unexpected reply {found:#04x}, expected {expected}")]
    UnexpectedReply { expected: String, found: u8 },

    #[error("Malformed payload in reply {command:#04x}: {details}")]
    MalformedPayload { command: u8, details: String },

    #[error("Frame of {size} bytes exceeds the {max} byte frame limit")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Sensor reported {declared} results but the table holds {capacity}")]
    ResultOverflow { declared: usize, capacity: usize },

    #[error("Sensor did not answer after {attempts} attempts")]
    NotResponding { attempts: u32 },

    #[error("Unknown command code {code:#04x}")]
    UnknownCommand { code: u8 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("Operation cancelled")]
    Cancelled,
}

impl SensorError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            SensorError::Bus { .. } => true,
            SensorError::Timeout { .. } => true,
            SensorError::UnexpectedReply { .. } => true,
            SensorError::MalformedPayload { .. } => true,
            SensorError::ResultOverflow { .. } => true,
            SensorError::NotResponding { .. } => true,
            SensorError::FrameTooLarge { .. } => false,
            SensorError::UnknownCommand { .. } => false,
            SensorError::InvalidConfig { .. } => false,
            SensorError::Cancelled => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            SensorError::Bus { .. } => vec![
                "Check the wiring between host and sensor",
                "Verify the sensor protocol setting matches the bus in use",
                "Re-open the bus handle",
            ],
            SensorError::Timeout { .. } => vec![
                "Increase the wait budget in SensorConfig",
                "Check that the sensor is powered and finished booting",
                "Re-issue the request",
            ],
            SensorError::UnexpectedReply { .. } | SensorError::MalformedPayload { .. } => vec![
                "Re-issue the request",
                "Check for other devices talking on the same bus",
                "Update the sensor firmware",
            ],
            SensorError::FrameTooLarge { .. } => vec![
                "Shorten the outgoing payload",
                "Split the command into several frames",
            ],
            SensorError::ResultOverflow { .. } => vec![
                "Raise result_capacity in SensorConfig",
                "Use a filtered request to limit the number of results",
            ],
            SensorError::NotResponding { .. } => vec![
                "Ensure the sensor is powered",
                "Check the bus address and protocol selection on the sensor",
                "Increase knock_attempts in SensorConfig",
            ],
            SensorError::UnknownCommand { .. } => vec![
                "Check that the code comes from the sensor protocol table",
                "Update the driver to a version that knows the command",
            ],
            SensorError::InvalidConfig { .. } => vec![
                "Fix the reported configuration field",
                "Start from SensorConfig::default()",
            ],
            SensorError::Cancelled => vec!["Restart the operation if it is still needed"],
        }
    }

    /// Helper constructor for bus failures.
    pub fn bus_failed(reason: impl Into<String>) -> Self {
        SensorError::Bus { reason: reason.into(), source: None }
    }

    /// Helper constructor for bus failures with source.
    pub fn bus_failed_with_source(
        reason: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        SensorError::Bus { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for expired wait budgets.
    pub fn timeout(awaiting: impl Into<String>, duration: Duration) -> Self {
        SensorError::Timeout { awaiting: awaiting.into(), duration }
    }

    /// Helper constructor for replies whose command does not fit the exchange.
    pub fn unexpected_reply(expected: impl Into<String>, found: u8) -> Self {
        SensorError::UnexpectedReply { expected: expected.into(), found }
    }

    /// Helper constructor for short or inconsistent reply payloads.
    pub fn malformed_payload(command: u8, details: impl Into<String>) -> Self {
        SensorError::MalformedPayload { command, details: details.into() }
    }

    /// Helper constructor for a probe that exhausted its attempts.
    pub fn not_responding(attempts: u32) -> Self {
        SensorError::NotResponding { attempts }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        SensorError::InvalidConfig { reason: reason.into() }
    }
}

impl From<std::io::Error> for SensorError {
    fn from(err: std::io::Error) -> Self {
        SensorError::Bus { reason: err.to_string(), source: Some(Box::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn error_messages_carry_their_context(
            reason in ".*",
            awaiting in "[a-z ]+",
            code in any::<u8>(),
            declared in 0usize..1000,
            capacity in 0usize..1000,
            duration_ms in 1u64..60000u64
        ) {
            let bus = SensorError::bus_failed(reason.clone());
            prop_assert!(bus.to_string().contains(&reason));

            let timeout = SensorError::timeout(awaiting.clone(), Duration::from_millis(duration_ms));
            prop_assert!(timeout.to_string().contains(&awaiting));

            let unexpected = SensorError::unexpected_reply("block or arrow", code);
            let code_hex = format!("{:#04x}", code);
            prop_assert!(unexpected.to_string().contains(&code_hex));

            let overflow = SensorError::ResultOverflow { declared, capacity };
            let overflow_msg = overflow.to_string();
            prop_assert!(overflow_msg.contains(&declared.to_string()));
            prop_assert!(overflow_msg.contains(&capacity.to_string()));
        }

        #[test]
        fn io_errors_keep_their_message_through_the_source_chain(message in ".+") {
            let io_err = std::io::Error::other(message.clone());
            let converted: SensorError = io_err.into();

            prop_assert!(matches!(converted, SensorError::Bus { .. }), "io errors map to Bus");
            let source = std::error::Error::source(&converted);
            prop_assert!(source.is_some());
            prop_assert_eq!(source.map(|s| s.to_string()), Some(message));
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<SensorError>();

        let error = SensorError::bus_failed("test");
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn cycle_failures_are_retryable() {
        assert!(SensorError::timeout("info", Duration::from_millis(100)).is_retryable());
        assert!(SensorError::unexpected_reply("block or arrow", 0x2E).is_retryable());
        assert!(SensorError::malformed_payload(0x2A, "short").is_retryable());
        assert!(SensorError::not_responding(5).is_retryable());

        assert!(!SensorError::FrameTooLarge { size: 200, max: 128 }.is_retryable());
        assert!(!SensorError::invalid_config("timeout").is_retryable());
        assert!(!SensorError::Cancelled.is_retryable());
    }

    #[test]
    fn recovery_suggestions_are_descriptive() {
        let errors = [
            SensorError::bus_failed("nack"),
            SensorError::timeout("ok", Duration::from_millis(100)),
            SensorError::not_responding(5),
            SensorError::ResultOverflow { declared: 20, capacity: 10 },
            SensorError::Cancelled,
        ];

        for error in &errors {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty(), "{error} should carry suggestions");
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }
}
