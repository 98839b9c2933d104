//! Core types for the sensor protocol.
//!
//! This module provides the data structures exchanged with the sensor and the
//! selectors used to query decoded results.
//!
//! ## Architecture
//!
//! - [`Command`] is the closed set of protocol command bytes
//! - [`Request`] and [`Algorithm`] describe what the host asks for
//! - [`Frame`] is one checksum-validated unit received from the bus
//! - [`ResultRecord`] is a decoded [`Block`] or [`Arrow`]
//! - [`BlockField`], [`ArrowField`] and [`Field`] select record fields
//! - [`PollRate`] paces background request cycles
//!
//! ## Usage Example
//!
//! ```rust
//! use huskylens::types::{BlockField, Command, Frame, ResultRecord};
//!
//! // x=160, y=120, w=40, h=30, id=2
//! let payload = [160u16, 120, 40, 30, 2].iter().flat_map(|v| v.to_le_bytes()).collect();
//! let frame = Frame::new(0x11, Command::ReturnBlock.code(), payload);
//!
//! let record = ResultRecord::from_frame(&frame).unwrap();
//! assert_eq!(record.field(BlockField::Width), Some(40));
//! assert_eq!(record.id(), 2);
//! ```

mod algorithm;
mod command;
mod frame;
mod poll_rate;
mod record;
mod request;

// Re-export all public types
pub use algorithm::Algorithm;
pub use command::Command;
pub use frame::Frame;
pub use poll_rate::PollRate;
pub use record::{Arrow, ArrowField, Block, BlockField, Field, ResultKind, ResultRecord};
pub use request::Request;
