//! Async, transport-agnostic driver for the HuskyLens AI vision sensor.
//!
//! The sensor speaks a small framed request/response protocol over I2C or
//! UART. This crate encodes requests, decodes the reply stream byte by byte,
//! and keeps the results of the last completed request cycle in a queryable
//! table.
//!
//! # Features
//!
//! - **Any byte transport**: implement [`Bus`] for I2C, UART or a test double
//! - **Atomic cycles**: a failed request never disturbs the last good table
//! - **Typed results**: blocks and arrows with `Option` based queries
//! - **Background polling**: [`LensConnection`] streams fresh tables
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use huskylens::{Bus, HuskyLens, Result, SensorConfig};
//! use huskylens::types::{Algorithm, BlockField};
//!
//! # struct I2cBus;
//! # #[async_trait::async_trait]
//! # impl Bus for I2cBus {
//! #     async fn read_available(&mut self, _max: usize) -> Result<Vec<u8>> { Ok(Vec::new()) }
//! #     async fn write_bytes(&mut self, _bytes: &[u8]) -> Result<()> { Ok(()) }
//! # }
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let mut lens = HuskyLens::new(I2cBus, SensorConfig::default())?;
//!     lens.knock().await?;
//!     lens.set_algorithm(Algorithm::FaceRecognition).await?;
//!
//!     let results = lens.request().await?;
//!     if let Some(x) = results.nearest_field(BlockField::XCenter) {
//!         println!("Nearest face at x={}", x);
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod config;
mod error;
pub mod protocol;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Byte transport
pub mod bus;
pub mod clock;
pub mod transport;

// Request engine and results
pub mod results;
pub mod sensor;

// Background polling
pub mod connection;
pub mod driver;

// Core exports
pub use bus::Bus;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::SensorConfig;
pub use error::*;
pub use types::*;

pub use connection::LensConnection;
pub use results::{ResultSet, Summary};
pub use sensor::HuskyLens;
pub use transport::Transport;
