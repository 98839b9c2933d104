//! The result table: summary plus decoded records of one completed cycle.
//!
//! A [`ResultSet`] is built by the request engine from one info frame and the
//! block/arrow frames that follow it, and is only ever replaced as a whole.
//! Read access goes through the query methods in [`query`].

pub mod query;

use serde::{Deserialize, Serialize};

use crate::types::{Command, Frame, ResultRecord};
use crate::{Result, SensorError};

pub use query::{FRAME_HEIGHT, FRAME_WIDTH, center_score};

/// Header of a result cycle, decoded from the info frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct Summary {
    /// Command of the frame the summary came from
    pub command: Command,
    /// Blocks plus arrows that follow in this cycle
    pub record_count: u16,
    /// Identifiers the sensor has learned
    pub learned_count: u16,
    /// Trailing fields the driver does not interpret
    pub reserved: [u16; 3],
}

impl Default for Summary {
    fn default() -> Self {
        Self { command: Command::ReturnInfo, record_count: 0, learned_count: 0, reserved: [0; 3] }
    }
}

impl Summary {
    /// Decode the five 16-bit fields of an info frame.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        if !frame.is(Command::ReturnInfo) {
            return Err(SensorError::unexpected_reply("info reply", frame.command));
        }

        let mut reader = frame.reader();
        let record_count = reader.read_u16()?;
        let learned_count = reader.read_u16()?;
        let reserved = [reader.read_u16()?, reader.read_u16()?, reader.read_u16()?];

        Ok(Self { command: Command::ReturnInfo, record_count, learned_count, reserved })
    }
}

/// Decoded results of one completed request cycle.
///
/// Holds exactly `summary.record_count` records, in the order the sensor sent
/// them. An empty set (the default) stands for "no cycle completed yet".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct ResultSet {
    summary: Summary,
    records: Vec<ResultRecord>,
    cycle: u64,
}

impl ResultSet {
    /// Build a result set. Records beyond the summary's count are dropped and
    /// the count is lowered to the records actually present.
    pub fn new(mut summary: Summary, mut records: Vec<ResultRecord>) -> Self {
        records.truncate(summary.record_count as usize);
        summary.record_count = records.len() as u16;
        Self { summary, records, cycle: 0 }
    }

    pub(crate) fn with_cycle(mut self, cycle: u64) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    /// Sequence number of the cycle that produced this set; 0 before any.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
