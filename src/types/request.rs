//! Result requests

use serde::{Deserialize, Serialize};

use super::Command;

/// A result request. Every form is answered with the same info-then-records
/// exchange; they differ only in which records the sensor includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum Request {
    /// Every block and arrow currently visible
    All,
    Blocks,
    Arrows,
    /// Only results whose identifier has been learned
    Learned,
    LearnedBlocks,
    LearnedArrows,
    /// Results carrying one identifier
    ById(u16),
    BlocksById(u16),
    ArrowsById(u16),
}

impl Request {
    pub const fn command(self) -> Command {
        match self {
            Request::All => Command::Request,
            Request::Blocks => Command::RequestBlocks,
            Request::Arrows => Command::RequestArrows,
            Request::Learned => Command::RequestLearned,
            Request::LearnedBlocks => Command::RequestBlocksLearned,
            Request::LearnedArrows => Command::RequestArrowsLearned,
            Request::ById(_) => Command::RequestById,
            Request::BlocksById(_) => Command::RequestBlocksById,
            Request::ArrowsById(_) => Command::RequestArrowsById,
        }
    }

    /// 16-bit payload carried by the by-identifier forms.
    pub const fn payload(self) -> Option<u16> {
        match self {
            Request::ById(id) | Request::BlocksById(id) | Request::ArrowsById(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn by_id_requests_carry_the_identifier() {
        assert_eq!(Request::ById(3).payload(), Some(3));
        assert_eq!(Request::BlocksById(7).command(), Command::RequestBlocksById);
        assert_eq!(Request::ArrowsById(1).payload(), Some(1));
        assert_eq!(Request::All.payload(), None);
        assert_eq!(Request::All.command(), Command::Request);
    }
}
