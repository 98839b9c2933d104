//! Protocol command codes

use serde::{Deserialize, Serialize};

use crate::SensorError;

/// Command byte carried at offset 4 of every frame.
///
/// The set is fixed by the sensor firmware. Requests flow host to sensor,
/// `Return*` codes flow back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[repr(u8)]
pub enum Command {
    Request = 0x20,
    RequestBlocks = 0x21,
    RequestArrows = 0x22,
    RequestLearned = 0x23,
    RequestBlocksLearned = 0x24,
    RequestArrowsLearned = 0x25,
    RequestById = 0x26,
    RequestBlocksById = 0x27,
    RequestArrowsById = 0x28,
    ReturnInfo = 0x29,
    ReturnBlock = 0x2A,
    ReturnArrow = 0x2B,
    RequestKnock = 0x2C,
    RequestAlgorithm = 0x2D,
    ReturnOk = 0x2E,
    RequestLearn = 0x2F,
    RequestForget = 0x30,
    RequestSensor = 0x31,
}

impl Command {
    /// Wire value of this command.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// True for codes the sensor sends back.
    pub const fn is_reply(self) -> bool {
        matches!(
            self,
            Command::ReturnInfo | Command::ReturnBlock | Command::ReturnArrow | Command::ReturnOk
        )
    }
}

impl TryFrom<u8> for Command {
    type Error = SensorError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        let command = match code {
            0x20 => Command::Request,
            0x21 => Command::RequestBlocks,
            0x22 => Command::RequestArrows,
            0x23 => Command::RequestLearned,
            0x24 => Command::RequestBlocksLearned,
            0x25 => Command::RequestArrowsLearned,
            0x26 => Command::RequestById,
            0x27 => Command::RequestBlocksById,
            0x28 => Command::RequestArrowsById,
            0x29 => Command::ReturnInfo,
            0x2A => Command::ReturnBlock,
            0x2B => Command::ReturnArrow,
            0x2C => Command::RequestKnock,
            0x2D => Command::RequestAlgorithm,
            0x2E => Command::ReturnOk,
            0x2F => Command::RequestLearn,
            0x30 => Command::RequestForget,
            0x31 => Command::RequestSensor,
            code => return Err(SensorError::UnknownCommand { code }),
        };
        Ok(command)
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_in_range_maps_back_to_itself() {
        for code in 0x20u8..=0x31 {
            let command = Command::try_from(code).expect("code in protocol range");
            assert_eq!(command.code(), code);
        }
    }

    #[test]
    fn codes_outside_the_table_are_rejected() {
        for code in [0x00u8, 0x1F, 0x32, 0xFF] {
            assert!(matches!(
                Command::try_from(code),
                Err(SensorError::UnknownCommand { code: c }) if c == code
            ));
        }
    }

    #[test]
    fn reply_codes_are_classified() {
        assert!(Command::ReturnInfo.is_reply());
        assert!(Command::ReturnOk.is_reply());
        assert!(!Command::RequestKnock.is_reply());
        assert!(!Command::Request.is_reply());
    }
}
