//! Recognition algorithms selectable on the sensor

use serde::{Deserialize, Serialize};

/// Recognition mode, sent as the payload of [`Command::RequestAlgorithm`](super::Command).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[repr(u16)]
pub enum Algorithm {
    FaceRecognition = 0,
    ObjectTracking = 1,
    ObjectRecognition = 2,
    LineTracking = 3,
    ColorRecognition = 4,
    TagRecognition = 5,
}

impl Algorithm {
    /// All algorithms in protocol order.
    pub const ALL: [Algorithm; 6] = [
        Algorithm::FaceRecognition,
        Algorithm::ObjectTracking,
        Algorithm::ObjectRecognition,
        Algorithm::LineTracking,
        Algorithm::ColorRecognition,
        Algorithm::TagRecognition,
    ];

    /// Payload value written after the command byte.
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Line tracking reports arrows, every other mode reports blocks.
    pub const fn reports_arrows(self) -> bool {
        matches!(self, Algorithm::LineTracking)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_protocol_order() {
        for (index, algorithm) in Algorithm::ALL.iter().enumerate() {
            assert_eq!(algorithm.code() as usize, index);
        }
    }

    #[test]
    fn only_line_tracking_reports_arrows() {
        let arrow_modes: Vec<_> =
            Algorithm::ALL.into_iter().filter(|algorithm| algorithm.reports_arrows()).collect();
        assert_eq!(arrow_modes, vec![Algorithm::LineTracking]);
    }
}
