//! Polling rate control for background result streams

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often a background driver issues request cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum PollRate {
    /// Start the next cycle as soon as the previous one returns
    Continuous,

    /// At most this many cycles per second
    /// A rate of zero, or one above [`PollRate::MAX_HZ`], is treated as Continuous
    Hz(u32),
}

impl PollRate {
    /// Fastest rate with a non-zero spacing at nanosecond resolution
    pub const MAX_HZ: u32 = 1_000_000_000;

    /// Normalize degenerate rates
    pub fn normalize(self) -> Self {
        match self {
            PollRate::Hz(0) => PollRate::Continuous,
            PollRate::Hz(hz) if hz > Self::MAX_HZ => PollRate::Continuous,
            rate => rate,
        }
    }

    /// Spacing between cycle starts, if any; never zero
    pub fn interval(self) -> Option<Duration> {
        match self.normalize() {
            PollRate::Continuous => None,
            PollRate::Hz(hz) => Some(Duration::from_nanos(1_000_000_000 / hz as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hz_means_continuous() {
        assert_eq!(PollRate::Hz(0).normalize(), PollRate::Continuous);
        assert_eq!(PollRate::Hz(0).interval(), None);
    }

    #[test]
    fn rates_beyond_nanosecond_resolution_mean_continuous() {
        assert_eq!(PollRate::Hz(u32::MAX).normalize(), PollRate::Continuous);
        assert_eq!(PollRate::Hz(u32::MAX).interval(), None);
        assert_eq!(PollRate::Hz(PollRate::MAX_HZ).interval(), Some(Duration::from_nanos(1)));
    }

    #[test]
    fn hz_maps_to_interval() {
        assert_eq!(PollRate::Hz(10).interval(), Some(Duration::from_millis(100)));
        assert_eq!(PollRate::Continuous.interval(), None);
    }
}
