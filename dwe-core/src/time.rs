//! Duration and wall-clock helpers

use std::fmt;

/// Splits a duration in seconds into hours, minutes and seconds
pub fn split_hms(seconds: u32) -> (u32, u32, u32) {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    (hours, minutes, seconds % 60)
}

/// Formats a duration the way it's shown in tooltips
pub fn format_duration(seconds: u32) -> String {
    let (hours, minutes, seconds) = split_hms(seconds);
    format!(
        "{} hour(s) {} minute(s) {} second(s)",
        hours, minutes, seconds
    )
}

/// A time of day, with hours wrapped to 24
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ClockTime {
    /// Builds a time of day, normalizing overflowing minutes and seconds
    pub fn new(hour: u32, minute: u32, second: u32) -> Self {
        Self::from_seconds(
            u64::from(hour) * 3600 + u64::from(minute) * 60 + u64::from(second),
        )
    }

    /// Builds a time of day from seconds since midnight, wrapping past 24h
    pub fn from_seconds(seconds: u64) -> Self {
        let seconds = (seconds % 86_400) as u32;
        let (hour, minute, second) = split_hms(seconds);
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Seconds since midnight
    pub fn as_seconds(&self) -> u64 {
        u64::from(self.hour) * 3600 + u64::from(self.minute) * 60 + u64::from(self.second)
    }

    /// Returns the time of day `seconds` later
    pub fn advance(&self, seconds: u32) -> Self {
        Self::from_seconds(self.as_seconds() + u64::from(seconds))
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.hour, self.minute, self.second)
    }
}
