//! Time-of-day schedule of a cycle

use crate::document::{Document, PictureId};
use crate::time::ClockTime;

/// When a picture is displayed during the day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleSlot {
    pub picture_id: PictureId,
    /// The picture starts being shown alone
    pub static_start: ClockTime,
    /// The transition to the next picture starts
    pub static_end: ClockTime,
    /// The next picture is fully shown
    pub transition_end: ClockTime,
}

impl Document {
    /// Computes the first cycle's schedule, starting at the start time's
    /// hour, minute and second
    pub fn schedule(&self) -> Vec<ScheduleSlot> {
        let start = &self.start_time;
        let mut clock = ClockTime::new(start.hour, start.minute, start.second);

        self.pictures
            .iter()
            .map(|picture| {
                let static_start = clock;
                let static_end = static_start.advance(picture.static_seconds);
                let transition_end = static_end.advance(picture.transition_seconds);
                clock = transition_end;
                ScheduleSlot {
                    picture_id: picture.id,
                    static_start,
                    static_end,
                    transition_end,
                }
            })
            .collect()
    }
}
