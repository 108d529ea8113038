//! Fit-to-24h duration redistribution
//!
//! Rescales every static and transition duration proportionally so the whole
//! cycle lasts exactly one day. Truncation drift left after the proportional
//! passes is absorbed by the first picture's static duration.

use crate::document::Document;
use crate::operation::{Operation, PictureEdit};

/// Length of a day in seconds
pub const DAY_SECONDS: u32 = 86_400;

/// Number of proportional passes before the final integer correction
const SCALING_PASSES: usize = 3;

/// Rescales (static, transition) pairs so their sum is exactly one day
pub fn fit_to_day(durations: &[(u32, u32)]) -> Vec<(u32, u32)> {
    fit_to_total(durations, DAY_SECONDS)
}

/// Rescales (static, transition) pairs so their sum is exactly `target`
pub fn fit_to_total(durations: &[(u32, u32)], target: u32) -> Vec<(u32, u32)> {
    match durations.len() {
        0 => Vec::new(),
        // A lone picture fills the whole cycle and never transitions
        1 => vec![(target, 0)],
        _ => fit_cycle(durations, i64::from(target)),
    }
}

fn fit_cycle(durations: &[(u32, u32)], target: i64) -> Vec<(u32, u32)> {
    // Flattened as [static0, transition0, static1, transition1, ...]
    let mut values: Vec<i64> = durations
        .iter()
        .flat_map(|&(s, t)| [i64::from(s), i64::from(t)])
        .collect();

    for _ in 0..SCALING_PASSES {
        let total: i64 = values.iter().sum();
        if total == target || total == 0 {
            break;
        }

        let missing = (target - total) as f64;
        let total = total as f64;
        for value in values.iter_mut() {
            let current = *value as f64;
            *value = (current + (current / total) * missing).trunc() as i64;
        }
    }

    let mut total: i64 = values.iter().sum();
    while total < target {
        values[0] += 1;
        total += 1;
    }
    while total > target {
        // The first static duration takes the correction; once it's empty the
        // next non-empty value does.
        match values.iter_mut().find(|v| **v > 0) {
            Some(value) => *value -= 1,
            None => break,
        }
        total -= 1;
    }

    values
        .chunks_exact(2)
        .map(|pair| (clamp_seconds(pair[0]), clamp_seconds(pair[1])))
        .collect()
}

fn clamp_seconds(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

impl Document {
    /// Builds the single-step operation fitting the cycle to `target` seconds
    ///
    /// Returns `None` when the document is empty or already fits.
    pub fn fit_operation(&self, target: u32) -> Option<Operation> {
        let fitted = fit_to_total(&self.durations(), target);

        let edits: Vec<Operation> = self
            .pictures
            .iter()
            .zip(fitted)
            .filter(|(picture, (s, t))| {
                picture.static_seconds != *s || picture.transition_seconds != *t
            })
            .map(|(picture, (s, t))| {
                Operation::Edit(PictureEdit {
                    static_seconds: Some(s),
                    transition_seconds: Some(t),
                    ..PictureEdit::new(picture.id)
                })
            })
            .collect();

        (!edits.is_empty()).then_some(Operation::Multi(edits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total(durations: &[(u32, u32)]) -> u64 {
        durations
            .iter()
            .map(|&(s, t)| u64::from(s) + u64::from(t))
            .sum()
    }

    #[test]
    fn test_empty_is_noop() {
        assert!(fit_to_day(&[]).is_empty());
    }

    #[test]
    fn test_single_picture_fills_the_day() {
        assert_eq!(fit_to_day(&[(10, 5)]), vec![(86_400, 0)]);
        assert_eq!(fit_to_day(&[(0, 0)]), vec![(86_400, 0)]);
    }

    #[test]
    fn test_already_fitting_is_unchanged() {
        let durations = vec![(43_000, 200), (43_000, 200)];
        assert_eq!(fit_to_day(&durations), durations);
    }

    #[test]
    fn test_proportions_are_kept() {
        let fitted = fit_to_day(&[(100, 0), (100, 0), (200, 0)]);
        assert_eq!(fitted, vec![(21_600, 0), (21_600, 0), (43_200, 0)]);
    }

    #[test]
    fn test_drift_goes_to_first_picture() {
        // 86400 / 7 doesn't divide evenly, the remainder lands on picture 0
        let durations = vec![(1, 0); 7];
        let fitted = fit_to_day(&durations);
        assert_eq!(total(&fitted), 86_400);
        assert!(fitted[1..].iter().all(|&d| d == (12_342, 0)));
        assert_eq!(fitted[0], (86_400 - 6 * 12_342, 0));
    }

    #[test]
    fn test_all_zero_durations() {
        let fitted = fit_to_day(&[(0, 0), (0, 0)]);
        assert_eq!(fitted, vec![(86_400, 0), (0, 0)]);
    }

    #[test]
    fn test_shrinks_long_cycles() {
        let fitted = fit_to_day(&[(80_000, 1000), (80_000, 1000), (5, 7)]);
        assert_eq!(total(&fitted), 86_400);
    }

    #[test]
    fn test_custom_target() {
        let fitted = fit_to_total(&[(10, 1), (20, 2)], 3600);
        assert_eq!(total(&fitted), 3600);
    }
}
