//! Editor configuration

use crate::fit::DAY_SECONDS;

/// Defaults used when editing a wallpaper
#[derive(Debug, Clone)]
pub struct EditorConfig {
    /// Static duration given to newly added pictures, in seconds
    pub static_seconds: u32,
    /// Transition duration given to newly added pictures, in seconds
    pub transition_seconds: u32,
    /// Target cycle length for fit-to-24h, in seconds
    pub day_seconds: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            static_seconds: 10,
            transition_seconds: 0,
            day_seconds: DAY_SECONDS,
        }
    }
}
