//! DWE Core Library
//!
//! This library provides the document model for dynamic wallpapers: an ordered
//! cycle of pictures, each shown for a static duration then cross-faded into
//! the next, anchored to an absolute start time. It covers the typed edit
//! operations, replay-based undo/redo, the fit-to-24h redistribution and the
//! XML dialect read by the desktop's wallpaper subsystem.

pub mod config;
pub mod document;
pub mod fit;
pub mod model;
pub mod operation;
pub mod schedule;
pub mod time;
pub mod xml;

pub use config::EditorConfig;
pub use document::{Document, Picture, PictureId, StartTime};
pub use fit::{fit_to_day, fit_to_total, DAY_SECONDS};
pub use model::{DocumentModel, Observer};
pub use operation::{Operation, PictureEdit};
pub use schedule::ScheduleSlot;
pub use time::{format_duration, split_hms, ClockTime};
pub use xml::{Decoded, Notice};

/// Result type for dwe-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for dwe-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupted wallpaper file: {0}")]
    CorruptedFormat(String),

    #[error("Invalid root element '{0}', expected 'background'")]
    InvalidRoot(String),

    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the notification shown to the user when a load fails
    pub fn user_message(&self) -> &'static str {
        match self {
            Error::Io(_) | Error::CorruptedFormat(_) => "This dynamic wallpaper is corrupted",
            Error::InvalidRoot(_) => "This XML file doesn't describe a valid dynamic wallpaper",
            #[cfg(feature = "serde")]
            Error::Json(_) => "This dynamic wallpaper couldn't be converted to JSON",
        }
    }
}
