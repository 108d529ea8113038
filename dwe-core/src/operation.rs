//! Typed edit operations

use crate::document::{PictureId, StartTime};

/// Partial update of one picture, only `Some` fields are changed
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PictureEdit {
    pub picture_id: PictureId,
    pub path: Option<String>,
    pub index: Option<usize>,
    pub static_seconds: Option<u32>,
    pub transition_seconds: Option<u32>,
}

impl PictureEdit {
    /// Creates an edit of the given picture that changes nothing yet
    pub fn new(picture_id: PictureId) -> Self {
        Self {
            picture_id,
            path: None,
            index: None,
            static_seconds: None,
            transition_seconds: None,
        }
    }
}

/// One user-level edit of a document
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Operation {
    /// Appends a new picture at the end of the cycle
    Add {
        path: String,
        static_seconds: u32,
        transition_seconds: u32,
    },
    Edit(PictureEdit),
    Delete { picture_id: PictureId },
    SetStartTime(StartTime),
    /// Group of operations undone and redone as a single step
    Multi(Vec<Operation>),
}

impl Operation {
    /// Creates an operation appending one picture
    pub fn add(path: impl Into<String>, static_seconds: u32, transition_seconds: u32) -> Self {
        Operation::Add {
            path: path.into(),
            static_seconds,
            transition_seconds,
        }
    }

    /// Creates a single-step operation appending several pictures
    pub fn add_many<I, P>(paths: I, static_seconds: u32, transition_seconds: u32) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Operation::Multi(
            paths
                .into_iter()
                .map(|path| Operation::add(path, static_seconds, transition_seconds))
                .collect(),
        )
    }

    /// Creates an operation deleting one picture
    pub fn delete(picture_id: PictureId) -> Self {
        Operation::Delete { picture_id }
    }

    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Add { .. } => "add",
            Operation::Edit(_) => "edit",
            Operation::Delete { .. } => "delete",
            Operation::SetStartTime(_) => "set_start_time",
            Operation::Multi(_) => "multi",
        }
    }
}
