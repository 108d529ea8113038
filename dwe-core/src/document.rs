//! Wallpaper document data structures

use crate::operation::{Operation, PictureEdit};

/// Identifier of a picture, unique for the life of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PictureId(pub u64);

/// One scheduled picture of the cycle
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Picture {
    /// Identifier, never reused after deletion
    pub id: PictureId,
    /// Path of the image file, not checked for existence
    pub path: String,
    /// Seconds the picture is shown alone
    pub static_seconds: u32,
    /// Seconds spent cross-fading into the next picture
    pub transition_seconds: u32,
    /// 0-based position in the cycle
    pub index: usize,
}

/// Absolute time at which the first picture of the cycle begins
///
/// No calendar validation is performed, the wallpaper format doesn't do any
/// either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartTime {
    pub year: u32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl StartTime {
    /// Creates a new start time
    pub fn new(year: u32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    /// Start time with every field set to zero, used for missing elements
    pub fn zero() -> Self {
        Self::new(0, 0, 0, 0, 0, 0)
    }
}

impl Default for StartTime {
    fn default() -> Self {
        Self::new(2018, 1, 1, 0, 0, 0)
    }
}

/// The whole dynamic wallpaper: a start time and an ordered picture cycle
///
/// `pictures` is always kept sorted by `index`, and indexes are dense
/// (`0..len`). The last picture transitions back to the first one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Document {
    pub start_time: StartTime,
    pub pictures: Vec<Picture>,
}

impl Document {
    /// Creates an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pictures in the cycle
    pub fn len(&self) -> usize {
        self.pictures.len()
    }

    /// Whether the cycle has no picture
    pub fn is_empty(&self) -> bool {
        self.pictures.is_empty()
    }

    /// Gets a picture by ID
    pub fn get(&self, id: PictureId) -> Option<&Picture> {
        self.pictures.iter().find(|p| p.id == id)
    }

    /// Gets the picture at a cycle position
    pub fn at_index(&self, index: usize) -> Option<&Picture> {
        self.pictures.get(index)
    }

    /// Gets the picture the given one transitions into, wrapping to the first
    pub fn next_of(&self, index: usize) -> Option<&Picture> {
        if self.pictures.is_empty() {
            return None;
        }
        self.pictures.get((index + 1) % self.pictures.len())
    }

    /// Sum of every static and transition duration, in seconds
    pub fn total_duration(&self) -> u64 {
        self.pictures
            .iter()
            .map(|p| u64::from(p.static_seconds) + u64::from(p.transition_seconds))
            .sum()
    }

    /// The (static, transition) pair shared by every picture, if any
    pub fn uniform_durations(&self) -> Option<(u32, u32)> {
        let first = self.pictures.first()?;
        let pair = (first.static_seconds, first.transition_seconds);
        self.pictures
            .iter()
            .all(|p| (p.static_seconds, p.transition_seconds) == pair)
            .then_some(pair)
    }

    /// Returns every (static, transition) pair in cycle order
    pub fn durations(&self) -> Vec<(u32, u32)> {
        self.pictures
            .iter()
            .map(|p| (p.static_seconds, p.transition_seconds))
            .collect()
    }

    /// Builds an operation moving a picture to another position
    pub fn move_picture(&self, id: PictureId, to_index: usize) -> Operation {
        Operation::Edit(PictureEdit {
            index: Some(to_index),
            ..PictureEdit::new(id)
        })
    }

    /// Builds an operation giving every picture the same durations
    pub fn set_all_durations(&self, static_seconds: u32, transition_seconds: u32) -> Operation {
        Operation::Multi(
            self.pictures
                .iter()
                .map(|p| {
                    Operation::Edit(PictureEdit {
                        static_seconds: Some(static_seconds),
                        transition_seconds: Some(transition_seconds),
                        ..PictureEdit::new(p.id)
                    })
                })
                .collect(),
        )
    }

    /// Builds an operation replacing `search` by `replacement` in every path
    ///
    /// Returns `None` when no path contains `search`.
    pub fn replace_in_paths(&self, search: &str, replacement: &str) -> Option<Operation> {
        if search.is_empty() {
            return None;
        }

        let edits: Vec<Operation> = self
            .pictures
            .iter()
            .filter(|p| p.path.contains(search))
            .map(|p| {
                Operation::Edit(PictureEdit {
                    path: Some(p.path.replace(search, replacement)),
                    ..PictureEdit::new(p.id)
                })
            })
            .collect();

        (!edits.is_empty()).then_some(Operation::Multi(edits))
    }

    /// Serializes the document as pretty-printed JSON
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sorts pictures by index, then renumbers them densely
    pub(crate) fn normalize(&mut self) {
        self.pictures.sort_by_key(|p| p.index);
        self.restack_indexes();
    }

    /// Makes every index match the picture's actual position
    pub(crate) fn restack_indexes(&mut self) {
        for (index, picture) in self.pictures.iter_mut().enumerate() {
            picture.index = index;
        }
    }

    pub(crate) fn push(&mut self, id: PictureId, path: String, static_seconds: u32, transition_seconds: u32) {
        let index = self.pictures.len();
        self.pictures.push(Picture {
            id,
            path,
            static_seconds,
            transition_seconds,
            index,
        });
        self.restack_indexes();
    }

    pub(crate) fn remove(&mut self, id: PictureId) -> Option<Picture> {
        let position = self.pictures.iter().position(|p| p.id == id)?;
        let removed = self.pictures.remove(position);
        self.restack_indexes();
        Some(removed)
    }

    /// Applies the present fields of an edit, returns false if the picture
    /// doesn't exist
    pub(crate) fn edit(&mut self, edit: &PictureEdit) -> bool {
        let Some(position) = self.pictures.iter().position(|p| p.id == edit.picture_id) else {
            return false;
        };

        let picture = &mut self.pictures[position];
        if let Some(path) = &edit.path {
            picture.path.clone_from(path);
        }
        if let Some(static_seconds) = edit.static_seconds {
            picture.static_seconds = static_seconds;
        }
        if let Some(transition_seconds) = edit.transition_seconds {
            picture.transition_seconds = transition_seconds;
        }

        if let Some(to_index) = edit.index {
            let to_index = to_index.min(self.pictures.len() - 1);
            let moved = self.pictures.remove(position);
            self.pictures.insert(to_index, moved);
            self.restack_indexes();
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut doc = Document::new();
        doc.push(PictureId(1), "/img/a.png".into(), 100, 5);
        doc.push(PictureId(2), "/img/b.png".into(), 200, 5);
        doc.push(PictureId(3), "/other/c.png".into(), 300, 0);
        doc
    }

    fn paths(doc: &Document) -> Vec<&str> {
        doc.pictures.iter().map(|p| p.path.as_str()).collect()
    }

    #[test]
    fn test_total_duration() {
        assert_eq!(sample().total_duration(), 610);
        assert_eq!(Document::new().total_duration(), 0);
    }

    #[test]
    fn test_uniform_durations() {
        let mut doc = sample();
        assert_eq!(doc.uniform_durations(), None);

        for picture in &mut doc.pictures {
            picture.static_seconds = 60;
            picture.transition_seconds = 2;
        }
        assert_eq!(doc.uniform_durations(), Some((60, 2)));
        assert_eq!(Document::new().uniform_durations(), None);
    }

    #[test]
    fn test_next_of_wraps() {
        let doc = sample();
        assert_eq!(doc.next_of(0).map(|p| p.id), Some(PictureId(2)));
        assert_eq!(doc.next_of(2).map(|p| p.id), Some(PictureId(1)));
        assert!(Document::new().next_of(0).is_none());
    }

    #[test]
    fn test_remove_restacks() {
        let mut doc = sample();
        let removed = doc.remove(PictureId(2)).unwrap();
        assert_eq!(removed.path, "/img/b.png");
        let indexes: Vec<usize> = doc.pictures.iter().map(|p| p.index).collect();
        assert_eq!(indexes, vec![0, 1]);
        assert!(doc.remove(PictureId(2)).is_none());
    }

    #[test]
    fn test_edit_moves_picture() {
        let mut doc = sample();
        let edit = PictureEdit {
            index: Some(0),
            ..PictureEdit::new(PictureId(3))
        };
        assert!(doc.edit(&edit));
        assert_eq!(paths(&doc), vec!["/other/c.png", "/img/a.png", "/img/b.png"]);

        let edit = PictureEdit {
            index: Some(99),
            ..PictureEdit::new(PictureId(3))
        };
        assert!(doc.edit(&edit));
        assert_eq!(paths(&doc), vec!["/img/a.png", "/img/b.png", "/other/c.png"]);
        assert_eq!(doc.pictures[2].index, 2);
    }

    #[test]
    fn test_edit_unknown_picture() {
        let mut doc = sample();
        let before = doc.clone();
        assert!(!doc.edit(&PictureEdit {
            static_seconds: Some(1),
            ..PictureEdit::new(PictureId(42))
        }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_replace_in_paths() {
        let doc = sample();
        let Some(Operation::Multi(edits)) = doc.replace_in_paths("/img/", "/pics/") else {
            panic!("expected a multi operation");
        };
        assert_eq!(edits.len(), 2);
        assert!(doc.replace_in_paths("/missing/", "/x/").is_none());
        assert!(doc.replace_in_paths("", "/x/").is_none());
    }

    #[test]
    fn test_normalize_sorts_by_index() {
        let mut doc = sample();
        doc.pictures.reverse();
        doc.normalize();
        assert_eq!(paths(&doc), vec!["/img/a.png", "/img/b.png", "/other/c.png"]);
    }
}
