//! Document model: the single owner of a wallpaper being edited
//!
//! Every change goes through [`DocumentModel::apply_operation`]. Committed
//! operations are logged, and undo rebuilds the live document by replaying
//! the remaining log over the snapshot taken when the document was created or
//! loaded. Replay never commits nor notifies.

use crate::config::EditorConfig;
use crate::document::{Document, PictureId};
use crate::operation::{Operation, PictureEdit};
use crate::xml::{self, Notice};
use crate::{Error, Result};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

/// Receives the model's changes, implemented by the presentation layer
pub trait Observer {
    /// Called with the whole document after every visible change
    fn document_changed(&mut self, document: &Document);

    /// Called when undo or redo become available or unavailable
    fn history_changed(&mut self, _can_undo: bool, _can_redo: bool) {}

    /// Called with a human-readable message, e.g. when a load fails
    fn show_notification(&mut self, _message: &str) {}
}

/// A committed operation along with the picture IDs its adds allocated, so
/// replaying it recreates the same pictures
#[derive(Debug, Clone)]
struct Step {
    operation: Operation,
    ids: Vec<PictureId>,
}

#[derive(Debug, Clone, Default)]
struct History {
    initial: Document,
    committed: Vec<Step>,
    undone: Vec<Step>,
}

/// Owns a document, its history and its observer
pub struct DocumentModel {
    config: EditorConfig,
    document: Document,
    history: History,
    next_id: u64,
    recorded_ids: VecDeque<PictureId>,
    replaying: bool,
    observer: Option<Box<dyn Observer>>,
    reported_actions: Option<(bool, bool)>,
}

impl Default for DocumentModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentModel {
    /// Creates a model holding an empty document
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    /// Creates a model holding an empty document with the given defaults
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            document: Document::new(),
            history: History::default(),
            next_id: 0,
            recorded_ids: VecDeque::new(),
            replaying: false,
            observer: None,
            reported_actions: None,
        }
    }

    /// Sets the observer notified of every change
    pub fn set_observer(&mut self, observer: Box<dyn Observer>) {
        self.observer = Some(observer);
        self.reported_actions = None;
    }

    /// The live document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Defaults used for added pictures and fit-to-24h
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether there is a committed operation to undo
    pub fn can_undo(&self) -> bool {
        !self.history.committed.is_empty()
    }

    /// Whether there is an undone operation to redo
    pub fn can_redo(&self) -> bool {
        !self.history.undone.is_empty()
    }

    /// Number of committed operations
    pub fn history_len(&self) -> usize {
        self.history.committed.len()
    }

    /// Applies and commits an edit
    ///
    /// A fresh edit discards the operations that were undone before it.
    pub fn apply_operation(&mut self, operation: Operation) {
        if !self.replaying {
            self.history.undone.clear();
        }
        self.submit(operation, Vec::new());
    }

    /// Reverts the last committed operation, does nothing if there is none
    pub fn undo(&mut self) {
        let Some(step) = self.history.committed.pop() else {
            return;
        };
        tracing::debug!(kind = step.operation.kind(), "Undoing operation");
        self.history.undone.push(step);

        self.replaying = true;
        self.document = self.history.initial.clone();
        let steps = std::mem::take(&mut self.history.committed);
        for step in &steps {
            self.submit(step.operation.clone(), step.ids.clone());
        }
        self.history.committed = steps;
        self.replaying = false;

        tracing::debug!(replayed = self.history.committed.len(), "Replayed history");
        self.notify();
    }

    /// Re-applies the last undone operation, does nothing if there is none
    pub fn redo(&mut self) {
        let Some(step) = self.history.undone.pop() else {
            return;
        };
        tracing::debug!(kind = step.operation.kind(), "Redoing operation");
        self.submit(step.operation, step.ids);
    }

    /// Replaces the document with the content of a wallpaper file
    ///
    /// The loaded state becomes the new undo baseline. On failure the current
    /// document is left untouched.
    pub fn load_from_xml(&mut self, text: &str) -> Result<Vec<Notice>> {
        let decoded = match xml::decode(text) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load wallpaper");
                self.notify_message(e.user_message());
                return Err(e);
            }
        };

        self.replaying = true;
        self.document = Document::new();
        self.submit(Operation::SetStartTime(decoded.document.start_time), Vec::new());
        for picture in &decoded.document.pictures {
            self.submit(
                Operation::add(picture.path.clone(), picture.static_seconds, 0),
                Vec::new(),
            );
        }
        let transitions: Vec<Operation> = decoded
            .document
            .pictures
            .iter()
            .zip(&self.document.pictures)
            .filter(|(loaded, _)| loaded.transition_seconds > 0)
            .map(|(loaded, live)| {
                Operation::Edit(PictureEdit {
                    transition_seconds: Some(loaded.transition_seconds),
                    ..PictureEdit::new(live.id)
                })
            })
            .collect();
        for operation in transitions {
            self.submit(operation, Vec::new());
        }

        self.history = History {
            initial: self.document.clone(),
            committed: Vec::new(),
            undone: Vec::new(),
        };
        self.replaying = false;

        tracing::info!(
            pictures = self.document.len(),
            notices = decoded.notices.len(),
            "Loaded wallpaper"
        );
        for notice in decoded.notices.iter().filter(|n| n.is_user_visible()) {
            self.notify_message(&notice.to_string());
        }
        self.notify();
        Ok(decoded.notices)
    }

    /// Serializes the live document
    pub fn export_to_xml(&self) -> String {
        xml::encode(&self.document)
    }

    /// Reads and loads a wallpaper file
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Vec<Notice>> {
        let text = match fs::read_to_string(path.as_ref()) {
            Ok(text) => text,
            Err(e) => {
                let e = Error::from(e);
                self.notify_message(e.user_message());
                return Err(e);
            }
        };
        self.load_from_xml(&text)
    }

    /// Writes the live document to a file
    pub fn save_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path.as_ref(), self.export_to_xml())?;
        tracing::info!(path = %path.as_ref().display(), "Saved wallpaper");
        Ok(())
    }

    /// Appends pictures with the configured default durations, as one step
    pub fn add_pictures<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let operation = Operation::add_many(
            paths,
            self.config.static_seconds,
            self.config.transition_seconds,
        );
        self.apply_operation(operation);
    }

    /// Rescales every duration so the cycle lasts the configured day length
    pub fn fit_to_day(&mut self) {
        if let Some(operation) = self.document.fit_operation(self.config.day_seconds) {
            self.apply_operation(operation);
        }
    }

    /// Mutates the document, then commits unless replaying
    fn submit(&mut self, operation: Operation, ids: Vec<PictureId>) {
        self.recorded_ids = ids.into();
        let mut allocated = Vec::new();
        self.mutate(&operation, &mut allocated);
        self.document.normalize();

        if self.replaying {
            return;
        }

        tracing::debug!(
            kind = operation.kind(),
            pictures = self.document.len(),
            "Committed operation"
        );
        self.history.committed.push(Step {
            operation,
            ids: allocated,
        });
        self.notify();
    }

    fn mutate(&mut self, operation: &Operation, allocated: &mut Vec<PictureId>) {
        match operation {
            Operation::Multi(operations) => {
                for operation in operations {
                    self.mutate(operation, allocated);
                }
            }
            Operation::Add {
                path,
                static_seconds,
                transition_seconds,
            } => {
                let id = self.allocate_id();
                allocated.push(id);
                self.document
                    .push(id, path.clone(), *static_seconds, *transition_seconds);
            }
            Operation::Edit(edit) => {
                if !self.document.edit(edit) {
                    tracing::debug!(picture = edit.picture_id.0, "Ignoring edit of unknown picture");
                }
            }
            Operation::Delete { picture_id } => {
                if self.document.remove(*picture_id).is_none() {
                    tracing::debug!(picture = picture_id.0, "Ignoring deletion of unknown picture");
                }
            }
            Operation::SetStartTime(start_time) => self.document.start_time = *start_time,
        }
    }

    /// Reuses the ID recorded for a replayed add, or hands out a new one
    fn allocate_id(&mut self) -> PictureId {
        if let Some(id) = self.recorded_ids.pop_front() {
            return id;
        }
        let id = PictureId(self.next_id);
        self.next_id += 1;
        id
    }

    fn notify(&mut self) {
        let actions = (self.can_undo(), self.can_redo());
        let Some(observer) = self.observer.as_mut() else {
            return;
        };

        observer.document_changed(&self.document);
        if self.reported_actions != Some(actions) {
            observer.history_changed(actions.0, actions.1);
            self.reported_actions = Some(actions);
        }
    }

    fn notify_message(&mut self, message: &str) {
        if let Some(observer) = self.observer.as_mut() {
            observer.show_notification(message);
        }
    }
}
