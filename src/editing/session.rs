// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Annotation session - the authoring workflow for one report.
//!
//! The session owns the report's image entries and everything that is
//! "current" while authoring: the live canvas size, the chosen tool, the
//! single open text edit, the selected annotation and in-flight gesture
//! sessions. All mutation is synchronous; the only asynchronous step is the
//! save, split into [`AnnotationSession::begin_save`] and
//! [`AnnotationSession::complete_save`] so the embedder can keep the
//! session busy while the document renderer runs.

use super::gesture::{GestureKind, GestureSession};
use super::hit_testing::{self, Hit};
use super::pointer::{Drag, PointerGrab};
use crate::export::{ReportPayload, ReportRenderer, SaveError, rescale_annotations};
use crate::model::{Annotation, AnnotationError, AnnotationId, CanvasDims, ImageEntry, ShapeKind};
use crate::settings::Settings;
use kurbo::{Point, Vec2};
use std::collections::BTreeMap;

// ===== Errors =====

/// Why an edit operation was refused
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("no image is selected")]
    NoImage,

    #[error("image index {0} is out of range")]
    ImageOutOfRange(usize),

    #[error("the canvas has not been measured yet")]
    CanvasNotMeasured,

    #[error("annotations on this image were authored on an unknown canvas size")]
    UnknownAuthoringSize,

    #[error("{0} does not exist on the current image")]
    UnknownAnnotation(AnnotationId),

    #[error("text edit for {0} is still open")]
    TextEditOpen(AnnotationId),

    #[error("no text edit is open")]
    NoTextEdit,

    #[error("a save is in progress")]
    SaveInProgress,

    #[error("the report has already been saved")]
    Finalized,

    #[error(transparent)]
    InvalidAnnotation(#[from] AnnotationError),
}

// ===== Session State =====

/// How the open text edit came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditOrigin {
    /// Opened automatically right after a tool created the annotation
    Created,
    /// Opened by an explicit edit action on a placed annotation
    Existing,
}

/// The single open text-entry surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub annotation_id: AnnotationId,
    pub buffer: String,
    pub origin: TextEditOrigin,
}

/// Authoring phase of one annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationPhase {
    EditingText,
    Placed,
}

/// Where the report is in its save lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Editing,
    /// Waiting for the document renderer; edits are refused
    Saving,
    /// Handed off successfully; the entries are frozen
    Saved,
}

/// Authoring state for one report
#[derive(Debug, Clone, Default)]
pub struct AnnotationSession {
    settings: Settings,
    entries: Vec<ImageEntry>,
    current: Option<usize>,
    /// Last measured size of the live canvas
    canvas: CanvasDims,
    active_tool: Option<ShapeKind>,
    text_edit: Option<TextEdit>,
    selected: Option<AnnotationId>,
    gestures: BTreeMap<AnnotationId, GestureSession>,
    grab: Option<PointerGrab>,
    save_state: SaveState,
}

impl AnnotationSession {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    // ===== Accessors =====

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_entry(&self) -> Option<&ImageEntry> {
        self.current.and_then(|index| self.entries.get(index))
    }

    /// Annotations of the current image (empty without one)
    pub fn annotations(&self) -> &[Annotation] {
        self.current_entry()
            .map(|entry| entry.annotations.as_slice())
            .unwrap_or(&[])
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.current_entry().and_then(|entry| entry.get(id))
    }

    pub fn canvas(&self) -> CanvasDims {
        self.canvas
    }

    pub fn active_tool(&self) -> Option<ShapeKind> {
        self.active_tool
    }

    pub fn text_edit(&self) -> Option<&TextEdit> {
        self.text_edit.as_ref()
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn gesture(&self, id: AnnotationId) -> Option<&GestureSession> {
        self.gestures.get(&id)
    }

    pub fn save_state(&self) -> SaveState {
        self.save_state
    }

    pub fn is_saving(&self) -> bool {
        self.save_state == SaveState::Saving
    }

    pub fn phase(&self, id: AnnotationId) -> Option<AnnotationPhase> {
        self.annotation(id)?;
        match &self.text_edit {
            Some(edit) if edit.annotation_id == id => Some(AnnotationPhase::EditingText),
            _ => Some(AnnotationPhase::Placed),
        }
    }

    // ===== Images and Canvas =====

    /// Add a freshly captured photo and make it current
    pub fn add_image(&mut self, uri: impl Into<String>) -> Result<usize, EditError> {
        self.push_entry(ImageEntry::new(uri))
    }

    /// Add a photo with previously authored annotations and make it current
    pub fn resume_image(
        &mut self,
        uri: impl Into<String>,
        annotations: Vec<Annotation>,
        annotation_dims: CanvasDims,
    ) -> Result<usize, EditError> {
        let entry = ImageEntry::resume(uri, annotations, annotation_dims)?;
        self.push_entry(entry)
    }

    fn push_entry(&mut self, entry: ImageEntry) -> Result<usize, EditError> {
        self.ensure_editable()?;
        self.ensure_no_text_edit()?;
        tracing::info!(
            "Adding image {} with {} annotations",
            entry.uri,
            entry.annotations.len()
        );
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        self.switch_to(index);
        Ok(index)
    }

    /// Make another image current
    pub fn select_image(&mut self, index: usize) -> Result<(), EditError> {
        self.ensure_editable()?;
        self.ensure_no_text_edit()?;
        if index >= self.entries.len() {
            return Err(EditError::ImageOutOfRange(index));
        }
        self.switch_to(index);
        Ok(())
    }

    fn switch_to(&mut self, index: usize) {
        self.current = Some(index);
        self.active_tool = None;
        self.selected = None;
        self.drop_gestures();
        self.sync_entry_to_canvas();
    }

    /// Record the live canvas layout. Annotations of the current image that
    /// were authored at another size are rescaled into it.
    pub fn measure_canvas(&mut self, dims: CanvasDims) {
        self.canvas = dims.measured().unwrap_or(CanvasDims::UNMEASURED);
        tracing::debug!("Canvas measured at {}x{}", self.canvas.width, self.canvas.height);
        if self.save_state == SaveState::Editing {
            self.drop_gestures();
            self.sync_entry_to_canvas();
        }
    }

    fn sync_entry_to_canvas(&mut self) {
        let canvas = self.canvas;
        if !canvas.is_measured() {
            return;
        }
        let Some(entry) = self.current.and_then(|index| self.entries.get_mut(index)) else {
            return;
        };
        if entry.annotation_dims == canvas {
            return;
        }
        if entry.annotations.is_empty() {
            entry.annotation_dims = canvas;
            return;
        }
        // Proportional only; the minimum size is enforced by resize gestures
        match rescale_annotations(&entry.annotations, entry.annotation_dims, canvas) {
            Some(scaled) => {
                tracing::debug!(
                    "Rescaling {} annotations from {}x{} to {}x{}",
                    scaled.len(),
                    entry.annotation_dims.width,
                    entry.annotation_dims.height,
                    canvas.width,
                    canvas.height
                );
                entry.annotations = scaled;
                entry.annotation_dims = canvas;
            }
            None => tracing::warn!(
                "{} annotations on {} were authored on an unmeasured canvas; leaving them unscaled",
                entry.annotations.len(),
                entry.uri
            ),
        }
    }

    // ===== Tools and Text =====

    /// Pick a tool: creates a centered annotation on the current image and
    /// opens its text edit straight away
    pub fn select_tool(&mut self, kind: ShapeKind) -> Result<AnnotationId, EditError> {
        self.ensure_editable()?;
        self.ensure_no_text_edit()?;
        let canvas = self.canvas.measured().ok_or(EditError::CanvasNotMeasured)?;
        self.sync_entry_to_canvas();
        let settings = self.settings.clone();
        let entry = self.current_entry_mut()?;

        if entry.annotations.is_empty() {
            entry.annotation_dims = canvas;
        } else if entry.annotation_dims != canvas {
            return Err(EditError::UnknownAuthoringSize);
        }

        let annotation = Annotation::create_with(kind, canvas.width, canvas.height, &settings);
        let id = annotation.id;
        entry.annotations.push(annotation);

        self.active_tool = Some(kind);
        self.selected = Some(id);
        self.text_edit = Some(TextEdit {
            annotation_id: id,
            buffer: String::new(),
            origin: TextEditOrigin::Created,
        });
        tracing::info!("Created {:?} {}", kind, id);
        Ok(id)
    }

    /// Reopen the text edit of a placed annotation
    pub fn edit_text(&mut self, id: AnnotationId) -> Result<(), EditError> {
        self.ensure_editable()?;
        self.ensure_no_text_edit()?;
        let text = self
            .annotation(id)
            .ok_or(EditError::UnknownAnnotation(id))?
            .text
            .clone();
        self.selected = Some(id);
        self.text_edit = Some(TextEdit {
            annotation_id: id,
            buffer: text,
            origin: TextEditOrigin::Existing,
        });
        Ok(())
    }

    /// Replace the contents of the open text edit
    pub fn set_text_buffer(&mut self, text: impl Into<String>) -> Result<(), EditError> {
        self.ensure_editable()?;
        let edit = self.text_edit.as_mut().ok_or(EditError::NoTextEdit)?;
        edit.buffer = text.into();
        Ok(())
    }

    /// Close the text edit and store its buffer, even when empty
    pub fn confirm_text(&mut self) -> Result<AnnotationId, EditError> {
        self.ensure_editable()?;
        let edit = self.text_edit.take().ok_or(EditError::NoTextEdit)?;
        self.active_tool = None;
        let annotation = self
            .current_entry_mut()?
            .get_mut(edit.annotation_id)
            .ok_or(EditError::UnknownAnnotation(edit.annotation_id))?;
        annotation.text = edit.buffer;
        tracing::debug!("Placed {} with {} chars of text", edit.annotation_id, annotation.text.len());
        Ok(edit.annotation_id)
    }

    /// Close the text edit without touching the annotation's text. A
    /// freshly created annotation stays placed with empty text.
    pub fn cancel_text(&mut self) -> Result<AnnotationId, EditError> {
        self.ensure_editable()?;
        let edit = self.text_edit.take().ok_or(EditError::NoTextEdit)?;
        self.active_tool = None;
        tracing::debug!("Text edit for {} cancelled", edit.annotation_id);
        Ok(edit.annotation_id)
    }

    // ===== Selection and Deletion =====

    pub fn select(&mut self, id: AnnotationId) -> Result<(), EditError> {
        self.annotation(id).ok_or(EditError::UnknownAnnotation(id))?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Remove one annotation from the current image for good
    pub fn delete(&mut self, id: AnnotationId) -> Result<Annotation, EditError> {
        self.ensure_editable()?;
        let removed = self
            .current_entry_mut()?
            .remove(id)
            .ok_or(EditError::UnknownAnnotation(id))?;

        self.gestures.remove(&id);
        if self.grab.is_some_and(|grab| grab.annotation_id == id) {
            self.grab = None;
        }
        if self.text_edit.as_ref().is_some_and(|edit| edit.annotation_id == id) {
            self.text_edit = None;
            self.active_tool = None;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::info!("Deleted {}", id);
        Ok(removed)
    }

    /// Empty the current image's annotation set. Nothing happens unless
    /// `confirmed`; there is no undo. Returns how many were removed.
    pub fn clear_all(&mut self, confirmed: bool) -> Result<usize, EditError> {
        self.ensure_editable()?;
        if !confirmed {
            tracing::debug!("Clear all declined");
            return Ok(0);
        }
        let entry = self.current_entry_mut()?;
        let removed = entry.annotations.len();
        entry.annotations.clear();

        self.drop_gestures();
        self.text_edit = None;
        self.active_tool = None;
        self.selected = None;
        tracing::info!("Cleared {} annotations", removed);
        Ok(removed)
    }

    // ===== Gestures =====

    /// Open a gesture session on an annotation. Returns `false` when the
    /// gesture does not apply (rotating a shape that cannot rotate).
    pub fn begin_gesture(&mut self, id: AnnotationId, kind: GestureKind) -> Result<bool, EditError> {
        self.ensure_editable()?;
        self.ensure_no_text_edit()?;
        let annotation = self.annotation(id).ok_or(EditError::UnknownAnnotation(id))?;
        let Some(session) = GestureSession::start(kind, annotation) else {
            tracing::debug!("{:?} gesture does not apply to {:?} {}", kind, annotation.kind, id);
            return Ok(false);
        };
        tracing::debug!("{:?} gesture started on {}", kind, id);
        self.gestures.insert(id, session);
        self.selected = Some(id);
        Ok(true)
    }

    /// Apply the cumulative delta since gesture start. Moves without a
    /// started gesture are ignored and return `false`.
    pub fn update_gesture(&mut self, id: AnnotationId, delta: Vec2) -> Result<bool, EditError> {
        self.ensure_editable()?;
        let Some(session) = self.gestures.get(&id) else {
            tracing::debug!("Ignoring move for {} without gesture start", id);
            return Ok(false);
        };
        let next = session.apply(delta);
        match self.current_entry_mut()?.get_mut(id) {
            Some(annotation) => {
                *annotation = next;
                Ok(true)
            }
            None => {
                self.gestures.remove(&id);
                Ok(false)
            }
        }
    }

    /// Close the gesture session. Returns whether one was open.
    pub fn end_gesture(&mut self, id: AnnotationId) -> Result<bool, EditError> {
        self.ensure_editable()?;
        let ended = self.gestures.remove(&id);
        if let Some(session) = &ended {
            tracing::debug!("{:?} gesture ended on {}", session.kind(), id);
        }
        Ok(ended.is_some())
    }

    /// Pointer pressed on the canvas: grab whatever lies underneath
    pub fn pointer_down(&mut self, pos: Point) -> Result<Option<Hit>, EditError> {
        self.ensure_editable()?;
        self.ensure_no_text_edit()?;
        if let Some(previous) = self.grab.take() {
            self.end_gesture(previous.annotation_id)?;
        }
        let Some(hit) = hit_testing::hit_test(self.annotations(), pos, &self.settings) else {
            self.selected = None;
            return Ok(None);
        };
        if self.begin_gesture(hit.id, hit.target.gesture())? {
            self.grab = Some(PointerGrab {
                annotation_id: hit.id,
                drag: Drag::new(pos),
            });
        }
        Ok(Some(hit))
    }

    /// Pointer moved; ignored unless something was grabbed on pointer down
    pub fn pointer_moved(&mut self, pos: Point) -> Result<bool, EditError> {
        self.ensure_editable()?;
        let Some(grab) = self.grab.as_mut() else {
            return Ok(false);
        };
        grab.drag.current = pos;
        let (id, delta) = (grab.annotation_id, grab.drag.delta());
        self.update_gesture(id, delta)
    }

    /// Pointer released: apply the final position and end the gesture
    pub fn pointer_up(&mut self, pos: Point) -> Result<bool, EditError> {
        self.ensure_editable()?;
        let Some(mut grab) = self.grab.take() else {
            return Ok(false);
        };
        grab.drag.current = pos;
        self.update_gesture(grab.annotation_id, grab.drag.delta())?;
        self.end_gesture(grab.annotation_id)
    }

    fn drop_gestures(&mut self) {
        self.gestures.clear();
        self.grab = None;
    }

    // ===== Saving =====

    /// Freeze edits and build the payload for the document renderer
    pub fn begin_save(&mut self) -> Result<ReportPayload, SaveError> {
        match self.save_state {
            SaveState::Saving => return Err(SaveError::InProgress),
            SaveState::Saved => return Err(SaveError::AlreadySaved),
            SaveState::Editing => {}
        }
        if let Some(edit) = &self.text_edit {
            return Err(SaveError::TextEditOpen(edit.annotation_id));
        }
        self.drop_gestures();
        self.save_state = SaveState::Saving;

        let payload = ReportPayload::build(&self.entries);
        tracing::info!(
            "Saving report: {} images, {} overlays",
            payload.images.len(),
            payload.overlay_count()
        );
        Ok(payload)
    }

    /// Settle an in-flight save. On failure the session becomes editable
    /// again with every annotation intact, so the save can be retried.
    pub fn complete_save(&mut self, outcome: anyhow::Result<()>) -> Result<(), SaveError> {
        if self.save_state != SaveState::Saving {
            return Err(SaveError::NotStarted);
        }
        match outcome {
            Ok(()) => {
                self.save_state = SaveState::Saved;
                tracing::info!("Report saved");
                Ok(())
            }
            Err(err) => {
                self.save_state = SaveState::Editing;
                // The canvas may have been re-measured while saving
                self.sync_entry_to_canvas();
                tracing::error!("Report save failed: {:#}", err);
                Err(SaveError::Renderer(err))
            }
        }
    }

    /// Save through `renderer`, waiting for it to finish
    pub fn save<R: ReportRenderer + ?Sized>(&mut self, renderer: &mut R) -> Result<(), SaveError> {
        let payload = self.begin_save()?;
        let outcome = renderer.render(&payload);
        self.complete_save(outcome)
    }

    // ===== Helpers =====

    fn ensure_editable(&self) -> Result<(), EditError> {
        match self.save_state {
            SaveState::Editing => Ok(()),
            SaveState::Saving => Err(EditError::SaveInProgress),
            SaveState::Saved => Err(EditError::Finalized),
        }
    }

    fn ensure_no_text_edit(&self) -> Result<(), EditError> {
        match &self.text_edit {
            Some(edit) => Err(EditError::TextEditOpen(edit.annotation_id)),
            None => Ok(()),
        }
    }

    fn current_entry_mut(&mut self) -> Result<&mut ImageEntry, EditError> {
        self.current
            .and_then(|index| self.entries.get_mut(index))
            .ok_or(EditError::NoImage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use pretty_assertions::assert_eq;

    /// Session with one image on an 800x600 canvas
    fn session() -> AnnotationSession {
        let mut session = AnnotationSession::new(Settings::default());
        session.measure_canvas(CanvasDims::new(800.0, 600.0));
        session.add_image("file:///painting.jpg").unwrap();
        session
    }

    /// Create and place an annotation with the given text
    fn place(session: &mut AnnotationSession, kind: ShapeKind, text: &str) -> AnnotationId {
        let id = session.select_tool(kind).unwrap();
        session.set_text_buffer(text).unwrap();
        session.confirm_text().unwrap();
        id
    }

    #[test]
    fn tool_creates_centered_annotation_in_text_edit() {
        let mut session = session();
        let id = session.select_tool(ShapeKind::Rectangle).unwrap();

        let ann = session.annotation(id).unwrap();
        assert_eq!(ann.position, Point::new(360.0, 260.0));
        assert_eq!(ann.size, Size::new(80.0, 80.0));
        assert_eq!(session.active_tool(), Some(ShapeKind::Rectangle));
        assert_eq!(session.selected(), Some(id));
        assert_eq!(session.phase(id), Some(AnnotationPhase::EditingText));
        assert_eq!(
            session.text_edit(),
            Some(&TextEdit {
                annotation_id: id,
                buffer: String::new(),
                origin: TextEditOrigin::Created,
            })
        );
    }

    #[test]
    fn confirm_with_empty_text_places_annotation() {
        let mut session = session();
        let id = session.select_tool(ShapeKind::Circle).unwrap();
        assert_eq!(session.confirm_text(), Ok(id));
        assert_eq!(session.phase(id), Some(AnnotationPhase::Placed));
        assert_eq!(session.annotation(id).unwrap().text, "");
        assert_eq!(session.active_tool(), None);
    }

    #[test]
    fn only_one_text_edit_at_a_time() {
        let mut session = session();
        let first = session.select_tool(ShapeKind::Rectangle).unwrap();
        assert_eq!(session.select_tool(ShapeKind::Arrow), Err(EditError::TextEditOpen(first)));
        assert_eq!(session.edit_text(first), Err(EditError::TextEditOpen(first)));
        assert_eq!(session.annotations().len(), 1);
    }

    #[test]
    fn reedit_text_of_placed_annotation() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "tear");
        session.edit_text(id).unwrap();
        assert_eq!(session.text_edit().unwrap().buffer, "tear");
        assert_eq!(session.text_edit().unwrap().origin, TextEditOrigin::Existing);

        session.set_text_buffer("tear, 3cm").unwrap();
        session.cancel_text().unwrap();
        assert_eq!(session.annotation(id).unwrap().text, "tear");

        session.edit_text(id).unwrap();
        session.set_text_buffer("tear, 3cm").unwrap();
        session.confirm_text().unwrap();
        assert_eq!(session.annotation(id).unwrap().text, "tear, 3cm");
    }

    #[test]
    fn cancel_on_new_annotation_keeps_it() {
        let mut session = session();
        let id = session.select_tool(ShapeKind::Arrow).unwrap();
        session.set_text_buffer("ignored").unwrap();
        session.cancel_text().unwrap();
        assert_eq!(session.annotation(id).unwrap().text, "");
        assert_eq!(session.phase(id), Some(AnnotationPhase::Placed));
    }

    #[test]
    fn text_operations_need_an_open_edit() {
        let mut session = session();
        assert_eq!(session.set_text_buffer("x"), Err(EditError::NoTextEdit));
        assert_eq!(session.confirm_text(), Err(EditError::NoTextEdit));
        assert_eq!(session.cancel_text(), Err(EditError::NoTextEdit));
    }

    #[test]
    fn tool_requires_image_and_measured_canvas() {
        let mut session = AnnotationSession::new(Settings::default());
        session.measure_canvas(CanvasDims::new(800.0, 600.0));
        assert_eq!(session.select_tool(ShapeKind::Rectangle), Err(EditError::NoImage));

        let mut session = AnnotationSession::new(Settings::default());
        session.add_image("x").unwrap();
        assert_eq!(session.select_tool(ShapeKind::Rectangle), Err(EditError::CanvasNotMeasured));
    }

    #[test]
    fn settings_drive_new_annotation_size() {
        let settings = Settings::from_toml_str("default_size = 100.0").unwrap();
        let mut session = AnnotationSession::new(settings);
        session.measure_canvas(CanvasDims::new(800.0, 600.0));
        session.add_image("x").unwrap();
        let id = session.select_tool(ShapeKind::Rectangle).unwrap();
        assert_eq!(session.annotation(id).unwrap().position, Point::new(350.0, 250.0));
    }

    #[test]
    fn drag_gesture_moves_from_snapshot() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");

        assert_eq!(session.begin_gesture(id, GestureKind::Move), Ok(true));
        session.update_gesture(id, Vec2::new(10.0, 10.0)).unwrap();
        session.update_gesture(id, Vec2::new(50.0, -20.0)).unwrap();
        assert_eq!(session.end_gesture(id), Ok(true));

        assert_eq!(session.annotation(id).unwrap().position, Point::new(410.0, 240.0));
        assert!(session.gesture(id).is_none());
    }

    #[test]
    fn moves_without_start_are_ignored() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        assert_eq!(session.update_gesture(id, Vec2::new(99.0, 99.0)), Ok(false));
        assert_eq!(session.end_gesture(id), Ok(false));
        assert_eq!(session.pointer_moved(Point::new(1.0, 1.0)), Ok(false));
        assert_eq!(session.annotation(id).unwrap().position, Point::new(360.0, 260.0));
    }

    #[test]
    fn rotate_on_rectangle_opens_no_session() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        assert_eq!(session.begin_gesture(id, GestureKind::Rotate), Ok(false));
        assert_eq!(session.update_gesture(id, Vec2::new(90.0, 0.0)), Ok(false));
        assert_eq!(session.annotation(id).unwrap().rotation, 0.0);
    }

    #[test]
    fn gestures_are_independent_per_annotation() {
        let mut session = session();
        let a = place(&mut session, ShapeKind::Rectangle, "");
        let b = place(&mut session, ShapeKind::Arrow, "");

        session.begin_gesture(a, GestureKind::Resize).unwrap();
        session.begin_gesture(b, GestureKind::Rotate).unwrap();
        session.update_gesture(a, Vec2::new(-100.0, 15.0)).unwrap();
        session.update_gesture(b, Vec2::new(400.0, 0.0)).unwrap();

        assert_eq!(session.annotation(a).unwrap().size, Size::new(30.0, 95.0));
        assert_eq!(session.annotation(b).unwrap().rotation, 40.0);
    }

    #[test]
    fn pointer_drives_move_gesture() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");

        let hit = session.pointer_down(Point::new(400.0, 300.0)).unwrap();
        assert_eq!(hit.map(|h| h.id), Some(id));
        assert_eq!(session.pointer_moved(Point::new(420.0, 310.0)), Ok(true));
        assert_eq!(session.pointer_up(Point::new(450.0, 280.0)), Ok(true));

        assert_eq!(session.annotation(id).unwrap().position, Point::new(410.0, 240.0));
        assert_eq!(session.pointer_moved(Point::new(0.0, 0.0)), Ok(false));
    }

    #[test]
    fn pointer_on_resize_handle_resizes_circle() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Circle, "");
        session.pointer_down(Point::new(440.0, 340.0)).unwrap();
        session.pointer_up(Point::new(460.0, 300.0)).unwrap();
        assert_eq!(session.annotation(id).unwrap().size, Size::new(100.0, 100.0));
    }

    #[test]
    fn pointer_on_empty_canvas_clears_selection() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        assert_eq!(session.selected(), Some(id));
        assert_eq!(session.pointer_down(Point::new(5.0, 5.0)), Ok(None));
        assert_eq!(session.selected(), None);
    }

    #[test]
    fn label_drag_on_half_turned_arrow() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Arrow, "chip");
        session.begin_gesture(id, GestureKind::Rotate).unwrap();
        session.update_gesture(id, Vec2::new(180.0, 0.0)).unwrap();
        session.end_gesture(id).unwrap();

        session.begin_gesture(id, GestureKind::Label).unwrap();
        session.update_gesture(id, Vec2::new(10.0, 0.0)).unwrap();
        let offset = session.annotation(id).unwrap().text_offset;
        assert!((offset - Vec2::new(-10.0, 50.0)).hypot() < 1e-9);
        assert!(session.annotation(id).unwrap().label_flipped());
    }

    #[test]
    fn delete_removes_for_good() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        session.begin_gesture(id, GestureKind::Move).unwrap();

        assert_eq!(session.delete(id).map(|a| a.id), Ok(id));
        assert!(session.annotation(id).is_none());
        assert!(session.gesture(id).is_none());
        assert_eq!(session.selected(), None);
        assert_eq!(session.delete(id), Err(EditError::UnknownAnnotation(id)));

        let next = place(&mut session, ShapeKind::Rectangle, "");
        assert_ne!(next, id);
    }

    #[test]
    fn deleting_annotation_under_text_edit_closes_it() {
        let mut session = session();
        let id = session.select_tool(ShapeKind::Rectangle).unwrap();
        session.delete(id).unwrap();
        assert!(session.text_edit().is_none());
        assert!(session.select_tool(ShapeKind::Circle).is_ok());
    }

    #[test]
    fn clear_all_needs_confirmation() {
        let mut session = session();
        for kind in ShapeKind::ALL {
            place(&mut session, kind, "");
        }
        assert_eq!(session.clear_all(false), Ok(0));
        assert_eq!(session.annotations().len(), 3);

        assert_eq!(session.clear_all(true), Ok(3));
        assert!(session.annotations().is_empty());
    }

    #[test]
    fn clear_all_only_touches_current_image() {
        let mut session = session();
        place(&mut session, ShapeKind::Rectangle, "");
        session.add_image("file:///frame.jpg").unwrap();
        place(&mut session, ShapeKind::Circle, "");

        session.clear_all(true).unwrap();
        session.select_image(0).unwrap();
        assert_eq!(session.annotations().len(), 1);
    }

    #[test]
    fn select_image_checks_bounds_and_text_edit() {
        let mut session = session();
        assert_eq!(session.select_image(5), Err(EditError::ImageOutOfRange(5)));
        let id = session.select_tool(ShapeKind::Rectangle).unwrap();
        assert_eq!(session.select_image(0), Err(EditError::TextEditOpen(id)));
    }

    #[test]
    fn remeasuring_rescales_current_image() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        session.measure_canvas(CanvasDims::new(400.0, 300.0));

        let ann = session.annotation(id).unwrap();
        assert_eq!(ann.position, Point::new(180.0, 130.0));
        assert_eq!(ann.size, Size::new(40.0, 40.0));
        assert_eq!(session.current_entry().unwrap().annotation_dims, CanvasDims::new(400.0, 300.0));
    }

    #[test]
    fn resume_rescales_into_live_canvas() {
        let mut session = session();
        let mut stored = Annotation::create(ShapeKind::Arrow, 400.0, 300.0);
        stored.rotation = 30.0;
        let id = stored.id;
        session
            .resume_image("file:///old.jpg", vec![stored], CanvasDims::new(400.0, 300.0))
            .unwrap();

        let ann = session.annotation(id).unwrap();
        assert_eq!(ann.position, Point::new(320.0, 220.0));
        assert_eq!(ann.rotation, 30.0);
    }

    #[test]
    fn resume_propagates_validation_errors() {
        let mut session = session();
        let mut bad = Annotation::create(ShapeKind::Rectangle, 10.0, 10.0);
        bad.rotation = f64::INFINITY;
        let id = bad.id;
        assert_eq!(
            session.resume_image("x", vec![bad], CanvasDims::new(10.0, 10.0)),
            Err(EditError::InvalidAnnotation(AnnotationError::NonFinite { id, field: "rotation" }))
        );
    }

    #[test]
    fn save_hands_payload_to_renderer() {
        let mut session = session();
        place(&mut session, ShapeKind::Rectangle, "abrasion");

        let mut rendered = None;
        let mut renderer = |payload: &ReportPayload| {
            rendered = Some(payload.clone());
            Ok::<(), anyhow::Error>(())
        };
        session.save(&mut renderer).unwrap();

        let payload = rendered.unwrap();
        assert_eq!(payload.images[0].container_width, 800.0);
        assert_eq!(payload.images[0].overlays[0].text, "abrasion");
        assert_eq!(session.save_state(), SaveState::Saved);
        assert_eq!(session.select_tool(ShapeKind::Circle), Err(EditError::Finalized));
        assert!(matches!(session.begin_save(), Err(SaveError::AlreadySaved)));
    }

    #[test]
    fn edits_are_refused_while_saving() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        session.begin_save().unwrap();

        assert!(session.is_saving());
        assert_eq!(session.delete(id), Err(EditError::SaveInProgress));
        assert_eq!(session.clear_all(true), Err(EditError::SaveInProgress));
        assert_eq!(session.begin_gesture(id, GestureKind::Move), Err(EditError::SaveInProgress));
        assert!(matches!(session.begin_save(), Err(SaveError::InProgress)));
    }

    #[test]
    fn failed_save_keeps_state_for_retry() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Circle, "stain");
        let before = session.entries().to_vec();

        let mut failing = |_: &ReportPayload| Err::<(), _>(anyhow::anyhow!("upload timed out"));
        let err = session.save(&mut failing).unwrap_err();
        assert!(matches!(err, SaveError::Renderer(_)));
        assert_eq!(session.save_state(), SaveState::Editing);
        assert_eq!(session.entries(), before.as_slice());

        let mut ok = |_: &ReportPayload| Ok::<(), anyhow::Error>(());
        session.save(&mut ok).unwrap();
        assert_eq!(session.annotation(id).unwrap().text, "stain");
    }

    #[test]
    fn save_requires_closed_text_edit() {
        let mut session = session();
        let id = session.select_tool(ShapeKind::Rectangle).unwrap();
        assert!(matches!(session.begin_save(), Err(SaveError::TextEditOpen(open)) if open == id));
        assert!(matches!(session.complete_save(Ok(())), Err(SaveError::NotStarted)));
    }

    #[test]
    fn resume_with_unknown_dims_exports_no_overlays() {
        let mut session = session();
        let stored = Annotation::create(ShapeKind::Rectangle, 800.0, 600.0);
        let id = stored.id;
        session
            .resume_image("file:///legacy.jpg", vec![stored.clone()], CanvasDims::new(0.0, 0.0))
            .unwrap();

        let entry = session.current_entry().unwrap();
        assert!(!entry.annotation_dims.is_measured());
        assert_eq!(session.annotation(id), Some(&stored));
        assert_eq!(
            session.select_tool(ShapeKind::Circle),
            Err(EditError::UnknownAuthoringSize)
        );

        let mut rendered = None;
        let mut renderer = |payload: &ReportPayload| {
            rendered = Some(payload.clone());
            Ok::<(), anyhow::Error>(())
        };
        session.save(&mut renderer).unwrap();

        let payload = rendered.unwrap();
        assert_eq!(payload.images[1].annotations.len(), 1);
        assert!(payload.images[1].overlays.is_empty());
        assert_eq!(payload.overlay_count(), 0);
    }

    #[test]
    fn unknown_dims_image_accepts_new_annotations_after_clear() {
        let mut session = session();
        let stored = Annotation::create(ShapeKind::Arrow, 800.0, 600.0);
        session
            .resume_image("file:///legacy.jpg", vec![stored], CanvasDims::UNMEASURED)
            .unwrap();
        session.clear_all(true).unwrap();

        let id = session.select_tool(ShapeKind::Arrow).unwrap();
        assert_eq!(session.current_entry().unwrap().annotation_dims, CanvasDims::new(800.0, 600.0));
        assert!(session.annotation(id).is_some());
    }

    #[test]
    fn unusable_measurement_leaves_annotations_alone() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        let before = session.annotation(id).unwrap().clone();

        for dims in [
            CanvasDims::new(0.0, 0.0),
            CanvasDims::new(800.0, 0.0),
            CanvasDims::new(f64::NAN, 600.0),
            CanvasDims::new(f64::INFINITY, 600.0),
        ] {
            session.measure_canvas(dims);
            assert!(!session.canvas().is_measured());
            assert_eq!(session.annotation(id), Some(&before));
            assert_eq!(
                session.current_entry().unwrap().annotation_dims,
                CanvasDims::new(800.0, 600.0)
            );
        }
        assert_eq!(session.select_tool(ShapeKind::Circle), Err(EditError::CanvasNotMeasured));
    }

    #[test]
    fn shrinking_and_restoring_canvas_is_lossless() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");
        session.begin_gesture(id, GestureKind::Resize).unwrap();
        session.update_gesture(id, Vec2::new(-200.0, -200.0)).unwrap();
        session.end_gesture(id).unwrap();
        let before = session.annotation(id).unwrap().clone();
        assert_eq!(before.size, Size::new(30.0, 30.0));

        session.measure_canvas(CanvasDims::new(400.0, 300.0));
        assert_eq!(session.annotation(id).unwrap().size, Size::new(15.0, 15.0));
        session.measure_canvas(CanvasDims::new(800.0, 600.0));

        assert_eq!(session.annotation(id), Some(&before));
    }

    #[test]
    fn new_pointer_down_ends_previous_grab() {
        let mut session = session();
        let id = place(&mut session, ShapeKind::Rectangle, "");

        session.pointer_down(Point::new(400.0, 300.0)).unwrap();
        assert!(session.gesture(id).is_some());

        assert_eq!(session.pointer_down(Point::new(5.0, 5.0)), Ok(None));
        assert!(session.gesture(id).is_none());
        assert_eq!(session.pointer_moved(Point::new(500.0, 500.0)), Ok(false));
        assert_eq!(session.annotation(id).unwrap().position, Point::new(360.0, 260.0));
    }
}
