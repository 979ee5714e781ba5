// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Gesture session records.
//!
//! A session is created on gesture start, holds the pre-gesture snapshot
//! of the annotation, and is dropped on gesture end. Moves that arrive
//! without a session are ignored by the controller.

use super::transform;
use crate::model::{Annotation, AnnotationId};
use kurbo::Vec2;

/// What a gesture manipulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// Drag the whole shape
    Move,
    /// Drag the bottom-right handle
    Resize,
    /// Drag the rotate handle (arrows only)
    Rotate,
    /// Drag the note label
    Label,
}

/// One in-flight gesture on one annotation
#[derive(Debug, Clone, PartialEq)]
pub struct GestureSession {
    kind: GestureKind,
    snapshot: Annotation,
}

impl GestureSession {
    /// Start a gesture on `annotation`. Rotating a shape that cannot
    /// rotate yields no session.
    pub fn start(kind: GestureKind, annotation: &Annotation) -> Option<Self> {
        if kind == GestureKind::Rotate && !annotation.kind.can_rotate() {
            return None;
        }
        Some(Self {
            kind,
            snapshot: annotation.clone(),
        })
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn annotation_id(&self) -> AnnotationId {
        self.snapshot.id
    }

    pub fn snapshot(&self) -> &Annotation {
        &self.snapshot
    }

    /// The annotation after the cumulative `delta` since start
    pub fn apply(&self, delta: Vec2) -> Annotation {
        transform::apply(self.kind, &self.snapshot, delta)
    }
}
