// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! A captured photograph together with its annotation set.
//!
//! Annotation coordinates are canvas pixels, so an entry also remembers the
//! canvas size they were authored against (`annotation_dims`). Any later
//! display at another size rescales through those dims.

use super::{Annotation, AnnotationError, AnnotationId};
use chrono::{DateTime, Utc};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Measured canvas size. Zero means "not measured yet".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasDims {
    pub width: f64,
    pub height: f64,
}

impl CanvasDims {
    pub const UNMEASURED: CanvasDims = CanvasDims { width: 0.0, height: 0.0 };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True once layout produced a usable, positive size
    pub fn is_measured(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    /// `Some(self)` when measured, so callers can `?` over missing layout
    pub fn measured(self) -> Option<Self> {
        self.is_measured().then_some(self)
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// One photograph plus its annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageEntry {
    /// Image reference (URI or blob key), opaque to this crate
    pub uri: String,
    pub annotations: Vec<Annotation>,
    /// Canvas size the annotations were authored against
    pub annotation_dims: CanvasDims,
    pub captured_at: DateTime<Utc>,
}

impl ImageEntry {
    /// A freshly captured photo with no annotations
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            annotations: Vec::new(),
            annotation_dims: CanvasDims::UNMEASURED,
            captured_at: Utc::now(),
        }
    }

    /// Rebuild an entry from stored annotations (edit-resume).
    ///
    /// Every annotation is normalized, ids must be unique, and the global
    /// id counter is advanced past them.
    pub fn resume(
        uri: impl Into<String>,
        annotations: Vec<Annotation>,
        annotation_dims: CanvasDims,
    ) -> Result<Self, AnnotationError> {
        let mut seen = BTreeSet::new();
        let annotations = annotations
            .into_iter()
            .map(|ann| {
                if !seen.insert(ann.id) {
                    return Err(AnnotationError::DuplicateId(ann.id));
                }
                AnnotationId::reserve(ann.id);
                ann.normalized()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            uri: uri.into(),
            annotations,
            annotation_dims,
            captured_at: Utc::now(),
        })
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|ann| ann.id == id)
    }

    pub fn get_mut(&mut self, id: AnnotationId) -> Option<&mut Annotation> {
        self.annotations.iter_mut().find(|ann| ann.id == id)
    }

    /// Remove an annotation, returning it if it was present
    pub fn remove(&mut self, id: AnnotationId) -> Option<Annotation> {
        let index = self.annotations.iter().position(|ann| ann.id == id)?;
        Some(self.annotations.remove(index))
    }
}
