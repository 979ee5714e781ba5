// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Pointer drag tracking

use crate::model::AnnotationId;
use kurbo::{Point, Vec2};

/// A pointer drag: where it went down and where it is now
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drag {
    pub start: Point,
    pub current: Point,
}

impl Drag {
    pub fn new(start: Point) -> Self {
        Self {
            start,
            current: start,
        }
    }

    /// Cumulative movement since pointer down
    pub fn delta(&self) -> Vec2 {
        self.current - self.start
    }
}

/// An annotation held by the pointer between down and up
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PointerGrab {
    pub annotation_id: AnnotationId,
    pub drag: Drag,
}
