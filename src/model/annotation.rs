// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Annotation records: one shape marker plus its note, placed over a photo.
//!
//! All coordinates live in canvas-pixel space with a top-left origin and
//! y growing downward. Rotation is in degrees, clockwise on screen, about
//! the center of the shape's layout box. The note label is a rotated child
//! of the shape: `text_offset` is expressed in the shape's own frame.

use super::AnnotationId;
use crate::settings::{self, Settings};
use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

// ===== Shape Kind =====

/// Type of marker. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Arrow,
}

/// How the document renderer should draw an exported marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayShape {
    /// Bordered, semi-transparent rectangle
    Box,
    /// Bordered, semi-transparent ellipse inscribed in the box
    Ellipse,
    /// Fixed arrow glyph; the box is only a position/rotation anchor
    ArrowGlyph,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Rectangle, ShapeKind::Circle, ShapeKind::Arrow];

    /// Only arrows carry a rotation handle
    pub fn can_rotate(self) -> bool {
        match self {
            ShapeKind::Arrow => true,
            ShapeKind::Rectangle | ShapeKind::Circle => false,
        }
    }

    /// Circles keep width == height through every resize
    pub fn locks_aspect(self) -> bool {
        match self {
            ShapeKind::Circle => true,
            ShapeKind::Rectangle | ShapeKind::Arrow => false,
        }
    }

    /// Height used for layout and export. Arrows ignore the stored value.
    pub fn layout_height(self, stored: f64) -> f64 {
        match self {
            ShapeKind::Arrow => settings::annotation::ARROW_BOX_HEIGHT,
            ShapeKind::Rectangle | ShapeKind::Circle => stored,
        }
    }

    pub fn overlay_shape(self) -> OverlayShape {
        match self {
            ShapeKind::Rectangle => OverlayShape::Box,
            ShapeKind::Circle => OverlayShape::Ellipse,
            ShapeKind::Arrow => OverlayShape::ArrowGlyph,
        }
    }
}

// ===== Errors =====

/// Problems found when validating stored annotations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotationError {
    #[error("{id} has a non-finite {field}")]
    NonFinite { id: AnnotationId, field: &'static str },

    #[error("{0} appears more than once in the annotation set")]
    DuplicateId(AnnotationId),
}

// ===== Annotation =====

/// One marker placed over an image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    /// Top-left of the layout box
    pub position: Point,
    /// Stored size; arrows lay out with a fixed height instead
    pub size: Size,
    /// Degrees in [0, 360); always 0 for shapes that cannot rotate
    pub rotation: f64,
    #[serde(default)]
    pub text: String,
    /// Label offset from the shape center, in the shape's rotated frame
    pub text_offset: Vec2,
}

impl Annotation {
    /// Create a default-sized annotation centered in the given canvas
    pub fn create(kind: ShapeKind, canvas_width: f64, canvas_height: f64) -> Self {
        Self::create_with(kind, canvas_width, canvas_height, &Settings::default())
    }

    /// Create an annotation centered in the given canvas using `settings`
    /// for the default size and label offset
    pub fn create_with(
        kind: ShapeKind,
        canvas_width: f64,
        canvas_height: f64,
        settings: &Settings,
    ) -> Self {
        let side = settings.default_size;
        Self {
            id: AnnotationId::next(),
            kind,
            position: Point::new(canvas_width / 2.0 - side / 2.0, canvas_height / 2.0 - side / 2.0),
            size: Size::new(side, side),
            rotation: 0.0,
            text: String::new(),
            text_offset: settings.text_offset(),
        }
    }

    /// Validate a stored annotation and bring it back within the model's
    /// invariants. Degenerate sizes are clamped rather than rejected.
    pub fn normalized(mut self) -> Result<Self, AnnotationError> {
        let id = self.id;
        let check = |field: &'static str, values: &[f64]| {
            if values.iter().all(|v| v.is_finite()) {
                Ok(())
            } else {
                Err(AnnotationError::NonFinite { id, field })
            }
        };
        check("position", &[self.position.x, self.position.y])?;
        check("size", &[self.size.width, self.size.height])?;
        check("rotation", &[self.rotation])?;
        check("text offset", &[self.text_offset.x, self.text_offset.y])?;

        self.size = clamp_size(self.kind, self.size);
        self.rotation = if self.kind.can_rotate() {
            normalize_degrees(self.rotation)
        } else {
            0.0
        };
        Ok(self)
    }

    /// Height the shape occupies on the canvas
    pub fn layout_height(&self) -> f64 {
        self.kind.layout_height(self.size.height)
    }

    /// Unrotated layout box
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, Size::new(self.size.width, self.layout_height()))
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Map a point from the shape's unrotated frame to the canvas
    pub fn to_canvas(&self, local: Point) -> Point {
        let center = self.center();
        center + rotate_vec(local - center, self.rotation)
    }

    /// Map a canvas point into the shape's unrotated frame
    pub fn to_local(&self, canvas: Point) -> Point {
        let center = self.center();
        center + rotate_vec(canvas - center, -self.rotation)
    }

    /// Where the note label is drawn on the canvas
    pub fn label_anchor(&self) -> Point {
        self.center() + rotate_vec(self.text_offset, self.rotation)
    }

    /// Whether the label text is counter-rotated by 180° to stay readable
    pub fn label_flipped(&self) -> bool {
        label_flipped(self.rotation)
    }

    /// Bottom-right corner of the layout box, as drawn
    pub fn resize_handle(&self) -> Point {
        let b = self.bounds();
        self.to_canvas(Point::new(b.x1, b.y1))
    }

    /// Middle of the right edge of the layout box, as drawn. Arrows only.
    pub fn rotate_handle(&self) -> Option<Point> {
        if !self.kind.can_rotate() {
            return None;
        }
        let b = self.bounds();
        Some(self.to_canvas(Point::new(b.x1, b.center().y)))
    }
}

// ===== Geometry Helpers =====

/// Normalize an angle into [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if r >= 360.0 { 0.0 } else { r }
}

/// Labels on shapes turned more than a quarter but less than three
/// quarters of a turn are drawn upside-down-corrected
pub fn label_flipped(rotation: f64) -> bool {
    let r = normalize_degrees(rotation);
    r > 90.0 && r < 270.0
}

/// Apply the minimum size, and the circle's locked aspect ratio
pub fn clamp_size(kind: ShapeKind, size: Size) -> Size {
    let min = settings::annotation::MIN_SIZE;
    let width = size.width.max(min);
    let height = if kind.locks_aspect() { width } else { size.height.max(min) };
    Size::new(width, height)
}

/// Rotate a vector clockwise on screen (y down) by `degrees`
pub(crate) fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}
