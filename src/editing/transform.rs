// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Gesture transforms.
//!
//! Every function maps the annotation as it was when the gesture started
//! (the snapshot) plus the cumulative pointer delta since then to the new
//! value. Nothing here looks at earlier moves of the same gesture, so
//! repeated small updates cannot accumulate drift.

use super::gesture::GestureKind;
use crate::model::annotation::{clamp_size, normalize_degrees};
use crate::model::Annotation;
use kurbo::{Point, Size, Vec2};

/// Drag the whole shape
pub fn translate(snapshot: &Annotation, delta: Vec2) -> Point {
    snapshot.position + delta
}

/// Drag the bottom-right handle. Both sides are clamped to the minimum;
/// circles take their height from the horizontal delta.
pub fn resize(snapshot: &Annotation, delta: Vec2) -> Size {
    clamp_size(
        snapshot.kind,
        Size::new(snapshot.size.width + delta.x, snapshot.size.height + delta.y),
    )
}

/// Drag the rotate handle. Rotation follows horizontal drag distance only,
/// one degree per pixel; exported reports depend on these exact values.
/// `None` for shapes that cannot rotate.
pub fn rotate(snapshot: &Annotation, delta: Vec2) -> Option<f64> {
    snapshot
        .kind
        .can_rotate()
        .then(|| normalize_degrees(snapshot.rotation + delta.x))
}

/// Drag the note label. The label is a child of the rotated shape, so the
/// screen-space delta is turned by `-rotation` before it is applied; the
/// label then tracks the finger whatever the shape's angle.
pub fn drag_label(snapshot: &Annotation, delta: Vec2) -> Vec2 {
    snapshot.text_offset + unrotate_delta(delta, snapshot.rotation)
}

/// Rotate a screen-space delta into a frame turned by `rotation` degrees
pub fn unrotate_delta(delta: Vec2, rotation: f64) -> Vec2 {
    let (sin, cos) = rotation.to_radians().sin_cos();
    Vec2::new(
        delta.x * cos + delta.y * sin,
        delta.y * cos - delta.x * sin,
    )
}

/// The annotation after applying `delta` under the given gesture
pub fn apply(kind: GestureKind, snapshot: &Annotation, delta: Vec2) -> Annotation {
    let mut next = snapshot.clone();
    match kind {
        GestureKind::Move => next.position = translate(snapshot, delta),
        GestureKind::Resize => next.size = resize(snapshot, delta),
        GestureKind::Rotate => {
            if let Some(rotation) = rotate(snapshot, delta) {
                next.rotation = rotation;
            }
        }
        GestureKind::Label => next.text_offset = drag_label(snapshot, delta),
    }
    next
}
