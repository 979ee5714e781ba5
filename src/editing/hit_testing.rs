// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Hit testing annotations, their handles and labels at a canvas point.
//!
//! The last annotation in the set is drawn on top and wins. Within one
//! annotation the rotate handle is checked first, then the resize handle,
//! then the label, then the shape body. Bodies are tested in the shape's
//! unrotated frame so rotated arrows are hit where they are drawn.

use super::gesture::GestureKind;
use crate::model::{Annotation, AnnotationId, ShapeKind};
use crate::settings::Settings;
use kurbo::{Ellipse, Point, Shape};

/// Which part of an annotation was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    RotateHandle,
    ResizeHandle,
    Label,
    Body,
}

impl HitTarget {
    /// The gesture a pointer-down on this target starts
    pub fn gesture(self) -> GestureKind {
        match self {
            HitTarget::RotateHandle => GestureKind::Rotate,
            HitTarget::ResizeHandle => GestureKind::Resize,
            HitTarget::Label => GestureKind::Label,
            HitTarget::Body => GestureKind::Move,
        }
    }
}

/// Result of a successful hit test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: AnnotationId,
    pub target: HitTarget,
}

/// Find the topmost annotation part under `point`
pub fn hit_test(annotations: &[Annotation], point: Point, settings: &Settings) -> Option<Hit> {
    let hit = annotations.iter().rev().find_map(|ann| {
        hit_annotation(ann, point, settings).map(|target| Hit { id: ann.id, target })
    });
    tracing::debug!("[hit_test] point=({}, {}) -> {:?}", point.x, point.y, hit);
    hit
}

fn hit_annotation(ann: &Annotation, point: Point, settings: &Settings) -> Option<HitTarget> {
    let near = |target: Point, radius: f64| (point - target).hypot() <= radius;

    if let Some(handle) = ann.rotate_handle()
        && near(handle, settings.handle_radius)
    {
        return Some(HitTarget::RotateHandle);
    }
    if near(ann.resize_handle(), settings.handle_radius) {
        return Some(HitTarget::ResizeHandle);
    }
    if !ann.text.is_empty() && near(ann.label_anchor(), settings.label_hit_radius) {
        return Some(HitTarget::Label);
    }

    let local = ann.to_local(point);
    let inside = match ann.kind {
        ShapeKind::Circle => Ellipse::from_rect(ann.bounds()).contains(local),
        ShapeKind::Rectangle | ShapeKind::Arrow => ann.bounds().contains(local),
    };
    inside.then_some(HitTarget::Body)
}
