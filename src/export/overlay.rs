// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Resolution-independent overlays.
//!
//! Annotations are stored in the pixel space of the canvas they were
//! authored on. For the report they are expressed as percentages of that
//! canvas so the document renderer can lay them over an image box of any
//! size. For live display at another canvas size they are rescaled by
//! `new / original` per axis. Both need measured authoring dims; without
//! them the overlays are skipped rather than guessed.

use crate::model::{Annotation, AnnotationId, CanvasDims, OverlayShape, ShapeKind};
use crate::theme;
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Drawing hints for the document renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayStyle {
    pub stroke: String,
    pub stroke_width: f64,
    pub fill_opacity: f64,
    pub label_color: String,
    pub label_background: String,
    pub label_background_opacity: f64,
}

impl OverlayStyle {
    pub fn for_shape(shape: OverlayShape) -> Self {
        let (stroke, fill_opacity) = match shape {
            OverlayShape::Box | OverlayShape::Ellipse => {
                (theme::shape::STROKE, theme::shape::FILL_OPACITY)
            }
            OverlayShape::ArrowGlyph => (theme::arrow::COLOR, theme::arrow::FILL_OPACITY),
        };
        Self {
            stroke: stroke.to_string(),
            stroke_width: theme::shape::STROKE_WIDTH,
            fill_opacity,
            label_color: theme::label::TEXT.to_string(),
            label_background: theme::label::BACKGROUND.to_string(),
            label_background_opacity: theme::label::BACKGROUND_OPACITY,
        }
    }
}

/// One marker, positioned in percent of the authoring canvas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRecord {
    pub id: AnnotationId,
    #[serde(rename = "type")]
    pub kind: ShapeKind,
    pub shape: OverlayShape,
    pub left_pct: f64,
    pub top_pct: f64,
    pub width_pct: f64,
    pub height_pct: f64,
    /// Degrees, passed through untouched
    pub rotation: f64,
    pub text: String,
    /// Label offset from the marker center, percent of canvas width/height
    pub text_offset_pct: Vec2,
    pub label_flipped: bool,
    pub style: OverlayStyle,
}

impl OverlayRecord {
    /// Position and layout size back in pixels of a canvas of `dims`
    pub fn to_pixels(&self, dims: CanvasDims) -> Option<(Point, Size)> {
        let dims = dims.measured()?;
        Some((
            Point::new(
                self.left_pct / 100.0 * dims.width,
                self.top_pct / 100.0 * dims.height,
            ),
            Size::new(
                self.width_pct / 100.0 * dims.width,
                self.height_pct / 100.0 * dims.height,
            ),
        ))
    }
}

/// Express one annotation in percent of the canvas it was authored on
pub fn export_annotation(ann: &Annotation, dims: CanvasDims) -> Option<OverlayRecord> {
    let CanvasDims { width, height } = dims.measured()?;
    let shape = ann.kind.overlay_shape();
    Some(OverlayRecord {
        id: ann.id,
        kind: ann.kind,
        shape,
        left_pct: ann.position.x / width * 100.0,
        top_pct: ann.position.y / height * 100.0,
        width_pct: ann.size.width / width * 100.0,
        height_pct: ann.layout_height() / height * 100.0,
        rotation: ann.rotation,
        text: ann.text.clone(),
        text_offset_pct: Vec2::new(
            ann.text_offset.x / width * 100.0,
            ann.text_offset.y / height * 100.0,
        ),
        label_flipped: ann.label_flipped(),
        style: OverlayStyle::for_shape(shape),
    })
}

/// Export a whole annotation set. Unmeasured dims yield no overlays.
pub fn export_overlays(annotations: &[Annotation], dims: CanvasDims) -> Vec<OverlayRecord> {
    if !dims.is_measured() {
        if !annotations.is_empty() {
            tracing::warn!(
                "Skipping {} overlays: authoring canvas {}x{} was never measured",
                annotations.len(),
                dims.width,
                dims.height
            );
        }
        return Vec::new();
    }
    annotations
        .iter()
        .filter_map(|ann| export_annotation(ann, dims))
        .collect()
}

/// Rescale an annotation set authored at `from` for display at `to`.
///
/// Positions, sizes and label offsets are multiplied by the per-axis
/// scale factors; rotation is unaffected. `None` when either size is
/// unmeasured.
pub fn rescale_annotations(
    annotations: &[Annotation],
    from: CanvasDims,
    to: CanvasDims,
) -> Option<Vec<Annotation>> {
    let from = from.measured()?;
    let to = to.measured()?;
    let scale_x = to.width / from.width;
    let scale_y = to.height / from.height;

    Some(
        annotations
            .iter()
            .map(|ann| {
                let mut scaled = ann.clone();
                scaled.position = Point::new(ann.position.x * scale_x, ann.position.y * scale_y);
                scaled.size = Size::new(ann.size.width * scale_x, ann.size.height * scale_y);
                scaled.text_offset =
                    Vec2::new(ann.text_offset.x * scale_x, ann.text_offset.y * scale_y);
                scaled
            })
            .collect(),
    )
}
