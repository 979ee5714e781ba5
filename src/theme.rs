// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Overlay styling carried into exported reports
//!
//! Colors are CSS hex strings because the document renderer consumes
//! them as-is.

// ============================================================================
// BASE COLORS
// ============================================================================
const MARKER_RED: &str = "#e53935";
const LABEL_INK: &str = "#ffffff";
const LABEL_BACKDROP: &str = "#000000";

// ============================================================================
// SHAPE MARKERS (Rectangle, Circle)
// ============================================================================
const SHAPE_STROKE: &str = MARKER_RED;
const SHAPE_STROKE_WIDTH: f64 = 2.0;
const SHAPE_FILL_OPACITY: f64 = 0.2;

// ============================================================================
// ARROW GLYPH
// ============================================================================
const ARROW_COLOR: &str = MARKER_RED;
// Arrow is a glyph, not a filled box
const ARROW_FILL_OPACITY: f64 = 0.0;

// ============================================================================
// TEXT LABELS
// ============================================================================
const LABEL_TEXT: &str = LABEL_INK;
const LABEL_BACKGROUND: &str = LABEL_BACKDROP;
const LABEL_BACKGROUND_OPACITY: f64 = 0.6;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Bordered, semi-transparent box/ellipse markers
pub mod shape {
    pub const STROKE: &str = super::SHAPE_STROKE;
    pub const STROKE_WIDTH: f64 = super::SHAPE_STROKE_WIDTH;
    pub const FILL_OPACITY: f64 = super::SHAPE_FILL_OPACITY;
}

/// Arrow glyph markers
pub mod arrow {
    pub const COLOR: &str = super::ARROW_COLOR;
    pub const FILL_OPACITY: f64 = super::ARROW_FILL_OPACITY;
}

/// Note labels attached to markers
pub mod label {
    pub const TEXT: &str = super::LABEL_TEXT;
    pub const BACKGROUND: &str = super::LABEL_BACKGROUND;
    pub const BACKGROUND_OPACITY: f64 = super::LABEL_BACKGROUND_OPACITY;
}
