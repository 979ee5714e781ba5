// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Annotation data model

pub mod annotation;
pub mod annotation_id;
pub mod image_entry;

pub use annotation::{Annotation, AnnotationError, OverlayShape, ShapeKind};
pub use annotation_id::AnnotationId;
pub use image_entry::{CanvasDims, ImageEntry};
