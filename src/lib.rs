// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Annotator: the condition-report image annotation core.
//!
//! Users place rectangle, circle and arrow markers with notes over a photo,
//! then drag, resize and rotate them. On save the markers are converted to
//! percentages of the authoring canvas and handed to an external document
//! renderer.
//!
//! - [`model`]: annotation records and image entries
//! - [`editing`]: gesture transforms and the authoring session
//! - [`export`]: percentage overlays and the report payload

pub mod editing;
pub mod export;
pub mod model;
pub mod settings;
pub mod theme;

pub use editing::{AnnotationSession, EditError, GestureKind};
pub use export::{ReportPayload, ReportRenderer, SaveError};
pub use model::{Annotation, AnnotationId, CanvasDims, ImageEntry, ShapeKind};
pub use settings::Settings;

/// Install a tracing subscriber for embedders that have none.
///
/// The filter comes from `RUST_LOG` and defaults to `annotator=info`.
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging() -> bool {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("annotator=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
