// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! The save boundary: what is handed to the document renderer.

use super::overlay::{OverlayRecord, export_overlays};
use crate::model::{Annotation, AnnotationId, ImageEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a save could not start or did not complete
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("text edit for {0} must be confirmed or cancelled before saving")]
    TextEditOpen(AnnotationId),

    #[error("a save is already in progress")]
    InProgress,

    #[error("no save is in progress")]
    NotStarted,

    #[error("the report has already been saved")]
    AlreadySaved,

    #[error("report rendering failed")]
    Renderer(#[source] anyhow::Error),
}

/// One image as handed to the document renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReport {
    pub image_uri: String,
    /// Canvas size the pixel annotations refer to
    pub container_width: f64,
    pub container_height: f64,
    pub annotations: Vec<Annotation>,
    /// Percentage overlays; empty when the canvas was never measured
    pub overlays: Vec<OverlayRecord>,
}

impl ImageReport {
    pub fn from_entry(entry: &ImageEntry) -> Self {
        Self {
            image_uri: entry.uri.clone(),
            container_width: entry.annotation_dims.width,
            container_height: entry.annotation_dims.height,
            annotations: entry.annotations.clone(),
            overlays: export_overlays(&entry.annotations, entry.annotation_dims),
        }
    }
}

/// Everything the document renderer needs for one report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPayload {
    pub generated_at: DateTime<Utc>,
    pub images: Vec<ImageReport>,
}

impl ReportPayload {
    pub fn build(entries: &[ImageEntry]) -> Self {
        Self {
            generated_at: Utc::now(),
            images: entries.iter().map(ImageReport::from_entry).collect(),
        }
    }

    pub fn overlay_count(&self) -> usize {
        self.images.iter().map(|image| image.overlays.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// External collaborator that turns a payload into a printable document
/// (and uploads it). Opaque to this crate: success or failure only.
pub trait ReportRenderer {
    fn render(&mut self, payload: &ReportPayload) -> anyhow::Result<()>;
}

impl<F> ReportRenderer for F
where
    F: FnMut(&ReportPayload) -> anyhow::Result<()>,
{
    fn render(&mut self, payload: &ReportPayload) -> anyhow::Result<()> {
        self(payload)
    }
}
