// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Coordinate export and the report save boundary

pub mod overlay;
pub mod report;

pub use overlay::{
    OverlayRecord, OverlayStyle, export_annotation, export_overlays, rescale_annotations,
};
pub use report::{ImageReport, ReportPayload, ReportRenderer, SaveError};
