// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Annotation settings and configuration constants.
//!
//! The constants below are the defaults. Geometry invariants (minimum
//! size, arrow box height) are fixed; the remaining tunables can be
//! overridden from a TOML document through [`Settings`]. Visual styling
//! carried into exported overlays belongs in `theme.rs`.

use serde::{Deserialize, Serialize};
use std::path::Path;

// ============================================================================
// ANNOTATION GEOMETRY
// ============================================================================
/// Smallest width or height any annotation may have (canvas pixels)
const MIN_SIZE: f64 = 30.0;

/// Width and height of a freshly created annotation (canvas pixels)
const DEFAULT_SIZE: f64 = 80.0;

/// Height of the box an arrow is laid out and exported in, regardless of
/// its stored height
const ARROW_BOX_HEIGHT: f64 = 80.0;

/// Label offset from the shape center for a new annotation (50 below)
const DEFAULT_TEXT_OFFSET_X: f64 = 0.0;
const DEFAULT_TEXT_OFFSET_Y: f64 = 50.0;

// ============================================================================
// INTERACTION
// ============================================================================
/// Hit radius around the resize and rotate handles (canvas pixels)
const HANDLE_RADIUS: f64 = 16.0;

/// Hit radius around a text label anchor (canvas pixels)
const LABEL_HIT_RADIUS: f64 = 20.0;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Annotation geometry defaults and invariants
pub mod annotation {
    /// Minimum width/height; resize results are clamped to this
    pub const MIN_SIZE: f64 = super::MIN_SIZE;

    /// Default width/height of a new annotation
    pub const DEFAULT_SIZE: f64 = super::DEFAULT_SIZE;

    /// Layout/export height of an arrow's box
    pub const ARROW_BOX_HEIGHT: f64 = super::ARROW_BOX_HEIGHT;

    /// Default label offset relative to the shape center
    pub const DEFAULT_TEXT_OFFSET: kurbo::Vec2 =
        kurbo::Vec2::new(super::DEFAULT_TEXT_OFFSET_X, super::DEFAULT_TEXT_OFFSET_Y);
}

/// Pointer hit-testing radii
pub mod interaction {
    pub const HANDLE_RADIUS: f64 = super::HANDLE_RADIUS;
    pub const LABEL_HIT_RADIUS: f64 = super::LABEL_HIT_RADIUS;
}

// ============================================================================
// RUNTIME SETTINGS
// ============================================================================

/// Errors raised while loading [`Settings`]
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Overridable tunables. Keys missing from the TOML source keep the
/// compiled-in defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Settings {
    pub default_size: f64,
    pub default_text_offset: [f64; 2],
    pub handle_radius: f64,
    pub label_hit_radius: f64,
}

impl Default for Settings {
    fn default() -> Self {
        let offset = annotation::DEFAULT_TEXT_OFFSET;
        Self {
            default_size: annotation::DEFAULT_SIZE,
            default_text_offset: [offset.x, offset.y],
            handle_radius: interaction::HANDLE_RADIUS,
            label_hit_radius: interaction::LABEL_HIT_RADIUS,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_toml_str(&source)?;
        tracing::info!("Loaded annotation settings from {}", path.display());
        Ok(settings)
    }

    /// Default label offset as a vector
    pub fn text_offset(&self) -> kurbo::Vec2 {
        kurbo::Vec2::new(self.default_text_offset[0], self.default_text_offset[1])
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_size.is_finite() || self.default_size < MIN_SIZE {
            return Err(ConfigError::Invalid {
                key: "default_size",
                reason: format!("must be a finite value of at least {MIN_SIZE}"),
            });
        }
        if !self.default_text_offset.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid {
                key: "default_text_offset",
                reason: "components must be finite".to_string(),
            });
        }
        for (key, radius) in [
            ("handle_radius", self.handle_radius),
            ("label_hit_radius", self.label_hit_radius),
        ] {
            if !radius.is_finite() || radius < 0.0 {
                return Err(ConfigError::Invalid {
                    key,
                    reason: "must be a finite, non-negative radius".to_string(),
                });
            }
        }
        Ok(())
    }
}
