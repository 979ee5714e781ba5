// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Unique identifiers for annotations.
//!
//! Each `AnnotationId` is a monotonically increasing `u64` drawn from a
//! global atomic counter, so an id is never handed out twice within a
//! process and a deleted annotation's id is never reused. Resumed
//! annotations carry ids from an earlier run; [`AnnotationId::reserve`]
//! pushes the counter past them so fresh ids cannot collide.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque, immutable identifier of one annotation
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AnnotationId(u64);

static ANNOTATION_COUNTER: AtomicU64 = AtomicU64::new(1);

impl AnnotationId {
    /// Create a new unique annotation ID
    pub fn next() -> Self {
        Self(ANNOTATION_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Make sure ids handed out later are greater than `id`
    pub fn reserve(id: AnnotationId) {
        ANNOTATION_COUNTER.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }

    /// Raw numeric value, as written into reports
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for AnnotationId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "annotation-{}", self.0)
    }
}
