// Copyright 2025 the Annotator Authors
// SPDX-License-Identifier: Apache-2.0

//! Editing model and interaction

pub mod gesture;
pub mod hit_testing;
pub mod pointer;
pub mod session;
pub mod transform;

pub use gesture::{GestureKind, GestureSession};
pub use hit_testing::{Hit, HitTarget, hit_test};
pub use pointer::Drag;
pub use session::{
    AnnotationPhase, AnnotationSession, EditError, SaveState, TextEdit, TextEditOrigin,
};
