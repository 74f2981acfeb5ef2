// src/lib.rs
//! Claymore
//!
//! A runtime 3D transform-manipulation engine: selection management with
//! parent/child exclusivity, ray-based axis picking over handle geometry,
//! drag-to-move/rotate/scale with incremental snapping, and a bounded
//! undo/redo history.
//!
//! The engine is headless. Hosts supply a scene graph (via the
//! [`scene::SceneGraph`] trait), a camera viewpoint, and pointer rays; the
//! engine hands back handle-geometry buffers and a highlighted-node set for
//! rendering, and mutates node poses as the user drags.

pub mod error;
pub mod gizmo;
pub mod history;
pub mod math;
pub mod prelude;
pub mod scene;

// Re-export main types for convenience
pub use error::GizmoError;
pub use gizmo::{GizmoConfig, TransformGizmo};

/// Creates an engine instance with default configuration
pub fn default() -> TransformGizmo {
    TransformGizmo::default()
}
