//! # Claymore Prelude
//!
//! Convenient single import for the types a typical host touches: the
//! engine facade, its configuration and mode enums, the scene-graph trait
//! and reference implementation, and the pointer-input types.
//!
//! ## Usage
//!
//! ```rust
//! use claymore::prelude::*;
//! ```

// Re-export the engine facade
pub use crate::gizmo::{
    Axis, CenterType, DragInput, GizmoConfig, ScaleType, TransformGizmo, TransformPivot,
    TransformSpace, TransformType,
};

// Re-export handle geometry consumed by renderers
pub use crate::gizmo::{AxisInfo, AxisPoints, HandleGeometry, HandleVertex};

// Re-export the scene-side interface
pub use crate::scene::{
    BasicSceneGraph, NodeId, Pose, Projection, SceneGraph, Viewpoint,
};

// Re-export history extension points
pub use crate::history::{Command, UndoRedo};

// Re-export math types used at the API surface
pub use crate::error::GizmoError;
pub use crate::math::Ray;

// Re-export common external math dependencies
pub use cgmath::{InnerSpace, Quaternion, Vector2, Vector3, Zero};
