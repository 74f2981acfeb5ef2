//! Camera viewpoint, as supplied by the host once per frame.
//!
//! The engine never projects anything itself; the host converts screen
//! points to world rays. What the engine does need is the camera's pose and
//! projection kind, for handle sizing, plane facing, and omni-rotation.

use cgmath::{InnerSpace, Vector3};

/// Projection kind, used only for the handle distance multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective,
    /// Orthographic with the given half-height.
    Orthographic { size: f32 },
}

/// World-space camera pose for the current frame.
#[derive(Debug, Clone, Copy)]
pub struct Viewpoint {
    pub position: Vector3<f32>,
    /// Normalized view direction.
    pub forward: Vector3<f32>,
    /// Normalized camera right.
    pub right: Vector3<f32>,
    /// Normalized camera up.
    pub up: Vector3<f32>,
    pub projection: Projection,
}

impl Viewpoint {
    /// Build a perspective viewpoint looking from `eye` toward `target`.
    pub fn looking_at(eye: Vector3<f32>, target: Vector3<f32>, up_hint: Vector3<f32>) -> Self {
        let forward = (target - eye).normalize();
        let right = forward.cross(up_hint).normalize();
        let up = right.cross(forward);
        Self {
            position: eye,
            forward,
            right,
            up,
            projection: Projection::Perspective,
        }
    }

    /// Switch to an orthographic projection of the given half-height.
    pub fn orthographic(mut self, size: f32) -> Self {
        self.projection = Projection::Orthographic { size };
        self
    }
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::looking_at(
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        )
    }
}
