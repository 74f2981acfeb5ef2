//! Axis basis, per-axis point buffers, and the quad building block used by
//! every handle shape.

use cgmath::{Quaternion, Rotation, Vector3, Zero};

use crate::scene::{NodeId, SceneGraph};

use super::config::TransformSpace;

/// The pivot point plus three mutually orthogonal unit directions the
/// handles are built along. World axes in global space, the main target's
/// rotated basis in local space.
#[derive(Debug, Clone, Copy)]
pub struct AxisInfo {
    pub pivot: Vector3<f32>,
    pub x_direction: Vector3<f32>,
    pub y_direction: Vector3<f32>,
    pub z_direction: Vector3<f32>,
}

impl AxisInfo {
    pub fn set(
        &mut self,
        scene: &dyn SceneGraph,
        main_target: NodeId,
        pivot: Vector3<f32>,
        space: TransformSpace,
    ) {
        match space {
            TransformSpace::Global => {
                self.x_direction = Vector3::unit_x();
                self.y_direction = Vector3::unit_y();
                self.z_direction = Vector3::unit_z();
            }
            TransformSpace::Local => {
                let rotation = scene.pose(main_target).rotation;
                self.x_direction = rotation.rotate_vector(Vector3::unit_x());
                self.y_direction = rotation.rotate_vector(Vector3::unit_y());
                self.z_direction = rotation.rotate_vector(Vector3::unit_z());
            }
        }
        self.pivot = pivot;
    }

    /// Replace the directions with the world basis rotated by `rotation`.
    pub fn rotated_by(mut self, rotation: Quaternion<f32>) -> Self {
        self.x_direction = rotation.rotate_vector(Vector3::unit_x());
        self.y_direction = rotation.rotate_vector(Vector3::unit_y());
        self.z_direction = rotation.rotate_vector(Vector3::unit_z());
        self
    }

    pub fn axis_end(&self, direction: Vector3<f32>, length: f32) -> Vector3<f32> {
        self.pivot + direction * length
    }

    pub fn x_axis_end(&self, length: f32) -> Vector3<f32> {
        self.axis_end(self.x_direction, length)
    }

    pub fn y_axis_end(&self, length: f32) -> Vector3<f32> {
        self.axis_end(self.y_direction, length)
    }

    pub fn z_axis_end(&self, length: f32) -> Vector3<f32> {
        self.axis_end(self.z_direction, length)
    }
}

impl Default for AxisInfo {
    fn default() -> Self {
        Self {
            pivot: Vector3::zero(),
            x_direction: Vector3::unit_x(),
            y_direction: Vector3::unit_y(),
            z_direction: Vector3::unit_z(),
        }
    }
}

/// World-space point buffers for one handle shape, split per axis plus an
/// all-axes aggregate (uniform scale box, camera-facing rotate circle).
#[derive(Debug, Default, Clone)]
pub struct AxisPoints {
    pub x: Vec<Vector3<f32>>,
    pub y: Vec<Vector3<f32>>,
    pub z: Vec<Vector3<f32>>,
    pub all: Vec<Vector3<f32>>,
}

impl AxisPoints {
    pub fn clear(&mut self) {
        self.x.clear();
        self.y.clear();
        self.z.clear();
        self.all.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty() && self.z.is_empty() && self.all.is_empty()
    }

    /// Flatten one axis buffer into GPU-uploadable vertices.
    pub fn to_vertices(points: &[Vector3<f32>]) -> Vec<HandleVertex> {
        points
            .iter()
            .map(|p| HandleVertex {
                position: [p.x, p.y, p.z],
            })
            .collect()
    }
}

/// Plain position vertex for handle rendering. `Pod`, so hosts can
/// `bytemuck::cast_slice` a buffer of these straight into a vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HandleVertex {
    pub position: [f32; 3],
}

/// Four corners of a square cross-section, with wrap-around indexing so side
/// faces can walk corner pairs.
#[derive(Debug, Clone, Copy)]
pub struct Quad {
    pub bottom_left: Vector3<f32>,
    pub top_left: Vector3<f32>,
    pub top_right: Vector3<f32>,
    pub bottom_right: Vector3<f32>,
}

impl Quad {
    /// Square of half-size `size` centered at `center`, spanned by the two
    /// given directions.
    pub fn spanned(
        center: Vector3<f32>,
        direction1: Vector3<f32>,
        direction2: Vector3<f32>,
        size: f32,
    ) -> Self {
        let offset_up = direction1 * size + direction2 * size;
        let offset_down = direction1 * size - direction2 * size;
        Self {
            bottom_left: center + offset_down,
            top_left: center + offset_up,
            bottom_right: center - offset_up,
            top_right: center - offset_down,
        }
    }

    /// Corner by index, wrapping at 4 so `corner(i)`/`corner(i + 1)` walks
    /// every edge.
    pub fn corner(&self, index: usize) -> Vector3<f32> {
        match index % 4 {
            0 => self.bottom_left,
            1 => self.top_left,
            2 => self.top_right,
            _ => self.bottom_right,
        }
    }

    pub fn center(&self) -> Vector3<f32> {
        (self.bottom_left + self.top_left + self.top_right + self.bottom_right) / 4.0
    }
}
