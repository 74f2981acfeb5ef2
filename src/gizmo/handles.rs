//! Per-frame handle geometry construction.
//!
//! Every handle is emitted as world-space point buffers: thin boxes for axis
//! lines and circle segments, quads for planes, triangle fans for arrow
//! tips, and boxes for scale tips. The same buffers drive both ray picking
//! and rendering; they are fully overwritten on every rebuild.

use cgmath::{InnerSpace, Vector3};

use crate::math::geometry;

use super::axis::{AxisPoints, Quad};
use super::config::{Axis, TransformType};
use super::state::GizmoState;

/// All handle point buffers for the current frame.
#[derive(Debug, Default, Clone)]
pub struct HandleGeometry {
    /// Thin boxes along each axis (shared by move and scale).
    pub lines: AxisPoints,
    /// One camera-facing quad per axis for plane-constrained moves.
    pub planes: AxisPoints,
    /// Arrow-tip triangle fans at the move axis ends.
    pub triangles: AxisPoints,
    /// Boxes at the scale axis ends, plus the uniform-scale box in `all`.
    pub squares: AxisPoints,
    /// Rotation circle segments, plus the camera-facing circle in `all`.
    pub circles: AxisPoints,
}

impl HandleGeometry {
    pub fn clear(&mut self) {
        self.lines.clear();
        self.planes.clear();
        self.triangles.clear();
        self.squares.clear();
        self.circles.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.planes.is_empty()
            && self.triangles.is_empty()
            && self.squares.is_empty()
            && self.circles.is_empty()
    }
}

impl GizmoState {
    /// Rebuild every handle buffer from the current axis basis, modes, and
    /// viewpoint.
    pub(crate) fn rebuild_handles(&mut self) {
        let mut handles = std::mem::take(&mut self.handles);
        handles.clear();

        self.build_lines(&mut handles.lines);
        self.build_planes(&mut handles.planes);
        self.build_triangles(&mut handles.triangles);
        self.build_squares(&mut handles.squares);
        self.build_circles(&mut handles.circles);

        self.handles = handles;
    }

    fn build_lines(&self, out: &mut AxisPoints) {
        if !self.active_type_contains(TransformType::Move)
            && !self.active_type_contains(TransformType::Scale)
        {
            return;
        }

        let line_width = self.config.handle_width * self.distance_multiplier();

        let (x_length, y_length, z_length) = if self.active_type_contains(TransformType::Move) {
            let length = self.handle_length(TransformType::Move, Axis::None, true);
            (length, length, length)
        } else {
            (
                self.handle_length(TransformType::Scale, Axis::X, true),
                self.handle_length(TransformType::Scale, Axis::Y, true),
                self.handle_length(TransformType::Scale, Axis::Z, true),
            )
        };

        let info = self.axis_info;
        let pivot = self.pivot_point;
        add_box(
            pivot,
            info.x_direction,
            info.y_direction,
            info.z_direction,
            x_length,
            line_width,
            &mut out.x,
        );
        add_box(
            pivot,
            info.y_direction,
            info.x_direction,
            info.z_direction,
            y_length,
            line_width,
            &mut out.y,
        );
        add_box(
            pivot,
            info.z_direction,
            info.x_direction,
            info.y_direction,
            z_length,
            line_width,
            &mut out.z,
        );
    }

    fn build_planes(&self, out: &mut AxisPoints) {
        if !self.active_type_contains(TransformType::Move) {
            return;
        }

        let info = self.axis_info;
        let pivot = self.pivot_point;

        // Offset each quad toward the viewer so the grab area sits on the
        // camera side of the pivot.
        let pivot_to_camera = self.view.position - pivot;
        let x_sign = info.x_direction.dot(pivot_to_camera).signum();
        let y_sign = info.y_direction.dot(pivot_to_camera).signum();
        let z_sign = info.z_direction.dot(pivot_to_camera).signum();

        let mut plane_size = self.config.plane_size;
        if self.transform_type == TransformType::All {
            plane_size *= self.config.all_move_handle_length_multiplier;
        }
        plane_size *= self.distance_multiplier();

        let x_offset = info.x_direction * (x_sign * plane_size);
        let y_offset = info.y_direction * (y_sign * plane_size);
        let z_offset = info.z_direction * (z_sign * plane_size);

        let x_center = pivot + y_offset + z_offset;
        let y_center = pivot + x_offset + z_offset;
        let z_center = pivot + x_offset + y_offset;

        add_plane_quad(x_center, info.y_direction, info.z_direction, plane_size, &mut out.x);
        add_plane_quad(y_center, info.x_direction, info.z_direction, plane_size, &mut out.y);
        add_plane_quad(z_center, info.x_direction, info.y_direction, plane_size, &mut out.z);
    }

    fn build_triangles(&self, out: &mut AxisPoints) {
        if !self.active_type_contains(TransformType::Move) {
            return;
        }

        let info = self.axis_info;
        let length = self.handle_length(TransformType::Move, Axis::None, true);
        let size = self.config.triangle_size * self.distance_multiplier();

        add_triangle_fan(
            info.x_axis_end(length),
            info.x_direction,
            info.y_direction,
            info.z_direction,
            size,
            &mut out.x,
        );
        add_triangle_fan(
            info.y_axis_end(length),
            info.y_direction,
            info.x_direction,
            info.z_direction,
            size,
            &mut out.y,
        );
        add_triangle_fan(
            info.z_axis_end(length),
            info.z_direction,
            info.y_direction,
            info.x_direction,
            size,
            &mut out.z,
        );
    }

    fn build_squares(&self, out: &mut AxisPoints) {
        if !self.active_type_contains(TransformType::Scale) {
            return;
        }

        let info = self.axis_info;
        let box_size = self.config.box_size * self.distance_multiplier();

        add_tip_box(
            info.x_axis_end(self.handle_length(TransformType::Scale, Axis::X, true)),
            info.x_direction,
            info.y_direction,
            info.z_direction,
            box_size,
            &mut out.x,
        );
        add_tip_box(
            info.y_axis_end(self.handle_length(TransformType::Scale, Axis::Y, true)),
            info.y_direction,
            info.x_direction,
            info.z_direction,
            box_size,
            &mut out.y,
        );
        add_tip_box(
            info.z_axis_end(self.handle_length(TransformType::Scale, Axis::Z, true)),
            info.z_direction,
            info.x_direction,
            info.y_direction,
            box_size,
            &mut out.z,
        );
        // Uniform-scale box straddling the pivot.
        add_tip_box(
            self.pivot_point - info.x_direction * (box_size * 0.5),
            info.x_direction,
            info.y_direction,
            info.z_direction,
            box_size,
            &mut out.all,
        );
    }

    fn build_circles(&self, out: &mut AxisPoints) {
        if !self.active_type_contains(TransformType::Rotate) {
            return;
        }

        // The presented basis, so global-space rotation circles track the
        // drag.
        let info = self.axis_info();
        let length = self.handle_length(TransformType::Rotate, Axis::None, true);
        let width = self.config.handle_width * self.distance_multiplier();
        let pivot = self.pivot_point;
        let to_camera = geometry::normalized_or_zero(self.view.position - pivot);

        self.add_circle(pivot, info.x_direction, length, width, to_camera, true, &mut out.x);
        self.add_circle(pivot, info.y_direction, length, width, to_camera, true, &mut out.y);
        self.add_circle(pivot, info.z_direction, length, width, to_camera, true, &mut out.z);
        // Camera-facing circle, drawn whole.
        self.add_circle(pivot, -to_camera, length, width, to_camera, false, &mut out.all);
    }

    /// Approximate a circle around `axis` as thin boxes, optionally clipped
    /// to the camera-facing hemisphere.
    #[allow(clippy::too_many_arguments)]
    fn add_circle(
        &self,
        origin: Vector3<f32>,
        axis: Vector3<f32>,
        size: f32,
        width: f32,
        to_camera: Vector3<f32>,
        depth_test: bool,
        out: &mut Vec<Vector3<f32>>,
    ) {
        let up = geometry::normalized_or_zero(axis) * size;
        let forward = geometry::any_perpendicular(up) * size;
        let right = geometry::normalized_or_zero(up.cross(forward)) * size;

        let detail = self.config.circle_detail.max(3);
        let step = std::f32::consts::TAU / detail as f32;

        let mut last_point = origin + right;
        for i in 1..=detail {
            let theta = i as f32 * step;
            let next_point = origin + right * theta.cos() + forward * theta.sin();

            // Hemisphere clip: skip segments starting behind the pivot
            // plane that faces the camera.
            if !depth_test || to_camera.dot(last_point - origin) > 0.0 {
                let center = (last_point + next_point) * 0.5;
                let up_direction = geometry::normalized_or_zero(center - origin);
                add_box_between(last_point, next_point, up_direction, axis, width, out);
            }

            last_point = next_point;
        }
    }
}

/// Thin box from `start`, extending `length` along `axis_direction`.
fn add_box(
    start: Vector3<f32>,
    axis_direction: Vector3<f32>,
    other1: Vector3<f32>,
    other2: Vector3<f32>,
    length: f32,
    width: f32,
    out: &mut Vec<Vector3<f32>>,
) {
    let end = start + axis_direction * length;
    add_box_between(start, end, other1, other2, width, out);
}

/// Box between two cross-sections: both caps plus the four side quads.
fn add_box_between(
    start: Vector3<f32>,
    end: Vector3<f32>,
    other1: Vector3<f32>,
    other2: Vector3<f32>,
    width: f32,
    out: &mut Vec<Vector3<f32>>,
) {
    let base = Quad::spanned(start, other1, other2, width);
    let cap = Quad::spanned(end, other1, other2, width);

    out.extend([
        base.bottom_left,
        base.top_left,
        base.top_right,
        base.bottom_right,
    ]);
    out.extend([
        cap.bottom_left,
        cap.top_left,
        cap.top_right,
        cap.bottom_right,
    ]);

    for i in 0..4 {
        out.push(base.corner(i));
        out.push(cap.corner(i));
        out.push(cap.corner(i + 1));
        out.push(base.corner(i + 1));
    }
}

/// Cube of side `size` starting at `start` (a box whose length equals its
/// cross-section).
fn add_tip_box(
    start: Vector3<f32>,
    axis_direction: Vector3<f32>,
    other1: Vector3<f32>,
    other2: Vector3<f32>,
    size: f32,
    out: &mut Vec<Vector3<f32>>,
) {
    add_box(start, axis_direction, other1, other2, size, size * 0.5, out);
}

/// Single quad spanned around `center`.
fn add_plane_quad(
    center: Vector3<f32>,
    other1: Vector3<f32>,
    other2: Vector3<f32>,
    size: f32,
    out: &mut Vec<Vector3<f32>>,
) {
    let quad = Quad::spanned(center, other1, other2, size);
    out.extend([
        quad.bottom_left,
        quad.top_left,
        quad.top_right,
        quad.bottom_right,
    ]);
}

/// Arrow tip: base square plus four triangles meeting at the tip point.
fn add_triangle_fan(
    base_center: Vector3<f32>,
    axis_direction: Vector3<f32>,
    other1: Vector3<f32>,
    other2: Vector3<f32>,
    size: f32,
    out: &mut Vec<Vector3<f32>>,
) {
    let tip = base_center + axis_direction * (size * 2.0);
    let base = Quad::spanned(base_center, other1, other2, size / 2.0);

    out.extend([
        base.bottom_left,
        base.top_left,
        base.top_right,
        base.top_left,
        base.bottom_right,
        base.top_right,
    ]);
    for i in 0..4 {
        out.push(base.corner(i));
        out.push(base.corner(i + 1));
        out.push(tip);
    }
}

#[cfg(test)]
mod tests {
    use cgmath::Zero;

    use crate::gizmo::config::GizmoConfig;
    use crate::scene::{BasicSceneGraph, Viewpoint};

    use super::*;

    fn prepared_state(transform_type: TransformType) -> GizmoState {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);

        let mut state = GizmoState::new(GizmoConfig::default());
        state.transform_type = transform_type;
        state.translating_type = transform_type;
        state.execute_add_target(&scene, node);
        state.view = Viewpoint::looking_at(
            Vector3::new(0.0, 0.0, 10.0),
            Vector3::zero(),
            Vector3::unit_y(),
        );
        state.set_axis_info(&scene);
        state
    }

    #[test]
    fn test_move_mode_builds_lines_planes_triangles() {
        let mut state = prepared_state(TransformType::Move);
        state.rebuild_handles();

        let handles = state.handles();
        assert!(!handles.lines.x.is_empty());
        assert!(!handles.planes.y.is_empty());
        assert!(!handles.triangles.z.is_empty());
        assert!(handles.squares.is_empty());
        assert!(handles.circles.is_empty());
    }

    #[test]
    fn test_scale_mode_builds_boxes_including_uniform() {
        let mut state = prepared_state(TransformType::Scale);
        state.rebuild_handles();

        let handles = state.handles();
        assert!(!handles.squares.x.is_empty());
        assert!(!handles.squares.all.is_empty());
        assert!(!handles.lines.x.is_empty());
        assert!(handles.planes.is_empty());
        assert!(handles.triangles.is_empty());
    }

    #[test]
    fn test_rotate_mode_builds_circles() {
        let mut state = prepared_state(TransformType::Rotate);
        state.rebuild_handles();

        let handles = state.handles();
        assert!(!handles.circles.x.is_empty());
        assert!(!handles.circles.all.is_empty());
        assert!(handles.lines.is_empty());
    }

    #[test]
    fn test_handle_size_scales_with_camera_distance() {
        let mut near = prepared_state(TransformType::Move);
        near.rebuild_handles();
        let near_tip = near.handles().triangles.x.last().copied().unwrap();

        let mut far = prepared_state(TransformType::Move);
        far.view = Viewpoint::looking_at(
            Vector3::new(0.0, 0.0, 20.0),
            Vector3::zero(),
            Vector3::unit_y(),
        );
        far.rebuild_handles();
        let far_tip = far.handles().triangles.x.last().copied().unwrap();

        assert!(far_tip.x > near_tip.x * 1.5);
    }

    #[test]
    fn test_rebuild_overwrites_previous_buffers() {
        let mut state = prepared_state(TransformType::Move);
        state.rebuild_handles();
        let first_len = state.handles().lines.x.len();
        state.rebuild_handles();
        assert_eq!(state.handles().lines.x.len(), first_len);
    }
}
