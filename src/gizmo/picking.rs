//! Near-axis resolution: which handle the pointer ray is over.
//!
//! Runs once per frame while no drag is active. Priority order matters:
//! scale boxes are tested before move handles (the move planes would
//! otherwise occlude the uniform-scale box at the pivot), move planes before
//! arrow tips (planes are easier to grab that way), then the shared axis
//! lines with move priority, then rotation circles, and finally the inner
//! omni-rotation disk around the pivot.

use cgmath::{InnerSpace, Vector3};

use crate::math::{geometry, Ray};

use super::axis::AxisPoints;
use super::config::{Axis, TransformType};
use super::state::GizmoState;

/// Per-axis closest distances from the ray to one shape buffer.
struct AxisDistances {
    x: f32,
    y: f32,
    z: f32,
    all: f32,
}

impl GizmoState {
    /// Re-resolve the near axis for this frame. Does nothing during a drag;
    /// resets to no axis when nothing is selected or nothing is hit.
    pub(crate) fn update_near_axis(&mut self, ray: &Ray) {
        if self.is_transforming() {
            return;
        }

        self.set_translating_axis(self.transform_type, Axis::None, Axis::None);
        if self.main_target().is_none() {
            return;
        }

        let (ty, axis, plane) = self.pick_axis(ray);
        self.set_translating_axis(ty, axis, plane);
    }

    fn pick_axis(&self, ray: &Ray) -> (TransformType, Axis, Axis) {
        let distance_multiplier = self.distance_multiplier();
        let line_tolerance = (self.config.min_selected_distance_check + self.config.handle_width)
            * distance_multiplier;

        if self.transform_type_contains(TransformType::Move)
            || self.transform_type_contains(TransformType::Scale)
        {
            // Scale boxes first: in `All` mode the move planes would
            // otherwise block the uniform-scale box sitting on the pivot.
            if self.transform_type_contains(TransformType::Scale) {
                let tolerance = (self.config.min_selected_distance_check + self.config.box_size)
                    * distance_multiplier;
                let distances = plane_distances(&self.handles.squares, ray);
                let axis = self.resolve(TransformType::Scale, &distances, tolerance, ray);
                if !axis.is_none() {
                    return (TransformType::Scale, axis, Axis::None);
                }
            }

            if self.transform_type_contains(TransformType::Move) {
                // Planes before arrow tips so they stay easy to grab.
                let tolerance = (self.config.min_selected_distance_check + self.config.plane_size)
                    * distance_multiplier;
                let distances = plane_distances(&self.handles.planes, ray);
                let axis = self.resolve(TransformType::Move, &distances, tolerance, ray);
                if !axis.is_none() {
                    return (TransformType::Move, axis, axis);
                }

                let tolerance = (self.config.min_selected_distance_check
                    + self.config.triangle_size)
                    * distance_multiplier;
                let distances = line_distances(&self.handles.triangles, ray);
                let axis = self.resolve(TransformType::Move, &distances, tolerance, ray);
                if !axis.is_none() {
                    return (TransformType::Move, axis, Axis::None);
                }
            }

            // Move and scale share the axis lines; move wins in `All` mode.
            let line_type = if self.transform_type == TransformType::All {
                TransformType::Move
            } else {
                self.transform_type
            };
            let distances = line_distances(&self.handles.lines, ray);
            let axis = self.resolve(line_type, &distances, line_tolerance, ray);
            if !axis.is_none() {
                return (line_type, axis, Axis::None);
            }
        }

        if self.transform_type_contains(TransformType::Rotate) {
            let distances = line_distances(&self.handles.circles, ray);
            let axis = self.resolve(TransformType::Rotate, &distances, line_tolerance, ray);
            if !axis.is_none() {
                return (TransformType::Rotate, axis, Axis::None);
            }
        }

        (self.transform_type, Axis::None, Axis::None)
    }

    /// Nearest axis within tolerance; ties break x, y, z. Scale resolves the
    /// aggregate buffer to the omni axis; rotate falls back to the inner
    /// disk around the pivot.
    fn resolve(
        &self,
        ty: TransformType,
        distances: &AxisDistances,
        tolerance: f32,
        ray: &Ray,
    ) -> Axis {
        if ty == TransformType::Scale && distances.all <= tolerance {
            return Axis::Omni;
        }
        if distances.x <= tolerance && distances.x <= distances.y && distances.x <= distances.z {
            return Axis::X;
        }
        if distances.y <= tolerance && distances.y <= distances.x && distances.y <= distances.z {
            return Axis::Y;
        }
        if distances.z <= tolerance && distances.z <= distances.x && distances.z <= distances.y {
            return Axis::Z;
        }

        if ty == TransformType::Rotate {
            // Free-rotation disk: a hit on the camera-facing plane within
            // the rotate handle radius of the pivot.
            let to_camera = geometry::normalized_or_zero(self.view.position - self.pivot_point);
            if let Some(hit) = geometry::line_plane_intersect(
                ray.origin,
                ray.direction,
                self.pivot_point,
                to_camera,
            ) {
                let radius = self.handle_length(TransformType::Rotate, Axis::None, true);
                if (self.pivot_point - hit).magnitude2() <= radius * radius {
                    return Axis::Omni;
                }
            }
        }

        Axis::None
    }
}

fn line_distances(points: &AxisPoints, ray: &Ray) -> AxisDistances {
    AxisDistances {
        x: closest_distance_to_lines(&points.x, ray),
        y: closest_distance_to_lines(&points.y, ray),
        z: closest_distance_to_lines(&points.z, ray),
        all: closest_distance_to_lines(&points.all, ray),
    }
}

fn plane_distances(points: &AxisPoints, ray: &Ray) -> AxisDistances {
    AxisDistances {
        x: closest_distance_to_planes(&points.x, ray),
        y: closest_distance_to_planes(&points.y, ray),
        z: closest_distance_to_planes(&points.z, ray),
        all: closest_distance_to_planes(&points.all, ray),
    }
}

/// Closest distance from the ray to the polyline over consecutive point
/// pairs. Empty buffers report max distance and never match.
fn closest_distance_to_lines(points: &[Vector3<f32>], ray: &Ray) -> f32 {
    let mut closest = f32::MAX;
    for pair in points.windows(2) {
        let distance = geometry::segment_ray_distance(pair[0], pair[1], ray);
        if distance < closest {
            closest = distance;
        }
    }
    closest
}

/// Closest planar distance from each quad's center to the ray/quad-plane
/// intersection point. Quads are consecutive 4-point chunks.
fn closest_distance_to_planes(points: &[Vector3<f32>], ray: &Ray) -> f32 {
    let mut closest = f32::MAX;
    for quad in points.chunks_exact(4) {
        let normal = geometry::normalized_or_zero((quad[1] - quad[0]).cross(quad[2] - quad[0]));
        let Some(t) = geometry::ray_plane_distance(ray, quad[0], normal) else {
            continue;
        };

        let hit = ray.point_at(t);
        let center = (quad[0] + quad[1] + quad[2] + quad[3]) / 4.0;
        let distance = (center - hit).magnitude();
        if distance < closest {
            closest = distance;
        }
    }
    closest
}

#[cfg(test)]
mod tests {
    use cgmath::Zero;

    use crate::gizmo::config::{GizmoConfig, TransformSpace};
    use crate::scene::{BasicSceneGraph, Viewpoint};

    use super::*;

    fn camera() -> Vector3<f32> {
        Vector3::new(4.0, 3.0, 10.0)
    }

    fn ray_to(target: Vector3<f32>) -> Ray {
        Ray::new(camera(), target - camera())
    }

    fn prepared_state(transform_type: TransformType, space: TransformSpace) -> GizmoState {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);

        let mut state = GizmoState::new(GizmoConfig::default());
        state.transform_type = transform_type;
        state.translating_type = transform_type;
        state.space = space;
        state.execute_add_target(&scene, node);
        state.view = Viewpoint::looking_at(camera(), Vector3::zero(), Vector3::unit_y());
        state.set_axis_info(&scene);
        state.rebuild_handles();
        state
    }

    #[test]
    fn test_scale_box_wins_over_move_handles_in_combined_mode() {
        // Combined mode, local space so scale handles are active. A ray
        // through the pivot is inside both the uniform-scale box and the
        // move axis lines; the scale box has priority.
        let mut state = prepared_state(TransformType::All, TransformSpace::Local);
        state.update_near_axis(&ray_to(Vector3::zero()));

        assert_eq!(state.near_axis(), Axis::Omni);
        assert_eq!(state.transforming_type(), TransformType::Scale);
    }

    #[test]
    fn test_arrow_tip_picks_move_axis() {
        let mut state = prepared_state(TransformType::Move, TransformSpace::Global);
        // Arrow tip sits at handle end (2.0) plus twice the triangle size.
        state.update_near_axis(&ray_to(Vector3::new(2.4, 0.0, 0.0)));

        assert_eq!(state.near_axis(), Axis::X);
        assert_eq!(state.transforming_type(), TransformType::Move);
        assert!(!state.has_plane_axis());
    }

    #[test]
    fn test_axis_line_picks_move_axis() {
        let mut state = prepared_state(TransformType::Move, TransformSpace::Global);
        state.update_near_axis(&ray_to(Vector3::new(1.0, 0.0, 0.0)));

        assert_eq!(state.near_axis(), Axis::X);
        assert!(!state.has_plane_axis());
    }

    #[test]
    fn test_plane_quad_records_plane_axis() {
        let mut state = prepared_state(TransformType::Move, TransformSpace::Global);
        // The z plane quad is offset toward the camera along +x and +y.
        state.update_near_axis(&ray_to(Vector3::new(0.3, 0.3, 0.0)));

        assert_eq!(state.near_axis(), Axis::Z);
        assert_eq!(state.plane_axis(), Axis::Z);
        assert!(state.has_plane_axis());
    }

    #[test]
    fn test_rotation_circle_picks_axis() {
        let mut state = prepared_state(TransformType::Rotate, TransformSpace::Global);
        // A point on the camera-facing half of the z circle (radius 2).
        let target = Vector3::new(2.0 * 0.7071, 2.0 * 0.7071, 0.0);
        state.update_near_axis(&ray_to(target));

        assert_eq!(state.near_axis(), Axis::Z);
        assert_eq!(state.transforming_type(), TransformType::Rotate);
    }

    #[test]
    fn test_inner_disk_picks_omni_rotation() {
        let mut state = prepared_state(TransformType::Rotate, TransformSpace::Global);
        state.update_near_axis(&ray_to(Vector3::zero()));

        assert_eq!(state.near_axis(), Axis::Omni);
    }

    #[test]
    fn test_distant_ray_picks_nothing() {
        let mut state = prepared_state(TransformType::Move, TransformSpace::Global);
        state.update_near_axis(&ray_to(Vector3::new(50.0, 50.0, 0.0)));

        assert_eq!(state.near_axis(), Axis::None);
    }

    #[test]
    fn test_picking_is_suspended_during_drag() {
        let mut state = prepared_state(TransformType::Move, TransformSpace::Global);
        state.update_near_axis(&ray_to(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(state.near_axis(), Axis::X);

        state.drag = Some(crate::gizmo::drag::DragSession::idle_for_tests());
        state.update_near_axis(&ray_to(Vector3::new(50.0, 50.0, 0.0)));
        assert_eq!(state.near_axis(), Axis::X);
    }
}
