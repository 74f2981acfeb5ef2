//! The per-drag state machine.
//!
//! A [`DragSession`] is created on pointer press over a picked axis and
//! destroyed on release. Each frame while the pointer stays pressed the host
//! calls `step_drag`; the session intersects the pointer ray with the drag
//! plane, turns the intersection delta into a move/rotate/scale delta
//! (optionally snapped), and applies it to every selected root. Release
//! commits the accumulated change to history. There is no rollback path;
//! only an explicit undo reverses a drag.

use cgmath::{Deg, Euler, InnerSpace, Quaternion, Rotation, Rotation3, Vector2, Vector3, Zero};
use log::trace;

use crate::history::commands::TransformCommand;
use crate::math::{geometry, Ray};
use crate::scene::{self, NodeId, SceneGraph};

use super::config::{Axis, ScaleType, TransformPivot, TransformSpace, TransformType};
use super::state::GizmoState;

/// Pointer state for one drag step.
#[derive(Debug, Clone, Copy)]
pub struct DragInput {
    /// World ray under the pointer.
    pub ray: Ray,
    /// Raw pointer movement since the previous frame, in screen units.
    /// Drives free (omni) rotation only.
    pub screen_delta: Vector2<f32>,
    /// Whether the snap modifier is held this frame.
    pub snapping: bool,
}

impl DragInput {
    pub fn new(ray: Ray) -> Self {
        Self {
            ray,
            screen_delta: Vector2::zero(),
            snapping: false,
        }
    }

    pub fn with_screen_delta(mut self, delta: Vector2<f32>) -> Self {
        self.screen_delta = delta;
        self
    }

    pub fn with_snapping(mut self, snapping: bool) -> Self {
        self.snapping = snapping;
        self
    }
}

/// Ephemeral state of an active manipulation.
pub(crate) struct DragSession {
    ty: TransformType,
    axis: Axis,
    plane_axis: Axis,

    original_pivot: Vector3<f32>,
    axis_direction: Vector3<f32>,
    other_axis1: Vector3<f32>,
    other_axis2: Vector3<f32>,
    /// Normal of the drag plane: the picked axis for plane-constrained
    /// moves, otherwise the pivot-to-camera direction.
    plane_normal: Vector3<f32>,
    /// Picked axis projected onto the drag plane; movement along the axis
    /// line is measured against this.
    projected_axis: Vector3<f32>,

    previous_intersection: Option<Vector3<f32>>,

    snap_movement: Vector3<f32>,
    snap_rotation: f32,
    snap_scale: f32,

    commands: Vec<TransformCommand>,
}

impl DragSession {
    /// Snapshot everything the drag needs from the current pick and
    /// selection, including per-root starting poses for undo.
    pub(crate) fn begin(state: &GizmoState, scene: &dyn SceneGraph, ray: &Ray) -> Self {
        let (axis_direction, other_axis1, other_axis2) = state.near_axis_direction();
        let original_pivot = state.pivot_point();

        let has_plane = state.has_plane_axis();
        let plane_normal = if has_plane {
            axis_direction
        } else {
            geometry::normalized_or_zero(state.view.position - original_pivot)
        };
        let projected_axis =
            geometry::normalized_or_zero(geometry::project_on_plane(axis_direction, plane_normal));

        let commands = state
            .selection()
            .roots()
            .iter()
            .map(|&root| TransformCommand::begin(scene, root))
            .collect();

        Self {
            ty: state.transforming_type(),
            axis: state.near_axis(),
            plane_axis: state.plane_axis(),
            original_pivot,
            axis_direction,
            other_axis1,
            other_axis2,
            plane_normal,
            projected_axis,
            previous_intersection: geometry::line_plane_intersect(
                ray.origin,
                ray.direction,
                original_pivot,
                plane_normal,
            ),
            snap_movement: Vector3::zero(),
            snap_rotation: 0.0,
            snap_scale: 0.0,
            commands,
        }
    }

    pub(crate) fn into_commands(self) -> Vec<TransformCommand> {
        self.commands
    }

    fn has_plane_axis(&self) -> bool {
        !matches!(self.plane_axis, Axis::None | Axis::Omni)
    }

    /// Advance one frame. Degenerate intersections (ray parallel to the
    /// drag plane) only record state; the first step after `begin` applies
    /// the delta from the press-time intersection.
    pub(crate) fn step(
        &mut self,
        state: &mut GizmoState,
        scene: &mut dyn SceneGraph,
        input: &DragInput,
    ) {
        let intersection = geometry::line_plane_intersect(
            input.ray.origin,
            input.ray.direction,
            self.original_pivot,
            self.plane_normal,
        );

        if let (Some(previous), Some(current)) = (self.previous_intersection, intersection) {
            match self.ty {
                TransformType::Move => {
                    self.step_move(state, scene, previous, current, input.snapping)
                }
                TransformType::Scale => {
                    self.step_scale(state, scene, previous, current, input.snapping)
                }
                TransformType::Rotate => self.step_rotate(state, scene, previous, current, input),
                // Picking always resolves a concrete type before a drag can
                // begin.
                TransformType::All => debug_assert!(false, "drag started with composite type"),
            }
        }

        self.previous_intersection = intersection;
    }

    fn step_move(
        &mut self,
        state: &mut GizmoState,
        scene: &mut dyn SceneGraph,
        previous: Vector3<f32>,
        current: Vector3<f32>,
        snapping: bool,
    ) {
        let mut movement = if self.has_plane_axis() {
            current - previous
        } else {
            let amount = geometry::magnitude_in_direction(current - previous, self.projected_axis)
                * state.config.move_speed_multiplier;
            self.axis_direction * amount
        };

        if snapping && state.config.movement_snap > 0.0 {
            self.snap_movement += movement;
            movement = Vector3::zero();

            if self.has_plane_axis() {
                // Two independent accumulations along the plane's axes.
                for other_axis in [self.other_axis1, self.other_axis2] {
                    let accumulated =
                        geometry::magnitude_in_direction(self.snap_movement, other_axis);
                    let (snapped, _) = calculate_snap(state.config.movement_snap, accumulated);
                    if snapped != 0.0 {
                        let snap_move = other_axis * snapped;
                        movement += snap_move;
                        self.snap_movement -= snap_move;
                    }
                }
            } else {
                let (snapped, remainder) =
                    calculate_snap(state.config.movement_snap, self.snap_movement.magnitude());
                if snapped != 0.0 {
                    let direction = geometry::normalized_or_zero(self.snap_movement);
                    movement = direction * snapped;
                    self.snap_movement = direction * remainder;
                }
            }
        }

        let roots: Vec<NodeId> = state.selection().roots().to_vec();
        for root in roots {
            scene::translate_world(scene, root, movement);
        }
        state.set_pivot_offset(movement);
    }

    fn step_scale(
        &mut self,
        state: &mut GizmoState,
        scene: &mut dyn SceneGraph,
        previous: Vector3<f32>,
        current: Vector3<f32>,
        snapping: bool,
    ) {
        let projected = if self.axis == Axis::Omni {
            state.view.right
        } else {
            self.projected_axis
        };
        let mut scale_amount = geometry::magnitude_in_direction(current - previous, projected)
            * state.config.scale_speed_multiplier;

        if snapping && state.config.scale_snap > 0.0 {
            self.snap_scale += scale_amount;
            let (snapped, remainder) = calculate_snap(state.config.scale_snap, self.snap_scale);
            scale_amount = snapped;
            self.snap_scale = remainder;
        }

        let Some(main) = state.main_target() else {
            return;
        };

        let local_axis = if state.proper_space() == TransformSpace::Local && self.axis != Axis::Omni
        {
            scene
                .pose(main)
                .rotation
                .invert()
                .rotate_vector(self.axis_direction)
        } else {
            self.axis_direction
        };

        // Uniform scaling distributes the delta along the magnitude of the
        // main target's current scale; the sign is deliberately discarded
        // (mirrored targets drag the same way as unmirrored ones).
        let scale_delta = if self.axis == Axis::Omni {
            abs(geometry::normalized_or_zero(scene.pose(main).scale)) * scale_amount
        } else {
            local_axis * scale_amount
        };

        let roots: Vec<NodeId> = state.selection().roots().to_vec();
        for root in roots {
            let pose = scene.pose(root);
            let target_scale = pose.scale + scale_delta;

            match state.pivot_mode {
                TransformPivot::Pivot => {
                    let mut updated = pose;
                    updated.scale = target_scale;
                    scene.set_pose(root, updated);
                }
                TransformPivot::Center => match state.scale_type {
                    ScaleType::FromPoint => {
                        scene::scale_from_point(scene, root, self.original_pivot, target_scale)
                    }
                    ScaleType::FromPointOffset => scene::scale_from_point_offset(
                        scene,
                        root,
                        self.original_pivot,
                        target_scale,
                    ),
                },
            }
        }

        state.total_scale += scale_amount;
    }

    fn step_rotate(
        &mut self,
        state: &mut GizmoState,
        scene: &mut dyn SceneGraph,
        previous: Vector3<f32>,
        current: Vector3<f32>,
        input: &DragInput,
    ) {
        let mut rotation_axis = self.axis_direction;
        let mut rotate_amount;

        if self.axis == Axis::Omni {
            // Re-express the 2D pointer motion in camera space and read it
            // as an Euler rotation: vertical motion tilts, horizontal pans.
            let euler = state.view.right * input.screen_delta.y
                + state.view.up * -input.screen_delta.x;
            let rotation =
                Quaternion::from(Euler::new(Deg(euler.x), Deg(euler.y), Deg(euler.z)));
            let (angle, axis) = geometry::to_angle_axis(rotation);
            rotate_amount = angle * state.config.omni_rotate_speed_multiplier;
            rotation_axis = axis;
        } else if state.config.circular_rotation_method {
            rotate_amount = geometry::signed_angle_deg(
                previous - self.original_pivot,
                current - self.original_pivot,
                self.axis_direction,
            ) * state.config.rotate_speed_multiplier;
        } else {
            let projected = if geometry::is_parallel(self.axis_direction, self.plane_normal) {
                self.plane_normal
            } else {
                self.axis_direction.cross(self.plane_normal)
            };
            rotate_amount = geometry::magnitude_in_direction(current - previous, projected)
                * (state.config.rotate_speed_multiplier * 100.0)
                / state.distance_multiplier();
        }

        if input.snapping && state.config.rotation_snap > 0.0 {
            self.snap_rotation += rotate_amount;
            let (snapped, remainder) =
                calculate_snap(state.config.rotation_snap, self.snap_rotation);
            rotate_amount = snapped;
            self.snap_rotation = remainder;
        }

        if rotate_amount == 0.0 || rotation_axis.magnitude2() < geometry::EPSILON {
            return;
        }

        let roots: Vec<NodeId> = state.selection().roots().to_vec();
        for root in roots {
            match state.pivot_mode {
                TransformPivot::Pivot => {
                    scene::rotate_world(scene, root, rotation_axis, rotate_amount)
                }
                TransformPivot::Center => scene::rotate_around(
                    scene,
                    root,
                    self.original_pivot,
                    rotation_axis,
                    rotate_amount,
                ),
            }
        }

        state.total_rotation = state.total_rotation
            * Quaternion::from_axis_angle(rotation_axis.normalize(), Deg(rotate_amount));
        trace!("rotate step: {rotate_amount:.3} deg");
    }

    #[cfg(test)]
    pub(crate) fn idle_for_tests() -> Self {
        Self {
            ty: TransformType::Move,
            axis: Axis::None,
            plane_axis: Axis::None,
            original_pivot: Vector3::zero(),
            axis_direction: Vector3::zero(),
            other_axis1: Vector3::zero(),
            other_axis2: Vector3::zero(),
            plane_normal: Vector3::unit_z(),
            projected_axis: Vector3::zero(),
            previous_intersection: None,
            snap_movement: Vector3::zero(),
            snap_rotation: 0.0,
            snap_scale: 0.0,
            commands: Vec::new(),
        }
    }
}

fn abs(v: Vector3<f32>) -> Vector3<f32> {
    v.map(f32::abs)
}

/// Emit the portion of `amount` that is a whole multiple of `increment`,
/// returning `(emitted, remainder)`.
///
/// A non-positive increment passes the full amount through. The remainder
/// carries the accumulator's sign, so emitted + remainder always equals the
/// input exactly.
pub fn calculate_snap(increment: f32, amount: f32) -> (f32, f32) {
    if increment <= 0.0 {
        return (amount, 0.0);
    }

    let steps = (amount.abs() / increment).floor();
    if steps < 1.0 {
        return (0.0, amount);
    }

    let emitted = amount.signum() * steps * increment;
    (emitted, amount - emitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_emits_whole_increments() {
        let (emitted, remainder) = calculate_snap(5.0, 12.0);
        assert_eq!(emitted, 10.0);
        assert_eq!(remainder, 2.0);
    }

    #[test]
    fn test_snap_zero_increment_passes_through() {
        let (emitted, remainder) = calculate_snap(0.0, 12.0);
        assert_eq!(emitted, 12.0);
        assert_eq!(remainder, 0.0);

        let (emitted, remainder) = calculate_snap(-1.0, 7.5);
        assert_eq!(emitted, 7.5);
        assert_eq!(remainder, 0.0);
    }

    #[test]
    fn test_snap_holds_below_one_increment() {
        let (emitted, remainder) = calculate_snap(5.0, 3.0);
        assert_eq!(emitted, 0.0);
        assert_eq!(remainder, 3.0);
    }

    #[test]
    fn test_snap_exact_multiple_emits_fully() {
        let (emitted, remainder) = calculate_snap(5.0, 5.0);
        assert_eq!(emitted, 5.0);
        assert_eq!(remainder, 0.0);
    }

    #[test]
    fn test_snap_preserves_sign() {
        let (emitted, remainder) = calculate_snap(5.0, -12.0);
        assert_eq!(emitted, -10.0);
        assert_eq!(remainder, -2.0);
    }

    #[test]
    fn test_snap_accumulation_conserves_input() {
        // Feeding 3 per step with increment 5: accumulator runs
        // 3, 6 -> 1, 4, 7 -> 2; emissions 0, 5, 0, 5.
        let mut accumulator = 0.0;
        let mut emissions = Vec::new();
        for _ in 0..4 {
            accumulator += 3.0;
            let (emitted, remainder) = calculate_snap(5.0, accumulator);
            accumulator = remainder;
            emissions.push(emitted);
        }

        assert_eq!(emissions, vec![0.0, 5.0, 0.0, 5.0]);
        assert_eq!(accumulator, 2.0);
        let total: f32 = emissions.iter().sum::<f32>() + accumulator;
        assert!((total - 12.0).abs() < 1e-6);
    }
}
