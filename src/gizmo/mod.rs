//! # Transform Gizmo Engine
//!
//! The manipulation engine behind an interactive move/rotate/scale widget.
//! It owns the selection, the pivot, the handle geometry buffers, and the
//! undo/redo history; the host owns the scene graph, the camera, rendering,
//! and input.
//!
//! ## Architecture
//!
//! [`TransformGizmo`] is the facade the host talks to. Internally it splits
//! into [`GizmoState`] (selection, pivot, axis basis, handle buffers, drag
//! totals) and the history engine, so commands can mutate the state while
//! the history drives them. Per frame, the host feeds a camera
//! [`Viewpoint`](crate::scene::Viewpoint) and the pointer ray into
//! [`TransformGizmo::update`], which recomputes the axis basis, rebuilds the
//! handle buffers, and, while no drag is active, resolves which axis the
//! pointer is near. Pointer press/hold/release map onto
//! [`TransformGizmo::begin_drag`], [`TransformGizmo::step_drag`], and
//! [`TransformGizmo::end_drag`].
//!
//! ## Usage
//!
//! ```no_run
//! use claymore::prelude::*;
//! use cgmath::{Vector3, Zero};
//!
//! let mut scene = BasicSceneGraph::new();
//! let node = scene.add_node(None);
//!
//! let mut gizmo = TransformGizmo::new(GizmoConfig::default());
//! gizmo.add_target(&mut scene, node, true).unwrap();
//!
//! let view = Viewpoint::looking_at(Vector3::new(4.0, 3.0, 10.0), Vector3::zero(), Vector3::unit_y());
//! let ray = Ray::new(view.position, -view.position);
//! gizmo.update(&scene, view, &ray);
//!
//! if gizmo.begin_drag(&scene, &ray) {
//!     gizmo.step_drag(&mut scene, &DragInput::new(ray));
//!     gizmo.end_drag(&mut scene);
//! }
//! gizmo.undo(&mut scene);
//! ```

pub mod axis;
pub mod config;
pub mod drag;
pub mod handles;
pub mod picking;
pub mod selection;
pub mod state;

use cgmath::{One, Quaternion, Vector3};
use log::debug;

use crate::error::GizmoError;
use crate::history::commands::{
    AddTargetCommand, ClearAndAddTargetCommand, ClearTargetsCommand, CommandGroup, DeleteCommand,
    RemoveTargetCommand,
};
use crate::history::UndoRedo;
use crate::math::Ray;
use crate::scene::{NodeId, SceneGraph, Viewpoint};

pub use axis::{AxisInfo, AxisPoints, HandleVertex, Quad};
pub use config::{
    Axis, CenterType, GizmoConfig, ScaleType, TransformPivot, TransformSpace, TransformType,
};
pub use drag::{calculate_snap, DragInput};
use drag::DragSession;
pub use handles::HandleGeometry;
pub use selection::{SelectionSet, TargetInfo};
pub use state::GizmoState;

/// Callback invoked synchronously with `(current, new)` before a
/// manipulation-mode change commits.
pub type TransformTypeObserver = Box<dyn FnMut(TransformType, TransformType)>;

/// The manipulation engine. One instance per independent selection/history
/// domain; instances never share state.
pub struct TransformGizmo {
    state: GizmoState,
    history: UndoRedo,
    mode_observers: Vec<TransformTypeObserver>,
}

impl TransformGizmo {
    pub fn new(config: GizmoConfig) -> Self {
        let capacity = config.max_undo_stored;
        Self {
            state: GizmoState::new(config),
            history: UndoRedo::new(capacity),
            mode_observers: Vec::new(),
        }
    }

    // --- selection -------------------------------------------------------

    /// Select `node` as a root. Errors on ids the scene does not contain;
    /// silently ignores nodes that are already roots or already ride along
    /// as a root's descendant.
    pub fn add_target(
        &mut self,
        scene: &mut dyn SceneGraph,
        node: NodeId,
        record_history: bool,
    ) -> Result<(), GizmoError> {
        if !scene.contains(node) {
            return Err(GizmoError::UnknownNode(node));
        }
        if self.state.selection.is_root(node) || self.state.selection.is_excluded(node) {
            return Ok(());
        }

        if record_history {
            // Captured before mutating: undo must restore roots this add
            // demotes.
            let command = AddTargetCommand::new(node, self.state.selection.roots().to_vec());
            self.history.insert(Box::new(command), scene);
        }
        self.state.execute_add_target(scene, node);
        Ok(())
    }

    /// Deselect `node`. Errors on unknown ids; silently ignores nodes that
    /// are not currently roots.
    pub fn remove_target(
        &mut self,
        scene: &mut dyn SceneGraph,
        node: NodeId,
        record_history: bool,
    ) -> Result<(), GizmoError> {
        if !scene.contains(node) {
            return Err(GizmoError::UnknownNode(node));
        }
        if !self.state.selection.is_root(node) {
            return Ok(());
        }

        if record_history {
            self.history
                .insert(Box::new(RemoveTargetCommand::new(node)), scene);
        }
        self.state.execute_remove_target(scene, node);
        Ok(())
    }

    /// Deselect everything.
    pub fn clear_targets(&mut self, scene: &mut dyn SceneGraph, record_history: bool) {
        if self.state.selection.is_empty() {
            return;
        }
        if record_history {
            let command = ClearTargetsCommand::new(self.state.selection.roots().to_vec());
            self.history.insert(Box::new(command), scene);
        }
        self.state.execute_clear_targets();
    }

    /// Replace the whole selection with `node`, as a single history entry.
    pub fn clear_and_add_target(
        &mut self,
        scene: &mut dyn SceneGraph,
        node: NodeId,
    ) -> Result<(), GizmoError> {
        if !scene.contains(node) {
            return Err(GizmoError::UnknownNode(node));
        }

        let command = ClearAndAddTargetCommand::new(node, self.state.selection.roots().to_vec());
        self.history.insert(Box::new(command), scene);

        self.state.execute_clear_targets();
        self.state.execute_add_target(scene, node);
        Ok(())
    }

    /// Delete every deletable selected root, through history. Returns how
    /// many nodes were deleted; non-deletable roots are skipped.
    pub fn delete_selected(&mut self, scene: &mut dyn SceneGraph) -> usize {
        let targets: Vec<NodeId> = self
            .state
            .selection
            .roots()
            .iter()
            .copied()
            .filter(|&node| scene.deletable(node))
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let count = targets.len();
        debug!("deleting {count} selected nodes");
        self.history
            .execute(Box::new(DeleteCommand::new(targets)), &mut self.state, scene);
        count
    }

    /// Delete one specific node through history. Unlike
    /// [`delete_selected`](Self::delete_selected) this refuses protected
    /// nodes loudly; deletion eligibility is part of the contract here.
    pub fn delete_target(
        &mut self,
        scene: &mut dyn SceneGraph,
        node: NodeId,
    ) -> Result<(), GizmoError> {
        if !scene.contains(node) {
            return Err(GizmoError::UnknownNode(node));
        }
        if !scene.deletable(node) {
            return Err(GizmoError::NotDeletable(node));
        }

        self.history.execute(
            Box::new(DeleteCommand::new(vec![node])),
            &mut self.state,
            scene,
        );
        Ok(())
    }

    // --- modes -------------------------------------------------------------

    pub fn transform_type(&self) -> TransformType {
        self.state.transform_type
    }

    /// Switch manipulation mode. Observers run synchronously with the old
    /// and new mode before the change commits.
    pub fn set_transform_type(&mut self, new_type: TransformType) {
        let current = self.state.transform_type;
        for observer in &mut self.mode_observers {
            observer(current, new_type);
        }
        self.state.transform_type = new_type;
    }

    /// Register a callback fired before every manipulation-mode change.
    pub fn on_transform_type_changing(&mut self, observer: TransformTypeObserver) {
        self.mode_observers.push(observer);
    }

    pub fn space(&self) -> TransformSpace {
        self.state.space
    }

    pub fn set_space(&mut self, space: TransformSpace) {
        self.state.space = space;
    }

    pub fn pivot_mode(&self) -> TransformPivot {
        self.state.pivot_mode
    }

    pub fn set_pivot_mode(&mut self, scene: &dyn SceneGraph, pivot: TransformPivot) {
        self.state.pivot_mode = pivot;
        self.state.set_pivot_point(scene);
    }

    pub fn center_type(&self) -> CenterType {
        self.state.center_type
    }

    pub fn set_center_type(&mut self, scene: &dyn SceneGraph, center_type: CenterType) {
        self.state.center_type = center_type;
        self.state.set_pivot_point(scene);
    }

    pub fn scale_type(&self) -> ScaleType {
        self.state.scale_type
    }

    pub fn set_scale_type(&mut self, scale_type: ScaleType) {
        self.state.scale_type = scale_type;
    }

    // --- history -----------------------------------------------------------

    pub fn undo(&mut self, scene: &mut dyn SceneGraph) -> bool {
        self.history.undo(&mut self.state, scene)
    }

    pub fn redo(&mut self, scene: &mut dyn SceneGraph) -> bool {
        self.history.redo(&mut self.state, scene)
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    /// Change the history depth; shrinking evicts (and cleans up) the
    /// oldest entries immediately.
    pub fn set_max_undo(&mut self, scene: &mut dyn SceneGraph, capacity: usize) {
        self.state.config.max_undo_stored = capacity;
        self.history.set_capacity(capacity, scene);
    }

    /// Drop the whole history without cleanup. Call this (together with
    /// [`clear_targets`](Self::clear_targets)) before restructuring the
    /// scene hierarchy outside the engine: recorded commands reference
    /// nodes by id and do not survive reparenting of selected subtrees.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // --- frame loop ----------------------------------------------------------

    /// Per-frame tick: store the viewpoint, refresh the axis basis, rebuild
    /// the handle buffers, and, when idle, resolve the near axis under the
    /// pointer. With nothing selected the buffers are cleared and nothing is
    /// picked.
    pub fn update(&mut self, scene: &dyn SceneGraph, view: Viewpoint, pointer_ray: &Ray) {
        self.state.view = view;

        if !self.state.is_transforming() {
            self.state.translating_type = self.state.transform_type;
        }

        if self.state.main_target().is_none() {
            self.state.handles.clear();
            if !self.state.is_transforming() {
                let ty = self.state.transform_type;
                self.state.set_translating_axis(ty, Axis::None, Axis::None);
            }
            return;
        }

        self.state.set_axis_info(scene);
        self.state.rebuild_handles();
        self.state.update_near_axis(pointer_ray);
    }

    /// Start a drag on the currently picked axis. Returns false (and does
    /// nothing) when no axis is picked, nothing is selected, or a drag is
    /// already active.
    pub fn begin_drag(&mut self, scene: &dyn SceneGraph, pointer_ray: &Ray) -> bool {
        if self.state.is_transforming()
            || self.state.near_axis().is_none()
            || self.state.main_target().is_none()
        {
            return false;
        }

        self.state.total_scale = 0.0;
        self.state.total_rotation = Quaternion::one();
        self.state.drag = Some(DragSession::begin(&self.state, scene, pointer_ray));
        debug!(
            "drag started: {:?} on {:?}",
            self.state.transforming_type(),
            self.state.near_axis()
        );
        true
    }

    /// Advance the active drag by one frame of pointer input. No-op while
    /// idle.
    pub fn step_drag(&mut self, scene: &mut dyn SceneGraph, input: &DragInput) {
        let Some(mut session) = self.state.drag.take() else {
            return;
        };
        session.step(&mut self.state, scene, input);
        self.state.drag = Some(session);
    }

    /// Finish the active drag: commit one composite pose-restore command to
    /// history, reset the drag totals and picked axis, and recompute the
    /// pivot from the scene. No-op while idle.
    pub fn end_drag(&mut self, scene: &mut dyn SceneGraph) {
        let Some(session) = self.state.drag.take() else {
            return;
        };

        let mut group = CommandGroup::new();
        for mut command in session.into_commands() {
            command.capture_new(scene);
            group.push(Box::new(command));
        }
        debug!("drag committed over {} targets", group.len());
        self.history.insert(Box::new(group), scene);

        self.state.total_rotation = Quaternion::one();
        self.state.total_scale = 0.0;
        let ty = self.state.transform_type;
        self.state.set_translating_axis(ty, Axis::None, Axis::None);
        self.state.set_pivot_point(scene);
    }

    // --- read accessors -----------------------------------------------------

    /// Full engine state, for read access beyond the shortcuts below.
    pub fn state(&self) -> &GizmoState {
        &self.state
    }

    pub fn is_transforming(&self) -> bool {
        self.state.is_transforming()
    }

    pub fn pivot_point(&self) -> Vector3<f32> {
        self.state.pivot_point()
    }

    pub fn near_axis(&self) -> Axis {
        self.state.near_axis()
    }

    pub fn plane_axis(&self) -> Axis {
        self.state.plane_axis()
    }

    pub fn has_plane_axis(&self) -> bool {
        self.state.has_plane_axis()
    }

    pub fn transforming_type(&self) -> TransformType {
        self.state.transforming_type()
    }

    /// Handle point buffers for rendering (and picking).
    pub fn handles(&self) -> &HandleGeometry {
        self.state.handles()
    }

    /// Nodes the renderer should outline.
    pub fn highlighted(&self) -> &std::collections::HashSet<NodeId> {
        self.state.highlighted()
    }

    pub fn selection(&self) -> &SelectionSet {
        self.state.selection()
    }

    pub fn main_target(&self) -> Option<NodeId> {
        self.state.main_target()
    }

    pub fn axis_info(&self) -> AxisInfo {
        self.state.axis_info()
    }

    pub fn total_scale(&self) -> f32 {
        self.state.total_scale()
    }

    pub fn total_rotation(&self) -> Quaternion<f32> {
        self.state.total_rotation()
    }
}

impl Default for TransformGizmo {
    fn default() -> Self {
        Self::new(GizmoConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector2, Zero};

    use crate::scene::{BasicSceneGraph, Pose};

    use super::*;

    fn camera() -> Vector3<f32> {
        Vector3::new(0.0, 0.0, 10.0)
    }

    fn view() -> Viewpoint {
        Viewpoint::looking_at(camera(), Vector3::zero(), Vector3::unit_y())
    }

    fn ray_to(target: Vector3<f32>) -> Ray {
        Ray::new(camera(), target - camera())
    }

    fn single_node_scene() -> (BasicSceneGraph, NodeId) {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);
        (scene, node)
    }

    /// Pick the X move line and start dragging along it.
    fn begin_x_move_drag(
        gizmo: &mut TransformGizmo,
        scene: &BasicSceneGraph,
    ) -> Ray {
        let grab = ray_to(Vector3::new(1.0, 0.0, 0.0));
        gizmo.update(scene, view(), &grab);
        assert_eq!(gizmo.near_axis(), Axis::X);
        assert!(gizmo.begin_drag(scene, &grab));
        grab
    }

    #[test]
    fn test_add_target_unknown_node_errors() {
        let (mut scene, _) = single_node_scene();
        let mut gizmo = TransformGizmo::default();
        assert_eq!(
            gizmo.add_target(&mut scene, NodeId(999), true),
            Err(GizmoError::UnknownNode(NodeId(999)))
        );
    }

    #[test]
    fn test_selection_history_round_trip() {
        let mut scene = BasicSceneGraph::new();
        let a = scene.add_node(None);
        let b = scene.add_node(None);

        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, a, true).unwrap();
        gizmo.add_target(&mut scene, b, true).unwrap();
        assert_eq!(gizmo.selection().roots(), &[a, b]);

        assert!(gizmo.undo(&mut scene));
        assert_eq!(gizmo.selection().roots(), &[a]);
        assert!(gizmo.undo(&mut scene));
        assert!(gizmo.selection().is_empty());

        assert!(gizmo.redo(&mut scene));
        assert_eq!(gizmo.selection().roots(), &[a]);
    }

    #[test]
    fn test_clear_and_add_is_one_history_entry() {
        let mut scene = BasicSceneGraph::new();
        let a = scene.add_node(None);
        let b = scene.add_node(None);
        let c = scene.add_node(None);

        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, a, false).unwrap();
        gizmo.add_target(&mut scene, b, false).unwrap();
        assert_eq!(gizmo.undo_depth(), 0);

        gizmo.clear_and_add_target(&mut scene, c).unwrap();
        assert_eq!(gizmo.undo_depth(), 1);
        assert_eq!(gizmo.selection().roots(), &[c]);

        assert!(gizmo.undo(&mut scene));
        assert_eq!(gizmo.selection().roots(), &[a, b]);
    }

    #[test]
    fn test_move_drag_translates_and_undo_restores_exactly() {
        let (mut scene, node) = single_node_scene();
        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, node, false).unwrap();
        let original = scene.pose(node);

        begin_x_move_drag(&mut gizmo, &scene);
        assert!(gizmo.is_transforming());

        // Drag plane is z=0 (camera looks down -z); slide one unit along x.
        gizmo.step_drag(
            &mut scene,
            &DragInput::new(ray_to(Vector3::new(2.0, 0.0, 0.0))),
        );
        let moved = scene.pose(node).position;
        assert!((moved.x - 1.0).abs() < 1e-4, "moved.x = {}", moved.x);
        assert!(moved.y.abs() < 1e-4);
        // Pivot rode along with the selection.
        assert!((gizmo.pivot_point().x - moved.x).abs() < 1e-5);

        gizmo.end_drag(&mut scene);
        assert!(!gizmo.is_transforming());
        assert_eq!(gizmo.near_axis(), Axis::None);
        assert_eq!(gizmo.undo_depth(), 1);

        assert!(gizmo.undo(&mut scene));
        assert_eq!(scene.pose(node), original);

        assert!(gizmo.redo(&mut scene));
        assert!((scene.pose(node).position.x - moved.x).abs() < 1e-6);
    }

    #[test]
    fn test_move_drag_snapping_accumulates_across_frames() {
        let (mut scene, node) = single_node_scene();
        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, node, false).unwrap();

        begin_x_move_drag(&mut gizmo, &scene);

        // Three 0.1-unit steps with a 0.25 snap increment: nothing moves
        // until the accumulator crosses 0.25.
        for (step, expected_x) in [(1.1, 0.0), (1.2, 0.0), (1.3, 0.25)] {
            gizmo.step_drag(
                &mut scene,
                &DragInput::new(ray_to(Vector3::new(step, 0.0, 0.0))).with_snapping(true),
            );
            let x = scene.pose(node).position.x;
            assert!(
                (x - expected_x).abs() < 1e-3,
                "after step to {step}: x = {x}, expected {expected_x}"
            );
        }
        gizmo.end_drag(&mut scene);
    }

    #[test]
    fn test_plane_move_snaps_each_plane_axis_independently() {
        let (mut scene, node) = single_node_scene();
        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, node, false).unwrap();

        // The z move plane sits offset toward the camera along +x and +y.
        let grab = ray_to(Vector3::new(0.3, 0.3, 0.0));
        gizmo.update(&scene, view(), &grab);
        assert_eq!(gizmo.near_axis(), Axis::Z);
        assert!(gizmo.has_plane_axis());
        assert!(gizmo.begin_drag(&scene, &grab));

        // First step stays under the 0.25 increment on both plane axes.
        gizmo.step_drag(
            &mut scene,
            &DragInput::new(ray_to(Vector3::new(0.4, 0.45, 0.0))).with_snapping(true),
        );
        assert!(scene.pose(node).position.magnitude() < 1e-3);

        // Second step pushes both accumulators past one increment; each
        // axis emits exactly 0.25 and carries its own remainder.
        gizmo.step_drag(
            &mut scene,
            &DragInput::new(ray_to(Vector3::new(0.6, 0.65, 0.0))).with_snapping(true),
        );
        let position = scene.pose(node).position;
        assert!((position.x - 0.25).abs() < 1e-3, "x = {}", position.x);
        assert!((position.y - 0.25).abs() < 1e-3, "y = {}", position.y);
        assert!(position.z.abs() < 1e-3);
        gizmo.end_drag(&mut scene);
    }

    #[test]
    fn test_scale_drag_grows_axis_and_undo_restores() {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);
        let mut gizmo = TransformGizmo::default();
        gizmo.set_transform_type(TransformType::Scale);
        gizmo.add_target(&mut scene, node, false).unwrap();
        let original = scene.pose(node);

        // Scale box sits at the end of the x handle (length 0.2 x distance
        // 10).
        let grab = ray_to(Vector3::new(2.0, 0.0, 0.0));
        gizmo.update(&scene, view(), &grab);
        assert_eq!(gizmo.near_axis(), Axis::X);
        assert_eq!(gizmo.transforming_type(), TransformType::Scale);
        assert!(gizmo.begin_drag(&scene, &grab));

        gizmo.step_drag(
            &mut scene,
            &DragInput::new(ray_to(Vector3::new(3.0, 0.0, 0.0))),
        );
        let scaled = scene.pose(node).scale;
        assert!(scaled.x > 1.5, "scale.x = {}", scaled.x);
        assert!((scaled.y - 1.0).abs() < 1e-5);
        assert!(gizmo.total_scale() > 0.5);

        gizmo.end_drag(&mut scene);
        assert_eq!(gizmo.total_scale(), 0.0);
        assert!(gizmo.undo(&mut scene));
        assert_eq!(scene.pose(node), original);
    }

    #[test]
    fn test_omni_scale_distributes_uniformly_ignoring_sign() {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);
        let mut pose = scene.pose(node);
        pose.scale = Vector3::new(-1.0, 1.0, 1.0);
        scene.set_pose(node, pose);

        let mut gizmo = TransformGizmo::default();
        gizmo.set_transform_type(TransformType::Scale);
        gizmo.add_target(&mut scene, node, false).unwrap();

        // The uniform-scale box straddles the pivot.
        let grab = ray_to(Vector3::zero());
        gizmo.update(&scene, view(), &grab);
        assert_eq!(gizmo.near_axis(), Axis::Omni);
        assert!(gizmo.begin_drag(&scene, &grab));

        gizmo.step_drag(
            &mut scene,
            &DragInput::new(ray_to(Vector3::new(1.0, 0.0, 0.0))),
        );
        let scale = scene.pose(node).scale;
        let delta = Vector3::new(scale.x - -1.0, scale.y - 1.0, scale.z - 1.0);
        // Same positive delta on every component: the mirrored x keeps its
        // sign discarded in the scale direction.
        assert!(delta.x > 0.1);
        assert!((delta.x - delta.y).abs() < 1e-5);
        assert!((delta.y - delta.z).abs() < 1e-5);
        gizmo.end_drag(&mut scene);
    }

    #[test]
    fn test_rotate_drag_spins_and_undo_restores_exactly() {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);
        let mut gizmo = TransformGizmo::default();
        gizmo.set_transform_type(TransformType::Rotate);
        gizmo.add_target(&mut scene, node, false).unwrap();
        let original = scene.pose(node);

        // Camera off-axis so the z circle is not edge-on everywhere.
        let camera = Vector3::new(4.0, 3.0, 10.0);
        let view = Viewpoint::looking_at(camera, Vector3::zero(), Vector3::unit_y());
        let on_circle = Vector3::new(2.0 * 0.7071, 2.0 * 0.7071, 0.0);
        let grab = Ray::new(camera, on_circle - camera);

        gizmo.update(&scene, view, &grab);
        assert_eq!(gizmo.near_axis(), Axis::Z);
        assert!(gizmo.begin_drag(&scene, &grab));

        let pull = Ray::new(camera, Vector3::new(-0.5, 2.0, 0.0) - camera);
        gizmo.step_drag(&mut scene, &DragInput::new(pull));

        let rotated = scene.pose(node).rotation;
        assert!((rotated.s - 1.0).abs() > 1e-4, "rotation did not change");
        assert_eq!(scene.pose(node).position, original.position);

        gizmo.end_drag(&mut scene);
        assert!(gizmo.undo(&mut scene));
        assert_eq!(scene.pose(node), original);
    }

    #[test]
    fn test_omni_rotate_uses_screen_delta() {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);
        let mut gizmo = TransformGizmo::default();
        gizmo.set_transform_type(TransformType::Rotate);
        gizmo.add_target(&mut scene, node, false).unwrap();

        let camera = Vector3::new(4.0, 3.0, 10.0);
        let view = Viewpoint::looking_at(camera, Vector3::zero(), Vector3::unit_y());
        let grab = Ray::new(camera, -camera);
        gizmo.update(&scene, view, &grab);
        assert_eq!(gizmo.near_axis(), Axis::Omni);
        assert!(gizmo.begin_drag(&scene, &grab));

        gizmo.step_drag(
            &mut scene,
            &DragInput::new(Ray::new(camera, Vector3::new(0.3, 0.2, 0.0) - camera))
                .with_screen_delta(Vector2::new(2.0, 0.0)),
        );
        assert!((scene.pose(node).rotation.s - 1.0).abs() > 1e-5);
        gizmo.end_drag(&mut scene);
    }

    #[test]
    fn test_mode_observer_fires_before_change() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<(TransformType, TransformType)>>> =
            Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();

        let mut gizmo = TransformGizmo::default();
        gizmo.on_transform_type_changing(Box::new(move |current, new| {
            sink.borrow_mut().push((current, new));
        }));

        gizmo.set_transform_type(TransformType::Rotate);
        assert_eq!(gizmo.transform_type(), TransformType::Rotate);
        assert_eq!(
            *seen.borrow(),
            vec![(TransformType::Move, TransformType::Rotate)]
        );
    }

    #[test]
    fn test_delete_selected_skips_protected_nodes() {
        let mut scene = BasicSceneGraph::new();
        let protected = scene.add_node(None);
        let expendable = scene.add_node(None);
        scene.set_deletable(expendable, true);

        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, protected, false).unwrap();
        gizmo.add_target(&mut scene, expendable, false).unwrap();

        assert_eq!(gizmo.delete_selected(&mut scene), 1);
        assert!(!scene.is_deleted(protected));
        assert!(scene.is_deleted(expendable));
        assert_eq!(gizmo.selection().roots(), &[protected]);

        // Undo restores the deletion and the selection membership.
        assert!(gizmo.undo(&mut scene));
        assert!(!scene.is_deleted(expendable));
        assert!(gizmo.selection().is_root(expendable));
    }

    #[test]
    fn test_delete_target_errors_loudly_on_protected_node() {
        let mut scene = BasicSceneGraph::new();
        let protected = scene.add_node(None);

        let mut gizmo = TransformGizmo::default();
        assert_eq!(
            gizmo.delete_target(&mut scene, protected),
            Err(GizmoError::NotDeletable(protected))
        );
    }

    #[test]
    fn test_empty_selection_clears_handles() {
        let (mut scene, node) = single_node_scene();
        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, node, false).unwrap();

        let ray = ray_to(Vector3::zero());
        gizmo.update(&scene, view(), &ray);
        assert!(!gizmo.handles().lines.x.is_empty());

        gizmo.clear_targets(&mut scene, false);
        gizmo.update(&scene, view(), &ray);
        assert!(gizmo.handles().is_empty());
        assert_eq!(gizmo.near_axis(), Axis::None);
    }

    #[test]
    fn test_multi_target_drag_moves_all_roots() {
        let mut scene = BasicSceneGraph::new();
        let a = scene.add_node(None);
        let b = scene.add_node(None);
        scene.set_pose(b, Pose::at(Vector3::new(0.0, 2.0, 0.0)));

        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, a, false).unwrap();
        gizmo.add_target(&mut scene, b, false).unwrap();

        begin_x_move_drag(&mut gizmo, &scene);
        gizmo.step_drag(
            &mut scene,
            &DragInput::new(ray_to(Vector3::new(2.0, 0.0, 0.0))),
        );
        gizmo.end_drag(&mut scene);

        assert!((scene.pose(a).position.x - 1.0).abs() < 1e-4);
        assert!((scene.pose(b).position.x - 1.0).abs() < 1e-4);
        assert!((scene.pose(b).position.y - 2.0).abs() < 1e-6);

        // One composite entry undoes both.
        assert!(gizmo.undo(&mut scene));
        assert!(scene.pose(a).position.magnitude() < 1e-6);
        assert!((scene.pose(b).position - Vector3::new(0.0, 2.0, 0.0)).magnitude() < 1e-6);
    }

    #[test]
    fn test_step_without_drag_is_noop() {
        let (mut scene, node) = single_node_scene();
        let mut gizmo = TransformGizmo::default();
        gizmo.add_target(&mut scene, node, false).unwrap();

        gizmo.step_drag(
            &mut scene,
            &DragInput::new(ray_to(Vector3::new(2.0, 0.0, 0.0))),
        );
        assert_eq!(scene.pose(node).position, Vector3::zero());
        gizmo.end_drag(&mut scene); // also a no-op
        assert_eq!(gizmo.undo_depth(), 0);
    }
}
