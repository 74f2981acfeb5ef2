//! Shared engine state: modes, selection, pivot, axis basis, highlight set,
//! and drag totals.
//!
//! [`GizmoState`] is everything a [`Command`](crate::history::Command) may
//! mutate while the history engine drives it. The facade owns the history
//! itself, so commands receive the state and the scene as explicit context.

use std::collections::HashSet;

use cgmath::{One, Quaternion, Vector3, Zero};
use log::debug;

use crate::math::geometry;
use crate::scene::{NodeId, Projection, SceneGraph, Viewpoint};

use super::axis::AxisInfo;
use super::config::{
    Axis, CenterType, GizmoConfig, ScaleType, TransformPivot, TransformSpace, TransformType,
};
use super::drag::DragSession;
use super::handles::HandleGeometry;
use super::selection::SelectionSet;

pub struct GizmoState {
    pub config: GizmoConfig,

    pub(crate) space: TransformSpace,
    pub(crate) transform_type: TransformType,
    pub(crate) pivot_mode: TransformPivot,
    pub(crate) center_type: CenterType,
    pub(crate) scale_type: ScaleType,

    pub(crate) selection: SelectionSet,
    pub(crate) highlighted: HashSet<NodeId>,

    pub(crate) pivot_point: Vector3<f32>,
    pub(crate) total_center_point: Vector3<f32>,

    pub(crate) axis_info: AxisInfo,
    pub(crate) near_axis: Axis,
    pub(crate) plane_axis: Axis,
    pub(crate) translating_type: TransformType,

    pub(crate) handles: HandleGeometry,
    pub(crate) view: Viewpoint,

    pub(crate) drag: Option<DragSession>,
    pub(crate) total_scale: f32,
    pub(crate) total_rotation: Quaternion<f32>,
}

impl GizmoState {
    pub(crate) fn new(config: GizmoConfig) -> Self {
        Self {
            config,
            space: TransformSpace::Global,
            transform_type: TransformType::Move,
            pivot_mode: TransformPivot::Pivot,
            center_type: CenterType::All,
            scale_type: ScaleType::FromPoint,
            selection: SelectionSet::new(),
            highlighted: HashSet::new(),
            pivot_point: Vector3::zero(),
            total_center_point: Vector3::zero(),
            axis_info: AxisInfo::default(),
            near_axis: Axis::None,
            plane_axis: Axis::None,
            translating_type: TransformType::Move,
            handles: HandleGeometry::default(),
            view: Viewpoint::default(),
            drag: None,
            total_scale: 0.0,
            total_rotation: Quaternion::one(),
        }
    }

    // --- read accessors -------------------------------------------------

    pub fn is_transforming(&self) -> bool {
        self.drag.is_some()
    }

    pub fn pivot_point(&self) -> Vector3<f32> {
        self.pivot_point
    }

    pub fn near_axis(&self) -> Axis {
        self.near_axis
    }

    pub fn plane_axis(&self) -> Axis {
        self.plane_axis
    }

    /// Whether the picked move handle constrains movement to a plane.
    pub fn has_plane_axis(&self) -> bool {
        !matches!(self.plane_axis, Axis::None | Axis::Omni)
    }

    pub fn transforming_type(&self) -> TransformType {
        self.translating_type
    }

    pub fn total_scale(&self) -> f32 {
        self.total_scale
    }

    pub fn total_rotation(&self) -> Quaternion<f32> {
        self.total_rotation
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// Nodes the renderer should outline, expanded from the selected roots.
    pub fn highlighted(&self) -> &HashSet<NodeId> {
        &self.highlighted
    }

    pub fn handles(&self) -> &HandleGeometry {
        &self.handles
    }

    pub fn main_target(&self) -> Option<NodeId> {
        self.selection
            .main_target(self.config.use_first_selected_as_main)
    }

    // --- modes ------------------------------------------------------------

    /// Scaling is only supported along local axes, so the effective space is
    /// local whenever the configured type is scale.
    pub fn proper_space(&self) -> TransformSpace {
        if self.transform_type == TransformType::Scale {
            TransformSpace::Local
        } else {
            self.space
        }
    }

    pub fn transform_type_contains(&self, ty: TransformType) -> bool {
        self.transform_type.contains(ty, self.proper_space())
    }

    /// Containment against the type actually being dragged (falls back to
    /// the configured type while idle).
    pub fn active_type_contains(&self, ty: TransformType) -> bool {
        let active = if self.is_transforming() {
            self.translating_type
        } else {
            self.transform_type
        };
        active.contains(ty, self.proper_space())
    }

    // --- sizing -----------------------------------------------------------

    /// Multiplier that keeps handle screen size roughly constant with
    /// camera distance: the pivot's depth along the camera forward axis,
    /// floored to avoid degeneracy; fixed for orthographic projections.
    pub fn distance_multiplier(&self) -> f32 {
        if self.main_target().is_none() {
            return 0.0;
        }
        match self.view.projection {
            Projection::Orthographic { size } => (size * 2.0).max(0.01),
            Projection::Perspective => {
                geometry::magnitude_in_direction(
                    self.pivot_point - self.view.position,
                    self.view.forward,
                )
                .abs()
                .max(0.01)
            }
        }
    }

    /// World-space handle length for a shape of the given type.
    ///
    /// In `All` mode each type gets its own multiplier so the three handle
    /// sets nest visibly. While a scale drag is active, the dragged axis
    /// grows by the accumulated scale so the box tracks the pointer.
    pub fn handle_length(&self, ty: TransformType, axis: Axis, multiply_distance: bool) -> f32 {
        let mut length = self.config.handle_length;
        if self.transform_type == TransformType::All {
            length *= match ty {
                TransformType::Move => self.config.all_move_handle_length_multiplier,
                TransformType::Rotate => self.config.all_rotate_handle_length_multiplier,
                TransformType::Scale => self.config.all_scale_handle_length_multiplier,
                TransformType::All => 1.0,
            };
        }

        if multiply_distance {
            length *= self.distance_multiplier();
        }

        if ty == TransformType::Scale
            && self.is_transforming()
            && (self.near_axis == axis || self.near_axis == Axis::Omni)
        {
            length += self.total_scale;
        }

        length
    }

    // --- axis basis ---------------------------------------------------------

    pub(crate) fn set_axis_info(&mut self, scene: &dyn SceneGraph) {
        let Some(main) = self.main_target() else {
            return;
        };
        let pivot = self.pivot_point;
        let space = self.proper_space();
        self.axis_info.set(scene, main, pivot, space);
    }

    /// The axis basis as it should be presented this frame. During a
    /// global-space rotate drag the basis visually tracks the accumulated
    /// rotation; the stored basis is untouched.
    pub fn axis_info(&self) -> AxisInfo {
        if self.is_transforming()
            && self.proper_space() == TransformSpace::Global
            && self.translating_type == TransformType::Rotate
        {
            self.axis_info.rotated_by(self.total_rotation)
        } else {
            self.axis_info
        }
    }

    pub(crate) fn set_translating_axis(&mut self, ty: TransformType, axis: Axis, plane: Axis) {
        self.translating_type = ty;
        self.near_axis = axis;
        self.plane_axis = plane;
    }

    /// Direction of the picked axis plus the two remaining basis directions.
    /// Omni reports (1,1,1); callers derive their own direction for omni
    /// operations.
    pub(crate) fn near_axis_direction(&self) -> (Vector3<f32>, Vector3<f32>, Vector3<f32>) {
        let info = &self.axis_info;
        match self.near_axis {
            Axis::X => (info.x_direction, info.y_direction, info.z_direction),
            Axis::Y => (info.y_direction, info.x_direction, info.z_direction),
            Axis::Z => (info.z_direction, info.x_direction, info.y_direction),
            Axis::Omni => (Vector3::new(1.0, 1.0, 1.0), Vector3::zero(), Vector3::zero()),
            Axis::None => (Vector3::zero(), Vector3::zero(), Vector3::zero()),
        }
    }

    // --- pivot --------------------------------------------------------------

    /// Recompute the pivot from the selection and the pivot/center modes.
    pub fn set_pivot_point(&mut self, scene: &dyn SceneGraph) {
        let Some(main) = self.main_target() else {
            return;
        };

        match self.pivot_mode {
            TransformPivot::Pivot => {
                self.pivot_point = scene.pose(main).position;
            }
            TransformPivot::Center => {
                let include_descendants = self.center_type == CenterType::All;
                let roots: Vec<NodeId> = self.selection.roots().to_vec();

                let mut total = Vector3::zero();
                for &root in &roots {
                    let center = scene.bounds_center(root, include_descendants);
                    if let Some(info) = self.selection.info_mut(root) {
                        info.center_point = center;
                    }
                    total += center;
                }
                total /= roots.len() as f32;
                self.total_center_point = total;

                self.pivot_point = match self.center_type {
                    CenterType::Solo => {
                        self.selection
                            .info(main)
                            .map(|info| info.center_point)
                            .unwrap_or(total)
                    }
                    CenterType::All => total,
                };
            }
        }
    }

    /// Shift the cached pivot during a move drag instead of recomputing it
    /// from the scene every step.
    pub(crate) fn set_pivot_offset(&mut self, offset: Vector3<f32>) {
        self.pivot_point += offset;
        self.total_center_point += offset;
    }

    // --- selection mutation (history replay entry points) --------------------

    /// Add a selection root without recording history. Commands replay
    /// through this; interactive callers go through the facade.
    pub fn execute_add_target(&mut self, scene: &dyn SceneGraph, node: NodeId) -> bool {
        if !self.selection.add(scene, node) {
            return false;
        }
        debug!("selected node {node}");
        for renderable in scene.renderables(node) {
            self.highlighted.insert(renderable);
        }
        self.set_pivot_point(scene);
        true
    }

    /// Remove a selection root without recording history.
    pub fn execute_remove_target(&mut self, scene: &dyn SceneGraph, node: NodeId) -> bool {
        if !self.selection.remove(scene, node) {
            return false;
        }
        debug!("deselected node {node}");
        for renderable in scene.renderables(node) {
            self.highlighted.remove(&renderable);
        }
        self.set_pivot_point(scene);
        true
    }

    /// Drop the whole selection without recording history.
    pub fn execute_clear_targets(&mut self) {
        debug!("cleared {} selected roots", self.selection.len());
        self.selection.clear();
        self.highlighted.clear();
    }
}
