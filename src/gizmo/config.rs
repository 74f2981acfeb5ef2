//! Manipulation modes and tunable parameters.

/// Which manipulation the gizmo performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformType {
    Move,
    Rotate,
    Scale,
    /// Move, rotate, and scale handles shown together.
    All,
}

impl TransformType {
    /// Whether handles of `other` are active when this type is selected.
    ///
    /// `All` contains move and rotate unconditionally, and scale only in
    /// local space (scaling is only supported along local axes).
    pub fn contains(self, other: TransformType, space: TransformSpace) -> bool {
        if self == other {
            return true;
        }
        if self == TransformType::All {
            return match other {
                TransformType::Move | TransformType::Rotate => true,
                TransformType::Scale => space == TransformSpace::Local,
                TransformType::All => false,
            };
        }
        false
    }
}

/// Axis frame the handles are aligned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    Global,
    Local,
}

/// What rotation and scale operations are centered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformPivot {
    /// The main target's own origin.
    Pivot,
    /// A computed center point (see [`CenterType`]).
    Center,
}

/// How the center pivot is computed from the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenterType {
    /// Average the bounding centers of every selected root (each including
    /// its descendants).
    All,
    /// The main target's own bounding center.
    Solo,
}

/// How center-pivot scaling repositions targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleType {
    /// Re-project each target's position from the pivot by the scale ratio.
    FromPoint,
    /// Offset each target's position proportionally to the scale delta.
    /// Can drift with non-uniform scales; intended for center mode only.
    FromPointOffset,
}

/// A manipulation axis. `Omni` stands for "all axes at once": uniform scale
/// or free rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    None,
    X,
    Y,
    Z,
    Omni,
}

impl Axis {
    pub fn is_none(self) -> bool {
        self == Axis::None
    }
}

/// Tunable parameters for handle sizing, drag speeds, snapping, and history
/// depth. Sizes are world units at distance 1 (they scale with camera
/// distance); angles are degrees.
#[derive(Debug, Clone)]
pub struct GizmoConfig {
    /// Translation snap increment, world units.
    pub movement_snap: f32,
    /// Rotation snap increment, degrees.
    pub rotation_snap: f32,
    /// Scale snap increment.
    pub scale_snap: f32,

    pub handle_length: f32,
    pub handle_width: f32,
    pub plane_size: f32,
    pub triangle_size: f32,
    pub box_size: f32,
    /// Segments per rotation circle.
    pub circle_detail: u32,

    /// Handle length multipliers applied in [`TransformType::All`] so the
    /// three handle sets stay visually separated.
    pub all_move_handle_length_multiplier: f32,
    pub all_rotate_handle_length_multiplier: f32,
    pub all_scale_handle_length_multiplier: f32,

    /// Base picking tolerance around handles.
    pub min_selected_distance_check: f32,

    pub move_speed_multiplier: f32,
    pub scale_speed_multiplier: f32,
    pub rotate_speed_multiplier: f32,
    /// Speed of free rotation driven by raw pointer deltas.
    pub omni_rotate_speed_multiplier: f32,

    /// Whether the first (true) or last (false) selected root is the main
    /// target.
    pub use_first_selected_as_main: bool,

    /// If true, rotation follows the pointer circling the pivot like a
    /// wheel; if false, dragging in a straight line rotates.
    pub circular_rotation_method: bool,

    /// Undo history depth. 0 disables history recording entirely.
    pub max_undo_stored: usize,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            movement_snap: 0.25,
            rotation_snap: 15.0,
            scale_snap: 1.0,

            handle_length: 0.2,
            handle_width: 0.002,
            plane_size: 0.03,
            triangle_size: 0.02,
            box_size: 0.03,
            circle_detail: 40,

            all_move_handle_length_multiplier: 1.0,
            all_rotate_handle_length_multiplier: 1.4,
            all_scale_handle_length_multiplier: 1.6,

            min_selected_distance_check: 0.01,

            move_speed_multiplier: 1.0,
            scale_speed_multiplier: 1.0,
            rotate_speed_multiplier: 1.0,
            omni_rotate_speed_multiplier: 20.0,

            use_first_selected_as_main: true,
            circular_rotation_method: false,

            max_undo_stored: 100,
        }
    }
}
