//! # Scene Interface
//!
//! The manipulation engine never owns the scene graph. Hosts expose their
//! scene through the [`SceneGraph`] trait: opaque [`NodeId`] handles, world
//! [`Pose`]s, and a snapshot adjacency query for descendants. The engine
//! reads and writes poses; hierarchy, meshes, and rendering stay on the host
//! side.
//!
//! [`BasicSceneGraph`] is a small in-memory implementation used by the tests
//! and demos, and usable as-is by hosts without an engine of their own.

pub mod basic;
pub mod view;

use cgmath::{ElementWise, InnerSpace, One, Quaternion, Rotation, Rotation3, Vector3};

pub use basic::BasicSceneGraph;
pub use view::{Projection, Viewpoint};

/// Opaque handle to a scene node.
///
/// The engine attaches no meaning to the value; hosts map it onto whatever
/// identifies an entity on their side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// World position and orientation plus local (non-uniform) scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vector3<f32>,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3<f32>,
}

impl Pose {
    /// Origin, no rotation, unit scale.
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    /// A pose at `position` with no rotation and unit scale.
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }
}

/// Host-owned scene graph, as seen by the manipulation engine.
///
/// Implementations may panic on node ids they do not contain; the engine
/// validates ids at its public boundary and only passes known ids down.
pub trait SceneGraph {
    /// Whether the graph currently contains `node`.
    fn contains(&self, node: NodeId) -> bool;

    /// Current pose of `node`.
    fn pose(&self, node: NodeId) -> Pose;

    /// Overwrite the pose of `node`.
    fn set_pose(&mut self, node: NodeId, pose: Pose);

    /// Snapshot of every descendant of `node`, depth-first with parents
    /// before children, excluding `node` itself.
    ///
    /// The ordering is part of the contract: selection demotion walks the
    /// list in order and relies on a parent appearing before its subtree.
    fn descendants(&self, node: NodeId) -> Vec<NodeId>;

    /// `node` plus every descendant the host renders; feeds the highlighted
    /// set consumed by outline rendering.
    fn renderables(&self, node: NodeId) -> Vec<NodeId>;

    /// The host's bounding-center for `node`, optionally aggregated over its
    /// descendants.
    fn bounds_center(&self, node: NodeId, include_descendants: bool) -> Vector3<f32>;

    /// Whether `node` may be deleted through the engine.
    fn deletable(&self, node: NodeId) -> bool;

    /// Mark `node` deleted (hidden/inactive) or restore it.
    fn set_deleted(&mut self, node: NodeId, deleted: bool);

    /// Release `node` permanently. Called only when a delete command is
    /// evicted from history and can never be undone again.
    fn destroy(&mut self, node: NodeId);
}

/// Translate `node` in world space.
pub fn translate_world(scene: &mut dyn SceneGraph, node: NodeId, delta: Vector3<f32>) {
    let mut pose = scene.pose(node);
    pose.position += delta;
    scene.set_pose(node, pose);
}

/// Rotate `node` about its own origin around a world-space axis.
pub fn rotate_world(scene: &mut dyn SceneGraph, node: NodeId, axis: Vector3<f32>, degrees: f32) {
    let delta = Quaternion::from_axis_angle(axis.normalize(), cgmath::Deg(degrees));
    let mut pose = scene.pose(node);
    pose.rotation = delta * pose.rotation;
    scene.set_pose(node, pose);
}

/// Rotate `node` around a world-space point: the position orbits the point
/// and the orientation spins with it.
pub fn rotate_around(
    scene: &mut dyn SceneGraph,
    node: NodeId,
    point: Vector3<f32>,
    axis: Vector3<f32>,
    degrees: f32,
) {
    let delta = Quaternion::from_axis_angle(axis.normalize(), cgmath::Deg(degrees));
    let mut pose = scene.pose(node);
    pose.position = point + delta.rotate_vector(pose.position - point);
    pose.rotation = delta * pose.rotation;
    scene.set_pose(node, pose);
}

/// Scale `node` to `new_scale`, re-projecting its position away from `point`
/// by the component-wise ratio of new to old scale.
///
/// Components whose old scale is near zero keep a ratio of 1 instead of
/// dividing by zero.
pub fn scale_from_point(
    scene: &mut dyn SceneGraph,
    node: NodeId,
    point: Vector3<f32>,
    new_scale: Vector3<f32>,
) {
    let mut pose = scene.pose(node);
    let ratio = Vector3::new(
        safe_ratio(new_scale.x, pose.scale.x),
        safe_ratio(new_scale.y, pose.scale.y),
        safe_ratio(new_scale.z, pose.scale.z),
    );
    pose.position = point + (pose.position - point).mul_element_wise(ratio);
    pose.scale = new_scale;
    scene.set_pose(node, pose);
}

/// Scale `node` to `new_scale`, offsetting its position from `point`
/// proportionally to the scale delta.
pub fn scale_from_point_offset(
    scene: &mut dyn SceneGraph,
    node: NodeId,
    point: Vector3<f32>,
    new_scale: Vector3<f32>,
) {
    let mut pose = scene.pose(node);
    let delta = new_scale - pose.scale;
    pose.position += (pose.position - point).mul_element_wise(delta);
    pose.scale = new_scale;
    scene.set_pose(node, pose);
}

fn safe_ratio(new: f32, old: f32) -> f32 {
    if old.abs() < crate::math::geometry::EPSILON {
        1.0
    } else {
        new / old
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Deg, Rotation3};

    use super::*;

    fn assert_vec_near(a: Vector3<f32>, b: Vector3<f32>, eps: f32) {
        assert!((a - b).magnitude() < eps, "{:?} !~ {:?}", a, b);
    }

    fn scene_with_node_at(position: Vector3<f32>) -> (BasicSceneGraph, NodeId) {
        let mut scene = BasicSceneGraph::new();
        let node = scene.add_node(None);
        scene.set_pose(node, Pose::at(position));
        (scene, node)
    }

    #[test]
    fn test_translate_world() {
        let (mut scene, node) = scene_with_node_at(Vector3::new(1.0, 0.0, 0.0));
        translate_world(&mut scene, node, Vector3::new(0.0, 2.0, 0.0));
        assert_eq!(scene.pose(node).position, Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_rotate_world_keeps_position() {
        let (mut scene, node) = scene_with_node_at(Vector3::new(3.0, 0.0, 0.0));
        rotate_world(&mut scene, node, Vector3::unit_z(), 90.0);
        let pose = scene.pose(node);
        assert_eq!(pose.position, Vector3::new(3.0, 0.0, 0.0));
        let expected = Quaternion::from_axis_angle(Vector3::unit_z(), Deg(90.0));
        assert!((pose.rotation.s - expected.s).abs() < 1e-5);
    }

    #[test]
    fn test_rotate_around_orbits_position() {
        let (mut scene, node) = scene_with_node_at(Vector3::new(1.0, 0.0, 0.0));
        rotate_around(&mut scene, node, Vector3::new(0.0, 0.0, 0.0), Vector3::unit_z(), 90.0);
        assert_vec_near(scene.pose(node).position, Vector3::new(0.0, 1.0, 0.0), 1e-5);
    }

    #[test]
    fn test_scale_from_point_reprojects() {
        let (mut scene, node) = scene_with_node_at(Vector3::new(2.0, 0.0, 0.0));
        scale_from_point(
            &mut scene,
            node,
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(3.0, 3.0, 3.0),
        );
        let pose = scene.pose(node);
        // Offset of 1 along x re-projected by ratio 3.
        assert_vec_near(pose.position, Vector3::new(4.0, 0.0, 0.0), 1e-5);
        assert_eq!(pose.scale, Vector3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn test_scale_from_point_offset_is_additive() {
        let (mut scene, node) = scene_with_node_at(Vector3::new(2.0, 0.0, 0.0));
        scale_from_point_offset(
            &mut scene,
            node,
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        );
        let pose = scene.pose(node);
        // Offset of 1 along x grows by offset * (2 - 1) = 1.
        assert_vec_near(pose.position, Vector3::new(3.0, 0.0, 0.0), 1e-5);
    }
}
