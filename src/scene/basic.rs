//! In-memory reference scene graph.
//!
//! Backs the tests and demos, and works as a starting point for hosts that
//! do not already have a scene representation. Nodes are flat map entries
//! with parent/child links; `bounds_center` falls back to node positions
//! since a headless graph has no meshes to measure.

use std::collections::HashMap;

use cgmath::Vector3;

use super::{NodeId, Pose, SceneGraph};

struct NodeData {
    pose: Pose,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    deletable: bool,
    deleted: bool,
    renderable: bool,
}

/// HashMap-backed [`SceneGraph`] implementation.
#[derive(Default)]
pub struct BasicSceneGraph {
    nodes: HashMap<NodeId, NodeData>,
    next_id: u32,
}

impl BasicSceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or at the top level), renderable and not
    /// deletable by default.
    pub fn add_node(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        self.nodes.insert(
            id,
            NodeData {
                pose: Pose::identity(),
                parent,
                children: Vec::new(),
                deletable: false,
                deleted: false,
                renderable: true,
            },
        );
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }
        id
    }

    pub fn set_deletable(&mut self, node: NodeId, deletable: bool) {
        self.node_mut(node).deletable = deletable;
    }

    pub fn set_renderable(&mut self, node: NodeId, renderable: bool) {
        self.node_mut(node).renderable = renderable;
    }

    pub fn is_deleted(&self, node: NodeId) -> bool {
        self.node(node).deleted
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn node(&self, node: NodeId) -> &NodeData {
        self.nodes.get(&node).expect("unknown node id")
    }

    fn node_mut(&mut self, node: NodeId) -> &mut NodeData {
        self.nodes.get_mut(&node).expect("unknown node id")
    }

    fn collect_descendants(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.node(node).children {
            out.push(child);
            self.collect_descendants(child, out);
        }
    }
}

impl SceneGraph for BasicSceneGraph {
    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn pose(&self, node: NodeId) -> Pose {
        self.node(node).pose
    }

    fn set_pose(&mut self, node: NodeId, pose: Pose) {
        self.node_mut(node).pose = pose;
    }

    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_descendants(node, &mut out);
        out
    }

    fn renderables(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.node(node).renderable {
            out.push(node);
        }
        for descendant in self.descendants(node) {
            if self.node(descendant).renderable {
                out.push(descendant);
            }
        }
        out
    }

    fn bounds_center(&self, node: NodeId, include_descendants: bool) -> Vector3<f32> {
        let own = self.node(node).pose.position;
        if !include_descendants {
            return own;
        }

        let descendants = self.descendants(node);
        let mut total = own;
        for &descendant in &descendants {
            total += self.node(descendant).pose.position;
        }
        total / (descendants.len() as f32 + 1.0)
    }

    fn deletable(&self, node: NodeId) -> bool {
        self.node(node).deletable
    }

    fn set_deleted(&mut self, node: NodeId, deleted: bool) {
        self.node_mut(node).deleted = deleted;
    }

    fn destroy(&mut self, node: NodeId) {
        let mut doomed = vec![node];
        self.collect_descendants(node, &mut doomed);

        if let Some(parent) = self.node(node).parent {
            self.node_mut(parent).children.retain(|&c| c != node);
        }
        for id in doomed {
            self.nodes.remove(&id);
        }
    }
}
