//! Selection membership with ancestor/descendant exclusivity.

use std::collections::{HashMap, HashSet};

use cgmath::{Vector3, Zero};

use crate::scene::{NodeId, SceneGraph};

/// Per-root cached data used by pivot computation.
#[derive(Debug, Clone, Copy)]
pub struct TargetInfo {
    /// The root's own center point, per the active center policy.
    pub center_point: Vector3<f32>,
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self {
            center_point: Vector3::zero(),
        }
    }
}

/// The set of selected root nodes.
///
/// Roots keep insertion order. Every descendant of a root is held in an
/// excluded set: descendants ride along with their root and can never be
/// roots themselves. Selecting an ancestor of existing roots demotes those
/// roots back to plain descendants.
#[derive(Debug, Default)]
pub struct SelectionSet {
    ordered: Vec<NodeId>,
    roots: HashMap<NodeId, TargetInfo>,
    excluded: HashSet<NodeId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected roots in insertion order.
    pub fn roots(&self) -> &[NodeId] {
        &self.ordered
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_root(&self, node: NodeId) -> bool {
        self.roots.contains_key(&node)
    }

    /// Whether `node` is a descendant of some root (and therefore not
    /// independently selectable).
    pub fn is_excluded(&self, node: NodeId) -> bool {
        self.excluded.contains(&node)
    }

    /// The first or last root, per configuration.
    pub fn main_target(&self, use_first: bool) -> Option<NodeId> {
        if use_first {
            self.ordered.first().copied()
        } else {
            self.ordered.last().copied()
        }
    }

    pub fn info(&self, node: NodeId) -> Option<&TargetInfo> {
        self.roots.get(&node)
    }

    pub fn info_mut(&mut self, node: NodeId) -> Option<&mut TargetInfo> {
        self.roots.get_mut(&node)
    }

    /// Add `node` as a root. No-op (returning false) when it already is one
    /// or is excluded as some root's descendant.
    ///
    /// Any existing roots inside `node`'s subtree are demoted: the subtree
    /// walk excludes each descendant and drops demoted roots as it passes
    /// them, relying on parents appearing before their children in
    /// [`SceneGraph::descendants`].
    pub fn add(&mut self, scene: &dyn SceneGraph, node: NodeId) -> bool {
        if self.is_root(node) || self.is_excluded(node) {
            return false;
        }

        self.roots.insert(node, TargetInfo::default());
        self.ordered.push(node);

        for descendant in scene.descendants(node) {
            self.excluded.insert(descendant);
            if self.is_root(descendant) {
                // Demotion un-excludes the demoted root's own subtree, which
                // reappears later in this walk (parents come first).
                self.remove_root(scene, descendant);
            }
        }
        true
    }

    /// Remove `node` from the roots. No-op (returning false) when it is not
    /// a root. Its descendants become independently selectable again; they
    /// are not re-added.
    pub fn remove(&mut self, scene: &dyn SceneGraph, node: NodeId) -> bool {
        if !self.is_root(node) {
            return false;
        }
        self.remove_root(scene, node);
        true
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.roots.clear();
        self.excluded.clear();
    }

    fn remove_root(&mut self, scene: &dyn SceneGraph, node: NodeId) {
        if self.roots.remove(&node).is_some() {
            self.ordered.retain(|&n| n != node);
            for descendant in scene.descendants(node) {
                self.excluded.remove(&descendant);
            }
        }
    }
}
