//! Concrete commands: selection changes, pose restoration, deletion.

use crate::gizmo::GizmoState;
use crate::scene::{NodeId, Pose, SceneGraph};

use super::Command;

/// Makes a node a selection root; undo restores the exact previous root
/// list, re-selecting any descendants the add had demoted.
pub struct AddTargetCommand {
    target: NodeId,
    previous_roots: Vec<NodeId>,
}

impl AddTargetCommand {
    pub fn new(target: NodeId, previous_roots: Vec<NodeId>) -> Self {
        Self {
            target,
            previous_roots,
        }
    }
}

impl Command for AddTargetCommand {
    fn execute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        state.execute_add_target(scene, self.target);
    }

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        state.execute_remove_target(scene, self.target);
        for &root in &self.previous_roots {
            state.execute_add_target(scene, root);
        }
    }
}

/// Removes a node from the selection roots.
pub struct RemoveTargetCommand {
    target: NodeId,
}

impl RemoveTargetCommand {
    pub fn new(target: NodeId) -> Self {
        Self { target }
    }
}

impl Command for RemoveTargetCommand {
    fn execute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        state.execute_remove_target(scene, self.target);
    }

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        state.execute_add_target(scene, self.target);
    }
}

/// Empties the selection; undo re-adds every previous root in order.
pub struct ClearTargetsCommand {
    previous_roots: Vec<NodeId>,
}

impl ClearTargetsCommand {
    pub fn new(previous_roots: Vec<NodeId>) -> Self {
        Self { previous_roots }
    }
}

impl Command for ClearTargetsCommand {
    fn execute(&mut self, state: &mut GizmoState, _scene: &mut dyn SceneGraph) {
        state.execute_clear_targets();
    }

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        for &root in &self.previous_roots {
            state.execute_add_target(scene, root);
        }
    }
}

/// Atomic clear-then-add recorded as a single history entry.
pub struct ClearAndAddTargetCommand {
    target: NodeId,
    previous_roots: Vec<NodeId>,
}

impl ClearAndAddTargetCommand {
    pub fn new(target: NodeId, previous_roots: Vec<NodeId>) -> Self {
        Self {
            target,
            previous_roots,
        }
    }
}

impl Command for ClearAndAddTargetCommand {
    fn execute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        state.execute_clear_targets();
        state.execute_add_target(scene, self.target);
    }

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        state.execute_remove_target(scene, self.target);
        for &root in &self.previous_roots {
            state.execute_add_target(scene, root);
        }
    }
}

/// Restores one node's pose: "before" captured at drag begin, "after" at
/// drag end.
pub struct TransformCommand {
    target: NodeId,
    old_pose: Pose,
    new_pose: Pose,
}

impl TransformCommand {
    /// Snapshot the node's pose as the undo state.
    pub fn begin(scene: &dyn SceneGraph, target: NodeId) -> Self {
        let pose = scene.pose(target);
        Self {
            target,
            old_pose: pose,
            new_pose: pose,
        }
    }

    /// Snapshot the node's pose as the redo state, at drag end.
    pub fn capture_new(&mut self, scene: &dyn SceneGraph) {
        self.new_pose = scene.pose(self.target);
    }

    pub fn target(&self) -> NodeId {
        self.target
    }
}

impl Command for TransformCommand {
    fn execute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        scene.set_pose(self.target, self.new_pose);
        state.set_pivot_point(scene);
    }

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        scene.set_pose(self.target, self.old_pose);
        state.set_pivot_point(scene);
    }
}

/// A sequence of commands treated as one history entry: executed in order,
/// unexecuted in reverse.
#[derive(Default)]
pub struct CommandGroup {
    commands: Vec<Box<dyn Command>>,
}

impl CommandGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Box<dyn Command>) {
        self.commands.push(command);
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Command for CommandGroup {
    fn execute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        for command in &mut self.commands {
            command.execute(state, scene);
        }
    }

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        for command in self.commands.iter_mut().rev() {
            command.unexecute(state, scene);
        }
    }

    fn cleanup(&mut self, scene: &mut dyn SceneGraph) {
        for command in &mut self.commands {
            command.cleanup(scene);
        }
    }
}

/// Marks nodes deleted and deselects them; undo restores and reselects.
/// Cleanup destroys the nodes for good, but only while the deletion is in
/// effect; an undone deletion leaves the nodes alive.
pub struct DeleteCommand {
    targets: Vec<NodeId>,
    executed: bool,
}

impl DeleteCommand {
    /// `targets` must already be filtered to deletable nodes.
    pub fn new(targets: Vec<NodeId>) -> Self {
        Self {
            targets,
            executed: false,
        }
    }

    pub fn target_count(&self) -> usize {
        self.targets.len()
    }
}

impl Command for DeleteCommand {
    fn execute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        for &target in &self.targets {
            scene.set_deleted(target, true);
            state.execute_remove_target(scene, target);
        }
        self.executed = true;
    }

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) {
        for &target in &self.targets {
            scene.set_deleted(target, false);
            state.execute_add_target(scene, target);
        }
        self.executed = false;
    }

    fn cleanup(&mut self, scene: &mut dyn SceneGraph) {
        if self.executed {
            for &target in &self.targets {
                scene.destroy(target);
            }
        }
        self.targets.clear();
    }
}
