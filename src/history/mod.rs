//! # Undo/Redo History
//!
//! A bounded command history. Commands are reversible actions over the
//! engine state and the host scene; the engine records one command per
//! selection change and one composite command per completed drag.
//!
//! ## Architecture
//!
//! [`UndoRedo`] owns two stacks, newest entry on top. The undo stack is a
//! [`DropoutStack`]: pushing beyond capacity evicts the oldest entry, which
//! gets its [`Command::cleanup`] call, the only point where commands may
//! release resources for good. The redo stack needs no bound of its own: it
//! can never hold more than the undo stack once did, and inserting any new
//! command invalidates it entirely.
//!
//! Commands receive the engine state and scene as explicit context on every
//! call instead of holding references back into the engine.

pub mod commands;

use std::collections::VecDeque;

use log::{debug, trace};

use crate::gizmo::GizmoState;
use crate::scene::SceneGraph;

/// A reversible action.
pub trait Command {
    fn execute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph);

    fn unexecute(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph);

    /// Release resources held for a possible redo. Called exactly once, and
    /// only when the command is permanently evicted from history, never on
    /// an ordinary undo.
    fn cleanup(&mut self, scene: &mut dyn SceneGraph) {
        let _ = scene;
    }
}

/// A stack that drops its oldest entry once capacity is exceeded.
#[derive(Debug)]
pub struct DropoutStack<T> {
    // Front is the newest entry.
    items: VecDeque<T>,
    max_len: usize,
}

impl<T> DropoutStack<T> {
    pub fn new(max_len: usize) -> Self {
        Self {
            items: VecDeque::new(),
            max_len,
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Shrink or grow the capacity, returning entries evicted from the
    /// bottom (oldest first).
    pub fn set_max_len(&mut self, max_len: usize) -> Vec<T> {
        self.max_len = max_len;
        let mut evicted = Vec::new();
        while self.items.len() > self.max_len {
            if let Some(item) = self.items.pop_back() {
                evicted.push(item);
            }
        }
        evicted
    }

    /// Push on top. Returns the evicted oldest entry when over capacity, or
    /// the rejected item itself at capacity 0.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.max_len == 0 {
            return Some(item);
        }
        let evicted = if self.items.len() >= self.max_len {
            self.items.pop_back()
        } else {
            None
        };
        self.items.push_front(item);
        evicted
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Bounded undo/redo engine over boxed commands.
pub struct UndoRedo {
    undo_stack: DropoutStack<Box<dyn Command>>,
    redo_stack: Vec<Box<dyn Command>>,
}

impl UndoRedo {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo_stack: DropoutStack::new(capacity),
            redo_stack: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.undo_stack.max_len()
    }

    /// Change the history depth. Shrinking evicts the oldest undo entries
    /// immediately, with cleanup.
    pub fn set_capacity(&mut self, capacity: usize, scene: &mut dyn SceneGraph) {
        for mut evicted in self.undo_stack.set_max_len(capacity) {
            evicted.cleanup(scene);
        }
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Record an already-applied command. No-op at capacity 0. Inserting
    /// invalidates the redo stack: those commands are dropped without
    /// cleanup, since the states they would release still exist in the
    /// scene.
    pub fn insert(&mut self, command: Box<dyn Command>, scene: &mut dyn SceneGraph) {
        if self.capacity() == 0 {
            return;
        }
        if let Some(mut evicted) = self.undo_stack.push(command) {
            trace!("history full, evicting oldest command");
            evicted.cleanup(scene);
        }
        self.redo_stack.clear();
    }

    /// Run a command and record it.
    pub fn execute(
        &mut self,
        mut command: Box<dyn Command>,
        state: &mut GizmoState,
        scene: &mut dyn SceneGraph,
    ) {
        command.execute(state, scene);
        self.insert(command, scene);
    }

    /// Reverse the most recent command. Returns false on an empty stack.
    pub fn undo(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) -> bool {
        let Some(mut command) = self.undo_stack.pop() else {
            return false;
        };
        debug!("undo ({} remaining)", self.undo_stack.len());
        command.unexecute(state, scene);
        self.redo_stack.push(command);
        true
    }

    /// Re-apply the most recently undone command. Returns false on an empty
    /// stack. May evict (with cleanup) if the capacity was lowered since the
    /// command was undone.
    pub fn redo(&mut self, state: &mut GizmoState, scene: &mut dyn SceneGraph) -> bool {
        let Some(mut command) = self.redo_stack.pop() else {
            return false;
        };
        debug!("redo ({} remaining)", self.redo_stack.len());
        command.execute(state, scene);
        if let Some(mut evicted) = self.undo_stack.push(command) {
            evicted.cleanup(scene);
        }
        true
    }

    /// Drop both stacks without cleanup. For callers about to mutate the
    /// scene structurally, outside the engine's own mutation paths.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
