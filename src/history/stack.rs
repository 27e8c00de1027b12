use std::collections::VecDeque;

use crate::history::snapshot::Snapshot;

/// Linear undo/redo over scene snapshots with a bounded depth.
///
/// Both stacks evict their oldest entry first once `capacity` is exceeded.
#[derive(Clone, Debug)]
pub struct History {
    undo: VecDeque<Snapshot>,
    redo: VecDeque<Snapshot>,
    capacity: usize,
    generation: u64,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: VecDeque::new(),
            capacity: capacity.max(1),
            generation: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Bumped by every push, undo, redo and clear.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Oldest first.
    pub fn undo_entries(&self) -> impl Iterator<Item = &Snapshot> {
        self.undo.iter()
    }

    fn push_bounded(stack: &mut VecDeque<Snapshot>, capacity: usize, snapshot: Snapshot) {
        stack.push_back(snapshot);
        while stack.len() > capacity {
            stack.pop_front();
            tracing::debug!(capacity, "history full, evicted oldest snapshot");
        }
    }

    /// Record the state before a new action. Invalidates redo.
    pub fn push(&mut self, snapshot: Snapshot) {
        Self::push_bounded(&mut self.undo, self.capacity, snapshot);
        self.redo.clear();
        self.generation += 1;
    }

    /// Pop the previous state; `current` (if captured) becomes redoable.
    pub fn undo(&mut self, current: Option<Snapshot>) -> Option<Snapshot> {
        let prev = self.undo.pop_back()?;
        self.generation += 1;
        if let Some(current) = current {
            Self::push_bounded(&mut self.redo, self.capacity, current);
        }
        Some(prev)
    }

    /// Pop the next state; `current` (if captured) becomes undoable again.
    pub fn redo(&mut self, current: Option<Snapshot>) -> Option<Snapshot> {
        let next = self.redo.pop_back()?;
        self.generation += 1;
        if let Some(current) = current {
            Self::push_bounded(&mut self.undo, self.capacity, current);
        }
        Some(next)
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.generation += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/history/stack.rs"]
mod tests;
