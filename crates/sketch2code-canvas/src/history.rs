//! Linear undo/redo history of full-canvas snapshots.
//!
//! Pushing while the cursor is behind the tail prunes the redo branch; entries
//! before the cursor are never touched.

use crate::snapshot::CanvasSnapshot;

#[derive(Debug, Clone, Default)]
pub struct History {
    snapshots: Vec<CanvasSnapshot>,
    cursor: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// A history holding exactly `initial`.
    pub fn with_initial(initial: CanvasSnapshot) -> Self {
        Self {
            snapshots: vec![initial],
            cursor: 0,
        }
    }

    /// Drop everything after the cursor, append `snapshot`, and move onto it.
    pub fn push(&mut self, snapshot: CanvasSnapshot) {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;
    }

    /// Step back one snapshot. `None` at the start.
    pub fn undo(&mut self) -> Option<&CanvasSnapshot> {
        if self.can_undo() {
            self.cursor -= 1;
            self.snapshots.get(self.cursor)
        } else {
            None
        }
    }

    /// Step forward one snapshot. `None` at the tail.
    pub fn redo(&mut self) -> Option<&CanvasSnapshot> {
        if self.can_redo() {
            self.cursor += 1;
            self.snapshots.get(self.cursor)
        } else {
            None
        }
    }

    /// Replace all entries with a single snapshot.
    pub fn reset(&mut self, snapshot: CanvasSnapshot) {
        self.snapshots.clear();
        self.snapshots.push(snapshot);
        self.cursor = 0;
    }

    pub fn current(&self) -> Option<&CanvasSnapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn entries(&self) -> &[CanvasSnapshot] {
        &self.snapshots
    }
}
