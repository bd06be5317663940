use std::collections::VecDeque;
use chrono::{DateTime, Utc};

/// One grade write: enough to put the cell back the way it was.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeEdit {
    pub row: usize,
    pub column: usize,
    pub previous: String,
    pub value: String,
    pub at: DateTime<Utc>,
}

impl GradeEdit {
    pub fn new(row: usize, column: usize, previous: String, value: String) -> Self {
        Self { row, column, previous, value, at: Utc::now() }
    }
}

/// Bounded undo/redo log owned by whoever owns the sheet.
#[derive(Debug, Clone)]
pub struct EditHistory {
    undo: VecDeque<GradeEdit>,
    redo: Vec<GradeEdit>,
    capacity: usize,
}

impl EditHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a completed write. Clears the redo side; drops the oldest edit when full.
    pub fn record(&mut self, edit: GradeEdit) {
        while self.undo.len() >= self.capacity {
            if let Some(dropped) = self.undo.pop_front() {
                log::debug!("[EditHistory] Full, dropping edit of row {} from {}", dropped.row, dropped.at);
            }
        }
        self.undo.push_back(edit);
        self.redo.clear();
    }

    /// Take the most recent edit for undoing.
    pub fn pop_undo(&mut self) -> Option<GradeEdit> {
        self.undo.pop_back()
    }

    /// Mark an edit as undone so it can be redone.
    pub fn push_redo(&mut self, edit: GradeEdit) {
        self.redo.push(edit);
    }

    pub fn pop_redo(&mut self) -> Option<GradeEdit> {
        self.redo.pop()
    }

    /// Put a redone edit back on the undo side without clearing redo.
    pub fn push_undo(&mut self, edit: GradeEdit) {
        if self.undo.len() >= self.capacity {
            self.undo.pop_front();
        }
        self.undo.push_back(edit);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
