//! Undo/redo history management.
//!
//! ## Learning: The Command Pattern
//!
//! Each edit is stored as an [`Action`] that can be:
//! - Replayed (applied to the buffer again after an undo)
//! - Reverted (its inverse applied)
//!
//! Actions are stored in groups, one per user gesture, so a gesture like
//! "delete the selection and type a character" undoes in one step.
//!
//! ## Head pointer
//!
//! The history is a list of groups plus a `head` in `0..=len`. Groups
//! before `head` are applied to the document, groups from `head` on are
//! the redo branch. Adding a group discards that branch immediately.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::{BufferResult, Position};

/// The type of edit an action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// `value` was inserted at `before`, ending at `after`.
    Insert,
    /// `value` was removed from `before..after`.
    DeleteRange,
    /// Line `before.line` was split at `before.offset`.
    SplitLine,
    /// Line `before.line` was joined with the next one at `before`.
    JoinLine,
}

/// A single, already executed edit.
///
/// `value` is filled in after execution (for deletions it is the removed
/// text) so the action can be reverted and replayed exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub kind: ActionKind,
    pub value: String,
    pub before: Position,
    pub after: Position,
}

impl Action {
    pub fn insert(value: impl Into<String>, before: Position, after: Position) -> Self {
        Self {
            kind: ActionKind::Insert,
            value: value.into(),
            before,
            after,
        }
    }

    pub fn delete_range(value: impl Into<String>, before: Position, after: Position) -> Self {
        Self {
            kind: ActionKind::DeleteRange,
            value: value.into(),
            before,
            after,
        }
    }

    pub fn split_line(at: Position) -> Self {
        Self {
            kind: ActionKind::SplitLine,
            value: String::new(),
            before: at,
            after: Position::new(at.line + 1, 0),
        }
    }

    pub fn join_line(at: Position) -> Self {
        Self {
            kind: ActionKind::JoinLine,
            value: String::new(),
            before: at,
            after: Position::new(at.line + 1, 0),
        }
    }
}

/// A group of actions that are undone/redone together, with the cursor
/// positions around the gesture that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionGroup {
    pub actions: Vec<Action>,
    pub cursor_before: Position,
    pub cursor_after: Position,
}

impl ActionGroup {
    pub fn new(actions: Vec<Action>, cursor_before: Position, cursor_after: Position) -> Self {
        Self {
            actions,
            cursor_before,
            cursor_after,
        }
    }
}

/// Something history can apply actions to.
pub trait Replay {
    /// Applies the forward effect of an action.
    fn replay(&mut self, action: &Action) -> BufferResult<()>;

    /// Applies the inverse effect of an action.
    fn revert(&mut self, action: &Action) -> BufferResult<()>;
}

/// Manages undo/redo history.
#[derive(Debug, Clone, Default)]
pub struct History {
    groups: Vec<ActionGroup>,
    head: usize,
    /// Maximum number of groups to keep; 0 keeps everything.
    max_len: usize,
}

impl History {
    /// Creates a history keeping at most `max_len` groups (0 = unbounded).
    pub fn new(max_len: usize) -> Self {
        Self {
            groups: Vec::new(),
            head: 0,
            max_len,
        }
    }

    /// Records a gesture. Any groups after `head` are discarded.
    pub fn add(&mut self, group: ActionGroup) {
        if group.actions.is_empty() {
            return;
        }
        if self.head < self.groups.len() {
            debug!(dropped = self.groups.len() - self.head, "discarding redo branch");
            self.groups.truncate(self.head);
        }
        self.groups.push(group);
        if self.max_len > 0 && self.groups.len() > self.max_len {
            let excess = self.groups.len() - self.max_len;
            self.groups.drain(..excess);
        }
        self.head = self.groups.len();
    }

    /// Appends actions to the newest group so a run of keystrokes undoes in
    /// one step. Returns false (and records nothing) when the newest group
    /// is not at `head`.
    pub fn extend_last(&mut self, actions: Vec<Action>, cursor_after: Position) -> bool {
        if self.head == 0 || self.head != self.groups.len() {
            return false;
        }
        let last = &mut self.groups[self.head - 1];
        last.actions.extend(actions);
        last.cursor_after = cursor_after;
        true
    }

    /// Reverts the group before `head`.
    ///
    /// Actions are reverted last-to-first, since each was recorded against
    /// the document as its predecessors left it. Returns the cursor to
    /// restore, or `None` when there is nothing to undo. If an action fails
    /// the group is rolled forward again and `head` is left untouched.
    pub fn undo<R: Replay>(&mut self, target: &mut R) -> BufferResult<Option<Position>> {
        if self.head == 0 {
            return Ok(None);
        }
        let group = &self.groups[self.head - 1];
        let cursor = group.cursor_before;
        for (i, action) in group.actions.iter().enumerate().rev() {
            if let Err(e) = target.revert(action) {
                error!(%e, "undo failed, restoring group");
                for done in &group.actions[i + 1..] {
                    if let Err(e) = target.replay(done) {
                        panic!("history rollback failed: {e}");
                    }
                }
                return Err(e);
            }
        }
        self.head -= 1;
        debug!(head = self.head, "undo");
        Ok(Some(cursor))
    }

    /// Replays the group at `head`. Returns the cursor to restore, or
    /// `None` when there is nothing to redo.
    pub fn redo<R: Replay>(&mut self, target: &mut R) -> BufferResult<Option<Position>> {
        if self.head == self.groups.len() {
            return Ok(None);
        }
        let group = &self.groups[self.head];
        let cursor = group.cursor_after;
        for (i, action) in group.actions.iter().enumerate() {
            if let Err(e) = target.replay(action) {
                error!(%e, "redo failed, restoring group");
                for done in group.actions[..i].iter().rev() {
                    if let Err(e) = target.revert(done) {
                        panic!("history rollback failed: {e}");
                    }
                }
                return Err(e);
            }
        }
        self.head += 1;
        debug!(head = self.head, "redo");
        Ok(Some(cursor))
    }

    pub fn can_undo(&self) -> bool {
        self.head > 0
    }

    pub fn can_redo(&self) -> bool {
        self.head < self.groups.len()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[ActionGroup] {
        &self.groups
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.head = 0;
    }
}
