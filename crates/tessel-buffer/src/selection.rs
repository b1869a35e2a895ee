//! Text selection handling.
//!
//! A selection records its two endpoints exactly as the user placed them;
//! `min_max` orders them on demand. Block operations (indent, unindent,
//! comment toggling, bulk delete) ask `lines()` which lines they touch.

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::Position;

/// A possibly-reversed range between two positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    on: bool,
    start: Position,
    end: Position,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turns the selection on, anchored at `pos`.
    pub fn on(&mut self, pos: Position) {
        self.on = true;
        self.start = pos;
        self.end = pos;
    }

    pub fn off(&mut self) {
        self.on = false;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn set_start(&mut self, pos: Position) {
        self.start = pos;
    }

    pub fn set_end(&mut self, pos: Position) {
        self.end = pos;
    }

    /// Moves the active end while the selection is on.
    pub fn extend_to(&mut self, pos: Position) {
        if self.on {
            self.end = pos;
        }
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        !self.on || self.start == self.end
    }

    /// The endpoints in document order.
    pub fn min_max(&self) -> (Position, Position) {
        if self.end < self.start {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        }
    }

    /// Lines touched by the selection.
    ///
    /// The last line is left out when the selection ends at its offset 0:
    /// selecting `(0,3)..(1,0)` touches line 0 only.
    pub fn lines(&self) -> Range<usize> {
        let (min, max) = self.min_max();
        let last = if max.offset == 0 { max.line } else { max.line + 1 };
        min.line..last.max(min.line)
    }

    /// Half-open containment: the first line excludes offsets before the
    /// start, the last line excludes offsets at or after the end.
    pub fn contains(&self, pos: Position) -> bool {
        let (min, max) = self.min_max();
        if pos.line < min.line || pos.line > max.line {
            return false;
        }
        if pos.line == min.line && pos.offset < min.offset {
            return false;
        }
        if pos.line == max.line && pos.offset >= max.offset {
            return false;
        }
        true
    }
}
