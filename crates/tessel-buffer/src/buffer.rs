//! Document buffer: the position-based editing API over the piece table.
//!
//! ## Why a piece table?
//!
//! Typing into a large document must not copy the document. The piece
//! table keeps the text as a list of spans and only ever splits the span
//! under the cursor; consecutive keystrokes extend one fresh span.
//!
//! ## One source of truth
//!
//! `TextBuffer` owns the only copy of the text. Lines are cut out of the
//! piece table on request (`line`, `text`) using the newline offsets each
//! piece caches, and positions are translated to absolute byte offsets
//! the same way.

use crate::history::{Action, ActionKind, Replay};
use crate::piece_table::PieceTable;
use crate::text::{Line, Text};
use crate::{BufferError, BufferResult, Position};

/// Configuration for buffer behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Columns occupied by a tab.
    pub tab_width: usize,

    /// Lines moved by page up/down.
    pub page_size: usize,

    /// Maximum history groups to keep (0 = unbounded).
    pub max_history: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            page_size: 8,
            max_history: 1000,
        }
    }
}

/// A text document backed by a piece table.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    table: PieceTable,

    /// Whether the buffer has unsaved changes
    modified: bool,

    config: BufferConfig,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use tessel_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// assert_eq!(buffer.line_count(), 1);
    /// ```
    pub fn new() -> Self {
        Self::with_config(BufferConfig::default())
    }

    pub fn with_config(config: BufferConfig) -> Self {
        Self {
            table: PieceTable::new(),
            modified: false,
            config,
        }
    }

    /// Loads text, treating `\r\n` and `\n` alike as line breaks.
    pub fn from_text(text: &str, config: BufferConfig) -> Self {
        Self::from_lines(&Text::parse(text), config)
    }

    pub fn from_lines(text: &Text, config: BufferConfig) -> Self {
        Self {
            table: PieceTable::from_bytes(text.bytes()),
            modified: false,
            config,
        }
    }

    // ==================== Text Access ====================

    /// Canonical serialization: lines joined with `\n`.
    pub fn bytes(&self) -> Vec<u8> {
        self.table.bytes()
    }

    /// The whole document as a string.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.table.bytes()).into_owned()
    }

    /// Returns line `line` without its newline.
    pub fn line(&self, line: usize) -> BufferResult<Line> {
        let start = self
            .table
            .line_start(line)
            .ok_or(BufferError::PositionOutOfBounds { line, offset: 0 })?;
        let end = self
            .table
            .line_start(line + 1)
            .map_or(self.table.len(), |next| next - 1);
        let bytes = self.table.slice(start, end);
        Ok(Line::new(String::from_utf8_lossy(&bytes)))
    }

    /// The line view of the whole document.
    pub fn text(&self) -> Text {
        Text::parse(&self.contents())
    }

    /// Text between two positions.
    pub fn slice(&self, min: Position, max: Position) -> BufferResult<String> {
        let (start, end) = self.range(min, max)?;
        Ok(String::from_utf8_lossy(&self.table.slice(start, end)).into_owned())
    }

    // ==================== Measurements ====================

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.table.len()
    }

    /// Number of lines. An empty buffer has 1 line; a trailing `\n` adds
    /// an empty last line.
    #[inline]
    pub fn line_count(&self) -> usize {
        self.table.newline_count() + 1
    }

    /// The last position in the document.
    pub fn end_position(&self) -> Position {
        let line = self.line_count() - 1;
        let len = self.line(line).map_or(0, |l| l.len());
        Position::new(line, len)
    }

    // ==================== Position Conversion ====================

    /// Converts a position to an absolute byte offset, rejecting positions
    /// past the end of their line or inside a rune.
    pub fn offset_of(&self, pos: Position) -> BufferResult<usize> {
        let line = self.line(pos.line)?;
        if pos.offset > line.len() {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                offset: pos.offset,
            });
        }
        if !line.is_char_boundary(pos.offset) {
            return Err(BufferError::NotCharBoundary(pos));
        }
        let start = self.table.line_start(pos.line).unwrap_or_default();
        Ok(start + pos.offset)
    }

    /// Converts an absolute byte offset to a position.
    pub fn position_of(&self, offset: usize) -> BufferResult<Position> {
        if offset > self.table.len() {
            return Err(BufferError::InvalidByteIndex(offset));
        }
        let (line, last) = self.table.newlines_before(offset);
        let start = last.map_or(0, |n| n + 1);
        Ok(Position::new(line, offset - start))
    }

    /// Checks that `pos` addresses a rune boundary inside the document.
    pub fn validate(&self, pos: Position) -> BufferResult<()> {
        self.offset_of(pos).map(|_| ())
    }

    fn range(&self, min: Position, max: Position) -> BufferResult<(usize, usize)> {
        if max < min {
            return Err(BufferError::InvalidRange { start: min, end: max });
        }
        Ok((self.offset_of(min)?, self.offset_of(max)?))
    }

    // ==================== Mutations ====================

    /// Inserts `text` at `pos` and returns the position just after it.
    ///
    /// Text goes in one rune at a time through the piece table, so
    /// consecutive single-character inserts at the advancing cursor all
    /// extend the same piece.
    pub fn insert(&mut self, text: &str, pos: Position) -> BufferResult<Position> {
        let offset = self.offset_of(pos)?;
        if text.is_empty() {
            return Ok(pos);
        }
        self.table.seek(offset);
        for c in text.chars() {
            self.table.write(c);
        }
        self.modified = true;
        Ok(pos.after_text(text))
    }

    /// Removes the text between `min` and `max` and returns it.
    pub fn delete_range(&mut self, min: Position, max: Position) -> BufferResult<String> {
        let (start, end) = self.range(min, max)?;
        if start == end {
            return Ok(String::new());
        }
        self.table.seek(start);
        let removed = self.table.delete_span(end - start);
        self.modified = true;
        Ok(String::from_utf8_lossy(&removed).into_owned())
    }

    /// Joins line `line` with the next one. Returns the join point, or
    /// `None` on the last line.
    pub fn join_line(&mut self, line: usize) -> BufferResult<Option<Position>> {
        let len = self.line(line)?.len();
        if line + 1 >= self.line_count() {
            return Ok(None);
        }
        let at = Position::new(line, len);
        let offset = self.offset_of(at)?;
        self.table.seek(offset);
        self.table.delete();
        self.modified = true;
        Ok(Some(at))
    }

    /// Splits line `line` at byte offset `offset`. Returns the start of the
    /// new line.
    pub fn split_line(&mut self, line: usize, offset: usize) -> BufferResult<Position> {
        self.insert("\n", Position::new(line, offset))
    }

    // ==================== State Queries ====================

    /// Returns true if the buffer has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clears the modified flag after the document was written out.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// The underlying piece table.
    pub fn pieces(&self) -> &PieceTable {
        &self.table
    }
}

impl Replay for TextBuffer {
    fn replay(&mut self, action: &Action) -> BufferResult<()> {
        match action.kind {
            ActionKind::Insert => {
                self.insert(&action.value, action.before)?;
            }
            ActionKind::DeleteRange => {
                self.delete_range(action.before, action.after)?;
            }
            ActionKind::SplitLine => {
                self.split_line(action.before.line, action.before.offset)?;
            }
            ActionKind::JoinLine => {
                self.join_line(action.before.line)?;
            }
        }
        Ok(())
    }

    fn revert(&mut self, action: &Action) -> BufferResult<()> {
        match action.kind {
            ActionKind::Insert => {
                self.delete_range(action.before, action.after)?;
            }
            ActionKind::DeleteRange => {
                self.insert(&action.value, action.before)?;
            }
            ActionKind::SplitLine => {
                self.join_line(action.before.line)?;
            }
            ActionKind::JoinLine => {
                self.split_line(action.before.line, action.before.offset)?;
            }
        }
        Ok(())
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self::from_text(s, BufferConfig::default())
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
