//! Positions and the line cursor.
//!
//! ## Learning: Newtype Pattern
//!
//! `Position` names a line and a byte offset within it, so the two
//! coordinates cannot be swapped at a call site the way a bare
//! `(usize, usize)` could.
//!
//! ## Byte offset vs visual offset
//!
//! `LineCursor` keeps two horizontal coordinates. The byte offset (`boff`)
//! is authoritative. The visual offset (`voff`) is the screen column and is
//! only a cache: vertical motions keep it as the sticky target column, and
//! every rune-walking motion recomputes it from `boff` first, because a
//! column inside a wide rune or a tab does not identify a byte position.

use serde::{Deserialize, Serialize};

use crate::text::{Line, is_word_char};
use crate::{BufferConfig, TextBuffer};

/// A position in the document.
///
/// `line` is 0-indexed; `offset` is a byte offset into that line and
/// always lies on a rune boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(line: usize, offset: usize) -> Self {
        Self { line, offset }
    }

    /// Position at the start of the document.
    pub const ZERO: Position = Position { line: 0, offset: 0 };

    /// Returns true if this position is before another.
    pub fn is_before(&self, other: &Position) -> bool {
        self.line < other.line || (self.line == other.line && self.offset < other.offset)
    }

    /// Returns true if this position is after another.
    pub fn is_after(&self, other: &Position) -> bool {
        other.is_before(self)
    }

    /// Where the cursor ends up after inserting `text` here.
    pub fn after_text(self, text: &str) -> Position {
        match text.rfind('\n') {
            Some(last) => Position {
                line: self.line + text.matches('\n').count(),
                offset: text.len() - last - 1,
            },
            None => Position {
                line: self.line,
                offset: self.offset + text.len(),
            },
        }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.offset.cmp(&other.offset),
            other => other,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display as 1-indexed for user-facing output
        write!(f, "{}:{}", self.line + 1, self.offset + 1)
    }
}

/// Line-oriented cursor driving all motion commands.
///
/// Every motion returns whether the cursor moved; motions at the edges of
/// the document are no-ops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineCursor {
    line: usize,
    boff: usize,
    voff: usize,
    tab_width: usize,
    page_size: usize,
}

impl LineCursor {
    /// Creates a cursor at the start of the document.
    pub fn new(config: &BufferConfig) -> Self {
        Self {
            line: 0,
            boff: 0,
            voff: 0,
            tab_width: config.tab_width,
            page_size: config.page_size,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.boff)
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Cached display column.
    pub fn visual_offset(&self) -> usize {
        self.voff
    }

    /// Places the cursor at `pos`, clamped into the document and snapped
    /// down to a rune boundary.
    pub fn set_position(&mut self, pos: Position, buf: &TextBuffer) {
        self.line = pos.line.min(buf.line_count() - 1);
        let line = line_at(buf, self.line);
        let mut boff = pos.offset.min(line.len());
        while !line.is_char_boundary(boff) {
            boff -= 1;
        }
        self.boff = boff;
        self.voff = line.visual_offset(boff, self.tab_width);
    }

    /// Recomputes the visual offset from the byte offset.
    pub fn reset(&mut self, buf: &TextBuffer) {
        let line = line_at(buf, self.line);
        self.voff = line.visual_offset(self.boff, self.tab_width);
    }

    // ==================== Rune motions ====================

    pub fn move_left(&mut self, buf: &TextBuffer) -> bool {
        self.reset(buf);
        let line = line_at(buf, self.line);
        if let Some(prev) = line.prev_boundary(self.boff) {
            self.boff = prev;
        } else if self.line > 0 {
            self.line -= 1;
            self.boff = line_at(buf, self.line).len();
        } else {
            return false;
        }
        self.reset(buf);
        true
    }

    pub fn move_right(&mut self, buf: &TextBuffer) -> bool {
        self.reset(buf);
        let line = line_at(buf, self.line);
        if let Some(next) = line.next_boundary(self.boff) {
            self.boff = next;
        } else if self.line + 1 < buf.line_count() {
            self.line += 1;
            self.boff = 0;
        } else {
            return false;
        }
        self.reset(buf);
        true
    }

    /// Forward to the end of the next word: skip non-word runes, then stop
    /// at the first non-word rune after a word run.
    pub fn move_eow(&mut self, buf: &TextBuffer) -> bool {
        self.reset(buf);
        let mut line = line_at(buf, self.line);
        if self.boff == line.len() {
            if self.line + 1 >= buf.line_count() {
                return false;
            }
            self.line += 1;
            self.boff = 0;
            line = line_at(buf, self.line);
        }
        let s = line.as_str();
        let mut stop = s.len();
        let mut in_word = false;
        for (i, c) in s[self.boff..].char_indices() {
            if is_word_char(c) {
                in_word = true;
            } else if in_word {
                stop = self.boff + i;
                break;
            }
        }
        self.boff = stop;
        self.reset(buf);
        true
    }

    /// Backward to the beginning of the previous word.
    pub fn move_bow(&mut self, buf: &TextBuffer) -> bool {
        self.reset(buf);
        let mut line = line_at(buf, self.line);
        if self.boff == 0 {
            if self.line == 0 {
                return false;
            }
            self.line -= 1;
            line = line_at(buf, self.line);
            self.boff = line.len();
        }
        let mut stop = 0;
        let mut in_word = false;
        for (i, c) in line.as_str()[..self.boff].char_indices().rev() {
            if is_word_char(c) {
                in_word = true;
                stop = i;
            } else if in_word {
                break;
            }
        }
        self.boff = stop;
        self.reset(buf);
        true
    }

    /// Tri-state home: first non-space column, then column 0, then the end
    /// of the previous line.
    pub fn move_bol(&mut self, buf: &TextBuffer) -> bool {
        self.reset(buf);
        let line = line_at(buf, self.line);
        if self.boff == 0 {
            if self.line == 0 {
                return false;
            }
            self.line -= 1;
            self.boff = line_at(buf, self.line).len();
        } else if line.as_str()[..self.boff].trim().is_empty() {
            self.boff = 0;
        } else {
            self.boff = line.first_non_space();
        }
        self.reset(buf);
        true
    }

    /// Tri-state end: last non-space column, then the line end, then the
    /// start of the next line.
    pub fn move_eol(&mut self, buf: &TextBuffer) -> bool {
        self.reset(buf);
        let line = line_at(buf, self.line);
        if self.boff == line.len() {
            if self.line + 1 >= buf.line_count() {
                return false;
            }
            self.line += 1;
            self.boff = 0;
        } else if line.as_str()[self.boff..].trim().is_empty() {
            self.boff = line.len();
        } else {
            self.boff = line.trimmed_end();
        }
        self.reset(buf);
        true
    }

    // ==================== Line motions ====================

    pub fn move_up(&mut self, buf: &TextBuffer) -> bool {
        if self.line == 0 {
            return false;
        }
        self.goto_visual(self.line - 1, buf);
        true
    }

    pub fn move_down(&mut self, buf: &TextBuffer) -> bool {
        if self.line + 1 >= buf.line_count() {
            return false;
        }
        self.goto_visual(self.line + 1, buf);
        true
    }

    pub fn page_up(&mut self, buf: &TextBuffer) -> bool {
        if self.line == 0 {
            return false;
        }
        self.goto_visual(self.line.saturating_sub(self.page_size), buf);
        true
    }

    pub fn page_down(&mut self, buf: &TextBuffer) -> bool {
        let last = buf.line_count() - 1;
        if self.line >= last {
            return false;
        }
        self.goto_visual((self.line + self.page_size).min(last), buf);
        true
    }

    pub fn move_bof(&mut self) -> bool {
        let moved = self.line != 0 || self.boff != 0;
        self.line = 0;
        self.boff = 0;
        self.voff = 0;
        moved
    }

    pub fn move_eof(&mut self, buf: &TextBuffer) -> bool {
        let before = self.position();
        self.line = buf.line_count() - 1;
        self.boff = line_at(buf, self.line).len();
        self.reset(buf);
        self.position() != before
    }

    /// Jumps to the start of line `n`, clamped to the last line.
    pub fn goto_line(&mut self, n: usize, buf: &TextBuffer) -> bool {
        let before = self.position();
        self.line = n.min(buf.line_count() - 1);
        self.boff = 0;
        self.voff = 0;
        self.position() != before
    }

    /// Moves to `line`, keeping the sticky visual column.
    fn goto_visual(&mut self, line: usize, buf: &TextBuffer) {
        self.line = line;
        self.boff = line_at(buf, line).offset(self.voff, self.tab_width);
    }
}

/// The cursor's line always exists; anything else is a caller bug.
fn line_at(buf: &TextBuffer, line: usize) -> Line {
    buf.line(line)
        .unwrap_or_else(|e| panic!("line cursor out of bounds: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> LineCursor {
        LineCursor::new(&BufferConfig::default())
    }

    #[test]
    fn test_position_ordering() {
        let p1 = Position::new(1, 5);
        let p2 = Position::new(2, 3);
        let p3 = Position::new(1, 10);

        assert!(p1.is_before(&p2));
        assert!(p1.is_before(&p3));
        assert!(p2.is_after(&p1));
        assert!(p2.is_after(&p3));
    }

    #[test]
    fn test_after_text() {
        let p = Position::new(2, 3);
        assert_eq!(p.after_text("abc"), Position::new(2, 6));
        assert_eq!(p.after_text("ab\ncd\nxyz"), Position::new(4, 3));
        assert_eq!(p.after_text("\n"), Position::new(3, 0));
    }

    #[test]
    fn test_left_right_wrap_and_edges() {
        let buf = TextBuffer::from("ab\ncd");
        let mut c = cursor();
        assert!(!c.move_left(&buf));
        assert_eq!(c.position(), Position::ZERO);

        c.set_position(Position::new(0, 2), &buf);
        assert!(c.move_right(&buf));
        assert_eq!(c.position(), Position::new(1, 0));
        assert!(c.move_left(&buf));
        assert_eq!(c.position(), Position::new(0, 2));

        c.move_eof(&buf);
        assert!(!c.move_right(&buf));
        assert_eq!(c.position(), Position::new(1, 2));
    }

    #[test]
    fn test_vertical_keeps_visual_column() {
        let buf = TextBuffer::from("\tabc\nx\n漢字abc");
        let mut c = cursor();
        c.set_position(Position::new(0, 2), &buf);
        assert_eq!(c.visual_offset(), 5);

        assert!(c.move_down(&buf));
        assert_eq!(c.position(), Position::new(1, 1));
        assert!(c.move_down(&buf));
        // 漢字 fill columns 0..4, so column 5 is 'b'
        assert_eq!(c.position(), Position::new(2, 7));
        assert!(!c.move_down(&buf));
        assert!(c.move_up(&buf));
        assert!(c.move_up(&buf));
        assert_eq!(c.position(), Position::new(0, 2));
    }

    #[test]
    fn test_vertical_never_lands_inside_wide_rune() {
        let buf = TextBuffer::from("abc\n漢字");
        let mut c = cursor();
        c.set_position(Position::new(0, 1), &buf);
        c.move_down(&buf);
        assert_eq!(c.position(), Position::new(1, 0));
        c.move_up(&buf);
        c.set_position(Position::new(0, 3), &buf);
        c.move_down(&buf);
        assert_eq!(c.position(), Position::new(1, 3));
    }

    #[test]
    fn test_word_motions() {
        let buf = TextBuffer::from("  foo.bar baz\nqux");
        let mut c = cursor();
        assert!(c.move_eow(&buf));
        assert_eq!(c.position(), Position::new(0, 5));
        assert!(c.move_eow(&buf));
        assert_eq!(c.position(), Position::new(0, 9));
        assert!(c.move_eow(&buf));
        assert_eq!(c.position(), Position::new(0, 13));
        assert!(c.move_eow(&buf));
        assert_eq!(c.position(), Position::new(1, 3));
        assert!(!c.move_eow(&buf));

        assert!(c.move_bow(&buf));
        assert_eq!(c.position(), Position::new(1, 0));
        assert!(c.move_bow(&buf));
        assert_eq!(c.position(), Position::new(0, 10));
        assert!(c.move_bow(&buf));
        assert_eq!(c.position(), Position::new(0, 6));
        assert!(c.move_bow(&buf));
        assert_eq!(c.position(), Position::new(0, 2));
        assert!(c.move_bow(&buf));
        assert_eq!(c.position(), Position::ZERO);
        assert!(!c.move_bow(&buf));
    }

    #[test]
    fn test_bol_tri_state() {
        let buf = TextBuffer::from("x\n    foo bar");
        let mut c = cursor();
        c.set_position(Position::new(1, 9), &buf);
        assert!(c.move_bol(&buf));
        assert_eq!(c.position(), Position::new(1, 4));
        assert!(c.move_bol(&buf));
        assert_eq!(c.position(), Position::new(1, 0));
        assert!(c.move_bol(&buf));
        assert_eq!(c.position(), Position::new(0, 1));

        c.set_position(Position::new(1, 2), &buf);
        assert!(c.move_bol(&buf));
        assert_eq!(c.position(), Position::new(1, 0));
    }

    #[test]
    fn test_eol_tri_state() {
        let buf = TextBuffer::from("foo bar   \nx");
        let mut c = cursor();
        assert!(c.move_eol(&buf));
        assert_eq!(c.position(), Position::new(0, 7));
        assert!(c.move_eol(&buf));
        assert_eq!(c.position(), Position::new(0, 10));
        assert!(c.move_eol(&buf));
        assert_eq!(c.position(), Position::new(1, 0));
        c.move_eof(&buf);
        assert!(!c.move_eol(&buf));
    }

    #[test]
    fn test_paging_clamps() {
        let text: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
        let buf = TextBuffer::from(text.join("\n").as_str());
        let mut c = cursor();
        assert!(!c.page_up(&buf));
        assert_eq!(c.position(), Position::ZERO);

        c.set_position(Position::new(0, 5), &buf);
        assert!(c.page_down(&buf));
        assert_eq!(c.position(), Position::new(8, 5));
        assert!(c.page_down(&buf));
        assert!(c.page_down(&buf));
        assert_eq!(c.line(), 19);
        assert!(!c.page_down(&buf));
        assert!(c.page_up(&buf));
        assert_eq!(c.line(), 11);
    }

    #[test]
    fn test_goto_and_file_edges() {
        let buf = TextBuffer::from("a\nbb\nccc");
        let mut c = cursor();
        assert!(c.goto_line(1, &buf));
        assert_eq!(c.position(), Position::new(1, 0));
        assert!(c.goto_line(99, &buf));
        assert_eq!(c.position(), Position::new(2, 0));
        assert!(c.move_eof(&buf));
        assert_eq!(c.position(), Position::new(2, 3));
        assert!(!c.move_eof(&buf));
        assert!(c.move_bof());
        assert!(!c.move_bof());
    }
}
