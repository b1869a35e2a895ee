//! # Tessel Buffer
//!
//! The editing core: piece-table storage, line cursor, selection and
//! undo/redo history.
//!
//! ## Layers
//!
//! ```text
//!   LineCursor / Selection      line + byte offset (+ visual column)
//!            │
//!        TextBuffer             Position <-> absolute byte offset
//!            │
//!        PieceTable             pieces + BufferCursor + coalescing
//!            │
//!      Piece / Store            span of a store + its newline range
//! ```
//!
//! ## Errors vs faults
//!
//! Positions handed in from outside are validated and rejected with a
//! [`BufferError`]. Broken internal invariants (a cursor outside its piece,
//! an unsorted newline index) are bugs and panic.
//!
//! This crate performs no I/O.

mod buffer;
mod cursor;
mod history;
mod piece;
mod piece_table;
mod selection;
mod text;

pub use buffer::{BufferConfig, TextBuffer};
pub use cursor::{LineCursor, Position};
pub use history::{Action, ActionGroup, ActionKind, History, Replay};
pub use piece::{Piece, Source, Store};
pub use piece_table::{BufferCursor, PieceTable};
pub use selection::Selection;
pub use text::{Line, Text, char_width, is_word_char};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{offset} is out of bounds")]
    PositionOutOfBounds { line: usize, offset: usize },

    #[error("Position {0} is not on a character boundary")]
    NotCharBoundary(Position),

    #[error("Invalid byte index: {0}")]
    InvalidByteIndex(usize),

    #[error("Range is inverted: start {start} is after end {end}")]
    InvalidRange { start: Position, end: Position },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_bytes(), 0);
        assert_eq!(buffer.bytes(), b"");
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TextBuffer::from("Hello, World!");
        assert_eq!(buffer.len_bytes(), 13);
        assert_eq!(buffer.contents(), "Hello, World!");
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert("Hello", Position::ZERO).unwrap();
        assert_eq!(buffer.contents(), "Hello");

        buffer.insert(", World!", Position::new(0, 5)).unwrap();
        assert_eq!(buffer.contents(), "Hello, World!");

        buffer
            .delete_range(Position::new(0, 5), Position::new(0, 7))
            .unwrap();
        assert_eq!(buffer.contents(), "HelloWorld!");
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("Line 1\nLine 2\nLine 3");
        assert_eq!(buffer.line_count(), 3);
        assert_eq!(buffer.line(0).unwrap().as_str(), "Line 1");
        assert_eq!(buffer.line(1).unwrap().as_str(), "Line 2");
        assert_eq!(buffer.line(2).unwrap().as_str(), "Line 3");
        assert_eq!(buffer.text().bytes(), buffer.bytes());
    }

    #[test]
    fn test_cursor_over_edited_buffer() {
        let mut buffer = TextBuffer::from("ab");
        buffer.split_line(0, 1).unwrap();
        let mut cursor = LineCursor::new(buffer.config());
        assert!(cursor.move_down(&buffer));
        assert!(cursor.move_eol(&buffer));
        assert_eq!(cursor.position(), Position::new(1, 1));
    }
}
