//! Piece-table storage with an integrated edit cursor.
//!
//! The document is the concatenation of an ordered list of [`Piece`]s.
//! Edits never copy the whole document: a write either extends the piece
//! that was just created (coalescing consecutive keystrokes) or inserts a
//! fresh one-rune piece after splitting the piece under the cursor.
//!
//! ```text
//!   pieces:  [ "this is" ][ "n't" ][ " sparta." ]
//!   cursor:                  ^ At { piece: 1, offset: 0 }
//! ```
//!
//! The cursor is a [`BufferCursor`], either inside a piece or at the end
//! sentinel. Inside a piece the offset is always strictly less than the
//! piece length; reaching the end of a piece moves the cursor to the start
//! of the next one.

use std::sync::Arc;

use tracing::trace;

use crate::piece::{Piece, Source, Store, utf8_width};

/// Location of the edit cursor inside the piece table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferCursor {
    /// Inside `pieces[piece]`, before the byte at `offset`.
    At { piece: usize, offset: usize },
    /// After the last byte of the document.
    End,
}

/// The loaded text, shared between clones, and the append-only store
/// typed runes go to.
#[derive(Debug, Clone, Default)]
struct Stores {
    original: Arc<Store>,
    added: Store,
}

impl Stores {
    #[inline]
    fn get(&self, source: Source) -> &Store {
        match source {
            Source::Original => &*self.original,
            Source::Added => &self.added,
        }
    }
}

/// Ordered pieces plus the cursor that edits them.
#[derive(Debug, Clone)]
pub struct PieceTable {
    pieces: Vec<Piece>,
    stores: Stores,
    cursor: BufferCursor,
    /// Set by `write` when it created or extended the piece just before
    /// the cursor; any other operation clears it.
    appending: bool,
    len: usize,
    /// Total bytes ever scanned while building newline indexes.
    scanned: usize,
}

impl PieceTable {
    /// Creates an empty table. An empty document has no pieces.
    pub fn new() -> Self {
        Self {
            pieces: Vec::new(),
            stores: Stores::default(),
            cursor: BufferCursor::End,
            appending: false,
            len: 0,
            scanned: 0,
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let mut table = Self::new();
        if !bytes.is_empty() {
            let store = Store::new(bytes);
            table.len = store.len();
            table.scanned = store.len();
            table.pieces.push(Piece::new(Source::Original, &store, 0, store.len()));
            table.stores.original = Arc::new(store);
            table.cursor = BufferCursor::At { piece: 0, offset: 0 };
        }
        table
    }

    // ==================== Queries ====================

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn cursor(&self) -> BufferCursor {
        self.cursor
    }

    #[inline]
    pub fn is_appending(&self) -> bool {
        self.appending
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// The store pieces with the given source point into.
    pub fn store(&self, source: Source) -> &Store {
        self.stores.get(source)
    }

    /// Bytes of `pieces[index]`.
    pub fn piece_bytes(&self, index: usize) -> &[u8] {
        let piece = &self.pieces[index];
        piece.bytes(self.stores.get(piece.source()))
    }

    /// Bytes scanned for newlines since the table was created.
    pub fn scanned_bytes(&self) -> usize {
        self.scanned
    }

    /// Bytes held by both stores. Only writes make this grow; splitting
    /// and deleting never copy text.
    pub fn stored_bytes(&self) -> usize {
        self.stores.original.len() + self.stores.added.len()
    }

    /// The whole document.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for i in 0..self.pieces.len() {
            out.extend_from_slice(self.piece_bytes(i));
        }
        out
    }

    /// Bytes in `[start, end)`.
    pub fn slice(&self, start: usize, end: usize) -> Vec<u8> {
        assert!(start <= end && end <= self.len, "slice {start}..{end} outside 0..{}", self.len);
        let mut out = Vec::with_capacity(end - start);
        let mut piece_start = 0;
        for (i, piece) in self.pieces.iter().enumerate() {
            let piece_end = piece_start + piece.len();
            if piece_end > start && piece_start < end {
                let from = start.max(piece_start) - piece_start;
                let to = end.min(piece_end) - piece_start;
                out.extend_from_slice(&self.piece_bytes(i)[from..to]);
            }
            if piece_end >= end {
                break;
            }
            piece_start = piece_end;
        }
        out
    }

    pub fn newline_count(&self) -> usize {
        self.pieces.iter().map(Piece::newline_count).sum()
    }

    /// Absolute byte offset where line `line` starts, from the cached
    /// newline offsets.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return Some(0);
        }
        let mut remaining = line;
        let mut piece_start = 0;
        for piece in &self.pieces {
            let count = piece.newline_count();
            if remaining <= count {
                let store = self.stores.get(piece.source());
                return Some(piece_start + piece.newline(store, remaining - 1) + 1);
            }
            remaining -= count;
            piece_start += piece.len();
        }
        None
    }

    /// Number of newlines before `offset` and the offset of the last one.
    pub fn newlines_before(&self, offset: usize) -> (usize, Option<usize>) {
        let mut count = 0;
        let mut last = None;
        let mut piece_start = 0;
        for piece in &self.pieces {
            if piece_start >= offset {
                break;
            }
            let store = self.stores.get(piece.source());
            let idx = piece.newlines_below(store, offset - piece_start);
            if idx > 0 {
                count += idx;
                last = Some(piece_start + piece.newline(store, idx - 1));
            }
            piece_start += piece.len();
        }
        (count, last)
    }

    /// Absolute byte offset of the cursor.
    pub fn byte_offset(&self) -> usize {
        match self.cursor {
            BufferCursor::At { piece, offset } => {
                self.pieces[..piece].iter().map(Piece::len).sum::<usize>() + offset
            }
            BufferCursor::End => self.len,
        }
    }

    // ==================== Cursor placement ====================

    /// Moves the cursor to an absolute byte offset.
    ///
    /// Seeking to where the cursor already is keeps `appending` set, so
    /// keystrokes delivered through position-based inserts still coalesce.
    pub fn seek(&mut self, offset: usize) {
        assert!(offset <= self.len, "seek to {offset} past end {}", self.len);
        if self.byte_offset() == offset {
            return;
        }
        self.appending = false;
        let mut piece_start = 0;
        for (i, piece) in self.pieces.iter().enumerate() {
            if offset < piece_start + piece.len() {
                self.cursor = BufferCursor::At { piece: i, offset: offset - piece_start };
                return;
            }
            piece_start += piece.len();
        }
        self.cursor = BufferCursor::End;
    }

    pub fn goto_start(&mut self) {
        self.appending = false;
        self.cursor = self.cursor_at(0, 0);
    }

    pub fn goto_end(&mut self) {
        self.appending = false;
        self.cursor = BufferCursor::End;
    }

    /// Steps over one codepoint; `\r\n` counts as one step. Returns false
    /// at the end sentinel.
    pub fn move_next(&mut self) -> bool {
        self.appending = false;
        let BufferCursor::At { piece, offset } = self.cursor else {
            return false;
        };
        let lead = self.piece_bytes(piece)[offset];
        let mut step = utf8_width(lead);
        if lead == b'\r' && self.byte_at(piece, offset + 1) == Some(b'\n') {
            step = 2;
        }
        self.advance(step);
        true
    }

    /// Steps back over one codepoint; `\r\n` counts as one step. Returns
    /// false at document start.
    pub fn move_prev(&mut self) -> bool {
        self.appending = false;
        let Some((piece, start)) = self.prev_char() else {
            return false;
        };
        let bytes = self.piece_bytes(piece);
        let mut target = (piece, start);
        if bytes[start] == b'\n' {
            if start > 0 && bytes[start - 1] == b'\r' {
                target = (piece, start - 1);
            } else if start == 0 && piece > 0 {
                let prev = self.piece_bytes(piece - 1);
                if prev[prev.len() - 1] == b'\r' {
                    target = (piece - 1, prev.len() - 1);
                }
            }
        }
        self.cursor = BufferCursor::At { piece: target.0, offset: target.1 };
        true
    }

    /// Moves onto the first newline strictly after the cursor, or to the
    /// end sentinel when there is none.
    pub fn goto_next_line(&mut self) {
        self.appending = false;
        let BufferCursor::At { piece, offset } = self.cursor else {
            return;
        };
        if let Some(n) = self.pieces[piece].newline_after(self.store_of(piece), offset) {
            self.cursor = BufferCursor::At { piece, offset: n };
            return;
        }
        for p in piece + 1..self.pieces.len() {
            if self.pieces[p].newline_count() > 0 {
                let n = self.pieces[p].newline(self.store_of(p), 0);
                self.cursor = BufferCursor::At { piece: p, offset: n };
                return;
            }
        }
        self.cursor = BufferCursor::End;
    }

    /// Moves onto the last newline strictly before the cursor, or to the
    /// document start when there is none.
    pub fn goto_prev_line(&mut self) {
        self.appending = false;
        let (piece, offset) = self.raw_position();
        if piece < self.pieces.len() {
            if let Some(n) = self.pieces[piece].newline_before(self.store_of(piece), offset) {
                self.cursor = BufferCursor::At { piece, offset: n };
                return;
            }
        }
        for p in (0..piece).rev() {
            let count = self.pieces[p].newline_count();
            if count > 0 {
                let n = self.pieces[p].newline(self.store_of(p), count - 1);
                self.cursor = BufferCursor::At { piece: p, offset: n };
                return;
            }
        }
        self.cursor = self.cursor_at(0, 0);
    }

    // ==================== Mutation ====================

    /// Splits the piece under the cursor so the cursor sits on a piece
    /// boundary. No-op when it already does.
    pub fn cut(&mut self) {
        self.appending = false;
        if let BufferCursor::At { piece, offset } = self.cursor {
            if offset > 0 {
                let store = self.stores.get(self.pieces[piece].source());
                let tail = self.pieces[piece].split_off(store, offset);
                self.pieces.insert(piece + 1, tail);
                self.cursor = BufferCursor::At { piece: piece + 1, offset: 0 };
                trace!(piece, offset, "split piece");
            }
        }
    }

    /// Inserts one rune before the cursor and advances past it.
    pub fn write(&mut self, c: char) {
        let width = c.len_utf8();
        if self.appending {
            let prev = self.piece_index();
            assert!(prev > 0, "appending cursor has no preceding piece");
            self.stores.added.push_char(c);
            self.pieces[prev - 1].extend(&self.stores.added, width);
        } else {
            self.cut();
            let idx = self.piece_index();
            let at = self.stores.added.push_char(c);
            let piece = Piece::new(Source::Added, &self.stores.added, at, width);
            self.pieces.insert(idx, piece);
            self.cursor = self.cursor_at(idx + 1, 0);
            self.appending = true;
        }
        self.scanned += width;
        self.len += width;
    }

    /// Removes the codepoint after the cursor (`\r\n` as one unit).
    /// Returns the number of bytes removed.
    pub fn delete(&mut self) -> usize {
        self.cut();
        let BufferCursor::At { piece, .. } = self.cursor else {
            return 0;
        };
        let lead = self.piece_bytes(piece)[0];
        let width = utf8_width(lead);
        let crlf = lead == b'\r' && self.byte_at(piece, 1) == Some(b'\n');
        self.remove_front(width);
        if crlf {
            self.remove_front(1);
            return 2;
        }
        width
    }

    /// Removes the codepoint before the cursor (`\r\n` as one unit).
    /// Returns the number of bytes removed.
    pub fn backspace(&mut self) -> usize {
        self.cut();
        let idx = self.piece_index();
        if idx == 0 {
            return 0;
        }
        let prev = &self.pieces[idx - 1];
        let start = prev.char_start_before(self.store_of(idx - 1), prev.len());
        let width = prev.len() - start;
        let lf = self.piece_bytes(idx - 1)[start] == b'\n';
        self.remove_back(idx - 1, width);
        if lf {
            let idx = self.piece_index();
            if idx > 0 && self.piece_bytes(idx - 1).last() == Some(&b'\r') {
                self.remove_back(idx - 1, 1);
                return width + 1;
            }
        }
        width
    }

    /// Removes `count` bytes after the cursor by cutting at both ends and
    /// dropping the pieces in between. Returns the removed bytes.
    pub fn delete_span(&mut self, count: usize) -> Vec<u8> {
        if count == 0 {
            return Vec::new();
        }
        let start = self.byte_offset();
        assert!(start + count <= self.len, "span {start}+{count} past end {}", self.len);
        self.cut();
        let first = self.piece_index();
        self.seek(start + count);
        self.cut();
        let last = self.piece_index();
        let mut removed = Vec::with_capacity(count);
        for i in first..last {
            removed.extend_from_slice(self.piece_bytes(i));
        }
        self.pieces.drain(first..last);
        self.len -= removed.len();
        self.cursor = self.cursor_at(first, 0);
        removed
    }

    // ==================== Invariants ====================

    /// Panics if any piece or cursor invariant is broken.
    pub fn check_invariants(&self) {
        for (i, piece) in self.pieces.iter().enumerate() {
            assert!(!piece.is_empty(), "empty piece at index {i}");
            piece.check(self.store_of(i));
        }
        let total: usize = self.pieces.iter().map(Piece::len).sum();
        assert_eq!(total, self.len, "cached length out of sync");
        if let BufferCursor::At { piece, offset } = self.cursor {
            assert!(piece < self.pieces.len(), "cursor piece {piece} out of range");
            assert!(offset < self.pieces[piece].len(), "cursor offset {offset} past piece end");
        }
        if self.appending {
            let idx = self.piece_index();
            assert!(idx > 0, "appending without a preceding piece");
            assert_eq!(
                self.pieces[idx - 1].source(),
                Source::Added,
                "appending onto a piece of the loaded text"
            );
        }
    }

    // ==================== Internals ====================

    fn store_of(&self, index: usize) -> &Store {
        self.stores.get(self.pieces[index].source())
    }

    /// Normalized cursor for `(piece, offset)`, where `offset` may equal the
    /// piece length.
    fn cursor_at(&self, piece: usize, offset: usize) -> BufferCursor {
        match self.pieces.get(piece) {
            None => BufferCursor::End,
            Some(p) if offset >= p.len() => self.cursor_at(piece + 1, offset - p.len()),
            Some(_) => BufferCursor::At { piece, offset },
        }
    }

    /// Index of the piece under the cursor; `pieces.len()` at the sentinel.
    fn piece_index(&self) -> usize {
        self.raw_position().0
    }

    fn raw_position(&self) -> (usize, usize) {
        match self.cursor {
            BufferCursor::At { piece, offset } => (piece, offset),
            BufferCursor::End => (self.pieces.len(), 0),
        }
    }

    /// Byte at `(piece, offset)`, looking into the next piece when
    /// `offset` is the piece length.
    fn byte_at(&self, piece: usize, offset: usize) -> Option<u8> {
        let p = self.pieces.get(piece)?;
        if offset < p.len() {
            Some(self.piece_bytes(piece)[offset])
        } else if piece + 1 < self.pieces.len() {
            Some(self.piece_bytes(piece + 1)[0])
        } else {
            None
        }
    }

    /// `(piece, start)` of the codepoint ending at the cursor.
    fn prev_char(&self) -> Option<(usize, usize)> {
        let (piece, offset) = self.raw_position();
        if offset > 0 {
            let start = self.pieces[piece].char_start_before(self.store_of(piece), offset);
            return Some((piece, start));
        }
        let prev = piece.checked_sub(1)?;
        let p = &self.pieces[prev];
        Some((prev, p.char_start_before(self.store_of(prev), p.len())))
    }

    fn advance(&mut self, mut n: usize) {
        while n > 0 {
            let BufferCursor::At { piece, offset } = self.cursor else {
                panic!("advanced past the end sentinel");
            };
            let step = n.min(self.pieces[piece].len() - offset);
            self.cursor = self.cursor_at(piece, offset + step);
            n -= step;
        }
    }

    /// Drops `n` bytes from the front of the piece under the cursor, which
    /// must sit at offset 0.
    fn remove_front(&mut self, n: usize) {
        let BufferCursor::At { piece, offset: 0 } = self.cursor else {
            panic!("remove_front requires a cursor on a piece boundary");
        };
        let store = self.stores.get(self.pieces[piece].source());
        self.pieces[piece].remove_front(store, n);
        self.len -= n;
        if self.pieces[piece].is_empty() {
            self.pieces.remove(piece);
        }
        self.cursor = self.cursor_at(piece, 0);
    }

    /// Drops `n` bytes from the back of `pieces[index]`, which lies before
    /// the cursor.
    fn remove_back(&mut self, index: usize, n: usize) {
        let store = self.stores.get(self.pieces[index].source());
        self.pieces[index].remove_back(store, n);
        self.len -= n;
        if self.pieces[index].is_empty() {
            self.pieces.remove(index);
            if let BufferCursor::At { piece, offset } = self.cursor {
                if piece > index {
                    self.cursor = BufferCursor::At { piece: piece - 1, offset };
                }
            }
        }
    }
}

impl Default for PieceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PieceTable {
    fn from(s: &str) -> Self {
        Self::from_bytes(s.as_bytes().to_vec())
    }
}
