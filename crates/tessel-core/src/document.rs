//! Document: one open file with its cursor, selection and undo history.
//!
//! ## Learning: Composition over Inheritance
//!
//! Rust doesn't have inheritance. Instead, `Document` composes
//! a `TextBuffer`, a `LineCursor`, a `Selection` and a `History`, and adds
//! the user-level gestures on top.
//!
//! ## Gestures
//!
//! Every editing method here is one gesture: it executes one or more
//! buffer edits, records each as an [`Action`], and adds them to history as
//! a single group. If any edit fails, the ones already made are reverted so
//! the document is never left half-edited.

use std::io::Write;
use std::path::{Path, PathBuf};

use tessel_buffer::{
    Action, ActionGroup, BufferResult, History, LineCursor, Position, Replay, Selection,
    TextBuffer,
};
use tracing::{info, warn};

use crate::command::Motion;
use crate::config::Config;
use crate::{CoreError, CoreResult};

/// A document represents a single file or buffer being edited.
pub struct Document {
    /// The underlying text buffer
    buffer: TextBuffer,

    cursor: LineCursor,

    selection: Selection,

    history: History,

    /// File path (None for untitled documents)
    path: Option<PathBuf>,

    /// Display name
    name: String,

    /// Inserted by indent, removed by unindent
    indent: String,

    comment_prefix: String,

    /// The last gesture was a typed character; the next one joins its group.
    typing: bool,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Self {
        Self::from_text("", config)
    }

    /// Creates an untitled document holding `text`.
    pub fn from_text(text: &str, config: &Config) -> Self {
        let buffer_config = config.buffer_config();
        Self {
            buffer: TextBuffer::from_text(text, buffer_config),
            cursor: LineCursor::new(&buffer_config),
            selection: Selection::new(),
            history: History::new(buffer_config.max_history),
            path: None,
            name: "Untitled".to_string(),
            indent: config.editor.indent.clone(),
            comment_prefix: config.editor.comment_prefix.clone(),
            typing: false,
        }
    }

    /// Opens a document from a file. A missing file opens as an empty
    /// document that will be created on save. A file that is not UTF-8 is
    /// refused with `InvalidData` rather than rewritten on save.
    pub fn open(path: impl AsRef<Path>, config: &Config) -> CoreResult<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "new file");
                String::new()
            }
            Err(e) => return Err(e.into()),
        };

        let mut doc = Self::from_text(&text, config);
        doc.set_path(path);
        info!(path = %path.display(), lines = doc.buffer.line_count(), "opened");
        Ok(doc)
    }

    fn set_path(&mut self, path: &Path) {
        self.name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();
        self.path = Some(path.to_path_buf());
    }

    // ==================== Getters ====================

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if the document has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn cursor(&self) -> &LineCursor {
        &self.cursor
    }

    pub fn position(&self) -> Position {
        self.cursor.position()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns all text.
    pub fn contents(&self) -> String {
        self.buffer.contents()
    }

    // ==================== File Operations ====================

    /// Saves the document to its path.
    pub fn save(&mut self) -> CoreResult<()> {
        let path = self.path.clone().ok_or(CoreError::NoDocumentPath)?;
        self.save_as(path)
    }

    /// Saves the document to a new path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();

        // Write to a temporary file first, then rename (atomic write)
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(dir)?;
        temp.write_all(&self.buffer.bytes())?;
        temp.persist(path).map_err(|e| e.error)?;

        self.set_path(path);
        self.buffer.mark_saved();
        info!(path = %path.display(), bytes = self.buffer.len_bytes(), "saved");
        Ok(())
    }

    // ==================== Cursor Movement ====================

    /// Applies a motion. Returns false when the cursor could not move.
    /// While a selection is on, its end follows the cursor.
    pub fn move_cursor(&mut self, motion: Motion) -> bool {
        let buf = &self.buffer;
        let moved = match motion {
            Motion::Left => self.cursor.move_left(buf),
            Motion::Right => self.cursor.move_right(buf),
            Motion::Up => self.cursor.move_up(buf),
            Motion::Down => self.cursor.move_down(buf),
            Motion::WordStart => self.cursor.move_bow(buf),
            Motion::WordEnd => self.cursor.move_eow(buf),
            Motion::LineStart => self.cursor.move_bol(buf),
            Motion::LineEnd => self.cursor.move_eol(buf),
            Motion::PageUp => self.cursor.page_up(buf),
            Motion::PageDown => self.cursor.page_down(buf),
            Motion::FileStart => self.cursor.move_bof(),
            Motion::FileEnd => self.cursor.move_eof(buf),
        };
        self.after_motion();
        moved
    }

    /// Jumps to the start of zero-based line `n`.
    pub fn goto_line(&mut self, n: usize) -> bool {
        let moved = self.cursor.goto_line(n, &self.buffer);
        self.after_motion();
        moved
    }

    fn after_motion(&mut self) {
        self.typing = false;
        self.selection.extend_to(self.cursor.position());
    }

    // ==================== Selection ====================

    /// Starts a selection anchored at the cursor.
    pub fn start_selection(&mut self) {
        self.typing = false;
        self.selection.on(self.cursor.position());
    }

    pub fn clear_selection(&mut self) {
        self.selection.off();
    }

    /// Returns the selected text.
    pub fn selected_text(&self) -> Option<String> {
        if self.selection.is_empty() {
            return None;
        }
        let (min, max) = self.selection.min_max();
        self.buffer.slice(min, max).ok()
    }

    // ==================== Text Editing ====================

    /// Types one character, replacing the selection if there is one.
    /// Consecutive characters typed without any other gesture in between
    /// undo together.
    pub fn insert_char(&mut self, c: char) -> CoreResult<bool> {
        if c == '\n' {
            return self.newline();
        }
        let merge = self.typing && self.selection.is_empty();
        let before = self.cursor.position();
        let actions = self.apply(|doc, actions| {
            doc.take_selection(actions)?;
            let mut utf8 = [0u8; 4];
            let end = doc.exec_insert(c.encode_utf8(&mut utf8), doc.position(), actions)?;
            doc.cursor.set_position(end, &doc.buffer);
            Ok(())
        })?;
        let after = self.cursor.position();
        if !(merge && self.history.extend_last(actions.clone(), after)) {
            self.history.add(ActionGroup::new(actions, before, after));
        }
        self.typing = true;
        Ok(true)
    }

    /// Inserts text (a paste) at the cursor, replacing the selection.
    pub fn insert_text(&mut self, text: &str) -> CoreResult<bool> {
        let text = text.replace("\r\n", "\n");
        self.gesture(|doc, actions| {
            doc.take_selection(actions)?;
            let end = doc.exec_insert(&text, doc.position(), actions)?;
            doc.cursor.set_position(end, &doc.buffer);
            Ok(())
        })
    }

    /// Splits the line at the cursor.
    pub fn newline(&mut self) -> CoreResult<bool> {
        self.gesture(|doc, actions| {
            doc.take_selection(actions)?;
            let pos = doc.position();
            let next = doc.exec_split(pos, actions)?;
            doc.cursor.set_position(next, &doc.buffer);
            Ok(())
        })
    }

    /// Deletes the selection, or the rune before the cursor. At column 0
    /// the line is joined onto the previous one.
    pub fn backspace(&mut self) -> CoreResult<bool> {
        self.gesture(|doc, actions| {
            if doc.take_selection(actions)? {
                return Ok(());
            }
            let pos = doc.position();
            if pos.offset == 0 {
                if pos.line > 0 {
                    if let Some(at) = doc.exec_join(pos.line - 1, actions)? {
                        doc.cursor.set_position(at, &doc.buffer);
                    }
                }
                return Ok(());
            }
            let line = doc.buffer.line(pos.line)?;
            if let Some(prev) = line.prev_boundary(pos.offset) {
                let start = Position::new(pos.line, prev);
                doc.exec_delete(start, pos, actions)?;
                doc.cursor.set_position(start, &doc.buffer);
            }
            Ok(())
        })
    }

    /// Deletes the selection, or the rune under the cursor. At the end of a
    /// line the next line is joined onto it.
    pub fn delete_forward(&mut self) -> CoreResult<bool> {
        self.gesture(|doc, actions| {
            if doc.take_selection(actions)? {
                return Ok(());
            }
            let pos = doc.position();
            let line = doc.buffer.line(pos.line)?;
            match line.next_boundary(pos.offset) {
                Some(next) => {
                    doc.exec_delete(pos, Position::new(pos.line, next), actions)?;
                }
                None => {
                    doc.exec_join(pos.line, actions)?;
                }
            }
            doc.cursor.set_position(pos, &doc.buffer);
            Ok(())
        })
    }

    /// Deletes the selected text.
    pub fn delete_selection(&mut self) -> CoreResult<bool> {
        self.gesture(|doc, actions| doc.take_selection(actions).map(|_| ()))
    }

    // ==================== Block Operations ====================

    /// Prefixes each selected line (or the cursor line) with the indent.
    pub fn indent_lines(&mut self) -> CoreResult<bool> {
        let indent = self.indent.clone();
        self.gesture(|doc, actions| {
            for line in doc.block_lines() {
                if doc.buffer.line(line)?.is_empty() {
                    continue;
                }
                doc.exec_insert(&indent, Position::new(line, 0), actions)?;
                doc.shift_marks(line, 0, indent.len() as isize);
            }
            Ok(())
        })
    }

    /// Removes one level of indentation from each selected line (or the
    /// cursor line): the configured indent, a tab, or up to a tab's width
    /// of spaces.
    pub fn unindent_lines(&mut self) -> CoreResult<bool> {
        let indent = self.indent.clone();
        let tab_width = self.buffer.config().tab_width;
        self.gesture(|doc, actions| {
            for line in doc.block_lines() {
                let text = doc.buffer.line(line)?;
                let text = text.as_str();
                let width = if !indent.is_empty() && text.starts_with(&indent) {
                    indent.len()
                } else if text.starts_with('\t') {
                    1
                } else {
                    text.bytes().take(tab_width).take_while(|&b| b == b' ').count()
                };
                if width == 0 {
                    continue;
                }
                doc.exec_delete(Position::new(line, 0), Position::new(line, width), actions)?;
                doc.shift_marks(line, 0, -(width as isize));
            }
            Ok(())
        })
    }

    /// Comments out the selected lines (or the cursor line), or uncomments
    /// them when every non-blank one already starts with the prefix.
    pub fn toggle_comment(&mut self) -> CoreResult<bool> {
        let prefix = self.comment_prefix.clone();
        if prefix.is_empty() {
            return Ok(false);
        }
        self.gesture(|doc, actions| {
            let mut targets = Vec::new();
            for line in doc.block_lines() {
                let text = doc.buffer.line(line)?;
                let at = text.first_non_space();
                if at < text.len() {
                    let commented = text.as_str()[at..].starts_with(&prefix);
                    targets.push((line, at, commented, text));
                }
            }
            let uncomment = !targets.is_empty() && targets.iter().all(|t| t.2);

            for (line, at, _, text) in targets {
                let start = Position::new(line, at);
                if uncomment {
                    let rest = &text.as_str()[at + prefix.len()..];
                    let width = prefix.len() + usize::from(rest.starts_with(' '));
                    doc.exec_delete(start, Position::new(line, at + width), actions)?;
                    doc.shift_marks(line, at, -(width as isize));
                } else {
                    let marker = format!("{prefix} ");
                    doc.exec_insert(&marker, start, actions)?;
                    doc.shift_marks(line, at, marker.len() as isize);
                }
            }
            Ok(())
        })
    }

    /// Lines a block operation touches.
    fn block_lines(&self) -> std::ops::Range<usize> {
        if self.selection.is_empty() {
            let line = self.cursor.line();
            line..line + 1
        } else {
            self.selection.lines()
        }
    }

    /// Moves the cursor and selection endpoints on `line` that lie after
    /// column `at` by `delta` bytes.
    fn shift_marks(&mut self, line: usize, at: usize, delta: isize) {
        let shift = |pos: Position| {
            if pos.line != line || pos.offset <= at {
                return pos;
            }
            let offset = pos.offset.saturating_add_signed(delta).max(at);
            Position::new(line, offset)
        };
        let cursor = shift(self.cursor.position());
        self.cursor.set_position(cursor, &self.buffer);
        self.selection.set_start(shift(self.selection.start()));
        self.selection.set_end(shift(self.selection.end()));
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last gesture and restores the cursor from before it.
    pub fn undo(&mut self) -> CoreResult<bool> {
        self.typing = false;
        match self.history.undo(&mut self.buffer)? {
            Some(pos) => {
                self.restore(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Redoes the last undone gesture and restores the cursor from after it.
    pub fn redo(&mut self) -> CoreResult<bool> {
        self.typing = false;
        match self.history.redo(&mut self.buffer)? {
            Some(pos) => {
                self.restore(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn restore(&mut self, pos: Position) {
        self.selection.off();
        self.cursor.set_position(pos, &self.buffer);
    }

    /// Places the cursor, clamped into the document.
    pub fn set_position(&mut self, pos: Position) {
        self.typing = false;
        self.cursor.set_position(pos, &self.buffer);
    }

    // ==================== Gesture plumbing ====================

    /// Runs `f` as one gesture and records it as one history group.
    fn gesture<F>(&mut self, f: F) -> CoreResult<bool>
    where
        F: FnOnce(&mut Self, &mut Vec<Action>) -> BufferResult<()>,
    {
        let before = self.cursor.position();
        let actions = self.apply(f)?;
        self.typing = false;
        if actions.is_empty() {
            return Ok(false);
        }
        self.history
            .add(ActionGroup::new(actions, before, self.cursor.position()));
        Ok(true)
    }

    /// Runs `f`, collecting the actions it executes. On failure the actions
    /// are reverted and the cursor put back.
    fn apply<F>(&mut self, f: F) -> CoreResult<Vec<Action>>
    where
        F: FnOnce(&mut Self, &mut Vec<Action>) -> BufferResult<()>,
    {
        let before = self.cursor.position();
        let selection = self.selection;
        let mut actions = Vec::new();
        if let Err(e) = f(self, &mut actions) {
            warn!(%e, done = actions.len(), "edit failed, rolling back");
            for action in actions.iter().rev() {
                if let Err(e) = self.buffer.revert(action) {
                    panic!("gesture rollback failed: {e}");
                }
            }
            self.selection = selection;
            self.cursor.set_position(before, &self.buffer);
            return Err(e.into());
        }
        Ok(actions)
    }

    /// Deletes a non-empty selection and turns it off. Returns true if text
    /// was removed.
    fn take_selection(&mut self, actions: &mut Vec<Action>) -> BufferResult<bool> {
        if self.selection.is_empty() {
            self.selection.off();
            return Ok(false);
        }
        let (min, max) = self.selection.min_max();
        self.exec_delete(min, max, actions)?;
        self.selection.off();
        self.cursor.set_position(min, &self.buffer);
        Ok(true)
    }

    fn exec_insert(
        &mut self,
        text: &str,
        pos: Position,
        actions: &mut Vec<Action>,
    ) -> BufferResult<Position> {
        let end = self.buffer.insert(text, pos)?;
        if end != pos {
            actions.push(Action::insert(text, pos, end));
        }
        Ok(end)
    }

    fn exec_delete(
        &mut self,
        min: Position,
        max: Position,
        actions: &mut Vec<Action>,
    ) -> BufferResult<()> {
        let removed = self.buffer.delete_range(min, max)?;
        if !removed.is_empty() {
            actions.push(Action::delete_range(removed, min, max));
        }
        Ok(())
    }

    fn exec_split(&mut self, at: Position, actions: &mut Vec<Action>) -> BufferResult<Position> {
        let next = self.buffer.split_line(at.line, at.offset)?;
        actions.push(Action::split_line(at));
        Ok(next)
    }

    fn exec_join(
        &mut self,
        line: usize,
        actions: &mut Vec<Action>,
    ) -> BufferResult<Option<Position>> {
        let joined = self.buffer.join_line(line)?;
        if let Some(at) = joined {
            actions.push(Action::join_line(at));
        }
        Ok(joined)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> Document {
        Document::from_text(text, &Config::default())
    }

    #[test]
    fn test_typing_run_undoes_as_one_group() {
        let mut doc = doc("this is sparta.");
        doc.set_position(Position::new(0, 7));
        for c in ['n', '\'', 't'] {
            doc.insert_char(c).unwrap();
        }
        assert_eq!(doc.contents(), "this isn't sparta.");
        assert_eq!(doc.position(), Position::new(0, 10));
        assert_eq!(doc.history().len(), 1);
        assert_eq!(doc.buffer().pieces().piece_count(), 3);

        assert!(doc.undo().unwrap());
        assert_eq!(doc.contents(), "this is sparta.");
        assert_eq!(doc.position(), Position::new(0, 7));
    }

    #[test]
    fn test_motion_breaks_typing_run() {
        let mut doc = doc("");
        doc.insert_char('a').unwrap();
        doc.move_cursor(Motion::Left);
        doc.insert_char('b').unwrap();
        assert_eq!(doc.contents(), "ba");
        assert_eq!(doc.history().len(), 2);
    }

    #[test]
    fn test_undo_redo_cycles_restore_content_and_cursor() {
        let mut doc = doc("alpha\nbeta");
        doc.set_position(Position::new(0, 5));
        doc.newline().unwrap();
        doc.insert_text("x\ty").unwrap();
        let after = (doc.contents(), doc.position());

        for _ in 0..3 {
            doc.undo().unwrap();
            doc.undo().unwrap();
            assert_eq!(doc.contents(), "alpha\nbeta");
            assert_eq!(doc.position(), Position::new(0, 5));
            doc.redo().unwrap();
            doc.redo().unwrap();
            assert_eq!((doc.contents(), doc.position()), after);
        }
    }

    #[test]
    fn test_edges_are_no_ops() {
        let mut doc = doc("ab\ncd");
        let before = doc.contents();
        assert!(!doc.move_cursor(Motion::Left));
        assert!(!doc.move_cursor(Motion::PageUp));
        assert!(!doc.undo().unwrap());
        assert!(!doc.redo().unwrap());
        assert!(!doc.backspace().unwrap());

        doc.move_cursor(Motion::FileEnd);
        assert!(!doc.move_cursor(Motion::Right));
        assert!(!doc.delete_forward().unwrap());
        assert_eq!(doc.contents(), before);
        assert!(doc.history().is_empty());
    }

    #[test]
    fn test_backspace_and_delete_join_lines() {
        let mut doc = doc("ab\ncd");
        doc.set_position(Position::new(1, 0));
        doc.backspace().unwrap();
        assert_eq!(doc.contents(), "abcd");
        assert_eq!(doc.position(), Position::new(0, 2));

        doc.undo().unwrap();
        assert_eq!(doc.contents(), "ab\ncd");
        doc.set_position(Position::new(0, 2));
        doc.delete_forward().unwrap();
        assert_eq!(doc.contents(), "abcd");
        assert_eq!(doc.position(), Position::new(0, 2));
    }

    #[test]
    fn test_backspace_removes_whole_rune() {
        let mut doc = doc("a漢");
        doc.move_cursor(Motion::FileEnd);
        doc.backspace().unwrap();
        assert_eq!(doc.contents(), "a");
        assert_eq!(doc.position(), Position::new(0, 1));
    }

    #[test]
    fn test_typing_replaces_selection_in_one_group() {
        let mut doc = doc("hello world");
        doc.start_selection();
        for _ in 0..5 {
            doc.move_cursor(Motion::Right);
        }
        assert_eq!(doc.selected_text().as_deref(), Some("hello"));

        doc.insert_char('J').unwrap();
        assert_eq!(doc.contents(), "J world");
        assert!(!doc.selection().is_on());
        assert_eq!(doc.history().len(), 1);

        doc.undo().unwrap();
        assert_eq!(doc.contents(), "hello world");
    }

    #[test]
    fn test_indent_follows_selection_lines() {
        let mut doc = doc("a\nb\nc");
        doc.set_position(Position::new(0, 1));
        doc.start_selection();
        doc.move_cursor(Motion::Down);
        doc.move_cursor(Motion::LineStart);
        // (0,1)..(1,0) touches line 0 only.
        doc.indent_lines().unwrap();
        assert_eq!(doc.contents(), "\ta\nb\nc");
        assert_eq!(doc.selection().start(), Position::new(0, 2));

        doc.move_cursor(Motion::Right);
        doc.indent_lines().unwrap();
        assert_eq!(doc.contents(), "\t\ta\n\tb\nc");

        doc.unindent_lines().unwrap();
        assert_eq!(doc.contents(), "\ta\nb\nc");
        assert_eq!(doc.history().len(), 3);
    }

    #[test]
    fn test_unindent_spaces() {
        let mut doc = doc("      x");
        doc.unindent_lines().unwrap();
        assert_eq!(doc.contents(), "  x");
        doc.unindent_lines().unwrap();
        doc.unindent_lines().unwrap();
        assert_eq!(doc.contents(), "x");
        assert!(!doc.unindent_lines().unwrap());
    }

    #[test]
    fn test_toggle_comment() {
        let mut doc = doc("  let a;\n\nlet b;");
        doc.start_selection();
        doc.move_cursor(Motion::FileEnd);
        doc.toggle_comment().unwrap();
        assert_eq!(doc.contents(), "  // let a;\n\n// let b;");

        doc.toggle_comment().unwrap();
        assert_eq!(doc.contents(), "  let a;\n\nlet b;");

        doc.undo().unwrap();
        assert_eq!(doc.contents(), "  // let a;\n\n// let b;");
    }

    #[test]
    fn test_forward_deletes_in_large_file_copy_no_text() {
        let text = format!("{}\n", "x".repeat(99)).repeat(20_000);
        let mut doc = doc(&text);
        let stored = doc.buffer().pieces().stored_bytes();

        doc.set_position(Position::new(10, 0));
        for _ in 0..150 {
            assert!(doc.delete_forward().unwrap());
        }
        for _ in 0..20 {
            assert!(doc.backspace().unwrap());
        }

        assert_eq!(doc.buffer().len_bytes(), text.len() - 170);
        assert_eq!(doc.buffer().pieces().stored_bytes(), stored);
        assert!(doc.buffer().pieces().piece_count() <= 3);
        while doc.undo().unwrap() {}
        assert_eq!(doc.contents(), text);
    }

    #[test]
    fn test_open_missing_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");

        let mut doc = Document::open(&path, &Config::default()).unwrap();
        assert_eq!(doc.name(), "notes.txt");
        doc.insert_text("one\ntwo").unwrap();
        assert!(doc.is_modified());
        doc.save().unwrap();
        assert!(!doc.is_modified());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo");
    }

    #[test]
    fn test_save_leaves_neighbouring_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let neighbour = dir.path().join("notes.tmp");
        std::fs::write(&neighbour, "keep me").unwrap();

        let mut doc = Document::open(&path, &Config::default()).unwrap();
        doc.insert_text("saved").unwrap();
        doc.save().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "saved");
        assert_eq!(std::fs::read_to_string(&neighbour).unwrap(), "keep me");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_open_normalizes_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dos.txt");
        std::fs::write(&path, "a\r\nb\r\n").unwrap();

        let doc = Document::open(&path, &Config::default()).unwrap();
        assert_eq!(doc.buffer().line_count(), 3);
        assert_eq!(doc.buffer().bytes(), b"a\nb\n");
    }

    #[test]
    fn test_open_refuses_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9\n").unwrap();

        let err = Document::open(&path, &Config::default()).err();
        assert!(matches!(
            err,
            Some(CoreError::Io(ref e)) if e.kind() == std::io::ErrorKind::InvalidData
        ));
        assert_eq!(std::fs::read(&path).unwrap(), b"caf\xe9\n");
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut doc = doc("x");
        assert!(matches!(doc.save(), Err(CoreError::NoDocumentPath)));
    }
}
