//! Commands the editor executes.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate actions as values:
//! - A dispatcher turns one input event into zero or more commands
//! - The editor applies them in order before reading the next event
//! - Tests can drive the editor without any input source at all

use std::path::PathBuf;

/// A cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordStart,
    WordEnd,
    LineStart,
    LineEnd,
    PageUp,
    PageDown,
    FileStart,
    FileEnd,
}

impl Motion {
    pub fn display_name(&self) -> &'static str {
        match self {
            Motion::Left => "Move Left",
            Motion::Right => "Move Right",
            Motion::Up => "Move Up",
            Motion::Down => "Move Down",
            Motion::WordStart => "Move to Word Start",
            Motion::WordEnd => "Move to Word End",
            Motion::LineStart => "Move to Line Start",
            Motion::LineEnd => "Move to Line End",
            Motion::PageUp => "Page Up",
            Motion::PageDown => "Page Down",
            Motion::FileStart => "Move to File Start",
            Motion::FileEnd => "Move to File End",
        }
    }
}

/// Built-in editor commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    // File commands
    Save,
    SaveAs { path: PathBuf },
    Quit,

    // Edit commands
    InsertChar(char),
    InsertText(String),
    Newline,
    Backspace,
    Delete,
    Indent,
    Unindent,
    ToggleComment,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,

    // Cursor movement
    Move(Motion),
    /// Zero-based line index.
    GotoLine(usize),

    // Selection
    SelectionOn,
    SelectionOff,
}

impl Command {
    /// Returns the command's display name.
    pub fn display_name(&self) -> &str {
        match self {
            Command::Save => "Save",
            Command::SaveAs { .. } => "Save As",
            Command::Quit => "Quit",
            Command::InsertChar(_) => "Insert Character",
            Command::InsertText(_) => "Insert Text",
            Command::Newline => "New Line",
            Command::Backspace => "Backspace",
            Command::Delete => "Delete",
            Command::Indent => "Indent",
            Command::Unindent => "Unindent",
            Command::ToggleComment => "Toggle Comment",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Cut => "Cut",
            Command::Copy => "Copy",
            Command::Paste => "Paste",
            Command::Move(motion) => motion.display_name(),
            Command::GotoLine(_) => "Go to Line",
            Command::SelectionOn => "Start Selection",
            Command::SelectionOff => "Clear Selection",
        }
    }

    /// Returns true for commands that may change the document text.
    pub fn is_edit(&self) -> bool {
        matches!(
            self,
            Command::InsertChar(_)
                | Command::InsertText(_)
                | Command::Newline
                | Command::Backspace
                | Command::Delete
                | Command::Indent
                | Command::Unindent
                | Command::ToggleComment
                | Command::Undo
                | Command::Redo
                | Command::Cut
                | Command::Paste
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display_name() {
        assert_eq!(Command::Save.display_name(), "Save");
        assert_eq!(Command::Move(Motion::PageDown).display_name(), "Page Down");
        assert_eq!(Command::InsertChar('x').display_name(), "Insert Character");
    }

    #[test]
    fn test_edit_commands() {
        assert!(Command::Paste.is_edit());
        assert!(!Command::Copy.is_edit());
        assert!(!Command::Move(Motion::Left).is_edit());
    }
}
