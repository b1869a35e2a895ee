//! Main editor orchestration.
//!
//! ## Learning: The Facade Pattern
//!
//! `Editor` acts as a facade, providing a simple interface to
//! complex subsystems. Front ends only send it [`Command`]s; the document,
//! clipboard and session store stay behind it.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::command::Command;
use crate::config::Config;
use crate::document::Document;
use crate::event::{Dispatcher, InputQueue};
use crate::session::SessionStore;
use crate::CoreResult;

/// The main editor state.
///
/// ## Thread Safety
///
/// `Editor` is owned by the single processing loop. Input sources talk to
/// it only through the [`InputQueue`].
pub struct Editor {
    document: Document,

    /// Editor configuration
    config: Config,

    /// Persisted positions and clipboard (None disables persistence)
    session: Option<SessionStore>,

    /// Clipboard content
    clipboard: String,

    /// Whether the editor should quit
    should_quit: bool,
}

impl Editor {
    /// Creates an editor with an untitled document and no persistence.
    pub fn new(config: Config) -> Self {
        Self {
            document: Document::with_config(&config),
            config,
            session: None,
            clipboard: String::new(),
            should_quit: false,
        }
    }

    /// Creates an editor backed by a session store, restoring the
    /// clipboard from it.
    pub fn with_session(config: Config, session: SessionStore) -> Self {
        let mut editor = Self::new(config);
        match session.clipboard() {
            Ok(text) => editor.clipboard = text,
            Err(e) => warn!(%e, "could not restore clipboard"),
        }
        editor.session = Some(session);
        editor
    }

    // ==================== Document Operations ====================

    /// Opens a file, replacing the current document. The cursor goes back
    /// to where it was when the file was last closed.
    pub fn open(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let mut document = Document::open(path, &self.config)?;

        if self.config.files.restore_cursor {
            if let Some(session) = &self.session {
                match session.position(path) {
                    Ok(Some(pos)) => match document.buffer().validate(pos) {
                        Ok(()) => {
                            debug!(%pos, "restoring cursor");
                            document.set_position(pos);
                        }
                        Err(e) => debug!(%pos, %e, "file changed since last visit"),
                    },
                    Ok(None) => {}
                    Err(e) => warn!(%e, "could not read last position"),
                }
            }
        }

        self.remember_position();
        self.document = document;
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns the editor configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clipboard(&self) -> &str {
        &self.clipboard
    }

    // ==================== Commands ====================

    /// Executes one command against the current document.
    pub fn execute(&mut self, command: &Command) -> CoreResult<()> {
        debug!(command = command.display_name(), edit = command.is_edit(), "execute");
        let doc = &mut self.document;
        match command {
            Command::Save => doc.save()?,
            Command::SaveAs { path } => doc.save_as(path)?,
            Command::Quit => self.quit(),

            Command::InsertChar(c) => {
                doc.insert_char(*c)?;
            }
            Command::InsertText(text) => {
                doc.insert_text(text)?;
            }
            Command::Newline => {
                doc.newline()?;
            }
            Command::Backspace => {
                doc.backspace()?;
            }
            Command::Delete => {
                doc.delete_forward()?;
            }
            Command::Indent => {
                doc.indent_lines()?;
            }
            Command::Unindent => {
                doc.unindent_lines()?;
            }
            Command::ToggleComment => {
                doc.toggle_comment()?;
            }
            Command::Undo => {
                doc.undo()?;
            }
            Command::Redo => {
                doc.redo()?;
            }
            Command::Cut => self.cut()?,
            Command::Copy => self.copy(),
            Command::Paste => self.paste()?,

            Command::Move(motion) => {
                doc.move_cursor(*motion);
            }
            Command::GotoLine(n) => {
                doc.goto_line(*n);
            }

            Command::SelectionOn => doc.start_selection(),
            Command::SelectionOff => doc.clear_selection(),
        }
        Ok(())
    }

    /// Copies the selection to the clipboard.
    pub fn copy(&mut self) {
        if let Some(text) = self.document.selected_text() {
            self.clipboard = text;
        }
    }

    /// Cuts the selection to the clipboard.
    pub fn cut(&mut self) -> CoreResult<()> {
        self.copy();
        self.document.delete_selection()?;
        Ok(())
    }

    /// Pastes from the clipboard.
    pub fn paste(&mut self) -> CoreResult<()> {
        if !self.clipboard.is_empty() {
            self.document.insert_text(&self.clipboard)?;
        }
        Ok(())
    }

    // ==================== Lifecycle ====================

    /// Processes events until a quit command arrives or every sender is
    /// dropped, then persists the session.
    ///
    /// All commands produced by one event are applied before the next
    /// event is read. A failing command is reported to the dispatcher and
    /// the loop carries on.
    pub fn run<D: Dispatcher>(&mut self, queue: InputQueue, dispatcher: &mut D) {
        info!("editor loop started");
        for event in queue {
            for command in dispatcher.dispatch(event) {
                if let Err(e) = self.execute(&command) {
                    dispatcher.report(&command, &e);
                }
                if self.should_quit {
                    break;
                }
            }
            dispatcher.render(&self.document);
            if self.should_quit {
                break;
            }
        }
        info!(quit = self.should_quit, "editor loop finished");
        self.shutdown();
    }

    /// Signals that the editor should quit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Returns true if the editor should quit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Writes the cursor position and clipboard to the session store.
    pub fn shutdown(&mut self) {
        self.remember_position();
        if let Some(session) = &self.session {
            if let Err(e) = session.set_clipboard(&self.clipboard) {
                warn!(%e, "could not persist clipboard");
            }
        }
    }

    fn remember_position(&self) {
        let (Some(session), Some(path)) = (&self.session, self.document.path()) else {
            return;
        };
        if let Err(e) = session.set_position(path, self.document.position()) {
            warn!(%e, "could not persist cursor position");
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Motion;
    use crate::event::InputEvent;
    use tessel_buffer::Position;

    /// Maps each line event to the commands listed in it.
    #[derive(Default)]
    struct Scripted {
        renders: usize,
        failures: usize,
    }

    impl Dispatcher for Scripted {
        fn dispatch(&mut self, event: InputEvent) -> Vec<Command> {
            match event {
                InputEvent::Text(text) => text.chars().map(Command::InsertChar).collect(),
                InputEvent::Line(line) if line == "undo" => vec![Command::Undo],
                InputEvent::Line(line) if line == "save" => vec![Command::Save],
                InputEvent::Quit => vec![Command::Quit, Command::InsertChar('!')],
                _ => Vec::new(),
            }
        }

        fn render(&mut self, _document: &Document) {
            self.renders += 1;
        }

        fn report(&mut self, _command: &Command, _error: &crate::CoreError) {
            self.failures += 1;
        }
    }

    #[test]
    fn test_run_until_quit() {
        let (sender, queue) = InputQueue::channel();
        sender.send(InputEvent::Text("hi".into()));
        sender.send(InputEvent::Line("save".into()));
        sender.send(InputEvent::Quit);
        sender.send(InputEvent::Text("ignored".into()));

        let mut editor = Editor::default();
        let mut dispatcher = Scripted::default();
        editor.run(queue, &mut dispatcher);

        assert!(editor.should_quit());
        assert_eq!(editor.document().contents(), "hi");
        assert_eq!(dispatcher.failures, 1);
        assert_eq!(dispatcher.renders, 3);
    }

    #[test]
    fn test_run_ends_when_senders_drop() {
        let (sender, queue) = InputQueue::channel();
        let producer = std::thread::spawn(move || {
            sender.send(InputEvent::Text("abc".into()));
            sender.send(InputEvent::Line("undo".into()));
        });
        producer.join().unwrap();

        let mut editor = Editor::default();
        editor.run(queue, &mut Scripted::default());
        assert!(!editor.should_quit());
        assert_eq!(editor.document().contents(), "");
    }

    #[test]
    fn test_cut_and_paste() {
        let mut editor = Editor::default();
        editor.execute(&Command::InsertText("one two".into())).unwrap();
        editor.execute(&Command::Move(Motion::FileStart)).unwrap();
        editor.execute(&Command::SelectionOn).unwrap();
        editor.execute(&Command::Move(Motion::WordEnd)).unwrap();
        editor.execute(&Command::Cut).unwrap();

        assert_eq!(editor.clipboard(), "one");
        assert_eq!(editor.document().contents(), " two");

        editor.execute(&Command::Move(Motion::FileEnd)).unwrap();
        editor.execute(&Command::Paste).unwrap();
        assert_eq!(editor.document().contents(), " twoone");
    }

    #[test]
    fn test_session_restores_position_and_clipboard() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "a\nbcd\ne").unwrap();
        let store = SessionStore::open(Some(&dir.path().join("session"))).unwrap();

        let mut editor = Editor::with_session(Config::default(), store.clone());
        editor.open(&file).unwrap();
        editor.execute(&Command::GotoLine(1)).unwrap();
        editor.execute(&Command::Move(Motion::LineEnd)).unwrap();
        editor.execute(&Command::SelectionOn).unwrap();
        editor.execute(&Command::Move(Motion::Left)).unwrap();
        editor.execute(&Command::Copy).unwrap();
        editor.shutdown();

        let mut editor = Editor::with_session(Config::default(), store);
        assert_eq!(editor.clipboard(), "d");
        editor.open(&file).unwrap();
        assert_eq!(editor.document().position(), Position::new(1, 2));
    }

    #[test]
    fn test_stale_position_is_not_restored() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "a\nbcd").unwrap();
        let store = SessionStore::open(Some(&dir.path().join("session"))).unwrap();
        store.set_position(&file, Position::new(1, 3)).unwrap();

        std::fs::write(&file, "a\nb").unwrap();
        let mut editor = Editor::with_session(Config::default(), store);
        editor.open(&file).unwrap();
        assert_eq!(editor.document().position(), Position::ZERO);
    }
}
