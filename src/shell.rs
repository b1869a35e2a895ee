//! Line-oriented front end.
//!
//! Each stdin line is one command, `ed`-style:
//!
//! ```text
//! i <text>        type text (\n and \t escapes allowed)
//! nl bs del       newline, backspace, delete
//! left right up down bow eow bol eol pgup pgdn bof eof [count]
//! goto N          jump to line N (1-based)
//! sel on|off      start or clear the selection
//! indent unindent comment
//! cut copy paste undo redo
//! print           show the document and cursor
//! save [PATH]     write the document
//! quit
//! ```

use std::io::Write;

use tessel_core::{Command, CoreError, Dispatcher, Document, InputEvent, Key, Motion};

/// Turns input lines into editor commands and prints on request.
pub struct LineDispatcher<W: Write> {
    out: W,
    print_requested: bool,
}

impl<W: Write> LineDispatcher<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            print_requested: false,
        }
    }

    #[cfg(test)]
    fn output(&self) -> &W {
        &self.out
    }

    fn parse_line(&mut self, line: &str) -> Result<Vec<Command>, String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));

        if let Some(motion) = motion(word) {
            let count = match rest.trim() {
                "" => 1,
                n => n.parse::<usize>().map_err(|_| format!("bad count: {n}"))?,
            };
            return Ok(vec![Command::Move(motion); count]);
        }

        let command = match word {
            "" => return Ok(Vec::new()),
            "i" => return Ok(unescape(rest).chars().map(Command::InsertChar).collect()),
            "nl" => Command::Newline,
            "bs" => Command::Backspace,
            "del" => Command::Delete,
            "goto" => {
                let n: usize = rest
                    .trim()
                    .parse()
                    .map_err(|_| format!("bad line number: {rest}"))?;
                Command::GotoLine(n.saturating_sub(1))
            }
            "sel" => match rest.trim() {
                "on" => Command::SelectionOn,
                "off" => Command::SelectionOff,
                other => return Err(format!("sel takes on|off, got {other:?}")),
            },
            "indent" => Command::Indent,
            "unindent" => Command::Unindent,
            "comment" => Command::ToggleComment,
            "cut" => Command::Cut,
            "copy" => Command::Copy,
            "paste" => Command::Paste,
            "undo" => Command::Undo,
            "redo" => Command::Redo,
            "print" | "p" => {
                self.print_requested = true;
                return Ok(Vec::new());
            }
            "save" | "w" => match rest.trim() {
                "" => Command::Save,
                path => Command::SaveAs { path: path.into() },
            },
            "quit" | "q" => Command::Quit,
            other => return Err(format!("unknown command: {other}")),
        };
        Ok(vec![command])
    }

    fn print(&mut self, document: &Document) -> std::io::Result<()> {
        let buffer = document.buffer();
        for l in 0..buffer.line_count() {
            let line = buffer.line(l).unwrap_or_default();
            writeln!(self.out, "{:>4} {}", l + 1, line)?;
        }
        let marker = if document.is_modified() { " [+]" } else { "" };
        writeln!(
            self.out,
            "-- {} {}{}",
            document.name(),
            document.position(),
            marker
        )?;
        self.out.flush()
    }
}

impl<W: Write> Dispatcher for LineDispatcher<W> {
    fn dispatch(&mut self, event: InputEvent) -> Vec<Command> {
        match event {
            InputEvent::Text(text) => text.chars().map(Command::InsertChar).collect(),
            InputEvent::Key(key) => vec![key_command(key)],
            InputEvent::Line(line) => match self.parse_line(&line) {
                Ok(commands) => commands,
                Err(msg) => {
                    let _ = writeln!(self.out, "? {msg}");
                    Vec::new()
                }
            },
            InputEvent::Quit => vec![Command::Quit],
        }
    }

    fn render(&mut self, document: &Document) {
        if !std::mem::take(&mut self.print_requested) {
            return;
        }
        if let Err(e) = self.print(document) {
            tracing::warn!(%e, "could not write output");
        }
    }

    fn report(&mut self, command: &Command, error: &CoreError) {
        tracing::debug!(command = command.display_name(), %error, "command failed");
        let _ = writeln!(self.out, "? {}: {}", command.display_name(), error);
    }
}

fn motion(word: &str) -> Option<Motion> {
    let motion = match word {
        "left" => Motion::Left,
        "right" => Motion::Right,
        "up" => Motion::Up,
        "down" => Motion::Down,
        "bow" => Motion::WordStart,
        "eow" => Motion::WordEnd,
        "bol" => Motion::LineStart,
        "eol" => Motion::LineEnd,
        "pgup" => Motion::PageUp,
        "pgdn" => Motion::PageDown,
        "bof" => Motion::FileStart,
        "eof" => Motion::FileEnd,
        _ => return None,
    };
    Some(motion)
}

fn key_command(key: Key) -> Command {
    match key {
        Key::Enter => Command::Newline,
        Key::Backspace => Command::Backspace,
        Key::Delete => Command::Delete,
        Key::Tab => Command::InsertChar('\t'),
        Key::Left => Command::Move(Motion::Left),
        Key::Right => Command::Move(Motion::Right),
        Key::Up => Command::Move(Motion::Up),
        Key::Down => Command::Move(Motion::Down),
        Key::Home => Command::Move(Motion::LineStart),
        Key::End => Command::Move(Motion::LineEnd),
        Key::PageUp => Command::Move(Motion::PageUp),
        Key::PageDown => Command::Move(Motion::PageDown),
    }
}

/// Expands `\n`, `\t` and `\\`.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_core::{Config, Editor, InputQueue};

    fn run(lines: &[&str]) -> (Editor, String) {
        let (sender, queue) = InputQueue::channel();
        for line in lines {
            sender.send(InputEvent::Line(line.to_string()));
        }
        drop(sender);

        let mut editor = Editor::new(Config::default());
        let mut dispatcher = LineDispatcher::new(Vec::new());
        editor.run(queue, &mut dispatcher);
        let out = String::from_utf8(dispatcher.output().clone()).unwrap();
        (editor, out)
    }

    #[test]
    fn test_parse_commands() {
        let mut d = LineDispatcher::new(Vec::new());
        assert_eq!(d.parse_line("down 3").unwrap().len(), 3);
        assert_eq!(d.parse_line("goto 5").unwrap(), vec![Command::GotoLine(4)]);
        assert_eq!(
            d.parse_line("i a\\tb").unwrap(),
            vec![
                Command::InsertChar('a'),
                Command::InsertChar('\t'),
                Command::InsertChar('b')
            ]
        );
        assert_eq!(d.parse_line("save").unwrap(), vec![Command::Save]);
        assert!(d.parse_line("sel maybe").is_err());
        assert!(d.parse_line("frobnicate").is_err());
        assert!(d.parse_line("").unwrap().is_empty());
    }

    #[test]
    fn test_session_script() {
        let (editor, out) = run(&[
            "i this is sparta.",
            "bol",
            "eow 2",
            "i n't",
            "print",
            "undo",
            "print",
            "quit",
            "i never typed",
        ]);
        assert_eq!(editor.document().contents(), "this is sparta.");
        assert!(out.contains("   1 this isn't sparta.\n"));
        assert!(out.contains("   1 this is sparta.\n-- Untitled 1:8 [+]\n"));
    }

    #[test]
    fn test_errors_are_reported() {
        let (_, out) = run(&["bogus", "save"]);
        assert!(out.contains("? unknown command: bogus"));
        assert!(out.contains("? Save: Document has no file path"));
    }

    #[test]
    fn test_save_as_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let save = format!("save {}", path.display());
        let (editor, _) = run(&["i one\\ntwo", &save]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo");
        assert_eq!(editor.document().name(), "out.txt");
        assert!(!editor.document().is_modified());
    }

    #[test]
    fn test_keys_and_text_events() {
        let mut d = LineDispatcher::new(Vec::new());
        assert_eq!(d.dispatch(InputEvent::Key(Key::Home)), vec![Command::Move(Motion::LineStart)]);
        assert_eq!(d.dispatch(InputEvent::Text("ok".into())).len(), 2);
        assert_eq!(d.dispatch(InputEvent::Quit), vec![Command::Quit]);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb\\c\"), "a\nb\\c\\");
    }
}
