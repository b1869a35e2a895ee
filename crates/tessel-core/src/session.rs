//! Session persistence: last cursor positions and the clipboard.
//!
//! Two small files under the session directory:
//! - `positions.json`: absolute file path -> last cursor position
//! - `clipboard`: the clipboard string, verbatim
//!
//! Missing files read as empty. Writes go through a temp file and a
//! rename so a crash never leaves a truncated file behind.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tessel_buffer::Position;

/// Application name used for the data directory.
const APP_NAME: &str = "tessel";

const POSITIONS_FILENAME: &str = "positions.json";

const CLIPBOARD_FILENAME: &str = "clipboard";

/// Session store errors.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Data directory not found")]
    NoDataDir,

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid session file: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Positions {
    files: BTreeMap<PathBuf, Position>,
}

/// Key-value files that survive between sessions.
#[derive(Debug, Clone)]
pub struct SessionStore {
    dir: PathBuf,
}

impl SessionStore {
    /// Uses `dir`, or the platform data directory when `None`.
    pub fn open(dir: Option<&Path>) -> Result<Self, SessionError> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => dirs::data_dir().ok_or(SessionError::NoDataDir)?.join(APP_NAME),
        };
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The last cursor position recorded for `file`.
    pub fn position(&self, file: &Path) -> Result<Option<Position>, SessionError> {
        let key = std::path::absolute(file)?;
        Ok(self.read_positions()?.files.get(&key).copied())
    }

    /// Records the cursor position for `file`.
    pub fn set_position(&self, file: &Path, pos: Position) -> Result<(), SessionError> {
        let key = std::path::absolute(file)?;
        let mut positions = self.read_positions()?;
        positions.files.insert(key, pos);
        let json = serde_json::to_string_pretty(&positions)?;
        self.write(POSITIONS_FILENAME, json.as_bytes())?;
        Ok(())
    }

    /// The persisted clipboard, empty if none was saved.
    pub fn clipboard(&self) -> Result<String, SessionError> {
        match fs::read_to_string(self.dir.join(CLIPBOARD_FILENAME)) {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_clipboard(&self, text: &str) -> Result<(), SessionError> {
        self.write(CLIPBOARD_FILENAME, text.as_bytes())?;
        Ok(())
    }

    fn read_positions(&self) -> Result<Positions, SessionError> {
        match fs::read_to_string(self.dir.join(POSITIONS_FILENAME)) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Positions::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, name: &str, contents: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, contents)?;
        fs::rename(&temp_path, &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_read_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(Some(dir.path())).unwrap();
        assert_eq!(store.position(Path::new("/tmp/x.txt")).unwrap(), None);
        assert_eq!(store.clipboard().unwrap(), "");
    }

    #[test]
    fn test_positions_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(Some(&dir.path().join("session"))).unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");

        store.set_position(&a, Position::new(3, 1)).unwrap();
        store.set_position(&b, Position::new(0, 4)).unwrap();
        store.set_position(&a, Position::new(5, 0)).unwrap();

        assert_eq!(store.position(&a).unwrap(), Some(Position::new(5, 0)));
        assert_eq!(store.position(&b).unwrap(), Some(Position::new(0, 4)));
    }

    #[test]
    fn test_clipboard_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::open(Some(dir.path())).unwrap();
        store.set_clipboard("two\nlines").unwrap();
        assert_eq!(store.clipboard().unwrap(), "two\nlines");
    }

    #[test]
    fn test_corrupt_positions_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(POSITIONS_FILENAME), "not json").unwrap();
        let store = SessionStore::open(Some(dir.path())).unwrap();
        assert!(matches!(
            store.position(Path::new("/a")),
            Err(SessionError::Json(_))
        ));
    }
}
