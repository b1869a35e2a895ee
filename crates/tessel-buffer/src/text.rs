//! Line-oriented projection of the document.
//!
//! The piece table is the only source of truth; `Line` and `Text` are
//! read-only views cut out of it. A `Line` never contains its trailing
//! newline, and all offsets into it are byte offsets that must fall on
//! rune boundaries.
//!
//! ## Visual offsets
//!
//! A tab occupies `tab_width` columns. Every other rune occupies its
//! Unicode display width, with zero-width marks rounded up to one column
//! so that every rune is individually addressable on screen.

use unicode_width::UnicodeWidthChar;

/// Display width of a single rune.
#[inline]
pub fn char_width(c: char, tab_width: usize) -> usize {
    if c == '\t' {
        tab_width
    } else {
        c.width().unwrap_or(1).max(1)
    }
}

/// Word runes are letters and digits; everything else separates words.
#[inline]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// A single line of text without its line terminator.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Line(String);

impl Line {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn is_char_boundary(&self, boff: usize) -> bool {
        self.0.is_char_boundary(boff)
    }

    /// Total display width of the line.
    pub fn visual_len(&self, tab_width: usize) -> usize {
        self.0.chars().map(|c| char_width(c, tab_width)).sum()
    }

    /// Display column at which the rune starting at `boff` is drawn.
    pub fn visual_offset(&self, boff: usize, tab_width: usize) -> usize {
        self.0[..boff].chars().map(|c| char_width(c, tab_width)).sum()
    }

    /// Byte offset for display column `voff`.
    ///
    /// Clamps to the end of the line and snaps down to the start of the
    /// rune covering `voff`, so the result is never inside a wide rune.
    pub fn offset(&self, voff: usize, tab_width: usize) -> usize {
        let mut col = 0;
        for (i, c) in self.0.char_indices() {
            let w = char_width(c, tab_width);
            if col + w > voff {
                return i;
            }
            col += w;
        }
        self.len()
    }

    /// Byte offset of the rune after the one at `boff`.
    pub fn next_boundary(&self, boff: usize) -> Option<usize> {
        self.0[boff..].chars().next().map(|c| boff + c.len_utf8())
    }

    /// Byte offset of the rune before `boff`.
    pub fn prev_boundary(&self, boff: usize) -> Option<usize> {
        self.0[..boff].char_indices().next_back().map(|(i, _)| i)
    }

    /// Byte offset of the first non-whitespace rune, or the line length.
    pub fn first_non_space(&self) -> usize {
        self.len() - self.0.trim_start().len()
    }

    /// Byte offset just past the last non-whitespace rune.
    pub fn trimmed_end(&self) -> usize {
        self.0.trim_end().len()
    }
}

impl AsRef<str> for Line {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Line {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An ordered list of lines: the line view of a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    lines: Vec<Line>,
}

impl Text {
    /// Splits on `\n` and `\r\n`. The result always has at least one line.
    pub fn parse(s: &str) -> Self {
        let lines = s
            .split('\n')
            .map(|l| Line::new(l.strip_suffix('\r').unwrap_or(l)))
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn get(&self, line: usize) -> Option<&Line> {
        self.lines.get(line)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].is_empty()
    }

    /// Canonical serialization: lines joined with `\n`.
    pub fn bytes(&self) -> Vec<u8> {
        let joined: Vec<&str> = self.lines.iter().map(Line::as_str).collect();
        joined.join("\n").into_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_width() {
        assert_eq!(char_width('a', 4), 1);
        assert_eq!(char_width('\t', 4), 4);
        assert_eq!(char_width('\t', 8), 8);
        assert_eq!(char_width('漢', 4), 2);
        assert_eq!(char_width('\u{0301}', 4), 1);
    }

    #[test]
    fn test_visual_offsets() {
        let line = Line::from("\ta漢b");
        assert_eq!(line.visual_len(4), 8);
        assert_eq!(line.visual_offset(0, 4), 0);
        assert_eq!(line.visual_offset(1, 4), 4);
        assert_eq!(line.visual_offset(2, 4), 5);
        assert_eq!(line.visual_offset(5, 4), 7);
    }

    #[test]
    fn test_offset_snaps_down() {
        let line = Line::from("\ta漢b");
        assert_eq!(line.offset(0, 4), 0);
        assert_eq!(line.offset(2, 4), 0);
        assert_eq!(line.offset(4, 4), 1);
        assert_eq!(line.offset(5, 4), 2);
        assert_eq!(line.offset(6, 4), 2);
        assert_eq!(line.offset(7, 4), 5);
        assert_eq!(line.offset(100, 4), line.len());
    }

    #[test]
    fn test_boundaries() {
        let line = Line::from("aé");
        assert_eq!(line.next_boundary(0), Some(1));
        assert_eq!(line.next_boundary(1), Some(3));
        assert_eq!(line.next_boundary(3), None);
        assert_eq!(line.prev_boundary(3), Some(1));
        assert_eq!(line.prev_boundary(0), None);
    }

    #[test]
    fn test_space_bounds() {
        let line = Line::from("  foo bar  ");
        assert_eq!(line.first_non_space(), 2);
        assert_eq!(line.trimmed_end(), 9);
        let blank = Line::from("   ");
        assert_eq!(blank.first_non_space(), 3);
        assert_eq!(blank.trimmed_end(), 0);
    }

    #[test]
    fn test_text_parse_and_join() {
        let text = Text::parse("one\r\ntwo\nthree");
        assert_eq!(text.len(), 3);
        assert_eq!(text.get(0).unwrap().as_str(), "one");
        assert_eq!(text.bytes(), b"one\ntwo\nthree");

        let trailing = Text::parse("a\n");
        assert_eq!(trailing.len(), 2);
        assert_eq!(trailing.bytes(), b"a\n");
        assert!(Text::parse("").is_empty());
    }
}
