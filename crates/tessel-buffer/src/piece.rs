//! The storage unit of the piece table.
//!
//! Document bytes live in two [`Store`]s: the text the document was loaded
//! with, which never changes, and an append-only store that receives every
//! typed rune. A [`Piece`] is a span of one store. It holds no bytes of its
//! own, so splitting or trimming a piece only adjusts a few integers.
//!
//! Each store indexes its newlines once, as bytes enter it. A piece refers
//! to the run of that index that falls inside its span, and splitting a
//! piece partitions the run with a binary search instead of scanning bytes.

/// Which store a piece points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// The text the document was loaded with.
    Original,
    /// Runes written since.
    Added,
}

/// Bytes plus the ascending offsets of every `\n` among them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Store {
    bytes: Vec<u8>,
    newlines: Vec<usize>,
}

impl Store {
    /// Builds a store, scanning `bytes` once for newlines.
    pub fn new(bytes: Vec<u8>) -> Self {
        let newlines = bytes
            .iter()
            .enumerate()
            .filter(|(_, b)| **b == b'\n')
            .map(|(i, _)| i)
            .collect();
        Self { bytes, newlines }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Appends one rune, extending the newline index if it is `\n`.
    /// Returns the store offset the rune starts at.
    pub fn push_char(&mut self, c: char) -> usize {
        let at = self.bytes.len();
        if c == '\n' {
            self.newlines.push(at);
        }
        let mut buf = [0u8; 4];
        self.bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
        at
    }
}

/// A span `[start, start + len)` of one store, with the range of the
/// store's newline index that falls inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    source: Source,
    start: usize,
    len: usize,
    /// `store.newlines[nl_start..nl_end]` are the newlines in this span.
    nl_start: usize,
    nl_end: usize,
}

impl Piece {
    /// A piece covering `[start, start + len)` of `store`.
    pub fn new(source: Source, store: &Store, start: usize, len: usize) -> Self {
        assert!(
            start + len <= store.len(),
            "span {start}+{len} outside store of {}",
            store.len()
        );
        let nl_start = store.newlines.partition_point(|&n| n < start);
        let nl_end = store.newlines.partition_point(|&n| n < start + len);
        Self { source, start, len, nl_start, nl_end }
    }

    #[inline]
    pub fn source(&self) -> Source {
        self.source
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn newline_count(&self) -> usize {
        self.nl_end - self.nl_start
    }

    pub fn bytes<'s>(&self, store: &'s Store) -> &'s [u8] {
        &store.bytes[self.start..self.start + self.len]
    }

    /// Offset of the `i`-th newline in this piece, relative to its start.
    pub fn newline(&self, store: &Store, i: usize) -> usize {
        assert!(i < self.newline_count(), "newline {i} of {}", self.newline_count());
        store.newlines[self.nl_start + i] - self.start
    }

    /// Newlines in `[0, offset)`.
    pub fn newlines_below(&self, store: &Store, offset: usize) -> usize {
        self.index(store).partition_point(|&n| n < self.start + offset)
    }

    /// First newline strictly after `offset`.
    pub fn newline_after(&self, store: &Store, offset: usize) -> Option<usize> {
        let index = self.index(store);
        let idx = index.partition_point(|&n| n <= self.start + offset);
        index.get(idx).map(|n| n - self.start)
    }

    /// Last newline strictly before `offset`.
    pub fn newline_before(&self, store: &Store, offset: usize) -> Option<usize> {
        let idx = self.newlines_below(store, offset);
        idx.checked_sub(1).map(|i| self.newline(store, i))
    }

    /// Splits the piece at `at`, keeping `[0, at)` and returning `[at, len)`.
    /// No bytes move and none are rescanned.
    pub fn split_off(&mut self, store: &Store, at: usize) -> Piece {
        assert!(
            at > 0 && at < self.len,
            "split offset {at} outside piece interior (len {})",
            self.len
        );
        let mid = self.nl_start + self.newlines_below(store, at);
        let tail = Piece {
            source: self.source,
            start: self.start + at,
            len: self.len - at,
            nl_start: mid,
            nl_end: self.nl_end,
        };
        self.len = at;
        self.nl_end = mid;
        tail
    }

    /// Grows the piece over `width` bytes just pushed onto its store.
    /// The piece must end where the store ended before the push.
    pub fn extend(&mut self, store: &Store, width: usize) {
        assert_eq!(
            self.start + self.len + width,
            store.len(),
            "extended piece does not end at the store tail"
        );
        self.len += width;
        self.nl_end = store.newlines.len();
    }

    /// Drops the first `n` bytes.
    pub fn remove_front(&mut self, store: &Store, n: usize) {
        assert!(n <= self.len, "cannot remove {n} bytes from piece of {}", self.len);
        self.nl_start += self.newlines_below(store, n);
        self.start += n;
        self.len -= n;
    }

    /// Drops the last `n` bytes.
    pub fn remove_back(&mut self, store: &Store, n: usize) {
        assert!(n <= self.len, "cannot remove {n} bytes from piece of {}", self.len);
        let keep = self.len - n;
        self.nl_end = self.nl_start + self.newlines_below(store, keep);
        self.len = keep;
    }

    /// Start of the rune that ends at `offset`.
    pub fn char_start_before(&self, store: &Store, offset: usize) -> usize {
        assert!(offset > 0 && offset <= self.len);
        let bytes = self.bytes(store);
        let mut i = offset - 1;
        while i > 0 && is_continuation(bytes[i]) {
            i -= 1;
        }
        i
    }

    /// Panics if the piece's newline range disagrees with its bytes.
    pub fn check(&self, store: &Store) {
        assert!(self.start + self.len <= store.len(), "piece past end of store");
        let index = self.index(store);
        assert!(
            index.iter().all(|&n| n >= self.start && n < self.start + self.len),
            "newline range {}..{} leaves the piece span",
            self.nl_start,
            self.nl_end
        );
        let count = self.bytes(store).iter().filter(|b| **b == b'\n').count();
        assert_eq!(count, index.len(), "newline range is missing entries");
    }

    fn index<'s>(&self, store: &'s Store) -> &'s [usize] {
        &store.newlines[self.nl_start..self.nl_end]
    }
}

#[inline]
pub(crate) fn is_continuation(b: u8) -> bool {
    b & 0xC0 == 0x80
}

/// Byte length of the UTF-8 sequence introduced by `lead`.
pub(crate) fn utf8_width(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => panic!("byte {lead:#04x} does not start a UTF-8 sequence"),
    }
}
