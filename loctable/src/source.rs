//! Pipe-delimited source text
//!
//! A source file is a flat sequence of values separated by `|`. Rows are not
//! lines: a row is simply the next `language_count` values, and the next row
//! starts wherever the previous one stopped. Space and tab around a value are
//! insignificant. Every other byte is content, including newlines.
//!
//! A literal pipe inside a value is written `||`. The scanner only needs to
//! know not to stop there; the pair is collapsed later by [`unescape_into`],
//! when the value is copied to its final home.

use crate::MAX_LANGUAGES;
use arrayvec::ArrayVec;

/// One row of source text: a view of each column, column 0 being the key
pub type Row<'a> = ArrayVec<&'a [u8], MAX_LANGUAGES>;

/// Value delimiter, doubled to escape
const PIPE: u8 = b'|';

/// True for the bytes trimmed from both ends of a value
#[inline(always)]
fn is_blank(byte: u8) -> bool {
    byte == b' ' || byte == b'\t'
}

/// Cursor over pipe-delimited source text
///
/// Values are returned as views into the input, still escaped.
#[derive(Debug, Clone)]
pub struct SourceReader<'a> {
    /// Whole source text
    input: &'a [u8],
    /// Offset of the next unread byte
    pos: usize,
}

impl<'a> SourceReader<'a> {
    /// Start reading at the beginning of `input`.
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Check whether the whole input has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consume one value and the delimiter that ends it, if any.
    ///
    /// Leading and trailing space/tab are trimmed. An escaped `||` doesn't end
    /// the value and is returned as-is. At the end of input this returns an
    /// empty value and doesn't move.
    pub fn next_value(&mut self) -> &'a [u8] {
        let input = self.input;
        let mut at = self.pos;
        while at < input.len() && is_blank(input[at]) {
            at += 1;
        }
        let start = at;

        while at < input.len() {
            if input[at] != PIPE {
                at += 1;
            } else if input.get(at + 1) == Some(&PIPE) {
                at += 2;
            } else {
                break;
            }
        }

        let mut end = at;
        while end > start && is_blank(input[end - 1]) {
            end -= 1;
        }

        if at < input.len() {
            // The loop above only stops early on a lone delimiter.
            at += 1;
        }
        self.pos = at;
        &input[start..end]
    }

    /// Consume the next row of `language_count` values.
    ///
    /// Returns `None` at the end of input, or when the row's canonical key is
    /// empty. Either one ends the data; an empty key is not an error. Missing
    /// trailing columns at the very end of input come back empty.
    ///
    /// Panics if `language_count` exceeds [`MAX_LANGUAGES`].
    pub fn next_row(&mut self, language_count: usize) -> Option<Row<'a>> {
        assert!(language_count <= MAX_LANGUAGES);
        if self.is_at_end() {
            return None;
        }
        let mut row = Row::new();
        for _ in 0..language_count {
            row.push(self.next_value());
        }
        match row.first() {
            Some(key) if !key.is_empty() => Some(row),
            _ => None,
        }
    }
}

/// Copy `src` into the front of `dest`, collapsing each `||` into `|`.
///
/// Pairs are matched left to right, so a run of three pipes becomes two.
/// Returns the number of bytes written, which is [`unescaped_len`] of `src`.
///
/// Panics if `dest` is shorter than that.
pub fn unescape_into(dest: &mut [u8], src: &[u8]) -> usize {
    let mut written = 0;
    let mut i = 0;
    while i < src.len() {
        dest[written] = src[i];
        written += 1;
        i += if src[i] == PIPE && src.get(i + 1) == Some(&PIPE) {
            2
        } else {
            1
        };
    }
    written
}

/// Length of `src` once every `||` is collapsed into `|`.
pub fn unescaped_len(src: &[u8]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < src.len() {
        len += 1;
        i += if src[i] == PIPE && src.get(i + 1) == Some(&PIPE) {
            2
        } else {
            1
        };
    }
    len
}
