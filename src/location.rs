//! Source locations, measured in the client's negotiated encoding.
//!
//! spec.md §4.1: "location columns are always expressed in the client's
//! negotiated encoding. Conversion from parser byte offsets to code units is
//! done once per parse via a cache structure returned by the parser; all
//! locations derived from a single parse share this cache." `Encoding` names
//! the negotiated unit; `OffsetCache` is that per-parse cache, generalizing
//! `RubyDocument::offset_to_position` (which only ever counted
//! UTF-8-decoded chars) to all three encodings §6 allows a host to negotiate.

use std::cmp;

/// Code-unit encoding negotiated with the host (spec.md §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    Utf16,
    Utf32,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Utf16
    }
}

/// An immutable source span. Columns are in code units of whatever
/// `Encoding` built the `OffsetCache` that produced this value. Equality is
/// structural (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Location {
    pub start_line: u32,
    pub end_line: u32,
    pub start_col: u32,
    pub end_col: u32,
}

impl Location {
    pub fn new(start_line: u32, start_col: u32, end_line: u32, end_col: u32) -> Self {
        Self {
            start_line,
            end_line,
            start_col,
            end_col,
        }
    }

    /// A location collapsed to its start point, used when only a position
    /// (not a span) is needed, e.g. the line a comment block ends on.
    pub fn start_point(&self) -> Location {
        Location::new(self.start_line, self.start_col, self.start_line, self.start_col)
    }
}

/// Converts byte offsets produced by the syntax-tree producer into
/// `(line, code_unit_column)` pairs, once per file, in the negotiated
/// encoding. Shared by every `Location` built while indexing a single file.
pub struct OffsetCache {
    encoding: Encoding,
    /// Byte offset at the start of each line; last entry is the source length.
    line_starts: Vec<usize>,
    source_len: usize,
}

impl OffsetCache {
    pub fn new(source: &str, encoding: Encoding) -> Self {
        let mut line_starts = vec![0];
        let mut offset = 0;
        for ch in source.chars() {
            offset += ch.len_utf8();
            if ch == '\n' {
                line_starts.push(offset);
            }
        }
        if line_starts.last() != Some(&source.len()) {
            line_starts.push(source.len());
        }
        Self {
            encoding,
            line_starts,
            source_len: source.len(),
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Converts a byte offset to `(line, column)` in code units of `self.encoding`.
    /// Requires `source` to be the exact text this cache was built from.
    pub fn position(&self, source: &str, byte_offset: usize) -> (u32, u32) {
        let offset = cmp::min(byte_offset, self.source_len);
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(exact) => exact,
            Err(after) => after.saturating_sub(1),
        };
        let line_start = self.line_starts[line_index];
        let slice = &source[line_start..offset];
        let column = match self.encoding {
            Encoding::Utf8 => slice.len() as u32,
            Encoding::Utf16 => slice.encode_utf16().count() as u32,
            Encoding::Utf32 => slice.chars().count() as u32,
        };
        (line_index as u32, column)
    }

    pub fn location(&self, source: &str, start_offset: usize, end_offset: usize) -> Location {
        let (start_line, start_col) = self.position(source, start_offset);
        let (end_line, end_col) = self.position(source, end_offset);
        Location::new(start_line, start_col, end_line, end_col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_offsets_agree_across_encodings() {
        let source = "class A\nend\n";
        for encoding in [Encoding::Utf8, Encoding::Utf16, Encoding::Utf32] {
            let cache = OffsetCache::new(source, encoding);
            assert_eq!(cache.position(source, 0), (0, 0));
            assert_eq!(cache.position(source, 6), (0, 6));
            assert_eq!(cache.position(source, 8), (1, 0));
        }
    }

    #[test]
    fn utf16_counts_surrogate_pairs_as_two_units() {
        // U+1F600 (grinning face) is one Unicode scalar value but two UTF-16 code units.
        let source = "a = \u{1F600}\n";
        let cache = OffsetCache::new(source, Encoding::Utf16);
        let emoji_start = source.find('\u{1F600}').unwrap();
        let emoji_end = emoji_start + '\u{1F600}'.len_utf8();
        let (_, start_col) = cache.position(source, emoji_start);
        let (_, end_col) = cache.position(source, emoji_end);
        assert_eq!(end_col - start_col, 2);

        let cache32 = OffsetCache::new(source, Encoding::Utf32);
        let (_, start_col32) = cache32.position(source, emoji_start);
        let (_, end_col32) = cache32.position(source, emoji_end);
        assert_eq!(end_col32 - start_col32, 1);
    }

    #[test]
    fn location_equality_is_structural() {
        let a = Location::new(1, 0, 1, 5);
        let b = Location::new(1, 0, 1, 5);
        assert_eq!(a, b);
    }
}
