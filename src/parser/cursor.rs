/// PDF whitespace: NUL, TAB, LF, FF, CR, SPACE
pub const WHITESPACE: &[u8] = b"\x00\x09\x0A\x0C\x0D\x20";

/// PDF delimiter characters
pub const DELIMITERS: &[u8] = b"()<>[]{}/%";

/// End-of-line markers
pub const END_OF_LINE: &[u8] = b"\x0A\x0D";

/// Whitespace and delimiters: the characters that end a regular token
pub const TOKEN_STOP: &[u8] = b"\x00\x09\x0A\x0C\x0D\x20()<>[]{}/%";

/// Scan position over an immutable byte buffer.
///
/// Searches never fail: running off the end yields `len()`, and slicing an
/// invalid range yields an empty slice. Malformed input is handled by the
/// callers that inspect what came back.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn seek(&mut self, pos: usize) {
        self.pos = pos.min(self.data.len());
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// True if the byte at `pos` is one of `set`; false past the end
    pub fn is_char_in_set_at(&self, pos: usize, set: &[u8]) -> bool {
        self.data.get(pos).is_some_and(|b| set.contains(b))
    }

    /// First position at or after `start` holding a byte from `set`
    pub fn scan_to_char_in(&self, start: usize, set: &[u8]) -> usize {
        let start = start.min(self.data.len());
        self.data[start..]
            .iter()
            .position(|b| set.contains(b))
            .map_or(self.data.len(), |p| start + p)
    }

    /// First position at or after `start` holding a byte NOT in `set`
    pub fn scan_past_chars_in(&self, start: usize, set: &[u8]) -> usize {
        let start = start.min(self.data.len());
        self.data[start..]
            .iter()
            .position(|b| !set.contains(b))
            .map_or(self.data.len(), |p| start + p)
    }

    /// Bounds of the token starting at `start`: leading `trim` bytes are
    /// skipped and the token runs up to the first `stop` byte.
    pub fn token_bounds(&self, start: usize, trim: &[u8], stop: &[u8]) -> (usize, usize) {
        let begin = self.scan_past_chars_in(start, trim);
        let end = self.scan_to_char_in(begin, stop);
        (begin, end)
    }

    /// Token at `start` without moving the cursor
    pub fn token_at(&self, start: usize, trim: &[u8], stop: &[u8]) -> &'a [u8] {
        let (begin, end) = self.token_bounds(start, trim, stop);
        self.slice(begin, end)
    }

    /// Read a token and leave the cursor on the stop byte
    pub fn read_token(&mut self, trim: &[u8], stop: &[u8]) -> &'a [u8] {
        let (begin, end) = self.token_bounds(self.pos, trim, stop);
        self.pos = end;
        self.slice(begin, end)
    }

    /// Move the cursor past any bytes in `set`
    pub fn skip_chars_in(&mut self, set: &[u8]) {
        self.pos = self.scan_past_chars_in(self.pos, set);
    }

    pub fn skip_whitespace(&mut self) {
        self.skip_chars_in(WHITESPACE);
    }

    /// Position of the first occurrence of `needle` at or after `start`
    pub fn find_literal(&self, start: usize, needle: &[u8]) -> Option<usize> {
        if needle.is_empty() || start >= self.data.len() {
            return None;
        }
        self.data[start..]
            .windows(needle.len())
            .position(|w| w == needle)
            .map(|p| start + p)
    }

    pub fn starts_with_at(&self, pos: usize, literal: &[u8]) -> bool {
        self.data
            .get(pos..)
            .is_some_and(|rest| rest.starts_with(literal))
    }

    /// Bytes in `start..end`; an invalid or out-of-range span is empty
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        self.data.get(start..end).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_classes() {
        let cursor = ByteCursor::new(b"a \x00/");
        assert!(!cursor.is_char_in_set_at(0, WHITESPACE));
        assert!(cursor.is_char_in_set_at(1, WHITESPACE));
        assert!(cursor.is_char_in_set_at(2, WHITESPACE));
        assert!(cursor.is_char_in_set_at(3, DELIMITERS));
        assert!(!cursor.is_char_in_set_at(99, DELIMITERS));
    }

    #[test]
    fn test_scans() {
        let cursor = ByteCursor::new(b"  abc/def");
        assert_eq!(cursor.scan_past_chars_in(0, WHITESPACE), 2);
        assert_eq!(cursor.scan_to_char_in(0, DELIMITERS), 5);
        // Nothing found runs to the end
        assert_eq!(cursor.scan_to_char_in(6, END_OF_LINE), 9);
        assert_eq!(cursor.scan_past_chars_in(9, WHITESPACE), 9);
    }

    #[test]
    fn test_read_token_leaves_cursor_on_stop() {
        let mut cursor = ByteCursor::new(b"  12>> rest");
        assert_eq!(cursor.read_token(WHITESPACE, TOKEN_STOP), b"12");
        assert_eq!(cursor.position(), 4);
        assert!(cursor.is_char_in_set_at(cursor.position(), b">"));
    }

    #[test]
    fn test_read_lines() {
        let mut cursor = ByteCursor::new(b"BT\r\n1 0 0 1 5 6 Tm\n\n(x) Tj");
        assert_eq!(cursor.read_token(WHITESPACE, END_OF_LINE), b"BT");
        assert_eq!(cursor.read_token(WHITESPACE, END_OF_LINE), b"1 0 0 1 5 6 Tm");
        assert_eq!(cursor.read_token(WHITESPACE, END_OF_LINE), b"(x) Tj");
        assert!(cursor.at_end());
    }

    #[test]
    fn test_find_literal() {
        let cursor = ByteCursor::new(b"xx trailer yy trailer");
        assert_eq!(cursor.find_literal(0, b"trailer"), Some(3));
        assert_eq!(cursor.find_literal(4, b"trailer"), Some(14));
        assert_eq!(cursor.find_literal(0, b"startxref"), None);
    }

    #[test]
    fn test_slice_is_lenient() {
        let cursor = ByteCursor::new(b"abcdef");
        assert_eq!(cursor.slice(1, 3), b"bc");
        assert_eq!(cursor.slice(4, 2), b"");
        assert_eq!(cursor.slice(3, 100), b"");
    }
}
