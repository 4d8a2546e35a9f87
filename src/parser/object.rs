use crate::error::{PdfError, Result};
use crate::parser::cursor::{ByteCursor, TOKEN_STOP, WHITESPACE};
use crate::report::{IssueKind, Report};
use crate::types::{Dict, ObjRef, Object, ParsedObject};

const INTEGER_LEAD: &[u8] = b"+-0123456789";
const REAL_LEAD: &[u8] = b"+-.0123456789";

/// Recursive-descent reader for PDF objects.
///
/// Every type test is a lookahead that leaves the cursor alone; only the
/// matching reader consumes input. Number tokens that fail to parse are
/// read as zero and noted in the parser's report.
pub struct Parser<'a> {
    cursor: ByteCursor<'a>,
    report: Report,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            cursor: ByteCursor::new(data),
            report: Report::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn seek(&mut self, pos: usize) {
        self.cursor.seek(pos);
    }

    /// Hand over the issues noted so far
    pub fn take_report(&mut self) -> Report {
        std::mem::take(&mut self.report)
    }

    /// Parse one top-level object: optional `n g obj` header, the value,
    /// an attached stream, and a trailing `endobj` if present.
    pub fn parse_indirect(&mut self) -> Result<ParsedObject> {
        let id = match self.numbers_then(self.position(), b"obj") {
            Some((obj_ref, end)) => {
                self.cursor.seek(end);
                Some(obj_ref)
            }
            None => None,
        };

        let value = self.parse_object()?;

        let (begin, end) = self
            .cursor
            .token_bounds(self.position(), WHITESPACE, TOKEN_STOP);
        if self.cursor.slice(begin, end) == b"endobj" {
            self.cursor.seek(end);
        }

        Ok(ParsedObject { id, value })
    }

    /// Parse a single object; input that matches no object kind is Null
    /// and is left unconsumed.
    pub fn parse_object(&mut self) -> Result<Object> {
        Ok(self.parse_value()?.unwrap_or(Object::Null))
    }

    fn parse_value(&mut self) -> Result<Option<Object>> {
        self.cursor.skip_whitespace();
        let pos = self.position();
        let token = self.cursor.token_at(pos, WHITESPACE, TOKEN_STOP);

        // The reference test must come before the number tests: "3 0 R"
        // starts like an integer. Real goes before integer for the same
        // reason with the decimal point.
        let value = if token == b"true" || token == b"false" {
            self.cursor.seek(pos + token.len());
            Object::Bool(token == b"true")
        } else if let Some((obj_ref, end)) = self.numbers_then(pos, b"R") {
            self.cursor.seek(end);
            Object::Ref(obj_ref)
        } else if self.cursor.starts_with_at(pos, b"<<") {
            self.parse_dict_or_stream()?
        } else if is_real(token) {
            self.cursor.seek(pos + token.len());
            Object::Real(self.number_or_zero(token, pos))
        } else if is_integer(token) {
            self.cursor.seek(pos + token.len());
            Object::Int(self.number_or_zero(token, pos))
        } else if self.cursor.is_char_in_set_at(pos, b"/") {
            Object::Name(self.read_name()?)
        } else if self.cursor.is_char_in_set_at(pos, b"[") {
            self.parse_array()?
        } else if self.cursor.is_char_in_set_at(pos, b"(") {
            Object::String(self.read_literal_string()?)
        } else if self.cursor.is_char_in_set_at(pos, b"<") {
            Object::String(self.read_hex_string()?)
        } else if token == b"null" {
            self.cursor.seek(pos + token.len());
            Object::Null
        } else {
            return Ok(None);
        };

        Ok(Some(value))
    }

    /// Lookahead for `<int> <int> keyword` starting at `pos`. Returns the
    /// pair and the position just after the keyword.
    fn numbers_then(&self, pos: usize, keyword: &[u8]) -> Option<(ObjRef, usize)> {
        let (b1, e1) = self.cursor.token_bounds(pos, WHITESPACE, TOKEN_STOP);
        let obj_num: u32 = parse_unsigned(self.cursor.slice(b1, e1))?;

        let (b2, e2) = self.cursor.token_bounds(e1, WHITESPACE, TOKEN_STOP);
        let gen_num: u16 = parse_unsigned(self.cursor.slice(b2, e2))?;

        let (b3, e3) = self.cursor.token_bounds(e2, WHITESPACE, TOKEN_STOP);
        if self.cursor.slice(b3, e3) != keyword {
            return None;
        }

        Some((ObjRef::new(obj_num, gen_num), e3))
    }

    fn number_or_zero<T>(&mut self, token: &[u8], pos: usize) -> T
    where
        T: std::str::FromStr + Default,
    {
        match std::str::from_utf8(token).ok().and_then(|s| s.parse().ok()) {
            Some(n) => n,
            None => {
                self.report.record(
                    IssueKind::MalformedToken,
                    format!(
                        "unparsable number '{}' at byte {}, using 0",
                        String::from_utf8_lossy(token),
                        pos
                    ),
                );
                T::default()
            }
        }
    }

    /// Read name /... with #xx escapes decoded
    fn read_name(&mut self) -> Result<String> {
        let start = self.position() + 1; // Skip '/'
        let end = self.cursor.scan_to_char_in(start, TOKEN_STOP);
        let raw = self.cursor.slice(start, end);
        self.cursor.seek(end);

        let mut name = Vec::with_capacity(raw.len());
        let mut i = 0;
        while i < raw.len() {
            if raw[i] == b'#' && i + 2 < raw.len() {
                name.push((hex_value(raw[i + 1]) << 4) | hex_value(raw[i + 2]));
                i += 3;
            } else {
                name.push(raw[i]);
                i += 1;
            }
        }

        String::from_utf8(name)
            .map_err(|_| PdfError::parse(start, "name is not valid UTF-8"))
    }

    /// Parse array [...]
    fn parse_array(&mut self) -> Result<Object> {
        let open = self.position();
        self.cursor.seek(open + 1); // Skip '['
        let mut items = Vec::new();

        loop {
            self.cursor.skip_whitespace();
            let pos = self.position();

            if self.cursor.at_end() {
                return Err(PdfError::parse(open, "Unterminated array"));
            }
            if self.cursor.is_char_in_set_at(pos, b"]") {
                self.cursor.seek(pos + 1);
                break;
            }

            let item = self.parse_value()?.ok_or_else(|| {
                PdfError::parse(pos, format!("Unexpected byte in array: 0x{:02X}", self.byte_at(pos)))
            })?;
            items.push(item);
        }

        Ok(Object::Array(items))
    }

    /// Parse dictionary, and the stream body if one follows
    fn parse_dict_or_stream(&mut self) -> Result<Object> {
        let open = self.position();
        self.cursor.seek(open + 2); // Skip '<<'
        let mut dict = Dict::new();

        loop {
            self.cursor.skip_whitespace();
            let pos = self.position();

            if self.cursor.at_end() {
                return Err(PdfError::parse(open, "Unterminated dictionary"));
            }
            if self.cursor.starts_with_at(pos, b">>") {
                self.cursor.seek(pos + 2);
                break;
            }

            // Key must be a name
            if !self.cursor.is_char_in_set_at(pos, b"/") {
                return Err(PdfError::parse(
                    pos,
                    format!("Dictionary key must be name, got byte 0x{:02X}", self.byte_at(pos)),
                ));
            }
            let key = self.read_name()?;

            let value = self.parse_value()?.ok_or_else(|| {
                PdfError::parse(self.position(), format!("Missing value for /{}", key))
            })?;

            dict.insert(key, value);
        }

        match self.stream_body_start()? {
            Some(body) => {
                let data = self.read_stream_data(&dict, body)?;
                Ok(Object::Stream { dict, data })
            }
            None => Ok(Object::Dict(dict)),
        }
    }

    /// If the `stream` keyword follows, the position of the first body byte.
    /// The keyword must be followed by LF or CRLF; a bare CR is rejected.
    fn stream_body_start(&self) -> Result<Option<usize>> {
        let (begin, end) = self.cursor.token_bounds(self.position(), WHITESPACE, TOKEN_STOP);
        if self.cursor.slice(begin, end) != b"stream" {
            return Ok(None);
        }

        if self.cursor.starts_with_at(end, b"\r\n") {
            Ok(Some(end + 2))
        } else if self.cursor.starts_with_at(end, b"\n") {
            Ok(Some(end + 1))
        } else {
            Err(PdfError::parse(
                end,
                "stream keyword must be followed by CRLF or LF",
            ))
        }
    }

    /// Slice `Length` raw bytes and move past `endstream`
    fn read_stream_data(&mut self, dict: &Dict, body: usize) -> Result<Vec<u8>> {
        let length = match dict.get("Length") {
            Some(Object::Int(n)) if *n >= 0 => *n as usize,
            Some(Object::Ref(r)) => {
                return Err(PdfError::Unsupported(format!(
                    "stream Length given as indirect reference {} {} R",
                    r.obj_num, r.gen_num
                )));
            }
            Some(other) => {
                return Err(PdfError::Unsupported(format!(
                    "stream Length of type {}",
                    other.type_name()
                )));
            }
            None => return Err(PdfError::missing_key("Length")),
        };

        let end = body.saturating_add(length);
        let data = self.cursor.slice(body, end).to_vec();

        let after = self.cursor.scan_past_chars_in(end, WHITESPACE);
        let marker = b"endstream";
        if self.cursor.starts_with_at(after, marker) {
            self.cursor.seek(after + marker.len());
        } else if let Some(found) = self.cursor.find_literal(body, marker) {
            log::debug!(
                "stream at byte {} does not end at its Length, endstream found at {}",
                body,
                found
            );
            self.cursor.seek(found + marker.len());
        } else {
            return Err(PdfError::parse(body, "Missing endstream"));
        }

        Ok(data)
    }

    /// Read literal string (...)
    fn read_literal_string(&mut self) -> Result<Vec<u8>> {
        let open = self.position();
        let data = self.cursor.data();
        let mut pos = open + 1; // Skip opening '('
        let mut result = Vec::new();
        let mut depth = 1;

        while depth > 0 {
            let b = *data
                .get(pos)
                .ok_or_else(|| PdfError::parse(open, "Unterminated string"))?;
            pos += 1;

            match b {
                b'(' => {
                    depth += 1;
                    result.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth > 0 {
                        result.push(b);
                    }
                }
                b'\\' => {
                    let escaped = *data
                        .get(pos)
                        .ok_or_else(|| PdfError::parse(open, "Unterminated string"))?;
                    pos += 1;
                    match escaped {
                        b'n' => result.push(b'\n'),
                        b'r' => result.push(b'\r'),
                        b't' => result.push(b'\t'),
                        b'b' => result.push(0x08),
                        b'f' => result.push(0x0C),
                        b'0'..=b'7' => {
                            // Octal escape (1-3 digits)
                            let mut octal = (escaped - b'0') as u32;
                            for _ in 0..2 {
                                match data.get(pos) {
                                    Some(d @ b'0'..=b'7') => {
                                        octal = octal * 8 + (d - b'0') as u32;
                                        pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            result.push(octal as u8);
                        }
                        b'\r' => {
                            // Line continuation
                            if data.get(pos) == Some(&b'\n') {
                                pos += 1;
                            }
                        }
                        b'\n' => {}
                        // \( \) \\ and unknown escapes stand for themselves
                        _ => result.push(escaped),
                    }
                }
                _ => result.push(b),
            }
        }

        self.cursor.seek(pos);
        Ok(result)
    }

    /// Read hex string <...>
    fn read_hex_string(&mut self) -> Result<Vec<u8>> {
        let open = self.position();
        let close = self
            .cursor
            .find_literal(open, b">")
            .ok_or_else(|| PdfError::parse(open, "Unterminated hex string"))?;

        let mut hex_chars = Vec::new();
        for (i, &b) in self.cursor.slice(open + 1, close).iter().enumerate() {
            match b {
                b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' => hex_chars.push(b),
                _ if WHITESPACE.contains(&b) => {}
                _ => {
                    return Err(PdfError::parse(
                        open + 1 + i,
                        format!("Invalid hex char: 0x{:02X}", b),
                    ));
                }
            }
        }

        // Pad with 0 if odd length
        if hex_chars.len() % 2 == 1 {
            hex_chars.push(b'0');
        }

        self.cursor.seek(close + 1);
        Ok(hex_chars
            .chunks(2)
            .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
            .collect())
    }

    fn byte_at(&self, pos: usize) -> u8 {
        self.cursor.slice(pos, pos + 1).first().copied().unwrap_or(0)
    }
}

fn is_integer(token: &[u8]) -> bool {
    token.first().is_some_and(|b| INTEGER_LEAD.contains(b)) && !token.contains(&b'.')
}

fn is_real(token: &[u8]) -> bool {
    token.first().is_some_and(|b| REAL_LEAD.contains(b)) && token.contains(&b'.')
}

fn parse_unsigned<T: std::str::FromStr>(token: &[u8]) -> Option<T> {
    if token.is_empty() || !token.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(token).ok()?.parse().ok()
}

/// Convert hex digit to value
fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}
