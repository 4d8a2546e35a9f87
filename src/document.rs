use std::path::Path;

use crate::decode::decode_stream;
use crate::error::{PdfError, Result};
use crate::pages::collect_page_numbers;
use crate::parser::cursor::{END_OF_LINE, WHITESPACE};
use crate::parser::{ByteCursor, Parser};
use crate::report::{IssueKind, Report};
use crate::types::{required, Dict, Object};

/// Bytes per xref entry line, end-of-line included
const XREF_ENTRY_LEN: usize = 20;

/// Entry in the cross-reference table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XRefEntry {
    pub offset: usize,
    pub generation: u16,
    pub in_use: bool,
}

/// A fully materialized single-section PDF file.
///
/// Every indirect object listed in the xref table is parsed once at load.
/// Index 0 of the object table is a Null placeholder so that PDF object
/// numbers index the table directly. Files with incremental updates,
/// cross-reference streams or encryption are rejected as unsupported.
#[derive(Debug)]
pub struct DocumentIndex {
    xref_offset: usize,
    trailer: Dict,
    entries: Vec<Option<XRefEntry>>,
    objects: Vec<Object>,
    report: Report,
}

impl DocumentIndex {
    /// Read a whole file into memory and index it
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Parse a PDF document from bytes
    pub fn parse(data: &[u8]) -> Result<Self> {
        if !data.starts_with(b"%PDF-") {
            return Err(PdfError::MissingHeader);
        }

        let cursor = ByteCursor::new(data);
        let mut report = Report::new();

        let xref_offset = Self::read_xref_offset(&cursor)?;
        let trailer = Self::read_trailer(&cursor, &mut report)?;
        let count = Self::declared_size(&trailer)?;
        log::debug!("xref at byte {}, {} objects", xref_offset, count);

        let entries = Self::read_xref_entries(&cursor, xref_offset, count, &mut report)?;
        let objects = Self::materialize(data, &entries, &mut report);

        Ok(DocumentIndex {
            xref_offset,
            trailer,
            entries,
            objects,
            report,
        })
    }

    /// Offset after the first `startxref`. A second one means the file was
    /// incrementally updated.
    fn read_xref_offset(cursor: &ByteCursor<'_>) -> Result<usize> {
        let keyword = b"startxref";
        let pos = cursor
            .find_literal(0, keyword)
            .ok_or(PdfError::MissingStartXref)?;

        if cursor.find_literal(pos + keyword.len(), keyword).is_some() {
            return Err(PdfError::Unsupported(
                "incrementally updated file (several startxref sections)".into(),
            ));
        }

        let token = cursor.token_at(pos + keyword.len(), WHITESPACE, WHITESPACE);
        std::str::from_utf8(token)
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| PdfError::parse(pos, "Expected xref offset after startxref"))
    }

    /// Parse the dictionary after the first `trailer` keyword
    fn read_trailer(cursor: &ByteCursor<'_>, report: &mut Report) -> Result<Dict> {
        let keyword = b"trailer";
        let pos = cursor
            .find_literal(0, keyword)
            .ok_or_else(|| PdfError::InvalidStructure("Missing trailer".into()))?;

        let mut parser = Parser::new(cursor.data());
        parser.seek(pos + keyword.len());
        let trailer = match parser.parse_object()? {
            Object::Dict(dict) => dict,
            other => {
                return Err(PdfError::InvalidStructure(format!(
                    "Trailer must be dictionary, found {}",
                    other.type_name()
                )));
            }
        };
        report.absorb(parser.take_report());

        required(&trailer, "Size")?;
        required(&trailer, "Root")?;

        if trailer.contains_key("Encrypt") {
            return Err(PdfError::Unsupported("encrypted document".into()));
        }
        if trailer.contains_key("Prev") {
            return Err(PdfError::Unsupported(
                "incrementally updated file (trailer has /Prev)".into(),
            ));
        }

        Ok(trailer)
    }

    fn declared_size(trailer: &Dict) -> Result<usize> {
        let size = required(trailer, "Size")?.expect_int()?;
        if size < 1 {
            return Err(PdfError::InvalidStructure(format!(
                "Trailer /Size must be positive, got {}",
                size
            )));
        }
        Ok(size as usize)
    }

    /// Read `count` fixed-width entries after the subsection header line.
    /// Only the 10-digit offset is required; an unreadable line loses just
    /// its own object.
    fn read_xref_entries(
        cursor: &ByteCursor<'_>,
        xref_offset: usize,
        count: usize,
        report: &mut Report,
    ) -> Result<Vec<Option<XRefEntry>>> {
        let keyword = b"xref";
        let start = cursor.scan_past_chars_in(xref_offset, WHITESPACE);
        if !cursor.starts_with_at(start, keyword) {
            return Err(PdfError::Unsupported(format!(
                "no xref table at byte {} (cross-reference streams are not handled)",
                xref_offset
            )));
        }

        let (header, mut pos) = read_line(cursor, start + keyword.len());
        let Some((_, listed)) = subsection_header(header) else {
            return Err(PdfError::InvalidXref);
        };

        // /Size may not promise more entries than the table lists or the
        // file can hold
        let room = cursor.len().saturating_sub(pos) / XREF_ENTRY_LEN;
        if count > listed as usize || count > room {
            log::debug!(
                "trailer /Size {} but xref lists {} entries with room for {}",
                count,
                listed,
                room
            );
            return Err(PdfError::InvalidXref);
        }

        let mut entries = Vec::with_capacity(count);
        for number in 0..count {
            let (line, end) = read_line(cursor, pos);
            pos = end;

            let entry = parse_xref_entry(line);
            if entry.is_none() {
                report.record(
                    IssueKind::XRefInconsistency,
                    format!(
                        "unreadable xref entry for object {}: '{}'",
                        number,
                        String::from_utf8_lossy(line)
                    ),
                );
            }
            entries.push(entry);
        }

        let (next, _) = read_line(cursor, pos);
        if subsection_header(next).is_some() {
            return Err(PdfError::Unsupported(
                "cross-reference table with several subsections".into(),
            ));
        }

        Ok(entries)
    }

    fn materialize(data: &[u8], entries: &[Option<XRefEntry>], report: &mut Report) -> Vec<Object> {
        let mut parser = Parser::new(data);
        let mut objects = Vec::with_capacity(entries.len());
        objects.push(Object::Null);

        for (number, entry) in entries.iter().enumerate().skip(1) {
            let object = match entry {
                None => Object::Null,
                Some(entry) if !entry.in_use => {
                    log::debug!("object {} is a free entry", number);
                    Object::Null
                }
                Some(entry) => Self::load_object(&mut parser, number, entry.offset, report),
            };
            report.absorb(parser.take_report());
            objects.push(object);
        }

        objects
    }

    fn load_object(parser: &mut Parser<'_>, number: usize, offset: usize, report: &mut Report) -> Object {
        parser.seek(offset);
        match parser.parse_indirect() {
            Ok(parsed) => match parsed.id {
                Some(id) if id.obj_num as usize == number => parsed.value,
                Some(id) => {
                    report.record(
                        IssueKind::XRefInconsistency,
                        format!(
                            "offset {} of object {} holds object {} {}",
                            offset, number, id.obj_num, id.gen_num
                        ),
                    );
                    Object::Null
                }
                None => {
                    report.record(
                        IssueKind::XRefInconsistency,
                        format!("no object header at offset {} for object {}", offset, number),
                    );
                    Object::Null
                }
            },
            Err(e) => {
                report.record(
                    IssueKind::XRefInconsistency,
                    format!("object {} at offset {} lost: {}", number, offset, e),
                );
                Object::Null
            }
        }
    }

    /// Byte offset of the xref table
    pub fn xref_offset(&self) -> usize {
        self.xref_offset
    }

    /// Get the trailer dictionary
    pub fn trailer(&self) -> &Dict {
        &self.trailer
    }

    /// Number of object slots, as declared by the trailer's /Size
    pub fn count(&self) -> usize {
        self.objects.len()
    }

    pub fn xref_entry(&self, number: u32) -> Option<&XRefEntry> {
        self.entries.get(number as usize).and_then(Option::as_ref)
    }

    /// Issues met while loading
    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Object by number, in `1..count()`
    pub fn object(&self, number: u32) -> Result<&Object> {
        let index = number as usize;
        if index == 0 || index >= self.objects.len() {
            return Err(PdfError::ObjectOutOfRange {
                number,
                count: self.objects.len(),
            });
        }
        Ok(&self.objects[index])
    }

    /// Follow an indirect reference; other objects are returned as they are
    pub fn resolve<'o>(&'o self, obj: &'o Object) -> Result<&'o Object> {
        match obj {
            Object::Ref(r) => self.object(r.obj_num),
            other => Ok(other),
        }
    }

    /// Get document catalog
    pub fn catalog(&self) -> Result<&Dict> {
        let root = required(&self.trailer, "Root")?;
        self.resolve(root)?.expect_dict()
    }

    /// Root node of the page tree
    pub fn pages_root(&self) -> Result<&Dict> {
        let pages = required(self.catalog()?, "Pages")?;
        self.resolve(pages)?.expect_dict()
    }

    /// Page object numbers in document order. Broken branches below the
    /// root are left out and noted in `report`.
    pub fn page_numbers(&self, report: &mut Report) -> Result<Vec<u32>> {
        let pages = collect_page_numbers(self, self.pages_root()?, report)?;
        log::debug!("page objects: {:?}", pages);
        Ok(pages)
    }

    /// Decoded body of the stream object `number`. A body that fails to
    /// decode comes back empty with the failure noted in `report`.
    pub fn stream_data(&self, number: u32, report: &mut Report) -> Result<Vec<u8>> {
        let (dict, data) = match self.object(number)? {
            Object::Stream { dict, data } => (dict, data),
            other => {
                return Err(PdfError::TypeMismatch {
                    expected: "stream",
                    found: other.type_name(),
                });
            }
        };

        match decode_stream(dict, data) {
            Ok(decoded) => Ok(decoded),
            Err(e) => {
                report.record(
                    IssueKind::Decompression,
                    format!("stream object {}: {}", number, e),
                );
                Ok(Vec::new())
            }
        }
    }

    /// Decoded content of a page. Several content streams are joined with
    /// a newline between them.
    pub fn page_contents(&self, page: &Dict, report: &mut Report) -> Result<Vec<u8>> {
        match required(page, "Contents")? {
            Object::Ref(r) => self.stream_data(r.obj_num, report),
            Object::Array(arr) => {
                let mut result = Vec::new();
                for item in arr {
                    let data = self.stream_data(item.expect_ref()?.obj_num, report)?;
                    if !result.is_empty() {
                        result.push(b'\n');
                    }
                    result.extend(data);
                }
                Ok(result)
            }
            other => Err(PdfError::TypeMismatch {
                expected: "reference or array",
                found: other.type_name(),
            }),
        }
    }
}

/// One line starting at `pos` (leading whitespace skipped), and the
/// position of the end-of-line byte that ended it
fn read_line<'a>(cursor: &ByteCursor<'a>, pos: usize) -> (&'a [u8], usize) {
    let (begin, end) = cursor.token_bounds(pos, WHITESPACE, END_OF_LINE);
    (cursor.slice(begin, end), end)
}

/// "first count" header of an xref subsection
fn subsection_header(line: &[u8]) -> Option<(u32, u32)> {
    let text = std::str::from_utf8(line).ok()?;
    let mut parts = text.split_whitespace();
    let first = parts.next()?.parse().ok()?;
    let count = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((first, count))
}

/// Entry format: "nnnnnnnnnn ggggg n". Only the offset is required.
fn parse_xref_entry(line: &[u8]) -> Option<XRefEntry> {
    let offset_str = std::str::from_utf8(line.get(0..10)?).ok()?;
    let offset = offset_str.trim().parse().ok()?;

    let generation = line
        .get(11..16)
        .and_then(|g| std::str::from_utf8(g).ok())
        .and_then(|g| g.trim().parse().ok())
        .unwrap_or(0);
    let in_use = line.get(17) != Some(&b'f');

    Some(XRefEntry {
        offset,
        generation,
        in_use,
    })
}
