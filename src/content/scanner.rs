use thiserror::Error;

use crate::content::item::{BoundingBox, Point, TextItem};
use crate::parser::cursor::{ByteCursor, END_OF_LINE, WHITESPACE};
use crate::report::{IssueKind, Report};

/// Text-showing lines end with this fixed sequence
pub const SHOW_TEXT_SUFFIX: &[u8] = b") Tj";

/// Line layout of the legacy roster export: `BT`, then `a b c d e f Tm`,
/// then `(text) Tj`. A stream without any `BT` is read as bare
/// `Tm` / `Tj` line pairs.
pub mod legacy {
    /// Lines after `BT` holding `a b c d e f Tm`
    pub const MATRIX_AFTER_BT: usize = 1;
    /// Lines after `BT` holding `(text) Tj`
    pub const TEXT_AFTER_BT: usize = 2;
    /// Lines from a bare `Tm` line to its text-showing line
    pub const TEXT_AFTER_MATRIX: usize = 1;
}

/// Line layout of the current roster export: a rectangle is drawn before
/// each `BT`, and its two corner lines sit at fixed distances before it.
pub mod bounding_box {
    /// Lines before `BT` holding the first corner `x y ...`
    pub const FIRST_CORNER_BEFORE_BT: usize = 10;
    /// Lines before `BT` holding the second corner `x y ...`
    pub const SECOND_CORNER_BEFORE_BT: usize = 8;
    /// Lines after `BT` holding `a b c d e f Tm`
    pub const MATRIX_AFTER_BT: usize = 1;
    /// Lines after `BT` holding `(text) Tj`
    pub const TEXT_AFTER_BT: usize = 2;
}

/// Which generator layout a content stream follows. There is no
/// detection; the caller chooses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMode {
    /// Position-only layout
    Legacy,
    /// Layout with a bounding box drawn around every snippet
    BoundingBox,
}

/// Why a snippet's lines did not fit the layout
#[derive(Error, Debug, PartialEq)]
enum LayoutError {
    #[error("stream ends before line {0}")]
    MissingLine(usize),

    #[error("BT at line {0} leaves no room for a box before it")]
    NoRoomForBox(usize),

    #[error("line {0} is not a 6-number text matrix")]
    NotAMatrix(usize),

    #[error("line {0} does not start with a coordinate pair")]
    NotACorner(usize),

    #[error("line {0} does not end with Tj")]
    NotShowText(usize),

    #[error("text line is not '(text) Tj': {0}")]
    BadTextLine(String),
}

/// Line-oriented scraper for roster content streams.
///
/// This is not an operator interpreter. The generator writes one operator
/// per line, and snippets are found by their line distances from an
/// anchor line. A snippet whose lines do not fit the layout is skipped and
/// noted in the report.
pub struct ContentScanner<'a> {
    lines: Vec<&'a [u8]>,
    page: usize,
    mode: ExtractionMode,
}

impl<'a> ContentScanner<'a> {
    pub fn new(data: &'a [u8], page: usize, mode: ExtractionMode) -> Self {
        Self {
            lines: split_lines(data),
            page,
            mode,
        }
    }

    /// Extract text items in stream order
    pub fn scan(&self, report: &mut Report) -> Vec<TextItem> {
        let has_text_objects = self.lines.iter().any(|line| *line == b"BT");
        let mut items = Vec::new();

        for (index, line) in self.lines.iter().enumerate() {
            let item = match self.mode {
                ExtractionMode::Legacy if has_text_objects && *line == b"BT" => {
                    self.legacy_item(
                        index + legacy::MATRIX_AFTER_BT,
                        index + legacy::TEXT_AFTER_BT,
                        report,
                    )
                }
                ExtractionMode::Legacy if !has_text_objects && last_word(line) == b"Tm" => {
                    self.legacy_item(index, index + legacy::TEXT_AFTER_MATRIX, report)
                }
                ExtractionMode::BoundingBox if *line == b"BT" => self.boxed_item(index, report),
                _ => continue,
            };

            match item {
                Ok(item) => items.push(item),
                Err(reason) => report.record(
                    IssueKind::SkippedText,
                    format!("page {}, line {}: {}", self.page, index, reason),
                ),
            }
        }

        items
    }

    fn legacy_item(
        &self,
        matrix_line: usize,
        text_line: usize,
        report: &mut Report,
    ) -> Result<TextItem, LayoutError> {
        let baseline = self.matrix_origin(matrix_line, report)?;

        Ok(TextItem {
            page: self.page,
            bbox: None,
            baseline,
            text: self.shown_text_at(text_line)?,
        })
    }

    fn boxed_item(&self, bt_line: usize, report: &mut Report) -> Result<TextItem, LayoutError> {
        let first = bt_line
            .checked_sub(bounding_box::FIRST_CORNER_BEFORE_BT)
            .ok_or(LayoutError::NoRoomForBox(bt_line))?;
        let second = bt_line - bounding_box::SECOND_CORNER_BEFORE_BT;

        let (x0, y0) = self.corner(first, report)?;
        let (x1, y1) = self.corner(second, report)?;
        let baseline = self.matrix_origin(bt_line + bounding_box::MATRIX_AFTER_BT, report)?;
        let text = self.shown_text_at(bt_line + bounding_box::TEXT_AFTER_BT)?;

        Ok(TextItem {
            page: self.page,
            bbox: Some(BoundingBox { x0, y0, x1, y1 }),
            baseline,
            text,
        })
    }

    fn line(&self, index: usize) -> Result<&'a [u8], LayoutError> {
        self.lines
            .get(index)
            .copied()
            .ok_or(LayoutError::MissingLine(index))
    }

    /// The `e f` translation of a `a b c d e f Tm` line, with Y flipped
    fn matrix_origin(&self, index: usize, report: &mut Report) -> Result<Point, LayoutError> {
        let words = words(self.line(index)?);
        if words.len() < 6 || words.last() != Some(&&b"Tm"[..]) {
            return Err(LayoutError::NotAMatrix(index));
        }
        Ok(Point {
            x: number_or_zero(words[4], report),
            y: -number_or_zero(words[5], report),
        })
    }

    /// The leading `x y` pair of a path line, with Y flipped
    fn corner(&self, index: usize, report: &mut Report) -> Result<(f64, f64), LayoutError> {
        let words = words(self.line(index)?);
        if words.len() < 2 {
            return Err(LayoutError::NotACorner(index));
        }
        Ok((
            number_or_zero(words[0], report),
            -number_or_zero(words[1], report),
        ))
    }

    fn shown_text_at(&self, index: usize) -> Result<String, LayoutError> {
        let line = self.line(index)?;
        if last_word(line) != b"Tj" {
            return Err(LayoutError::NotShowText(index));
        }
        shown_text(line)
    }
}

/// Split into lines, dropping leading whitespace and blank lines
fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut cursor = ByteCursor::new(data);
    let mut lines = Vec::new();

    while !cursor.at_end() {
        let line = cursor.read_token(WHITESPACE, END_OF_LINE);
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines
}

fn words(line: &[u8]) -> Vec<&[u8]> {
    line.split(|b| WHITESPACE.contains(b))
        .filter(|w| !w.is_empty())
        .collect()
}

fn last_word(line: &[u8]) -> &[u8] {
    words(line).last().copied().unwrap_or(b"")
}

fn number_or_zero(word: &[u8], report: &mut Report) -> f64 {
    match std::str::from_utf8(word).ok().and_then(|s| s.parse().ok()) {
        Some(n) => n,
        None => {
            report.record(
                IssueKind::MalformedToken,
                format!("unparsable coordinate '{}', using 0", String::from_utf8_lossy(word)),
            );
            0.0
        }
    }
}

/// Text of a `(text) Tj` line: escaped parentheses are unescaped, then the
/// opening parenthesis and the fixed `) Tj` suffix are cut off.
fn shown_text(line: &[u8]) -> Result<String, LayoutError> {
    if line.first() != Some(&b'(') {
        return Err(LayoutError::BadTextLine(
            String::from_utf8_lossy(line).into_owned(),
        ));
    }

    let mut unescaped = Vec::with_capacity(line.len());
    let mut i = 0;
    while i < line.len() {
        match (line[i], line.get(i + 1)) {
            (b'\\', Some(&next @ (b'(' | b')'))) => {
                unescaped.push(next);
                i += 2;
            }
            (b, _) => {
                unescaped.push(b);
                i += 1;
            }
        }
    }

    let end = unescaped
        .len()
        .checked_sub(SHOW_TEXT_SUFFIX.len())
        .filter(|&end| end >= 1)
        .ok_or_else(|| LayoutError::BadTextLine(String::from_utf8_lossy(line).into_owned()))?;

    Ok(decode_text(&unescaped[1..end]))
}

/// UTF-8 when valid, Latin-1 otherwise
fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}
