mod delimited;
mod order;

use std::path::Path;

use crate::content::{ContentScanner, ExtractionMode, TextItem};
use crate::document::DocumentIndex;
use crate::error::Result;
use crate::report::{IssueKind, Report};

pub use delimited::{to_record, write_records};
pub use order::{reading_order_key, sort_items};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub mode: ExtractionMode,
}

impl ExtractOptions {
    pub fn new(mode: ExtractionMode) -> Self {
        Self { mode }
    }
}

/// Result of one extraction pass
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Items in processing order: page by page, stream order within a page
    pub unsorted: Vec<TextItem>,
    /// The same items in reading order
    pub items: Vec<TextItem>,
    /// Pages found in the page tree
    pub page_count: usize,
    /// Issues from loading the document and from extraction
    pub report: Report,
}

/// Load a file and extract its text items
pub fn extract_file(path: impl AsRef<Path>, options: &ExtractOptions) -> Result<Extraction> {
    let doc = DocumentIndex::open(path)?;
    extract_text(&doc, options)
}

/// Extract text items from every page.
///
/// A broken page tree root is fatal. A page that fails on its own (missing or
/// malformed `/Contents`) is skipped and noted in the report.
pub fn extract_text(doc: &DocumentIndex, options: &ExtractOptions) -> Result<Extraction> {
    let mut report = doc.report().clone();
    let pages = doc.page_numbers(&mut report)?;

    let mut unsorted = Vec::new();
    for (index, &number) in pages.iter().enumerate() {
        match page_items(doc, number, index, options.mode, &mut report) {
            Ok(items) => {
                log::debug!("page {} (object {}): {} items", index, number, items.len());
                unsorted.extend(items);
            }
            Err(e) => report.record(
                IssueKind::SkippedPage,
                format!("page {} (object {}): {}", index, number, e),
            ),
        }
    }

    let mut items = unsorted.clone();
    sort_items(&mut items);

    Ok(Extraction {
        unsorted,
        items,
        page_count: pages.len(),
        report,
    })
}

fn page_items(
    doc: &DocumentIndex,
    number: u32,
    index: usize,
    mode: ExtractionMode,
    report: &mut Report,
) -> Result<Vec<TextItem>> {
    let page = doc.object(number)?.expect_dict()?;
    let content = doc.page_contents(page, report)?;
    Ok(ContentScanner::new(&content, index, mode).scan(report))
}
