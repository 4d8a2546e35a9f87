use std::fmt;

/// Category of a non-fatal problem met while reading a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A number token that did not parse; zero was used instead
    MalformedToken,
    /// An xref offset that did not lead to the expected object
    XRefInconsistency,
    /// A stream that could not be decoded; an empty buffer was used
    Decompression,
    /// A page that could not be processed and contributed no text
    SkippedPage,
    /// A text block whose lines did not match the expected layout
    SkippedText,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueKind::MalformedToken => "malformed token",
            IssueKind::XRefInconsistency => "xref inconsistency",
            IssueKind::Decompression => "decompression",
            IssueKind::SkippedPage => "skipped page",
            IssueKind::SkippedText => "skipped text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    pub message: String,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Non-fatal issues collected during loading and extraction.
///
/// Every recorded issue is also logged at `warn` level, so callers that only
/// watch the log still see them.
#[derive(Debug, Clone, Default)]
pub struct Report {
    issues: Vec<Issue>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, kind: IssueKind, message: impl Into<String>) {
        let message = message.into();
        log::warn!("{}: {}", kind, message);
        self.issues.push(Issue { kind, message });
    }

    /// Move all issues of `other` into this report
    pub fn absorb(&mut self, other: Report) {
        self.issues.extend(other.issues);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn count(&self, kind: IssueKind) -> usize {
        self.issues.iter().filter(|i| i.kind == kind).count()
    }
}
