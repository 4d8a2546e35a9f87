use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Invalid PDF: missing %PDF header")]
    MissingHeader,

    #[error("Invalid PDF: missing startxref")]
    MissingStartXref,

    #[error("Parse error at byte {position}: {message}")]
    Parse { position: usize, message: String },

    #[error("Invalid xref table")]
    InvalidXref,

    #[error("Missing required key: /{0}")]
    MissingKey(String),

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Object {number} out of range (document has {count} objects)")]
    ObjectOutOfRange { number: u32, count: usize },

    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    #[error("Unsupported feature: {0}")]
    Unsupported(String),

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Decompression failed: {0}")]
    DecompressError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PdfError {
    pub(crate) fn parse(position: usize, message: impl Into<String>) -> Self {
        PdfError::Parse {
            position,
            message: message.into(),
        }
    }

    pub(crate) fn missing_key(key: &str) -> Self {
        PdfError::MissingKey(key.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
