pub mod content;
pub mod decode;
pub mod document;
pub mod error;
pub mod extract;
pub mod pages;
pub mod parser;
pub mod report;
pub mod types;

pub use content::{BoundingBox, ExtractionMode, Point, TextItem};
pub use decode::decode_stream;
pub use document::DocumentIndex;
pub use error::{PdfError, Result};
pub use extract::{extract_file, extract_text, ExtractOptions, Extraction};
pub use report::{Issue, IssueKind, Report};
pub use types::{ObjRef, Object};
