mod item;
pub mod scanner;

pub use item::{BoundingBox, Point, TextItem};
pub use scanner::{ContentScanner, ExtractionMode};
