/// A point in page space with the Y axis flipped, so Y grows down the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Box drawn around a text snippet.
///
/// `(x0, y0)` comes from the first corner line and `(x1, y1)` from the
/// second, both with Y negated. The generator draws the first corner at
/// the bottom left, so the top-left corner is `(x0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    pub fn top_left(&self) -> Point {
        Point {
            x: self.x0,
            y: self.y1,
        }
    }

    pub fn bottom_right(&self) -> Point {
        Point {
            x: self.x1,
            y: self.y0,
        }
    }
}

/// A positioned text snippet from one page
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    /// Zero-based index in page-tree order
    pub page: usize,
    pub bbox: Option<BoundingBox>,
    pub baseline: Point,
    pub text: String,
}

impl TextItem {
    /// The point used for ordering: the box's top-left corner when there
    /// is a box, the baseline otherwise
    pub fn anchor(&self) -> Point {
        self.bbox.map_or(self.baseline, |b| b.top_left())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor() {
        let mut item = TextItem {
            page: 0,
            bbox: None,
            baseline: Point { x: 50.0, y: -60.0 },
            text: "Hello".into(),
        };
        assert_eq!(item.anchor(), Point { x: 50.0, y: -60.0 });

        item.bbox = Some(BoundingBox {
            x0: 10.0,
            y0: -700.0,
            x1: 90.0,
            y1: -712.0,
        });
        assert_eq!(item.anchor(), Point { x: 10.0, y: -712.0 });
        assert_eq!(
            item.bbox.unwrap().bottom_right(),
            Point { x: 90.0, y: -700.0 }
        );
    }
}
