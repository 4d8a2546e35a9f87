use std::io::{self, Write};

use crate::content::TextItem;

const SEPARATOR: &str = "\";\"";

/// One `";"`-separated, double-quoted record. Items with a bounding box
/// give `page, topLeftX, topLeftY, bottomRightX, bottomRightY, x, y, text`;
/// items without one give `page, x, y, text`.
pub fn to_record(item: &TextItem) -> String {
    let mut fields = vec![item.page.to_string()];

    if let Some(bbox) = item.bbox {
        let top_left = bbox.top_left();
        let bottom_right = bbox.bottom_right();
        fields.push(coordinate(top_left.x));
        fields.push(coordinate(top_left.y));
        fields.push(coordinate(bottom_right.x));
        fields.push(coordinate(bottom_right.y));
    }

    fields.push(coordinate(item.baseline.x));
    fields.push(coordinate(item.baseline.y));
    fields.push(item.text.clone());

    format!("\"{}\"", fields.join(SEPARATOR))
}

/// Write one record per line
pub fn write_records<W: Write>(mut out: W, items: &[TextItem]) -> io::Result<()> {
    for item in items {
        writeln!(out, "{}", to_record(item))?;
    }
    out.flush()
}

/// Always with a fractional part: 50.0, -60.0, 12.25
fn coordinate(v: f64) -> String {
    format!("{:?}", v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{BoundingBox, Point};

    fn hello() -> TextItem {
        TextItem {
            page: 0,
            bbox: None,
            baseline: Point { x: 50.0, y: -60.0 },
            text: "Hello".into(),
        }
    }

    #[test]
    fn test_position_only_record() {
        assert_eq!(to_record(&hello()), "\"0\";\"50.0\";\"-60.0\";\"Hello\"");
    }

    #[test]
    fn test_boxed_record() {
        let mut item = hello();
        item.page = 2;
        item.bbox = Some(BoundingBox {
            x0: 40.0,
            y0: -58.0,
            x1: 90.5,
            y1: -70.0,
        });

        assert_eq!(
            to_record(&item),
            "\"2\";\"40.0\";\"-70.0\";\"90.5\";\"-58.0\";\"50.0\";\"-60.0\";\"Hello\""
        );
    }

    #[test]
    fn test_write_records() {
        let mut out = Vec::new();
        write_records(&mut out, &[hello(), hello()]).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.ends_with("\"Hello\"\n"));
    }
}
