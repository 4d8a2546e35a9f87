use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use roster_pdf_text::extract::to_record;
use roster_pdf_text::{
    extract_file, extract_text, DocumentIndex, ExtractOptions, ExtractionMode, IssueKind,
    PdfError, Point,
};

/// Object bodies numbered from 1; stream bodies are given as raw bytes
enum Body {
    Plain(String),
    Stream(String, Vec<u8>),
}

fn plain(s: &str) -> Body {
    Body::Plain(s.to_string())
}

fn deflated(content: &str) -> Body {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    let data = encoder.finish().unwrap();
    Body::Stream(
        format!("<< /Length {} /Filter /FlateDecode >>", data.len()),
        data,
    )
}

fn raw_stream(content: &str) -> Body {
    Body::Stream(
        format!("<< /Length {} >>", content.len()),
        content.as_bytes().to_vec(),
    )
}

fn build_pdf(objects: Vec<Body>) -> Vec<u8> {
    let mut out = b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n".to_vec();
    let mut offsets = Vec::new();

    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend(format!("{} 0 obj\n", i + 1).as_bytes());
        match body {
            Body::Plain(text) => out.extend(text.as_bytes()),
            Body::Stream(dict, data) => {
                out.extend(dict.as_bytes());
                out.extend(b"\nstream\r\n");
                out.extend(data);
                out.extend(b"\r\nendstream");
            }
        }
        out.extend(b"\nendobj\n");
    }

    let xref = out.len();
    out.extend(format!("xref\n0 {}\n0000000000 65535 f\r\n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend(format!("{:010} 00000 n\r\n", offset).as_bytes());
    }
    out.extend(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref
        )
        .as_bytes(),
    );
    out
}

/// A bounding-box snippet the way the current export lays it out
fn boxed(x0: f64, y0: f64, x1: f64, y1: f64, x: f64, y: f64, text: &str) -> String {
    format!(
        "{x0} {y0} m\n{x1} {y0} l\n{x1} {y1} l\n{x0} {y1} l\nh\nS\nQ\nq\n0 g\n/F1 9 Tf\n\
         BT\n1 0 0 1 {x} {y} Tm\n({text}) Tj\nET\n"
    )
}

fn legacy_options() -> ExtractOptions {
    ExtractOptions::new(ExtractionMode::Legacy)
}

fn bbox_options() -> ExtractOptions {
    ExtractOptions::new(ExtractionMode::BoundingBox)
}

#[test]
fn test_single_page_legacy() {
    let data = build_pdf(vec![
        plain("<< /Type /Catalog /Pages 2 0 R >>"),
        plain("<< /Type /Pages /Kids [3 0 R] /Count 1 >>"),
        plain("<< /Type /Page /Parent 2 0 R /Contents 4 0 R >>"),
        raw_stream("100 0 0 100 50 60 Tm\n(Hello) Tj"),
    ]);
    let doc = DocumentIndex::parse(&data).unwrap();
    let extraction = extract_text(&doc, &legacy_options()).unwrap();

    assert_eq!(extraction.items.len(), 1);
    let item = &extraction.items[0];
    assert_eq!(item.page, 0);
    assert_eq!(item.baseline, Point { x: 50.0, y: -60.0 });
    assert_eq!(item.text, "Hello");
    assert!(extraction.report.is_empty());
}

#[test]
fn test_deflated_bounding_box_pages() {
    let page_one = format!(
        "{}{}",
        boxed(300.0, 700.0, 400.0, 712.0, 302.0, 702.0, "14:05"),
        boxed(40.0, 700.0, 140.0, 712.0, 42.0, 702.0, "Linja-ajoa"),
    );
    let page_two = boxed(40.0, 500.0, 140.0, 512.0, 42.0, 502.0, "Ruokatauko");

    let data = build_pdf(vec![
        plain("<< /Type /Catalog /Pages 2 0 R >>"),
        // Second page object listed first in Kids
        plain("<< /Type /Pages /Kids [5 0 R 3 0 R] /Count 2 >>"),
        plain("<< /Type /Page /Parent 2 0 R /Contents [4 0 R] >>"),
        deflated(&page_one),
        plain("<< /Type /Page /Parent 2 0 R /Contents [6 0 R] >>"),
        deflated(&page_two),
    ]);
    let doc = DocumentIndex::parse(&data).unwrap();
    let extraction = extract_text(&doc, &bbox_options()).unwrap();

    let unsorted: Vec<_> = extraction.unsorted.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(unsorted, ["Ruokatauko", "14:05", "Linja-ajoa"]);

    let sorted: Vec<_> = extraction.items.iter().map(|i| i.text.as_str()).collect();
    assert_eq!(sorted, ["Ruokatauko", "Linja-ajoa", "14:05"]);

    assert_eq!(extraction.items[0].page, 0);
    assert_eq!(extraction.items[2].page, 1);
    assert_eq!(
        to_record(&extraction.items[1]),
        "\"1\";\"40.0\";\"-712.0\";\"140.0\";\"-700.0\";\"42.0\";\"-702.0\";\"Linja-ajoa\""
    );
}

#[test]
fn test_broken_page_is_skipped() {
    let data = build_pdf(vec![
        plain("<< /Type /Catalog /Pages 2 0 R >>"),
        plain("<< /Type /Pages /Kids [3 0 R 4 0 R] >>"),
        plain("<< /Type /Page /Parent 2 0 R >>"),
        plain("<< /Type /Page /Parent 2 0 R /Contents 5 0 R >>"),
        raw_stream("BT\n1 0 0 1 10 20 Tm\n(Vuoro 101) Tj\nET"),
    ]);
    let doc = DocumentIndex::parse(&data).unwrap();
    let extraction = extract_text(&doc, &legacy_options()).unwrap();

    assert_eq!(extraction.items.len(), 1);
    assert_eq!(extraction.items[0].page, 1);
    assert_eq!(extraction.items[0].text, "Vuoro 101");
    assert_eq!(extraction.report.count(IssueKind::SkippedPage), 1);
}

#[test]
fn test_broken_page_tree_branch_is_skipped() {
    let data = build_pdf(vec![
        plain("<< /Type /Catalog /Pages 2 0 R >>"),
        plain("<< /Type /Pages /Kids [3 0 R 4 0 R] >>"),
        plain("<< /Type /Page /Parent 2 0 R /Contents 5 0 R >>"),
        plain("<< /Type /Pages /Count 0 >>"),
        raw_stream("BT\n1 0 0 1 10 20 Tm\n(Iltavuoro) Tj\nET"),
    ]);
    let doc = DocumentIndex::parse(&data).unwrap();
    let extraction = extract_text(&doc, &legacy_options()).unwrap();

    assert_eq!(extraction.page_count, 1);
    assert_eq!(extraction.items.len(), 1);
    assert_eq!(extraction.items[0].text, "Iltavuoro");
    assert_eq!(extraction.report.count(IssueKind::SkippedPage), 1);
}

#[test]
fn test_corrupt_stream_is_non_fatal() {
    let data = build_pdf(vec![
        plain("<< /Type /Catalog /Pages 2 0 R >>"),
        plain("<< /Type /Pages /Kids [3 0 R] >>"),
        plain("<< /Type /Page /Contents 4 0 R >>"),
        Body::Stream(
            "<< /Length 8 /Filter /FlateDecode >>".into(),
            b"garbage!".to_vec(),
        ),
    ]);
    let doc = DocumentIndex::parse(&data).unwrap();
    let extraction = extract_text(&doc, &legacy_options()).unwrap();

    assert!(extraction.items.is_empty());
    assert_eq!(extraction.report.count(IssueKind::Decompression), 1);
}

#[test]
fn test_missing_pages_is_fatal() {
    let data = build_pdf(vec![plain("<< /Type /Catalog >>")]);
    let doc = DocumentIndex::parse(&data).unwrap();

    assert!(matches!(
        extract_text(&doc, &legacy_options()),
        Err(PdfError::MissingKey(key)) if key == "Pages"
    ));
}

#[test]
fn test_encrypted_rejected() {
    let data = build_pdf(vec![plain("<< /Type /Catalog /Pages 2 0 R >>")]);
    let text = String::from_utf8_lossy(&data).replace("/Root 1 0 R", "/Root 1 0 R /Encrypt 9 0 R");

    assert!(matches!(
        DocumentIndex::parse(text.as_bytes()),
        Err(PdfError::Unsupported(_))
    ));
}

#[test]
fn test_extract_file() {
    let data = build_pdf(vec![
        plain("<< /Type /Catalog /Pages 2 0 R >>"),
        plain("<< /Type /Pages /Kids [3 0 R] >>"),
        plain("<< /Type /Page /Contents 4 0 R >>"),
        deflated("BT\n1 0 0 1 72 720 Tm\n(Lepotauko) Tj\nET\n"),
    ]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let extraction = extract_file(file.path(), &legacy_options()).unwrap();
    assert_eq!(extraction.items.len(), 1);
    assert_eq!(extraction.items[0].baseline, Point { x: 72.0, y: -720.0 });
}

#[test]
fn test_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = extract_file(dir.path().join("missing.pdf"), &legacy_options());

    assert!(matches!(result, Err(PdfError::Io(_))));
}
