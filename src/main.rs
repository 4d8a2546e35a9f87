use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use roster_pdf_text::extract::write_records;
use roster_pdf_text::{extract_text, DocumentIndex, ExtractOptions, ExtractionMode, PdfError, TextItem};

/// Layout of the roster export
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Mode {
    /// Older exports: position only
    Legacy,
    /// Current exports: every snippet has a bounding box
    #[default]
    Bbox,
}

impl From<Mode> for ExtractionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Legacy => ExtractionMode::Legacy,
            Mode::Bbox => ExtractionMode::BoundingBox,
        }
    }
}

/// Extract positioned text snippets from a duty-roster PDF as
/// ";"-separated records.
#[derive(Parser, Debug)]
#[command(name = "roster-text", version, about)]
struct Args {
    /// Path to the PDF file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Layout of the roster export
    #[arg(long, value_enum, default_value_t = Mode::Bbox)]
    mode: Mode,

    /// Extract only page N (1-indexed)
    #[arg(long, value_name = "N")]
    page: Option<usize>,

    /// Write records in reading order to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Also write records in processing order to FILE
    #[arg(long, value_name = "FILE")]
    unsorted: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), PdfError> {
    eprintln!("Reading: {}", args.file.display());
    let doc = DocumentIndex::open(&args.file)?;

    let options = ExtractOptions::new(args.mode.into());
    let mut extraction = extract_text(&doc, &options)?;

    if let Some(page) = args.page {
        let page_count = extraction.page_count;
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidStructure(format!(
                "Invalid page number: {} (document has {} pages)",
                page, page_count
            )));
        }
        extraction.items.retain(|item| item.page == page - 1);
        extraction.unsorted.retain(|item| item.page == page - 1);
    }

    for issue in extraction.report.issues() {
        eprintln!("warning: {}", issue);
    }
    eprintln!("{} text items", extraction.items.len());

    if let Some(path) = &args.unsorted {
        write_to_file(path, &extraction.unsorted)?;
        eprintln!("Unsorted output written to: {}", path.display());
    }

    match &args.output {
        Some(path) => {
            write_to_file(path, &extraction.items)?;
            eprintln!("Output written to: {}", path.display());
        }
        None => write_records(io::stdout().lock(), &extraction.items)?,
    }

    Ok(())
}

fn write_to_file(path: &Path, items: &[TextItem]) -> Result<(), PdfError> {
    let file = File::create(path)?;
    write_records(BufWriter::new(file), items)?;
    Ok(())
}
