mod flate;

use crate::error::{PdfError, Result};
use crate::types::{Dict, Object};

pub use flate::{flate_decode, has_zlib_header};

/// Decode stream data based on Filter(s) in the stream dictionary.
///
/// A stream without a `Filter` entry is inflated when it carries a zlib
/// header that inflates cleanly, and returned as-is otherwise.
pub fn decode_stream(dict: &Dict, data: &[u8]) -> Result<Vec<u8>> {
    let filters = get_filters(dict)?;

    if filters.is_empty() {
        if has_zlib_header(data) {
            if let Ok(inflated) = flate_decode(data) {
                return Ok(inflated);
            }
        }
        return Ok(data.to_vec());
    }

    let mut result = data.to_vec();

    for filter in filters {
        result = apply_filter(&filter, &result)?;
    }

    Ok(result)
}

/// Extract filter names from dictionary
fn get_filters(dict: &Dict) -> Result<Vec<String>> {
    match dict.get("Filter") {
        None => Ok(vec![]),
        Some(Object::Name(name)) => Ok(vec![name.clone()]),
        Some(Object::Array(arr)) => arr
            .iter()
            .map(|obj| obj.expect_name().map(str::to_string))
            .collect(),
        Some(other) => Err(PdfError::TypeMismatch {
            expected: "name or array",
            found: other.type_name(),
        }),
    }
}

/// Apply a single filter
fn apply_filter(filter: &str, data: &[u8]) -> Result<Vec<u8>> {
    match filter {
        "FlateDecode" | "Fl" => flate_decode(data),
        "ASCIIHexDecode" | "AHx" => ascii_hex_decode(data),
        other => Err(PdfError::UnsupportedFilter(other.to_string())),
    }
}

/// Decode ASCII hex encoded data
fn ascii_hex_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut result = Vec::new();
    let mut chars = data.iter().filter(|&&b| !b.is_ascii_whitespace());

    loop {
        let Some(&h1) = chars.next() else { break };
        if h1 == b'>' {
            break; // End of data marker
        }

        match chars.next() {
            // Odd digit count: the last digit is followed by an implied 0
            Some(&b'>') | None => {
                result.push(hex_val(h1)? << 4);
                break;
            }
            Some(&h2) => result.push((hex_val(h1)? << 4) | hex_val(h2)?),
        }
    }

    Ok(result)
}

fn hex_val(b: u8) -> Result<u8> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(PdfError::DecompressError(format!(
            "ASCIIHexDecode: invalid hex char {:?}",
            b as char
        ))),
    }
}
