use flate2::read::ZlibDecoder;
use std::io::Read;

use crate::error::{PdfError, Result};

/// Inflate a zlib-wrapped deflate stream
pub fn flate_decode(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut result = Vec::new();

    decoder
        .read_to_end(&mut result)
        .map_err(|e| PdfError::DecompressError(format!("FlateDecode failed: {}", e)))?;

    Ok(result)
}

/// True if `data` opens with a valid zlib header (deflate method, check bits)
pub fn has_zlib_header(data: &[u8]) -> bool {
    match data {
        [cmf, flg, ..] => cmf & 0x0F == 8 && (u16::from(*cmf) << 8 | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}
