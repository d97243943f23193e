//! Blob codec
//!
//! The per-user notes mapping is stored as a single opaque string:
//! JSON text, zlib-compressed, then base64-encoded. This module converts
//! any serde value to and from that form.

use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::{Compression, Decompress, FlushDecompress, Status};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Output buffer growth step while inflating
const INFLATE_CHUNK: usize = 16 * 1024;

/// Errors that can occur while encoding or decoding a blob
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Blob is not a valid zlib stream: {0}")]
    Inflate(#[from] flate2::DecompressError),

    #[error("Blob zlib stream ended before completion")]
    Truncated,

    #[error("Blob does not contain valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to compress blob: {0}")]
    Deflate(#[from] std::io::Error),
}

/// Compress a value into a blob string
pub fn compress_blob<T: Serialize + ?Sized>(value: &T) -> Result<String, BlobError> {
    let json = serde_json::to_vec(value)?;

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;

    Ok(STANDARD.encode(compressed))
}

/// Decompress a blob string back into the value it encodes
pub fn decompress_blob<T: DeserializeOwned>(blob: &str) -> Result<T, BlobError> {
    let compressed = STANDARD.decode(blob.trim())?;
    let json = inflate(&compressed)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Inflate a complete zlib stream
///
/// Fails with [`BlobError::Truncated`] if the input runs out before the
/// stream's end marker. Bytes after the end marker are ignored.
fn inflate(input: &[u8]) -> Result<Vec<u8>, BlobError> {
    let mut inflater = Decompress::new(true);
    let mut output = Vec::with_capacity(input.len().saturating_mul(4).max(INFLATE_CHUNK));

    loop {
        if output.len() == output.capacity() {
            output.reserve(INFLATE_CHUNK);
        }

        let consumed = inflater.total_in();
        let produced = inflater.total_out();
        let remaining = &input[consumed as usize..];

        match inflater.decompress_vec(remaining, &mut output, FlushDecompress::Finish)? {
            Status::StreamEnd => return Ok(output),
            Status::Ok | Status::BufError => {
                // Spare output capacity and no progress: the input is exhausted
                if inflater.total_in() == consumed && inflater.total_out() == produced {
                    return Err(BlobError::Truncated);
                }
            }
        }
    }
}
