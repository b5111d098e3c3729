//! Text chunk codec: arbitrary-length text to and from 31-byte field elements.

use crate::error::CodecError;
use crate::felt::Felt;
use crate::Result;

/// Bytes per chunk.
pub const CHUNK_SIZE: usize = Felt::MAX_SHORT_BYTES;

/// Splits `text` into consecutive 31-byte windows, each read as a big-endian
/// integer. Empty text encodes to no chunks.
///
/// # Errors
///
/// Returns [`CodecError::NulByte`] if `text` contains a NUL byte, since a
/// leading zero byte cannot survive the integer representation.
pub fn encode(text: &str) -> Result<Vec<Felt>> {
    let bytes = text.as_bytes();
    if bytes.contains(&0) {
        return Err(CodecError::NulByte.into());
    }
    bytes.chunks(CHUNK_SIZE).map(Felt::from_short_bytes).collect()
}

/// Concatenates the big-endian bytes of every chunk and decodes them as UTF-8.
///
/// Characters split across chunk boundaries are reassembled before validation.
pub fn decode(chunks: &[Felt]) -> Result<String> {
    let mut bytes = Vec::with_capacity(chunks.len() * CHUNK_SIZE);
    for (i, chunk) in chunks.iter().enumerate() {
        let window = chunk.to_short_bytes();
        if window.len() > CHUNK_SIZE {
            return Err(CodecError::ChunkTooWide(i).into());
        }
        bytes.extend_from_slice(window);
    }
    let text = std::str::from_utf8(&bytes).map_err(CodecError::from)?;
    Ok(text.to_string())
}
