//! Plain text / Markdown / CSV / TSV extraction (§4.5): the whole decoded
//! body is run through the shared sentence packer with no structural
//! location beyond character offset.

use rag_domain::error::{Error, Result};
use rag_domain::ports::extract::ExtractedChunk;
use rag_domain::value_objects::ChunkLocation;

use super::split::intelligent_split;

pub fn extract(bytes: &[u8]) -> Result<Vec<ExtractedChunk>> {
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|e| Error::validation(format!("not valid UTF-8 text: {e}")))?;

    Ok(intelligent_split(&text, |offset| ChunkLocation {
        nchar_index: Some(offset),
        ..Default::default()
    }))
}
