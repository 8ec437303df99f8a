//! PDF text extraction (§4.5): one logical text stream per page, split
//! with the shared packer and stamped with its originating page number.

use rag_domain::error::{Error, Result};
use rag_domain::ports::extract::ExtractedChunk;
use rag_domain::value_objects::ChunkLocation;

use super::split::intelligent_split;

pub fn extract(bytes: &[u8]) -> Result<Vec<ExtractedChunk>> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| Error::validation(format!("failed to parse PDF: {e}")))?;

    // `pdf-extract` separates pages with form feeds; fall back to the
    // whole document as one page if the source has none.
    let pages: Vec<&str> = text.split('\u{000C}').collect();

    let mut chunks = Vec::new();
    for (index, page_text) in pages.iter().enumerate() {
        let page_number = (index + 1) as u32;
        chunks.extend(intelligent_split(page_text, |offset| ChunkLocation {
            page: Some(page_number),
            nchar_index: Some(offset),
            ..Default::default()
        }));
    }
    Ok(chunks)
}
