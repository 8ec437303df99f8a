//! XLSX/ODS extraction (§4.5): accumulates rows per sheet into a buffer
//! and flushes a chunk once the buffer reaches [`MIN_CHUNK_SIZE`], the
//! same threshold-driven packing as `excel.py`'s `handle()` rather than
//! one chunk per row (tabular rows rarely carry enough content on their
//! own to be a useful retrieval unit).

use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx};
use rag_domain::constants::MIN_CHUNK_SIZE;
use rag_domain::error::{Error, Result};
use rag_domain::ports::extract::ExtractedChunk;
use rag_domain::value_objects::ChunkLocation;

pub fn extract(bytes: &[u8]) -> Result<Vec<ExtractedChunk>> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| Error::validation(format!("failed to parse spreadsheet: {e}")))?;

    let mut chunks = Vec::new();
    let sheet_names = workbook.sheet_names().to_vec();

    for (sheet_index, sheet_name) in sheet_names.iter().enumerate() {
        let Ok(range) = workbook.worksheet_range(sheet_name) else {
            continue;
        };

        let rows = range.rows().enumerate().map(|(row_index, row)| {
            let row_text = row
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join("\t");
            (row_index, row_text)
        });

        chunks.extend(pack_rows(sheet_index + 1, sheet_name, rows));
    }

    Ok(chunks)
}

/// Accumulate `(row_index, row_text)` pairs into chunks of at least
/// [`MIN_CHUNK_SIZE`], flushing a buffer as soon as appending the next
/// non-empty row would reach the threshold. Shared by `extract` and the
/// tests below so the packing logic can be exercised without a real
/// workbook.
fn pack_rows(
    sheet_number: usize,
    sheet_name: &str,
    rows: impl Iterator<Item = (usize, String)>,
) -> Vec<ExtractedChunk> {
    let mut chunks = Vec::new();
    let mut buffer = String::new();
    let mut buffer_location: Option<ChunkLocation> = None;

    for (row_index, row_text) in rows {
        let row_text = row_text.trim();
        if row_text.is_empty() {
            continue;
        }

        if !buffer.is_empty() && buffer.len() + row_text.len() >= MIN_CHUNK_SIZE {
            chunks.push(ExtractedChunk {
                content: std::mem::take(&mut buffer),
                location: buffer_location.take().unwrap_or_default(),
                can_split: false,
            });
        }

        if buffer.is_empty() {
            buffer_location = Some(ChunkLocation {
                sheet_number: Some(sheet_number as u32),
                sheet_name: Some(sheet_name.to_owned()),
                row_number: Some((row_index + 1) as u32),
                ..Default::default()
            });
            buffer.push_str(row_text);
        } else {
            buffer.push(' ');
            buffer.push_str(row_text);
        }
    }

    if !buffer.is_empty() {
        chunks.push(ExtractedChunk {
            content: buffer,
            location: buffer_location.unwrap_or_default(),
            can_split: false,
        });
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(texts: &[&str]) -> impl Iterator<Item = (usize, String)> + '_ {
        texts.iter().enumerate().map(|(i, t)| (i, (*t).to_owned()))
    }

    #[test]
    fn short_rows_are_buffered_into_one_chunk() {
        let chunks = pack_rows(1, "Sheet1", rows(&["short row one", "short row two", "short row three"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short row one short row two short row three");
        assert_eq!(chunks[0].location.row_number, Some(1));
    }

    #[test]
    fn long_rows_flush_once_threshold_is_reached() {
        let long_row = "x".repeat(MIN_CHUNK_SIZE);
        let chunks = pack_rows(1, "Sheet1", rows(&[long_row.as_str(), "trailing short row"]));

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].content.len() >= MIN_CHUNK_SIZE);
        assert_eq!(chunks[1].content, "trailing short row");
        assert_eq!(chunks[1].location.row_number, Some(2));
    }

    #[test]
    fn blank_rows_are_skipped_and_do_not_start_a_new_buffer() {
        let chunks = pack_rows(1, "Sheet1", rows(&["first row", "", "second row"]));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "first row second row");
    }

    #[test]
    fn empty_sheet_yields_no_chunks() {
        let chunks = pack_rows(1, "Sheet1", rows(&[]));
        assert!(chunks.is_empty());
    }
}
