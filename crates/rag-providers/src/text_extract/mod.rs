//! Text Extractor (C5) adapter: dispatches by MIME type to a per-format
//! handler, all built on the shared [`split::intelligent_split`] packer.

mod docx;
mod pdf;
mod plain;
mod split;
mod xlsx;

use async_trait::async_trait;
use rag_domain::error::{Error, Result};
use rag_domain::ports::extract::{ExtractedChunk, TextExtractor};

const PDF_MIME: &str = "application/pdf";
const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const XLSX_MIMES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.oasis.opendocument.spreadsheet",
];
const PLAIN_MIMES: &[&str] = &[
    "text/plain",
    "text/markdown",
    "text/csv",
    "text/tab-separated-values",
];

/// Format-dispatching text extractor. Any MIME type outside its known set
/// is handled as plain text, matching the classifier's own default lane.
pub struct FormatDispatchExtractor;

#[async_trait]
impl TextExtractor for FormatDispatchExtractor {
    fn supports(&self, mime: &str) -> bool {
        mime == PDF_MIME
            || mime == DOCX_MIME
            || XLSX_MIMES.contains(&mime)
            || PLAIN_MIMES.contains(&mime)
            || mime.starts_with("text/")
    }

    async fn extract(&self, mime: &str, bytes: &[u8]) -> Result<Vec<ExtractedChunk>> {
        if !self.supports(mime) {
            return Err(Error::validation(format!("unsupported MIME type '{mime}'")));
        }
        match mime {
            PDF_MIME => pdf::extract(bytes),
            DOCX_MIME => docx::extract(bytes),
            m if XLSX_MIMES.contains(&m) => xlsx::extract(bytes),
            _ => plain::extract(bytes),
        }
    }
}
