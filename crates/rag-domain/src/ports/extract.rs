//! Text Extractor (C5) and Visual Extractor (C6) ports.

use async_trait::async_trait;

use crate::error::Result;
use crate::value_objects::ChunkLocation;

/// One chunk as emitted by a format handler, before C7/C8 assign ids.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedChunk {
    /// Extracted text content.
    pub content: String,
    /// Structural location within the source document.
    pub location: ChunkLocation,
    /// Whether this chunk may still be split further (always true for
    /// output of the shared `intelligent_split` primitive).
    pub can_split: bool,
}

/// Format-aware chunker (C5): dispatches by MIME to a handler that yields
/// a sequence of chunks. Implementations cover PDF, DOCX, XLSX, and plain
/// text/markdown/CSV/TSV per spec §4.5.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Whether this extractor handles `mime`.
    fn supports(&self, mime: &str) -> bool;

    /// Extract chunks from raw bytes of the given MIME type.
    async fn extract(&self, mime: &str, bytes: &[u8]) -> Result<Vec<ExtractedChunk>>;
}

/// A rendered page, ready for embedding and storage (C6).
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// 1-based page number.
    pub page: u32,
    /// Re-encoded image bytes (JPEG/PNG/GIF/WEBP).
    pub image_bytes: Vec<u8>,
    /// MIME type of `image_bytes`.
    pub mime: String,
    /// Width in pixels after resizing.
    pub width: u32,
    /// Height in pixels after resizing.
    pub height: u32,
    /// Content-addressed hash (first 16 hex chars of SHA-256) for dedup.
    pub content_hash: String,
    /// Alt text, if it passed the usefulness filter.
    pub alt_text: Option<String>,
    /// `ceil(w*h/750)`.
    pub tokens_formula_a: u32,
    /// `85 + 170*ceil(w/512)*ceil(h/512)`.
    pub tokens_formula_b: u32,
}

/// Page-to-image rendering, dedup, and alt-text filtering (C6).
#[async_trait]
pub trait VisualExtractor: Send + Sync {
    /// Render every page of `bytes` (a presentation or visually dense
    /// document) to an image, deduplicating repeated visuals within the
    /// document by content hash.
    async fn render_pages(&self, mime: &str, bytes: &[u8]) -> Result<Vec<RenderedPage>>;
}
