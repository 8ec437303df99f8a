//! DOCX text extraction (§4.5): paragraphs are grouped into rising
//! sections at each heading-style paragraph, joined into a single body of
//! text, then packed once with the shared splitter — mirroring the
//! original's `handle()`, which joins every paragraph before splitting
//! rather than splitting paragraph-by-paragraph (a per-paragraph split
//! would produce one undersized chunk per short paragraph instead of
//! packing them together).

use docx_rs::read_docx;
use once_cell::sync::Lazy;
use rag_domain::error::{Error, Result};
use rag_domain::ports::extract::ExtractedChunk;
use rag_domain::value_objects::ChunkLocation;
use regex::Regex;

use super::split::intelligent_split;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A paragraph's section number and the char range it occupies within the
/// normalized, joined document body.
struct ParagraphSpan {
    section: u32,
    start: usize,
    end: usize,
}

pub fn extract(bytes: &[u8]) -> Result<Vec<ExtractedChunk>> {
    let docx = read_docx(bytes).map_err(|e| Error::validation(format!("failed to parse DOCX: {e:?}")))?;

    let mut section = 0u32;
    let mut normalized_paragraphs: Vec<(u32, String)> = Vec::new();

    for child in &docx.document.children {
        let docx_rs::DocumentChild::Paragraph(paragraph) = child else {
            continue;
        };
        let is_heading = paragraph
            .property
            .style
            .as_ref()
            .is_some_and(|s| s.val.to_lowercase().contains("heading"));
        if is_heading {
            section += 1;
        }

        let text: String = paragraph
            .children
            .iter()
            .filter_map(|run| match run {
                docx_rs::ParagraphChild::Run(r) => Some(r.children.iter().filter_map(|c| match c {
                    docx_rs::RunChild::Text(t) => Some(t.text.clone()),
                    _ => None,
                })),
                _ => None,
            })
            .flatten()
            .collect();

        let normalized = WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned();
        if normalized.is_empty() {
            continue;
        }

        normalized_paragraphs.push((section, normalized));
    }

    if normalized_paragraphs.is_empty() {
        return Ok(Vec::new());
    }

    let mut spans = Vec::with_capacity(normalized_paragraphs.len());
    let mut joined = String::new();
    for (section, text) in &normalized_paragraphs {
        if !joined.is_empty() {
            joined.push(' ');
        }
        let start = joined.chars().count();
        joined.push_str(text);
        let end = joined.chars().count();
        spans.push(ParagraphSpan { section: *section, start, end });
    }

    let chunks = intelligent_split(&joined, |offset| ChunkLocation {
        section: Some(section_at(&spans, offset)),
        nchar_index: Some(offset),
        ..Default::default()
    });

    Ok(chunks)
}

/// The section of the paragraph containing char offset `offset` in the
/// joined body, or the last paragraph's section if `offset` lands past
/// the end (the trailing remainder chunk).
fn section_at(spans: &[ParagraphSpan], offset: usize) -> u32 {
    spans
        .iter()
        .find(|span| offset >= span.start && offset < span.end)
        .or_else(|| spans.last())
        .map(|span| span.section)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(ranges: &[(u32, usize, usize)]) -> Vec<ParagraphSpan> {
        ranges
            .iter()
            .map(|(section, start, end)| ParagraphSpan { section: *section, start: *start, end: *end })
            .collect()
    }

    #[test]
    fn offset_resolves_to_the_enclosing_paragraphs_section() {
        let spans = spans(&[(1, 0, 10), (2, 10, 25), (3, 25, 40)]);
        assert_eq!(section_at(&spans, 0), 1);
        assert_eq!(section_at(&spans, 12), 2);
        assert_eq!(section_at(&spans, 30), 3);
    }

    #[test]
    fn offset_past_the_end_falls_back_to_the_last_paragraph() {
        let spans = spans(&[(1, 0, 10), (2, 10, 25)]);
        assert_eq!(section_at(&spans, 100), 2);
    }

    #[test]
    fn no_spans_yields_section_zero() {
        assert_eq!(section_at(&[], 5), 0);
    }
}
