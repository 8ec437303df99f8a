//! Shared `intelligent_split` primitive (§4.5): greedily packs
//! sentence-tokenized text into chunks no smaller than
//! [`MIN_CHUNK_SIZE`] (except the final remainder), so format handlers
//! never have to reimplement sentence-aware packing themselves.

use once_cell::sync::Lazy;
use rag_domain::constants::MIN_CHUNK_SIZE;
use rag_domain::ports::extract::ExtractedChunk;
use rag_domain::value_objects::ChunkLocation;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Split `text` into chunks of at least `MIN_CHUNK_SIZE` characters each
/// (the last chunk may be shorter), never breaking mid-sentence.
/// `location_for` stamps each chunk's structural location given the char
/// offset its content starts at within the normalized text.
pub fn intelligent_split(
    text: &str,
    location_for: impl Fn(usize) -> ChunkLocation,
) -> Vec<ExtractedChunk> {
    let normalized = WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned();
    let sentences: Vec<&str> = normalized.unicode_sentences().collect();
    if sentences.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len_chars = 0usize;
    let mut current_start = 0usize;
    let mut cursor = 0usize;

    for sentence in sentences {
        if current.is_empty() {
            current_start = cursor;
        }
        current.push_str(sentence);
        let sentence_chars = sentence.chars().count();
        current_len_chars += sentence_chars;
        cursor += sentence_chars;

        if current_len_chars >= MIN_CHUNK_SIZE {
            chunks.push(ExtractedChunk {
                content: std::mem::take(&mut current),
                location: location_for(current_start),
                can_split: true,
            });
            current_len_chars = 0;
        }
    }

    if !current.is_empty() {
        chunks.push(ExtractedChunk {
            content: current,
            location: location_for(current_start),
            can_split: true,
        });
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_sentences_until_min_size_then_starts_a_new_chunk() {
        let sentence = "This is a test sentence with some words in it. ";
        let text = sentence.repeat(20);
        let chunks = intelligent_split(&text, |offset| ChunkLocation {
            nchar_index: Some(offset),
            ..Default::default()
        });

        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(chunk.content.len() >= MIN_CHUNK_SIZE);
        }
    }

    #[test]
    fn short_text_becomes_a_single_chunk() {
        let chunks = intelligent_split("Just one short sentence.", |_| ChunkLocation::default());
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn empty_text_yields_no_chunks() {
        let chunks = intelligent_split("", |_| ChunkLocation::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn collapses_whitespace_runs_before_splitting() {
        let chunks = intelligent_split("Hello \t\n  world.   Second sentence.", |_| ChunkLocation::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "Hello world. Second sentence.");
    }

    #[test]
    fn second_chunk_offset_is_a_char_count_not_a_byte_count() {
        // Each sentence is 19 chars but more than 19 bytes (café/résumé/naïve
        // each contribute a 2-byte accented character).
        let sentence = "Café résumé naïve. ";
        assert_eq!(sentence.chars().count(), 20);
        assert!(sentence.len() > 20);

        let text = sentence.repeat(40);
        let mut offsets = Vec::new();
        let chunks = intelligent_split(&text, |offset| {
            offsets.push(offset);
            ChunkLocation::default()
        });

        assert!(chunks.len() > 1);
        // A byte-based cursor would report an offset larger than the char
        // count of everything that came before it; a char-based cursor
        // reports exactly that count.
        let expected_chars_in_first_chunk = chunks[0].content.chars().count();
        assert_eq!(offsets[1], expected_chars_in_first_chunk);
    }
}
