//! Shared text encodings for enum columns, used by both `documents` and
//! `status` (both persist a [`DocumentState`]).

use rag_domain::error::{Error, Result};
use rag_domain::value_objects::DocumentState;

pub(crate) fn state_name(state: DocumentState) -> &'static str {
    match state {
        DocumentState::Uploaded => "uploaded",
        DocumentState::Validating => "validating",
        DocumentState::Queued => "queued",
        DocumentState::ProcessingStarted => "processing_started",
        DocumentState::ConvertingPages => "converting_pages",
        DocumentState::ExtractingText => "extracting_text",
        DocumentState::ProcessingVisuals => "processing_visuals",
        DocumentState::ClassifyingVisuals => "classifying_visuals",
        DocumentState::Chunking => "chunking",
        DocumentState::Embedding => "embedding",
        DocumentState::EmbeddingPages => "embedding_pages",
        DocumentState::Storing => "storing",
        DocumentState::Completed => "completed",
        DocumentState::Failed => "failed",
        DocumentState::Cancelled => "cancelled",
    }
}

pub(crate) fn parse_state(s: &str) -> Result<DocumentState> {
    Ok(match s {
        "uploaded" => DocumentState::Uploaded,
        "validating" => DocumentState::Validating,
        "queued" => DocumentState::Queued,
        "processing_started" => DocumentState::ProcessingStarted,
        "converting_pages" => DocumentState::ConvertingPages,
        "extracting_text" => DocumentState::ExtractingText,
        "processing_visuals" => DocumentState::ProcessingVisuals,
        "classifying_visuals" => DocumentState::ClassifyingVisuals,
        "chunking" => DocumentState::Chunking,
        "embedding" => DocumentState::Embedding,
        "embedding_pages" => DocumentState::EmbeddingPages,
        "storing" => DocumentState::Storing,
        "completed" => DocumentState::Completed,
        "failed" => DocumentState::Failed,
        "cancelled" => DocumentState::Cancelled,
        other => return Err(Error::corruption(format!("unknown document state '{other}'"))),
    })
}
