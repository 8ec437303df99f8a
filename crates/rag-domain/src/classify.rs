//! Document Classifier (C3): a pure, side-effect-free decision over
//! `(key, mime, metadata, size)`. The rule ordering below is normative —
//! reimplementations must preserve it to keep downstream queues
//! hot-sharded the same way (§4.3).

use serde_json::Value as Json;

use crate::constants::{
    PLAIN_TEXT_EXTENSIONS, PRESENTATION_EXTENSIONS, SOURCE_CODE_EXTENSIONS,
    SPREADSHEET_EXTENSIONS, VISUAL_FILENAME_HINTS, VISUAL_PDF_SIZE_THRESHOLD_BYTES,
};
use crate::value_objects::Lane;

const PRESENTATION_MIME_PREFIXES: &[&str] = &[
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml",
    "application/vnd.oasis.opendocument.presentation",
];

fn extension(key: &str) -> Option<String> {
    key.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

fn is_presentation(key: &str, mime: &str) -> bool {
    if PRESENTATION_MIME_PREFIXES
        .iter()
        .any(|prefix| mime.starts_with(prefix))
    {
        return true;
    }
    extension(key).is_some_and(|ext| PRESENTATION_EXTENSIONS.contains(&ext.as_str()))
}

fn filename_hints_visual(key: &str) -> bool {
    let lower = key.to_lowercase();
    VISUAL_FILENAME_HINTS.iter().any(|hint| lower.contains(hint))
}

fn metadata_says_scanned(metadata: &Json) -> bool {
    metadata
        .get("scanned")
        .and_then(Json::as_bool)
        .unwrap_or(false)
}

fn is_large_pdf(mime: &str, key: &str, size: u64) -> bool {
    let is_pdf = mime == "application/pdf" || extension(key).as_deref() == Some("pdf");
    is_pdf && size > VISUAL_PDF_SIZE_THRESHOLD_BYTES
}

fn is_source_code(key: &str) -> bool {
    extension(key).is_some_and(|ext| SOURCE_CODE_EXTENSIONS.contains(&ext.as_str()))
}

fn is_plain_text(key: &str, mime: &str) -> bool {
    if mime.starts_with("text/plain") || mime.starts_with("text/markdown") || mime == "text/csv" {
        return true;
    }
    extension(key).is_some_and(|ext| PLAIN_TEXT_EXTENSIONS.contains(&ext.as_str()))
}

fn is_spreadsheet(key: &str, mime: &str) -> bool {
    if mime.starts_with("application/vnd.ms-excel")
        || mime.starts_with("application/vnd.openxmlformats-officedocument.spreadsheetml")
        || mime.starts_with("application/vnd.oasis.opendocument.spreadsheet")
    {
        return true;
    }
    extension(key).is_some_and(|ext| SPREADSHEET_EXTENSIONS.contains(&ext.as_str()))
}

/// Decide the ingestion lane for a newly uploaded object. Total and
/// deterministic: any combination of inputs resolves to a lane, falling
/// through to [`Lane::Text`] by default.
#[must_use]
pub fn classify(key: &str, mime: &str, metadata: &Json, size: u64) -> Lane {
    if is_presentation(key, mime) {
        return Lane::Visual;
    }
    if filename_hints_visual(key) {
        return Lane::Visual;
    }
    if metadata_says_scanned(metadata) {
        return Lane::Visual;
    }
    if is_large_pdf(mime, key, size) {
        return Lane::Visual;
    }
    if is_source_code(key) {
        return Lane::Text;
    }
    if is_plain_text(key, mime) {
        return Lane::Text;
    }
    if is_spreadsheet(key, mime) {
        return Lane::Text;
    }
    Lane::Text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("deck.pptx", "application/vnd.openxmlformats-officedocument.presentationml.presentation", 100, Lane::Visual)]
    #[case("deck.key", "application/octet-stream", 100, Lane::Visual)]
    #[case("w2-application.pdf", "application/pdf", 100, Lane::Visual)]
    #[case("irs_tax_form.pdf", "application/pdf", 100, Lane::Visual)]
    #[case("notes.md", "text/markdown", 1200, Lane::Text)]
    #[case("sales.xlsx", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet", 50_000, Lane::Text)]
    #[case("main.rs", "text/plain", 2_000, Lane::Text)]
    #[case("readme.csv", "text/csv", 5_000, Lane::Text)]
    fn rule_order_matches_table(
        #[case] key: &str,
        #[case] mime: &str,
        #[case] size: u64,
        #[case] expected: Lane,
    ) {
        assert_eq!(classify(key, mime, &json!({}), size), expected);
    }

    #[test]
    fn large_pdf_without_scanned_hint_is_visual() {
        let lane = classify("report.pdf", "application/pdf", &json!({}), 11 * 1024 * 1024);
        assert_eq!(lane, Lane::Visual);
    }

    #[test]
    fn small_pdf_without_hints_is_text() {
        let lane = classify("report.pdf", "application/pdf", &json!({}), 1024);
        assert_eq!(lane, Lane::Text);
    }

    #[test]
    fn scanned_metadata_overrides_small_size() {
        let lane = classify("scan.pdf", "application/pdf", &json!({"scanned": true}), 1024);
        assert_eq!(lane, Lane::Visual);
    }

    #[test]
    fn unknown_extension_defaults_to_text() {
        let lane = classify("mystery.xyz", "application/octet-stream", &json!({}), 10);
        assert_eq!(lane, Lane::Text);
    }

    #[test]
    fn filename_hint_beats_source_extension() {
        // "invoice" hint fires before the source-code rule would even be
        // reached, even though ".rs" would otherwise route to text.
        let lane = classify("invoice_template.rs", "text/plain", &json!({}), 10);
        assert_eq!(lane, Lane::Visual);
    }
}
