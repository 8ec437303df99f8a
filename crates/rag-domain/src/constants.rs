//! Fixed thresholds and tables referenced by more than one component.
//! Component-local constants (BM25 k1/b, RRF k) stay in
//! [`crate::value_objects`].

/// Default target chunk size in characters, used by the intelligent
/// splitter (C5) and the XLSX row-accumulation handler.
pub const MIN_CHUNK_SIZE: usize = 512;

/// Visual page render bounds (C6): both edges must land in this range.
pub const VISUAL_EDGE_MIN_PX: u32 = 200;
/// Visual page render bounds (C6): both edges must land in this range.
pub const VISUAL_EDGE_MAX_PX: u32 = 1568;
/// Short edge must not exceed this even when within the edge bounds.
pub const VISUAL_SHORT_EDGE_MAX_PX: u32 = 768;

/// Classifier's PDF-size-as-visual-heuristic threshold (§4.3 rule 4).
pub const VISUAL_PDF_SIZE_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024;

/// Status record TTL (§4.2, §4.11): 24h after last update.
pub const STATUS_TTL_HOURS: i64 = 24;
/// Secret parcel sweep age threshold (§4.11): orphans older than this with
/// no corresponding status record are dropped.
pub const SECRET_SWEEP_AGE_HOURS: i64 = 24;

/// Default dense embedding dimensionality (spec §4.7: "a 1536-dim text
/// embedding model" by default; configurable per deployment).
pub const DEFAULT_EMBEDDING_DIM: usize = 1536;

/// Presentation container formats/extensions that always route to the
/// visual lane (§4.3 rule 1).
pub const PRESENTATION_EXTENSIONS: &[&str] = &["ppt", "pptx", "odp", "key"];

/// Filename substrings that route a document to the visual lane
/// (§4.3 rule 2), matched case-insensitively against the object key.
pub const VISUAL_FILENAME_HINTS: &[&str] =
    &["form", "invoice", "receipt", "application", "claim", "tax"];

/// Broad source-code extension allowlist routing to the text lane
/// (§4.3 rule 5).
pub const SOURCE_CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "jsx", "tsx", "java", "cpp", "cc", "c", "h", "hpp", "go", "rs", "rb", "php",
    "cs", "swift", "kt", "scala", "sh", "bash", "sql", "yaml", "yml", "json", "toml", "xml",
    "html", "css",
];

/// Plain-text-like extensions and MIME types routing to the text lane
/// (§4.3 rule 6).
pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "csv", "tsv"];

/// Spreadsheet extensions/MIME types routing to the text lane (§4.3 rule 7).
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xls", "ods"];

/// Fixed English stop-word list for BM25 tokenization (C8).
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "for", "to", "of", "in", "on",
    "at", "by", "with", "is", "are", "was", "were", "be", "been", "being", "this", "that",
    "these", "those", "it", "its", "as", "from", "not", "no", "so", "than", "too", "very", "can",
    "will", "just", "do", "does", "did", "have", "has", "had", "i", "you", "he", "she", "we",
    "they", "them", "his", "her", "their", "our", "your",
];

/// Alt-text usefulness filter (C6 step 4): strings shorter than this
/// (after normalization) are discarded.
pub const ALT_TEXT_MIN_LEN: usize = 10;

/// Alt-text blocklist of auto-generator boilerplate patterns (C6 step 4),
/// matched as case-insensitive substrings or exact single-word matches.
pub const ALT_TEXT_BLOCKLIST: &[&str] = &[
    "description automatically generated",
    "chart description",
    "logo description",
    "a picture containing",
    "chart",
    "image",
    "logo",
];
