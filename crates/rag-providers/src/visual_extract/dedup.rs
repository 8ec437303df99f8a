//! Content-addressed dedup for rendered pages (§4.6 step 3): identical
//! visuals repeated across a document (e.g. a letterhead on every page)
//! are hashed once and only the first occurrence is kept.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

pub struct ContentHashDedup {
    seen: HashSet<String>,
}

impl ContentHashDedup {
    pub fn new() -> Self {
        Self { seen: HashSet::new() }
    }

    /// First 16 hex characters of the SHA-256 digest of `bytes`.
    pub fn hash(bytes: &[u8]) -> String {
        let digest = Sha256::digest(bytes);
        hex::encode(digest)[..16].to_owned()
    }

    /// Whether `content_hash` has not been seen by this extractor run yet.
    /// Records it as seen either way.
    pub fn is_new(&mut self, content_hash: &str) -> bool {
        self.seen.insert(content_hash.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_is_new_subsequent_are_not() {
        let mut dedup = ContentHashDedup::new();
        let hash = ContentHashDedup::hash(b"page bytes");
        assert!(dedup.is_new(&hash));
        assert!(!dedup.is_new(&hash));
    }

    #[test]
    fn different_content_hashes_differ() {
        assert_ne!(ContentHashDedup::hash(b"a"), ContentHashDedup::hash(b"b"));
    }
}
