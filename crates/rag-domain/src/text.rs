//! BM25 tokenization (C8/C9 shared primitive): lowercase, strip non-word
//! characters, drop stop words. Both the indexer and the retriever must
//! agree on this exact tokenization or document frequencies and query
//! terms silently diverge.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::STOP_WORDS;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z0-9]+").expect("static regex"));

/// Tokenize `text` into lowercase, stop-word-filtered terms.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_owned())
        .filter(|term| !STOP_WORDS.contains(&term.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::tokenize;

    #[test]
    fn drops_stop_words_and_lowercases() {
        let terms = tokenize("The Quick Brown Fox and the Lazy Dog");
        assert!(!terms.contains(&"the".to_owned()));
        assert!(!terms.contains(&"and".to_owned()));
        assert!(terms.contains(&"quick".to_owned()));
    }

    #[test]
    fn strips_punctuation() {
        let terms = tokenize("hello, world! foo-bar.");
        assert_eq!(terms, vec!["hello", "world", "foo", "bar"]);
    }

    proptest::proptest! {
        #[test]
        fn no_token_is_ever_a_stop_word(text in "[a-zA-Z0-9 ,.!?-]{0,200}") {
            for term in tokenize(&text) {
                prop_assert!(!crate::constants::STOP_WORDS.contains(&term.as_str()));
            }
        }

        #[test]
        fn every_token_is_lowercase_ascii_alphanumeric(text in "[a-zA-Z0-9 ,.!?-]{0,200}") {
            for term in tokenize(&text) {
                prop_assert!(!term.is_empty());
                prop_assert!(term.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
            }
        }
    }
}
