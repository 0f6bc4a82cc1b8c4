//! Input normalization.
//!
//! Runs of sentence punctuation become standalone boundary tokens so that
//! patterns and the reassembler can see them:
//!
//! ```text
//! "I feel sad...today,ok?" -> ["I", "feel", "sad", ".", "today", ",", "ok", "?"]
//! ```
//!
//! `.`, `,`, `;` and `?` are handled independently, each run collapsing to
//! one token of its own kind.

/// Tokens the reassembler cuts captures at.
pub(crate) const SENTENCE_BOUNDARIES: &[&str] = &[",", ".", ";"];

/// Split `raw` into words with punctuation runs as separate tokens.
pub(crate) fn tokenize(raw: &str) -> Vec<String> {
    let text = regex!(r"\s*\.+\s*").replace_all(raw, " . ");
    let text = regex!(r"\s*,+\s*").replace_all(&text, " , ");
    let text = regex!(r"\s*\?+\s*").replace_all(&text, " ? ");
    let text = regex!(r"\s*;+\s*").replace_all(&text, " ; ");
    text.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_runs_become_single_tokens() {
        assert_eq!(
            tokenize("I feel sad...today,ok?"),
            tokens!["I", "feel", "sad", ".", "today", ",", "ok", "?"]
        );
        assert_eq!(tokenize("what ?? ;; yes"), tokens!["what", "?", ";", "yes"]);
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(tokenize("  hello \t  world  "), tokens!["hello", "world"]);
        assert!(tokenize("   ").is_empty());
    }

    #[test]
    fn apostrophes_stay_inside_words() {
        assert_eq!(tokenize("I can't, really"), tokens!["I", "can't", ",", "really"]);
    }
}
