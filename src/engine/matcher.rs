//! Decomposition matching.
//!
//! A decomposition pattern is matched against the whole word sequence:
//!
//! - `Literal(w)` consumes one word equal to `w` (case-insensitive) and
//!   captures nothing.
//! - `SynonymRef(root)` consumes one word from the class `root` and captures
//!   it with its original casing.
//! - `Wildcard` consumes any run of words, longest first, and captures it.
//!
//! The search is a depth-first backtracking walk driven by an explicit stack
//! of frames. Each frame owns the capture ranges it has accumulated, so a
//! failed branch is simply dropped; nothing has to be undone.
//!
//! ```text
//! pattern: [*, b]      words: [a, a, b]
//!
//! stack after expanding `*`:  [len 0, len 1, len 2, len 3]   (top = len 3)
//! len 3 -> [b] vs []          fail
//! len 2 -> [b] vs [b]         ok, captures [[a, a]]
//! ```
//!
//! Frames for a wildcard are pushed shortest first, so the longest split is
//! explored (completely) first. This reproduces the exploration order of the
//! straightforward recursive formulation.

use super::rule_store::RuleStore;
use crate::PatternToken;
use crate::error::ConfigError;
use std::ops::Range;

/// Ordered capture groups of a successful match.
pub type Captures = Vec<Vec<String>>;

/// A partial match: how far into the pattern and the words we are, and the
/// word ranges captured so far.
struct Frame {
    pattern_idx: usize,
    word_idx: usize,
    captures: Vec<Range<usize>>,
}

impl Frame {
    fn advance(&self, consumed: usize, capture: Option<Range<usize>>) -> Frame {
        let mut captures = self.captures.clone();
        captures.extend(capture);
        Frame { pattern_idx: self.pattern_idx + 1, word_idx: self.word_idx + consumed, captures }
    }
}

/// Match `pattern` against `words`.
///
/// Returns `Ok(None)` when the pattern does not match and an error only when
/// the pattern refers to a synonym class the store does not define.
pub fn match_pattern(
    store: &RuleStore,
    pattern: &[PatternToken],
    words: &[String],
) -> Result<Option<Captures>, ConfigError> {
    let mut stack = vec![Frame { pattern_idx: 0, word_idx: 0, captures: Vec::new() }];

    while let Some(frame) = stack.pop() {
        let rest_pattern = &pattern[frame.pattern_idx..];
        let rest_words = &words[frame.word_idx..];

        if rest_pattern.is_empty() {
            if rest_words.is_empty() {
                return Ok(Some(frame.captures.into_iter().map(|r| words[r].to_vec()).collect()));
            }
            continue;
        }

        // Only a lone trailing wildcard can match nothing.
        if rest_words.is_empty() && !matches!(rest_pattern, [PatternToken::Wildcard]) {
            continue;
        }

        match &rest_pattern[0] {
            PatternToken::Wildcard => {
                for len in 0..=rest_words.len() {
                    let start = frame.word_idx;
                    stack.push(frame.advance(len, Some(start..start + len)));
                }
            }
            PatternToken::SynonymRef(root) => {
                let class = store.synonym_class(root).ok_or_else(|| ConfigError::UnknownSynonym(root.clone()))?;
                if class.contains(&rest_words[0].to_lowercase()) {
                    let start = frame.word_idx;
                    stack.push(frame.advance(1, Some(start..start + 1)));
                }
            }
            PatternToken::Literal(word) => {
                if rest_words[0].to_lowercase() == *word {
                    stack.push(frame.advance(1, None));
                }
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(raw: &str) -> Vec<PatternToken> {
        raw.split_whitespace().map(PatternToken::parse).collect()
    }

    fn store() -> RuleStore {
        RuleStore::from_script("synon: family mother father\nsynon: belief feel think").unwrap()
    }

    fn run(pat: &str, words: &[&str]) -> Option<Captures> {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        match_pattern(&store(), &pattern(pat), &words).unwrap()
    }

    #[test]
    fn literal_patterns_match_exact_words_ignoring_case() {
        assert_eq!(run("how are you", &["How", "ARE", "you"]), Some(vec![]));
        assert_eq!(run("how are you", &["how", "are"]), None);
        assert_eq!(run("how are you", &["how", "are", "you", "today"]), None);
        assert_eq!(run("how are", &["how", "is"]), None);
        assert_eq!(run("", &[]), Some(vec![]));
        assert_eq!(run("", &["hi"]), None);
    }

    #[test]
    fn wildcard_prefers_the_longest_split() {
        assert_eq!(run("* b", &["a", "a", "b"]), Some(vec![tokens!["a", "a"]]));
        assert_eq!(run("* b *", &["a", "b", "c", "b", "d"]), Some(vec![tokens!["a", "b", "c"], tokens!["d"]]));
        assert_eq!(run("* *", &["x", "y"]), Some(vec![tokens!["x", "y"], tokens![]]));
    }

    #[test]
    fn wildcard_backtracks_to_shorter_splits() {
        assert_eq!(
            run("* i remember *", &["well", "i", "remember", "the", "sea"]),
            Some(vec![tokens!["well"], tokens!["the", "sea"]])
        );
        assert_eq!(run("* b", &["a", "c"]), None);
    }

    #[test]
    fn empty_input_only_matches_a_lone_wildcard() {
        assert_eq!(run("*", &[]), Some(vec![tokens![]]));
        assert_eq!(run("* *", &[]), None);
        assert_eq!(run("hello *", &["hello"]), Some(vec![tokens![]]));
        assert_eq!(run("@family", &[]), None);
    }

    #[test]
    fn synonyms_match_class_members_and_keep_casing() {
        assert_eq!(run("my @family", &["my", "mother"]), Some(vec![tokens!["mother"]]));
        assert_eq!(run("my @family", &["my", "FATHER"]), Some(vec![tokens!["FATHER"]]));
        assert_eq!(run("my @family", &["my", "Family"]), Some(vec![tokens!["Family"]]));
        assert_eq!(run("my @family", &["my", "dog"]), None);
    }

    #[test]
    fn captures_follow_pattern_order() {
        assert_eq!(
            run("* i @belief *", &["so", "I", "think", "it", "works"]),
            Some(vec![tokens!["so"], tokens!["think"], tokens!["it", "works"]])
        );
    }

    #[test]
    fn unknown_synonym_root_is_a_config_error() {
        let words = tokens!["i", "wish"];
        let err = match_pattern(&store(), &pattern("i @desire"), &words).unwrap_err();
        assert_eq!(err, ConfigError::UnknownSynonym("desire".into()));
    }

    #[test]
    fn unknown_synonym_in_unreached_position_is_not_reported() {
        // The literal fails first, so the synonym is never consulted.
        let words = tokens!["you", "wish"];
        assert_eq!(match_pattern(&store(), &pattern("i @desire"), &words), Ok(None));
    }
}
