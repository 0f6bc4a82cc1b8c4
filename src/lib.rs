extern crate self as colloquy;

#[macro_use]
mod macros;
mod api;
mod capability;
mod engine;
mod error;
mod rules;
mod script;

pub use api::{Options, Response, Session, default_store};
pub use capability::{Capabilities, CapabilityFlags, DetectedEntity, NoCapabilities, Sentiment};
pub use engine::{
    Attempt, Captures, DecompId, KeyId, MemoryQueue, ReplySource, RuleStore, TurnTrace, match_pattern, reassemble,
};
pub use error::{CapabilityError, ConfigError, Error, Result};
pub use script::ScriptBuilder;

// --- Rule data types --------------------------------------------------------

/// A trigger word with its weight and the decompositions tried when it fires.
///
/// Decompositions are stored in the store's flat table; a key only keeps
/// their ids, in declaration order.
#[derive(Debug, Clone)]
pub struct Key {
    /// Lowercased trigger word.
    pub word: String,
    /// Higher weights are tried first.
    pub weight: i32,
    pub decomps: Vec<DecompId>,
}

/// A decomposition pattern with its reassemblies.
#[derive(Debug, Clone)]
pub struct Decomposition {
    /// Owning key.
    pub key: KeyId,
    pub pattern: Vec<PatternToken>,
    /// When set, a successful reassembly goes to the memory queue instead of
    /// being returned.
    pub save: bool,
    pub reassemblies: Vec<Reassembly>,
}

impl Decomposition {
    /// Number of groups a successful match of this pattern produces.
    pub fn capture_count(&self) -> usize {
        self.pattern.iter().filter(|t| !matches!(t, PatternToken::Literal(_))).count()
    }
}

/// One position of a decomposition pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Matches one word case-insensitively. Stored lowercased.
    Literal(String),
    /// `*`: matches any run of words, including none.
    Wildcard,
    /// `@root`: matches one word belonging to the synonym class `root`.
    SynonymRef(String),
}

impl PatternToken {
    /// Classify a raw script token.
    pub(crate) fn parse(raw: &str) -> Self {
        if raw == "*" {
            PatternToken::Wildcard
        } else if let Some(root) = raw.strip_prefix('@').filter(|r| !r.is_empty()) {
            PatternToken::SynonymRef(root.to_lowercase())
        } else {
            PatternToken::Literal(raw.to_lowercase())
        }
    }
}

/// A reassembly rule, resolved once at load time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reassembly {
    /// Literal words and capture references, emitted in order.
    Template(Vec<ReassemblyToken>),
    /// `goto <key>`: retry the same words against another key.
    Goto(String),
    /// `lambda <name>`: reply with the result of a host capability.
    Capability(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReassemblyToken {
    Literal(String),
    /// `(n)`, 1-based.
    Capture(usize),
}

/// Lookup-and-splice word substitution (the script's `pre` and `post` maps).
#[derive(Debug, Clone, Default)]
pub struct SubstitutionMap {
    entries: std::collections::HashMap<String, Vec<String>>,
}

impl SubstitutionMap {
    /// Register `word`, replacing any earlier entry for it.
    pub fn insert(&mut self, word: &str, replacement: Vec<String>) {
        self.entries.insert(word.to_lowercase(), replacement);
    }

    pub fn get(&self, word: &str) -> Option<&[String]> {
        self.entries.get(&word.to_lowercase()).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every word that has an entry with its replacement sequence.
    ///
    /// ```text
    /// pre: i'm -> i am
    /// ["I'm", "tired"] -> ["i", "am", "tired"]
    /// ```
    pub fn apply(&self, words: &[String]) -> Vec<String> {
        let mut out = Vec::with_capacity(words.len());
        for word in words {
            match self.get(word) {
                Some(replacement) => out.extend(replacement.iter().cloned()),
                None => out.push(word.clone()),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_tokens_are_classified() {
        assert_eq!(PatternToken::parse("*"), PatternToken::Wildcard);
        assert_eq!(PatternToken::parse("@Family"), PatternToken::SynonymRef("family".into()));
        assert_eq!(PatternToken::parse("Hello"), PatternToken::Literal("hello".into()));
        assert_eq!(PatternToken::parse("@"), PatternToken::Literal("@".into()));
    }

    #[test]
    fn substitution_splices_replacements() {
        let mut map = SubstitutionMap::default();
        map.insert("I'm", tokens!["i", "am"]);
        map.insert("dont", tokens!["don't"]);

        let out = map.apply(&tokens!["I'M", "sure", "I", "dont"]);
        assert_eq!(out, tokens!["i", "am", "sure", "I", "don't"]);
    }
}
