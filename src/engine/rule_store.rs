//! The rule store.
//!
//! This module holds the *static* side of the engine: every table a script
//! defines, flattened into index-addressed vectors so that per-session state
//! can refer to rule entities by id instead of by reference.
//!
//! Conversations are split into two kinds of data:
//!
//! 1. **Rules** (this module): keys, decompositions, reassemblies, synonym
//!    classes, substitution maps and phrase lists. Built once by the script
//!    loader (`crate::script`) and never mutated afterwards.
//! 2. **Session state** (see `state.rs`): rotation cursors and the memory
//!    queue, owned by one `Session` each.
//!
//! ## Invariants
//!
//! - `KeyId` indexes `RuleStore::keys`, `DecompId` indexes
//!   `RuleStore::decomps`. Ids are assigned in declaration order and never
//!   reused, so a cursor table sized `decomposition_count()` covers every
//!   decomposition.
//! - `key_index` maps the lowercased key word to its id.
//! - Synonym classes always contain their own root, lowercased.

use crate::error::ConfigError;
use crate::script::ScriptBuilder;
use crate::{Decomposition, Key, PatternToken, Reassembly, ReassemblyToken, SubstitutionMap};
use std::collections::{HashMap, HashSet};

/// Key identifier (index into the key table).
pub type KeyId = usize;

/// Decomposition identifier (index into the flat decomposition table).
pub type DecompId = usize;

/// Immutable rule tables shared by every session built on them.
#[derive(Debug, Default, Clone)]
pub struct RuleStore {
    pub(crate) initials: Vec<String>,
    pub(crate) finals: Vec<String>,
    pub(crate) follows: Vec<String>,
    pub(crate) quits: Vec<String>,
    /// Capability names declared with the `lambda` tag.
    pub(crate) lambdas: Vec<String>,
    pub(crate) pre: SubstitutionMap,
    pub(crate) post: SubstitutionMap,
    pub(crate) synonyms: HashMap<String, HashSet<String>>,
    pub(crate) keys: Vec<Key>,
    pub(crate) key_index: HashMap<String, KeyId>,
    pub(crate) decomps: Vec<Decomposition>,
}

impl RuleStore {
    /// Start loading a store from one or more script sources.
    pub fn builder() -> ScriptBuilder {
        ScriptBuilder::new()
    }

    /// Parse a single script held in memory.
    pub fn from_script(text: &str) -> crate::Result<Self> {
        let mut builder = ScriptBuilder::new();
        builder.parse_str("<script>", text)?;
        Ok(builder.build())
    }

    pub fn key_id(&self, word: &str) -> Option<KeyId> {
        self.key_index.get(&word.to_lowercase()).copied()
    }

    pub fn key(&self, id: KeyId) -> &Key {
        &self.keys[id]
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn decomp(&self, id: DecompId) -> &Decomposition {
        &self.decomps[id]
    }

    pub fn decomposition_count(&self) -> usize {
        self.decomps.len()
    }

    pub fn synonym_class(&self, root: &str) -> Option<&HashSet<String>> {
        self.synonyms.get(root)
    }

    pub fn pre(&self) -> &SubstitutionMap {
        &self.pre
    }

    pub fn post(&self) -> &SubstitutionMap {
        &self.post
    }

    pub fn initials(&self) -> &[String] {
        &self.initials
    }

    pub fn finals(&self) -> &[String] {
        &self.finals
    }

    pub fn follows(&self) -> &[String] {
        &self.follows
    }

    pub fn quits(&self) -> &[String] {
        &self.quits
    }

    pub fn lambdas(&self) -> &[String] {
        &self.lambdas
    }

    /// True if the whole raw input is one of the quit phrases.
    pub fn is_quit(&self, raw: &str) -> bool {
        let input = raw.trim().to_lowercase();
        self.quits.iter().any(|q| q.to_lowercase() == input)
    }

    /// Check the tables for defects the engine would otherwise only hit in
    /// the middle of a conversation.
    ///
    /// Returns every problem found, in declaration order. An empty vector
    /// means the script is sound.
    pub fn validate(&self, default_key: &str) -> Vec<ConfigError> {
        let mut problems = Vec::new();

        if self.key_id(default_key).is_none() {
            problems.push(ConfigError::UnknownKey(default_key.to_lowercase()));
        }

        for decomp in &self.decomps {
            let owner = &self.keys[decomp.key].word;

            for token in &decomp.pattern {
                if let PatternToken::SynonymRef(root) = token {
                    if !self.synonyms.contains_key(root) {
                        problems.push(ConfigError::UnknownSynonym(root.clone()));
                    }
                }
            }

            if decomp.reassemblies.is_empty() {
                problems.push(ConfigError::NoReassembly(owner.clone()));
            }

            let available = decomp.capture_count();
            for reassembly in &decomp.reassemblies {
                match reassembly {
                    Reassembly::Goto(target) if self.key_id(target).is_none() => {
                        problems.push(ConfigError::UnknownGotoTarget(target.clone()));
                    }
                    Reassembly::Template(tokens) => {
                        for token in tokens {
                            if let ReassemblyToken::Capture(index) = *token {
                                if index == 0 || index > available {
                                    problems.push(ConfigError::CaptureOutOfRange { index, available });
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        problems
    }

    // --- Construction (used by the script loader) ----------------------------

    /// Open `word` for new decompositions, creating the key if needed.
    ///
    /// Redeclaring a key keeps its decompositions; an explicit weight
    /// replaces the old one.
    pub(crate) fn declare_key(&mut self, word: &str, weight: Option<i32>) -> KeyId {
        let word = word.to_lowercase();
        if let Some(&id) = self.key_index.get(&word) {
            if let Some(weight) = weight {
                self.keys[id].weight = weight;
            }
            return id;
        }

        let id = self.keys.len();
        self.keys.push(Key { word: word.clone(), weight: weight.unwrap_or(1), decomps: Vec::new() });
        self.key_index.insert(word, id);
        id
    }

    pub(crate) fn add_decomp(&mut self, key: KeyId, pattern: Vec<PatternToken>, save: bool) -> DecompId {
        let id = self.decomps.len();
        self.decomps.push(Decomposition { key, pattern, save, reassemblies: Vec::new() });
        self.keys[key].decomps.push(id);
        id
    }

    pub(crate) fn add_reassembly(&mut self, decomp: DecompId, reassembly: Reassembly) {
        self.decomps[decomp].reassemblies.push(reassembly);
    }

    /// Add `members` (and `root` itself) to the synonym class `root`.
    pub(crate) fn add_synonyms(&mut self, root: &str, members: &[&str]) {
        let root = root.to_lowercase();
        let class = self.synonyms.entry(root.clone()).or_default();
        class.insert(root);
        class.extend(members.iter().map(|m| m.to_lowercase()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "
synon: belief feel think believe
key: xnone
decomp: *
reasmb: Please go on.
key: remember 5
decomp: * i remember *
reasmb: Do you often think of (2) ?
reasmb: What else does (3) remind you of ?
decomp: * @wish *
reasmb: goto what
";

    fn store() -> RuleStore {
        RuleStore::from_script(SCRIPT).unwrap()
    }

    #[test]
    fn keys_and_decomps_are_indexed_in_order() {
        let store = store();
        let remember = store.key_id("REMEMBER").unwrap();
        assert_eq!(store.key(remember).weight, 5);
        assert_eq!(store.key(remember).decomps, vec![1, 2]);
        assert_eq!(store.decomp(1).key, remember);
        assert_eq!(store.decomposition_count(), 3);
        assert_eq!(store.key(store.key_id("xnone").unwrap()).weight, 1);
    }

    #[test]
    fn synonym_classes_contain_their_root() {
        let store = store();
        let class = store.synonym_class("belief").unwrap();
        assert!(class.contains("belief"));
        assert!(class.contains("think"));
    }

    #[test]
    fn validate_reports_every_defect() {
        let problems = store().validate("xnone");
        assert_eq!(
            problems,
            vec![
                ConfigError::CaptureOutOfRange { index: 3, available: 2 },
                ConfigError::UnknownSynonym("wish".into()),
                ConfigError::UnknownGotoTarget("what".into()),
            ]
        );
    }

    #[test]
    fn validate_requires_the_default_key() {
        let problems = store().validate("fallback");
        assert_eq!(problems.first(), Some(&ConfigError::UnknownKey("fallback".into())));
    }

    #[test]
    fn builder_merges_sources_into_one_store() {
        let mut builder = RuleStore::builder();
        builder.parse_str("core.txt", "key: hello\ndecomp: *\nreasmb: Hi.").unwrap();
        builder.parse_str("extra.txt", "key: hello 4\ndecomp: hello *\nreasmb: Hello (1) !").unwrap();
        let store = builder.build();

        let hello = store.key(store.key_id("hello").unwrap());
        assert_eq!(hello.weight, 4);
        assert_eq!(hello.decomps.len(), 2);
    }

    #[test]
    fn quit_phrases_match_whole_input_case_insensitively() {
        let store = RuleStore::from_script("quit: goodbye\nquit: bye now").unwrap();
        assert!(store.is_quit("Goodbye"));
        assert!(store.is_quit("  BYE NOW "));
        assert!(!store.is_quit("goodbye then"));
    }
}
