//! Key selection.
//!
//! Every working word that names a key triggers it. The triggered keys are
//! then ordered by descending weight; the sort is stable, so keys of equal
//! weight keep the left-to-right order in which the user mentioned them.
//!
//! ```text
//! words:  [my, dog, and, my, cat]      keys: my=2 dog=1 cat=5
//! hits:   [my, dog, my, cat]
//! order:  [cat, my, my, dog]
//! ```
//!
//! A repeated word triggers its key once per occurrence unless the caller
//! asks for deduplication.

use super::rule_store::{KeyId, RuleStore};
use std::cmp::Reverse;
use std::collections::HashSet;

/// Keys triggered by `words`, in the order they should be tried.
pub(crate) fn select_keys(store: &RuleStore, words: &[String], dedupe: bool) -> Vec<KeyId> {
    let mut seen = HashSet::new();
    let mut keys: Vec<KeyId> = words
        .iter()
        .filter_map(|w| store.key_id(w))
        .filter(|id| !dedupe || seen.insert(*id))
        .collect();

    keys.sort_by_key(|&id| Reverse(store.key(id).weight));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RuleStore {
        RuleStore::from_script(
            "key: dog 1\ndecomp: *\nreasmb: a\nkey: cat 5\ndecomp: *\nreasmb: b\nkey: my 2\ndecomp: *\nreasmb: c\nkey: bird\ndecomp: *\nreasmb: d",
        )
        .unwrap()
    }

    fn words(store: &RuleStore, ids: Vec<KeyId>) -> Vec<String> {
        ids.into_iter().map(|id| store.key(id).word.clone()).collect()
    }

    #[test]
    fn heavier_keys_are_tried_first() {
        let store = store();
        let picked = select_keys(&store, &tokens!["the", "dog", "chased", "the", "cat"], false);
        assert_eq!(words(&store, picked), tokens!["cat", "dog"]);
    }

    #[test]
    fn equal_weights_keep_input_order() {
        let store = store();
        let picked = select_keys(&store, &tokens!["bird", "and", "Dog"], false);
        assert_eq!(words(&store, picked), tokens!["bird", "dog"]);
    }

    #[test]
    fn repeated_words_trigger_repeatedly_unless_deduped() {
        let store = store();
        let input = tokens!["my", "dog", "and", "my", "cat"];
        assert_eq!(words(&store, select_keys(&store, &input, false)), tokens!["cat", "my", "my", "dog"]);
        assert_eq!(words(&store, select_keys(&store, &input, true)), tokens!["cat", "my", "dog"]);
    }

    #[test]
    fn no_keys_in_input() {
        assert!(select_keys(&store(), &tokens!["nothing", "here"], false).is_empty());
    }
}
