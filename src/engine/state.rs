//! Per-session mutable state.
//!
//! The rule store is shared and read-only; everything a conversation changes
//! lives here instead:
//!
//! - **Rotation cursors**, one per decomposition, indexed by `DecompId`. A
//!   cursor advances every time its decomposition produces an output and
//!   selects the reassembly at `cursor % count`.
//! - **Memory queue**: outputs of `save` decompositions, withheld until a
//!   turn finds nothing better to say.

use super::rule_store::{DecompId, RuleStore};
use crate::Reassembly;
use crate::error::ConfigError;
use rand::Rng;

/// Rotation cursors and memory for one conversation.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    cursors: Vec<usize>,
    memory: MemoryQueue,
}

impl SessionState {
    pub fn new(store: &RuleStore) -> Self {
        Self { cursors: vec![0; store.decomposition_count()], memory: MemoryQueue::default() }
    }

    /// Pick the next reassembly of `decomp` and advance its cursor.
    pub fn next_reassembly<'s>(
        &mut self,
        store: &'s RuleStore,
        decomp: DecompId,
    ) -> Result<&'s Reassembly, ConfigError> {
        let reassembly = self.peek_reassembly(store, decomp)?;
        self.cursors[decomp] = self.cursors[decomp].wrapping_add(1);
        Ok(reassembly)
    }

    /// The reassembly `next_reassembly` would return, without advancing.
    pub fn peek_reassembly<'s>(&self, store: &'s RuleStore, decomp: DecompId) -> Result<&'s Reassembly, ConfigError> {
        let d = store.decomp(decomp);
        if d.reassemblies.is_empty() {
            return Err(ConfigError::NoReassembly(store.key(d.key).word.clone()));
        }
        Ok(&d.reassemblies[self.cursors[decomp] % d.reassemblies.len()])
    }

    #[cfg(test)]
    pub fn cursor(&self, decomp: DecompId) -> usize {
        self.cursors[decomp]
    }

    pub fn memory(&self) -> &MemoryQueue {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryQueue {
        &mut self.memory
    }
}

/// Withheld replies, consumed at random and at most once.
#[derive(Debug, Clone, Default)]
pub struct MemoryQueue {
    items: Vec<Vec<String>>,
}

impl MemoryQueue {
    pub fn push(&mut self, output: Vec<String>) {
        self.items.push(output);
    }

    /// Remove and return a uniformly chosen item.
    pub fn take_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Vec<String>> {
        if self.items.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.items.len());
        Some(self.items.remove(index))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn store() -> RuleStore {
        RuleStore::from_script("key: a\ndecomp: *\nreasmb: A\nreasmb: B\nreasmb: C\ndecomp: x\nreasmb: only").unwrap()
    }

    fn text(r: &Reassembly) -> String {
        match r {
            Reassembly::Template(tokens) => format!("{tokens:?}"),
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn reassemblies_rotate_cyclically() {
        let store = store();
        let mut state = SessionState::new(&store);
        let picked: Vec<String> = (0..4).map(|_| text(state.next_reassembly(&store, 0).unwrap())).collect();
        assert_eq!(picked[0], picked[3]);
        assert_ne!(picked[0], picked[1]);
        assert_ne!(picked[1], picked[2]);
        assert_eq!(state.cursor(0), 4);
        assert_eq!(state.cursor(1), 0);
    }

    #[test]
    fn peeking_does_not_advance() {
        let store = store();
        let mut state = SessionState::new(&store);
        let first = text(state.peek_reassembly(&store, 0).unwrap());
        assert_eq!(first, text(state.next_reassembly(&store, 0).unwrap()));
        assert_eq!(state.cursor(0), 1);
    }

    #[test]
    fn decomposition_without_reassemblies_is_an_error() {
        let store = RuleStore::from_script("key: a\ndecomp: *").unwrap();
        let mut state = SessionState::new(&store);
        assert_eq!(state.next_reassembly(&store, 0), Err(ConfigError::NoReassembly("a".into())));
        assert_eq!(state.cursor(0), 0);
    }

    #[test]
    fn memory_reads_are_destructive() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut memory = MemoryQueue::default();
        memory.push(tokens!["one"]);
        memory.push(tokens!["two"]);

        let first = memory.take_random(&mut rng).unwrap();
        let second = memory.take_random(&mut rng).unwrap();
        assert_ne!(first, second);
        assert!(memory.is_empty());
        assert_eq!(memory.take_random(&mut rng), None);
    }
}
