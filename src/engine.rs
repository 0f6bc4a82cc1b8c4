//! Matching and reassembly engine.
//!
//! This module is the core of the crate. It is split into focused submodules
//! under `src/engine/`, wired together by the dialogue engine.
//!
//! ## How the parts work together
//!
//! ```text
//! script text ── ScriptBuilder (script.rs) ──▶ RuleStore        (rule_store.rs)
//!                                                 │ shared, read-only
//!                                                 ▼
//! raw input ── tokenize (normalize.rs) ── pre-substitute
//!                                                 │
//!                            select_keys (trigger.rs)
//!                                                 │
//!                 per key / decomposition:  match_pattern (matcher.rs)
//!                                           next_reassembly (state.rs)
//!                                           reassemble (reassemble.rs)
//!                                                 │
//!                            Dialogue (dialogue.rs) ── TurnTrace (metrics.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `rule_store.rs`: the immutable tables, flattened into id-indexed vectors,
//!   plus `validate` for linting scripts ahead of time.
//! - `normalize.rs`: punctuation normalization and tokenization.
//! - `trigger.rs`: key selection and weight ordering.
//! - `matcher.rs`: backtracking decomposition matching.
//! - `reassemble.rs`: reply construction from templates and captures.
//! - `state.rs`: per-session rotation cursors and the memory queue.
//! - `dialogue.rs`: the per-turn state machine (directives, save, fallback).
//! - `metrics.rs`: the per-turn trace returned by verbose responses.
//!
//! ## Debugging
//!
//! The engine logs through `tracing` at `debug` level: working words, selected
//! keys, matched decompositions, `goto` hops and memory traffic.

#[path = "engine/dialogue.rs"]
mod dialogue;
#[path = "engine/matcher.rs"]
mod matcher;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/normalize.rs"]
mod normalize;
#[path = "engine/reassemble.rs"]
mod reassemble;
#[path = "engine/rule_store.rs"]
mod rule_store;
#[path = "engine/state.rs"]
mod state;
#[path = "engine/trigger.rs"]
mod trigger;

pub(crate) use dialogue::{Dialogue, Outcome};
pub use matcher::{Captures, match_pattern};
pub use metrics::{Attempt, ReplySource, TurnTrace};
pub use reassemble::reassemble;
pub use rule_store::{DecompId, KeyId, RuleStore};
pub(crate) use state::SessionState;
pub use state::MemoryQueue;
