//! Turn traces.
//!
//! Every turn records what the engine looked at: the working words, the keys
//! it selected, each decomposition it tried and where the reply finally came
//! from. `Session::respond` discards the trace; `Session::respond_verbose`
//! hands it back for debugging rule scripts.

use crate::capability::Sentiment;
use std::time::Duration;

/// Where a turn's reply came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    /// A decomposition of this key produced the reply.
    Key(String),
    /// A key named after a detected entity (its text or its type).
    Entity(String),
    /// A key named after the detected sentiment.
    Sentiment(Sentiment),
    /// A `lambda` directive under this key.
    Capability { key: String, name: String },
    /// A previously saved reply.
    Memory,
    /// The default key.
    Default,
    /// The input was a quit phrase.
    Quit,
}

/// One decomposition the engine tried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    pub key: String,
    /// Position of the decomposition within its key.
    pub decomp: usize,
    pub matched: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TurnTrace {
    /// Words after normalization and pre-substitution.
    pub words: Vec<String>,
    /// Selected keys with their weights, in trial order.
    pub keys: Vec<(String, i32)>,
    pub attempts: Vec<Attempt>,
    /// Outputs pushed to memory during this turn.
    pub saved: Vec<Vec<String>>,
    /// `goto` hops followed, as (from, to).
    pub gotos: Vec<(String, String)>,
    pub source: Option<ReplySource>,
    /// Items left in memory after the turn.
    pub memory_len: usize,
    pub elapsed: Duration,
}
