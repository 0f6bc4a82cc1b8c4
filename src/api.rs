use crate::capability::{Capabilities, CapabilityFlags, NO_CAPABILITIES};
use crate::engine::{Dialogue, MemoryQueue, Outcome, RuleStore, SessionState, TurnTrace};
use crate::error::Result;
use once_cell::sync::Lazy;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::time::Instant;
use tracing::warn;

static DEFAULT_STORE: Lazy<RuleStore> =
    Lazy::new(|| RuleStore::from_script(crate::rules::DOCTOR).expect("bundled doctor script parses"));

/// The bundled "doctor" script.
///
/// # Example
/// ```
/// use colloquy::{Options, Response, Session, default_store};
///
/// let mut session = Session::new(default_store(), Options::default());
/// let reply = session.respond("I remember my mother").unwrap();
/// assert!(matches!(reply, Response::Reply(_)));
/// ```
pub fn default_store() -> &'static RuleStore {
    &DEFAULT_STORE
}

/// Options that affect how a session responds.
#[derive(Debug, Clone)]
pub struct Options {
    /// Key whose first decomposition answers when nothing else does.
    ///
    /// If that decomposition's reassembly is a `goto` whose target yields no
    /// reply, the turn fails with [`ConfigError::NoDefaultReply`](crate::ConfigError::NoDefaultReply).
    pub default_key: String,
    /// Host capabilities the engine may call.
    pub capabilities: CapabilityFlags,
    /// Trigger each key at most once per turn, even if its word repeats.
    pub dedupe_keys: bool,
    /// Rotate the default key's reassemblies like any other decomposition
    /// instead of always using its first one.
    pub rotate_default: bool,
    /// Seed for the session's random choices. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            default_key: "xnone".to_string(),
            capabilities: CapabilityFlags::empty(),
            dedupe_keys: false,
            rotate_default: false,
            seed: None,
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Reply(String),
    /// The user typed a quit phrase; the conversation is over.
    Quit,
}

impl Response {
    pub fn reply(&self) -> Option<&str> {
        match self {
            Response::Reply(text) => Some(text),
            Response::Quit => None,
        }
    }
}

/// One conversation over a shared [`RuleStore`].
///
/// The session owns everything a conversation mutates (rotation cursors,
/// memory, randomness), so any number of sessions can share one store.
pub struct Session<'a> {
    store: &'a RuleStore,
    capabilities: &'a dyn Capabilities,
    options: Options,
    state: SessionState,
    rng: StdRng,
}

impl<'a> Session<'a> {
    /// Open a session without host capabilities.
    pub fn new(store: &'a RuleStore, options: Options) -> Self {
        Self::with_capabilities(store, options, &NO_CAPABILITIES)
    }

    pub fn with_capabilities(store: &'a RuleStore, options: Options, capabilities: &'a dyn Capabilities) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { store, capabilities, state: SessionState::new(store), options, rng }
    }

    /// A greeting picked at random from the script's `initial` phrases.
    pub fn start_session(&mut self) -> Option<&'a str> {
        self.store.initials().choose(&mut self.rng).map(String::as_str)
    }

    /// A prompt for an idle user, picked from the script's `follow` phrases.
    pub fn follow_up(&mut self) -> Option<&'a str> {
        self.store.follows().choose(&mut self.rng).map(String::as_str)
    }

    /// A farewell picked at random from the script's `final` phrases.
    pub fn end_session(mut self) -> Option<&'a str> {
        self.store.finals().choose(&mut self.rng).map(String::as_str)
    }

    /// Answer one line of user input.
    ///
    /// Errors are defects in the rule data or a failed capability call that
    /// would have been the reply; the session stays usable afterwards.
    pub fn respond(&mut self, raw: &str) -> Result<Response> {
        self.respond_verbose(raw).0
    }

    /// Like [`respond`](Self::respond), also returning the turn's trace.
    pub fn respond_verbose(&mut self, raw: &str) -> (Result<Response>, TurnTrace) {
        let start = Instant::now();
        let mut trace = TurnTrace::default();

        let outcome = Dialogue {
            store: self.store,
            options: &self.options,
            capabilities: self.capabilities,
            state: &mut self.state,
            rng: &mut self.rng,
            trace: &mut trace,
        }
        .respond(raw);

        trace.memory_len = self.state.memory().len();
        trace.elapsed = start.elapsed();

        let response = outcome
            .map(|outcome| match outcome {
                Outcome::Reply(words) => Response::Reply(words.join(" ")),
                Outcome::Quit => Response::Quit,
            })
            .inspect_err(|err| warn!(%err, input = raw, "turn failed"));

        (response, trace)
    }

    /// Forget rotation and memory, as if the conversation had just started.
    pub fn reset(&mut self) {
        self.state = SessionState::new(self.store);
    }

    pub fn memory(&self) -> &MemoryQueue {
        self.state.memory()
    }

    pub fn store(&self) -> &'a RuleStore {
        self.store
    }

    pub fn options(&self) -> &Options {
        &self.options
    }
}
