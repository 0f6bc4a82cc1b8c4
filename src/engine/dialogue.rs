//! The dialogue engine: one turn from raw input to reply words.
//!
//! ```text
//! raw ── quit? ──────────────────────────────────────────────▶ Quit
//!  │
//!  └─ tokenize ─ pre-substitute ─┬─ entity reaction (optional) ─▶ reply
//!                                │
//!                                └─ select keys
//!                                     │ for each key, each decomposition:
//!                                     │   match ─ post-substitute captures
//!                                     │   next reassembly (rotation cursor)
//!                                     │     goto    ─▶ same words, target key
//!                                     │     lambda  ─▶ host capability ─▶ reply
//!                                     │     template ─ reassemble
//!                                     │        save?  ─▶ memory, keep scanning
//!                                     │        else   ─▶ reply
//!                                     ▼
//!                                  fallback: memory ▶ sentiment ▶ default key
//! ```
//!
//! A `Dialogue` only lives for one turn. It borrows the shared rule store and
//! the session's own mutable state, so two sessions on one store never see
//! each other's rotation or memory.

use super::matcher::match_pattern;
use super::metrics::{Attempt, ReplySource, TurnTrace};
use super::normalize::tokenize;
use super::reassemble::reassemble;
use super::rule_store::{KeyId, RuleStore};
use super::state::SessionState;
use super::trigger::select_keys;
use crate::Reassembly;
use crate::api::Options;
use crate::capability::{Capabilities, CapabilityFlags};
use crate::error::{CapabilityError, ConfigError, Result};
use rand::rngs::StdRng;
use tracing::{debug, warn};

/// Longest `goto` chain followed before the script is considered cyclic.
pub(crate) const MAX_GOTO_DEPTH: usize = 32;

/// What a turn produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    Reply(Vec<String>),
    Quit,
}

type Produced = Option<(Vec<String>, ReplySource)>;

pub(crate) struct Dialogue<'t, 'a> {
    pub store: &'a RuleStore,
    pub options: &'t Options,
    pub capabilities: &'a dyn Capabilities,
    pub state: &'t mut SessionState,
    pub rng: &'t mut StdRng,
    pub trace: &'t mut TurnTrace,
}

impl<'t, 'a> Dialogue<'t, 'a> {
    pub fn respond(&mut self, raw: &str) -> Result<Outcome> {
        if self.store.is_quit(raw) {
            self.trace.source = Some(ReplySource::Quit);
            return Ok(Outcome::Quit);
        }

        let words = self.store.pre().apply(&tokenize(raw));
        debug!(?words, "working words");
        self.trace.words = words.clone();

        if let Some(reply) = self.react_to_entities(raw, &words)? {
            return Ok(Outcome::Reply(reply));
        }

        let keys = select_keys(self.store, &words, self.options.dedupe_keys);
        self.trace.keys = keys
            .iter()
            .map(|&id| {
                let key = self.store.key(id);
                (key.word.clone(), key.weight)
            })
            .collect();
        debug!(keys = ?self.trace.keys, "selected keys");

        for key in keys {
            if let Some((reply, source)) = self.try_key(key, &words, 0)? {
                self.trace.source = Some(source);
                return Ok(Outcome::Reply(reply));
            }
        }

        self.fallback(raw, &words).map(Outcome::Reply)
    }

    /// Try each decomposition of `key` in order.
    ///
    /// `depth` counts the `goto` hops that led here.
    fn try_key(&mut self, key: KeyId, words: &[String], depth: usize) -> Result<Produced> {
        let store = self.store;
        let owner = store.key(key);

        for (position, &decomp_id) in owner.decomps.iter().enumerate() {
            let decomp = store.decomp(decomp_id);
            let captures = match_pattern(store, &decomp.pattern, words)?;
            self.trace.attempts.push(Attempt { key: owner.word.clone(), decomp: position, matched: captures.is_some() });

            let Some(captures) = captures else {
                continue;
            };
            let captures: Vec<Vec<String>> = captures.iter().map(|group| store.post().apply(group)).collect();
            debug!(key = %owner.word, decomp = position, ?captures, "decomposition matched");

            match self.state.next_reassembly(store, decomp_id)? {
                Reassembly::Goto(target) => {
                    let target_id =
                        store.key_id(target).ok_or_else(|| ConfigError::UnknownGotoTarget(target.clone()))?;
                    if depth >= MAX_GOTO_DEPTH {
                        return Err(ConfigError::GotoCycle { key: owner.word.clone(), depth }.into());
                    }
                    debug!(from = %owner.word, to = %target, "goto");
                    self.trace.gotos.push((owner.word.clone(), target.clone()));
                    return self.try_key(target_id, words, depth + 1);
                }
                Reassembly::Capability(name) => {
                    if !self.options.capabilities.contains(CapabilityFlags::INVOKE) {
                        debug!(capability = %name, "invocation disabled, skipping decomposition");
                        continue;
                    }
                    let reply = self.capabilities.invoke(name)?;
                    let source = ReplySource::Capability { key: owner.word.clone(), name: name.clone() };
                    return Ok(Some((reply, source)));
                }
                Reassembly::Template(template) => {
                    let output = reassemble(template, &captures)?;
                    if decomp.save {
                        debug!(?output, "saved to memory");
                        self.trace.saved.push(output.clone());
                        self.state.memory_mut().push(output);
                        continue;
                    }
                    return Ok(Some((output, ReplySource::Key(owner.word.clone()))));
                }
            }
        }

        Ok(None)
    }

    /// Let the host's entity recognizer pick the key.
    ///
    /// For each entity, its text and then its type are looked up as keys.
    fn react_to_entities(&mut self, raw: &str, words: &[String]) -> Result<Option<Vec<String>>> {
        if !self.options.capabilities.contains(CapabilityFlags::ENTITIES) {
            return Ok(None);
        }

        let entities = match self.capabilities.detect_entities(raw) {
            Ok(entities) => entities,
            Err(err) => {
                warn!(%err, "entity detection failed, continuing without it");
                return Ok(None);
            }
        };

        for entity in entities {
            for name in [entity.text.to_lowercase(), entity.kind.to_lowercase()] {
                let Some(key) = self.store.key_id(&name) else {
                    continue;
                };
                debug!(entity = %entity.text, key = %name, "entity names a key");
                if let Some((reply, source)) = self.try_key(key, words, 0)? {
                    self.trace.source = Some(match source {
                        ReplySource::Key(_) => ReplySource::Entity(name),
                        other => other,
                    });
                    return Ok(Some(reply));
                }
            }
        }

        Ok(None)
    }

    fn fallback(&mut self, raw: &str, words: &[String]) -> Result<Vec<String>> {
        if let Some(reply) = self.state.memory_mut().take_random(&mut *self.rng) {
            debug!(?reply, "reply from memory");
            self.trace.source = Some(ReplySource::Memory);
            return Ok(reply);
        }

        if let Some(reply) = self.react_to_sentiment(raw, words)? {
            return Ok(reply);
        }

        self.default_reply(words)
    }

    fn react_to_sentiment(&mut self, raw: &str, words: &[String]) -> Result<Option<Vec<String>>> {
        if !self.options.capabilities.contains(CapabilityFlags::SENTIMENT) {
            return Ok(None);
        }

        let sentiment = match self.capabilities.detect_sentiment(raw) {
            Ok(Some(sentiment)) => sentiment,
            Ok(None) => return Ok(None),
            Err(err) => {
                warn!(%err, "sentiment detection failed, continuing without it");
                return Ok(None);
            }
        };

        let Some(key) = self.store.key_id(sentiment.as_str()) else {
            return Ok(None);
        };
        debug!(?sentiment, "sentiment names a key");
        Ok(self.try_key(key, words, 0)?.map(|(reply, source)| {
            self.trace.source = Some(match source {
                ReplySource::Key(_) => ReplySource::Sentiment(sentiment),
                other => other,
            });
            reply
        }))
    }

    /// First reassembly of the default key's first decomposition.
    ///
    /// Captures come from matching that decomposition against the words when
    /// it matches; otherwise the template gets none. A `goto` here must end
    /// in a reply.
    fn default_reply(&mut self, words: &[String]) -> Result<Vec<String>> {
        let store = self.store;
        let options = self.options;
        let key = store
            .key_id(&options.default_key)
            .ok_or_else(|| ConfigError::UnknownKey(options.default_key.to_lowercase()))?;
        let owner = &store.key(key).word;
        let &decomp_id = store.key(key).decomps.first().ok_or_else(|| ConfigError::NoReassembly(owner.clone()))?;

        let reassembly = if options.rotate_default {
            self.state.next_reassembly(store, decomp_id)?
        } else {
            store.decomp(decomp_id).reassemblies.first().ok_or_else(|| ConfigError::NoReassembly(owner.clone()))?
        };
        self.trace.source = Some(ReplySource::Default);

        match reassembly {
            Reassembly::Template(template) => {
                let captures = match_pattern(store, &store.decomp(decomp_id).pattern, words)?.unwrap_or_default();
                let captures: Vec<Vec<String>> = captures.iter().map(|group| store.post().apply(group)).collect();
                Ok(reassemble(template, &captures)?)
            }
            Reassembly::Goto(target) => {
                let target_id = store.key_id(target).ok_or_else(|| ConfigError::UnknownGotoTarget(target.clone()))?;
                self.trace.gotos.push((owner.clone(), target.clone()));
                let (reply, source) =
                    self.try_key(target_id, words, 1)?.ok_or_else(|| ConfigError::NoDefaultReply(owner.clone()))?;
                self.trace.source = Some(source);
                Ok(reply)
            }
            Reassembly::Capability(name) => {
                if !self.options.capabilities.contains(CapabilityFlags::INVOKE) {
                    return Err(CapabilityError::Unavailable(name.clone()).into());
                }
                Ok(self.capabilities.invoke(name)?)
            }
        }
    }
}
