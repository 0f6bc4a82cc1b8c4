//! Host capabilities.
//!
//! The engine never talks to an entity recognizer, a sentiment service or a
//! remote function runtime directly. The host injects an implementation of
//! [`Capabilities`] when it opens a [`Session`](crate::Session), and
//! [`CapabilityFlags`] decide which of its methods the engine may call.
//!
//! Every method has a default that behaves as if the service were absent,
//! so an implementation only overrides what it actually provides.

use crate::error::CapabilityError;

bitflags::bitflags! {
    /// Which host capabilities the engine is allowed to call.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CapabilityFlags: u8 {
        /// React to detected entities before key selection.
        const ENTITIES  = 1 << 0;
        /// React to detected sentiment when memory is empty.
        const SENTIMENT = 1 << 1;
        /// Honor `lambda <name>` reassembly directives.
        const INVOKE    = 1 << 2;
    }
}

impl Default for CapabilityFlags {
    fn default() -> Self {
        CapabilityFlags::empty()
    }
}

/// An entity reported by the host's recognizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedEntity {
    /// Surface text, e.g. `"Paris"`.
    pub text: String,
    /// Entity type, e.g. `"LOCATION"`.
    pub kind: String,
}

impl DetectedEntity {
    pub fn new(text: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { text: text.into(), kind: kind.into() }
    }
}

/// Overall sentiment of an utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl Sentiment {
    /// The key word a script uses to react to this sentiment.
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
            Sentiment::Mixed => "mixed",
        }
    }
}

/// Services the host provides to the engine. All calls are synchronous.
pub trait Capabilities {
    /// Run the named capability and return its reply words.
    fn invoke(&self, name: &str) -> Result<Vec<String>, CapabilityError> {
        Err(CapabilityError::Unavailable(name.to_string()))
    }

    /// Entities found in `text`, in the order they should be considered.
    fn detect_entities(&self, _text: &str) -> Result<Vec<DetectedEntity>, CapabilityError> {
        Ok(Vec::new())
    }

    fn detect_sentiment(&self, _text: &str) -> Result<Option<Sentiment>, CapabilityError> {
        Ok(None)
    }
}

/// The host provides nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapabilities;

impl Capabilities for NoCapabilities {}

pub(crate) static NO_CAPABILITIES: NoCapabilities = NoCapabilities;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_capabilities_degrades_quietly() {
        let caps = NoCapabilities;
        assert_eq!(caps.detect_entities("I live in Paris"), Ok(Vec::new()));
        assert_eq!(caps.detect_sentiment("I am happy"), Ok(None));
        assert_eq!(caps.invoke("weather"), Err(CapabilityError::Unavailable("weather".into())));
    }

    #[test]
    fn sentiment_labels_are_lowercase_key_words() {
        assert_eq!(Sentiment::Negative.as_str(), "negative");
        assert_eq!(Sentiment::Mixed.as_str(), "mixed");
    }
}
