//! Error types.
//!
//! Rule-data defects are `ConfigError`s: they abort the current turn and are
//! reported, never retried. A pattern that simply does not match is not an
//! error at all.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-level error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// A defect in rule data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{source_name}:{line}: {reason}")]
    MalformedLine { source_name: String, line: usize, reason: String },

    #[error("unknown synonym root '@{0}'")]
    UnknownSynonym(String),

    #[error("goto target '{0}' is not a key")]
    UnknownGotoTarget(String),

    #[error("key '{0}' does not exist")]
    UnknownKey(String),

    #[error("capture ({index}) out of range, pattern produced {available} group(s)")]
    CaptureOutOfRange { index: usize, available: usize },

    #[error("decomposition under key '{0}' has no reassemblies")]
    NoReassembly(String),

    #[error("default key '{0}' redirected to a key that produced no reply")]
    NoDefaultReply(String),

    #[error("goto chain reached '{key}' after {depth} hops")]
    GotoCycle { key: String, depth: usize },
}

/// Failure reported by a host capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("capability '{0}' is not available")]
    Unavailable(String),

    #[error("capability '{name}' failed: {reason}")]
    Failed { name: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_name_the_offending_item() {
        let err = Error::from(ConfigError::UnknownGotoTarget("mother".into()));
        assert!(err.to_string().contains("mother"));

        let err = ConfigError::MalformedLine { source_name: "doctor.txt".into(), line: 12, reason: "missing ':'".into() };
        assert_eq!(err.to_string(), "doctor.txt:12: missing ':'");
    }

    #[test]
    fn capture_out_of_range_displays_bounds() {
        let err = ConfigError::CaptureOutOfRange { index: 3, available: 1 };
        assert!(err.to_string().contains("(3)"));
        assert!(err.to_string().contains("1 group"));
    }
}
