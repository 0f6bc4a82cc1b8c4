//! Script loading.
//!
//! A script is a sequence of `tag: content` lines:
//!
//! ```text
//! initial: How do you do. Please tell me your problem.
//! pre: dont don't
//! synon: family mother father sister brother
//! key: my 2
//! decomp: $ * my *
//! reasmb: Lets discuss further why your (2) .
//! decomp: * my @family *
//! reasmb: Tell me more about your family.
//! reasmb: goto family
//! ```
//!
//! Decompositions attach to the most recently declared key and reassemblies
//! to the most recently declared decomposition. Loading is additive: every
//! source parsed by the same [`ScriptBuilder`] extends the tables built so
//! far, and a redeclared key picks up where it left off.

use crate::engine::{DecompId, KeyId, RuleStore};
use crate::error::{ConfigError, Error, Result};
use crate::{PatternToken, Reassembly, ReassemblyToken};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Accumulates script sources into a [`RuleStore`].
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    store: RuleStore,
    key: Option<KeyId>,
    decomp: Option<DecompId>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text`, naming it `source_name` in error messages.
    pub fn parse_str(&mut self, source_name: &str, text: &str) -> Result<&mut Self> {
        // A new source does not continue the previous source's open key.
        self.key = None;
        self.decomp = None;

        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            self.parse_line(trimmed).map_err(|reason| ConfigError::MalformedLine {
                source_name: source_name.to_string(),
                line: idx + 1,
                reason,
            })?;
        }

        debug!(source = source_name, keys = self.store.keys.len(), "script parsed");
        Ok(self)
    }

    /// Load a script file, or every file directly inside a directory in
    /// lexical order.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        if path.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(path)
                .map_err(|source| Error::Io { path: path.to_path_buf(), source })?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            files.sort();
            for file in files {
                self.load_file(&file)?;
            }
            Ok(self)
        } else {
            self.load_file(path)
        }
    }

    fn load_file(&mut self, path: &Path) -> Result<&mut Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io { path: path.to_path_buf(), source })?;
        self.parse_str(&path.display().to_string(), &text)
    }

    /// Finish loading. The returned store is never mutated again.
    pub fn build(self) -> RuleStore {
        self.store
    }

    fn parse_line(&mut self, line: &str) -> std::result::Result<(), String> {
        let (tag, content) = line.split_once(':').ok_or_else(|| "missing ':' after tag".to_string())?;
        let tag = tag.trim();
        let content = content.trim();
        let parts: Vec<&str> = content.split_whitespace().collect();

        match tag {
            "initial" => self.store.initials.push(content.to_string()),
            "final" => self.store.finals.push(content.to_string()),
            "follow" => self.store.follows.push(content.to_string()),
            "quit" => self.store.quits.push(content.to_string()),
            "lambda" => self.store.lambdas.push(content.to_string()),
            "pre" | "post" => {
                let (word, replacement) = parts.split_first().ok_or_else(|| format!("empty '{tag}' entry"))?;
                let replacement = replacement.iter().map(|w| w.to_string()).collect();
                let map = if tag == "pre" { &mut self.store.pre } else { &mut self.store.post };
                map.insert(word, replacement);
            }
            "synon" => {
                let (root, members) = parts.split_first().ok_or_else(|| "empty synonym class".to_string())?;
                self.store.add_synonyms(root, members);
            }
            "key" => {
                let word = parts.first().ok_or_else(|| "key without a word".to_string())?;
                let weight = match parts.get(1) {
                    Some(raw) => Some(raw.parse::<i32>().map_err(|_| format!("invalid key weight '{raw}'"))?),
                    None => None,
                };
                self.key = Some(self.store.declare_key(word, weight));
                self.decomp = None;
            }
            "decomp" => {
                let key = self.key.ok_or_else(|| "decomp before any key".to_string())?;
                let (save, tokens) = match parts.split_first() {
                    Some((&"$", rest)) => (true, rest),
                    _ => (false, parts.as_slice()),
                };
                let pattern = tokens.iter().map(|t| PatternToken::parse(t)).collect();
                self.decomp = Some(self.store.add_decomp(key, pattern, save));
            }
            "reasmb" => {
                let decomp = self.decomp.ok_or_else(|| "reasmb before any decomp".to_string())?;
                let reassembly = parse_reassembly(&parts)?;
                self.store.add_reassembly(decomp, reassembly);
            }
            other => return Err(format!("unknown tag '{other}'")),
        }

        Ok(())
    }
}

/// Resolve a reassembly's directive, if any, once at load time.
fn parse_reassembly(parts: &[&str]) -> std::result::Result<Reassembly, String> {
    match parts {
        ["goto", target] => Ok(Reassembly::Goto(target.to_lowercase())),
        ["goto", ..] => Err("goto expects exactly one key".to_string()),
        ["lambda", name] => Ok(Reassembly::Capability(name.to_string())),
        ["lambda", ..] => Err("lambda expects exactly one capability name".to_string()),
        _ => parts
            .iter()
            .map(|word| parse_reassembly_token(word))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Reassembly::Template),
    }
}

fn parse_reassembly_token(word: &str) -> std::result::Result<ReassemblyToken, String> {
    match word.strip_prefix('(').and_then(|w| w.strip_suffix(')')) {
        Some(index) => index
            .parse::<usize>()
            .map(ReassemblyToken::Capture)
            .map_err(|_| format!("invalid capture reference '{word}'")),
        None => Ok(ReassemblyToken::Literal(word.to_string())),
    }
}
