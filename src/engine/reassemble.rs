//! Reassembly of reply words from a template and match captures.

use super::normalize::SENTENCE_BOUNDARIES;
use crate::ReassemblyToken;
use crate::error::ConfigError;

/// Build the reply words for `template`.
///
/// A capture reference `(n)` splices in group `n`, cut at its first
/// sentence boundary so only the clause the user was in is echoed back:
///
/// ```text
/// template: [Why, do, you, say, (2), ?]
/// captures: [[well], [you, hate, me, ., anyway]]
/// output:   [Why, do, you, say, you, hate, me, ?]
/// ```
pub fn reassemble(template: &[ReassemblyToken], captures: &[Vec<String>]) -> Result<Vec<String>, ConfigError> {
    let mut output = Vec::new();

    for token in template {
        match token {
            ReassemblyToken::Literal(word) if word.is_empty() => {}
            ReassemblyToken::Literal(word) => output.push(word.clone()),
            ReassemblyToken::Capture(index) => {
                let group = index
                    .checked_sub(1)
                    .and_then(|i| captures.get(i))
                    .ok_or(ConfigError::CaptureOutOfRange { index: *index, available: captures.len() })?;
                let end = group.iter().position(|w| SENTENCE_BOUNDARIES.contains(&w.as_str())).unwrap_or(group.len());
                output.extend(group[..end].iter().cloned());
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(word: &str) -> ReassemblyToken {
        ReassemblyToken::Literal(word.to_string())
    }

    #[test]
    fn literals_and_captures_are_spliced_in_order() {
        let template = [lit("Hi"), lit("there"), ReassemblyToken::Capture(1)];
        let out = reassemble(&template, &[tokens!["big", "world"]]).unwrap();
        assert_eq!(out, tokens!["Hi", "there", "big", "world"]);
    }

    #[test]
    fn captures_are_cut_at_the_first_sentence_boundary() {
        let captures = vec![tokens!["I", "am", "tired", ".", "today"]];
        assert_eq!(reassemble(&[ReassemblyToken::Capture(1)], &captures).unwrap(), tokens!["I", "am", "tired"]);

        let captures = vec![tokens!["a", ";", "b", ",", "c"]];
        assert_eq!(reassemble(&[ReassemblyToken::Capture(1)], &captures).unwrap(), tokens!["a"]);

        let captures = vec![tokens![",", "nothing"]];
        assert!(reassemble(&[ReassemblyToken::Capture(1)], &captures).unwrap().is_empty());
    }

    #[test]
    fn question_marks_do_not_cut_captures() {
        let captures = vec![tokens!["why", "?", "because"]];
        assert_eq!(reassemble(&[ReassemblyToken::Capture(1)], &captures).unwrap(), tokens!["why", "?", "because"]);
    }

    #[test]
    fn capture_index_must_be_in_range() {
        let captures = vec![tokens!["x"]];
        assert_eq!(
            reassemble(&[ReassemblyToken::Capture(2)], &captures),
            Err(ConfigError::CaptureOutOfRange { index: 2, available: 1 })
        );
        assert_eq!(
            reassemble(&[ReassemblyToken::Capture(0)], &captures),
            Err(ConfigError::CaptureOutOfRange { index: 0, available: 1 })
        );
    }

    #[test]
    fn empty_literals_are_skipped() {
        let out = reassemble(&[lit(""), lit("ok"), lit("")], &[]).unwrap();
        assert_eq!(out, tokens!["ok"]);
    }
}
