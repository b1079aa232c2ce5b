//! `clue` — the (answer, clue) pairs fed to the placement engine.
//!
//! Answers are cleaned ([`clean_answer_text`]), NFC-normalized, and
//! pre-segmented into grapheme clusters once at construction; everything
//! downstream (filter, engine, polyominos, serializer) works off the
//! stored cluster sequence and never re-segments.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::grapheme::{clean_answer_text, nfc, to_graphemes, Locale};
use crate::GenerateError;

/// Ceiling on answer length enforced at the request boundary. The engine
/// itself accepts longer answers and simply fails to place them.
pub const MAX_ANSWER_GRAPHEMES: usize = 20;

/// Floor on answer length; a single cell cannot interlock with anything.
pub const MIN_ANSWER_GRAPHEMES: usize = 2;

/// One normalized answer with its clue and grapheme decomposition.
///
/// Invariant: `graphemes.concat() == answer` and `answer` is NFC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueItem {
    pub answer: String,
    pub graphemes: Vec<String>,
    pub clue: String,
}

impl ClueItem {
    /// Clean and normalize `answer`, segment it, and validate the result.
    ///
    /// Braces never survive into `graphemes`: `{` and `}` are part of the
    /// punctuation set [`clean_answer_text`] strips, which keeps the
    /// brace-escape export alphabet unambiguous.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::InvalidAnswer`] when the cleaned answer has
    /// fewer than [`MIN_ANSWER_GRAPHEMES`] clusters.
    pub fn new(answer: &str, clue: &str, locale: &Locale) -> Result<Self, GenerateError> {
        let cleaned = clean_answer_text(answer);
        let graphemes = to_graphemes(&cleaned, locale);

        if graphemes.len() < MIN_ANSWER_GRAPHEMES {
            return Err(GenerateError::InvalidAnswer {
                answer: answer.to_string(),
                reason: format!("needs at least {MIN_ANSWER_GRAPHEMES} graphemes"),
            });
        }

        Ok(Self {
            answer: cleaned,
            graphemes,
            clue: nfc(clue),
        })
    }

    /// Number of grid cells this answer occupies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphemes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphemes.is_empty()
    }

    /// The distinct graphemes of the answer, for intersection tests.
    #[must_use]
    pub fn grapheme_set(&self) -> HashSet<&str> {
        self.graphemes.iter().map(String::as_str).collect()
    }

    /// Whether two answers share at least one grapheme.
    #[must_use]
    pub fn shares_grapheme(&self, other: &ClueItem) -> bool {
        let mine = self.grapheme_set();
        other.graphemes.iter().any(|g| mine.contains(g.as_str()))
    }
}

/// Parse an `answer;clue` line list into clue items.
///
/// - Empty lines are skipped.
/// - The first `;` splits answer from clue; a line without one is treated
///   as an answer with an empty clue.
/// - Answers that fail [`ClueItem::new`] are skipped with a warning.
#[must_use]
pub fn parse_from_str(contents: &str, locale: &Locale) -> Vec<ClueItem> {
    contents
        .lines()
        .filter_map(|raw_line| {
            let line = raw_line.trim();
            if line.is_empty() {
                return None;
            }
            let (answer, clue) = match line.split_once(';') {
                Some((a, c)) => (a.trim(), c.trim()),
                None => (line, ""),
            };
            match ClueItem::new(answer, clue, locale) {
                Ok(item) => Some(item),
                Err(e) => {
                    log::warn!("skipping line \"{line}\": {e}");
                    None
                }
            }
        })
        .collect()
}
