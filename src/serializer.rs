//! `serializer` — shapes a finished puzzle for export.
//!
//! Produces the `application/x-www-form-urlencoded` payload consumed by
//! the puzzle editor (`ans{n}`/`question{n}` pairs, renumbered from 1
//! over the exported subset), a display grid of optional graphemes, and
//! per-word metadata. Multi-codepoint graphemes in answers are
//! brace-wrapped so the consumer can re-tokenize without a segmenter.

use serde::Serialize;

use crate::engine::{PuzzleResult, PuzzleStats};
use crate::grapheme::encode_grapheme;
use crate::grid::{Direction, Placement};

/// Export metadata for one word.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordSummary {
    /// 1-based number over the exported subset.
    pub number: usize,
    pub answer: String,
    pub clue: String,
    pub start_x: usize,
    pub start_y: usize,
    pub direction: Direction,
    pub grapheme_count: usize,
    pub placed: bool,
}

/// The full export bundle for one puzzle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedPuzzle {
    pub payload: String,
    pub grid: Vec<Vec<Option<String>>>,
    pub placed: Vec<WordSummary>,
    pub unplaced: Vec<WordSummary>,
    pub stats: PuzzleStats,
}

/// An answer in the brace-escape export alphabet.
fn encoded_answer(p: &Placement) -> String {
    p.item.graphemes.iter().map(|g| encode_grapheme(g)).collect()
}

/// Serialize a puzzle for export.
///
/// With `remove_unplaced` set, unplaced words are dropped from the
/// payload (and the flag itself is recorded in it); they always remain
/// visible in the `unplaced` metadata list.
#[must_use]
pub fn serialize_puzzle(result: &PuzzleResult, remove_unplaced: bool) -> SerializedPuzzle {
    let exported: Vec<&Placement> = result
        .placements
        .iter()
        .filter(|p| p.placed || !remove_unplaced)
        .collect();

    let mut payload = form_urlencoded::Serializer::new(String::new());
    for (n, p) in exported.iter().enumerate() {
        payload.append_pair(&format!("ans{}", n + 1), &encoded_answer(p));
        payload.append_pair(&format!("question{}", n + 1), &p.item.clue);
    }
    if remove_unplaced {
        payload.append_pair("removeUnplacedWords", "true");
    }

    let grid = (0..result.height)
        .map(|y| {
            (0..result.width)
                .map(|x| result.grid.cell(x, y).grapheme.clone())
                .collect()
        })
        .collect();

    let mut placed = Vec::new();
    let mut unplaced = Vec::new();
    for p in &result.placements {
        let summary = WordSummary {
            number: placed.len() + unplaced.len() + 1,
            answer: p.item.answer.clone(),
            clue: p.item.clue.clone(),
            start_x: p.x,
            start_y: p.y,
            direction: p.direction,
            grapheme_count: p.item.len(),
            placed: p.placed,
        };
        if p.placed {
            placed.push(summary);
        } else {
            unplaced.push(summary);
        }
    }

    SerializedPuzzle {
        payload: payload.finish(),
        grid,
        placed,
        unplaced,
        stats: result.stats,
    }
}
