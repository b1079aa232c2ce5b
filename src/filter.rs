//! `filter` — pre-engine suitability pass.
//!
//! Drops words the placement engine could never use (no shared grapheme
//! with any other word, or too long for a small grid) and caps the word
//! count to what the target grid can realistically hold.

use serde::Serialize;

use crate::clue::ClueItem;

/// Word-count caps by the smaller grid dimension.
const WORD_CAPS: [(usize, usize); 4] = [(7, 8), (10, 12), (15, 20), (20, 30)];
const WORD_CAP_DEFAULT: usize = 40;

/// Words of this length or shorter survive even with zero intersections.
const FILLER_MAX_LEN: usize = 3;

/// A removed word together with the reason, as persisted in
/// `filtered.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RemovedWord {
    pub answer: String,
    pub reason: String,
}

/// Result of the suitability pass.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<ClueItem>,
    pub removed: Vec<RemovedWord>,
    pub warning: Option<String>,
}

/// Maximum word count for a grid whose smaller side is `s`.
#[must_use]
pub fn word_cap(s: usize) -> usize {
    WORD_CAPS
        .iter()
        .find(|(side, _)| s <= *side)
        .map_or(WORD_CAP_DEFAULT, |(_, cap)| *cap)
}

/// Score each word by how many *other* words share at least one grapheme
/// with it. This is the same measure the engine sorts by.
#[must_use]
pub fn intersection_counts(items: &[ClueItem]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            items
                .iter()
                .enumerate()
                .filter(|(j, other)| i != *j && item.shares_grapheme(other))
                .count()
        })
        .collect()
}

/// Run the suitability filter for a `width`×`height` target grid.
///
/// Removal rules, in order:
/// 1. Isolated words longer than [`FILLER_MAX_LEN`] (they could never
///    interlock and would dominate the grid).
/// 2. On small grids (smaller side ≤ 11), words longer than `side − 2`.
/// 3. Beyond the word cap, lowest-scoring words first (stable on ties).
#[must_use]
pub fn filter_suitable(items: &[ClueItem], width: usize, height: usize) -> FilterOutcome {
    let scores = intersection_counts(items);
    let s = width.min(height);

    let mut kept: Vec<(usize, ClueItem)> = Vec::new();
    let mut removed: Vec<RemovedWord> = Vec::new();

    for (i, item) in items.iter().enumerate() {
        if scores[i] == 0 && item.len() > FILLER_MAX_LEN {
            removed.push(RemovedWord {
                answer: item.answer.clone(),
                reason: "no shared grapheme with any other word".to_string(),
            });
        } else if s <= 11 && item.len() > s.saturating_sub(2) {
            removed.push(RemovedWord {
                answer: item.answer.clone(),
                reason: format!("too long for a {width}x{height} grid"),
            });
        } else {
            kept.push((i, item.clone()));
        }
    }

    // Cap: keep the top-scoring survivors, stable on insertion order.
    let cap = word_cap(s);
    if kept.len() > cap {
        let mut by_score = kept;
        by_score.sort_by(|(a, _), (b, _)| scores[*b].cmp(&scores[*a]));
        let mut over: Vec<(usize, ClueItem)> = by_score.split_off(cap);
        over.sort_by_key(|(i, _)| *i);
        for (_, item) in over {
            removed.push(RemovedWord {
                answer: item.answer.clone(),
                reason: format!("exceeded word cap of {cap}"),
            });
        }
        by_score.sort_by_key(|(i, _)| *i);
        kept = by_score;
    }

    let warning = if removed.is_empty() {
        None
    } else {
        Some(format!(
            "{} word(s) removed due to low crossword suitability",
            removed.len()
        ))
    };
    if let Some(w) = &warning {
        log::info!("{w}");
    }

    FilterOutcome {
        kept: kept.into_iter().map(|(_, item)| item).collect(),
        removed,
        warning,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grapheme::Locale;

    fn items(answers: &[&str]) -> Vec<ClueItem> {
        answers
            .iter()
            .map(|a| ClueItem::new(a, "", &Locale::default()).unwrap())
            .collect()
    }

    #[test]
    fn test_word_cap_steps() {
        assert_eq!(word_cap(5), 8);
        assert_eq!(word_cap(7), 8);
        assert_eq!(word_cap(8), 12);
        assert_eq!(word_cap(12), 20);
        assert_eq!(word_cap(18), 30);
        assert_eq!(word_cap(30), 40);
    }

    #[test]
    fn test_intersection_counts() {
        let list = items(&["HELLO", "HELP", "XYZ"]);
        assert_eq!(intersection_counts(&list), vec![1, 1, 0]);
    }

    #[test]
    fn test_isolated_long_word_removed() {
        let list = items(&["HELLO", "HELP", "QQQQQ"]);
        let out = filter_suitable(&list, 15, 15);
        assert_eq!(out.kept.len(), 2);
        assert_eq!(out.removed.len(), 1);
        assert_eq!(out.removed[0].answer, "QQQQQ");
        assert_eq!(
            out.warning.as_deref(),
            Some("1 word(s) removed due to low crossword suitability")
        );
    }

    #[test]
    fn test_isolated_filler_word_kept() {
        // XYZ shares nothing but is short enough to pass.
        let list = items(&["HELLO", "HELP", "XYZ"]);
        let out = filter_suitable(&list, 15, 15);
        assert_eq!(out.kept.len(), 3);
        assert!(out.warning.is_none());
    }

    #[test]
    fn test_small_grid_length_cut() {
        // side 7 → words longer than 5 graphemes cannot fit
        let list = items(&["ABCDEF", "ABC", "CAB"]);
        let out = filter_suitable(&list, 7, 9);
        assert_eq!(out.kept.len(), 2);
        assert_eq!(out.removed[0].answer, "ABCDEF");
    }

    #[test]
    fn test_cap_keeps_top_scoring_stable() {
        // 9 interlocking words on a 7-wide grid (cap 8): the lowest scorer goes.
        let mut answers = vec!["ABE", "ACE", "ADE", "AFE", "AGE", "APE", "ATE", "AXE"];
        answers.push("ZOO"); // shares the O only with itself → score 0, but short filler
        let list = items(&answers);
        let out = filter_suitable(&list, 7, 7);
        assert_eq!(out.kept.len(), 8);
        assert!(out.removed.iter().any(|r| r.answer == "ZOO"));
        // survivors keep their original relative order
        assert_eq!(out.kept[0].answer, "ABE");
    }
}
