//! `engine` — seeded, deterministic crossword placement.
//!
//! Words are sorted by connectivity, the first is centered, and each
//! subsequent word is tried at every grapheme intersection with the words
//! already on the grid. A placement must satisfy the bounds, start-cell,
//! occupancy, side-adjacency, and word-end rules before it commits. When
//! the fill ratio comes out low the whole search reruns with a shuffled
//! order and randomized tie-breaking, keeping the best attempt.
//!
//! For a fixed `(clues, width, height, seed)` the output is bit-identical
//! across runs; every random draw goes through one `StdRng` seeded from
//! the caller's value.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::clue::ClueItem;
use crate::filter::intersection_counts;
use crate::grapheme::{compare_graphemes, Locale};
use crate::grid::{Direction, Grid, Placement, StartRecord};
use crate::GenerateError;

/// Retries granted to a low-fill first attempt.
pub const DEFAULT_RETRY_ATTEMPTS: usize = 20;

/// Fill ratio below which the engine keeps retrying.
const RETRY_FILL_THRESHOLD: f64 = 0.6;

/// Fill ratio below which the final result carries a warning.
const WARN_FILL_THRESHOLD: f64 = 0.4;

/// Splitmix increment; XORed into the base seed per retry so every attempt
/// gets a distinct, reproducible stream.
const RESEED_INCREMENT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Placement counts for one generation run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PuzzleStats {
    pub requested: usize,
    pub placed: usize,
    pub unplaced: usize,
    #[serde(rename = "fillRatio")]
    pub fill_ratio: f64,
}

/// Final cropped grid plus the placement record of every requested word.
///
/// `placements` lists placed words first (ids 1..=placed, in placement
/// order), then one `placed: false` record per word that did not fit;
/// those items are repeated in `unplaced` for convenience.
#[derive(Debug, Clone)]
pub struct PuzzleResult {
    pub grid: Grid,
    pub placements: Vec<Placement>,
    pub unplaced: Vec<ClueItem>,
    pub width: usize,
    pub height: usize,
    pub warning: Option<String>,
    pub stats: PuzzleStats,
}

/// A fully specified placement for manual-advanced mode.
#[derive(Debug, Clone)]
pub struct ManualPlacement {
    pub answer: String,
    pub clue: String,
    pub row: usize,
    pub col: usize,
    pub direction: Direction,
}

/// Search state for a single attempt.
struct Attempt {
    grid: Grid,
    placements: Vec<Placement>,
    starts: Vec<StartRecord>,
    next_word_id: usize,
    unplaced: Vec<ClueItem>,
}

/// A prospective placement before validation. Coordinates are signed:
/// intersection alignment can push a start off the grid, and validation
/// rejects that case.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: i64,
    y: i64,
    direction: Direction,
}

impl Attempt {
    fn new(width: usize, height: usize) -> Self {
        Self {
            grid: Grid::new(width, height),
            placements: Vec::new(),
            starts: Vec::new(),
            next_word_id: 1,
            unplaced: Vec::new(),
        }
    }

    fn fill_ratio(&self, requested: usize) -> f64 {
        if requested == 0 {
            1.0
        } else {
            self.placements.len() as f64 / requested as f64
        }
    }

    /// Check every placement rule of the automatic mode.
    fn is_valid(&self, item: &ClueItem, cand: Candidate) -> bool {
        let len = item.len() as i64;
        let (end_x, end_y) = cand.direction.offset(cand.x, cand.y, len - 1);

        // Bounds.
        if !self.grid.in_bounds(cand.x, cand.y) || !self.grid.in_bounds(end_x, end_y) {
            return false;
        }

        // Start-cell collision: sharing a start cell requires orthogonal
        // directions and an identical first grapheme.
        let first = &item.graphemes[0];
        for start in &self.starts {
            if start.x as i64 == cand.x && start.y as i64 == cand.y {
                if start.direction == cand.direction
                    || !compare_graphemes(&start.first_grapheme, first)
                {
                    return false;
                }
            }
        }

        // Per-cell occupancy plus strict side-adjacency on fresh cells.
        for (i, g) in item.graphemes.iter().enumerate() {
            let (cx, cy) = cand.direction.offset(cand.x, cand.y, i as i64);
            match self.grid.grapheme_at(cx, cy) {
                Some(existing) => {
                    if !compare_graphemes(existing, g) {
                        return false;
                    }
                }
                None => {
                    let ((ax, ay), (bx, by)) = match cand.direction {
                        Direction::Across => ((cx, cy - 1), (cx, cy + 1)),
                        Direction::Down => ((cx - 1, cy), (cx + 1, cy)),
                    };
                    if !self.grid.is_free(ax, ay) || !self.grid.is_free(bx, by) {
                        return false;
                    }
                }
            }
        }

        // Word-ends clearance along the word axis.
        let (before_x, before_y) = cand.direction.offset(cand.x, cand.y, -1);
        let (after_x, after_y) = cand.direction.offset(cand.x, cand.y, len);
        self.grid.is_free(before_x, before_y) && self.grid.is_free(after_x, after_y)
    }

    /// Write a validated placement into the grid and the record lists.
    fn commit(&mut self, item: ClueItem, cand: Candidate) {
        let word_id = self.next_word_id;
        self.next_word_id += 1;

        let (x, y) = (cand.x as usize, cand.y as usize);
        for (i, g) in item.graphemes.iter().enumerate() {
            let (cx, cy) = cand.direction.offset(cand.x, cand.y, i as i64);
            let cell = self.grid.cell_mut(cx as usize, cy as usize);
            if cell.grapheme.is_none() {
                cell.grapheme = Some(g.clone());
            }
            cell.word_ids.push(word_id);
        }
        self.starts.push(StartRecord {
            x,
            y,
            direction: cand.direction,
            first_grapheme: item.graphemes[0].clone(),
        });
        self.placements.push(Placement {
            word_id,
            item,
            x,
            y,
            direction: cand.direction,
            placed: true,
        });
    }

    /// Centered candidates for the first word: ACROSS on the middle row,
    /// DOWN mirrored onto the middle column.
    fn first_word_candidates(&self, len: i64) -> [Candidate; 2] {
        let w = self.grid.width() as i64;
        let h = self.grid.height() as i64;
        [
            Candidate {
                x: (w - len).div_euclid(2),
                y: h / 2,
                direction: Direction::Across,
            },
            Candidate {
                x: w / 2,
                y: (h - len).div_euclid(2),
                direction: Direction::Down,
            },
        ]
    }

    /// Every intersection-aligned candidate against the placed words, in
    /// (placed word, i ascending, j ascending) order.
    fn lookahead_candidates(&self, item: &ClueItem) -> Vec<Candidate> {
        let mut candidates = Vec::new();
        for placed in &self.placements {
            let pairs =
                crate::grapheme::find_common_graphemes(&item.graphemes, &placed.item.graphemes);
            for (i, j) in pairs {
                let (i, j) = (i as i64, j as i64);
                let cand = match placed.direction {
                    Direction::Across => Candidate {
                        x: placed.x as i64 + j,
                        y: placed.y as i64 - i,
                        direction: Direction::Down,
                    },
                    Direction::Down => Candidate {
                        x: placed.x as i64 - i,
                        y: placed.y as i64 + j,
                        direction: Direction::Across,
                    },
                };
                candidates.push(cand);
            }
        }
        candidates
    }
}

/// Manhattan-style distance from the candidate's midpoint to the grid
/// center; the default tie-breaker prefers central placements.
fn dist_to_center(cand: Candidate, len: usize, width: usize, height: usize) -> f64 {
    let half_len = len as f64 / 2.0;
    let (mid_x, mid_y) = match cand.direction {
        Direction::Across => (cand.x as f64 + half_len, cand.y as f64),
        Direction::Down => (cand.x as f64, cand.y as f64 + half_len),
    };
    (mid_x - width as f64 / 2.0).abs() + (mid_y - height as f64 / 2.0).abs()
}

/// Run one full placement pass over `order`.
///
/// `randomized` switches the tie-breakers from deterministic (first
/// orientation / closest to center) to PRNG-ranked, which is what the
/// retry loop uses to explore different layouts.
fn run_attempt(
    order: &[ClueItem],
    width: usize,
    height: usize,
    rng: &mut StdRng,
    randomized: bool,
) -> Attempt {
    let mut attempt = Attempt::new(width, height);

    for (idx, item) in order.iter().enumerate() {
        let remaining = &order[idx + 1..];
        // Lookahead score: identical for every candidate of this word, but
        // kept as the primary key so the randomized tie-breaker drops in
        // without touching the selection logic.
        let score = remaining
            .iter()
            .filter(|other| item.shares_grapheme(other))
            .count();

        let is_first = attempt.placements.is_empty();
        let candidates = if is_first {
            attempt.first_word_candidates(item.len() as i64).to_vec()
        } else {
            attempt.lookahead_candidates(item)
        };

        let mut best: Option<(usize, f64, u32, Candidate)> = None;
        for cand in candidates {
            if !attempt.is_valid(item, cand) {
                continue;
            }
            let rank = if randomized { rng.gen::<u32>() } else { 0 };
            // First word ties break on orientation order (ACROSS first),
            // not distance; the strict `<` below keeps the earlier winner.
            let dist = if is_first {
                0.0
            } else {
                dist_to_center(cand, item.len(), width, height)
            };
            let better = match &best {
                None => true,
                Some((best_score, best_dist, best_rank, _)) => {
                    if score != *best_score {
                        score > *best_score
                    } else if randomized {
                        rank > *best_rank
                    } else {
                        dist < *best_dist
                    }
                }
            };
            if better {
                best = Some((score, dist, rank, cand));
            }
        }

        match best {
            Some((_, _, _, cand)) => {
                log::debug!(
                    "placing \"{}\" at ({}, {}) {:?}",
                    item.answer,
                    cand.x,
                    cand.y,
                    cand.direction
                );
                attempt.commit(item.clone(), cand);
            }
            None => attempt.unplaced.push(item.clone()),
        }
    }

    attempt
}

/// Sort clues for placement: most-connected first, longer first on ties.
fn sort_for_placement(clues: &[ClueItem]) -> Vec<ClueItem> {
    let scores = intersection_counts(clues);
    let mut indexed: Vec<(usize, &ClueItem)> = clues.iter().enumerate().collect();
    indexed.sort_by(|(i, a), (j, b)| {
        scores[*j]
            .cmp(&scores[*i])
            .then_with(|| b.len().cmp(&a.len()))
    });
    indexed.into_iter().map(|(_, item)| item.clone()).collect()
}

/// Seed fallback when the caller provides none.
fn derive_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos() as u64)
}

/// Crop to the tight bounding box of the placed cells, shifting every
/// placement and re-deriving the cell matrix from the shifted placements.
/// With nothing placed the original empty grid is kept.
fn crop(attempt: &Attempt, width: usize, height: usize) -> (Grid, Vec<Placement>) {
    if attempt.placements.is_empty() {
        return (Grid::new(width, height), Vec::new());
    }

    let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
    let (mut max_x, mut max_y) = (0usize, 0usize);
    for p in &attempt.placements {
        for (cx, cy, _) in p.cells() {
            min_x = min_x.min(cx);
            min_y = min_y.min(cy);
            max_x = max_x.max(cx);
            max_y = max_y.max(cy);
        }
    }

    let mut shifted = attempt.placements.clone();
    for p in &mut shifted {
        p.x -= min_x;
        p.y -= min_y;
    }

    let mut grid = Grid::new(max_x - min_x + 1, max_y - min_y + 1);
    for p in &shifted {
        for (cx, cy, g) in p.cells() {
            let cell = grid.cell_mut(cx, cy);
            if cell.grapheme.is_none() {
                cell.grapheme = Some(g.to_string());
            }
            cell.word_ids.push(p.word_id);
        }
    }

    (grid, shifted)
}

/// Assemble the public result from the winning attempt.
fn finish(attempt: Attempt, width: usize, height: usize, warning: Option<String>) -> PuzzleResult {
    let requested = attempt.placements.len() + attempt.unplaced.len();
    let placed = attempt.placements.len();
    let fill_ratio = attempt.fill_ratio(requested);

    let (grid, mut placements) = crop(&attempt, width, height);
    let (out_width, out_height) = if placements.is_empty() {
        (width, height)
    } else {
        (grid.width(), grid.height())
    };

    let mut next_id = placed + 1;
    for item in &attempt.unplaced {
        placements.push(Placement {
            word_id: next_id,
            item: item.clone(),
            x: 0,
            y: 0,
            direction: Direction::Across,
            placed: false,
        });
        next_id += 1;
    }

    PuzzleResult {
        grid,
        placements,
        unplaced: attempt.unplaced,
        width: out_width,
        height: out_height,
        warning,
        stats: PuzzleStats {
            requested,
            placed,
            unplaced: requested - placed,
            fill_ratio,
        },
    }
}

/// Assemble the result for a hand-authored layout. Unlike [`finish`],
/// nothing is cropped or shifted: the caller owns the coordinates, so the
/// grid keeps the requested dimensions and every placement stays where it
/// was authored.
fn finish_manual(attempt: Attempt, width: usize, height: usize) -> PuzzleResult {
    let placed = attempt.placements.len();
    let fill_ratio = attempt.fill_ratio(placed);
    PuzzleResult {
        grid: attempt.grid,
        placements: attempt.placements,
        unplaced: Vec::new(),
        width,
        height,
        warning: None,
        stats: PuzzleStats {
            requested: placed,
            placed,
            unplaced: 0,
            fill_ratio,
        },
    }
}

/// Generate a crossword from pre-filtered clues.
///
/// Deterministic in `(clues, width, height, seed)`; a missing seed is
/// derived from the wall clock. The first attempt uses the connectivity
/// ordering with deterministic tie-breaks; if it places fewer than 60% of
/// the words, up to `retry_attempts` shuffled attempts run and the one
/// placing the most words wins.
///
/// # Errors
///
/// Returns [`GenerateError::InvalidGridSize`] for a zero-area grid.
pub fn generate_puzzle(
    clues: &[ClueItem],
    width: usize,
    height: usize,
    seed: Option<u64>,
    retry_attempts: usize,
) -> Result<PuzzleResult, GenerateError> {
    if width == 0 || height == 0 {
        return Err(GenerateError::InvalidGridSize { width, height });
    }

    let seed = seed.unwrap_or_else(derive_seed);
    let order = sort_for_placement(clues);
    let requested = order.len();

    let mut rng = StdRng::seed_from_u64(seed);
    let mut best = run_attempt(&order, width, height, &mut rng, false);
    log::info!(
        "attempt 0 placed {}/{} words (seed {seed})",
        best.placements.len(),
        requested
    );

    let mut retry = 0;
    while best.fill_ratio(requested) < RETRY_FILL_THRESHOLD && retry < retry_attempts {
        retry += 1;
        let attempt_seed = seed ^ (retry as u64).wrapping_mul(RESEED_INCREMENT);
        let mut retry_rng = StdRng::seed_from_u64(attempt_seed);

        let mut shuffled = order.clone();
        shuffled.shuffle(&mut retry_rng);

        let attempt = run_attempt(&shuffled, width, height, &mut retry_rng, true);
        log::debug!(
            "retry {retry} placed {}/{} words",
            attempt.placements.len(),
            requested
        );
        if attempt.placements.len() > best.placements.len() {
            best = attempt;
        }
    }

    let fill = best.fill_ratio(requested);
    let warning = if requested > 0 && fill < WARN_FILL_THRESHOLD {
        Some(format!(
            "Grid too constrained: only {}/{} words placed ({}%).",
            best.placements.len(),
            requested,
            (fill * 100.0).round() as usize
        ))
    } else {
        None
    };

    Ok(finish(best, width, height, warning))
}

/// Validator-mode entry point: the caller authors the full layout.
///
/// Only bounds and per-cell grapheme agreement are checked; the
/// side-adjacency and word-end rules do not apply to hand-made layouts.
/// Validation stops at the first invalid placement.
///
/// # Errors
///
/// Returns [`GenerateError::PlacementValidation`] carrying
/// `(index, word, message)` for the offending placement, or
/// [`GenerateError::InvalidAnswer`] when an answer fails cleaning.
pub fn generate_manual_puzzle(
    words: &[ManualPlacement],
    width: usize,
    height: usize,
    locale: &Locale,
) -> Result<PuzzleResult, GenerateError> {
    if width == 0 || height == 0 {
        return Err(GenerateError::InvalidGridSize { width, height });
    }

    let mut attempt = Attempt::new(width, height);

    for (index, mp) in words.iter().enumerate() {
        let item = ClueItem::new(&mp.answer, &mp.clue, locale)?;
        let cand = Candidate {
            x: mp.col as i64,
            y: mp.row as i64,
            direction: mp.direction,
        };

        let reject = |message: String| {
            GenerateError::PlacementValidation(vec![(index, mp.answer.clone(), message)])
        };

        let (end_x, end_y) = cand
            .direction
            .offset(cand.x, cand.y, item.len() as i64 - 1);
        if !attempt.grid.in_bounds(cand.x, cand.y) || !attempt.grid.in_bounds(end_x, end_y) {
            return Err(reject(format!(
                "does not fit at row {}, col {} on a {width}x{height} grid",
                mp.row, mp.col
            )));
        }
        for (i, g) in item.graphemes.iter().enumerate() {
            let (cx, cy) = cand.direction.offset(cand.x, cand.y, i as i64);
            if let Some(existing) = attempt.grid.grapheme_at(cx, cy) {
                if !compare_graphemes(existing, g) {
                    return Err(reject(format!(
                        "grapheme mismatch at ({cx}, {cy}): \"{existing}\" vs \"{g}\""
                    )));
                }
            }
        }

        attempt.commit(item, cand);
    }

    Ok(finish_manual(attempt, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(answers: &[&str]) -> Vec<ClueItem> {
        answers
            .iter()
            .map(|a| ClueItem::new(a, "clue", &Locale::default()).unwrap())
            .collect()
    }

    fn placed<'a>(result: &'a PuzzleResult) -> Vec<&'a Placement> {
        result.placements.iter().filter(|p| p.placed).collect()
    }

    #[test]
    fn test_single_word_centered_across() {
        let clues = items(&["HELLO"]);
        let result = generate_puzzle(&clues, 15, 15, Some(42), 20).unwrap();

        let ps = placed(&result);
        assert_eq!(ps.len(), 1);
        assert_eq!(ps[0].word_id, 1);
        assert_eq!(ps[0].direction, Direction::Across);
        // Cropped to the word's own bounding box.
        assert_eq!((result.width, result.height), (5, 1));
        assert_eq!(result.grid.grapheme_at(0, 0), Some("H"));
        assert_eq!(result.grid.grapheme_at(4, 0), Some("O"));
        assert!((result.stats.fill_ratio - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_two_words_cross_on_shared_grapheme() {
        let clues = items(&["HELLO", "HELP"]);
        let result = generate_puzzle(&clues, 15, 15, Some(42), 20).unwrap();

        let ps = placed(&result);
        assert_eq!(ps.len(), 2);
        assert_ne!(ps[0].direction, ps[1].direction);

        // Exactly one cell is shared, and both words agree on it.
        let mut shared = 0;
        for y in 0..result.height {
            for x in 0..result.width {
                let cell = result.grid.cell(x, y);
                if cell.word_ids.len() == 2 {
                    shared += 1;
                    assert!(cell.grapheme.is_some());
                }
            }
        }
        assert_eq!(shared, 1);
    }

    #[test]
    fn test_disconnected_word_stays_unplaced() {
        let clues = items(&["HELLO", "XYZ"]);
        let result = generate_puzzle(&clues, 15, 15, Some(42), 20).unwrap();

        assert_eq!(result.stats.placed, 1);
        assert_eq!(result.stats.unplaced, 1);
        assert_eq!(result.unplaced[0].answer, "XYZ");
        // The unplaced word still shows up in the placement list.
        let record = result.placements.iter().find(|p| !p.placed).unwrap();
        assert_eq!(record.item.answer, "XYZ");
    }

    #[test]
    fn test_oversize_word_never_placed() {
        let clues = items(&["SUPERCALIFRAGILISTICEXPIALIDOCIOUS"]);
        let result = generate_puzzle(&clues, 10, 10, Some(1), 20).unwrap();

        assert_eq!(result.stats.placed, 0);
        assert_eq!(result.stats.unplaced, 1);
        // Nothing placed: grid keeps its requested dimensions.
        assert_eq!((result.width, result.height), (10, 10));
        assert_eq!(result.grid.filled_count(), 0);
    }

    #[test]
    fn test_deterministic_rerun() {
        let clues = items(&["CROSSWORD", "COMPUTER", "WORD"]);
        let a = generate_puzzle(&clues, 20, 20, Some(12345), 20).unwrap();
        let b = generate_puzzle(&clues, 20, 20, Some(12345), 20).unwrap();

        assert_eq!(a.grid, b.grid);
        assert_eq!(a.placements, b.placements);
        assert_eq!((a.width, a.height), (b.width, b.height));
    }

    #[test]
    fn test_crop_is_tight() {
        let clues = items(&["CROSSWORD", "COMPUTER", "WORD"]);
        let result = generate_puzzle(&clues, 20, 20, Some(7), 20).unwrap();

        let ps = placed(&result);
        assert!(!ps.is_empty());
        assert_eq!(ps.iter().map(|p| p.x).min().unwrap(), 0);
        assert_eq!(ps.iter().map(|p| p.y).min().unwrap(), 0);
        let max_x = ps.iter().map(|p| p.end().0).max().unwrap();
        let max_y = ps.iter().map(|p| p.end().1).max().unwrap();
        assert_eq!(max_x as usize, result.width - 1);
        assert_eq!(max_y as usize, result.height - 1);
    }

    #[test]
    fn test_cell_consistency_invariant() {
        let clues = items(&["STREAM", "MASTER", "TERSE", "REST", "SEAM"]);
        let result = generate_puzzle(&clues, 15, 15, Some(99), 20).unwrap();

        for p in result.placements.iter().filter(|p| p.placed) {
            for (x, y, g) in p.cells() {
                assert_eq!(result.grid.grapheme_at(x as i64, y as i64), Some(g));
            }
        }
    }

    #[test]
    fn test_no_parallel_touch_invariant() {
        let clues = items(&["STREAM", "MASTER", "TERSE", "REST", "SEAM"]);
        let result = generate_puzzle(&clues, 15, 15, Some(99), 20).unwrap();

        for p in result.placements.iter().filter(|p| p.placed) {
            for (x, y, _) in p.cells() {
                let cell = result.grid.cell(x, y);
                if cell.word_ids.len() != 1 {
                    continue;
                }
                let (x, y) = (x as i64, y as i64);
                let (n1, n2) = match p.direction {
                    Direction::Across => ((x, y - 1), (x, y + 1)),
                    Direction::Down => ((x - 1, y), (x + 1, y)),
                };
                assert!(result.grid.is_free(n1.0, n1.1));
                assert!(result.grid.is_free(n2.0, n2.1));
            }
        }
    }

    #[test]
    fn test_no_elongation_invariant() {
        let clues = items(&["STREAM", "MASTER", "TERSE", "REST", "SEAM"]);
        let result = generate_puzzle(&clues, 15, 15, Some(99), 20).unwrap();

        for p in result.placements.iter().filter(|p| p.placed) {
            let (bx, by) = p.direction.offset(p.x as i64, p.y as i64, -1);
            let (ax, ay) = p
                .direction
                .offset(p.x as i64, p.y as i64, p.item.len() as i64);
            assert!(result.grid.is_free(bx, by));
            assert!(result.grid.is_free(ax, ay));
        }
    }

    #[test]
    fn test_word_ids_are_monotonic() {
        let clues = items(&["STREAM", "MASTER", "TERSE", "REST"]);
        let result = generate_puzzle(&clues, 15, 15, Some(3), 20).unwrap();

        for (i, p) in result.placements.iter().enumerate() {
            assert_eq!(p.word_id, i + 1);
        }
    }

    #[test]
    fn test_empty_input_yields_empty_puzzle() {
        let result = generate_puzzle(&[], 12, 9, Some(5), 20).unwrap();
        assert_eq!(result.stats.requested, 0);
        assert_eq!((result.width, result.height), (12, 9));
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_manual_puzzle_accepts_touching_words() {
        // Side-by-side parallel words are fine in validator mode.
        let words = vec![
            ManualPlacement {
                answer: "CAT".into(),
                clue: "pet".into(),
                row: 0,
                col: 0,
                direction: Direction::Across,
            },
            ManualPlacement {
                answer: "DOG".into(),
                clue: "pet".into(),
                row: 1,
                col: 0,
                direction: Direction::Across,
            },
        ];
        let result = generate_manual_puzzle(&words, 5, 5, &Locale::default()).unwrap();
        assert_eq!(result.stats.placed, 2);
        assert!(result.unplaced.is_empty());
    }

    #[test]
    fn test_manual_puzzle_preserves_authored_coordinates() {
        // Words placed away from the origin must come back exactly where
        // the caller put them, on a grid of the requested dimensions.
        let words = vec![
            ManualPlacement {
                answer: "CAT".into(),
                clue: "pet".into(),
                row: 3,
                col: 4,
                direction: Direction::Across,
            },
            ManualPlacement {
                answer: "MAP".into(),
                clue: "chart".into(),
                row: 2,
                col: 5,
                direction: Direction::Down,
            },
        ];
        let result = generate_manual_puzzle(&words, 9, 8, &Locale::default()).unwrap();

        assert_eq!((result.width, result.height), (9, 8));
        assert_eq!((result.placements[0].x, result.placements[0].y), (4, 3));
        assert_eq!((result.placements[1].x, result.placements[1].y), (5, 2));
        // The two words cross on the shared A.
        assert_eq!(result.grid.grapheme_at(5, 3), Some("A"));
        assert_eq!(result.grid.cell(5, 3).word_ids.len(), 2);
        assert_eq!(result.grid.filled_count(), 5);
    }

    #[test]
    fn test_manual_puzzle_rejects_mismatch() {
        let words = vec![
            ManualPlacement {
                answer: "CAT".into(),
                clue: "".into(),
                row: 0,
                col: 0,
                direction: Direction::Across,
            },
            ManualPlacement {
                answer: "DOG".into(),
                clue: "".into(),
                row: 0,
                col: 0,
                direction: Direction::Down,
            },
        ];
        let err = generate_manual_puzzle(&words, 5, 5, &Locale::default()).unwrap_err();
        match err {
            GenerateError::PlacementValidation(failures) => {
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].0, 1);
                assert_eq!(failures[0].1, "DOG");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_manual_puzzle_rejects_out_of_bounds() {
        let words = vec![ManualPlacement {
            answer: "LONGWORD".into(),
            clue: "".into(),
            row: 0,
            col: 3,
            direction: Direction::Across,
        }];
        let err = generate_manual_puzzle(&words, 8, 8, &Locale::default()).unwrap_err();
        assert!(matches!(err, GenerateError::PlacementValidation(_)));
    }

    #[test]
    fn test_start_cell_collision_rules() {
        // SLOW and SOON both start with S; a down word starting on the
        // across word's start cell is legal only with matching first
        // graphemes, which the lookahead produces naturally here.
        let clues = items(&["SLOW", "SOON"]);
        let result = generate_puzzle(&clues, 11, 11, Some(8), 20).unwrap();
        let ps = placed(&result);
        if ps.len() == 2 {
            let (a, b) = (ps[0], ps[1]);
            if (a.x, a.y) == (b.x, b.y) {
                assert_ne!(a.direction, b.direction);
                assert_eq!(a.item.graphemes[0], b.item.graphemes[0]);
            }
        }
    }
}
