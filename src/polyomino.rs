//! `polyomino` — decompose a finished crossword into jigsaw pieces.
//!
//! The filled cells are partitioned into 4-connected polyominoes by a
//! greedy BFS that starts from the most intersected cells, optionally
//! after carving out one privileged plus-shaped pentomino. Pieces that
//! come out below the minimum size are merged into their smallest legal
//! neighbor over a bounded number of passes; anything still out of
//! bounds afterwards is reported in the advisory `issues` list rather
//! than rejected.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use crate::grid::Placement;

/// Up, right, down, left: the order of the per-cell `node` slots.
const NEIGHBOR_OFFSETS: [(i64, i64); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Sentinel for "no filled cell in that direction".
const NO_NEIGHBOR: i64 = -1;

/// Merge passes before giving up on undersized pieces.
const MERGE_PASSES: usize = 10;

/// Partition tuning knobs.
#[derive(Debug, Clone, Copy)]
pub struct PolyominoConfig {
    pub min_piece_size: usize,
    pub max_piece_size: usize,
    pub allow_single_cross_pentomino: bool,
}

impl Default for PolyominoConfig {
    fn default() -> Self {
        Self {
            min_piece_size: 2,
            max_piece_size: 4,
            allow_single_cross_pentomino: false,
        }
    }
}

/// One cell of a piece, relative to the piece anchor.
#[derive(Debug, Clone, Serialize)]
pub struct PieceCell {
    #[serde(rename = "relX")]
    pub rel_x: usize,
    #[serde(rename = "relY")]
    pub rel_y: usize,
    pub letter: String,
    #[serde(rename = "blockId")]
    pub block_id: usize,
    /// Block ids of the filled 4-neighbors (up, right, down, left), with
    /// [`NO_NEIGHBOR`] where the grid is empty or ends.
    pub node: [i64; 4],
}

/// A 4-connected piece. The anchor is the top-left corner of the piece's
/// bounding box (keeping every `rel_x`/`rel_y` non-negative), so
/// `(correct_x, correct_y)` is where the piece sits in the solved puzzle.
#[derive(Debug, Clone, Serialize)]
pub struct Piece {
    pub id: String,
    #[serde(rename = "correctX")]
    pub correct_x: usize,
    #[serde(rename = "correctY")]
    pub correct_y: usize,
    pub cells: Vec<PieceCell>,
}

impl Piece {
    #[must_use]
    pub fn size(&self) -> usize {
        self.cells.len()
    }
}

/// The full jigsaw decomposition of one puzzle.
#[derive(Debug, Clone, Serialize)]
pub struct PolyominoPuzzle {
    pub theme: String,
    #[serde(rename = "gridWidth")]
    pub grid_width: usize,
    #[serde(rename = "gridHeight")]
    pub grid_height: usize,
    pub pieces: Vec<Piece>,
    /// Advisory size-rule violations; the partition is returned regardless.
    #[serde(skip)]
    pub issues: Vec<String>,
}

/// Per-cell registry entry built from the placements.
struct CellInfo {
    letter: String,
    block_id: usize,
    word_count: usize,
}

/// Partition the placed cells of a puzzle into polyomino pieces.
#[must_use]
pub fn generate_polyomino(
    placements: &[Placement],
    width: usize,
    height: usize,
    theme: &str,
    config: &PolyominoConfig,
) -> PolyominoPuzzle {
    // Cell registry: block ids in first-sighting order, word_count counting
    // every placement that covers the cell.
    let mut registry: HashMap<(i64, i64), CellInfo> = HashMap::new();
    let mut sighting_order: Vec<(i64, i64)> = Vec::new();
    for p in placements.iter().filter(|p| p.placed) {
        for (x, y, g) in p.cells() {
            let key = (x as i64, y as i64);
            match registry.get_mut(&key) {
                Some(info) => info.word_count += 1,
                None => {
                    registry.insert(
                        key,
                        CellInfo {
                            letter: g.to_string(),
                            block_id: sighting_order.len(),
                            word_count: 1,
                        },
                    );
                    sighting_order.push(key);
                }
            }
        }
    }

    // Seed ordering: most intersected cells first, then top-to-bottom,
    // left-to-right.
    let mut seeds = sighting_order.clone();
    seeds.sort_by_key(|&(x, y)| (std::cmp::Reverse(registry[&(x, y)].word_count), y, x));

    let mut assignment: HashMap<(i64, i64), usize> = HashMap::new();
    let mut groups: Vec<Vec<(i64, i64)>> = Vec::new();

    // Optional plus pentomino: the first intersection whose four neighbors
    // are all filled becomes a fixed 5-cell piece.
    let mut cross_group: Option<usize> = None;
    if config.allow_single_cross_pentomino {
        for &(x, y) in seeds.iter().take_while(|&&(x, y)| registry[&(x, y)].word_count >= 2) {
            let arms: Vec<(i64, i64)> = NEIGHBOR_OFFSETS
                .iter()
                .map(|&(dx, dy)| (x + dx, y + dy))
                .collect();
            let all_free = arms
                .iter()
                .all(|k| registry.contains_key(k) && !assignment.contains_key(k));
            if all_free {
                let gi = groups.len();
                let mut cells = vec![(x, y)];
                cells.extend(arms);
                for &c in &cells {
                    assignment.insert(c, gi);
                }
                groups.push(cells);
                cross_group = Some(gi);
                break;
            }
        }
    }

    // Greedy BFS partition of everything left.
    for &seed in &seeds {
        if assignment.contains_key(&seed) {
            continue;
        }
        let gi = groups.len();
        let mut cells: Vec<(i64, i64)> = Vec::new();
        let mut queue: VecDeque<(i64, i64)> = VecDeque::from([seed]);
        while let Some((x, y)) = queue.pop_front() {
            if cells.len() >= config.max_piece_size || assignment.contains_key(&(x, y)) {
                continue;
            }
            assignment.insert((x, y), gi);
            cells.push((x, y));
            for &(dx, dy) in &NEIGHBOR_OFFSETS {
                let next = (x + dx, y + dy);
                if registry.contains_key(&next) && !assignment.contains_key(&next) {
                    queue.push_back(next);
                }
            }
        }
        groups.push(cells);
    }

    // Merge pass: absorb undersized pieces into their smallest neighbor.
    let mut redirect: Vec<usize> = (0..groups.len()).collect();
    let merge_limit = config.max_piece_size.max(5);
    for _ in 0..MERGE_PASSES {
        let mut undersized: Vec<usize> = (0..groups.len())
            .filter(|&gi| redirect[gi] == gi && !groups[gi].is_empty())
            .filter(|&gi| groups[gi].len() < config.min_piece_size)
            .collect();
        if undersized.is_empty() {
            break;
        }
        undersized.sort_by_key(|&gi| (groups[gi].len(), gi));

        let mut merged_any = false;
        for gi in undersized {
            // May have been absorbed or grown earlier in this pass.
            if resolve(&redirect, gi) != gi || groups[gi].len() >= config.min_piece_size {
                continue;
            }

            let mut neighbors: Vec<usize> = Vec::new();
            for &(x, y) in &groups[gi] {
                for &(dx, dy) in &NEIGHBOR_OFFSETS {
                    if let Some(&owner) = assignment.get(&(x + dx, y + dy)) {
                        let owner = resolve(&redirect, owner);
                        if owner != gi && !neighbors.contains(&owner) {
                            neighbors.push(owner);
                        }
                    }
                }
            }

            let target = neighbors
                .into_iter()
                .filter(|&n| groups[n].len() + groups[gi].len() <= merge_limit)
                .min_by_key(|&n| (groups[n].len(), n));
            if let Some(target) = target {
                let cells = std::mem::take(&mut groups[gi]);
                groups[target].extend(cells);
                redirect[gi] = target;
                merged_any = true;
            }
        }
        if !merged_any {
            break;
        }
    }

    // Emit pieces in group-creation order.
    let mut pieces: Vec<Piece> = Vec::new();
    let mut piece_group_ids: Vec<usize> = Vec::new();
    for gi in 0..groups.len() {
        if redirect[gi] != gi || groups[gi].is_empty() {
            continue;
        }
        let mut cells = groups[gi].clone();
        cells.sort_by_key(|&(x, y)| (y, x));
        let anchor_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
        let anchor_y = cells[0].1;

        let piece_cells = cells
            .iter()
            .map(|&(x, y)| {
                let info = &registry[&(x, y)];
                let mut node = [NO_NEIGHBOR; 4];
                for (slot, &(dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                    if let Some(n) = registry.get(&(x + dx, y + dy)) {
                        node[slot] = n.block_id as i64;
                    }
                }
                PieceCell {
                    rel_x: (x - anchor_x) as usize,
                    rel_y: (y - anchor_y) as usize,
                    letter: info.letter.clone(),
                    block_id: info.block_id,
                    node,
                }
            })
            .collect();

        pieces.push(Piece {
            id: format!("piece_{}", pieces.len()),
            correct_x: anchor_x as usize,
            correct_y: anchor_y as usize,
            cells: piece_cells,
        });
        piece_group_ids.push(gi);
    }

    let cross_final = cross_group.map(|gi| resolve(&redirect, gi));
    let issues = validate(&pieces, &piece_group_ids, cross_final, config);

    PolyominoPuzzle {
        theme: theme.to_string(),
        grid_width: width,
        grid_height: height,
        pieces,
        issues,
    }
}

/// Follow merge redirects to the surviving group.
fn resolve(redirect: &[usize], mut gi: usize) -> usize {
    while redirect[gi] != gi {
        gi = redirect[gi];
    }
    gi
}

/// Advisory size checks; violations are reported, never fatal.
fn validate(
    pieces: &[Piece],
    piece_group_ids: &[usize],
    cross_group: Option<usize>,
    config: &PolyominoConfig,
) -> Vec<String> {
    let mut issues = Vec::new();

    for (piece, &gi) in pieces.iter().zip(piece_group_ids) {
        let size = piece.size();
        if size < config.min_piece_size {
            issues.push(format!(
                "{} has {size} cell(s), below the minimum of {}",
                piece.id, config.min_piece_size
            ));
        } else if size > config.max_piece_size && size != 5 {
            issues.push(format!(
                "{} has {size} cells, above the maximum of {}",
                piece.id, config.max_piece_size
            ));
        }
        if size == 5 && cross_group != Some(gi) {
            issues.push(format!(
                "{} is a 5-cell piece not produced by the cross pentomino",
                piece.id
            ));
        }
    }

    let five_count = pieces.iter().filter(|p| p.size() == 5).count();
    if five_count > 1 {
        issues.push(format!("{five_count} pieces have 5 cells; at most one is allowed"));
    }

    issues
}
