//! `store` — the per-crossword artifact bundle.
//!
//! Each generation run persists a directory of named JSON artifacts under
//! the data root (`DATA_DIR` env override, else `data/crosswords`). Every
//! file goes through temp-file-then-rename so a concurrent reader never
//! sees partial JSON. Persistence failures are non-fatal to the caller's
//! response; a best-effort `summary.json` is still attempted when
//! generation itself fails.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::clue::ClueItem;
use crate::filter::RemovedWord;
use crate::grid::Direction;
use crate::polyomino::PolyominoPuzzle;
use crate::request::{GenerationBundle, GenerationRequest, Mode};
use crate::GenerateError;

/// Environment override for the artifact root.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
const DEFAULT_DATA_DIR: &str = "data/crosswords";

/// Mint a crossword id: `cw_` plus 12 lowercase hex chars.
#[must_use]
pub fn new_crossword_id() -> String {
    let bits: u64 = rand::thread_rng().gen();
    format!("cw_{:012x}", bits & 0xFFFF_FFFF_FFFF)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetaArtifact<'a> {
    id: &'a str,
    theme: &'a str,
    language: &'a str,
    grid_size: String,
    requested_count: usize,
    created_at: String,
    user_id: &'a str,
    mode: Mode,
    metadata: HashMap<String, serde_json::Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRawArtifact<'a> {
    prompt: &'a str,
    model: &'a str,
    raw_response: &'a str,
    timestamp: String,
}

#[derive(Serialize)]
struct FilteredArtifact<'a> {
    kept: Vec<&'a ClueItem>,
    removed: Vec<&'a RemovedWord>,
}

#[derive(Serialize)]
struct PlacedEntry<'a> {
    answer: &'a str,
    row: usize,
    col: usize,
    direction: Direction,
}

#[derive(Serialize)]
struct UnplacedEntry<'a> {
    answer: &'a str,
    reason: &'a str,
}

#[derive(Serialize)]
struct PlacementsArtifact<'a> {
    placed: Vec<PlacedEntry<'a>>,
    unplaced: Vec<UnplacedEntry<'a>>,
}

#[derive(Serialize)]
struct GridCellArtifact<'a> {
    g: Option<&'a str>,
}

#[derive(Serialize)]
struct GridArtifact<'a> {
    width: usize,
    height: usize,
    cells: Vec<Vec<GridCellArtifact<'a>>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryArtifact<'a> {
    mode: Mode,
    placed_count: usize,
    unplaced_count: usize,
    filtered_count: usize,
    requested_count: usize,
    fill_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'a str>,
}

/// Writes artifact bundles under a fixed root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve the root from `DATA_DIR`, falling back to
    /// `data/crosswords` relative to the working directory.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => Self::new(PathBuf::from(dir)),
            _ => Self::new(DEFAULT_DATA_DIR),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn crossword_dir(&self, crossword_id: &str) -> PathBuf {
        self.root.join(crossword_id)
    }

    /// Atomically serialize `value` to `<dir>/<name>`.
    fn write_json<T: Serialize>(&self, dir: &Path, name: &str, value: &T) -> Result<(), GenerateError> {
        fs::create_dir_all(dir)?;
        let tmp = tempfile::NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(BufWriter::new(&tmp), value)?;
        tmp.persist(dir.join(name)).map_err(|e| e.error)?;
        Ok(())
    }

    /// Persist the full artifact bundle for one successful generation.
    ///
    /// Returns the crossword directory.
    ///
    /// # Errors
    ///
    /// Returns the first I/O or serialization failure; earlier files may
    /// already have been written.
    pub fn write_bundle(
        &self,
        request: &GenerationRequest,
        bundle: &GenerationBundle,
        polyomino: Option<&PolyominoPuzzle>,
    ) -> Result<PathBuf, GenerateError> {
        let dir = self.crossword_dir(&bundle.crossword_id);
        let puzzle = &bundle.puzzle;

        let meta = MetaArtifact {
            id: &bundle.crossword_id,
            theme: &bundle.theme,
            language: &request.content_language,
            grid_size: format!("{}x{}", request.grid_size_x, request.grid_size_y),
            requested_count: bundle.requested_count,
            created_at: now_rfc3339(),
            user_id: &request.session_id,
            mode: bundle.mode,
            metadata: HashMap::new(),
        };
        self.write_json(&dir, "meta.json", &meta)?;

        if let Some(output) = &bundle.provider_output {
            let raw = GeminiRawArtifact {
                prompt: &output.prompt,
                model: &output.model,
                raw_response: &output.raw_response,
                timestamp: now_rfc3339(),
            };
            self.write_json(&dir, "gemini_raw.json", &raw)?;
        }

        self.write_json(&dir, "candidates.json", &bundle.candidates)?;

        if let Some(filter) = &bundle.filter {
            let filtered = FilteredArtifact {
                kept: filter.kept.iter().collect(),
                removed: filter.removed.iter().collect(),
            };
            self.write_json(&dir, "filtered.json", &filtered)?;
        }

        let placements = PlacementsArtifact {
            placed: puzzle
                .placements
                .iter()
                .filter(|p| p.placed)
                .map(|p| PlacedEntry {
                    answer: &p.item.answer,
                    row: p.y,
                    col: p.x,
                    direction: p.direction,
                })
                .collect(),
            unplaced: puzzle
                .unplaced
                .iter()
                .map(|item| UnplacedEntry {
                    answer: &item.answer,
                    reason: "no valid position found",
                })
                .collect(),
        };
        self.write_json(&dir, "placements.json", &placements)?;

        let grid = GridArtifact {
            width: puzzle.width,
            height: puzzle.height,
            cells: (0..puzzle.height)
                .map(|y| {
                    (0..puzzle.width)
                        .map(|x| GridCellArtifact {
                            g: puzzle.grid.cell(x, y).grapheme.as_deref(),
                        })
                        .collect()
                })
                .collect(),
        };
        self.write_json(&dir, "grid.json", &grid)?;

        let summary = SummaryArtifact {
            mode: bundle.mode,
            placed_count: puzzle.stats.placed,
            unplaced_count: puzzle.stats.unplaced,
            filtered_count: bundle.filter.as_ref().map_or(0, |f| f.removed.len()),
            requested_count: bundle.requested_count,
            fill_ratio: puzzle.stats.fill_ratio,
            warning: bundle.warning.as_deref(),
        };
        self.write_json(&dir, "summary.json", &summary)?;

        if let Some(poly) = polyomino {
            self.write_json(&dir, "polyomino.json", poly)?;
        }

        log::info!("persisted artifact bundle at {}", dir.display());
        Ok(dir)
    }

    /// Best-effort summary for a failed generation; errors are logged and
    /// swallowed.
    pub fn write_failure_summary(&self, crossword_id: &str, mode: Mode, error: &GenerateError) {
        let dir = self.crossword_dir(crossword_id);
        let summary = SummaryArtifact {
            mode,
            placed_count: 0,
            unplaced_count: 0,
            filtered_count: 0,
            requested_count: 0,
            fill_ratio: 0.0,
            warning: None,
        };
        if let Err(e) = self.write_json(&dir, "summary.json", &summary) {
            log::warn!("could not persist failure summary for {crossword_id}: {e}");
        } else {
            log::info!("persisted failure summary for {crossword_id}: {error}");
        }
    }

    /// List the crossword ids present under the root. Unreadable entries
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns an error only when the root itself cannot be read.
    pub fn list_crosswords(&self) -> Result<Vec<String>, GenerateError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            match entry {
                Ok(e) if e.path().is_dir() => {
                    if let Some(name) = e.file_name().to_str() {
                        if name.starts_with("cw_") {
                            ids.push(name.to_string());
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => log::warn!("skipping unreadable entry under {}: {e}", self.root.display()),
            }
        }
        ids.sort();
        Ok(ids)
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{generate_from_request, GenerationRequest, WordInput};

    fn request() -> GenerationRequest {
        serde_json::from_value(serde_json::json!({
            "sessionId": "s1",
            "contentLanguage": "en",
            "mode": "manual_basic",
            "words": [
                {"word": "HELLO", "clue": "a greeting"},
                {"word": "HELP", "clue": "aid"}
            ],
            "gridSizeX": 15,
            "gridSizeY": 15,
            "seed": 42
        }))
        .unwrap()
    }

    #[test]
    fn test_new_crossword_id_format() {
        let id = new_crossword_id();
        assert!(id.starts_with("cw_"));
        let hex = &id[3..];
        assert_eq!(hex.len(), 12);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_write_bundle_creates_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());

        let req = request();
        let bundle = generate_from_request(&req, None).unwrap();
        let dir = store.write_bundle(&req, &bundle, None).unwrap();

        for name in ["meta.json", "candidates.json", "filtered.json", "placements.json", "grid.json", "summary.json"] {
            assert!(dir.join(name).exists(), "{name} missing");
        }
        // AI-only artifact is absent in manual mode
        assert!(!dir.join("gemini_raw.json").exists());

        let meta: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("meta.json")).unwrap()).unwrap();
        assert_eq!(meta["gridSize"], "15x15");
        assert_eq!(meta["userId"], "s1");
        assert_eq!(meta["mode"], "manual_basic");

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("summary.json")).unwrap()).unwrap();
        assert_eq!(summary["placedCount"], 2);
        assert_eq!(summary["requestedCount"], 2);

        let grid: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("grid.json")).unwrap()).unwrap();
        assert_eq!(grid["cells"].as_array().unwrap().len(), grid["height"].as_u64().unwrap() as usize);
    }

    #[test]
    fn test_write_polyomino_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());

        let req = request();
        let bundle = generate_from_request(&req, None).unwrap();
        let poly = crate::polyomino::generate_polyomino(
            &bundle.puzzle.placements,
            bundle.puzzle.width,
            bundle.puzzle.height,
            "greetings",
            &crate::polyomino::PolyominoConfig::default(),
        );
        let dir = store.write_bundle(&req, &bundle, Some(&poly)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.join("polyomino.json")).unwrap()).unwrap();
        assert_eq!(json["theme"], "greetings");
        assert!(json["pieces"].as_array().unwrap().len() >= 2);
        let cell = &json["pieces"][0]["cells"][0];
        assert!(cell["relX"].is_u64());
        assert!(cell["node"].as_array().unwrap().len() == 4);
    }

    #[test]
    fn test_list_crosswords_skips_foreign_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        fs::create_dir_all(tmp.path().join("cw_abcdefabcdef")).unwrap();
        fs::create_dir_all(tmp.path().join("not_a_crossword")).unwrap();

        let ids = store.list_crosswords().unwrap();
        assert_eq!(ids, vec!["cw_abcdefabcdef".to_string()]);
    }

    #[test]
    fn test_failure_summary_is_best_effort() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(tmp.path());
        store.write_failure_summary("cw_000000000000", Mode::Ai, &GenerateError::FilterExhausted);
        assert!(store
            .crossword_dir("cw_000000000000")
            .join("summary.json")
            .exists());
    }

    #[test]
    fn test_from_env_default_root() {
        // Only exercise the fallback; the env override is process-global.
        if env::var_os(DATA_DIR_ENV).is_none() {
            let store = ArtifactStore::from_env();
            assert_eq!(store.root(), Path::new("data/crosswords"));
        }
    }

    #[test]
    fn test_word_input_round_trip() {
        // Round-trip a WordInput with coordinates through serde.
        let w: WordInput = serde_json::from_value(serde_json::json!({
            "word": "CAT", "clue": "pet", "row": 2, "col": 3, "direction": "down"
        }))
        .unwrap();
        assert_eq!(w.row, Some(2));
    }
}
