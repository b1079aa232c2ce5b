//! `request` — the JSON-shaped generation boundary.
//!
//! Deserializes and validates generation requests, runs the pipeline
//! (clean → filter → place → serialize), and shapes the response. The AI
//! clue generator stays behind [`ClueProvider`]; this crate only consumes
//! the `(answer, clue)` pairs it returns.

use serde::{Deserialize, Serialize};

use crate::clue::{ClueItem, MAX_ANSWER_GRAPHEMES};
use crate::engine::{
    generate_manual_puzzle, generate_puzzle, ManualPlacement, PuzzleResult,
    DEFAULT_RETRY_ATTEMPTS,
};
use crate::filter::{filter_suitable, FilterOutcome};
use crate::grapheme::{clean_answer_text, grapheme_length, Locale};
use crate::grid::Direction;
use crate::serializer::{serialize_puzzle, SerializedPuzzle, WordSummary};
use crate::store::new_crossword_id;
use crate::GenerateError;

pub const MIN_GRID_SIZE: usize = 5;
pub const MAX_GRID_SIZE: usize = 50;
pub const MIN_NUM_ITEMS: usize = 3;
pub const MAX_NUM_ITEMS: usize = 50;
const DEFAULT_GRID_SIZE: usize = 18;
const DEFAULT_NUM_ITEMS: usize = 10;

/// How the answer set is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Ai,
    ManualBasic,
    ManualAdvanced,
}

/// What `inputValue` refers to in AI mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InputType {
    Topic,
    Url,
    Pdf,
    Text,
}

/// One user-supplied word; the coordinates are only meaningful (and
/// required) in `manual_advanced` mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordInput {
    pub word: String,
    #[serde(default)]
    pub clue: String,
    #[serde(default)]
    pub row: Option<usize>,
    #[serde(default)]
    pub col: Option<usize>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

/// A generation request as received over the wire.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub session_id: String,
    pub content_language: String,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub input_type: Option<InputType>,
    #[serde(default)]
    pub input_value: Option<String>,
    #[serde(default = "default_num_items")]
    pub num_items: usize,
    #[serde(default)]
    pub user_instructions: Option<String>,
    #[serde(default)]
    pub words: Vec<WordInput>,
    #[serde(default = "default_grid_size")]
    pub grid_size_x: usize,
    #[serde(default = "default_grid_size")]
    pub grid_size_y: usize,
    #[serde(default = "default_true")]
    pub remove_unplaced_words: bool,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_mode() -> Mode {
    Mode::Ai
}
fn default_num_items() -> usize {
    DEFAULT_NUM_ITEMS
}
fn default_grid_size() -> usize {
    DEFAULT_GRID_SIZE
}
fn default_true() -> bool {
    true
}

impl GenerationRequest {
    /// The locale every answer in this request is segmented under.
    #[must_use]
    pub fn locale(&self) -> Locale {
        Locale::new(self.content_language.as_str())
    }

    /// Field-level validation per the bad-request taxonomy.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::BadRequest`] naming the first offending
    /// field.
    pub fn validate(&self) -> Result<(), GenerateError> {
        let bad = |msg: &str| Err(GenerateError::BadRequest(msg.to_string()));

        if self.session_id.is_empty() {
            return bad("sessionId must be non-empty");
        }
        if self.content_language.len() < 2 {
            return bad("contentLanguage must be a BCP-47 tag");
        }
        if !(MIN_NUM_ITEMS..=MAX_NUM_ITEMS).contains(&self.num_items) {
            return bad("numItems must be between 3 and 50");
        }
        for size in [self.grid_size_x, self.grid_size_y] {
            if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
                return bad("grid size must be between 5 and 50");
            }
        }

        match self.mode {
            Mode::Ai => {
                if self.input_type.is_none() {
                    return bad("inputType is required in AI mode");
                }
                if self.input_value.as_deref().is_none_or(str::is_empty) {
                    return bad("inputValue is required in AI mode");
                }
            }
            Mode::ManualBasic | Mode::ManualAdvanced => {
                if self.words.is_empty() {
                    return bad("words are required in manual modes");
                }
            }
        }

        let locale = self.locale();
        for w in &self.words {
            let len = grapheme_length(&clean_answer_text(&w.word), &locale);
            if len > MAX_ANSWER_GRAPHEMES {
                return Err(GenerateError::BadRequest(format!(
                    "word \"{}\" exceeds {MAX_ANSWER_GRAPHEMES} graphemes",
                    w.word
                )));
            }
            if self.mode == Mode::ManualAdvanced
                && (w.row.is_none() || w.col.is_none() || w.direction.is_none())
            {
                return Err(GenerateError::BadRequest(format!(
                    "word \"{}\" needs row, col and direction in manual_advanced mode",
                    w.word
                )));
            }
        }

        Ok(())
    }
}

/// What the external clue generator hands back for one request.
#[derive(Debug, Clone)]
pub struct ProviderOutput {
    pub clues: Vec<(String, String)>,
    pub prompt: String,
    pub model: String,
    pub raw_response: String,
}

/// The opaque AI clue generator. Implementations live outside this crate;
/// the pipeline only consumes the returned `(answer, clue)` pairs.
pub trait ClueProvider {
    /// # Errors
    ///
    /// Returns a message describing why no clues could be produced.
    fn fetch_clues(&self, request: &GenerationRequest) -> Result<ProviderOutput, String>;
}

/// Whether AI-mode requests are enabled for this process.
#[must_use]
pub fn ai_enabled() -> bool {
    std::env::var("AI_API_KEY").is_ok_and(|v| !v.is_empty())
}

/// The puzzle body of a successful response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleView {
    pub grid: Vec<Vec<Option<String>>>,
    pub placements: Vec<WordSummary>,
    pub unplaced_words: Vec<WordSummary>,
    pub grid_width: usize,
    pub grid_height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// The wire response for a generation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crossword_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub puzzle: Option<PuzzleView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationResponse {
    /// The failure shape: `success = false` plus the error string.
    #[must_use]
    pub fn failure(error: &GenerateError) -> Self {
        Self {
            success: false,
            crossword_id: None,
            puzzle: None,
            payload: None,
            warning: None,
            error: Some(error.to_string()),
        }
    }
}

/// Everything one generation run produced; the artifact store persists
/// this, the response is derived from it.
#[derive(Debug, Clone)]
pub struct GenerationBundle {
    pub crossword_id: String,
    pub mode: Mode,
    pub theme: String,
    pub requested_count: usize,
    pub candidates: Vec<ClueItem>,
    pub filter: Option<FilterOutcome>,
    pub provider_output: Option<ProviderOutput>,
    pub puzzle: PuzzleResult,
    pub serialized: SerializedPuzzle,
    pub warning: Option<String>,
}

impl GenerationBundle {
    /// Shape the success response.
    #[must_use]
    pub fn to_response(&self) -> GenerationResponse {
        GenerationResponse {
            success: true,
            crossword_id: Some(self.crossword_id.clone()),
            puzzle: Some(PuzzleView {
                grid: self.serialized.grid.clone(),
                placements: self.serialized.placed.clone(),
                unplaced_words: self.serialized.unplaced.clone(),
                grid_width: self.puzzle.width,
                grid_height: self.puzzle.height,
                warning: self.puzzle.warning.clone(),
            }),
            payload: Some(self.serialized.payload.clone()),
            warning: self.warning.clone(),
            error: None,
        }
    }
}

/// Collect the `(answer, clue)` pairs for a request.
fn collect_pairs(
    request: &GenerationRequest,
    provider: Option<&dyn ClueProvider>,
) -> Result<(Vec<(String, String)>, Option<ProviderOutput>), GenerateError> {
    match request.mode {
        Mode::Ai => {
            let provider = provider.ok_or_else(|| {
                GenerateError::BadRequest("AI mode requires a clue provider".to_string())
            })?;
            let output = provider
                .fetch_clues(request)
                .map_err(GenerateError::ProviderFailure)?;
            if output.clues.is_empty() {
                return Err(GenerateError::ProviderFailure(
                    "generator produced no parseable clues".to_string(),
                ));
            }
            Ok((output.clues.clone(), Some(output)))
        }
        Mode::ManualBasic | Mode::ManualAdvanced => Ok((
            request
                .words
                .iter()
                .map(|w| (w.word.clone(), w.clue.clone()))
                .collect(),
            None,
        )),
    }
}

/// Run the full generation pipeline for a validated request.
///
/// # Errors
///
/// Propagates request validation, provider, filter-exhaustion, and
/// placement-validation failures; the caller turns those into the
/// `success = false` response shape via [`GenerationResponse::failure`].
pub fn generate_from_request(
    request: &GenerationRequest,
    provider: Option<&dyn ClueProvider>,
) -> Result<GenerationBundle, GenerateError> {
    request.validate()?;
    let locale = request.locale();

    let (pairs, provider_output) = collect_pairs(request, provider)?;
    let requested_count = match request.mode {
        Mode::Ai => request.num_items,
        _ => pairs.len(),
    };

    // In AI mode a malformed answer is the generator's fault: skip and
    // warn. In manual modes it is the caller's, so it fails the request.
    let mut candidates = Vec::new();
    for (answer, clue) in &pairs {
        match ClueItem::new(answer, clue, &locale) {
            Ok(item) => candidates.push(item),
            Err(e) if request.mode == Mode::Ai => log::warn!("dropping AI candidate: {e}"),
            Err(e) => return Err(e),
        }
    }

    let (filter, puzzle) = if request.mode == Mode::ManualAdvanced {
        let manual: Vec<ManualPlacement> = request
            .words
            .iter()
            .map(|w| ManualPlacement {
                answer: w.word.clone(),
                clue: w.clue.clone(),
                // validated as present above
                row: w.row.unwrap_or_default(),
                col: w.col.unwrap_or_default(),
                direction: w.direction.unwrap_or(Direction::Across),
            })
            .collect();
        let puzzle =
            generate_manual_puzzle(&manual, request.grid_size_x, request.grid_size_y, &locale)?;
        (None, puzzle)
    } else {
        let outcome = filter_suitable(&candidates, request.grid_size_x, request.grid_size_y);
        if outcome.kept.is_empty() {
            return Err(GenerateError::FilterExhausted);
        }
        let puzzle = generate_puzzle(
            &outcome.kept,
            request.grid_size_x,
            request.grid_size_y,
            request.seed,
            DEFAULT_RETRY_ATTEMPTS,
        )?;
        (Some(outcome), puzzle)
    };

    let warning = {
        let parts: Vec<&str> = filter
            .as_ref()
            .and_then(|f| f.warning.as_deref())
            .into_iter()
            .chain(puzzle.warning.as_deref())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    };

    let serialized = serialize_puzzle(&puzzle, request.remove_unplaced_words);

    Ok(GenerationBundle {
        crossword_id: new_crossword_id(),
        mode: request.mode,
        theme: request.input_value.clone().unwrap_or_default(),
        requested_count,
        candidates,
        filter,
        provider_output,
        puzzle,
        serialized,
        warning,
    })
}
