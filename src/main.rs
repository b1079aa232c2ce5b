use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crossweave::grid::Direction;
use crossweave::logging;
use crossweave::polyomino::{generate_polyomino, PolyominoConfig};
use crossweave::request::{generate_from_request, GenerationRequest, Mode, WordInput};
use crossweave::store::ArtifactStore;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Crossweave crossword generator
#[derive(Parser, Debug)]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
struct Cli {
    /// Path to the word list file (answer;clue per line)
    words_file: String,

    /// BCP-47 language tag for the answers
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Grid width
    #[arg(long, default_value_t = 18)]
    width: usize,

    /// Grid height
    #[arg(long, default_value_t = 18)]
    height: usize,

    /// Seed for a reproducible layout
    #[arg(short, long)]
    seed: Option<u64>,

    /// Also decompose the grid into polyomino pieces
    #[arg(long)]
    polyomino: bool,

    /// Allow a single plus-shaped pentomino piece
    #[arg(long)]
    cross_pentomino: bool,

    /// Theme label recorded in the artifacts
    #[arg(long, default_value = "")]
    theme: String,

    /// Keep unplaced words in the export payload
    #[arg(long)]
    keep_unplaced: bool,

    /// Persist the artifact bundle under the data dir
    #[arg(long)]
    save: bool,

    /// Verbose logging
    #[arg(short, long)]
    debug: bool,
}

/// Entry point of the crossweave CLI.
///
/// Delegates to [`try_main`], catching any errors and printing them
/// before exiting with a nonzero code.
fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Core application logic.
///
/// Steps:
/// 1. Parse CLI arguments with Clap.
/// 2. Load the word list from disk.
/// 3. Run the generation pipeline (clean, filter, place, serialize).
/// 4. Print the grid and word list on stdout.
/// 5. Print stats and timings on stderr.
fn try_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logger(cli.debug);

    let t_load = Instant::now();
    let contents = std::fs::read_to_string(&cli.words_file)?;
    let words: Vec<WordInput> = contents
        .lines()
        .filter_map(|raw_line| {
            let line = raw_line.trim();
            if line.is_empty() {
                return None;
            }
            let (word, clue) = match line.split_once(';') {
                Some((w, c)) => (w.trim(), c.trim()),
                None => (line, ""),
            };
            Some(WordInput {
                word: word.to_string(),
                clue: clue.to_string(),
                row: None,
                col: None,
                direction: None,
            })
        })
        .collect();
    let load_secs = t_load.elapsed().as_secs_f64();

    let request = GenerationRequest {
        session_id: "cli".to_string(),
        content_language: cli.language.clone(),
        mode: Mode::ManualBasic,
        input_type: None,
        input_value: if cli.theme.is_empty() {
            None
        } else {
            Some(cli.theme.clone())
        },
        num_items: words.len().clamp(3, 50),
        user_instructions: None,
        words,
        grid_size_x: cli.width,
        grid_size_y: cli.height,
        remove_unplaced_words: !cli.keep_unplaced,
        seed: cli.seed,
    };

    let t_solve = Instant::now();
    let bundle = generate_from_request(&request, None)?;
    let solve_secs = t_solve.elapsed().as_secs_f64();

    let puzzle = &bundle.puzzle;
    for y in 0..puzzle.height {
        let row: Vec<&str> = (0..puzzle.width)
            .map(|x| puzzle.grid.cell(x, y).grapheme.as_deref().unwrap_or("."))
            .collect();
        println!("{}", row.join(" "));
    }
    println!();

    for p in puzzle.placements.iter().filter(|p| p.placed) {
        let dir = match p.direction {
            Direction::Across => "across",
            Direction::Down => "down",
        };
        println!(
            "{:>3}. ({}, {}) {dir}: {} [{}]",
            p.word_id, p.x, p.y, p.item.answer, p.item.clue
        );
    }
    for item in &puzzle.unplaced {
        println!("  unplaced: {}", item.answer);
    }

    let polyomino = if cli.polyomino {
        let config = PolyominoConfig {
            allow_single_cross_pentomino: cli.cross_pentomino,
            ..PolyominoConfig::default()
        };
        let poly = generate_polyomino(
            &puzzle.placements,
            puzzle.width,
            puzzle.height,
            &cli.theme,
            &config,
        );
        println!();
        for piece in &poly.pieces {
            println!(
                "{}: {} cell(s) at ({}, {})",
                piece.id,
                piece.size(),
                piece.correct_x,
                piece.correct_y
            );
        }
        for issue in &poly.issues {
            log::warn!("polyomino: {issue}");
        }
        Some(poly)
    } else {
        None
    };

    // Persistence is best-effort: a failed write never fails the run.
    if cli.save {
        let store = ArtifactStore::from_env();
        match store.write_bundle(&request, &bundle, polyomino.as_ref()) {
            Ok(dir) => eprintln!("saved {} to {}", bundle.crossword_id, dir.display()),
            Err(e) => log::warn!("could not persist bundle: {e}"),
        }
    }

    if let Some(warning) = &bundle.warning {
        eprintln!("⚠️  {warning}");
    }
    eprintln!(
        "Loaded {} words in {load_secs:.3}s; placed {}/{} in {solve_secs:.3}s (fill {:.0}%).",
        bundle.candidates.len(),
        puzzle.stats.placed,
        puzzle.stats.requested,
        puzzle.stats.fill_ratio * 100.0
    );

    Ok(())
}
