use std::io;

/// Custom error type for crossword generation
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("Invalid answer \"{answer}\": {reason}")]
    InvalidAnswer { answer: String, reason: String },

    #[error("No words passed filter.")]
    FilterExhausted,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Clue provider failed: {0}")]
    ProviderFailure(String),

    /// Manual-advanced validation failure, one entry per rejected placement
    /// as `(index, word, message)`.
    #[error("Placement validation failed: {}", format_placement_failures(.0))]
    PlacementValidation(Vec<(usize, String, String)>),

    #[error("Grid dimensions {width}x{height} out of range")]
    InvalidGridSize { width: usize, height: usize },

    #[error("artifact I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("artifact serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `"word: reason; word: reason; …"` per the surfaced error contract.
fn format_placement_failures(failures: &[(usize, String, String)]) -> String {
    failures
        .iter()
        .map(|(_, word, msg)| format!("{word}: {msg}"))
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<GenerateError> for io::Error {
    fn from(ge: GenerateError) -> Self {
        // String version is the least fragile (no Send/Sync bounds issues)
        io::Error::new(io::ErrorKind::InvalidInput, ge.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placement_failures_join_format() {
        let e = GenerateError::PlacementValidation(vec![
            (0, "HELLO".into(), "out of bounds".into()),
            (2, "WORLD".into(), "grapheme mismatch at (3, 4)".into()),
        ]);
        assert_eq!(
            e.to_string(),
            "Placement validation failed: HELLO: out of bounds; WORLD: grapheme mismatch at (3, 4)"
        );
    }

    #[test]
    fn test_filter_exhausted_message_is_stable() {
        // The message is part of the API contract surfaced to callers.
        assert_eq!(GenerateError::FilterExhausted.to_string(), "No words passed filter.");
    }
}
