use std::path::PathBuf;
use thiserror::Error;

/// No question could be produced for the requested difficulty.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("the {tier} pool has no genres")]
    EmptyPool { tier: &'static str },
    #[error("genre '{0}' has no candidate words")]
    EmptyGenre(String),
    #[error("genre '{0}' is not in the model vocabulary")]
    GenreNotInVocabulary(String),
    #[error("none of the words in genre '{0}' are in the model vocabulary")]
    NoVocabularyWord(String),
    #[error("only {found} candidates close to '{genre}' (need at least {required})")]
    InsufficientCandidates {
        genre: String,
        found: usize,
        required: usize,
    },
    #[error("none of the sampled candidates for '{0}' are in the vocabulary")]
    NoScoredCandidate(String),
    #[error("no keyword given")]
    EmptyKeyword,
    #[error("keyword '{0}' is not in the model vocabulary")]
    KeywordNotInVocabulary(String),
    #[error("no related words found for '{0}'")]
    NoNeighbors(String),
}

/// The embedding provider could not be loaded.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("failed to read vectors from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("line {line}: expected a '<count> <dimensions>' header")]
    Header { line: usize },
    #[error("line {line}: invalid vector component '{value}'")]
    Component { line: usize, value: String },
    #[error("line {line}: expected {expected} components, found {found}")]
    Dimensions {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("no vectors were loaded")]
    Empty,
}

/// Genre pool data is missing or malformed.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed data in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("the {tier} pool is empty")]
    EmptyPool { tier: &'static str },
}

/// Start-up failures that prevent the game from running at all.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("embedding provider unavailable: {0}")]
    ProviderUnavailable(#[from] EmbeddingError),
    #[error("genre data unavailable: {0}")]
    DataUnavailable(#[from] DataError),
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}
