//! Target word selection for each difficulty tier.

use crate::embedding::EmbeddingProvider;
use crate::error::GenerationError;
use crate::wordbank::{EasyPool, GenrePools, WordPool};
use rand::Rng;
use rand::seq::{IteratorRandom, SliceRandom};
use std::fmt;

/// Neighbours of the genre name considered for an easy question.
pub const EASY_NEIGHBOR_COUNT: usize = 200;
/// Minimum similarity to the genre name for a primary candidate.
pub const EASY_SIMILARITY_THRESHOLD: f32 = 0.6;
/// Primary candidates sampled for example-word scoring.
pub const EASY_SAMPLE_COUNT: usize = 5;
/// Neighbours of a custom keyword the target is drawn from.
pub const CUSTOM_NEIGHBOR_COUNT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Custom { keyword: String },
}

impl Difficulty {
    /// Parse a menu code: `1`, `2`, `3`, or `custom:<keyword>`.
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        match code {
            "1" => Some(Self::Easy),
            "2" => Some(Self::Normal),
            "3" => Some(Self::Hard),
            _ => code
                .strip_prefix("custom:")
                .map(|keyword| Self::Custom {
                    keyword: keyword.trim().to_string(),
                }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Custom { .. } => "custom",
        }
    }
}

/// What the player is told about the hidden word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Label {
    Genre(String),
    Hidden,
    Custom(String),
}

impl Label {
    pub fn is_hidden(&self) -> bool {
        matches!(self, Self::Hidden)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genre(genre) => write!(f, "{genre}"),
            Self::Hidden => write!(f, "(no genre shown)"),
            Self::Custom(keyword) => write!(f, "Custom: \"{keyword}\""),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub target: String,
    pub label: Label,
}

pub fn generate<R: Rng + ?Sized>(
    difficulty: &Difficulty,
    pools: &GenrePools,
    provider: &dyn EmbeddingProvider,
    rng: &mut R,
) -> Result<Question, GenerationError> {
    match difficulty {
        Difficulty::Easy => generate_easy(&pools.easy, provider, rng),
        Difficulty::Normal => generate_from_pool(&pools.normal, "normal", provider, rng),
        Difficulty::Hard => generate_from_pool(&pools.hard, "hard", provider, rng),
        Difficulty::Custom { keyword } => generate_custom(keyword, provider, rng),
    }
}

pub fn generate_easy<R: Rng + ?Sized>(
    pool: &EasyPool,
    provider: &dyn EmbeddingProvider,
    rng: &mut R,
) -> Result<Question, GenerationError> {
    let (genre, details) = pool
        .iter()
        .choose(rng)
        .ok_or(GenerationError::EmptyPool { tier: "easy" })?;

    if !provider.contains(genre) {
        return Err(GenerationError::GenreNotInVocabulary(genre.clone()));
    }

    let primary: Vec<String> = provider
        .nearest_neighbors(genre, EASY_NEIGHBOR_COUNT)
        .into_iter()
        .filter(|(_, score)| *score >= EASY_SIMILARITY_THRESHOLD)
        .map(|(word, _)| word)
        .collect();

    if primary.len() < EASY_SAMPLE_COUNT {
        return Err(GenerationError::InsufficientCandidates {
            genre: genre.clone(),
            found: primary.len(),
            required: EASY_SAMPLE_COUNT,
        });
    }

    let secondary: Vec<&String> = primary.choose_multiple(rng, EASY_SAMPLE_COUNT).collect();

    let mut best: Option<(&String, f32)> = None;
    for candidate in secondary {
        if !provider.contains(candidate) {
            continue;
        }
        let score = details
            .example_words
            .iter()
            .filter(|example| provider.contains(example))
            .map(|example| provider.similarity(candidate, example))
            .reduce(f32::max)
            .unwrap_or(0.0);
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    let (target, score) = best.ok_or_else(|| GenerationError::NoScoredCandidate(genre.clone()))?;
    log::debug!("Easy question in genre '{genre}' (example score {score:.4})");
    Ok(Question {
        target: target.clone(),
        label: Label::Genre(genre.clone()),
    })
}

/// Draw a genre, then a target among its words the model knows.
pub fn generate_from_pool<R: Rng + ?Sized>(
    pool: &WordPool,
    tier: &'static str,
    provider: &dyn EmbeddingProvider,
    rng: &mut R,
) -> Result<Question, GenerationError> {
    let (genre, words) = pool
        .iter()
        .choose(rng)
        .ok_or(GenerationError::EmptyPool { tier })?;
    if words.is_empty() {
        return Err(GenerationError::EmptyGenre(genre.clone()));
    }
    let known: Vec<&String> = words.iter().filter(|word| provider.contains(word)).collect();
    if known.len() < words.len() {
        log::warn!(
            "Genre '{genre}' has {} word(s) outside the vocabulary",
            words.len() - known.len()
        );
    }
    let target = known
        .choose(rng)
        .ok_or_else(|| GenerationError::NoVocabularyWord(genre.clone()))?;
    log::debug!("{tier} question drawn from genre '{genre}'");
    Ok(Question {
        target: target.to_string(),
        label: Label::Hidden,
    })
}

pub fn generate_custom<R: Rng + ?Sized>(
    keyword: &str,
    provider: &dyn EmbeddingProvider,
    rng: &mut R,
) -> Result<Question, GenerationError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Err(GenerationError::EmptyKeyword);
    }
    if !provider.contains(keyword) {
        return Err(GenerationError::KeywordNotInVocabulary(keyword.to_string()));
    }
    let (target, _) = provider
        .nearest_neighbors(keyword, CUSTOM_NEIGHBOR_COUNT)
        .into_iter()
        .choose(rng)
        .ok_or_else(|| GenerationError::NoNeighbors(keyword.to_string()))?;
    Ok(Question {
        target,
        label: Label::Custom(keyword.to_string()),
    })
}
