//! Similarity ranking of a session's guesses.

use std::collections::HashMap;

pub const RANKING_DECIMALS: usize = 2;
pub const FEEDBACK_DECIMALS: usize = 4;

/// Distinct guesses in the order they were first scored.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<(String, f32)>,
    index: HashMap<String, usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `word` with `score`. Returns `false` and leaves the existing
    /// score untouched if `word` was already recorded.
    pub fn insert(&mut self, word: &str, score: f32) -> bool {
        if self.index.contains_key(word) {
            return false;
        }
        self.index.insert(word.to_string(), self.entries.len());
        self.entries.push((word.to_string(), score));
        true
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn score(&self, word: &str) -> Option<f32> {
        self.index.get(word).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.entries.iter().map(|(w, s)| (w.as_str(), *s))
    }

    /// Highest-scoring guess; the earliest one wins a tie.
    pub fn best(&self) -> Option<(&str, f32)> {
        self.iter()
            .fold(None::<(&str, f32)>, |best, (word, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((word, score)),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedGuess {
    pub rank: usize,
    pub word: String,
    pub score: f32,
}

impl RankedGuess {
    pub fn format(&self, show_score: bool) -> String {
        if show_score {
            format!(
                "{}. {} ({:.*})",
                self.rank, self.word, RANKING_DECIMALS, self.score
            )
        } else {
            format!("{}. {}", self.rank, self.word)
        }
    }
}

/// All guesses, best first. Equal scores keep insertion order.
pub fn snapshot(history: &History) -> Vec<RankedGuess> {
    let mut sorted: Vec<(&str, f32)> = history.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, (word, score))| RankedGuess {
            rank: i + 1,
            word: word.to_string(),
            score,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum RankingLine {
    /// Heading above the closest guesses when the ranking is windowed.
    Closest(usize),
    /// Heading above the furthest guesses when the ranking is windowed.
    Furthest(usize),
    Entry(RankedGuess),
    Ellipsis,
}

/// A display-ready window over a ranking snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingView {
    pub lines: Vec<RankingLine>,
}

impl RankingView {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &RankedGuess> {
        self.lines.iter().filter_map(|line| match line {
            RankingLine::Entry(entry) => Some(entry),
            _ => None,
        })
    }

    pub fn is_windowed(&self) -> bool {
        self.lines.contains(&RankingLine::Ellipsis)
    }

    pub fn to_text_lines(&self, show_scores: bool) -> Vec<String> {
        self.lines
            .iter()
            .map(|line| match line {
                RankingLine::Closest(n) => format!("[Closest {n}]"),
                RankingLine::Furthest(n) => format!("[Furthest {n}]"),
                RankingLine::Entry(entry) => entry.format(show_scores),
                RankingLine::Ellipsis => "...".to_string(),
            })
            .collect()
    }
}

/// Window `snapshot` to at most `display_count` entries at each end.
pub fn render(snapshot: &[RankedGuess], display_count: usize) -> RankingView {
    if display_count == 0 || snapshot.is_empty() {
        return RankingView::default();
    }
    let total = snapshot.len();
    if total <= display_count.saturating_mul(2) {
        return RankingView {
            lines: snapshot.iter().cloned().map(RankingLine::Entry).collect(),
        };
    }

    let mut lines = Vec::with_capacity(display_count * 2 + 3);
    lines.push(RankingLine::Closest(display_count));
    lines.extend(
        snapshot[..display_count]
            .iter()
            .cloned()
            .map(RankingLine::Entry),
    );
    lines.push(RankingLine::Ellipsis);
    lines.push(RankingLine::Furthest(display_count));
    lines.extend(
        snapshot[total - display_count..]
            .iter()
            .cloned()
            .map(RankingLine::Entry),
    );
    RankingView { lines }
}
