//! One timed play-through: guess evaluation and the outcome state machine.

use crate::embedding::EmbeddingProvider;
use crate::question::{Label, Question};
use crate::ranking::{self, History, RankingView};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    InProgress,
    Won,
    TimedOut,
    GaveUp,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Empty,
    OutOfVocabulary,
    AlreadyGuessed,
    SessionOver,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GuessResult {
    Win,
    Accepted(f32),
    Rejected(RejectReason),
}

/// What the player sees once a session has ended.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalSummary {
    pub outcome: Outcome,
    pub target: String,
    pub best: Option<(String, f32)>,
}

#[derive(Debug, Clone)]
pub struct Session {
    question: Question,
    time_limit: Duration,
    started_at: Instant,
    history: History,
    outcome: Outcome,
}

impl Session {
    pub fn new(question: Question, time_limit: Duration) -> Self {
        Self::started_at(question, time_limit, Instant::now())
    }

    pub fn started_at(question: Question, time_limit: Duration, started_at: Instant) -> Self {
        Self {
            question,
            time_limit,
            started_at,
            history: History::new(),
            outcome: Outcome::InProgress,
        }
    }

    pub fn target(&self) -> &str {
        &self.question.target
    }

    pub fn label(&self) -> &Label {
        &self.question.label
    }

    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    pub fn remaining_at(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.started_at);
        self.time_limit.saturating_sub(elapsed)
    }

    /// Check the clock. Returns the new outcome if the session just timed out.
    pub fn tick(&mut self) -> Option<Outcome> {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> Option<Outcome> {
        if self.outcome == Outcome::InProgress && self.remaining_at(now).is_zero() {
            self.finish(Outcome::TimedOut);
            return Some(Outcome::TimedOut);
        }
        None
    }

    /// Give up. Has no effect once the session is over.
    pub fn abandon(&mut self) -> bool {
        if self.outcome != Outcome::InProgress {
            return false;
        }
        self.finish(Outcome::GaveUp);
        true
    }

    /// Classify and score a guess. The exact-match check runs before the
    /// vocabulary and duplicate checks, so the target always wins.
    pub fn submit_guess(&mut self, provider: &dyn EmbeddingProvider, raw: &str) -> GuessResult {
        if self.is_over() {
            return GuessResult::Rejected(RejectReason::SessionOver);
        }
        let guess = raw.trim();
        if guess.is_empty() {
            return GuessResult::Rejected(RejectReason::Empty);
        }
        if guess == self.question.target {
            self.finish(Outcome::Won);
            return GuessResult::Win;
        }
        if !provider.contains(guess) {
            return GuessResult::Rejected(RejectReason::OutOfVocabulary);
        }
        if self.history.contains(guess) {
            return GuessResult::Rejected(RejectReason::AlreadyGuessed);
        }
        let score = provider.similarity(&self.question.target, guess);
        self.history.insert(guess, score);
        log::debug!("Scored guess '{guess}' at {score:.4}");
        GuessResult::Accepted(score)
    }

    pub fn ranking(&self, display_count: usize) -> RankingView {
        ranking::render(&ranking::snapshot(&self.history), display_count)
    }

    pub fn terminal_summary(&self) -> TerminalSummary {
        TerminalSummary {
            outcome: self.outcome,
            target: self.question.target.clone(),
            best: self
                .history
                .best()
                .map(|(word, score)| (word.to_string(), score)),
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        log::info!(
            "Session ended: {:?} after {} guesses",
            outcome,
            self.history.len()
        );
        self.outcome = outcome;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::VectorTable;

    fn provider() -> VectorTable {
        VectorTable::from_entries([
            ("海".to_string(), vec![1.0, 0.0, 0.0]),
            ("湖".to_string(), vec![0.8, 0.6, 0.0]),
            ("川".to_string(), vec![0.6, 0.8, 0.0]),
            ("山".to_string(), vec![0.0, 0.0, 1.0]),
        ])
    }

    fn session_at(start: Instant, limit_secs: u64) -> Session {
        let question = Question {
            target: "海".to_string(),
            label: Label::Hidden,
        };
        Session::started_at(question, Duration::from_secs(limit_secs), start)
    }

    #[test]
    fn test_accepted_guess_is_scored_once() {
        let provider = provider();
        let mut session = session_at(Instant::now(), 180);
        match session.submit_guess(&provider, "湖") {
            GuessResult::Accepted(score) => assert!((score - 0.8).abs() < 1e-5),
            other => panic!("Expected Accepted, got {other:?}"),
        }
        assert_eq!(
            session.submit_guess(&provider, " 湖 "),
            GuessResult::Rejected(RejectReason::AlreadyGuessed)
        );
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_empty_and_unknown_guesses_leave_history_alone() {
        let provider = provider();
        let mut session = session_at(Instant::now(), 180);
        assert_eq!(
            session.submit_guess(&provider, "   "),
            GuessResult::Rejected(RejectReason::Empty)
        );
        assert_eq!(
            session.submit_guess(&provider, "砂漠"),
            GuessResult::Rejected(RejectReason::OutOfVocabulary)
        );
        assert!(session.history().is_empty());
        assert_eq!(session.outcome(), Outcome::InProgress);
    }

    #[test]
    fn test_exact_match_wins_even_out_of_vocabulary() {
        let provider = VectorTable::from_entries([("山".to_string(), vec![1.0])]);
        let mut session = session_at(Instant::now(), 180);
        assert_eq!(
            session.submit_guess(&provider, "海x"),
            GuessResult::Rejected(RejectReason::OutOfVocabulary)
        );
        assert_eq!(session.submit_guess(&provider, "海"), GuessResult::Win);
        assert_eq!(session.outcome(), Outcome::Won);
        assert!(!session.history().contains("海"));
    }

    #[test]
    fn test_guess_is_trimmed_but_not_case_folded() {
        let provider = VectorTable::from_entries([
            ("Sea".to_string(), vec![1.0, 0.0]),
            ("sea".to_string(), vec![0.0, 1.0]),
        ]);
        let mut session = Session::started_at(
            Question {
                target: "Sea".to_string(),
                label: Label::Hidden,
            },
            Duration::from_secs(60),
            Instant::now(),
        );
        assert!(matches!(
            session.submit_guess(&provider, "sea"),
            GuessResult::Accepted(_)
        ));
        assert_eq!(session.submit_guess(&provider, "  Sea\n"), GuessResult::Win);
    }

    #[test]
    fn test_timeout_after_limit() {
        let provider = provider();
        let start = Instant::now();
        let mut session = session_at(start, 180);
        session.submit_guess(&provider, "湖");
        session.submit_guess(&provider, "山");

        assert_eq!(session.tick_at(start + Duration::from_secs(179)), None);
        assert_eq!(
            session.remaining_at(start + Duration::from_secs(179)),
            Duration::from_secs(1)
        );
        assert_eq!(
            session.tick_at(start + Duration::from_secs(181)),
            Some(Outcome::TimedOut)
        );
        assert_eq!(session.remaining_at(start + Duration::from_secs(181)), Duration::ZERO);

        let summary = session.terminal_summary();
        assert_eq!(summary.outcome, Outcome::TimedOut);
        assert_eq!(summary.target, "海");
        let (word, score) = summary.best.unwrap();
        assert_eq!(word, "湖");
        assert!((score - 0.8).abs() < 1e-5);
    }

    #[test]
    fn test_timeout_without_guesses_has_no_best() {
        let start = Instant::now();
        let mut session = session_at(start, 180);
        assert_eq!(
            session.tick_at(start + Duration::from_secs(181)),
            Some(Outcome::TimedOut)
        );
        assert_eq!(session.terminal_summary().best, None);
    }

    #[test]
    fn test_terminal_outcome_never_changes() {
        let provider = provider();
        let start = Instant::now();
        let mut session = session_at(start, 10);
        assert!(session.abandon());
        assert_eq!(session.outcome(), Outcome::GaveUp);

        assert_eq!(session.tick_at(start + Duration::from_secs(60)), None);
        assert!(!session.abandon());
        assert_eq!(
            session.submit_guess(&provider, "海"),
            GuessResult::Rejected(RejectReason::SessionOver)
        );
        assert_eq!(session.outcome(), Outcome::GaveUp);
    }

    #[test]
    fn test_won_session_ignores_timeout() {
        let provider = provider();
        let start = Instant::now();
        let mut session = session_at(start, 10);
        assert_eq!(session.submit_guess(&provider, "海"), GuessResult::Win);
        assert_eq!(session.tick_at(start + Duration::from_secs(11)), None);
        assert_eq!(session.outcome(), Outcome::Won);
    }

    #[test]
    fn test_ranking_reflects_history() {
        let provider = provider();
        let mut session = session_at(Instant::now(), 180);
        for word in ["山", "川", "湖"] {
            session.submit_guess(&provider, word);
        }
        let words: Vec<String> = session.ranking(5).entries().map(|e| e.word.clone()).collect();
        assert_eq!(words, vec!["湖", "川", "山"]);
        assert!(session.ranking(0).is_empty());
    }
}
