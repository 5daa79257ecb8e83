// Library interface for semantic-guess
// Both front-ends and the integration tests go through these modules.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod game_state;
pub mod logging;
pub mod question;
pub mod ranking;
pub mod session;
pub mod tui;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use config::Settings;
pub use embedding::{EmbeddingProvider, VectorTable};
pub use engine::Engine;
pub use error::{DataError, EmbeddingError, GameError, GenerationError};
pub use game_state::{GameInterface, game_loop};
pub use question::{Difficulty, Label, Question};
pub use ranking::{RankedGuess, RankingLine, RankingView};
pub use session::{GuessResult, Outcome, RejectReason, Session, TerminalSummary};
pub use wordbank::GenrePools;
