use crate::error::GenerationError;
use crate::game_state::{GameInterface, MenuChoice, PostGameChoice, SessionInfo, UserAction};
use crate::question::Difficulty;
use crate::ranking::{FEEDBACK_DECIMALS, RankingView};
use crate::session::{GuessResult, Outcome, RejectReason, TerminalSummary};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

/// Guess the hidden word from how close your guesses are in meaning
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Word vectors in word2vec text format
    #[arg(short = 'm', long = "model", default_value = "model/cc.ja.300.vec")]
    pub model_path: PathBuf,

    /// Directory holding easy_data.json, normal_data.json and hard_data.json
    #[arg(short = 'd', long = "data", default_value = "data")]
    pub data_dir: PathBuf,

    /// Settings file (defaults to the user config directory)
    #[arg(short = 's', long = "settings")]
    pub settings_path: Option<PathBuf>,

    /// Load only the first N vectors of the model
    #[arg(short = 'l', long = "limit")]
    pub vocabulary_limit: Option<usize>,

    /// Seed for question selection
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Use the full-screen terminal interface
    #[arg(long = "tui")]
    pub tui: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

// Line-mode input parsing

const GIVE_UP_COMMAND: &str = "giveup";
const EXIT_COMMAND: &str = "exit";

/// Read one line, `None` at end of input.
fn read_trimmed_line<R: BufRead>(reader: &mut R) -> Option<String> {
    let mut input = String::new();
    match reader.read_line(&mut input) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim().to_string()),
    }
}

fn parse_menu_input(input: &str) -> Option<MenuChoice> {
    match input.to_lowercase().as_str() {
        "q" | "quit" | EXIT_COMMAND => Some(MenuChoice::Exit),
        _ => Difficulty::from_code(input).map(MenuChoice::Play),
    }
}

fn parse_action_input(input: &str) -> UserAction {
    match input.to_lowercase().as_str() {
        GIVE_UP_COMMAND => UserAction::GiveUp,
        EXIT_COMMAND => UserAction::Exit,
        _ => UserAction::Guess(input.to_string()),
    }
}

fn parse_post_game_input(input: &str) -> Option<PostGameChoice> {
    match input.to_lowercase().as_str() {
        "y" | "yes" | "r" => Some(PostGameChoice::Replay),
        "m" | "menu" => Some(PostGameChoice::Menu),
        "q" | "n" | "no" | EXIT_COMMAND => Some(PostGameChoice::Exit),
        _ => None,
    }
}

// Line-mode output

pub fn format_guess_result(guess: &str, result: &GuessResult, show_score: bool) -> String {
    match result {
        GuessResult::Win => format!("★★ Correct! The word was \"{guess}\". ★★"),
        GuessResult::Accepted(score) if show_score => {
            format!("\"{guess}\"... closeness: {:.*}", FEEDBACK_DECIMALS, score)
        }
        GuessResult::Accepted(_) => format!("\"{guess}\"... guess accepted"),
        GuessResult::Rejected(RejectReason::Empty) => "Please enter a word.".to_string(),
        GuessResult::Rejected(RejectReason::OutOfVocabulary) => {
            "That word is not in the dictionary. Try another one.".to_string()
        }
        GuessResult::Rejected(RejectReason::AlreadyGuessed) => {
            "You have already guessed that word.".to_string()
        }
        GuessResult::Rejected(RejectReason::SessionOver) => "This game is over.".to_string(),
    }
}

pub fn format_summary(summary: &TerminalSummary) -> Vec<String> {
    let mut lines = Vec::new();
    match summary.outcome {
        Outcome::Won => lines.push("★★ Correct! Congratulations! ★★".to_string()),
        Outcome::TimedOut => lines.push(format!("Time's up! The word was \"{}\".", summary.target)),
        Outcome::GaveUp => lines.push(format!("You gave up. The word was \"{}\".", summary.target)),
        Outcome::InProgress => {}
    }
    if summary.outcome != Outcome::Won
        && let Some((word, score)) = &summary.best
    {
        lines.push(format!("Best guess: \"{word}\" ({:.*})", FEEDBACK_DECIMALS, score));
    }
    lines
}

/// Start banner. The genre line is left out when the label is hidden.
pub fn format_session_start(info: &SessionInfo) -> Vec<String> {
    let mut lines = vec!["--- Game start! ---".to_string()];
    if !info.label.is_hidden() {
        lines.push(format!("Genre: {}", info.label));
    }
    lines.push(format!("Time limit: {} seconds", info.time_limit.as_secs()));
    lines.push(format!(
        "Guess the hidden word. Type '{GIVE_UP_COMMAND}' to give up or '{EXIT_COMMAND}' to quit."
    ));
    lines
}

pub fn format_generation_failure(error: &GenerationError) -> String {
    format!("Could not create a question: {error}")
}

/// Line-mode front-end reading commands from any `BufRead`.
///
/// Follows the polling model: the remaining time is shown in each prompt and
/// the loop re-checks the clock after every line.
pub struct CliInterface<R: BufRead> {
    reader: R,
}

impl<R: BufRead> CliInterface<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> GameInterface for CliInterface<R> {
    fn read_menu_choice(&mut self) -> Option<MenuChoice> {
        println!("\nChoose a difficulty:");
        println!("1: easy, 2: normal, 3: hard, c: custom keyword, q: quit");
        let Some(input) = read_trimmed_line(&mut self.reader) else {
            return Some(MenuChoice::Exit);
        };
        if input.eq_ignore_ascii_case("c") {
            println!("Enter a genre keyword:");
            let keyword = read_trimmed_line(&mut self.reader)?;
            return Some(MenuChoice::Play(Difficulty::Custom { keyword }));
        }
        let choice = parse_menu_input(&input);
        if choice.is_none() {
            println!("Please enter 1, 2, 3, c or q.");
        }
        choice
    }

    fn display_generation_failure(&mut self, error: &GenerationError) {
        println!("{}", format_generation_failure(error));
    }

    fn display_session_start(&mut self, info: &SessionInfo) {
        println!();
        for line in format_session_start(info) {
            println!("{line}");
        }
    }

    fn read_action(&mut self, remaining: Duration) -> Option<UserAction> {
        println!("\nTime left: {}s | Your guess:", remaining.as_secs());
        match read_trimmed_line(&mut self.reader) {
            Some(input) => Some(parse_action_input(&input)),
            None => Some(UserAction::Exit),
        }
    }

    fn display_guess_result(&mut self, guess: &str, result: &GuessResult, show_score: bool) {
        println!("{}", format_guess_result(guess, result, show_score));
    }

    fn display_ranking(&mut self, view: &RankingView, show_scores: bool) {
        if view.is_empty() {
            return;
        }
        println!("\n--- Guess ranking ---");
        for line in view.to_text_lines(show_scores) {
            println!("{line}");
        }
    }

    fn display_game_over(&mut self, summary: &TerminalSummary) {
        println!();
        for line in format_summary(summary) {
            println!("{line}");
        }
    }

    fn read_post_game_choice(&mut self) -> Option<PostGameChoice> {
        println!("\nPlay again? (y: same difficulty, m: menu, q: quit)");
        let Some(input) = read_trimmed_line(&mut self.reader) else {
            return Some(PostGameChoice::Exit);
        };
        let choice = parse_post_game_input(&input);
        if choice.is_none() {
            println!("Please enter y, m or q.");
        }
        choice
    }

    fn display_exit_message(&mut self) {
        println!("Exiting.");
    }
}
