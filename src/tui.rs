//! TUI (Terminal User Interface) front-end.
//!
//! This module provides an interactive full-screen interface using Ratatui.
//!
//! # Timing
//! Unlike the line-mode front-end, the TUI never blocks on input: it polls
//! for key events in short slices and uses a [`TickTimer`] to hand a
//! `UserAction::Tick` back to the game loop once per second, which keeps the
//! countdown label live and lets the session time out while the player is
//! still typing.
//!
//! # State Machine
//! - `Menu` → `EnteringKeyword` (custom mode) → `Playing`
//! - `Menu` → `Playing` → `GameOver` → `Playing` (replay) or `Menu`

use crate::cli::{format_generation_failure, format_guess_result, format_summary};
use crate::error::GenerationError;
use crate::game_state::{
    GameInterface, MenuChoice, PostGameChoice, SessionInfo, TickTimer, UserAction,
};
use crate::question::Difficulty;
use crate::ranking::RankingView;
use crate::session::{GuessResult, Outcome, RejectReason, TerminalSummary};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::{Duration, Instant};

const EVENT_POLL_TIMEOUT_MS: u64 = 100;
const MAX_INPUT_CHARS: usize = 32;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const WARNING_STYLE: Style = Style::new().fg(Color::Yellow);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const TIMEOUT_STYLE: Style = Style::new().fg(Color::LightRed).add_modifier(Modifier::BOLD);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

#[derive(Debug, Clone, Copy, PartialEq)]
enum TuiState {
    Menu,
    EnteringKeyword,
    Playing,
    GameOver,
}

/// Context for rendering the UI - groups related parameters to avoid too many function arguments.
struct RenderContext<'a> {
    state: TuiState,
    input: &'a str,
    label: &'a str,
    remaining: Duration,
    feedback: &'a [Line<'static>],
    ranking: &'a [String],
    error_message: &'a str,
    status: &'a str,
}

/// Full-screen front-end.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    state: TuiState,
    input: String,
    label: String,
    remaining: Duration,
    feedback: Vec<Line<'static>>,
    ranking: Vec<String>,
    error_message: String,
    status: String,
    timer: TickTimer,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete: raw mode, alternate screen, cursor hidden");

        Ok(Self {
            terminal,
            state: TuiState::Menu,
            input: String::new(),
            label: String::new(),
            remaining: Duration::ZERO,
            feedback: Vec::new(),
            ranking: Vec::new(),
            error_message: String::new(),
            status: "Choose a difficulty".to_string(),
            timer: TickTimer::default(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    fn draw(&mut self) -> Result<(), io::Error> {
        let ctx = RenderContext {
            state: self.state,
            input: &self.input,
            label: &self.label,
            remaining: self.remaining,
            feedback: &self.feedback,
            ranking: &self.ranking,
            error_message: &self.error_message,
            status: &self.status,
        };

        self.terminal.draw(|f| {
            Self::render_static(f, &ctx);
        })?;
        Ok(())
    }

    fn draw_or_log(&mut self) {
        if let Err(e) = self.draw() {
            debug_log!("Draw error: {}", e);
        }
    }

    fn render_static(f: &mut Frame, ctx: &RenderContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(3), // Genre and timer
                Constraint::Length(3), // Input
                Constraint::Length(4), // Feedback
                Constraint::Min(6),    // Ranking
                Constraint::Length(3), // Status line
                Constraint::Length(3), // Instructions
            ])
            .split(f.area());

        Self::render_title(f, chunks[0]);
        Self::render_header(f, chunks[1], ctx);
        Self::render_input(f, chunks[2], ctx);
        Self::render_feedback(f, chunks[3], ctx.feedback, ctx.error_message);
        Self::render_ranking(f, chunks[4], ctx);
        Self::render_status(f, chunks[5], ctx.status);
        Self::render_instructions(f, chunks[6], ctx.state);
    }

    fn render_title(f: &mut Frame, area: Rect) {
        let title = Paragraph::new("SEMANTIC GUESS")
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(title, area);
    }

    fn render_header(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let halves = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(area);

        let genre = match ctx.state {
            TuiState::Playing | TuiState::GameOver => format!("Genre: {}", ctx.label),
            TuiState::Menu | TuiState::EnteringKeyword => String::new(),
        };
        f.render_widget(
            Paragraph::new(genre).block(Block::default().borders(Borders::ALL)),
            halves[0],
        );

        let timer_style = if ctx.remaining.as_secs() < 10 && ctx.state == TuiState::Playing {
            ERROR_STYLE
        } else {
            Style::default()
        };
        let timer = match ctx.state {
            TuiState::Playing => format!("Time left: {}s", ctx.remaining.as_secs()),
            _ => String::new(),
        };
        f.render_widget(
            Paragraph::new(timer)
                .style(timer_style)
                .block(Block::default().borders(Borders::ALL)),
            halves[1],
        );
    }

    fn render_input(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let title = match ctx.state {
            TuiState::EnteringKeyword => "Genre keyword",
            _ => "Your guess",
        };
        let text = match ctx.state {
            TuiState::Playing | TuiState::EnteringKeyword => format!("> {}_", ctx.input),
            TuiState::Menu => "1: Easy   2: Normal   3: Hard   C: Custom keyword".to_string(),
            TuiState::GameOver => String::new(),
        };
        let paragraph = Paragraph::new(text).block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_feedback(f: &mut Frame, area: Rect, feedback: &[Line<'static>], error_message: &str) {
        let mut lines = feedback.to_vec();
        if !error_message.is_empty() {
            lines.push(Line::from(vec![Span::styled(
                error_message.to_string(),
                ERROR_STYLE,
            )]));
        }
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_ranking(f: &mut Frame, area: Rect, ctx: &RenderContext) {
        let lines: Vec<Line> = ctx
            .ranking
            .iter()
            .map(|entry| Line::from(entry.as_str()))
            .collect();
        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .title("Guess ranking")
                .borders(Borders::ALL),
        );
        f.render_widget(paragraph, area);
    }

    fn render_instructions(f: &mut Frame, area: Rect, state: TuiState) {
        let text = match state {
            TuiState::Menu => "1/2/3: Difficulty | C: Custom keyword | ESC: Quit",
            TuiState::EnteringKeyword => "Type a keyword | ENTER: Start | ESC: Back to menu",
            TuiState::Playing => "Type a word | ENTER: Guess | CTRL+G: Give up | ESC: Quit",
            TuiState::GameOver => "R: Play again | M: Menu | ESC: Quit",
        };

        let paragraph = Paragraph::new(text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(paragraph, area);
    }

    fn render_status(f: &mut Frame, area: Rect, status: &str) {
        let status_text = if status.is_empty() { "Ready" } else { status };
        let paragraph = Paragraph::new(status_text)
            .style(HEADER_STYLE)
            .block(Block::default().borders(Borders::ALL).title("Status"));
        f.render_widget(paragraph, area);
    }

    /// Wait up to `timeout` for a key press.
    ///
    /// Returns `Ok(None)` when nothing usable arrived.
    fn next_key(timeout: Duration) -> Result<Option<KeyEvent>, io::Error> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                debug_log!(
                    "next_key() - code={:?}, modifiers={:?}",
                    key.code,
                    key.modifiers
                );
                Ok(Some(key))
            }
            other => {
                debug_log!("next_key() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }

    fn has_modifier_keys(key: &KeyEvent) -> bool {
        key.modifiers.contains(KeyModifiers::ALT) || key.modifiers.contains(KeyModifiers::CONTROL)
    }

    /// Apply an editing key to the input line. Returns `true` if it was consumed.
    fn edit_input(&mut self, key: &KeyEvent) -> bool {
        match key.code {
            // Replacement and control characters show up when alt-tabbing.
            KeyCode::Char(c) if c == '\u{FFFD}' || c.is_control() => true,
            KeyCode::Char(c) if !Self::has_modifier_keys(key) => {
                if self.input.chars().count() < MAX_INPUT_CHARS {
                    self.input.push(c);
                } else {
                    self.error_message = format!("Input is limited to {MAX_INPUT_CHARS} characters");
                }
                true
            }
            KeyCode::Backspace => {
                self.input.pop();
                true
            }
            _ => false,
        }
    }

    fn handle_menu_key(&mut self, key: &KeyEvent) -> Option<MenuChoice> {
        match key.code {
            KeyCode::Char('1') => Some(MenuChoice::Play(Difficulty::Easy)),
            KeyCode::Char('2') => Some(MenuChoice::Play(Difficulty::Normal)),
            KeyCode::Char('3') => Some(MenuChoice::Play(Difficulty::Hard)),
            KeyCode::Char('c' | 'C') => {
                self.transition_to(TuiState::EnteringKeyword);
                self.status = "Custom mode - enter a genre keyword".to_string();
                None
            }
            KeyCode::Esc => Some(MenuChoice::Exit),
            _ => None,
        }
    }

    fn handle_keyword_key(&mut self, key: &KeyEvent) -> Option<MenuChoice> {
        match key.code {
            KeyCode::Enter => {
                let keyword = std::mem::take(&mut self.input).trim().to_string();
                if keyword.is_empty() {
                    self.error_message = "Please enter a keyword.".to_string();
                    return None;
                }
                self.status = "Generating a question...".to_string();
                Some(MenuChoice::Play(Difficulty::Custom { keyword }))
            }
            KeyCode::Esc => {
                self.transition_to(TuiState::Menu);
                None
            }
            _ => {
                self.edit_input(key);
                None
            }
        }
    }

    fn handle_playing_key(&mut self, key: &KeyEvent) -> Option<UserAction> {
        match key.code {
            KeyCode::Enter => Some(UserAction::Guess(std::mem::take(&mut self.input))),
            KeyCode::Char('g' | 'G') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                info_log!("handle_playing_key() - give up requested");
                Some(UserAction::GiveUp)
            }
            KeyCode::Esc => Some(UserAction::Exit),
            _ => {
                if !self.edit_input(key) {
                    debug_log!("handle_playing_key() - Ignoring key: {:?}", key.code);
                }
                None
            }
        }
    }

    fn handle_game_over_key(key: &KeyEvent) -> Option<PostGameChoice> {
        match key.code {
            KeyCode::Char('r' | 'R') => Some(PostGameChoice::Replay),
            KeyCode::Char('m' | 'M') => Some(PostGameChoice::Menu),
            KeyCode::Esc | KeyCode::Char('q' | 'Q') => Some(PostGameChoice::Exit),
            _ => None,
        }
    }

    fn transition_to(&mut self, state: TuiState) {
        debug_log!("transition_to() - {:?} -> {:?}", self.state, state);
        self.state = state;
        self.input.clear();
        self.error_message.clear();
    }

    fn guess_style(result: &GuessResult) -> Style {
        match result {
            GuessResult::Win => SUCCESS_STYLE,
            GuessResult::Accepted(_) => MESSAGE_STYLE,
            GuessResult::Rejected(RejectReason::AlreadyGuessed | RejectReason::Empty) => {
                WARNING_STYLE
            }
            GuessResult::Rejected(_) => ERROR_STYLE,
        }
    }

    fn summary_style(outcome: Outcome) -> Style {
        match outcome {
            Outcome::Won => SUCCESS_STYLE,
            Outcome::GaveUp => WARNING_STYLE,
            Outcome::TimedOut | Outcome::InProgress => TIMEOUT_STYLE,
        }
    }
}

impl GameInterface for TuiInterface {
    fn read_menu_choice(&mut self) -> Option<MenuChoice> {
        if !matches!(self.state, TuiState::Menu | TuiState::EnteringKeyword) {
            self.transition_to(TuiState::Menu);
            self.status = "Choose a difficulty".to_string();
        }
        loop {
            if self.draw().is_err() {
                info_log!("read_menu_choice() - Draw failed, returning Exit");
                return Some(MenuChoice::Exit);
            }
            let key = match Self::next_key(Duration::from_millis(EVENT_POLL_TIMEOUT_MS)) {
                Ok(Some(key)) => key,
                Ok(None) => continue,
                Err(e) => {
                    debug_log!("read_menu_choice() - Input error: {}", e);
                    return Some(MenuChoice::Exit);
                }
            };
            let choice = match self.state {
                TuiState::EnteringKeyword => self.handle_keyword_key(&key),
                _ => self.handle_menu_key(&key),
            };
            if choice.is_some() {
                info_log!("read_menu_choice() - {:?}", choice);
                return choice;
            }
        }
    }

    fn display_generation_failure(&mut self, error: &GenerationError) {
        self.timer.cancel();
        self.transition_to(TuiState::Menu);
        self.error_message = format_generation_failure(error);
        self.status = "Choose a difficulty".to_string();
        self.draw_or_log();
    }

    fn display_session_start(&mut self, info: &SessionInfo) {
        self.transition_to(TuiState::Playing);
        self.label = info.label.to_string();
        self.remaining = info.time_limit;
        self.feedback.clear();
        self.ranking.clear();
        self.status = "Game start! Guess the hidden word".to_string();
        // A fresh deadline; nothing from a previous session carries over.
        self.timer.arm(Instant::now());
        self.draw_or_log();
    }

    fn read_action(&mut self, remaining: Duration) -> Option<UserAction> {
        self.remaining = remaining;
        loop {
            if self.draw().is_err() {
                info_log!("read_action() - Draw failed, returning Exit");
                return Some(UserAction::Exit);
            }
            let now = Instant::now();
            if self.timer.poll(now) {
                return Some(UserAction::Tick);
            }
            let wait = self
                .timer
                .until_due(now)
                .unwrap_or(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))
                .min(Duration::from_millis(EVENT_POLL_TIMEOUT_MS));
            match Self::next_key(wait) {
                Ok(Some(key)) => {
                    self.error_message.clear();
                    if let Some(action) = self.handle_playing_key(&key) {
                        return Some(action);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    debug_log!("read_action() - Input error: {}", e);
                    return Some(UserAction::Exit);
                }
            }
        }
    }

    fn display_guess_result(&mut self, guess: &str, result: &GuessResult, show_score: bool) {
        self.feedback = vec![Line::from(vec![Span::styled(
            format_guess_result(guess, result, show_score),
            Self::guess_style(result),
        )])];
        self.draw_or_log();
    }

    fn display_ranking(&mut self, view: &RankingView, show_scores: bool) {
        self.ranking = view.to_text_lines(show_scores);
        self.draw_or_log();
    }

    fn display_game_over(&mut self, summary: &TerminalSummary) {
        self.timer.cancel();
        self.transition_to(TuiState::GameOver);
        let style = Self::summary_style(summary.outcome);
        self.feedback = format_summary(summary)
            .into_iter()
            .map(|line| Line::from(vec![Span::styled(line, style)]))
            .collect();
        self.status = format!("Game over - the word was {}", summary.target);
        self.draw_or_log();
    }

    fn read_post_game_choice(&mut self) -> Option<PostGameChoice> {
        loop {
            if self.draw().is_err() {
                return Some(PostGameChoice::Exit);
            }
            match Self::next_key(Duration::from_millis(EVENT_POLL_TIMEOUT_MS)) {
                Ok(Some(key)) => {
                    if let Some(choice) = Self::handle_game_over_key(&key) {
                        return Some(choice);
                    }
                }
                Ok(None) => {}
                Err(_) => return Some(PostGameChoice::Exit),
            }
        }
    }

    fn display_exit_message(&mut self) {
        self.timer.cancel();
        self.status = "Exiting...".to_string();
        self.draw_or_log();
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
