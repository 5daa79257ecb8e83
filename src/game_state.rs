use crate::config::Settings;
use crate::engine::Engine;
use crate::error::GenerationError;
use crate::question::{Difficulty, Label};
use crate::ranking::RankingView;
use crate::session::{GuessResult, Session, TerminalSummary};
use crate::{debug_log, info_log};
use rand::Rng;
use std::time::{Duration, Instant};

/// How often the timer-driven front-end re-checks the clock.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    Play(Difficulty),
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Guess(String),
    GiveUp,
    /// The front-end's timer fired; re-check the clock.
    Tick,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostGameChoice {
    Replay,
    Menu,
    Exit,
}

/// What a front-end shows when a session begins.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub label: Label,
    pub time_limit: Duration,
}

/// Input and output surface shared by the line-mode and terminal UIs.
///
/// `read_*` methods return `None` when the input was unusable and should
/// simply be asked for again.
pub trait GameInterface {
    fn read_menu_choice(&mut self) -> Option<MenuChoice>;
    fn display_generation_failure(&mut self, error: &GenerationError);
    fn display_session_start(&mut self, info: &SessionInfo);
    fn read_action(&mut self, remaining: Duration) -> Option<UserAction>;
    fn display_guess_result(&mut self, guess: &str, result: &GuessResult, show_score: bool);
    fn display_ranking(&mut self, view: &RankingView, show_scores: bool);
    fn display_game_over(&mut self, summary: &TerminalSummary);
    fn read_post_game_choice(&mut self) -> Option<PostGameChoice>;
    fn display_exit_message(&mut self);
}

/// Periodic clock check for event-loop front-ends.
///
/// Armed when a session starts, cancelled when it ends. Re-arming for a new
/// session discards any pending deadline from the previous one.
#[derive(Debug, Clone)]
pub struct TickTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl TickTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn arm(&mut self, now: Instant) {
        self.next_due = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Time left until the next firing, if armed.
    pub fn until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }

    /// Returns `true` once per elapsed interval and schedules the next firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}

impl Default for TickTimer {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

enum SessionEnd {
    Finished,
    Exit,
}

/// Run menus and sessions until the player exits.
pub fn game_loop<I, R>(engine: &Engine, settings: &Settings, interface: &mut I, rng: &mut R)
where
    I: GameInterface + ?Sized,
    R: Rng + ?Sized,
{
    'menu: loop {
        let difficulty = match interface.read_menu_choice() {
            Some(MenuChoice::Play(difficulty)) => difficulty,
            Some(MenuChoice::Exit) => break,
            None => continue,
        };

        loop {
            let mut session = match engine.start_session(&difficulty, settings, rng) {
                Ok(session) => session,
                Err(e) => {
                    interface.display_generation_failure(&e);
                    continue 'menu;
                }
            };

            if let SessionEnd::Exit = play_session(engine, settings, interface, &mut session) {
                break 'menu;
            }

            let choice = loop {
                if let Some(choice) = interface.read_post_game_choice() {
                    break choice;
                }
            };
            info_log!("game_loop() - post-game choice: {:?}", choice);
            match choice {
                PostGameChoice::Replay => continue,
                PostGameChoice::Menu => continue 'menu,
                PostGameChoice::Exit => break 'menu,
            }
        }
    }
    interface.display_exit_message();
}

fn play_session<I>(
    engine: &Engine,
    settings: &Settings,
    interface: &mut I,
    session: &mut Session,
) -> SessionEnd
where
    I: GameInterface + ?Sized,
{
    interface.display_session_start(&SessionInfo {
        label: session.label().clone(),
        time_limit: session.time_limit(),
    });

    while !session.is_over() {
        if session.tick().is_some() {
            break;
        }

        let action = interface.read_action(session.remaining());
        debug_log!("play_session() - action: {:?}", action);
        match action {
            None | Some(UserAction::Tick) => {}
            Some(UserAction::Exit) => return SessionEnd::Exit,
            Some(UserAction::GiveUp) => {
                session.abandon();
            }
            Some(UserAction::Guess(text)) => {
                // Input may have taken longer than the time left.
                if session.tick().is_some() {
                    break;
                }
                let result = engine.submit_guess(session, &text);
                interface.display_guess_result(text.trim(), &result, settings.show_similarity);
                if let GuessResult::Accepted(_) = result {
                    let view = session.ranking(settings.ranking_display_count);
                    interface.display_ranking(&view, settings.show_similarity);
                }
            }
        }
    }

    interface.display_game_over(&session.terminal_summary());
    SessionEnd::Finished
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::VectorTable;
    use crate::session::{Outcome, RejectReason};
    use crate::wordbank::GenrePools;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::VecDeque;

    /// Scripted front-end that records everything the loop tells it.
    #[derive(Default)]
    struct ScriptedInterface {
        menu: VecDeque<Option<MenuChoice>>,
        actions: VecDeque<Option<UserAction>>,
        post_game: VecDeque<Option<PostGameChoice>>,
        failures: Vec<GenerationError>,
        starts: usize,
        results: Vec<(String, GuessResult)>,
        rankings: Vec<RankingView>,
        summaries: Vec<TerminalSummary>,
        exited: bool,
    }

    impl GameInterface for ScriptedInterface {
        fn read_menu_choice(&mut self) -> Option<MenuChoice> {
            self.menu.pop_front().unwrap_or(Some(MenuChoice::Exit))
        }

        fn display_generation_failure(&mut self, error: &GenerationError) {
            self.failures.push(error.clone());
        }

        fn display_session_start(&mut self, _info: &SessionInfo) {
            self.starts += 1;
        }

        fn read_action(&mut self, _remaining: Duration) -> Option<UserAction> {
            self.actions.pop_front().unwrap_or(Some(UserAction::Exit))
        }

        fn display_guess_result(&mut self, guess: &str, result: &GuessResult, _show_score: bool) {
            self.results.push((guess.to_string(), result.clone()));
        }

        fn display_ranking(&mut self, view: &RankingView, _show_scores: bool) {
            self.rankings.push(view.clone());
        }

        fn display_game_over(&mut self, summary: &TerminalSummary) {
            self.summaries.push(summary.clone());
        }

        fn read_post_game_choice(&mut self) -> Option<PostGameChoice> {
            self.post_game.pop_front().unwrap_or(Some(PostGameChoice::Exit))
        }

        fn display_exit_message(&mut self) {
            self.exited = true;
        }
    }

    fn fixtures() -> (VectorTable, GenrePools) {
        let provider = VectorTable::from_entries([
            ("海".to_string(), vec![1.0, 0.0]),
            ("湖".to_string(), vec![0.9, 0.1]),
            ("山".to_string(), vec![0.0, 1.0]),
        ]);
        let pools = GenrePools::from_json_strs(
            r#"{"自然": {"example_words": ["海"]}}"#,
            r#"{"自然": ["海"]}"#,
            r#"{"自然": ["海"]}"#,
        )
        .unwrap();
        (provider, pools)
    }

    fn guess(word: &str) -> Option<UserAction> {
        Some(UserAction::Guess(word.to_string()))
    }

    #[test]
    fn test_win_after_scored_guesses() {
        let (provider, pools) = fixtures();
        let engine = Engine::new(&provider, &pools);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ui = ScriptedInterface {
            menu: VecDeque::from([Some(MenuChoice::Play(Difficulty::Normal))]),
            actions: VecDeque::from([guess("山"), guess("湖"), None, guess("湖"), guess("海")]),
            ..Default::default()
        };

        game_loop(&engine, &Settings::default(), &mut ui, &mut rng);

        assert_eq!(ui.starts, 1);
        assert_eq!(ui.results.len(), 4);
        assert_eq!(
            ui.results[2].1,
            GuessResult::Rejected(RejectReason::AlreadyGuessed)
        );
        assert_eq!(ui.results[3].1, GuessResult::Win);
        // Only accepted guesses refresh the ranking.
        assert_eq!(ui.rankings.len(), 2);
        assert_eq!(ui.summaries[0].outcome, Outcome::Won);
        assert!(ui.exited);
    }

    #[test]
    fn test_give_up_reports_best_guess() {
        let (provider, pools) = fixtures();
        let engine = Engine::new(&provider, &pools);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ui = ScriptedInterface {
            menu: VecDeque::from([Some(MenuChoice::Play(Difficulty::Hard))]),
            actions: VecDeque::from([guess("山"), guess("湖"), Some(UserAction::GiveUp)]),
            ..Default::default()
        };

        game_loop(&engine, &Settings::default(), &mut ui, &mut rng);

        let summary = &ui.summaries[0];
        assert_eq!(summary.outcome, Outcome::GaveUp);
        assert_eq!(summary.target, "海");
        assert_eq!(summary.best.as_ref().map(|(w, _)| w.as_str()), Some("湖"));
    }

    #[test]
    fn test_generation_failure_returns_to_menu() {
        let (provider, pools) = fixtures();
        let engine = Engine::new(&provider, &pools);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ui = ScriptedInterface {
            menu: VecDeque::from([
                None,
                Some(MenuChoice::Play(Difficulty::Custom {
                    keyword: String::new(),
                })),
                Some(MenuChoice::Play(Difficulty::Normal)),
            ]),
            actions: VecDeque::from([guess("海")]),
            ..Default::default()
        };

        game_loop(&engine, &Settings::default(), &mut ui, &mut rng);

        assert_eq!(ui.failures, vec![GenerationError::EmptyKeyword]);
        assert_eq!(ui.starts, 1);
        assert_eq!(ui.summaries[0].outcome, Outcome::Won);
    }

    #[test]
    fn test_replay_starts_a_fresh_session() {
        let (provider, pools) = fixtures();
        let engine = Engine::new(&provider, &pools);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ui = ScriptedInterface {
            menu: VecDeque::from([Some(MenuChoice::Play(Difficulty::Normal))]),
            actions: VecDeque::from([guess("湖"), guess("海"), guess("湖"), guess("海")]),
            post_game: VecDeque::from([Some(PostGameChoice::Replay), None, Some(PostGameChoice::Exit)]),
            ..Default::default()
        };

        game_loop(&engine, &Settings::default(), &mut ui, &mut rng);

        assert_eq!(ui.starts, 2);
        // The second session has its own empty history, so 湖 is scored again.
        assert!(matches!(ui.results[2].1, GuessResult::Accepted(_)));
        assert_eq!(ui.summaries.len(), 2);
    }

    #[test]
    fn test_exit_mid_session_skips_summary() {
        let (provider, pools) = fixtures();
        let engine = Engine::new(&provider, &pools);
        let mut rng = StdRng::seed_from_u64(1);
        let mut ui = ScriptedInterface {
            menu: VecDeque::from([Some(MenuChoice::Play(Difficulty::Normal))]),
            actions: VecDeque::from([Some(UserAction::Tick), Some(UserAction::Exit)]),
            ..Default::default()
        };

        game_loop(&engine, &Settings::default(), &mut ui, &mut rng);

        assert!(ui.summaries.is_empty());
        assert!(ui.exited);
    }

    #[test]
    fn test_expired_session_discards_late_guess() {
        let (provider, pools) = fixtures();
        let engine = Engine::new(&provider, &pools);
        let mut rng = StdRng::seed_from_u64(1);
        let settings = Settings {
            time_limits: crate::config::TimeLimits {
                easy: 0,
                normal: 0,
                hard: 0,
            },
            ..Settings::default()
        };
        let mut ui = ScriptedInterface {
            menu: VecDeque::from([Some(MenuChoice::Play(Difficulty::Normal))]),
            actions: VecDeque::from([guess("海")]),
            ..Default::default()
        };

        game_loop(&engine, &settings, &mut ui, &mut rng);

        assert!(ui.results.is_empty());
        assert_eq!(ui.summaries[0].outcome, Outcome::TimedOut);
        assert_eq!(ui.summaries[0].best, None);
    }

    #[test]
    fn test_tick_timer_fires_once_per_interval() {
        let start = Instant::now();
        let mut timer = TickTimer::new(Duration::from_secs(1));
        assert!(!timer.poll(start + Duration::from_secs(5)));

        timer.arm(start);
        assert!(timer.is_armed());
        assert!(!timer.poll(start + Duration::from_millis(500)));
        assert_eq!(
            timer.until_due(start + Duration::from_millis(500)),
            Some(Duration::from_millis(500))
        );
        assert!(timer.poll(start + Duration::from_secs(1)));
        assert!(!timer.poll(start + Duration::from_millis(1500)));
        assert!(timer.poll(start + Duration::from_secs(2)));
    }

    #[test]
    fn test_tick_timer_cancel_and_rearm() {
        let start = Instant::now();
        let mut timer = TickTimer::default();
        timer.arm(start);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.poll(start + Duration::from_secs(10)));
        assert_eq!(timer.until_due(start), None);

        let later = start + Duration::from_secs(30);
        timer.arm(later);
        assert!(!timer.poll(later + Duration::from_millis(999)));
        assert!(timer.poll(later + TICK_INTERVAL));
    }
}
