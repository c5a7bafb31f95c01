//! App: terminal init, main loop, tick, key and mouse handling.

use crate::game::{ClickOutcome, GameState};
use crate::input::{Action, key_to_action};
use crate::sound::{SoundSink, sink_for};
use crate::theme::Theme;
use crate::ui::{Flash, FlashTarget, View};
use crate::{Args, Difficulty, GameConfig, GameMode, Scoring};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, MouseButton, MouseEventKind};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use std::time::{Duration, Instant};

/// Frame budget for the event poll (~60 FPS).
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
    QuitMenu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitOption {
    Resume,
    MainMenu,
    Exit,
}

impl QuitOption {
    fn next(self) -> Self {
        match self {
            Self::Resume => Self::MainMenu,
            Self::MainMenu => Self::Exit,
            Self::Exit => Self::Resume,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Resume => Self::Exit,
            Self::MainMenu => Self::Resume,
            Self::Exit => Self::MainMenu,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Difficulty,
    Mode,
    Scoring,
    Start,
}

impl MenuTab {
    fn next(self) -> Self {
        match self {
            Self::Difficulty => Self::Mode,
            Self::Mode => Self::Scoring,
            Self::Scoring => Self::Start,
            Self::Start => Self::Difficulty,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Difficulty => Self::Start,
            Self::Mode => Self::Difficulty,
            Self::Scoring => Self::Mode,
            Self::Start => Self::Scoring,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub current_tab: MenuTab,
    pub selected_difficulty: Difficulty,
    pub selected_mode: GameMode,
    pub selected_scoring: Scoring,
    pub animation_start: Instant,
}

impl MenuState {
    fn from_args(args: &Args) -> Self {
        Self {
            current_tab: MenuTab::Difficulty,
            selected_difficulty: args.difficulty,
            selected_mode: args.mode,
            selected_scoring: args.scoring,
            animation_start: Instant::now(),
        }
    }

    /// Left/right on the current tab.
    fn cycle(&mut self, forward: bool) {
        match self.current_tab {
            MenuTab::Difficulty => {
                self.selected_difficulty = match (self.selected_difficulty, forward) {
                    (Difficulty::Easy, true) | (Difficulty::Hard, false) => Difficulty::Medium,
                    (Difficulty::Medium, true) | (Difficulty::Easy, false) => Difficulty::Hard,
                    (Difficulty::Hard, true) | (Difficulty::Medium, false) => Difficulty::Easy,
                };
            }
            MenuTab::Mode => {
                self.selected_mode = match self.selected_mode {
                    GameMode::Endless => GameMode::Timed,
                    GameMode::Timed => GameMode::Endless,
                };
            }
            MenuTab::Scoring => {
                self.selected_scoring = match (self.selected_scoring, forward) {
                    (Scoring::Flat, true) | (Scoring::Doubling, false) => Scoring::Stepped,
                    (Scoring::Stepped, true) | (Scoring::Flat, false) => Scoring::Doubling,
                    (Scoring::Doubling, true) | (Scoring::Stepped, false) => Scoring::Flat,
                };
            }
            MenuTab::Start => {}
        }
    }
}

pub struct App {
    args: Args,
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    paused: bool,
    /// Set while paused or in the quit menu; game time does not run.
    frozen_since: Option<Instant>,
    game_start: Instant,
    cursor: (usize, usize),
    /// Terminal area of the last drawn frame, for mouse hit-testing.
    last_area: Rect,
    /// Hit/miss flash (None when finished or with --no-animation).
    flash: Option<Flash>,
    sound: Box<dyn SoundSink>,
    menu_state: MenuState,
    quit_selected: QuitOption,
    high_score_endless: u32,
    high_score_timed: u32,
    new_best: bool,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let now = Instant::now();
        let sound = sink_for(args.sound);
        tracing::debug!(sink = sound.label(), "sound");
        let screen = if args.no_menu {
            Screen::Playing
        } else {
            Screen::Menu
        };
        Self {
            state: GameState::new(&config, now),
            sound,
            menu_state: MenuState::from_args(&args),
            args,
            config,
            theme,
            screen,
            paused: false,
            frozen_since: None,
            game_start: now,
            cursor: (0, 0),
            last_area: Rect::default(),
            flash: None,
            quit_selected: QuitOption::Resume,
            high_score_endless: 0,
            high_score_timed: 0,
            new_best: false,
        }
    }

    fn reset_game(&mut self, now: Instant) {
        self.state = GameState::new(&self.config, now);
        self.screen = Screen::Playing;
        self.paused = false;
        self.frozen_since = None;
        self.game_start = now;
        self.cursor = (0, 0);
        self.flash = None;
        self.new_best = false;
        tracing::info!(
            mode = ?self.args.mode,
            scoring = ?self.config.scoring,
            spawn_interval_ms = self.config.spawn_interval.as_millis() as u64,
            "game started"
        );
    }

    /// Apply menu choices to the session and start.
    fn start_from_menu(&mut self, now: Instant) {
        self.args.difficulty = self.menu_state.selected_difficulty;
        self.args.mode = self.menu_state.selected_mode;
        self.config.scoring = self.menu_state.selected_scoring;
        if self.args.spawn_interval_ms.is_none() {
            self.config.spawn_interval = self.args.difficulty.spawn_interval();
        }
        self.reset_game(now);
    }

    fn best(&self) -> u32 {
        match self.args.mode {
            GameMode::Endless => self.high_score_endless,
            GameMode::Timed => self.high_score_timed,
        }
    }

    fn record_score(&mut self) {
        let score = self.state.score.score;
        let best = match self.args.mode {
            GameMode::Endless => &mut self.high_score_endless,
            GameMode::Timed => &mut self.high_score_timed,
        };
        self.new_best = score > *best;
        *best = (*best).max(score);
    }

    fn end_game(&mut self) {
        self.record_score();
        self.screen = Screen::GameOver;
        self.flash = None;
        tracing::info!(
            score = self.state.score.score,
            hits = self.state.stats.hits,
            misses = self.state.stats.misses,
            best_combo = self.state.stats.best_combo,
            new_best = self.new_best,
            "game over"
        );
    }

    fn time_limit(&self) -> Duration {
        Duration::from_secs(u64::from(self.args.time_limit))
    }

    /// Timed mode: time left on the game clock, which stops while frozen.
    fn time_left(&self, now: Instant) -> Option<Duration> {
        (self.args.mode == GameMode::Timed).then(|| {
            let clock = self.frozen_since.unwrap_or(now);
            self.time_limit()
                .saturating_sub(clock.saturating_duration_since(self.game_start))
        })
    }

    fn freeze(&mut self, now: Instant) {
        if self.frozen_since.is_none() {
            self.frozen_since = Some(now);
        }
    }

    /// Resume game time; every pending deadline moves by the frozen span.
    fn thaw(&mut self, now: Instant) {
        if let Some(since) = self.frozen_since.take() {
            let frozen = now.saturating_duration_since(since);
            self.state.shift_timers(frozen);
            self.game_start += frozen;
            tracing::debug!(frozen_ms = frozen.as_millis() as u64, "resumed");
        }
    }

    fn open_quit_menu(&mut self, now: Instant) {
        self.freeze(now);
        self.screen = Screen::QuitMenu;
        self.quit_selected = QuitOption::Resume;
    }

    fn close_quit_menu(&mut self, now: Instant) {
        self.screen = Screen::Playing;
        if !self.paused {
            self.thaw(now);
        }
    }

    fn toggle_pause(&mut self, now: Instant) {
        self.paused = !self.paused;
        if self.paused {
            self.freeze(now);
        } else {
            self.thaw(now);
        }
    }

    fn whack(&mut self, row: usize, col: usize, now: Instant) {
        let outcome = self.state.on_tile_clicked(row, col, now);
        let target = match outcome {
            ClickOutcome::Hit {
                kind,
                awarded,
                multiplier_up,
                ..
            } => {
                tracing::debug!(row, col, ?kind, awarded, multiplier_up, "hit");
                FlashTarget::Tile(row, col)
            }
            ClickOutcome::Miss => {
                tracing::debug!(row, col, "miss");
                FlashTarget::Board
            }
            ClickOutcome::Ignored => return,
        };
        self.cursor = (row, col);
        if !self.args.no_animation {
            self.flash = Some(Flash::new(target));
        }
    }

    fn move_cursor(&mut self, action: Action) {
        let (rows, cols) = (self.state.grid.rows(), self.state.grid.cols());
        let (r, c) = self.cursor;
        self.cursor = match action {
            Action::Up => (r.saturating_sub(1), c),
            Action::Down => ((r + 1).min(rows - 1), c),
            Action::Left => (r, c.saturating_sub(1)),
            Action::Right => (r, (c + 1).min(cols - 1)),
            _ => (r, c),
        };
    }

    fn play_cues(&mut self) {
        for cue in self.state.drain_cues() {
            self.sound.play(cue);
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        if self.screen == Screen::Playing {
            self.reset_game(Instant::now());
        }
        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        loop {
            let now = Instant::now();

            let view = View {
                theme: &self.theme,
                mode: self.args.mode,
                paused: self.paused,
                time_left: self.time_left(now),
                best: self.best(),
                new_best: self.new_best,
                cursor: self.cursor,
                quit_selected: self.quit_selected,
            };
            let flash = self.flash.as_mut();
            let completed = terminal.draw(|f| {
                crate::ui::draw(f, self.screen, &self.state, &view, &self.menu_state, flash, now);
            })?;
            self.last_area = completed.area;

            if self.flash.as_ref().is_some_and(Flash::done) {
                self.flash = None;
            }

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if !self.handle_event(event::read()?)? {
                        return Ok(());
                    }
                }
            }

            if self.screen == Screen::Playing && self.frozen_since.is_none() {
                let now = Instant::now();
                self.state.tick(now);
                if self.time_left(now).is_some_and(|left| left.is_zero()) {
                    self.end_game();
                }
            }
            self.play_cues();
        }
    }

    /// Returns false when the app should exit.
    fn handle_event(&mut self, ev: Event) -> Result<bool> {
        let now = Instant::now();
        let (rows, cols) = (self.state.grid.rows(), self.state.grid.cols());
        match ev {
            Event::Mouse(mouse) => {
                if self.screen == Screen::Playing
                    && !self.paused
                    && mouse.kind == MouseEventKind::Down(MouseButton::Left)
                {
                    if let Some((row, col)) =
                        crate::ui::tile_at(self.last_area, rows, cols, mouse.column, mouse.row)
                    {
                        self.whack(row, col, now);
                    }
                }
                Ok(true)
            }
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let action = key_to_action(key, rows, cols);
                match self.screen {
                    Screen::Menu => match action {
                        Action::Quit => return Ok(false),
                        Action::Left => self.menu_state.cycle(false),
                        Action::Right => self.menu_state.cycle(true),
                        Action::Down => self.menu_state.current_tab = self.menu_state.current_tab.next(),
                        Action::Up => self.menu_state.current_tab = self.menu_state.current_tab.prev(),
                        Action::Select => {
                            if self.menu_state.current_tab == MenuTab::Start
                                || key.code == KeyCode::Enter
                            {
                                self.start_from_menu(now);
                            } else {
                                self.menu_state.current_tab = MenuTab::Start;
                            }
                        }
                        _ => {}
                    },
                    Screen::Playing => match action {
                        Action::Pause => self.toggle_pause(now),
                        Action::Quit => self.open_quit_menu(now),
                        _ if self.paused => {}
                        Action::Whack(row, col) => self.whack(row, col, now),
                        Action::Select => {
                            let (row, col) = self.cursor;
                            self.whack(row, col, now);
                        }
                        Action::Up | Action::Down | Action::Left | Action::Right => {
                            self.move_cursor(action);
                        }
                        _ => {}
                    },
                    Screen::QuitMenu => match action {
                        Action::Down | Action::Right => self.quit_selected = self.quit_selected.next(),
                        Action::Up | Action::Left => self.quit_selected = self.quit_selected.prev(),
                        Action::Select => match self.quit_selected {
                            QuitOption::Resume => self.close_quit_menu(now),
                            QuitOption::MainMenu => {
                                self.record_score();
                                tracing::info!(score = self.state.score.score, "game abandoned");
                                self.screen = Screen::Menu;
                                self.menu_state.animation_start = now;
                                self.flash = None;
                            }
                            QuitOption::Exit => {
                                self.record_score();
                                return Ok(false);
                            }
                        },
                        Action::Pause | Action::Quit => self.close_quit_menu(now),
                        _ => {}
                    },
                    Screen::GameOver => {
                        if action == Action::Quit {
                            return Ok(false);
                        }
                        // 'r' is also a tile key, so match the raw code.
                        if matches!(key.code, KeyCode::Char('r' | 'R')) {
                            self.reset_game(now);
                        }
                    }
                }
                Ok(true)
            }
            _ => Ok(true),
        }
    }
}
