//! App: terminal init, frame loop, key handling and event draining.

use crate::GameConfig;
use crate::game::{GameEvent, GameState, MoveDir};
use crate::input::{Action, key_to_action};
use crate::piece::RotationDir;
use crate::theme::Theme;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Playing,
    GameOver,
}

/// What the sidebar and overlays show; fed from `GameEvent`s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hud {
    pub score: u32,
    pub lines: u32,
    pub final_score: u32,
}

impl Hud {
    /// Applies one event. Returns true when the game just ended.
    pub fn apply(&mut self, event: GameEvent) -> bool {
        match event {
            // No audio backend; movement has nothing to show.
            GameEvent::PieceMoved => false,
            GameEvent::LineCleared => {
                self.lines += 1;
                false
            }
            GameEvent::ScoreChanged(score) => {
                if score == 0 {
                    self.lines = 0;
                }
                self.score = score;
                false
            }
            GameEvent::GameOver { final_score } => {
                self.final_score = final_score;
                true
            }
        }
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState,
    screen: Screen,
    paused: bool,
    hud: Hud,
    last_frame: Instant,
    needs_redraw: bool,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Result<Self> {
        let state = GameState::new(config.piece_source()?, config.drop_interval);
        let mut app = Self {
            config,
            theme,
            state,
            screen: Screen::Menu,
            paused: false,
            hud: Hud::default(),
            last_frame: Instant::now(),
            needs_redraw: true,
        };
        if app.config.no_menu {
            app.start_game();
        }
        Ok(app)
    }

    fn start_game(&mut self) {
        self.state.start();
        self.screen = Screen::Playing;
        self.paused = false;
        self.last_frame = Instant::now();
        self.drain_events();
    }

    fn drain_events(&mut self) {
        for event in self.state.drain_events() {
            if self.hud.apply(event) {
                self.screen = Screen::GameOver;
            }
            self.needs_redraw = true;
        }
    }

    /// Returns false when the app should exit.
    fn handle_action(&mut self, action: Action) -> bool {
        if action == Action::Quit {
            return false;
        }
        self.needs_redraw = true;
        match self.screen {
            Screen::Menu | Screen::GameOver => {
                if action == Action::Start {
                    self.start_game();
                }
            }
            Screen::Playing if self.paused => {
                if action == Action::Pause {
                    self.paused = false;
                    self.last_frame = Instant::now();
                }
            }
            Screen::Playing => match action {
                Action::MoveLeft => {
                    self.state.move_lateral(MoveDir::Left);
                }
                Action::MoveRight => {
                    self.state.move_lateral(MoveDir::Right);
                }
                Action::SoftDrop => {
                    self.state.soft_drop();
                }
                Action::RotateCw => {
                    self.state.rotate(RotationDir::Clockwise);
                }
                Action::RotateCcw => {
                    self.state.rotate(RotationDir::CounterClockwise);
                }
                Action::Pause => self.paused = true,
                Action::Start | Action::Quit | Action::None => {}
            },
        }
        self.drain_events();
        true
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        let result = self.run_loop(&mut terminal);

        // Restore even if the loop failed.
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        terminal.show_cursor()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate.max(1.0));
        loop {
            let now = Instant::now();
            let elapsed = now.duration_since(self.last_frame);
            self.last_frame = now;

            if self.screen == Screen::Playing && !self.paused {
                if self.state.update(elapsed) {
                    self.needs_redraw = true;
                }
                self.drain_events();
            }

            if self.needs_redraw {
                terminal.draw(|f| {
                    crate::ui::draw(
                        f,
                        self.screen,
                        &self.state,
                        &self.theme,
                        &self.hud,
                        self.paused,
                    );
                })?;
                self.needs_redraw = false;
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if !self.handle_action(key_to_action(key)) {
                                return Ok(());
                            }
                        }
                        Event::Resize(..) => self.needs_redraw = true,
                        _ => {}
                    }
                }
            }
        }
    }
}
