//! App: terminal init, main loop, input routing and cosmetic state.

use crate::bag::BagPolicy;
use crate::grid::Coord;
use crate::input::{self, Action, key_to_action};
use crate::session::{GameEvent, MAX_NAME_LEN, Session, SessionConfig};
use crate::store::{self, RankRow};
use crate::theme::Theme;
use crate::{GameConfig, GameSession, ui, upload};
use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

/// How long a floating score popup lives.
const POPUP_LIFETIME_MS: u32 = 1500;
/// Popup float-up cadence.
const POPUP_STEP_MS: u32 = 300;
/// Boss respawn delay after it goes down.
const BOSS_RESPAWN_MS: u64 = 3000;

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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTab {
    Name,
    Policy,
    Start,
}

#[derive(Debug, Clone)]
pub struct MenuState {
    pub current_tab: MenuTab,
    pub name: String,
    pub policy: BagPolicy,
    pub error: Option<String>,
}

impl Default for MenuState {
    fn default() -> Self {
        Self {
            current_tab: MenuTab::Name,
            name: String::new(),
            policy: BagPolicy::default(),
            error: None,
        }
    }
}

/// Floating feedback text over the board.
#[derive(Debug, Clone)]
pub struct Popup {
    pub x: u16,
    pub y: u16,
    pub text: String,
    pub color: Color,
    pub age_ms: u32,
}

/// Cosmetic boss overlay: takes a hit per match, goes down, respawns a bit
/// tougher. Pure decoration fed from the event queue; no gameplay effect.
#[derive(Debug, Clone)]
pub struct BossState {
    hp: u32,
    max_hp: u32,
    pub kills: u32,
    down_at: Option<Instant>,
}

impl BossState {
    pub fn new() -> Self {
        Self {
            hp: 5,
            max_hp: 5,
            kills: 0,
            down_at: None,
        }
    }

    pub fn is_down(&self) -> bool {
        self.down_at.is_some()
    }

    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            0.0
        } else {
            f64::from(self.hp) / f64::from(self.max_hp)
        }
    }

    fn hit(&mut self, now: Instant) {
        if self.is_down() {
            return;
        }
        self.hp = self.hp.saturating_sub(1);
        if self.hp == 0 {
            self.kills += 1;
            self.down_at = Some(now);
        }
    }

    fn tick(&mut self, now: Instant) {
        if let Some(at) = self.down_at {
            if now.duration_since(at) >= Duration::from_millis(BOSS_RESPAWN_MS) {
                self.max_hp += 1;
                self.hp = self.max_hp;
                self.down_at = None;
            }
        }
    }
}

impl Default for BossState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct App {
    config: GameConfig,
    theme: Theme,
    session: GameSession,
    screen: Screen,
    menu_state: MenuState,
    quit_selected: QuitOption,
    best_score: u32,
    leaderboard: Vec<RankRow>,
    /// Active pointer drag in screen coordinates (start, current).
    drag: Option<((u16, u16), (u16, u16))>,
    popups: Vec<Popup>,
    boss: BossState,
    match_fx_cells: Vec<Coord>,
    match_fx: Option<Effect>,
    match_fx_time: Option<Instant>,
    last_frame: Instant,
    /// Best/cache/submission written for the current Ended session.
    result_committed: bool,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let session = Session::new(SessionConfig {
            rows: config.rows,
            cols: config.cols,
            start_time_secs: config.start_time_secs,
            countdown_ms: config.countdown_ms,
            bag_policy: config.bag_policy,
        });
        let mut menu_state = MenuState {
            name: store::load_name(),
            policy: config.bag_policy,
            ..MenuState::default()
        };
        if !menu_state.name.is_empty() {
            menu_state.current_tab = MenuTab::Start;
        }
        Self {
            session,
            theme,
            // --no-menu promotes this to Playing in run() once the saved
            // name is known to be usable.
            screen: Screen::Menu,
            menu_state,
            quit_selected: QuitOption::Resume,
            best_score: store::load_best(),
            leaderboard: store::load_leaderboard(),
            drag: None,
            popups: Vec::new(),
            boss: BossState::new(),
            match_fx_cells: Vec::new(),
            match_fx: None,
            match_fx_time: None,
            last_frame: Instant::now(),
            result_committed: false,
            config,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            event::{DisableMouseCapture, EnableMouseCapture},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // Shrink the requested board to what actually fits on screen.
        let (term_cols, term_rows) = crossterm::terminal::size()?;
        let (max_rows, max_cols) = ui::max_board_for_terminal(term_cols, term_rows);
        if self.config.rows > max_rows || self.config.cols > max_cols {
            self.config.rows = self.config.rows.min(max_rows);
            self.config.cols = self.config.cols.min(max_cols);
            self.session = Session::new(SessionConfig {
                rows: self.config.rows,
                cols: self.config.cols,
                start_time_secs: self.config.start_time_secs,
                countdown_ms: self.config.countdown_ms,
                bag_policy: self.config.bag_policy,
            });
        }

        if self.config.no_menu && !self.menu_state.name.is_empty() {
            self.start_game();
        }

        let result = self.run_loop(&mut terminal);

        execute!(std::io::stdout(), DisableMouseCapture, LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.fps.max(1.0));
        loop {
            let now = Instant::now();
            let dt = now.duration_since(self.last_frame);
            self.last_frame = now;

            // Game time only advances on the play screen; the quit menu is
            // an app-level suspension (we simply stop feeding ticks).
            if self.screen == Screen::Playing {
                self.session.tick(dt);
                if self.config.no_animation {
                    self.session.settle_instantly();
                }
            }
            self.tick_popups(dt.as_millis().min(u128::from(u32::MAX)) as u32);
            self.boss.tick(now);
            let size = terminal.size()?;
            self.process_events(Rect::new(0, 0, size.width, size.height), now);

            if self.screen == Screen::Playing && self.session.is_ended() {
                self.commit_result();
                self.drag = None;
                self.screen = Screen::GameOver;
            }

            terminal.draw(|f| {
                ui::draw(
                    f,
                    self.screen,
                    &self.theme,
                    &self.session,
                    &self.menu_state,
                    (self.screen == Screen::QuitMenu).then_some(self.quit_selected),
                    &self.popups,
                    &self.boss,
                    self.drag,
                    &self.leaderboard,
                    self.best_score,
                    &self.match_fx_cells,
                    &mut self.match_fx,
                    &mut self.match_fx_time,
                    now,
                    self.config.no_animation,
                )
            })?;

            // Retire the match flash once it has played out.
            if self.match_fx.as_ref().is_some_and(Effect::done) {
                self.match_fx = None;
                self.match_fx_time = None;
                self.match_fx_cells.clear();
            }

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    match event::read()? {
                        Event::Key(key) if key.kind == KeyEventKind::Press => {
                            if self.handle_key(key) {
                                return Ok(());
                            }
                        }
                        Event::Mouse(mouse) => self.handle_mouse(mouse),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Board geometry for the current terminal size; shared by input mapping
    /// and event-driven popup placement.
    fn geometry(&self, area: Rect) -> input::BoardGeometry {
        ui::board_geometry(area, self.session.grid().rows(), self.session.grid().cols())
    }

    /// Drain core events into cosmetic state. The audio collaborator would
    /// hang off this same queue; here it feeds popups, the boss and the
    /// match flash.
    fn process_events(&mut self, area: Rect, now: Instant) {
        let geom = self.geometry(area);
        for ev in self.session.drain_events() {
            match ev {
                GameEvent::Matched {
                    points,
                    combo,
                    cells,
                    ..
                } => {
                    self.boss.hit(now);
                    let text = if combo > 1 {
                        format!("+{points} (x{combo})")
                    } else {
                        format!("+{points}")
                    };
                    if let Some(&c) = cells.first() {
                        let (x, y, ..) = geom.cell_rect(c);
                        self.popups.push(Popup {
                            x,
                            y,
                            text,
                            color: Color::Yellow,
                            age_ms: 0,
                        });
                    }
                    self.match_fx_cells = cells;
                    self.match_fx = None;
                    self.match_fx_time = None;
                }
                GameEvent::PerfectClear => {
                    self.popups.push(Popup {
                        x: geom.x + geom.width() / 2,
                        y: geom.y + geom.height() / 2,
                        text: "PERFECT CLEAR!".to_string(),
                        color: Color::Magenta,
                        age_ms: 0,
                    });
                }
                GameEvent::RewardReached { threshold } => {
                    self.popups.push(Popup {
                        x: geom.x + geom.width() / 2,
                        y: geom.y,
                        text: format!("BONUS @{threshold}"),
                        color: Color::Cyan,
                        age_ms: 0,
                    });
                }
                GameEvent::CountdownStarted
                | GameEvent::Started
                | GameEvent::ComboBroken
                | GameEvent::SkillUsed(_)
                | GameEvent::Refilled
                | GameEvent::Ended(_) => {}
            }
        }
    }

    fn tick_popups(&mut self, delta_ms: u32) {
        self.popups.retain_mut(|p| {
            let old_steps = p.age_ms / POPUP_STEP_MS;
            p.age_ms += delta_ms;
            if p.age_ms / POPUP_STEP_MS > old_steps && p.y > 0 {
                p.y -= 1;
            }
            p.age_ms < POPUP_LIFETIME_MS
        });
    }

    /// Rebuild the session with the menu's bag policy and start it.
    fn start_game(&mut self) {
        self.session = Session::new(SessionConfig {
            rows: self.config.rows,
            cols: self.config.cols,
            start_time_secs: self.config.start_time_secs,
            countdown_ms: self.config.countdown_ms,
            bag_policy: self.menu_state.policy,
        });
        match self.session.start(&self.menu_state.name) {
            Ok(()) => {
                let _ = store::save_name(self.menu_state.name.trim());
                self.menu_state.error = None;
                self.screen = Screen::Playing;
                self.drag = None;
                self.popups.clear();
                self.boss = BossState::new();
                self.match_fx_cells.clear();
                self.match_fx = None;
                self.match_fx_time = None;
                self.result_committed = false;
            }
            Err(e) => {
                self.menu_state.error = Some(e.to_string());
                self.menu_state.current_tab = MenuTab::Name;
            }
        }
    }

    /// Persist best score and leaderboard cache, and leave the signed
    /// submission body where the upload transport picks it up. Runs once per
    /// ended session; failures here must never take down the result screen.
    fn commit_result(&mut self) {
        if self.result_committed {
            return;
        }
        self.result_committed = true;
        let summary = self.session.audit_summary();
        if summary.score > self.best_score {
            self.best_score = summary.score;
            let _ = store::save_best(self.best_score);
        }
        self.leaderboard = upload::merge_into_cache(
            std::mem::take(&mut self.leaderboard),
            &summary.name,
            summary.score,
        );
        let _ = store::save_leaderboard(&self.leaderboard);
        let submission = upload::build_submission(&summary);
        if let Ok(json) = upload::to_json(&submission) {
            let _ = store::save_submission(&json);
        }
    }

    /// Returns true when the app should exit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.screen {
            Screen::Menu => self.handle_menu_key(key),
            Screen::Playing => {
                match key_to_action(key) {
                    Action::Quit => {
                        self.screen = Screen::QuitMenu;
                        self.quit_selected = QuitOption::Resume;
                    }
                    Action::Hint => {
                        self.session.use_hint();
                    }
                    Action::Shuffle => {
                        self.session.use_shuffle();
                    }
                    Action::Bomb => {
                        self.session.toggle_delete_mode();
                    }
                    Action::Wipe => {
                        self.session.use_wipe();
                    }
                    Action::Freeze => {
                        self.session.use_freeze();
                    }
                    _ => {}
                }
                false
            }
            Screen::QuitMenu => {
                match key_to_action(key) {
                    Action::Down | Action::Right => {
                        self.quit_selected = match self.quit_selected {
                            QuitOption::Resume => QuitOption::MainMenu,
                            QuitOption::MainMenu => QuitOption::Exit,
                            QuitOption::Exit => QuitOption::Resume,
                        };
                    }
                    Action::Up | Action::Left => {
                        self.quit_selected = match self.quit_selected {
                            QuitOption::Resume => QuitOption::Exit,
                            QuitOption::MainMenu => QuitOption::Resume,
                            QuitOption::Exit => QuitOption::MainMenu,
                        };
                    }
                    Action::Confirm => match self.quit_selected {
                        QuitOption::Resume => self.screen = Screen::Playing,
                        QuitOption::MainMenu => {
                            self.session.abandon();
                            self.screen = Screen::Menu;
                        }
                        QuitOption::Exit => return true,
                    },
                    Action::Quit => self.screen = Screen::Playing,
                    _ => {}
                }
                false
            }
            Screen::GameOver => {
                match key.code {
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        self.start_game();
                    }
                    KeyCode::Char('m') | KeyCode::Char('M') => {
                        self.screen = Screen::Menu;
                    }
                    KeyCode::Char('q') | KeyCode::Esc => return true,
                    _ => {}
                }
                false
            }
        }
    }

    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        // Name entry eats printable characters first.
        if self.menu_state.current_tab == MenuTab::Name {
            match key.code {
                KeyCode::Char(c) if !c.is_control() => {
                    if self.menu_state.name.chars().count() < MAX_NAME_LEN {
                        self.menu_state.name.push(c);
                        self.menu_state.error = None;
                    }
                    return false;
                }
                KeyCode::Backspace => {
                    self.menu_state.name.pop();
                    return false;
                }
                _ => {}
            }
        }
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('q') if self.menu_state.current_tab != MenuTab::Name => return true,
            KeyCode::Down | KeyCode::Tab => {
                self.menu_state.current_tab = match self.menu_state.current_tab {
                    MenuTab::Name => MenuTab::Policy,
                    MenuTab::Policy => MenuTab::Start,
                    MenuTab::Start => MenuTab::Name,
                };
            }
            KeyCode::Up => {
                self.menu_state.current_tab = match self.menu_state.current_tab {
                    MenuTab::Name => MenuTab::Start,
                    MenuTab::Policy => MenuTab::Name,
                    MenuTab::Start => MenuTab::Policy,
                };
            }
            KeyCode::Left | KeyCode::Right => {
                if self.menu_state.current_tab == MenuTab::Policy {
                    self.menu_state.policy = match self.menu_state.policy {
                        BagPolicy::Weighted => BagPolicy::Uniform,
                        BagPolicy::Uniform => BagPolicy::Weighted,
                    };
                }
            }
            KeyCode::Enter => {
                if self.menu_state.current_tab == MenuTab::Start {
                    self.start_game();
                } else {
                    self.menu_state.current_tab = MenuTab::Start;
                }
            }
            _ => {}
        }
        false
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.screen != Screen::Playing {
            return;
        }
        let (cols, rows) = crossterm::terminal::size().unwrap_or((80, 24));
        let area = Rect::new(0, 0, cols, rows);
        let geom = self.geometry(area);
        let pos = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.session.delete_mode() {
                    if let Some(c) = geom.cell_at(pos.0, pos.1) {
                        self.session.use_delete(c);
                    }
                    return;
                }
                self.session.clear_hints();
                self.drag = Some((pos, pos));
                let sel = input::selection_under_drag(&geom, self.session.grid(), pos, pos);
                self.session.apply_selection(&sel);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some((start, _)) = self.drag {
                    self.drag = Some((start, pos));
                    let sel = input::selection_under_drag(&geom, self.session.grid(), start, pos);
                    self.session.apply_selection(&sel);
                }
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if self.drag.take().is_some() {
                    self.session.resolve_selection();
                }
            }
            _ => {}
        }
    }
}
