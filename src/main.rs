//! Make Ten — tile-matching puzzle in the terminal. Drag a box around
//! numbers that sum to exactly 10 before the clock runs out.

mod app;
mod bag;
mod gravity;
mod grid;
mod input;
mod session;
mod solver;
mod store;
mod theme;
mod ui;
mod upload;

use anyhow::Result;
use app::App;
use bag::BagPolicy;
use clap::{Parser, ValueEnum};

/// The concrete session type the app runs (thread RNG; tests seed their own).
pub type GameSession = session::Session<rand::rngs::ThreadRng>;

/// Options derived from CLI that shape a session (board size, clock, bag mix,
/// pacing).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub start_time_secs: u32,
    pub countdown_ms: u64,
    pub bag_policy: BagPolicy,
    pub fps: f64,
    pub no_animation: bool,
    pub no_menu: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        rows: args.rows.clamp(2, grid::MAX_DIM),
        cols: args.cols.clamp(2, grid::MAX_DIM),
        start_time_secs: args.time.max(5),
        countdown_ms: args.countdown_ms,
        bag_policy: args.bag,
        fps: args.frame_rate,
        no_animation: args.no_animation,
        no_menu: args.no_menu,
    };
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// Make-ten puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "maketen",
    version,
    about = "Make-ten tile-matching puzzle in the terminal. Drag a rectangle around numbers summing to 10; chain matches for combos before the clock runs out.",
    long_about = "Maketen is a terminal take on the classic sum-to-ten grid puzzle.\n\n\
        Drag a box with the mouse around any group of tiles whose values sum to exactly 10 \
        to clear them. Survivors fall, fresh tiles drop in, and quick consecutive matches \
        build a combo. Clearing the whole board pays a perfect-clear bonus.\n\n\
        SKILLS (once each unless the score ladder grants more):\n\
        \x20 H  Hint      highlight one valid group\n\
        \x20 S  Shuffle   reshuffle the remaining numbers\n\
        \x20 D  Delete    arm the bomb, then click one tile\n\
        \x20 W  Wipe      spend the bomb on the whole board\n\
        \x20 F  Freeze    stop the clock for a few seconds\n\n\
        Q or Esc opens the quit menu. Use --theme to load a btop-style theme file."
)]
pub struct Args {
    /// Board rows.
    #[arg(long, default_value = "10", value_name = "ROWS")]
    pub rows: usize,

    /// Board columns.
    #[arg(long, default_value = "16", value_name = "COLS")]
    pub cols: usize,

    /// Starting clock in seconds (matches and score bonuses add more).
    #[arg(short = 't', long, default_value = "60", value_name = "SECS")]
    pub time: u32,

    /// Countdown before play begins, in milliseconds.
    #[arg(long, default_value = "2000", value_name = "MS")]
    pub countdown_ms: u64,

    /// Tile mix: weighted favours small values so big ones stay pairable;
    /// uniform deals 1-9 evenly.
    #[arg(short, long, default_value = "weighted")]
    pub bag: BagPolicy,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Disable fall-in and match-flash animation (tiles snap into place).
    #[arg(long)]
    pub no_animation: bool,

    /// Skip the menu and start immediately with the saved player name.
    #[arg(long)]
    pub no_menu: bool,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}
