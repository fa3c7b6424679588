//! Blockfall — classic falling-block puzzle game in the terminal.

mod app;
mod clock;
mod collision;
mod field;
mod game;
mod input;
mod piece;
mod rotation;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use piece::{FixedSequence, PieceSource, RandomSource};
use std::time::Duration;

/// Options derived from CLI that affect game behaviour.
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub drop_interval: Duration,
    pub frame_rate: f64,
    pub seed: Option<u64>,
    pub sequence: Option<String>,
    pub no_menu: bool,
}

impl GameConfig {
    /// Fixed sequence if one was given, otherwise uniform random (seeded when asked).
    pub fn piece_source(&self) -> Result<Box<dyn PieceSource>> {
        let source: Box<dyn PieceSource> = match &self.sequence {
            Some(letters) => {
                Box::new(FixedSequence::parse(letters).context("invalid --sequence")?)
            }
            None => Box::new(RandomSource::new(self.seed)),
        };
        Ok(source)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette)
        .context("failed to load theme")?;
    let config = GameConfig {
        drop_interval: Duration::from_millis(args.drop_interval_ms.max(1)),
        frame_rate: args.frame_rate,
        seed: args.seed,
        sequence: args.sequence,
        no_menu: args.no_menu,
    };
    let mut app = App::new(config, theme)?;
    app.run()?;
    Ok(())
}

/// Classic falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Classic falling-block puzzle in the terminal. Fill a row to clear it; 10 points per line.",
    long_about = "Blockfall is a terminal falling-block puzzle on a 10x20 field.\n\n\
        Pieces fall one row per second. Fill a horizontal row to clear it for 10 points. \
        The game ends when a new piece has no room to appear.\n\n\
        CONTROLS:\n  Left/Right or h/l  Move    Up, k or r  Rotate CW   u  Rotate CCW\n  \
        Down or j          Soft drop   Enter/Space Start      p  Pause   q / Esc  Quit"
)]
pub struct Args {
    /// Gravity interval in milliseconds.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Seed for the piece generator (reproducible piece order).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Fixed repeating piece order, e.g. "IOTSZJL". Overrides --seed.
    #[arg(long, value_name = "LETTERS")]
    pub sequence: Option<String>,

    /// Path to theme file (btop-style theme[key]="#rrggbb"; keys piece_i..piece_z, bg, div_line, main_fg, title).
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal, high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Skip the start screen and begin immediately.
    #[arg(long)]
    pub no_menu: bool,
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
