//! Whacktui — whack-a-mole in the terminal.

mod app;
mod game;
mod input;
mod sound;
mod theme;
mod timer;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Largest grid side; keeps tiles readable on an 80x24 terminal.
pub const MAX_GRID_SIDE: usize = 8;
pub const MIN_GRID_SIDE: usize = 2;

/// Options derived from CLI that affect game behaviour (grid, timings, scoring rule).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub scoring: Scoring,
    pub spawn_interval: Duration,
    pub whack_duration: Duration,
    pub popup_duration: Duration,
    /// Base combo window; doubling scoring shrinks it as the multiplier grows.
    pub combo_timeout: Duration,
    pub mole_lifetime: Option<Duration>,
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            scoring: Scoring::Doubling,
            spawn_interval: Difficulty::Easy.spawn_interval(),
            whack_duration: Duration::from_millis(200),
            popup_duration: Duration::from_millis(1000),
            combo_timeout: Duration::from_millis(3000),
            mole_lifetime: None,
            seed: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid {rows}x{cols} out of range ({min}..={max} per side)", min = MIN_GRID_SIDE, max = MAX_GRID_SIDE)]
    GridSize { rows: usize, cols: usize },
    #[error("spawn interval must be at least 1 ms")]
    ZeroSpawnInterval,
    #[error("mole lifetime must be at least 1 ms")]
    ZeroLifetime,
    #[error("time limit must be at least 1 second")]
    ZeroTimeLimit,
}

impl GameConfig {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let config = Self {
            rows: args.rows,
            cols: args.cols,
            scoring: args.scoring,
            spawn_interval: args
                .spawn_interval_ms
                .map_or_else(|| args.difficulty.spawn_interval(), Duration::from_millis),
            mole_lifetime: args.mole_lifetime_ms.map(Duration::from_millis),
            seed: args.seed,
            ..Self::default()
        };
        config.validate()?;
        // Checked in every mode: the menu can switch to timed later.
        if args.time_limit == 0 {
            return Err(ConfigError::ZeroTimeLimit);
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let side = MIN_GRID_SIDE..=MAX_GRID_SIDE;
        if !side.contains(&self.rows) || !side.contains(&self.cols) {
            return Err(ConfigError::GridSize {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if self.spawn_interval.is_zero() {
            return Err(ConfigError::ZeroSpawnInterval);
        }
        if self.mole_lifetime.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::ZeroLifetime);
        }
        Ok(())
    }

    pub fn timings(&self) -> game::Timings {
        game::Timings {
            spawn_interval: self.spawn_interval,
            whack_duration: self.whack_duration,
            popup_duration: self.popup_duration,
            combo_timeout: self.combo_timeout,
            mole_lifetime: self.mole_lifetime,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let config = GameConfig::from_args(&args).context("invalid game options")?;
    let theme = match theme::Theme::load(args.theme.as_deref(), args.palette) {
        Ok(theme) => theme,
        Err(err) => {
            tracing::warn!(%err, "theme not loaded, using defaults");
            theme::Theme::for_palette(args.palette)
        }
    };
    tracing::info!(?config, mode = ?args.mode, "starting");
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// The terminal owns stdout, so logs only go to a file and only when asked.
fn init_logging(path: &std::path::Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("whacktui=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Whack-a-mole in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "whacktui",
    version,
    about = "Whack-a-mole in the terminal. Hit moles to build combos and multiply your score.",
    long_about = "Whacktui is a terminal whack-a-mole.\n\n\
        Moles pop up on a grid. Hit them before they move on: each hit adds to your combo, \
        and a big enough combo raises the score multiplier. Hitting an empty hole is a miss \
        and resets the combo; so does letting the combo timer run out.\n\n\
        MOLES (doubling scoring):\n  1 plain  2 double  3 triple  4 armored (two hits)\n\n\
        CONTROLS:\n  1234 / qwer / asdf / zxcv  Hit a tile directly (grids up to 4x4)\n  \
        Arrows + Space/Enter      Move cursor and hit\n  Mouse click               Hit a tile\n  \
        P  Pause    Esc  Quit menu"
)]
pub struct Args {
    /// Game mode: endless (play until you quit) or timed (score as much as possible in the time limit).
    #[arg(short, long, default_value = "endless")]
    pub mode: GameMode,

    /// Difficulty: sets how often moles appear (easy 400 ms, medium 300 ms, hard 200 ms).
    #[arg(short, long, default_value = "easy")]
    pub difficulty: Difficulty,

    /// Scoring rule: flat (no combos), stepped (+1 multiplier per requirement), doubling (weighted moles, x2 multiplier).
    #[arg(short, long, default_value = "doubling")]
    pub scoring: Scoring,

    /// Grid rows.
    #[arg(long, default_value = "4", value_name = "N")]
    pub rows: usize,

    /// Grid columns.
    #[arg(long, default_value = "4", value_name = "N")]
    pub cols: usize,

    /// In mode 'timed': time limit in seconds.
    #[arg(long, default_value = "60", value_name = "SECS")]
    pub time_limit: u32,

    /// Mole spawn interval in ms. Overrides the difficulty.
    #[arg(long, value_name = "MS")]
    pub spawn_interval_ms: Option<u64>,

    /// Moles not hit within this many ms go back into their hole (no penalty). Default: they stay.
    #[arg(long, value_name = "MS")]
    pub mole_lifetime_ms: Option<u64>,

    /// RNG seed for reproducible mole placement.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Ring the terminal bell on misses and multiplier increases.
    #[arg(long)]
    pub sound: bool,

    /// Disable hit/miss flash effects.
    #[arg(long)]
    pub no_animation: bool,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Write logs to this file (filter with RUST_LOG, default whacktui=info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GameMode {
    #[default]
    Endless,
    Timed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn spawn_interval(self) -> Duration {
        Duration::from_millis(match self {
            Self::Easy => 400,
            Self::Medium => 300,
            Self::Hard => 200,
        })
    }
}

/// Scoring rule, one per revision of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Scoring {
    /// Each hit scores the mole's points.
    Flat,
    /// Combo counts hits; multiplier +1 each time the requirement is met.
    Stepped,
    /// Combo counts points; multiplier doubles at 3x; weighted mole kinds.
    #[default]
    Doubling,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        Args::parse_from(std::iter::once("whacktui").chain(extra.iter().copied()))
    }

    #[test]
    fn defaults_match_classic_game() {
        let config = GameConfig::from_args(&parse(&[])).unwrap();
        assert_eq!((config.rows, config.cols), (4, 4));
        assert_eq!(config.scoring, Scoring::Doubling);
        assert_eq!(config.spawn_interval, Duration::from_millis(400));
        assert_eq!(config.combo_timeout, Duration::from_millis(3000));
        assert_eq!(config.mole_lifetime, None);
    }

    #[test]
    fn spawn_interval_overrides_difficulty() {
        let config = GameConfig::from_args(&parse(&["-d", "hard"])).unwrap();
        assert_eq!(config.spawn_interval, Duration::from_millis(200));
        let config =
            GameConfig::from_args(&parse(&["-d", "hard", "--spawn-interval-ms", "250"])).unwrap();
        assert_eq!(config.spawn_interval, Duration::from_millis(250));
    }

    #[test]
    fn rejects_bad_options() {
        assert_eq!(
            GameConfig::from_args(&parse(&["--rows", "9"])).unwrap_err(),
            ConfigError::GridSize { rows: 9, cols: 4 }
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["--spawn-interval-ms", "0"])).unwrap_err(),
            ConfigError::ZeroSpawnInterval
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["--mole-lifetime-ms", "0"])).unwrap_err(),
            ConfigError::ZeroLifetime
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["-m", "timed", "--time-limit", "0"])).unwrap_err(),
            ConfigError::ZeroTimeLimit
        );
        assert_eq!(
            GameConfig::from_args(&parse(&["-m", "endless", "--time-limit", "0"])).unwrap_err(),
            ConfigError::ZeroTimeLimit
        );
    }

    #[test]
    fn scoring_parses_by_name() {
        assert_eq!(parse(&["-s", "flat"]).scoring, Scoring::Flat);
        assert_eq!(parse(&["--scoring", "stepped"]).scoring, Scoring::Stepped);
    }
}
