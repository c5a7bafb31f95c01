//! Game state: mole grid, spawner, scoring (combo, multiplier, deadlines).

use crate::Scoring;
use crate::sound::SoundCue;
use crate::timer::{Interval, Timer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};

/// Combo requirement at game start and after every reset.
pub const INITIAL_COMBO_REQUIREMENT: u32 = 10;

/// Stepped scoring: requirement grows by this much per multiplier step.
const STEPPED_REQUIREMENT_STEP: u32 = 5;

/// Doubling scoring: multiplier doubles once combo >= multiplier * this.
const DOUBLING_THRESHOLD_FACTOR: u32 = 3;

/// Combo window shrinks by 50 ms per 4 multiplier steps (12.5 ms per step).
const COMBO_SHRINK_PER_STEP_US: u64 = 12_500;

/// The combo window never drops below this.
pub const MIN_COMBO_TIMEOUT: Duration = Duration::from_millis(500);

/// Mole kind weights in permille: plain, double, triple, armored.
const KIND_WEIGHTS_PERMILLE: [u32; 4] = [600, 160, 64, 176];

/// Random playback-rate range for hit cues.
const HIT_PITCH_RANGE: std::ops::Range<f32> = 0.85..1.15;

/// Mole kinds, by level 1..=4. Armored (4) takes two hits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoleKind {
    Plain,
    Double,
    Triple,
    Armored,
}

impl MoleKind {
    pub const ALL: [Self; 4] = [Self::Plain, Self::Double, Self::Triple, Self::Armored];

    pub fn level(&self) -> u8 {
        match self {
            Self::Plain => 1,
            Self::Double => 2,
            Self::Triple => 3,
            Self::Armored => 4,
        }
    }

    /// Base points for one hit, before the multiplier.
    pub fn points(&self) -> u32 {
        match self {
            Self::Armored => 1,
            other => u32::from(other.level()),
        }
    }

    /// Theme colour index 0..4.
    pub fn color_index(&self) -> u8 {
        self.level() - 1
    }
}

/// Map a roll in 0..1000 onto the weighted kind table.
pub fn kind_for_roll(roll: u32) -> MoleKind {
    let mut acc = 0;
    for (kind, weight) in MoleKind::ALL.iter().zip(KIND_WEIGHTS_PERMILLE) {
        acc += weight;
        if roll < acc {
            return *kind;
        }
    }
    MoleKind::Armored
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Active(MoleKind),
    Whacked,
}

/// Mole grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty; rows * cols],
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.index(row, col).map(|i| self.cells[i])
    }

    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Cell::Empty)
            .map(|(i, _)| (i / self.cols, i % self.cols))
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Cell::Active(_)))
            .count()
    }
}

/// Random mole placement on a fixed tick.
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: StdRng,
    interval: Interval,
}

impl Spawner {
    pub fn new(seed: Option<u64>, now: Instant, period: Duration) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng,
            interval: Interval::new(now, period),
        }
    }

    /// Uniform pick among empty cells; `None` when the grid is full.
    pub fn pick_cell(&mut self, grid: &Grid) -> Option<(usize, usize)> {
        let empty = grid.empty_cells();
        if empty.is_empty() {
            return None;
        }
        Some(empty[self.rng.random_range(0..empty.len())])
    }

    /// Weighted kinds only exist in doubling scoring; earlier rules use plain moles.
    pub fn pick_kind(&mut self, scoring: Scoring) -> MoleKind {
        match scoring {
            Scoring::Doubling => kind_for_roll(self.rng.random_range(0..1000)),
            Scoring::Flat | Scoring::Stepped => MoleKind::Plain,
        }
    }

    fn pitch(&mut self) -> f32 {
        self.rng.random_range(HIT_PITCH_RANGE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreState {
    pub score: u32,
    pub combo: u32,
    pub multiplier: u32,
    pub combo_requirement: u32,
}

impl Default for ScoreState {
    fn default() -> Self {
        Self {
            score: 0,
            combo: 0,
            multiplier: 1,
            combo_requirement: INITIAL_COMBO_REQUIREMENT,
        }
    }
}

impl ScoreState {
    /// Miss or deadline expiry: combo, multiplier and requirement go back together.
    fn reset_combo(&mut self) {
        self.combo = 0;
        self.multiplier = 1;
        self.combo_requirement = INITIAL_COMBO_REQUIREMENT;
    }
}

/// Combo window for a multiplier: `base - (multiplier - 1) / 4 * 50 ms`, floored.
pub fn combo_timeout_for(base: Duration, multiplier: u32) -> Duration {
    let shrink = u64::from(multiplier.saturating_sub(1)).saturating_mul(COMBO_SHRINK_PER_STEP_US);
    let base_us = u64::try_from(base.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(base_us.saturating_sub(shrink)).max(MIN_COMBO_TIMEOUT)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Points,
    Missed,
}

/// The one message on screen; a newer one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub text: String,
    pub kind: PopupKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A mole was hit. `cleared` is false for the first hit on an armored mole.
    Hit {
        kind: MoleKind,
        awarded: u32,
        cleared: bool,
        multiplier_up: bool,
    },
    Miss,
    /// Coordinates outside the grid.
    Ignored,
}

/// Session counters shown on the game-over screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: u32,
    pub misses: u32,
    pub best_combo: u32,
    pub best_multiplier: u32,
}

/// Timings the engine needs; built from the command line.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    pub spawn_interval: Duration,
    pub whack_duration: Duration,
    pub popup_duration: Duration,
    pub combo_timeout: Duration,
    pub mole_lifetime: Option<Duration>,
}

/// Game state: grid, score, popup, and every pending timer.
#[derive(Debug)]
pub struct GameState {
    pub grid: Grid,
    pub score: ScoreState,
    pub popup: Option<Popup>,
    pub stats: Stats,
    scoring: Scoring,
    timings: Timings,
    spawner: Spawner,
    /// One reset timer per tile: whacked -> empty, or mole lifetime.
    tile_timers: Vec<Timer>,
    popup_timer: Timer,
    combo_deadline: Timer,
    cues: Vec<SoundCue>,
}

impl GameState {
    pub fn new(config: &crate::GameConfig, now: Instant) -> Self {
        let timings = config.timings();
        let mut state = Self {
            grid: Grid::new(config.rows, config.cols),
            score: ScoreState::default(),
            popup: None,
            stats: Stats {
                best_multiplier: 1,
                ..Stats::default()
            },
            scoring: config.scoring,
            timings,
            spawner: Spawner::new(config.seed, now, timings.spawn_interval),
            tile_timers: vec![Timer::idle(); config.rows * config.cols],
            popup_timer: Timer::idle(),
            combo_deadline: Timer::idle(),
            cues: Vec::new(),
        };
        // First mole appears right away, the rest on the tick.
        state.spawn(now);
        state
    }

    pub fn scoring(&self) -> Scoring {
        self.scoring
    }

    /// Combo needed for the next multiplier step, if the rule has one.
    pub fn next_threshold(&self) -> Option<u32> {
        match self.scoring {
            Scoring::Flat => None,
            Scoring::Stepped => Some(self.score.combo_requirement),
            Scoring::Doubling => Some(
                self.score
                    .multiplier
                    .saturating_mul(DOUBLING_THRESHOLD_FACTOR),
            ),
        }
    }

    pub fn combo_deadline_remaining(&self, now: Instant) -> Option<Duration> {
        self.combo_deadline.remaining(now)
    }

    pub fn combo_deadline_ratio(&self, now: Instant) -> f64 {
        self.combo_deadline.remaining_ratio(now)
    }

    /// Cues queued since the last drain.
    pub fn drain_cues(&mut self) -> Vec<SoundCue> {
        std::mem::take(&mut self.cues)
    }

    /// Spawner writes a mole into an empty cell. Returns false if the cell was taken.
    pub fn on_tile_activated(&mut self, row: usize, col: usize, kind: MoleKind, now: Instant) -> bool {
        let Some(idx) = self.grid.index(row, col) else {
            return false;
        };
        if self.grid.cells[idx] != Cell::Empty {
            return false;
        }
        self.grid.cells[idx] = Cell::Active(kind);
        match self.timings.mole_lifetime {
            Some(lifetime) => self.tile_timers[idx].schedule(now, lifetime),
            None => self.tile_timers[idx].cancel(),
        }
        true
    }

    /// Player clicks a tile.
    pub fn on_tile_clicked(&mut self, row: usize, col: usize, now: Instant) -> ClickOutcome {
        let Some(idx) = self.grid.index(row, col) else {
            return ClickOutcome::Ignored;
        };
        self.expire_combo(now);

        let kind = match self.grid.cells[idx] {
            Cell::Active(kind) => kind,
            Cell::Empty | Cell::Whacked => {
                self.miss(row, col, now);
                return ClickOutcome::Miss;
            }
        };

        let cleared = kind != MoleKind::Armored;
        if cleared {
            self.grid.cells[idx] = Cell::Whacked;
            self.tile_timers[idx].schedule(now, self.timings.whack_duration);
        } else {
            self.grid.cells[idx] = Cell::Active(MoleKind::Plain);
        }

        let (awarded, multiplier_up) = self.apply_hit(kind.points(), now);
        self.stats.hits += 1;
        self.stats.best_combo = self.stats.best_combo.max(self.score.combo);
        self.stats.best_multiplier = self.stats.best_multiplier.max(self.score.multiplier);

        let pitch = self.spawner.pitch();
        self.cues.push(SoundCue::Hit { pitch });
        if multiplier_up {
            tracing::debug!(
                multiplier = self.score.multiplier,
                combo = self.score.combo,
                "multiplier up"
            );
            self.cues.push(SoundCue::Multiplier);
        }

        let text = if awarded == 1 {
            "+1 point".to_string()
        } else {
            format!("+{} points", awarded)
        };
        self.show_popup(text, PopupKind::Points, now);

        ClickOutcome::Hit {
            kind,
            awarded,
            cleared,
            multiplier_up,
        }
    }

    /// Score one hit under the active rule. Returns (points awarded, multiplier went up).
    fn apply_hit(&mut self, points: u32, now: Instant) -> (u32, bool) {
        let s = &mut self.score;
        let awarded = points.saturating_mul(s.multiplier);
        s.score = s.score.saturating_add(awarded);
        match self.scoring {
            Scoring::Flat => (awarded, false),
            Scoring::Stepped => {
                let up = s.combo >= s.combo_requirement;
                if up {
                    s.multiplier += 1;
                    s.combo_requirement += STEPPED_REQUIREMENT_STEP;
                }
                s.combo += 1;
                self.combo_deadline.schedule(now, self.timings.combo_timeout);
                (awarded, up)
            }
            Scoring::Doubling => {
                s.combo = s.combo.saturating_add(awarded);
                let up = s.combo >= s.multiplier.saturating_mul(DOUBLING_THRESHOLD_FACTOR);
                if up {
                    s.multiplier = s.multiplier.saturating_mul(2);
                }
                let window = combo_timeout_for(self.timings.combo_timeout, s.multiplier);
                self.combo_deadline.schedule(now, window);
                (awarded, up)
            }
        }
    }

    fn miss(&mut self, row: usize, col: usize, now: Instant) {
        tracing::trace!(row, col, combo = self.score.combo, "miss");
        self.score.reset_combo();
        self.combo_deadline.cancel();
        self.stats.misses += 1;
        self.cues.push(SoundCue::Miss);
        self.show_popup("MISSED".to_string(), PopupKind::Missed, now);
    }

    fn show_popup(&mut self, text: String, kind: PopupKind, now: Instant) {
        self.popup = Some(Popup { text, kind });
        self.popup_timer.schedule(now, self.timings.popup_duration);
    }

    fn expire_combo(&mut self, now: Instant) {
        if self.combo_deadline.fire(now) {
            tracing::trace!(combo = self.score.combo, "combo expired");
            self.score.reset_combo();
        }
    }

    fn spawn(&mut self, now: Instant) {
        if let Some((row, col)) = self.spawner.pick_cell(&self.grid) {
            let kind = self.spawner.pick_kind(self.scoring);
            self.on_tile_activated(row, col, kind, now);
        }
    }

    /// Advance every timer to `now`: combo deadline, tile resets, popup, spawner.
    pub fn tick(&mut self, now: Instant) {
        self.expire_combo(now);

        for (idx, timer) in self.tile_timers.iter_mut().enumerate() {
            if timer.fire(now) {
                // Whacked clears; an un-hit mole that outlived its lifetime leaves quietly.
                self.grid.cells[idx] = Cell::Empty;
            }
        }

        if self.popup_timer.fire(now) {
            self.popup = None;
        }

        for _ in 0..self.spawner.interval.poll(now) {
            self.spawn(now);
        }
    }

    /// Push every pending deadline back, e.g. by the length of a pause.
    pub fn shift_timers(&mut self, by: Duration) {
        for timer in &mut self.tile_timers {
            timer.shift(by);
        }
        self.popup_timer.shift(by);
        self.combo_deadline.shift(by);
        self.spawner.interval.shift(by);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// State with an empty grid and a spawner that never fires during a test.
    fn quiet(scoring: Scoring) -> (GameState, Instant) {
        let config = GameConfig {
            scoring,
            spawn_interval: Duration::from_secs(3600),
            seed: Some(7),
            ..GameConfig::default()
        };
        let t0 = Instant::now();
        let mut state = GameState::new(&config, t0);
        state.grid = Grid::new(config.rows, config.cols);
        (state, t0)
    }

    fn hit(state: &mut GameState, row: usize, col: usize, kind: MoleKind, now: Instant) -> ClickOutcome {
        assert!(state.on_tile_activated(row, col, kind, now));
        state.on_tile_clicked(row, col, now)
    }

    #[test]
    fn three_plain_hits_double_the_multiplier() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        hit(&mut s, 0, 0, MoleKind::Plain, t0);
        hit(&mut s, 0, 1, MoleKind::Plain, t0 + ms(10));
        assert_eq!(s.score.multiplier, 1);
        let out = hit(&mut s, 0, 2, MoleKind::Plain, t0 + ms(20));
        assert_eq!(
            out,
            ClickOutcome::Hit {
                kind: MoleKind::Plain,
                awarded: 1,
                cleared: true,
                multiplier_up: true
            }
        );
        assert_eq!(s.score.score, 3);
        assert_eq!(s.score.combo, 3);
        assert_eq!(s.score.multiplier, 2);
        assert!(s.drain_cues().contains(&SoundCue::Multiplier));
    }

    #[test]
    fn miss_resets_combo_but_keeps_score() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        s.score = ScoreState {
            score: 42,
            combo: 5,
            multiplier: 2,
            combo_requirement: 15,
        };
        assert_eq!(s.on_tile_clicked(3, 3, t0), ClickOutcome::Miss);
        assert_eq!(
            s.score,
            ScoreState {
                score: 42,
                combo: 0,
                multiplier: 1,
                combo_requirement: INITIAL_COMBO_REQUIREMENT
            }
        );
        let popup = s.popup.clone().unwrap();
        assert_eq!(popup.text, "MISSED");
        assert_eq!(popup.kind, PopupKind::Missed);
        assert_eq!(s.drain_cues(), vec![SoundCue::Miss]);
    }

    #[test]
    fn hit_scores_kind_times_multiplier() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        s.score.multiplier = 4;
        s.score.combo = 0;
        let before = s.score.score;
        hit(&mut s, 1, 1, MoleKind::Triple, t0);
        assert_eq!(s.score.score - before, 12);
        assert_eq!(s.score.combo, 12);
        // 12 >= 4 * 3
        assert_eq!(s.score.multiplier, 8);
        assert_eq!(s.popup.as_ref().unwrap().text, "+12 points");
    }

    #[test]
    fn multiplier_waits_for_threshold() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        s.score.multiplier = 2;
        s.score.combo = 3;
        hit(&mut s, 0, 0, MoleKind::Plain, t0);
        // combo 5 < 6
        assert_eq!(s.score.multiplier, 2);
        hit(&mut s, 0, 1, MoleKind::Plain, t0 + ms(5));
        assert_eq!(s.score.combo, 7);
        assert_eq!(s.score.multiplier, 4);
    }

    #[test]
    fn armored_mole_takes_two_hits() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        let first = hit(&mut s, 2, 2, MoleKind::Armored, t0);
        assert!(matches!(first, ClickOutcome::Hit { cleared: false, awarded: 1, .. }));
        assert_eq!(s.grid.get(2, 2), Some(Cell::Active(MoleKind::Plain)));
        assert_eq!(s.popup.as_ref().unwrap().text, "+1 point");
        let second = s.on_tile_clicked(2, 2, t0 + ms(50));
        assert!(matches!(second, ClickOutcome::Hit { cleared: true, .. }));
        assert_eq!(s.grid.get(2, 2), Some(Cell::Whacked));
        assert_eq!(s.score.score, 2);
    }

    #[test]
    fn whacked_clears_after_whack_duration_despite_other_clicks() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        hit(&mut s, 0, 0, MoleKind::Plain, t0);
        hit(&mut s, 1, 1, MoleKind::Plain, t0 + ms(100));
        s.on_tile_clicked(3, 0, t0 + ms(150));
        s.tick(t0 + ms(199));
        assert_eq!(s.grid.get(0, 0), Some(Cell::Whacked));
        s.tick(t0 + ms(200));
        assert_eq!(s.grid.get(0, 0), Some(Cell::Empty));
        assert_eq!(s.grid.get(1, 1), Some(Cell::Whacked));
        s.tick(t0 + ms(300));
        assert_eq!(s.grid.get(1, 1), Some(Cell::Empty));
    }

    #[test]
    fn clicking_a_whacked_tile_is_a_miss() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        hit(&mut s, 0, 0, MoleKind::Double, t0);
        assert_eq!(s.on_tile_clicked(0, 0, t0 + ms(10)), ClickOutcome::Miss);
        assert_eq!(s.score.score, 2);
        assert_eq!(s.score.combo, 0);
    }

    #[test]
    fn deadline_expiry_on_tick_resets_combo() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        for col in 0..3 {
            hit(&mut s, 0, col, MoleKind::Plain, t0);
        }
        assert_eq!(s.score.multiplier, 2);
        let window = s.combo_deadline_remaining(t0).unwrap();
        assert_eq!(window, combo_timeout_for(Duration::from_millis(3000), 2));
        s.tick(t0 + window - ms(1));
        assert_eq!(s.score.multiplier, 2);
        s.tick(t0 + window);
        assert_eq!(s.score.combo, 0);
        assert_eq!(s.score.multiplier, 1);
        assert_eq!(s.score.score, 3);
    }

    #[test]
    fn deadline_expiry_is_checked_on_click() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        for col in 0..3 {
            hit(&mut s, 0, col, MoleKind::Plain, t0);
        }
        let late = t0 + Duration::from_secs(10);
        hit(&mut s, 1, 0, MoleKind::Double, late);
        // Expired first, so the hit scores at multiplier 1.
        assert_eq!(s.score.score, 5);
        assert_eq!(s.score.combo, 2);
        assert_eq!(s.score.multiplier, 1);
    }

    #[test]
    fn combo_window_shrinks_with_multiplier() {
        let base = Duration::from_millis(3000);
        assert_eq!(combo_timeout_for(base, 1), base);
        assert_eq!(combo_timeout_for(base, 5), Duration::from_millis(2950));
        assert_eq!(combo_timeout_for(base, 2), Duration::from_micros(2_987_500));
        assert_eq!(combo_timeout_for(base, 1 << 20), MIN_COMBO_TIMEOUT);
    }

    #[test]
    fn stepped_rule_raises_requirement() {
        let (mut s, t0) = quiet(Scoring::Stepped);
        for i in 0..11 {
            hit(&mut s, i / 4, i % 4, MoleKind::Plain, t0);
            s.tick(t0 + ms(250));
        }
        // The 11th hit saw combo 10 >= 10 before it.
        assert_eq!(s.score.multiplier, 2);
        assert_eq!(s.score.combo_requirement, 15);
        assert_eq!(s.score.combo, 11);
        assert_eq!(s.score.score, 11);
        hit(&mut s, 3, 3, MoleKind::Plain, t0 + ms(300));
        assert_eq!(s.score.score, 13);
        assert_eq!(s.next_threshold(), Some(15));
    }

    #[test]
    fn flat_rule_never_multiplies() {
        let (mut s, t0) = quiet(Scoring::Flat);
        for col in 0..4 {
            hit(&mut s, 0, col, MoleKind::Double, t0);
        }
        assert_eq!(s.score.score, 8);
        assert_eq!(s.score.multiplier, 1);
        assert_eq!(s.combo_deadline_remaining(t0), None);
        assert_eq!(s.next_threshold(), None);
    }

    #[test]
    fn stepped_window_is_fixed_and_expires() {
        let (mut s, t0) = quiet(Scoring::Stepped);
        s.score.multiplier = 5;
        s.score.combo_requirement = 30;
        hit(&mut s, 0, 0, MoleKind::Plain, t0);
        assert_eq!(s.score.score, 5);
        // No shrink with the multiplier, unlike doubling.
        assert_eq!(s.combo_deadline_remaining(t0), Some(Duration::from_millis(3000)));
        s.tick(t0 + ms(2999));
        assert_eq!(s.score.combo, 1);
        assert_eq!(s.score.multiplier, 5);
        s.tick(t0 + ms(3000));
        assert_eq!(
            s.score,
            ScoreState {
                score: 5,
                combo: 0,
                multiplier: 1,
                combo_requirement: INITIAL_COMBO_REQUIREMENT
            }
        );
        assert_eq!(s.combo_deadline_remaining(t0 + ms(3000)), None);
    }

    #[test]
    fn flat_miss_only_shows_missed() {
        let (mut s, t0) = quiet(Scoring::Flat);
        hit(&mut s, 0, 0, MoleKind::Double, t0);
        hit(&mut s, 0, 1, MoleKind::Double, t0);
        s.drain_cues();
        assert_eq!(s.on_tile_clicked(3, 3, t0 + ms(10)), ClickOutcome::Miss);
        assert_eq!(s.score.score, 4);
        assert_eq!(s.score.multiplier, 1);
        assert_eq!(s.stats.misses, 1);
        let popup = s.popup.clone().unwrap();
        assert_eq!(popup.text, "MISSED");
        assert_eq!(popup.kind, PopupKind::Missed);
        assert_eq!(s.drain_cues(), vec![SoundCue::Miss]);
        assert_eq!(s.combo_deadline_remaining(t0 + ms(10)), None);
    }

    #[test]
    fn activation_only_fills_empty_cells() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        assert!(s.on_tile_activated(1, 2, MoleKind::Triple, t0));
        assert!(!s.on_tile_activated(1, 2, MoleKind::Plain, t0));
        assert_eq!(s.grid.get(1, 2), Some(Cell::Active(MoleKind::Triple)));
        assert!(!s.on_tile_activated(9, 9, MoleKind::Plain, t0));
        assert_eq!(s.on_tile_clicked(9, 9, t0), ClickOutcome::Ignored);
    }

    #[test]
    fn spawner_fills_one_empty_cell_per_interval() {
        let config = GameConfig {
            seed: Some(11),
            ..GameConfig::default()
        };
        let t0 = Instant::now();
        let mut s = GameState::new(&config, t0);
        assert_eq!(s.grid.active_count(), 1);
        s.tick(t0 + config.spawn_interval * 3);
        assert_eq!(s.grid.active_count(), 4);
        s.tick(t0 + config.spawn_interval * 100);
        assert_eq!(s.grid.active_count(), 16);
        assert!(s.grid.empty_cells().is_empty());
    }

    #[test]
    fn mole_lifetime_clears_without_penalty() {
        let config = GameConfig {
            spawn_interval: Duration::from_secs(3600),
            mole_lifetime: Some(ms(800)),
            seed: Some(3),
            ..GameConfig::default()
        };
        let t0 = Instant::now();
        let mut s = GameState::new(&config, t0);
        assert_eq!(s.grid.active_count(), 1);
        s.score.combo = 2;
        s.tick(t0 + ms(800));
        assert_eq!(s.grid.active_count(), 0);
        assert_eq!(s.score.combo, 2);
    }

    #[test]
    fn popup_expires_and_is_replaced() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        hit(&mut s, 0, 0, MoleKind::Plain, t0);
        s.on_tile_clicked(1, 1, t0 + ms(600));
        assert_eq!(s.popup.as_ref().unwrap().text, "MISSED");
        // The first popup's expiry was cancelled by the second.
        s.tick(t0 + ms(1000));
        assert!(s.popup.is_some());
        s.tick(t0 + ms(1600));
        assert!(s.popup.is_none());
    }

    #[test]
    fn pause_shift_keeps_deadlines() {
        let (mut s, t0) = quiet(Scoring::Doubling);
        hit(&mut s, 0, 0, MoleKind::Plain, t0);
        s.shift_timers(Duration::from_secs(60));
        s.tick(t0 + Duration::from_secs(30));
        assert_eq!(s.score.combo, 1);
        assert_eq!(s.grid.get(0, 0), Some(Cell::Whacked));
        assert!(s.popup.is_some());
    }

    #[test]
    fn kind_table_partitions_rolls() {
        assert_eq!(kind_for_roll(0), MoleKind::Plain);
        assert_eq!(kind_for_roll(599), MoleKind::Plain);
        assert_eq!(kind_for_roll(600), MoleKind::Double);
        assert_eq!(kind_for_roll(759), MoleKind::Double);
        assert_eq!(kind_for_roll(760), MoleKind::Triple);
        assert_eq!(kind_for_roll(823), MoleKind::Triple);
        assert_eq!(kind_for_roll(824), MoleKind::Armored);
        assert_eq!(kind_for_roll(999), MoleKind::Armored);
        assert_eq!(KIND_WEIGHTS_PERMILLE.iter().sum::<u32>(), 1000);
    }

    #[test]
    fn kind_frequencies_follow_weights() {
        let mut spawner = Spawner::new(Some(2024), Instant::now(), ms(400));
        let mut counts = [0u32; 4];
        let n = 20_000;
        for _ in 0..n {
            let kind = spawner.pick_kind(Scoring::Doubling);
            counts[usize::from(kind.color_index())] += 1;
        }
        for (count, weight) in counts.iter().zip(KIND_WEIGHTS_PERMILLE) {
            let got = f64::from(*count) / f64::from(n) * 1000.0;
            assert!((got - f64::from(weight)).abs() < 20.0, "{got} vs {weight}");
        }
        assert_eq!(spawner.pick_kind(Scoring::Stepped), MoleKind::Plain);
    }

    #[test]
    fn score_never_decreases() {
        let config = GameConfig {
            seed: Some(99),
            ..GameConfig::default()
        };
        let t0 = Instant::now();
        let mut s = GameState::new(&config, t0);
        let mut rng = StdRng::seed_from_u64(5);
        let mut last = 0;
        for step in 0..3000u64 {
            let now = t0 + ms(step * 37);
            s.tick(now);
            let before = s.score;
            let (row, col) = (rng.random_range(0..4), rng.random_range(0..4));
            let was_empty = s.grid.get(row, col) == Some(Cell::Empty);
            s.on_tile_clicked(row, col, now);
            assert!(s.score.score >= last);
            if was_empty {
                assert_eq!(s.score.score, before.score);
                assert_eq!(s.score.combo, 0);
                assert_eq!(s.score.multiplier, 1);
            }
            last = s.score.score;
        }
        assert!(s.stats.hits > 0 && s.stats.misses > 0);
    }

    #[test]
    fn mole_kind_levels() {
        let levels: Vec<u8> = MoleKind::ALL.iter().map(MoleKind::level).collect();
        assert_eq!(levels, vec![1, 2, 3, 4]);
        assert_eq!(MoleKind::Double.color_index(), 1);
        assert_eq!(MoleKind::Armored.points(), 1);
        assert_eq!(MoleKind::Triple.points(), 3);
    }
}
