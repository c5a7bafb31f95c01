//! Layout and drawing: menu, mole grid, sidebar, popup message, pause, quit menu, game over.

use crate::app::{MenuState, MenuTab, QuitOption, Screen};
use crate::game::{Cell, GameState, MoleKind, PopupKind};
use crate::theme::Theme;
use crate::{Difficulty, GameMode, Scoring};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::time::{Duration, Instant};
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Tile size in terminal cells, border included.
const TILE_WIDTH: u16 = 9;
const TILE_HEIGHT: u16 = 4;

const SIDEBAR_WIDTH: u16 = 26;
const SIDEBAR_HEIGHT: u16 = 18;

/// Hit/miss flash length.
const FLASH_MS: u32 = 250;

/// Board size in terminal cells (tiles + border).
fn board_size(rows: usize, cols: usize) -> (u16, u16) {
    (cols as u16 * TILE_WIDTH + 2, rows as u16 * TILE_HEIGHT + 2)
}

/// Where everything on the playing screen goes. Shared by drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLayout {
    /// Board including its border.
    pub board: Rect,
    /// Popup message line under the board.
    pub message: Rect,
    pub sidebar: Rect,
}

pub fn game_layout(area: Rect, rows: usize, cols: usize) -> GameLayout {
    let (bw, bh) = board_size(rows, cols);
    let total_w = bw + SIDEBAR_WIDTH;
    let total_h = (bh + 1).max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let active = vert[1];

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(bw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(active);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(bh), Constraint::Length(1)])
        .split(columns[0]);

    GameLayout {
        board: left[0],
        message: left[1],
        sidebar: columns[1],
    }
}

/// Rect of one tile inside the board, clipped to the board.
fn tile_rect(board: Rect, row: usize, col: usize) -> Rect {
    let x = board.x + 1 + col as u16 * TILE_WIDTH;
    let y = board.y + 1 + row as u16 * TILE_HEIGHT;
    let inner_right = board.x + board.width.saturating_sub(1);
    let inner_bottom = board.y + board.height.saturating_sub(1);
    Rect {
        x,
        y,
        width: TILE_WIDTH.min(inner_right.saturating_sub(x)),
        height: TILE_HEIGHT.min(inner_bottom.saturating_sub(y)),
    }
}

/// Tile under a terminal position, for mouse clicks.
pub fn tile_at(area: Rect, rows: usize, cols: usize, x: u16, y: u16) -> Option<(usize, usize)> {
    let board = game_layout(area, rows, cols).board;
    let (bx, by) = (x.checked_sub(board.x + 1)?, y.checked_sub(board.y + 1)?);
    let (col, row) = (usize::from(bx / TILE_WIDTH), usize::from(by / TILE_HEIGHT));
    let inside = x < board.right().saturating_sub(1) && y < board.bottom().saturating_sub(1);
    (row < rows && col < cols && inside)
        .then_some((row, col))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashTarget {
    Tile(usize, usize),
    Board,
}

/// A short fade over a tile (hit) or the whole board (miss). A new flash replaces the old one.
pub struct Flash {
    target: FlashTarget,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl Flash {
    pub fn new(target: FlashTarget) -> Self {
        Self {
            target,
            effect: None,
            last_process: None,
        }
    }

    pub fn done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

fn apply_flash(frame: &mut Frame, theme: &Theme, layout: &GameLayout, flash: &mut Flash, now: Instant) {
    let delta = flash
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    flash.last_process = Some(now);

    let area = match flash.target {
        FlashTarget::Tile(row, col) => tile_rect(layout.board, row, col),
        FlashTarget::Board => layout.board,
    };
    let effect = flash.effect.get_or_insert_with(|| {
        let colour = match flash.target {
            FlashTarget::Tile(..) => theme.title,
            FlashTarget::Board => theme.miss,
        };
        fx::fade_from(colour, colour, (FLASH_MS, Interpolation::Linear)).with_area(area)
    });
    frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
}

/// Everything the playing screens show besides the engine state.
pub struct View<'a> {
    pub theme: &'a Theme,
    pub mode: GameMode,
    pub paused: bool,
    /// Timed mode: time left.
    pub time_left: Option<Duration>,
    pub best: u32,
    pub new_best: bool,
    pub cursor: (usize, usize),
    pub quit_selected: QuitOption,
}

/// Draw current screen (menu, game, game over), with optional pause overlay or quit menu.
pub fn draw(
    frame: &mut Frame,
    screen: Screen,
    state: &GameState,
    view: &View,
    menu_state: &MenuState,
    flash: Option<&mut Flash>,
    now: Instant,
) {
    let area = frame.area();
    match screen {
        Screen::Menu => draw_menu(frame, view.theme, menu_state, area, now),
        Screen::Playing | Screen::QuitMenu => {
            let layout = game_layout(area, state.grid.rows(), state.grid.cols());
            draw_game(frame, state, view, &layout, now);
            if let Some(flash) = flash {
                apply_flash(frame, view.theme, &layout, flash, now);
            }
            if screen == Screen::QuitMenu {
                draw_quit_menu(frame, view.theme, view.quit_selected);
            } else if view.paused {
                draw_pause_overlay(frame, view.theme, area);
            }
        }
        Screen::GameOver => draw_game_over(frame, state, view, area),
    }
}

fn centered(area: Rect, w: u16, h: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(w) / 2,
        y: area.y + area.height.saturating_sub(h) / 2,
        width: w.min(area.width),
        height: h.min(area.height),
    }
}

fn draw_menu(frame: &mut Frame, theme: &Theme, menu_state: &MenuState, area: Rect, now: Instant) {
    let popup = centered(area, 52, 22);

    let title = Line::from(vec![
        Span::styled(
            " Whack ",
            Style::default()
                .fg(theme.mole_color(MoleKind::Plain))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " tui ",
            Style::default()
                .fg(theme.main_fg)
                .add_modifier(Modifier::BOLD),
        ),
    ]);

    let highlight_style = Style::default()
        .fg(Color::Black)
        .bg(theme.title)
        .add_modifier(Modifier::BOLD);
    let selected_style = Style::default()
        .fg(theme.title)
        .add_modifier(Modifier::BOLD);
    let normal_style = Style::default().fg(theme.main_fg);

    let option = |label: &'static str, tab: MenuTab, selected: bool| {
        let style = if menu_state.current_tab == tab && selected {
            highlight_style
        } else if selected {
            selected_style
        } else {
            normal_style
        };
        Span::styled(label, style)
    };
    let row = |spans: Vec<Span<'static>>| {
        let mut out = Vec::with_capacity(spans.len() * 2);
        for (i, s) in spans.into_iter().enumerate() {
            if i > 0 {
                out.push(Span::from("  "));
            }
            out.push(s);
        }
        Line::from(out)
    };
    let heading = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(theme.div_line)));

    let d = menu_state.selected_difficulty;
    let m = menu_state.selected_mode;
    let s = menu_state.selected_scoring;
    let start_btn = Span::styled(
        " [ START ] ",
        if menu_state.current_tab == MenuTab::Start {
            highlight_style
        } else {
            normal_style
        },
    );
    let key_style = Style::default().fg(theme.mole_color(MoleKind::Double));

    let lines = vec![
        Line::from(""),
        title,
        Line::from(""),
        heading(" ─ DIFFICULTY ─ "),
        row(vec![
            option(" EASY ", MenuTab::Difficulty, d == Difficulty::Easy),
            option(" MEDIUM ", MenuTab::Difficulty, d == Difficulty::Medium),
            option(" HARD ", MenuTab::Difficulty, d == Difficulty::Hard),
        ]),
        Line::from(""),
        heading(" ─ MODE ─ "),
        row(vec![
            option(" ENDLESS ", MenuTab::Mode, m == GameMode::Endless),
            option(" TIMED ", MenuTab::Mode, m == GameMode::Timed),
        ]),
        Line::from(""),
        heading(" ─ SCORING ─ "),
        row(vec![
            option(" FLAT ", MenuTab::Scoring, s == Scoring::Flat),
            option(" STEPPED ", MenuTab::Scoring, s == Scoring::Stepped),
            option(" DOUBLING ", MenuTab::Scoring, s == Scoring::Doubling),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(start_btn),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled(" ↕ ", key_style),
            Span::from("NAVIGATE   "),
            Span::styled(" ↔ ", key_style),
            Span::from("CHANGE   "),
            Span::styled(" ENTER ", key_style),
            Span::from("START"),
        ]),
        Line::from(""),
        Line::from(Span::styled(" [Esc] QUIT ", Style::default().fg(theme.miss))),
    ];

    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );

    // Slide in from below, ease-out cubic.
    let elapsed = now.duration_since(menu_state.animation_start).as_millis() as f32;
    let t = (elapsed / 500.0).min(1.0);
    let offset = ((1.0 - (1.0 - t).powi(3)) * 10.0) as u16;
    let mut anim_popup = popup;
    anim_popup.y += 10u16.saturating_sub(offset).min(area.height.saturating_sub(popup.y + popup.height));

    p.render(anim_popup, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " P — Resume    Esc — Quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    frame.render_widget(Clear, popup);
    p.render(popup, frame.buffer_mut());
}

fn draw_game_over(frame: &mut Frame, state: &GameState, view: &View, area: Rect) {
    let theme = view.theme;
    let popup = centered(area, 36, 16);
    let title = match view.mode {
        GameMode::Timed => " Time's up! ",
        GameMode::Endless => " Game Over ",
    };
    let stats = state.stats;
    let attempts = stats.hits + stats.misses;
    let accuracy = if attempts > 0 {
        stats.hits * 100 / attempts
    } else {
        0
    };
    let fg = Style::default().fg(theme.main_fg);
    let mut lines: Vec<Line> = vec![
        Line::from(""),
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::White).bg(theme.miss),
        )),
        Line::from(""),
        Line::from(Span::styled(format!(" Score: {} ", state.score.score), fg)),
        Line::from(Span::styled(format!(" Best: {} ", view.best), fg)),
        Line::from(Span::styled(
            format!(" Hits: {}  Misses: {} ({}%) ", stats.hits, stats.misses, accuracy),
            fg,
        )),
        Line::from(Span::styled(format!(" Best combo: {} ", stats.best_combo), fg)),
        Line::from(Span::styled(
            format!(" Best multiplier: x{} ", stats.best_multiplier),
            fg,
        )),
    ];
    if view.new_best {
        lines.push(Line::from(Span::styled(
            " New record! ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" R — Restart    Esc — Quit ", fg)));
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
            .title(Span::styled(" Whacktui ", Style::default().fg(theme.title))),
    );
    p.render(popup, frame.buffer_mut());
}

fn draw_game(frame: &mut Frame, state: &GameState, view: &View, layout: &GameLayout, now: Instant) {
    draw_board(frame, state, view, layout.board);
    draw_message(frame, state, view.theme, layout.message);
    draw_sidebar(frame, state, view, layout.sidebar, now);
}

fn draw_board(frame: &mut Frame, state: &GameState, view: &View, area: Rect) {
    let theme = view.theme;
    let title = match view.time_left {
        Some(left) => {
            let secs = left.as_secs();
            format!(" Whacktui  Time: {:02}:{:02} ", secs / 60, secs % 60)
        }
        None => " Whacktui ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(title, Style::default().fg(theme.title)));
    block.render(area, frame.buffer_mut());

    let (rows, cols) = (state.grid.rows(), state.grid.cols());
    for row in 0..rows {
        for col in 0..cols {
            let rect = tile_rect(area, row, col);
            if rect.width == 0 || rect.height == 0 {
                continue;
            }
            let cell = state.grid.get(row, col).unwrap_or(Cell::Empty);
            let hint = crate::input::key_for_tile(row, col, rows, cols);
            draw_tile(frame, theme, rect, cell, hint, view.cursor == (row, col));
        }
    }
}

fn mole_face(kind: MoleKind) -> &'static str {
    match kind {
        MoleKind::Plain => "(o.o)",
        MoleKind::Double => "(O.O)",
        MoleKind::Triple => "($.$)",
        MoleKind::Armored => "[#.#]",
    }
}

fn draw_tile(
    frame: &mut Frame,
    theme: &Theme,
    rect: Rect,
    cell: Cell,
    hint: Option<char>,
    under_cursor: bool,
) {
    let (fill, face, face_fg) = match cell {
        Cell::Empty => (theme.hole, "", theme.inactive_fg),
        Cell::Active(kind) => (theme.mole_color(kind), mole_face(kind), Color::Black),
        Cell::Whacked => (theme.hole, "POW!", theme.title),
    };
    let border = if under_cursor {
        Style::default()
            .fg(theme.title)
            .bg(fill)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.div_line).bg(fill)
    };
    let block = Block::default().borders(Borders::ALL).border_style(border);
    let inner = block.inner(rect);
    block.render(rect, frame.buffer_mut());

    let mut lines = vec![Line::from(Span::styled(
        face,
        Style::default()
            .fg(face_fg)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(k) = hint {
        lines.push(Line::from(Span::styled(
            k.to_ascii_uppercase().to_string(),
            Style::default().fg(theme.inactive_fg),
        )));
    }
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(fill))
        .render(inner, frame.buffer_mut());
}

fn draw_message(frame: &mut Frame, state: &GameState, theme: &Theme, area: Rect) {
    let Some(popup) = state.popup.as_ref() else {
        return;
    };
    let colour = match popup.kind {
        PopupKind::Points => theme.title,
        PopupKind::Missed => theme.miss,
    };
    Paragraph::new(Line::from(Span::styled(
        popup.text.as_str(),
        Style::default()
            .fg(colour)
            .add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .render(area, frame.buffer_mut());
}

fn draw_sidebar(frame: &mut Frame, state: &GameState, view: &View, area: Rect, now: Instant) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Stats
            Constraint::Length(1), // gap
            Constraint::Length(4), // Combo timer
            Constraint::Length(1), // gap
            Constraint::Length(4), // Progress to next multiplier
        ])
        .split(area);

    // --- Stats ---
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let stats_inner = stats_block.inner(chunks[0]);
    stats_block.render(chunks[0], frame.buffer_mut());
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let score = state.score;
    let stats_lines = vec![
        stat("Score: ", score.score.to_string()),
        stat("Best: ", view.best.max(score.score).to_string()),
        stat("Multiplier: ", format!("x{}", score.multiplier)),
        stat("Combo: ", score.combo.to_string()),
        stat("Scoring: ", scoring_name(state.scoring()).to_string()),
        stat("Moles up: ", state.grid.active_count().to_string()),
    ];
    Paragraph::new(Text::from(stats_lines)).render(stats_inner, frame.buffer_mut());

    // --- Combo timer ---
    let timer_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let timer_inner = timer_block.inner(chunks[2]);
    timer_block.render(chunks[2], frame.buffer_mut());
    let timer_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(timer_inner);
    let ratio = state.combo_deadline_ratio(now);
    let label = match state.combo_deadline_remaining(now) {
        Some(left) => format!("Combo timer {:.1}s", left.as_secs_f64()),
        None => "Combo timer".to_string(),
    };
    Paragraph::new(Line::from(Span::styled(label, title_style)))
        .render(timer_layout[0], frame.buffer_mut());
    let bar_color = if ratio > 0.6 {
        Color::Green
    } else if ratio > 0.3 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .ratio(ratio)
        .label("")
        .gauge_style(Style::default().fg(bar_color))
        .render(timer_layout[1], frame.buffer_mut());

    // --- Next multiplier: combo / threshold ---
    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);
    let next_inner = next_block.inner(chunks[4]);
    next_block.render(chunks[4], frame.buffer_mut());
    let next_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(next_inner);
    match state.next_threshold() {
        Some(threshold) => {
            Paragraph::new(Line::from(Span::styled(
                format!("Next x: {} / {}", score.combo.min(threshold), threshold),
                title_style,
            )))
            .render(next_layout[0], frame.buffer_mut());
            Gauge::default()
                .ratio(progress_ratio(score.combo, threshold))
                .label("")
                .gauge_style(Style::default().fg(theme.mole_color(MoleKind::Double)))
                .render(next_layout[1], frame.buffer_mut());
        }
        None => {
            Paragraph::new(Line::from(Span::styled("No multiplier", fg_style)))
                .render(next_layout[0], frame.buffer_mut());
        }
    }
}

/// Gauge ratio toward a threshold, clamped for ratatui's 0..=1 check.
fn progress_ratio(value: u32, max: u32) -> f64 {
    if max == 0 {
        return 1.0;
    }
    (f64::from(value) / f64::from(max)).clamp(0.0, 1.0)
}

fn scoring_name(scoring: Scoring) -> &'static str {
    match scoring {
        Scoring::Flat => "flat",
        Scoring::Stepped => "stepped",
        Scoring::Doubling => "doubling",
    }
}

pub fn draw_quit_menu(frame: &mut Frame, theme: &Theme, selected: QuitOption) {
    let quit_rect = centered(frame.area(), 24, 8);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.title).bg(theme.bg))
        .style(Style::default().bg(theme.bg))
        .title(" Quit? ");

    frame.render_widget(Clear, quit_rect);
    let inner = block.inner(quit_rect);
    block.render(quit_rect, frame.buffer_mut());

    let options = [
        (QuitOption::Resume, " Resume "),
        (QuitOption::MainMenu, " Main Menu "),
        (QuitOption::Exit, " Exit "),
    ];

    for (i, (opt, label)) in options.iter().enumerate() {
        let style = if *opt == selected {
            Style::default()
                .fg(theme.bg)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.title)
        };
        let ry = inner.y + 1 + i as u16 * 2;
        if ry >= inner.y + inner.height {
            break;
        }
        let rx = inner.x + inner.width.saturating_sub(label.len() as u16) / 2;
        frame.buffer_mut().set_string(rx, ry, label, style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 100,
        height: 30,
    };

    #[test]
    fn layout_fits_board_and_sidebar() {
        let layout = game_layout(SCREEN, 4, 4);
        assert_eq!(layout.board.width, 4 * TILE_WIDTH + 2);
        assert_eq!(layout.board.height, 4 * TILE_HEIGHT + 2);
        assert_eq!(layout.sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(layout.message.y, layout.board.y + layout.board.height);
    }

    #[test]
    fn mouse_hits_map_to_tiles() {
        let board = game_layout(SCREEN, 4, 4).board;
        let (x0, y0) = (board.x + 1, board.y + 1);
        assert_eq!(tile_at(SCREEN, 4, 4, x0, y0), Some((0, 0)));
        assert_eq!(
            tile_at(SCREEN, 4, 4, x0 + TILE_WIDTH * 2 + 3, y0 + TILE_HEIGHT + 1),
            Some((1, 2))
        );
        assert_eq!(
            tile_at(SCREEN, 4, 4, x0 + TILE_WIDTH * 4 - 1, y0 + TILE_HEIGHT * 4 - 1),
            Some((3, 3))
        );
        // Border and outside.
        assert_eq!(tile_at(SCREEN, 4, 4, board.x, board.y), None);
        assert_eq!(tile_at(SCREEN, 4, 4, x0 + TILE_WIDTH * 4, y0), None);
        assert_eq!(tile_at(SCREEN, 4, 4, 0, 0), None);
    }

    #[test]
    fn tile_rects_tile_the_board() {
        let board = game_layout(SCREEN, 3, 5).board;
        let first = tile_rect(board, 0, 0);
        let last = tile_rect(board, 2, 4);
        assert_eq!((first.x, first.y), (board.x + 1, board.y + 1));
        assert_eq!(last.x + last.width, board.x + board.width - 1);
        assert_eq!(last.y + last.height, board.y + board.height - 1);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(progress_ratio(0, 3), 0.0);
        assert_eq!(progress_ratio(9, 3), 1.0);
        assert_eq!(progress_ratio(1, 0), 1.0);
    }
}
