//! Key bindings: direct tile keys, cursor keys, pause/quit.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Direct-hit layout: key rows map onto grid rows. Only active on grids up to 4x4.
const TILE_KEYS: [[char; 4]; 4] = [
    ['1', '2', '3', '4'],
    ['q', 'w', 'e', 'r'],
    ['a', 's', 'd', 'f'],
    ['z', 'x', 'c', 'v'],
];

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Hit the tile at (row, col).
    Whack(usize, usize),
    Up,
    Down,
    Left,
    Right,
    /// Hit the tile under the cursor / confirm a menu entry.
    Select,
    Pause,
    Quit,
    None,
}

/// Whether direct tile keys are bound on a `rows` x `cols` grid.
pub fn direct_keys(rows: usize, cols: usize) -> bool {
    rows <= TILE_KEYS.len() && cols <= TILE_KEYS[0].len()
}

/// Key bound to a tile, for the on-board hint.
pub fn key_for_tile(row: usize, col: usize, rows: usize, cols: usize) -> Option<char> {
    if !direct_keys(rows, cols) {
        return None;
    }
    TILE_KEYS.get(row)?.get(col).copied()
}

/// Tile bound to a character on a `rows` x `cols` grid, if any.
pub fn tile_for_key(c: char, rows: usize, cols: usize) -> Option<(usize, usize)> {
    if !direct_keys(rows, cols) {
        return None;
    }
    let c = c.to_ascii_lowercase();
    TILE_KEYS
        .iter()
        .take(rows)
        .enumerate()
        .find_map(|(row, keys)| {
            keys.iter()
                .take(cols)
                .position(|k| *k == c)
                .map(|col| (row, col))
        })
}

/// Map key event to game action on a grid of the given size.
pub fn key_to_action(key: KeyEvent, rows: usize, cols: usize) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
        return Action::Quit;
    }
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Char('p' | 'P') => Action::Pause,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Select,
        KeyCode::Char(c) => match tile_for_key(c, rows, cols) {
            Some((row, col)) => Action::Whack(row, col),
            None => Action::None,
        },
        _ => Action::None,
    }
}
