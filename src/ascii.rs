//! ASCII rendering of generated grids for terminal inspection.

use crate::grid::{GridStore, TerrainState};
use crate::render::PaintBuffer;

/// ASCII rendering modes
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AsciiMode {
    /// Show logical terrain states
    Logical,
    /// Show painted visual cells (dual grid)
    Visual,
}

impl AsciiMode {
    pub fn name(&self) -> &'static str {
        match self {
            AsciiMode::Logical => "Logical",
            AsciiMode::Visual => "Visual",
        }
    }
}

/// Get ASCII character for a terrain state
pub fn state_char(state: TerrainState) -> char {
    match state {
        TerrainState::OPEN => '.',
        TerrainState::SOFT => '#',
        TerrainState::SOLID => '@',
        TerrainState(other) => char::from_digit(other as u32 % 10, 10).unwrap_or('?'),
    }
}

/// Render the logical grid, top row (highest y) first.
pub fn render_logical(grid: &GridStore) -> String {
    let mut out = String::with_capacity(((grid.width() + 1) * grid.height()) as usize);
    for y in (0..grid.height()).rev() {
        for x in 0..grid.width() {
            out.push(state_char(grid.get(x, y).state));
        }
        out.push('\n');
    }
    out
}

/// Render the painted visual grid: `.` for empty space, `o` for a drawn
/// tile. Top row first.
pub fn render_visual(painter: &PaintBuffer) -> String {
    let mut out = String::with_capacity(((painter.width() + 1) * painter.height()) as usize);
    for vy in (0..painter.height()).rev() {
        for vx in 0..painter.width() {
            out.push(if painter.get(vx, vy).is_some() { 'o' } else { '.' });
        }
        out.push('\n');
    }
    out
}
