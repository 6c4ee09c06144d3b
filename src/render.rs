//! Dual-grid renderer.
//!
//! The visual grid is offset from the logical grid by half a cell: each
//! visual cell sits between four logical cells and its tile is chosen
//! purely from those four corner states, so a small authored pattern table
//! covers every terrain transition.

use crate::grid::GridStore;
use crate::pattern::{CornerPattern, PatternTable};

/// Output seam to the external tile-painting collaborator.
///
/// `None` means "no tile here": either the fully-open reserved pattern or a
/// degraded lookup miss.
pub trait TilePainter {
    fn set_cell_asset(&mut self, vx: i32, vy: i32, asset: Option<usize>);
}

/// A dense in-memory painter, used by tests and by PNG export.
pub struct PaintBuffer {
    width: i32,
    height: i32,
    cells: Vec<Option<usize>>,
}

impl PaintBuffer {
    /// Sized for the visual grid of a W×H logical grid: (W-1)×(H-1) cells.
    pub fn for_grid(grid: &GridStore) -> Self {
        let width = (grid.width() - 1).max(0);
        let height = (grid.height() - 1).max(0);
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn get(&self, vx: i32, vy: i32) -> Option<usize> {
        if vx < 0 || vy < 0 || vx >= self.width || vy >= self.height {
            return None;
        }
        self.cells[(vy * self.width + vx) as usize]
    }
}

impl TilePainter for PaintBuffer {
    fn set_cell_asset(&mut self, vx: i32, vy: i32, asset: Option<usize>) {
        if vx >= 0 && vy >= 0 && vx < self.width && vy < self.height {
            self.cells[(vy * self.width + vx) as usize] = asset;
        }
    }
}

/// Resolves visual cells against the pattern table and emits paint commands.
pub struct DualGridRenderer {
    table: PatternTable,
}

impl DualGridRenderer {
    pub fn new(table: PatternTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PatternTable {
        &self.table
    }

    /// The four logical corners of visual cell (vx, vy), y growing upward:
    /// tl=(vx, vy+1), tr=(vx+1, vy+1), bl=(vx, vy), br=(vx+1, vy).
    pub fn corner_pattern(grid: &GridStore, vx: i32, vy: i32) -> CornerPattern {
        CornerPattern([
            grid.get(vx, vy + 1).state,
            grid.get(vx + 1, vy + 1).state,
            grid.get(vx, vy).state,
            grid.get(vx + 1, vy).state,
        ])
    }

    /// Recompute and emit one visual cell.
    ///
    /// A corner combination absent from the table degrades to "no tile"
    /// with a warning; rendering never halts on a missing pattern.
    pub fn refresh_one(&self, grid: &GridStore, painter: &mut dyn TilePainter, vx: i32, vy: i32) {
        let pattern = Self::corner_pattern(grid, vx, vy);
        let asset = if pattern == CornerPattern::ALL_OPEN {
            None
        } else {
            let asset = self.table.asset_index(pattern);
            if asset.is_none() {
                eprintln!(
                    "Warning: no pattern entry for corners {:?} at visual cell ({}, {})",
                    pattern.0.map(|s| s.0),
                    vx,
                    vy
                );
            }
            asset
        };
        painter.set_cell_asset(vx, vy, asset);
    }

    /// Recompute the up-to-4 visual cells that have logical cell (bx, by)
    /// as one of their corners, clipped to the visual grid.
    pub fn refresh_affected(
        &self,
        grid: &GridStore,
        painter: &mut dyn TilePainter,
        bx: i32,
        by: i32,
    ) {
        let max_vx = grid.width() - 2;
        let max_vy = grid.height() - 2;
        for vy in [by - 1, by] {
            for vx in [bx - 1, bx] {
                if vx >= 0 && vy >= 0 && vx <= max_vx && vy <= max_vy {
                    self.refresh_one(grid, painter, vx, vy);
                }
            }
        }
    }

    /// Full sweep of the (W-1)×(H-1) visual grid.
    pub fn refresh_all(&self, grid: &GridStore, painter: &mut dyn TilePainter) {
        for vy in 0..grid.height() - 1 {
            for vx in 0..grid.width() - 1 {
                self.refresh_one(grid, painter, vx, vy);
            }
        }
    }
}

/// Resolve a continuous world point (in cell units) to the logical cell it
/// addresses.
///
/// Edits target logical cells but the two grids are offset by half a cell,
/// so the containing visual cell is resolved first, then the fractional
/// offset against the 0.5 midpoint decides between the visual cell's own
/// corner and the next one over on each axis.
pub fn world_to_logical(px: f32, py: f32) -> (i32, i32) {
    let vx = px.floor();
    let vy = py.floor();
    let x = if px - vx < 0.5 { vx as i32 } else { vx as i32 + 1 };
    let y = if py - vy < 0.5 { vy as i32 } else { vy as i32 + 1 };
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridStore, TerrainState, Tile};
    use crate::pattern::PatternTable;

    fn soft_grid(w: usize, h: usize) -> GridStore {
        GridStore::new(w, h, Tile::new(TerrainState::SOFT))
    }

    #[test]
    fn corner_pattern_reads_the_right_cells() {
        let mut grid = soft_grid(4, 4);
        grid.set(1, 2, Tile::new(TerrainState::OPEN)); // tl of (1,1)
        grid.set(2, 1, Tile::new(TerrainState::SOLID)); // br of (1,1)

        let pattern = DualGridRenderer::corner_pattern(&grid, 1, 1);
        assert_eq!(
            pattern.0,
            [
                TerrainState::OPEN,
                TerrainState::SOFT,
                TerrainState::SOFT,
                TerrainState::SOLID,
            ]
        );
    }

    #[test]
    fn all_open_neighborhood_paints_no_tile() {
        let grid = GridStore::new(4, 4, Tile::new(TerrainState::OPEN));
        let renderer = DualGridRenderer::new(PatternTable::defaults(3).unwrap());
        let mut painter = PaintBuffer::for_grid(&grid);

        renderer.refresh_all(&grid, &mut painter);
        for vy in 0..painter.height() {
            for vx in 0..painter.width() {
                assert_eq!(painter.get(vx, vy), None);
            }
        }
    }

    #[test]
    fn incremental_refresh_matches_full_refresh() {
        let mut grid = soft_grid(8, 8);
        let renderer = DualGridRenderer::new(PatternTable::defaults(3).unwrap());
        let mut incremental = PaintBuffer::for_grid(&grid);
        renderer.refresh_all(&grid, &mut incremental);

        // Edit a few cells, refreshing only the affected visual cells
        let edits = [(3, 3), (0, 0), (7, 7), (4, 2)];
        for &(x, y) in &edits {
            grid.set(x, y, Tile::new(TerrainState::OPEN));
            renderer.refresh_affected(&grid, &mut incremental, x, y);
        }

        let mut full = PaintBuffer::for_grid(&grid);
        renderer.refresh_all(&grid, &mut full);

        for vy in 0..full.height() {
            for vx in 0..full.width() {
                assert_eq!(
                    incremental.get(vx, vy),
                    full.get(vx, vy),
                    "stale visual cell ({}, {})",
                    vx,
                    vy
                );
            }
        }
    }

    #[test]
    fn refresh_affected_clips_to_visual_bounds() {
        let grid = soft_grid(4, 4);
        let renderer = DualGridRenderer::new(PatternTable::defaults(3).unwrap());
        let mut painter = PaintBuffer::for_grid(&grid);

        // Corner cells only touch one visual cell; must not panic or wrap
        renderer.refresh_affected(&grid, &mut painter, 0, 0);
        renderer.refresh_affected(&grid, &mut painter, 3, 3);
        assert!(painter.get(0, 0).is_some());
        assert!(painter.get(2, 2).is_some());
    }

    #[test]
    fn world_point_resolves_to_nearest_corner_column_and_row() {
        // Visual cell (2, 3): fraction below 0.5 keeps the cell's own
        // corner, at or above 0.5 takes the next one over.
        assert_eq!(world_to_logical(2.3, 3.3), (2, 3));
        assert_eq!(world_to_logical(2.7, 3.3), (3, 3));
        assert_eq!(world_to_logical(2.3, 3.7), (2, 4));
        assert_eq!(world_to_logical(2.7, 3.7), (3, 4));
        assert_eq!(world_to_logical(0.0, 0.0), (0, 0));
        assert_eq!(world_to_logical(0.5, 0.5), (1, 1));
    }
}
