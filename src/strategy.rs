//! Ordered generation strategies. The pipeline is linear and the order is
//! contractual: Fill, then blob passes, then Border (the authoritative last
//! word on edges), then Entrance (which may locally overwrite both).

use rand_chacha::ChaCha8Rng;

use crate::grid::{GridStore, TerrainState, Tile};
use crate::shapes::{RoundBlob, ShapeGenerator, SnakeBlob};
use crate::spawner::{BlobSpawnConfig, BlobSpawner, OccupiedSet};

/// One pipeline stage: a pure mutation of the grid given an rng stream.
/// Stateless beyond its own configuration.
pub trait Strategy {
    fn name(&self) -> &'static str;
    fn apply(&self, grid: &mut GridStore, rng: &mut ChaCha8Rng);
}

/// Stage 1: every cell set to one base terrain state.
pub struct FillStrategy {
    pub state: TerrainState,
}

impl Strategy for FillStrategy {
    fn name(&self) -> &'static str {
        "fill"
    }

    fn apply(&self, grid: &mut GridStore, _rng: &mut ChaCha8Rng) {
        grid.fill(Tile::new(self.state));
    }
}

/// Stage 2: one spawner invocation per config, all sharing this strategy
/// instance's rng stream and one working set of claimed positions.
pub struct BlobStrategy {
    spawner: BlobSpawner,
    configs: Vec<BlobSpawnConfig>,
}

impl BlobStrategy {
    pub fn new(spawner: BlobSpawner, configs: Vec<BlobSpawnConfig>) -> Self {
        Self { spawner, configs }
    }

    /// The standard round + snake generator mix.
    pub fn with_default_generators(configs: Vec<BlobSpawnConfig>) -> Self {
        let generators: Vec<Box<dyn ShapeGenerator>> = vec![
            Box::new(RoundBlob::default()),
            Box::new(SnakeBlob::default()),
        ];
        Self::new(BlobSpawner::new(generators), configs)
    }
}

impl Strategy for BlobStrategy {
    fn name(&self) -> &'static str {
        "blobs"
    }

    fn apply(&self, grid: &mut GridStore, rng: &mut ChaCha8Rng) {
        let mut occupied = OccupiedSet::new();
        for config in &self.configs {
            self.spawner.spawn_blobs(grid, config, rng, &mut occupied);
        }
    }
}

/// Stage 3: force the outer ring to the layer's impassable terminal state,
/// unconditionally overwriting anything upstream put there.
pub struct BorderStrategy {
    /// Terminal state `K-1` of the layer: SOLID for the gameplay layer,
    /// SOFT for 2-state background layers.
    pub state: TerrainState,
}

impl Strategy for BorderStrategy {
    fn name(&self) -> &'static str {
        "border"
    }

    fn apply(&self, grid: &mut GridStore, _rng: &mut ChaCha8Rng) {
        let solid = Tile::new(self.state);
        let (w, h) = (grid.width(), grid.height());
        for x in 0..w {
            grid.set(x, 0, solid);
            grid.set(x, h - 1, solid);
        }
        for y in 0..h {
            grid.set(0, y, solid);
            grid.set(w - 1, y, solid);
        }
    }
}

/// Stage 4: carve the guaranteed entrance, overwriting blob and border
/// output locally. An open spawn platform breaches the top border (y grows
/// upward), with a diggable neck corridor directly beneath it, so the
/// player always has an unobstructed top-to-interior path.
#[derive(Clone, Debug)]
pub struct EntranceStrategy {
    pub neck_width: i32,
    pub neck_length: i32,
    pub spawn_area_height: i32,
}

impl EntranceStrategy {
    /// Columns the platform and neck occupy, centered on the grid.
    pub fn columns(&self, grid_width: i32) -> std::ops::Range<i32> {
        let left = (grid_width - self.neck_width) / 2;
        left..left + self.neck_width
    }

    /// Rows of the open platform: [H-1-spawnAreaHeight, H-1].
    pub fn platform_rows(&self, grid_height: i32) -> std::ops::RangeInclusive<i32> {
        grid_height - 1 - self.spawn_area_height..=grid_height - 1
    }

    /// Rows of the diggable neck, directly below the platform.
    pub fn neck_rows(&self, grid_height: i32) -> std::ops::RangeInclusive<i32> {
        let top = grid_height - 2 - self.spawn_area_height;
        top - self.neck_length + 1..=top
    }
}

impl Strategy for EntranceStrategy {
    fn name(&self) -> &'static str {
        "entrance"
    }

    fn apply(&self, grid: &mut GridStore, _rng: &mut ChaCha8Rng) {
        let open = Tile::new(TerrainState::OPEN);
        let soft = Tile::new(TerrainState::SOFT);

        for y in self.platform_rows(grid.height()) {
            for x in self.columns(grid.width()) {
                grid.set(x, y, open);
            }
        }
        for y in self.neck_rows(grid.height()) {
            for x in self.columns(grid.width()) {
                grid.set(x, y, soft);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(0)
    }

    #[test]
    fn fill_sets_every_cell() {
        let mut grid = GridStore::new(12, 9, Tile::new(TerrainState::OPEN));
        FillStrategy { state: TerrainState::SOFT }.apply(&mut grid, &mut rng());
        assert_eq!(grid.count_state(TerrainState::SOFT), 12 * 9);
    }

    #[test]
    fn border_owns_the_outer_ring() {
        let mut grid = GridStore::new(10, 10, Tile::new(TerrainState::OPEN));
        // Pretend a blob leaked onto the edge
        grid.set(0, 4, Tile::new(TerrainState::SOFT));
        BorderStrategy { state: TerrainState::SOLID }.apply(&mut grid, &mut rng());

        for x in 0..10 {
            for y in 0..10 {
                if x == 0 || x == 9 || y == 0 || y == 9 {
                    assert_eq!(grid.get(x, y).state, TerrainState::SOLID);
                }
            }
        }
        assert_eq!(grid.get(1, 1).state, TerrainState::OPEN);
    }

    #[test]
    fn entrance_scenario_from_fill_border() {
        // 10x10, Fill(SOFT) -> Border -> Entrance(neck 2x3, platform height 2)
        let mut grid = GridStore::new(10, 10, Tile::new(TerrainState::OPEN));
        let mut rng = rng();
        FillStrategy { state: TerrainState::SOFT }.apply(&mut grid, &mut rng);
        BorderStrategy { state: TerrainState::SOLID }.apply(&mut grid, &mut rng);
        let entrance = EntranceStrategy {
            neck_width: 2,
            neck_length: 3,
            spawn_area_height: 2,
        };
        entrance.apply(&mut grid, &mut rng);

        let cols = entrance.columns(10);
        assert_eq!(cols, 4..6);

        for y in 0..10 {
            for x in 0..10 {
                let in_cols = cols.contains(&x);
                let on_ring = x == 0 || x == 9 || y == 0 || y == 9;
                let expected = if in_cols && (7..=9).contains(&y) {
                    TerrainState::OPEN // spawn platform
                } else if in_cols && (4..=6).contains(&y) {
                    TerrainState::SOFT // neck corridor
                } else if on_ring {
                    TerrainState::SOLID
                } else {
                    TerrainState::SOFT
                };
                assert_eq!(grid.get(x, y).state, expected, "cell ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn entrance_connects_platform_to_neck_bottom() {
        let entrance = EntranceStrategy {
            neck_width: 3,
            neck_length: 4,
            spawn_area_height: 2,
        };
        let mut grid = GridStore::new(20, 20, Tile::new(TerrainState::SOLID));
        entrance.apply(&mut grid, &mut rng());

        // Every row from the platform top down to the neck bottom is
        // OPEN or SOFT in the entrance columns.
        let bottom = *entrance.neck_rows(20).start();
        let x = entrance.columns(20).start;
        for y in bottom..=19 {
            let state = grid.get(x, y).state;
            assert!(
                state == TerrainState::OPEN || state == TerrainState::SOFT,
                "row {} blocked",
                y
            );
        }
    }
}
