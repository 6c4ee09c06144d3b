//! Blob spawner: places repeated organic features from a weighted mix of
//! shape generators, enforcing minimum spacing and a bounded retry budget,
//! and commits accepted shapes to the grid.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::grid::{GridStore, TerrainState, Tile};
use crate::shapes::ShapeGenerator;

/// Attempts per blob before it is skipped.
const PLACEMENT_RETRIES: u32 = 50;

/// Declarative spawn parameters for one terrain feature family.
/// Read-only during a spawner run.
#[derive(Clone, Debug)]
pub struct BlobSpawnConfig {
    /// Terrain state written for every committed position.
    pub state: TerrainState,
    pub min_count: u32,
    pub max_count: u32,
    /// Minimum Euclidean distance between a new start and any position
    /// already claimed in this spawner run.
    pub min_spacing: f32,
    /// Bernoulli gate on the whole config.
    pub spawn_probability: f64,
    /// Selection weight per registered generator, in registration order.
    /// All-zero weights fall back to the first generator.
    pub generator_weights: Vec<f32>,
}

/// Positions claimed by blobs committed so far in the current run.
/// Transient: one per spawner invocation phase.
#[derive(Default)]
pub struct OccupiedSet {
    positions: Vec<(i32, i32)>,
}

impl OccupiedSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn too_close(&self, x: i32, y: i32, min_spacing: f32) -> bool {
        let limit_sq = min_spacing * min_spacing;
        self.positions.iter().any(|&(px, py)| {
            let dx = (px - x) as f32;
            let dy = (py - y) as f32;
            dx * dx + dy * dy < limit_sq
        })
    }

    fn claim(&mut self, positions: impl IntoIterator<Item = (i32, i32)>) {
        self.positions.extend(positions);
    }
}

/// Orchestrates blob placement across the registered shape generators.
pub struct BlobSpawner {
    generators: Vec<Box<dyn ShapeGenerator>>,
}

impl BlobSpawner {
    pub fn new(generators: Vec<Box<dyn ShapeGenerator>>) -> Self {
        Self { generators }
    }

    /// Run one config against the grid. Returns the number of blobs
    /// actually committed.
    ///
    /// Exhausting the retry budget for one blob skips that blob only;
    /// an empty generator registry skips the whole config with a warning.
    pub fn spawn_blobs(
        &self,
        grid: &mut GridStore,
        config: &BlobSpawnConfig,
        rng: &mut ChaCha8Rng,
        occupied: &mut OccupiedSet,
    ) -> u32 {
        if self.generators.is_empty() {
            eprintln!("Warning: blob spawner has no registered generators, skipping config");
            return 0;
        }
        // A grid under 3 cells wide or tall has no interior to place into
        if grid.width() < 3 || grid.height() < 3 {
            return 0;
        }
        if !rng.gen_bool(config.spawn_probability.clamp(0.0, 1.0)) {
            return 0;
        }

        let count = rng.gen_range(config.min_count..=config.max_count.max(config.min_count));
        let mut committed = 0;

        for _ in 0..count {
            for _attempt in 0..PLACEMENT_RETRIES {
                let x = rng.gen_range(1..grid.width() - 1);
                let y = rng.gen_range(1..grid.height() - 1);
                if occupied.too_close(x, y, config.min_spacing) {
                    continue;
                }

                let generator = self.pick_generator(&config.generator_weights, rng);
                let positions = generator.generate((x, y), grid.width(), grid.height(), rng);
                if positions.is_empty() {
                    continue;
                }

                // Commit: clip to the strict interior and claim
                let tile = Tile::new(config.state);
                let mut claimed = Vec::with_capacity(positions.len());
                for &(px, py) in &positions {
                    if px >= 1 && px <= grid.width() - 2 && py >= 1 && py <= grid.height() - 2 {
                        grid.set(px, py, tile);
                        claimed.push((px, py));
                    }
                }
                occupied.claim(claimed);
                committed += 1;
                break;
            }
            // Retry budget exhausted: this blob is skipped, not fatal
        }

        committed
    }

    /// Weighted choice among registered generators. Zero total weight
    /// defaults to the first registered generator.
    fn pick_generator(&self, weights: &[f32], rng: &mut ChaCha8Rng) -> &dyn ShapeGenerator {
        let total: f32 = self
            .generators
            .iter()
            .enumerate()
            .map(|(i, _)| weights.get(i).copied().unwrap_or(0.0).max(0.0))
            .sum();
        if total <= 0.0 {
            return self.generators[0].as_ref();
        }

        let mut roll = rng.gen::<f32>() * total;
        for (i, generator) in self.generators.iter().enumerate() {
            let w = weights.get(i).copied().unwrap_or(0.0).max(0.0);
            if roll < w {
                return generator.as_ref();
            }
            roll -= w;
        }
        self.generators.last().unwrap().as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{RoundBlob, SnakeBlob};
    use rand::SeedableRng;

    fn spawner() -> BlobSpawner {
        BlobSpawner::new(vec![
            Box::new(RoundBlob::default()),
            Box::new(SnakeBlob::default()),
        ])
    }

    fn test_config() -> BlobSpawnConfig {
        BlobSpawnConfig {
            state: TerrainState::OPEN,
            min_count: 3,
            max_count: 5,
            min_spacing: 4.0,
            spawn_probability: 1.0,
            generator_weights: vec![1.0, 1.0],
        }
    }

    #[test]
    fn committed_blobs_stay_strictly_interior() {
        let mut grid = GridStore::new(32, 32, Tile::new(TerrainState::SOFT));
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut occupied = OccupiedSet::new();

        let committed = spawner().spawn_blobs(&mut grid, &test_config(), &mut rng, &mut occupied);
        assert!(committed >= 1);
        assert!(!occupied.is_empty());

        for x in 0..32 {
            assert_eq!(grid.get(x, 0).state, TerrainState::SOFT);
            assert_eq!(grid.get(x, 31).state, TerrainState::SOFT);
        }
        for y in 0..32 {
            assert_eq!(grid.get(0, y).state, TerrainState::SOFT);
            assert_eq!(grid.get(31, y).state, TerrainState::SOFT);
        }
    }

    #[test]
    fn grids_without_an_interior_spawn_nothing() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut occupied = OccupiedSet::new();
        for (w, h) in [(2, 2), (2, 16), (16, 2), (1, 1)] {
            let mut grid = GridStore::new(w, h, Tile::new(TerrainState::SOFT));
            let committed =
                spawner().spawn_blobs(&mut grid, &test_config(), &mut rng, &mut occupied);
            assert_eq!(committed, 0, "{}x{} grid", w, h);
            assert_eq!(grid.count_state(TerrainState::OPEN), 0);
        }
    }

    #[test]
    fn zero_probability_gate_skips_everything() {
        let mut grid = GridStore::new(16, 16, Tile::new(TerrainState::SOFT));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut occupied = OccupiedSet::new();
        let config = BlobSpawnConfig {
            spawn_probability: 0.0,
            ..test_config()
        };

        let committed = spawner().spawn_blobs(&mut grid, &config, &mut rng, &mut occupied);
        assert_eq!(committed, 0);
        assert_eq!(grid.count_state(TerrainState::OPEN), 0);
    }

    #[test]
    fn empty_registry_skips_the_config() {
        let mut grid = GridStore::new(16, 16, Tile::new(TerrainState::SOFT));
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut occupied = OccupiedSet::new();

        let empty = BlobSpawner::new(Vec::new());
        assert_eq!(empty.spawn_blobs(&mut grid, &test_config(), &mut rng, &mut occupied), 0);
    }

    #[test]
    fn zero_weights_fall_back_to_first_generator() {
        let s = spawner();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let picked = s.pick_generator(&[0.0, 0.0], &mut rng);
        assert_eq!(picked.name(), "round");
    }

    #[test]
    fn spawning_is_deterministic_per_seed() {
        let run = |seed: u64| {
            let mut grid = GridStore::new(40, 40, Tile::new(TerrainState::SOFT));
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut occupied = OccupiedSet::new();
            spawner().spawn_blobs(&mut grid, &test_config(), &mut rng, &mut occupied);
            grid.iter().map(|(_, _, t)| t.state.0).collect::<Vec<_>>()
        };
        assert_eq!(run(99), run(99));
    }
}
