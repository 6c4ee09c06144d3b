//! Shape generators: each produces the set of grid positions making up one
//! organic terrain feature ("blob"), deterministically for a given rng
//! stream. Output is always strictly interior; the border pass that runs
//! later owns the outer ring.

use std::collections::HashSet;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Cardinal step offsets: right, left, up, down.
const CARDINALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// One organic-feature generator. The spawner depends only on this
/// capability, never on the concrete shape.
pub trait ShapeGenerator {
    fn name(&self) -> &'static str;

    /// Produce the positions of one blob grown from `start` inside a
    /// `width`×`height` grid. Deterministic for a given rng state.
    fn generate(
        &self,
        start: (i32, i32),
        width: i32,
        height: i32,
        rng: &mut ChaCha8Rng,
    ) -> HashSet<(i32, i32)>;
}

fn interior(x: i32, y: i32, width: i32, height: i32) -> bool {
    x >= 1 && x <= width - 2 && y >= 1 && y <= height - 2
}

/// Large round blob: probabilistic disc sampling with a radial falloff,
/// rounded into an organic shape by a few cellular smoothing passes.
#[derive(Clone, Debug)]
pub struct RoundBlob {
    pub min_radius: i32,
    pub max_radius: i32,
    /// Base inclusion probability at the center (scaled by 1.2 there,
    /// fading to ~0.2× at the rim).
    pub fill_ratio: f32,
    pub smoothing_passes: u32,
}

impl Default for RoundBlob {
    fn default() -> Self {
        Self {
            min_radius: 3,
            max_radius: 6,
            fill_ratio: 0.7,
            smoothing_passes: 2,
        }
    }
}

impl ShapeGenerator for RoundBlob {
    fn name(&self) -> &'static str {
        "round"
    }

    fn generate(
        &self,
        start: (i32, i32),
        width: i32,
        height: i32,
        rng: &mut ChaCha8Rng,
    ) -> HashSet<(i32, i32)> {
        let radius = rng
            .gen_range(self.min_radius..=self.max_radius.max(self.min_radius))
            .max(1);
        let mut filled = HashSet::new();

        // Sample the disc in fixed row-major order so the rng stream is
        // consumed identically on every run.
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let dist = ((dx * dx + dy * dy) as f32).sqrt();
                if dist > radius as f32 {
                    continue;
                }
                let p = (self.fill_ratio * (1.2 - dist / radius as f32)).clamp(0.0, 1.0);
                if rng.gen::<f32>() < p {
                    filled.insert((start.0 + dx, start.1 + dy));
                }
            }
        }

        for _ in 0..self.smoothing_passes {
            filled = smooth(&filled);
        }

        filled.retain(|&(x, y)| interior(x, y, width, height));
        filled
    }
}

/// One 8-neighbor majority pass over the expanded bounding box of the set:
/// a cell is filled next iteration with >=5 filled neighbors, or stays
/// filled with >=4. Rounds sampling noise into a coherent blob.
fn smooth(filled: &HashSet<(i32, i32)>) -> HashSet<(i32, i32)> {
    let Some(&(fx, fy)) = filled.iter().next() else {
        return HashSet::new();
    };
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (fx, fx, fy, fy);
    for &(x, y) in filled {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let mut next = HashSet::with_capacity(filled.len());
    for y in min_y - 1..=max_y + 1 {
        for x in min_x - 1..=max_x + 1 {
            let mut neighbors = 0;
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if (dx != 0 || dy != 0) && filled.contains(&(x + dx, y + dy)) {
                        neighbors += 1;
                    }
                }
            }
            let keep = neighbors >= 5 || (filled.contains(&(x, y)) && neighbors >= 4);
            if keep {
                next.insert((x, y));
            }
        }
    }
    next
}

/// Winding snake blob: a cardinal random walk stamping a square brush,
/// optionally sprouting shorter branch walks from cells the main walk
/// visited.
#[derive(Clone, Debug)]
pub struct SnakeBlob {
    pub min_length: i32,
    pub max_length: i32,
    /// Per-step probability of re-rolling a new random direction.
    pub turn_chance: f32,
    /// Half-width of the square brush stamped at each step (0 = single cell).
    pub half_width: i32,
    pub max_branches: i32,
}

impl Default for SnakeBlob {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 20,
            turn_chance: 0.3,
            half_width: 1,
            max_branches: 2,
        }
    }
}

impl SnakeBlob {
    /// Walk `length` steps from `start` heading `dir` (index into
    /// [`CARDINALS`]), stamping into `out` and recording the cells the walk
    /// itself occupied into `visited`.
    fn walk(
        &self,
        start: (i32, i32),
        mut dir: usize,
        length: i32,
        width: i32,
        height: i32,
        rng: &mut ChaCha8Rng,
        out: &mut HashSet<(i32, i32)>,
        visited: &mut Vec<(i32, i32)>,
    ) {
        let mut pos = start;
        for step in 0..length {
            self.stamp(pos, width, height, out);
            visited.push(pos);

            // Last stamp needs no move afterwards
            if step == length - 1 {
                break;
            }

            if self.turn_chance > 0.0 && rng.gen::<f32>() < self.turn_chance {
                dir = rng.gen_range(0..CARDINALS.len());
            }
            let (dx, dy) = CARDINALS[dir];
            let mut next = (pos.0 + dx, pos.1 + dy);
            if !interior(next.0, next.1, width, height) {
                // Exactly one alternate try before giving up on the walk
                dir = rng.gen_range(0..CARDINALS.len());
                let (dx, dy) = CARDINALS[dir];
                next = (pos.0 + dx, pos.1 + dy);
                if !interior(next.0, next.1, width, height) {
                    break;
                }
            }
            pos = next;
        }
    }

    fn stamp(&self, center: (i32, i32), width: i32, height: i32, out: &mut HashSet<(i32, i32)>) {
        for dy in -self.half_width..=self.half_width {
            for dx in -self.half_width..=self.half_width {
                let (x, y) = (center.0 + dx, center.1 + dy);
                if interior(x, y, width, height) {
                    out.insert((x, y));
                }
            }
        }
    }
}

impl ShapeGenerator for SnakeBlob {
    fn name(&self) -> &'static str {
        "snake"
    }

    fn generate(
        &self,
        start: (i32, i32),
        width: i32,
        height: i32,
        rng: &mut ChaCha8Rng,
    ) -> HashSet<(i32, i32)> {
        let length = rng
            .gen_range(self.min_length..=self.max_length.max(self.min_length))
            .max(1);
        let dir = rng.gen_range(0..CARDINALS.len());

        let mut out = HashSet::new();
        let mut visited = Vec::new();
        self.walk(start, dir, length, width, height, rng, &mut out, &mut visited);

        if !visited.is_empty() && self.max_branches > 0 {
            let branches = rng.gen_range(0..=self.max_branches);
            for _ in 0..branches {
                let branch_start = visited[rng.gen_range(0..visited.len())];
                let branch_dir = rng.gen_range(0..CARDINALS.len());
                let mut branch_visited = Vec::new();
                self.walk(
                    branch_start,
                    branch_dir,
                    (length / 2).max(1),
                    width,
                    height,
                    rng,
                    &mut out,
                    &mut branch_visited,
                );
            }
        }

        out
    }
}
