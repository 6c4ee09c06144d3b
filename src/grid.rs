//! Logical terrain grid: a dense 2D store of tile states with
//! bounds-safe reads and silent/notifying write paths.

/// A terrain state index in `0..K-1` for a layer configured with K states.
///
/// The encoding is generic; the gameplay layer reads these as
/// `OPEN`/`SOFT`/`SOLID`, background layers use only `OPEN`/`SOFT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TerrainState(pub u8);

impl TerrainState {
    /// Fully open space: walkable, nothing drawn for an all-open neighborhood.
    pub const OPEN: TerrainState = TerrainState(0);
    /// Diggable ground: navigable eventually, but not instantly open.
    pub const SOFT: TerrainState = TerrainState(1);
    /// Undiggable rock: the impassable terminal state, also the
    /// out-of-bounds sentinel.
    pub const SOLID: TerrainState = TerrainState(2);
}

/// A single cell value. Replaced wholesale on change, never mutated in place.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub state: TerrainState,
}

impl Tile {
    pub const fn new(state: TerrainState) -> Self {
        Self { state }
    }
}

/// Tile returned for every out-of-bounds read. Keeping the sentinel
/// impassable means the renderer and generation code never special-case
/// edges.
pub const SENTINEL: Tile = Tile::new(TerrainState::SOLID);

/// A dense W×H grid of tiles, row-major, fixed size after construction.
///
/// All in-bounds cells are populated from the moment of construction.
/// Reads take signed coordinates so callers can probe past the edges and
/// get the [`SENTINEL`] back instead of an error.
pub struct GridStore {
    width: i32,
    height: i32,
    data: Vec<Tile>,
    changes: Vec<(i32, i32, Tile)>,
}

impl GridStore {
    /// Allocate a grid fully populated with `initial`.
    pub fn new(width: usize, height: usize, initial: Tile) -> Self {
        Self {
            width: width as i32,
            height: height as i32,
            data: vec![initial; width * height],
            changes: Vec::new(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Never fails: out-of-bounds coordinates return the impassable sentinel.
    pub fn get(&self, x: i32, y: i32) -> Tile {
        if self.in_bounds(x, y) {
            self.data[self.index(x, y)]
        } else {
            SENTINEL
        }
    }

    /// Silent write: state mutation only, no change record. Out-of-bounds
    /// writes are ignored (a normal boundary condition, not an error).
    /// Bulk pipeline stages go through this variant.
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.data[idx] = tile;
        }
    }

    /// Notifying write: mutation plus a change record for the owner to
    /// drain. Runtime edits (digging, tools) go through this variant so
    /// the affected visual cells get re-rendered and dependent layers
    /// hear about the transition.
    pub fn set_notifying(&mut self, x: i32, y: i32, tile: Tile) {
        if self.in_bounds(x, y) {
            let idx = self.index(x, y);
            self.data[idx] = tile;
            self.changes.push((x, y, tile));
        }
    }

    /// Hand over and clear the pending change records.
    pub fn drain_changes(&mut self) -> Vec<(i32, i32, Tile)> {
        std::mem::take(&mut self.changes)
    }

    /// Set every cell to `tile`.
    pub fn fill(&mut self, tile: Tile) {
        self.data.fill(tile);
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, &tile)| {
            let x = idx as i32 % width;
            let y = idx as i32 / width;
            (x, y, tile)
        })
    }

    /// Count cells currently holding `state`.
    pub fn count_state(&self, state: TerrainState) -> usize {
        self.data.iter().filter(|t| t.state == state).count()
    }
}
