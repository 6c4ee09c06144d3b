//! World director: sequences the independent per-layer grids, propagating
//! one shared seed so terrain features stay correlated across layers.

use crate::generator::{LayerGeneratorConfig, MapGenerator};
use crate::grid::{TerrainState, Tile};
use crate::pattern::PatternTable;
use crate::render::{DualGridRenderer, PaintBuffer};
use crate::spawner::BlobSpawnConfig;
use crate::strategy::EntranceStrategy;

/// The four world layers, in generation order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    DistantBackground,
    MidBackground,
    Gameplay,
    Foreground,
}

impl Layer {
    pub fn all() -> &'static [Layer] {
        &[
            Layer::DistantBackground,
            Layer::MidBackground,
            Layer::Gameplay,
            Layer::Foreground,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Layer::DistantBackground => "distant background",
            Layer::MidBackground => "mid background",
            Layer::Gameplay => "gameplay",
            Layer::Foreground => "foreground",
        }
    }

    fn index(&self) -> usize {
        match self {
            Layer::DistantBackground => 0,
            Layer::MidBackground => 1,
            Layer::Gameplay => 2,
            Layer::Foreground => 3,
        }
    }

    /// Default generation parameters for this layer.
    pub fn default_config(&self) -> LayerGeneratorConfig {
        match self {
            // Sparse, large open caverns far behind the action
            Layer::DistantBackground => LayerGeneratorConfig {
                state_count: 2,
                fill_state: TerrainState::SOFT,
                blob_configs: vec![BlobSpawnConfig {
                    state: TerrainState::OPEN,
                    min_count: 3,
                    max_count: 6,
                    min_spacing: 10.0,
                    spawn_probability: 1.0,
                    generator_weights: vec![1.0, 0.0],
                }],
                entrance: None,
            },
            // Denser mix of caverns and winding tunnels
            Layer::MidBackground => LayerGeneratorConfig {
                state_count: 2,
                fill_state: TerrainState::SOFT,
                blob_configs: vec![BlobSpawnConfig {
                    state: TerrainState::OPEN,
                    min_count: 4,
                    max_count: 8,
                    min_spacing: 8.0,
                    spawn_probability: 1.0,
                    generator_weights: vec![1.0, 1.0],
                }],
                entrance: None,
            },
            // The diggable playfield: open caverns, hard rock pockets,
            // sealed border, guaranteed entrance
            Layer::Gameplay => LayerGeneratorConfig {
                state_count: 3,
                fill_state: TerrainState::SOFT,
                blob_configs: vec![
                    BlobSpawnConfig {
                        state: TerrainState::OPEN,
                        min_count: 4,
                        max_count: 8,
                        min_spacing: 8.0,
                        spawn_probability: 1.0,
                        generator_weights: vec![1.0, 1.5],
                    },
                    BlobSpawnConfig {
                        state: TerrainState::SOLID,
                        min_count: 2,
                        max_count: 4,
                        min_spacing: 10.0,
                        spawn_probability: 0.9,
                        generator_weights: vec![1.0, 0.5],
                    },
                ],
                entrance: Some(EntranceStrategy {
                    neck_width: 2,
                    neck_length: 4,
                    spawn_area_height: 2,
                }),
            },
            // Occluding patches in front of the playfield
            Layer::Foreground => LayerGeneratorConfig {
                state_count: 2,
                fill_state: TerrainState::OPEN,
                blob_configs: vec![BlobSpawnConfig {
                    state: TerrainState::SOFT,
                    min_count: 3,
                    max_count: 6,
                    min_spacing: 9.0,
                    spawn_probability: 1.0,
                    generator_weights: vec![1.0, 1.0],
                }],
                entrance: None,
            },
        }
    }
}

/// One layer's grid, generator and render surface bundled together.
pub struct WorldLayer {
    pub kind: Layer,
    pub generator: MapGenerator,
    /// None when the layer's pattern table failed to load: the layer still
    /// generates, but renders nothing.
    pub renderer: Option<DualGridRenderer>,
    pub painter: PaintBuffer,
}

/// A change raised by the notifying edit path, forwarded to cross-layer
/// subscribers.
pub type TileChanged = (Layer, i32, i32, Tile);

/// Owns the session seed and the four layer generators.
pub struct WorldDirector {
    seed: u64,
    layers: Vec<WorldLayer>,
    subscribers: Vec<Box<dyn FnMut(TileChanged)>>,
}

impl WorldDirector {
    /// Build the four layers at `width`×`height`. A fresh random seed is
    /// drawn when none is supplied; pass one for reproducibility.
    pub fn new(width: usize, height: usize, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random);
        let layers = Layer::all()
            .iter()
            .map(|&kind| {
                let config = kind.default_config();
                let table = PatternTable::defaults(config.state_count);
                if table.is_none() {
                    eprintln!(
                        "Warning: no pattern table for {} states, {} layer will not render",
                        config.state_count,
                        kind.name()
                    );
                }
                let generator = MapGenerator::new(width, height, config);
                let painter = PaintBuffer::for_grid(generator.grid());
                WorldLayer {
                    kind,
                    generator,
                    renderer: table.map(DualGridRenderer::new),
                    painter,
                }
            })
            .collect();
        Self {
            seed,
            layers,
            subscribers: Vec::new(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn layer(&self, kind: Layer) -> &WorldLayer {
        &self.layers[kind.index()]
    }

    /// Register a cross-layer change subscriber.
    pub fn subscribe(&mut self, subscriber: Box<dyn FnMut(TileChanged)>) {
        self.subscribers.push(subscriber);
    }

    /// Replace the gameplay layer's pattern table with an externally
    /// authored one.
    pub fn set_gameplay_pattern_table(&mut self, table: PatternTable) {
        self.layers[Layer::Gameplay.index()].renderer = Some(DualGridRenderer::new(table));
    }

    /// Generate every layer from the shared seed, in fixed order, then
    /// perform each layer's single full render refresh.
    pub fn generate_world(&mut self) {
        for layer in &mut self.layers {
            layer.generator.generate_map(self.seed);
            match &layer.renderer {
                Some(renderer) => {
                    renderer.refresh_all(layer.generator.grid(), &mut layer.painter)
                }
                None => eprintln!(
                    "Warning: skipping render refresh for unrenderable {} layer",
                    layer.kind.name()
                ),
            }
        }
    }

    /// Runtime edit on the gameplay layer: notifying write, incremental
    /// re-render, event forwarded to subscribers; a cell dug fully open
    /// also clears the foreground occlusion over it.
    pub fn dig(&mut self, x: i32, y: i32, state: TerrainState) {
        let changes = {
            let layer = &mut self.layers[Layer::Gameplay.index()];
            layer
                .generator
                .edit_cell(x, y, state, layer.renderer.as_ref(), &mut layer.painter)
        };

        for &(cx, cy, tile) in &changes {
            for subscriber in &mut self.subscribers {
                subscriber((Layer::Gameplay, cx, cy, tile));
            }
        }

        for (cx, cy, tile) in changes {
            if tile.state == TerrainState::OPEN {
                let fg = &mut self.layers[Layer::Foreground.index()];
                if fg.generator.grid().get(cx, cy).state != TerrainState::OPEN {
                    fg.generator.edit_cell(
                        cx,
                        cy,
                        TerrainState::OPEN,
                        fg.renderer.as_ref(),
                        &mut fg.painter,
                    );
                }
            }
        }
    }
}
