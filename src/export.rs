//! PNG export of generated grids.

use image::{ImageBuffer, Rgb, RgbImage};

use crate::grid::{GridStore, TerrainState};
use crate::world::{Layer, WorldDirector};

/// Pixels per logical cell in exported images.
const CELL_PX: u32 = 4;

/// Flat color per terrain state on the gameplay palette.
fn state_color(state: TerrainState) -> [u8; 3] {
    match state {
        TerrainState::OPEN => [24, 22, 34],    // cave darkness
        TerrainState::SOFT => [140, 84, 41],   // diggable earth
        TerrainState::SOLID => [96, 96, 104],  // bare rock
        TerrainState(_) => [255, 0, 255],
    }
}

/// Dimmer palettes for layers behind/in front of the playfield.
fn layer_color(layer: Layer, state: TerrainState) -> [u8; 3] {
    let base = state_color(state);
    let scale = match layer {
        Layer::DistantBackground => 0.35,
        Layer::MidBackground => 0.6,
        Layer::Gameplay => 1.0,
        Layer::Foreground => 1.2,
    };
    base.map(|c| ((c as f32 * scale).min(255.0)) as u8)
}

/// Export one logical grid, one `CELL_PX` square per cell, top row
/// (highest y) at the top of the image.
pub fn export_grid(grid: &GridStore, path: &str) -> Result<(), image::ImageError> {
    let mut img: RgbImage = ImageBuffer::new(
        grid.width() as u32 * CELL_PX,
        grid.height() as u32 * CELL_PX,
    );

    for (x, y, tile) in grid.iter() {
        let color = Rgb(state_color(tile.state));
        let px = x as u32 * CELL_PX;
        let py = (grid.height() - 1 - y) as u32 * CELL_PX;
        for dy in 0..CELL_PX {
            for dx in 0..CELL_PX {
                img.put_pixel(px + dx, py + dy, color);
            }
        }
    }

    img.save(path)
}

/// Export the whole world as one composite: layers painted back to front,
/// OPEN cells transparent except on the distant background.
pub fn export_world(director: &WorldDirector, path: &str) -> Result<(), image::ImageError> {
    let base = director.layer(Layer::DistantBackground).generator.grid();
    let mut img: RgbImage = ImageBuffer::new(
        base.width() as u32 * CELL_PX,
        base.height() as u32 * CELL_PX,
    );

    for &kind in Layer::all() {
        let grid = director.layer(kind).generator.grid();
        for (x, y, tile) in grid.iter() {
            if kind != Layer::DistantBackground && tile.state == TerrainState::OPEN {
                continue;
            }
            let color = Rgb(layer_color(kind, tile.state));
            let px = x as u32 * CELL_PX;
            let py = (grid.height() - 1 - y) as u32 * CELL_PX;
            for dy in 0..CELL_PX {
                for dx in 0..CELL_PX {
                    img.put_pixel(px + dx, py + dy, color);
                }
            }
        }
    }

    img.save(path)
}
