use std::path::PathBuf;

use clap::Parser;

use cavern_generator::ascii;
use cavern_generator::export;
use cavern_generator::grid::TerrainState;
use cavern_generator::pattern::PatternTable;
use cavern_generator::world::{Layer, WorldDirector};

#[derive(Parser, Debug)]
#[command(name = "cavern_generator")]
#[command(about = "Generate layered cavern worlds with dual-grid rendering")]
struct Args {
    /// Width of each layer grid in tiles
    #[arg(short = 'W', long, default_value = "80")]
    width: usize,

    /// Height of each layer grid in tiles
    #[arg(short = 'H', long, default_value = "48")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Override the gameplay pattern table with a JSON file
    #[arg(long)]
    pattern_table: Option<PathBuf>,

    /// Print an ASCII preview of the gameplay layer
    #[arg(long)]
    ascii: bool,

    /// Print the painted dual-grid preview instead of logical states
    #[arg(long)]
    ascii_visual: bool,

    /// Export the gameplay layer to a PNG (specify output path)
    #[arg(long)]
    export: Option<String>,

    /// Export the full layered world composite to a PNG
    #[arg(long)]
    export_world: Option<String>,
}

fn main() {
    let args = Args::parse();

    let mut director = WorldDirector::new(args.width, args.height, args.seed);
    println!("Generating cavern world with seed: {}", director.seed());
    println!("Layer size: {}x{}", args.width, args.height);

    if let Some(path) = &args.pattern_table {
        match PatternTable::load_from(path, 3) {
            Some(table) => {
                println!(
                    "Loaded pattern table from {} ({} states, {} gaps)",
                    path.display(),
                    table.states(),
                    table.validate().len()
                );
                director.set_gameplay_pattern_table(table);
            }
            None => eprintln!("Warning: could not load any pattern table from {}", path.display()),
        }
    }

    director.generate_world();

    for &kind in Layer::all() {
        let layer = director.layer(kind);
        let grid = layer.generator.grid();
        let open = grid.count_state(TerrainState::OPEN);
        let total = (grid.width() * grid.height()) as usize;
        println!(
            "Generated {} layer: {:.1}% open, {} painted tiles",
            kind.name(),
            100.0 * open as f64 / total as f64,
            painted_cells(layer),
        );
    }

    if args.ascii || args.ascii_visual {
        let layer = director.layer(Layer::Gameplay);
        if args.ascii_visual {
            println!("{}", ascii::render_visual(&layer.painter));
        } else {
            println!("{}", ascii::render_logical(layer.generator.grid()));
        }
    }

    if let Some(path) = &args.export {
        let grid = director.layer(Layer::Gameplay).generator.grid();
        match export::export_grid(grid, path) {
            Ok(()) => println!("Exported gameplay layer to {}", path),
            Err(err) => eprintln!("Warning: failed to export {}: {}", path, err),
        }
    }

    if let Some(path) = &args.export_world {
        match export::export_world(&director, path) {
            Ok(()) => println!("Exported world composite to {}", path),
            Err(err) => eprintln!("Warning: failed to export {}: {}", path, err),
        }
    }
}

fn painted_cells(layer: &cavern_generator::world::WorldLayer) -> usize {
    let mut count = 0;
    for vy in 0..layer.painter.height() {
        for vx in 0..layer.painter.width() {
            if layer.painter.get(vx, vy).is_some() {
                count += 1;
            }
        }
    }
    count
}
