//! Cavern world generation library
//!
//! Builds finite 2D tile grids for a mining-style game world through a
//! deterministic, seeded strategy pipeline, and renders them through a
//! dual-grid pattern table. Re-exports modules for use by binaries and
//! tools.

pub mod ascii;
pub mod export;
pub mod generator;
pub mod grid;
pub mod pattern;
pub mod render;
pub mod shapes;
pub mod spawner;
pub mod strategy;
pub mod world;
