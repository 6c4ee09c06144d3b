//! Pattern table: the immutable lookup from a 4-corner terrain pattern to a
//! renderable tile asset.
//!
//! The table is authored declaratively in JSON. Defaults for the supported
//! state counts are embedded in the binary via `include_str!`; an optional
//! on-disk file can override them.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::grid::TerrainState;

// Embedded default tables: 2-state (background layers) and 3-state (gameplay).
const DEFAULT_TABLE_K2_JSON: &str = include_str!("../data/defaults/pattern_table_k2.json");
const DEFAULT_TABLE_K3_JSON: &str = include_str!("../data/defaults/pattern_table_k3.json");

/// The four logical states surrounding one visual cell, in the order
/// top-left, top-right, bottom-left, bottom-right.
///
/// Ephemeral: computed on demand from four grid reads, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CornerPattern(pub [TerrainState; 4]);

impl CornerPattern {
    /// The reserved "no tile" pattern: fully open space draws nothing.
    pub const ALL_OPEN: CornerPattern = CornerPattern([TerrainState::OPEN; 4]);
}

/// One JSON entry of the external pattern source.
#[derive(Clone, Debug, Deserialize)]
pub struct PatternEntry {
    /// Asset index handed to the tile painter.
    pub index: usize,
    /// Column of the tile in the source atlas.
    pub column: usize,
    /// Row of the tile in the source atlas.
    pub row: usize,
    /// Corner states as [tl, tr, bl, br].
    pub pattern: [u8; 4],
}

#[derive(Clone, Debug, Deserialize)]
pub struct PatternTableFile {
    /// Number of terrain states K this table was authored for.
    pub states: u8,
    pub entries: Vec<PatternEntry>,
}

/// Immutable pattern → asset lookup, built once at load.
pub struct PatternTable {
    states: u8,
    by_pattern: HashMap<CornerPattern, (usize, (usize, usize))>,
}

impl PatternTable {
    /// Load the embedded default table for `states` terrain states.
    ///
    /// Returns `None` for state counts no default is authored for.
    /// Parse failures of embedded data are programming errors and panic.
    pub fn defaults(states: u8) -> Option<Self> {
        let json = match states {
            2 => DEFAULT_TABLE_K2_JSON,
            3 => DEFAULT_TABLE_K3_JSON,
            _ => return None,
        };
        let file: PatternTableFile = serde_json::from_str(json)
            .expect("Failed to parse embedded pattern table");
        Some(Self::from_file(file))
    }

    /// Load from a JSON file on disk, falling back to the embedded default
    /// for `states` when the file is missing or unparseable.
    pub fn load_from(path: &Path, states: u8) -> Option<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<PatternTableFile>(&contents) {
                Ok(file) => Some(Self::from_file(file)),
                Err(err) => {
                    eprintln!("Warning: failed to parse {}: {}", path.display(), err);
                    Self::defaults(states)
                }
            },
            Err(_) => {
                eprintln!(
                    "Warning: pattern table {} not found, using embedded default",
                    path.display()
                );
                Self::defaults(states)
            }
        }
    }

    /// Build the lookup from a parsed file, reporting coverage gaps.
    pub fn from_file(file: PatternTableFile) -> Self {
        let mut by_pattern = HashMap::with_capacity(file.entries.len());
        for entry in &file.entries {
            let pattern = CornerPattern(entry.pattern.map(TerrainState));
            by_pattern.insert(pattern, (entry.index, (entry.column, entry.row)));
        }

        let table = Self {
            states: file.states,
            by_pattern,
        };

        let missing = table.validate();
        if !missing.is_empty() {
            eprintln!(
                "Warning: pattern table for {} states is missing {} of {} patterns",
                table.states,
                missing.len(),
                (table.states as usize).pow(4) - 1,
            );
            for pattern in &missing {
                eprintln!("  missing pattern {:?}", pattern.0.map(|s| s.0));
            }
        }

        table
    }

    /// Number of terrain states this table covers.
    pub fn states(&self) -> u8 {
        self.states
    }

    /// Asset index for a pattern. `None` for the reserved all-open pattern
    /// (nothing drawn) and for table gaps (render degrades, see
    /// [`crate::render`]).
    pub fn asset_index(&self, pattern: CornerPattern) -> Option<usize> {
        self.by_pattern.get(&pattern).map(|&(index, _)| index)
    }

    /// Atlas (column, row) for a pattern, if present.
    pub fn atlas_cell(&self, pattern: CornerPattern) -> Option<(usize, usize)> {
        self.by_pattern.get(&pattern).map(|&(_, cell)| cell)
    }

    /// Whether a pattern has an entry at all (the all-open pattern
    /// intentionally has none).
    pub fn contains(&self, pattern: CornerPattern) -> bool {
        self.by_pattern.contains_key(&pattern)
    }

    /// Enumerate every possible K^4 pattern and return the ones with no
    /// entry, excluding the reserved all-open pattern.
    pub fn validate(&self) -> Vec<CornerPattern> {
        let k = self.states;
        let mut missing = Vec::new();
        for tl in 0..k {
            for tr in 0..k {
                for bl in 0..k {
                    for br in 0..k {
                        let pattern =
                            CornerPattern([tl, tr, bl, br].map(TerrainState));
                        if pattern == CornerPattern::ALL_OPEN {
                            continue;
                        }
                        if !self.by_pattern.contains_key(&pattern) {
                            missing.push(pattern);
                        }
                    }
                }
            }
        }
        missing
    }
}
