use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod environment;
pub mod map;
pub mod path;
pub mod q_table;
pub mod sampler;
pub mod search;
pub mod training;

/// Flattened index of one grid cell (`row * cols + col`).
///
/// Also the row/column index into the reward matrix and the Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationKey(pub usize);

impl LocationKey {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a 2D cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Represents the kind of a cell in the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    Impassable,
    Passable,
    Goal,
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Passable
    }
}

impl Tile {
    /// Numeric view of the tile: -1 impassable, 0 passable, 1 goal.
    pub fn value(self) -> f64 {
        match self {
            Tile::Impassable => -1.0,
            Tile::Passable => 0.0,
            Tile::Goal => 1.0,
        }
    }
}
