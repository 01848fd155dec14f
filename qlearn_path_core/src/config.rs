use serde::{Deserialize, Serialize};

use crate::{Coord, LocationKey, environment::MAX_CELLS, map::GridCodec, path::WalkPolicy};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("grid of {rows}x{cols} exceeds the limit of {} cells", MAX_CELLS)]
    GridTooLarge { rows: usize, cols: usize },
    #[error("gamma must be within [0, 1], got {0}")]
    InvalidGamma(f64),
    #[error("start {start} is outside the {rows}x{cols} grid")]
    StartOutOfBounds { start: Coord, rows: usize, cols: usize },
}

/// Settings for one explore-then-walk run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub rows: usize,
    pub cols: usize,
    /// Number of exploration rounds before the path is extracted.
    pub rounds: usize,
    /// Step cap for the greedy walk.
    pub max_iterations: usize,
    pub gamma: f64,
    pub seed: u64,
    pub start: Coord,
    pub walk_policy: WalkPolicy,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            rows: 8,
            cols: 8,
            rounds: 300_000,
            max_iterations: 100,
            gamma: 0.8,
            seed: 1,
            start: Coord { row: 0, col: 0 },
            walk_policy: WalkPolicy::ReadOnly,
        }
    }
}

impl RunConfig {
    /// Checks the settings against each other. The grid checked here is
    /// `rows x cols`, which must be non-empty and hold at most [`MAX_CELLS`]
    /// cells; a loaded map must be checked with [`RunConfig::validate_for`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (rows, cols) = (self.rows, self.cols);
        if rows == 0 || cols == 0 {
            return Err(ConfigError::InvalidDimensions { rows, cols });
        }
        let codec = GridCodec::new(rows, cols)
            .filter(|codec| codec.cell_count() <= MAX_CELLS)
            .ok_or(ConfigError::GridTooLarge { rows, cols })?;
        self.validate_for(codec)
    }

    /// Checks gamma and the start cell against a known grid.
    pub fn validate_for(&self, codec: GridCodec) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(ConfigError::InvalidGamma(self.gamma));
        }
        if !codec.contains(self.start) {
            return Err(ConfigError::StartOutOfBounds {
                start: self.start,
                rows: codec.rows(),
                cols: codec.cols(),
            });
        }
        Ok(())
    }

    pub fn start_key(&self, codec: GridCodec) -> LocationKey {
        codec.key_of(self.start)
    }
}
