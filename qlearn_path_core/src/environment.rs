use serde::{Deserialize, Serialize};

use crate::{
    Coord, LocationKey, Tile,
    map::{Grid, GridCodec, GridError},
    sampler::RandomSource,
};

/// Probability that a generated cell is impassable.
pub const IMPASSABLE_PROBABILITY: f64 = 0.3;
/// Reward for a transition that is not allowed.
pub const BLOCKED_REWARD: f64 = -1.0;
/// Reward for moving onto a passable cell.
pub const STEP_REWARD: f64 = 0.0;
/// Reward for any move into the goal, including staying on it.
pub const GOAL_REWARD: f64 = 100.0;
/// Largest supported cell count; the reward matrix and Q-table are both cells x cells.
pub const MAX_CELLS: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvironmentError {
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },
    #[error("grid of {rows}x{cols} exceeds the limit of {} cells", MAX_CELLS)]
    GridTooLarge { rows: usize, cols: usize },
    #[error("tile grid has no goal cell")]
    MissingGoal,
    #[error("tile grid has more than one goal cell: {first} and {second}")]
    MultipleGoals { first: Coord, second: Coord },
}

/// Errors produced while parsing a map file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Map string is empty.")]
    Empty,
    #[error("Unknown map code '{code}' at position ({row}, {col}).")]
    UnknownCode { code: String, row: usize, col: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// The agent's current cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    pub location: LocationKey,
}

impl State {
    pub fn new(location: LocationKey) -> Self {
        State { location }
    }
}

/// A candidate move to `location` and the immediate reward for taking it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub location: LocationKey,
    pub reward: f64,
}

/// The grid world: tiles, the transition rewards derived from them, and the goal.
#[derive(Debug, Clone)]
pub struct Environment {
    codec: GridCodec,
    tiles: Grid<Tile>,
    /// Row `from`, column `to`.
    rewards: Grid<f64>,
    goal: LocationKey,
}

impl Environment {
    /// Generates a random environment.
    ///
    /// Each cell is impassable with probability [`IMPASSABLE_PROBABILITY`],
    /// then one uniformly chosen cell becomes the goal regardless of what it was.
    pub fn create<R>(rows: usize, cols: usize, rng: &mut R) -> Result<Self, EnvironmentError>
    where
        R: RandomSource + ?Sized,
    {
        let codec = checked_codec(rows, cols)?;
        let mut tiles = Grid::from_generator(rows, cols, |_, _| {
            if rng.next_unit() < IMPASSABLE_PROBABILITY {
                Tile::Impassable
            } else {
                Tile::Passable
            }
        });
        let goal = LocationKey(rng.next_index(codec.cell_count()));
        tiles[goal] = Tile::Goal;
        Ok(Self::build(codec, tiles, goal))
    }

    /// Builds an environment from an explicit tile grid with exactly one goal.
    pub fn from_tiles(tiles: Grid<Tile>) -> Result<Self, EnvironmentError> {
        let codec = checked_codec(tiles.rows(), tiles.cols())?;

        let goals: Vec<LocationKey> = tiles
            .enumerate()
            .filter(|(_, tile)| **tile == Tile::Goal)
            .map(|(key, _)| key)
            .collect();
        let goal = match goals.as_slice() {
            [] => return Err(EnvironmentError::MissingGoal),
            [goal] => *goal,
            [first, second, ..] => {
                return Err(EnvironmentError::MultipleGoals {
                    first: codec.coords(*first),
                    second: codec.coords(*second),
                });
            }
        };
        Ok(Self::build(codec, tiles, goal))
    }

    fn build(codec: GridCodec, tiles: Grid<Tile>, goal: LocationKey) -> Self {
        let cells = codec.cell_count();
        let mut rewards = Grid::from_generator(cells, cells, |_, _| BLOCKED_REWARD);
        for from in 0..cells {
            let from = LocationKey(from);
            let destinations = std::iter::once(from).chain(codec.neighbours(from));
            for to in destinations {
                let reward = match tiles[to] {
                    Tile::Impassable => BLOCKED_REWARD,
                    Tile::Goal => GOAL_REWARD,
                    Tile::Passable => STEP_REWARD,
                };
                rewards[Coord {
                    row: from.index(),
                    col: to.index(),
                }] = reward;
            }
        }
        Environment {
            codec,
            tiles,
            rewards,
            goal,
        }
    }

    /// Actions whose reward from `state` is non-negative, in ascending key order.
    ///
    /// Empty when the cell and all its neighbours are impassable.
    pub fn available_actions(&self, state: State) -> Vec<Action> {
        self.rewards
            .row(state.location.index())
            .iter()
            .enumerate()
            .filter(|(_, reward)| **reward >= 0.0)
            .map(|(to, reward)| Action {
                location: LocationKey(to),
                reward: *reward,
            })
            .collect()
    }

    /// A uniformly random cell.
    pub fn random_location<R>(&self, rng: &mut R) -> LocationKey
    where
        R: RandomSource + ?Sized,
    {
        LocationKey(rng.next_index(self.cell_count()))
    }

    pub fn reward(&self, from: LocationKey, to: LocationKey) -> f64 {
        self.rewards[Coord {
            row: from.index(),
            col: to.index(),
        }]
    }

    pub fn codec(&self) -> GridCodec {
        self.codec
    }
    pub fn tiles(&self) -> &Grid<Tile> {
        &self.tiles
    }
    pub fn rewards(&self) -> &Grid<f64> {
        &self.rewards
    }
    pub fn goal(&self) -> LocationKey {
        self.goal
    }
    pub fn cell_count(&self) -> usize {
        self.codec.cell_count()
    }

    /// Debug listing of the actions available from `location`.
    pub fn describe_actions(&self, location: LocationKey, actions: &[Action]) -> String {
        let mut out = format!("Actions from {}{}:", location, self.codec.coords(location));
        for action in actions {
            out.push_str(&format!(
                " {}{}={}",
                action.location,
                self.codec.coords(action.location),
                action.reward
            ));
        }
        out
    }
}

/// Codec for a `rows x cols` grid small enough for the dense matrices.
pub fn checked_codec(rows: usize, cols: usize) -> Result<GridCodec, EnvironmentError> {
    if rows == 0 || cols == 0 {
        return Err(EnvironmentError::InvalidDimensions { rows, cols });
    }
    GridCodec::new(rows, cols)
        .filter(|codec| codec.cell_count() <= MAX_CELLS)
        .ok_or(EnvironmentError::GridTooLarge { rows, cols })
}

/// Loads a tile grid from a string representation of a map.
///
/// Tokens are whitespace separated: `#` impassable, `.` passable, `G` goal.
/// Blank lines and lines starting with `;` are ignored.
pub fn load_tiles_from_string(map_string: &str) -> Result<Grid<Tile>, MapError> {
    let mut rows = Vec::new();
    for line in map_string
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with(';'))
    {
        let row = rows.len();
        let tiles = line
            .split_whitespace()
            .enumerate()
            .map(|(col, token)| match token {
                "#" => Ok(Tile::Impassable),
                "." => Ok(Tile::Passable),
                "G" => Ok(Tile::Goal),
                unknown => Err(MapError::UnknownCode {
                    code: unknown.to_string(),
                    row,
                    col,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(tiles);
    }
    if rows.is_empty() {
        return Err(MapError::Empty);
    }
    Ok(Grid::from_rows(rows)?)
}
