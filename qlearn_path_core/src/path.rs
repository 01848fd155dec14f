use serde::{Deserialize, Serialize};

use crate::{
    LocationKey,
    environment::{Action, Environment, State},
    q_table::QTable,
    sampler::{RandomSource, SelectionError, sample_random},
};

/// Whether the table keeps learning while a path is walked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkPolicy {
    /// The table is only read; repeated walks see the same values.
    #[default]
    ReadOnly,
    /// Each chosen step is also applied as a Q-table update.
    Learning,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PathError {
    #[error("couldn't find path within max iterations ({max_iterations})")]
    MaxIterations {
        max_iterations: usize,
        path: Vec<LocationKey>,
    },
    #[error("sampling next action from {at}: {source}")]
    Sampling {
        at: LocationKey,
        path: Vec<LocationKey>,
        source: SelectionError,
    },
}

impl PathError {
    /// The locations visited before the walk gave up.
    pub fn path(&self) -> &[LocationKey] {
        match self {
            PathError::MaxIterations { path, .. } | PathError::Sampling { path, .. } => path,
        }
    }
}

/// One step of a walk, reported to the step observer.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<'a> {
    pub state: State,
    pub available: &'a [Action],
    pub best_value: f64,
    pub best: &'a [Action],
    pub chosen: Action,
}

/// Greedy walker over a trained Q-table.
///
/// From each state it takes one of the best valued actions, breaking ties
/// uniformly at random, until it reaches the goal or runs out of iterations.
/// The route may revisit cells; how short it is depends on how well the table
/// converged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathFinder {
    pub gamma: f64,
    pub max_iterations: usize,
    pub policy: WalkPolicy,
}

impl PathFinder {
    pub fn new(gamma: f64, max_iterations: usize) -> Self {
        PathFinder {
            gamma,
            max_iterations,
            policy: WalkPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: WalkPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Walks from `start` to the goal without touching the table.
    pub fn find_shortest_path<R>(
        &self,
        env: &Environment,
        qtable: &QTable,
        start: LocationKey,
        rng: &mut R,
    ) -> Result<Vec<LocationKey>, PathError>
    where
        R: RandomSource + ?Sized,
    {
        self.walk(env, &mut TableAccess::Read(qtable), start, rng, |_| {})
    }

    /// Walks from `start` to the goal, following [`PathFinder::policy`].
    ///
    /// `on_step` sees every decision before the state advances.
    pub fn find_shortest_path_with<R, F>(
        &self,
        env: &Environment,
        qtable: &mut QTable,
        start: LocationKey,
        rng: &mut R,
        on_step: F,
    ) -> Result<Vec<LocationKey>, PathError>
    where
        R: RandomSource + ?Sized,
        F: FnMut(&Step<'_>),
    {
        let mut access = match self.policy {
            WalkPolicy::ReadOnly => TableAccess::Read(qtable),
            WalkPolicy::Learning => TableAccess::Write(qtable),
        };
        self.walk(env, &mut access, start, rng, on_step)
    }

    /// Walks from `start` to the goal, updating the table at every step.
    pub fn find_shortest_path_learning<R>(
        &self,
        env: &Environment,
        qtable: &mut QTable,
        start: LocationKey,
        rng: &mut R,
    ) -> Result<Vec<LocationKey>, PathError>
    where
        R: RandomSource + ?Sized,
    {
        self.walk(env, &mut TableAccess::Write(qtable), start, rng, |_| {})
    }

    fn walk<R, F>(
        &self,
        env: &Environment,
        table: &mut TableAccess<'_>,
        start: LocationKey,
        rng: &mut R,
        mut on_step: F,
    ) -> Result<Vec<LocationKey>, PathError>
    where
        R: RandomSource + ?Sized,
        F: FnMut(&Step<'_>),
    {
        let goal = State::new(env.goal());
        let mut state = State::new(start);
        let mut path = vec![start];
        let mut iterations = 0;

        while state != goal {
            if iterations >= self.max_iterations {
                return Err(PathError::MaxIterations {
                    max_iterations: self.max_iterations,
                    path,
                });
            }
            iterations += 1;

            let available = env.available_actions(state);
            let (best_value, best) = table.get().best_actions(state, &available);
            let chosen = match sample_random(&best, rng) {
                Ok(action) => action,
                Err(source) => {
                    return Err(PathError::Sampling {
                        at: state.location,
                        path,
                        source,
                    });
                }
            };
            on_step(&Step {
                state,
                available: &available,
                best_value,
                best: &best,
                chosen,
            });
            if let TableAccess::Write(qtable) = table {
                qtable.update(state, chosen, self.gamma);
            }

            path.push(chosen.location);
            state = State::new(chosen.location);
        }
        Ok(path)
    }
}

enum TableAccess<'a> {
    Read(&'a QTable),
    Write(&'a mut QTable),
}

impl TableAccess<'_> {
    fn get(&self) -> &QTable {
        match self {
            TableAccess::Read(qtable) => *qtable,
            TableAccess::Write(qtable) => &**qtable,
        }
    }
}
