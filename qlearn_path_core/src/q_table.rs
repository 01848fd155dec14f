//! Q-table for single-step temporal difference learning over grid cells.

use crate::{
    Coord, LocationKey,
    environment::{Action, Environment, State},
    map::Grid,
};

/// Learned values indexed like the reward matrix: row = from, column = to.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Grid<f64>,
}

impl QTable {
    /// Create a zeroed table for `cells` locations.
    pub fn new(cells: usize) -> Self {
        Self {
            values: Grid::new(cells, cells),
        }
    }

    pub fn for_environment(env: &Environment) -> Self {
        Self::new(env.cell_count())
    }

    pub fn cell_count(&self) -> usize {
        self.values.rows()
    }

    /// Get the Q-value for moving from `from` to `to`.
    pub fn get(&self, from: LocationKey, to: LocationKey) -> f64 {
        self.values[cell(from, to)]
    }

    pub fn row(&self, from: LocationKey) -> &[f64] {
        self.values.row(from.index())
    }

    pub fn as_grid(&self) -> &Grid<f64> {
        &self.values
    }

    /// Q(s, a) ← r + γ · max Q(a, ·)
    ///
    /// The destination of the action becomes the next state; there is no
    /// learning rate, the old value is overwritten.
    pub fn update(&mut self, state: State, action: Action, gamma: f64) {
        let max_next = self.max_q(action.location);
        self.values[cell(state.location, action.location)] = action.reward + gamma * max_next;
    }

    /// Largest value in row `loc`.
    pub fn max_q(&self, loc: LocationKey) -> f64 {
        self.row(loc)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Every candidate sharing the highest Q-value from `state`, with that value.
    ///
    /// The running maximum starts at zero, so candidates valued at zero are
    /// kept until something strictly positive shows up and anything negative
    /// is never returned.
    pub fn best_actions(&self, state: State, candidates: &[Action]) -> (f64, Vec<Action>) {
        let row = self.row(state.location);
        let mut max = 0.0;
        let mut best = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let value = row[candidate.location.index()];
            if value == max {
                best.push(*candidate);
            } else if value > max {
                max = value;
                best.clear();
                best.push(*candidate);
            }
        }
        (max, best)
    }
}

fn cell(from: LocationKey, to: LocationKey) -> Coord {
    Coord {
        row: from.index(),
        col: to.index(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::GOAL_REWARD;
    use proptest::prelude::*;

    fn action(to: usize, reward: f64) -> Action {
        Action {
            location: LocationKey(to),
            reward,
        }
    }

    fn state(at: usize) -> State {
        State::new(LocationKey(at))
    }

    #[test]
    fn new_table_is_zeroed() {
        let q = QTable::new(3);
        assert_eq!(q.cell_count(), 3);
        assert!(q.as_grid().iter().all(|v| *v == 0.0));
        assert_eq!(q.max_q(LocationKey(2)), 0.0);
    }

    #[test]
    fn update_discounts_best_next_value() {
        let mut q = QTable::new(3);
        q.update(state(2), action(2, GOAL_REWARD), 0.8);
        assert_eq!(q.get(LocationKey(2), LocationKey(2)), 100.0);

        q.update(state(1), action(2, 0.0), 0.8);
        assert!((q.get(LocationKey(1), LocationKey(2)) - 80.0).abs() < 1e-9);

        q.update(state(0), action(1, 0.0), 0.8);
        assert!((q.get(LocationKey(0), LocationKey(1)) - 64.0).abs() < 1e-9);
    }

    #[test]
    fn update_overwrites_previous_value() {
        let mut q = QTable::new(2);
        q.update(state(0), action(1, 50.0), 0.5);
        q.update(state(0), action(1, 10.0), 0.5);
        assert_eq!(q.get(LocationKey(0), LocationKey(1)), 10.0);
    }

    #[test]
    fn best_actions_enumerates_ties() {
        let mut q = QTable::new(4);
        q.update(state(0), action(1, 10.0), 0.0);
        q.update(state(0), action(3, 10.0), 0.0);
        q.update(state(0), action(2, 5.0), 0.0);
        let candidates = [
            action(0, 0.0),
            action(1, 0.0),
            action(2, 0.0),
            action(3, 0.0),
        ];
        let (max, best) = q.best_actions(state(0), &candidates);
        assert_eq!(max, 10.0);
        assert_eq!(best, vec![candidates[1], candidates[3]]);
    }

    #[test]
    fn best_actions_keeps_all_zero_candidates() {
        let q = QTable::new(3);
        let candidates = [action(0, 0.0), action(2, 0.0)];
        let (max, best) = q.best_actions(state(1), &candidates);
        assert_eq!(max, 0.0);
        assert_eq!(best, candidates.to_vec());
        assert_eq!(q.best_actions(state(1), &[]), (0.0, vec![]));
    }

    proptest! {
        #[test]
        fn best_actions_are_maximal(values in proptest::collection::vec(0u8..4, 1..8)) {
            let n = values.len();
            let mut q = QTable::new(n);
            for (to, v) in values.iter().enumerate() {
                q.update(state(0), action(to, f64::from(*v)), 0.0);
            }
            let candidates: Vec<Action> = (0..n).map(|to| action(to, 0.0)).collect();
            let (max, best) = q.best_actions(state(0), &candidates);
            prop_assert!(!best.is_empty());
            for a in &best {
                prop_assert_eq!(q.get(LocationKey(0), a.location), max);
            }
            for c in &candidates {
                prop_assert!(q.get(LocationKey(0), c.location) <= max);
            }
        }
    }
}
