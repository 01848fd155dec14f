//! Exact shortest-path search over the environment's transitions, used to
//! judge how close a learned route is to optimal.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use crate::{
    LocationKey,
    environment::{Environment, State},
};

/// Returns Manhattan distance between two cells, measured on the torus.
pub fn wrapped_manhattan(env: &Environment, a: LocationKey, b: LocationKey) -> usize {
    let codec = env.codec();
    let (a, b) = (codec.coords(a), codec.coords(b));
    let dr = a.row.abs_diff(b.row);
    let dc = a.col.abs_diff(b.col);
    dr.min(codec.rows() - dr) + dc.min(codec.cols() - dc)
}

/// A* over the moves the environment allows, from `start` to the goal.
///
/// Returns the full route including `start`, or `None` if the goal is
/// unreachable.
pub fn a_star_path(env: &Environment, start: LocationKey) -> Option<Vec<LocationKey>> {
    // For priority queue
    #[derive(Clone, Eq, PartialEq)]
    struct PrioritizedItem {
        priority: usize,
        location: LocationKey,
    }

    impl Ord for PrioritizedItem {
        fn cmp(&self, other: &Self) -> Ordering {
            // Reverse ordering for min-heap behavior
            other
                .priority
                .cmp(&self.priority)
                .then_with(|| other.location.cmp(&self.location))
        }
    }

    impl PartialOrd for PrioritizedItem {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let goal = env.goal();
    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<LocationKey, LocationKey> = HashMap::new();
    let mut cost_so_far: HashMap<LocationKey, usize> = HashMap::new();

    frontier.push(PrioritizedItem {
        priority: 0,
        location: start,
    });
    cost_so_far.insert(start, 0);

    let mut goal_reached = false;

    while let Some(PrioritizedItem {
        location: current, ..
    }) = frontier.pop()
    {
        if current == goal {
            goal_reached = true;
            break;
        }

        let current_cost = cost_so_far.get(&current).copied().unwrap_or(usize::MAX);
        for action in env.available_actions(State::new(current)) {
            let neighbor = action.location;
            if neighbor == current {
                continue;
            }
            let new_cost = current_cost + 1;
            let improved = cost_so_far
                .get(&neighbor)
                .is_none_or(|&known| new_cost < known);
            if improved {
                cost_so_far.insert(neighbor, new_cost);
                let priority = new_cost + wrapped_manhattan(env, neighbor, goal);
                frontier.push(PrioritizedItem {
                    priority,
                    location: neighbor,
                });
                came_from.insert(neighbor, current);
            }
        }
    }

    if !goal_reached {
        return None;
    }

    // Reconstruct path
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        current = *came_from.get(&current)?;
        path.push(current);
    }
    path.reverse();
    Some(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Tile::{Goal as G, Impassable as X, Passable as P},
        map::Grid,
    };

    fn env(rows: Vec<Vec<crate::Tile>>) -> Environment {
        Environment::from_tiles(Grid::from_rows(rows).unwrap()).unwrap()
    }

    #[test]
    fn manhattan_uses_shorter_way_round() {
        let env = env(vec![vec![P, P, P, P, P, G]]);
        assert_eq!(wrapped_manhattan(&env, LocationKey(0), LocationKey(5)), 1);
        assert_eq!(wrapped_manhattan(&env, LocationKey(1), LocationKey(4)), 3);
    }

    #[test]
    fn finds_route_around_wall() {
        let env = env(vec![
            vec![P, X, G, X],
            vec![P, X, P, X],
            vec![P, P, P, X],
            vec![X, X, X, X],
        ]);
        let path = a_star_path(&env, LocationKey(0)).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(path.first(), Some(&LocationKey(0)));
        assert_eq!(path.last(), Some(&env.goal()));
    }

    #[test]
    fn start_on_goal_is_single_cell() {
        let env = env(vec![vec![G, P]]);
        let path = a_star_path(&env, LocationKey(0));
        assert_eq!(path, Some(vec![LocationKey(0)]));
    }

    #[test]
    fn unreachable_goal_is_none() {
        let env = env(vec![vec![P, X, G, X]]);
        assert_eq!(a_star_path(&env, LocationKey(0)), None);
    }
}
