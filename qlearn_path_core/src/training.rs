use crate::{
    environment::{Action, Environment, State},
    q_table::QTable,
    sampler::{RandomSource, sample_random},
};

/// What happened in one exploration round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RoundOutcome {
    Updated { state: State, action: Action },
    /// The sampled cell had no available actions.
    Skipped { state: State },
}

/// Counters for a whole exploration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplorationStats {
    pub rounds: usize,
    pub updated: usize,
    pub skipped: usize,
}

/// One random-walk training step.
///
/// Picks a random cell and a uniformly random available action from it, then
/// applies the Q-table update. Fully walled cells are skipped.
pub fn run_one_round<R>(
    env: &Environment,
    qtable: &mut QTable,
    gamma: f64,
    rng: &mut R,
) -> RoundOutcome
where
    R: RandomSource + ?Sized,
{
    let state = State::new(env.random_location(rng));
    let actions = env.available_actions(state);
    match sample_random(&actions, rng) {
        Ok(action) => {
            qtable.update(state, action, gamma);
            RoundOutcome::Updated { state, action }
        }
        Err(_) => RoundOutcome::Skipped { state },
    }
}

/// Runs `rounds` exploration rounds. The round count is the only stopping criterion.
pub fn explore<R>(
    env: &Environment,
    qtable: &mut QTable,
    gamma: f64,
    rounds: usize,
    rng: &mut R,
) -> ExplorationStats
where
    R: RandomSource + ?Sized,
{
    let mut stats = ExplorationStats {
        rounds,
        ..Default::default()
    };
    for _ in 0..rounds {
        match run_one_round(env, qtable, gamma, rng) {
            RoundOutcome::Updated { .. } => stats.updated += 1,
            RoundOutcome::Skipped { .. } => stats.skipped += 1,
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        LocationKey,
        Tile::{Goal as G, Impassable as X, Passable as P},
        map::Grid,
        sampler::tests::ScriptedSource,
    };
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn round_updates_sampled_pair() {
        // 1x2 grid: [P, G]. Draw 0.0 picks cell 0, 0.99 picks its last action.
        let env = Environment::from_tiles(Grid::from_rows(vec![vec![P, G]]).unwrap()).unwrap();
        let mut q = QTable::for_environment(&env);
        let mut rng = ScriptedSource::new(vec![0.0, 0.99]);
        let outcome = run_one_round(&env, &mut q, 0.8, &mut rng);
        let RoundOutcome::Updated { state, action } = outcome else {
            panic!("expected an update, got {outcome:?}");
        };
        assert_eq!(state.location, LocationKey(0));
        assert_eq!(action.location, LocationKey(1));
        assert_eq!(q.get(LocationKey(0), LocationKey(1)), 100.0);
    }

    #[test]
    fn walled_cells_are_skipped() {
        let tiles = Grid::from_rows(vec![vec![X, X, X], vec![X, X, X], vec![X, X, G]]).unwrap();
        let env = Environment::from_tiles(tiles).unwrap();
        let mut q = QTable::for_environment(&env);
        // Cell 4 is surrounded by impassable cells.
        let mut rng = ScriptedSource::new(vec![4.5 / 9.0]);
        let outcome = run_one_round(&env, &mut q, 0.8, &mut rng);
        assert_eq!(
            outcome,
            RoundOutcome::Skipped {
                state: State::new(LocationKey(4))
            }
        );
        assert_eq!(q, QTable::for_environment(&env));
    }

    #[test]
    fn explore_counts_rounds() {
        let tiles = Grid::from_rows(vec![vec![X, X, X], vec![X, X, X], vec![X, X, G]]).unwrap();
        let env = Environment::from_tiles(tiles).unwrap();
        let mut q = QTable::for_environment(&env);
        let mut rng = StdRng::seed_from_u64(3);
        let stats = explore(&env, &mut q, 0.8, 500, &mut rng);
        assert_eq!(stats.rounds, 500);
        assert_eq!(stats.updated + stats.skipped, 500);
        assert!(stats.skipped > 0);
        assert!(stats.updated > 0);
    }

    #[test]
    fn explore_is_deterministic_for_a_seed() {
        let mut rng = StdRng::seed_from_u64(11);
        let env = Environment::create(5, 5, &mut rng).unwrap();
        let train = |seed| {
            let mut q = QTable::for_environment(&env);
            explore(&env, &mut q, 0.8, 5_000, &mut StdRng::seed_from_u64(seed));
            q
        };
        assert_eq!(train(99), train(99));
    }
}
