use qlearn_path_core::{
    LocationKey,
    Tile::{self, Goal as G, Impassable as X, Passable as P},
    environment::{Environment, GOAL_REWARD, State},
    map::Grid,
    path::{PathError, PathFinder},
    q_table::QTable,
    search::a_star_path,
    training::explore,
};
use rand::{SeedableRng, rngs::StdRng};

const GAMMA: f64 = 0.8;

fn env_from(rows: Vec<Vec<Tile>>) -> Environment {
    Environment::from_tiles(Grid::from_rows(rows).unwrap()).unwrap()
}

fn trained(env: &Environment, rounds: usize, seed: u64) -> QTable {
    let mut q = QTable::for_environment(env);
    explore(env, &mut q, GAMMA, rounds, &mut StdRng::seed_from_u64(seed));
    q
}

#[test]
fn two_by_two_prefers_moving_toward_goal() {
    let env = env_from(vec![vec![P, P], vec![P, G]]);
    let q = trained(&env, 5_000, 42);
    let origin = env.codec().key(0, 0);

    let candidates = env.available_actions(State::new(origin));
    let (max, best) = q.best_actions(State::new(origin), &candidates);
    assert!(max > q.get(origin, origin));
    assert!(!best.is_empty());
    let toward_goal = [env.codec().key(0, 1), env.codec().key(1, 0)];
    for action in &best {
        assert_ne!(action.location, origin);
        assert!(toward_goal.contains(&action.location));
    }

    let mut rng = StdRng::seed_from_u64(7);
    let path = PathFinder::new(GAMMA, 4)
        .find_shortest_path(&env, &q, origin, &mut rng)
        .unwrap();
    assert!(path.len() <= 3);
    assert_eq!(path.first(), Some(&origin));
    assert_eq!(path.last(), Some(&env.codec().key(1, 1)));
}

#[test]
fn goal_only_grid() {
    let env = env_from(vec![vec![X, X, X], vec![X, G, X], vec![X, X, X]]);
    let goal = env.goal();
    let actions = env.available_actions(State::new(goal));
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0].location, goal);
    assert_eq!(actions[0].reward, GOAL_REWARD);

    let q = trained(&env, 1_000, 1);
    let mut rng = StdRng::seed_from_u64(1);
    let path = PathFinder::new(GAMMA, 10)
        .find_shortest_path(&env, &q, goal, &mut rng)
        .unwrap();
    assert_eq!(path, vec![goal]);
}

fn full_run(seed: u64) -> (QTable, Result<Vec<LocationKey>, PathError>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let env = Environment::create(6, 6, &mut rng).unwrap();
    let mut q = QTable::for_environment(&env);
    explore(&env, &mut q, GAMMA, 20_000, &mut rng);
    let path = PathFinder::new(GAMMA, 100).find_shortest_path(&env, &q, LocationKey(0), &mut rng);
    (q, path)
}

#[test]
fn fixed_seed_reproduces_table_and_path() {
    for seed in [3, 17, 2024] {
        assert_eq!(full_run(seed), full_run(seed));
    }
}

#[test]
fn converged_walk_matches_exact_search() {
    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let env = Environment::create(6, 6, &mut rng).unwrap();
        let q = trained(&env, 200_000, seed);
        for start in [LocationKey(0), LocationKey(14), LocationKey(35)] {
            let Some(optimal) = a_star_path(&env, start) else {
                continue;
            };
            let learned = PathFinder::new(GAMMA, 100)
                .find_shortest_path(&env, &q, start, &mut rng)
                .unwrap();
            assert_eq!(learned.len(), optimal.len(), "seed {seed} start {start}");
        }
    }
}
