use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use qlearn_path_core::{
    Coord, LocationKey,
    config::RunConfig,
    environment::{Environment, load_tiles_from_string},
    map::GridCodec,
    path::{PathFinder, Step, WalkPolicy},
    q_table::QTable,
    search::a_star_path,
    training::explore,
};
use rand::{SeedableRng, rngs::StdRng};

mod matprint;
mod watch;

use matprint::TableStyle;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Find the shortest path across a grid world with Q-learning",
    long_about = None
)]
struct Args {
    /// Map file to load instead of generating a random grid
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,
    /// Rows of the generated grid
    #[arg(long)]
    rows: Option<usize>,
    /// Columns of the generated grid
    #[arg(long)]
    cols: Option<usize>,
    /// Exploration rounds used to train the Q-table
    #[arg(short, long)]
    rounds: Option<usize>,
    /// Step cap for the path walk
    #[arg(long)]
    max_iterations: Option<usize>,
    /// Discount factor
    #[arg(short, long)]
    gamma: Option<f64>,
    /// Random seed
    #[arg(short, long)]
    seed: Option<u64>,
    #[arg(long)]
    start_row: Option<usize>,
    #[arg(long)]
    start_col: Option<usize>,
    /// Keep updating the Q-table while walking the path
    #[arg(long)]
    learn_during_walk: bool,
    /// Print the reward matrix
    #[arg(long)]
    show_rewards: bool,
    /// Print the trained Q-table
    #[arg(long)]
    show_q: bool,
    /// Decimal places for printed matrices
    #[arg(long, default_value_t = 0)]
    precision: usize,
    /// Print matrices without row and column labels
    #[arg(long)]
    no_headers: bool,
    /// Trace every path step on stderr
    #[arg(short, long)]
    verbose: bool,
    /// Replay the learned path in the terminal
    #[arg(short, long)]
    watch: bool,
}

impl Args {
    /// Overlays the given flags on the default configuration.
    fn config(&self) -> RunConfig {
        let defaults = RunConfig::default();
        RunConfig {
            rows: self.rows.unwrap_or(defaults.rows),
            cols: self.cols.unwrap_or(defaults.cols),
            rounds: self.rounds.unwrap_or(defaults.rounds),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            gamma: self.gamma.unwrap_or(defaults.gamma),
            seed: self.seed.unwrap_or(defaults.seed),
            start: Coord {
                row: self.start_row.unwrap_or(defaults.start.row),
                col: self.start_col.unwrap_or(defaults.start.col),
            },
            walk_policy: if self.learn_during_walk {
                WalkPolicy::Learning
            } else {
                defaults.walk_policy
            },
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = args.config();
    let mut rng = StdRng::seed_from_u64(config.seed);

    println!("Q-Learning: Finding the shortest path");

    let environment = match &args.map {
        Some(map_file) => {
            let map_string = std::fs::read_to_string(map_file)
                .with_context(|| format!("Failed to read map file {}", map_file.display()))?;
            let tiles = load_tiles_from_string(&map_string)
                .with_context(|| format!("Failed to parse map {}", map_file.display()))?;
            Environment::from_tiles(tiles).context("Failed to build environment from map")?
        }
        None => {
            config.validate().context("Invalid configuration")?;
            Environment::create(config.rows, config.cols, &mut rng)
                .context("Failed to create environment")?
        }
    };
    config
        .validate_for(environment.codec())
        .context("Invalid configuration")?;

    let headers = !args.no_headers;
    let style = TableStyle::default()
        .precision(args.precision)
        .headers(headers, headers);
    let tile_values = environment.tiles().map(|tile| tile.value());
    println!("Tiles:");
    print!("{}", style.clone().precision(0).render(&tile_values));
    if args.show_rewards {
        println!("Rewards:");
        print!("{}", style.render(environment.rewards()));
    }

    let mut qtable = QTable::for_environment(&environment);
    let started = Instant::now();
    let stats = explore(
        &environment,
        &mut qtable,
        config.gamma,
        config.rounds,
        &mut rng,
    );
    let training_time = started.elapsed();
    if stats.skipped > 0 {
        eprintln!(
            "Warning: {} of {} exploration rounds hit a cell with no available actions",
            stats.skipped, stats.rounds
        );
    }
    if args.show_q {
        println!("Q-table:");
        print!("{}", style.render(qtable.as_grid()));
    }

    let codec = environment.codec();
    let start = config.start_key(codec);
    let policy = config.walk_policy;
    let finder = PathFinder::new(config.gamma, config.max_iterations).with_policy(policy);
    let trace = |step: &Step<'_>| {
        if args.verbose {
            eprintln!(
                "{}",
                environment.describe_actions(step.state.location, step.available)
            );
            eprintln!(
                "Best ({}): {} choices, took {}{}",
                step.best_value,
                step.best.len(),
                step.chosen.location,
                codec.coords(step.chosen.location)
            );
        }
    };
    let started = Instant::now();
    let result = finder.find_shortest_path_with(&environment, &mut qtable, start, &mut rng, trace);
    let walk_time = started.elapsed();

    let path = match result {
        Ok(path) => path,
        Err(err) => {
            eprintln!("Partial path: {}", format_path(codec, err.path()));
            return Err(err).context(format!(
                "No path from {} to {}",
                config.start,
                codec.coords(environment.goal())
            ));
        }
    };

    println!(
        "Shortest path from {} to {} ({} steps):",
        config.start,
        codec.coords(environment.goal()),
        path.len() - 1
    );
    println!("{}", format_path(codec, &path));
    if let Some(optimal) = a_star_path(&environment, start) {
        println!("Exact search: {} steps", optimal.len() - 1);
    }
    println!(
        "Explored {} rounds in {:?}, walked path in {:?}",
        stats.rounds, training_time, walk_time
    );

    if args.watch {
        watch::watch(&environment, &path, Duration::from_millis(250))?;
    }

    Ok(())
}

fn format_path(codec: GridCodec, path: &[LocationKey]) -> String {
    path.iter()
        .map(|key| codec.coords(*key).to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
