use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use tsp_evolve::ga::{CrossoverWeights, GaConfig, GaRunner, MatingPool, Mutation, Selection};
use tsp_evolve::random::rng_from_option;
use tsp_evolve::{format_route, Instance, Result, TspError};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SelectionArg {
    Rank,
    Tournament,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MutationArg {
    Inversion,
    Swap,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Approximate a Euclidean TSP instance with a time-bounded genetic algorithm.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Instance file: first line N, then N lines `<index> <x> <y>`.
    #[arg(required_unless_present = "generate")]
    input: Option<PathBuf>,

    /// Generate a random instance with this many vertices instead of reading one.
    #[arg(long, conflicts_with = "input")]
    generate: Option<usize>,

    /// Write the generated instance to this file.
    #[arg(long, requires = "generate")]
    save: Option<PathBuf>,

    /// Time budget in seconds.
    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    #[arg(long, default_value_t = 200)]
    population: usize,

    /// Mating pool size; defaults to half the population.
    #[arg(long)]
    pool: Option<usize>,

    #[arg(long, default_value_t = 7)]
    mutation_percent: u8,

    #[arg(long, value_enum, default_value_t = SelectionArg::Rank)]
    selection: SelectionArg,

    #[arg(long, value_enum, default_value_t = MutationArg::Inversion)]
    mutation: MutationArg,

    #[arg(long, default_value_t = 0)]
    pmx_weight: u32,

    #[arg(long, default_value_t = 10)]
    ox_weight: u32,

    #[arg(long)]
    max_generations: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

impl Args {
    fn config(&self) -> Result<GaConfig> {
        if !(self.seconds.is_finite() && self.seconds > 0.0) {
            return Err(TspError::ZeroTimeLimit);
        }
        let mut config = GaConfig::default()
            .with_population_size(self.population)
            .with_mutation_percent(self.mutation_percent)
            .with_crossover_weights(CrossoverWeights::new(self.pmx_weight, self.ox_weight))
            .with_selection(match self.selection {
                SelectionArg::Rank => Selection::Rank,
                SelectionArg::Tournament => Selection::tournament(),
            })
            .with_mutation(match self.mutation {
                MutationArg::Inversion => Mutation::Inversion,
                MutationArg::Swap => Mutation::Swap,
            })
            .with_time_limit_ms((self.seconds * 1000.0).ceil() as u64);
        if let Some(pool) = self.pool {
            config = config.with_mating_pool(MatingPool::Size(pool));
        }
        if let Some(max) = self.max_generations {
            config = config.with_max_generations(max);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        Ok(config)
    }

    fn instance(&self) -> Result<Instance> {
        match (&self.input, self.generate) {
            (Some(path), _) => Instance::from_file(path),
            (None, Some(n)) => {
                let mut rng = rng_from_option(self.seed);
                let instance = Instance::random(n, &mut rng)?;
                if let Some(path) = &self.save {
                    std::fs::write(path, instance.to_text())?;
                    info!("instance saved to {}", path.display());
                }
                Ok(instance)
            }
            (None, None) => Err(TspError::InvalidConfig(
                "either an input file or --generate is required".into(),
            )),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.log_level.to_filter())
        .format_timestamp_millis()
        .init();

    let instance = args.instance()?;
    let config = args.config()?;
    info!("instance: n={}", instance.len());

    let matrix = instance.distance_matrix();
    let result = GaRunner::run(&matrix, &config)?;

    println!("Shortest distance: {:.3}", result.best_distance);
    println!("Route: {}", format_route(&result.best_route));
    info!(
        "generations={} found_at={} time={:.2}s",
        result.generations,
        result.found_at,
        result.elapsed.as_secs_f64()
    );
    Ok(())
}
