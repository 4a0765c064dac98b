//! GA evolutionary loop execution.
//!
//! [`GaRunner`] orchestrates the complete evolutionary process:
//! initialization → evaluation → selection → crossover → mutation → repeat,
//! until the wall-clock budget runs out.

use super::config::{BestUpdate, Elitism, GaConfig};
use super::init::PopulationInitializer;
use super::operators::{CrossoverWeights, Mutation};
use super::selection::{best_index, build_mating_pool, RankTable};
use super::snapshot::Snapshot;
use crate::error::Result;
use crate::matrix::DistanceMatrix;
use crate::random::{percent_chance, rng_from_option, shuffle};
use crate::route::{tour_length, Route};
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Result of a GA optimization run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaResult {
    /// Shortest route found during the entire run.
    pub best_route: Route,

    /// Cyclic length of `best_route`.
    pub best_distance: f64,

    /// Generation in which `best_route` was recorded.
    pub found_at: usize,

    /// Total number of generations executed.
    pub generations: usize,

    /// Whether the run was stopped through the cancel flag.
    pub cancelled: bool,

    /// Best-so-far distance after initialization and after each generation.
    pub distance_history: Vec<f64>,

    /// Wall-clock time spent, initialization included.
    pub elapsed: Duration,
}

/// Best route seen so far and the generation it was found in.
#[derive(Debug, Clone)]
struct BestSoFar {
    route: Route,
    distance: f64,
    generation: usize,
}

impl BestSoFar {
    fn snapshot(&self, generation: usize) -> Snapshot {
        Snapshot {
            generation,
            route: self.route.clone(),
            distance: self.distance,
        }
    }
}

/// Executes the GA evolutionary loop.
///
/// # Usage
///
/// ```
/// use tsp_evolve::ga::{GaConfig, GaRunner, MatingPool};
/// use tsp_evolve::{DistanceMatrix, Point};
///
/// let matrix = DistanceMatrix::from_points(&[
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 10.0),
///     Point::new(10.0, 10.0),
///     Point::new(10.0, 0.0),
/// ]);
/// let config = GaConfig::default()
///     .with_population_size(12)
///     .with_mating_pool(MatingPool::Size(6))
///     .with_max_generations(20)
///     .with_seed(42);
///
/// let result = GaRunner::run(&matrix, &config).unwrap();
/// assert_eq!(result.best_distance, 40.0);
/// ```
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA until the time budget (or generation cap) is reached.
    ///
    /// # Errors
    /// Fails before the first generation on an invalid configuration or an
    /// instance with fewer than 3 vertices, and with
    /// [`TspError::GenerationExhausted`](crate::TspError::GenerationExhausted)
    /// if the initial population cannot be filled.
    pub fn run(matrix: &DistanceMatrix, config: &GaConfig) -> Result<GaResult> {
        Self::run_with_observer(matrix, config, None, |_| {})
    }

    /// Runs the GA with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the GA stops at
    /// the end of the current generation and returns the best route found
    /// so far.
    pub fn run_with_cancel(
        matrix: &DistanceMatrix,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<GaResult> {
        Self::run_with_observer(matrix, config, cancel, |_| {})
    }

    /// Runs the GA, handing `observer` a [`Snapshot`] of the best route after
    /// initialization and after each generation.
    pub fn run_with_observer<F>(
        matrix: &DistanceMatrix,
        config: &GaConfig,
        cancel: Option<Arc<AtomicBool>>,
        mut observer: F,
    ) -> Result<GaResult>
    where
        F: FnMut(&Snapshot),
    {
        config.validate_for(matrix.len())?;

        let started = Instant::now();
        let budget = Duration::from_millis(config.time_limit_ms);
        let pool_size = config.mating_pool_size();
        let mut rng = rng_from_option(config.seed);

        log::info!(
            "ga start: n={} population={} pool={} selection={:?} mutation={:?} weights={:?} budget={}ms",
            matrix.len(),
            config.population_size,
            pool_size,
            config.selection,
            config.mutation,
            config.crossover_weights,
            config.time_limit_ms
        );

        // 1. Initialize population
        let mut population = PopulationInitializer::from_config(config).build(matrix, &mut rng)?;
        let mut rank_table = RankTable::new(population.len());

        // 2. Evaluate initial population and track best
        let mut lengths = evaluate_population(&population, matrix);
        let mut best = BestSoFar {
            route: Vec::new(),
            distance: f64::INFINITY,
            generation: 0,
        };
        update_best(&mut best, &population, &lengths, 0, config.best_update);
        let mut distance_history = vec![best.distance];
        observer(&best.snapshot(0));

        let mut generation = 0usize;
        let mut cancelled = false;

        // 3. Evolutionary loop
        loop {
            if rank_table.len() != population.len() {
                rank_table = RankTable::new(population.len());
            }

            // Selection
            let mut pool = build_mating_pool(
                config.selection,
                &population,
                &lengths,
                pool_size,
                config.elitism,
                &rank_table,
                &mut rng,
            )?;
            let elite_slot = match config.elitism {
                Elitism::KeepBest => Some(pool.len() - 1),
                Elitism::None => None,
            };

            // Crossover: pool grows from M to 2M
            recombine(&mut pool, config.crossover_weights, &mut rng)?;

            // Mutation
            mutate_population(
                &mut pool,
                config.mutation,
                config.mutation_percent,
                elite_slot,
                &mut rng,
            )?;

            population = pool;
            generation += 1;

            // Evaluate and update best
            lengths = evaluate_population(&population, matrix);
            if update_best(&mut best, &population, &lengths, generation, config.best_update) {
                log::debug!("gen={generation} improved best={:.3}", best.distance);
            }
            distance_history.push(best.distance);
            observer(&best.snapshot(generation));

            // Termination: checked once per generation
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }
            if started.elapsed() >= budget {
                break;
            }
            if config.max_generations.is_some_and(|max| generation >= max) {
                break;
            }
        }

        let elapsed = started.elapsed();
        log::info!(
            "ga done: generations={generation} best={:.3} found_at={} elapsed={:.2}s cancelled={cancelled}",
            best.distance,
            best.generation,
            elapsed.as_secs_f64()
        );

        Ok(GaResult {
            best_distance: best.distance,
            found_at: best.generation,
            best_route: best.route,
            generations: generation,
            cancelled,
            distance_history,
            elapsed,
        })
    }
}

/// Tour length of every route in the population.
fn evaluate_population(population: &[Route], matrix: &DistanceMatrix) -> Vec<f64> {
    population
        .iter()
        .map(|route| tour_length(route, matrix))
        .collect()
}

/// Replaces `best` if the generation holds a better route under `policy`.
fn update_best(
    best: &mut BestSoFar,
    population: &[Route],
    lengths: &[f64],
    generation: usize,
    policy: BestUpdate,
) -> bool {
    let Some(i) = best_index(lengths) else {
        return false;
    };
    let improves = match policy {
        BestUpdate::StrictlyShorter => lengths[i] < best.distance,
        BestUpdate::ShorterOrEqual => lengths[i] <= best.distance,
    };
    if improves {
        best.route.clone_from(&population[i]);
        best.distance = lengths[i];
        best.generation = generation;
    }
    improves
}

/// Pairs every pool member with another at random and appends two children
/// per pair.
fn recombine<R: Rng>(pool: &mut Vec<Route>, weights: CrossoverWeights, rng: &mut R) -> Result<()> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    shuffle(&mut order, rng);

    let mut children = Vec::with_capacity(pool.len());
    for pair in order.chunks_exact(2) {
        let op = weights.choose(rng);
        let (c1, c2) = op.apply(&pool[pair[0]], &pool[pair[1]], rng)?;
        children.push(c1);
        children.push(c2);
    }
    pool.extend(children);
    Ok(())
}

/// Mutates each route with probability `percent`, skipping `protected`.
fn mutate_population<R: Rng>(
    population: &mut [Route],
    mutation: Mutation,
    percent: u8,
    protected: Option<usize>,
    rng: &mut R,
) -> Result<()> {
    for (i, route) in population.iter_mut().enumerate() {
        if Some(i) == protected {
            continue;
        }
        if percent_chance(percent, rng) {
            mutation.apply(route, rng)?;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TspError;
    use crate::ga::{MatingPool, Selection};
    use crate::instance::{Instance, Point};
    use crate::random::create_rng;
    use crate::route::is_permutation;

    fn random_matrix(n: usize, seed: u64) -> DistanceMatrix {
        let mut rng = create_rng(seed);
        Instance::random(n, &mut rng).unwrap().distance_matrix()
    }

    fn small_config() -> GaConfig {
        GaConfig::default()
            .with_population_size(40)
            .with_mating_pool(MatingPool::Size(20))
            .with_time_limit_ms(60_000)
            .with_max_generations(50)
            .with_seed(42)
    }

    #[test]
    fn test_recombine_doubles_pool() {
        let mut rng = create_rng(42);
        let mut pool: Vec<Route> = (0..6)
            .map(|_| crate::ga::init::random_route(8, &mut rng))
            .collect();
        recombine(&mut pool, CrossoverWeights::new(1, 1), &mut rng).unwrap();
        assert_eq!(pool.len(), 12);
        assert!(pool.iter().all(|r| is_permutation(r, 8)));
    }

    #[test]
    fn test_mutate_population_skips_protected() {
        let mut rng = create_rng(42);
        let original: Vec<Route> = (0..10).map(|_| (0..8).collect()).collect();
        let mut pop = original.clone();
        mutate_population(&mut pop, Mutation::Swap, 100, Some(3), &mut rng).unwrap();
        assert_eq!(pop[3], original[3]);
        assert!(pop.iter().all(|r| is_permutation(r, 8)));
    }

    #[test]
    fn test_mutate_population_zero_percent() {
        let mut rng = create_rng(42);
        let original: Vec<Route> = (0..10).map(|_| (0..8).collect()).collect();
        let mut pop = original.clone();
        mutate_population(&mut pop, Mutation::Inversion, 0, None, &mut rng).unwrap();
        assert_eq!(pop, original);
    }

    #[test]
    fn test_update_best_policies() {
        let pop = vec![vec![0, 1, 2], vec![2, 1, 0]];
        let mut best = BestSoFar {
            route: vec![1, 0, 2],
            distance: 5.0,
            generation: 0,
        };
        assert!(!update_best(&mut best, &pop, &[5.0, 6.0], 1, BestUpdate::StrictlyShorter));
        assert_eq!(best.route, vec![1, 0, 2]);

        assert!(update_best(&mut best, &pop, &[5.0, 6.0], 2, BestUpdate::ShorterOrEqual));
        assert_eq!(best.route, vec![0, 1, 2]);
        assert_eq!(best.generation, 2);

        assert!(update_best(&mut best, &pop, &[7.0, 4.0], 3, BestUpdate::StrictlyShorter));
        assert_eq!(best.route, vec![2, 1, 0]);
        assert_eq!(best.distance, 4.0);
    }

    #[test]
    fn test_run_returns_valid_route() {
        let matrix = random_matrix(25, 1);
        let result = GaRunner::run(&matrix, &small_config()).unwrap();
        assert!(is_permutation(&result.best_route, 25));
        assert!((tour_length(&result.best_route, &matrix) - result.best_distance).abs() < 1e-9);
        assert_eq!(result.generations, 50);
        assert_eq!(result.distance_history.len(), 51);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_elite_preservation() {
        let matrix = random_matrix(30, 2);
        let result = GaRunner::run(&matrix, &small_config()).unwrap();
        for window in result.distance_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "best distance should never increase: {} > {}",
                window[1],
                window[0]
            );
        }
        assert_eq!(result.distance_history.last(), Some(&result.best_distance));
    }

    #[test]
    fn test_improves_on_initial_population() {
        let matrix = random_matrix(30, 3);
        let config = small_config()
            .with_greedy_percent(0)
            .with_max_generations(300);
        let result = GaRunner::run(&matrix, &config).unwrap();
        assert!(
            result.best_distance < result.distance_history[0],
            "expected improvement over {}, got {}",
            result.distance_history[0],
            result.best_distance
        );
    }

    #[test]
    fn test_all_strategies() {
        let matrix = random_matrix(15, 4);
        for selection in [Selection::Rank, Selection::tournament()] {
            for mutation in [Mutation::Inversion, Mutation::Swap] {
                for weights in [
                    CrossoverWeights::default(),
                    CrossoverWeights::new(1, 0),
                    CrossoverWeights::new(1, 1),
                ] {
                    for elitism in [Elitism::KeepBest, Elitism::None] {
                        let config = small_config()
                            .with_selection(selection)
                            .with_mutation(mutation)
                            .with_crossover_weights(weights)
                            .with_elitism(elitism)
                            .with_max_generations(10);
                        let result = GaRunner::run(&matrix, &config).unwrap();
                        assert!(is_permutation(&result.best_route, 15));
                        assert_eq!(result.generations, 10);
                    }
                }
            }
        }
    }

    #[test]
    fn test_pool_smaller_than_half() {
        // 2M < P: the population shrinks to 2M after the first generation
        let matrix = random_matrix(12, 5);
        let config = small_config()
            .with_population_size(50)
            .with_mating_pool(MatingPool::Size(10))
            .with_max_generations(15);
        let result = GaRunner::run(&matrix, &config).unwrap();
        assert_eq!(result.generations, 15);
    }

    #[test]
    fn test_observer_sees_every_generation() {
        let matrix = random_matrix(12, 6);
        let config = small_config().with_max_generations(8);
        let mut seen = Vec::new();
        let result = GaRunner::run_with_observer(&matrix, &config, None, |s| {
            seen.push((s.generation, s.distance));
        })
        .unwrap();
        let generations: Vec<usize> = seen.iter().map(|&(g, _)| g).collect();
        assert_eq!(generations, (0..=8).collect::<Vec<_>>());
        assert_eq!(seen.last().unwrap().1, result.best_distance);
    }

    #[test]
    fn test_cancellation() {
        let matrix = random_matrix(40, 7);
        let config = GaConfig::default()
            .with_population_size(40)
            .with_mating_pool(MatingPool::Size(20))
            .with_time_limit_ms(600_000)
            .with_seed(42);

        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_clone = cancel.clone();
        std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            cancel_clone.store(true, Ordering::Relaxed);
        });

        let result = GaRunner::run_with_cancel(&matrix, &config, Some(cancel)).unwrap();
        assert!(result.cancelled, "expected cancelled result");
        assert!(result.elapsed < Duration::from_secs(60));
    }

    #[test]
    fn test_time_budget_stops_run() {
        let matrix = random_matrix(20, 8);
        let config = GaConfig::default()
            .with_population_size(40)
            .with_mating_pool(MatingPool::Size(20))
            .with_time_limit_ms(100)
            .with_seed(1);
        let result = GaRunner::run(&matrix, &config).unwrap();
        assert!(result.elapsed >= Duration::from_millis(100));
        assert!(result.generations >= 1);
    }

    #[test]
    fn test_invalid_inputs_fail_fast() {
        let two = DistanceMatrix::from_points(&[Point::new(0.0, 0.0), Point::new(1.0, 1.0)]);
        assert!(matches!(
            GaRunner::run(&two, &small_config()),
            Err(TspError::TooFewVertices(2))
        ));

        let matrix = random_matrix(10, 9);
        let odd = small_config().with_mating_pool(MatingPool::Size(7));
        assert!(matches!(
            GaRunner::run(&matrix, &odd),
            Err(TspError::OddMatingPool(7))
        ));
    }

    #[test]
    fn test_generation_exhausted_surfaces() {
        // 4 vertices allow only 24 distinct routes
        let matrix = random_matrix(4, 10);
        let config = small_config()
            .with_population_size(30)
            .with_mating_pool(MatingPool::Size(10));
        assert!(matches!(
            GaRunner::run(&matrix, &config),
            Err(TspError::GenerationExhausted { requested: 30, .. })
        ));
    }
}
