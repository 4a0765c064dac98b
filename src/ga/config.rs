//! GA configuration.
//!
//! [`GaConfig`] holds all parameters that control the evolutionary loop.

use super::operators::{CrossoverWeights, Mutation};
use super::selection::Selection;
use crate::error::{Result, TspError};

/// How the mating-pool size `M` is derived from the population size.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatingPool {
    /// `M = floor(population_size * fraction)`.
    Fraction(f64),
    /// A fixed `M`.
    Size(usize),
}

impl Default for MatingPool {
    fn default() -> Self {
        MatingPool::Fraction(0.5)
    }
}

/// Elitism policy applied during selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Elitism {
    /// The shortest route of the generation skips the selection draw, is
    /// appended to the mating pool as its last member, and is exempt from
    /// mutation.
    #[default]
    KeepBest,
    /// Every route competes in selection; nothing is protected.
    None,
}

/// When the best-so-far route is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BestUpdate {
    /// Replace only on a strictly shorter route.
    #[default]
    StrictlyShorter,
    /// Also replace on an equally short route, keeping the most recent one.
    ShorterOrEqual,
}

/// Configuration for the TSP genetic algorithm.
///
/// # Defaults
///
/// ```
/// use tsp_evolve::ga::{GaConfig, Selection, Mutation};
///
/// let config = GaConfig::default();
/// assert_eq!(config.population_size, 200);
/// assert_eq!(config.mating_pool_size(), 100);
/// assert_eq!(config.mutation_percent, 7);
/// assert_eq!(config.time_limit_ms, 5_000);
/// assert_eq!(config.selection, Selection::Rank);
/// assert_eq!(config.mutation, Mutation::Inversion);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use tsp_evolve::ga::{GaConfig, MatingPool, Selection, Mutation, CrossoverWeights};
///
/// let config = GaConfig::default()
///     .with_population_size(120)
///     .with_mating_pool(MatingPool::Size(40))
///     .with_selection(Selection::tournament())
///     .with_mutation(Mutation::Swap)
///     .with_crossover_weights(CrossoverWeights::new(1, 1))
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GaConfig {
    /// Number of routes in the initial population.
    pub population_size: usize,

    /// Size of the mating pool, elite included. Must be even and smaller
    /// than the population.
    pub mating_pool: MatingPool,

    /// Parent selection strategy.
    pub selection: Selection,

    /// Relative odds of PMX versus OX for each parent pair.
    pub crossover_weights: CrossoverWeights,

    /// Mutation strategy.
    pub mutation: Mutation,

    /// Per-route mutation probability in percent (0–100).
    pub mutation_percent: u8,

    /// Elitism policy.
    pub elitism: Elitism,

    /// Tie policy for the best-so-far route.
    pub best_update: BestUpdate,

    /// Share of initial routes built by nearest neighbour, in percent.
    /// The remainder are uniformly random permutations.
    pub greedy_percent: u8,

    /// The initializer gives up after `population_size * init_attempts_per_route`
    /// candidate routes.
    pub init_attempts_per_route: usize,

    /// Wall-clock budget in milliseconds. Checked once per generation.
    pub time_limit_ms: u64,

    /// Optional cap on the number of generations.
    pub max_generations: Option<usize>,

    /// Random seed for reproducibility. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 200,
            mating_pool: MatingPool::default(),
            selection: Selection::default(),
            crossover_weights: CrossoverWeights::default(),
            mutation: Mutation::default(),
            mutation_percent: 7,
            elitism: Elitism::default(),
            best_update: BestUpdate::default(),
            greedy_percent: 15,
            init_attempts_per_route: 100,
            time_limit_ms: 5_000,
            max_generations: None,
            seed: None,
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the mating-pool sizing rule.
    pub fn with_mating_pool(mut self, pool: MatingPool) -> Self {
        self.mating_pool = pool;
        self
    }

    /// Sets the selection strategy.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Sets the crossover operator weighting.
    pub fn with_crossover_weights(mut self, weights: CrossoverWeights) -> Self {
        self.crossover_weights = weights;
        self
    }

    /// Sets the mutation strategy.
    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = mutation;
        self
    }

    /// Sets the mutation probability in percent.
    pub fn with_mutation_percent(mut self, percent: u8) -> Self {
        self.mutation_percent = percent;
        self
    }

    /// Sets the elitism policy.
    pub fn with_elitism(mut self, elitism: Elitism) -> Self {
        self.elitism = elitism;
        self
    }

    /// Sets the best-so-far tie policy.
    pub fn with_best_update(mut self, policy: BestUpdate) -> Self {
        self.best_update = policy;
        self
    }

    /// Sets the share of nearest-neighbour routes in the initial population.
    pub fn with_greedy_percent(mut self, percent: u8) -> Self {
        self.greedy_percent = percent;
        self
    }

    /// Sets the initializer attempt multiplier.
    pub fn with_init_attempts_per_route(mut self, attempts: usize) -> Self {
        self.init_attempts_per_route = attempts;
        self
    }

    /// Sets the wall-clock budget in milliseconds.
    pub fn with_time_limit_ms(mut self, ms: u64) -> Self {
        self.time_limit_ms = ms;
        self
    }

    /// Caps the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = Some(n);
        self
    }

    /// Sets the random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Resolved mating-pool size `M`.
    pub fn mating_pool_size(&self) -> usize {
        match self.mating_pool {
            MatingPool::Fraction(f) => (self.population_size as f64 * f) as usize,
            MatingPool::Size(m) => m,
        }
    }

    /// Total number of initializer attempts before giving up.
    pub fn init_attempt_cap(&self) -> usize {
        self.population_size
            .saturating_mul(self.init_attempts_per_route)
    }

    /// Validates the configuration independent of any instance.
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(TspError::PopulationTooSmall(self.population_size));
        }
        if let MatingPool::Fraction(f) = self.mating_pool {
            if !(f.is_finite() && f > 0.0 && f < 1.0) {
                return Err(TspError::InvalidConfig(format!(
                    "mating pool fraction must be in (0, 1), got {f}"
                )));
            }
        }
        let pool = self.mating_pool_size();
        if pool >= self.population_size {
            return Err(TspError::MatingPoolTooLarge {
                pool,
                population: self.population_size,
            });
        }
        if pool < 2 {
            return Err(TspError::MatingPoolTooSmall(pool));
        }
        if pool % 2 != 0 {
            return Err(TspError::OddMatingPool(pool));
        }
        if self.mutation_percent > 100 {
            return Err(TspError::InvalidMutationPercent(self.mutation_percent));
        }
        if self.greedy_percent > 100 {
            return Err(TspError::InvalidGreedyPercent(self.greedy_percent));
        }
        self.crossover_weights.validate()?;
        self.selection.validate()?;
        if self.init_attempts_per_route == 0 {
            return Err(TspError::InvalidConfig(
                "init_attempts_per_route must be at least 1".into(),
            ));
        }
        if self.time_limit_ms == 0 {
            return Err(TspError::ZeroTimeLimit);
        }
        if self.max_generations == Some(0) {
            return Err(TspError::InvalidConfig(
                "max_generations must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }

    /// Validates the configuration against an instance of `vertices` vertices.
    pub fn validate_for(&self, vertices: usize) -> Result<()> {
        self.validate()?;
        if vertices < 3 {
            return Err(TspError::TooFewVertices(vertices));
        }
        Ok(())
    }
}
