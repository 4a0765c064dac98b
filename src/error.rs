//! Error type shared by the whole crate.
//!
//! Configuration problems are reported before the evolutionary loop starts.
//! The only runtime failure is [`TspError::GenerationExhausted`], raised when
//! the initializer cannot find enough distinct routes.

use thiserror::Error;

/// Errors produced while loading instances, validating configuration, or
/// running the genetic algorithm.
#[derive(Debug, Error)]
pub enum TspError {
    #[error("population_size must be at least 2, got {0}")]
    PopulationTooSmall(usize),

    #[error("mating pool of {pool} must be smaller than the population of {population}")]
    MatingPoolTooLarge { pool: usize, population: usize },

    #[error("mating pool must hold at least 2 routes, got {0}")]
    MatingPoolTooSmall(usize),

    #[error("mating pool size {0} is odd; crossover pairs every parent")]
    OddMatingPool(usize),

    #[error("at least 3 vertices are required for a cycle, got {0}")]
    TooFewVertices(usize),

    #[error("mutation_percent must be in 0..=100, got {0}")]
    InvalidMutationPercent(u8),

    #[error("greedy_percent must be in 0..=100, got {0}")]
    InvalidGreedyPercent(u8),

    #[error("crossover weights must not both be zero")]
    ZeroCrossoverWeights,

    #[error("tournament size bounds {min}..={max} are invalid")]
    InvalidTournament { min: usize, max: usize },

    #[error("time_limit_ms must be positive")]
    ZeroTimeLimit,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "could only build {collected} of {requested} distinct routes after {attempts} attempts"
    )]
    GenerationExhausted {
        requested: usize,
        collected: usize,
        attempts: usize,
    },

    #[error("cut points {start}..{end} are invalid for routes of length {len}")]
    InvalidCutPoints { start: usize, end: usize, len: usize },

    #[error("invalid route: {0}")]
    InvalidRoute(String),

    #[error("invalid distance matrix: {0}")]
    InvalidMatrix(String),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TspError>;

impl TspError {
    pub(crate) fn invalid_route(message: impl Into<String>) -> Self {
        Self::InvalidRoute(message.into())
    }

    pub(crate) fn invalid_matrix(message: impl Into<String>) -> Self {
        Self::InvalidMatrix(message.into())
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}
