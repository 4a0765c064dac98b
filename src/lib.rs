//! Time-bounded genetic algorithm for the Euclidean Traveling Salesman Problem.
//!
//! Given a fixed [`DistanceMatrix`], the engine evolves a population of
//! routes until a wall-clock deadline and returns the shortest route found:
//!
//! - **Initialization**: random permutations mixed with greedy
//!   nearest-neighbour tours, all distinct.
//! - **Selection**: elitist rank-based roulette wheel, or tournament.
//! - **Recombination**: PMX and OX with a configurable weighting.
//! - **Mutation**: segment inversion or swap.
//!
//! All randomness flows through one seedable generator, so a run with a
//! fixed seed and generation cap is reproducible.
//!
//! # Example
//!
//! ```
//! use tsp_evolve::ga::{GaConfig, GaRunner, MatingPool};
//! use tsp_evolve::Instance;
//!
//! let instance = Instance::parse("5\n1 0 0\n2 4 0\n3 4 3\n4 2 5\n5 0 3\n").unwrap();
//! let matrix = instance.distance_matrix();
//! let config = GaConfig::default()
//!     .with_population_size(40)
//!     .with_mating_pool(MatingPool::Size(20))
//!     .with_max_generations(30)
//!     .with_seed(7);
//!
//! let result = GaRunner::run(&matrix, &config).unwrap();
//! assert_eq!(result.best_route.len(), 5);
//! ```
//!
//! # Layout
//!
//! Instance loading ([`instance`]) and matrix construction ([`matrix`]) are
//! thin adapters around the core in [`ga`].

pub mod error;
pub mod ga;
pub mod instance;
pub mod matrix;
pub mod random;
pub mod route;

pub use error::{Result, TspError};
pub use instance::{Instance, Point};
pub use matrix::DistanceMatrix;
pub use route::{checked_tour_length, format_route, tour_length, Route};
