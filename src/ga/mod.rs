//! Genetic Algorithm for the Traveling Salesman Problem.
//!
//! One evolutionary loop with injectable strategies. Routes are permutations
//! of vertex indices; fitness is the cyclic tour length (lower is better).
//!
//! # Key Types
//!
//! - [`GaConfig`]: Algorithm parameters (population, mating pool, strategies, budget)
//! - [`GaRunner`]: Executes the evolutionary loop
//! - [`GaResult`]: Final best route with run statistics
//! - [`Snapshot`] / [`SnapshotCell`]: Per-generation best-route publication
//!
//! # Strategies
//!
//! - [`Selection`]: rank-based roulette wheel or tournament
//! - [`CrossoverWeights`]: weighted choice between PMX and OX
//! - [`Mutation`]: inversion or swap
//! - [`Elitism`], [`BestUpdate`]: elitism and best-so-far tie policies
//!
//! # Submodules
//!
//! - [`operators`]: Permutation crossover (OX, PMX) and mutation operators
//! - [`init`]: Random and nearest-neighbour initial population
//!
//! # References
//!
//! - Holland (1975), *Adaptation in Natural and Artificial Systems*
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Larrañaga et al. (1999), "Genetic Algorithms for the Travelling Salesman Problem:
//!   A Review of Representations and Operators"

mod config;
pub mod init;
pub mod operators;
mod runner;
mod selection;
mod snapshot;

pub use config::{BestUpdate, Elitism, GaConfig, MatingPool};
pub use init::PopulationInitializer;
pub use operators::{Crossover, CrossoverWeights, Mutation};
pub use runner::{GaResult, GaRunner};
pub use selection::{best_index, build_mating_pool, RankTable, Selection};
pub use snapshot::{Snapshot, SnapshotCell};
