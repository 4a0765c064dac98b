//! Initial population.
//!
//! Each candidate is either a uniformly random permutation or a greedy
//! nearest-neighbour tour from a random start vertex. Exact duplicates are
//! rejected, and the initializer gives up with
//! [`TspError::GenerationExhausted`] once its attempt budget is spent.

use super::config::GaConfig;
use crate::error::{Result, TspError};
use crate::matrix::DistanceMatrix;
use crate::random::{percent_chance, shuffle};
use crate::route::Route;
use rand::Rng;
use std::collections::HashSet;

/// Builds the first generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopulationInitializer {
    /// Number of distinct routes to produce.
    pub size: usize,
    /// Share of candidates built greedily, in percent.
    pub greedy_percent: u8,
    /// Maximum number of candidates generated before giving up.
    pub max_attempts: usize,
}

impl PopulationInitializer {
    pub fn new(size: usize, greedy_percent: u8, max_attempts: usize) -> Self {
        Self {
            size,
            greedy_percent,
            max_attempts,
        }
    }

    /// Initializer matching `config`.
    pub fn from_config(config: &GaConfig) -> Self {
        Self::new(
            config.population_size,
            config.greedy_percent,
            config.init_attempt_cap(),
        )
    }

    /// Produces `self.size` distinct routes over the vertices of `matrix`.
    ///
    /// # Errors
    /// Returns [`TspError::GenerationExhausted`] when `max_attempts`
    /// candidates did not yield enough distinct routes.
    pub fn build<R: Rng>(&self, matrix: &DistanceMatrix, rng: &mut R) -> Result<Vec<Route>> {
        let n = matrix.len();
        let mut seen: HashSet<Route> = HashSet::with_capacity(self.size);
        let mut population = Vec::with_capacity(self.size);
        let mut attempts = 0usize;

        while population.len() < self.size {
            if attempts >= self.max_attempts {
                return Err(TspError::GenerationExhausted {
                    requested: self.size,
                    collected: population.len(),
                    attempts,
                });
            }
            attempts += 1;

            let route = if n == 0 || percent_chance(100 - self.greedy_percent.min(100), rng) {
                random_route(n, rng)
            } else {
                nearest_neighbor(matrix, rng.random_range(0..n))
            };
            if seen.insert(route.clone()) {
                population.push(route);
            }
        }

        if attempts > self.max_attempts / 2 {
            log::warn!(
                "initializer used {attempts} of {} attempts for {} routes",
                self.max_attempts,
                self.size
            );
        }
        Ok(population)
    }
}

/// Uniformly random permutation of `0..n`.
pub fn random_route<R: Rng>(n: usize, rng: &mut R) -> Route {
    let mut route: Route = (0..n).collect();
    shuffle(&mut route, rng);
    route
}

/// Greedy nearest-neighbour tour starting at `start`.
///
/// From the current vertex, moves to the closest unvisited vertex. Ties go
/// to the vertex with the highest index, since an equal distance found
/// later in the scan replaces the earlier candidate.
///
/// # Panics
/// Panics if `start` is out of range.
pub fn nearest_neighbor(matrix: &DistanceMatrix, start: usize) -> Route {
    let n = matrix.len();
    let mut visited = vec![false; n];
    let mut route = Vec::with_capacity(n);
    route.push(start);
    visited[start] = true;

    let mut current = start;
    while route.len() < n {
        let mut next: Option<(usize, f64)> = None;
        for (j, &d) in matrix.row(current).iter().enumerate() {
            if visited[j] {
                continue;
            }
            match next {
                Some((_, best)) if d > best => {}
                _ => next = Some((j, d)),
            }
        }
        let Some((j, _)) = next else { break };
        visited[j] = true;
        route.push(j);
        current = j;
    }
    route
}
