//! Parent selection.
//!
//! Selection builds the mating pool: `M` distinct routes drawn without
//! replacement from the population. Under [`Elitism::KeepBest`] the
//! shortest route is set aside before the draw and appended as the last
//! member of the pool, so only `M - 1` routes compete.
//!
//! Two strategies are available:
//!
//! - [`Selection::Rank`]: rank-based roulette wheel over a [`RankTable`].
//!   Probability depends only on the rank, never on raw distance.
//! - [`Selection::Tournament`]: best not-yet-chosen member of a random-size
//!   subset.
//!
//! # References
//!
//! - Baker (1985), "Adaptive Selection Methods for Genetic Algorithms"
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"

use super::config::Elitism;
use crate::error::{Result, TspError};
use crate::route::Route;
use rand::seq::index;
use rand::Rng;
use std::ops::Range;

/// Selection strategy for building the mating pool.
///
/// All strategies assume **minimization** (shorter route = better).
///
/// # Examples
///
/// ```
/// use tsp_evolve::ga::Selection;
///
/// let sel = Selection::Rank;
/// let sel = Selection::tournament(); // sizes 2..=6
/// let sel = Selection::Tournament { min_size: 3, max_size: 3 };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Selection {
    /// Rank-based roulette wheel.
    ///
    /// Rank 0 (shortest) owns the widest interval of the wheel, widths fall
    /// linearly to zero at the last rank.
    ///
    /// # Complexity
    /// O(n log n) per generation (sort), O(log n) per draw
    #[default]
    Rank,

    /// Tournament selection with a size drawn uniformly from
    /// `min_size..=max_size` for every tournament.
    ///
    /// # Complexity
    /// O(k log k) per tournament
    Tournament { min_size: usize, max_size: usize },
}

impl Selection {
    /// Tournament with sizes `2..=6`.
    pub fn tournament() -> Self {
        Selection::Tournament {
            min_size: 2,
            max_size: 6,
        }
    }

    /// Checks tournament bounds.
    pub fn validate(&self) -> Result<()> {
        if let Selection::Tournament { min_size, max_size } = *self {
            if min_size == 0 || min_size > max_size {
                return Err(TspError::InvalidTournament {
                    min: min_size,
                    max: max_size,
                });
            }
        }
        Ok(())
    }
}

/// Contiguous rank intervals covering `[0, max_rank)`.
///
/// For a table of size `n`, rank `r` gets width `(2 - 2r/(n-1)) * 2`, so
/// rank 0 has width 4 and rank `n - 1` has width 0. Interval `r` is
/// `[start(r), start(r) + width(r))` and each interval starts where the
/// previous one ends.
#[derive(Debug, Clone, PartialEq)]
pub struct RankTable {
    starts: Vec<f64>,
    ends: Vec<f64>,
    max_rank: f64,
}

impl RankTable {
    /// Builds the table for `size` ranks.
    ///
    /// A single-rank table is one interval of width 4.
    pub fn new(size: usize) -> Self {
        let mut starts = Vec::with_capacity(size);
        let mut ends = Vec::with_capacity(size);
        let mut acc = 0.0;
        for r in 0..size {
            let width = if size > 1 {
                (2.0 - 2.0 * r as f64 / (size - 1) as f64) * 2.0
            } else {
                4.0
            };
            starts.push(acc);
            acc += width;
            ends.push(acc);
        }
        Self {
            starts,
            ends,
            max_rank: acc,
        }
    }

    /// Number of ranks.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Total width of all intervals.
    pub fn max_rank(&self) -> f64 {
        self.max_rank
    }

    /// Interval owned by rank `r`.
    pub fn interval(&self, r: usize) -> Range<f64> {
        self.starts[r]..self.ends[r]
    }

    /// Width of rank `r`'s interval.
    pub fn width(&self, r: usize) -> f64 {
        self.ends[r] - self.starts[r]
    }

    /// Rank whose interval contains `x`, or `None` outside `[0, max_rank)`.
    pub fn rank_of(&self, x: f64) -> Option<usize> {
        if !(0.0..self.max_rank).contains(&x) {
            return None;
        }
        let r = self.ends.partition_point(|&end| end <= x);
        (r < self.len()).then_some(r)
    }

    /// Number of ranks with a non-empty interval.
    pub fn selectable(&self) -> usize {
        (0..self.len()).filter(|&r| self.width(r) > 0.0).count()
    }

    /// Draws a rank.
    fn draw<R: Rng>(&self, rng: &mut R) -> Option<usize> {
        self.rank_of(rng.random_range(0.0..self.max_rank))
    }
}

/// Index of the shortest route (first one on ties).
pub fn best_index(lengths: &[f64]) -> Option<usize> {
    lengths
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

/// Builds a mating pool of `pool_size` routes.
///
/// `lengths[i]` is the tour length of `population[i]`. Rank selection uses
/// `rank_table`, which must have one rank per population member.
///
/// The returned pool holds distinct population members. Under
/// [`Elitism::KeepBest`] the shortest route is the last element.
///
/// # Errors
/// Returns [`TspError::InvalidConfig`] if the population cannot supply
/// `pool_size` distinct parents.
pub fn build_mating_pool<R: Rng>(
    selection: Selection,
    population: &[Route],
    lengths: &[f64],
    pool_size: usize,
    elitism: Elitism,
    rank_table: &RankTable,
    rng: &mut R,
) -> Result<Vec<Route>> {
    if population.len() != lengths.len() {
        return Err(TspError::InvalidConfig(format!(
            "{} routes but {} lengths",
            population.len(),
            lengths.len()
        )));
    }

    let elite = match elitism {
        Elitism::KeepBest => best_index(lengths),
        Elitism::None => None,
    };
    let competitors: Vec<usize> = (0..population.len())
        .filter(|&i| Some(i) != elite)
        .collect();
    let wanted = pool_size.saturating_sub(usize::from(elite.is_some()));

    let winners = match selection {
        Selection::Rank => {
            if rank_table.len() != population.len() {
                return Err(TspError::InvalidConfig(format!(
                    "rank table has {} ranks for a population of {}",
                    rank_table.len(),
                    population.len()
                )));
            }
            rank_select(&competitors, lengths, wanted, rank_table, rng)?
        }
        Selection::Tournament { min_size, max_size } => {
            tournament_select(&competitors, lengths, wanted, min_size, max_size, rng)?
        }
    };

    let mut pool: Vec<Route> = winners.iter().map(|&i| population[i].clone()).collect();
    if let Some(e) = elite {
        pool.push(population[e].clone());
    }
    Ok(pool)
}

/// Rank-based roulette wheel without replacement.
fn rank_select<R: Rng>(
    competitors: &[usize],
    lengths: &[f64],
    wanted: usize,
    table: &RankTable,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let mut sorted = competitors.to_vec();
    sorted.sort_by(|&a, &b| lengths[a].total_cmp(&lengths[b]));

    // Ranks past the sorted list or with zero width can never be drawn.
    let reachable = (0..sorted.len().min(table.len()))
        .filter(|&r| table.width(r) > 0.0)
        .count();
    if wanted > reachable {
        return Err(TspError::InvalidConfig(format!(
            "cannot draw {wanted} distinct parents from {reachable} selectable ranks"
        )));
    }

    let mut chosen = vec![false; sorted.len()];
    let mut winners = Vec::with_capacity(wanted);
    while winners.len() < wanted {
        let Some(r) = table.draw(rng) else { continue };
        if r < sorted.len() && !chosen[r] {
            chosen[r] = true;
            winners.push(sorted[r]);
        }
    }
    Ok(winners)
}

/// Tournament selection without replacement.
fn tournament_select<R: Rng>(
    competitors: &[usize],
    lengths: &[f64],
    wanted: usize,
    min_size: usize,
    max_size: usize,
    rng: &mut R,
) -> Result<Vec<usize>> {
    let n = competitors.len();
    if wanted > n {
        return Err(TspError::InvalidConfig(format!(
            "cannot draw {wanted} distinct parents from {n} routes"
        )));
    }
    if min_size == 0 || min_size > max_size {
        return Err(TspError::InvalidTournament {
            min: min_size,
            max: max_size,
        });
    }

    let mut chosen = vec![false; n];
    let mut winners = Vec::with_capacity(wanted);
    while winners.len() < wanted {
        let size = rng.random_range(min_size..=max_size).min(n);
        let mut entrants = index::sample(rng, n, size).into_vec();
        entrants.sort_by(|&a, &b| lengths[competitors[a]].total_cmp(&lengths[competitors[b]]));
        if let Some(&w) = entrants.iter().find(|&&e| !chosen[e]) {
            chosen[w] = true;
            winners.push(competitors[w]);
        }
    }
    Ok(winners)
}
