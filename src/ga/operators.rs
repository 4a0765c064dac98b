//! Permutation-preserving genetic operators for routes.
//!
//! Crossover produces two children per parent pair and mutation rewrites a
//! route in place. None of them introduce or drop a vertex.
//!
//! Every public operator checks its input at the boundary: a parent with a
//! repeated vertex, or two parents over different vertex sets, is rejected
//! with [`TspError::InvalidRoute`] instead of being recombined.
//!
//! # Crossover Operators
//!
//! - [`pmx_crossover`] (PMX): Goldberg & Lingle (1985), preserves absolute position
//! - [`order_crossover`] (OX): Davis (1985), preserves relative order
//!
//! Both use a cut pair `start < end <= n`; the segment `[start, end)` of each
//! child is copied from the *opposite* parent.
//!
//! # Mutation Operators
//!
//! - [`invert_mutation`]: Reverse an interior segment (2-opt move), O(n)
//! - [`swap_mutation`]: Exchange two positions, O(1)
//!
//! # References
//!
//! - Davis (1985), "Applying Adaptive Algorithms to Epistatic Domains"
//! - Goldberg & Lingle (1985), "Alleles, Loci, and the Traveling Salesman Problem"

use crate::error::{Result, TspError};
use crate::route::Route;
use rand::Rng;
use std::collections::{HashMap, HashSet};

// ============================================================================
// Strategy types
// ============================================================================

/// A crossover operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Crossover {
    /// Partially mapped crossover.
    Pmx,
    /// Order crossover.
    Ox,
}

impl Crossover {
    /// Recombines two parents with random cut points.
    pub fn apply<R: Rng>(
        self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> Result<(Route, Route)> {
        match self {
            Crossover::Pmx => pmx_crossover(parent1, parent2, rng),
            Crossover::Ox => order_crossover(parent1, parent2, rng),
        }
    }
}

/// Relative odds of choosing PMX or OX for a parent pair.
///
/// The default `{ pmx: 0, ox: 10 }` always picks OX, which is what the
/// classic 1-to-10 coin flip with a `<= 10` threshold amounts to. Give PMX
/// a non-zero weight to mix the operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossoverWeights {
    pub pmx: u32,
    pub ox: u32,
}

impl Default for CrossoverWeights {
    fn default() -> Self {
        Self { pmx: 0, ox: 10 }
    }
}

impl CrossoverWeights {
    pub fn new(pmx: u32, ox: u32) -> Self {
        Self { pmx, ox }
    }

    /// Fails if both weights are zero.
    pub fn validate(&self) -> Result<()> {
        if self.pmx == 0 && self.ox == 0 {
            return Err(TspError::ZeroCrossoverWeights);
        }
        Ok(())
    }

    /// Draws an operator with probability proportional to its weight.
    ///
    /// # Panics
    /// Panics if both weights are zero; call [`validate`](Self::validate) first.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Crossover {
        let total = u64::from(self.pmx) + u64::from(self.ox);
        assert!(total > 0, "crossover weights must not both be zero");
        if rng.random_range(0..total) < u64::from(self.pmx) {
            Crossover::Pmx
        } else {
            Crossover::Ox
        }
    }
}

/// Mutation strategy. Exactly one is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mutation {
    /// Reverse a random interior segment.
    #[default]
    Inversion,
    /// Exchange two random positions.
    Swap,
}

impl Mutation {
    /// Applies the mutation to `route` unconditionally.
    pub fn apply<R: Rng>(self, route: &mut [usize], rng: &mut R) -> Result<()> {
        match self {
            Mutation::Inversion => invert_mutation(route, rng),
            Mutation::Swap => swap_mutation(route, rng),
        }
    }
}

// ============================================================================
// Crossover operators
// ============================================================================

/// Partially Mapped Crossover (PMX) with random cut points.
///
/// # Errors
/// Returns [`TspError::InvalidRoute`] if the parents are not permutations of
/// the same vertex set.
pub fn pmx_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Result<(Route, Route)> {
    let (pos1, pos2) = index_parents(parent1, parent2)?;
    let (start, end) = random_cuts(parent1.len(), rng);

    let child1 = pmx_child(parent1, parent2, &pos2, start, end);
    let child2 = pmx_child(parent2, parent1, &pos1, start, end);
    Ok((child1, child2))
}

/// PMX with explicit cut points `start < end <= n`.
///
/// Child 1 takes `parent2[start..end]` and keeps `parent1` elsewhere; child 2
/// is the mirror image. A value outside the segment that already occurs
/// inside it is replaced by following the segment mapping until a free
/// value is reached.
pub fn pmx_with_cuts(
    parent1: &[usize],
    parent2: &[usize],
    start: usize,
    end: usize,
) -> Result<(Route, Route)> {
    let (pos1, pos2) = index_parents(parent1, parent2)?;
    check_cuts(parent1.len(), start, end)?;

    let child1 = pmx_child(parent1, parent2, &pos2, start, end);
    let child2 = pmx_child(parent2, parent1, &pos1, start, end);
    Ok((child1, child2))
}

/// Build one PMX child: segment from `inner`, the rest mapped from `outer`.
fn pmx_child(
    outer: &[usize],
    inner: &[usize],
    inner_pos: &HashMap<usize, usize>,
    start: usize,
    end: usize,
) -> Route {
    let mut child = outer.to_vec();
    child[start..end].copy_from_slice(&inner[start..end]);

    let segment = start..end;
    for x in (0..start).chain(end..outer.len()) {
        let mut value = outer[x];
        // Follow value -> its slot in inner's segment -> outer's value there
        while let Some(&slot) = inner_pos.get(&value) {
            if !segment.contains(&slot) {
                break;
            }
            value = outer[slot];
        }
        child[x] = value;
    }
    child
}

/// Order Crossover (OX) with random cut points.
///
/// # Errors
/// Returns [`TspError::InvalidRoute`] if the parents are not permutations of
/// the same vertex set.
pub fn order_crossover<R: Rng>(
    parent1: &[usize],
    parent2: &[usize],
    rng: &mut R,
) -> Result<(Route, Route)> {
    index_parents(parent1, parent2)?;
    let (start, end) = random_cuts(parent1.len(), rng);

    let child1 = ox_child(parent1, parent2, start, end);
    let child2 = ox_child(parent2, parent1, start, end);
    Ok((child1, child2))
}

/// OX with explicit cut points `start < end <= n`.
///
/// Child 1 takes `parent2[start..end]`; the remaining positions, starting at
/// `end` and wrapping, are filled with `parent1`'s vertices in `parent1`'s
/// own order (also read from `end`, wrapping), skipping those already in the
/// segment. Child 2 is the mirror image.
pub fn ox_with_cuts(
    parent1: &[usize],
    parent2: &[usize],
    start: usize,
    end: usize,
) -> Result<(Route, Route)> {
    index_parents(parent1, parent2)?;
    check_cuts(parent1.len(), start, end)?;

    let child1 = ox_child(parent1, parent2, start, end);
    let child2 = ox_child(parent2, parent1, start, end);
    Ok((child1, child2))
}

/// Build one OX child: segment from `inner`, fill from `donor` in order.
fn ox_child(donor: &[usize], inner: &[usize], start: usize, end: usize) -> Route {
    let n = donor.len();
    let mut child = donor.to_vec();
    child[start..end].copy_from_slice(&inner[start..end]);
    let in_segment: HashSet<usize> = inner[start..end].iter().copied().collect();

    let mut pos = end;
    for offset in 0..n {
        let value = donor[(end + offset) % n];
        if !in_segment.contains(&value) {
            child[pos % n] = value;
            pos += 1;
        }
    }
    child
}

// ============================================================================
// Mutation operators
// ============================================================================

/// Inversion mutation: reverse `route[a..b]` for random `1 <= a < b <= n - 1`.
///
/// The first and last positions are never moved.
///
/// # Errors
/// Returns [`TspError::InvalidRoute`] if `route` repeats a vertex or has
/// fewer than 3 vertices.
pub fn invert_mutation<R: Rng>(route: &mut [usize], rng: &mut R) -> Result<()> {
    let n = route.len();
    if n < 3 {
        return Err(TspError::invalid_route(format!(
            "inversion needs at least 3 vertices, got {n}"
        )));
    }
    let a = rng.random_range(1..=n - 2);
    let b = rng.random_range(a + 1..=n - 1);
    invert_segment(route, a, b)
}

/// Reverses `route[a..b]` in place. Requires `1 <= a < b <= n - 1`.
///
/// `b` is an exclusive end, so `b = n - 1` is allowed: the last position
/// reversed is then `n - 2` and the final vertex stays put. The interior
/// bound `b <= n - 2` quoted for inclusive ends is the same constraint.
///
/// ```
/// use tsp_evolve::ga::operators::invert_segment;
///
/// let mut route = vec![0, 1, 2, 3, 4];
/// invert_segment(&mut route, 1, 3).unwrap();
/// assert_eq!(route, vec![0, 2, 1, 3, 4]);
/// ```
pub fn invert_segment(route: &mut [usize], a: usize, b: usize) -> Result<()> {
    check_distinct(route)?;
    let n = route.len();
    if a < 1 || a >= b || b > n.saturating_sub(1) {
        return Err(TspError::InvalidCutPoints {
            start: a,
            end: b,
            len: n,
        });
    }
    route[a..b].reverse();
    Ok(())
}

/// Swap mutation: exchange positions `a <= b`, with `a` in `0..=n-2` and
/// `b` in `a..=n-1`.
///
/// # Errors
/// Returns [`TspError::InvalidRoute`] if `route` repeats a vertex or has
/// fewer than 2 vertices.
pub fn swap_mutation<R: Rng>(route: &mut [usize], rng: &mut R) -> Result<()> {
    check_distinct(route)?;
    let n = route.len();
    if n < 2 {
        return Err(TspError::invalid_route(format!(
            "swap needs at least 2 vertices, got {n}"
        )));
    }
    let a = rng.random_range(0..=n - 2);
    let b = rng.random_range(a..=n - 1);
    route.swap(a, b);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

/// Pick cut points `start < end <= n` uniformly.
///
/// # Panics
/// Panics if `n == 0`.
pub fn random_cuts<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
    let start = rng.random_range(0..n);
    let end = rng.random_range(start + 1..=n);
    (start, end)
}

fn check_cuts(n: usize, start: usize, end: usize) -> Result<()> {
    if start >= end || end > n {
        return Err(TspError::InvalidCutPoints {
            start,
            end,
            len: n,
        });
    }
    Ok(())
}

fn check_distinct(route: &[usize]) -> Result<()> {
    let mut seen = HashSet::with_capacity(route.len());
    for (pos, &v) in route.iter().enumerate() {
        if !seen.insert(v) {
            return Err(TspError::invalid_route(format!(
                "vertex {v} repeated at position {pos}"
            )));
        }
    }
    Ok(())
}

/// Validates a parent pair and returns value -> position maps for both.
fn index_parents(
    parent1: &[usize],
    parent2: &[usize],
) -> Result<(HashMap<usize, usize>, HashMap<usize, usize>)> {
    if parent1.len() != parent2.len() {
        return Err(TspError::invalid_route(format!(
            "parents differ in length: {} vs {}",
            parent1.len(),
            parent2.len()
        )));
    }
    if parent1.is_empty() {
        return Err(TspError::invalid_route("parents must not be empty"));
    }

    let pos1 = position_map(parent1)?;
    let pos2 = position_map(parent2)?;
    if let Some(v) = parent2.iter().find(|v| !pos1.contains_key(v)) {
        return Err(TspError::invalid_route(format!(
            "vertex {v} appears in only one parent"
        )));
    }
    Ok((pos1, pos2))
}

fn position_map(route: &[usize]) -> Result<HashMap<usize, usize>> {
    let mut map = HashMap::with_capacity(route.len());
    for (pos, &v) in route.iter().enumerate() {
        if map.insert(v, pos).is_some() {
            return Err(TspError::invalid_route(format!(
                "vertex {v} repeated at position {pos}"
            )));
        }
    }
    Ok(map)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::route::is_permutation;

    fn same_set(a: &[usize], b: &[usize]) -> bool {
        let mut a = a.to_vec();
        let mut b = b.to_vec();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }

    // ---- OX Crossover ----

    #[test]
    fn test_ox_known_cuts() {
        let p1 = vec![1, 2, 3, 4, 5];
        let p2 = vec![5, 4, 3, 2, 1];
        let (c1, c2) = ox_with_cuts(&p1, &p2, 1, 3).unwrap();

        assert_eq!(&c1[1..3], &p2[1..3]);
        assert_eq!(&c2[1..3], &p1[1..3]);
        assert!(same_set(&c1, &p1), "c1 = {c1:?}");
        assert!(same_set(&c2, &p1), "c2 = {c2:?}");
        assert_eq!(c1, vec![2, 4, 3, 5, 1]);
        assert_eq!(c2, vec![4, 2, 3, 1, 5]);
    }

    #[test]
    fn test_ox_produces_valid_permutations() {
        let mut rng = create_rng(42);
        let p1 = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = vec![7, 6, 5, 4, 3, 2, 1, 0];

        for _ in 0..100 {
            let (c1, c2) = order_crossover(&p1, &p2, &mut rng).unwrap();
            assert!(is_permutation(&c1, 8), "OX child1 not valid: {c1:?}");
            assert!(is_permutation(&c2, 8), "OX child2 not valid: {c2:?}");
        }
    }

    #[test]
    fn test_ox_identical_parents() {
        let mut rng = create_rng(42);
        let p = vec![3, 0, 4, 1, 2];
        for _ in 0..20 {
            let (c1, c2) = order_crossover(&p, &p, &mut rng).unwrap();
            assert_eq!(c1, p);
            assert_eq!(c2, p);
        }
    }

    #[test]
    fn test_ox_full_segment_swaps_parents() {
        let p1 = vec![0, 1, 2, 3];
        let p2 = vec![2, 3, 1, 0];
        let (c1, c2) = ox_with_cuts(&p1, &p2, 0, 4).unwrap();
        assert_eq!(c1, p2);
        assert_eq!(c2, p1);
    }

    // ---- PMX Crossover ----

    #[test]
    fn test_pmx_known_cuts() {
        // Classic textbook example
        let p1 = vec![1, 2, 3, 4, 5, 6, 7, 8, 9];
        let p2 = vec![9, 3, 7, 8, 2, 6, 5, 1, 4];
        let (c1, c2) = pmx_with_cuts(&p1, &p2, 3, 7).unwrap();
        assert_eq!(c1, vec![1, 7, 3, 8, 2, 6, 5, 4, 9]);
        assert_eq!(c2, vec![9, 3, 2, 4, 5, 6, 7, 1, 8]);
    }

    #[test]
    fn test_pmx_produces_valid_permutations() {
        let mut rng = create_rng(42);
        let p1 = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let p2 = vec![3, 7, 5, 1, 6, 0, 2, 4];

        for _ in 0..100 {
            let (c1, c2) = pmx_crossover(&p1, &p2, &mut rng).unwrap();
            assert!(is_permutation(&c1, 8), "PMX child1 not valid: {c1:?}");
            assert!(is_permutation(&c2, 8), "PMX child2 not valid: {c2:?}");
        }
    }

    #[test]
    fn test_pmx_identical_parents() {
        let mut rng = create_rng(42);
        let p = vec![0, 1, 2, 3, 4];
        for _ in 0..20 {
            let (c1, c2) = pmx_crossover(&p, &p, &mut rng).unwrap();
            assert_eq!(c1, p);
            assert_eq!(c2, p);
        }
    }

    #[test]
    fn test_pmx_segment_from_opposite_parent() {
        let p1 = vec![0, 1, 2, 3, 4, 5];
        let p2 = vec![5, 3, 1, 0, 4, 2];
        let (c1, c2) = pmx_with_cuts(&p1, &p2, 2, 5).unwrap();
        assert_eq!(&c1[2..5], &p2[2..5]);
        assert_eq!(&c2[2..5], &p1[2..5]);
        assert!(is_permutation(&c1, 6));
        assert!(is_permutation(&c2, 6));
    }

    // ---- Boundary checks ----

    #[test]
    fn test_crossover_rejects_invalid_parents() {
        let mut rng = create_rng(1);
        let err = pmx_crossover(&[0, 1, 1], &[0, 1, 2], &mut rng).unwrap_err();
        assert!(matches!(err, TspError::InvalidRoute(_)));
        let err = order_crossover(&[0, 1, 2], &[0, 1, 3], &mut rng).unwrap_err();
        assert!(matches!(err, TspError::InvalidRoute(_)));
        let err = order_crossover(&[0, 1, 2], &[0, 1], &mut rng).unwrap_err();
        assert!(matches!(err, TspError::InvalidRoute(_)));
        let err = order_crossover(&[], &[], &mut rng).unwrap_err();
        assert!(matches!(err, TspError::InvalidRoute(_)));
        let err = pmx_crossover(&[], &[], &mut rng).unwrap_err();
        assert!(matches!(err, TspError::InvalidRoute(_)));
    }

    #[test]
    fn test_crossover_validates_before_drawing_cuts() {
        // A mismatched pair must not consume randomness or panic on cuts
        let mut rng = create_rng(5);
        let mut untouched = create_rng(5);
        assert!(pmx_crossover(&[], &[0], &mut rng).is_err());
        assert!(order_crossover(&[0, 1, 2], &[], &mut rng).is_err());
        assert_eq!(rng.random::<u64>(), untouched.random::<u64>());
    }

    #[test]
    fn test_invert_segment_allows_exclusive_end_before_last() {
        let mut route = vec![0, 1, 2, 3, 4];
        invert_segment(&mut route, 1, 4).unwrap();
        assert_eq!(route, vec![0, 3, 2, 1, 4]);
        assert!(matches!(
            invert_segment(&mut route, 1, 5),
            Err(TspError::InvalidCutPoints { .. })
        ));
    }

    #[test]
    fn test_crossover_rejects_bad_cuts() {
        let p = [0, 1, 2, 3];
        assert!(matches!(
            pmx_with_cuts(&p, &p, 2, 2),
            Err(TspError::InvalidCutPoints { .. })
        ));
        assert!(matches!(
            ox_with_cuts(&p, &p, 1, 5),
            Err(TspError::InvalidCutPoints { .. })
        ));
    }

    // ---- Strategy selection ----

    #[test]
    fn test_default_weights_always_ox() {
        let mut rng = create_rng(42);
        let w = CrossoverWeights::default();
        assert!((0..1000).all(|_| w.choose(&mut rng) == Crossover::Ox));
    }

    #[test]
    fn test_weights_mix_operators() {
        let mut rng = create_rng(42);
        let w = CrossoverWeights::new(1, 3);
        let pmx = (0..8000)
            .filter(|_| w.choose(&mut rng) == Crossover::Pmx)
            .count();
        // 1/4 of 8000 = 2000
        assert!((1700..2300).contains(&pmx), "pmx chosen {pmx} times");
    }

    #[test]
    fn test_crossover_apply() {
        let mut rng = create_rng(7);
        let p1: Vec<usize> = (0..10).collect();
        let p2: Vec<usize> = (0..10).rev().collect();
        for op in [Crossover::Pmx, Crossover::Ox] {
            let (c1, c2) = op.apply(&p1, &p2, &mut rng).unwrap();
            assert!(is_permutation(&c1, 10));
            assert!(is_permutation(&c2, 10));
        }
    }

    // ---- Inversion Mutation ----

    #[test]
    fn test_invert_segment_known() {
        let mut route = vec![0, 1, 2, 3, 4];
        invert_segment(&mut route, 1, 3).unwrap();
        assert_eq!(route, vec![0, 2, 1, 3, 4]);

        let mut route = vec![0, 1, 2, 3, 4];
        invert_segment(&mut route, 1, 4).unwrap();
        assert_eq!(route, vec![0, 3, 2, 1, 4]);
    }

    #[test]
    fn test_invert_segment_rejects_bounds() {
        let mut route = vec![0, 1, 2, 3, 4];
        assert!(invert_segment(&mut route, 0, 3).is_err());
        assert!(invert_segment(&mut route, 2, 2).is_err());
        assert!(invert_segment(&mut route, 1, 5).is_err());
        assert_eq!(route, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_invert_keeps_endpoints() {
        let mut rng = create_rng(42);
        for _ in 0..200 {
            let mut route: Vec<usize> = (0..10).collect();
            invert_mutation(&mut route, &mut rng).unwrap();
            assert!(is_permutation(&route, 10));
            assert_eq!(route[0], 0);
            assert_eq!(route[9], 9);
        }
    }

    #[test]
    fn test_invert_three_vertices() {
        let mut rng = create_rng(42);
        let mut route = vec![2, 0, 1];
        invert_mutation(&mut route, &mut rng).unwrap();
        assert_eq!(route, vec![2, 0, 1]);
    }

    #[test]
    fn test_invert_rejects_invalid() {
        let mut rng = create_rng(42);
        assert!(invert_mutation(&mut [0, 1], &mut rng).is_err());
        assert!(invert_mutation(&mut [0, 1, 1, 2], &mut rng).is_err());
    }

    // ---- Swap Mutation ----

    #[test]
    fn test_swap_preserves_permutation() {
        let mut rng = create_rng(42);
        for _ in 0..100 {
            let mut route: Vec<usize> = (0..10).collect();
            swap_mutation(&mut route, &mut rng).unwrap();
            assert!(is_permutation(&route, 10));
        }
    }

    #[test]
    fn test_swap_changes_eventually() {
        let mut rng = create_rng(3);
        let original: Vec<usize> = (0..6).collect();
        let changed = (0..100).any(|_| {
            let mut route = original.clone();
            Mutation::Swap.apply(&mut route, &mut rng).unwrap();
            route != original
        });
        assert!(changed);
    }

    #[test]
    fn test_swap_rejects_invalid() {
        let mut rng = create_rng(42);
        assert!(swap_mutation(&mut [4], &mut rng).is_err());
        assert!(swap_mutation(&mut [3, 3], &mut rng).is_err());
    }

    // ---- Random cut helper ----

    #[test]
    fn test_random_cuts_bounds() {
        let mut rng = create_rng(42);
        for _ in 0..1000 {
            let (start, end) = random_cuts(10, &mut rng);
            assert!(start < end);
            assert!(end <= 10);
        }
    }
}
