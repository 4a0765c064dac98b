//! Routes and their fitness.
//!
//! A route is an ordering of all vertex indices `0..n`, each appearing
//! exactly once. The edge from the last vertex back to the first is
//! implicit.

use crate::error::{Result, TspError};
use crate::matrix::DistanceMatrix;

/// A closed tour as an ordered sequence of 0-based vertex indices.
pub type Route = Vec<usize>;

/// Total cyclic length of `route`, including the return edge.
///
/// Pure and O(n). An empty route has length 0.
///
/// # Panics
/// Panics if `route` references a vertex outside `matrix`; use
/// [`checked_tour_length`] for unvalidated input.
pub fn tour_length(route: &[usize], matrix: &DistanceMatrix) -> f64 {
    let (first, last) = match (route.first(), route.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return 0.0,
    };
    let open: f64 = route.windows(2).map(|w| matrix.get(w[0], w[1])).sum();
    open + matrix.get(last, first)
}

/// [`tour_length`] for a route from outside the engine.
///
/// # Errors
/// Returns [`TspError::InvalidRoute`] unless `route` is a permutation of
/// the matrix's vertices.
///
/// ```
/// use tsp_evolve::route::checked_tour_length;
/// use tsp_evolve::{DistanceMatrix, Point};
///
/// let m = DistanceMatrix::from_points(&[
///     Point::new(0.0, 0.0),
///     Point::new(3.0, 0.0),
///     Point::new(3.0, 4.0),
/// ]);
/// assert_eq!(checked_tour_length(&[0, 1, 2], &m).unwrap(), 12.0);
/// assert!(checked_tour_length(&[0, 1, 5], &m).is_err());
/// ```
pub fn checked_tour_length(route: &[usize], matrix: &DistanceMatrix) -> Result<f64> {
    check_route(route, matrix.len())?;
    Ok(tour_length(route, matrix))
}

/// Returns `true` if `route` is a permutation of `0..n`.
pub fn is_permutation(route: &[usize], n: usize) -> bool {
    if route.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &v in route {
        if v >= n || seen[v] {
            return false;
        }
        seen[v] = true;
    }
    true
}

/// Checks that `route` is a permutation of `0..n`.
///
/// # Errors
/// Returns [`TspError::InvalidRoute`] naming the first violation found.
pub fn check_route(route: &[usize], n: usize) -> Result<()> {
    if route.len() != n {
        return Err(TspError::invalid_route(format!(
            "length {} does not match vertex count {n}",
            route.len()
        )));
    }
    let mut seen = vec![false; n];
    for (pos, &v) in route.iter().enumerate() {
        if v >= n {
            return Err(TspError::invalid_route(format!(
                "vertex {v} at position {pos} is out of range 0..{n}"
            )));
        }
        if seen[v] {
            return Err(TspError::invalid_route(format!(
                "vertex {v} repeated at position {pos}"
            )));
        }
        seen[v] = true;
    }
    Ok(())
}

/// Renders `route` 1-based as a closed walk, e.g. `1->3->2->1`.
pub fn format_route(route: &[usize]) -> String {
    let mut parts: Vec<String> = route.iter().map(|v| (v + 1).to_string()).collect();
    if let Some(&first) = route.first() {
        parts.push((first + 1).to_string());
    }
    parts.join("->")
}
