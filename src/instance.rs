//! Problem instances: loading, generating, and writing point sets.
//!
//! The text format is line oriented. The first line holds the vertex count
//! `N`; each of the following `N` lines holds `<index> <x> <y>` separated by
//! whitespace. Coordinates may carry a sign. The index column is informative
//! only, vertices are numbered by line order.
//!
//! ```text
//! 4
//! 1 0 0
//! 2 0 10
//! 3 10 10
//! 4 10 0
//! ```

use crate::error::{Result, TspError};
use crate::matrix::DistanceMatrix;
use rand::Rng;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

/// Upper bound (inclusive) of generated coordinates.
pub const GENERATED_COORD_MAX: i64 = 200;

const PARSE_PREALLOC_MAX: usize = 4096;

/// A vertex position in the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An ordered set of points. Vertex `i` is `points[i]`.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Instance {
    pub points: Vec<Point>,
}

impl Instance {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Parses the line-oriented text format.
    ///
    /// Blank lines after the last vertex are ignored. Line numbers in errors
    /// are 1-based.
    ///
    /// # Errors
    /// Returns [`TspError::Parse`] for a malformed header or vertex line, or
    /// when the file holds more or fewer vertex lines than announced.
    pub fn parse(text: &str) -> Result<Self> {
        // Tolerate a UTF-8 byte order mark.
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut lines = text.lines().enumerate();

        let (_, header) = lines
            .next()
            .ok_or_else(|| TspError::parse(1, "empty input"))?;
        let n: usize = header
            .trim()
            .parse()
            .map_err(|_| TspError::parse(1, "first line should be a single integer"))?;

        // The header is untrusted; let the vector grow past this.
        let mut points = Vec::with_capacity(n.min(PARSE_PREALLOC_MAX));
        for (idx, line) in lines {
            let line_no = idx + 1;
            if line.trim().is_empty() {
                continue;
            }
            if points.len() == n {
                return Err(TspError::parse(line_no, "too many vertex lines"));
            }
            points.push(parse_vertex(line, line_no)?);
        }

        if points.len() < n {
            return Err(TspError::parse(
                text.lines().count().max(1),
                format!("expected {n} vertex lines, found {}", points.len()),
            ));
        }

        Ok(Self { points })
    }

    /// Reads and parses an instance file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Generates `n` distinct integer points with coordinates in
    /// `0..=GENERATED_COORD_MAX`.
    ///
    /// # Errors
    /// Returns [`TspError::InvalidConfig`] if `n` exceeds the number of
    /// distinct grid points.
    pub fn random<R: Rng>(n: usize, rng: &mut R) -> Result<Self> {
        let side = (GENERATED_COORD_MAX + 1) as usize;
        if n > side * side {
            return Err(TspError::InvalidConfig(format!(
                "cannot place {n} distinct points on a {side}x{side} grid"
            )));
        }

        let mut seen = HashSet::with_capacity(n);
        let mut points = Vec::with_capacity(n);
        while points.len() < n {
            let x = rng.random_range(0..=GENERATED_COORD_MAX);
            let y = rng.random_range(0..=GENERATED_COORD_MAX);
            if seen.insert((x, y)) {
                points.push(Point::new(x as f64, y as f64));
            }
        }
        Ok(Self { points })
    }

    /// Renders the instance in the text format accepted by [`parse`](Self::parse).
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.points.len());
        for (i, p) in self.points.iter().enumerate() {
            let _ = writeln!(out, "{} {} {}", i + 1, p.x, p.y);
        }
        out
    }

    /// Builds the Euclidean distance matrix for this instance.
    pub fn distance_matrix(&self) -> DistanceMatrix {
        DistanceMatrix::from_points(&self.points)
    }
}

fn parse_vertex(line: &str, line_no: usize) -> Result<Point> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 3 {
        return Err(TspError::parse(
            line_no,
            format!("expected `<index> <x> <y>`, got {:?}", line.trim()),
        ));
    }
    fields[0]
        .parse::<u64>()
        .map_err(|_| TspError::parse(line_no, format!("invalid index {:?}", fields[0])))?;
    let x = parse_coord(fields[1], line_no)?;
    let y = parse_coord(fields[2], line_no)?;
    Ok(Point::new(x, y))
}

fn parse_coord(field: &str, line_no: usize) -> Result<f64> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(TspError::parse(
            line_no,
            format!("invalid coordinate {field:?}"),
        )),
    }
}
