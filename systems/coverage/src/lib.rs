#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure geometry helpers that measure how much of the enemy path a tower covers.

use glam::DVec2;
use tower_gym_core::Position;

/// Path cell centres cached in vector form for repeated range queries.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathCoverage {
    cells: Vec<DVec2>,
}

impl PathCoverage {
    /// Captures the provided path cell centres.
    #[must_use]
    pub fn new(path_cells: &[Position]) -> Self {
        Self {
            cells: path_cells.iter().copied().map(to_dvec2).collect(),
        }
    }

    /// Number of path cells tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the path is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Counts the path cells strictly closer than `range` to `tower`.
    #[must_use]
    pub fn cells_in_range(&self, tower: Position, range: f64) -> usize {
        let origin = to_dvec2(tower);
        self.cells
            .iter()
            .filter(|cell| within_range(origin, **cell, range))
            .count()
    }
}

/// Reports whether `point` lies strictly inside the circle of radius `range` around `tower`.
#[must_use]
pub fn in_range(tower: Position, point: Position, range: f64) -> bool {
    within_range(to_dvec2(tower), to_dvec2(point), range)
}

fn within_range(origin: DVec2, point: DVec2, range: f64) -> bool {
    origin.distance(point) < range
}

fn to_dvec2(position: Position) -> DVec2 {
    DVec2::new(position.x, position.y)
}

#[cfg(test)]
mod tests {
    use super::{in_range, PathCoverage};
    use tower_gym_core::Position;

    fn straight_path() -> PathCoverage {
        let cells: Vec<Position> = (0..10)
            .map(|index| Position::new(25.0 + 50.0 * index as f64, 25.0))
            .collect();
        PathCoverage::new(&cells)
    }

    #[test]
    fn counts_cells_strictly_inside_range() {
        let coverage = straight_path();
        // Tower one row below the third cell: distances 50, 70.7, 111.8, ...
        let tower = Position::new(125.0, 75.0);
        assert_eq!(coverage.cells_in_range(tower, 80.0), 3);
        assert_eq!(coverage.cells_in_range(tower, 50.0), 0);
        assert_eq!(coverage.cells_in_range(tower, 50.5), 1);
    }

    #[test]
    fn boundary_distance_is_excluded() {
        let tower = Position::new(0.0, 0.0);
        assert!(!in_range(tower, Position::new(3.0, 4.0), 5.0));
        assert!(in_range(tower, Position::new(3.0, 4.0), 5.01));
    }

    #[test]
    fn empty_path_covers_nothing() {
        let coverage = PathCoverage::new(&[]);
        assert!(coverage.is_empty());
        assert_eq!(coverage.cells_in_range(Position::new(10.0, 10.0), 1_000.0), 0);
    }

    #[test]
    fn far_tower_covers_nothing() {
        let coverage = straight_path();
        assert_eq!(coverage.len(), 10);
        assert_eq!(coverage.cells_in_range(Position::new(225.0, 575.0), 120.0), 0);
    }
}
