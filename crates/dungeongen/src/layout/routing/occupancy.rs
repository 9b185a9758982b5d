use std::collections::HashMap;

use crate::layout::geometry::{Coordinate, Direction, step_count};

use super::types::RouteComplexity;

/// Tracks how many corridors already pass through each cell.
#[derive(Debug, Clone, Default)]
pub struct CorridorOccupancy {
    claimed: HashMap<Coordinate, u32>,
}

impl CorridorOccupancy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any earlier corridor uses a cell.
    pub fn is_claimed(&self, c: Coordinate) -> bool {
        self.claimed.contains_key(&c)
    }

    /// Number of corridors using a cell.
    pub fn claimed_count(&self, c: Coordinate) -> u32 {
        self.claimed.get(&c).copied().unwrap_or(0)
    }

    /// Claim every distinct cell of a path once.
    pub fn claim_path(&mut self, points: &[Coordinate]) {
        let mut seen = points.to_vec();
        seen.sort();
        seen.dedup();
        for c in seen {
            *self.claimed.entry(c).or_insert(0) += 1;
        }
    }
}

/// Compute the complexity of a path against the current occupancy.
///
/// Diagonal steps (fallback lines) count toward length but never as turns.
pub fn compute_complexity(points: &[Coordinate], occupancy: &CorridorOccupancy) -> RouteComplexity {
    let length = step_count(points) as u32;
    let crowded = points.iter().filter(|&&c| occupancy.is_claimed(c)).count() as u32;

    let mut turns = 0;
    let mut last: Option<Direction> = None;
    for pair in points.windows(2) {
        let Some(dir) = Direction::between(pair[0], pair[1]) else {
            continue;
        };
        if last.is_some_and(|prev| prev.is_turn(dir)) {
            turns += 1;
        }
        last = Some(dir);
    }

    RouteComplexity {
        length,
        turns,
        crowded,
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    fn pts(raw: &[(i32, i32)]) -> Vec<Coordinate> {
        raw.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
    }

    #[test]
    fn claims_are_counted_per_path() {
        let mut occ = CorridorOccupancy::new();
        occ.claim_path(&pts(&[(0, 0), (1, 0), (1, 0)]));
        occ.claim_path(&pts(&[(1, 0), (1, 1)]));
        assert_eq!(occ.claimed_count(Coordinate::new(1, 0)), 2);
        assert_eq!(occ.claimed_count(Coordinate::new(0, 0)), 1);
        assert!(!occ.is_claimed(Coordinate::new(5, 5)));
    }

    #[test]
    fn l_shape_has_one_turn() {
        let occ = CorridorOccupancy::new();
        let c = compute_complexity(&pts(&[(0, 0), (1, 0), (2, 0), (2, 1), (2, 2)]), &occ);
        assert_eq!(
            c,
            RouteComplexity {
                length: 4,
                turns: 1,
                crowded: 0
            }
        );
    }

    #[test]
    fn shared_door_cell_has_no_length() {
        let occ = CorridorOccupancy::new();
        let c = compute_complexity(&pts(&[(4, 2), (4, 2)]), &occ);
        assert_eq!(c.length, 0);
        assert_eq!(c.turns, 0);
    }

    #[test]
    fn crowding_counts_claimed_cells() {
        let mut occ = CorridorOccupancy::new();
        occ.claim_path(&pts(&[(1, 0), (2, 0)]));
        let c = compute_complexity(&pts(&[(0, 0), (1, 0), (2, 0), (3, 0)]), &occ);
        assert_eq!(c.crowded, 2);
        assert_eq!(c.turns, 0);
    }
}
