use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use rayon::prelude::*;

use crate::layout::geometry::{Coordinate, Direction};

use super::grid::ObstacleGrid;
use super::occupancy::{CorridorOccupancy, compute_complexity};
use super::types::{Route, RouteKind, RoutingConfig};

/// State key for the visited set. Direction matters because turns cost extra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StateKey {
    coord: Coordinate,
    last_direction: Direction,
}

/// Wrapper for the priority queue with deterministic ordering.
/// BinaryHeap is a max-heap, so the ordering is reversed (lowest cost pops first).
#[derive(Debug, PartialEq, Eq)]
struct PqEntry {
    f_cost: u32,
    g_cost: u32,
    key: StateKey,
}

impl Ord for PqEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_cost
            .cmp(&self.f_cost)
            // Same f: prefer the entry closer to the goal (higher g).
            .then(self.g_cost.cmp(&other.g_cost))
            .then(other.key.coord.cmp(&self.key.coord))
            .then(other.key.last_direction.cmp(&self.key.last_direction))
    }
}

impl PartialOrd for PqEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn heuristic(from: Coordinate, to: Coordinate) -> u32 {
    from.manhattan_to(to) as u32
}

/// Run A* from door `start` (leaving the room toward `exit_dir`) to door `goal`.
///
/// Room cells are impassable. Each step costs one, plus `turn_cost` on a
/// direction change and `crowding_cost` when entering a claimed cell. Gives up
/// after `max_expansions` pops.
fn astar(
    grid: &ObstacleGrid,
    occupancy: &CorridorOccupancy,
    start: Coordinate,
    exit_dir: Direction,
    goal: Coordinate,
    config: &RoutingConfig,
) -> Option<Route> {
    let walkable = |c: Coordinate| grid.contains(c) && !grid.is_blocked(c);
    if !walkable(start) || !walkable(goal) {
        return None;
    }

    let crowding = |c: Coordinate| {
        if occupancy.is_claimed(c) {
            config.crowding_cost
        } else {
            0
        }
    };

    let mut open = BinaryHeap::new();
    let mut best_g: HashMap<StateKey, u32> = HashMap::new();
    let mut came_from: HashMap<StateKey, StateKey> = HashMap::new();

    let start_key = StateKey {
        coord: start,
        last_direction: exit_dir,
    };
    let g0 = crowding(start);
    best_g.insert(start_key, g0);
    open.push(PqEntry {
        f_cost: g0 + heuristic(start, goal),
        g_cost: g0,
        key: start_key,
    });

    let mut expansions = 0usize;
    while let Some(entry) = open.pop() {
        let current = entry.key;

        // Skip stale entries.
        if best_g.get(&current).is_some_and(|&best| entry.g_cost > best) {
            continue;
        }

        if current.coord == goal {
            let points = reconstruct_path(&came_from, current);
            let complexity = compute_complexity(&points, occupancy);
            return Some(Route {
                points,
                complexity,
                kind: RouteKind::Routed,
            });
        }

        expansions += 1;
        if expansions > config.max_expansions {
            tracing::trace!(%start, %goal, expansions, "search budget exhausted");
            return None;
        }

        for (neighbor, dir) in grid.neighbors(current.coord) {
            // Don't go backwards.
            if dir == current.last_direction.opposite() {
                continue;
            }

            let turn = if current.last_direction.is_turn(dir) {
                config.turn_cost
            } else {
                0
            };
            let new_g = entry.g_cost + 1 + turn + crowding(neighbor);
            let next = StateKey {
                coord: neighbor,
                last_direction: dir,
            };

            if best_g.get(&next).is_some_and(|&best| new_g >= best) {
                continue;
            }
            best_g.insert(next, new_g);
            came_from.insert(next, current);
            open.push(PqEntry {
                f_cost: new_g + heuristic(neighbor, goal),
                g_cost: new_g,
                key: next,
            });
        }
    }

    None
}

fn reconstruct_path(came_from: &HashMap<StateKey, StateKey>, last: StateKey) -> Vec<Coordinate> {
    let mut points = vec![last.coord];
    let mut current = last;
    while let Some(&parent) = came_from.get(&current) {
        points.push(parent.coord);
        current = parent;
    }
    points.reverse();
    points
}

/// Search every (start door, goal door) pair in parallel and keep the best route.
///
/// Pairs are independent, so rayon runs them concurrently. The winner is the
/// minimum under [`Route::compare`], which is a total order, so the result is
/// the same as a sequential scan.
pub fn find_best_route(
    grid: &ObstacleGrid,
    occupancy: &CorridorOccupancy,
    starts: &[(Direction, Coordinate)],
    goals: &[(Direction, Coordinate)],
    config: &RoutingConfig,
) -> Option<Route> {
    let pairs: Vec<((Direction, Coordinate), Coordinate)> = starts
        .iter()
        .flat_map(|&s| goals.iter().map(move |&(_, g)| (s, g)))
        .collect();

    // Rooms sharing a door cell: a trivial two-point route.
    if let Some(&((_, s), _)) = pairs.iter().find(|((_, s), g)| s == g) {
        let points = vec![s, s];
        let complexity = compute_complexity(&points, occupancy);
        return Some(Route {
            points,
            complexity,
            kind: RouteKind::Routed,
        });
    }

    let results: Vec<Option<Route>> = pairs
        .par_iter()
        .map(|&((dir, start), goal)| astar(grid, occupancy, start, dir, goal, config))
        .collect();

    results
        .into_iter()
        .flatten()
        .min_by(|a, b| a.compare(b, config))
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::layout::model::Room;

    #[test]
    fn pq_pops_lowest_f_first() {
        let key = |x| StateKey {
            coord: Coordinate::new(x, 0),
            last_direction: Direction::East,
        };
        let mut heap = BinaryHeap::new();
        for (x, f_cost) in [(0, 7), (1, 3), (2, 5)] {
            heap.push(PqEntry {
                f_cost,
                g_cost: 1,
                key: key(x),
            });
        }
        assert_eq!(heap.pop().map(|e| e.f_cost), Some(3));
        assert_eq!(heap.pop().map(|e| e.f_cost), Some(5));
    }

    #[test]
    fn astar_walks_around_a_wall() {
        let rooms = vec![Room::new("wall", Coordinate::new(2, -2), 1, 5)];
        let grid = ObstacleGrid::build(&rooms, 3);
        let occ = CorridorOccupancy::new();
        let route = astar(
            &grid,
            &occ,
            Coordinate::new(0, 0),
            Direction::East,
            Coordinate::new(4, 0),
            &RoutingConfig::default(),
        )
        .unwrap();
        assert_eq!(route.points.first(), Some(&Coordinate::new(0, 0)));
        assert_eq!(route.points.last(), Some(&Coordinate::new(4, 0)));
        assert!(route.points.iter().all(|p| !grid.is_blocked(*p)));
        assert!(route.complexity.length > 4);
    }

    #[test]
    fn expansion_budget_bounds_the_search() {
        let grid = ObstacleGrid::build(&[Room::new("a", Coordinate::new(0, 0), 2, 2)], 30);
        let occ = CorridorOccupancy::new();
        let config = RoutingConfig {
            max_expansions: 3,
            ..RoutingConfig::default()
        };
        let route = astar(
            &grid,
            &occ,
            Coordinate::new(2, 0),
            Direction::East,
            Coordinate::new(20, 20),
            &config,
        );
        assert!(route.is_none());
    }
}
