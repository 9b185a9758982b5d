//! Corridor routing between connected rooms.

pub mod classify;
pub mod doors;
pub mod grid;
pub mod occupancy;
pub mod search;
pub mod serialize;
pub mod types;

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use classify::{classify, describe};
use doors::candidate_doors;
use grid::ObstacleGrid;
use occupancy::{CorridorOccupancy, compute_complexity};
use search::find_best_route;
use serialize::path_to_string;
use types::{Route, RouteKind, RouteReport, RoutingConfig, RoutingOutput};

use super::geometry::{Coordinate, Direction};
use super::model::{Connection, CorridorPath, Room};

pub use classify::HallwayStats;

/// Route a corridor for every connection.
///
/// Connections are processed sequentially in order. Earlier corridors claim
/// their cells first, so later ones pay a crowding cost to share them. Each
/// individual search is parallelized across candidate door pairs via rayon.
/// Routing never fails: when no clean path exists the corridor falls back to a
/// direct line between the primary doors.
pub fn route_all(rooms: &[Room], connections: &[Connection], config: &RoutingConfig) -> RoutingOutput {
    let index: HashMap<&str, usize> = rooms
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.as_str(), i))
        .collect();

    let grid = ObstacleGrid::build(rooms, config.padding);
    let mut occupancy = CorridorOccupancy::new();
    let mut output = RoutingOutput::default();

    for conn in connections {
        let (Some(&a), Some(&b)) = (
            index.get(conn.room_a_id.as_str()),
            index.get(conn.room_b_id.as_str()),
        ) else {
            tracing::warn!(connection = %conn.id(), "connection references an unknown room");
            output.skipped.push(conn.id());
            continue;
        };

        let route = route_pair(&grid, &occupancy, &rooms[a], &rooms[b], config);
        let crosses_rooms = route
            .points
            .iter()
            .filter_map(|&p| grid.room_at(p))
            .any(|r| r != a && r != b);

        if route.kind == RouteKind::Fallback {
            tracing::warn!(
                connection = %conn.id(),
                crosses_rooms,
                "no clear corridor, using a direct line"
            );
        }
        tracing::trace!(connection = %conn.id(), path = %path_to_string(&route.points), "routed");

        occupancy.claim_path(&route.points);

        let hallway = classify(&route, crosses_rooms, conn.connection_type, config);
        output.corridors.push(CorridorPath {
            connection_id: conn.id(),
            room_a_id: conn.room_a_id.clone(),
            room_b_id: conn.room_b_id.clone(),
            width: hallway.default_width(),
            hallway_type: hallway,
            description: Some(describe(hallway, &rooms[a], &rooms[b])),
            path_points: route.points,
        });
        output.reports.push(RouteReport {
            connection_id: conn.id(),
            kind: route.kind,
            complexity: route.complexity,
            crosses_rooms,
        });
    }

    tracing::debug!(
        corridors = output.corridors.len(),
        fallbacks = output.fallback_count(),
        "corridors routed"
    );
    output
}

/// Straight run, then search, then the direct-line fallback.
fn route_pair(
    grid: &ObstacleGrid,
    occupancy: &CorridorOccupancy,
    from: &Room,
    to: &Room,
    config: &RoutingConfig,
) -> Route {
    let starts: Vec<(Direction, Coordinate)> = candidate_doors(from, to)
        .into_iter()
        .filter(|&(_, c)| !grid.is_blocked(c))
        .collect();
    let goals: Vec<(Direction, Coordinate)> = candidate_doors(to, from)
        .into_iter()
        .filter(|&(_, c)| !grid.is_blocked(c))
        .collect();

    let straight = starts
        .first()
        .zip(goals.first())
        .and_then(|(&(_, s), &(_, g))| straight_run(grid, s, g, config.straight_max_length));
    if let Some(points) = straight {
        let complexity = compute_complexity(&points, occupancy);
        return Route {
            points,
            complexity,
            kind: RouteKind::Straight,
        };
    }

    if let Some(route) = find_best_route(grid, occupancy, &starts, &goals, config) {
        return route;
    }

    // Primary doors ignore blocking so the fallback always has endpoints.
    let s = candidate_doors(from, to)[0].1;
    let g = candidate_doors(to, from)[0].1;
    let points = direct_line(s, g);
    let complexity = compute_complexity(&points, occupancy);
    Route {
        points,
        complexity,
        kind: RouteKind::Fallback,
    }
}

/// Cells from `a` to `b` when they share a row or column, every cell is free and
/// the run is at most `max_len` steps.
fn straight_run(
    grid: &ObstacleGrid,
    a: Coordinate,
    b: Coordinate,
    max_len: u32,
) -> Option<Vec<Coordinate>> {
    if a.x != b.x && a.y != b.y {
        return None;
    }
    if a.manhattan_to(b) as u32 > max_len {
        return None;
    }
    if a == b {
        return Some(vec![a, a]);
    }
    let points = direct_line(a, b);
    points
        .iter()
        .all(|&p| !grid.is_blocked(p))
        .then_some(points)
}

/// Bresenham line from `a` to `b`, inclusive. Steps may be diagonal.
///
/// Two equal endpoints yield the point twice so the path keeps two points.
pub fn direct_line(a: Coordinate, b: Coordinate) -> Vec<Coordinate> {
    if a == b {
        return vec![a, a];
    }
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (a.x, a.y);
    let mut points = vec![a];
    while (x, y) != (b.x, b.y) {
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        points.push(Coordinate::new(x, y));
    }
    points
}
