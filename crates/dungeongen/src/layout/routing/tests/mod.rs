mod serialization;

use super::route_all;
use super::types::{RouteReport, RoutingConfig, RoutingOutput};
use crate::layout::geometry::{Coordinate, Direction};
use crate::layout::model::{Connection, ConnectionType, CorridorPath, Room};

/// Helper to create a named room.
fn room(id: &str, x: i32, y: i32, w: i32, h: i32) -> Room {
    Room::new(id, Coordinate::new(x, y), w, h).with_name(id.to_uppercase())
}

/// Helper to create a door connection.
fn link(a: &str, b: &str) -> Connection {
    Connection::new(a, b, ConnectionType::Door)
}

fn config() -> RoutingConfig {
    RoutingConfig::default()
}

/// Get the corridor for a connection index.
fn get_corridor(output: &RoutingOutput, idx: usize) -> &CorridorPath {
    &output.corridors[idx]
}

fn get_report(output: &RoutingOutput, idx: usize) -> &RouteReport {
    &output.reports[idx]
}

/// Assert the endpoint and continuity invariants for every corridor.
fn assert_well_formed(output: &RoutingOutput, rooms: &[Room]) {
    for corridor in &output.corridors {
        let a = rooms.iter().find(|r| r.id == corridor.room_a_id).unwrap();
        let b = rooms.iter().find(|r| r.id == corridor.room_b_id).unwrap();
        let points = &corridor.path_points;
        assert!(points.len() >= 2, "{} has {} points", corridor.connection_id, points.len());

        let first = points[0];
        let last = points[points.len() - 1];
        assert!(
            a.bounds().is_on_or_adjacent(first),
            "{} starts at {first}, away from {}",
            corridor.connection_id,
            a.id
        );
        assert!(
            b.bounds().is_on_or_adjacent(last),
            "{} ends at {last}, away from {}",
            corridor.connection_id,
            b.id
        );
        for pair in points.windows(2) {
            assert!(
                pair[0].chebyshev_to(pair[1]) <= 1,
                "{} jumps from {} to {}",
                corridor.connection_id,
                pair[0],
                pair[1]
            );
        }
    }
}

/// Assert no point of the corridor lies inside any room.
fn assert_avoids_rooms(corridor: &CorridorPath, rooms: &[Room]) {
    for p in &corridor.path_points {
        for r in rooms {
            assert!(
                !r.bounds().contains(*p),
                "{} enters {} at {p}",
                corridor.connection_id,
                r.id
            );
        }
    }
}

/// Assert every step is a single orthogonal move.
fn assert_orthogonal(corridor: &CorridorPath) {
    for pair in corridor.path_points.windows(2) {
        assert!(
            Direction::between(pair[0], pair[1]).is_some(),
            "{} steps diagonally from {} to {}",
            corridor.connection_id,
            pair[0],
            pair[1]
        );
    }
}
