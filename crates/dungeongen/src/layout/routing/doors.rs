//! Door cell selection.
//!
//! A door is the free cell just outside a room wall. Corridors start and end on
//! door cells, so every corridor endpoint touches its room.

use crate::layout::geometry::{Coordinate, Direction};
use crate::layout::model::Room;

/// Sides of `from` that face `to`, primary side first.
///
/// The primary side follows the dominant axis of the center delta. The other
/// axis contributes a secondary side when its delta is non-zero.
pub fn facing_sides(from: &Room, to: &Room) -> Vec<Direction> {
    let a = from.center();
    let b = to.center();
    let dx = b.x - a.x;
    let dy = b.y - a.y;

    let horizontal = if dx >= 0 {
        Direction::East
    } else {
        Direction::West
    };
    let vertical = if dy >= 0 {
        Direction::South
    } else {
        Direction::North
    };

    if dx.abs() >= dy.abs() {
        if dy != 0 {
            vec![horizontal, vertical]
        } else {
            vec![horizontal]
        }
    } else if dx != 0 {
        vec![vertical, horizontal]
    } else {
        vec![vertical]
    }
}

/// Door cell on `side` of `room`, aligned with `toward` where the wall allows.
///
/// The position along the wall is clamped to the wall span and keeps off the
/// corner cells when the wall is at least three cells long.
pub fn door_cell(room: &Room, side: Direction, toward: Coordinate) -> Coordinate {
    let b = room.bounds();
    match side {
        Direction::East => Coordinate::new(b.max.x, along(toward.y, b.min.y, b.max.y)),
        Direction::West => Coordinate::new(b.min.x - 1, along(toward.y, b.min.y, b.max.y)),
        Direction::North => Coordinate::new(along(toward.x, b.min.x, b.max.x), b.min.y - 1),
        Direction::South => Coordinate::new(along(toward.x, b.min.x, b.max.x), b.max.y),
    }
}

fn along(target: i32, start: i32, end: i32) -> i32 {
    let (lo, hi) = if end - start >= 3 {
        (start + 1, end - 2)
    } else {
        (start, end - 1)
    };
    target.clamp(lo, hi)
}

/// Candidate doors of `from` toward `to`, primary first, with the side each sits on.
pub fn candidate_doors(from: &Room, to: &Room) -> Vec<(Direction, Coordinate)> {
    let toward = to.center();
    facing_sides(from, to)
        .into_iter()
        .map(|side| (side, door_cell(from, side, toward)))
        .collect()
}
