use std::collections::HashMap;

use crate::layout::geometry::{Bounds, Coordinate, Direction};
use crate::layout::model::Room;

/// The search grid built from room bounds.
///
/// Every room cell is an obstacle tagged with its room index. The walkable
/// area is the bounding box of all rooms grown by the routing padding.
#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    bounds: Bounds,
    blocked: HashMap<Coordinate, usize>,
}

impl ObstacleGrid {
    /// Build a grid around `rooms`. `padding` is clamped to at least one cell
    /// so door cells on the outer walls stay inside the grid.
    pub fn build(rooms: &[Room], padding: i32) -> Self {
        let padding = padding.max(1);
        let all: Vec<Bounds> = rooms.iter().map(Room::bounds).collect();
        let bounds = Bounds::enclosing(all.iter())
            .map(|b| b.expand(padding))
            .unwrap_or(Bounds::new(Coordinate::ORIGIN, Coordinate::ORIGIN));

        let mut blocked = HashMap::new();
        for (idx, room) in all.iter().enumerate() {
            for y in room.min.y..room.max.y {
                for x in room.min.x..room.max.x {
                    blocked.entry(Coordinate::new(x, y)).or_insert(idx);
                }
            }
        }

        Self { bounds, blocked }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Check if a coordinate is within the grid.
    pub fn contains(&self, c: Coordinate) -> bool {
        self.bounds.contains(c)
    }

    /// Check if a cell belongs to a room.
    pub fn is_blocked(&self, c: Coordinate) -> bool {
        self.blocked.contains_key(&c)
    }

    /// Index of the room covering a cell.
    pub fn room_at(&self, c: Coordinate) -> Option<usize> {
        self.blocked.get(&c).copied()
    }

    /// Walkable 4-neighbours of a cell with the direction of travel.
    pub fn neighbors(&self, c: Coordinate) -> impl Iterator<Item = (Coordinate, Direction)> + '_ {
        Direction::ALL
            .into_iter()
            .map(move |dir| (c.step(dir), dir))
            .filter(move |&(n, _)| self.contains(n) && !self.is_blocked(n))
    }
}
