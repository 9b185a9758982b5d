use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::layout::geometry::Coordinate;
use crate::layout::model::CorridorPath;

/// Configuration for the corridor router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Free cells around the room bounding box that corridors may use.
    pub padding: i32,
    /// Longest straight run accepted without a search.
    pub straight_max_length: u32,
    /// Extra cost per direction change.
    pub turn_cost: u32,
    /// Extra cost per cell already used by an earlier corridor.
    pub crowding_cost: u32,
    /// Search nodes popped per candidate door pair before giving up.
    pub max_expansions: usize,
    /// Corridors this short or shorter are narrow passages.
    pub narrow_max_length: u32,
    /// Corridors this long or longer are wide corridors.
    pub wide_min_length: u32,
    /// Straight corridors this long or longer are grand hallways.
    pub grand_min_length: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            padding: 3,
            straight_max_length: 16,
            turn_cost: 1,
            crowding_cost: 2,
            max_expansions: 20_000,
            narrow_max_length: 3,
            wide_min_length: 14,
            grand_min_length: 8,
        }
    }
}

/// How a corridor path was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Direct run between aligned doors.
    Straight,
    /// Found by search around obstacles.
    Routed,
    /// Direct line drawn after the search failed; may cross rooms.
    Fallback,
}

/// Complexity metrics for a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RouteComplexity {
    /// Steps from the first point to the last.
    pub length: u32,
    /// Horizontal/vertical direction changes.
    pub turns: u32,
    /// Cells shared with earlier corridors.
    pub crowded: u32,
}

impl RouteComplexity {
    /// Weighted search cost: length + turns * turn_cost + crowded * crowding_cost.
    pub fn cost(&self, config: &RoutingConfig) -> u32 {
        self.length + self.turns * config.turn_cost + self.crowded * config.crowding_cost
    }
}

/// A routed cell path with its metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub points: Vec<Coordinate>,
    pub complexity: RouteComplexity,
    pub kind: RouteKind,
}

impl Route {
    /// Order by cost, then length, turns and crowding, then by point sequence.
    ///
    /// This is a total order, so choosing the minimum is deterministic
    /// regardless of the order candidates were produced in.
    pub fn compare(&self, other: &Route, config: &RoutingConfig) -> Ordering {
        self.complexity
            .cost(config)
            .cmp(&other.complexity.cost(config))
            .then(self.complexity.length.cmp(&other.complexity.length))
            .then(self.complexity.turns.cmp(&other.complexity.turns))
            .then(self.complexity.crowded.cmp(&other.complexity.crowded))
            .then_with(|| self.points.cmp(&other.points))
    }

    /// Whether every point shares one row or one column.
    pub fn is_straight(&self) -> bool {
        is_straight(&self.points)
    }
}

pub fn is_straight(points: &[Coordinate]) -> bool {
    match points.first() {
        None => true,
        Some(first) => {
            points.iter().all(|p| p.y == first.y) || points.iter().all(|p| p.x == first.x)
        }
    }
}

/// Per-corridor routing diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteReport {
    pub connection_id: String,
    pub kind: RouteKind,
    pub complexity: RouteComplexity,
    /// Whether the path passes through a room other than its endpoints.
    pub crosses_rooms: bool,
}

/// Output of routing all connections in a layout.
#[derive(Debug, Clone, Default)]
pub struct RoutingOutput {
    /// One corridor per routable connection, in connection order.
    pub corridors: Vec<CorridorPath>,
    /// Diagnostics parallel to `corridors`.
    pub reports: Vec<RouteReport>,
    /// Connections that reference an unknown room and got no corridor.
    pub skipped: Vec<String>,
}

impl RoutingOutput {
    pub fn fallback_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.kind == RouteKind::Fallback)
            .count()
    }
}
