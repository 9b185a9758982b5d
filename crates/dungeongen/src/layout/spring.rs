//! Spring relaxation of room positions toward ideal corridor lengths.
//!
//! Every connection acts as a spring between two room centers. Its rest length
//! is a base length for the connection kind plus half of each room's extent.
//! Rooms move one at a time under the damped spring forces, and a move that
//! would bring a room within `min_separation` of another is refused, so the
//! relaxed layout keeps every placement invariant of the input.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::geometry::Coordinate;
use super::model::{Connection, ConnectionType, Room};

/// Tuning for the relaxation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub enabled: bool,
    /// Spring stiffness.
    pub spring_constant: f64,
    /// Velocity multiplier applied every iteration.
    pub damping: f64,
    pub time_step: f64,
    /// Farthest a room may travel in one iteration, in cells.
    pub max_step: f64,
    pub max_iterations: u32,
    /// The run stops once no room moves farther than this in one iteration.
    pub convergence_threshold: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spring_constant: 0.8,
            damping: 0.9,
            time_step: 0.5,
            max_step: 1.0,
            max_iterations: 150,
            convergence_threshold: 0.1,
        }
    }
}

/// Outcome of [`relax`]: the moved rooms plus run statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct Relaxation {
    pub rooms: Vec<Room>,
    pub iterations: u32,
    pub converged: bool,
    /// Rooms whose anchor changed.
    pub moved: usize,
}

impl Relaxation {
    pub fn unchanged(rooms: &[Room]) -> Self {
        Self {
            rooms: rooms.to_vec(),
            iterations: 0,
            converged: true,
            moved: 0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Spring {
    a: usize,
    b: usize,
    rest: f64,
}

/// Center distance two rooms would like between them for a connection kind.
pub fn rest_length(kind: ConnectionType, a: &Room, b: &Room) -> f64 {
    let base = match kind {
        ConnectionType::Passage => 3.0,
        ConnectionType::Door => 5.0,
        ConnectionType::Secret => 20.0,
    };
    (base + half_extent(a) + half_extent(b)).ceil()
}

fn half_extent(room: &Room) -> f64 {
    (room.width + room.height) as f64 / 2.0
}

fn exact_center(room: &Room) -> (f64, f64) {
    (
        room.anchor.x as f64 + room.width as f64 / 2.0,
        room.anchor.y as f64 + room.height as f64 / 2.0,
    )
}

/// Pull connected rooms toward their rest lengths without breaking separation.
///
/// Rooms keep their ids, sizes and order. Connections naming unknown rooms are
/// ignored. The run is deterministic for the same input.
pub fn relax(
    rooms: &[Room],
    connections: &[Connection],
    min_separation: i32,
    config: &SpringConfig,
) -> Relaxation {
    if !config.enabled || rooms.len() < 2 || connections.is_empty() {
        return Relaxation::unchanged(rooms);
    }

    let index: HashMap<&str, usize> = rooms
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.as_str(), i))
        .collect();
    let springs: Vec<Spring> = connections
        .iter()
        .filter_map(|c| {
            let a = *index.get(c.room_a_id.as_str())?;
            let b = *index.get(c.room_b_id.as_str())?;
            (a != b).then(|| Spring {
                a,
                b,
                rest: rest_length(c.connection_type, &rooms[a], &rooms[b]),
            })
        })
        .collect();

    let sep = min_separation.max(0);
    let dt = config.time_step.max(0.0);
    let mut placed = rooms.to_vec();
    let mut positions: Vec<(f64, f64)> = rooms.iter().map(exact_center).collect();
    let mut velocities = vec![(0.0, 0.0); rooms.len()];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;
        let forces = spring_forces(&positions, &springs, config.spring_constant);
        let mut largest_step: f64 = 0.0;

        for i in 0..placed.len() {
            let (vx, vy) = velocities[i];
            let (fx, fy) = forces[i];
            let mut v = (
                (vx + fx * dt) * config.damping,
                (vy + fy * dt) * config.damping,
            );
            let travel = v.0.hypot(v.1) * dt;
            if travel > config.max_step {
                let scale = config.max_step.max(0.0) / travel;
                v = (v.0 * scale, v.1 * scale);
            }
            let (px, py) = positions[i];
            let next = (px + v.0 * dt, py + v.1 * dt);

            let anchor = Coordinate::new(
                (next.0 - placed[i].width as f64 / 2.0).round() as i32,
                (next.1 - placed[i].height as f64 / 2.0).round() as i32,
            );
            let current = placed[i].anchor;
            if anchor != current {
                let candidate = placed[i].translated(anchor.x - current.x, anchor.y - current.y);
                if !keeps_clear(&candidate, i, &placed, sep) {
                    velocities[i] = (0.0, 0.0);
                    continue;
                }
                placed[i] = candidate;
            }

            largest_step = largest_step.max((next.0 - px).hypot(next.1 - py));
            positions[i] = next;
            velocities[i] = v;
        }

        if largest_step < config.convergence_threshold {
            converged = true;
            break;
        }
    }

    let moved = placed
        .iter()
        .zip(rooms)
        .filter(|(after, before)| after.anchor != before.anchor)
        .count();
    tracing::debug!(iterations, converged, moved, "spring relaxation done");

    Relaxation {
        rooms: placed,
        iterations,
        converged,
        moved,
    }
}

fn spring_forces(positions: &[(f64, f64)], springs: &[Spring], k: f64) -> Vec<(f64, f64)> {
    let mut forces = vec![(0.0, 0.0); positions.len()];
    for s in springs {
        let (ax, ay) = positions[s.a];
        let (bx, by) = positions[s.b];
        let (dx, dy) = (bx - ax, by - ay);
        let dist = dx.hypot(dy);
        if dist < f64::EPSILON {
            continue;
        }
        let magnitude = k * (dist - s.rest);
        let (ux, uy) = (dx / dist * magnitude, dy / dist * magnitude);
        forces[s.a].0 += ux;
        forces[s.a].1 += uy;
        forces[s.b].0 -= ux;
        forces[s.b].1 -= uy;
    }
    forces
}

fn keeps_clear(candidate: &Room, skip: usize, rooms: &[Room], sep: i32) -> bool {
    let grown = candidate.bounds().expand(sep);
    rooms
        .iter()
        .enumerate()
        .all(|(j, other)| j == skip || !grown.intersects(&other.bounds().expand(sep)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityGrade {
    Good,
    Poor,
}

/// Layout quality measured over room centers and connection segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutQuality {
    /// Sum of `0.5 * k * (distance - rest)^2` over connections.
    pub total_spring_energy: f64,
    pub average_spring_energy: f64,
    /// Pairs of rooms whose bounds overlap.
    pub total_collisions: usize,
    /// Share of room pairs at least their comfortable spacing apart.
    pub room_spacing_score: f64,
    /// Pairs of connection segments that cross away from a shared room.
    pub total_crossings: usize,
    pub planarity_score: f64,
    pub layout_quality: QualityGrade,
}

/// Score a layout. Returns `None` when there is nothing to measure.
pub fn measure(
    rooms: &[Room],
    connections: &[Connection],
    config: &SpringConfig,
) -> Option<LayoutQuality> {
    if rooms.is_empty() || connections.is_empty() {
        return None;
    }
    let by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    let segments: Vec<(&str, &str, Coordinate, Coordinate)> = connections
        .iter()
        .filter_map(|c| {
            let a = by_id.get(c.room_a_id.as_str())?;
            let b = by_id.get(c.room_b_id.as_str())?;
            Some((a.id.as_str(), b.id.as_str(), a.center(), b.center()))
        })
        .collect();

    let total_spring_energy: f64 = connections
        .iter()
        .filter_map(|c| {
            let a = by_id.get(c.room_a_id.as_str())?;
            let b = by_id.get(c.room_b_id.as_str())?;
            let rest = rest_length(c.connection_type, a, b);
            let stretch = a.center().distance_to(b.center()) - rest;
            Some(0.5 * config.spring_constant * stretch * stretch)
        })
        .sum();
    let average_spring_energy = if segments.is_empty() {
        0.0
    } else {
        total_spring_energy / segments.len() as f64
    };

    let mut total_collisions = 0;
    let mut comfortable = 0usize;
    let mut pairs = 0usize;
    for (i, a) in rooms.iter().enumerate() {
        for b in &rooms[i + 1..] {
            pairs += 1;
            if a.bounds().intersects(&b.bounds()) {
                total_collisions += 1;
            }
            let spacing =
                (a.width.max(a.height) + b.width.max(b.height)) as f64 / 2.0 + 2.0;
            if a.center().distance_to(b.center()) >= spacing {
                comfortable += 1;
            }
        }
    }
    let room_spacing_score = if pairs == 0 {
        1.0
    } else {
        comfortable as f64 / pairs as f64
    };

    let mut total_crossings = 0;
    for (i, s) in segments.iter().enumerate() {
        for t in &segments[i + 1..] {
            let shares_room = s.0 == t.0 || s.0 == t.1 || s.1 == t.0 || s.1 == t.1;
            if !shares_room && segments_cross(s.2, s.3, t.2, t.3) {
                total_crossings += 1;
            }
        }
    }
    let planarity_score = if segments.is_empty() {
        1.0
    } else {
        (1.0 - total_crossings as f64 / segments.len() as f64).max(0.0)
    };

    let good = total_collisions == 0
        && total_spring_energy < 100.0
        && room_spacing_score > 0.7
        && planarity_score > 0.8;

    Some(LayoutQuality {
        total_spring_energy,
        average_spring_energy,
        total_collisions,
        room_spacing_score,
        total_crossings,
        planarity_score,
        layout_quality: if good {
            QualityGrade::Good
        } else {
            QualityGrade::Poor
        },
    })
}

fn orientation(a: Coordinate, b: Coordinate, c: Coordinate) -> i64 {
    let cross = (b.x - a.x) as i64 * (c.y - a.y) as i64
        - (b.y - a.y) as i64 * (c.x - a.x) as i64;
    cross.signum()
}

/// Proper crossing: the segments intersect at a single interior point.
fn segments_cross(p1: Coordinate, p2: Coordinate, q1: Coordinate, q2: Coordinate) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    d1 * d2 < 0 && d3 * d4 < 0
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn rest_length_grows_with_room_size() {
        let small = Room::new("a", Coordinate::new(0, 0), 4, 4);
        let large = Room::new("b", Coordinate::new(0, 0), 10, 8);
        assert_eq!(rest_length(ConnectionType::Door, &small, &small), 13.0);
        assert_eq!(rest_length(ConnectionType::Passage, &small, &large), 16.0);
        assert!(
            rest_length(ConnectionType::Secret, &small, &small)
                > rest_length(ConnectionType::Door, &small, &small)
        );
    }

    #[test]
    fn crossing_segments() {
        let c = Coordinate::new;
        assert!(segments_cross(c(0, 0), c(4, 4), c(0, 4), c(4, 0)));
        assert!(!segments_cross(c(0, 0), c(4, 0), c(0, 2), c(4, 2)));
        // Touching at an endpoint is not a crossing.
        assert!(!segments_cross(c(0, 0), c(2, 2), c(2, 2), c(4, 0)));
    }
}
