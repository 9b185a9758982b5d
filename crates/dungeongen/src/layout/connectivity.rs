//! Connection graph over placed rooms.
//!
//! Candidates come from the Delaunay triangulation of room centers. Kruskal's
//! algorithm picks a minimum spanning tree from them, then a few of the
//! shortest leftover candidates are added back as loops.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use super::model::{Connection, ConnectionType, Room, compare_room_ids};
use super::triangulation::delaunay_edges;

/// Tuning for the extra loop edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectivityConfig {
    /// Extra edges as a fraction of the spanning tree size, `round((n-1) * loop_ratio)`.
    pub loop_ratio: f64,
    /// Longest center distance an extra edge may span.
    pub max_loop_distance: f64,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            loop_ratio: 0.1,
            max_loop_distance: 25.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    a: usize,
    b: usize,
    dist_sq: i64,
}

/// Build a connected, loop-sparse graph over `rooms`.
///
/// Every connection stores the lower id (by [`compare_room_ids`]) as
/// `room_a_id`. Spanning tree edges are doors, extra edges are passages.
/// Output depends only on the rooms and their order.
pub fn connect(rooms: &[Room], config: &ConnectivityConfig) -> Vec<Connection> {
    match rooms.len() {
        0 | 1 => return Vec::new(),
        2 => return vec![make_connection(rooms, 0, 1, ConnectionType::Door)],
        _ => {}
    }

    let mut candidates = candidate_edges(rooms);
    candidates.sort_by(|x, y| {
        x.dist_sq
            .cmp(&y.dist_sq)
            .then_with(|| compare_pairs(pair_key(rooms, x), pair_key(rooms, y)))
    });

    let mut sets = UnionFind::<usize>::new(rooms.len());
    let mut connections = Vec::with_capacity(rooms.len());
    let mut leftover = Vec::new();
    for c in candidates {
        if sets.union(c.a, c.b) {
            connections.push(make_connection(rooms, c.a, c.b, ConnectionType::Door));
        } else {
            leftover.push(c);
        }
    }

    let extra = ((rooms.len() - 1) as f64 * config.loop_ratio.max(0.0)).round() as usize;
    let max_sq = config.max_loop_distance.max(0.0).powi(2);
    connections.extend(
        leftover
            .into_iter()
            .filter(|c| c.dist_sq as f64 <= max_sq)
            .take(extra)
            .map(|c| make_connection(rooms, c.a, c.b, ConnectionType::Passage)),
    );

    debug_assert!(
        is_connected(rooms, &connections),
        "spanning tree left rooms unreachable"
    );
    tracing::debug!(
        rooms = rooms.len(),
        connections = connections.len(),
        "connectivity built"
    );
    connections
}

/// Whether every room is reachable from every other through `connections`.
///
/// Connections that reference unknown rooms are ignored. An empty room set counts
/// as connected.
pub fn is_connected(rooms: &[Room], connections: &[Connection]) -> bool {
    if rooms.len() <= 1 {
        return true;
    }
    let index: HashMap<&str, usize> = rooms
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.as_str(), i))
        .collect();
    let mut sets = UnionFind::<usize>::new(rooms.len());
    let mut components = rooms.len();
    for conn in connections {
        let (Some(&a), Some(&b)) = (
            index.get(conn.room_a_id.as_str()),
            index.get(conn.room_b_id.as_str()),
        ) else {
            continue;
        };
        if sets.union(a, b) {
            components -= 1;
        }
    }
    components == 1
}

/// Delaunay edges, or the complete graph when the triangulation does not span.
fn candidate_edges(rooms: &[Room]) -> Vec<Candidate> {
    let centers: Vec<(f64, f64)> = rooms
        .iter()
        .map(|r| {
            let c = r.center();
            (c.x as f64, c.y as f64)
        })
        .collect();

    let mut pairs: BTreeSet<(usize, usize)> = delaunay_edges(&centers).into_iter().collect();

    let mut sets = UnionFind::<usize>::new(rooms.len());
    let joined = pairs.iter().filter(|&&(a, b)| sets.union(a, b)).count();
    if joined + 1 < rooms.len() {
        tracing::debug!(
            rooms = rooms.len(),
            "triangulation does not span the rooms, using all pairs"
        );
        pairs = (0..rooms.len())
            .flat_map(|a| (a + 1..rooms.len()).map(move |b| (a, b)))
            .collect();
    }

    pairs
        .into_iter()
        .map(|(a, b)| Candidate {
            a,
            b,
            dist_sq: rooms[a].center().distance_sq(rooms[b].center()),
        })
        .collect()
}

fn pair_key<'a>(rooms: &'a [Room], c: &Candidate) -> (&'a str, &'a str) {
    let a = rooms[c.a].id.as_str();
    let b = rooms[c.b].id.as_str();
    if compare_room_ids(a, b).is_le() { (a, b) } else { (b, a) }
}

fn compare_pairs(x: (&str, &str), y: (&str, &str)) -> Ordering {
    compare_room_ids(x.0, y.0).then_with(|| compare_room_ids(x.1, y.1))
}

fn make_connection(rooms: &[Room], a: usize, b: usize, kind: ConnectionType) -> Connection {
    let (lo, hi) = if compare_room_ids(&rooms[a].id, &rooms[b].id).is_le() {
        (&rooms[a], &rooms[b])
    } else {
        (&rooms[b], &rooms[a])
    };
    Connection::new(lo.id.clone(), hi.id.clone(), kind)
}
