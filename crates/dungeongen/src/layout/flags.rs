//! Role and content flags for placed rooms.
//!
//! Roles are structural: the entrance sits on the left edge of the map among
//! the best connected rooms, the boss room is large and far from it, and the
//! treasure vault is the most remote dead end. Content flags are then drawn
//! per room with role-specific odds.

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::model::{Connection, Room, RoomFlags, compare_room_ids};

/// Probability that a regular room gets each kind of content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContentOdds {
    pub traps: f64,
    pub treasure: f64,
    pub monsters: f64,
}

impl Default for ContentOdds {
    fn default() -> Self {
        Self {
            traps: 0.15,
            treasure: 0.20,
            monsters: 0.45,
        }
    }
}

/// Ids of the rooms holding each structural role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles {
    pub entrance: Option<String>,
    pub boss: Option<String>,
    pub treasure_vault: Option<String>,
}

const ENTRANCE_EDGE_SLACK: i32 = 5;
const BOSS_MIN_AREA: i64 = 20;

/// Pick entrance, boss room and treasure vault.
pub fn pick_roles(rooms: &[Room], connections: &[Connection]) -> Roles {
    if rooms.is_empty() {
        return Roles::default();
    }
    let degree = degrees(rooms, connections);

    let mut ranked: Vec<&Room> = rooms.iter().collect();
    ranked.sort_by(|a, b| {
        degree[b.id.as_str()]
            .cmp(&degree[a.id.as_str()])
            .then_with(|| compare_room_ids(&a.id, &b.id))
    });
    let leftmost = rooms.iter().map(|r| r.center().x).min().unwrap_or(0);
    let entrance = ranked
        .iter()
        .take(3)
        .find(|r| r.center().x - leftmost <= ENTRANCE_EDGE_SLACK)
        .unwrap_or(&ranked[0]);

    let others: Vec<&Room> = if rooms.len() > 1 {
        rooms.iter().filter(|r| r.id != entrance.id).collect()
    } else {
        rooms.iter().collect()
    };
    let large: Vec<&Room> = others
        .iter()
        .copied()
        .filter(|r| r.area() >= BOSS_MIN_AREA)
        .collect();
    let pool = if large.is_empty() { others } else { large };
    let boss = best_by(&pool, |r| boss_score(r, entrance));

    let dead_ends: Vec<&Room> = rooms
        .iter()
        .filter(|r| degree[r.id.as_str()] == 1)
        .filter(|r| r.id != entrance.id && boss.is_none_or(|b| b.id != r.id))
        .collect();
    let vault = best_by(&dead_ends, |r| {
        r.center().distance_sq(entrance.center()) as f64
    });

    Roles {
        entrance: Some(entrance.id.clone()),
        boss: boss.map(|r| r.id.clone()),
        treasure_vault: vault.map(|r| r.id.clone()),
    }
}

/// Rooms with roles and content flags assigned. Rooms are replaced, never mutated.
pub fn assign_room_flags<R: Rng + ?Sized>(
    rooms: &[Room],
    connections: &[Connection],
    odds: &ContentOdds,
    rng: &mut R,
) -> Vec<Room> {
    let roles = pick_roles(rooms, connections);
    let is = |role: &Option<String>, room: &Room| role.as_deref() == Some(room.id.as_str());

    rooms
        .iter()
        .map(|room| {
            let mut flags = RoomFlags {
                is_entrance: is(&roles.entrance, room),
                is_boss_room: is(&roles.boss, room),
                is_treasure_vault: is(&roles.treasure_vault, room),
                ..RoomFlags::default()
            };
            if flags.is_boss_room {
                flags.has_monsters = true;
                flags.has_treasure = chance(rng, 0.7);
                flags.has_traps = chance(rng, 0.3);
            } else if flags.is_entrance {
                flags.has_monsters = chance(rng, 0.1);
                flags.has_traps = chance(rng, 0.4);
            } else {
                flags.has_traps = chance(rng, odds.traps);
                flags.has_treasure = flags.is_treasure_vault || chance(rng, odds.treasure);
                flags.has_monsters = chance(rng, odds.monsters);
            }
            room.clone().with_flags(flags)
        })
        .collect()
}

fn chance<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    let p = if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 };
    rng.gen_bool(p)
}

fn degrees<'a>(rooms: &'a [Room], connections: &[Connection]) -> HashMap<&'a str, usize> {
    let mut degree: HashMap<&str, usize> = rooms.iter().map(|r| (r.id.as_str(), 0)).collect();
    for conn in connections {
        for id in [&conn.room_a_id, &conn.room_b_id] {
            if let Some(d) = degree.get_mut(id.as_str()) {
                *d += 1;
            }
        }
    }
    degree
}

/// `0.6 * closeness-to-far + 0.4 * size`, both in `[0, 1]`.
fn boss_score(room: &Room, entrance: &Room) -> f64 {
    let distance = room.center().distance_to(entrance.center());
    let far = (distance / 50.0).min(1.0);
    let lo = (BOSS_MIN_AREA as f64).ln();
    let hi = 144f64.ln();
    let size = (((room.area() as f64).ln() - lo) / (hi - lo)).clamp(0.0, 1.0);
    0.6 * far + 0.4 * size
}

/// Highest score wins; ties go to the lower id.
fn best_by<'a>(rooms: &[&'a Room], score: impl Fn(&Room) -> f64) -> Option<&'a Room> {
    rooms.iter().copied().fold(None, |best, r| match best {
        None => Some(r),
        Some(b) => {
            let (sr, sb) = (score(r), score(b));
            if sr > sb || (sr == sb && compare_room_ids(&r.id, &b.id).is_lt()) {
                Some(r)
            } else {
                Some(b)
            }
        }
    })
}
