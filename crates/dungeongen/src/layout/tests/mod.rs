mod sampler;
mod scenarios;
mod spring;

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::geometry::Coordinate;
use super::model::Room;

/// Helper to create a room anchored at `(x, y)`.
fn room(id: &str, x: i32, y: i32, w: i32, h: i32) -> Room {
    Room::new(id, Coordinate::new(x, y), w, h)
}

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Assert that no two rooms come within `sep` cells of each other.
fn assert_separated(rooms: &[Room], sep: i32) {
    for (i, a) in rooms.iter().enumerate() {
        for b in &rooms[i + 1..] {
            assert!(
                !a.bounds().expand(sep).intersects(&b.bounds().expand(sep)),
                "{} at {} and {} at {} are closer than {sep}",
                a.id,
                a.anchor,
                b.id,
                b.anchor
            );
        }
    }
}
