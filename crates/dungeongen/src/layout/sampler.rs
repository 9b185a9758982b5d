use std::collections::BTreeMap;
use std::f64::consts::TAU;

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

use super::geometry::{Bounds, Coordinate};
use super::model::{Room, SizeCategory};
use super::spatial::SpatialIndex;

/// Tuning for room placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Cells every room keeps clear around itself. Two rooms' bounds, each
    /// grown by this amount, never intersect.
    pub min_separation: i32,
    /// Initial distance from an existing room center when proposing a candidate.
    pub search_radius: f64,
    /// Added to the search radius after every failed attempt.
    pub radius_growth: f64,
    /// Candidates tried per size band before shrinking.
    pub attempts_per_band: u32,
    /// How many times a slot may drop to a smaller band before sampling stops.
    pub max_shrinks: u32,
    /// Cell size of the rejection-test buckets.
    pub bucket_size: i32,
    /// Most rooms a single run will try to place. Larger requests are
    /// reported as a shortfall.
    pub max_rooms: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_separation: 1,
            search_radius: 10.0,
            radius_growth: 1.5,
            attempts_per_band: 30,
            max_shrinks: 2,
            bucket_size: 8,
            max_rooms: 200,
        }
    }
}

/// Inclusive width and height ranges for one size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeBand {
    pub min_width: i32,
    pub max_width: i32,
    pub min_height: i32,
    pub max_height: i32,
}

impl SizeBand {
    pub fn for_category(category: SizeCategory) -> Self {
        let (min_width, max_width, min_height, max_height) = match category {
            SizeCategory::Tiny => (3, 4, 3, 4),
            SizeCategory::Small => (4, 7, 3, 5),
            SizeCategory::Medium => (6, 10, 4, 7),
            SizeCategory::Large => (8, 15, 5, 9),
            SizeCategory::Huge => (12, 25, 6, 12),
        };
        Self {
            min_width,
            max_width,
            min_height,
            max_height,
        }
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> (i32, i32) {
        (
            rng.gen_range(self.min_width..=self.max_width),
            rng.gen_range(self.min_height..=self.max_height),
        )
    }
}

/// Relative weights of room size categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeDistribution(pub BTreeMap<SizeCategory, f64>);

impl Default for SizeDistribution {
    fn default() -> Self {
        Self(BTreeMap::from([
            (SizeCategory::Tiny, 0.1),
            (SizeCategory::Small, 0.35),
            (SizeCategory::Medium, 0.45),
            (SizeCategory::Large, 0.15),
            (SizeCategory::Huge, 0.05),
        ]))
    }
}

impl SizeDistribution {
    /// Every slot draws the same category.
    pub fn only(category: SizeCategory) -> Self {
        Self(BTreeMap::from([(category, 1.0)]))
    }

    /// Draw a category. Degenerate weights (empty, negative, all zero) fall back to medium.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SizeCategory {
        let (categories, weights): (Vec<SizeCategory>, Vec<f64>) = self
            .0
            .iter()
            .filter(|(_, w)| w.is_finite() && **w > 0.0)
            .map(|(c, w)| (*c, *w))
            .unzip();
        match WeightedIndex::new(&weights) {
            Ok(dist) => categories[dist.sample(rng)],
            Err(_) => SizeCategory::Medium,
        }
    }
}

/// Result of a sampling run. Fewer rooms than requested is a valid outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub rooms: Vec<Room>,
    pub requested: usize,
}

impl Placement {
    pub fn shortfall(&self) -> usize {
        self.requested.saturating_sub(self.rooms.len())
    }
}

/// Places non-overlapping rectangular rooms by disc sampling with rejection.
#[derive(Debug, Clone, Default)]
pub struct RoomSampler {
    config: SamplerConfig,
}

impl RoomSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Place up to `target` rooms, optionally confined to `area_hint`.
    ///
    /// Each slot draws a size category, then proposes candidates around a random
    /// already-placed room with a search radius that grows per attempt. A slot
    /// that keeps failing shrinks to the next smaller band; once the shrink
    /// budget is spent, sampling stops and returns the rooms placed so far.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        target: usize,
        distribution: &SizeDistribution,
        area_hint: Option<Bounds>,
        rng: &mut R,
    ) -> Placement {
        let sep = self.config.min_separation.max(0);
        let limit = self.limit(target);
        let mut index = SpatialIndex::new(self.config.bucket_size);
        let mut rooms: Vec<Room> = Vec::with_capacity(limit);

        while rooms.len() < limit {
            let category = distribution.sample(rng);
            match self.place_slot(category, &rooms, &index, area_hint, rng) {
                Some(bounds) => {
                    index.insert(bounds.expand(sep));
                    rooms.push(new_room(rooms.len() + 1, bounds));
                }
                None => {
                    tracing::warn!(
                        placed = rooms.len(),
                        requested = target,
                        "room placement exhausted its attempt budget"
                    );
                    break;
                }
            }
        }

        tracing::debug!(placed = rooms.len(), requested = target, "rooms sampled");
        Placement {
            rooms,
            requested: target,
        }
    }

    /// Place `target` rooms left to right on one row, vertically centered on y = 0.
    ///
    /// Gaps are `2 * min_separation + 1` cells so the separation invariant holds
    /// and every pair of neighbours keeps a free column between them.
    pub fn sample_line<R: Rng + ?Sized>(
        &self,
        target: usize,
        distribution: &SizeDistribution,
        rng: &mut R,
    ) -> Placement {
        let gap = 2 * self.config.min_separation.max(0) + 1;
        let limit = self.limit(target);
        let mut rooms = Vec::with_capacity(limit);
        let mut x = 0;
        for n in 1..=limit {
            let (w, h) = SizeBand::for_category(distribution.sample(rng)).sample(rng);
            let bounds = Bounds::from_anchor(Coordinate::new(x, -h / 2), w, h);
            rooms.push(new_room(n, bounds));
            x += w + gap;
        }
        Placement {
            rooms,
            requested: target,
        }
    }

    fn limit(&self, target: usize) -> usize {
        if target > self.config.max_rooms {
            tracing::warn!(
                requested = target,
                max_rooms = self.config.max_rooms,
                "room count exceeds the per-run limit"
            );
        }
        target.min(self.config.max_rooms)
    }

    fn place_slot<R: Rng + ?Sized>(
        &self,
        category: SizeCategory,
        rooms: &[Room],
        index: &SpatialIndex,
        area_hint: Option<Bounds>,
        rng: &mut R,
    ) -> Option<Bounds> {
        let sep = self.config.min_separation.max(0);
        let mut band = Some(category);
        let mut shrinks = 0;

        while let Some(current) = band {
            let size = SizeBand::for_category(current);
            for attempt in 0..self.config.attempts_per_band {
                let (w, h) = size.sample(rng);
                let anchor = self.propose_anchor(w, h, attempt, rooms, area_hint, rng);
                let candidate = Bounds::from_anchor(anchor, w, h);

                if area_hint.is_some_and(|area| !area.contains_bounds(&candidate)) {
                    continue;
                }
                if !index.intersects_any(&candidate.expand(sep)) {
                    return Some(candidate);
                }
            }

            if shrinks >= self.config.max_shrinks {
                break;
            }
            shrinks += 1;
            band = current.smaller();
            tracing::trace!(from = %current, to = ?band, "shrinking size band");
        }

        None
    }

    fn propose_anchor<R: Rng + ?Sized>(
        &self,
        width: i32,
        height: i32,
        attempt: u32,
        rooms: &[Room],
        area_hint: Option<Bounds>,
        rng: &mut R,
    ) -> Coordinate {
        let origin = if rooms.is_empty() {
            area_hint.map_or(Coordinate::ORIGIN, |area| area.center())
        } else {
            rooms[rng.gen_range(0..rooms.len())].center()
        };

        let center = if rooms.is_empty() && attempt == 0 {
            origin
        } else {
            let radius = self.config.search_radius.max(0.0)
                + attempt as f64 * self.config.radius_growth.max(0.0);
            let angle = rng.gen_range(0.0..=TAU);
            let distance = rng.gen_range(radius * 0.5..=radius);
            origin.offset(
                (distance * angle.cos()).round() as i32,
                (distance * angle.sin()).round() as i32,
            )
        };

        center.offset(-width / 2, -height / 2)
    }
}

/// Translate rooms so the center of their bounding box sits on the origin.
pub fn center_on_origin(rooms: &[Room]) -> Vec<Room> {
    let bounds: Vec<Bounds> = rooms.iter().map(Room::bounds).collect();
    let Some(all) = Bounds::enclosing(bounds.iter()) else {
        return Vec::new();
    };
    let dx = -(all.min.x + all.max.x).div_euclid(2);
    let dy = -(all.min.y + all.max.y).div_euclid(2);
    if dx == 0 && dy == 0 {
        return rooms.to_vec();
    }
    rooms.iter().map(|r| r.translated(dx, dy)).collect()
}

fn new_room(n: usize, bounds: Bounds) -> Room {
    Room::new(format!("room_{n}"), bounds.min, bounds.width(), bounds.height())
        .with_name(format!("Room {n}"))
}
