//! Grid-bucket index over placed rectangles.
//!
//! Each rectangle is registered in every bucket it overlaps, so a candidate only
//! has to be tested against the rectangles sharing one of its buckets instead of
//! against every accepted room.

use std::collections::{BTreeSet, HashMap};

use super::geometry::Bounds;

#[derive(Debug, Clone)]
pub struct SpatialIndex {
    bucket_size: i32,
    buckets: HashMap<(i32, i32), Vec<usize>>,
    items: Vec<Bounds>,
}

impl SpatialIndex {
    /// `bucket_size` is clamped to at least one cell.
    pub fn new(bucket_size: i32) -> Self {
        Self {
            bucket_size: bucket_size.max(1),
            buckets: HashMap::new(),
            items: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Register a rectangle and return its index.
    pub fn insert(&mut self, bounds: Bounds) -> usize {
        let idx = self.items.len();
        self.items.push(bounds);
        for key in self.bucket_keys(&bounds) {
            self.buckets.entry(key).or_default().push(idx);
        }
        idx
    }

    /// Whether any registered rectangle intersects `bounds`.
    pub fn intersects_any(&self, bounds: &Bounds) -> bool {
        self.bucket_keys(bounds).into_iter().any(|key| {
            self.buckets.get(&key).is_some_and(|ids| {
                ids.iter().any(|&i| self.items[i].intersects(bounds))
            })
        })
    }

    /// Indices of registered rectangles intersecting `bounds`, ascending.
    pub fn query(&self, bounds: &Bounds) -> Vec<usize> {
        let mut hits = BTreeSet::new();
        for key in self.bucket_keys(bounds) {
            if let Some(ids) = self.buckets.get(&key) {
                hits.extend(ids.iter().copied().filter(|&i| self.items[i].intersects(bounds)));
            }
        }
        hits.into_iter().collect()
    }

    fn bucket_of(&self, v: i32) -> i32 {
        v.div_euclid(self.bucket_size)
    }

    fn bucket_keys(&self, bounds: &Bounds) -> Vec<(i32, i32)> {
        let bx0 = self.bucket_of(bounds.min.x);
        let by0 = self.bucket_of(bounds.min.y);
        // max is exclusive; an empty rect still maps to its anchor bucket.
        let bx1 = self.bucket_of((bounds.max.x - 1).max(bounds.min.x));
        let by1 = self.bucket_of((bounds.max.y - 1).max(bounds.min.y));
        (bx0..=bx1)
            .flat_map(|bx| (by0..=by1).map(move |by| (bx, by)))
            .collect()
    }
}
