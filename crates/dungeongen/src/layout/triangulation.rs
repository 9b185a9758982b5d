//! Bowyer-Watson Delaunay triangulation over room centers.
//!
//! Only the edge set is used: it is the proximity graph the connectivity
//! builder draws its spanning tree and loop edges from.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    cx: f64,
    cy: f64,
    r2: f64,
}

impl Triangle {
    fn new(v: [usize; 3], pts: &[(f64, f64)]) -> Self {
        let (ax, ay) = pts[v[0]];
        let (bx, by) = pts[v[1]];
        let (cx, cy) = pts[v[2]];
        let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
        if d.abs() < f64::EPSILON {
            // Degenerate: every point is "inside", so the next insertion removes it.
            return Self {
                v,
                cx: 0.0,
                cy: 0.0,
                r2: f64::INFINITY,
            };
        }
        let a2 = ax * ax + ay * ay;
        let b2 = bx * bx + by * by;
        let c2 = cx * cx + cy * cy;
        let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
        let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;
        let r2 = (ax - ux).powi(2) + (ay - uy).powi(2);
        Self {
            v,
            cx: ux,
            cy: uy,
            r2,
        }
    }

    fn circumcircle_contains(&self, (x, y): (f64, f64)) -> bool {
        let d2 = (x - self.cx).powi(2) + (y - self.cy).powi(2);
        d2 < self.r2
    }

    fn edges(&self) -> [(usize, usize); 3] {
        [
            ordered(self.v[0], self.v[1]),
            ordered(self.v[1], self.v[2]),
            ordered(self.v[2], self.v[0]),
        ]
    }
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Edges `(i, j)` with `i < j` of the Delaunay triangulation of `points`, sorted.
///
/// Fewer than two points yields no edges, two points yield the single edge.
/// Collinear input produces the chain between neighbouring points (and possibly
/// hull edges), which callers must not assume is a full triangulation.
pub fn delaunay_edges(points: &[(f64, f64)]) -> Vec<(usize, usize)> {
    let n = points.len();
    match n {
        0 | 1 => return Vec::new(),
        2 => return vec![(0, 1)],
        _ => {}
    }

    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
    }
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;

    let mut pts: Vec<(f64, f64)> = points.to_vec();
    pts.push((mid_x - 20.0 * span, mid_y - span));
    pts.push((mid_x, mid_y + 20.0 * span));
    pts.push((mid_x + 20.0 * span, mid_y - span));

    let mut triangles = vec![Triangle::new([n, n + 1, n + 2], &pts)];

    for i in 0..n {
        let p = pts[i];
        let (bad, good): (Vec<Triangle>, Vec<Triangle>) = triangles
            .into_iter()
            .partition(|t| t.circumcircle_contains(p));

        // Cavity boundary: edges of removed triangles not shared by another removed one.
        let mut edge_count: HashMap<(usize, usize), u32> = HashMap::new();
        for t in &bad {
            for e in t.edges() {
                *edge_count.entry(e).or_insert(0) += 1;
            }
        }
        let mut boundary: Vec<(usize, usize)> = edge_count
            .into_iter()
            .filter(|&(_, c)| c == 1)
            .map(|(e, _)| e)
            .collect();
        boundary.sort_unstable();

        triangles = good;
        for (a, b) in boundary {
            triangles.push(Triangle::new([a, b, i], &pts));
        }
    }

    let edges: BTreeSet<(usize, usize)> = triangles
        .iter()
        .flat_map(|t| t.edges())
        .filter(|&(a, b)| a < n && b < n)
        .collect();
    edges.into_iter().collect()
}
