use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer grid coordinate.
///
/// One unit is one dungeon cell. `y` grows downward, so a room's anchor is its
/// top-left cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by `(dx, dy)`.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Step one cell in the given direction.
    pub fn step(self, dir: Direction) -> Self {
        match dir {
            Direction::North => self.offset(0, -1),
            Direction::South => self.offset(0, 1),
            Direction::East => self.offset(1, 0),
            Direction::West => self.offset(-1, 0),
        }
    }

    pub fn manhattan_to(self, other: Coordinate) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Chessboard distance. Two path points are contiguous iff this is at most 1.
    pub fn chebyshev_to(self, other: Coordinate) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Squared Euclidean distance, exact in integers.
    pub fn distance_sq(self, other: Coordinate) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    pub fn distance_to(self, other: Coordinate) -> f64 {
        (self.distance_sq(other) as f64).sqrt()
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.y.cmp(&other.y).then(self.x.cmp(&other.x))
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Cardinal direction on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All four directions.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Whether this direction is horizontal (East/West).
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    /// Whether a transition from `self` to `other` constitutes a turn.
    pub fn is_turn(self, other: Direction) -> bool {
        self.is_horizontal() != other.is_horizontal()
    }

    /// The opposite direction.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// Direction of a single axis-aligned step from `a` to `b`, if it is one.
    pub fn between(a: Coordinate, b: Coordinate) -> Option<Direction> {
        match (b.x - a.x, b.y - a.y) {
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            (0, 1) => Some(Direction::South),
            (0, -1) => Some(Direction::North),
            _ => None,
        }
    }
}

/// Steps between consecutive distinct points. A repeated point is not a step.
pub fn step_count(points: &[Coordinate]) -> usize {
    points.windows(2).filter(|pair| pair[0] != pair[1]).count()
}

/// Half-open cell rectangle: covers cells with `min.x <= x < max.x` and
/// `min.y <= y < max.y`.
///
/// A room anchored at `(0,0)` with size 4×3 has bounds `(0,0)..(4,3)`, which is
/// also the `[anchor, anchor + (width, height)]` rectangle in edge coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl Bounds {
    pub fn new(min: Coordinate, max: Coordinate) -> Self {
        Self { min, max }
    }

    /// Bounds of a `width`×`height` rectangle whose top-left cell is `anchor`.
    pub fn from_anchor(anchor: Coordinate, width: i32, height: i32) -> Self {
        Self {
            min: anchor,
            max: anchor.offset(width, height),
        }
    }

    pub fn width(&self) -> i32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> i32 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// Center cell, rounding toward the anchor.
    pub fn center(&self) -> Coordinate {
        Coordinate::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// Grow every side by `margin` cells. A negative margin shrinks.
    pub fn expand(&self, margin: i32) -> Self {
        Self {
            min: self.min.offset(-margin, -margin),
            max: self.max.offset(margin, margin),
        }
    }

    /// Translate the whole rectangle.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            min: self.min.offset(dx, dy),
            max: self.max.offset(dx, dy),
        }
    }

    /// Strict overlap test: rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Whether the cell `p` lies inside.
    pub fn contains(&self, p: Coordinate) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: Coordinate::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Coordinate::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Bounding box of a set of rectangles, `None` when empty.
    pub fn enclosing<'a>(items: impl IntoIterator<Item = &'a Bounds>) -> Option<Bounds> {
        items.into_iter().fold(None, |acc, b| match acc {
            None => Some(*b),
            Some(acc) => Some(acc.union(b)),
        })
    }

    /// Whether `p` is a wall cell or a cell touching the rectangle from outside
    /// (diagonal neighbours included).
    pub fn is_on_or_adjacent(&self, p: Coordinate) -> bool {
        self.expand(1).contains(p) && !self.expand(-1).contains(p)
    }
}
