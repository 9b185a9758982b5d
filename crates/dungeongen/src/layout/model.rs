use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::geometry::{Bounds, Coordinate, step_count};

/// Free-form layout metadata. Keys are sorted so serialization is stable.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Order room ids by prefix, then numeric suffix, so `room_2` comes before `room_10`.
pub fn compare_room_ids(a: &str, b: &str) -> Ordering {
    fn split(id: &str) -> (&str, Option<u64>) {
        let prefix = id.trim_end_matches(|c: char| c.is_ascii_digit());
        (prefix, id[prefix.len()..].parse().ok())
    }
    let (prefix_a, n_a) = split(a);
    let (prefix_b, n_b) = split(b);
    prefix_a
        .cmp(prefix_b)
        .then(n_a.cmp(&n_b))
        .then_with(|| a.cmp(b))
}

/// Supported room shapes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomShape {
    #[default]
    Rectangle,
}

/// Size class of a room, a pure function of its area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeCategory {
    /// Smallest to largest.
    pub const ALL: [SizeCategory; 5] = [
        SizeCategory::Tiny,
        SizeCategory::Small,
        SizeCategory::Medium,
        SizeCategory::Large,
        SizeCategory::Huge,
    ];

    /// Categorize by area: ≤12 tiny, ≤20 small, ≤42 medium, ≤72 large, else huge.
    pub fn from_area(area: i64) -> Self {
        match area {
            ..=12 => SizeCategory::Tiny,
            13..=20 => SizeCategory::Small,
            21..=42 => SizeCategory::Medium,
            43..=72 => SizeCategory::Large,
            _ => SizeCategory::Huge,
        }
    }

    pub fn from_dimensions(width: i32, height: i32) -> Self {
        Self::from_area(width as i64 * height as i64)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeCategory::Tiny => "tiny",
            SizeCategory::Small => "small",
            SizeCategory::Medium => "medium",
            SizeCategory::Large => "large",
            SizeCategory::Huge => "huge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    /// The next smaller category, `None` for tiny.
    pub fn smaller(self) -> Option<Self> {
        match self {
            SizeCategory::Tiny => None,
            SizeCategory::Small => Some(SizeCategory::Tiny),
            SizeCategory::Medium => Some(SizeCategory::Small),
            SizeCategory::Large => Some(SizeCategory::Medium),
            SizeCategory::Huge => Some(SizeCategory::Large),
        }
    }
}

impl fmt::Display for SizeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content and role flags carried by a room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomFlags {
    #[serde(default)]
    pub has_traps: bool,
    #[serde(default)]
    pub has_treasure: bool,
    #[serde(default)]
    pub has_monsters: bool,
    #[serde(default)]
    pub is_boss_room: bool,
    #[serde(default)]
    pub is_entrance: bool,
    #[serde(default)]
    pub is_treasure_vault: bool,
}

/// A placed rectangular room.
///
/// Rooms are values: any change produces a new `Room` that replaces the old one
/// in the layout's room list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-left cell.
    pub anchor: Coordinate,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub shape: RoomShape,
    pub size_category: SizeCategory,
    #[serde(flatten)]
    pub flags: RoomFlags,
}

impl Room {
    /// Create a room with a derived size category and no flags.
    ///
    /// Panics in debug builds if either dimension is not positive.
    pub fn new(id: impl Into<String>, anchor: Coordinate, width: i32, height: i32) -> Self {
        debug_assert!(width > 0 && height > 0, "room dimensions must be positive");
        Self {
            id: id.into(),
            name: String::new(),
            description: None,
            anchor,
            width,
            height,
            shape: RoomShape::Rectangle,
            size_category: SizeCategory::from_dimensions(width, height),
            flags: RoomFlags::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_flags(mut self, flags: RoomFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Same room moved by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            anchor: self.anchor.offset(dx, dy),
            ..self.clone()
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_anchor(self.anchor, self.width, self.height)
    }

    pub fn center(&self) -> Coordinate {
        self.bounds().center()
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Name for prose: the given name, or the id when the room is unnamed.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Kind of link between two rooms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionType {
    #[default]
    Door,
    Passage,
    Secret,
}

impl ConnectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionType::Door => "door",
            ConnectionType::Passage => "passage",
            ConnectionType::Secret => "secret",
        }
    }
}

/// An undirected link between two rooms, stored as `(room_a_id, room_b_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub room_a_id: String,
    pub room_b_id: String,
    #[serde(default)]
    pub connection_type: ConnectionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Connection {
    pub fn new(
        room_a_id: impl Into<String>,
        room_b_id: impl Into<String>,
        connection_type: ConnectionType,
    ) -> Self {
        Self {
            room_a_id: room_a_id.into(),
            room_b_id: room_b_id.into(),
            connection_type,
            description: None,
        }
    }

    /// Identifier shared with the corridor routed for this connection.
    pub fn id(&self) -> String {
        format!("{}--{}", self.room_a_id, self.room_b_id)
    }

    /// The unordered pair, lesser id first by [`compare_room_ids`].
    pub fn key(&self) -> (&str, &str) {
        if compare_room_ids(&self.room_a_id, &self.room_b_id).is_le() {
            (&self.room_a_id, &self.room_b_id)
        } else {
            (&self.room_b_id, &self.room_a_id)
        }
    }

    pub fn touches(&self, room_id: &str) -> bool {
        self.room_a_id == room_id || self.room_b_id == room_id
    }
}

/// Visual and narrative style of a corridor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HallwayType {
    NarrowPassage,
    #[default]
    StandardDoor,
    WideCorridor,
    GrandHallway,
    SecretTunnel,
}

impl HallwayType {
    pub const ALL: [HallwayType; 5] = [
        HallwayType::NarrowPassage,
        HallwayType::StandardDoor,
        HallwayType::WideCorridor,
        HallwayType::GrandHallway,
        HallwayType::SecretTunnel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HallwayType::NarrowPassage => "narrow_passage",
            HallwayType::StandardDoor => "standard_door",
            HallwayType::WideCorridor => "wide_corridor",
            HallwayType::GrandHallway => "grand_hallway",
            HallwayType::SecretTunnel => "secret_tunnel",
        }
    }

    /// Parse a style label. Unknown labels degrade to `StandardDoor`.
    pub fn from_label(label: &str) -> Self {
        match Self::ALL.into_iter().find(|t| t.as_str() == label) {
            Some(t) => t,
            None => {
                tracing::warn!(label, "unknown hallway type, using standard_door");
                HallwayType::StandardDoor
            }
        }
    }

    /// Corridor width in cells for this style.
    pub fn default_width(self) -> i32 {
        match self {
            HallwayType::NarrowPassage => 1,
            HallwayType::StandardDoor => 2,
            HallwayType::WideCorridor => 3,
            HallwayType::GrandHallway => 4,
            HallwayType::SecretTunnel => 1,
        }
    }
}

impl<'de> Deserialize<'de> for HallwayType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from_label(&label))
    }
}

impl fmt::Display for HallwayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Concrete cell path of the corridor realizing one connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorridorPath {
    pub connection_id: String,
    pub room_a_id: String,
    pub room_b_id: String,
    /// First point touches room A, last point touches room B.
    pub path_points: Vec<Coordinate>,
    pub width: i32,
    #[serde(default)]
    pub hallway_type: HallwayType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CorridorPath {
    /// Number of steps along the path. A shared door cell `[p, p]` has length 0.
    pub fn length(&self) -> usize {
        step_count(&self.path_points)
    }

    pub fn start(&self) -> Option<Coordinate> {
        self.path_points.first().copied()
    }

    pub fn end(&self) -> Option<Coordinate> {
        self.path_points.last().copied()
    }
}

/// Rendering window: bounding box of all rooms grown by `margin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub margin: i32,
}

impl Viewport {
    pub const DEFAULT_MARGIN: i32 = 5;

    /// Derive the viewport from a room set. An empty set yields `(-10,-10)..(10,10)`.
    ///
    /// A negative margin is treated as zero so the window never inverts.
    pub fn from_rooms(rooms: &[Room], margin: i32) -> Self {
        let margin = margin.max(0);
        let bounds: Vec<Bounds> = rooms.iter().map(Room::bounds).collect();
        match Bounds::enclosing(bounds.iter()) {
            Some(all) => {
                let grown = all.expand(margin);
                Self {
                    min_x: grown.min.x,
                    min_y: grown.min.y,
                    max_x: grown.max.x,
                    max_y: grown.max.y,
                    margin,
                }
            }
            None => Self {
                min_x: -10,
                min_y: -10,
                max_x: 10,
                max_y: 10,
                margin,
            },
        }
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }

    pub fn as_bounds(&self) -> Bounds {
        Bounds::new(
            Coordinate::new(self.min_x, self.min_y),
            Coordinate::new(self.max_x, self.max_y),
        )
    }
}

/// The aggregate root handed to content generation and to the client.
///
/// Construct through [`super::assembler::assemble`] and change through
/// [`DungeonLayout::with_updates`]; fields are public for reading and for serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonLayout {
    #[serde(default)]
    pub name: String,
    pub rooms: Vec<Room>,
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub corridors: Vec<CorridorPath>,
    #[serde(default)]
    pub metadata: Metadata,
    pub viewport: Viewport,
}

impl DungeonLayout {
    /// An empty layout with the default viewport.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rooms: Vec::new(),
            connections: Vec::new(),
            corridors: Vec::new(),
            metadata: Metadata::new(),
            viewport: Viewport::from_rooms(&[], Viewport::DEFAULT_MARGIN),
        }
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    pub fn corridor_for(&self, connection: &Connection) -> Option<&CorridorPath> {
        let id = connection.id();
        self.corridors.iter().find(|c| c.connection_id == id)
    }

    /// Number of connections touching a room.
    pub fn degree(&self, room_id: &str) -> usize {
        self.connections
            .iter()
            .filter(|c| c.touches(room_id))
            .count()
    }
}
