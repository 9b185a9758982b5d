//! Construction, validation and pure update of [`DungeonLayout`].

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::model::{Connection, CorridorPath, DungeonLayout, Metadata, Room, Viewport};

/// A broken layout invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("duplicate room id '{0}'")]
    DuplicateRoomId(String),

    #[error("room '{id}' has invalid dimensions {width}x{height}")]
    InvalidDimensions { id: String, width: i32, height: i32 },

    #[error("connection '{0}' links a room to itself")]
    SelfLoop(String),

    #[error("duplicate connection between '{0}' and '{1}'")]
    DuplicateConnection(String, String),

    #[error("{owner} references unknown room '{room}'")]
    UnknownRoom { owner: String, room: String },

    #[error("connection '{0}' has no corridor")]
    MissingCorridor(String),

    #[error("connection '{0}' has more than one corridor")]
    DuplicateCorridor(String),

    #[error("corridor '{0}' matches no connection")]
    OrphanCorridor(String),

    #[error("corridor '{0}' does not start and end at its rooms")]
    DetachedCorridor(String),
}

/// Compose a layout and check its invariants.
///
/// The viewport is derived from `rooms` grown by `margin`. The first invariant
/// violation is returned as the error; use [`validate`] to list all of them.
pub fn assemble(
    name: impl Into<String>,
    rooms: Vec<Room>,
    connections: Vec<Connection>,
    corridors: Vec<CorridorPath>,
    metadata: Metadata,
    margin: i32,
) -> Result<DungeonLayout, LayoutError> {
    let viewport = Viewport::from_rooms(&rooms, margin);
    let layout = DungeonLayout {
        name: name.into(),
        rooms,
        connections,
        corridors,
        metadata,
        viewport,
    };
    match validate(&layout).into_iter().next() {
        Some(err) => Err(err),
        None => Ok(layout),
    }
}

/// Every invariant violation in `layout`, in a stable order. Empty means valid.
pub fn validate(layout: &DungeonLayout) -> Vec<LayoutError> {
    let mut errors = Vec::new();

    let mut ids: HashMap<&str, &Room> = HashMap::new();
    for room in &layout.rooms {
        if room.width <= 0 || room.height <= 0 {
            errors.push(LayoutError::InvalidDimensions {
                id: room.id.clone(),
                width: room.width,
                height: room.height,
            });
        }
        if ids.insert(room.id.as_str(), room).is_some() {
            errors.push(LayoutError::DuplicateRoomId(room.id.clone()));
        }
    }

    let mut pairs = HashSet::new();
    let mut connection_ids: HashMap<String, usize> = HashMap::new();
    for conn in &layout.connections {
        if conn.room_a_id == conn.room_b_id {
            errors.push(LayoutError::SelfLoop(conn.id()));
        }
        for room in [&conn.room_a_id, &conn.room_b_id] {
            if !ids.contains_key(room.as_str()) {
                errors.push(LayoutError::UnknownRoom {
                    owner: format!("connection '{}'", conn.id()),
                    room: room.clone(),
                });
            }
        }
        let (lo, hi) = conn.key();
        if !pairs.insert((lo, hi)) {
            errors.push(LayoutError::DuplicateConnection(lo.to_string(), hi.to_string()));
        }
        connection_ids.insert(conn.id(), 0);
    }

    for corridor in &layout.corridors {
        match connection_ids.get_mut(&corridor.connection_id) {
            Some(count) => *count += 1,
            None => {
                errors.push(LayoutError::OrphanCorridor(corridor.connection_id.clone()));
                continue;
            }
        }
        let ends = (
            ids.get(corridor.room_a_id.as_str()),
            ids.get(corridor.room_b_id.as_str()),
        );
        let (Some(a), Some(b)) = ends else {
            for room in [&corridor.room_a_id, &corridor.room_b_id] {
                if !ids.contains_key(room.as_str()) {
                    errors.push(LayoutError::UnknownRoom {
                        owner: format!("corridor '{}'", corridor.connection_id),
                        room: room.clone(),
                    });
                }
            }
            continue;
        };
        let touches = match (corridor.start(), corridor.end()) {
            (Some(first), Some(last)) => {
                corridor.path_points.len() >= 2
                    && a.bounds().is_on_or_adjacent(first)
                    && b.bounds().is_on_or_adjacent(last)
            }
            _ => false,
        };
        if !touches {
            errors.push(LayoutError::DetachedCorridor(corridor.connection_id.clone()));
        }
    }

    for conn in &layout.connections {
        match connection_ids.get(&conn.id()) {
            Some(0) => errors.push(LayoutError::MissingCorridor(conn.id())),
            Some(1) => {}
            _ => errors.push(LayoutError::DuplicateCorridor(conn.id())),
        }
    }

    errors
}

/// A set of whole-field replacements for [`DungeonLayout::with_updates`].
///
/// `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutChanges {
    pub name: Option<String>,
    pub rooms: Option<Vec<Room>>,
    pub connections: Option<Vec<Connection>>,
    pub corridors: Option<Vec<CorridorPath>>,
    pub metadata: Option<Metadata>,
}

impl LayoutChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn rooms(mut self, rooms: Vec<Room>) -> Self {
        self.rooms = Some(rooms);
        self
    }

    pub fn connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = Some(connections);
        self
    }

    pub fn corridors(mut self, corridors: Vec<CorridorPath>) -> Self {
        self.corridors = Some(corridors);
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Union of two change sets; fields named in `later` win.
    pub fn merge(self, later: LayoutChanges) -> LayoutChanges {
        LayoutChanges {
            name: later.name.or(self.name),
            rooms: later.rooms.or(self.rooms),
            connections: later.connections.or(self.connections),
            corridors: later.corridors.or(self.corridors),
            metadata: later.metadata.or(self.metadata),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == LayoutChanges::default()
    }
}

impl DungeonLayout {
    /// A new layout equal to `self` except for the fields named in `changes`.
    ///
    /// The viewport is recomputed, keeping its margin, only when `rooms` is
    /// replaced; otherwise it is carried over untouched.
    pub fn with_updates(&self, changes: LayoutChanges) -> DungeonLayout {
        let viewport = match &changes.rooms {
            Some(rooms) => Viewport::from_rooms(rooms, self.viewport.margin),
            None => self.viewport,
        };
        DungeonLayout {
            name: changes.name.unwrap_or_else(|| self.name.clone()),
            rooms: changes.rooms.unwrap_or_else(|| self.rooms.clone()),
            connections: changes
                .connections
                .unwrap_or_else(|| self.connections.clone()),
            corridors: changes.corridors.unwrap_or_else(|| self.corridors.clone()),
            metadata: changes.metadata.unwrap_or_else(|| self.metadata.clone()),
            viewport,
        }
    }
}
