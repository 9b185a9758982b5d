//! Narrative room content supplied by an external collaborator, and merging it
//! into a layout by room id.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::guidelines::Guidelines;
use crate::layout::assembler::LayoutChanges;
use crate::layout::model::{CorridorPath, DungeonLayout, Room};
use crate::layout::routing::classify::describe;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trap {
    pub name: String,
    pub trigger: String,
    pub effect: String,
    pub difficulty: String,
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Treasure {
    pub name: String,
    pub description: String,
    pub value: String,
    pub location: String,
    pub requirements: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Monster {
    pub name: String,
    pub description: String,
    pub stats: String,
    pub behavior: String,
    pub location: String,
}

/// Content for one room.
///
/// Lists default to empty. A room with a record whose lists are empty has been
/// described and holds nothing; a room without a record has no content block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomContent {
    pub purpose: String,
    pub name: String,
    pub gm_description: String,
    pub player_description: String,
    pub traps: Vec<Trap>,
    pub treasures: Vec<Treasure>,
    pub monsters: Vec<Monster>,
}

/// Content keyed by room id.
pub type RoomContents = BTreeMap<String, RoomContent>;

/// Metadata key holding merged content.
pub const ROOM_CONTENTS_KEY: &str = "room_contents";

/// Failure of the content collaborator.
#[derive(Debug, Error)]
pub enum ContentError {
    /// The service could not be reached. Callers may retry.
    #[error("content service unavailable: {0}")]
    Unavailable(String),

    #[error("content generation failed: {0}")]
    Failed(String),
}

impl ContentError {
    /// Wire label used in generation reports.
    pub fn category(&self) -> &'static str {
        match self {
            ContentError::Unavailable(_) => "service_unavailable",
            ContentError::Failed(_) => "content_failed",
        }
    }
}

/// Produces narrative content for a finished layout.
pub trait ContentSource: Send + Sync {
    fn room_contents(
        &self,
        layout: &DungeonLayout,
        guidelines: &Guidelines,
    ) -> Result<RoomContents, ContentError>;
}

/// Reads content from a JSON object keyed by room id.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ContentSource for JsonFileSource {
    fn room_contents(
        &self,
        _layout: &DungeonLayout,
        _guidelines: &Guidelines,
    ) -> Result<RoomContents, ContentError> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            ContentError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| ContentError::Failed(format!("{}: {e}", self.path.display())))
    }
}

/// Attach content to the rooms it names.
///
/// Known ids replace their room with one carrying the content's name, its GM
/// description, and flags raised for any non-empty list. Corridors touching a
/// renamed room get their description rewritten with the new name. The records
/// are also stored under `metadata["room_contents"]`. Unknown ids are dropped.
pub fn merge_room_contents(
    layout: &DungeonLayout,
    contents: &RoomContents,
) -> Result<DungeonLayout, ContentError> {
    let mut merged = serde_json::Map::new();
    let mut renamed = HashSet::new();
    let mut rooms = Vec::with_capacity(layout.rooms.len());
    for room in &layout.rooms {
        let Some(content) = contents.get(&room.id) else {
            rooms.push(room.clone());
            continue;
        };
        let value = serde_json::to_value(content).map_err(|e| {
            ContentError::Failed(format!("could not encode content for {}: {e}", room.id))
        })?;
        merged.insert(room.id.clone(), value);

        let mut updated = room.clone();
        if !content.name.is_empty() && content.name != room.name {
            updated.name = content.name.clone();
            renamed.insert(room.id.as_str());
        }
        if !content.gm_description.is_empty() {
            updated.description = Some(content.gm_description.clone());
        }
        updated.flags.has_traps |= !content.traps.is_empty();
        updated.flags.has_treasure |= !content.treasures.is_empty();
        updated.flags.has_monsters |= !content.monsters.is_empty();
        rooms.push(updated);
    }

    for id in contents.keys().filter(|id| layout.room(id).is_none()) {
        tracing::debug!(room = %id, "dropping content for unknown room");
    }

    let mut changes = LayoutChanges::new();
    if !renamed.is_empty() {
        changes = changes.corridors(redescribe(&layout.corridors, &rooms, &renamed));
    }

    let mut metadata = layout.metadata.clone();
    metadata.insert(
        ROOM_CONTENTS_KEY.to_string(),
        serde_json::Value::Object(merged),
    );
    Ok(layout.with_updates(changes.rooms(rooms).metadata(metadata)))
}

fn redescribe(corridors: &[CorridorPath], rooms: &[Room], renamed: &HashSet<&str>) -> Vec<CorridorPath> {
    let by_id: HashMap<&str, &Room> = rooms.iter().map(|r| (r.id.as_str(), r)).collect();
    corridors
        .iter()
        .map(|corridor| {
            let touched = renamed.contains(corridor.room_a_id.as_str())
                || renamed.contains(corridor.room_b_id.as_str());
            let ends = (
                by_id.get(corridor.room_a_id.as_str()),
                by_id.get(corridor.room_b_id.as_str()),
            );
            match ends {
                (Some(a), Some(b)) if touched => CorridorPath {
                    description: Some(describe(corridor.hallway_type, a, b)),
                    ..corridor.clone()
                },
                _ => corridor.clone(),
            }
        })
        .collect()
}
