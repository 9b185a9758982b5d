//! Structured generation guidelines and the natural-language prompt parser.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::layout::flags::ContentOdds;
use crate::layout::sampler::SizeDistribution;

/// Room placement strategy.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum LayoutType {
    /// Scattered rooms placed by disc sampling.
    #[default]
    #[value(name = "poisson_disc")]
    PoissonDisc,
    /// Rooms in a single left-to-right row.
    #[value(name = "line_graph")]
    LineGraph,
}

impl LayoutType {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutType::PoissonDisc => "poisson_disc",
            LayoutType::LineGraph => "line_graph",
        }
    }
}

impl fmt::Display for LayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "poisson_disc" => Ok(LayoutType::PoissonDisc),
            "line_graph" => Ok(LayoutType::LineGraph),
            other => Err(format!(
                "Invalid layout type: {other}. Must be 'poisson_disc' or 'line_graph'."
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// What the caller asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guidelines {
    pub theme: String,
    pub atmosphere: String,
    pub difficulty: Difficulty,
    pub room_count: usize,
    pub layout_type: LayoutType,
    pub special_requirements: Vec<String>,
    pub room_size_distribution: SizeDistribution,
    pub percentage_rooms_trapped: f64,
    pub percentage_rooms_with_treasure: f64,
    pub percentage_rooms_with_monsters: f64,
}

impl Default for Guidelines {
    fn default() -> Self {
        let odds = ContentOdds::default();
        Self {
            theme: DEFAULT_THEME.to_string(),
            atmosphere: DEFAULT_ATMOSPHERE.to_string(),
            difficulty: Difficulty::default(),
            room_count: DEFAULT_ROOM_COUNT,
            layout_type: LayoutType::default(),
            special_requirements: Vec::new(),
            room_size_distribution: SizeDistribution::default(),
            percentage_rooms_trapped: odds.traps,
            percentage_rooms_with_treasure: odds.treasure,
            percentage_rooms_with_monsters: odds.monsters,
        }
    }
}

const DEFAULT_THEME: &str = "dungeon";
const DEFAULT_ATMOSPHERE: &str = "mysterious";
const DEFAULT_ROOM_COUNT: usize = 5;
const MIN_PROMPT_ROOMS: usize = 3;
const MAX_PROMPT_ROOMS: usize = 20;

const THEMES: &[(&str, &[&str])] = &[
    ("castle", &["castle", "fortress", "palace", "keep"]),
    ("cave", &["cave", "cavern", "underground", "tunnel"]),
    ("temple", &["temple", "shrine", "sanctuary", "church"]),
    ("dungeon", &["dungeon", "prison", "cellar", "basement"]),
    ("tower", &["tower", "spire", "turret"]),
    ("mansion", &["mansion", "manor", "estate", "house"]),
    ("crypt", &["crypt", "tomb", "necropolis", "graveyard"]),
    ("mine", &["mine", "quarry", "excavation"]),
    ("ruins", &["ruins", "ruined", "abandoned", "destroyed"]),
    ("lair", &["lair", "den", "nest", "hideout"]),
];

const ATMOSPHERES: &[(&str, &[&str])] = &[
    ("haunted", &["haunted", "ghost", "spirit", "phantom", "specter"]),
    ("dark", &["dark", "shadowy", "gloomy", "dim"]),
    ("mysterious", &["mysterious", "enigmatic", "puzzling", "cryptic"]),
    ("dangerous", &["dangerous", "deadly", "hazardous", "treacherous"]),
    ("ancient", &["ancient", "old", "antique", "vintage"]),
    ("magical", &["magical", "enchanted", "mystical", "arcane"]),
    ("corrupted", &["corrupted", "tainted", "defiled", "polluted"]),
    ("abandoned", &["abandoned", "deserted", "empty", "vacant"]),
    ("lively", &["lively", "active", "busy", "populated"]),
    ("peaceful", &["peaceful", "calm", "serene", "tranquil"]),
];

const REQUIREMENTS: &[(&str, &[&str])] = &[
    ("traps", &["trap", "pit", "pressure plate", "poison"]),
    ("puzzles", &["puzzle", "riddle", "mystery", "enigma"]),
    ("treasure", &["treasure", "loot", "gold", "jewel"]),
    ("monsters", &["monster", "creature", "beast", "enemy"]),
    ("npcs", &["npc", "character", "person", "merchant"]),
    ("secrets", &["secret", "hidden", "concealed", "undiscovered"]),
    ("water", &["water", "river", "lake", "pool", "flooded"]),
    ("fire", &["fire", "lava", "burning", "flame"]),
    ("ice", &["ice", "frozen", "cold", "frost"]),
    ("magic", &["magic", "spell", "enchantment", "ritual"]),
];

static ROOM_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:rooms?|chambers?|areas?|levels?)").expect("valid room count regex")
});

impl Guidelines {
    /// Parse a free-text request such as "a haunted castle with 8 rooms".
    ///
    /// Keyword tables are matched as lowercase substrings in table order; the
    /// first hit wins. Anything not mentioned keeps its default.
    pub fn from_prompt(prompt: &str) -> Self {
        let text = prompt.to_lowercase();
        let guidelines = Self {
            theme: first_match(&text, THEMES).unwrap_or(DEFAULT_THEME).to_string(),
            atmosphere: first_match(&text, ATMOSPHERES)
                .unwrap_or(DEFAULT_ATMOSPHERE)
                .to_string(),
            difficulty: difficulty(&text),
            room_count: room_count(&text).unwrap_or(DEFAULT_ROOM_COUNT),
            special_requirements: REQUIREMENTS
                .iter()
                .filter(|(_, words)| words.iter().any(|w| text.contains(w)))
                .map(|(name, _)| name.to_string())
                .collect(),
            ..Self::default()
        };
        tracing::debug!(
            theme = %guidelines.theme,
            atmosphere = %guidelines.atmosphere,
            rooms = guidelines.room_count,
            "parsed guidelines"
        );
        guidelines
    }

    /// Content odds for regular rooms.
    pub fn content_odds(&self) -> ContentOdds {
        ContentOdds {
            traps: self.percentage_rooms_trapped,
            treasure: self.percentage_rooms_with_treasure,
            monsters: self.percentage_rooms_with_monsters,
        }
    }
}

fn first_match(text: &str, table: &[(&'static str, &[&str])]) -> Option<&'static str> {
    table
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(name, _)| *name)
}

fn difficulty(text: &str) -> Difficulty {
    let any = |words: &[&str]| words.iter().any(|w| text.contains(w));
    if any(&["easy", "simple", "basic"]) {
        Difficulty::Easy
    } else if any(&["hard", "difficult", "challenging", "deadly"]) {
        Difficulty::Hard
    } else {
        Difficulty::Medium
    }
}

fn room_count(text: &str) -> Option<usize> {
    let caps = ROOM_COUNT_RE.captures(text)?;
    // Numbers too large for usize are clamped like any other large count.
    let n = caps[1].parse::<usize>().unwrap_or(MAX_PROMPT_ROOMS);
    Some(n.clamp(MIN_PROMPT_ROOMS, MAX_PROMPT_ROOMS))
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn haunted_castle_with_eight_rooms() {
        let g = Guidelines::from_prompt("A haunted castle with 8 rooms");
        assert_eq!(g.theme, "castle");
        assert_eq!(g.atmosphere, "haunted");
        assert_eq!(g.room_count, 8);
        assert_eq!(g.difficulty, Difficulty::Medium);
    }

    #[test]
    fn room_count_is_clamped() {
        assert_eq!(Guidelines::from_prompt("50 rooms please").room_count, 20);
        assert_eq!(Guidelines::from_prompt("just 1 chamber").room_count, 3);
        assert_eq!(Guidelines::from_prompt("a cave").room_count, 5);
    }

    #[test]
    fn defaults_when_nothing_matches() {
        let g = Guidelines::from_prompt("something");
        assert_eq!(g.theme, "dungeon");
        assert_eq!(g.atmosphere, "mysterious");
        assert!(g.special_requirements.is_empty());
        assert_eq!(g.layout_type, LayoutType::PoissonDisc);
    }

    #[test]
    fn difficulty_and_requirements() {
        let g = Guidelines::from_prompt("A deadly crypt full of traps, gold and frozen riddles");
        assert_eq!(g.theme, "crypt");
        assert_eq!(g.difficulty, Difficulty::Hard);
        assert_eq!(g.atmosphere, "dangerous");
        assert_eq!(g.special_requirements, vec!["traps", "puzzles", "treasure", "ice"]);
    }

    #[test]
    fn layout_type_parses_wire_names() {
        assert_eq!("line_graph".parse::<LayoutType>(), Ok(LayoutType::LineGraph));
        assert!("spiral".parse::<LayoutType>().is_err());
        let json = serde_json::to_string(&LayoutType::PoissonDisc).unwrap();
        assert_eq!(json, "\"poisson_disc\"");
    }
}
