use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::layout::model::{ConnectionType, CorridorPath, HallwayType, Room};

use super::types::{Route, RouteKind, RoutingConfig};

/// Pick a hallway style from the route's shape and the connection's type.
pub fn classify(
    route: &Route,
    crosses_rooms: bool,
    connection_type: ConnectionType,
    config: &RoutingConfig,
) -> HallwayType {
    let length = route.complexity.length;
    if (route.kind == RouteKind::Fallback && crosses_rooms)
        || connection_type == ConnectionType::Secret
    {
        HallwayType::SecretTunnel
    } else if length <= config.narrow_max_length {
        HallwayType::NarrowPassage
    } else if route.is_straight() && length >= config.grand_min_length {
        HallwayType::GrandHallway
    } else if length >= config.wide_min_length {
        HallwayType::WideCorridor
    } else {
        HallwayType::StandardDoor
    }
}

/// One-line flavour text naming both rooms.
pub fn describe(hallway: HallwayType, a: &Room, b: &Room) -> String {
    let phrase = match hallway {
        HallwayType::NarrowPassage => "A narrow passage squeezes between",
        HallwayType::StandardDoor => "A plain corridor joins",
        HallwayType::WideCorridor => "A wide corridor runs between",
        HallwayType::GrandHallway => "A grand hallway stretches between",
        HallwayType::SecretTunnel => "A hidden tunnel burrows between",
    };
    format!("{phrase} {} and {}.", a.display_name(), b.display_name())
}

/// Aggregate corridor statistics stored in layout metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HallwayStats {
    pub total_hallways: usize,
    pub type_distribution: BTreeMap<HallwayType, usize>,
    pub average_length: f64,
    pub average_width: f64,
    pub total_length: usize,
}

impl HallwayStats {
    pub fn from_corridors(corridors: &[CorridorPath]) -> Self {
        let total_hallways = corridors.len();
        if total_hallways == 0 {
            return Self::default();
        }

        let mut type_distribution = BTreeMap::new();
        for c in corridors {
            *type_distribution.entry(c.hallway_type).or_insert(0) += 1;
        }
        let total_length: usize = corridors.iter().map(CorridorPath::length).sum();
        let total_width: i64 = corridors.iter().map(|c| c.width as i64).sum();

        Self {
            total_hallways,
            type_distribution,
            average_length: total_length as f64 / total_hallways as f64,
            average_width: total_width as f64 / total_hallways as f64,
            total_length,
        }
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::layout::geometry::Coordinate;
    use crate::layout::routing::types::RouteComplexity;

    fn straight(len: i32, kind: RouteKind) -> Route {
        Route {
            points: (0..=len).map(|x| Coordinate::new(x, 0)).collect(),
            complexity: RouteComplexity {
                length: len as u32,
                turns: 0,
                crowded: 0,
            },
            kind,
        }
    }

    fn bent(len: i32) -> Route {
        let mut points: Vec<Coordinate> = (0..len).map(|x| Coordinate::new(x, 0)).collect();
        points.push(Coordinate::new(len - 1, 1));
        Route {
            points,
            complexity: RouteComplexity {
                length: len as u32,
                turns: 1,
                crowded: 0,
            },
            kind: RouteKind::Routed,
        }
    }

    #[test]
    fn classification_bands() {
        let cfg = RoutingConfig::default();
        let door = ConnectionType::Door;
        assert_eq!(
            classify(&straight(2, RouteKind::Straight), false, door, &cfg),
            HallwayType::NarrowPassage
        );
        assert_eq!(
            classify(&straight(10, RouteKind::Straight), false, door, &cfg),
            HallwayType::GrandHallway
        );
        assert_eq!(classify(&bent(6), false, door, &cfg), HallwayType::StandardDoor);
        assert_eq!(classify(&bent(20), false, door, &cfg), HallwayType::WideCorridor);
    }

    #[test]
    fn crossing_fallback_and_secret_links_are_tunnels() {
        let cfg = RoutingConfig::default();
        assert_eq!(
            classify(&straight(9, RouteKind::Fallback), true, ConnectionType::Door, &cfg),
            HallwayType::SecretTunnel
        );
        assert_eq!(
            classify(&straight(1, RouteKind::Straight), false, ConnectionType::Secret, &cfg),
            HallwayType::SecretTunnel
        );
        assert_ne!(
            classify(&straight(9, RouteKind::Fallback), false, ConnectionType::Door, &cfg),
            HallwayType::SecretTunnel
        );
    }

    #[test]
    fn stats_average_over_corridors() {
        let corridor = |len: i32, hallway: HallwayType| CorridorPath {
            connection_id: "a--b".into(),
            room_a_id: "a".into(),
            room_b_id: "b".into(),
            path_points: (0..=len).map(|x| Coordinate::new(x, 0)).collect(),
            width: hallway.default_width(),
            hallway_type: hallway,
            description: None,
        };
        let stats = HallwayStats::from_corridors(&[
            corridor(4, HallwayType::StandardDoor),
            corridor(10, HallwayType::GrandHallway),
        ]);
        assert_eq!(stats.total_hallways, 2);
        assert_eq!(stats.total_length, 14);
        assert_eq!(stats.average_length, 7.0);
        assert_eq!(stats.average_width, 3.0);
        assert_eq!(stats.type_distribution[&HallwayType::GrandHallway], 1);
        assert_eq!(HallwayStats::from_corridors(&[]), HallwayStats::default());
    }

    #[test]
    fn shared_door_corridor_adds_no_length() {
        let door = Coordinate::new(4, 2);
        let corridor = CorridorPath {
            connection_id: "room_1--room_2".into(),
            room_a_id: "room_1".into(),
            room_b_id: "room_2".into(),
            path_points: vec![door, door],
            width: 1,
            hallway_type: HallwayType::NarrowPassage,
            description: None,
        };
        let stats = HallwayStats::from_corridors(&[corridor]);
        assert_eq!(stats.total_length, 0);
        assert_eq!(stats.average_length, 0.0);
    }
}
