use super::{assert_separated, rng, room};
use crate::layout::connectivity::{ConnectivityConfig, connect};
use crate::layout::model::{Connection, ConnectionType};
use crate::layout::sampler::{RoomSampler, SizeDistribution};
use crate::layout::spring::{QualityGrade, SpringConfig, measure, relax, rest_length};

#[test]
fn relaxation_keeps_rooms_apart() {
    let placement =
        RoomSampler::default().sample(12, &SizeDistribution::default(), None, &mut rng(5));
    let connections = connect(&placement.rooms, &ConnectivityConfig::default());
    let relaxed = relax(&placement.rooms, &connections, 1, &SpringConfig::default());

    assert_eq!(relaxed.rooms.len(), placement.rooms.len());
    assert_separated(&relaxed.rooms, 1);
    for (after, before) in relaxed.rooms.iter().zip(&placement.rooms) {
        assert_eq!(after.id, before.id);
        assert_eq!((after.width, after.height), (before.width, before.height));
    }
    assert!(relaxed.iterations >= 1);
}

#[test]
fn springs_pull_distant_rooms_together() {
    let rooms = vec![room("room_1", 0, 0, 4, 4), room("room_2", 60, 0, 4, 4)];
    let connections = vec![Connection::new("room_1", "room_2", ConnectionType::Door)];
    let rest = rest_length(ConnectionType::Door, &rooms[0], &rooms[1]);
    let relaxed = relax(&rooms, &connections, 1, &SpringConfig::default());

    let before = rooms[0].center().distance_to(rooms[1].center());
    let after = relaxed.rooms[0].center().distance_to(relaxed.rooms[1].center());
    assert!(after < before / 2.0, "distance went from {before} to {after}");
    assert!((after - rest).abs() < 6.0, "distance {after} far from rest {rest}");
    assert_eq!(relaxed.moved, 2);
    assert_separated(&relaxed.rooms, 1);
}

#[test]
fn disabled_or_trivial_runs_change_nothing() {
    let rooms = vec![room("room_1", 0, 0, 4, 4), room("room_2", 60, 0, 4, 4)];
    let connections = vec![Connection::new("room_1", "room_2", ConnectionType::Door)];
    let off = SpringConfig {
        enabled: false,
        ..SpringConfig::default()
    };
    let relaxed = relax(&rooms, &connections, 1, &off);
    assert_eq!(relaxed.rooms, rooms);
    assert_eq!(relaxed.iterations, 0);

    let unlinked = relax(&rooms, &[], 1, &SpringConfig::default());
    assert_eq!(unlinked.rooms, rooms);
    assert_eq!(unlinked.moved, 0);
}

#[test]
fn relaxation_is_deterministic() {
    let placement =
        RoomSampler::default().sample(8, &SizeDistribution::default(), None, &mut rng(9));
    let connections = connect(&placement.rooms, &ConnectivityConfig::default());
    let a = relax(&placement.rooms, &connections, 1, &SpringConfig::default());
    let b = relax(&placement.rooms, &connections, 1, &SpringConfig::default());
    assert_eq!(a, b);
}

#[test]
fn quality_counts_crossings_and_collisions() {
    let rooms = vec![
        room("room_1", 0, 0, 2, 2),
        room("room_2", 20, 20, 2, 2),
        room("room_3", 0, 20, 2, 2),
        room("room_4", 20, 0, 2, 2),
    ];
    let crossing = vec![
        Connection::new("room_1", "room_2", ConnectionType::Door),
        Connection::new("room_3", "room_4", ConnectionType::Door),
    ];
    let quality = measure(&rooms, &crossing, &SpringConfig::default()).unwrap();
    assert_eq!(quality.total_crossings, 1);
    assert_eq!(quality.total_collisions, 0);
    assert_eq!(quality.planarity_score, 0.5);
    assert_eq!(quality.layout_quality, QualityGrade::Poor);

    let mut overlapping = rooms.clone();
    overlapping[1] = room("room_2", 1, 1, 2, 2);
    let quality = measure(&overlapping, &crossing, &SpringConfig::default()).unwrap();
    assert_eq!(quality.total_collisions, 1);

    assert!(measure(&rooms, &[], &SpringConfig::default()).is_none());
}

#[test]
fn relaxed_pair_grades_well() {
    let rooms = vec![room("room_1", 0, 0, 4, 4), room("room_2", 13, 0, 4, 4)];
    let connections = vec![Connection::new("room_1", "room_2", ConnectionType::Door)];
    let quality = measure(&rooms, &connections, &SpringConfig::default()).unwrap();
    assert_eq!(quality.total_spring_energy, 0.0);
    assert_eq!(quality.room_spacing_score, 1.0);
    assert_eq!(quality.layout_quality, QualityGrade::Good);
}
