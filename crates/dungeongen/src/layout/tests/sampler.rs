use super::{assert_separated, rng};
use crate::layout::geometry::{Bounds, Coordinate};
use crate::layout::model::SizeCategory;
use crate::layout::sampler::{RoomSampler, SamplerConfig, SizeDistribution, center_on_origin};

#[test]
fn ample_space_places_every_room() {
    let sampler = RoomSampler::default();
    let placement = sampler.sample(10, &SizeDistribution::default(), None, &mut rng(1));
    assert_eq!(placement.rooms.len(), 10);
    assert_eq!(placement.shortfall(), 0);
    assert_separated(&placement.rooms, 1);
}

#[test]
fn ids_and_names_are_sequential() {
    let placement =
        RoomSampler::default().sample(4, &SizeDistribution::default(), None, &mut rng(2));
    let ids: Vec<&str> = placement.rooms.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["room_1", "room_2", "room_3", "room_4"]);
    assert_eq!(placement.rooms[2].name, "Room 3");
}

#[test]
fn wider_separation_is_respected() {
    let sampler = RoomSampler::new(SamplerConfig {
        min_separation: 3,
        ..SamplerConfig::default()
    });
    let placement = sampler.sample(8, &SizeDistribution::default(), None, &mut rng(3));
    assert_separated(&placement.rooms, 3);
}

#[test]
fn impossible_area_is_a_shortfall_not_an_error() {
    let area = Bounds::new(Coordinate::new(0, 0), Coordinate::new(5, 5));
    let placement = RoomSampler::default().sample(
        3,
        &SizeDistribution::only(SizeCategory::Huge),
        Some(area),
        &mut rng(4),
    );
    assert!(placement.rooms.is_empty());
    assert_eq!(placement.shortfall(), 3);
}

#[test]
fn small_area_fits_one_room() {
    let area = Bounds::new(Coordinate::new(0, 0), Coordinate::new(4, 4));
    let placement = RoomSampler::default().sample(
        3,
        &SizeDistribution::only(SizeCategory::Tiny),
        Some(area),
        &mut rng(5),
    );
    assert_eq!(placement.rooms.len(), 1);
    assert_eq!(placement.shortfall(), 2);
    assert!(area.contains_bounds(&placement.rooms[0].bounds()));
}

#[test]
fn same_seed_same_rooms() {
    let sampler = RoomSampler::default();
    let dist = SizeDistribution::default();
    let a = sampler.sample(7, &dist, None, &mut rng(42));
    let b = sampler.sample(7, &dist, None, &mut rng(42));
    assert_eq!(a, b);
}

#[test]
fn zero_rooms_requested() {
    let placement =
        RoomSampler::default().sample(0, &SizeDistribution::default(), None, &mut rng(6));
    assert!(placement.rooms.is_empty());
    assert_eq!(placement.shortfall(), 0);
}

#[test]
fn oversized_request_is_capped_as_a_shortfall() {
    let sampler = RoomSampler::new(SamplerConfig {
        max_rooms: 6,
        ..SamplerConfig::default()
    });
    let distribution = SizeDistribution::default();

    let placement = sampler.sample(usize::MAX, &distribution, None, &mut rng(8));
    assert!(placement.rooms.len() <= 6);
    assert_eq!(placement.requested, usize::MAX);
    assert!(placement.shortfall() > 0);

    let line = sampler.sample_line(usize::MAX, &distribution, &mut rng(8));
    assert_eq!(line.rooms.len(), 6);
    assert_eq!(line.shortfall(), usize::MAX - 6);
}

#[test]
fn line_rooms_run_left_to_right() {
    let sampler = RoomSampler::default();
    let placement = sampler.sample_line(5, &SizeDistribution::default(), &mut rng(7));
    assert_eq!(placement.rooms.len(), 5);
    assert_separated(&placement.rooms, 1);
    for pair in placement.rooms.windows(2) {
        let gap = pair[1].anchor.x - (pair[0].anchor.x + pair[0].width);
        assert_eq!(gap, 3);
    }
    for room in &placement.rooms {
        let center = room.center();
        assert!(center.y.abs() <= 1, "{} is off the row at {center}", room.id);
    }
}

#[test]
fn centering_moves_bounding_box_to_origin() {
    let placement =
        RoomSampler::default().sample(6, &SizeDistribution::default(), None, &mut rng(8));
    let centered = center_on_origin(&placement.rooms);
    let bounds: Vec<Bounds> = centered.iter().map(|r| r.bounds()).collect();
    let all = Bounds::enclosing(bounds.iter()).unwrap();
    assert!((all.min.x + all.max.x).abs() <= 1);
    assert!((all.min.y + all.max.y).abs() <= 1);
    // Shape of the layout is unchanged.
    for (before, after) in placement.rooms.iter().zip(&centered) {
        assert_eq!(before.width, after.width);
        assert_eq!(before.id, after.id);
    }
    assert!(center_on_origin(&[]).is_empty());
}
