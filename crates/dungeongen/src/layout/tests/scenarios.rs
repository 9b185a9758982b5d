//! End-to-end runs of the generation pipeline.

use super::assert_separated;
use crate::content::{
    ContentError, ContentSource, RoomContent, RoomContents, merge_room_contents,
};
use crate::generator::{
    GenerationConfig, GenerationOptions, Generator, ReportError, Status, generate_layout,
};
use crate::guidelines::{Guidelines, LayoutType};
use crate::layout::assembler::{LayoutChanges, validate};
use crate::layout::connectivity::is_connected;
use crate::layout::model::{DungeonLayout, HallwayType};

fn guidelines(room_count: usize) -> Guidelines {
    Guidelines {
        room_count,
        ..Guidelines::default()
    }
}

fn options(seed: u64) -> GenerationOptions {
    GenerationOptions {
        include_contents: true,
        seed: Some(seed),
    }
}

struct Fixed(RoomContents);

impl ContentSource for Fixed {
    fn room_contents(
        &self,
        _layout: &DungeonLayout,
        _guidelines: &Guidelines,
    ) -> Result<RoomContents, ContentError> {
        Ok(self.0.clone())
    }
}

struct Offline;

impl ContentSource for Offline {
    fn room_contents(
        &self,
        _layout: &DungeonLayout,
        _guidelines: &Guidelines,
    ) -> Result<RoomContents, ContentError> {
        Err(ContentError::Unavailable("connection refused".into()))
    }
}

#[test]
fn same_seed_same_layout() {
    let config = GenerationConfig::default();
    let a = generate_layout(&guidelines(5), &config, Some(1234)).unwrap();
    let b = generate_layout(&guidelines(5), &config, Some(1234)).unwrap();
    assert_eq!(a.layout, b.layout);
    assert_eq!(
        serde_json::to_string(&a.layout).unwrap(),
        serde_json::to_string(&b.layout).unwrap()
    );
}

#[test]
fn five_rooms_form_a_valid_connected_dungeon() {
    let generation = generate_layout(&guidelines(5), &GenerationConfig::default(), Some(7)).unwrap();
    let layout = &generation.layout;
    assert_eq!(layout.rooms.len(), 5);
    assert!(validate(layout).is_empty());
    assert!(is_connected(&layout.rooms, &layout.connections));
    assert_separated(&layout.rooms, 1);
    assert_eq!(layout.corridors.len(), layout.connections.len());
    assert_eq!(layout.rooms.iter().filter(|r| r.flags.is_entrance).count(), 1);
    assert_eq!(layout.rooms.iter().filter(|r| r.flags.is_boss_room).count(), 1);
}

#[test]
fn metadata_describes_the_run() {
    let generation = generate_layout(&guidelines(6), &GenerationConfig::default(), Some(3)).unwrap();
    let meta = &generation.layout.metadata;
    assert_eq!(meta["layout_type"], "poisson_disc");
    assert_eq!(meta["room_count"], 6);
    assert_eq!(meta["requested_room_count"], 6);
    assert_eq!(meta["min_separation"], 1);
    assert_eq!(meta["seed"], 3);
    assert_eq!(
        meta["corridor_count"],
        generation.layout.corridors.len()
    );
    assert_eq!(
        meta["hallway_stats"]["total_hallways"],
        generation.layout.corridors.len()
    );
    assert!(!meta.contains_key("placement_shortfall"));
    assert_eq!(
        meta["algorithm"],
        "poisson_disc_sampling_with_spring_optimization"
    );
    assert!(meta["spring_optimization"]["iterations"].as_u64().unwrap() >= 1);
    assert_eq!(meta["spring_optimization"]["config"]["max_iterations"], 150);
    assert_eq!(meta["quality_metrics"]["total_collisions"], 0);
    assert!(meta["quality_metrics"]["layout_quality"].is_string());
}

#[test]
fn single_room_dungeon() {
    let generation = generate_layout(&guidelines(1), &GenerationConfig::default(), Some(5)).unwrap();
    let layout = &generation.layout;
    assert_eq!(layout.rooms.len(), 1);
    assert!(layout.connections.is_empty());
    assert!(layout.corridors.is_empty());
    let room = &layout.rooms[0];
    assert!(room.flags.is_entrance && room.flags.is_boss_room);
    assert!(generation.warnings.is_empty());
    assert_eq!(layout.viewport.as_bounds(), room.bounds().expand(5));
    assert_eq!(layout.viewport.margin, 5);
}

#[test]
fn oversized_room_count_is_a_shortfall() {
    let mut config = GenerationConfig::default();
    config.sampler.max_rooms = 8;
    for layout_type in [LayoutType::PoissonDisc, LayoutType::LineGraph] {
        let g = Guidelines {
            layout_type,
            ..guidelines(usize::MAX)
        };
        let generation = generate_layout(&g, &config, Some(1)).unwrap();
        let layout = &generation.layout;
        assert!(!layout.rooms.is_empty() && layout.rooms.len() <= 8);
        assert!(validate(layout).is_empty());
        assert_eq!(layout.metadata["requested_room_count"], usize::MAX);
        assert!(layout.metadata.contains_key("placement_shortfall"));
        assert!(generation.warnings.iter().any(|w| w.starts_with("Placed")));
    }
}

#[test]
fn negative_margin_keeps_the_viewport_upright() {
    let config = GenerationConfig {
        margin: -20,
        ..GenerationConfig::default()
    };
    let layout = generate_layout(&guidelines(3), &config, Some(1)).unwrap().layout;
    let vp = layout.viewport;
    assert!(vp.min_x <= vp.max_x && vp.min_y <= vp.max_y);
    assert_eq!(vp.margin, 0);
    for room in &layout.rooms {
        assert!(vp.as_bounds().contains_bounds(&room.bounds()));
    }
}

#[test]
fn empty_request_yields_empty_layout() {
    let generation = generate_layout(&guidelines(0), &GenerationConfig::default(), Some(5)).unwrap();
    assert!(generation.layout.rooms.is_empty());
    assert_eq!(generation.layout.viewport.min_x, -10);
}

#[test]
fn line_layout_chains_rooms() {
    let g = Guidelines {
        layout_type: LayoutType::LineGraph,
        ..guidelines(4)
    };
    let generation = generate_layout(&g, &GenerationConfig::default(), Some(11)).unwrap();
    let layout = &generation.layout;
    assert_eq!(layout.rooms.len(), 4);
    assert_eq!(layout.metadata["layout_type"], "line_graph");
    assert!(!layout.metadata.contains_key("spring_optimization"));
    assert!(validate(layout).is_empty());
    for corridor in &layout.corridors {
        assert_ne!(corridor.hallway_type, HallwayType::SecretTunnel);
    }
}

#[test]
fn report_merges_content() {
    let contents = RoomContents::from([(
        "room_1".to_string(),
        RoomContent {
            name: "Gatehouse".into(),
            ..RoomContent::default()
        },
    )]);
    let source: &dyn ContentSource = &Fixed(contents);
    let report = Generator::default().run(&guidelines(4), &options(9), Some(source));

    assert_eq!(report.status, Status::Success);
    assert_eq!(report.dungeon.room("room_1").unwrap().name, "Gatehouse");
    assert!(report.dungeon.metadata.contains_key("room_contents"));
}

#[test]
fn content_outage_keeps_the_layout() {
    let report = Generator::default().run(&guidelines(4), &options(9), Some(&Offline));

    assert!(report.is_success());
    assert_eq!(report.dungeon.rooms.len(), 4);
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ReportError::Categorized { error, .. } if error == "service_unavailable"
    )));
}

#[test]
fn contents_skipped_when_not_requested() {
    let opts = GenerationOptions {
        include_contents: false,
        seed: Some(9),
    };
    let report = Generator::default().run(&guidelines(4), &opts, Some(&Offline));
    assert!(report.errors.is_empty());
    assert!(!report.dungeon.metadata.contains_key("room_contents"));
}

#[test]
fn postprocess_runs_last() {
    let generator = Generator::default().with_postprocess(|layout: DungeonLayout| {
        layout.with_updates(LayoutChanges::new().name("Renamed Keep"))
    });
    let report = generator.run(&guidelines(3), &options(2), None);
    assert_eq!(report.dungeon.name, "Renamed Keep");
    assert!(report.errors.is_empty());
}

#[test]
fn broken_postprocess_is_reported() {
    let generator = Generator::default().with_postprocess(|layout: DungeonLayout| {
        layout.with_updates(LayoutChanges::new().corridors(Vec::new()))
    });
    let report = generator.run(&guidelines(3), &options(2), None);
    assert_eq!(report.status, Status::Success);
    assert!(report.errors.iter().any(|e| matches!(
        e,
        ReportError::Message(m) if m.starts_with("Validation:")
    )));
}

#[test]
fn report_wire_shape() {
    let report = Generator::default().run(&guidelines(3), &options(4), None);
    let json = serde_json::to_value(&report).unwrap();
    for key in ["dungeon", "guidelines", "options", "generation_time", "status", "errors"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["status"], "success");
    let room = &json["dungeon"]["rooms"][0];
    assert!(room["anchor"]["x"].is_i64());
    assert!(room.get("is_entrance").is_some());
    assert!(json["dungeon"]["viewport"].get("margin").is_some());
}

#[test]
fn content_for_missing_rooms_is_dropped() {
    let layout = generate_layout(&guidelines(5), &GenerationConfig::default(), Some(21))
        .unwrap()
        .layout;
    assert_eq!(layout.rooms.len(), 5);
    let named = |name: &str| RoomContent {
        name: name.into(),
        ..RoomContent::default()
    };
    let contents = RoomContents::from([
        ("room_1".to_string(), named("Antechamber")),
        ("room_9".to_string(), named("Nowhere")),
    ]);
    let merged = merge_room_contents(&layout, &contents).unwrap();

    assert_eq!(merged.room("room_1").unwrap().name, "Antechamber");
    assert!(merged.rooms.iter().all(|r| r.name != "Nowhere"));
    assert!(merged.metadata["room_contents"].get("room_9").is_none());
    assert!(validate(&merged).is_empty());
}

#[test]
fn disabled_springs_keep_sampled_positions() {
    let mut config = GenerationConfig::default();
    config.spring.enabled = false;
    let layout = generate_layout(&guidelines(6), &config, Some(3)).unwrap().layout;
    assert_eq!(layout.metadata["algorithm"], "poisson_disc_sampling");
    assert!(!layout.metadata.contains_key("spring_optimization"));
    assert!(layout.metadata.contains_key("quality_metrics"));
    assert!(validate(&layout).is_empty());
}
