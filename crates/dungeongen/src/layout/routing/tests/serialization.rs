use super::*;
use crate::layout::routing::serialize::{path_to_string, string_to_path};

#[test]
fn routed_paths_survive_text_form() {
    let rooms = vec![
        room("room_1", -8, -3, 4, 4),
        room("room_2", 2, 6, 5, 3),
        room("room_3", 10, -7, 3, 3),
    ];
    let links = [link("room_1", "room_2"), link("room_2", "room_3")];
    let output = route_all(&rooms, &links, &config());
    for corridor in &output.corridors {
        let text = path_to_string(&corridor.path_points);
        assert_eq!(string_to_path(&text).as_ref(), Some(&corridor.path_points));
    }
}

#[test]
fn parse_known_path() {
    let points = string_to_path("(0,0)-(1,0)-(1,-1)").unwrap();
    assert_eq!(
        points,
        vec![
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(1, -1)
        ]
    );
}

#[test]
fn reject_malformed_paths() {
    assert!(string_to_path("(0,0)-(1,0)-").is_none());
    assert!(string_to_path("(0,0)-[1,0]").is_none());
    assert!(string_to_path("(0,0)-(x,0)").is_none());
}
