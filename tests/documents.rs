//! Map and catalog files on disk

use serde_json::Value;
use tile_editor::{DocumentError, MapDocument, ObjectCatalog, Rgb};

#[test]
fn test_saved_map_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.json");

    let mut map = MapDocument::default();
    map.add_object("wall", 2.5, 3.9);
    map.add_object("player", 0.0, -1.5);
    map.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["width"], 100);
    assert_eq!(value["height"], 100);
    assert_eq!(
        value["objects"],
        serde_json::json!([
            { "name": "wall", "x": 2, "y": 3 },
            { "name": "player", "x": 0, "y": -1 }
        ])
    );
    assert!(text.contains("\n  \"objects\""));
}

#[test]
fn test_map_reload_replaces_everything() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.json");
    std::fs::write(
        &path,
        r#"{ "width": 40, "height": 30, "objects": [ { "name": "box", "x": 7, "y": 8 } ] }"#,
    )
    .unwrap();

    let mut map = MapDocument::default();
    map.add_object("wall", 1.0, 1.0);
    map.load(&path).unwrap();

    assert_eq!((map.width, map.height), (40, 30));
    assert_eq!(map.len(), 1);
    assert!(map.object_at(7, 8).is_some());
    assert!(map.object_at(1, 1).is_none());
}

#[test]
fn test_bad_map_keeps_current_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.json");
    std::fs::write(&path, r#"{ "objects": "nope" }"#).unwrap();

    let mut map = MapDocument::default();
    map.add_object("wall", 4.0, 4.0);
    let err = map.load(&path).unwrap_err();
    assert!(matches!(err, DocumentError::Parse { .. }));
    assert_eq!(err.path(), path.as_path());
    assert_eq!(map.len(), 1);
}

#[test]
fn test_catalog_document_replaces_types_in_file_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("objects.json");
    std::fs::write(
        &path,
        r##"{
            "tree": { "modules": ["square"], "params": { "color": "#00AA00", "size": 4, "solid": true } },
            "coin": { "modules": [], "params": { "color": "#FFD700" } },
            "ghost": { "modules": ["sprite"], "params": {} }
        }"##,
    )
    .unwrap();

    let mut catalog = ObjectCatalog::with_defaults();
    catalog.load_from_document(&path).unwrap();

    assert_eq!(catalog.names().collect::<Vec<_>>(), ["tree", "coin", "ghost"]);
    assert!(!catalog.contains("wall"));
    assert_eq!(catalog.color_of("tree"), Ok(Rgb::new(0x00, 0xAA, 0x00)));
    assert_eq!(catalog.size_of("tree"), 4.0);
    assert_eq!(catalog.size_of("coin"), 2.0);
    assert_eq!(catalog.color_of("ghost"), Ok(Rgb::WHITE));
    assert_eq!(catalog.get("tree").unwrap().params.extra["solid"], Value::Bool(true));
}

#[test]
fn test_missing_catalog_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = ObjectCatalog::with_defaults();
    let err = catalog
        .load_from_document(dir.path().join("absent.json"))
        .unwrap_err();
    assert!(matches!(err, DocumentError::Io { .. }));
    assert_eq!(catalog.names().collect::<Vec<_>>(), ["player", "wall", "box", "trawa"]);
}
