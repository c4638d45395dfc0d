//! Map document - the placed objects and the declared map size
//!
//! Objects live in a flat list. Insertion order is render order; the only
//! structural rule is one object per integer cell, enforced by `add_object`.

use crate::error::DocumentError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MAP_WIDTH: i32 = 100;
pub const DEFAULT_MAP_HEIGHT: i32 = 100;

/// One object on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedObject {
    /// Catalog type name (not checked against the catalog)
    pub name: String,
    pub x: i32,
    pub y: i32,
}

/// The persisted map: `{ "width", "height", "objects": [{ "name", "x", "y" }] }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapDocument {
    /// Declared size, informational only
    pub width: i32,
    pub height: i32,
    pub objects: Vec<PlacedObject>,
}

impl Default for MapDocument {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            objects: Vec::new(),
        }
    }
}

/// Truncate a world coordinate toward zero to its grid cell
pub fn cell_of(world: f32) -> i32 {
    world.trunc() as i32
}

impl MapDocument {
    /// Place `type_name` at the cell containing (world_x, world_y).
    ///
    /// Returns false and changes nothing if the cell is already taken.
    pub fn add_object(&mut self, type_name: &str, world_x: f32, world_y: f32) -> bool {
        let (x, y) = (cell_of(world_x), cell_of(world_y));
        if self.object_at(x, y).is_some() {
            return false;
        }

        self.objects.push(PlacedObject {
            name: type_name.to_string(),
            x,
            y,
        });
        true
    }

    /// Remove whatever occupies the cell containing (world_x, world_y).
    ///
    /// Returns the number of objects removed.
    pub fn remove_object(&mut self, world_x: f32, world_y: f32) -> usize {
        let (x, y) = (cell_of(world_x), cell_of(world_y));
        let before = self.objects.len();
        self.objects.retain(|obj| !(obj.x == x && obj.y == y));
        before - self.objects.len()
    }

    pub fn object_at(&self, x: i32, y: i32) -> Option<&PlacedObject> {
        self.objects.iter().find(|obj| obj.x == x && obj.y == y)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedObject> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Pretty JSON with two-space indentation
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Write the whole document to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let text = self
            .to_json_string()
            .map_err(|e| DocumentError::parse(path, e))?;
        std::fs::write(path, text).map_err(|e| DocumentError::io(path, e))?;

        log::info!("Map saved to {} ({} objects)", path.display(), self.len());
        Ok(())
    }

    /// Replace this document with the one at `path`; untouched on failure
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
        let loaded = Self::from_json_str(&text).map_err(|e| DocumentError::parse(path, e))?;

        log::info!("Map loaded from {} ({} objects)", path.display(), loaded.len());
        *self = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obj(name: &str, x: i32, y: i32) -> PlacedObject {
        PlacedObject {
            name: name.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn test_place_reject_remove_scenario() {
        let mut map = MapDocument::default();

        assert!(map.add_object("wall", 2.0, 3.0));
        assert_eq!(map.objects, vec![obj("wall", 2, 3)]);

        // Same cell: first write wins
        assert!(!map.add_object("box", 2.0, 3.0));
        assert_eq!(map.objects, vec![obj("wall", 2, 3)]);

        assert_eq!(map.remove_object(2.0, 3.0), 1);
        assert!(map.is_empty());
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let map = MapDocument::from_json_str(r#"{ "objects": [ { "name": "wall", "x": 1, "y": 2 } ] }"#).unwrap();
        assert_eq!((map.width, map.height), (DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT));
        assert_eq!(map.objects, vec![obj("wall", 1, 2)]);

        let map = MapDocument::from_json_str(r#"{ "width": 10, "height": 10 }"#).unwrap();
        assert_eq!((map.width, map.height), (10, 10));
        assert!(map.is_empty());
    }

    #[test]
    fn test_truncation_toward_zero() {
        let mut map = MapDocument::default();
        map.add_object("wall", 2.9, 3.99);
        map.add_object("wall", -0.5, -1.7);
        assert_eq!(map.objects, vec![obj("wall", 2, 3), obj("wall", 0, -1)]);

        // -0.5 and 0.7 both land in column 0
        assert!(!map.add_object("box", 0.7, -1.2));
        assert_eq!(map.remove_object(0.1, -1.9), 1);
        assert_eq!(map.objects, vec![obj("wall", 2, 3)]);
    }

    #[test]
    fn test_remove_on_empty_or_free_cell() {
        let mut map = MapDocument::default();
        assert_eq!(map.remove_object(5.0, 5.0), 0);
        assert!(map.is_empty());

        map.add_object("wall", 1.0, 1.0);
        assert_eq!(map.remove_object(5.0, 5.0), 0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut map = MapDocument::default();
        map.add_object("c", 3.0, 0.0);
        map.add_object("a", 1.0, 0.0);
        map.add_object("b", 2.0, 0.0);
        let names: Vec<_> = map.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[test]
    fn test_json_shape() {
        let mut map = MapDocument::default();
        map.add_object("wall", 2.0, 3.0);
        let value: serde_json::Value = serde_json::from_str(&map.to_json_string().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "width": 100,
                "height": 100,
                "objects": [{ "name": "wall", "x": 2, "y": 3 }]
            })
        );
    }

    #[test]
    fn test_failed_load_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.json");
        let mut map = MapDocument::default();
        map.add_object("wall", 1.0, 1.0);
        let before = map.clone();

        assert!(matches!(map.load(&path), Err(DocumentError::Io { .. })));
        std::fs::write(&path, r#"{ "width": 3, "objects": "nope" }"#).unwrap();
        assert!(matches!(map.load(&path), Err(DocumentError::Parse { .. })));

        assert_eq!(map, before);
    }

    #[test]
    fn test_failed_save_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file
        let mut map = MapDocument::default();
        map.add_object("wall", 1.0, 1.0);
        let before = map.clone();

        assert!(matches!(map.save(dir.path()), Err(DocumentError::Io { .. })));
        assert_eq!(map, before);
    }

    proptest! {
        #[test]
        fn prop_placement_is_idempotent(x in -1000.0f32..1000.0, y in -1000.0f32..1000.0) {
            let mut map = MapDocument::default();
            map.add_object("wall", x, y);
            map.add_object("box", x, y);
            prop_assert_eq!(map.len(), 1);
            prop_assert_eq!(&map.objects[0].name, "wall");
        }

        #[test]
        fn prop_save_load_round_trip(
            cells in proptest::collection::vec((-500i32..500, -500i32..500, "[a-z]{1,8}"), 0..32),
            width in 0i32..1000,
            height in 0i32..1000,
        ) {
            let mut doc = MapDocument { width, height, objects: Vec::new() };
            for (x, y, name) in &cells {
                doc.add_object(name, *x as f32, *y as f32);
            }

            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("map.json");
            doc.save(&path).unwrap();

            let mut loaded = MapDocument::default();
            loaded.load(&path).unwrap();
            prop_assert_eq!(loaded, doc);
        }
    }
}
