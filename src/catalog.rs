//! Object catalog - the data-driven set of placeable object types
//!
//! Each type carries a color, a render size in grid cells, free-form module
//! tags and any number of opaque parameters. The catalog is read-only while
//! editing and is replaced wholesale when a new document is loaded.

use crate::color::Rgb;
use crate::error::{ColorError, DocumentError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

/// Color used when a type or its `color` param is missing
pub const DEFAULT_COLOR_HEX: &str = "#FFFFFF";
/// Size used when a type or its `size` param is missing
pub const DEFAULT_SIZE: f32 = 2.0;

/// Parameters of an object type; only `color` and `size` are interpreted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    /// Everything else (`collidable`, `solid`, `speed`, ...) passes through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectTypeDef {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub modules: Vec<String>,
    #[serde(default)]
    pub params: ObjectParams,
}

impl ObjectTypeDef {
    pub fn color_hex(&self) -> &str {
        self.params.color.as_deref().unwrap_or(DEFAULT_COLOR_HEX)
    }

    pub fn size(&self) -> f32 {
        self.params.size.unwrap_or(DEFAULT_SIZE)
    }
}

/// Ordered collection of object types, keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectCatalog {
    types: Vec<ObjectTypeDef>,
}

impl ObjectCatalog {
    /// Catalog populated with the built-in types
    pub fn with_defaults() -> Self {
        let mut catalog = Self::default();
        catalog.load_defaults();
        catalog
    }

    /// Replace the catalog with the built-in table
    pub fn load_defaults(&mut self) {
        let table = json!({
            "player": {
                "modules": ["sprite", "move", "camera", "collision"],
                "params": {
                    "color": "#FF0000",
                    "size": 2,
                    "speed": 1,
                    "followSpeed": 0.1,
                    "smooth": true,
                    "width": 500,
                    "height": 500,
                    "collidable": true,
                    "solid": true,
                    "checkCollision": true
                }
            },
            "wall": {
                "modules": ["square", "collision"],
                "params": { "color": "#3333FF", "size": 2, "collidable": true, "solid": true }
            },
            "box": {
                "modules": ["square", "collision"],
                "params": { "color": "#11FF11", "size": 3, "collidable": true, "solid": false }
            },
            "trawa": {
                "modules": ["square", "collision"],
                "params": { "color": "#305530", "size": 30, "collidable": true, "solid": false }
            }
        });

        if let Value::Object(entries) = table {
            // The table above is fixed, so conversion cannot fail
            if let Ok(types) = Self::types_from_map(entries) {
                self.types = types;
            }
        }
    }

    /// Parse a catalog document: `{ "<name>": { "modules": [..], "params": {..} } }`
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let entries: Map<String, Value> = serde_json::from_str(text)?;
        Ok(Self {
            types: Self::types_from_map(entries)?,
        })
    }

    fn types_from_map(entries: Map<String, Value>) -> Result<Vec<ObjectTypeDef>, serde_json::Error> {
        entries
            .into_iter()
            .map(|(name, value)| {
                let mut def: ObjectTypeDef = serde_json::from_value(value)?;
                def.name = name;
                Ok(def)
            })
            .collect()
    }

    /// Replace the catalog with the document at `path`.
    ///
    /// On failure the current catalog is kept and the error is returned for
    /// the caller to report.
    pub fn load_from_document(&mut self, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DocumentError::io(path, e))?;
        let loaded = Self::from_json_str(&text).map_err(|e| DocumentError::parse(path, e))?;

        log::info!("Loaded {} object types from {}", loaded.len(), path.display());
        for (name, e) in loaded.invalid_colors() {
            log::warn!("Object type {name} will be drawn white: {e}");
        }
        *self = loaded;
        Ok(())
    }

    /// Types whose color string does not decode
    pub fn invalid_colors(&self) -> Vec<(&str, ColorError)> {
        self.types
            .iter()
            .filter_map(|def| {
                Rgb::from_hex(def.color_hex())
                    .err()
                    .map(|e| (def.name.as_str(), e))
            })
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&ObjectTypeDef> {
        self.types.iter().find(|def| def.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Decoded color of `name`, white if unknown
    pub fn color_of(&self, name: &str) -> Result<Rgb, ColorError> {
        match self.get(name) {
            Some(def) => Rgb::from_hex(def.color_hex()),
            None => Ok(Rgb::WHITE),
        }
    }

    /// Size of `name` in grid cells, [`DEFAULT_SIZE`] if unknown
    pub fn size_of(&self, name: &str) -> f32 {
        self.get(name).map_or(DEFAULT_SIZE, ObjectTypeDef::size)
    }

    /// Types in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &ObjectTypeDef> {
        self.types.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.iter().map(|def| def.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let catalog = ObjectCatalog::with_defaults();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["player", "wall", "box", "trawa"]);

        assert_eq!(catalog.color_of("wall"), Ok(Rgb::new(0x33, 0x33, 0xFF)));
        assert_eq!(catalog.size_of("box"), 3.0);
        assert_eq!(catalog.size_of("trawa"), 30.0);

        let player = catalog.get("player").unwrap();
        assert_eq!(player.modules, ["sprite", "move", "camera", "collision"]);
        assert_eq!(player.params.extra.get("solid"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_unknown_type_falls_back() {
        let catalog = ObjectCatalog::with_defaults();
        assert_eq!(catalog.color_of("ghost"), Ok(Rgb::WHITE));
        assert_eq!(catalog.size_of("ghost"), 2.0);
    }

    #[test]
    fn test_missing_params_fall_back() {
        let catalog = ObjectCatalog::from_json_str(r#"{ "bare": {}, "tagged": { "modules": ["x"] } }"#)
            .unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.color_of("bare"), Ok(Rgb::WHITE));
        assert_eq!(catalog.size_of("tagged"), DEFAULT_SIZE);
    }

    #[test]
    fn test_document_order_is_kept() {
        let catalog = ObjectCatalog::from_json_str(
            r##"{
                "zeta": { "params": { "color": "#000001" } },
                "alpha": { "params": { "color": "#000002" } },
                "mid": { "params": { "color": "#000003" } }
            }"##,
        )
        .unwrap();
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_malformed_color_is_an_error() {
        let catalog =
            ObjectCatalog::from_json_str(r##"{ "bad": { "params": { "color": "#12" } } }"##).unwrap();
        assert!(catalog.color_of("bad").is_err());
    }

    #[test]
    fn test_invalid_colors_are_listed() {
        assert!(ObjectCatalog::with_defaults().invalid_colors().is_empty());

        let catalog = ObjectCatalog::from_json_str(
            r##"{ "ok": { "params": { "color": "#00FF00" } }, "bad": { "params": { "color": "#12" } }, "plain": {} }"##,
        )
        .unwrap();
        let invalid = catalog.invalid_colors();
        assert_eq!(invalid.len(), 1);
        assert_eq!(invalid[0].0, "bad");
    }

    #[test]
    fn test_failed_load_keeps_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = ObjectCatalog::with_defaults();

        let missing = dir.path().join("objects.json");
        assert!(matches!(
            catalog.load_from_document(&missing),
            Err(DocumentError::Io { .. })
        ));

        std::fs::write(&missing, "{ not json").unwrap();
        assert!(matches!(
            catalog.load_from_document(&missing),
            Err(DocumentError::Parse { .. })
        ));

        assert_eq!(catalog, ObjectCatalog::with_defaults());
    }

    #[test]
    fn test_load_replaces_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objects.json");
        std::fs::write(
            &path,
            r##"{ "lava": { "modules": ["square"], "params": { "color": "#FF8800", "size": 1, "solid": false } } }"##,
        )
        .unwrap();

        let mut catalog = ObjectCatalog::with_defaults();
        catalog.load_from_document(&path).unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(!catalog.contains("wall"));
        assert_eq!(catalog.color_of("lava"), Ok(Rgb::new(0xFF, 0x88, 0x00)));
        assert_eq!(catalog.size_of("lava"), 1.0);
    }
}
