//! Editor state and edit operations
//!
//! `Editor` owns everything that changes while editing: the catalog, the map,
//! the camera/zoom view and the selected type. Input glue turns window events
//! into [`EditorAction`]s and feeds them here, so every edit can be driven
//! without a window.

use crate::catalog::ObjectCatalog;
use crate::config::{EditorConfig, FileConfig};
use crate::coordinates::{ScreenPos, View, WorldPos};
use crate::error::DocumentError;
use crate::layout;
use crate::map::{cell_of, MapDocument};

/// A discrete user intent, already decoded from raw input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorAction {
    /// Primary click: place on the map, or pick a type in the panel
    Place(ScreenPos),
    /// Secondary click: remove from the map; ignored over the panel
    Erase(ScreenPos),
    /// Wheel notches, positive grows cells
    Zoom(i32),
    SaveMap,
    LoadMap,
    LoadCatalog,
}

/// Movement keys held during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl PanInput {
    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

pub struct Editor {
    pub catalog: ObjectCatalog,
    pub map: MapDocument,
    pub view: View,
    pub selected_type: String,
    /// Screen pixels per frame, divided by grid size when applied
    pan_speed: f32,
    files: FileConfig,
    /// Outcome of the last save/load, shown in the panel
    status: Option<String>,
    /// Last known cursor position, for the hovered-cell readout
    hover: Option<ScreenPos>,
}

impl Editor {
    pub fn new(config: &EditorConfig) -> Self {
        let view = View::new(config.window.width, config.window.height, 1.0)
            .with_zoom(config.view.grid_size, config.view.zoom_range());

        Self {
            catalog: ObjectCatalog::with_defaults(),
            map: MapDocument::default(),
            view,
            selected_type: config.view.selected_type.clone(),
            pan_speed: config.view.pan_speed,
            files: config.files.clone(),
            status: None,
            hover: None,
        }
    }

    /// Apply one action; returns true if anything visible may have changed
    pub fn apply(&mut self, action: EditorAction) -> bool {
        match action {
            EditorAction::Place(pos) => self.primary_click(pos),
            EditorAction::Erase(pos) => self.secondary_click(pos),
            EditorAction::Zoom(notches) => self.zoom(notches),
            EditorAction::SaveMap => {
                let path = self.files.map.clone();
                let result = self.map.save(&path);
                self.report("Map saved to", "Error saving map", &path, result);
                true
            }
            EditorAction::LoadMap => {
                let path = self.files.map.clone();
                let result = self.map.load(&path);
                self.report("Map loaded from", "Error loading map", &path, result);
                true
            }
            EditorAction::LoadCatalog => {
                let path = self.files.catalog.clone();
                let result = self.catalog.load_from_document(&path);
                self.report("Loaded objects config from", "Error loading config", &path, result);
                true
            }
        }
    }

    fn primary_click(&mut self, pos: ScreenPos) -> bool {
        if layout::in_panel(pos) {
            return self.select_at(pos);
        }
        let world = self.view.screen_to_world(pos);
        self.map.add_object(&self.selected_type, world.x, world.y)
    }

    fn secondary_click(&mut self, pos: ScreenPos) -> bool {
        if layout::in_panel(pos) {
            return false;
        }
        let world = self.view.screen_to_world(pos);
        self.map.remove_object(world.x, world.y) > 0
    }

    /// Pick the type whose panel button contains `pos`, if any
    fn select_at(&mut self, pos: ScreenPos) -> bool {
        let Some(index) = layout::button_at(pos, self.catalog.len()) else {
            return false;
        };
        let Some(name) = self.catalog.names().nth(index) else {
            return false;
        };
        if name == self.selected_type {
            return false;
        }

        self.selected_type = name.to_string();
        log::debug!("Selected object type {}", self.selected_type);
        true
    }

    fn zoom(&mut self, notches: i32) -> bool {
        let mut changed = false;
        for _ in 0..notches.unsigned_abs() {
            changed |= if notches > 0 {
                self.view.zoom_in()
            } else {
                self.view.zoom_out()
            };
        }
        changed
    }

    /// Move the camera for one frame of held keys.
    ///
    /// Speed is divided by grid size so the on-screen pan rate is the same
    /// at every zoom level.
    pub fn pan(&mut self, input: PanInput) -> bool {
        if input.is_idle() {
            return false;
        }

        let speed = self.pan_speed / self.view.grid_size as f32;
        let camera = &mut self.view.camera;
        if input.up {
            camera.y -= speed;
        }
        if input.down {
            camera.y += speed;
        }
        if input.left {
            camera.x -= speed;
        }
        if input.right {
            camera.x += speed;
        }
        true
    }

    fn report(&mut self, ok: &str, failed: &str, path: &std::path::Path, result: Result<(), DocumentError>) {
        let message = match result {
            Ok(()) => format!("{ok} {}", path.display()),
            Err(e) => {
                log::error!("{failed}: {e}");
                format!("{failed}: {e}")
            }
        };
        self.status = Some(message);
    }

    /// Track the cursor; returns true if the hovered cell changed
    pub fn set_hover(&mut self, pos: Option<ScreenPos>) -> bool {
        let before = self.hovered_cell();
        self.hover = pos;
        before != self.hovered_cell()
    }

    /// Integer cell under the cursor, `None` over the panel or outside the window
    pub fn hovered_cell(&self) -> Option<(i32, i32)> {
        let pos = self.hover.filter(|&p| !layout::in_panel(p))?;
        let WorldPos { x, y } = self.view.screen_to_world(pos);
        Some((cell_of(x), cell_of(y)))
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PlacedObject;

    fn click(x: f32, y: f32) -> ScreenPos {
        ScreenPos::new(x, y)
    }

    #[test]
    fn test_place_outside_panel() {
        let mut editor = Editor::default();
        // 300/32 = 9.375, 100/32 = 3.125
        assert!(editor.apply(EditorAction::Place(click(300.0, 100.0))));
        assert_eq!(
            editor.map.objects,
            vec![PlacedObject {
                name: "wall".to_string(),
                x: 9,
                y: 3
            }]
        );

        // Same cell again is rejected
        assert!(!editor.apply(EditorAction::Place(click(310.0, 120.0))));
        assert_eq!(editor.map.len(), 1);
    }

    #[test]
    fn test_panel_click_selects_type() {
        let mut editor = Editor::default();
        // Third button is "box"
        assert!(editor.apply(EditorAction::Place(click(100.0, 170.0))));
        assert_eq!(editor.selected_type, "box");
        assert!(editor.map.is_empty());

        // Gap between buttons leaves the selection
        assert!(!editor.apply(EditorAction::Place(click(100.0, 155.0))));
        assert_eq!(editor.selected_type, "box");

        // Placement now uses the new type
        editor.apply(EditorAction::Place(click(640.0, 320.0)));
        assert_eq!(editor.map.objects[0].name, "box");
    }

    #[test]
    fn test_erase() {
        let mut editor = Editor::default();
        editor.apply(EditorAction::Place(click(300.0, 100.0)));

        // Right click in the panel does nothing, even over a button
        assert!(!editor.apply(EditorAction::Erase(click(100.0, 70.0))));
        assert_eq!(editor.map.len(), 1);
        assert_eq!(editor.selected_type, "wall");

        assert!(!editor.apply(EditorAction::Erase(click(500.0, 500.0))));
        assert!(editor.apply(EditorAction::Erase(click(290.0, 127.0))));
        assert!(editor.map.is_empty());
    }

    #[test]
    fn test_zoom_actions_clamp() {
        let mut editor = Editor::default();
        editor.apply(EditorAction::Zoom(3));
        assert_eq!(editor.view.grid_size, 44);
        editor.apply(EditorAction::Zoom(100));
        assert_eq!(editor.view.grid_size, 64);
        assert!(!editor.apply(EditorAction::Zoom(1)));
        editor.apply(EditorAction::Zoom(-100));
        assert_eq!(editor.view.grid_size, 8);
    }

    #[test]
    fn test_placement_respects_camera_and_zoom() {
        let mut editor = Editor::default();
        editor.view.camera = WorldPos::new(-10.0, 4.0);
        editor.apply(EditorAction::Zoom(-2)); // 24px cells
        editor.apply(EditorAction::Place(click(252.0, 12.0)));
        // 252/24 - 10 = 0.5 -> 0, 12/24 + 4 = 4.5 -> 4
        assert_eq!((editor.map.objects[0].x, editor.map.objects[0].y), (0, 4));
    }

    #[test]
    fn test_pan_speed_scales_with_zoom() {
        let mut editor = Editor::default();
        assert!(!editor.pan(PanInput::default()));

        editor.pan(PanInput {
            right: true,
            down: true,
            ..PanInput::default()
        });
        assert_eq!(editor.view.camera, WorldPos::new(10.0 / 32.0, 10.0 / 32.0));

        editor.view.camera = WorldPos::default();
        editor.apply(EditorAction::Zoom(-6)); // 8px cells
        editor.pan(PanInput {
            up: true,
            left: true,
            ..PanInput::default()
        });
        assert_eq!(editor.view.camera, WorldPos::new(-1.25, -1.25));

        // Opposite keys cancel out
        editor.pan(PanInput {
            up: true,
            down: true,
            ..PanInput::default()
        });
        assert_eq!(editor.view.camera.y, -1.25);
    }

    #[test]
    fn test_hovered_cell() {
        let mut editor = Editor::default();
        assert_eq!(editor.hovered_cell(), None);
        assert!(editor.set_hover(Some(click(330.0, 70.0))));
        assert_eq!(editor.hovered_cell(), Some((10, 2)));
        assert!(!editor.set_hover(Some(click(335.0, 75.0))));
        assert!(editor.set_hover(Some(click(100.0, 70.0))));
        assert_eq!(editor.hovered_cell(), None);
    }

    #[test]
    fn test_save_and_load_through_actions() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = EditorConfig::default();
        config.files.map = dir.path().join("map.json");
        config.files.catalog = dir.path().join("objects.json");

        let mut editor = Editor::new(&config);
        editor.apply(EditorAction::Place(click(300.0, 100.0)));
        editor.apply(EditorAction::SaveMap);
        assert!(editor.status().unwrap().starts_with("Map saved to"));

        editor.apply(EditorAction::Place(click(600.0, 100.0)));
        assert_eq!(editor.map.len(), 2);
        editor.apply(EditorAction::LoadMap);
        assert_eq!(editor.map.len(), 1);

        // No catalog file: error reported, defaults kept
        editor.apply(EditorAction::LoadCatalog);
        assert!(editor.status().unwrap().starts_with("Error loading config"));
        assert_eq!(editor.catalog.len(), 4);
    }
}
