//! Configuration management for the tile editor
//!
//! Read once at startup from `tile-editor.toml` in the working directory.
//! Every field is optional; a missing file means all defaults.

use crate::coordinates::ZoomRange;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "tile-editor.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub files: FileConfig,
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub font: FontConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default = "default_fps")]
    pub target_fps: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FileConfig {
    /// Where Ctrl+S saves and Ctrl+O loads the map
    #[serde(default = "default_map_path")]
    pub map: PathBuf,
    /// Where Ctrl+L loads the object catalog
    #[serde(default = "default_catalog_path")]
    pub catalog: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ViewConfig {
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    #[serde(default = "default_min_grid_size")]
    pub min_grid_size: u32,
    #[serde(default = "default_max_grid_size")]
    pub max_grid_size: u32,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: u32,
    /// Pan speed in screen pixels per frame; divided by grid size
    #[serde(default = "default_pan_speed")]
    pub pan_speed: f32,
    #[serde(default = "default_selected_type")]
    pub selected_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FontConfig {
    /// TTF/OTF file; system locations are searched when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Logical size whose ASCII glyphs are rasterized at startup
    #[serde(default = "default_font_size")]
    pub size: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            target_fps: default_fps(),
        }
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            map: default_map_path(),
            catalog: default_catalog_path(),
        }
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            grid_size: default_grid_size(),
            min_grid_size: default_min_grid_size(),
            max_grid_size: default_max_grid_size(),
            zoom_step: default_zoom_step(),
            pan_speed: default_pan_speed(),
            selected_type: default_selected_type(),
        }
    }
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            path: None,
            size: default_font_size(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            files: FileConfig::default(),
            view: ViewConfig::default(),
            font: FontConfig::default(),
        }
    }
}

fn default_title() -> String { "JSON Map Editor".to_string() }
fn default_width() -> f32 { 1200.0 }
fn default_height() -> f32 { 800.0 }
fn default_fps() -> u32 { 60 }
fn default_map_path() -> PathBuf { PathBuf::from("map.json") }
fn default_catalog_path() -> PathBuf { PathBuf::from("objects.json") }
fn default_grid_size() -> u32 { 32 }
fn default_min_grid_size() -> u32 { 8 }
fn default_max_grid_size() -> u32 { 64 }
fn default_zoom_step() -> u32 { 4 }
fn default_pan_speed() -> f32 { 10.0 }
fn default_selected_type() -> String { "wall".to_string() }
fn default_font_size() -> f32 { 16.0 }

impl ViewConfig {
    /// Zoom limits with min/max put in order and a non-zero step
    pub fn zoom_range(&self) -> ZoomRange {
        let min = self.min_grid_size.max(1);
        let max = self.max_grid_size.max(min);
        ZoomRange {
            min,
            max,
            step: self.zoom_step.max(1),
        }
    }
}

impl EditorConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read `path`; a missing file is not an error and yields defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load `tile-editor.toml`, falling back to defaults with a warning on any error
    pub fn load() -> Self {
        Self::load_from(Path::new(CONFIG_FILE)).unwrap_or_else(|e| {
            log::warn!("{e}; using default configuration");
            Self::default()
        })
    }
}
