#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod app;
pub mod catalog;
pub mod color;
pub mod config;
pub mod coordinates; // Screen/world transforms and zoom
pub mod editor;
pub mod error;
pub mod font;
pub mod gpu;
pub mod input;
pub mod layout;
pub mod map;
pub mod render;
pub mod theme;

// Re-export core types
pub use app::EditorApp;
pub use catalog::{ObjectCatalog, ObjectTypeDef};
pub use color::Rgb;
pub use config::EditorConfig;
pub use coordinates::{ScreenPos, ScreenRect, View, WorldPos};
pub use editor::{Editor, EditorAction, PanInput};
pub use error::{ColorError, ConfigError, DocumentError, FontError, GpuError};
pub use map::{MapDocument, PlacedObject};
pub use render::{build_scene, BatchedDraw, SceneBuilder};
