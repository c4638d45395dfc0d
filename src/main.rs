//! JSON tile map editor - main entry point

use tile_editor::{EditorApp, EditorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EditorConfig::load();
    log::info!(
        "Starting editor (map: {}, catalog: {})",
        config.files.map.display(),
        config.files.catalog.display()
    );

    EditorApp::new(config).run()
}
