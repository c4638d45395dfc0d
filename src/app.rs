//! winit application shell
//!
//! Owns the window, GPU renderer and font, forwards window events into
//! [`InputState`] and the [`Editor`], and paces frames at the configured rate.

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::font::{FontSystem, SharedFontSystem};
use crate::gpu::GpuRenderer;
use crate::input::InputState;
use crate::layout;
use crate::render::build_scene;
use crate::theme::Theme;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

pub struct EditorApp {
    config: EditorConfig,
    editor: Editor,
    input: InputState,
    theme: Theme,

    // Created once the event loop resumes
    window: Option<Arc<Window>>,
    gpu_renderer: Option<GpuRenderer>,
    font_system: Option<SharedFontSystem>,

    frame_interval: Duration,
    next_frame: Instant,
    /// Startup failure surfaced from `run`
    error: Option<Box<dyn std::error::Error>>,
}

impl EditorApp {
    pub fn new(config: EditorConfig) -> Self {
        let fps = config.window.target_fps.max(1);
        Self {
            editor: Editor::new(&config),
            input: InputState::new(),
            theme: Theme::default(),
            window: None,
            gpu_renderer: None,
            font_system: None,
            frame_interval: Duration::from_secs(1) / fps,
            next_frame: Instant::now(),
            error: None,
            config,
        }
    }

    pub fn run(mut self) -> Result<(), Box<dyn std::error::Error>> {
        let event_loop = EventLoop::new()?;
        event_loop.run_app(&mut self)?;
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn std::error::Error>> {
        let window_config = &self.config.window;
        log::info!("Creating window: {}", window_config.title);
        let window = Arc::new(
            event_loop.create_window(
                Window::default_attributes()
                    .with_title(window_config.title.as_str())
                    .with_inner_size(winit::dpi::LogicalSize::new(
                        window_config.width,
                        window_config.height,
                    )),
            )?,
        );

        let gpu_renderer = pollster::block_on(GpuRenderer::new(window.clone()))?;

        let scale_factor = window.scale_factor() as f32;
        let font_system = match FontSystem::load(self.config.font.path.as_deref()) {
            Ok(fs) => {
                let fs = SharedFontSystem::new(fs);
                for size in [
                    self.config.font.size,
                    layout::TITLE_FONT_SIZE,
                    layout::LABEL_FONT_SIZE,
                    layout::INFO_FONT_SIZE,
                ] {
                    fs.prerasterize_ascii(size * scale_factor);
                }
                Some(fs)
            }
            Err(e) => {
                log::warn!("No font available, text disabled: {e}");
                None
            }
        };

        let size = window.inner_size();
        self.editor.view.resize(
            size.width as f32 / scale_factor,
            size.height as f32 / scale_factor,
            scale_factor,
        );

        self.window = Some(window);
        self.gpu_renderer = Some(gpu_renderer);
        self.font_system = font_system;
        log::info!("Editor ready");
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn render_frame(&mut self) {
        let Some(gpu_renderer) = &mut self.gpu_renderer else {
            return;
        };

        let batches = build_scene(&self.editor, &self.theme, self.font_system.as_ref());

        // Layout may have rasterized new glyphs
        if let Some(font_system) = &self.font_system {
            let seen = gpu_renderer.atlas_version().unwrap_or(u64::MAX);
            if let Some((data, size, version)) = font_system.atlas_if_newer(seen) {
                gpu_renderer.upload_font_atlas(&data, size, version);
            }
        }

        let logical = self.editor.view.logical_size;
        gpu_renderer.render(&batches, (logical.width, logical.height), self.theme.clear_color());
    }
}

impl ApplicationHandler for EditorApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.setup(event_loop) {
            log::error!("Startup failed: {e}");
            self.error = Some(e);
            event_loop.exit();
            return;
        }
        self.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Closing");
                event_loop.exit();
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_renderer) = &mut self.gpu_renderer {
                    gpu_renderer.resize(physical_size);
                }
                if let Some(window) = &self.window {
                    let scale_factor = window.scale_factor() as f32;
                    self.editor.view.resize(
                        physical_size.width as f32 / scale_factor,
                        physical_size.height as f32 / scale_factor,
                        scale_factor,
                    );
                    window.request_redraw();
                }
            }

            WindowEvent::RedrawRequested => self.render_frame(),

            event => {
                let scale_factor = self.editor.view.scale_factor as f64;
                if let Some(action) = self.input.handle_window_event(&event, scale_factor) {
                    log::debug!("{action:?}");
                    self.editor.apply(action);
                }
                self.editor.set_hover(self.input.cursor());
            }
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: StartCause) {
        if !matches!(cause, StartCause::ResumeTimeReached { .. }) {
            return;
        }
        // One frame: held keys pan once, then the scene is redrawn
        self.editor.pan(self.input.pan_input());
        self.request_redraw();
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if self.next_frame <= now {
            self.next_frame = now + self.frame_interval;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }
}
