//! Render command system - decouples scene building from GPU execution
//!
//! The scene is rebuilt from editor state every frame as a list of
//! [`RenderOp`]s, then batched into the few draw calls the GPU executes.
//! Everything here is in logical pixels and needs no window.

use crate::catalog::ObjectCatalog;
use crate::color::Rgb;
use crate::coordinates::{ScreenPos, ScreenRect, View, WorldPos};
use crate::editor::Editor;
use crate::font::SharedFontSystem;
use crate::layout;
use crate::theme::Theme;

// === Render Commands ===

#[derive(Clone, Debug, PartialEq)]
pub enum RenderOp {
    /// Filled rectangle
    Rect { rect: ScreenRect, color: u32 },
    /// Rectangle outline drawn inside `rect`
    Outline {
        rect: ScreenRect,
        color: u32,
        width: f32,
    },
    /// Single line of text with its top-left at `pos`
    Text {
        text: String,
        pos: ScreenPos,
        size: f32,
        color: u32,
    },
}

/// One textured quad from the glyph atlas
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInstance {
    pub rect: ScreenRect,
    pub color: u32,
    /// [u0, v0, u1, v1] in atlas
    pub tex_coords: [f32; 4],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectInstance {
    pub rect: ScreenRect,
    pub color: u32,
}

/// Batched draw call for GPU, executed in order
#[derive(Clone, Debug, PartialEq)]
pub enum BatchedDraw {
    RectBatch { instances: Vec<RectInstance> },
    GlyphBatch { instances: Vec<GlyphInstance> },
}

// === Scene Builder ===

/// Builds the frame for an [`Editor`]
pub struct SceneBuilder<'a> {
    theme: &'a Theme,
    font_system: Option<&'a SharedFontSystem>,
    commands: Vec<RenderOp>,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(theme: &'a Theme, font_system: Option<&'a SharedFontSystem>) -> Self {
        Self {
            theme,
            font_system,
            commands: Vec::with_capacity(512),
        }
    }

    /// Grid, objects, then the panel on top
    pub fn build(mut self, editor: &Editor) -> Vec<BatchedDraw> {
        self.grid(&editor.view);
        self.objects(editor);
        self.panel(editor);
        self.batch(editor.view.scale_factor)
    }

    /// Commands emitted so far, before batching
    pub fn commands(&self) -> &[RenderOp] {
        &self.commands
    }

    fn rect(&mut self, rect: ScreenRect, color: Rgb) {
        self.commands.push(RenderOp::Rect {
            rect,
            color: color.opaque(),
        });
    }

    fn outline(&mut self, rect: ScreenRect, color: Rgb, width: f32) {
        self.commands.push(RenderOp::Outline {
            rect,
            color: color.opaque(),
            width,
        });
    }

    fn text(&mut self, text: impl Into<String>, pos: ScreenPos, size: f32) {
        self.commands.push(RenderOp::Text {
            text: text.into(),
            pos,
            size,
            color: self.theme.text.opaque(),
        });
    }

    /// 1px lines on cell boundaries across the whole window
    pub fn grid(&mut self, view: &View) {
        let (xs, ys) = view.grid_lines();
        let (w, h) = (view.logical_size.width, view.logical_size.height);
        for x in xs {
            self.rect(ScreenRect::new(x, 0.0, 1.0, h), self.theme.grid);
        }
        for y in ys {
            self.rect(ScreenRect::new(0.0, y, w, 1.0), self.theme.grid);
        }
    }

    /// Filled, outlined squares in insertion order; off-screen ones are culled
    pub fn objects(&mut self, editor: &Editor) {
        let view = &editor.view;
        for obj in editor.map.iter() {
            let origin = view.world_to_screen(WorldPos::new(obj.x as f32, obj.y as f32));
            let side = editor.catalog.size_of(&obj.name) * view.grid_size as f32;
            let rect = ScreenRect::new(origin.x, origin.y, side, side);
            if !view.is_visible(rect) {
                continue;
            }

            let color = object_color(&editor.catalog, &obj.name);
            self.rect(rect, color);
            self.outline(rect, self.theme.outline, 1.0);
        }
    }

    /// Title, one button per type, then the info block
    pub fn panel(&mut self, editor: &Editor) {
        self.rect(layout::PANEL_RECT, self.theme.panel);
        self.outline(layout::PANEL_RECT, self.theme.text, layout::PANEL_BORDER);
        self.text("Map Editor", layout::TITLE_POS, layout::TITLE_FONT_SIZE);

        for (i, def) in editor.catalog.iter().enumerate() {
            let button = layout::button_rect(i);
            if def.name == editor.selected_type {
                self.rect(button, self.theme.highlight);
            }

            let swatch = ScreenRect::new(
                button.x + layout::SWATCH_OFFSET.x,
                button.y + layout::SWATCH_OFFSET.y,
                layout::SWATCH_SIZE,
                layout::SWATCH_SIZE,
            );
            self.rect(swatch, object_color(&editor.catalog, &def.name));

            let label = ScreenPos::new(
                button.x + layout::LABEL_OFFSET.x,
                button.y + layout::LABEL_OFFSET.y,
            );
            self.text(def.name.clone(), label, layout::LABEL_FONT_SIZE);
        }

        for (line, text) in info_lines(editor).into_iter().enumerate() {
            self.text(text, layout::info_line_pos(line), layout::INFO_FONT_SIZE);
        }
    }

    /// Group consecutive commands of the same kind, keeping paint order
    fn batch(self, scale_factor: f32) -> Vec<BatchedDraw> {
        let mut batches = Vec::new();
        let mut current_glyphs = Vec::new();
        let mut current_rects = Vec::new();

        for cmd in self.commands {
            match cmd {
                RenderOp::Rect { rect, color } => {
                    flush_glyphs(&mut batches, &mut current_glyphs);
                    current_rects.push(RectInstance { rect, color });
                }
                RenderOp::Outline { rect, color, width } => {
                    flush_glyphs(&mut batches, &mut current_glyphs);
                    current_rects.extend(outline_edges(rect, width).map(|rect| RectInstance { rect, color }));
                }
                RenderOp::Text {
                    text,
                    pos,
                    size,
                    color,
                } => {
                    let Some(font_system) = self.font_system else {
                        continue;
                    };
                    flush_rects(&mut batches, &mut current_rects);
                    current_glyphs.extend(layout_glyphs(font_system, &text, pos, size, color, scale_factor));
                }
            }
        }

        flush_rects(&mut batches, &mut current_rects);
        flush_glyphs(&mut batches, &mut current_glyphs);
        batches
    }
}

/// Convenience for the frame loop
pub fn build_scene(editor: &Editor, theme: &Theme, font_system: Option<&SharedFontSystem>) -> Vec<BatchedDraw> {
    SceneBuilder::new(theme, font_system).build(editor)
}

/// Bad colors were already reported when the catalog loaded
fn object_color(catalog: &ObjectCatalog, name: &str) -> Rgb {
    catalog.color_of(name).unwrap_or(Rgb::WHITE)
}

/// Status and help text under the buttons
pub fn info_lines(editor: &Editor) -> Vec<String> {
    let mut lines = vec![
        format!("Objects: {}", editor.map.len()),
        format!("Grid: {}px", editor.view.grid_size),
        "LMB: Place object".to_string(),
        "RMB: Remove object".to_string(),
        "Mouse wheel: Zoom".to_string(),
        "WASD: Move camera".to_string(),
        "Ctrl+S: Save map".to_string(),
        "Ctrl+O: Load map".to_string(),
        "Ctrl+L: Load config".to_string(),
    ];
    if let Some((x, y)) = editor.hovered_cell() {
        lines.push(format!("Cell: {x}, {y}"));
    }
    if let Some(status) = editor.status() {
        lines.push(status.to_string());
    }
    lines
}

/// Four edge strips lying inside `rect`
fn outline_edges(rect: ScreenRect, width: f32) -> impl Iterator<Item = ScreenRect> {
    let w = width.min(rect.width / 2.0).min(rect.height / 2.0);
    [
        ScreenRect::new(rect.x, rect.y, rect.width, w),
        ScreenRect::new(rect.x, rect.y + rect.height - w, rect.width, w),
        ScreenRect::new(rect.x, rect.y + w, w, rect.height - 2.0 * w),
        ScreenRect::new(rect.x + rect.width - w, rect.y + w, w, rect.height - 2.0 * w),
    ]
    .into_iter()
}

/// Glyph quads in logical pixels; the font lays out in physical pixels
fn layout_glyphs(
    font_system: &SharedFontSystem,
    text: &str,
    pos: ScreenPos,
    size: f32,
    color: u32,
    scale_factor: f32,
) -> Vec<GlyphInstance> {
    let layout = font_system.layout_text_scaled(text, size, scale_factor);
    layout
        .glyphs
        .iter()
        .map(|g| GlyphInstance {
            rect: ScreenRect::new(
                pos.x + g.x / scale_factor,
                pos.y + g.y / scale_factor,
                g.width / scale_factor,
                g.height / scale_factor,
            ),
            color,
            tex_coords: g.tex_coords,
        })
        .collect()
}

fn flush_rects(batches: &mut Vec<BatchedDraw>, rects: &mut Vec<RectInstance>) {
    if !rects.is_empty() {
        batches.push(BatchedDraw::RectBatch {
            instances: std::mem::take(rects),
        });
    }
}

fn flush_glyphs(batches: &mut Vec<BatchedDraw>, glyphs: &mut Vec<GlyphInstance>) {
    if !glyphs.is_empty() {
        batches.push(BatchedDraw::GlyphBatch {
            instances: std::mem::take(glyphs),
        });
    }
}
