//! Consolidated font system - font loading, layout, rasterization and atlas
//!
//! Glyphs are rasterized on demand into a single R8 atlas that the GPU
//! samples. The atlas carries a version so it is only re-uploaded after new
//! glyphs land in it.

use crate::error::FontError;
use fontdue::layout::{CoordinateSystem, Layout, TextStyle};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ATLAS_SIZE: (u32, u32) = (2048, 2048);

/// Common font locations tried when no font path is configured
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Geneva.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// A glyph positioned relative to the layout origin, in physical pixels
#[derive(Clone, Debug)]
pub struct PositionedGlyph {
    pub char: char,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Texture coordinates in atlas [u0, v0, u1, v1]
    pub tex_coords: [f32; 4],
}

/// Layout result with positioned glyphs
pub struct TextLayout {
    pub glyphs: Vec<PositionedGlyph>,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug)]
struct GlyphEntry {
    tex_coords: [f32; 4],
    advance: f32,
}

pub struct FontSystem {
    font: fontdue::Font,
    layout: Layout,
    /// Atlas texture data (R8 format)
    atlas_data: Vec<u8>,
    atlas_size: (u32, u32),
    /// Bumped whenever a glyph is added to the atlas
    atlas_version: u64,
    /// (char, size_in_pixels) -> atlas entry
    glyph_cache: HashMap<(char, u32), GlyphEntry>,
    next_x: u32,
    next_y: u32,
    row_height: u32,
}

impl FontSystem {
    pub fn from_bytes(data: &[u8]) -> Result<Self, FontError> {
        let font = fontdue::Font::from_bytes(data, fontdue::FontSettings::default())
            .map_err(FontError::Invalid)?;

        Ok(Self {
            font,
            layout: Layout::new(CoordinateSystem::PositiveYDown),
            atlas_data: vec![0; (ATLAS_SIZE.0 * ATLAS_SIZE.1) as usize],
            atlas_size: ATLAS_SIZE,
            atlas_version: 0,
            glyph_cache: HashMap::new(),
            next_x: 0,
            next_y: 0,
            row_height: 0,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, FontError> {
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let font = Self::from_bytes(&data)?;
        log::info!("Using font {}", path.display());
        Ok(font)
    }

    /// First existing file among the well-known system font locations
    pub fn find_system_font() -> Option<PathBuf> {
        SYSTEM_FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.is_file())
    }

    /// Load `configured` if given, otherwise the first system font found
    pub fn load(configured: Option<&Path>) -> Result<Self, FontError> {
        if let Some(path) = configured {
            return Self::from_file(path);
        }
        let path = Self::find_system_font().ok_or(FontError::NotFound {
            tried: SYSTEM_FONT_CANDIDATES.len(),
        })?;
        Self::from_file(&path)
    }

    /// Layout a single line of text at `font_size_px` physical pixels
    pub fn layout_text(&mut self, text: &str, font_size_px: f32) -> TextLayout {
        // Layout and bitmaps must agree on one whole-pixel size
        let size_px = pixel_size(font_size_px);
        self.layout.clear();
        self.layout
            .append(&[&self.font], &TextStyle::new(text, size_px as f32, 0));

        // Collect glyph info first to avoid borrow issues
        let glyph_info: Vec<_> = self
            .layout
            .glyphs()
            .iter()
            .map(|g| (g.parent, g.x, g.y, g.width as f32, g.height as f32))
            .collect();

        let mut glyphs = Vec::with_capacity(glyph_info.len());
        let mut max_x = 0.0f32;
        let mut max_y = 0.0f32;

        for (ch, x, y, width, height) in glyph_info {
            if ch.is_control() {
                continue;
            }

            let entry = self.get_or_rasterize(ch, size_px);
            max_x = max_x.max(x + entry.advance.max(width));
            max_y = max_y.max(y + height);

            // Whitespace advances but has nothing to draw
            if width == 0.0 || height == 0.0 {
                continue;
            }

            glyphs.push(PositionedGlyph {
                char: ch,
                x,
                y,
                width,
                height,
                tex_coords: entry.tex_coords,
            });
        }

        TextLayout {
            glyphs,
            width: max_x,
            height: max_y,
        }
    }

    fn get_or_rasterize(&mut self, ch: char, size_px: u32) -> GlyphEntry {
        let key = (ch, size_px);
        if let Some(&entry) = self.glyph_cache.get(&key) {
            return entry;
        }

        let (metrics, bitmap) = self.font.rasterize(ch, size_px as f32);
        let (w, h) = (metrics.width as u32, metrics.height as u32);

        // Wrap to next row
        if self.next_x + w > self.atlas_size.0 {
            self.next_x = 0;
            self.next_y += self.row_height;
            self.row_height = 0;
        }

        if self.next_y + h > self.atlas_size.1 {
            log::warn!("Glyph atlas full, dropping {:?} at {}px", ch, size_px);
            return GlyphEntry {
                tex_coords: [0.0; 4],
                advance: metrics.advance_width,
            };
        }

        for row in 0..h {
            let dst = ((self.next_y + row) * self.atlas_size.0 + self.next_x) as usize;
            let src = (row * w) as usize;
            self.atlas_data[dst..dst + w as usize].copy_from_slice(&bitmap[src..src + w as usize]);
        }

        let (aw, ah) = (self.atlas_size.0 as f32, self.atlas_size.1 as f32);
        let entry = GlyphEntry {
            tex_coords: [
                self.next_x as f32 / aw,
                self.next_y as f32 / ah,
                (self.next_x + w) as f32 / aw,
                (self.next_y + h) as f32 / ah,
            ],
            advance: metrics.advance_width,
        };

        self.next_x += w + 1; // 1px padding
        self.row_height = self.row_height.max(h + 1);
        if w > 0 && h > 0 {
            self.atlas_version += 1;
        }

        self.glyph_cache.insert(key, entry);
        entry
    }

    /// Pre-rasterize printable ASCII at `font_size_px`
    pub fn prerasterize_ascii(&mut self, font_size_px: f32) {
        let size_px = pixel_size(font_size_px);
        for ch in ' '..='~' {
            self.get_or_rasterize(ch, size_px);
        }
    }

    pub fn atlas_data(&self) -> &[u8] {
        &self.atlas_data
    }

    pub fn atlas_size(&self) -> (u32, u32) {
        self.atlas_size
    }

    pub fn atlas_version(&self) -> u64 {
        self.atlas_version
    }
}

/// Nearest whole pixel size, at least 1
fn pixel_size(font_size_px: f32) -> u32 {
    font_size_px.round().max(1.0) as u32
}

/// Thread-safe wrapper for FontSystem
pub struct SharedFontSystem {
    inner: Arc<Mutex<FontSystem>>,
}

impl SharedFontSystem {
    pub fn new(font_system: FontSystem) -> Self {
        Self {
            inner: Arc::new(Mutex::new(font_system)),
        }
    }

    /// Layout with an explicit scale factor; glyphs come back in physical pixels
    pub fn layout_text_scaled(
        &self,
        text: &str,
        logical_font_size: f32,
        scale_factor: f32,
    ) -> TextLayout {
        self.inner
            .lock()
            .layout_text(text, logical_font_size * scale_factor)
    }

    pub fn prerasterize_ascii(&self, font_size_px: f32) {
        self.inner.lock().prerasterize_ascii(font_size_px);
    }

    /// Copy of the atlas if it changed since `seen_version`
    pub fn atlas_if_newer(&self, seen_version: u64) -> Option<(Vec<u8>, (u32, u32), u64)> {
        let fs = self.inner.lock();
        (fs.atlas_version() != seen_version)
            .then(|| (fs.atlas_data().to_vec(), fs.atlas_size(), fs.atlas_version()))
    }
}
