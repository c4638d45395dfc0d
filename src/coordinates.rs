//! Coordinate system transformation hub
//!
//! Three spaces with explicit transformations:
//! 1. World space: grid cells, real valued (what the map stores, truncated)
//! 2. Screen space: logical pixels, camera and zoom applied (what input reports)
//! 3. Physical space: device pixels (what the GPU renders)

// === World Space ===

/// Position in world (grid cell) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// === Screen Space (logical pixels) ===

/// Position in logical window pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Size in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f32,
    pub height: f32,
}

/// Rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left and top edges inside, right and bottom edges outside
    pub fn contains(&self, pos: ScreenPos) -> bool {
        pos.x >= self.x
            && pos.x < self.x + self.width
            && pos.y >= self.y
            && pos.y < self.y + self.height
    }

    pub fn intersects(&self, other: &ScreenRect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }
}

// === Physical Space (device pixels) ===

/// Position in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalPos {
    pub x: f32,
    pub y: f32,
}

/// Size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalSize {
    pub width: u32,
    pub height: u32,
}

// === The transforms ===

/// `(world - camera) * grid_size`
pub fn world_to_screen(world: WorldPos, camera: WorldPos, grid_size: u32) -> ScreenPos {
    let g = grid_size as f32;
    ScreenPos {
        x: (world.x - camera.x) * g,
        y: (world.y - camera.y) * g,
    }
}

/// `screen / grid_size + camera`, no rounding
pub fn screen_to_world(screen: ScreenPos, camera: WorldPos, grid_size: u32) -> WorldPos {
    let g = grid_size as f32;
    WorldPos {
        x: screen.x / g + camera.x,
        y: screen.y / g + camera.y,
    }
}

// === Zoom limits ===

/// Grid size bounds and step for wheel zoom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomRange {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: 8,
            max: 64,
            step: 4,
        }
    }
}

impl ZoomRange {
    pub fn clamp(&self, grid_size: u32) -> u32 {
        grid_size.clamp(self.min, self.max)
    }
}

// === The View - camera, zoom and window ===

/// Everything needed to map between world, screen and physical pixels
#[derive(Debug, Clone)]
pub struct View {
    /// World position shown at the screen origin
    pub camera: WorldPos,
    /// Pixels per grid cell
    pub grid_size: u32,
    pub zoom: ZoomRange,

    /// Logical size (DPI-independent)
    pub logical_size: ScreenSize,
    /// Physical size (device pixels)
    pub physical_size: PhysicalSize,
    /// HiDPI scale factor
    pub scale_factor: f32,
}

impl View {
    pub fn new(logical_width: f32, logical_height: f32, scale_factor: f32) -> Self {
        let zoom = ZoomRange::default();
        let mut view = Self {
            camera: WorldPos::default(),
            grid_size: 32,
            zoom,
            logical_size: ScreenSize {
                width: 0.0,
                height: 0.0,
            },
            physical_size: PhysicalSize {
                width: 0,
                height: 0,
            },
            scale_factor,
        };
        view.resize(logical_width, logical_height, scale_factor);
        view
    }

    /// Replace zoom limits and starting grid size (clamped into the limits)
    pub fn with_zoom(mut self, grid_size: u32, zoom: ZoomRange) -> Self {
        self.zoom = zoom;
        self.grid_size = zoom.clamp(grid_size);
        self
    }

    /// Update on window resize
    pub fn resize(&mut self, logical_width: f32, logical_height: f32, scale_factor: f32) {
        self.logical_size = ScreenSize {
            width: logical_width,
            height: logical_height,
        };
        self.scale_factor = scale_factor;
        self.physical_size = PhysicalSize {
            width: (logical_width * scale_factor) as u32,
            height: (logical_height * scale_factor) as u32,
        };
    }

    pub fn world_to_screen(&self, pos: WorldPos) -> ScreenPos {
        world_to_screen(pos, self.camera, self.grid_size)
    }

    pub fn screen_to_world(&self, pos: ScreenPos) -> WorldPos {
        screen_to_world(pos, self.camera, self.grid_size)
    }

    pub fn logical_to_physical(&self, pos: ScreenPos) -> PhysicalPos {
        PhysicalPos {
            x: pos.x * self.scale_factor,
            y: pos.y * self.scale_factor,
        }
    }

    pub fn physical_to_logical(&self, pos: PhysicalPos) -> ScreenPos {
        ScreenPos {
            x: pos.x / self.scale_factor,
            y: pos.y / self.scale_factor,
        }
    }

    // === Zoom ===

    /// Grow cells by one step; returns true if the size changed
    pub fn zoom_in(&mut self) -> bool {
        self.set_grid_size(self.grid_size.saturating_add(self.zoom.step))
    }

    /// Shrink cells by one step; returns true if the size changed
    pub fn zoom_out(&mut self) -> bool {
        self.set_grid_size(self.grid_size.saturating_sub(self.zoom.step))
    }

    fn set_grid_size(&mut self, grid_size: u32) -> bool {
        let clamped = self.zoom.clamp(grid_size);
        let changed = clamped != self.grid_size;
        self.grid_size = clamped;
        changed
    }

    // === Visible area ===

    /// Screen offsets of the vertical and horizontal grid lines covering the window.
    ///
    /// Lines sit on world cell boundaries, so the first one is at or left of 0.
    pub fn grid_lines(&self) -> (Vec<f32>, Vec<f32>) {
        let g = self.grid_size as f32;
        let axis = |camera: f32, extent: f32| {
            let first = (camera.floor() - camera) * g;
            let count = ((extent - first) / g).ceil().max(0.0) as usize;
            (0..count).map(|i| first + i as f32 * g).collect::<Vec<_>>()
        };
        (
            axis(self.camera.x, self.logical_size.width),
            axis(self.camera.y, self.logical_size.height),
        )
    }

    /// Check if a screen rectangle overlaps the window at all
    pub fn is_visible(&self, rect: ScreenRect) -> bool {
        rect.intersects(&ScreenRect::new(
            0.0,
            0.0,
            self.logical_size.width,
            self.logical_size.height,
        ))
    }
}
