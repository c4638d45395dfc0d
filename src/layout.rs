//! Side panel geometry
//!
//! Shared by the scene builder (to draw) and the editor (to hit-test), so a
//! button is clickable exactly where it is painted.

use crate::coordinates::{ScreenPos, ScreenRect};

/// Clicks with x at or left of this go to the panel, never to the map
pub const PANEL_THRESHOLD_X: f32 = 220.0;

pub const PANEL_RECT: ScreenRect = ScreenRect::new(10.0, 10.0, 200.0, 400.0);
pub const PANEL_BORDER: f32 = 2.0;

pub const TITLE_POS: ScreenPos = ScreenPos::new(20.0, 20.0);
pub const TITLE_FONT_SIZE: f32 = 26.0;

pub const BUTTON_X: f32 = 20.0;
pub const BUTTON_FIRST_Y: f32 = 60.0;
pub const BUTTON_WIDTH: f32 = 180.0;
pub const BUTTON_HEIGHT: f32 = 40.0;
pub const BUTTON_STRIDE: f32 = 50.0;

/// Swatch and label offsets inside a button
pub const SWATCH_OFFSET: ScreenPos = ScreenPos::new(5.0, 5.0);
pub const SWATCH_SIZE: f32 = 30.0;
pub const LABEL_OFFSET: ScreenPos = ScreenPos::new(45.0, 10.0);
pub const LABEL_FONT_SIZE: f32 = 18.0;

pub const INFO_POS: ScreenPos = ScreenPos::new(20.0, 450.0);
pub const INFO_LINE_HEIGHT: f32 = 25.0;
pub const INFO_FONT_SIZE: f32 = 15.0;

/// True when a click at `pos` belongs to the panel rather than the map
pub fn in_panel(pos: ScreenPos) -> bool {
    pos.x <= PANEL_THRESHOLD_X
}

/// Rectangle of the `index`-th type button
pub fn button_rect(index: usize) -> ScreenRect {
    ScreenRect::new(
        BUTTON_X,
        BUTTON_FIRST_Y + index as f32 * BUTTON_STRIDE,
        BUTTON_WIDTH,
        BUTTON_HEIGHT,
    )
}

/// Index of the first of `count` buttons containing `pos`
pub fn button_at(pos: ScreenPos, count: usize) -> Option<usize> {
    (0..count).find(|&i| button_rect(i).contains(pos))
}

/// Top-left of the `line`-th info text line
pub fn info_line_pos(line: usize) -> ScreenPos {
    ScreenPos::new(INFO_POS.x, INFO_POS.y + line as f32 * INFO_LINE_HEIGHT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_hit_testing() {
        assert_eq!(button_at(ScreenPos::new(30.0, 70.0), 4), Some(0));
        assert_eq!(button_at(ScreenPos::new(199.0, 115.0), 4), Some(1));
        assert_eq!(button_at(ScreenPos::new(100.0, 210.0), 4), Some(3));

        // Gap between buttons 0 and 1
        assert_eq!(button_at(ScreenPos::new(30.0, 105.0), 4), None);
        // Left of the buttons but inside the panel
        assert_eq!(button_at(ScreenPos::new(15.0, 70.0), 4), None);
        // Past the last button
        assert_eq!(button_at(ScreenPos::new(30.0, 270.0), 4), None);
        assert_eq!(button_at(ScreenPos::new(30.0, 70.0), 0), None);

        // Left/top edges hit, right/bottom edges miss
        assert_eq!(button_at(ScreenPos::new(20.0, 60.0), 4), Some(0));
        assert_eq!(button_at(ScreenPos::new(200.0, 80.0), 4), None);
        assert_eq!(button_at(ScreenPos::new(100.0, 100.0), 4), None);
        assert_eq!(button_at(ScreenPos::new(100.0, 110.0), 4), Some(1));
    }

    #[test]
    fn test_panel_threshold() {
        assert!(in_panel(ScreenPos::new(220.0, 500.0)));
        assert!(!in_panel(ScreenPos::new(220.5, 10.0)));
    }
}
