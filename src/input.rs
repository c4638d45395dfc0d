//! Input handling
//!
//! Tracks cursor, held keys and modifiers across winit events and decodes
//! discrete events into editor actions. Held movement keys are sampled once
//! per frame through [`InputState::pan_input`].

use crate::coordinates::ScreenPos;
use crate::editor::{EditorAction, PanInput};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// Trackpads report pixels; this many make one wheel notch
const PIXELS_PER_NOTCH: f64 = 40.0;

/// Modifier keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub cmd: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    /// Ctrl, or Cmd on macOS keyboards
    pub fn shortcut(&self) -> bool {
        self.ctrl || self.cmd
    }
}

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            cmd: state.super_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
            shift: state.shift_key(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InputState {
    /// Cursor in logical pixels, None when outside the window
    cursor: Option<ScreenPos>,
    modifiers: Modifiers,
    pan: PanInput,
    /// Pixel scroll not yet worth a full notch
    scroll_remainder: f64,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> Option<ScreenPos> {
        self.cursor
    }

    /// Movement keys currently held
    pub fn pan_input(&self) -> PanInput {
        self.pan
    }

    pub fn set_cursor(&mut self, pos: Option<ScreenPos>) {
        self.cursor = pos;
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    /// Key press/release by physical key; returns a shortcut action if one fired
    pub fn on_key(&mut self, code: KeyCode, state: ElementState, repeat: bool) -> Option<EditorAction> {
        let pressed = state == ElementState::Pressed;
        match code {
            KeyCode::KeyW => self.pan.up = pressed,
            KeyCode::KeyS => self.pan.down = pressed,
            KeyCode::KeyA => self.pan.left = pressed,
            KeyCode::KeyD => self.pan.right = pressed,
            _ => {}
        }

        if !pressed || repeat || !self.modifiers.shortcut() {
            return None;
        }
        match code {
            KeyCode::KeyS => Some(EditorAction::SaveMap),
            KeyCode::KeyL => Some(EditorAction::LoadCatalog),
            KeyCode::KeyO => Some(EditorAction::LoadMap),
            _ => None,
        }
    }

    /// Mouse press at the current cursor position
    pub fn on_mouse_button(&mut self, button: MouseButton, state: ElementState) -> Option<EditorAction> {
        if state != ElementState::Pressed {
            return None;
        }
        let pos = self.cursor?;
        match button {
            MouseButton::Left => Some(EditorAction::Place(pos)),
            MouseButton::Right => Some(EditorAction::Erase(pos)),
            _ => None,
        }
    }

    /// Wheel movement as whole zoom notches (up = positive)
    pub fn on_wheel(&mut self, delta: MouseScrollDelta) -> Option<EditorAction> {
        let notches = match delta {
            MouseScrollDelta::LineDelta(_, y) => {
                self.scroll_remainder = 0.0;
                y.signum() as i32 * (y.abs().ceil() as i32)
            }
            MouseScrollDelta::PixelDelta(pos) => {
                self.scroll_remainder += pos.y / PIXELS_PER_NOTCH;
                let whole = self.scroll_remainder.trunc();
                self.scroll_remainder -= whole;
                whole as i32
            }
        };
        (notches != 0).then_some(EditorAction::Zoom(notches))
    }

    /// Focus lost: nothing stays held
    pub fn release_all(&mut self) {
        self.pan = PanInput::default();
        self.modifiers = Modifiers::default();
    }

    /// Route a winit window event. `scale_factor` converts cursor positions to logical pixels.
    pub fn handle_window_event(&mut self, event: &WindowEvent, scale_factor: f64) -> Option<EditorAction> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => self.on_key_event(event),
            WindowEvent::ModifiersChanged(modifiers) => {
                self.set_modifiers(modifiers.state().into());
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f64>(scale_factor);
                self.set_cursor(Some(ScreenPos::new(logical.x as f32, logical.y as f32)));
                None
            }
            WindowEvent::CursorLeft { .. } => {
                self.set_cursor(None);
                None
            }
            WindowEvent::MouseInput { state, button, .. } => self.on_mouse_button(*button, *state),
            WindowEvent::MouseWheel { delta, .. } => self.on_wheel(*delta),
            WindowEvent::Focused(false) => {
                self.release_all();
                None
            }
            _ => None,
        }
    }

    fn on_key_event(&mut self, event: &KeyEvent) -> Option<EditorAction> {
        match event.physical_key {
            PhysicalKey::Code(code) => self.on_key(code, event.state, event.repeat),
            PhysicalKey::Unidentified(_) => None,
        }
    }
}
