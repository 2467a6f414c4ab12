use glam::DVec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::events::{
    ButtonMask, ButtonPressEvent, ButtonReleaseEvent, InputEvent, KeyPressEvent, MoveEvent,
    ScrollWheelEvent,
};

/// Pixels treated as one scroll line for touchpads reporting pixel deltas
const PIXELS_PER_LINE: f64 = 20.0;

/// Adapter that turns Winit window events into the viewer's input events.
///
/// Winit reports buttons and cursor motion separately; this keeps the cursor position and
/// the held button mask so every pointer event carries both.
#[derive(Debug, Clone, Default)]
pub struct WinitInput {
    cursor: (i32, i32),
    mask: ButtonMask,
}

impl WinitInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a window event, returning `None` for events the viewer ignores
    pub fn process_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return None;
                }
                match event.physical_key {
                    PhysicalKey::Code(keycode) => Some(self.key_pressed(keycode)),
                    PhysicalKey::Unidentified(_) => None,
                }
            }
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(*state, *button),
            WindowEvent::CursorMoved { position, .. } => Some(self.cursor_moved(position.x, position.y)),
            WindowEvent::MouseWheel { delta, .. } => Some(self.mouse_wheel(*delta)),
            _ => None,
        }
    }

    pub fn cursor(&self) -> (i32, i32) {
        self.cursor
    }

    pub fn mask(&self) -> ButtonMask {
        self.mask
    }

    fn key_pressed(&self, keycode: KeyCode) -> InputEvent {
        InputEvent::KeyPress(KeyPressEvent::new(keycode))
    }

    fn cursor_moved(&mut self, x: f64, y: f64) -> InputEvent {
        self.cursor = (x.round() as i32, y.round() as i32);
        InputEvent::Move(MoveEvent::new(self.cursor.0, self.cursor.1, self.mask))
    }

    /// Press events carry the mask including the new button, release events the mask without it
    fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<InputEvent> {
        let (bit, number) = Self::mouse_button_to_mask(button)?;
        let (x, y) = self.cursor;

        match state {
            ElementState::Pressed => {
                self.mask.insert(bit);
                Some(InputEvent::ButtonPress(ButtonPressEvent::new(x, y, self.mask, number)))
            }
            ElementState::Released => {
                self.mask.remove(bit);
                Some(InputEvent::ButtonRelease(ButtonReleaseEvent::new(x, y, self.mask, number)))
            }
        }
    }

    fn mouse_wheel(&self, delta: MouseScrollDelta) -> InputEvent {
        let delta = match delta {
            MouseScrollDelta::LineDelta(x, y) => DVec2::new(f64::from(x), f64::from(y)),
            MouseScrollDelta::PixelDelta(position) => {
                DVec2::new(position.x, position.y) / PIXELS_PER_LINE
            }
        };
        InputEvent::ScrollWheel(ScrollWheelEvent::new(delta))
    }

    /// Left rotates, middle pans, right zooms
    fn mouse_button_to_mask(button: MouseButton) -> Option<(ButtonMask, u32)> {
        match button {
            MouseButton::Left => Some((ButtonMask::PRIMARY, 1)),
            MouseButton::Middle => Some((ButtonMask::SECONDARY, 2)),
            MouseButton::Right => Some((ButtonMask::TERTIARY, 3)),
            _ => None,
        }
    }
}
