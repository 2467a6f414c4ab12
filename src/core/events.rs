use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::time::Instant;

use glam::DVec2;
use winit::keyboard::KeyCode;

use crate::traits::InputHandler;

/// Bitmask of pointer buttons held during an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonMask(u32);

impl ButtonMask {
    pub const NONE: ButtonMask = ButtonMask(0);
    /// Left mouse button
    pub const PRIMARY: ButtonMask = ButtonMask(1 << 8);
    /// Middle mouse button
    pub const SECONDARY: ButtonMask = ButtonMask(1 << 9);
    /// Right mouse button
    pub const TERTIARY: ButtonMask = ButtonMask(1 << 10);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: ButtonMask) -> bool {
        other.0 != 0 && self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, other: ButtonMask) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ButtonMask) {
        self.0 &= !other.0;
    }
}

impl BitOr for ButtonMask {
    type Output = ButtonMask;

    fn bitor(self, rhs: ButtonMask) -> ButtonMask {
        ButtonMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for ButtonMask {
    fn bitor_assign(&mut self, rhs: ButtonMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ButtonMask {
    type Output = ButtonMask;

    fn bitand(self, rhs: ButtonMask) -> ButtonMask {
        ButtonMask(self.0 & rhs.0)
    }
}

/// Pointer state shared by press, release and move events
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: i32,
    pub y: i32,
    /// Buttons held at the time of the event
    pub mask: ButtonMask,
    pub handled: bool,
}

impl PointerEvent {
    pub fn new(x: i32, y: i32, mask: ButtonMask) -> Self {
        Self {
            x,
            y,
            mask,
            handled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonPressEvent {
    pub pointer: PointerEvent,
    /// Button that changed state (1 = primary, 2 = secondary, 3 = tertiary)
    pub button: u32,
}

impl ButtonPressEvent {
    pub fn new(x: i32, y: i32, mask: ButtonMask, button: u32) -> Self {
        Self {
            pointer: PointerEvent::new(x, y, mask),
            button,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonReleaseEvent {
    pub pointer: PointerEvent,
    pub button: u32,
}

impl ButtonReleaseEvent {
    pub fn new(x: i32, y: i32, mask: ButtonMask, button: u32) -> Self {
        Self {
            pointer: PointerEvent::new(x, y, mask),
            button,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveEvent {
    pub pointer: PointerEvent,
}

impl MoveEvent {
    pub fn new(x: i32, y: i32, mask: ButtonMask) -> Self {
        Self {
            pointer: PointerEvent::new(x, y, mask),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollWheelEvent {
    /// Scroll amount in lines; positive y scrolls away from the user
    pub delta: DVec2,
    pub handled: bool,
}

impl ScrollWheelEvent {
    pub fn new(delta: DVec2) -> Self {
        Self {
            delta,
            handled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPressEvent {
    pub key: KeyCode,
    pub handled: bool,
}

impl KeyPressEvent {
    pub fn new(key: KeyCode) -> Self {
        Self {
            key,
            handled: false,
        }
    }
}

/// Emitted once per rendered frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    pub frame_count: u64,
    pub time: Instant,
}

impl FrameEvent {
    pub fn new(frame_count: u64, time: Instant) -> Self {
        Self { frame_count, time }
    }
}

/// Any event the viewer forwards to its handlers
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    ButtonPress(ButtonPressEvent),
    ButtonRelease(ButtonReleaseEvent),
    Move(MoveEvent),
    ScrollWheel(ScrollWheelEvent),
    KeyPress(KeyPressEvent),
    Frame(FrameEvent),
}

impl InputEvent {
    /// Route the event to the matching handler method
    pub fn dispatch(&mut self, handler: &mut dyn InputHandler) {
        match self {
            InputEvent::ButtonPress(event) => handler.button_press(event),
            InputEvent::ButtonRelease(event) => handler.button_release(event),
            InputEvent::Move(event) => handler.pointer_move(event),
            InputEvent::ScrollWheel(event) => handler.scroll_wheel(event),
            InputEvent::KeyPress(event) => handler.key_press(event),
            InputEvent::Frame(event) => handler.frame(event),
        }
    }

    /// Frame events carry no handled flag and always report false
    pub fn handled(&self) -> bool {
        match self {
            InputEvent::ButtonPress(event) => event.pointer.handled,
            InputEvent::ButtonRelease(event) => event.pointer.handled,
            InputEvent::Move(event) => event.pointer.handled,
            InputEvent::ScrollWheel(event) => event.handled,
            InputEvent::KeyPress(event) => event.handled,
            InputEvent::Frame(_) => false,
        }
    }
}
