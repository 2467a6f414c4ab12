use crate::core::events::{
    ButtonPressEvent, ButtonReleaseEvent, FrameEvent, KeyPressEvent, MoveEvent, ScrollWheelEvent,
};

/// Event visitor - one entry point per event type
///
/// Handlers may set the event's `handled` flag to stop later handlers from acting on it.
/// Every method defaults to ignoring the event.
pub trait InputHandler {
    fn button_press(&mut self, _event: &mut ButtonPressEvent) {}

    fn button_release(&mut self, _event: &mut ButtonReleaseEvent) {}

    fn pointer_move(&mut self, _event: &mut MoveEvent) {}

    fn scroll_wheel(&mut self, _event: &mut ScrollWheelEvent) {}

    fn key_press(&mut self, _event: &mut KeyPressEvent) {}

    fn frame(&mut self, _event: &mut FrameEvent) {}
}
