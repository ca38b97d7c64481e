//! This module contains traits and structs that provide interactivity of a map.
//!
//! User interaction handling is done in several steps:
//! 1. UI event is converted to a common [`RawUserEvent`] enum. For example, the `mapdraw-egui`
//!    crate converts `egui::Event` into `RawUserEvent`.
//! 2. `RawUserEvent` is given to the [`EventProcessor`], that converts it into a [`UserEvent`].
//!    `EventProcessor` keeps track of input state (which mouse buttons are pressed, where the
//!    pointer is) and recognizes clicks, double clicks and drags.
//! 3. `EventProcessor` gives the `UserEvent` to a list of [`UserEventHandler`]s, which change the
//!    state of the application based on the events. The drawing toolkit
//!    ([`Editor`](crate::edit::Editor)) goes first, the [`MapController`] that pans and zooms the
//!    map goes last.

use geo_types::Coord;

use crate::map::Map;
use crate::primitives::{Point2d, Vector2d};

mod event_processor;
mod map;

pub use event_processor::EventProcessor;
pub use map::{MapController, MapControllerConfiguration};

/// User input handler.
pub trait UserEventHandler {
    /// Handle the event.
    fn handle(&mut self, event: &UserEvent, map: &mut Map) -> EventPropagation;
}

impl<T: for<'a> FnMut(&'a UserEvent, &'a mut Map) -> EventPropagation> UserEventHandler for T {
    fn handle(&mut self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        self(event, map)
    }
}

/// Raw user interaction event. This type is an intermediate step between a UI event and an
/// event that will be processed by the application. It does not provide any state information,
/// as not all UI frameworks give this information together with the event. Instead, the input
/// state is stored in the [`EventProcessor`] struct, which combines `RawUserEvent` with the state
/// to produce [`UserEvent`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawUserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton),
    /// A mouse button was released.
    ButtonReleased(MouseButton),
    /// Mouse pointer was moved to the given screen pixel position.
    PointerMoved(Point2d),
    /// Scroll was called (by a mouse wheel or touch pad scrolling). The number is the number of
    /// lines that the event would scroll if it was scrolling a text.
    Scroll(f64),
    /// Multi-touch zoom gesture. The first value is the resolution multiplier, the second is the
    /// screen point the gesture is centered at.
    Zoom(f64, Point2d),
}

/// User interaction event. This is the main type that the application would use through
/// [`UserEventHandler`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum UserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton, MouseEvent),
    /// A mouse button was released.
    ButtonReleased(MouseButton, MouseEvent),
    /// A mouse button was clicked. This event is fired right after the
    /// [`UserEvent::ButtonReleased`] event if the release was shortly after the press event and
    /// the pointer was not dragged.
    Click(MouseButton, MouseEvent),
    /// A double click was done. This event is fired right after the second [`UserEvent::Click`]
    /// event if the second click was done shortly after the first click.
    DoubleClick(MouseButton, MouseEvent),
    /// Mouse pointer moved.
    PointerMoved(MouseEvent),

    /// Drag started (user pressed a mouse button and moves the pointer around without releasing
    /// the button). The mouse event has the position where the button was pressed.
    ///
    /// The handler that returns [`EventPropagation::Consume`] for this event becomes the owner
    /// of the drag: all following [`UserEvent::Drag`] and [`UserEvent::DragEnded`] events are
    /// given only to it.
    DragStarted(MouseButton, MouseEvent),

    /// Mouse pointer moved after drag started was consumed. The vector is the pointer movement
    /// in screen pixels since the previous event.
    Drag(MouseButton, Vector2d, MouseEvent),

    /// Mouse button was released while dragging.
    DragEnded(MouseButton, MouseEvent),

    /// Scroll event is called. The number is number of text lines the scroll is requested for.
    Scroll(f64, MouseEvent),

    /// Zoom is called around a point. This is different from [`UserEvent::Scroll`], as it is
    /// not produced by a mouse but rather by multi-touch gestures. The first parameter is the
    /// resolution multiplier.
    Zoom(f64, Point2d),
}

/// Value returned by an [`UserEventHandler`] to indicate the status of the event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// Event should be propagated to the next handler.
    Propagate,
    /// Event should not be propagated to the next handler.
    Stop,
    /// Event should not be propagated to the next handler, and the current event handler should
    /// be considered the owner of the event. This is used to indicate that the handler wants to
    /// take ownership of the [`UserEvent::DragStarted`], so that all consequent drag events are
    /// only processed by this handler.
    Consume,
}

/// Mouse button enum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button.
    Other,
}

/// State of the mouse at the moment of the event.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    /// Pointer position on the screen in pixels from the top-left corner.
    pub screen_pointer_position: Point2d,
    /// Longitude/latitude under the pointer. `None` if the map has no size yet.
    pub map_pointer_position: Option<Coord>,
    /// State of the mouse buttons.
    pub buttons: MouseButtonsState,
}

/// State of a mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButtonState {
    /// Button is pressed.
    Pressed,
    /// Button is not pressed.
    Released,
}

/// State of all mouse buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MouseButtonsState {
    /// State of the left mouse button.
    pub left: MouseButtonState,
    /// State of the middle mouse button.
    pub middle: MouseButtonState,
    /// State of the right mouse button.
    pub right: MouseButtonState,
}

impl MouseButtonsState {
    pub(crate) fn set_pressed(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Pressed);
    }

    pub(crate) fn set_released(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Released);
    }

    fn set_state(&mut self, button: MouseButton, state: MouseButtonState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
            MouseButton::Other => {}
        }
    }

    fn single_pressed(&self) -> Option<MouseButton> {
        let mut button = None;
        if self.left == MouseButtonState::Pressed && button.replace(MouseButton::Left).is_some() {
            return None;
        }
        if self.middle == MouseButtonState::Pressed && button.replace(MouseButton::Middle).is_some()
        {
            return None;
        }
        if self.right == MouseButtonState::Pressed && button.replace(MouseButton::Right).is_some() {
            return None;
        }

        button
    }
}

impl Default for MouseButtonsState {
    fn default() -> Self {
        Self {
            left: MouseButtonState::Released,
            middle: MouseButtonState::Released,
            right: MouseButtonState::Released,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_pressed_button() {
        let mut state = MouseButtonsState::default();
        assert_eq!(state.single_pressed(), None);

        state.set_pressed(MouseButton::Right);
        assert_eq!(state.single_pressed(), Some(MouseButton::Right));

        state.set_pressed(MouseButton::Left);
        assert_eq!(state.single_pressed(), None);

        state.set_released(MouseButton::Right);
        assert_eq!(state.single_pressed(), Some(MouseButton::Left));
    }
}
