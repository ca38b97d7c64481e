//! Fixtures shared by the unit tests.

use crate::control::{MouseButton, MouseButtonsState, MouseEvent, UserEvent};
use crate::draw::{DrawingControl, GeometryReport, GeometrySink};
use crate::edit::EditSession;
use crate::layer::TileLayer;
use crate::primitives::{Point2d, Size, Vector2d};
use crate::tile_schema::web_resolution;
use crate::{latlng, Map, MapView};

/// Session bound to a 400x300 map centered at 55N 122W on zoom level 5.
pub(crate) fn test_session() -> EditSession {
    let _ = env_logger::builder().is_test(true).try_init();

    let view = MapView::new(latlng!(55.0, -122.0), web_resolution(5.0))
        .with_size(Size::new(400.0, 300.0));
    EditSession::new(Map::new(view, TileLayer::osm(), None))
}

/// Sink that stores everything it receives.
#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub reports: Vec<GeometryReport>,
    pub alerts: Vec<String>,
}

impl GeometrySink for RecordingSink {
    fn set_geometry(&mut self, report: GeometryReport) {
        self.reports.push(report);
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

/// Delivers all queued edit events to the control.
pub(crate) fn dispatch(control: &mut impl DrawingControl, session: &mut EditSession) {
    while let Some(event) = session.next_event() {
        control.on_edit_event(&event, session);
    }
}

fn mouse_at(session: &EditSession, x: f64, y: f64) -> MouseEvent {
    let position = Point2d::new(x, y);
    MouseEvent {
        screen_pointer_position: position,
        map_pointer_position: session.map().view().screen_to_lonlat(position),
        buttons: MouseButtonsState::default(),
    }
}

/// Left click at the screen position.
pub(crate) fn click(session: &mut EditSession, x: f64, y: f64) {
    let event = mouse_at(session, x, y);
    session.handle_event(&UserEvent::ButtonPressed(MouseButton::Left, event.clone()));
    session.handle_event(&UserEvent::ButtonReleased(MouseButton::Left, event.clone()));
    session.handle_event(&UserEvent::Click(MouseButton::Left, event));
}

/// Drag gesture from one screen position to another, as the event processor reports it.
pub(crate) fn draw_rectangle(session: &mut EditSession, from: (f64, f64), to: (f64, f64)) {
    let start = mouse_at(session, from.0, from.1);
    let end = mouse_at(session, to.0, to.1);
    let delta = Vector2d::new(to.0 - from.0, to.1 - from.1);

    session.handle_event(&UserEvent::ButtonPressed(MouseButton::Left, start.clone()));
    session.handle_event(&UserEvent::DragStarted(MouseButton::Left, start));
    session.handle_event(&UserEvent::Drag(MouseButton::Left, delta, end.clone()));
    session.handle_event(&UserEvent::ButtonReleased(MouseButton::Left, end.clone()));
    session.handle_event(&UserEvent::DragEnded(MouseButton::Left, end));
}
