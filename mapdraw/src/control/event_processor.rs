use std::time::Duration;

use web_time::SystemTime;

use crate::control::{
    EventPropagation, MouseButtonsState, MouseEvent, RawUserEvent, UserEvent, UserEventHandler,
};
use crate::map::Map;
use crate::primitives::Point2d;

const DRAG_THRESHOLD: f64 = 3.0;
const CLICK_TIMEOUT: Duration = Duration::from_millis(200);
const DBL_CLICK_TIMEOUT: Duration = Duration::from_millis(500);

/// Converts [`RawUserEvent`]s into [`UserEvent`]s and gives them to event handlers.
///
/// The processor recognizes:
/// * a click: a button released within 200 ms after it was pressed, without dragging;
/// * a double click: a click within 500 ms after the previous click and no further than 3 px
///   (taxicab distance) from it;
/// * a drag: the pointer moved for more than 3 px (taxicab distance) with a single button
///   pressed.
#[derive(Debug)]
pub struct EventProcessor {
    pointer_position: Point2d,
    pointer_pressed_position: Point2d,

    buttons_state: MouseButtonsState,

    last_pressed_time: SystemTime,
    last_click_time: SystemTime,
    last_click_position: Point2d,

    drag_started: bool,
    drag_target: Option<usize>,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            pointer_position: Point2d::origin(),
            pointer_pressed_position: Point2d::origin(),
            buttons_state: Default::default(),
            last_pressed_time: SystemTime::UNIX_EPOCH,
            last_click_time: SystemTime::UNIX_EPOCH,
            last_click_position: Point2d::origin(),
            drag_started: false,
            drag_target: None,
        }
    }
}

impl EventProcessor {
    /// Last known pointer position in screen pixels.
    pub fn pointer_position(&self) -> Point2d {
        self.pointer_position
    }

    /// Processes the raw event and gives the resulting user events to the handlers in order,
    /// until one of them stops the propagation.
    pub fn handle(
        &mut self,
        event: RawUserEvent,
        map: &mut Map,
        handlers: &mut [&mut dyn UserEventHandler],
    ) {
        for user_event in self.process(event, map) {
            log::trace!("User event: {user_event:?}");
            let mut drag_start_target = None;

            for (index, handler) in handlers.iter_mut().enumerate() {
                if matches!(user_event, UserEvent::Drag(..) | UserEvent::DragEnded(..))
                    && self.drag_target != Some(index)
                {
                    continue;
                }

                match handler.handle(&user_event, map) {
                    EventPropagation::Propagate => {}
                    EventPropagation::Stop => break,
                    EventPropagation::Consume => {
                        if let UserEvent::DragStarted(button, _) = user_event {
                            drag_start_target = Some(index);

                            let delta = self.pointer_position - self.pointer_pressed_position;
                            let mouse_event = self.get_mouse_event(map);
                            handler.handle(&UserEvent::Drag(button, delta, mouse_event), map);
                        }

                        break;
                    }
                }
            }

            if drag_start_target.is_some() {
                self.drag_target = drag_start_target;
            }

            if matches!(user_event, UserEvent::DragEnded(..)) {
                self.drag_target = None;
            }
        }
    }

    fn process(&mut self, event: RawUserEvent, map: &Map) -> Vec<UserEvent> {
        let now = SystemTime::now();
        match event {
            RawUserEvent::ButtonPressed(button) => {
                self.buttons_state.set_pressed(button);
                self.last_pressed_time = now;
                self.pointer_pressed_position = self.pointer_position;
                self.drag_started = false;

                vec![UserEvent::ButtonPressed(button, self.get_mouse_event(map))]
            }
            RawUserEvent::ButtonReleased(button) => {
                self.buttons_state.set_released(button);
                let mut events = vec![UserEvent::ButtonReleased(
                    button,
                    self.get_mouse_event(map),
                )];

                if std::mem::take(&mut self.drag_started) {
                    if self.drag_target.is_some() {
                        events.push(UserEvent::DragEnded(button, self.get_mouse_event(map)));
                    }
                } else if now.duration_since(self.last_pressed_time).unwrap_or_default()
                    < CLICK_TIMEOUT
                {
                    events.push(UserEvent::Click(button, self.get_mouse_event(map)));

                    if now.duration_since(self.last_click_time).unwrap_or_default()
                        < DBL_CLICK_TIMEOUT
                        && taxicab_distance(self.pointer_position, self.last_click_position)
                            <= DRAG_THRESHOLD
                    {
                        events.push(UserEvent::DoubleClick(button, self.get_mouse_event(map)));
                        self.last_click_time = SystemTime::UNIX_EPOCH;
                    } else {
                        self.last_click_time = now;
                        self.last_click_position = self.pointer_position;
                    }
                }

                events
            }
            RawUserEvent::PointerMoved(position) => {
                let prev_position = self.pointer_position;
                self.pointer_position = position;

                let mut events = vec![UserEvent::PointerMoved(self.get_mouse_event(map))];
                if let Some(button) = self.buttons_state.single_pressed() {
                    if !self.drag_started
                        && taxicab_distance(position, self.pointer_pressed_position)
                            > DRAG_THRESHOLD
                    {
                        self.drag_started = true;
                        events.push(UserEvent::DragStarted(
                            button,
                            self.get_mouse_event_pos(map, self.pointer_pressed_position),
                        ));
                    } else if self.drag_target.is_some() {
                        events.push(UserEvent::Drag(
                            button,
                            position - prev_position,
                            self.get_mouse_event(map),
                        ));
                    }
                }

                events
            }
            RawUserEvent::Scroll(delta) => {
                vec![UserEvent::Scroll(delta, self.get_mouse_event(map))]
            }
            RawUserEvent::Zoom(zoom, center) => vec![UserEvent::Zoom(zoom, center)],
        }
    }

    fn get_mouse_event(&self, map: &Map) -> MouseEvent {
        self.get_mouse_event_pos(map, self.pointer_position)
    }

    fn get_mouse_event_pos(&self, map: &Map, screen_pointer_position: Point2d) -> MouseEvent {
        MouseEvent {
            screen_pointer_position,
            map_pointer_position: map.view().screen_to_lonlat(screen_pointer_position),
            buttons: self.buttons_state,
        }
    }
}

fn taxicab_distance(a: Point2d, b: Point2d) -> f64 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::control::MouseButton;
    use crate::layer::TileLayer;
    use crate::primitives::Size;
    use crate::view::MapView;

    fn map() -> Map {
        let mut map = Map::new(MapView::default(), TileLayer::osm(), None);
        map.set_size(Size::new(200.0, 100.0));
        map
    }

    fn record(
        processor: &mut EventProcessor,
        map: &mut Map,
        events: impl IntoIterator<Item = RawUserEvent>,
    ) -> Vec<UserEvent> {
        let mut log = vec![];
        let mut recorder = |event: &UserEvent, _: &mut Map| {
            log.push(event.clone());
            EventPropagation::Propagate
        };

        for event in events {
            processor.handle(event, map, &mut [&mut recorder]);
        }

        log
    }

    #[test]
    fn click_and_double_click() {
        let mut processor = EventProcessor::default();
        let mut map = map();

        let events = record(
            &mut processor,
            &mut map,
            [
                RawUserEvent::PointerMoved(Point2d::new(10.0, 10.0)),
                RawUserEvent::ButtonPressed(MouseButton::Left),
                RawUserEvent::ButtonReleased(MouseButton::Left),
            ],
        );

        assert_matches!(events.as_slice(), [
            UserEvent::PointerMoved(_),
            UserEvent::ButtonPressed(MouseButton::Left, _),
            UserEvent::ButtonReleased(MouseButton::Left, _),
            UserEvent::Click(MouseButton::Left, e),
        ] if e.screen_pointer_position == Point2d::new(10.0, 10.0) && e.map_pointer_position.is_some());

        let events = record(
            &mut processor,
            &mut map,
            [
                RawUserEvent::ButtonPressed(MouseButton::Left),
                RawUserEvent::ButtonReleased(MouseButton::Left),
            ],
        );
        assert_matches!(
            events.as_slice(),
            [
                UserEvent::ButtonPressed(..),
                UserEvent::ButtonReleased(..),
                UserEvent::Click(..),
                UserEvent::DoubleClick(..),
            ]
        );
    }

    #[test]
    fn quick_clicks_at_different_places_are_not_double_click() {
        let mut processor = EventProcessor::default();
        let mut map = map();

        let events = record(
            &mut processor,
            &mut map,
            [
                RawUserEvent::PointerMoved(Point2d::new(10.0, 10.0)),
                RawUserEvent::ButtonPressed(MouseButton::Left),
                RawUserEvent::ButtonReleased(MouseButton::Left),
                RawUserEvent::PointerMoved(Point2d::new(80.0, 10.0)),
                RawUserEvent::ButtonPressed(MouseButton::Left),
                RawUserEvent::ButtonReleased(MouseButton::Left),
                RawUserEvent::PointerMoved(Point2d::new(81.0, 11.0)),
                RawUserEvent::ButtonPressed(MouseButton::Left),
                RawUserEvent::ButtonReleased(MouseButton::Left),
            ],
        );

        let clicks = events
            .iter()
            .filter(|e| matches!(e, UserEvent::Click(..)))
            .count();
        let double_clicks: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                UserEvent::DoubleClick(_, e) => Some(e.screen_pointer_position),
                _ => None,
            })
            .collect();

        assert_eq!(clicks, 3);
        assert_eq!(double_clicks, vec![Point2d::new(81.0, 11.0)]);
    }

    #[test]
    fn small_movement_is_not_a_drag() {
        let mut processor = EventProcessor::default();
        let mut map = map();

        let events = record(
            &mut processor,
            &mut map,
            [
                RawUserEvent::ButtonPressed(MouseButton::Left),
                RawUserEvent::PointerMoved(Point2d::new(1.0, 1.0)),
                RawUserEvent::ButtonReleased(MouseButton::Left),
            ],
        );

        assert!(events.iter().any(|e| matches!(e, UserEvent::Click(..))));
        assert!(!events
            .iter()
            .any(|e| matches!(e, UserEvent::DragStarted(..))));
    }

    #[test]
    fn drag_goes_to_consuming_handler_only() {
        let mut processor = EventProcessor::default();
        let mut map = map();

        let mut owner_log = vec![];
        let mut owner = |event: &UserEvent, _: &mut Map| {
            owner_log.push(event.clone());
            match event {
                UserEvent::DragStarted(..) => EventPropagation::Consume,
                _ => EventPropagation::Propagate,
            }
        };
        let mut other_log = vec![];
        let mut other = |event: &UserEvent, _: &mut Map| {
            other_log.push(event.clone());
            EventPropagation::Propagate
        };

        for event in [
            RawUserEvent::PointerMoved(Point2d::new(50.0, 50.0)),
            RawUserEvent::ButtonPressed(MouseButton::Left),
            RawUserEvent::PointerMoved(Point2d::new(60.0, 50.0)),
            RawUserEvent::PointerMoved(Point2d::new(65.0, 45.0)),
            RawUserEvent::ButtonReleased(MouseButton::Left),
        ] {
            processor.handle(event, &mut map, &mut [&mut owner, &mut other]);
        }

        let drags: Vec<_> = owner_log
            .iter()
            .filter_map(|e| match e {
                UserEvent::Drag(_, delta, _) => Some(*delta),
                _ => None,
            })
            .collect();
        assert_eq!(drags.len(), 2);
        assert_eq!(drags[0].x, 10.0);
        assert_eq!(drags[1].x, 5.0);
        assert_eq!(drags[1].y, -5.0);

        assert!(owner_log
            .iter()
            .any(|e| matches!(e, UserEvent::DragEnded(..))));
        assert!(!owner_log.iter().any(|e| matches!(e, UserEvent::Click(..))));

        assert!(!other_log.iter().any(|e| matches!(
            e,
            UserEvent::DragStarted(..) | UserEvent::Drag(..) | UserEvent::DragEnded(..)
        )));
        assert!(other_log
            .iter()
            .any(|e| matches!(e, UserEvent::ButtonReleased(..))));
    }

    #[test]
    fn drag_start_has_pressed_position() {
        let mut processor = EventProcessor::default();
        let mut map = map();

        let events = record(
            &mut processor,
            &mut map,
            [
                RawUserEvent::PointerMoved(Point2d::new(20.0, 20.0)),
                RawUserEvent::ButtonPressed(MouseButton::Left),
                RawUserEvent::PointerMoved(Point2d::new(30.0, 20.0)),
            ],
        );

        assert_matches!(events.last(), Some(UserEvent::DragStarted(MouseButton::Left, e))
            if e.screen_pointer_position == Point2d::new(20.0, 20.0));
    }
}
