use std::collections::VecDeque;

use geo_types::{Coord, Rect};

use super::{EditEvent, EditOptions};
use crate::control::{EventPropagation, MouseButton, MouseEvent, UserEvent, UserEventHandler};
use crate::error::DrawError;
use crate::layer::{Overlay, OverlayId};
use crate::map::Map;
use crate::primitives::Point2d;
use crate::shape::{ground_distance, Circle, Shape, ShapeKind};

/// Drawing and editing state of the map overlays.
///
/// The editor captures user gestures for the overlay being drawn and for the handles of editable
/// overlays:
/// * polyline and polygon: every click adds a vertex; a double click, a click on the last vertex
///   or (for polygons) a click on the first vertex finishes the drawing;
/// * rectangle: press the button at one corner and drag to the opposite one;
/// * circle: press the button at the center and drag to set the radius;
/// * marker: click at the position.
///
/// Handles of editable overlays (vertices, rectangle corners, circle center and radius point,
/// marker position) can be dragged.
///
/// Everything the editor does is recorded as [`EditEvent`]s.
#[derive(Debug, Default)]
pub struct Editor {
    options: EditOptions,
    drawing: Option<OverlayId>,
    gesture: Option<Gesture>,
    events: VecDeque<EditEvent>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum Gesture {
    /// Button was pressed to place a rectangle or a circle at the anchor point.
    Placing {
        overlay: OverlayId,
        anchor: Coord,
        dragged: bool,
    },
    /// A handle of an editable overlay is dragged.
    Handle { overlay: OverlayId, index: usize },
}

impl Editor {
    /// Creates a new editor.
    pub fn new(options: EditOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Editing options.
    pub fn options(&self) -> &EditOptions {
        &self.options
    }

    /// The overlay being drawn.
    pub fn drawing(&self) -> Option<OverlayId> {
        self.drawing
    }

    pub(crate) fn start_drawing(&mut self, map: &mut Map, kind: ShapeKind) -> OverlayId {
        self.stop_drawing(map);

        let overlay = map.add_overlay(Overlay::drawing(kind));
        self.drawing = Some(overlay);
        log::debug!("Started drawing {kind:?} overlay {overlay}");
        self.events
            .push_back(EditEvent::DrawingStart { overlay, kind });

        overlay
    }

    pub(crate) fn stop_drawing(&mut self, map: &mut Map) {
        let Some(overlay) = self.drawing.take() else {
            return;
        };

        self.gesture = None;
        if let Some(entry) = map.overlays_mut().get_mut(overlay) {
            entry.set_drawing(false);
        }

        log::debug!("Drawing of overlay {overlay} cancelled");
        self.events.push_back(EditEvent::DrawingCancel { overlay });
        map.redraw();
    }

    pub(crate) fn commit_drawing(&mut self, map: &mut Map) {
        let Some(overlay) = self.drawing.take() else {
            return;
        };

        self.gesture = None;
        if let Some(entry) = map.overlays_mut().get_mut(overlay) {
            entry.set_drawing(false);
        }

        log::debug!("Drawing of overlay {overlay} committed");
        self.events.push_back(EditEvent::DrawingCommit { overlay });
        map.redraw();
    }

    pub(crate) fn enable_edit(&mut self, map: &mut Map, overlay: OverlayId) -> Result<(), DrawError> {
        let entry = map
            .overlays_mut()
            .get_mut(overlay)
            .ok_or(DrawError::NoActiveShape)?;

        if !entry.is_editing() {
            entry.set_editing(true);
            self.events.push_back(EditEvent::Enable { overlay });
            map.redraw();
        }

        Ok(())
    }

    pub(crate) fn disable_edit(
        &mut self,
        map: &mut Map,
        overlay: OverlayId,
    ) -> Result<(), DrawError> {
        let entry = map
            .overlays_mut()
            .get_mut(overlay)
            .ok_or(DrawError::NoActiveShape)?;

        if self.drawing == Some(overlay) {
            self.drawing = None;
            self.gesture = None;
            entry.set_drawing(false);
        }

        if entry.is_editing() {
            entry.set_editing(false);
            self.events.push_back(EditEvent::Disable { overlay });
            map.redraw();
        }

        Ok(())
    }

    /// Drops any state about the overlay. Called when the overlay is removed from the map.
    pub(crate) fn forget(&mut self, overlay: OverlayId) {
        if self.drawing == Some(overlay) {
            self.drawing = None;
        }

        if self
            .gesture
            .is_some_and(|gesture| gesture.overlay() == overlay)
        {
            self.gesture = None;
        }
    }

    pub(crate) fn next_event(&mut self) -> Option<EditEvent> {
        self.events.pop_front()
    }

    pub(crate) fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    fn on_click(&mut self, map: &mut Map, event: &MouseEvent) -> EventPropagation {
        if let Some(Gesture::Placing {
            overlay,
            dragged: false,
            ..
        }) = self.gesture
        {
            // a click without dragging does not place the shape
            self.gesture = None;
            if let Some(entry) = map.overlays_mut().get_mut(overlay) {
                *entry.shape_mut() = Shape::empty(entry.kind());
            }

            map.redraw();
            return EventPropagation::Stop;
        }

        let Some(overlay) = self.drawing else {
            return EventPropagation::Propagate;
        };
        let Some(position) = event.map_pointer_position else {
            return EventPropagation::Propagate;
        };

        let tolerance = self.options.handle_tolerance;
        let view = *map.view();
        let Some(entry) = map.overlays_mut().get_mut(overlay) else {
            return EventPropagation::Propagate;
        };

        match entry.shape_mut() {
            Shape::Marker(marker) => {
                *marker = Some(position);
                self.commit_drawing(map);
            }
            shape @ (Shape::Polyline(_) | Shape::Polygon(_)) => {
                let near = |vertex: Option<&Coord>| {
                    vertex
                        .and_then(|v| view.lonlat_to_screen(*v))
                        .is_some_and(|px| {
                            screen_distance(px, event.screen_pointer_position) <= tolerance
                        })
                };

                let complete = shape.is_complete();
                let (near_first, near_last) = match &*shape {
                    Shape::Polygon(vertices) => (near(vertices.first()), near(vertices.last())),
                    Shape::Polyline(vertices) => (false, near(vertices.last())),
                    _ => (false, false),
                };

                if complete && (near_first || near_last) {
                    self.commit_drawing(map);
                } else if !near_last && shape.push_vertex(position) {
                    log::trace!("Vertex {position:?} added to overlay {overlay}");
                    self.events.push_back(EditEvent::Editing { overlay });
                    map.redraw();
                }
            }
            Shape::Rectangle(_) | Shape::Circle(_) => return EventPropagation::Propagate,
        }

        EventPropagation::Stop
    }

    fn on_double_click(&mut self, map: &mut Map) -> EventPropagation {
        let Some(overlay) = self.drawing else {
            return EventPropagation::Propagate;
        };

        match map.overlay(overlay).map(Overlay::kind) {
            Some(ShapeKind::Polyline | ShapeKind::Polygon) => {
                self.commit_drawing(map);
                EventPropagation::Stop
            }
            _ => EventPropagation::Propagate,
        }
    }

    fn on_button_pressed(&mut self, map: &mut Map, event: &MouseEvent) -> EventPropagation {
        let Some(overlay) = self.drawing else {
            return EventPropagation::Propagate;
        };
        let Some(anchor) = event.map_pointer_position else {
            return EventPropagation::Propagate;
        };
        let Some(entry) = map.overlays_mut().get_mut(overlay) else {
            return EventPropagation::Propagate;
        };

        match entry.shape_mut() {
            Shape::Rectangle(rect) => *rect = Some(Rect::new(anchor, anchor)),
            Shape::Circle(circle) => *circle = Some(Circle::new(anchor, 0.0)),
            _ => return EventPropagation::Propagate,
        }

        self.gesture = Some(Gesture::Placing {
            overlay,
            anchor,
            dragged: false,
        });
        map.redraw();

        EventPropagation::Stop
    }

    fn on_drag_started(&mut self, map: &Map, event: &MouseEvent) -> EventPropagation {
        if let Some(Gesture::Placing { dragged, .. }) = &mut self.gesture {
            *dragged = true;
            return EventPropagation::Consume;
        }

        if self.drawing.is_some() {
            // handles of other overlays cannot be grabbed while drawing, the map pans instead
            return EventPropagation::Propagate;
        }

        match self.find_handle(map, event.screen_pointer_position) {
            Some((overlay, index)) => {
                self.gesture = Some(Gesture::Handle { overlay, index });
                EventPropagation::Consume
            }
            None => EventPropagation::Propagate,
        }
    }

    fn on_drag(&mut self, map: &mut Map, event: &MouseEvent) -> EventPropagation {
        let Some(gesture) = self.gesture else {
            return EventPropagation::Propagate;
        };
        let Some(position) = event.map_pointer_position else {
            return EventPropagation::Stop;
        };
        let Some(entry) = map.overlays_mut().get_mut(gesture.overlay()) else {
            self.gesture = None;
            return EventPropagation::Propagate;
        };

        match gesture {
            Gesture::Placing { anchor, .. } => match entry.shape_mut() {
                Shape::Rectangle(rect) => *rect = Some(Rect::new(anchor, position)),
                Shape::Circle(circle) => {
                    *circle = Some(Circle::new(anchor, ground_distance(anchor, position)))
                }
                _ => {}
            },
            Gesture::Handle { overlay, index } => {
                entry.shape_mut().move_handle(index, position);
                self.events.push_back(EditEvent::Editing { overlay });
            }
        }

        map.redraw();
        EventPropagation::Stop
    }

    fn on_drag_ended(&mut self, map: &mut Map) -> EventPropagation {
        match self.gesture.take() {
            Some(Gesture::Placing { overlay, .. }) if self.drawing == Some(overlay) => {
                self.commit_drawing(map);
                EventPropagation::Stop
            }
            Some(_) => EventPropagation::Stop,
            None => EventPropagation::Propagate,
        }
    }

    fn find_handle(&self, map: &Map, screen_position: Point2d) -> Option<(OverlayId, usize)> {
        let view = map.view();
        map.overlays()
            .iter_top_down()
            .filter(|(_, overlay)| overlay.is_editing() && !overlay.is_drawing())
            .find_map(|(id, overlay)| {
                overlay
                    .shape()
                    .handles()
                    .iter()
                    .position(|handle| {
                        view.lonlat_to_screen(*handle).is_some_and(|px| {
                            screen_distance(px, screen_position) <= self.options.handle_tolerance
                        })
                    })
                    .map(|index| (id, index))
            })
    }
}

impl Gesture {
    fn overlay(&self) -> OverlayId {
        match self {
            Gesture::Placing { overlay, .. } | Gesture::Handle { overlay, .. } => *overlay,
        }
    }
}

impl UserEventHandler for Editor {
    fn handle(&mut self, event: &UserEvent, map: &mut Map) -> EventPropagation {
        match event {
            UserEvent::Click(MouseButton::Left, e) => self.on_click(map, e),
            UserEvent::DoubleClick(MouseButton::Left, _) => self.on_double_click(map),
            UserEvent::ButtonPressed(MouseButton::Left, e) => self.on_button_pressed(map, e),
            UserEvent::DragStarted(MouseButton::Left, e) => self.on_drag_started(map, e),
            UserEvent::Drag(MouseButton::Left, _, e) => self.on_drag(map, e),
            UserEvent::DragEnded(MouseButton::Left, _) => self.on_drag_ended(map),
            _ => EventPropagation::Propagate,
        }
    }
}

fn screen_distance(a: Point2d, b: Point2d) -> f64 {
    (a - b).norm()
}
