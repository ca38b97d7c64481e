//! Editing toolkit: interactive drawing and editing of map overlays.
//!
//! An [`EditSession`] is bound to a [`Map`] and is the only way drawing controls change the map
//! overlays. It starts and stops drawing gestures, commits drawings, enables and disables
//! editing of overlays, and queues an [`EditEvent`] for every change so that the host can
//! deliver them to the drawing control.

use geojson::Feature;
use serde::{Deserialize, Serialize};

use crate::control::{EventPropagation, UserEvent, UserEventHandler};
use crate::error::DrawError;
use crate::layer::{Overlay, OverlayId};
use crate::map::Map;
use crate::shape::{Shape, ShapeKind, DEFAULT_PRECISION};

mod editor;
mod event;

pub use editor::Editor;
pub use event::EditEvent;

/// Options of the editing toolkit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditOptions {
    /// Number of decimal digits kept in coordinates of exported features. `None` keeps full
    /// precision.
    pub precision: Option<u32>,
    /// Distance in pixels from a vertex at which the pointer grabs it.
    pub handle_tolerance: f64,
}

impl Default for EditOptions {
    fn default() -> Self {
        Self {
            precision: Some(DEFAULT_PRECISION),
            handle_tolerance: 8.0,
        }
    }
}

/// Editing toolkit bound to a map.
#[derive(Debug)]
pub struct EditSession {
    map: Map,
    editor: Editor,
}

impl EditSession {
    /// Binds a new editing toolkit to the map.
    pub fn new(map: Map) -> Self {
        Self::with_options(map, EditOptions::default())
    }

    /// Binds a new editing toolkit with the given options to the map.
    pub fn with_options(map: Map, options: EditOptions) -> Self {
        Self {
            map,
            editor: Editor::new(options),
        }
    }

    /// The map the toolkit is bound to.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Mutable reference to the map the toolkit is bound to.
    pub fn map_mut(&mut self) -> &mut Map {
        &mut self.map
    }

    /// Drawing and editing state.
    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// The map and the editor as separate references, to give them to an
    /// [`EventProcessor`](crate::control::EventProcessor).
    pub fn parts_mut(&mut self) -> (&mut Map, &mut Editor) {
        (&mut self.map, &mut self.editor)
    }

    /// Starts drawing a new overlay of the given kind. A drawing in progress is stopped first.
    pub fn start_drawing(&mut self, kind: ShapeKind) -> OverlayId {
        self.editor.start_drawing(&mut self.map, kind)
    }

    /// Starts drawing a polyline.
    pub fn start_polyline(&mut self) -> OverlayId {
        self.start_drawing(ShapeKind::Polyline)
    }

    /// Starts drawing a polygon.
    pub fn start_polygon(&mut self) -> OverlayId {
        self.start_drawing(ShapeKind::Polygon)
    }

    /// Starts drawing a rectangle.
    pub fn start_rectangle(&mut self) -> OverlayId {
        self.start_drawing(ShapeKind::Rectangle)
    }

    /// Starts drawing a circle.
    pub fn start_circle(&mut self) -> OverlayId {
        self.start_drawing(ShapeKind::Circle)
    }

    /// Starts placing a marker.
    pub fn start_marker(&mut self) -> OverlayId {
        self.start_drawing(ShapeKind::Marker)
    }

    /// The overlay being drawn.
    pub fn drawing(&self) -> Option<OverlayId> {
        self.editor.drawing()
    }

    /// Stops the drawing in progress without committing it. Emits [`EditEvent::DrawingCancel`].
    /// The overlay stays on the map.
    pub fn stop_drawing(&mut self) {
        self.editor.stop_drawing(&mut self.map)
    }

    /// Finishes the drawing in progress. Emits [`EditEvent::DrawingCommit`]. The overlay stays
    /// editable.
    pub fn commit_drawing(&mut self) {
        self.editor.commit_drawing(&mut self.map)
    }

    /// Makes the overlay editable. Emits [`EditEvent::Enable`] if it was not editable.
    pub fn enable_edit(&mut self, overlay: OverlayId) -> Result<(), DrawError> {
        self.editor.enable_edit(&mut self.map, overlay)
    }

    /// Makes the overlay static. Emits [`EditEvent::Disable`] if it was editable.
    pub fn disable_edit(&mut self, overlay: OverlayId) -> Result<(), DrawError> {
        self.editor.disable_edit(&mut self.map, overlay)
    }

    /// Adds a static overlay with the given shape.
    pub fn add_overlay(&mut self, shape: Shape) -> OverlayId {
        self.map.add_overlay(Overlay::new(shape))
    }

    /// Removes the overlay from the map without emitting any events.
    pub fn remove_overlay(&mut self, overlay: OverlayId) -> Option<Overlay> {
        self.editor.forget(overlay);
        self.map.remove_overlay(overlay)
    }

    /// Converts the overlay into a GeoJSON feature with the coordinate precision of the
    /// toolkit options.
    pub fn to_feature(&self, overlay: OverlayId) -> Result<Feature, DrawError> {
        self.map
            .overlay(overlay)
            .ok_or(DrawError::NoActiveShape)?
            .shape()
            .to_feature(self.editor.options().precision)
    }

    /// Gives the user event to the editor.
    pub fn handle_event(&mut self, event: &UserEvent) -> EventPropagation {
        self.editor.handle(event, &mut self.map)
    }

    /// Takes the oldest queued edit event.
    pub fn next_event(&mut self) -> Option<EditEvent> {
        self.editor.next_event()
    }

    /// Returns true if there are queued edit events.
    pub fn has_events(&self) -> bool {
        self.editor.has_events()
    }

    /// Takes all queued edit events.
    pub fn take_events(&mut self) -> Vec<EditEvent> {
        std::iter::from_fn(|| self.editor.next_event()).collect()
    }
}
