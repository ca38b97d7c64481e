//! Drawing controls: the UI logic that turns user actions into drawn, edited and deleted shapes,
//! and reports the resulting geometry to the application.
//!
//! Two controls are provided:
//! * [`SimpleDrawControl`] draws a single rectangle with edit, save and delete actions;
//! * [`DrawToolbox`] draws polylines, polygons, rectangles, circles and markers and converts them
//!   into polygons.
//!
//! Both report geometry through a [`GeometrySink`]. A closure taking [`GeometryReport`] can be
//! used as a sink:
//!
//! ```
//! use mapdraw::draw::{DrawToolbox, GeometryReport};
//!
//! let toolbox = DrawToolbox::new(|report: GeometryReport| {
//!     println!("{}", report.to_json().unwrap_or_default());
//! });
//! ```

use geojson::{Feature, FeatureCollection};
use serde::{Deserialize, Serialize};

use crate::edit::{EditEvent, EditSession};
use crate::error::DrawError;
use crate::shape::ShapeKind;

mod normalize;
mod prompt;
mod simple;
mod state;
mod toolbox;

pub use normalize::{normalize, Normalized, MARKER_RADIUS};
pub use prompt::{BufferWidthRequest, BUFFER_WIDTH_MESSAGE, DEFAULT_BUFFER_WIDTH};
pub use simple::SimpleDrawControl;
pub use state::{DrawState, Transition};
pub use toolbox::DrawToolbox;

/// Message shown to the user when a drawn shape cannot be converted into a geometry.
pub const NOT_ENOUGH_VERTICES_MESSAGE: &str = "Not enough vertices to draw";

/// Geometry reported by a drawing control to the application.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryReport {
    /// There is no geometry anymore.
    Cleared,
    /// A single feature. Reported by [`SimpleDrawControl`].
    Feature(Feature),
    /// A sequence of features. [`DrawToolbox`] reports one-element sequences, and an empty one
    /// when a shape is taken back for editing.
    Features(Vec<Feature>),
}

impl GeometryReport {
    /// Reported features.
    pub fn features(&self) -> &[Feature] {
        match self {
            GeometryReport::Cleared => &[],
            GeometryReport::Feature(feature) => std::slice::from_ref(feature),
            GeometryReport::Features(features) => features,
        }
    }

    /// Reported features as a feature collection. Returns `None` for [`GeometryReport::Cleared`].
    pub fn to_feature_collection(&self) -> Option<FeatureCollection> {
        match self {
            GeometryReport::Cleared => None,
            _ => Some(FeatureCollection {
                bbox: None,
                features: self.features().to_vec(),
                foreign_members: None,
            }),
        }
    }

    /// JSON representation of the report: `null`, a feature object or an array of features.
    pub fn to_json(&self) -> Result<String, DrawError> {
        let json = match self {
            GeometryReport::Cleared => serde_json::to_string(&serde_json::Value::Null)?,
            GeometryReport::Feature(feature) => serde_json::to_string(feature)?,
            GeometryReport::Features(features) => serde_json::to_string(features)?,
        };

        Ok(json)
    }
}

/// Receiver of the geometry produced by a drawing control.
pub trait GeometrySink {
    /// Called every time the geometry of the control changes.
    fn set_geometry(&mut self, report: GeometryReport);

    /// Shows a blocking message to the user. By default the message is logged.
    fn alert(&mut self, message: &str) {
        log::warn!("{message}");
    }
}

impl<F: FnMut(GeometryReport)> GeometrySink for F {
    fn set_geometry(&mut self, report: GeometryReport) {
        self(report)
    }
}

/// Tool selected in a drawing control.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawMode {
    /// Draw a line that is converted into a buffered polygon.
    Polyline,
    /// Draw a polygon.
    Polygon,
    /// Drop a marker that is converted into a small circle polygon.
    Marker,
    /// Draw a rectangle.
    Rectangle,
    /// Draw a circle that is converted into a polygon.
    Circle,
    /// Delete the current shape.
    Delete,
}

impl DrawMode {
    /// Modes the toolbox has buttons for, in the button order.
    pub const ALL: [DrawMode; 6] = [
        DrawMode::Polyline,
        DrawMode::Polygon,
        DrawMode::Rectangle,
        DrawMode::Circle,
        DrawMode::Marker,
        DrawMode::Delete,
    ];

    /// Kind of the shape drawn in this mode. `None` for [`DrawMode::Delete`].
    pub fn shape_kind(&self) -> Option<ShapeKind> {
        match self {
            DrawMode::Polyline => Some(ShapeKind::Polyline),
            DrawMode::Polygon => Some(ShapeKind::Polygon),
            DrawMode::Marker => Some(ShapeKind::Marker),
            DrawMode::Rectangle => Some(ShapeKind::Rectangle),
            DrawMode::Circle => Some(ShapeKind::Circle),
            DrawMode::Delete => None,
        }
    }

    /// Short description of the tool.
    pub fn label(&self) -> &'static str {
        match self {
            DrawMode::Polyline => "draw a polyline",
            DrawMode::Polygon => "draw a polygon",
            DrawMode::Marker => "drop a marker on the map",
            DrawMode::Rectangle => "draw rectangle",
            DrawMode::Circle => "draw circle",
            DrawMode::Delete => "delete geometry",
        }
    }
}

impl From<ShapeKind> for DrawMode {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Polyline => DrawMode::Polyline,
            ShapeKind::Polygon => DrawMode::Polygon,
            ShapeKind::Rectangle => DrawMode::Rectangle,
            ShapeKind::Circle => DrawMode::Circle,
            ShapeKind::Marker => DrawMode::Marker,
        }
    }
}

/// Corner of the map a control is placed in.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlPosition {
    /// Top left corner.
    #[default]
    #[serde(alias = "top_left")]
    TopLeft,
    /// Top right corner.
    #[serde(alias = "top_right")]
    TopRight,
    /// Bottom left corner.
    #[serde(alias = "bottom_left")]
    BottomLeft,
    /// Bottom right corner.
    #[serde(alias = "bottom_right")]
    BottomRight,
}

/// A drawing control hosted by a [`MapHost`](crate::host::MapHost).
pub trait DrawingControl {
    /// Corner of the map the control buttons are placed in.
    fn position(&self) -> ControlPosition;

    /// Called once when the map is ready and the control is mounted on it.
    fn on_mount(&mut self, _session: &mut EditSession) -> Result<(), DrawError> {
        Ok(())
    }

    /// Called for every event emitted by the editing toolkit.
    fn on_edit_event(&mut self, event: &EditEvent, session: &mut EditSession);
}
