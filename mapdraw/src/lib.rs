//! Mapdraw provides controls for drawing, editing and deleting shapes on an interactive map, and
//! reports the drawn geometry to the application as GeoJSON.
//!
//! # Quick start
//!
//! ```no_run
//! use mapdraw::draw::{DrawMode, DrawToolbox, GeometryReport};
//! use mapdraw::host::{HostOptions, MapHost};
//! use mapdraw::primitives::Size;
//!
//! let toolbox = DrawToolbox::new(|report: GeometryReport| {
//!     println!("{}", report.to_json().unwrap_or_default());
//! });
//! let mut host = MapHost::new(HostOptions::default().with_zoom(8.0), toolbox);
//!
//! // the UI reports that the map widget is laid out
//! host.map_ready(Size::new(800.0, 600.0)).unwrap();
//!
//! // "draw a polygon" button was clicked
//! host.act(|toolbox, session| toolbox.select_mode(Some(DrawMode::Polygon), session))
//!     .unwrap();
//! ```
//!
//! After that the UI feeds user input into [`MapHost::handle_raw_event`](host::MapHost) and
//! renders the [`Map`] with its overlays. The `mapdraw-egui` crate does this for `egui`
//! applications.
//!
//! # Main components
//!
//! * [`Map`] holds the current [`MapView`], the raster [`TileLayer`](layer::TileLayer) and the
//!   overlays drawn on top of it.
//! * [`EventProcessor`](control::EventProcessor) converts raw input into clicks, drags and zooms
//!   and gives them to the [`Editor`](edit::Editor) and the
//!   [`MapController`](control::MapController).
//! * [`EditSession`](edit::EditSession) is the editing toolkit: it starts and commits drawings,
//!   enables and disables editing of overlays and queues an [`EditEvent`](edit::EditEvent) for
//!   every change.
//! * [`draw`] contains the drawing controls that react to the edit events and report the geometry
//!   through a [`GeometrySink`](draw::GeometrySink).
//! * [`MapHost`](host::MapHost) ties it all together.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod control;
pub mod draw;
pub mod edit;
pub mod error;
pub mod host;
pub mod layer;
mod map;
mod messenger;
pub mod primitives;
pub mod projection;
pub mod shape;
pub mod tile_schema;
mod view;

#[cfg(test)]
pub(crate) mod tests;

pub use map::{Map, OverlayCollection};
pub use messenger::{DummyMessenger, Messenger};
pub use tile_schema::TileSchema;
pub use view::MapView;

// Reexport geometry crates used in the public API
pub use geo_types;
pub use geojson;

/// Creates a [`geo_types::Coord`] from latitude and longitude values (in degrees). Longitude
/// goes to `x`, latitude to `y`.
///
/// ```
/// use mapdraw::latlng;
///
/// let coord = latlng!(38.0, 52.0);
/// assert_eq!(coord.x, 52.0);
/// assert_eq!(coord.y, 38.0);
/// ```
#[macro_export]
macro_rules! latlng {
    ($lat:expr, $lng:expr) => {
        $crate::geo_types::Coord { x: $lng, y: $lat }
    };
}
