use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::control::MapControllerConfiguration;
use crate::draw::ControlPosition;
use crate::edit::EditOptions;
use crate::error::DrawError;
use crate::layer::TileLayer;
use crate::primitives::Size;
use crate::tile_schema::web_resolution;
use crate::view::MapView;

/// Geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new position.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for Coord {
    fn from(value: LatLng) -> Self {
        crate::latlng!(value.lat, value.lng)
    }
}

/// Configuration of a [`MapHost`](super::MapHost).
///
/// All fields have defaults, so a JSON configuration only needs the values that differ:
///
/// ```
/// use mapdraw::host::HostOptions;
///
/// let options = HostOptions::from_json(r#"{ "zoom": 10, "scroll_wheel_zoom": true }"#).unwrap();
/// assert_eq!(options.zoom, 10.0);
/// assert_eq!(options.center.lat, 55.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostOptions {
    /// Initial center of the map.
    pub center: LatLng,
    /// Initial zoom level.
    pub zoom: f64,
    /// If false, the scroll wheel does not zoom the map.
    pub scroll_wheel_zoom: bool,
    /// Corner of the zoom control. `None` hides the control.
    pub zoom_control: Option<ControlPosition>,
    /// Base map.
    pub tile_layer: TileLayer,
    /// Minimum zoom level.
    pub min_zoom: u32,
    /// Maximum zoom level.
    pub max_zoom: u32,
    /// Options of the editing toolkit.
    pub edit: EditOptions,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            center: LatLng::new(55.0, -122.0),
            zoom: 5.0,
            scroll_wheel_zoom: false,
            zoom_control: Some(ControlPosition::BottomLeft),
            tile_layer: TileLayer::osm(),
            min_zoom: 0,
            max_zoom: 19,
            edit: EditOptions::default(),
        }
    }
}

impl HostOptions {
    /// Parses options from a JSON string. Missing fields take the default values.
    pub fn from_json(json: &str) -> Result<Self, DrawError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sets the initial center.
    pub fn with_center(mut self, lat: f64, lng: f64) -> Self {
        self.center = LatLng::new(lat, lng);
        self
    }

    /// Sets the initial zoom level.
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom;
        self
    }

    /// Enables or disables zooming with the scroll wheel.
    pub fn with_scroll_wheel_zoom(mut self, enabled: bool) -> Self {
        self.scroll_wheel_zoom = enabled;
        self
    }

    /// Sets the corner of the zoom control, or hides it with `None`.
    pub fn with_zoom_control(mut self, position: Option<ControlPosition>) -> Self {
        self.zoom_control = position;
        self
    }

    /// Sets the base map.
    pub fn with_tile_layer(mut self, tile_layer: TileLayer) -> Self {
        self.tile_layer = tile_layer;
        self
    }

    /// Sets the range of zoom levels.
    pub fn with_zoom_range(mut self, min_zoom: u32, max_zoom: u32) -> Self {
        self.min_zoom = min_zoom.min(max_zoom);
        self.max_zoom = max_zoom.max(min_zoom);
        self
    }

    /// Sets the options of the editing toolkit.
    pub fn with_edit_options(mut self, edit: EditOptions) -> Self {
        self.edit = edit;
        self
    }

    /// Initial view of a map of the given size. The zoom is clamped to the zoom range.
    pub fn initial_view(&self, size: Size) -> MapView {
        let (min_zoom, max_zoom) = self.zoom_range();
        let zoom = self.zoom.clamp(f64::from(min_zoom), f64::from(max_zoom));
        MapView::new(self.center.into(), web_resolution(zoom)).with_size(size)
    }

    /// Minimum and maximum zoom levels, in this order even if they were given swapped.
    pub fn zoom_range(&self) -> (u32, u32) {
        (
            self.min_zoom.min(self.max_zoom),
            self.min_zoom.max(self.max_zoom),
        )
    }

    /// Configuration of the map controller.
    pub fn controller_config(&self) -> MapControllerConfiguration {
        let (min_zoom, max_zoom) = self.zoom_range();
        MapControllerConfiguration::default()
            .with_zoom_range(min_zoom, max_zoom)
            .with_scroll_wheel_zoom(self.scroll_wheel_zoom)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use assert_matches::assert_matches;

    use super::*;
    use crate::tile_schema::web_zoom;

    #[test]
    fn defaults() {
        let options = HostOptions::default();
        assert_eq!(options.center, LatLng::new(55.0, -122.0));
        assert_eq!(options.zoom, 5.0);
        assert!(!options.scroll_wheel_zoom);
        assert_eq!(options.zoom_control, Some(ControlPosition::BottomLeft));
        assert_eq!(options.tile_layer, TileLayer::osm());
        assert!(!options.controller_config().scroll_wheel_zoom());
    }

    #[test]
    fn from_json() {
        let options = HostOptions::from_json(
            r#"{
                "center": { "lat": 40.5, "lng": -3.7 },
                "zoom": 12,
                "zoom_control": "topright",
                "edit": { "precision": null }
            }"#,
        )
        .unwrap();

        assert_eq!(options.center, LatLng::new(40.5, -3.7));
        assert_eq!(options.zoom, 12.0);
        assert_eq!(options.zoom_control, Some(ControlPosition::TopRight));
        assert_eq!(options.edit.precision, None);
        assert_eq!(options.max_zoom, 19);

        let options = HostOptions::from_json(r#"{ "zoom_control": null }"#).unwrap();
        assert_eq!(options.zoom_control, None);
    }

    #[test]
    fn invalid_json() {
        assert_matches!(
            HostOptions::from_json(r#"{ "zoom": "far" }"#),
            Err(DrawError::Config(_))
        );
    }

    #[test]
    fn initial_view_clamps_zoom() {
        let options = HostOptions::default()
            .with_center(10.0, 20.0)
            .with_zoom(25.0)
            .with_zoom_range(2, 15);
        let view = options.initial_view(Size::new(800.0, 600.0));

        assert_relative_eq!(web_zoom(view.resolution()), 15.0, epsilon = 1e-9);
        assert_relative_eq!(view.position().x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(view.position().y, 10.0, epsilon = 1e-9);
        assert_eq!(view.size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn swapped_zoom_range_from_json() {
        let options =
            HostOptions::from_json(r#"{ "zoom": 12, "min_zoom": 10, "max_zoom": 5 }"#).unwrap();
        assert_eq!(options.zoom_range(), (5, 10));

        let view = options.initial_view(Size::new(400.0, 300.0));
        assert_relative_eq!(web_zoom(view.resolution()), 10.0, epsilon = 1e-9);
    }
}
