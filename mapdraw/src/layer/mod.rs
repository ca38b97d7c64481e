//! Layers of the map: the raster base layer and the overlays drawn on top of it.

use serde::{Deserialize, Serialize};

use crate::tile_schema::{TileIndex, TileSchema};

pub mod attribution;
mod overlay;

pub use attribution::Attribution;
pub use overlay::{Overlay, OverlayId};

const OSM_URL_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_MAX_ZOOM: u32 = 19;

/// Raster base layer of the map.
///
/// The layer only describes where tile images come from. Loading and displaying the images is
/// done by the UI integration (see the `mapdraw-egui` crate).
///
/// Tile URL is built from a template with `{z}`, `{x}`, `{y}` placeholders for the tile index and
/// an optional `{s}` placeholder for the subdomain:
///
/// ```
/// use mapdraw::layer::TileLayer;
/// use mapdraw::tile_schema::TileIndex;
///
/// let layer = TileLayer::osm();
/// assert_eq!(
///     layer.tile_url(TileIndex::new(1, 2, 3)),
///     "https://a.tile.openstreetmap.org/3/1/2.png"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileLayer {
    url_template: String,
    subdomains: Vec<String>,
    attribution: Option<Attribution>,
    max_zoom: u32,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::osm()
    }
}

impl TileLayer {
    /// Creates a layer with the given URL template and no subdomains.
    pub fn new(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            subdomains: vec![],
            attribution: None,
            max_zoom: OSM_MAX_ZOOM,
        }
    }

    /// Open Street Map tiles.
    pub fn osm() -> Self {
        Self::new(OSM_URL_TEMPLATE)
            .with_subdomains(["a", "b", "c"])
            .with_attribution(Attribution::new(
                "© OpenStreetMap contributors",
                Some("https://osm.org/copyright".to_string()),
            ))
    }

    /// Sets the subdomains substituted for `{s}` in the template.
    pub fn with_subdomains<S: Into<String>>(
        mut self,
        subdomains: impl IntoIterator<Item = S>,
    ) -> Self {
        self.subdomains = subdomains.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the attribution of the layer.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Sets the maximum zoom level tiles are available for.
    pub fn with_max_zoom(mut self, max_zoom: u32) -> Self {
        self.max_zoom = max_zoom;
        self
    }

    /// Attribution of the layer, if available.
    pub fn attribution(&self) -> Option<&Attribution> {
        self.attribution.as_ref()
    }

    /// Maximum zoom level tiles are available for.
    pub fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    /// Tile schema of the layer.
    pub fn tile_schema(&self) -> TileSchema {
        TileSchema::web(self.max_zoom)
    }

    /// URL of the tile image with the given index.
    pub fn tile_url(&self, index: TileIndex) -> String {
        let mut url = self
            .url_template
            .replace("{z}", &index.z.to_string())
            .replace("{x}", &index.x.to_string())
            .replace("{y}", &index.y.to_string());

        if !self.subdomains.is_empty() {
            let subdomain_index =
                (index.x + index.y).unsigned_abs() as usize % self.subdomains.len();
            url = url.replace("{s}", &self.subdomains[subdomain_index]);
        }

        url
    }
}
