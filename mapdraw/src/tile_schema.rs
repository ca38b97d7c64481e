//! [`TileSchema`] calculates which [tiles](TileIndex) of the base layer are needed for a
//! given [`MapView`].

use serde::{Deserialize, Serialize};

use crate::primitives::Point2d;
use crate::view::MapView;

const RESOLUTION_TOLERANCE: f64 = 0.01;
const INDEX_TOLERANCE: f64 = 1e-6;
const WEB_TOP_RESOLUTION: f64 = 156543.03392800014;
const WEB_ORIGIN: f64 = WEB_TOP_RESOLUTION * 128.0;

/// Resolution (projected meters per pixel) of the standard web tiles at the given zoom level.
/// Fractional zoom levels are allowed.
pub fn web_resolution(zoom: f64) -> f64 {
    WEB_TOP_RESOLUTION / 2f64.powf(zoom)
}

/// Zoom level of the standard web tiles that has the given resolution. Reverse of
/// [`web_resolution`].
pub fn web_zoom(resolution: f64) -> f64 {
    (WEB_TOP_RESOLUTION / resolution).log2()
}

/// Level of detail: a zoom level and its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lod {
    resolution: f64,
    z_index: u32,
}

impl Lod {
    /// Creates new level of detail.
    pub fn new(resolution: f64, z_index: u32) -> Option<Lod> {
        if resolution.is_finite() && resolution != 0.0 {
            Some(Self {
                resolution,
                z_index,
            })
        } else {
            None
        }
    }

    /// Z-index (zoom level) of this LOD.
    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    /// Resolution of the LOD.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }
}

/// Tile index with additional virtual `display_x` index that is used to wrap tiles
/// over 180 longitude line.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    /// X index.
    pub x: i32,
    /// Y index.
    pub y: i32,
    /// Z index.
    pub z: u32,
    /// Virtual wrapping X index.
    pub display_x: i32,
}

impl TileIndex {
    /// Create a new index instance without wrapping.
    pub fn new(x: i32, y: i32, z: u32) -> Self {
        Self {
            x,
            y,
            z,
            display_x: x,
        }
    }
}

/// Tile schema of the standard Web Mercator tiles (used, for example, by OSM and Google maps):
/// 256 px tiles, `Y == 0` at the top of the map, resolution halving at every zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileSchema {
    lods: Vec<Lod>,
    tile_size: u32,
}

impl TileSchema {
    /// Standard Web Mercator schema with zoom levels `0..=max_zoom`.
    pub fn web(max_zoom: u32) -> Self {
        let lods = (0..=max_zoom)
            .filter_map(|z| Lod::new(WEB_TOP_RESOLUTION / 2f64.powi(z as i32), z))
            .collect();

        Self {
            lods,
            tile_size: 256,
        }
    }

    /// Resolution of the given zoom level, if exists.
    pub fn lod_resolution(&self, z: u32) -> Option<f64> {
        self.lods
            .iter()
            .find(|lod| lod.z_index() == z)
            .map(Lod::resolution)
    }

    /// Size of a tile side in pixels.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Maximum zoom level of the schema.
    pub fn max_zoom(&self) -> u32 {
        self.lods.last().map(Lod::z_index).unwrap_or_default()
    }

    /// Select a level of detail for the given resolution.
    pub fn select_lod(&self, resolution: f64) -> Option<Lod> {
        if !resolution.is_finite() {
            return None;
        }

        let mut lods = self.lods.iter().rev();
        let mut prev_lod = lods.next()?;

        for lod in lods {
            if lod.resolution() * (1.0 - RESOLUTION_TOLERANCE) > resolution {
                break;
            }

            prev_lod = lod;
        }

        Some(*prev_lod)
    }

    /// Iterate over tile indices that should be displayed for the given map view.
    pub fn iter_tiles(&self, view: &MapView) -> Option<impl Iterator<Item = TileIndex>> {
        let lod = self.select_lod(view.resolution())?;
        let (min, max) = view.get_bbox()?;

        let tile_side = lod.resolution() * self.tile_size as f64;
        let index_count = 1i32 << lod.z_index().min(30);

        let first = |v: f64| (v / tile_side + INDEX_TOLERANCE).floor() as i32;
        let last = |v: f64| (v / tile_side - INDEX_TOLERANCE).ceil() as i32 - 1;

        let x_min = first(min.x + WEB_ORIGIN);
        let x_max = last(max.x + WEB_ORIGIN);

        let y_min = first(WEB_ORIGIN - max.y).max(0);
        let y_max = last(WEB_ORIGIN - min.y).min(index_count - 1);

        let z = lod.z_index();
        Some((x_min..=x_max).flat_map(move |display_x| {
            (y_min..=y_max).map(move |y| TileIndex {
                x: display_x.rem_euclid(index_count),
                y,
                z,
                display_x,
            })
        }))
    }

    /// Projected bounding box of the tile as `(min, max)` corners.
    pub fn tile_bbox(&self, index: TileIndex) -> Option<(Point2d, Point2d)> {
        let resolution = self.lod_resolution(index.z)?;
        let side = self.tile_size as f64 * resolution;

        let x_min = -WEB_ORIGIN + index.display_x as f64 * side;
        let y_max = WEB_ORIGIN - index.y as f64 * side;

        Some((
            Point2d::new(x_min, y_max - side),
            Point2d::new(x_min + side, y_max),
        ))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::primitives::Size;

    #[test]
    fn web_resolutions() {
        let schema = TileSchema::web(19);
        assert_abs_diff_eq!(schema.lod_resolution(0).unwrap(), WEB_TOP_RESOLUTION);
        assert_abs_diff_eq!(
            schema.lod_resolution(5).unwrap(),
            4891.96981025,
            epsilon = 1e-6
        );
        assert_eq!(schema.max_zoom(), 19);
        assert!(schema.lod_resolution(20).is_none());
    }

    #[test]
    fn zoom_resolution_conversion() {
        assert_abs_diff_eq!(web_resolution(0.0), WEB_TOP_RESOLUTION);
        assert_abs_diff_eq!(web_resolution(5.0), 4891.96981025, epsilon = 1e-6);
        assert_abs_diff_eq!(web_zoom(web_resolution(7.5)), 7.5, epsilon = 1e-9);
    }

    #[test]
    fn select_lod() {
        let schema = TileSchema::web(3);
        let r0 = WEB_TOP_RESOLUTION;
        assert_eq!(schema.select_lod(r0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(r0 * 2.0).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(r0 * 0.995).unwrap().z_index(), 0);
        assert_eq!(schema.select_lod(r0 * 0.75).unwrap().z_index(), 1);
        assert_eq!(schema.select_lod(r0 / 2.0).unwrap().z_index(), 1);
        assert_eq!(schema.select_lod(r0 / 100.0).unwrap().z_index(), 3);
        assert!(schema.select_lod(f64::NAN).is_none());
    }

    #[test]
    fn whole_world_at_zero_zoom() {
        let schema = TileSchema::web(3);
        let view = MapView::new_projected(Point2d::origin(), WEB_TOP_RESOLUTION)
            .with_size(Size::new(256.0, 256.0));

        let tiles: Vec<_> = schema.iter_tiles(&view).unwrap().collect();
        assert_eq!(tiles, vec![TileIndex::new(0, 0, 0)]);
    }

    #[test]
    fn tiles_wrap_over_antimeridian() {
        let schema = TileSchema::web(3);
        let view = MapView::new_projected(Point2d::new(WEB_ORIGIN, 0.0), WEB_TOP_RESOLUTION / 2.0)
            .with_size(Size::new(256.0, 256.0));

        let tiles: Vec<_> = schema.iter_tiles(&view).unwrap().collect();
        assert_eq!(tiles.len(), 4);
        assert!(tiles.iter().any(|t| t.display_x == 2 && t.x == 0));
        assert!(tiles.iter().any(|t| t.display_x == 1 && t.x == 1));
    }

    #[test]
    fn tile_bbox_of_first_tile() {
        let schema = TileSchema::web(3);
        let (min, max) = schema.tile_bbox(TileIndex::new(0, 0, 1)).unwrap();

        assert_abs_diff_eq!(min.x, -WEB_ORIGIN, epsilon = 1e-6);
        assert_abs_diff_eq!(min.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(max.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(max.y, WEB_ORIGIN, epsilon = 1e-6);
    }
}
