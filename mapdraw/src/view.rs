use geo_types::Coord;

use crate::primitives::{Point2d, Size, Vector2d};
use crate::projection::WebMercator;

/// Map view specifies the area of the map that should be drawn.
///
/// The view keeps its center in projected (Web Mercator) coordinates, the resolution as number of
/// projected meters per screen pixel and the size of the screen area in pixels. Screen pixel
/// coordinates start at the top-left corner with `y` going down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    position: Point2d,
    resolution: f64,
    size: Size,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            position: Point2d::origin(),
            resolution: 1.0,
            size: Size::new(0.0, 0.0),
        }
    }
}

impl MapView {
    /// Creates a new view centered at the given longitude/latitude.
    pub fn new(center: Coord, resolution: f64) -> Self {
        Self {
            position: WebMercator.project(center).unwrap_or_else(Point2d::origin),
            resolution,
            ..Default::default()
        }
    }

    /// Creates a new view centered at the given projected point.
    pub fn new_projected(position: Point2d, resolution: f64) -> Self {
        Self {
            position,
            resolution,
            ..Default::default()
        }
    }

    /// Center of the view as longitude/latitude.
    pub fn position(&self) -> Coord {
        WebMercator.unproject(self.position)
    }

    /// Center of the view in projected coordinates.
    pub fn projected_position(&self) -> Point2d {
        self.position
    }

    /// Returns a copy of the view centered at the given longitude/latitude.
    pub fn with_position(&self, center: Coord) -> Self {
        Self {
            position: WebMercator.project(center).unwrap_or(self.position),
            ..*self
        }
    }

    /// Number of projected meters in one screen pixel.
    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    /// Returns a copy of the view with the given resolution.
    pub fn with_resolution(&self, resolution: f64) -> Self {
        Self {
            resolution,
            ..*self
        }
    }

    /// Size of the screen area in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the given screen size.
    pub fn with_size(&self, new_size: Size) -> Self {
        Self {
            size: new_size,
            ..*self
        }
    }

    /// Projected coordinates of the given screen pixel. Returns `None` if the view has no size.
    pub fn screen_to_map(&self, px_position: Point2d) -> Option<Point2d> {
        if self.size.is_zero() {
            return None;
        }

        let x = self.position.x + (px_position.x - self.size.half_width()) * self.resolution;
        let y = self.position.y + (self.size.half_height() - px_position.y) * self.resolution;

        Some(Point2d::new(x, y))
    }

    /// Longitude/latitude of the given screen pixel. Returns `None` if the view has no size.
    pub fn screen_to_lonlat(&self, px_position: Point2d) -> Option<Coord> {
        self.screen_to_map(px_position)
            .map(|p| WebMercator.unproject(p))
    }

    /// Screen pixel of the given projected point.
    pub fn map_to_screen(&self, point: Point2d) -> Point2d {
        Point2d::new(
            (point.x - self.position.x) / self.resolution + self.size.half_width(),
            self.size.half_height() - (point.y - self.position.y) / self.resolution,
        )
    }

    /// Screen pixel of the given longitude/latitude.
    pub fn lonlat_to_screen(&self, lonlat: Coord) -> Option<Point2d> {
        WebMercator
            .project(lonlat)
            .map(|p| self.map_to_screen(p))
    }

    /// Projected bounding box of the visible area as `(min, max)` corners.
    pub fn get_bbox(&self) -> Option<(Point2d, Point2d)> {
        let top_left = self.screen_to_map(Point2d::new(0.0, 0.0))?;
        let bottom_right =
            self.screen_to_map(Point2d::new(self.size.width(), self.size.height()))?;

        Some((
            Point2d::new(top_left.x, bottom_right.y),
            Point2d::new(bottom_right.x, top_left.y),
        ))
    }

    /// Returns a view moved so that the map point under `from` pixel is under `to` pixel.
    pub fn translate_by_pixels(&self, from: Point2d, to: Point2d) -> Self {
        let delta = Vector2d::new(
            (to.x - from.x) * self.resolution,
            (from.y - to.y) * self.resolution,
        );
        self.translate(delta)
    }

    /// Returns a view moved by the given projected delta. The map content moves with the delta,
    /// so the center moves in the opposite direction.
    pub fn translate(&self, delta: Vector2d) -> Self {
        Self {
            position: self.position - delta,
            ..*self
        }
    }

    /// Returns a view with resolution multiplied by `zoom`, keeping the map point under
    /// `base_point` pixel in place.
    pub fn zoom(&self, zoom: f64, base_point: Point2d) -> Self {
        let Some(base_point) = self.screen_to_map(base_point) else {
            return self.with_resolution(self.resolution * zoom);
        };

        let resolution = self.resolution * zoom;
        let new_position = base_point + (self.position - base_point) * zoom;
        Self {
            position: new_position,
            resolution,
            ..*self
        }
    }
}
