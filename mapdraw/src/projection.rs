//! Web Mercator projection (EPSG:3857) used by the map view and by geometry buffering.

use geo_types::Coord;

use crate::primitives::Point2d;

/// Semimajor axis of the WGS84 ellipsoid, used as the sphere radius by Web Mercator.
pub const EARTH_RADIUS: f64 = 6_378_137.0;

/// Maximum latitude that Web Mercator can display.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// Spherical Web Mercator projection.
///
/// Input coordinates are longitude/latitude in degrees stored as `x`/`y` of a [`Coord`], the
/// same order GeoJSON uses. Output is in meters.
#[derive(Debug, Default, Copy, Clone)]
pub struct WebMercator;

impl WebMercator {
    /// Projects a longitude/latitude coordinate. Latitude is clamped to [`MAX_LATITUDE`].
    /// Returns `None` for non-finite input.
    pub fn project(&self, lonlat: Coord) -> Option<Point2d> {
        let lat = lonlat.y.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let x = EARTH_RADIUS * lonlat.x.to_radians();
        let y = EARTH_RADIUS
            * (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    /// Converts projected coordinates back into longitude/latitude.
    pub fn unproject(&self, point: Point2d) -> Coord {
        let lat = std::f64::consts::FRAC_PI_2 - 2.0 * (-point.y / EARTH_RADIUS).exp().atan();
        let lon = point.x / EARTH_RADIUS;

        Coord {
            x: lon.to_degrees(),
            y: lat.to_degrees(),
        }
    }

    /// Number of projected meters that correspond to one meter on the ground at the given
    /// latitude.
    pub fn scale_at(&self, latitude: f64) -> f64 {
        1.0 / latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn project_origin() {
        let projected = WebMercator.project(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert_abs_diff_eq!(projected.x, 0.0);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn project_and_back() {
        let lonlat = Coord { x: -122.0, y: 55.0 };
        let projected = WebMercator.project(lonlat).unwrap();
        assert_abs_diff_eq!(projected.x, -13_580_977.876_779_376, epsilon = 1e-3);

        let back = WebMercator.unproject(projected);
        assert_abs_diff_eq!(back.x, lonlat.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, lonlat.y, epsilon = 1e-9);
    }

    #[test]
    fn pole_is_clamped() {
        let projected = WebMercator.project(Coord { x: 180.0, y: 90.0 }).unwrap();
        assert_abs_diff_eq!(projected.x, projected.y, epsilon = 1e-3);
        assert!(WebMercator.project(Coord { x: f64::NAN, y: 0.0 }).is_none());
    }

    #[test]
    fn scale_grows_with_latitude() {
        assert_abs_diff_eq!(WebMercator.scale_at(0.0), 1.0);
        assert_abs_diff_eq!(WebMercator.scale_at(60.0), 2.0, epsilon = 1e-9);
    }
}
