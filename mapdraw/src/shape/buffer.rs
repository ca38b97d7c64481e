use geo::{Buffer, MapCoords};
use geo_types::{Coord, Geometry, LineString, MultiPolygon, Point};

use crate::error::DrawError;
use crate::primitives::Point2d;
use crate::projection::WebMercator;

/// Area around a line, `meters` wide on each side of it.
///
/// The buffer is built in Web Mercator with the distance scaled to the latitude of the line's
/// bounding box center, then converted back into longitude/latitude. The result is a `Polygon`
/// when the buffer is a single area and a `MultiPolygon` otherwise.
pub fn buffer_line(vertices: &[Coord], meters: f64) -> Result<Geometry<f64>, DrawError> {
    check_distance(meters)?;
    let Some(center_lat) = center_latitude(vertices) else {
        return Err(DrawError::Geometry("cannot buffer an empty line".into()));
    };

    let projected: Vec<Coord> = vertices
        .iter()
        .map(|v| project(*v))
        .collect::<Result<_, _>>()?;
    let buffered = LineString::new(projected).buffer(meters * WebMercator.scale_at(center_lat));

    into_geometry(buffered)
}

/// Circular area with the radius of `meters` around the point.
pub fn buffer_point(center: Coord, meters: f64) -> Result<Geometry<f64>, DrawError> {
    check_distance(meters)?;
    let buffered =
        Point::from(project(center)?).buffer(meters * WebMercator.scale_at(center.y));

    into_geometry(buffered)
}

fn check_distance(meters: f64) -> Result<(), DrawError> {
    if meters.is_finite() && meters > 0.0 {
        Ok(())
    } else {
        Err(DrawError::InvalidBufferWidth(meters.to_string()))
    }
}

fn center_latitude(vertices: &[Coord]) -> Option<f64> {
    let mut lats = vertices.iter().map(|v| v.y);
    let first = lats.next()?;
    let (min, max) = lats.fold((first, first), |(min, max), lat| (min.min(lat), max.max(lat)));
    Some((min + max) / 2.0)
}

fn project(lonlat: Coord) -> Result<Coord, DrawError> {
    let point = WebMercator
        .project(lonlat)
        .ok_or_else(|| DrawError::Geometry(format!("cannot project {lonlat:?}")))?;
    Ok(Coord {
        x: point.x,
        y: point.y,
    })
}

fn into_geometry(buffered: MultiPolygon<f64>) -> Result<Geometry<f64>, DrawError> {
    let mut lonlat =
        buffered.map_coords(|c| WebMercator.unproject(Point2d::new(c.x, c.y)));

    match lonlat.0.len() {
        0 => Err(DrawError::Geometry("buffer produced an empty geometry".into())),
        1 => Ok(Geometry::Polygon(lonlat.0.remove(0))),
        _ => Ok(Geometry::MultiPolygon(lonlat)),
    }
}
