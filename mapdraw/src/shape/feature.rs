use geo::MapCoords;
use geo_types::{Coord, Rect};
use geojson::{Feature, Geometry, JsonObject, Position, Value};

use super::{rectangle_corners, Shape, ShapeKind};
use crate::error::DrawError;

/// Number of decimal digits kept in exported coordinates (about 10 cm).
pub const DEFAULT_PRECISION: u32 = 6;

impl Shape {
    /// Converts the shape into a GeoJSON feature with empty properties.
    ///
    /// Polygon and rectangle rings are closed by repeating the first position. Rectangle rings go
    /// south-west, north-west, north-east, south-east. A circle is exported as its center point;
    /// the radius is not part of the geometry.
    ///
    /// Coordinates are rounded to `precision` decimal digits if it is given.
    ///
    /// Fails with [`DrawError::NotEnoughVertices`] if a rectangle, circle or marker was not placed
    /// yet. Polylines and polygons are exported as they are, their vertex count is checked by
    /// the caller.
    pub fn to_feature(&self, precision: Option<u32>) -> Result<Feature, DrawError> {
        let position = |coord: &Coord| to_position(*coord, precision);
        let value = match self {
            Shape::Polyline(vertices) => Value::LineString(vertices.iter().map(position).collect()),
            Shape::Polygon(vertices) => Value::Polygon(vec![closed_ring(
                vertices.iter().map(position).collect(),
            )]),
            Shape::Rectangle(Some(rect)) => Value::Polygon(vec![closed_ring(
                rectangle_corners(rect).iter().map(position).collect(),
            )]),
            Shape::Circle(Some(circle)) => Value::Point(position(&circle.center)),
            Shape::Marker(Some(marker)) => Value::Point(position(marker)),
            Shape::Rectangle(None) | Shape::Circle(None) | Shape::Marker(None) => {
                return Err(DrawError::NotEnoughVertices {
                    kind: self.kind(),
                    required: self.kind().min_vertices(),
                    actual: 0,
                });
            }
        };

        Ok(new_feature(Geometry::new(value)))
    }

    /// Creates an editable shape from a GeoJSON geometry.
    ///
    /// Points become markers, line strings become polylines, polygons (and multipolygons with a
    /// single polygon) become polygons with only their outer ring kept.
    pub fn from_geometry(geometry: &Geometry) -> Result<Shape, DrawError> {
        match &geometry.value {
            Value::Point(position) => Ok(Shape::Marker(Some(to_coord(position)?))),
            Value::LineString(positions) => Ok(Shape::Polyline(to_coords(positions)?)),
            Value::Polygon(rings) => polygon_from_rings(rings),
            Value::MultiPolygon(polygons) if polygons.len() == 1 => {
                polygon_from_rings(&polygons[0])
            }
            Value::MultiPolygon(polygons) => Err(DrawError::Geometry(format!(
                "cannot edit a multipolygon with {} parts",
                polygons.len()
            ))),
            Value::MultiPoint(_) | Value::MultiLineString(_) | Value::GeometryCollection(_) => {
                Err(DrawError::Geometry(
                    "only single part geometries can be edited".into(),
                ))
            }
        }
    }
}

/// Builds a rectangle from a polygon feature using only two opposite corners of its outer ring
/// (positions 1 and 3).
///
/// This is the reverse of [`Shape::to_feature`] for rectangles. Any other polygon is narrowed
/// to the axis-aligned rectangle spanned by those two positions.
pub fn rectangle_from_feature(feature: &Feature) -> Result<Rect, DrawError> {
    let ring = match feature.geometry.as_ref().map(|geometry| &geometry.value) {
        Some(Value::Polygon(rings)) => rings.first(),
        _ => None,
    }
    .ok_or_else(|| DrawError::Geometry("rectangle requires a polygon geometry".into()))?;

    match (ring.get(1), ring.get(3)) {
        (Some(first), Some(second)) => Ok(Rect::new(to_coord(first)?, to_coord(second)?)),
        _ => Err(DrawError::NotEnoughVertices {
            kind: ShapeKind::Rectangle,
            required: 4,
            actual: ring.len(),
        }),
    }
}

/// Converts a computed geometry (e.g. a buffer) into a feature with empty properties, rounding
/// coordinates to `precision` decimal digits.
pub fn feature_from_geometry(geometry: &geo_types::Geometry<f64>, precision: Option<u32>) -> Feature {
    let rounded = geometry.map_coords(|c| Coord {
        x: round(c.x, precision),
        y: round(c.y, precision),
    });

    new_feature(Geometry::new(Value::from(&rounded)))
}

pub(crate) fn new_feature(geometry: Geometry) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(geometry),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    }
}

fn polygon_from_rings(rings: &[Vec<Position>]) -> Result<Shape, DrawError> {
    let Some(outer) = rings.first() else {
        return Ok(Shape::Polygon(vec![]));
    };

    let mut vertices = to_coords(outer)?;
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    Ok(Shape::Polygon(vertices))
}

fn closed_ring(mut ring: Vec<Position>) -> Vec<Position> {
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }

    ring
}

fn to_position(coord: Coord, precision: Option<u32>) -> Position {
    vec![round(coord.x, precision), round(coord.y, precision)]
}

fn round(value: f64, precision: Option<u32>) -> f64 {
    match precision {
        Some(digits) => {
            let k = 10f64.powi(digits as i32);
            (value * k).round() / k
        }
        None => value,
    }
}

fn to_coord(position: &Position) -> Result<Coord, DrawError> {
    match position.as_slice() {
        [x, y, ..] => Ok(Coord { x: *x, y: *y }),
        _ => Err(DrawError::Geometry(format!(
            "position must have at least 2 values, got {}",
            position.len()
        ))),
    }
}

fn to_coords(positions: &[Position]) -> Result<Vec<Coord>, DrawError> {
    positions.iter().map(to_coord).collect()
}
