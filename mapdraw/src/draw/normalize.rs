use geojson::Feature;
use serde_json::Value as JsonValue;

use super::prompt::BufferWidthRequest;
use crate::error::DrawError;
use crate::layer::OverlayId;
use crate::shape::{buffer_point, feature_from_geometry, Shape};

/// Radius in meters of the area a dropped marker is converted into.
pub const MARKER_RADIUS: f64 = 40.0;

/// Result of [`normalize`].
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// The feature is ready to be reported.
    Ready(Feature),
    /// The shape is a line that is converted into a polygon only when the user gives the
    /// buffer width.
    NeedsBufferWidth(BufferWidthRequest),
}

/// Converts a drawn shape into the feature reported by the toolbox.
///
/// * Polygons need at least 3 vertices and are reported as they are; so are rectangles.
/// * Polylines need at least 2 vertices and are buffered into a polygon with a width given by
///   the user.
/// * A circle is buffered by its radius, and the radius is recorded in the `radius` property.
/// * A marker is buffered by [`MARKER_RADIUS`] with `radius` property set to it.
///
/// Shapes with too few vertices are rejected with [`DrawError::NotEnoughVertices`].
pub fn normalize(
    overlay: OverlayId,
    shape: &Shape,
    precision: Option<u32>,
) -> Result<Normalized, DrawError> {
    let vertex_count = shape.vertex_count();
    let required = shape.kind().min_vertices();
    if vertex_count < required {
        return Err(DrawError::NotEnoughVertices {
            kind: shape.kind(),
            required,
            actual: vertex_count,
        });
    }

    match shape {
        Shape::Polygon(_) | Shape::Rectangle(_) => Ok(Normalized::Ready(shape.to_feature(precision)?)),
        Shape::Polyline(vertices) => Ok(Normalized::NeedsBufferWidth(BufferWidthRequest::new(
            overlay,
            vertices.clone(),
        ))),
        Shape::Circle(Some(circle)) => Ok(Normalized::Ready(buffered_point(
            circle.center,
            circle.radius,
            precision,
        )?)),
        Shape::Marker(Some(position)) => Ok(Normalized::Ready(buffered_point(
            *position,
            MARKER_RADIUS,
            precision,
        )?)),
        Shape::Circle(None) | Shape::Marker(None) => Err(DrawError::NotEnoughVertices {
            kind: shape.kind(),
            required,
            actual: 0,
        }),
    }
}

fn buffered_point(
    center: geo_types::Coord,
    radius: f64,
    precision: Option<u32>,
) -> Result<Feature, DrawError> {
    let geometry = buffer_point(center, radius)?;
    let mut feature = feature_from_geometry(&geometry, precision);
    feature.set_property("radius", JsonValue::from(radius));

    Ok(feature)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use geo_types::{coord, Rect};
    use geojson::Value;

    use super::*;
    use crate::shape::{Circle, ShapeKind};

    fn id() -> OverlayId {
        OverlayId::new(1)
    }

    fn geometry_type(normalized: &Normalized) -> &'static str {
        match normalized {
            Normalized::Ready(feature) => match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::Polygon(_)) => "Polygon",
                Some(Value::MultiPolygon(_)) => "MultiPolygon",
                Some(Value::LineString(_)) => "LineString",
                Some(Value::Point(_)) => "Point",
                _ => "other",
            },
            Normalized::NeedsBufferWidth(_) => "pending",
        }
    }

    #[test]
    fn polygon_passes_through() {
        let shape = Shape::Polygon(vec![
            coord! { x: -122.0, y: 55.0 },
            coord! { x: -121.0, y: 55.0 },
            coord! { x: -121.0, y: 56.0 },
        ]);
        let normalized = normalize(id(), &shape, None).unwrap();

        assert_eq!(geometry_type(&normalized), "Polygon");
        assert_eq!(normalized, Normalized::Ready(shape.to_feature(None).unwrap()));
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let shape = Shape::Polygon(vec![
            coord! { x: -122.0, y: 55.0 },
            coord! { x: -121.0, y: 55.0 },
        ]);

        assert_matches!(
            normalize(id(), &shape, None),
            Err(DrawError::NotEnoughVertices {
                kind: ShapeKind::Polygon,
                required: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn rectangle_passes_through() {
        let shape = Shape::Rectangle(Some(Rect::new(
            coord! { x: 0.0, y: 0.0 },
            coord! { x: 1.0, y: 1.0 },
        )));

        assert_eq!(
            normalize(id(), &shape, Some(6)).unwrap(),
            Normalized::Ready(shape.to_feature(Some(6)).unwrap())
        );
    }

    #[test]
    fn line_asks_for_buffer_width() {
        let vertices = vec![coord! { x: 0.0, y: 0.0 }, coord! { x: 0.01, y: 0.0 }];
        let normalized = normalize(id(), &Shape::Polyline(vertices.clone()), None).unwrap();

        assert_matches!(normalized, Normalized::NeedsBufferWidth(request) if request.overlay() == id() && request.vertices() == vertices);
    }

    #[test]
    fn line_needs_two_vertices() {
        assert_matches!(
            normalize(id(), &Shape::Polyline(vec![coord! { x: 0.0, y: 0.0 }]), None),
            Err(DrawError::NotEnoughVertices {
                kind: ShapeKind::Polyline,
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn circle_is_buffered_by_radius() {
        let shape = Shape::Circle(Some(Circle::new(coord! { x: 10.0, y: 45.0 }, 250.0)));
        let normalized = normalize(id(), &shape, Some(6)).unwrap();

        assert_eq!(geometry_type(&normalized), "Polygon");
        let Normalized::Ready(feature) = normalized else {
            unreachable!()
        };
        assert_eq!(feature.property("radius"), Some(&JsonValue::from(250.0)));
    }

    #[test]
    fn marker_is_buffered_by_default_radius() {
        let shape = Shape::Marker(Some(coord! { x: 10.0, y: 45.0 }));
        let normalized = normalize(id(), &shape, Some(6)).unwrap();

        assert_eq!(geometry_type(&normalized), "Polygon");
        let Normalized::Ready(feature) = normalized else {
            unreachable!()
        };
        assert_eq!(feature.property("radius"), Some(&JsonValue::from(MARKER_RADIUS)));
    }

    #[test]
    fn unplaced_shapes_are_rejected() {
        for kind in [ShapeKind::Rectangle, ShapeKind::Circle, ShapeKind::Marker] {
            assert_matches!(
                normalize(id(), &Shape::empty(kind), None),
                Err(DrawError::NotEnoughVertices { actual: 0, .. })
            );
        }
    }
}
