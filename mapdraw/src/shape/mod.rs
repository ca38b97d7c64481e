//! Geometry of the shapes a user draws on the map.
//!
//! All coordinates are longitude/latitude in degrees, stored in [`Coord`] as `x`/`y` (the order
//! GeoJSON uses). Radii and buffer distances are in meters on the ground.

use geo_types::{Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::primitives::Vector2d;
use crate::projection::WebMercator;

mod buffer;
mod feature;

pub use buffer::{buffer_line, buffer_point};
pub use feature::{feature_from_geometry, rectangle_from_feature, DEFAULT_PRECISION};

/// Kind of a shape that can be drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    /// Open line through the clicked points.
    Polyline,
    /// Closed area through the clicked points.
    Polygon,
    /// Axis-aligned rectangle dragged between two corners.
    Rectangle,
    /// Circle dragged from the center.
    Circle,
    /// Single point.
    Marker,
}

impl ShapeKind {
    /// Minimum number of vertices a shape of this kind needs to be a valid geometry.
    pub fn min_vertices(&self) -> usize {
        match self {
            ShapeKind::Polyline => 2,
            ShapeKind::Polygon => 3,
            ShapeKind::Rectangle => 2,
            ShapeKind::Circle | ShapeKind::Marker => 1,
        }
    }
}

/// Circle with the radius in meters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center of the circle.
    pub center: Coord,
    /// Radius in meters.
    pub radius: f64,
}

impl Circle {
    /// Creates a new circle.
    pub fn new(center: Coord, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Point on the circle to the east of the center. Dragging this point changes the radius.
    pub fn radius_handle(&self) -> Coord {
        let Some(center) = WebMercator.project(self.center) else {
            return self.center;
        };

        let offset = self.radius * WebMercator.scale_at(self.center.y);
        WebMercator.unproject(center + Vector2d::new(offset, 0.0))
    }
}

/// Geometry of an overlay.
///
/// Rectangle, circle and marker are `None` after drawing started but before the user placed
/// them on the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Open line.
    Polyline(Vec<Coord>),
    /// Polygon outer ring without the closing point.
    Polygon(Vec<Coord>),
    /// Rectangle.
    Rectangle(Option<Rect>),
    /// Circle.
    Circle(Option<Circle>),
    /// Marker.
    Marker(Option<Coord>),
}

impl Shape {
    /// A shape of the given kind without any vertices.
    pub fn empty(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Polyline => Shape::Polyline(vec![]),
            ShapeKind::Polygon => Shape::Polygon(vec![]),
            ShapeKind::Rectangle => Shape::Rectangle(None),
            ShapeKind::Circle => Shape::Circle(None),
            ShapeKind::Marker => Shape::Marker(None),
        }
    }

    /// Kind of the shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Polyline(_) => ShapeKind::Polyline,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Rectangle(_) => ShapeKind::Rectangle,
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Marker(_) => ShapeKind::Marker,
        }
    }

    /// Number of vertices the user has placed. A rectangle counts its two defining corners.
    pub fn vertex_count(&self) -> usize {
        match self {
            Shape::Polyline(vertices) | Shape::Polygon(vertices) => vertices.len(),
            Shape::Rectangle(rect) => rect.map_or(0, |_| 2),
            Shape::Circle(circle) => circle.map_or(0, |_| 1),
            Shape::Marker(position) => position.map_or(0, |_| 1),
        }
    }

    /// Returns true if the shape has enough vertices to be converted into a geometry.
    pub fn is_complete(&self) -> bool {
        self.vertex_count() >= self.kind().min_vertices()
    }

    /// Radius of a circle shape.
    pub fn radius(&self) -> Option<f64> {
        match self {
            Shape::Circle(Some(circle)) => Some(circle.radius),
            _ => None,
        }
    }

    /// Points the user can drag while editing the shape.
    ///
    /// For a rectangle these are the corners in order south-west, north-west, north-east,
    /// south-east. For a circle these are the center and the radius handle.
    pub fn handles(&self) -> Vec<Coord> {
        match self {
            Shape::Polyline(vertices) | Shape::Polygon(vertices) => vertices.clone(),
            Shape::Rectangle(Some(rect)) => rectangle_corners(rect).to_vec(),
            Shape::Circle(Some(circle)) => vec![circle.center, circle.radius_handle()],
            Shape::Marker(Some(position)) => vec![*position],
            _ => vec![],
        }
    }

    /// Moves the handle with the given index (see [`Shape::handles`]) to a new position.
    ///
    /// Moving a rectangle corner keeps the opposite corner in place. Moving a circle center
    /// keeps the radius.
    pub fn move_handle(&mut self, index: usize, to: Coord) {
        match self {
            Shape::Polyline(vertices) | Shape::Polygon(vertices) => {
                if let Some(vertex) = vertices.get_mut(index) {
                    *vertex = to;
                }
            }
            Shape::Rectangle(Some(rect)) => {
                let corners = rectangle_corners(rect);
                if index < corners.len() {
                    *rect = Rect::new(corners[(index + 2) % 4], to);
                }
            }
            Shape::Circle(Some(circle)) => match index {
                0 => circle.center = to,
                1 => circle.radius = ground_distance(circle.center, to),
                _ => {}
            },
            Shape::Marker(Some(position)) if index == 0 => *position = to,
            _ => {}
        }
    }

    /// Adds a vertex at the end of a polyline or polygon. A vertex equal to the last one is
    /// ignored. Returns true if the vertex was added.
    pub fn push_vertex(&mut self, vertex: Coord) -> bool {
        match self {
            Shape::Polyline(vertices) | Shape::Polygon(vertices) => {
                if vertices.last() == Some(&vertex) {
                    return false;
                }

                vertices.push(vertex);
                true
            }
            _ => false,
        }
    }
}

/// Corners of the rectangle: south-west, north-west, north-east, south-east.
pub fn rectangle_corners(rect: &Rect) -> [Coord; 4] {
    let min = rect.min();
    let max = rect.max();
    [
        min,
        Coord { x: min.x, y: max.y },
        max,
        Coord { x: max.x, y: min.y },
    ]
}

/// Distance in meters between two points, measured in Web Mercator and scaled to the ground at
/// the latitude of `from`.
pub fn ground_distance(from: Coord, to: Coord) -> f64 {
    match (WebMercator.project(from), WebMercator.project(to)) {
        (Some(a), Some(b)) => (b - a).norm() / WebMercator.scale_at(from.y),
        _ => 0.0,
    }
}
