use std::fmt::{Display, Formatter};

use crate::shape::{Shape, ShapeKind};

/// Identifier of an overlay added to a [`Map`](crate::map::Map).
///
/// Ids are never reused by the map they were issued by, so an id of a removed overlay stays
/// invalid.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayId(u64);

impl OverlayId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    /// Numeric value of the id.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for OverlayId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Vector shape displayed on top of the base map.
///
/// An overlay is *drawing* while the user is still placing its vertices, and *editing* while its
/// handles can be dragged. A static overlay is neither.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    shape: Shape,
    drawing: bool,
    editing: bool,
}

impl Overlay {
    /// Creates a static overlay.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            drawing: false,
            editing: false,
        }
    }

    /// Creates an empty overlay the user is about to draw.
    pub fn drawing(kind: ShapeKind) -> Self {
        Self {
            shape: Shape::empty(kind),
            drawing: true,
            editing: true,
        }
    }

    /// Geometry of the overlay.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Mutable geometry of the overlay.
    pub fn shape_mut(&mut self) -> &mut Shape {
        &mut self.shape
    }

    /// Kind of the overlay shape.
    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    /// True while the user places the vertices of the overlay.
    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    /// True if the overlay handles can be dragged.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn set_drawing(&mut self, drawing: bool) {
        self.drawing = drawing;
    }

    pub(crate) fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }
}
