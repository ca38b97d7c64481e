//! Error types used by the crate.

use thiserror::Error;

use crate::shape::ShapeKind;

/// Mapdraw error type.
#[derive(Debug, Error)]
pub enum DrawError {
    /// The drawn shape does not have enough vertices to produce a geometry.
    #[error("not enough vertices to draw {kind:?}: {actual} of {required} required")]
    NotEnoughVertices {
        /// Kind of the rejected shape.
        kind: ShapeKind,
        /// Minimum number of vertices for this kind.
        required: usize,
        /// Number of vertices the shape had.
        actual: usize,
    },
    /// Buffer width given by the user cannot be used.
    #[error("invalid buffer width: {0:?}")]
    InvalidBufferWidth(String),
    /// A buffer width was given, but nothing is waiting for one.
    #[error("no buffer width request is pending")]
    NoPendingRequest,
    /// Edit was requested, but there is no committed geometry to edit.
    #[error("there is no geometry to edit")]
    NothingToEdit,
    /// The operation needs an overlay, but the control has none.
    #[error("no active shape")]
    NoActiveShape,
    /// The map is not created yet, so the control is not mounted.
    #[error("map is not ready")]
    MapNotReady,
    /// The map readiness handoff was already done.
    #[error("control is already mounted")]
    AlreadyMounted,
    /// Geometry cannot be converted or processed.
    #[error("geometry error: {0}")]
    Geometry(String),
    /// Configuration cannot be parsed, or a report cannot be serialized.
    #[error("JSON error: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<geojson::Error> for DrawError {
    fn from(value: geojson::Error) -> Self {
        Self::Geometry(value.to_string())
    }
}
