use geo_types::Coord;
use geojson::Feature;

use crate::error::DrawError;
use crate::layer::OverlayId;
use crate::shape::{buffer_line, feature_from_geometry};

/// Question shown to the user when a drawn line needs a buffer width.
pub const BUFFER_WIDTH_MESSAGE: &str = "Enter buffer width (total) in meters";

/// Value the buffer width input is pre-filled with.
pub const DEFAULT_BUFFER_WIDTH: &str = "1";

/// Request for the width of the buffer a drawn line is converted into.
///
/// The request is created by the [`DrawToolbox`](super::DrawToolbox) when a line is committed.
/// The line overlay stays on the map until the request is answered or discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferWidthRequest {
    overlay: OverlayId,
    vertices: Vec<Coord>,
}

impl BufferWidthRequest {
    pub(crate) fn new(overlay: OverlayId, vertices: Vec<Coord>) -> Self {
        Self { overlay, vertices }
    }

    /// Question to show to the user.
    pub fn message(&self) -> &'static str {
        BUFFER_WIDTH_MESSAGE
    }

    /// Initial value of the input.
    pub fn default_value(&self) -> &'static str {
        DEFAULT_BUFFER_WIDTH
    }

    /// The line overlay waiting for the width.
    pub fn overlay(&self) -> OverlayId {
        self.overlay
    }

    /// Vertices of the line.
    pub fn vertices(&self) -> &[Coord] {
        &self.vertices
    }

    /// Parses the user input. The width must be a finite positive number of meters.
    pub fn parse_width(input: &str) -> Result<f64, DrawError> {
        let trimmed = input.trim();
        match trimmed.parse::<f64>() {
            Ok(width) if width.is_finite() && width > 0.0 => Ok(width),
            _ => Err(DrawError::InvalidBufferWidth(trimmed.to_string())),
        }
    }

    /// Buffers the line by the given width.
    pub fn resolve(&self, width: f64, precision: Option<u32>) -> Result<Feature, DrawError> {
        let geometry = buffer_line(&self.vertices, width)?;
        Ok(feature_from_geometry(&geometry, precision))
    }
}
