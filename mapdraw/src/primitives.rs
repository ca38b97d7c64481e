//! Screen-space primitives.

use serde::{Deserialize, Serialize};

/// Point on the screen in pixels, or a point in projected map coordinates in meters.
pub type Point2d = nalgebra::Point2<f64>;

/// Difference between two [`Point2d`].
pub type Vector2d = nalgebra::Vector2<f64>;

/// Size of a rectangular area, usually of the map widget in pixels.
#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f64,
    height: f64,
}

impl Size {
    /// Creates a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Half of the width.
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Half of the height.
    pub fn half_height(&self) -> f64 {
        self.height / 2.0
    }

    /// Returns true if any of the dimensions is zero or not a finite number.
    pub fn is_zero(&self) -> bool {
        !(self.width.is_normal() && self.height.is_normal())
    }
}
