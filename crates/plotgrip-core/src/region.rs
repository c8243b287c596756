//! Visual regions (plot areas) of a canvas and their coordinate transforms.

use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a region within its canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub u32);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region {}", self.0)
    }
}

/// A plot area on a canvas.
///
/// `bounds` is the area in pixel coordinates, `limits` the data range it
/// displays. Pixel coordinates follow the data orientation (origin at the
/// bottom-left), so the mapping between both is a pure scale + translate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    /// Area covered on the canvas, in pixels.
    pub bounds: Rect,
    /// Data range displayed in the area.
    pub limits: Rect,
}

impl Region {
    /// Create a region whose data limits equal its pixel bounds.
    pub fn new(id: RegionId, bounds: Rect) -> Self {
        Self {
            id,
            bounds,
            limits: bounds,
        }
    }

    /// Set the data limits.
    pub fn with_limits(mut self, limits: Rect) -> Self {
        self.limits = limits;
        self
    }

    /// Transform from data coordinates to pixel coordinates.
    ///
    /// A degenerate axis (zero-size bounds or limits) maps with unit scale so
    /// that the transform stays invertible.
    pub fn transform(&self) -> Affine {
        let scale = |px: f64, data: f64| if px == 0.0 || data == 0.0 { 1.0 } else { px / data };
        let sx = scale(self.bounds.width(), self.limits.width());
        let sy = scale(self.bounds.height(), self.limits.height());
        Affine::translate((self.bounds.x0, self.bounds.y0))
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate((-self.limits.x0, -self.limits.y0))
    }

    /// Transform from pixel coordinates to data coordinates.
    pub fn inverse_transform(&self) -> Affine {
        self.transform().inverse()
    }

    /// Convert a data point to pixels.
    pub fn data_to_px(&self, point: Point) -> Point {
        self.transform() * point
    }

    /// Convert a pixel point to data coordinates.
    pub fn px_to_data(&self, point: Point) -> Point {
        self.inverse_transform() * point
    }

    /// Check whether a pixel position lies inside the region.
    pub fn contains(&self, px: Point) -> bool {
        self.bounds.contains(px)
    }
}
