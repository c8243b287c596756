//! Visual primitives owned by interactive objects.

use kurbo::Point;
use crate::palette::ColorRgba;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an artifact, allocated by the surface that holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactId(pub u64);

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifact {}", self.0)
    }
}

/// The kind of primitive - determines how the surface draws the points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Polyline through all points.
    #[default]
    Line,
    /// One marker per point.
    Marker,
    /// Closed polygon through all points.
    Polygon,
}

/// Line dash pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Description of an artifact to add to a surface.
///
/// Points are in data coordinates of the region the artifact lives in.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactSpec {
    pub kind: ArtifactKind,
    pub points: Vec<Point>,
    pub color: ColorRgba,
    pub width: f64,
    pub style: LineStyle,
    /// Excluded from full draws and background captures.
    pub animated: bool,
}

impl ArtifactSpec {
    /// Create a new artifact description.
    pub fn new(kind: ArtifactKind, points: Vec<Point>) -> Self {
        Self {
            kind,
            points,
            color: ColorRgba::black(),
            width: 1.0,
            style: LineStyle::default(),
            animated: false,
        }
    }

    /// Polyline through the given points.
    pub fn line(points: Vec<Point>) -> Self {
        Self::new(ArtifactKind::Line, points)
    }

    /// Single marker at a point.
    pub fn marker(point: Point) -> Self {
        Self::new(ArtifactKind::Marker, vec![point])
    }

    /// Closed polygon through the given points.
    pub fn polygon(points: Vec<Point>) -> Self {
        Self::new(ArtifactKind::Polygon, points)
    }

    /// Set the color.
    pub fn with_color(mut self, color: impl Into<ColorRgba>) -> Self {
        self.color = color.into();
        self
    }

    /// Set the line width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Set the dash pattern.
    pub fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    /// Create the artifact already animated.
    pub fn animated(mut self, animated: bool) -> Self {
        self.animated = animated;
        self
    }
}
