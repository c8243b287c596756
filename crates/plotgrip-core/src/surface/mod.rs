//! Canvas abstraction consumed by the coordinator.

mod recording;

pub use recording::{DrawCall, RecordingSurface};

use crate::artifact::{ArtifactId, ArtifactSpec};
use crate::region::{Region, RegionId};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a canvas on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanvasId(pub u32);

impl fmt::Display for CanvasId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canvas {}", self.0)
    }
}

/// Opaque snapshot of the static content of a region.
///
/// The coordinator only inspects the canvas, size and region it was taken
/// at, to detect snapshots that no longer match the canvas being drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub canvas: CanvasId,
    pub region: RegionId,
    /// Canvas size at capture time.
    pub size: Size,
    /// Backend-specific handle to the captured pixels.
    pub token: u64,
}

/// Trait for canvas backends.
///
/// Implementations wrap a plotting library canvas: they own the artifacts,
/// know the regions and can capture and restore pixel content.
pub trait Surface {
    /// Identifier of this canvas.
    fn id(&self) -> CanvasId;

    /// Current canvas size in pixels.
    fn size(&self) -> Size;

    /// Look up a region.
    fn region(&self, id: RegionId) -> Option<Region>;

    /// Add an artifact to a region and return its id.
    fn add_artifact(&mut self, region: RegionId, spec: ArtifactSpec) -> ArtifactId;

    /// Remove an artifact. Unknown ids are ignored.
    fn remove_artifact(&mut self, id: ArtifactId);

    /// Points of an artifact, in data coordinates.
    fn artifact_points(&self, id: ArtifactId) -> Option<Vec<Point>>;

    /// Replace the points of an artifact.
    fn set_artifact_points(&mut self, id: ArtifactId, points: Vec<Point>);

    /// Show or hide an artifact.
    fn set_visible(&mut self, id: ArtifactId, visible: bool);

    /// Mark an artifact as animated: excluded from full draws and captures.
    fn set_animated(&mut self, id: ArtifactId, animated: bool);

    /// Full redraw of all static content.
    fn draw(&mut self);

    /// Capture the current content of a region.
    fn capture(&mut self, region: RegionId) -> Background;

    /// Paint a previously captured background back.
    fn restore(&mut self, background: &Background);

    /// Draw a single artifact on top of the current content.
    fn draw_artifact(&mut self, id: ArtifactId);

    /// Commit the content of a region to the screen.
    fn blit(&mut self, region: RegionId);
}
