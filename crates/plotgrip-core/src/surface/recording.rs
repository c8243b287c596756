//! In-memory surface that records every drawing call.

use super::{Background, CanvasId, Surface};
use crate::artifact::{ArtifactId, ArtifactSpec};
use crate::region::{Region, RegionId};
use kurbo::{Point, Rect, Size};
use std::collections::BTreeMap;

/// A drawing call received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// Full redraw; lists the artifacts that were painted.
    Draw(Vec<ArtifactId>),
    /// Background capture; lists the static artifacts it contains.
    Capture {
        region: RegionId,
        token: u64,
        contents: Vec<ArtifactId>,
    },
    Restore(u64),
    DrawArtifact(ArtifactId),
    Blit(RegionId),
}

#[derive(Debug, Clone)]
struct ArtifactRecord {
    region: RegionId,
    spec: ArtifactSpec,
    visible: bool,
}

/// Surface for testing, headless sessions and ephemeral use.
///
/// Nothing is rasterized: captures are tokens and every call is appended
/// to a log that can be inspected afterwards.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    id: CanvasId,
    size: Size,
    regions: BTreeMap<RegionId, Region>,
    artifacts: BTreeMap<ArtifactId, ArtifactRecord>,
    next_artifact: u64,
    next_token: u64,
    calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// Create a surface with a single region covering the whole canvas.
    pub fn new(id: CanvasId, size: Size) -> Self {
        let mut surface = Self {
            id,
            size,
            regions: BTreeMap::new(),
            artifacts: BTreeMap::new(),
            next_artifact: 1,
            next_token: 1,
            calls: Vec::new(),
        };
        surface.add_region(Region::new(RegionId(0), size.to_rect()));
        surface
    }

    /// Create a surface without any region.
    pub fn empty(id: CanvasId, size: Size) -> Self {
        Self {
            regions: BTreeMap::new(),
            ..Self::new(id, size)
        }
    }

    /// Create a surface split into side-by-side regions, numbered from the left.
    pub fn with_columns(id: CanvasId, size: Size, columns: u32) -> Self {
        let mut surface = Self::empty(id, size);
        let columns = columns.max(1);
        let width = size.width / f64::from(columns);
        for i in 0..columns {
            let x0 = width * f64::from(i);
            let bounds = Rect::new(x0, 0.0, x0 + width, size.height);
            surface.add_region(Region::new(RegionId(i), bounds));
        }
        surface
    }

    /// Add or replace a region.
    pub fn add_region(&mut self, region: Region) {
        self.regions.insert(region.id, region);
    }

    /// Resize the canvas. The caller is responsible for emitting the
    /// matching resize event.
    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// All calls received so far.
    pub fn calls(&self) -> &[DrawCall] {
        &self.calls
    }

    /// Forget the recorded calls.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of full redraws.
    pub fn full_draws(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::Draw(_)))
    }

    /// Number of background captures.
    pub fn captures(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::Capture { .. }))
    }

    /// Number of committed blits.
    pub fn blits(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::Blit(_)))
    }

    /// Number of single-artifact draws.
    pub fn artifact_draws(&self) -> usize {
        self.count(|c| matches!(c, DrawCall::DrawArtifact(_)))
    }

    /// Whether an artifact currently exists on the surface.
    pub fn has_artifact(&self, id: ArtifactId) -> bool {
        self.artifacts.contains_key(&id)
    }

    /// Whether an artifact exists and is visible.
    pub fn is_visible(&self, id: ArtifactId) -> bool {
        self.artifacts.get(&id).is_some_and(|a| a.visible)
    }

    /// Whether an artifact exists and is animated.
    pub fn is_animated(&self, id: ArtifactId) -> bool {
        self.artifacts.get(&id).is_some_and(|a| a.spec.animated)
    }

    /// Current description of an artifact.
    pub fn artifact(&self, id: ArtifactId) -> Option<&ArtifactSpec> {
        self.artifacts.get(&id).map(|a| &a.spec)
    }

    /// Number of artifacts on the surface, hidden ones included.
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    fn count(&self, f: impl Fn(&DrawCall) -> bool) -> usize {
        self.calls.iter().filter(|c| f(c)).count()
    }

    fn static_artifacts(&self, region: Option<RegionId>) -> Vec<ArtifactId> {
        self.artifacts
            .iter()
            .filter(|(_, a)| a.visible && !a.spec.animated)
            .filter(|(_, a)| region.is_none_or(|r| a.region == r))
            .map(|(&id, _)| id)
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn id(&self) -> CanvasId {
        self.id
    }

    fn size(&self) -> Size {
        self.size
    }

    fn region(&self, id: RegionId) -> Option<Region> {
        self.regions.get(&id).copied()
    }

    fn add_artifact(&mut self, region: RegionId, spec: ArtifactSpec) -> ArtifactId {
        let id = ArtifactId(self.next_artifact);
        self.next_artifact += 1;
        self.artifacts.insert(
            id,
            ArtifactRecord {
                region,
                spec,
                visible: true,
            },
        );
        id
    }

    fn remove_artifact(&mut self, id: ArtifactId) {
        self.artifacts.remove(&id);
    }

    fn artifact_points(&self, id: ArtifactId) -> Option<Vec<Point>> {
        self.artifacts.get(&id).map(|a| a.spec.points.clone())
    }

    fn set_artifact_points(&mut self, id: ArtifactId, points: Vec<Point>) {
        if let Some(record) = self.artifacts.get_mut(&id) {
            record.spec.points = points;
        }
    }

    fn set_visible(&mut self, id: ArtifactId, visible: bool) {
        if let Some(record) = self.artifacts.get_mut(&id) {
            record.visible = visible;
        }
    }

    fn set_animated(&mut self, id: ArtifactId, animated: bool) {
        if let Some(record) = self.artifacts.get_mut(&id) {
            record.spec.animated = animated;
        }
    }

    fn draw(&mut self) {
        let painted = self.static_artifacts(None);
        self.calls.push(DrawCall::Draw(painted));
    }

    fn capture(&mut self, region: RegionId) -> Background {
        let token = self.next_token;
        self.next_token += 1;
        let contents = self.static_artifacts(Some(region));
        self.calls.push(DrawCall::Capture {
            region,
            token,
            contents,
        });
        Background {
            canvas: self.id,
            region,
            size: self.size,
            token,
        }
    }

    fn restore(&mut self, background: &Background) {
        self.calls.push(DrawCall::Restore(background.token));
    }

    fn draw_artifact(&mut self, id: ArtifactId) {
        if self.is_visible(id) {
            self.calls.push(DrawCall::DrawArtifact(id));
        }
    }

    fn blit(&mut self, region: RegionId) {
        self.calls.push(DrawCall::Blit(region));
    }
}
