//! Background cache for blitted motion frames.
//!
//! A frame in blitting mode is: restore the cached background, let every
//! moving object reposition itself, draw the moving artifacts on top, then
//! commit the region. The background is captured once per motion episode and
//! recaptured whenever it no longer matches the canvas.

use crate::artifact::ArtifactId;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::region::RegionId;
use crate::surface::{Background, Surface};

/// Counters describing what the cache did, for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Committed frames (blitted or fully redrawn).
    pub frames: u64,
    /// Background captures.
    pub snapshots: u64,
    /// Captures forced by a canvas, size or region mismatch.
    pub stale_recoveries: u64,
    /// Frames drawn with a full redraw instead of a blit.
    pub full_redraws: u64,
}

/// Cached snapshot of the static content plus a refresh flag.
#[derive(Debug)]
pub struct RenderCache {
    background: Option<Background>,
    needs_refresh: bool,
    stats: FrameStats,
}

impl Default for RenderCache {
    fn default() -> Self {
        Self {
            background: None,
            needs_refresh: true,
            stats: FrameStats::default(),
        }
    }
}

impl RenderCache {
    /// Create an empty cache. The first frame captures a background.
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next frame to recapture the background.
    pub fn mark_dirty(&mut self) {
        self.needs_refresh = true;
    }

    /// Drop the background entirely.
    pub fn invalidate(&mut self) {
        self.background = None;
        self.needs_refresh = true;
    }

    /// Check if the next frame will recapture.
    pub fn needs_refresh(&self) -> bool {
        self.needs_refresh || self.background.is_none()
    }

    /// The cached background, if any.
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Frame counters.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Check the cached background against the canvas about to be drawn.
    pub fn validate(&self, surface: &dyn Surface, region: RegionId) -> CoordinatorResult<()> {
        let Some(background) = &self.background else {
            return Ok(());
        };
        let current = surface.size();
        let canvas = surface.id();
        if background.canvas != canvas || background.size != current || background.region != region {
            return Err(CoordinatorError::StaleCache {
                captured_canvas: background.canvas,
                current_canvas: canvas,
                captured: background.size,
                current,
                captured_region: background.region,
                current_region: region,
            });
        }
        Ok(())
    }

    /// Redraw the static content and capture it.
    pub fn snapshot(&mut self, surface: &mut dyn Surface, region: RegionId) -> &Background {
        surface.draw();
        self.stats.snapshots += 1;
        self.needs_refresh = false;
        self.background.insert(surface.capture(region))
    }

    /// Get the background ready for a new frame: recapture it if needed and
    /// paint it back. Does nothing without blitting.
    pub fn prepare(&mut self, surface: &mut dyn Surface, region: RegionId, blit: bool) {
        if !blit {
            return;
        }
        if let Err(stale) = self.validate(surface, region) {
            log::debug!("Recapturing background: {}", stale);
            self.stats.stale_recoveries += 1;
            self.mark_dirty();
        }
        if self.needs_refresh() {
            self.snapshot(surface, region);
        }
        if let Some(background) = &self.background {
            surface.restore(background);
        }
    }

    /// Draw the moving artifacts over the background and commit the frame,
    /// or fully redraw the canvas without blitting.
    pub fn composite_and_draw(
        &mut self,
        surface: &mut dyn Surface,
        region: RegionId,
        moving: &[ArtifactId],
        blit: bool,
    ) {
        self.stats.frames += 1;
        if blit {
            for &artifact in moving {
                surface.draw_artifact(artifact);
            }
            surface.blit(region);
        } else {
            self.stats.full_redraws += 1;
            surface.draw();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSpec;
    use crate::surface::{CanvasId, DrawCall, RecordingSurface};
    use kurbo::{Point, Size};

    fn surface() -> RecordingSurface {
        RecordingSurface::new(CanvasId(0), Size::new(100.0, 100.0))
    }

    #[test]
    fn test_first_frame_captures_once() {
        let mut s = surface();
        let mut cache = RenderCache::new();

        cache.prepare(&mut s, RegionId(0), true);
        cache.composite_and_draw(&mut s, RegionId(0), &[], true);
        cache.prepare(&mut s, RegionId(0), true);
        cache.composite_and_draw(&mut s, RegionId(0), &[], true);

        assert_eq!(s.captures(), 1);
        assert_eq!(s.blits(), 2);
        assert_eq!(cache.stats().frames, 2);
        assert_eq!(cache.stats().snapshots, 1);
    }

    #[test]
    fn test_mark_dirty_forces_recapture() {
        let mut s = surface();
        let mut cache = RenderCache::new();

        cache.prepare(&mut s, RegionId(0), true);
        cache.mark_dirty();
        assert!(cache.needs_refresh());
        cache.prepare(&mut s, RegionId(0), true);

        assert_eq!(s.captures(), 2);
    }

    #[test]
    fn test_resize_is_detected_and_recovered() {
        let mut s = surface();
        let mut cache = RenderCache::new();
        cache.prepare(&mut s, RegionId(0), true);

        s.set_size(Size::new(200.0, 100.0));
        assert!(matches!(
            cache.validate(&s, RegionId(0)),
            Err(CoordinatorError::StaleCache { .. })
        ));

        cache.prepare(&mut s, RegionId(0), true);
        assert_eq!(s.captures(), 2);
        assert_eq!(cache.stats().stale_recoveries, 1);
        assert_eq!(cache.background().unwrap().size, Size::new(200.0, 100.0));
        assert!(cache.validate(&s, RegionId(0)).is_ok());
    }

    #[test]
    fn test_region_change_is_stale() {
        let mut s = RecordingSurface::with_columns(CanvasId(0), Size::new(200.0, 100.0), 2);
        let mut cache = RenderCache::new();
        cache.prepare(&mut s, RegionId(0), true);

        assert!(cache.validate(&s, RegionId(1)).is_err());
        cache.prepare(&mut s, RegionId(1), true);
        assert_eq!(cache.background().unwrap().region, RegionId(1));
    }

    #[test]
    fn test_other_canvas_is_stale() {
        let mut first = surface();
        let mut second = RecordingSurface::new(CanvasId(1), Size::new(100.0, 100.0));
        let mut cache = RenderCache::new();
        cache.prepare(&mut first, RegionId(0), true);
        cache.prepare(&mut second, RegionId(0), true);

        assert!(matches!(
            cache.validate(&first, RegionId(0)),
            Err(CoordinatorError::StaleCache { captured_canvas: CanvasId(1), current_canvas: CanvasId(0), .. })
        ));
        first.clear_calls();
        cache.prepare(&mut first, RegionId(0), true);
        assert_eq!(first.captures(), 1);
        assert_eq!(cache.background().unwrap().canvas, CanvasId(0));
        assert_eq!(cache.stats().stale_recoveries, 2);
    }

    #[test]
    fn test_no_blit_means_full_redraw() {
        let mut s = surface();
        let mut cache = RenderCache::new();

        for _ in 0..3 {
            cache.prepare(&mut s, RegionId(0), false);
            cache.composite_and_draw(&mut s, RegionId(0), &[], false);
        }

        assert_eq!(s.captures(), 0);
        assert_eq!(s.full_draws(), 3);
        assert_eq!(cache.stats().full_redraws, 3);
    }

    #[test]
    fn test_frame_draws_moving_artifacts_after_restore() {
        let mut s = surface();
        let moving = s.add_artifact(RegionId(0), ArtifactSpec::marker(Point::ZERO).animated(true));
        let mut cache = RenderCache::new();

        cache.prepare(&mut s, RegionId(0), true);
        cache.composite_and_draw(&mut s, RegionId(0), &[moving], true);

        let tail: Vec<_> = s.calls().iter().rev().take(3).cloned().collect();
        assert_eq!(tail[0], DrawCall::Blit(RegionId(0)));
        assert_eq!(tail[1], DrawCall::DrawArtifact(moving));
        assert!(matches!(tail[2], DrawCall::Restore(_)));
    }

    #[test]
    fn test_invalidate_drops_background() {
        let mut s = surface();
        let mut cache = RenderCache::new();
        cache.prepare(&mut s, RegionId(0), true);
        assert!(!cache.needs_refresh());

        cache.invalidate();
        assert!(cache.background().is_none());
        assert!(cache.needs_refresh());
    }
}
