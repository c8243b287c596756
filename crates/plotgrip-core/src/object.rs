//! Interactive object capability interface.
//!
//! Concrete kinds (lines, rectangles, cursors, ...) implement
//! [`InteractiveObject`]. The board owns every object and calls these hooks;
//! hooks never reach the board directly, they return [`Command`]s that the
//! board applies once the hook has returned.

use crate::artifact::ArtifactId;
use crate::input::{EventKind, Pointer};
use crate::palette::Palette;
use crate::region::{Region, RegionId};
use crate::registry::OthersScope;
use crate::surface::Surface;
use kurbo::{Point, Size};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for objects.
pub type ObjectId = Uuid;

/// Whether a kind can lead a motion episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotionRole {
    /// Moves only when picked and dragged.
    Draggable,
    /// Follows the pointer permanently (e.g. a position cursor). Never leads.
    AlwaysMoving,
}

/// Kind identifier shared by all objects of one concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectKind {
    name: &'static str,
    role: MotionRole,
}

impl ObjectKind {
    /// A kind whose objects move when dragged.
    pub const fn draggable(name: &'static str) -> Self {
        Self {
            name,
            role: MotionRole::Draggable,
        }
    }

    /// A kind whose objects follow the pointer.
    pub const fn always_moving(name: &'static str) -> Self {
        Self {
            name,
            role: MotionRole::AlwaysMoving,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn role(&self) -> MotionRole {
        self.role
    }

    pub fn is_always_moving(&self) -> bool {
        self.role == MotionRole::AlwaysMoving
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Pointer and object positions recorded when motion starts, in pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PressInfo {
    /// Pointer position at press time.
    pub click: Point,
    /// Reference positions of the object at press time.
    pub anchors: Vec<Point>,
    /// Whether a press is currently held.
    pub pressed: bool,
}

impl PressInfo {
    /// Record the pointer and the first point of every artifact.
    pub fn from_artifacts(ctx: &ObjectContext<'_>, pointer: &Pointer) -> Self {
        let anchors = ctx
            .artifacts
            .iter()
            .filter_map(|&id| ctx.surface.artifact_points(id))
            .filter_map(|points| points.first().copied())
            .map(|p| ctx.region.data_to_px(p))
            .collect();
        Self {
            click: pointer.position,
            anchors,
            pressed: true,
        }
    }
}

/// How an object moves during the current episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MotionMode {
    #[default]
    None,
    /// The whole object translates with the pointer.
    Translate,
    /// A single handle (e.g. a line end) follows the pointer.
    Handle(usize),
    /// The object tracks the pointer position directly.
    Follow,
}

/// Which artifacts are active during motion, and how they move.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveInfo {
    pub artifacts: Vec<ArtifactId>,
    pub mode: MotionMode,
}

impl ActiveInfo {
    pub fn new(artifacts: Vec<ArtifactId>, mode: MotionMode) -> Self {
        Self { artifacts, mode }
    }
}

/// Data passed to [`InteractiveObject::update_position`] on every frame.
#[derive(Debug, Clone, Copy)]
pub struct MotionFrame<'a> {
    pub pointer: &'a Pointer,
    pub press: &'a PressInfo,
    pub active: &'a ActiveInfo,
}

/// Access to the canvas for an object hook.
pub struct ObjectContext<'a> {
    pub surface: &'a mut dyn Surface,
    /// Region the object lives in.
    pub region: Region,
    /// The object's current artifacts.
    pub artifacts: &'a [ArtifactId],
    pub palette: &'a Palette,
    /// Whether blitting is enabled (new artifacts should be animated when
    /// they are created already moving).
    pub blit: bool,
}

/// Requests returned by object hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Hide the object, keeping it registered.
    Erase,
    /// Rebuild the object's artifacts through its creation hook.
    Recreate,
    /// Delete the object.
    Delete,
    /// Delete other objects of the same kind.
    DeleteOthers(OthersScope),
    /// Move the object to another region of its canvas.
    SetRegion(RegionId),
    /// Full redraw of the canvas; also invalidates the background.
    Redraw,
}

/// Capability interface every concrete kind implements.
pub trait InteractiveObject {
    /// Kind of this object.
    fn kind(&self) -> ObjectKind;

    /// Create the object's artifacts on the surface.
    fn create(&mut self, ctx: &mut ObjectContext<'_>) -> Vec<ArtifactId>;

    /// Reposition the object's artifacts for the pointer in `frame`.
    fn update_position(&mut self, ctx: &mut ObjectContext<'_>, frame: &MotionFrame<'_>);

    /// Record press context when the object starts moving.
    fn press_info(&mut self, ctx: &ObjectContext<'_>, pointer: &Pointer) -> PressInfo;

    /// Decide which artifacts move and how, given the picked ones.
    fn active_info(&mut self, picked: &[ArtifactId], artifacts: &[ArtifactId]) -> ActiveInfo;

    /// Event kinds this object reacts to.
    fn capabilities(&self) -> &'static [EventKind] {
        &EventKind::ALL
    }

    /// Short description used in labels and logs.
    fn label(&self) -> Option<String> {
        None
    }

    /// Called once the object is registered and connected.
    fn on_created(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn on_press(&mut self, _pointer: &Pointer) -> Vec<Command> {
        Vec::new()
    }

    fn on_release(&mut self, _pointer: &Pointer) -> Vec<Command> {
        Vec::new()
    }

    fn on_key_press(&mut self, _key: &str, _pointer: Option<&Pointer>) -> Vec<Command> {
        Vec::new()
    }

    fn on_key_release(&mut self, _key: &str, _pointer: Option<&Pointer>) -> Vec<Command> {
        Vec::new()
    }

    fn on_enter_canvas(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn on_leave_canvas(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn on_enter_region(&mut self, _region: RegionId, _pointer: &Pointer) -> Vec<Command> {
        Vec::new()
    }

    fn on_leave_region(&mut self, _region: RegionId, _pointer: &Pointer) -> Vec<Command> {
        Vec::new()
    }

    fn on_resize(&mut self, _size: Size) -> Vec<Command> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSpec;
    use crate::surface::{CanvasId, RecordingSurface};

    #[test]
    fn test_kind_roles() {
        const LINE: ObjectKind = ObjectKind::draggable("line");
        const CURSOR: ObjectKind = ObjectKind::always_moving("cursor");

        assert!(!LINE.is_always_moving());
        assert!(CURSOR.is_always_moving());
        assert_ne!(LINE, CURSOR);
        assert_eq!(CURSOR.to_string(), "cursor");
    }

    #[test]
    fn test_press_info_from_artifacts() {
        let mut surface = RecordingSurface::new(CanvasId(0), Size::new(100.0, 100.0));
        let region = Region::new(RegionId(0), kurbo::Rect::new(0.0, 0.0, 100.0, 100.0))
            .with_limits(kurbo::Rect::new(0.0, 0.0, 10.0, 10.0));
        let a = surface.add_artifact(RegionId(0), ArtifactSpec::marker(Point::new(1.0, 2.0)));
        let b = surface.add_artifact(
            RegionId(0),
            ArtifactSpec::line(vec![Point::new(5.0, 5.0), Point::new(6.0, 6.0)]),
        );
        let artifacts = [a, b];
        let palette = Palette::new();
        let ctx = ObjectContext {
            surface: &mut surface,
            region,
            artifacts: &artifacts,
            palette: &palette,
            blit: true,
        };

        let info = PressInfo::from_artifacts(&ctx, &Pointer::at(30.0, 40.0));
        assert!(info.pressed);
        assert_eq!(info.click, Point::new(30.0, 40.0));
        assert_eq!(info.anchors.len(), 2);
        assert!((info.anchors[0].x - 10.0).abs() < 1e-10);
        assert!((info.anchors[1].y - 50.0).abs() < 1e-10);
    }
}
