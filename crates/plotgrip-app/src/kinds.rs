//! Reference interactive kinds used by scripted sessions.

use crate::shortcuts::{
    ADD_POINT, HIDE, NEXT_COLOR, PREVIOUS_COLOR, REMOVE, REMOVE_ALL, REMOVE_POINT, STOP,
};
use kurbo::Point;
use plotgrip_core::{
    ActiveInfo, ArtifactId, ArtifactSpec, ColorRgba, Command, EventKind, InteractiveObject,
    LineStyle, MotionFrame, MotionMode, MouseButton, ObjectContext, ObjectKind, OthersScope,
    Palette, Pointer, PressInfo, RegionId,
};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

pub const SEGMENT: ObjectKind = ObjectKind::draggable("segment");
pub const CROSSHAIR: ObjectKind = ObjectKind::always_moving("crosshair");

/// A straight line with a handle at each end.
///
/// Dragging the line moves it; dragging a handle moves that end only.
#[derive(Debug, Clone)]
pub struct Segment {
    start: Point,
    end: Point,
    color: Option<ColorRgba>,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            color: None,
        }
    }

    pub fn with_color(mut self, color: ColorRgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn ends(&self) -> (Point, Point) {
        (self.start, self.end)
    }
}

impl InteractiveObject for Segment {
    fn kind(&self) -> ObjectKind {
        SEGMENT
    }

    fn create(&mut self, ctx: &mut ObjectContext<'_>) -> Vec<ArtifactId> {
        let color = self.color.unwrap_or(ctx.palette.default_color());
        let region = ctx.region.id;
        let line = ArtifactSpec::line(vec![self.start, self.end])
            .with_color(color)
            .with_width(2.0);
        vec![
            ctx.surface.add_artifact(region, line),
            ctx.surface
                .add_artifact(region, ArtifactSpec::marker(self.start).with_color(color)),
            ctx.surface
                .add_artifact(region, ArtifactSpec::marker(self.end).with_color(color)),
        ]
    }

    fn update_position(&mut self, ctx: &mut ObjectContext<'_>, frame: &MotionFrame<'_>) {
        let delta = frame.pointer.position - frame.press.click;
        match frame.active.mode {
            MotionMode::Translate => {
                let [_, start, end] = frame.press.anchors[..] else {
                    return;
                };
                self.start = ctx.region.px_to_data(start + delta);
                self.end = ctx.region.px_to_data(end + delta);
            }
            MotionMode::Handle(0) => self.start = ctx.region.px_to_data(frame.pointer.position),
            MotionMode::Handle(_) => self.end = ctx.region.px_to_data(frame.pointer.position),
            MotionMode::None | MotionMode::Follow => return,
        }
        if let [line, start, end] = ctx.artifacts[..] {
            ctx.surface.set_artifact_points(line, vec![self.start, self.end]);
            ctx.surface.set_artifact_points(start, vec![self.start]);
            ctx.surface.set_artifact_points(end, vec![self.end]);
        }
    }

    fn press_info(&mut self, ctx: &ObjectContext<'_>, pointer: &Pointer) -> PressInfo {
        PressInfo::from_artifacts(ctx, pointer)
    }

    fn active_info(&mut self, picked: &[ArtifactId], artifacts: &[ArtifactId]) -> ActiveInfo {
        let handle = artifacts
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, artifact)| picked.contains(artifact));
        match handle {
            Some((index, &artifact)) => {
                ActiveInfo::new(vec![artifacts[0], artifact], MotionMode::Handle(index - 1))
            }
            None => ActiveInfo::new(artifacts.to_vec(), MotionMode::Translate),
        }
    }

    fn label(&self) -> Option<String> {
        Some(format!(
            "({:.2}, {:.2}) to ({:.2}, {:.2})",
            self.start.x, self.start.y, self.end.x, self.end.y
        ))
    }
}

/// Points recorded by a crosshair, shared with whoever spawned it.
#[derive(Debug, Clone, Default)]
pub struct ClickLog(Rc<RefCell<Vec<Point>>>);

impl ClickLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> Vec<Point> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn push(&self, point: Point) {
        self.0.borrow_mut().push(point);
    }

    fn pop(&self) -> Option<Point> {
        self.0.borrow_mut().pop()
    }
}

/// Horizontal and vertical lines crossing at the pointer.
///
/// A recording crosshair also logs clicks. A press released where it started
/// adds the current position (left button), drops the last one (right) or
/// stops (middle). Stopping deletes the crosshair.
#[derive(Debug, Clone, Default)]
pub struct Crosshair {
    position: Point,
    color: Option<ColorRgba>,
    color_step: isize,
    /// Remove the other crosshairs of the canvas when created.
    exclusive: bool,
    clicks: Option<ClickLog>,
    /// Stop once this many points are recorded.
    limit: Option<usize>,
    pressed_at: Option<Point>,
}

impl Crosshair {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_color(mut self, color: ColorRgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Record clicks into `log`.
    pub fn recording(mut self, log: ClickLog) -> Self {
        self.clicks = Some(log);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn position(&self) -> Point {
        self.position
    }

    fn add_point(&mut self) -> Vec<Command> {
        let Some(clicks) = &self.clicks else {
            return Vec::new();
        };
        clicks.push(self.position);
        log::debug!("Recorded ({:.2}, {:.2})", self.position.x, self.position.y);
        match self.limit {
            Some(limit) if clicks.len() >= limit => vec![Command::Delete],
            _ => Vec::new(),
        }
    }

    fn remove_point(&mut self) -> Vec<Command> {
        if let Some(point) = self.clicks.as_ref().and_then(ClickLog::pop) {
            log::debug!("Dropped ({:.2}, {:.2})", point.x, point.y);
        }
        Vec::new()
    }

    fn stop(&mut self) -> Vec<Command> {
        if self.clicks.is_some() {
            vec![Command::Delete]
        } else {
            Vec::new()
        }
    }

    fn lines(&self, ctx: &ObjectContext<'_>) -> (Vec<Point>, Vec<Point>) {
        let limits = ctx.region.limits;
        let p = self.position;
        (
            vec![Point::new(limits.x0, p.y), Point::new(limits.x1, p.y)],
            vec![Point::new(p.x, limits.y0), Point::new(p.x, limits.y1)],
        )
    }
}

impl InteractiveObject for Crosshair {
    fn kind(&self) -> ObjectKind {
        CROSSHAIR
    }

    fn create(&mut self, ctx: &mut ObjectContext<'_>) -> Vec<ArtifactId> {
        let base = self.color.unwrap_or(ctx.palette.default_color());
        let color = ctx.palette.cycle(base, self.color_step);
        let (horizontal, vertical) = self.lines(ctx);
        let region = ctx.region.id;
        let style = |points| {
            ArtifactSpec::line(points)
                .with_color(color)
                .with_style(LineStyle::Dashed)
        };
        vec![
            ctx.surface.add_artifact(region, style(horizontal)),
            ctx.surface.add_artifact(region, style(vertical)),
            ctx.surface
                .add_artifact(region, ArtifactSpec::marker(self.position).with_color(color)),
        ]
    }

    fn update_position(&mut self, ctx: &mut ObjectContext<'_>, frame: &MotionFrame<'_>) {
        self.position = ctx.region.px_to_data(frame.pointer.position);
        let (horizontal, vertical) = self.lines(ctx);
        if let [h, v, center] = ctx.artifacts[..] {
            ctx.surface.set_artifact_points(h, horizontal);
            ctx.surface.set_artifact_points(v, vertical);
            ctx.surface.set_artifact_points(center, vec![self.position]);
        }
    }

    fn press_info(&mut self, _ctx: &ObjectContext<'_>, pointer: &Pointer) -> PressInfo {
        PressInfo {
            click: pointer.position,
            anchors: vec![pointer.position],
            pressed: false,
        }
    }

    fn active_info(&mut self, _picked: &[ArtifactId], artifacts: &[ArtifactId]) -> ActiveInfo {
        ActiveInfo::new(artifacts.to_vec(), MotionMode::Follow)
    }

    fn capabilities(&self) -> &'static [EventKind] {
        &[
            EventKind::Move,
            EventKind::Press,
            EventKind::Release,
            EventKind::KeyPress,
            EventKind::LeaveCanvas,
            EventKind::EnterRegion,
            EventKind::Close,
        ]
    }

    fn label(&self) -> Option<String> {
        Some(format!("at ({:.2}, {:.2})", self.position.x, self.position.y))
    }

    fn on_created(&mut self) -> Vec<Command> {
        if self.exclusive {
            vec![Command::DeleteOthers(OthersScope::SameKindOnCanvas)]
        } else {
            Vec::new()
        }
    }

    fn on_press(&mut self, pointer: &Pointer) -> Vec<Command> {
        if self.clicks.is_some() {
            self.pressed_at = Some(pointer.position);
        }
        Vec::new()
    }

    fn on_release(&mut self, pointer: &Pointer) -> Vec<Command> {
        if self.pressed_at.take() != Some(pointer.position) {
            return Vec::new();
        }
        match pointer.button {
            Some(MouseButton::Left) => self.add_point(),
            Some(MouseButton::Right) => self.remove_point(),
            Some(MouseButton::Middle) => self.stop(),
            None => Vec::new(),
        }
    }

    fn on_key_press(&mut self, key: &str, pointer: Option<&Pointer>) -> Vec<Command> {
        if NEXT_COLOR.matches(key) {
            self.color_step += 1;
            vec![Command::Recreate]
        } else if PREVIOUS_COLOR.matches(key) {
            self.color_step -= 1;
            vec![Command::Recreate]
        } else if HIDE.matches(key) {
            vec![Command::Erase]
        } else if REMOVE_ALL.matches(key) {
            vec![Command::DeleteOthers(OthersScope::SameKindOnCanvas), Command::Delete]
        } else if REMOVE.matches(key) {
            vec![Command::Delete]
        } else if ADD_POINT.matches(key) && pointer.is_some() {
            self.add_point()
        } else if REMOVE_POINT.matches(key) {
            self.remove_point()
        } else if STOP.matches(key) {
            self.stop()
        } else {
            Vec::new()
        }
    }

    fn on_enter_region(&mut self, region: RegionId, _pointer: &Pointer) -> Vec<Command> {
        vec![Command::SetRegion(region)]
    }
}

/// Object description in a session script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectSpec {
    Segment {
        start: Point,
        end: Point,
        #[serde(default)]
        color: Option<String>,
    },
    Crosshair {
        #[serde(default)]
        at: Option<Point>,
        #[serde(default)]
        exclusive: bool,
        #[serde(default)]
        color: Option<String>,
        /// Record clicks.
        #[serde(default)]
        record: bool,
        /// Stop after this many recorded clicks.
        #[serde(default)]
        clicks: Option<usize>,
    },
}

impl ObjectSpec {
    /// Build the object, resolving its color against the board palette.
    /// Recording crosshairs also hand back the log their clicks go to.
    pub fn build(&self, palette: &mut Palette) -> (Box<dyn InteractiveObject>, Option<ClickLog>) {
        match self {
            ObjectSpec::Segment { start, end, color } => {
                let mut segment = Segment::new(*start, *end);
                if color.is_some() {
                    segment = segment.with_color(palette.resolve_named(color.as_deref()));
                }
                (Box::new(segment), None)
            }
            ObjectSpec::Crosshair {
                at,
                exclusive,
                color,
                record,
                clicks,
            } => {
                let mut crosshair = Crosshair::new().at(at.unwrap_or_default());
                if color.is_some() {
                    crosshair = crosshair.with_color(palette.resolve_named(color.as_deref()));
                }
                if *exclusive {
                    crosshair = crosshair.exclusive();
                }
                if let Some(limit) = clicks {
                    crosshair = crosshair.with_limit(*limit);
                }
                let log = (*record || clicks.is_some()).then(ClickLog::new);
                if let Some(log) = &log {
                    crosshair = crosshair.recording(log.clone());
                }
                (Box::new(crosshair), log)
            }
        }
    }
}
