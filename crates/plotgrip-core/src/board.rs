//! The board: owner of every canvas, object and piece of motion state.
//!
//! All mutation goes through `&mut Board`, so handlers always run to
//! completion one after the other. Object hooks never see the board; the
//! commands they return are applied once the hook is done.

use crate::artifact::ArtifactId;
use crate::cache::{FrameStats, RenderCache};
use crate::config::BoardConfig;
use crate::dispatch::{ConnectionId, Dispatcher};
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::input::{CanvasEvent, EventKind, InputState, Pointer};
use crate::lifecycle::{ObjectState, SpawnOptions};
use crate::motion::{MotionCoordinator, MotionPhase, Participation};
use crate::object::{Command, InteractiveObject, MotionFrame, ObjectContext, ObjectId, ObjectKind};
use crate::palette::Palette;
use crate::region::{Region, RegionId};
use crate::registry::{KindScope, ObjectEntry, OthersScope, Registry};
use crate::surface::{CanvasId, Surface};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

/// Messages for the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardNotice {
    /// An object spawned with [`SpawnOptions::blocking`] was deleted; the
    /// host should leave its blocking event loop.
    StopEventLoop(ObjectId),
}

/// Coordination hub for interactive objects on one or more canvases.
pub struct Board<S: Surface> {
    config: BoardConfig,
    surfaces: BTreeMap<CanvasId, S>,
    inputs: HashMap<CanvasId, InputState>,
    registry: Registry,
    dispatcher: Dispatcher,
    motion: MotionCoordinator,
    cache: RenderCache,
    palette: Palette,
    /// Board-wide blitting mode.
    blit: bool,
    notices: Vec<BoardNotice>,
}

impl<S: Surface> Default for Board<S> {
    fn default() -> Self {
        Self::new(BoardConfig::default())
    }
}

impl<S: Surface> Board<S> {
    /// Create an empty board.
    pub fn new(config: BoardConfig) -> Self {
        Self {
            palette: config.palette(),
            blit: config.blit,
            config,
            surfaces: BTreeMap::new(),
            inputs: HashMap::new(),
            registry: Registry::new(),
            dispatcher: Dispatcher::new(),
            motion: MotionCoordinator::new(),
            cache: RenderCache::new(),
            notices: Vec::new(),
        }
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    /// Whether motion frames are blitted.
    pub fn blit(&self) -> bool {
        self.blit
    }

    pub fn set_blit(&mut self, blit: bool) {
        if self.blit != blit {
            self.blit = blit;
            self.cache.invalidate();
        }
    }

    // --- Canvases ---

    /// Add a canvas. A canvas with the same id is replaced.
    pub fn add_canvas(&mut self, surface: S) -> CanvasId {
        let id = surface.id();
        if self.surfaces.insert(id, surface).is_some() {
            log::warn!("Replacing {}", id);
        }
        self.inputs.insert(id, InputState::new());
        id
    }

    pub fn surface(&self, canvas: CanvasId) -> CoordinatorResult<&S> {
        self.surfaces
            .get(&canvas)
            .ok_or(CoordinatorError::UnknownCanvas(canvas))
    }

    pub fn surface_mut(&mut self, canvas: CanvasId) -> CoordinatorResult<&mut S> {
        self.surfaces
            .get_mut(&canvas)
            .ok_or(CoordinatorError::UnknownCanvas(canvas))
    }

    /// Every canvas, ordered by id.
    pub fn surfaces(&self) -> impl Iterator<Item = &S> {
        self.surfaces.values()
    }

    /// Pointer state tracked for a canvas.
    pub fn input(&self, canvas: CanvasId) -> Option<&InputState> {
        self.inputs.get(&canvas)
    }

    // --- Lifecycle ---

    /// Create an object's artifacts, register it and connect its events.
    pub fn spawn(
        &mut self,
        canvas: CanvasId,
        object: impl InteractiveObject + 'static,
        options: SpawnOptions,
    ) -> CoordinatorResult<ObjectId> {
        self.spawn_boxed(canvas, Box::new(object), options)
    }

    /// Same as [`Board::spawn`] for an already boxed object.
    pub fn spawn_boxed(
        &mut self,
        canvas: CanvasId,
        object: Box<dyn InteractiveObject>,
        options: SpawnOptions,
    ) -> CoordinatorResult<ObjectId> {
        let surface = self
            .surfaces
            .get_mut(&canvas)
            .ok_or(CoordinatorError::UnknownCanvas(canvas))?;
        if let Some(blit) = options.blit {
            if self.blit != blit {
                log::debug!("Blitting {} by newly spawned object", if blit { "enabled" } else { "disabled" });
                self.blit = blit;
            }
        }

        let region = options.region.unwrap_or(RegionId(0));
        let mut entry = ObjectEntry::new(Uuid::new_v4(), canvas, region, object);
        entry.block = options.block;
        build_artifacts(surface, &self.palette, self.blit, &mut entry);

        let id = entry.id;
        let kind = entry.kind;
        let capabilities = entry.object.capabilities();
        self.registry.register(entry)?;
        self.dispatcher.connect(id, canvas, capabilities);
        self.cache.mark_dirty();
        log::debug!("Spawned {} {} on {}", kind, id, canvas);

        let commands = self.registry.get_mut(id)?.object.on_created();
        self.apply(id, commands)?;
        Ok(id)
    }

    /// Hide an object's artifacts. The object stays registered.
    pub fn erase(&mut self, id: ObjectId) -> CoordinatorResult<()> {
        if self.registry.get(id)?.state.is_erased() {
            return Ok(());
        }
        self.leave_motion(id)?;

        let entry = self.registry.get_mut(id)?;
        if let Some(surface) = self.surfaces.get_mut(&entry.canvas) {
            for &artifact in &entry.artifacts {
                surface.set_visible(artifact, false);
            }
        }
        entry.state = ObjectState::Erased;
        self.cache.mark_dirty();
        log::debug!("Erased {} {}", entry.kind, id);
        Ok(())
    }

    /// Replace an object's artifacts with fresh ones from its creation hook.
    pub fn recreate(&mut self, id: ObjectId) -> CoordinatorResult<()> {
        self.leave_motion(id)?;

        let entry = self.registry.get_mut(id)?;
        let surface = self
            .surfaces
            .get_mut(&entry.canvas)
            .ok_or(CoordinatorError::UnknownCanvas(entry.canvas))?;
        for artifact in entry.artifacts.drain(..) {
            surface.remove_artifact(artifact);
        }
        build_artifacts(surface, &self.palette, self.blit, entry);
        entry.state = ObjectState::Created;
        self.cache.mark_dirty();
        Ok(())
    }

    /// Move an object to another region of its canvas, rebuilding its
    /// artifacts there.
    pub fn set_region(&mut self, id: ObjectId, region: RegionId) -> CoordinatorResult<()> {
        let entry = self.registry.get_mut(id)?;
        if entry.region == region {
            return Ok(());
        }
        entry.region = region;
        self.recreate(id)
    }

    /// Remove an object for good. Deleting a deleted object does nothing.
    pub fn delete(&mut self, id: ObjectId) -> CoordinatorResult<()> {
        if self.registry.is_deleted(id) {
            return Ok(());
        }
        self.leave_motion(id)?;

        let Some(entry) = self.registry.remove(id)? else {
            return Ok(());
        };
        self.dispatcher.disconnect(id);
        if let Some(surface) = self.surfaces.get_mut(&entry.canvas) {
            for &artifact in &entry.artifacts {
                surface.remove_artifact(artifact);
            }
        }
        self.cache.mark_dirty();
        if entry.block {
            self.notices.push(BoardNotice::StopEventLoop(id));
        }
        log::debug!("Deleted {} {}", entry.kind, id);
        Ok(())
    }

    /// Delete the other objects of `id`'s kind within `scope`.
    pub fn delete_others(&mut self, id: ObjectId, scope: OthersScope) -> CoordinatorResult<Vec<ObjectId>> {
        let others = self.registry.others(id, scope)?;
        for &other in &others {
            self.delete(other)?;
        }
        Ok(others)
    }

    /// Delete every object of one kind.
    pub fn clear_kind(&mut self, kind: ObjectKind) -> CoordinatorResult<usize> {
        let ids: Vec<ObjectId> = self
            .registry
            .enumerate(KindScope::Kind(kind))
            .map(|entry| entry.id)
            .collect();
        for &id in &ids {
            self.delete(id)?;
        }
        Ok(ids.len())
    }

    /// Delete every object.
    pub fn clear_all(&mut self) -> CoordinatorResult<usize> {
        let ids = self.registry.ids();
        for &id in &ids {
            self.delete(id)?;
        }
        Ok(ids.len())
    }

    /// Objects in registration order. The iterator can be cloned to
    /// restart it.
    pub fn enumerate(&self, scope: KindScope) -> impl Iterator<Item = &ObjectEntry> + Clone + '_ {
        self.registry.enumerate(scope)
    }

    pub fn object(&self, id: ObjectId) -> CoordinatorResult<&ObjectEntry> {
        self.registry.get(id)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Human-readable label, e.g. `cursor #2/3 on canvas 0`.
    pub fn describe(&self, id: ObjectId) -> CoordinatorResult<String> {
        let entry = self.registry.get(id)?;
        let (index, count) = self.registry.rank(id)?;
        let base = format!("{} #{}/{} on {}", entry.kind, index, count, entry.canvas);
        Ok(match entry.object.label() {
            Some(label) => format!("{} ({})", base, label),
            None => base,
        })
    }

    /// Messages accumulated for the host since the last call.
    pub fn take_notices(&mut self) -> Vec<BoardNotice> {
        std::mem::take(&mut self.notices)
    }

    // --- Event bindings ---

    /// Bind an object to the events of its canvas. Returns false if it was
    /// already bound.
    pub fn connect(&mut self, id: ObjectId) -> CoordinatorResult<bool> {
        let entry = self.registry.get(id)?;
        Ok(self.dispatcher.connect(id, entry.canvas, entry.object.capabilities()))
    }

    /// Remove every event binding of an object. Returns false if it had none.
    pub fn disconnect(&mut self, id: ObjectId) -> CoordinatorResult<bool> {
        self.registry.get(id)?;
        Ok(self.dispatcher.disconnect(id))
    }

    pub fn connection(&self, id: ObjectId, kind: EventKind) -> Option<ConnectionId> {
        self.dispatcher.connection(id, kind)
    }

    pub fn is_connected(&self, id: ObjectId) -> bool {
        self.dispatcher.is_connected(id)
    }

    // --- Motion ---

    pub fn phase(&self) -> MotionPhase {
        self.motion.phase()
    }

    pub fn leader(&self) -> Option<ObjectId> {
        self.motion.leader()
    }

    pub fn moving(&self) -> &[ObjectId] {
        self.motion.moving()
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    pub fn frame_stats(&self) -> FrameStats {
        self.cache.stats()
    }

    /// Start moving an object: it leads if nothing else does, otherwise it
    /// follows the current leader.
    pub fn initiate_motion(&mut self, id: ObjectId, pointer: &Pointer) -> CoordinatorResult<Participation> {
        let entry = self.registry.get(id)?;
        if entry.state.is_erased() {
            log::debug!("Not moving erased {} {}", entry.kind, id);
            return Ok(Participation::Skipped);
        }
        let canvas = entry.canvas;
        let participation = self.motion.elect(id, entry.kind.is_always_moving())?;
        if participation == Participation::Leader {
            log::debug!("{} {} leads the motion", entry.kind, id);
        }
        self.cache.mark_dirty();

        let entry = self.registry.get_mut(id)?;
        let surface = self
            .surfaces
            .get_mut(&canvas)
            .ok_or(CoordinatorError::UnknownCanvas(canvas))?;
        if self.blit {
            for &artifact in &entry.artifacts {
                surface.set_animated(artifact, true);
            }
        }
        entry.active = entry.object.active_info(&entry.picked, &entry.artifacts);
        let region = region_of(surface, entry.region);
        let ctx = ObjectContext {
            surface,
            region,
            artifacts: &entry.artifacts,
            palette: &self.palette,
            blit: self.blit,
        };
        entry.press = entry.object.press_info(&ctx, pointer);
        entry.moving = true;
        Ok(participation)
    }

    /// Draw one motion frame.
    ///
    /// Only the leader, or an always-moving object while no one leads,
    /// drives frames; other callers get `Ok(false)`.
    pub fn update_graph(&mut self, id: ObjectId, pointer: &Pointer) -> CoordinatorResult<bool> {
        let entry = self.registry.get(id)?;
        let free_follow =
            self.motion.is_idle() && entry.kind.is_always_moving() && self.motion.is_moving(id);
        if !self.motion.is_leader(id) && !free_follow {
            return Ok(false);
        }
        let (canvas, region) = (entry.canvas, entry.region);
        let surface = self
            .surfaces
            .get_mut(&canvas)
            .ok_or(CoordinatorError::UnknownCanvas(canvas))?;

        self.cache.prepare(&mut *surface, region, self.blit);
        let mut drawn: Vec<ArtifactId> = Vec::new();
        for &moving in self.motion.moving() {
            let Ok(entry) = self.registry.get_mut(moving) else {
                continue;
            };
            if entry.canvas != canvas || !entry.state.is_visible() {
                continue;
            }
            let own_region = region_of(surface, entry.region);
            let mut ctx = ObjectContext {
                surface: &mut *surface,
                region: own_region,
                artifacts: &entry.artifacts,
                palette: &self.palette,
                blit: self.blit,
            };
            let frame = MotionFrame {
                pointer,
                press: &entry.press,
                active: &entry.active,
            };
            entry.object.update_position(&mut ctx, &frame);
            drawn.extend(entry.artifacts.iter().copied());
        }
        self.cache.composite_and_draw(surface, region, &drawn, self.blit);
        Ok(true)
    }

    /// End the motion episode. Safe to call in any state.
    pub fn reset_after_motion(&mut self) {
        let moving = self.motion.reset();
        let mut canvases = BTreeSet::new();
        for &id in &moving {
            let Ok(entry) = self.registry.get_mut(id) else {
                continue;
            };
            if let Some(surface) = self.surfaces.get_mut(&entry.canvas) {
                for &artifact in &entry.artifacts {
                    surface.set_animated(artifact, false);
                }
                canvases.insert(entry.canvas);
            }
            entry.clear_motion_state();
        }
        for entry in self.registry.iter_mut() {
            entry.picked.clear();
        }
        self.cache.invalidate();

        if moving.is_empty() {
            return;
        }
        if self.blit {
            for canvas in canvases {
                if let Some(surface) = self.surfaces.get_mut(&canvas) {
                    surface.draw();
                }
            }
        }
        log::debug!("Motion reset, {} objects released", moving.len());
    }

    /// Take an object out of the current episode. Losing the leader ends it.
    fn leave_motion(&mut self, id: ObjectId) -> CoordinatorResult<()> {
        if self.motion.is_leader(id) {
            self.reset_after_motion();
            return Ok(());
        }
        if !self.motion.is_moving(id) {
            return Ok(());
        }
        self.motion.remove(id);
        let entry = self.registry.get_mut(id)?;
        if let Some(surface) = self.surfaces.get_mut(&entry.canvas) {
            for &artifact in &entry.artifacts {
                surface.set_animated(artifact, false);
            }
        }
        entry.clear_motion_state();
        self.cache.mark_dirty();
        Ok(())
    }

    // --- Event dispatch ---

    /// Deliver a raw canvas event to every connected object on that canvas,
    /// in registration order.
    pub fn dispatch(&mut self, canvas: CanvasId, event: &CanvasEvent) -> CoordinatorResult<()> {
        if !self.surfaces.contains_key(&canvas) {
            return Err(CoordinatorError::UnknownCanvas(canvas));
        }
        self.inputs.entry(canvas).or_default().handle_event(event);
        if matches!(event, CanvasEvent::Resize { .. }) {
            self.cache.mark_dirty();
        }

        let targets = self
            .dispatcher
            .targets(canvas, event.kind(), self.registry.ids());
        for id in targets {
            // Earlier handlers in this pass may have deleted or disconnected it.
            if !self.registry.contains(id) || !self.dispatcher.is_connected(id) {
                continue;
            }
            self.deliver(id, event)?;
        }

        if matches!(event, CanvasEvent::LeaveCanvas) && self.config.reset_on_leave {
            self.reset_after_motion();
        }
        Ok(())
    }

    fn deliver(&mut self, id: ObjectId, event: &CanvasEvent) -> CoordinatorResult<()> {
        let commands = match event {
            CanvasEvent::Pick { artifact, pointer } => {
                let entry = self.registry.get_mut(id)?;
                if !entry.artifacts.contains(artifact) {
                    return Ok(());
                }
                if pointer.button == Some(self.config.delete_button) {
                    return self.delete(id);
                }
                entry.pick(*artifact);
                Vec::new()
            }
            CanvasEvent::Press { pointer } => {
                if !self.registry.get(id)?.picked.is_empty() {
                    self.initiate_motion(id, pointer)?;
                }
                self.registry.get_mut(id)?.object.on_press(pointer)
            }
            CanvasEvent::Move { pointer } => {
                let entry = self.registry.get(id)?;
                if entry.kind.is_always_moving()
                    && entry.state.is_visible()
                    && !self.motion.is_moving(id)
                {
                    self.initiate_motion(id, pointer)?;
                }
                self.update_graph(id, pointer)?;
                Vec::new()
            }
            CanvasEvent::Release { pointer } => {
                let entry = self.registry.get_mut(id)?;
                let commands = entry.object.on_release(pointer);
                entry.picked.clear();
                if self.motion.is_moving(id) {
                    self.reset_after_motion();
                }
                commands
            }
            CanvasEvent::KeyPress { key, pointer } => {
                let pointer = self.key_pointer(id, pointer)?;
                self.registry.get_mut(id)?.object.on_key_press(key, pointer.as_ref())
            }
            CanvasEvent::KeyRelease { key, pointer } => {
                let pointer = self.key_pointer(id, pointer)?;
                self.registry.get_mut(id)?.object.on_key_release(key, pointer.as_ref())
            }
            CanvasEvent::EnterCanvas => self.registry.get_mut(id)?.object.on_enter_canvas(),
            CanvasEvent::LeaveCanvas => self.registry.get_mut(id)?.object.on_leave_canvas(),
            CanvasEvent::EnterRegion { region, pointer } => {
                self.registry.get_mut(id)?.object.on_enter_region(*region, pointer)
            }
            CanvasEvent::LeaveRegion { region, pointer } => {
                let entry = self.registry.get_mut(id)?;
                let commands = entry.object.on_leave_region(*region, pointer);
                let own_region = entry.region == *region;
                if own_region && self.config.reset_on_leave && self.motion.is_leader(id) {
                    self.reset_after_motion();
                }
                commands
            }
            CanvasEvent::Resize { size } => self.registry.get_mut(id)?.object.on_resize(*size),
            CanvasEvent::Close => return self.delete(id),
        };
        self.apply(id, commands)
    }

    /// Pointer for a key hook: the event's own, else the last one tracked on
    /// the object's canvas while it is inside.
    fn key_pointer(&self, id: ObjectId, pointer: &Option<Pointer>) -> CoordinatorResult<Option<Pointer>> {
        if pointer.is_some() {
            return Ok(*pointer);
        }
        let canvas = self.registry.get(id)?.canvas;
        Ok(self.inputs.get(&canvas).and_then(InputState::pointer))
    }

    /// Apply the commands an object's hook returned.
    fn apply(&mut self, id: ObjectId, commands: Vec<Command>) -> CoordinatorResult<()> {
        for command in commands {
            if !self.registry.contains(id) {
                log::warn!("Dropping {:?} for deleted object {}", command, id);
                continue;
            }
            match command {
                Command::Erase => self.erase(id)?,
                Command::Recreate => self.recreate(id)?,
                Command::Delete => self.delete(id)?,
                Command::DeleteOthers(scope) => {
                    self.delete_others(id, scope)?;
                }
                Command::SetRegion(region) => self.set_region(id, region)?,
                Command::Redraw => {
                    let canvas = self.registry.get(id)?.canvas;
                    self.cache.mark_dirty();
                    self.surface_mut(canvas)?.draw();
                }
            }
        }
        Ok(())
    }
}

/// Region an object lives in, or the whole canvas if the surface does not
/// know it.
fn region_of(surface: &dyn Surface, id: RegionId) -> Region {
    surface
        .region(id)
        .unwrap_or_else(|| Region::new(id, surface.size().to_rect()))
}

fn build_artifacts(surface: &mut dyn Surface, palette: &Palette, blit: bool, entry: &mut ObjectEntry) {
    let region = region_of(surface, entry.region);
    let mut ctx = ObjectContext {
        surface,
        region,
        artifacts: &entry.artifacts,
        palette,
        blit,
    };
    let artifacts = entry.object.create(&mut ctx);
    entry.artifacts = artifacts;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactSpec;
    use crate::input::MouseButton;
    use crate::object::{ActiveInfo, MotionMode, PressInfo};
    use crate::surface::{DrawCall, RecordingSurface};
    use kurbo::{Point, Size};

    const DOT: ObjectKind = ObjectKind::draggable("dot");
    const TRACKER: ObjectKind = ObjectKind::always_moving("tracker");

    /// Marker that translates with the pointer.
    struct Dot {
        at: Point,
        on_created: Vec<Command>,
        on_key: Vec<Command>,
        key_at: Option<Point>,
    }

    impl Dot {
        fn at(x: f64, y: f64) -> Self {
            Self {
                at: Point::new(x, y),
                on_created: Vec::new(),
                on_key: Vec::new(),
                key_at: None,
            }
        }
    }

    impl InteractiveObject for Dot {
        fn kind(&self) -> ObjectKind {
            DOT
        }

        fn create(&mut self, ctx: &mut ObjectContext<'_>) -> Vec<ArtifactId> {
            let spec = ArtifactSpec::marker(self.at).with_color(ctx.palette.default_color());
            vec![ctx.surface.add_artifact(ctx.region.id, spec)]
        }

        fn update_position(&mut self, ctx: &mut ObjectContext<'_>, frame: &MotionFrame<'_>) {
            let Some(anchor) = frame.press.anchors.first() else {
                return;
            };
            let px = *anchor + (frame.pointer.position - frame.press.click);
            self.at = ctx.region.px_to_data(px);
            for &artifact in &frame.active.artifacts {
                ctx.surface.set_artifact_points(artifact, vec![self.at]);
            }
        }

        fn press_info(&mut self, ctx: &ObjectContext<'_>, pointer: &Pointer) -> PressInfo {
            PressInfo::from_artifacts(ctx, pointer)
        }

        fn active_info(&mut self, _picked: &[ArtifactId], artifacts: &[ArtifactId]) -> ActiveInfo {
            ActiveInfo::new(artifacts.to_vec(), MotionMode::Translate)
        }

        fn on_created(&mut self) -> Vec<Command> {
            std::mem::take(&mut self.on_created)
        }

        fn on_key_press(&mut self, _key: &str, pointer: Option<&Pointer>) -> Vec<Command> {
            self.key_at = pointer.map(|p| p.position);
            self.on_key.clone()
        }

        fn label(&self) -> Option<String> {
            self.key_at.map(|p| format!("key at ({}, {})", p.x, p.y))
        }
    }

    /// Marker glued to the pointer.
    struct Tracker;

    impl InteractiveObject for Tracker {
        fn kind(&self) -> ObjectKind {
            TRACKER
        }

        fn create(&mut self, ctx: &mut ObjectContext<'_>) -> Vec<ArtifactId> {
            vec![ctx.surface.add_artifact(ctx.region.id, ArtifactSpec::marker(Point::ZERO))]
        }

        fn update_position(&mut self, ctx: &mut ObjectContext<'_>, frame: &MotionFrame<'_>) {
            let at = ctx.region.px_to_data(frame.pointer.position);
            for &artifact in ctx.artifacts {
                ctx.surface.set_artifact_points(artifact, vec![at]);
            }
        }

        fn press_info(&mut self, _ctx: &ObjectContext<'_>, pointer: &Pointer) -> PressInfo {
            PressInfo {
                click: pointer.position,
                anchors: Vec::new(),
                pressed: false,
            }
        }

        fn active_info(&mut self, _picked: &[ArtifactId], artifacts: &[ArtifactId]) -> ActiveInfo {
            ActiveInfo::new(artifacts.to_vec(), MotionMode::Follow)
        }

        fn capabilities(&self) -> &'static [EventKind] {
            &[EventKind::Move, EventKind::Release, EventKind::LeaveCanvas]
        }
    }

    fn board() -> Board<RecordingSurface> {
        let mut board = Board::default();
        board.add_canvas(RecordingSurface::new(CanvasId(0), Size::new(100.0, 100.0)));
        board
    }

    fn left(x: f64, y: f64) -> Pointer {
        Pointer::at(x, y).with_button(MouseButton::Left)
    }

    fn first_artifact(board: &Board<RecordingSurface>, id: ObjectId) -> ArtifactId {
        board.object(id).unwrap().artifacts[0]
    }

    fn grab(board: &mut Board<RecordingSurface>, id: ObjectId, x: f64, y: f64) {
        let artifact = first_artifact(board, id);
        board
            .dispatch(CanvasId(0), &CanvasEvent::Pick { artifact, pointer: left(x, y) })
            .unwrap();
        board
            .dispatch(CanvasId(0), &CanvasEvent::Press { pointer: left(x, y) })
            .unwrap();
    }

    #[test]
    fn test_spawn_registers_and_connects() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();

        assert!(board.is_connected(id));
        assert!(board.connection(id, EventKind::Press).is_some());
        assert_eq!(board.object(id).unwrap().artifacts.len(), 1);
        assert_eq!(board.surface(CanvasId(0)).unwrap().artifact_count(), 1);
    }

    #[test]
    fn test_spawn_on_unknown_canvas() {
        let mut board = board();
        let err = board
            .spawn(CanvasId(7), Dot::at(0.0, 0.0), SpawnOptions::new())
            .unwrap_err();
        assert_eq!(err, CoordinatorError::UnknownCanvas(CanvasId(7)));
        assert!(board.registry().is_empty());
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let before = board.connection(id, EventKind::Move);

        assert!(!board.connect(id).unwrap());
        assert_eq!(board.connection(id, EventKind::Move), before);
        assert!(board.disconnect(id).unwrap());
        assert!(!board.disconnect(id).unwrap());
    }

    #[test]
    fn test_drag_episode() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(10.0, 10.0), SpawnOptions::new()).unwrap();

        grab(&mut board, id, 10.0, 10.0);
        assert_eq!(board.leader(), Some(id));
        assert_eq!(board.phase(), MotionPhase::LeaderActive);

        board
            .dispatch(CanvasId(0), &CanvasEvent::Move { pointer: left(15.0, 12.0) })
            .unwrap();
        let artifact = first_artifact(&board, id);
        let surface = board.surface(CanvasId(0)).unwrap();
        assert_eq!(surface.artifact_points(artifact), Some(vec![Point::new(15.0, 12.0)]));
        assert!(surface.is_animated(artifact));

        board
            .dispatch(CanvasId(0), &CanvasEvent::Release { pointer: left(15.0, 12.0) })
            .unwrap();
        assert_eq!(board.phase(), MotionPhase::Idle);
        assert!(board.moving().is_empty());
        assert!(!board.surface(CanvasId(0)).unwrap().is_animated(artifact));
        let entry = board.object(id).unwrap();
        assert!(entry.picked.is_empty());
        assert_eq!(entry.press, PressInfo::default());
    }

    #[test]
    fn test_second_pick_follows() {
        let mut board = board();
        let a = board.spawn(CanvasId(0), Dot::at(10.0, 10.0), SpawnOptions::new()).unwrap();
        let b = board.spawn(CanvasId(0), Dot::at(10.0, 10.0), SpawnOptions::new()).unwrap();

        for id in [a, b] {
            let artifact = first_artifact(&board, id);
            board
                .dispatch(CanvasId(0), &CanvasEvent::Pick { artifact, pointer: left(10.0, 10.0) })
                .unwrap();
        }
        board
            .dispatch(CanvasId(0), &CanvasEvent::Press { pointer: left(10.0, 10.0) })
            .unwrap();

        assert_eq!(board.leader(), Some(a));
        assert_eq!(board.moving(), &[a, b]);
        assert!(!board.update_graph(b, &left(20.0, 20.0)).unwrap());
        assert!(board.update_graph(a, &left(20.0, 20.0)).unwrap());
        assert_eq!(board.frame_stats().frames, 1);
    }

    #[test]
    fn test_move_without_leader_is_noop() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        board.surface_mut(CanvasId(0)).unwrap().clear_calls();

        board
            .dispatch(CanvasId(0), &CanvasEvent::Move { pointer: Pointer::at(50.0, 50.0) })
            .unwrap();
        assert!(!board.update_graph(id, &Pointer::at(50.0, 50.0)).unwrap());
        assert!(board.surface(CanvasId(0)).unwrap().calls().is_empty());
    }

    #[test]
    fn test_tracker_free_follows_and_never_leads() {
        let mut board = board();
        let tracker = board.spawn(CanvasId(0), Tracker, SpawnOptions::new()).unwrap();

        board
            .dispatch(CanvasId(0), &CanvasEvent::Move { pointer: Pointer::at(30.0, 40.0) })
            .unwrap();
        assert_eq!(board.leader(), None);
        assert_eq!(board.moving(), &[tracker]);

        let artifact = first_artifact(&board, tracker);
        let surface = board.surface(CanvasId(0)).unwrap();
        assert_eq!(surface.artifact_points(artifact), Some(vec![Point::new(30.0, 40.0)]));
        assert_eq!(surface.blits(), 1);
    }

    #[test]
    fn test_leave_canvas_resets() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(10.0, 10.0), SpawnOptions::new()).unwrap();
        grab(&mut board, id, 10.0, 10.0);

        board.dispatch(CanvasId(0), &CanvasEvent::LeaveCanvas).unwrap();
        assert_eq!(board.phase(), MotionPhase::Idle);
        assert!(board.cache().background().is_none());
    }

    #[test]
    fn test_leave_canvas_keeps_episode_when_configured() {
        let config = BoardConfig {
            reset_on_leave: false,
            ..BoardConfig::default()
        };
        let mut board = Board::new(config);
        board.add_canvas(RecordingSurface::new(CanvasId(0), Size::new(100.0, 100.0)));
        let id = board.spawn(CanvasId(0), Dot::at(10.0, 10.0), SpawnOptions::new()).unwrap();
        grab(&mut board, id, 10.0, 10.0);

        board.dispatch(CanvasId(0), &CanvasEvent::LeaveCanvas).unwrap();
        assert_eq!(board.leader(), Some(id));
    }

    #[test]
    fn test_leaving_leader_region_resets() {
        let mut board: Board<RecordingSurface> = Board::default();
        board.add_canvas(RecordingSurface::with_columns(CanvasId(0), Size::new(200.0, 100.0), 2));
        let id = board
            .spawn(CanvasId(0), Dot::at(50.0, 50.0), SpawnOptions::new().in_region(RegionId(0)))
            .unwrap();
        grab(&mut board, id, 50.0, 50.0);

        let pointer = Pointer::at(150.0, 50.0);
        board
            .dispatch(CanvasId(0), &CanvasEvent::LeaveRegion { region: RegionId(1), pointer })
            .unwrap();
        assert_eq!(board.leader(), Some(id));

        board
            .dispatch(CanvasId(0), &CanvasEvent::LeaveRegion { region: RegionId(0), pointer })
            .unwrap();
        assert_eq!(board.leader(), None);
    }

    #[test]
    fn test_pick_with_delete_button_deletes() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let artifact = first_artifact(&board, id);

        let pointer = Pointer::at(1.0, 1.0).with_button(MouseButton::Right);
        board
            .dispatch(CanvasId(0), &CanvasEvent::Pick { artifact, pointer })
            .unwrap();

        assert!(board.registry().is_deleted(id));
        assert!(!board.is_connected(id));
        assert!(!board.surface(CanvasId(0)).unwrap().has_artifact(artifact));
    }

    #[test]
    fn test_pick_of_foreign_artifact_is_ignored() {
        let mut board = board();
        let a = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let b = board.spawn(CanvasId(0), Dot::at(2.0, 2.0), SpawnOptions::new()).unwrap();
        let artifact = first_artifact(&board, b);

        board
            .dispatch(CanvasId(0), &CanvasEvent::Pick { artifact, pointer: left(2.0, 2.0) })
            .unwrap();
        assert!(board.object(a).unwrap().picked.is_empty());
        assert_eq!(board.object(b).unwrap().picked, vec![artifact]);
    }

    #[test]
    fn test_erase_keeps_registration() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let artifact = first_artifact(&board, id);

        board.erase(id).unwrap();
        board.erase(id).unwrap();
        assert!(board.object(id).unwrap().state.is_erased());
        assert!(board.surface(CanvasId(0)).unwrap().has_artifact(artifact));
        assert!(!board.surface(CanvasId(0)).unwrap().is_visible(artifact));

        let participation = board.initiate_motion(id, &left(1.0, 1.0)).unwrap();
        assert_eq!(participation, Participation::Skipped);
        assert_eq!(board.leader(), None);

        board.recreate(id).unwrap();
        let fresh = first_artifact(&board, id);
        assert_ne!(fresh, artifact);
        assert!(!board.surface(CanvasId(0)).unwrap().has_artifact(artifact));
        assert!(board.surface(CanvasId(0)).unwrap().is_visible(fresh));
    }

    #[test]
    fn test_erasing_leader_resets() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(10.0, 10.0), SpawnOptions::new()).unwrap();
        grab(&mut board, id, 10.0, 10.0);

        board.erase(id).unwrap();
        assert_eq!(board.phase(), MotionPhase::Idle);
        assert!(board.moving().is_empty());
    }

    #[test]
    fn test_deleting_follower_keeps_leader() {
        let mut board = board();
        let leader = board.spawn(CanvasId(0), Dot::at(10.0, 10.0), SpawnOptions::new()).unwrap();
        let tracker = board.spawn(CanvasId(0), Tracker, SpawnOptions::new()).unwrap();
        grab(&mut board, leader, 10.0, 10.0);
        board
            .dispatch(CanvasId(0), &CanvasEvent::Move { pointer: left(11.0, 11.0) })
            .unwrap();
        assert_eq!(board.moving(), &[leader, tracker]);

        board.delete(tracker).unwrap();
        assert_eq!(board.leader(), Some(leader));
        assert_eq!(board.moving(), &[leader]);
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();

        board.delete(id).unwrap();
        board.delete(id).unwrap();
        assert_eq!(board.erase(id).unwrap_err(), CoordinatorError::UseAfterDelete(id));
        assert_eq!(board.describe(id).unwrap_err(), CoordinatorError::UseAfterDelete(id));

        let stranger = Uuid::new_v4();
        assert_eq!(board.delete(stranger).unwrap_err(), CoordinatorError::UnknownObject(stranger));
    }

    #[test]
    fn test_blocking_object_notifies_on_delete() {
        let mut board = board();
        let id = board
            .spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new().blocking())
            .unwrap();
        assert!(board.take_notices().is_empty());

        board.dispatch(CanvasId(0), &CanvasEvent::Close).unwrap();
        assert_eq!(board.take_notices(), vec![BoardNotice::StopEventLoop(id)]);
        assert!(board.take_notices().is_empty());
    }

    #[test]
    fn test_created_hook_commands_apply() {
        let mut board = board();
        let old = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let mut dot = Dot::at(2.0, 2.0);
        dot.on_created = vec![Command::DeleteOthers(OthersScope::SameKindOnCanvas)];
        let new = board.spawn(CanvasId(0), dot, SpawnOptions::new()).unwrap();

        assert!(board.registry().is_deleted(old));
        assert!(board.registry().contains(new));
    }

    #[test]
    fn test_key_hook_erases() {
        let mut board = board();
        let mut dot = Dot::at(1.0, 1.0);
        dot.on_key = vec![Command::Erase];
        let id = board.spawn(CanvasId(0), dot, SpawnOptions::new()).unwrap();

        let event = CanvasEvent::KeyPress {
            key: "e".to_string(),
            pointer: None,
        };
        board.dispatch(CanvasId(0), &event).unwrap();
        assert!(board.object(id).unwrap().state.is_erased());
    }

    #[test]
    fn test_redraw_command_forces_recapture() {
        let mut board = board();
        let mut dot = Dot::at(10.0, 10.0);
        dot.on_key = vec![Command::Redraw];
        let id = board.spawn(CanvasId(0), dot, SpawnOptions::new()).unwrap();
        grab(&mut board, id, 10.0, 10.0);
        board
            .dispatch(CanvasId(0), &CanvasEvent::Move { pointer: left(12.0, 10.0) })
            .unwrap();
        assert_eq!(board.surface(CanvasId(0)).unwrap().captures(), 1);
        board.surface_mut(CanvasId(0)).unwrap().clear_calls();

        let event = CanvasEvent::KeyPress {
            key: "r".to_string(),
            pointer: None,
        };
        board.dispatch(CanvasId(0), &event).unwrap();
        assert_eq!(board.surface(CanvasId(0)).unwrap().full_draws(), 1);
        assert!(board.cache().needs_refresh());

        board
            .dispatch(CanvasId(0), &CanvasEvent::Move { pointer: left(14.0, 10.0) })
            .unwrap();
        assert_eq!(board.surface(CanvasId(0)).unwrap().captures(), 1);
        assert_eq!(board.leader(), Some(id));
    }

    #[test]
    fn test_key_hook_gets_tracked_pointer() {
        let mut board = board();
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let key = |pointer: Option<Pointer>| CanvasEvent::KeyPress {
            key: "k".to_string(),
            pointer,
        };

        // Nothing tracked yet: the hook sees no pointer.
        board.dispatch(CanvasId(0), &key(None)).unwrap();
        assert_eq!(board.describe(id).unwrap(), "dot #1/1 on canvas 0");

        board
            .dispatch(CanvasId(0), &CanvasEvent::Move { pointer: Pointer::at(30.0, 40.0) })
            .unwrap();
        board.dispatch(CanvasId(0), &key(None)).unwrap();
        assert!(board.describe(id).unwrap().ends_with("(key at (30, 40))"));
        assert!(board.input(CanvasId(0)).unwrap().inside);

        board.dispatch(CanvasId(0), &key(Some(Pointer::at(5.0, 6.0)))).unwrap();
        assert!(board.describe(id).unwrap().ends_with("(key at (5, 6))"));

        board.dispatch(CanvasId(0), &CanvasEvent::LeaveCanvas).unwrap();
        board.dispatch(CanvasId(0), &key(None)).unwrap();
        assert_eq!(board.describe(id).unwrap(), "dot #1/1 on canvas 0");
    }

    #[test]
    fn test_clear_kind_and_all() {
        let mut board = board();
        board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        board.spawn(CanvasId(0), Dot::at(2.0, 2.0), SpawnOptions::new()).unwrap();
        let tracker = board.spawn(CanvasId(0), Tracker, SpawnOptions::new()).unwrap();

        assert_eq!(board.clear_kind(DOT).unwrap(), 2);
        let remaining: Vec<_> = board.enumerate(KindScope::All).map(|e| e.id).collect();
        assert_eq!(remaining, vec![tracker]);

        assert_eq!(board.clear_all().unwrap(), 1);
        assert!(board.registry().is_empty());
        assert_eq!(board.surface(CanvasId(0)).unwrap().artifact_count(), 0);
    }

    #[test]
    fn test_describe() {
        let mut board = board();
        board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let second = board.spawn(CanvasId(0), Dot::at(2.0, 2.0), SpawnOptions::new()).unwrap();
        assert_eq!(board.describe(second).unwrap(), "dot #2/2 on canvas 0");
    }

    #[test]
    fn test_spawn_blit_override() {
        let mut board = board();
        assert!(board.blit());
        board
            .spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new().with_blit(false))
            .unwrap();
        assert!(!board.blit());
        board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        assert!(!board.blit());
    }

    #[test]
    fn test_set_region_rebuilds_artifacts() {
        let mut board: Board<RecordingSurface> = Board::default();
        board.add_canvas(RecordingSurface::with_columns(CanvasId(0), Size::new(200.0, 100.0), 2));
        let id = board.spawn(CanvasId(0), Dot::at(1.0, 1.0), SpawnOptions::new()).unwrap();
        let before = first_artifact(&board, id);

        board.set_region(id, RegionId(1)).unwrap();
        assert_eq!(board.object(id).unwrap().region, RegionId(1));
        assert_ne!(first_artifact(&board, id), before);
    }

    #[test]
    fn test_unknown_canvas_dispatch() {
        let mut board = board();
        assert_eq!(
            board.dispatch(CanvasId(3), &CanvasEvent::EnterCanvas).unwrap_err(),
            CoordinatorError::UnknownCanvas(CanvasId(3))
        );
    }

    #[test]
    fn test_trackers_on_two_canvases_never_share_a_background() {
        let mut board = board();
        board.add_canvas(RecordingSurface::new(CanvasId(1), Size::new(100.0, 100.0)));
        board.spawn(CanvasId(0), Tracker, SpawnOptions::new()).unwrap();
        board.spawn(CanvasId(1), Tracker, SpawnOptions::new()).unwrap();
        let step = |board: &mut Board<RecordingSurface>, canvas: u32| {
            board
                .dispatch(CanvasId(canvas), &CanvasEvent::Move { pointer: Pointer::at(20.0, 20.0) })
                .unwrap();
        };

        step(&mut board, 0);
        step(&mut board, 1);
        board.surface_mut(CanvasId(0)).unwrap().clear_calls();
        step(&mut board, 0);

        let calls = board.surface(CanvasId(0)).unwrap().calls().to_vec();
        let token = calls
            .iter()
            .find_map(|call| match call {
                DrawCall::Capture { token, .. } => Some(*token),
                _ => None,
            })
            .unwrap();
        assert!(calls.contains(&DrawCall::Restore(token)));
        assert_eq!(board.cache().background().unwrap().canvas, CanvasId(0));
    }
}
