//! Raw canvas events and per-canvas input tracking.

use crate::artifact::ArtifactId;
use crate::region::RegionId;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer data attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    /// Position in canvas pixels.
    pub position: Point,
    /// Region under the pointer, if any.
    #[serde(default)]
    pub region: Option<RegionId>,
    /// Button involved (press/release/pick only).
    #[serde(default)]
    pub button: Option<MouseButton>,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl Pointer {
    /// Pointer at a position, outside any region.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            region: None,
            button: None,
            modifiers: Modifiers::default(),
        }
    }

    /// Set the region under the pointer.
    pub fn in_region(mut self, region: RegionId) -> Self {
        self.region = Some(region);
        self
    }

    /// Set the button involved.
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = Some(button);
        self
    }

    /// Set the modifier keys.
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Raw event emitted by a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    Press { pointer: Pointer },
    Release { pointer: Pointer },
    Move { pointer: Pointer },
    /// An artifact was hit by a press. Hosts emit picks before the press
    /// they belong to.
    Pick { artifact: ArtifactId, pointer: Pointer },
    KeyPress { key: String, pointer: Option<Pointer> },
    KeyRelease { key: String, pointer: Option<Pointer> },
    EnterCanvas,
    LeaveCanvas,
    EnterRegion { region: RegionId, pointer: Pointer },
    LeaveRegion { region: RegionId, pointer: Pointer },
    Resize { size: Size },
    Close,
}

/// Event type, used for handler bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    Press,
    Release,
    Move,
    Pick,
    KeyPress,
    KeyRelease,
    EnterCanvas,
    LeaveCanvas,
    EnterRegion,
    LeaveRegion,
    Resize,
    Close,
}

impl EventKind {
    /// Every event kind, in binding order.
    pub const ALL: [EventKind; 12] = [
        EventKind::Press,
        EventKind::Release,
        EventKind::Pick,
        EventKind::Move,
        EventKind::KeyPress,
        EventKind::KeyRelease,
        EventKind::EnterCanvas,
        EventKind::LeaveCanvas,
        EventKind::EnterRegion,
        EventKind::LeaveRegion,
        EventKind::Close,
        EventKind::Resize,
    ];
}

impl CanvasEvent {
    /// The binding kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            CanvasEvent::Press { .. } => EventKind::Press,
            CanvasEvent::Release { .. } => EventKind::Release,
            CanvasEvent::Move { .. } => EventKind::Move,
            CanvasEvent::Pick { .. } => EventKind::Pick,
            CanvasEvent::KeyPress { .. } => EventKind::KeyPress,
            CanvasEvent::KeyRelease { .. } => EventKind::KeyRelease,
            CanvasEvent::EnterCanvas => EventKind::EnterCanvas,
            CanvasEvent::LeaveCanvas => EventKind::LeaveCanvas,
            CanvasEvent::EnterRegion { .. } => EventKind::EnterRegion,
            CanvasEvent::LeaveRegion { .. } => EventKind::LeaveRegion,
            CanvasEvent::Resize { .. } => EventKind::Resize,
            CanvasEvent::Close => EventKind::Close,
        }
    }

    /// Pointer data carried by the event, if any.
    pub fn pointer(&self) -> Option<&Pointer> {
        match self {
            CanvasEvent::Press { pointer }
            | CanvasEvent::Release { pointer }
            | CanvasEvent::Move { pointer }
            | CanvasEvent::Pick { pointer, .. }
            | CanvasEvent::EnterRegion { pointer, .. }
            | CanvasEvent::LeaveRegion { pointer, .. } => Some(pointer),
            CanvasEvent::KeyPress { pointer, .. } | CanvasEvent::KeyRelease { pointer, .. } => {
                pointer.as_ref()
            }
            CanvasEvent::EnterCanvas
            | CanvasEvent::LeaveCanvas
            | CanvasEvent::Resize { .. }
            | CanvasEvent::Close => None,
        }
    }
}

/// Tracks the pointer state of one canvas across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position in canvas pixels.
    pub pointer_position: Point,
    /// Region the pointer is currently in.
    pub region: Option<RegionId>,
    /// Whether the pointer is over the canvas.
    pub inside: bool,
    /// Modifier keys of the last pointer event.
    pub modifiers: Modifiers,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state from an event.
    pub fn handle_event(&mut self, event: &CanvasEvent) {
        if let Some(pointer) = event.pointer() {
            self.pointer_position = pointer.position;
            self.modifiers = pointer.modifiers;
        }
        match event {
            CanvasEvent::Press { pointer } | CanvasEvent::Move { pointer } => {
                self.inside = true;
                self.region = pointer.region;
            }
            CanvasEvent::EnterCanvas => self.inside = true,
            CanvasEvent::LeaveCanvas | CanvasEvent::Close => {
                self.inside = false;
                self.region = None;
            }
            CanvasEvent::EnterRegion { region, .. } => {
                self.inside = true;
                self.region = Some(*region);
            }
            CanvasEvent::LeaveRegion { region, .. } => {
                if self.region == Some(*region) {
                    self.region = None;
                }
            }
            CanvasEvent::Release { .. }
            | CanvasEvent::Pick { .. }
            | CanvasEvent::KeyPress { .. }
            | CanvasEvent::KeyRelease { .. }
            | CanvasEvent::Resize { .. } => {}
        }
    }

    /// The pointer as last seen, or `None` when it is off the canvas.
    ///
    /// Key events carry no position on most backends; the board hands this
    /// to key hooks instead.
    pub fn pointer(&self) -> Option<Pointer> {
        self.inside.then_some(Pointer {
            position: self.pointer_position,
            region: self.region,
            button: None,
            modifiers: self.modifiers,
        })
    }
}
