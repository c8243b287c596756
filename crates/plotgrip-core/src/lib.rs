//! Plotgrip Core Library
//!
//! Coordination layer for draggable objects on plotting canvases: leader
//! election for motion episodes, a blitting background cache and the
//! lifecycle of a polymorphic collection of interactive objects.

pub mod artifact;
pub mod board;
pub mod cache;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod motion;
pub mod object;
pub mod palette;
pub mod region;
pub mod registry;
pub mod surface;

pub use artifact::{ArtifactId, ArtifactKind, ArtifactSpec, LineStyle};
pub use board::{Board, BoardNotice};
pub use cache::{FrameStats, RenderCache};
pub use config::BoardConfig;
pub use dispatch::{ConnectionId, Dispatcher};
pub use error::{CoordinatorError, CoordinatorResult};
pub use input::{CanvasEvent, EventKind, InputState, Modifiers, MouseButton, Pointer};
pub use lifecycle::{ObjectState, SpawnOptions};
pub use motion::{MotionCoordinator, MotionPhase, Participation};
pub use object::{
    ActiveInfo, Command, InteractiveObject, MotionFrame, MotionMode, MotionRole, ObjectContext,
    ObjectId, ObjectKind, PressInfo,
};
pub use palette::{ColorRgba, Palette};
pub use region::{Region, RegionId};
pub use registry::{KindScope, ObjectEntry, OthersScope, Registry};
pub use surface::{Background, CanvasId, DrawCall, RecordingSurface, Surface};
