//! Object lifecycle states and construction options.

use crate::region::RegionId;

/// The lifecycle state of a registered object.
///
/// Deleted objects are not registered anymore, so there is no variant for
/// them: the registry tombstones their ids instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectState {
    /// Artifacts exist and are shown.
    #[default]
    Created,
    /// Artifacts exist but are hidden; the object keeps its logical state.
    Erased,
}

impl ObjectState {
    /// Check if the object's artifacts are shown.
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Created)
    }

    /// Check if the object is erased.
    pub fn is_erased(&self) -> bool {
        matches!(self, Self::Erased)
    }
}

/// Options for constructing an object on a board.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnOptions {
    /// Region to create the object in (defaults to region 0).
    pub region: Option<RegionId>,
    /// Overrides the board-wide blitting mode. The most recently spawned
    /// object that sets this wins.
    pub blit: Option<bool>,
    /// Ask the host to stop its blocking event loop when the object is
    /// deleted.
    pub block: bool,
}

impl SpawnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_region(mut self, region: RegionId) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_blit(mut self, blit: bool) -> Self {
        self.blit = Some(blit);
        self
    }

    pub fn blocking(mut self) -> Self {
        self.block = true;
        self
    }
}
