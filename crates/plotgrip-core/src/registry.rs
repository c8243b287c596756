//! Ordered registry of every live interactive object.

use crate::artifact::ArtifactId;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::lifecycle::ObjectState;
use crate::object::{ActiveInfo, InteractiveObject, ObjectId, ObjectKind, PressInfo};
use crate::region::RegionId;
use crate::surface::CanvasId;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Which kinds an enumeration covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindScope {
    Kind(ObjectKind),
    All,
}

impl KindScope {
    fn matches(self, kind: ObjectKind) -> bool {
        match self {
            KindScope::Kind(k) => k == kind,
            KindScope::All => true,
        }
    }
}

/// Which other objects of the same kind `delete_others` removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OthersScope {
    #[default]
    SameKindAnywhere,
    SameKindOnCanvas,
    SameKindInRegion,
}

/// A registered object together with the state the coordinator keeps for it.
pub struct ObjectEntry {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub canvas: CanvasId,
    pub region: RegionId,
    pub state: ObjectState,
    /// Artifacts owned by the object, in creation order.
    pub artifacts: Vec<ArtifactId>,
    /// Artifacts picked since the last motion reset.
    pub picked: Vec<ArtifactId>,
    pub press: PressInfo,
    pub active: ActiveInfo,
    /// Whether the object is in the moving set.
    pub moving: bool,
    /// Whether deleting the object should stop the host's event loop.
    pub block: bool,
    pub object: Box<dyn InteractiveObject>,
}

impl ObjectEntry {
    /// Create an entry with empty coordinator state.
    pub fn new(
        id: ObjectId,
        canvas: CanvasId,
        region: RegionId,
        object: Box<dyn InteractiveObject>,
    ) -> Self {
        Self {
            id,
            kind: object.kind(),
            canvas,
            region,
            state: ObjectState::Created,
            artifacts: Vec::new(),
            picked: Vec::new(),
            press: PressInfo::default(),
            active: ActiveInfo::default(),
            moving: false,
            block: false,
            object,
        }
    }

    /// Forget the transient state of a motion episode.
    pub fn clear_motion_state(&mut self) {
        self.picked.clear();
        self.press = PressInfo::default();
        self.active = ActiveInfo::default();
        self.moving = false;
    }

    /// Record a picked artifact. Returns false if it is not one of ours.
    pub fn pick(&mut self, artifact: ArtifactId) -> bool {
        if !self.artifacts.contains(&artifact) {
            return false;
        }
        if !self.picked.contains(&artifact) {
            self.picked.push(artifact);
        }
        true
    }
}

impl fmt::Debug for ObjectEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectEntry")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("canvas", &self.canvas)
            .field("region", &self.region)
            .field("state", &self.state)
            .field("artifacts", &self.artifacts)
            .field("picked", &self.picked)
            .field("moving", &self.moving)
            .finish_non_exhaustive()
    }
}

/// Every live object, in registration order.
///
/// Membership is independent of visibility: erased objects stay registered.
/// Deleted ids are remembered so that late uses can be told apart from ids
/// that never existed.
#[derive(Debug, Default)]
pub struct Registry {
    entries: HashMap<ObjectId, ObjectEntry>,
    order: Vec<ObjectId>,
    deleted: HashSet<ObjectId>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an object.
    pub fn register(&mut self, entry: ObjectEntry) -> CoordinatorResult<()> {
        let id = entry.id;
        if self.entries.contains_key(&id) || self.deleted.contains(&id) {
            log::error!("Object {} registered twice", id);
            return Err(CoordinatorError::DuplicateRegistration(id));
        }
        self.order.push(id);
        self.entries.insert(id, entry);
        Ok(())
    }

    /// Remove an object and tombstone its id.
    ///
    /// Returns `None` if the object was already deleted.
    pub fn remove(&mut self, id: ObjectId) -> CoordinatorResult<Option<ObjectEntry>> {
        if self.deleted.contains(&id) {
            return Ok(None);
        }
        let entry = self
            .entries
            .remove(&id)
            .ok_or(CoordinatorError::UnknownObject(id))?;
        self.order.retain(|&other| other != id);
        self.deleted.insert(id);
        Ok(Some(entry))
    }

    /// Get an object.
    pub fn get(&self, id: ObjectId) -> CoordinatorResult<&ObjectEntry> {
        match self.entries.get(&id) {
            Some(entry) => Ok(entry),
            None => Err(self.missing(id)),
        }
    }

    /// Get a mutable reference to an object.
    pub fn get_mut(&mut self, id: ObjectId) -> CoordinatorResult<&mut ObjectEntry> {
        let missing = self.missing(id);
        self.entries.get_mut(&id).ok_or(missing)
    }

    fn missing(&self, id: ObjectId) -> CoordinatorError {
        if self.deleted.contains(&id) {
            CoordinatorError::UseAfterDelete(id)
        } else {
            CoordinatorError::UnknownObject(id)
        }
    }

    /// Check if an object is registered.
    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Check if an object has been deleted.
    pub fn is_deleted(&self, id: ObjectId) -> bool {
        self.deleted.contains(&id)
    }

    /// Objects in registration order, restricted to `scope`.
    ///
    /// The returned iterator is lazy and can be cloned to restart it.
    pub fn enumerate(
        &self,
        scope: KindScope,
    ) -> impl Iterator<Item = &ObjectEntry> + Clone + '_ {
        self.order
            .iter()
            .filter_map(move |id| self.entries.get(id))
            .filter(move |entry| scope.matches(entry.kind))
    }

    /// Objects on a canvas, in registration order.
    pub fn on_canvas(&self, canvas: CanvasId) -> impl Iterator<Item = &ObjectEntry> + Clone + '_ {
        self.enumerate(KindScope::All)
            .filter(move |entry| entry.canvas == canvas)
    }

    /// Objects in a region of a canvas, in registration order.
    pub fn in_region(
        &self,
        canvas: CanvasId,
        region: RegionId,
    ) -> impl Iterator<Item = &ObjectEntry> + Clone + '_ {
        self.on_canvas(canvas)
            .filter(move |entry| entry.region == region)
    }

    /// Mutable access to every object, in no particular order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ObjectEntry> {
        self.entries.values_mut()
    }

    /// Ids of every registered object, in registration order.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.order.clone()
    }

    /// Ids of the other objects of `id`'s kind that fall within `scope`.
    pub fn others(&self, id: ObjectId, scope: OthersScope) -> CoordinatorResult<Vec<ObjectId>> {
        let me = self.get(id)?;
        let (kind, canvas, region) = (me.kind, me.canvas, me.region);
        Ok(self
            .enumerate(KindScope::Kind(kind))
            .filter(|entry| entry.id != id)
            .filter(|entry| match scope {
                OthersScope::SameKindAnywhere => true,
                OthersScope::SameKindOnCanvas => entry.canvas == canvas,
                OthersScope::SameKindInRegion => entry.canvas == canvas && entry.region == region,
            })
            .map(|entry| entry.id)
            .collect())
    }

    /// Position of an object among the objects of its kind on its canvas,
    /// as `(1-based index, count)`.
    pub fn rank(&self, id: ObjectId) -> CoordinatorResult<(usize, usize)> {
        let me = self.get(id)?;
        let peers: Vec<ObjectId> = self
            .enumerate(KindScope::Kind(me.kind))
            .filter(|entry| entry.canvas == me.canvas)
            .map(|entry| entry.id)
            .collect();
        let index = peers.iter().position(|&p| p == id).unwrap_or(0);
        Ok((index + 1, peers.len()))
    }

    /// Number of registered objects.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if no object is registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
