//! Per-object event bindings.

use crate::input::EventKind;
use crate::object::ObjectId;
use crate::surface::CanvasId;
use std::collections::{BTreeMap, HashMap};

/// Handle of one event binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

#[derive(Debug, Clone)]
struct Binding {
    canvas: CanvasId,
    connections: BTreeMap<EventKind, ConnectionId>,
    capabilities: Vec<EventKind>,
}

/// Bindings between objects and the raw events of their canvas.
///
/// Every connected object holds one connection per event kind; an event is
/// only delivered to objects whose capabilities include its kind.
#[derive(Debug, Default)]
pub struct Dispatcher {
    bindings: HashMap<ObjectId, Binding>,
    next_connection: u64,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every event kind of `canvas` to `id`.
    ///
    /// Returns false if the object was already connected, in which case
    /// nothing changes.
    pub fn connect(&mut self, id: ObjectId, canvas: CanvasId, capabilities: &[EventKind]) -> bool {
        if self.bindings.contains_key(&id) {
            return false;
        }
        let connections = EventKind::ALL
            .iter()
            .map(|&kind| {
                self.next_connection += 1;
                (kind, ConnectionId(self.next_connection))
            })
            .collect();
        self.bindings.insert(
            id,
            Binding {
                canvas,
                connections,
                capabilities: capabilities.to_vec(),
            },
        );
        log::debug!("Connected object {} on {}", id, canvas);
        true
    }

    /// Remove every binding of `id`. Returns false if it had none.
    pub fn disconnect(&mut self, id: ObjectId) -> bool {
        let removed = self.bindings.remove(&id).is_some();
        if removed {
            log::debug!("Disconnected object {}", id);
        }
        removed
    }

    pub fn is_connected(&self, id: ObjectId) -> bool {
        self.bindings.contains_key(&id)
    }

    /// The connection of `id` for one event kind.
    pub fn connection(&self, id: ObjectId, kind: EventKind) -> Option<ConnectionId> {
        self.bindings
            .get(&id)
            .and_then(|binding| binding.connections.get(&kind).copied())
    }

    /// All connections of `id`, ordered by event kind.
    pub fn connections(&self, id: ObjectId) -> Vec<ConnectionId> {
        self.bindings
            .get(&id)
            .map(|binding| binding.connections.values().copied().collect())
            .unwrap_or_default()
    }

    /// Objects that should receive an event of `kind` on `canvas`, keeping
    /// the order of `order`.
    pub fn targets(
        &self,
        canvas: CanvasId,
        kind: EventKind,
        order: impl IntoIterator<Item = ObjectId>,
    ) -> Vec<ObjectId> {
        order
            .into_iter()
            .filter(|id| {
                self.bindings.get(id).is_some_and(|binding| {
                    binding.canvas == canvas && binding.capabilities.contains(&kind)
                })
            })
            .collect()
    }

    /// Whether `id` still receives events of `kind`.
    pub fn accepts(&self, id: ObjectId, kind: EventKind) -> bool {
        self.bindings
            .get(&id)
            .is_some_and(|binding| binding.capabilities.contains(&kind))
    }

    /// Number of connected objects.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
