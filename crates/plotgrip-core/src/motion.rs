//! Leader election and the moving set.
//!
//! At most one object leads a motion episode. The leader is the only
//! object allowed to drive redraws; every other moving object is a follower
//! whose artifacts are repositioned in the leader's frames.

use crate::error::{CoordinatorError, CoordinatorResult};
use crate::object::ObjectId;

/// Coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPhase {
    #[default]
    Idle,
    LeaderActive,
}

/// How an object took part in motion after `initiate_motion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participation {
    Leader,
    Follower,
    /// The object could not move (e.g. it is erased).
    Skipped,
}

/// The leader slot and the ordered, duplicate-free moving set.
#[derive(Debug, Clone, Default)]
pub struct MotionCoordinator {
    leader: Option<ObjectId>,
    moving: Vec<ObjectId>,
}

impl MotionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MotionPhase {
        if self.leader.is_some() {
            MotionPhase::LeaderActive
        } else {
            MotionPhase::Idle
        }
    }

    pub fn is_idle(&self) -> bool {
        self.leader.is_none()
    }

    pub fn leader(&self) -> Option<ObjectId> {
        self.leader
    }

    pub fn is_leader(&self, id: ObjectId) -> bool {
        self.leader == Some(id)
    }

    /// Moving objects in the order they joined.
    pub fn moving(&self) -> &[ObjectId] {
        &self.moving
    }

    pub fn is_moving(&self, id: ObjectId) -> bool {
        self.moving.contains(&id)
    }

    /// Claim the leader slot.
    pub fn assign_leader(&mut self, candidate: ObjectId) -> CoordinatorResult<()> {
        match self.leader {
            Some(leader) if leader != candidate => {
                log::error!("Object {} tried to lead while {} is leader", candidate, leader);
                Err(CoordinatorError::LeaderConflict { leader, candidate })
            }
            _ => {
                self.leader = Some(candidate);
                self.join(candidate);
                Ok(())
            }
        }
    }

    /// Add an object to the moving set. Returns false if it was already there.
    pub fn join(&mut self, id: ObjectId) -> bool {
        if self.moving.contains(&id) {
            return false;
        }
        self.moving.push(id);
        true
    }

    /// Elect `candidate` if no one leads, otherwise make it a follower.
    /// Always-moving objects never lead.
    pub fn elect(&mut self, candidate: ObjectId, always_moving: bool) -> CoordinatorResult<Participation> {
        if always_moving || self.leader.is_some() {
            self.join(candidate);
            return Ok(Participation::Follower);
        }
        self.assign_leader(candidate)?;
        Ok(Participation::Leader)
    }

    /// Take an object out of motion. Returns true if it was the leader.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        self.moving.retain(|&other| other != id);
        if self.leader == Some(id) {
            self.leader = None;
            return true;
        }
        false
    }

    /// End the episode, returning the objects that were moving.
    pub fn reset(&mut self) -> Vec<ObjectId> {
        self.leader = None;
        std::mem::take(&mut self.moving)
    }
}
