//! Error types for the coordination core.

use crate::object::ObjectId;
use crate::region::RegionId;
use crate::surface::CanvasId;
use kurbo::Size;
use thiserror::Error;

/// Coordinator errors.
///
/// Everything except [`CoordinatorError::StaleCache`] is a programmer error:
/// callers are expected to surface it loudly rather than carry on.
#[derive(Debug, Error, PartialEq)]
pub enum CoordinatorError {
    #[error("Object {0} is already registered")]
    DuplicateRegistration(ObjectId),
    #[error("Object {0} has been deleted")]
    UseAfterDelete(ObjectId),
    #[error("Unknown object: {0}")]
    UnknownObject(ObjectId),
    #[error("Unknown canvas: {0}")]
    UnknownCanvas(CanvasId),
    #[error("Object {candidate} cannot lead: {leader} is already leading the motion")]
    LeaderConflict {
        leader: ObjectId,
        candidate: ObjectId,
    },
    #[error(
        "Background captured on {captured_canvas} at {captured:?} on {captured_region} but drawing {current_canvas} at {current:?} on {current_region}"
    )]
    StaleCache {
        captured_canvas: CanvasId,
        current_canvas: CanvasId,
        captured: Size,
        current: Size,
        captured_region: RegionId,
        current_region: RegionId,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for coordinator operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
