//! Data models for GCPAT: control points, the join graph and readiness status.

mod joins;
mod point;
mod status;

pub use joins::JoinGraph;
pub use point::{ControlPoint, Location, PointId, PointKind};
pub use status::{
    DEFAULT_MIN_JOINED_MAP_POINTS, DEFAULT_MIN_JOINED_PAIRS, Status, ValidationThresholds,
    validate,
};
