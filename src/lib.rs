//! GCPAT - Ground Control Point Annotation Tool
//!
//! Editing core for ground control points: pixel positions on photos
//! ("image points") linked to geographic positions ("map points"). Points and
//! links live in immutable [`ControlPointState`] snapshots, updated by feeding
//! [`Message`]s through [`reduce`] or a [`Store`].

pub mod config;
pub mod crs;
pub mod format;
pub mod message;
pub mod model;
pub mod reducer;
pub mod state;
pub mod store;
pub mod undo;

pub use config::{AppConfig, ConfigError};
pub use crs::{CrsError, ProjProjector, Projector};
pub use format::{FormatError, GcpList};
pub use message::{Message, SeedPoint};
pub use model::{ControlPoint, JoinGraph, PointId, PointKind, Status, ValidationThresholds};
pub use reducer::reduce;
pub use state::{ControlPointState, LoadedImage, Mode};
pub use store::Store;
