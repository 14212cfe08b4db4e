//! Intent messages for GCPAT.
//!
//! All UI events that touch control points are represented as messages in the
//! Elm architecture style and handled by [`crate::reducer::reduce`].

use serde::{Deserialize, Serialize};

use crate::model::{PointId, PointKind};
use crate::state::LoadedImage;

/// Seed positions for creating a linked image/map pair in one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeedPoint {
    /// `[x, y]` in image pixels
    pub image: [f64; 2],
    /// `[lat, lng]` in WGS84
    pub map: [f64; 2],
}

/// Messages that can be sent to update control point state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Create a point. `name` is the image name for image points, the
    /// optional label for map points.
    AddControlPoint {
        kind: PointKind,
        coord: [f64; 2],
        name: Option<String>,
    },
    /// Delete a point and its links
    DeleteControlPoint { id: PointId },
    /// Move a point; `locator` says which side the drag happened on
    SetControlPointPosition {
        locator: PointKind,
        id: PointId,
        pos: [f64; 2],
    },
    /// Select/deselect a point, or create a linked pair from `seed`
    ToggleControlPointMode {
        image_index: Option<usize>,
        image_name: Option<String>,
        point_id: Option<PointId>,
        seed: Option<SeedPoint>,
    },
    /// Link the selected point with `id`
    JoinControlPoint { id: PointId },
    /// Highlight the points linked to `id`
    HighlightControlPoint { id: Option<PointId> },
    /// Arm point creation
    AwaitControlPoint,
    /// Image list changed
    SyncImagesToPoints { images: Vec<LoadedImage> },
    /// Import GCP rows against the image list
    SyncListToImages {
        images: Vec<LoadedImage>,
        rows: Vec<Vec<String>>,
        source_projection: Option<String>,
    },
    /// An image was unloaded
    OnDeleteImage { image_name: String },
}

impl Message {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Message::AddControlPoint { .. } => "AddControlPoint",
            Message::DeleteControlPoint { .. } => "DeleteControlPoint",
            Message::SetControlPointPosition { .. } => "SetControlPointPosition",
            Message::ToggleControlPointMode { .. } => "ToggleControlPointMode",
            Message::JoinControlPoint { .. } => "JoinControlPoint",
            Message::HighlightControlPoint { .. } => "HighlightControlPoint",
            Message::AwaitControlPoint => "AwaitControlPoint",
            Message::SyncImagesToPoints { .. } => "SyncImagesToPoints",
            Message::SyncListToImages { .. } => "SyncListToImages",
            Message::OnDeleteImage { .. } => "OnDeleteImage",
        }
    }
}
