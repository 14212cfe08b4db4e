//! Control point types and data structures.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a control point.
///
/// Identifiers are minted from a monotonically increasing counter, so
/// ordering by id is ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(pub u64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cp-{}", self.0)
    }
}

/// Which side of a correspondence a point lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// Pixel location inside a loaded image
    Image,
    /// Geographic location on the reference map
    Map,
}

impl PointKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            PointKind::Image => "Image",
            PointKind::Map => "Map",
        }
    }
}

/// Position and side-specific metadata of a control point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Location {
    /// Image-space point, in pixel offsets.
    Image {
        x: f64,
        y: f64,
        /// Name of the owning image. Names survive an image being reloaded, ids do not.
        image_name: String,
        /// Whether an image with `image_name` is currently loaded.
        has_image: bool,
    },
    /// Map-space point, always WGS84.
    Map {
        lat: f64,
        lng: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },
}

/// A single ground control point, on either side of a correspondence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    /// Unique identifier.
    pub id: PointId,
    /// Position and metadata.
    pub location: Location,
}

impl ControlPoint {
    /// Create an image point. Returns None if the coordinate is not finite or
    /// the image name is empty.
    pub fn image(id: PointId, coord: [f64; 2], image_name: &str, has_image: bool) -> Option<Self> {
        if !coord.iter().all(|c| c.is_finite()) || image_name.is_empty() {
            return None;
        }
        Some(Self {
            id,
            location: Location::Image {
                x: coord[0],
                y: coord[1],
                image_name: image_name.to_string(),
                has_image,
            },
        })
    }

    /// Create a map point from a `[lat, lng]` pair already in WGS84.
    pub fn map(id: PointId, coord: [f64; 2], label: Option<String>) -> Option<Self> {
        if !coord.iter().all(|c| c.is_finite()) {
            return None;
        }
        Some(Self {
            id,
            location: Location::Map {
                lat: coord[0],
                lng: coord[1],
                label: label.filter(|l| !l.is_empty()),
            },
        })
    }

    pub fn kind(&self) -> PointKind {
        match self.location {
            Location::Image { .. } => PointKind::Image,
            Location::Map { .. } => PointKind::Map,
        }
    }

    /// The coordinate pair: `[x, y]` for image points, `[lat, lng]` for map points.
    pub fn coord(&self) -> [f64; 2] {
        match self.location {
            Location::Image { x, y, .. } => [x, y],
            Location::Map { lat, lng, .. } => [lat, lng],
        }
    }

    /// Owning image name (image points only).
    pub fn image_name(&self) -> Option<&str> {
        match &self.location {
            Location::Image { image_name, .. } => Some(image_name),
            Location::Map { .. } => None,
        }
    }

    /// Optional label (map points only).
    pub fn label(&self) -> Option<&str> {
        match &self.location {
            Location::Map { label, .. } => label.as_deref(),
            Location::Image { .. } => None,
        }
    }

    /// Whether the owning image is loaded. Always false for map points.
    pub fn has_image(&self) -> bool {
        matches!(self.location, Location::Image { has_image: true, .. })
    }

    /// Return a copy moved to `coord`, keeping the kind-specific metadata.
    pub fn with_coord(&self, coord: [f64; 2]) -> Self {
        let location = match &self.location {
            Location::Image {
                image_name,
                has_image,
                ..
            } => Location::Image {
                x: coord[0],
                y: coord[1],
                image_name: image_name.clone(),
                has_image: *has_image,
            },
            Location::Map { label, .. } => Location::Map {
                lat: coord[0],
                lng: coord[1],
                label: label.clone(),
            },
        };
        Self {
            id: self.id,
            location,
        }
    }

    /// Return a copy with `has_image` set. Map points are returned unchanged.
    pub fn with_has_image(&self, loaded: bool) -> Self {
        match &self.location {
            Location::Image {
                x, y, image_name, ..
            } => Self {
                id: self.id,
                location: Location::Image {
                    x: *x,
                    y: *y,
                    image_name: image_name.clone(),
                    has_image: loaded,
                },
            },
            Location::Map { .. } => self.clone(),
        }
    }
}
