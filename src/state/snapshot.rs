//! Control point state snapshot and the point store operations on it.
//!
//! Every operation borrows the current snapshot and returns the next one.
//! Operations that find nothing to do return a snapshot equal to the input.

use serde::{Deserialize, Serialize};

use super::images::{LoadedImage, has_image};
use super::mode::Mode;
use crate::model::{
    ControlPoint, JoinGraph, PointId, PointKind, Status, ValidationThresholds, validate,
};

/// Everything the renderer needs to draw control points, plus the id counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPointState {
    /// All points, in creation order
    pub points: Vec<ControlPoint>,
    /// Map point -> image point links
    pub joins: JoinGraph,
    /// Selection and edit mode
    pub mode: Mode,
    /// Points linked to the hovered point
    #[serde(default)]
    pub highlighted: Vec<PointId>,
    /// Readiness, recomputed after every structural change
    pub status: Status,
    /// Next id to mint
    next_id: u64,
    #[serde(skip)]
    thresholds: ValidationThresholds,
}

impl Default for ControlPointState {
    fn default() -> Self {
        Self::new(ValidationThresholds::default())
    }
}

impl ControlPointState {
    /// Create an empty state validated against `thresholds`.
    pub fn new(thresholds: ValidationThresholds) -> Self {
        Self {
            points: Vec::new(),
            joins: JoinGraph::new(),
            mode: Mode::Idle,
            highlighted: Vec::new(),
            status: Status::NoPoints,
            next_id: 1,
            thresholds,
        }
    }

    pub fn thresholds(&self) -> &ValidationThresholds {
        &self.thresholds
    }

    /// Return a copy validated against new thresholds.
    pub fn with_thresholds(&self, thresholds: ValidationThresholds) -> Self {
        let mut next = self.clone();
        next.thresholds = thresholds;
        next.revalidate();
        next
    }

    /// The selected point id, if any.
    pub fn selected(&self) -> Option<PointId> {
        self.mode.selected()
    }

    /// Look up a point by id.
    pub fn point(&self, id: PointId) -> Option<&ControlPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    /// Image points on `image_name`.
    pub fn points_for_image<'a>(
        &'a self,
        image_name: &'a str,
    ) -> impl Iterator<Item = &'a ControlPoint> + 'a {
        self.points
            .iter()
            .filter(move |p| p.image_name() == Some(image_name))
    }

    /// Points that take part in no link.
    pub fn unmatched_points(&self) -> Vec<&ControlPoint> {
        self.points
            .iter()
            .filter(|p| !self.joins.references(p.id))
            .collect()
    }

    /// Serialize the snapshot to JSON for the rendering layer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub(crate) fn mint_id(&mut self) -> PointId {
        let id = PointId(self.next_id);
        self.next_id += 1;
        id
    }

    pub(crate) fn revalidate(&mut self) {
        self.status = validate(&self.points, &self.joins, &self.thresholds);
    }

    /// Create a point, select it and enter the edit mode for its kind.
    ///
    /// `name` is the owning image name for image points (required) and the
    /// optional label for map points. New image points are assumed to sit on
    /// a loaded image since they come from a click on it.
    pub fn add_point(&self, kind: PointKind, coord: [f64; 2], name: Option<&str>) -> Self {
        let mut next = self.clone();
        let id = next.mint_id();
        let point = match kind {
            PointKind::Image => {
                name.and_then(|image_name| ControlPoint::image(id, coord, image_name, true))
            }
            PointKind::Map => ControlPoint::map(id, coord, name.map(str::to_string)),
        };

        let Some(point) = point else {
            log::debug!("Ignoring {} point with missing or invalid fields", kind.name());
            return self.clone();
        };

        log::debug!("Added {} point {} at {:?}", kind.name(), point.id, coord);
        next.mode = Mode::editing(&point);
        next.points.push(point);
        next.revalidate();
        next
    }

    /// Move a point. `kind` must match the point's kind.
    pub fn set_position(&self, id: PointId, kind: PointKind, coord: [f64; 2]) -> Self {
        if !coord.iter().all(|c| c.is_finite()) {
            return self.clone();
        }
        match self.point(id) {
            Some(point) if point.kind() == kind => {
                let mut next = self.clone();
                next.points = self
                    .points
                    .iter()
                    .map(|p| if p.id == id { p.with_coord(coord) } else { p.clone() })
                    .collect();
                next
            }
            Some(_) => {
                log::debug!("Position update for {} names the wrong side", id);
                self.clone()
            }
            None => self.clone(),
        }
    }

    /// Remove a point and every link that references it.
    ///
    /// Clears the selection even when another point was selected.
    pub fn delete_point(&self, id: PointId) -> Self {
        let Some(point) = self.point(id) else {
            log::debug!("Delete ignored, no point {}", id);
            return self.clone();
        };

        let mut next = self.clone();
        next.joins = self.joins.without_point(point).into_owned();
        next.points.retain(|p| p.id != id);
        next.highlighted.retain(|h| *h != id);
        next.mode = Mode::Idle;
        next.revalidate();
        log::debug!("Deleted {} point {}", point.kind().name(), id);
        next
    }

    /// Remove every image point on `image_name`, with their links.
    pub fn delete_all_for_image(&self, image_name: &str) -> Self {
        let removed: Vec<PointId> = self.points_for_image(image_name).map(|p| p.id).collect();
        if removed.is_empty() {
            return self.clone();
        }

        let mut next = self.clone();
        next.joins = self
            .joins
            .retain_live(|id, _| !removed.contains(&id))
            .into_owned();
        next.points.retain(|p| !removed.contains(&p.id));
        next.highlighted.retain(|h| !removed.contains(h));
        next.mode = Mode::Idle;
        next.revalidate();
        log::info!("Removed {} points of unloaded image {}", removed.len(), image_name);
        next
    }

    /// Select `id` or deselect it if already selected.
    pub fn toggle_mode(&self, id: PointId) -> Self {
        let mut next = self.clone();
        next.mode = self.mode.toggle(id, &self.points);
        next
    }

    /// Arm point creation and clear the selection.
    pub fn await_point(&self) -> Self {
        if self.mode.is_adding() {
            return self.clone();
        }
        let mut next = self.clone();
        next.mode = self.mode.await_point();
        next
    }

    /// Link the selected point with `id`, or unlink them if already linked.
    /// Returns to idle on success.
    pub fn join(&self, id: PointId) -> Self {
        let Some((image_id, map_id)) = self.mode.join_pair(id, &self.points) else {
            log::debug!("Join with {} ignored in {} mode", id, self.mode.name());
            return self.clone();
        };

        let mut next = self.clone();
        next.joins = self.joins.toggle(image_id, map_id);
        next.mode = Mode::Idle;
        next.revalidate();
        next
    }

    /// Highlight the points linked to `id`, or clear highlighting.
    pub fn highlight(&self, id: Option<PointId>) -> Self {
        let mut next = self.clone();
        next.highlighted = id.map(|id| self.joins.neighbors(id)).unwrap_or_default();
        next
    }

    /// Re-stamp `has_image` on every image point from the image list.
    pub fn sync_images(&self, images: &[LoadedImage]) -> Self {
        if images.is_empty() || self.points.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        next.points = self
            .points
            .iter()
            .map(|p| match p.image_name() {
                Some(name) => p.with_has_image(has_image(images, name)),
                None => p.clone(),
            })
            .collect();
        next
    }
}
