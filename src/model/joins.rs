//! Bipartite join graph between map points and image points.
//!
//! The graph is a persistent value: every operation takes `&self` and hands
//! back a new graph, so a snapshot held by the undo history or a renderer is
//! never modified behind its back.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::point::{ControlPoint, PointId, PointKind};

/// Map point id -> image point ids linked to it, ordered by id (creation order).
///
/// An image point id appears under at most one map point. Keys with no
/// linked image points are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinGraph {
    links: BTreeMap<PointId, BTreeSet<PointId>>,
}

impl JoinGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the graph holds no links at all.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Image points linked to `map_id`, in creation order.
    pub fn images_of(&self, map_id: PointId) -> impl Iterator<Item = PointId> + '_ {
        self.links.get(&map_id).into_iter().flatten().copied()
    }

    /// The map point `image_id` is linked to, if any.
    pub fn map_of(&self, image_id: PointId) -> Option<PointId> {
        self.links
            .iter()
            .find(|(_, images)| images.contains(&image_id))
            .map(|(map_id, _)| *map_id)
    }

    /// Check if `image_id` is linked to `map_id`.
    pub fn is_linked(&self, image_id: PointId, map_id: PointId) -> bool {
        self.links
            .get(&map_id)
            .is_some_and(|images| images.contains(&image_id))
    }

    /// Check if `id` appears anywhere in the graph, as a key or a value.
    pub fn references(&self, id: PointId) -> bool {
        self.links.contains_key(&id) || self.map_of(id).is_some()
    }

    /// Iterate over `(map_id, image_id)` pairs, ordered by map id then image id.
    pub fn pairs(&self) -> impl Iterator<Item = (PointId, PointId)> + '_ {
        self.links
            .iter()
            .flat_map(|(map_id, images)| images.iter().map(move |img| (*map_id, *img)))
    }

    /// Map point ids that have at least one linked image point.
    pub fn map_ids(&self) -> impl Iterator<Item = PointId> + '_ {
        self.links.keys().copied()
    }

    /// Link `image_id` to `map_id`, or unlink it if that link already exists.
    ///
    /// Linking an image point that belongs to another map point moves it:
    /// the previous link is broken first.
    pub fn toggle(&self, image_id: PointId, map_id: PointId) -> Self {
        let mut links = self.links.clone();

        if self.is_linked(image_id, map_id) {
            log::debug!("Unlinking image point {} from map point {}", image_id, map_id);
            remove_image(&mut links, image_id);
            return Self { links };
        }

        if let Some(previous) = self.map_of(image_id) {
            log::warn!(
                "Image point {} was linked to map point {}, relinking to {}",
                image_id,
                previous,
                map_id
            );
            remove_image(&mut links, image_id);
        }

        links.entry(map_id).or_default().insert(image_id);
        Self { links }
    }

    /// Drop every link that references `point`.
    ///
    /// A map point loses its whole entry; an image point is filtered out of
    /// every entry. Returns `Cow::Borrowed(self)` when nothing referenced the
    /// point so callers can detect the no-op cheaply.
    pub fn without_point(&self, point: &ControlPoint) -> Cow<'_, Self> {
        match point.kind() {
            PointKind::Map => {
                if !self.links.contains_key(&point.id) {
                    return Cow::Borrowed(self);
                }
                let mut links = self.links.clone();
                links.remove(&point.id);
                Cow::Owned(Self { links })
            }
            PointKind::Image => {
                if self.map_of(point.id).is_none() {
                    return Cow::Borrowed(self);
                }
                let mut links = self.links.clone();
                remove_image(&mut links, point.id);
                Cow::Owned(Self { links })
            }
        }
    }

    /// Ids linked to `id`: the image points of a map point, or the map point
    /// of an image point. Used for highlighting only.
    pub fn neighbors(&self, id: PointId) -> Vec<PointId> {
        if let Some(images) = self.links.get(&id) {
            return images.iter().copied().collect();
        }
        self.links
            .iter()
            .filter(|(_, images)| images.contains(&id))
            .map(|(map_id, _)| *map_id)
            .collect()
    }

    /// Keep only links whose both ends satisfy `live`.
    pub fn retain_live(&self, live: impl Fn(PointId, PointKind) -> bool) -> Cow<'_, Self> {
        let stale = self.pairs().any(|(map_id, image_id)| {
            !live(map_id, PointKind::Map) || !live(image_id, PointKind::Image)
        });
        if !stale {
            return Cow::Borrowed(self);
        }
        let links = self
            .links
            .iter()
            .filter(|(map_id, _)| live(**map_id, PointKind::Map))
            .map(|(map_id, images)| {
                let images: BTreeSet<PointId> = images
                    .iter()
                    .copied()
                    .filter(|img| live(*img, PointKind::Image))
                    .collect();
                (*map_id, images)
            })
            .filter(|(_, images)| !images.is_empty())
            .collect();
        Cow::Owned(Self { links })
    }
}

fn remove_image(links: &mut BTreeMap<PointId, BTreeSet<PointId>>, image_id: PointId) {
    for images in links.values_mut() {
        images.remove(&image_id);
    }
    links.retain(|_, images| !images.is_empty());
}
