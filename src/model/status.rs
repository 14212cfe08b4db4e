//! Readiness of the current point set for georeferencing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::joins::JoinGraph;
use super::point::{ControlPoint, PointId, PointKind};

/// Default minimum number of linked (map, image) pairs.
pub const DEFAULT_MIN_JOINED_PAIRS: usize = 5;

/// Default minimum number of distinct map points carrying a link.
pub const DEFAULT_MIN_JOINED_MAP_POINTS: usize = 3;

/// Thresholds a point set must meet to be reported [`Status::Ready`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    /// Minimum number of linked (map, image) pairs
    pub min_joined_pairs: usize,
    /// Minimum number of distinct map points with at least one link
    pub min_joined_map_points: usize,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_joined_pairs: DEFAULT_MIN_JOINED_PAIRS,
            min_joined_map_points: DEFAULT_MIN_JOINED_MAP_POINTS,
        }
    }
}

/// Data sufficiency summary, from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    /// No control points at all
    #[default]
    NoPoints,
    /// Points exist but none of them are linked
    NoJoins { points: usize },
    /// Some links exist but not enough to georeference
    TooFewJoins {
        joined_pairs: usize,
        joined_map_points: usize,
        required_pairs: usize,
        required_map_points: usize,
    },
    /// Enough links to georeference
    Ready {
        joined_pairs: usize,
        joined_map_points: usize,
    },
}

impl Status {
    /// Position of this status on the worst-to-best scale.
    pub fn rank(&self) -> u8 {
        match self {
            Status::NoPoints => 0,
            Status::NoJoins { .. } => 1,
            Status::TooFewJoins { .. } => 2,
            Status::Ready { .. } => 3,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Status::Ready { .. })
    }

    /// Check if `self` is at least as good as `other`.
    ///
    /// Within the same variant, more links is better.
    pub fn at_least(&self, other: &Status) -> bool {
        if self.rank() != other.rank() {
            return self.rank() > other.rank();
        }
        let (pairs, maps) = self.counts();
        let (other_pairs, other_maps) = other.counts();
        pairs >= other_pairs && maps >= other_maps
    }

    fn counts(&self) -> (usize, usize) {
        match *self {
            Status::NoPoints | Status::NoJoins { .. } => (0, 0),
            Status::TooFewJoins {
                joined_pairs,
                joined_map_points,
                ..
            }
            | Status::Ready {
                joined_pairs,
                joined_map_points,
            } => (joined_pairs, joined_map_points),
        }
    }

    /// Short human-readable summary.
    pub fn describe(&self) -> String {
        match self {
            Status::NoPoints => "No control points".to_string(),
            Status::NoJoins { points } => format!("{} control points, none linked", points),
            Status::TooFewJoins {
                joined_pairs,
                joined_map_points,
                required_pairs,
                required_map_points,
            } => format!(
                "{}/{} linked pairs on {}/{} map points",
                joined_pairs, required_pairs, joined_map_points, required_map_points
            ),
            Status::Ready {
                joined_pairs,
                joined_map_points,
            } => format!(
                "Ready: {} linked pairs on {} map points",
                joined_pairs, joined_map_points
            ),
        }
    }
}

/// Classify `points` and `joins` against `thresholds`.
///
/// Only links whose two ends are live points of the right kind are counted.
pub fn validate(
    points: &[ControlPoint],
    joins: &JoinGraph,
    thresholds: &ValidationThresholds,
) -> Status {
    if points.is_empty() {
        return Status::NoPoints;
    }

    let kinds: HashMap<PointId, PointKind> = points.iter().map(|p| (p.id, p.kind())).collect();
    let is = |id: PointId, kind: PointKind| kinds.get(&id) == Some(&kind);

    let mut joined_pairs = 0;
    let mut joined_map_points = 0;
    for map_id in joins.map_ids() {
        if !is(map_id, PointKind::Map) {
            continue;
        }
        let linked = joins
            .images_of(map_id)
            .filter(|img| is(*img, PointKind::Image))
            .count();
        if linked > 0 {
            joined_pairs += linked;
            joined_map_points += 1;
        }
    }

    if joined_pairs == 0 {
        return Status::NoJoins {
            points: points.len(),
        };
    }

    if joined_pairs >= thresholds.min_joined_pairs
        && joined_map_points >= thresholds.min_joined_map_points
    {
        Status::Ready {
            joined_pairs,
            joined_map_points,
        }
    } else {
        Status::TooFewJoins {
            joined_pairs,
            joined_map_points,
            required_pairs: thresholds.min_joined_pairs,
            required_map_points: thresholds.min_joined_map_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(id: u64) -> ControlPoint {
        ControlPoint::image(PointId(id), [id as f64, id as f64], "a.jpg", true).unwrap()
    }

    fn map(id: u64) -> ControlPoint {
        ControlPoint::map(PointId(id), [45.0, -122.0], None).unwrap()
    }

    fn thresholds() -> ValidationThresholds {
        ValidationThresholds {
            min_joined_pairs: 2,
            min_joined_map_points: 2,
        }
    }

    #[test]
    fn test_empty_is_no_points() {
        assert_eq!(validate(&[], &JoinGraph::new(), &thresholds()), Status::NoPoints);
    }

    #[test]
    fn test_unlinked_points() {
        let points = vec![img(1), map(2)];
        assert_eq!(
            validate(&points, &JoinGraph::new(), &thresholds()),
            Status::NoJoins { points: 2 }
        );
    }

    #[test]
    fn test_progression_to_ready() {
        let points = vec![img(1), img(2), map(10), map(11)];
        let one = JoinGraph::new().toggle(PointId(1), PointId(10));
        let status = validate(&points, &one, &thresholds());
        assert!(matches!(status, Status::TooFewJoins { joined_pairs: 1, .. }));

        let two = one.toggle(PointId(2), PointId(11));
        let ready = validate(&points, &two, &thresholds());
        assert_eq!(
            ready,
            Status::Ready {
                joined_pairs: 2,
                joined_map_points: 2
            }
        );
        assert!(ready.at_least(&status));
        assert!(!status.at_least(&ready));
    }

    #[test]
    fn test_dead_links_are_not_counted() {
        let points = vec![img(1), map(10)];
        let joins = JoinGraph::new()
            .toggle(PointId(1), PointId(10))
            .toggle(PointId(99), PointId(10));
        let status = validate(&points, &joins, &thresholds());
        assert!(matches!(status, Status::TooFewJoins { joined_pairs: 1, .. }));
    }

    #[test]
    fn test_adding_joins_never_degrades() {
        let points: Vec<ControlPoint> = (1..=4).map(img).chain((10..=12).map(map)).collect();
        let mut joins = JoinGraph::new();
        let mut previous = validate(&points, &joins, &thresholds());
        for (i, m) in [(1, 10), (2, 10), (3, 11), (4, 12)] {
            joins = joins.toggle(PointId(i), PointId(m));
            let next = validate(&points, &joins, &thresholds());
            assert!(next.at_least(&previous), "{:?} worse than {:?}", next, previous);
            previous = next;
        }
    }

    #[test]
    fn test_removing_points_never_improves() {
        let mut points: Vec<ControlPoint> = vec![img(1), img(2), map(10), map(11)];
        let joins = JoinGraph::new()
            .toggle(PointId(1), PointId(10))
            .toggle(PointId(2), PointId(11));
        let mut previous = validate(&points, &joins, &thresholds());
        while !points.is_empty() {
            points.remove(0);
            let next = validate(&points, &joins, &thresholds());
            assert!(previous.at_least(&next));
            previous = next;
        }
        assert_eq!(previous, Status::NoPoints);
    }
}
