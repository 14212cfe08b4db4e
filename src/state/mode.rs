//! Interaction mode: what the next click on an image or the map will do.

use serde::{Deserialize, Serialize};

use crate::model::{ControlPoint, PointId, PointKind};

/// Current interaction mode.
///
/// Selection and edit mode live in one value, so a selected point always has
/// an edit mode matching its kind and an edit mode always has a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Mode {
    /// Nothing selected
    #[default]
    Idle,
    /// Armed: the next spatial input creates a point
    Adding,
    /// A point is selected; `kind` picks image editing or map editing
    Editing { id: PointId, kind: PointKind },
}

impl Mode {
    /// Mode entered when `point` becomes the selection.
    pub fn editing(point: &ControlPoint) -> Self {
        Mode::Editing {
            id: point.id,
            kind: point.kind(),
        }
    }

    /// Mode for an optional selection, looked up in `points`.
    ///
    /// Falls back to [`Mode::Idle`] when the id is not a live point.
    pub fn from_selection(selected: Option<PointId>, points: &[ControlPoint]) -> Self {
        selected
            .and_then(|id| points.iter().find(|p| p.id == id))
            .map(Mode::editing)
            .unwrap_or(Mode::Idle)
    }

    /// The selected point, if any.
    pub fn selected(&self) -> Option<PointId> {
        match self {
            Mode::Editing { id, .. } => Some(*id),
            Mode::Idle | Mode::Adding => None,
        }
    }

    pub fn is_adding(&self) -> bool {
        matches!(self, Mode::Adding)
    }

    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "Idle",
            Mode::Adding => "Adding",
            Mode::Editing {
                kind: PointKind::Image,
                ..
            } => "Image edit",
            Mode::Editing {
                kind: PointKind::Map,
                ..
            } => "Map edit",
        }
    }

    /// Select `id`, or deselect it if it is already selected.
    ///
    /// An id that is not in `points` leaves the mode unchanged.
    pub fn toggle(self, id: PointId, points: &[ControlPoint]) -> Self {
        if self.selected() == Some(id) {
            return Mode::Idle;
        }
        match points.iter().find(|p| p.id == id) {
            Some(point) => Mode::editing(point),
            None => self,
        }
    }

    /// Arm point creation. Already armed stays armed.
    pub fn await_point(self) -> Self {
        Mode::Adding
    }

    /// Resolve `(image_id, map_id)` for linking the selection with `other`.
    ///
    /// The selection supplies the side matching its kind and `other` the
    /// opposite side. Returns None outside of editing or when `other` is
    /// not a live point of the opposite kind.
    pub fn join_pair(&self, other: PointId, points: &[ControlPoint]) -> Option<(PointId, PointId)> {
        let Mode::Editing { id, kind } = *self else {
            return None;
        };
        let other_kind = points.iter().find(|p| p.id == other)?.kind();
        match (kind, other_kind) {
            (PointKind::Image, PointKind::Map) => Some((id, other)),
            (PointKind::Map, PointKind::Image) => Some((other, id)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<ControlPoint> {
        vec![
            ControlPoint::image(PointId(1), [1.0, 2.0], "a.jpg", true).unwrap(),
            ControlPoint::map(PointId(2), [45.0, -122.0], None).unwrap(),
            ControlPoint::image(PointId(3), [5.0, 6.0], "b.jpg", false).unwrap(),
        ]
    }

    #[test]
    fn test_toggle_selects_with_matching_kind() {
        let pts = points();
        assert_eq!(
            Mode::Idle.toggle(PointId(1), &pts),
            Mode::Editing {
                id: PointId(1),
                kind: PointKind::Image
            }
        );
        assert_eq!(
            Mode::Adding.toggle(PointId(2), &pts),
            Mode::Editing {
                id: PointId(2),
                kind: PointKind::Map
            }
        );
    }

    #[test]
    fn test_toggle_same_id_deselects() {
        let pts = points();
        let mode = Mode::Idle.toggle(PointId(2), &pts);
        assert_eq!(mode.toggle(PointId(2), &pts), Mode::Idle);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let pts = points();
        let mode = Mode::Idle.toggle(PointId(1), &pts);
        assert_eq!(mode.toggle(PointId(42), &pts), mode);
        assert_eq!(Mode::Adding.toggle(PointId(42), &pts), Mode::Adding);
    }

    #[test]
    fn test_await_point_is_idempotent() {
        let pts = points();
        let editing = Mode::Idle.toggle(PointId(1), &pts);
        for mode in [Mode::Idle, Mode::Adding, editing] {
            let armed = mode.await_point();
            assert_eq!(armed, Mode::Adding);
            assert_eq!(armed.selected(), None);
            assert_eq!(armed.await_point(), armed);
        }
    }

    #[test]
    fn test_join_pair_resolution() {
        let pts = points();
        let image_edit = Mode::Idle.toggle(PointId(1), &pts);
        assert_eq!(
            image_edit.join_pair(PointId(2), &pts),
            Some((PointId(1), PointId(2)))
        );

        let map_edit = Mode::Idle.toggle(PointId(2), &pts);
        assert_eq!(
            map_edit.join_pair(PointId(3), &pts),
            Some((PointId(3), PointId(2)))
        );

        assert_eq!(image_edit.join_pair(PointId(3), &pts), None, "same kind");
        assert_eq!(image_edit.join_pair(PointId(42), &pts), None, "unknown id");
        assert_eq!(Mode::Idle.join_pair(PointId(2), &pts), None);
        assert_eq!(Mode::Adding.join_pair(PointId(2), &pts), None);
    }

    #[test]
    fn test_from_selection() {
        let pts = points();
        assert_eq!(Mode::from_selection(None, &pts), Mode::Idle);
        assert_eq!(Mode::from_selection(Some(PointId(42)), &pts), Mode::Idle);
        assert_eq!(Mode::from_selection(Some(PointId(3)), &pts).selected(), Some(PointId(3)));
    }
}
