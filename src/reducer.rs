//! Message handling for control point state.
//!
//! [`reduce`] is the only place a [`Message`] turns into a new
//! [`ControlPointState`]. Every message is handled; messages that reference
//! missing points or images come back as an unchanged snapshot.

use crate::crs::Projector;
use crate::format::{FormatError, import_rows};
use crate::message::{Message, SeedPoint};
use crate::model::PointKind;
use crate::state::ControlPointState;

/// Compute the state that follows `state` after `message`.
///
/// Only [`Message::SyncListToImages`] can fail, when its source projection
/// cannot be resolved; `state` is untouched in that case.
pub fn reduce(
    state: &ControlPointState,
    message: Message,
    projector: &dyn Projector,
) -> Result<ControlPointState, FormatError> {
    log::debug!("📨 {} in {} mode", message.name(), state.mode.name());

    let next = match message {
        Message::AddControlPoint { kind, coord, name } => {
            state.add_point(kind, coord, name.as_deref())
        }
        Message::DeleteControlPoint { id } => state.delete_point(id),
        Message::SetControlPointPosition { locator, id, pos } => {
            state.set_position(id, locator, pos)
        }
        Message::ToggleControlPointMode {
            image_index,
            image_name,
            point_id,
            seed,
        } => match (point_id, seed) {
            (Some(id), _) => state.toggle_mode(id),
            (None, Some(seed)) => add_seeded_pair(state, image_name.as_deref(), seed),
            (None, None) => {
                log::debug!("Toggle on image {:?} without a point or seed", image_index);
                state.clone()
            }
        },
        Message::JoinControlPoint { id } => state.join(id),
        Message::HighlightControlPoint { id } => state.highlight(id),
        Message::AwaitControlPoint => state.await_point(),
        Message::SyncImagesToPoints { images } => state.sync_images(&images),
        Message::SyncListToImages {
            images,
            rows,
            source_projection,
        } => import_rows(
            state,
            &rows,
            &images,
            source_projection.as_deref(),
            projector,
        )?,
        Message::OnDeleteImage { image_name } => state.delete_all_for_image(&image_name),
    };

    Ok(next)
}

/// Create an image point and a map point from `seed`, link them and select
/// the image point. Either point failing to build makes the whole thing a no-op.
fn add_seeded_pair(
    state: &ControlPointState,
    image_name: Option<&str>,
    seed: SeedPoint,
) -> ControlPointState {
    let with_image = state.add_point(PointKind::Image, seed.image, image_name);
    let Some(image_id) = with_image.selected().filter(|_| with_image != *state) else {
        return state.clone();
    };

    let with_map = with_image.add_point(PointKind::Map, seed.map, None);
    let Some(map_id) = with_map.selected().filter(|id| *id != image_id) else {
        return state.clone();
    };

    let joined = with_map.join(image_id);
    debug_assert!(joined.joins.is_linked(image_id, map_id));
    log::debug!("🔗 Seeded pair {} <-> {}", image_id, map_id);
    joined.toggle_mode(image_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::ProjProjector;
    use crate::model::{PointId, ValidationThresholds};
    use crate::state::{LoadedImage, Mode};

    fn dispatch(state: &ControlPointState, message: Message) -> ControlPointState {
        reduce(state, message, &ProjProjector).unwrap()
    }

    fn add(kind: PointKind, coord: [f64; 2], name: Option<&str>) -> Message {
        Message::AddControlPoint {
            kind,
            coord,
            name: name.map(str::to_string),
        }
    }

    fn empty() -> ControlPointState {
        ControlPointState::new(ValidationThresholds {
            min_joined_pairs: 1,
            min_joined_map_points: 1,
        })
    }

    #[test]
    fn test_add_then_join_flow() {
        let s = dispatch(&empty(), Message::AwaitControlPoint);
        assert_eq!(s.mode, Mode::Adding);

        let s = dispatch(&s, add(PointKind::Image, [10.0, 20.0], Some("img1.jpg")));
        let image_id = s.selected().unwrap();
        let s = dispatch(&s, add(PointKind::Map, [45.0, -122.0], None));
        let map_id = s.selected().unwrap();

        let s = dispatch(&s, Message::ToggleControlPointMode {
            image_index: Some(0),
            image_name: Some("img1.jpg".into()),
            point_id: Some(image_id),
            seed: None,
        });
        assert_eq!(
            s.mode,
            Mode::Editing {
                id: image_id,
                kind: PointKind::Image
            }
        );

        let s = dispatch(&s, Message::JoinControlPoint { id: map_id });
        assert!(s.joins.is_linked(image_id, map_id));
        assert_eq!(s.mode, Mode::Idle);
        assert!(s.status.is_ready());
    }

    #[test]
    fn test_set_position_respects_locator() {
        let s = dispatch(&empty(), add(PointKind::Map, [45.0, -122.0], None));
        let id = s.selected().unwrap();
        let moved = dispatch(&s, Message::SetControlPointPosition {
            locator: PointKind::Map,
            id,
            pos: [46.0, -121.0],
        });
        assert_eq!(moved.point(id).unwrap().coord(), [46.0, -121.0]);

        let ignored = dispatch(&s, Message::SetControlPointPosition {
            locator: PointKind::Image,
            id,
            pos: [1.0, 1.0],
        });
        assert_eq!(ignored, s);
    }

    #[test]
    fn test_seeded_toggle_creates_linked_pair() {
        let s = dispatch(&empty(), Message::ToggleControlPointMode {
            image_index: Some(0),
            image_name: Some("img1.jpg".into()),
            point_id: None,
            seed: Some(SeedPoint {
                image: [100.0, 200.0],
                map: [45.0, -122.0],
            }),
        });
        assert_eq!(s.points.len(), 2);
        let image_id = s.points[0].id;
        let map_id = s.points[1].id;
        assert!(s.joins.is_linked(image_id, map_id));
        assert_eq!(s.selected(), Some(image_id));
        assert!(s.status.is_ready());
    }

    #[test]
    fn test_seeded_toggle_without_image_name_is_noop() {
        let s = empty();
        let next = dispatch(&s, Message::ToggleControlPointMode {
            image_index: None,
            image_name: None,
            point_id: None,
            seed: Some(SeedPoint {
                image: [1.0, 2.0],
                map: [45.0, -122.0],
            }),
        });
        assert_eq!(next, s);
    }

    #[test]
    fn test_noop_messages_preserve_state() {
        let s = dispatch(&empty(), add(PointKind::Image, [1.0, 2.0], Some("a.jpg")));
        let noops = vec![
            Message::DeleteControlPoint { id: PointId(99) },
            Message::JoinControlPoint { id: PointId(99) },
            Message::OnDeleteImage {
                image_name: "missing.jpg".into(),
            },
            Message::SyncImagesToPoints { images: vec![] },
            Message::SyncListToImages {
                images: vec![],
                rows: vec![],
                source_projection: None,
            },
            Message::ToggleControlPointMode {
                image_index: None,
                image_name: None,
                point_id: None,
                seed: None,
            },
            Message::ToggleControlPointMode {
                image_index: None,
                image_name: None,
                point_id: Some(PointId(99)),
                seed: None,
            },
        ];
        for message in noops {
            let name = message.name();
            assert_eq!(dispatch(&s, message), s, "{name} should be a no-op");
        }
    }

    #[test]
    fn test_every_message_has_a_successor() {
        let images = vec![LoadedImage::new(1, "a.jpg")];
        let base = dispatch(&empty(), add(PointKind::Image, [1.0, 2.0], Some("a.jpg")));
        let base = dispatch(&base, add(PointKind::Map, [45.0, -122.0], None));
        let states = [
            empty(),
            base.clone(),
            dispatch(&base, Message::AwaitControlPoint),
            base.toggle_mode(PointId(1)),
        ];
        let messages = [
            add(PointKind::Image, [3.0, 4.0], Some("a.jpg")),
            add(PointKind::Map, [1.0, 1.0], None),
            Message::DeleteControlPoint { id: PointId(1) },
            Message::SetControlPointPosition {
                locator: PointKind::Image,
                id: PointId(1),
                pos: [5.0, 5.0],
            },
            Message::ToggleControlPointMode {
                image_index: Some(0),
                image_name: Some("a.jpg".into()),
                point_id: Some(PointId(2)),
                seed: None,
            },
            Message::JoinControlPoint { id: PointId(2) },
            Message::HighlightControlPoint { id: Some(PointId(1)) },
            Message::HighlightControlPoint { id: None },
            Message::AwaitControlPoint,
            Message::SyncImagesToPoints {
                images: images.clone(),
            },
            Message::SyncListToImages {
                images: images.clone(),
                rows: vec![vec!["1".into(), "2".into(), "a.jpg".into()]],
                source_projection: None,
            },
            Message::OnDeleteImage {
                image_name: "a.jpg".into(),
            },
        ];
        for state in &states {
            for message in &messages {
                let next = reduce(state, message.clone(), &ProjProjector);
                let next = next.unwrap_or_else(|e| panic!("{} failed: {e}", message.name()));
                if let Some(id) = next.selected() {
                    assert!(next.point(id).is_some(), "selection must be a live point");
                }
                for (map_id, image_id) in next.joins.pairs() {
                    assert!(next.point(map_id).is_some() && next.point(image_id).is_some());
                }
            }
        }
    }

    #[test]
    fn test_highlight_does_not_touch_status() {
        let s = dispatch(&empty(), add(PointKind::Image, [1.0, 2.0], Some("a.jpg")));
        let s = dispatch(&s, add(PointKind::Map, [45.0, -122.0], None));
        let s = dispatch(&s, Message::JoinControlPoint { id: PointId(1) });
        let lit = dispatch(&s, Message::HighlightControlPoint { id: Some(PointId(2)) });
        assert_eq!(lit.highlighted, vec![PointId(1)]);
        assert_eq!(lit.status, s.status);
    }

    #[test]
    fn test_unresolvable_projection_is_an_error() {
        let s = dispatch(&empty(), add(PointKind::Image, [1.0, 2.0], Some("a.jpg")));
        let message = Message::SyncListToImages {
            images: vec![],
            rows: vec![vec!["GCP".into(), "1".into(), "2".into(), "0".into()]],
            source_projection: Some("not a projection".into()),
        };
        let err = reduce(&s, message, &ProjProjector).unwrap_err();
        assert!(err.is_unresolvable_projection());
    }
}
