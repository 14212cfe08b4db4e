//! Tabular control point rows: parsing, batch import and image sync.
//!
//! Row layouts, by field count:
//!
//! - 3 fields: `x y image_name` (image point)
//! - 4 fields: `label lng lat elevation` (map point)
//! - 6 fields: `lng lat elevation x y image_name` (both, linked)
//!
//! Any other field count is skipped.

use crate::crs::{Normalizer, Projector};
use crate::format::error::FormatError;
use crate::model::ControlPoint;
use crate::state::{ControlPointState, LoadedImage, Mode, has_image};

/// Image side of a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFields {
    pub x: f64,
    pub y: f64,
    pub image_name: String,
}

/// Map side of a row, still in the source coordinate system.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFields {
    /// Longitude or easting
    pub lng: f64,
    /// Latitude or northing
    pub lat: f64,
    /// Parsed but not used for georeferencing
    pub elevation: Option<f64>,
    pub label: Option<String>,
}

/// What a row yields. At least one side is present.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRow {
    pub image: Option<ImageFields>,
    pub map: Option<MapFields>,
}

impl ParsedRow {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.map.is_none()
    }
}

fn number(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn text(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}

fn image_fields(x: &str, y: &str, name: &str) -> Option<ImageFields> {
    Some(ImageFields {
        x: number(x)?,
        y: number(y)?,
        image_name: text(name)?,
    })
}

fn map_fields(lng: &str, lat: &str, elevation: &str, label: Option<&str>) -> Option<MapFields> {
    Some(MapFields {
        lng: number(lng)?,
        lat: number(lat)?,
        elevation: number(elevation),
        label: label.and_then(text),
    })
}

/// Parse one row of fields. Returns None when the row yields no point.
pub fn parse_row<S: AsRef<str>>(fields: &[S]) -> Option<ParsedRow> {
    let f: Vec<&str> = fields.iter().map(|s| s.as_ref()).collect();
    let row = match f.as_slice() {
        [x, y, name] => ParsedRow {
            image: image_fields(x, y, name),
            map: None,
        },
        [label, lng, lat, elevation] => ParsedRow {
            image: None,
            map: map_fields(lng, lat, elevation, Some(*label)),
        },
        [lng, lat, elevation, x, y, name] => ParsedRow {
            image: image_fields(x, y, name),
            map: map_fields(lng, lat, elevation, None),
        },
        _ => return None,
    };
    (!row.is_empty()).then_some(row)
}

/// Counters reported after a batch import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub image_points: usize,
    pub map_points: usize,
    pub joins: usize,
    pub skipped_rows: usize,
}

/// Import `rows` into `state`.
///
/// The source projection is resolved before any row is read; failure to
/// resolve it is returned as an error and `state` is left as it was. Per-row
/// problems only skip the affected row or point. Status is recomputed once.
pub fn import_rows<R: AsRef<[S]>, S: AsRef<str>>(
    state: &ControlPointState,
    rows: &[R],
    images: &[LoadedImage],
    source_projection: Option<&str>,
    projector: &dyn Projector,
) -> Result<ControlPointState, FormatError> {
    import_rows_with_summary(state, rows, images, source_projection, projector)
        .map(|(next, _)| next)
}

/// Like [`import_rows`], also returning what was imported.
pub fn import_rows_with_summary<R: AsRef<[S]>, S: AsRef<str>>(
    state: &ControlPointState,
    rows: &[R],
    images: &[LoadedImage],
    source_projection: Option<&str>,
    projector: &dyn Projector,
) -> Result<(ControlPointState, ImportSummary), FormatError> {
    let mut summary = ImportSummary::default();
    if rows.is_empty() {
        return Ok((state.clone(), summary));
    }

    let normalizer = Normalizer::resolve(source_projection, projector)?;

    let mut next = state.clone();
    let mut selected = state.selected();

    for (index, row) in rows.iter().enumerate() {
        let Some(parsed) = parse_row(row.as_ref()) else {
            log::debug!("Skipping row {} with {} fields", index + 1, row.as_ref().len());
            summary.skipped_rows += 1;
            continue;
        };

        let image_point = match parsed.image {
            Some(fields) => {
                let id = next.mint_id();
                let loaded = has_image(images, &fields.image_name);
                ControlPoint::image(id, [fields.x, fields.y], &fields.image_name, loaded)
            }
            None => None,
        };

        let map_point = match parsed.map {
            Some(fields) => match normalizer.normalize([fields.lng, fields.lat]) {
                Ok([lng, lat]) => {
                    let id = next.mint_id();
                    ControlPoint::map(id, [lat, lng], fields.label)
                }
                Err(e) => {
                    log::warn!("Row {}: map coordinate skipped: {}", index + 1, e);
                    None
                }
            },
            None => None,
        };

        if let (Some(img), Some(map)) = (&image_point, &map_point) {
            next.joins = next.joins.toggle(img.id, map.id);
            summary.joins += 1;
        }

        if let Some(img) = image_point {
            if selected.is_none() {
                selected = Some(img.id);
            }
            next.points.push(img);
            summary.image_points += 1;
        }

        if let Some(map) = map_point {
            next.points.push(map);
            summary.map_points += 1;
        }
    }

    if summary.image_points + summary.map_points == 0 {
        log::debug!("No usable rows among {}, state unchanged", rows.len());
        return Ok((state.clone(), summary));
    }

    next.mode = Mode::from_selection(selected, &next.points);
    next.revalidate();

    log::info!(
        "Imported {} image points, {} map points, {} joins from {} rows ({} skipped, source {})",
        summary.image_points,
        summary.map_points,
        summary.joins,
        rows.len(),
        summary.skipped_rows,
        normalizer.source()
    );

    Ok((next, summary))
}

/// Re-stamp `has_image` on every image point from the loaded image list.
pub fn sync_images(state: &ControlPointState, images: &[LoadedImage]) -> ControlPointState {
    state.sync_images(images)
}
