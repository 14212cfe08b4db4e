//! GCP list text files.
//!
//! The first non-empty, non-comment line names the coordinate system of the
//! map columns; every further line is one whitespace-separated row (see
//! [`crate::format::rows`]). Lines starting with `#` are comments.
//!
//! ```text
//! WGS84 UTM 32N
//! 544256.7  5320919.9  5   3044  2622  IMG_0525.jpg
//! 544157.7  5320899.2  5   4193  1552  IMG_0585.jpg
//! ```

use std::path::Path;

use crate::crs::WGS84;
use crate::format::error::FormatError;
use crate::format::rows::parse_row;
use crate::model::Location;
use crate::state::ControlPointState;

/// Elevation written for exported rows; elevations are not tracked.
const EXPORT_ELEVATION: &str = "0";

/// Parsed GCP list: projection descriptor plus raw rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GcpList {
    /// Coordinate system descriptor of the map columns
    pub projection: String,
    /// Whitespace-split rows, in file order
    pub rows: Vec<Vec<String>>,
}

fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn split_fields(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

impl GcpList {
    /// Create an empty list for `projection`.
    pub fn new(projection: impl Into<String>) -> Self {
        Self {
            projection: projection.into(),
            rows: Vec::new(),
        }
    }

    /// Parse GCP list text.
    ///
    /// A first line that already parses as a row is taken as data and the
    /// projection defaults to WGS84.
    pub fn parse(text: &str) -> Result<Self, FormatError> {
        let mut lines = content_lines(text).peekable();
        let first = lines
            .peek()
            .copied()
            .ok_or_else(|| FormatError::invalid_format("GCP list is empty"))?;

        let projection = if parse_row(&split_fields(first)).is_some() {
            log::debug!("GCP list has no projection header, assuming {}", WGS84);
            WGS84.to_string()
        } else {
            lines.next();
            first.to_string()
        };

        let rows: Vec<Vec<String>> = lines.map(split_fields).collect();
        log::debug!("Parsed GCP list: {} rows in '{}'", rows.len(), projection);
        Ok(Self { projection, rows })
    }

    /// Read and parse a GCP list file.
    pub fn read(path: &Path) -> Result<Self, FormatError> {
        let text = std::fs::read_to_string(path)?;
        let list = Self::parse(&text)?;
        log::info!("Read {} GCP rows from {:?}", list.rows.len(), path);
        Ok(list)
    }

    /// Export every linked pair of `state` as a 6-field WGS84 row.
    ///
    /// Rows are ordered by map point id, then image point id.
    pub fn from_state(state: &ControlPointState) -> Self {
        let mut list = Self::new(WGS84);
        for (map_id, image_id) in state.joins.pairs() {
            let (Some(map), Some(image)) = (state.point(map_id), state.point(image_id)) else {
                continue;
            };
            let (
                Location::Map { lat, lng, .. },
                Location::Image {
                    x, y, image_name, ..
                },
            ) = (&map.location, &image.location)
            else {
                continue;
            };
            list.rows.push(vec![
                lng.to_string(),
                lat.to_string(),
                EXPORT_ELEVATION.to_string(),
                x.to_string(),
                y.to_string(),
                image_name.clone(),
            ]);
        }
        list
    }

    /// Render as text: header line then tab-separated rows.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(64 * (self.rows.len() + 1));
        out.push_str(&self.projection);
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.join("\t"));
            out.push('\n');
        }
        out
    }

    /// Write the list to `path`.
    pub fn write(&self, path: &Path) -> Result<(), FormatError> {
        std::fs::write(path, self.to_text())?;
        log::info!("Wrote {} GCP rows to {:?}", self.rows.len(), path);
        Ok(())
    }
}
