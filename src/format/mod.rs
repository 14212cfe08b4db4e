//! Control point import/export.
//!
//! Rows arrive pre-split from a row source (typically a [`GcpList`] file) and
//! are turned into control points by [`import_rows`], which also links the
//! image and map halves of combined rows and normalizes map coordinates to
//! WGS84.
//!
//! ```rust,ignore
//! use gcpat::format::{GcpList, import_rows};
//! use gcpat::crs::ProjProjector;
//!
//! let list = GcpList::read(path)?;
//! let state = import_rows(&state, &list.rows, &images, Some(&list.projection), &ProjProjector)?;
//! ```

mod error;
mod gcp_list;
mod rows;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use gcp_list::GcpList;
pub use rows::{
    ImageFields, ImportSummary, MapFields, ParsedRow, import_rows, import_rows_with_summary,
    parse_row, sync_images,
};
