//! Control point state management modules.

mod images;
mod mode;
mod snapshot;

pub use images::{IMAGE_EXTENSIONS, LoadStatus, LoadedImage, has_image, is_image_filename};
pub use mode::Mode;
pub use snapshot::ControlPointState;
