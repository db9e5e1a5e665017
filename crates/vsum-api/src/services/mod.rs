//! Business services.

mod library;
mod summary;

pub use library::{MediaLibrary, VideoDeletion};
pub use summary::StoreSummarySource;
