//! Request handlers.

pub mod admin;
pub mod health;
pub mod images;
pub mod summary;
pub mod videos;

pub use admin::*;
pub use health::*;
pub use images::*;
pub use summary::*;
pub use videos::*;
