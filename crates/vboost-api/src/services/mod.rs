//! Business logic services.

pub mod status;
pub mod upload;

pub use status::StatusService;
pub use upload::{UploadInput, UploadService};
