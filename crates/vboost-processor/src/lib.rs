//! Video processor bindings.
//!
//! The enhancement itself (captioning, B-roll, transcoding) happens outside
//! this service. This crate provides:
//! - The `VideoProcessor` trait used by the upload flow
//! - `HttpProcessor` for the processing service's `POST /process`
//! - `ScriptProcessor` running a local executable on temp files
//! - `PassthroughProcessor` returning the upload unchanged

pub mod config;
pub mod error;
pub mod http;
pub mod passthrough;
pub mod script;
pub mod traits;

pub use config::{create_processor, ProcessorConfig, ProcessorMode};
pub use error::{ProcessorError, ProcessorResult};
pub use http::HttpProcessor;
pub use passthrough::PassthroughProcessor;
pub use script::ScriptProcessor;
pub use traits::{ProcessRequest, ProcessedOutput, VideoProcessor};
