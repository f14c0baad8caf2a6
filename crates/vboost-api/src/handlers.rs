//! Request handlers.

pub mod broll;
pub mod health;
pub mod process;
pub mod videos;

pub use broll::*;
pub use health::*;
pub use process::*;
pub use videos::*;
