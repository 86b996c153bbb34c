//! mudexport Core Library
//!
//! This crate provides the error handling and logging setup shared
//! across all mudexport components.

pub mod error;
pub mod logging;

pub use error::{Error, Result, ResultExt};
pub use logging::TracingConfig;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::error::{Error, Result, ResultExt};
}
