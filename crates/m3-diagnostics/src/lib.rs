//! M3 diagnostics
//!
//! This crate provides the error reporting infrastructure shared by the semantic core,
//! including error codes, source locations, and the [`Diagnostic`] value handed to
//! the presentation layer.

mod error;
mod error_code;
mod location;

pub use error::*;
pub use error_code::*;
pub use location::*;
