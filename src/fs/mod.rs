//! File system operations module
//!
//! Provides destination preparation and the streamed copy loop used by both
//! local copies and downloads.

mod operations;

pub use operations::*;
