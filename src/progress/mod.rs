//! Progress reporting module
//!
//! Provides the throttled byte-count reporter attached to each running
//! transfer.

mod reporter;

pub use reporter::*;
