//! Core batch engine module
//!
//! Provides the transfer operations, the worker pool that executes them,
//! cancellation plumbing, and result reporting.

mod cancel;
mod http;
mod local;
mod operation;
mod plan;
mod pool;
mod result;

pub use cancel::*;
pub use http::*;
pub use local::*;
pub use operation::*;
pub use plan::*;
pub use pool::*;
pub use result::*;
