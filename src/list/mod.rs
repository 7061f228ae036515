//! List file module
//!
//! Turns a newline-separated list of relative paths and URLs into the
//! operations of a batch.

mod parser;

pub use parser::*;
