//! Configuration module for batchcopy
//!
//! CLI arguments and the runtime settings derived from them.

mod settings;

pub use settings::*;
