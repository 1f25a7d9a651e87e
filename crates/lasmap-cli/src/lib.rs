//! Library side of the `lasmap` and `lasmap-convert` binaries.

pub mod convert;
pub mod logging;
pub mod pipeline;
pub mod types;
