//! Data sources beyond plain CSV ingest.
//!
//! - synthetic trade panels for demos and tests (`sample`)

pub mod sample;

pub use sample::*;
