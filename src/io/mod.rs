//! Input/output helpers.
//!
//! - CSV dataset ingest (`ingest`)
//! - run configuration JSON (`config`)
//! - outcome exports (JSON/CSV) (`export`)

pub mod config;
pub mod export;
pub mod ingest;

pub use config::*;
pub use export::*;
pub use ingest::*;
