//! Regression batch orchestration.
//!
//! Responsibilities:
//!
//! - prepare each dataset once
//! - build the design matrix and fit every spec against it
//! - turn per-pair failures into recorded outcomes

pub mod runner;

pub use runner::*;
