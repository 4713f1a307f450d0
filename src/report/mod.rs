//! Reporting: terminal rendering of regression outcomes.

pub mod format;

pub use format::*;
