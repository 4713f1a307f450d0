//! `trade-ols` library crate.
//!
//! The binary (`tols`) is a thin wrapper around this library so that:
//!
//! - the estimation core is testable without spawning processes
//! - other front-ends (notebooks, services) can reuse the pipeline
//!
//! Core flow, leaf first: [`prep`] filters and transforms a dataset,
//! [`design`] builds a validated design matrix, [`math`] fits OLS, and
//! [`fit`] runs every (dataset, spec) pair, recording failures as outcomes.

pub mod app;
pub mod cli;
pub mod data;
pub mod design;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod prep;
pub mod report;
