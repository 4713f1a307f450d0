//! Numerical core: QR-based OLS estimation and rank checks.

pub mod ols;
pub mod rank;

pub use ols::*;
pub use rank::*;
