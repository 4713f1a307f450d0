//! Numerical rank via singular values.

use nalgebra::DMatrix;

/// Relative size (against the largest) below which a singular value, or a
/// diagonal entry of a QR `R` factor, counts as zero.
///
/// Shared by the design rank check and the estimator's QR guard. Since
/// `σ_min <= min |R_jj|` and `max |R_jj| <= σ_max`, a design that passes the
/// rank check here never trips the QR guard.
pub const SINGULAR_TOL: f64 = 1e-12;

/// Rank of `x`, counting singular values above
/// `σ_max · max(SINGULAR_TOL, max(n, k) · ε)`.
///
/// The `max(n, k) · ε` term is the usual LAPACK-style cutoff and only takes
/// over for very tall designs.
pub fn numerical_rank(x: &DMatrix<f64>) -> usize {
    if x.is_empty() {
        return 0;
    }
    let svd = x.clone().svd(false, false);
    let s_max = svd.singular_values.max();
    if !(s_max.is_finite() && s_max > 0.0) {
        return 0;
    }
    let rel = SINGULAR_TOL.max(x.nrows().max(x.ncols()) as f64 * f64::EPSILON);
    let tol = s_max * rel;
    svd.rank(tol)
}
