//! Direct solve of the assembled constraint system.
//!
//! One dense LU factorization with partial pivoting, back-substituted once
//! per axis with the waypoint contributions folded into the right-hand side.
//! The system is small (`6 × num_phases`, phases ≤ ~10), so a dense solve
//! is well inside a real-time budget and there is exactly one numerical
//! path: a singular or ill-conditioned matrix is a hard error, never a
//! silently garbage coefficient vector.

use ballast_core::error::SolveError;
use nalgebra::linalg::LU;
use nalgebra::DVector;
use tracing::debug;

use crate::assembler::AssembledSystem;

/// Reciprocal-condition floor below which the factorization is rejected.
///
/// Measured on the pivot magnitudes of U; a degenerate phase collapses two
/// boundary rows into near-linear dependence and lands far below this.
pub const RCOND_FLOOR: f64 = 1.0e-13;

/// Solve the assembled system for all three axes.
///
/// Returns one coefficient vector per axis, or an error if the matrix is
/// singular/ill-conditioned or a solution comes back non-finite. On error
/// the caller keeps its previous solution.
pub fn solve_axis_coefficients(
    system: &AssembledSystem,
) -> Result<[DVector<f64>; 3], SolveError> {
    let lu = LU::new(system.coefficient_matrix.clone());

    let rcond = pivot_rcond(&lu);
    if !rcond.is_finite() || rcond < RCOND_FLOOR {
        return Err(SolveError::SingularSystem { rcond });
    }

    let dim = system.coefficient_matrix.nrows();
    let mut coefficients = [
        DVector::zeros(dim),
        DVector::zeros(dim),
        DVector::zeros(dim),
    ];

    for axis in 0..3 {
        let rhs = system.effective_rhs(axis);
        let solved = lu
            .solve(&rhs)
            .ok_or(SolveError::SingularSystem { rcond })?;
        if !solved.iter().all(|c| c.is_finite()) {
            return Err(SolveError::NonFiniteSolution { axis });
        }
        coefficients[axis] = solved;
    }

    debug!(dim, rcond, "solved trajectory coefficients");

    Ok(coefficients)
}

/// Cheap conditioning estimate: ratio of the smallest to largest pivot
/// magnitude on the diagonal of U.
fn pivot_rcond(lu: &LU<f64, nalgebra::Dyn, nalgebra::Dyn>) -> f64 {
    let u = lu.u();
    let n = u.nrows().min(u.ncols());
    let mut min_pivot = f64::INFINITY;
    let mut max_pivot = 0.0_f64;
    for i in 0..n {
        let pivot = u[(i, i)].abs();
        min_pivot = min_pivot.min(pivot);
        max_pivot = max_pivot.max(pivot);
    }
    if max_pivot > 0.0 {
        min_pivot / max_pivot
    } else {
        0.0
    }
}
