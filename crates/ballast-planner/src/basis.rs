//! Constraint-row basis for the piecewise CoM model.
//!
//! Every boundary or continuity condition on the trajectory is a linear
//! combination of one phase's six coefficients. The functions here emit the
//! 6-entry combination for a given phase-local time; the assembler writes
//! them into matrix rows and the evaluator dots them with solved
//! coefficients, so both sides share one definition of the closed forms.
//!
//! With `x(t) = c0 e^{ωt} + c1 e^{-ωt} + c2 t³ + c3 t² + c4 t + c5`:
//!
//! ```text
//! ẋ(t)  =  ω c0 e^{ωt} − ω c1 e^{-ωt} + 3 c2 t² + 2 c3 t + c4
//! ẍ(t)  = ω² c0 e^{ωt} + ω² c1 e^{-ωt} + 6 c2 t + 2 c3
//! x⃛(t) = ω³ c0 e^{ωt} − ω³ c1 e^{-ωt} + 6 c2
//! ```
//!
//! The DCM row is `x + ẋ/ω` (the e^{-ωt} entry cancels: the stable mode is
//! invisible to the DCM) and the VRP row is `x − ẍ/ω²` (both exponential
//! entries cancel: the VRP is purely polynomial inside a phase).
//!
//! Row entries are kept finite for arbitrarily long stopping phases by
//! bounding the exponential and the polynomial time. The same bounds apply
//! on evaluation, so constraints and reconstruction stay consistent.

/// Upper bound on e^{ωt} inside any row entry.
pub const MAX_EXPONENTIAL: f64 = 1.0e5;

/// Upper bound on the phase-local time fed to the polynomial terms.
pub const MAX_POLY_TIME: f64 = 1.0e2;

/// Bounded time and exponential pair for a phase-local time.
#[inline]
fn bounded(omega: f64, time: f64) -> (f64, f64, f64) {
    let t = time.min(MAX_POLY_TIME);
    let e_plus = (omega * t).exp().min(MAX_EXPONENTIAL);
    let e_minus = (-omega * t).exp();
    (t, e_plus, e_minus)
}

/// CoM position row: coefficients of `x(t)`.
#[inline]
pub fn com_position_row(omega: f64, time: f64) -> [f64; 6] {
    let (t, e_plus, e_minus) = bounded(omega, time);
    [e_plus, e_minus, t * t * t, t * t, t, 1.0]
}

/// CoM velocity row: coefficients of `ẋ(t)`.
#[inline]
pub fn com_velocity_row(omega: f64, time: f64) -> [f64; 6] {
    let (t, e_plus, e_minus) = bounded(omega, time);
    [
        omega * e_plus,
        -omega * e_minus,
        3.0 * t * t,
        2.0 * t,
        1.0,
        0.0,
    ]
}

/// CoM acceleration row: coefficients of `ẍ(t)`.
#[inline]
pub fn com_acceleration_row(omega: f64, time: f64) -> [f64; 6] {
    let (t, e_plus, e_minus) = bounded(omega, time);
    let omega_sq = omega * omega;
    [omega_sq * e_plus, omega_sq * e_minus, 6.0 * t, 2.0, 0.0, 0.0]
}

/// CoM jerk row: coefficients of `x⃛(t)`.
#[inline]
pub fn com_jerk_row(omega: f64, time: f64) -> [f64; 6] {
    let (_, e_plus, e_minus) = bounded(omega, time);
    let omega_cubed = omega * omega * omega;
    [omega_cubed * e_plus, -omega_cubed * e_minus, 6.0, 0.0, 0.0, 0.0]
}

/// DCM position row: `x + ẋ/ω`, composed from the primitive rows so the
/// defining relation holds exactly in the assembled system.
#[inline]
pub fn dcm_position_row(omega: f64, time: f64) -> [f64; 6] {
    let position = com_position_row(omega, time);
    let velocity = com_velocity_row(omega, time);
    std::array::from_fn(|k| position[k] + velocity[k] / omega)
}

/// DCM velocity row: `ẋ + ẍ/ω`.
#[inline]
pub fn dcm_velocity_row(omega: f64, time: f64) -> [f64; 6] {
    let velocity = com_velocity_row(omega, time);
    let acceleration = com_acceleration_row(omega, time);
    std::array::from_fn(|k| velocity[k] + acceleration[k] / omega)
}

/// VRP position row: `x − ẍ/ω²`.
#[inline]
pub fn vrp_position_row(omega: f64, time: f64) -> [f64; 6] {
    let position = com_position_row(omega, time);
    let acceleration = com_acceleration_row(omega, time);
    let omega_sq = omega * omega;
    std::array::from_fn(|k| position[k] - acceleration[k] / omega_sq)
}

/// VRP velocity row: `ẋ − x⃛/ω²`.
#[inline]
pub fn vrp_velocity_row(omega: f64, time: f64) -> [f64; 6] {
    let velocity = com_velocity_row(omega, time);
    let jerk = com_jerk_row(omega, time);
    let omega_sq = omega * omega;
    std::array::from_fn(|k| velocity[k] - jerk[k] / omega_sq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const OMEGA: f64 = 3.0;

    fn dot(row: &[f64; 6], coeffs: &[f64; 6]) -> f64 {
        row.iter().zip(coeffs).map(|(r, c)| r * c).sum()
    }

    #[test]
    fn position_row_at_zero() {
        let row = com_position_row(OMEGA, 0.0);
        assert_eq!(row, [1.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn velocity_row_at_zero() {
        let row = com_velocity_row(OMEGA, 0.0);
        assert_eq!(row, [OMEGA, -OMEGA, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn acceleration_row_at_zero() {
        let row = com_acceleration_row(OMEGA, 0.0);
        assert_eq!(row, [9.0, 9.0, 0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn jerk_row_at_zero() {
        let row = com_jerk_row(OMEGA, 0.0);
        assert_eq!(row, [27.0, -27.0, 6.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn velocity_matches_position_finite_difference() {
        let coeffs = [0.02, -0.3, 0.7, -1.1, 0.4, 0.25];
        let t = 0.37;
        let h = 1e-6;
        for (lower, upper, analytic) in [
            (
                com_position_row(OMEGA, t - h),
                com_position_row(OMEGA, t + h),
                com_velocity_row(OMEGA, t),
            ),
            (
                com_velocity_row(OMEGA, t - h),
                com_velocity_row(OMEGA, t + h),
                com_acceleration_row(OMEGA, t),
            ),
            (
                com_acceleration_row(OMEGA, t - h),
                com_acceleration_row(OMEGA, t + h),
                com_jerk_row(OMEGA, t),
            ),
        ] {
            let numeric = (dot(&upper, &coeffs) - dot(&lower, &coeffs)) / (2.0 * h);
            assert_relative_eq!(numeric, dot(&analytic, &coeffs), epsilon = 1e-5);
        }
    }

    #[test]
    fn dcm_row_cancels_stable_mode() {
        let row = dcm_position_row(OMEGA, 0.81);
        assert_relative_eq!(row[1], 0.0, epsilon = 1e-15);
        // Unstable mode doubles: e^{ωt} + ω e^{ωt} / ω.
        let e_plus = (OMEGA * 0.81_f64).exp();
        assert_relative_eq!(row[0], 2.0 * e_plus, epsilon = 1e-12);
    }

    #[test]
    fn vrp_rows_cancel_both_exponentials() {
        for t in [0.0, 0.2, 0.9, 1.7] {
            let scale = (OMEGA * t).exp();
            let position = vrp_position_row(OMEGA, t);
            let velocity = vrp_velocity_row(OMEGA, t);
            assert!(position[0].abs() < 1e-12 * scale);
            assert!(position[1].abs() < 1e-12);
            assert!(velocity[0].abs() < 1e-12 * scale * OMEGA);
            assert!(velocity[1].abs() < 1e-12 * OMEGA);
        }
    }

    #[test]
    fn vrp_row_polynomial_entries() {
        let t = 0.5;
        let row = vrp_position_row(OMEGA, t);
        let omega_sq = OMEGA * OMEGA;
        assert_relative_eq!(row[2], t * t * t - 6.0 * t / omega_sq, epsilon = 1e-12);
        assert_relative_eq!(row[3], t * t - 2.0 / omega_sq, epsilon = 1e-12);
        assert_relative_eq!(row[4], t, epsilon = 1e-12);
        assert_relative_eq!(row[5], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn long_horizon_entries_stay_bounded() {
        let row = com_position_row(OMEGA, 1.0e7);
        assert_eq!(row[0], MAX_EXPONENTIAL);
        assert_relative_eq!(row[1], 0.0, epsilon = 1e-100);
        assert_eq!(row[4], MAX_POLY_TIME);
        assert!(row.iter().all(|entry| entry.is_finite()));

        let jerk = com_jerk_row(OMEGA, 1.0e7);
        assert!(jerk.iter().all(|entry| entry.is_finite()));
    }
}
