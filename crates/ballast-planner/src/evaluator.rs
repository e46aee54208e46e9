//! Closed-form trajectory reconstruction from solved coefficients.
//!
//! Pure functions over the published coefficient store: no allocation, no
//! side effects, safe for concurrent readers once a solve has completed.

use nalgebra::{DVector, Vector3};

use crate::basis;
use crate::indexing::COEFFICIENTS_PER_PHASE;

/// Full reference state at one query time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrajectoryState {
    pub com_position: Vector3<f64>,
    pub com_velocity: Vector3<f64>,
    pub com_acceleration: Vector3<f64>,
    /// Divergent component of motion: `com + com_vel / ω`.
    pub dcm_position: Vector3<f64>,
    pub dcm_velocity: Vector3<f64>,
    /// Virtual repellent point: `dcm − dcm_vel / ω`.
    pub vrp_position: Vector3<f64>,
    /// VRP projected to ground height (`vrp − g/ω² ẑ`).
    pub ecmp_position: Vector3<f64>,
}

/// Evaluate one segment's closed forms at a segment-local time.
///
/// `block_start` is the coefficient-block offset of the segment (from the
/// index layout). Times outside `[0, duration]` extrapolate; clamping is the
/// caller's concern.
pub fn evaluate_segment(
    coefficients: &[DVector<f64>; 3],
    block_start: usize,
    omega: f64,
    gravity: f64,
    time_in_segment: f64,
) -> TrajectoryState {
    let position_row = basis::com_position_row(omega, time_in_segment);
    let velocity_row = basis::com_velocity_row(omega, time_in_segment);
    let acceleration_row = basis::com_acceleration_row(omega, time_in_segment);

    let mut com_position = Vector3::zeros();
    let mut com_velocity = Vector3::zeros();
    let mut com_acceleration = Vector3::zeros();

    for axis in 0..3 {
        let block = coefficients[axis]
            .rows(block_start, COEFFICIENTS_PER_PHASE);
        let mut position = 0.0;
        let mut velocity = 0.0;
        let mut acceleration = 0.0;
        for k in 0..COEFFICIENTS_PER_PHASE {
            let c = block[k];
            position += position_row[k] * c;
            velocity += velocity_row[k] * c;
            acceleration += acceleration_row[k] * c;
        }
        com_position[axis] = position;
        com_velocity[axis] = velocity;
        com_acceleration[axis] = acceleration;
    }

    let dcm_position = com_position + com_velocity / omega;
    let dcm_velocity = com_velocity + com_acceleration / omega;
    let vrp_position = dcm_position - dcm_velocity / omega;
    let ecmp_position = vrp_position - Vector3::new(0.0, 0.0, gravity / (omega * omega));

    TrajectoryState {
        com_position,
        com_velocity,
        com_acceleration,
        dcm_position,
        dcm_velocity,
        vrp_position,
        ecmp_position,
    }
}
