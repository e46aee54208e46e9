//! Constraint assembly: contact sequence → square linear system.
//!
//! One walk over the (possibly augmented) sequence emits exactly
//! `6 × num_phases` rows:
//!
//! - CoM position at the start of phase 0 (1 row), plus the CoM velocity
//!   row when initial-velocity continuity is active;
//! - per phase, dynamics rows at both boundaries: load-bearing phases pin
//!   the VRP position to its waypoint and the VRP velocity to the waypoint
//!   slope (the implicit VRP-velocity relation); flight phases pin the CoM
//!   acceleration to free fall and the CoM jerk to zero;
//! - per internal boundary, CoM position and velocity continuity (2 rows);
//! - the terminal DCM row: DCM at the end of the last phase equals the last
//!   phase's end waypoint.
//!
//! When the velocity row is active the first phase is the short continuity
//! sub-phase and its VRP-velocity row at t=0 is omitted; that freed slot is
//! exactly what the velocity row consumes, keeping the system square.
//!
//! The coefficient matrix is shared across the three axes. Waypoint targets
//! are not written into the per-axis constants; they go through a separate
//! Jacobian so the effective right-hand side is `b_axis + J · v_axis`.

use ballast_core::contact::{ContactSequence, ContactState};
use nalgebra::{DMatrix, DVector, Vector3};
use tracing::debug;

use crate::basis;
use crate::indexing::IndexLayout;

/// Assembled linear system for one contact sequence.
#[derive(Clone, Debug)]
pub struct AssembledSystem {
    /// Square coefficient matrix, shared across axes.
    pub coefficient_matrix: DMatrix<f64>,
    /// Per-axis constant right-hand sides (initial state, gravity terms).
    pub axis_constants: [DVector<f64>; 3],
    /// Maps VRP-waypoint values into constraint rows, shared across axes.
    pub waypoint_jacobian: DMatrix<f64>,
    /// Per-axis VRP-waypoint values (pressure centroid raised by g/ω²).
    pub axis_waypoints: [DVector<f64>; 3],
}

impl AssembledSystem {
    /// Effective right-hand side for one axis: `b_axis + J · v_axis`.
    pub fn effective_rhs(&self, axis: usize) -> DVector<f64> {
        &self.axis_constants[axis] + &self.waypoint_jacobian * &self.axis_waypoints[axis]
    }
}

/// Build the full constraint system for a validated sequence.
///
/// `initial_com_velocity` must be `Some` exactly when the sequence has been
/// augmented with the continuity sub-phase (phase 0 is then that sub-phase).
pub fn assemble(
    sequence: &ContactSequence,
    layout: &IndexLayout,
    initial_com_position: &Vector3<f64>,
    initial_com_velocity: Option<&Vector3<f64>>,
    omega: f64,
    gravity: f64,
) -> AssembledSystem {
    let num_phases = sequence.len();
    let dim = layout.system_dim();
    let constrain_velocity = initial_com_velocity.is_some();

    let mut matrix = DMatrix::zeros(dim, dim);
    let mut constants = [
        DVector::zeros(dim),
        DVector::zeros(dim),
        DVector::zeros(dim),
    ];
    let mut jacobian = DMatrix::zeros(dim, layout.waypoint_count());
    let waypoints = waypoint_values(sequence, layout, omega, gravity);

    let mut row = 0;

    // Initial CoM state at the start of phase 0.
    write_row(
        &mut matrix,
        row,
        layout.coefficient_start(0),
        &basis::com_position_row(omega, 0.0),
    );
    for axis in 0..3 {
        constants[axis][row] = initial_com_position[axis];
    }
    row += 1;

    if let Some(velocity) = initial_com_velocity {
        write_row(
            &mut matrix,
            row,
            layout.coefficient_start(0),
            &basis::com_velocity_row(omega, 0.0),
        );
        for axis in 0..3 {
            constants[axis][row] = velocity[axis];
        }
        row += 1;
    }

    for phase_id in 0..num_phases {
        let phase = &sequence.phases()[phase_id];
        let duration = phase.duration();
        let block = layout.coefficient_start(phase_id);

        match phase.state {
            ContactState::LoadBearing { .. } => {
                let start_slot = layout
                    .waypoint_start_index(phase_id)
                    .expect("load-bearing phase has waypoint slots");
                let end_slot = layout
                    .waypoint_end_index(phase_id)
                    .expect("load-bearing phase has waypoint slots");
                let inv_duration = 1.0 / duration;

                // Start boundary: VRP position, then the implicit VRP
                // velocity (skipped on the continuity sub-phase, whose slot
                // the initial-velocity row consumed).
                write_row(&mut matrix, row, block, &basis::vrp_position_row(omega, 0.0));
                jacobian[(row, start_slot)] = 1.0;
                row += 1;

                if !(constrain_velocity && phase_id == 0) {
                    write_row(&mut matrix, row, block, &basis::vrp_velocity_row(omega, 0.0));
                    jacobian[(row, start_slot)] = -inv_duration;
                    jacobian[(row, end_slot)] = inv_duration;
                    row += 1;
                }

                // End boundary: VRP position and velocity.
                write_row(
                    &mut matrix,
                    row,
                    block,
                    &basis::vrp_position_row(omega, duration),
                );
                jacobian[(row, end_slot)] = 1.0;
                row += 1;

                write_row(
                    &mut matrix,
                    row,
                    block,
                    &basis::vrp_velocity_row(omega, duration),
                );
                jacobian[(row, start_slot)] = -inv_duration;
                jacobian[(row, end_slot)] = inv_duration;
                row += 1;
            }
            ContactState::Flight => {
                // Ballistic: free-fall acceleration and zero jerk at both
                // boundaries; horizontal axes get a zero right-hand side
                // from the same row pattern.
                for boundary_time in [0.0, duration] {
                    write_row(
                        &mut matrix,
                        row,
                        block,
                        &basis::com_acceleration_row(omega, boundary_time),
                    );
                    constants[2][row] = -gravity;
                    row += 1;

                    write_row(
                        &mut matrix,
                        row,
                        block,
                        &basis::com_jerk_row(omega, boundary_time),
                    );
                    row += 1;
                }
            }
        }

        // Continuity with the next phase: x_i(T_i) = x_{i+1}(0) and the
        // velocity counterpart.
        if phase_id + 1 < num_phases {
            let next_block = layout.coefficient_start(phase_id + 1);

            write_row(
                &mut matrix,
                row,
                block,
                &basis::com_position_row(omega, duration),
            );
            write_negated_row(
                &mut matrix,
                row,
                next_block,
                &basis::com_position_row(omega, 0.0),
            );
            row += 1;

            write_row(
                &mut matrix,
                row,
                block,
                &basis::com_velocity_row(omega, duration),
            );
            write_negated_row(
                &mut matrix,
                row,
                next_block,
                &basis::com_velocity_row(omega, 0.0),
            );
            row += 1;
        }
    }

    // Terminal condition: DCM at the end of the last phase equals its end
    // waypoint, so the pendulum comes to rest over the final pressure
    // centroid.
    let last = num_phases - 1;
    write_row(
        &mut matrix,
        row,
        layout.coefficient_start(last),
        &basis::dcm_position_row(omega, sequence.phases()[last].duration()),
    );
    let final_slot = layout
        .waypoint_end_index(last)
        .expect("validated sequence ends load-bearing");
    jacobian[(row, final_slot)] = 1.0;
    row += 1;

    assert_eq!(row, dim, "constraint row count must fill the square system");

    debug!(
        phases = num_phases,
        dim,
        waypoints = layout.waypoint_count(),
        velocity_row = constrain_velocity,
        "assembled CoM constraint system"
    );

    AssembledSystem {
        coefficient_matrix: matrix,
        axis_constants: constants,
        waypoint_jacobian: jacobian,
        axis_waypoints: waypoints,
    }
}

/// Per-axis VRP-waypoint values: the pressure-centroid endpoints lifted by
/// the pendulum height `g/ω²`.
fn waypoint_values(
    sequence: &ContactSequence,
    layout: &IndexLayout,
    omega: f64,
    gravity: f64,
) -> [DVector<f64>; 3] {
    let height_offset = Vector3::new(0.0, 0.0, gravity / (omega * omega));
    let mut values = [
        DVector::zeros(layout.waypoint_count()),
        DVector::zeros(layout.waypoint_count()),
        DVector::zeros(layout.waypoint_count()),
    ];

    for (phase_id, phase) in sequence.phases().iter().enumerate() {
        if let ContactState::LoadBearing { cop_start, cop_end } = phase.state {
            let start_slot = layout.waypoint_start_index(phase_id).expect("load-bearing");
            let end_slot = layout.waypoint_end_index(phase_id).expect("load-bearing");
            let vrp_start = cop_start + height_offset;
            let vrp_end = cop_end + height_offset;
            for axis in 0..3 {
                values[axis][start_slot] = vrp_start[axis];
                values[axis][end_slot] = vrp_end[axis];
            }
        }
    }

    values
}

fn write_row(matrix: &mut DMatrix<f64>, row: usize, block_start: usize, entries: &[f64; 6]) {
    for (k, &entry) in entries.iter().enumerate() {
        matrix[(row, block_start + k)] = entry;
    }
}

fn write_negated_row(
    matrix: &mut DMatrix<f64>,
    row: usize,
    block_start: usize,
    entries: &[f64; 6],
) {
    for (k, &entry) in entries.iter().enumerate() {
        matrix[(row, block_start + k)] = -entry;
    }
}
