//! End-to-end planner scenarios.
//!
//! Exercises the solve-then-query pipeline on representative contact
//! sequences and checks the physical properties the whole-body controller
//! relies on: boundary continuity, initial-condition reproduction, terminal
//! DCM convergence, and the inverted-pendulum dynamics relation.

use approx::assert_relative_eq;
use ballast_core::config::PlannerConfig;
use ballast_core::contact::{ContactPhase, ContactSequence, ContactState};
use ballast_core::error::BallastError;
use ballast_demos::{hop_sequence, walk_sequence};
use ballast_planner::ComTrajectoryPlanner;
use nalgebra::Vector3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const OMEGA: f64 = 3.0;
const GRAVITY: f64 = 9.81;

fn test_planner() -> ComTrajectoryPlanner {
    ComTrajectoryPlanner::new(PlannerConfig {
        natural_frequency: Some(OMEGA),
        ..PlannerConfig::default()
    })
    .unwrap()
}

fn pendulum_height() -> f64 {
    GRAVITY / (OMEGA * OMEGA)
}

fn cop(x: f64, y: f64) -> Vector3<f64> {
    Vector3::new(x, y, 0.0)
}

/// Check continuity and the LIP dynamics relation over a solved sequence.
fn assert_trajectory_properties(planner: &ComTrajectoryPlanner, sequence: &ContactSequence) {
    // Position and velocity continuity at every internal boundary.
    for boundary in 0..sequence.len() - 1 {
        let end = planner
            .evaluate(boundary, sequence.phases()[boundary].duration())
            .unwrap();
        let begin = planner.evaluate(boundary + 1, 0.0).unwrap();
        assert_relative_eq!(end.com_position, begin.com_position, epsilon = 1e-6);
        assert_relative_eq!(end.com_velocity, begin.com_velocity, epsilon = 1e-6);
    }

    // The defining LIP relation and the DCM/VRP algebra at sampled times.
    for (phase_id, phase) in sequence.phases().iter().enumerate() {
        let duration = phase.duration();
        for k in 0..=8 {
            let t = duration * f64::from(k) / 8.0;
            let state = planner.evaluate(phase_id, t).unwrap();

            let lip = OMEGA * OMEGA * (state.com_position - state.vrp_position);
            assert_relative_eq!(state.com_acceleration, lip, epsilon = 1e-6);

            let dcm = state.com_position + state.com_velocity / OMEGA;
            assert_relative_eq!(state.dcm_position, dcm, epsilon = 1e-9);

            if let ContactState::Flight = phase.state {
                assert_relative_eq!(state.com_acceleration.z, -GRAVITY, epsilon = 1e-6);
                assert_relative_eq!(state.com_acceleration.x, 0.0, epsilon = 1e-6);
                assert_relative_eq!(state.com_acceleration.y, 0.0, epsilon = 1e-6);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Scenario A: single double-support phase
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_single_support_converges_to_vrp() {
    let mut planner = test_planner();
    let height = pendulum_height();

    let seq = ContactSequence::new(vec![ContactPhase::load_bearing(
        0.0,
        1.0,
        cop(0.1, 0.0),
        cop(0.1, 0.0),
    )]);
    planner
        .solve_for_trajectory(&seq, &Vector3::zeros(), &Vector3::zeros())
        .unwrap();

    // CoM starts at the origin, at rest.
    let initial = planner.evaluate(0, 0.0).unwrap();
    assert_relative_eq!(initial.com_position, Vector3::zeros(), epsilon = 1e-7);
    assert_relative_eq!(initial.com_velocity, Vector3::zeros(), epsilon = 1e-7);

    // The DCM lands on the stationary VRP at the end of the phase.
    let terminal = planner.evaluate(0, 1.0).unwrap();
    assert_relative_eq!(
        terminal.dcm_position,
        Vector3::new(0.1, 0.0, height),
        epsilon = 1e-7
    );

    assert_trajectory_properties(&planner, &seq);
}

// ---------------------------------------------------------------------------
// Scenario B: three-phase sequence with a VRP jump
// ---------------------------------------------------------------------------

#[test]
fn scenario_b_three_phase_walk() {
    let mut planner = test_planner();
    let height = pendulum_height();

    let seq = ContactSequence::new(vec![
        ContactPhase::load_bearing(0.0, 0.4, cop(0.0, 0.05), cop(0.05, 0.08)),
        // Single support: the VRP jumps onto the stance foot.
        ContactPhase::load_bearing(0.4, 0.8, cop(0.15, -0.08), cop(0.15, -0.08)),
        ContactPhase::load_bearing(0.8, 1.2, cop(0.25, 0.0), cop(0.25, 0.0)),
    ]);
    let start = Vector3::new(0.0, 0.0, height);
    let velocity = Vector3::new(0.15, 0.0, 0.0);
    planner.solve_for_trajectory(&seq, &start, &velocity).unwrap();

    let initial = planner.evaluate(0, 0.0).unwrap();
    assert_relative_eq!(initial.com_position, start, epsilon = 1e-7);
    assert_relative_eq!(initial.com_velocity, velocity, epsilon = 1e-7);

    assert_trajectory_properties(&planner, &seq);

    // Terminal DCM equals the last end waypoint.
    let terminal = planner.evaluate(2, 0.4).unwrap();
    assert_relative_eq!(
        terminal.dcm_position,
        Vector3::new(0.25, 0.0, height),
        epsilon = 1e-7
    );

    // VRP segments reproduce the input pressure-centroid plan, lifted by the
    // pendulum height.
    let segments = planner.vrp_trajectories().unwrap();
    assert_eq!(segments.len(), 3);
    let lift = Vector3::new(0.0, 0.0, height);
    assert_relative_eq!(segments[0].start, cop(0.0, 0.05) + lift, epsilon = 1e-9);
    assert_relative_eq!(segments[0].end, cop(0.05, 0.08) + lift, epsilon = 1e-9);
    assert_relative_eq!(segments[1].start, cop(0.15, -0.08) + lift, epsilon = 1e-9);
    assert_relative_eq!(segments[1].end, cop(0.15, -0.08) + lift, epsilon = 1e-9);
    assert_relative_eq!(segments[2].end, cop(0.25, 0.0) + lift, epsilon = 1e-9);
    for segment in &segments {
        assert_relative_eq!(segment.duration, 0.4, epsilon = 1e-12);
    }
}

// ---------------------------------------------------------------------------
// Scenario C: degenerate phase must fail loudly
// ---------------------------------------------------------------------------

#[test]
fn scenario_c_degenerate_phase_fails_explicitly() {
    let mut planner = test_planner();
    let height = pendulum_height();

    // Establish a good solution first.
    let good = ContactSequence::new(vec![ContactPhase::load_bearing(
        0.0,
        0.8,
        cop(0.0, 0.0),
        cop(0.0, 0.0),
    )]);
    let start = Vector3::new(0.0, 0.0, height);
    planner
        .solve_for_trajectory(&good, &start, &Vector3::zeros())
        .unwrap();

    let degenerate = ContactSequence::new(vec![
        ContactPhase::load_bearing(0.0, 0.4, cop(0.0, 0.0), cop(0.0, 0.0)),
        ContactPhase::load_bearing(0.4, 0.4, cop(0.1, 0.0), cop(0.1, 0.0)),
        ContactPhase::load_bearing(0.4, 0.8, cop(0.2, 0.0), cop(0.2, 0.0)),
    ]);
    let err = planner
        .solve_for_trajectory(&degenerate, &start, &Vector3::zeros())
        .unwrap_err();
    assert!(matches!(err, BallastError::Validation(_)));

    // The previous solution survives and stays finite.
    let state = planner.evaluate(0, 0.4).unwrap();
    assert!(state.com_position.iter().all(|c| c.is_finite()));
}

// ---------------------------------------------------------------------------
// Scenario D: ballistic hop
// ---------------------------------------------------------------------------

#[test]
fn scenario_d_flight_phase_is_ballistic() {
    let mut planner = test_planner();
    let height = pendulum_height();

    let seq = hop_sequence(0.4, 0.1, cop(0.0, 0.0), cop(0.4, 0.0));
    let start = Vector3::new(0.0, 0.0, height);
    planner
        .solve_for_trajectory(&seq, &start, &Vector3::zeros())
        .unwrap();

    assert_trajectory_properties(&planner, &seq);

    // Vertical acceleration is -g throughout the flight phase.
    for k in 0..=10 {
        let t = 0.1 * f64::from(k) / 10.0;
        let state = planner.evaluate(1, t).unwrap();
        assert_relative_eq!(
            state.com_acceleration,
            Vector3::new(0.0, 0.0, -GRAVITY),
            epsilon = 1e-6
        );
    }

    // Jerk vanishes at both flight boundaries (central finite difference on
    // the evaluated acceleration; evaluation extrapolates across the
    // boundary on the same segment).
    let fd = 1e-5;
    for t in [0.0, 0.1] {
        let before = planner.evaluate(1, t - fd).unwrap();
        let after = planner.evaluate(1, t + fd).unwrap();
        let jerk = (after.com_acceleration - before.com_acceleration) / (2.0 * fd);
        assert!(jerk.norm() < 1e-3, "flight boundary jerk {jerk:?}");
    }
}

// ---------------------------------------------------------------------------
// Longer walks and determinism
// ---------------------------------------------------------------------------

#[test]
fn multi_step_walk_properties() {
    let mut planner = test_planner();
    let height = pendulum_height();

    let seq = walk_sequence(4, 0.25, 0.2, 0.2, 0.5);
    let start = Vector3::new(0.0, 0.0, height);
    let velocity = Vector3::new(0.1, 0.0, 0.0);
    planner.solve_for_trajectory(&seq, &start, &velocity).unwrap();

    let initial = planner.evaluate(0, 0.0).unwrap();
    assert_relative_eq!(initial.com_position, start, epsilon = 1e-7);
    assert_relative_eq!(initial.com_velocity, velocity, epsilon = 1e-7);

    assert_trajectory_properties(&planner, &seq);

    // The walk ends at rest over the final centroid: DCM on the waypoint.
    let last = seq.len() - 1;
    let terminal = planner
        .evaluate(last, seq.phases()[last].duration())
        .unwrap();
    assert_relative_eq!(
        terminal.dcm_position,
        Vector3::new(1.0, 0.0, height),
        epsilon = 1e-6
    );
}

#[test]
fn evaluation_is_bit_identical() {
    let mut planner = test_planner();
    let height = pendulum_height();

    let seq = walk_sequence(2, 0.25, 0.2, 0.2, 0.5);
    planner
        .solve_for_trajectory(&seq, &Vector3::new(0.0, 0.0, height), &Vector3::zeros())
        .unwrap();

    let a = planner.evaluate(1, 0.123_456).unwrap();
    let b = planner.evaluate(1, 0.123_456).unwrap();
    assert_eq!(a, b);
}

#[test]
fn randomized_sequences_uphold_invariants() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let height = pendulum_height();

    for trial in 0..25 {
        let num_phases = rng.gen_range(2..=6);
        let mut phases = Vec::with_capacity(num_phases);
        let mut time = 0.0;
        let mut centroid = cop(rng.gen_range(-0.1..0.1), rng.gen_range(-0.1..0.1));

        for phase_id in 0..num_phases {
            let duration = rng.gen_range(0.25..0.8);
            // Occasional short flight phase, never first or last.
            let is_flight =
                phase_id > 0 && phase_id + 1 < num_phases && rng.gen_bool(0.2);
            if is_flight {
                let flight_duration = rng.gen_range(0.05..0.15);
                phases.push(ContactPhase::flight(time, time + flight_duration));
                time += flight_duration;
            } else {
                let next = centroid + cop(rng.gen_range(-0.2..0.2), rng.gen_range(-0.15..0.15));
                phases.push(ContactPhase::load_bearing(
                    time,
                    time + duration,
                    centroid,
                    next,
                ));
                time += duration;
                centroid = next;
            }
        }
        let seq = ContactSequence::new(phases);
        seq.validate().unwrap();

        let mut planner = test_planner();
        let start = Vector3::new(
            rng.gen_range(-0.05..0.05),
            rng.gen_range(-0.05..0.05),
            height + rng.gen_range(-0.02..0.02),
        );
        let velocity = Vector3::new(
            rng.gen_range(-0.2..0.2),
            rng.gen_range(-0.2..0.2),
            rng.gen_range(-0.05..0.05),
        );
        planner
            .solve_for_trajectory(&seq, &start, &velocity)
            .unwrap_or_else(|err| panic!("trial {trial} failed to solve: {err}"));

        let initial = planner.evaluate(0, 0.0).unwrap();
        assert_relative_eq!(initial.com_position, start, epsilon = 1e-6);
        assert_relative_eq!(initial.com_velocity, velocity, epsilon = 1e-6);

        assert_trajectory_properties(&planner, &seq);
    }
}
