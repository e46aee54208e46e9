//! Shared setup helpers for the ballast demos and integration tests.

use ballast_core::contact::{ContactPhase, ContactSequence};
use nalgebra::Vector3;

/// Build a straight-line walk: alternating single-support steps bracketed by
/// double-support weight shifts, ending in a stopping stance.
///
/// Feet alternate laterally at `±stance_width/2`; each step advances the
/// pressure centroid by `step_length`. Every phase is load-bearing (no
/// flight), which is the normal walking regime.
pub fn walk_sequence(
    steps: usize,
    step_length: f64,
    stance_width: f64,
    shift_duration: f64,
    support_duration: f64,
) -> ContactSequence {
    let mut phases = Vec::new();
    let mut time = 0.0;
    let mut forward = 0.0;
    let half_width = 0.5 * stance_width;

    // Start centered between the feet.
    let mut previous = Vector3::new(0.0, 0.0, 0.0);

    for step in 0..steps {
        let lateral = if step % 2 == 0 { half_width } else { -half_width };
        forward += step_length;
        let foothold = Vector3::new(forward, lateral, 0.0);

        // Weight shift: pressure centroid travels to the new foothold.
        phases.push(ContactPhase::load_bearing(
            time,
            time + shift_duration,
            previous,
            foothold,
        ));
        time += shift_duration;

        // Single support over the foothold.
        phases.push(ContactPhase::load_bearing(
            time,
            time + support_duration,
            foothold,
            foothold,
        ));
        time += support_duration;

        previous = foothold;
    }

    // Stopping stance: bring the centroid back between the feet and hold.
    let stop = Vector3::new(forward, 0.0, 0.0);
    phases.push(ContactPhase::load_bearing(
        time,
        time + shift_duration,
        previous,
        stop,
    ));
    time += shift_duration;
    phases.push(ContactPhase::load_bearing(
        time,
        time + support_duration,
        stop,
        stop,
    ));

    ContactSequence::new(phases)
}

/// Build a running stride with a ballistic hop between two stance phases.
pub fn hop_sequence(
    stance_duration: f64,
    flight_duration: f64,
    takeoff_cop: Vector3<f64>,
    landing_cop: Vector3<f64>,
) -> ContactSequence {
    let t1 = stance_duration;
    let t2 = t1 + flight_duration;
    let t3 = t2 + stance_duration;
    ContactSequence::new(vec![
        ContactPhase::load_bearing(0.0, t1, takeoff_cop, takeoff_cop),
        ContactPhase::flight(t1, t2),
        ContactPhase::load_bearing(t2, t3, landing_cop, landing_cop),
    ])
}
