//! Contact-phase sequence model.
//!
//! A walking plan is an ordered list of phases, each either load-bearing
//! (ground reaction force through a straight-line pressure-centroid path) or
//! a flight/ballistic interval. The sequence is produced by an external gait
//! sequencer and treated as immutable input for the duration of one solve.

use nalgebra::Vector3;

use crate::error::ValidationError;

/// Durations below this are rejected as degenerate; they collapse boundary
/// constraint rows into linear dependence.
pub const MIN_PHASE_DURATION: f64 = 1.0e-4;

/// Maximum allowed gap/overlap between consecutive phase intervals.
pub const CONTIGUITY_TOLERANCE: f64 = 1.0e-5;

/// Half-open time interval `[start, end)` in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeInterval {
    pub start: f64,
    pub end: f64,
}

impl TimeInterval {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }
}

/// Contact condition during a phase.
///
/// The two variants drive different constraint-row patterns, so the planner
/// dispatches on this exhaustively rather than on a boolean flag.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactState {
    /// Ground contact with a straight-line pressure-centroid path from
    /// `cop_start` to `cop_end` over the phase.
    LoadBearing {
        cop_start: Vector3<f64>,
        cop_end: Vector3<f64>,
    },
    /// Ballistic phase: no ground reaction force, CoM in free fall.
    Flight,
}

impl ContactState {
    pub const fn is_load_bearing(&self) -> bool {
        matches!(self, Self::LoadBearing { .. })
    }
}

/// One phase of a contact plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactPhase {
    pub interval: TimeInterval,
    pub state: ContactState,
}

impl ContactPhase {
    /// Load-bearing phase with a linear pressure-centroid path.
    pub const fn load_bearing(
        start: f64,
        end: f64,
        cop_start: Vector3<f64>,
        cop_end: Vector3<f64>,
    ) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            state: ContactState::LoadBearing { cop_start, cop_end },
        }
    }

    /// Flight phase (no contact).
    pub const fn flight(start: f64, end: f64) -> Self {
        Self {
            interval: TimeInterval::new(start, end),
            state: ContactState::Flight,
        }
    }

    pub fn duration(&self) -> f64 {
        self.interval.duration()
    }
}

/// Ordered, contiguous list of contact phases.
///
/// The final phase is the stopping phase: its end pressure centroid supplies
/// the terminal DCM target, so it must be load-bearing.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactSequence {
    phases: Vec<ContactPhase>,
}

impl ContactSequence {
    pub fn new(phases: Vec<ContactPhase>) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &[ContactPhase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, phase: usize) -> Option<&ContactPhase> {
        self.phases.get(phase)
    }

    /// Check the sequence invariants before it is allowed anywhere near the
    /// linear system. No partial solve is attempted on invalid input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.phases.is_empty() {
            return Err(ValidationError::EmptySequence);
        }

        for (i, phase) in self.phases.iter().enumerate() {
            if !phase.interval.is_finite() {
                return Err(ValidationError::NonFiniteInterval { phase: i });
            }
            let duration = phase.duration();
            if duration < MIN_PHASE_DURATION {
                return Err(ValidationError::DegeneratePhase {
                    phase: i,
                    duration,
                });
            }
            if let ContactState::LoadBearing { cop_start, cop_end } = &phase.state {
                if !(cop_start.iter().all(|c| c.is_finite())
                    && cop_end.iter().all(|c| c.is_finite()))
                {
                    return Err(ValidationError::NonFiniteCop { phase: i });
                }
            }
            if i > 0 {
                let gap = phase.interval.start - self.phases[i - 1].interval.end;
                if gap.abs() > CONTIGUITY_TOLERANCE {
                    return Err(ValidationError::NonContiguous { phase: i, gap });
                }
            }
        }

        let last = self.phases.last().expect("checked non-empty");
        if !last.state.is_load_bearing() {
            return Err(ValidationError::TerminalFlightPhase);
        }

        Ok(())
    }
}

/// Pre-process a sequence so the initial CoM velocity can be constrained.
///
/// A single 6-coefficient block cannot take both an initial position and an
/// initial velocity row on top of its dynamics rows, so the first phase is
/// split into a short sub-phase plus remainder. The sub-phase duration is
/// `min(sub_duration, T0 / 2)` and its pressure-centroid endpoints are
/// interpolated along the original line, keeping the reference path intact.
///
/// Returns the augmented sequence and the sub-phase duration. A flight first
/// phase is returned unchanged (`None`): ballistic motion admits no extra
/// velocity constraint.
pub fn split_for_velocity_continuity(
    sequence: &ContactSequence,
    sub_duration: f64,
) -> (ContactSequence, Option<f64>) {
    let first = match sequence.phases.first() {
        Some(phase) => *phase,
        None => return (sequence.clone(), None),
    };

    let (cop_start, cop_end) = match first.state {
        ContactState::LoadBearing { cop_start, cop_end } => (cop_start, cop_end),
        ContactState::Flight => return (sequence.clone(), None),
    };

    let total = first.duration();
    let split = sub_duration.min(0.5 * total);
    let knot_time = first.interval.start + split;
    let cop_mid = cop_start + (cop_end - cop_start) * (split / total);

    let mut phases = Vec::with_capacity(sequence.len() + 1);
    phases.push(ContactPhase::load_bearing(
        first.interval.start,
        knot_time,
        cop_start,
        cop_mid,
    ));
    phases.push(ContactPhase::load_bearing(
        knot_time,
        first.interval.end,
        cop_mid,
        cop_end,
    ));
    phases.extend_from_slice(&sequence.phases[1..]);

    (ContactSequence::new(phases), Some(split))
}
