//! Planner façade: validate, assemble, solve, publish, query.
//!
//! `ComTrajectoryPlanner` owns the configuration and the last good
//! [`Solution`]. A failed solve (invalid sequence, singular system) leaves
//! the previous solution untouched, so readers keep stale-but-valid
//! references instead of undefined ones.

use std::time::Instant;

use ballast_core::config::PlannerConfig;
use ballast_core::contact::{
    ContactSequence, ContactState, split_for_velocity_continuity,
};
use ballast_core::error::{BallastError, ConfigError, QueryError};
use nalgebra::{DVector, Vector3};
use tracing::debug;

use crate::assembler::assemble;
use crate::evaluator::{TrajectoryState, evaluate_segment};
use crate::indexing::IndexLayout;
use crate::solver::solve_axis_coefficients;

/// One linear VRP reference segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VrpSegment {
    pub start: Vector3<f64>,
    pub end: Vector3<f64>,
    pub duration: f64,
}

/// Boundary sample for visualization.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerPoint {
    /// Absolute time of the boundary.
    pub time: f64,
    pub com_position: Vector3<f64>,
    pub dcm_position: Vector3<f64>,
    pub vrp_position: Vector3<f64>,
}

/// Published result of one successful solve.
///
/// Internal segments may outnumber caller-visible phases by one when the
/// velocity-continuity sub-phase is active; all public entry points speak
/// the caller's phase ids.
#[derive(Clone, Debug)]
pub struct Solution {
    input_phase_count: usize,
    segments: ContactSequence,
    split_duration: Option<f64>,
    layout: IndexLayout,
    coefficients: [DVector<f64>; 3],
    axis_waypoints: [DVector<f64>; 3],
    omega: f64,
    gravity: f64,
    final_dcm_position: Vector3<f64>,
}

impl Solution {
    /// Terminal DCM target satisfied by this solution.
    pub fn final_dcm_position(&self) -> Vector3<f64> {
        self.final_dcm_position
    }

    /// Natural frequency the solve used.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Number of caller-visible phases.
    pub fn num_phases(&self) -> usize {
        self.input_phase_count
    }

    /// Number of internal trajectory segments (phases plus the continuity
    /// sub-phase when active).
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Solved coefficient vector for one axis (`6 × num_segments` entries).
    pub fn axis_coefficients(&self, axis: usize) -> &DVector<f64> {
        &self.coefficients[axis]
    }

    /// Duration of the continuity sub-phase, when one was inserted.
    pub fn split_duration(&self) -> Option<f64> {
        self.split_duration
    }

    /// First internal segment backing a caller phase.
    fn first_segment_of(&self, phase: usize) -> usize {
        if self.split_duration.is_some() && phase > 0 {
            phase + 1
        } else {
            phase
        }
    }

    /// Last internal segment backing a caller phase.
    fn last_segment_of(&self, phase: usize) -> usize {
        match self.split_duration {
            Some(_) if phase == 0 => 1,
            Some(_) => phase + 1,
            None => phase,
        }
    }

    /// Map a caller-facing (phase, time) query onto an internal segment.
    fn locate(&self, phase: usize, time_in_phase: f64) -> (usize, f64) {
        match self.split_duration {
            Some(split) if phase == 0 => {
                if time_in_phase < split {
                    (0, time_in_phase)
                } else {
                    (1, time_in_phase - split)
                }
            }
            Some(_) => (phase + 1, time_in_phase),
            None => (phase, time_in_phase),
        }
    }

    /// Absolute time interval of a caller phase.
    fn phase_interval(&self, phase: usize) -> (f64, f64) {
        let first = &self.segments.phases()[self.first_segment_of(phase)];
        let last = &self.segments.phases()[self.last_segment_of(phase)];
        (first.interval.start, last.interval.end)
    }

    fn evaluate_internal(&self, segment: usize, time_in_segment: f64) -> TrajectoryState {
        evaluate_segment(
            &self.coefficients,
            self.layout.coefficient_start(segment),
            self.omega,
            self.gravity,
            time_in_segment,
        )
    }

    fn waypoint(&self, slot: usize) -> Vector3<f64> {
        Vector3::new(
            self.axis_waypoints[0][slot],
            self.axis_waypoints[1][slot],
            self.axis_waypoints[2][slot],
        )
    }
}

/// Closed-form CoM/DCM/VRP trajectory planner.
#[derive(Debug)]
pub struct ComTrajectoryPlanner {
    config: PlannerConfig,
    omega: f64,
    solution: Option<Solution>,
}

impl ComTrajectoryPlanner {
    /// Create a planner from a validated configuration.
    pub fn new(config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let omega = config.omega();
        Ok(Self {
            config,
            omega,
            solution: None,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Natural frequency in rad/s.
    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Solve the boundary-value problem for one contact sequence.
    ///
    /// `com_position`/`com_velocity` are the measured CoM state at the start
    /// of the first phase. On success, subsequent queries reflect the new
    /// solution; on failure the previous solution is left untouched.
    pub fn solve_for_trajectory(
        &mut self,
        sequence: &ContactSequence,
        com_position: &Vector3<f64>,
        com_velocity: &Vector3<f64>,
    ) -> Result<(), BallastError> {
        let start = Instant::now();
        sequence.validate()?;

        let (segments, split_duration) = if self.config.maintain_initial_velocity {
            split_for_velocity_continuity(sequence, self.config.velocity_split_duration)
        } else {
            (sequence.clone(), None)
        };

        let layout = IndexLayout::new(&segments);
        let system = assemble(
            &segments,
            &layout,
            com_position,
            split_duration.is_some().then_some(com_velocity),
            self.omega,
            self.config.gravity,
        );
        let coefficients = solve_axis_coefficients(&system)?;

        let final_slot = layout
            .waypoint_end_index(segments.len() - 1)
            .expect("validated sequence ends load-bearing");
        let final_dcm_position = Vector3::new(
            system.axis_waypoints[0][final_slot],
            system.axis_waypoints[1][final_slot],
            system.axis_waypoints[2][final_slot],
        );

        self.solution = Some(Solution {
            input_phase_count: sequence.len(),
            segments,
            split_duration,
            layout,
            coefficients,
            axis_waypoints: system.axis_waypoints,
            omega: self.omega,
            gravity: self.config.gravity,
            final_dcm_position,
        });

        debug!(
            phases = sequence.len(),
            elapsed_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX),
            "trajectory solve complete"
        );

        Ok(())
    }

    /// Evaluate the reference state within a phase of the input sequence.
    ///
    /// `time_in_phase` is phase-local; values outside `[0, duration]`
    /// extrapolate and are the caller's responsibility to clamp.
    pub fn evaluate(
        &self,
        phase: usize,
        time_in_phase: f64,
    ) -> Result<TrajectoryState, QueryError> {
        let solution = self.solution.as_ref().ok_or(QueryError::NoSolution)?;
        if phase >= solution.input_phase_count {
            return Err(QueryError::PhaseOutOfRange {
                phase,
                num_phases: solution.input_phase_count,
            });
        }
        let (segment, local_time) = solution.locate(phase, time_in_phase);
        Ok(solution.evaluate_internal(segment, local_time))
    }

    /// Linear VRP reference segments, one per input phase.
    ///
    /// Load-bearing phases report their waypoint endpoints; flight phases
    /// report the evaluated VRP at their boundaries.
    pub fn vrp_trajectories(&self) -> Result<Vec<VrpSegment>, QueryError> {
        let solution = self.solution.as_ref().ok_or(QueryError::NoSolution)?;
        let mut vrp_segments = Vec::with_capacity(solution.input_phase_count);

        for phase in 0..solution.input_phase_count {
            let first = solution.first_segment_of(phase);
            let last = solution.last_segment_of(phase);
            let (start_time, end_time) = solution.phase_interval(phase);
            let duration = end_time - start_time;

            let segment = match solution.segments.phases()[first].state {
                ContactState::LoadBearing { .. } => {
                    let start_slot = solution
                        .layout
                        .waypoint_start_index(first)
                        .expect("load-bearing");
                    let end_slot = solution
                        .layout
                        .waypoint_end_index(last)
                        .expect("load-bearing");
                    VrpSegment {
                        start: solution.waypoint(start_slot),
                        end: solution.waypoint(end_slot),
                        duration,
                    }
                }
                ContactState::Flight => {
                    let segment_duration = solution.segments.phases()[first].duration();
                    VrpSegment {
                        start: solution.evaluate_internal(first, 0.0).vrp_position,
                        end: solution
                            .evaluate_internal(first, segment_duration)
                            .vrp_position,
                        duration,
                    }
                }
            };
            vrp_segments.push(segment);
        }

        Ok(vrp_segments)
    }

    /// Reference state sampled at every phase boundary (`num_phases + 1`
    /// entries). Visualization helper, off the control path.
    pub fn corner_points(&self) -> Result<Vec<CornerPoint>, QueryError> {
        let solution = self.solution.as_ref().ok_or(QueryError::NoSolution)?;
        let mut corners = Vec::with_capacity(solution.input_phase_count + 1);

        for phase in 0..solution.input_phase_count {
            let (start_time, _) = solution.phase_interval(phase);
            let state = solution.evaluate_internal(solution.first_segment_of(phase), 0.0);
            corners.push(CornerPoint {
                time: start_time,
                com_position: state.com_position,
                dcm_position: state.dcm_position,
                vrp_position: state.vrp_position,
            });
        }

        let last_phase = solution.input_phase_count - 1;
        let last_segment = solution.last_segment_of(last_phase);
        let (_, end_time) = solution.phase_interval(last_phase);
        let state = solution
            .evaluate_internal(last_segment, solution.segments.phases()[last_segment].duration());
        corners.push(CornerPoint {
            time: end_time,
            com_position: state.com_position,
            dcm_position: state.dcm_position,
            vrp_position: state.vrp_position,
        });

        Ok(corners)
    }

    /// Read-only access to the last published solution.
    pub fn last_solution(&self) -> Option<&Solution> {
        self.solution.as_ref()
    }
}
