//! Closed-form CoM trajectory planner for legged locomotion.
//!
//! Given a sequence of contact phases (load-bearing with a straight-line
//! pressure-centroid path, or flight) and the current CoM state, this crate
//! solves the boundary-value problem of the linear inverted pendulum in
//! closed form and exposes the CoM, DCM (Divergent Component of Motion),
//! VRP (Virtual Repellent Point), and eCMP reference trajectories:
//!
//! 1. **Index Handler** — assigns coefficient blocks and VRP-waypoint slots
//! 2. **Constraint Basis** — per-boundary constraint-row generators
//! 3. **Assembler** — walks the sequence once and builds the square system
//! 4. **Solver** — one dense LU factorization, back-substituted per axis
//! 5. **Evaluator** — closed-form state reconstruction at query time
//!
//! # Trajectory model
//!
//! Each phase carries six coefficients per axis:
//!
//! ```text
//! x(t) = c0 e^{ωt} + c1 e^{-ωt} + c2 t³ + c3 t² + c4 t + c5
//! ```
//!
//! The exponential pair spans the pendulum modes (ω = sqrt(g/h)); the cubic
//! tail tracks the moving pressure centroid. The DCM is `x + ẋ/ω` and the
//! VRP is `x − ẍ/ω²`, so both come out of the same coefficients.
//!
//! The solve runs once per replan; evaluation is allocation-free and safe
//! for concurrent readers once a solution has been published.

pub mod assembler;
pub mod basis;
pub mod evaluator;
pub mod indexing;
pub mod planner;
pub mod solver;

pub use assembler::{AssembledSystem, assemble};
pub use evaluator::TrajectoryState;
pub use indexing::IndexLayout;
pub use planner::{ComTrajectoryPlanner, CornerPoint, Solution, VrpSegment};
pub use solver::solve_axis_coefficients;
