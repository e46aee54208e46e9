use thiserror::Error;

/// Top-level error type for the ballast planner.
#[derive(Debug, Error)]
pub enum BallastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Solve error: {0}")]
    Solve(#[from] SolveError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid gravity: {0} (must be finite and > 0)")]
    InvalidGravity(f64),

    #[error("Invalid nominal CoM height: {0} (must be finite and > 0)")]
    InvalidComHeight(f64),

    #[error("Invalid natural frequency: {0} (must be finite and > 0)")]
    InvalidNaturalFrequency(f64),

    #[error("Invalid continuity sub-phase duration: {0} (must be finite and > 0)")]
    InvalidSplitDuration(f64),
}

/// Contact-sequence validation errors.
///
/// Copy + static layout for cheap propagation in the planning loop.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ValidationError {
    #[error("Contact sequence is empty")]
    EmptySequence,

    #[error("Phase {phase} has a non-finite time interval")]
    NonFiniteInterval { phase: usize },

    #[error("Phase {phase} is degenerate: duration {duration} below minimum")]
    DegeneratePhase { phase: usize, duration: f64 },

    #[error("Phase {phase} does not start where the previous phase ends (gap {gap})")]
    NonContiguous { phase: usize, gap: f64 },

    #[error("Phase {phase} has non-finite pressure-centroid coordinates")]
    NonFiniteCop { phase: usize },

    #[error("Final phase is a flight phase; the stopping phase must be load-bearing")]
    TerminalFlightPhase,
}

/// Linear-solve failures.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SolveError {
    #[error("Constraint matrix is singular or ill-conditioned (rcond {rcond:.3e})")]
    SingularSystem { rcond: f64 },

    #[error("Solved coefficients are non-finite for axis {axis}")]
    NonFiniteSolution { axis: usize },
}

/// Trajectory-query failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Phase id {phase} out of range: sequence has {num_phases} phases")]
    PhaseOutOfRange { phase: usize, num_phases: usize },

    #[error("No trajectory solution available; call solve_for_trajectory first")]
    NoSolution,
}
