// ballast-core: contact-sequence model, configuration, and errors for the
// ballast CoM trajectory planner.

pub mod config;
pub mod contact;
pub mod error;

pub use config::PlannerConfig;
pub use contact::{
    ContactPhase, ContactSequence, ContactState, TimeInterval, split_for_velocity_continuity,
};
pub use error::{BallastError, ConfigError, QueryError, SolveError, ValidationError};
