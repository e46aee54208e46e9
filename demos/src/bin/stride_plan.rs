//! Plan a straight-line walk and print the sampled reference trajectory.
//!
//! Output is a whitespace-separated table (time, phase, CoM, DCM, VRP)
//! suitable for piping into a plotting tool.

use ballast_core::config::PlannerConfig;
use ballast_demos::walk_sequence;
use ballast_planner::ComTrajectoryPlanner;
use clap::Parser;
use nalgebra::Vector3;

#[derive(Parser, Debug)]
#[command(name = "stride_plan", about = "Sample a planned CoM walk trajectory")]
struct Args {
    /// Number of steps to plan.
    #[arg(long, default_value_t = 4)]
    steps: usize,

    /// Forward travel per step in meters.
    #[arg(long, default_value_t = 0.25)]
    step_length: f64,

    /// Lateral distance between footholds in meters.
    #[arg(long, default_value_t = 0.2)]
    stance_width: f64,

    /// Duration of each weight-shift phase in seconds.
    #[arg(long, default_value_t = 0.2)]
    shift_duration: f64,

    /// Duration of each single-support phase in seconds.
    #[arg(long, default_value_t = 0.5)]
    support_duration: f64,

    /// Sampling interval in seconds.
    #[arg(long, default_value_t = 0.02)]
    sample_dt: f64,

    /// Optional TOML planner configuration file.
    #[arg(long)]
    config: Option<std::path::PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PlannerConfig::from_toml_file(path)?,
        None => PlannerConfig::default(),
    };
    let height = config.pendulum_height();

    let sequence = walk_sequence(
        args.steps,
        args.step_length,
        args.stance_width,
        args.shift_duration,
        args.support_duration,
    );

    let mut planner = ComTrajectoryPlanner::new(config)?;
    let start = Vector3::new(0.0, 0.0, height);
    planner.solve_for_trajectory(&sequence, &start, &Vector3::zeros())?;

    println!(
        "{:>8} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "time", "phase", "com_x", "com_y", "com_z", "dcm_x", "dcm_y", "dcm_z", "vrp_x", "vrp_y",
        "vrp_z"
    );

    for (phase_id, phase) in sequence.phases().iter().enumerate() {
        let duration = phase.duration();
        let mut t = 0.0;
        while t < duration {
            print_sample(&planner, phase_id, phase.interval.start + t, t)?;
            t += args.sample_dt;
        }
        // Close each phase on its exact boundary.
        print_sample(&planner, phase_id, phase.interval.end, duration)?;
    }

    Ok(())
}

fn print_sample(
    planner: &ComTrajectoryPlanner,
    phase_id: usize,
    absolute_time: f64,
    time_in_phase: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = planner.evaluate(phase_id, time_in_phase)?;
    println!(
        "{:8.3} {:5} {:9.4} {:9.4} {:9.4} {:9.4} {:9.4} {:9.4} {:9.4} {:9.4} {:9.4}",
        absolute_time,
        phase_id,
        state.com_position.x,
        state.com_position.y,
        state.com_position.z,
        state.dcm_position.x,
        state.dcm_position.y,
        state.dcm_position.z,
        state.vrp_position.x,
        state.vrp_position.y,
        state.vrp_position.z,
    );
    Ok(())
}
