use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use log::info;
use mdbias_core::Context;
use mdbias_force::{config_base_dir, load_force_config, CalcPlumedForceKernel};
use mdbias_reference::{LocalRuntime, ReferenceContext, SerialCommunicator};
use serde::Serialize;

use super::frames::FrameFile;
use super::open_library;

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// TOML force configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// JSON file with masses, optional charges and box, timestep and frames.
    #[arg(long)]
    pub frames: PathBuf,
    /// Shared object of the sampling library; defaults to `PLUMED_KERNEL`.
    #[arg(long)]
    pub kernel: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct FrameResult {
    step: i64,
    energy: f64,
}

pub fn run(args: &EvaluateArgs) -> Result<(), Box<dyn Error>> {
    let config = load_force_config(&args.config)?;
    let comm = Arc::new(SerialCommunicator::new());
    let force = config.into_force(&config_base_dir(&args.config), comm.clone(), comm)?;
    let input = FrameFile::load(&args.frames)?;
    let system = input.build_system();
    let mut context = ReferenceContext::new(&system, input.timestep);

    let library = open_library(args.kernel.as_deref())?;
    let runtime = LocalRuntime::new();
    let mut kernel = CalcPlumedForceKernel::initialize(
        &system,
        &force,
        context.step_size(),
        library.as_ref(),
        &runtime,
    )?;

    for (index, positions) in input.frames.into_iter().enumerate() {
        let step = i64::try_from(index)?;
        context.set_step_count(step);
        context.set_positions(positions)?;
        context.clear_forces();
        let energy = kernel.execute(&mut context, true, true)?;
        println!("{}", serde_json::to_string(&FrameResult { step, energy })?);
    }
    info!(
        "evaluated {} frames",
        kernel.last_step_index().map_or(0, |step| step + 1)
    );
    Ok(())
}
