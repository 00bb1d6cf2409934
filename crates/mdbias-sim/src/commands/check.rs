use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use mdbias_force::{config_base_dir, load_force_config, script_lines, validate_mass_override};
use mdbias_reference::SerialCommunicator;
use serde_json::json;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// TOML force configuration.
    #[arg(long)]
    pub config: PathBuf,
    /// Particle count of the target system.
    #[arg(long)]
    pub particles: usize,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let config = load_force_config(&args.config)?;
    let comm = Arc::new(SerialCommunicator::new());
    let force = config.into_force(&config_base_dir(&args.config), comm.clone(), comm)?;
    validate_mass_override(force.masses(), args.particles)?;
    let temperature = (force.temperature() >= 0.0).then(|| force.temperature());
    let summary = json!({
        "particles": args.particles,
        "script_lines": script_lines(force.script()).count(),
        "mass_override": !force.masses().is_empty(),
        "temperature": temperature,
        "restart": force.restart(),
        "md_engine": force.md_engine(),
    });
    println!("{summary}");
    Ok(())
}
