use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mdbias_host::{keys, CmdArg, KERNEL_ENV_VAR};
use serde::Serialize;

use super::open_library;

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Shared object of the sampling library; queries its API version.
    #[arg(long)]
    pub kernel: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct VersionInfo {
    version: String,
    api_version: i32,
}

pub fn run(args: &VersionArgs) -> Result<(), Box<dyn Error>> {
    if args.kernel.is_none() && std::env::var_os(KERNEL_ENV_VAR).is_none() {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }
    let library = open_library(args.kernel.as_deref())?;
    let mut session = library.open()?;
    let mut api_version = 0;
    session.cmd(keys::GET_API_VERSION, CmdArg::IntOut(&mut api_version))?;
    let info = VersionInfo {
        version: env!("CARGO_PKG_VERSION").into(),
        api_version,
    };
    println!("{}", serde_json::to_string(&info)?);
    Ok(())
}
