//! gridtree - drill into related REST tables from the command line
//!
//! This is the binary entry point. All logic lives in the library.

use std::path::PathBuf;

use clap::Parser;

use gridtree::{run_headless, HeadlessOptions};
use gridtree_app::config::init_config_dir;
use gridtree_core::logging;

/// gridtree - lazily drillable grids over relational REST data
#[derive(Parser, Debug)]
#[command(name = "gridtree")]
#[command(about = "Lazily drillable grids over relational REST data", long_about = None)]
struct Args {
    /// Project directory holding .gridtree/config.toml
    #[arg(value_name = "PATH")]
    path: Option<PathBuf>,

    /// Profile from config.toml to use
    #[arg(long, short)]
    profile: Option<String>,

    /// Root endpoint to load (defaults to the profile's default_endpoint)
    #[arg(long, short)]
    endpoint: Option<String>,

    /// Write a default .gridtree/config.toml and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let project_path = args
        .path
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if args.init {
        init_config_dir(&project_path)?;
        eprintln!(
            "Wrote {}",
            project_path.join(".gridtree/config.toml").display()
        );
        return Ok(());
    }

    logging::init()?;

    run_headless(
        &project_path,
        HeadlessOptions {
            profile: args.profile,
            endpoint: args.endpoint,
        },
    )
    .await?;

    Ok(())
}
