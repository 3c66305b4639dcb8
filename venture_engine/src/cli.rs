use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Headless host that replays the scene's gameplay logic",
    version
)]
pub struct Args {
    /// Walk the demo route across the terrain and report footsteps
    #[arg(long)]
    pub walk_demo: bool,

    /// Play a scripted session at the desk computer (login, cipher, dialogue)
    #[arg(long)]
    pub session_demo: bool,

    /// Seed for the demo RNG so repeated runs are identical
    #[arg(long, default_value_t = 7)]
    pub seed: u64,

    /// Path to write the footstep events as JSON (requires --walk-demo)
    #[arg(long)]
    pub footstep_log_json: Option<PathBuf>,

    /// Path to write the ordered demo event log as JSON
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Echo every event to stderr as it is recorded
    #[arg(long)]
    pub verbose: bool,
}

pub fn parse() -> Result<Args> {
    let args = Args::parse();

    if !args.walk_demo && !args.session_demo {
        bail!("nothing to do: pass --walk-demo and/or --session-demo");
    }
    if args.footstep_log_json.is_some() && !args.walk_demo {
        eprintln!("[venture_engine] warning: --footstep-log-json is ignored without --walk-demo");
    }

    Ok(args)
}
