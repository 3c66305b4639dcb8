use anyhow::Result;

mod cipher;
mod cli;
mod dialogue;
mod focus;
mod footsteps;
mod fx;
mod runtime;
mod scene;
mod terminal;

use runtime::{run_session_demo, run_walk_demo, write_json, EventRecorder};

fn main() -> Result<()> {
    env_logger::init();
    let args = cli::parse()?;

    let mut recorder = EventRecorder::new(args.verbose);

    if args.walk_demo {
        let steps = run_walk_demo(args.seed, &mut recorder);
        println!("walk demo: {} footsteps (seed {})", steps.len(), args.seed);
        if let Some(path) = args.footstep_log_json.as_ref() {
            write_json(&steps, path, "footstep log")?;
        }
    }

    if args.session_demo {
        run_session_demo(args.seed, &mut recorder);
        println!("session demo complete (seed {})", args.seed);
    }

    if let Some(path) = args.event_log_json.as_ref() {
        let log = recorder.into_log();
        write_json(&log, path, "event log")?;
    }

    Ok(())
}
