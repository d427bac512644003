//! Binary for capturing vertex visibility from scene files.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

use std::io::Write as _;

use clap::Parser as _;

use sightline_desktop::trigger::{self, Trigger};
use sightline_desktop::{CaptureSession, SceneSource, logging};

mod command_options;
use command_options::SightlineArgs;

fn main() -> Result<(), anyhow::Error> {
    // Destructure as a check that we're using/skipping all the args
    let SightlineArgs {
        scene_file,
        output_dir,
        trigger,
        interval,
        max_captures,
        logging: logging_args,
        settings: settings_args,
    } = SightlineArgs::parse();

    logging::install(&logging_args)?;

    let settings = settings_args.build_settings()?;
    let mut session = CaptureSession::new(settings, SceneSource::File(scene_file), output_dir);

    match trigger {
        Trigger::Once => {
            let outcome = session.capture_now()?;
            // Print the written paths for the benefit of scripts.
            let mut stdout = std::io::stdout().lock();
            for path in outcome.written? {
                writeln!(stdout, "{}", path.display())?;
            }
        }
        Trigger::Stdin => {
            log::info!("press Enter to capture; end input to exit");
            let count =
                trigger::run_line_triggers(&mut session, std::io::stdin().lock(), max_captures)?;
            log::debug!("exiting after {count} captures");
        }
        Trigger::Watch => {
            trigger::run_watch(&mut session, interval, max_captures);
        }
    }
    Ok(())
}
