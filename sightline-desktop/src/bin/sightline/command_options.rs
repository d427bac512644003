//! Command line option parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use sightline_desktop::SettingsArgs;
use sightline_desktop::logging::LoggingArgs;
use sightline_desktop::trigger::Trigger;

#[derive(Clone, Debug, Parser)]
#[command(
    name = "sightline", author, about, version,
    help_template = "\
{name} {version}
{author}
{about-with-newline}
{usage-heading}
    {usage}

{all-args}{after-help}",
)]
pub(crate) struct SightlineArgs {
    /// Scene file (JSON) describing the camera and the meshes to capture.
    #[arg(value_name = "SCENE")]
    pub(crate) scene_file: PathBuf,

    /// Directory in which the output directories are created.
    #[arg(long = "output-dir", short = 'o', value_name = "DIR", default_value = ".")]
    pub(crate) output_dir: PathBuf,

    /// What starts each capture.
    #[arg(long = "trigger", short = 't', value_enum, default_value_t = Trigger::Stdin)]
    pub(crate) trigger: Trigger,

    /// Seconds between checks of the scene file in 'watch' mode.
    #[arg(
        long = "interval",
        value_name = "SECONDS",
        default_value = "1.0",
        value_parser = parse_interval,
    )]
    pub(crate) interval: Duration,

    /// Exit after this many captures in 'stdin' or 'watch' mode.
    #[arg(long = "max-captures", value_name = "N")]
    pub(crate) max_captures: Option<usize>,

    #[command(flatten)]
    pub(crate) logging: LoggingArgs,

    #[command(flatten)]
    pub(crate) settings: SettingsArgs,
}

fn parse_interval(arg: &str) -> Result<Duration, anyhow::Error> {
    let seconds: f64 = arg.parse()?;
    if seconds <= 0.0 {
        anyhow::bail!("must be positive");
    }
    Ok(Duration::try_from_secs_f64(seconds)?)
}
