//! Logging to stderr.

use anyhow::Context as _;
use log::Log as _;

/// A [`clap::Args`] struct for options controlling log output to stderr.
#[derive(Clone, Debug, Default, clap::Args)]
#[expect(clippy::module_name_repetitions)]
pub struct LoggingArgs {
    /// Additional logging to stderr, including the decision made for each vertex.
    #[arg(long = "verbose", short = 'v', conflicts_with = "quiet")]
    pub verbose: bool,

    /// No logging to stderr.
    #[arg(long = "quiet", short = 'q')]
    pub quiet: bool,

    /// Remove timestamps from logs so that they are closer to deterministic.
    ///
    /// This option is intended for internal tests only.
    #[arg(long = "simplify-log-format", hide = true)]
    pub simplify_log_format: bool,
}

/// Install a [`log`] global logger based on user-provided `options`.
pub fn install(options: &LoggingArgs) -> Result<(), anyhow::Error> {
    let (max_level, stderr_logger) = stderr_logger(options);

    log::set_boxed_logger(Box::new(SightlineLogger { stderr_logger }))
        .context("failed to initialize logging")?;
    log::set_max_level(max_level);
    Ok(())
}

fn stderr_logger(
    options: &LoggingArgs,
) -> (
    log::LevelFilter,
    Option<simplelog::WriteLogger<std::io::Stderr>>,
) {
    use log::LevelFilter::{Debug, Error, Off, Trace};

    let &LoggingArgs {
        verbose,
        quiet,
        simplify_log_format,
    } = options;

    if quiet {
        return (Off, None);
    }

    let logger = *simplelog::WriteLogger::new(
        match verbose {
            false => Debug,
            true => Trace,
        },
        // Note: This has no target filters because `SightlineLogger` calls
        // `sightline::util::log::standard_filter` to do it.
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .set_time_level(if simplify_log_format { Off } else { Error })
            .build(),
        std::io::stderr(),
    );
    (simplelog::SharedLogger::level(&logger), Some(logger))
}

/// [`log::Log`] implementation that [`install()`] registers globally.
struct SightlineLogger {
    stderr_logger: Option<simplelog::WriteLogger<std::io::Stderr>>,
}

impl log::Log for SightlineLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        sightline::util::log::standard_filter(metadata)
            && self.stderr_logger.as_ref().is_some_and(|l| l.enabled(metadata))
    }

    fn log(&self, record: &log::Record<'_>) {
        if !sightline::util::log::standard_filter(record.metadata()) {
            return;
        }
        if let Some(stderr_logger) = &self.stderr_logger {
            stderr_logger.log(record);
        }
    }

    fn flush(&self) {
        if let Some(stderr_logger) = &self.stderr_logger {
            stderr_logger.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn levels() {
        let level = |options: LoggingArgs| stderr_logger(&options).0;
        assert_eq!(level(LoggingArgs::default()), log::LevelFilter::Debug);
        assert_eq!(
            level(LoggingArgs {
                verbose: true,
                ..LoggingArgs::default()
            }),
            log::LevelFilter::Trace
        );
        assert_eq!(
            level(LoggingArgs {
                quiet: true,
                ..LoggingArgs::default()
            }),
            log::LevelFilter::Off
        );
    }
}
