use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use directories_next::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use sightline::CaptureOptions;

/// Environment variable which, if set, makes reading the user's configuration files panic,
/// so that tests which forget `--no-config-files` are caught.
const NO_CONFIG_FILES_IN_TESTS_VAR: &str = "SIGHTLINE_DO_NOT_USE_CONFIG_FILES_IN_TESTS";

// -------------------------------------------------------------------------------------------------

/// Settings for capturing and for writing the results.
///
/// Relative directories are resolved against the session's output directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct CaptureSettings {
    /// Probe and triangle options for each capture.
    pub capture: CaptureOptions,
    /// Start of every output file name, followed by `log_` and a timestamp.
    pub file_prefix: String,
    /// Where the CSV with visibility flags goes.
    pub learning_dir: PathBuf,
    /// Where the CSV without visibility flags goes, if it is written.
    pub control_dir: Option<PathBuf>,
    /// Where the text report goes, if it is written.
    pub report_dir: Option<PathBuf>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            capture: CaptureOptions::default(),
            file_prefix: "honolulu_".into(),
            learning_dir: "LearningData".into(),
            control_dir: Some("TrainingControl".into()),
            report_dir: None,
        }
    }
}

// -------------------------------------------------------------------------------------------------

/// Load the settings file from a platform-appropriate read/write location, creating it with
/// default values if it does not exist.
///
/// This does not respect command-line options. Use [`SettingsArgs`] for that.
pub fn load_config() -> Result<CaptureSettings, anyhow::Error> {
    if std::env::var(NO_CONFIG_FILES_IN_TESTS_VAR).is_ok() {
        panic!(
            "tests should be hermetic and not touch user config files \
            (environment variable {NO_CONFIG_FILES_IN_TESTS_VAR} set, \
            but --no-config-files not passed)"
        );
    }

    let project_dirs = ProjectDirs::from("", "", "sightline")
        .ok_or_else(|| anyhow::anyhow!("could not find configuration directory"))?;
    fs::create_dir_all(project_dirs.config_dir())?;

    let settings_path = project_dirs.config_dir().join("settings.json");

    Ok(read_or_create_default_json_file(
        "capture settings",
        &settings_path,
        CaptureSettings::default,
    ))
}

// -------------------------------------------------------------------------------------------------

/// [`clap::Args`] argument group struct for args that affect what settings are used.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct SettingsArgs {
    /// Ignore all configuration files, using only defaults and command-line options.
    #[arg(long = "no-config-files", conflicts_with = "config")]
    pub no_config_files: bool,

    /// Read settings from this file instead of the user configuration file.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[expect(clippy::doc_markdown, reason = "will be displayed in --help")]
    /// Override the value of a setting for this session, instead of taking it from files
    /// or defaults.
    ///
    /// The value is specified as a key-value pair where the key is an unquoted string, the
    /// separator is “=”, and the value is a JSON value (which, if a string, must be quoted);
    /// for example: -Sreport_dir='"Reports"'
    ///
    /// Nested settings are named with dots: -Scapture.probe.samples_per_axis=3
    #[arg(long = "set", short = 'S', value_parser = parse_configure, value_name="NAME=JSON")]
    pub set: Vec<(String, serde_json::Value)>,
}

impl SettingsArgs {
    /// Constructs the [`CaptureSettings`] a session with these args should use.
    pub fn build_settings(self) -> Result<CaptureSettings, anyhow::Error> {
        let Self {
            no_config_files,
            config,
            set: to_override,
        } = self;

        let settings = if no_config_files {
            CaptureSettings::default()
        } else if let Some(path) = config {
            read_json_file(&path).with_context(|| {
                format!("Error loading settings file {path}", path = path.display())
            })?
        } else {
            load_config().context("Error loading configuration files")?
        };

        if to_override.is_empty() {
            return Ok(settings);
        }

        let mut current_settings = serde_json::to_value(settings)?;
        for (key, value) in to_override {
            set_by_path(&mut current_settings, &key, value)
                .with_context(|| format!("cannot set {key:?}"))?;
        }
        serde_json::from_value(current_settings).context("--set did not produce valid settings")
    }
}

fn parse_configure(arg: &str) -> Result<(String, serde_json::Value), anyhow::Error> {
    let (key, value) = arg.split_once('=').ok_or_else(|| anyhow::anyhow!("missing '='"))?;
    let value = serde_json::from_str(value)?;
    Ok((key.to_owned(), value))
}

/// Replaces the value at the dot-separated `path` in a tree of JSON objects.
fn set_by_path(
    mut target: &mut serde_json::Value,
    path: &str,
    value: serde_json::Value,
) -> Result<(), anyhow::Error> {
    let mut components = path.split('.');
    let last = components.next_back().unwrap_or_default();
    for component in components {
        target = target
            .as_object_mut()
            .and_then(|object| object.get_mut(component))
            .ok_or_else(|| anyhow::anyhow!("no setting group named {component:?}"))?;
    }
    let object = target
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("setting is not a group"))?;
    object.insert(last.to_owned(), value);
    Ok(())
}

// -------------------------------------------------------------------------------------------------

fn read_json_file<V: DeserializeOwned>(path: &Path) -> Result<V, anyhow::Error> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

fn read_or_create_default_json_file<V: DeserializeOwned + Serialize>(
    description: &str,
    path: &Path,
    default: fn() -> V,
) -> V {
    match File::open(path) {
        Ok(file) => match serde_json::from_reader(BufReader::new(file)) {
            Ok(value) => {
                log::trace!(
                    "Loaded {description} from {path}",
                    path = path.to_string_lossy()
                );
                value
            }
            Err(e) => {
                log::warn!(
                    "Syntax error in {description} loaded from {path}; \
                    using default values. Error: {e}",
                    path = path.to_string_lossy(),
                );
                default()
            }
        },
        Err(open_for_read_error) if open_for_read_error.kind() == std::io::ErrorKind::NotFound => {
            log::info!(
                "No {description} file found; creating {path}",
                path = path.to_string_lossy()
            );
            let value = default();
            let write_result = serde_json::to_string_pretty(&value)
                .map_err(anyhow::Error::from)
                .and_then(|json_text| Ok(fs::write(path, json_text.as_bytes())?));
            match write_result {
                Ok(()) => log::trace!(
                    "Wrote default {description} to {path}",
                    path = path.to_string_lossy()
                ),
                Err(write_error) => {
                    log::error!(
                        "Error while writing default {description} file {path}: {write_error}",
                        path = path.to_string_lossy(),
                    );
                }
            }
            value
        }
        Err(e) => {
            log::error!(
                "Error while reading {description} file {path}: {e}",
                path = path.to_string_lossy(),
            );
            default()
        }
    }
}
