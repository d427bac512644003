use std::borrow::Cow;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use sightline::camera::Pose;
use sightline::export::{self, CsvLayout};
use sightline::{Capturer, Snapshot};

use crate::config_files::CaptureSettings;
use crate::output;
use crate::scene_file::{LoadedScene, load_scene};

/// Where a [`CaptureSession`] gets its scene and camera from.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum SceneSource {
    /// Read the given scene file anew for every capture, so that edits are picked up.
    File(PathBuf),
    /// Use this already loaded scene for every capture.
    Loaded(Box<LoadedScene>),
}

impl SceneSource {
    fn load(&self) -> Result<Cow<'_, LoadedScene>, anyhow::Error> {
        match self {
            SceneSource::File(path) => Ok(Cow::Owned(load_scene(path)?)),
            SceneSource::Loaded(scene) => Ok(Cow::Borrowed(scene)),
        }
    }
}

/// The result of [`CaptureSession::capture_now()`].
#[derive(Debug)]
#[allow(clippy::exhaustive_structs)]
pub struct CaptureOutcome {
    /// The captured data, which is valid even if writing it failed.
    pub snapshot: Snapshot,
    /// The files written, or why writing them failed.
    pub written: Result<Vec<PathBuf>, anyhow::Error>,
}

/// Captures a scene on request and writes each [`Snapshot`] to files.
#[derive(Debug)]
pub struct CaptureSession {
    capturer: Capturer,
    settings: CaptureSettings,
    source: SceneSource,
    output_dir: PathBuf,
    last_pose: Option<Pose>,
}

impl CaptureSession {
    /// Constructs a session. Relative output directories in `settings` are resolved against
    /// `output_dir`.
    pub fn new(settings: CaptureSettings, source: SceneSource, output_dir: PathBuf) -> Self {
        Self {
            capturer: Capturer::new(settings.capture),
            settings,
            source,
            output_dir,
            last_pose: None,
        }
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// The camera pose of the most recent capture, if any.
    pub fn last_pose(&self) -> Option<Pose> {
        self.last_pose
    }

    /// Loads the scene, captures it, and writes the configured output files.
    ///
    /// Returns an error if the scene could not be loaded or captured. Failure to write is
    /// reported in [`CaptureOutcome::written`] instead.
    pub fn capture_now(&mut self) -> Result<CaptureOutcome, anyhow::Error> {
        let loaded = self.source.load()?;
        let pose = loaded.camera.pose();
        let outcome = self.capture_loaded(&loaded)?;
        self.last_pose = Some(pose);
        Ok(outcome)
    }

    /// Like [`Self::capture_now()`], but does nothing and returns [`None`] if the camera pose
    /// is the same as at the last capture.
    pub fn capture_if_pose_changed(&mut self) -> Result<Option<CaptureOutcome>, anyhow::Error> {
        let loaded = self.source.load()?;
        let pose = loaded.camera.pose();
        if self.last_pose == Some(pose) {
            return Ok(None);
        }
        let outcome = self.capture_loaded(&loaded)?;
        self.last_pose = Some(pose);
        Ok(Some(outcome))
    }

    fn capture_loaded(&self, loaded: &LoadedScene) -> Result<CaptureOutcome, anyhow::Error> {
        let LoadedScene { scene, camera } = loaded;
        let snapshot = self.capturer.try_capture(scene, camera, scene)?;
        log::info!("captured {}", snapshot.stats());

        let written = self.write_outputs(&snapshot);
        match &written {
            Ok(paths) => {
                for path in paths {
                    log::info!("wrote {path}", path = path.display());
                }
            }
            Err(error) => log::error!("failed to write capture: {error:#}"),
        }
        Ok(CaptureOutcome { snapshot, written })
    }

    fn write_outputs(&self, snapshot: &Snapshot) -> Result<Vec<PathBuf>, anyhow::Error> {
        let CaptureSettings {
            capture: _,
            ref file_prefix,
            ref learning_dir,
            ref control_dir,
            ref report_dir,
        } = self.settings;
        let timestamp = output::timestamp_now()?;
        let write = |dir: &Path, extension: &str, contents: &str| {
            output::write_new_file(
                &self.output_dir.join(dir),
                file_prefix,
                &timestamp,
                extension,
                contents,
            )
        };

        let mut written = Vec::new();
        written.push(write(learning_dir, "csv", &csv(snapshot, CsvLayout::Learning)?)?);
        if let Some(dir) = control_dir {
            written.push(write(dir, "csv", &csv(snapshot, CsvLayout::Control)?)?);
        }
        if let Some(dir) = report_dir {
            let mut text = String::new();
            export::write_report(&mut text, snapshot).context("failed to format report")?;
            written.push(write(dir, "txt", &text)?);
        }
        Ok(written)
    }
}

fn csv(snapshot: &Snapshot, layout: CsvLayout) -> Result<String, anyhow::Error> {
    let mut text = String::new();
    export::write_csv(&mut text, snapshot, layout).context("failed to format CSV")?;
    Ok(text)
}
