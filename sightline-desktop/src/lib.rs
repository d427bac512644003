//! Components of the `sightline` command-line application: scene files, settings, logging,
//! and capture sessions which write [`sightline`] snapshots to files.
//!
//! This library exists mainly so that the binary's pieces can be tested; it is not designed
//! as a general-purpose API.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

mod config_files;
pub use config_files::{CaptureSettings, SettingsArgs, load_config};
pub mod logging;
pub mod output;
pub mod scene_file;
mod session;
pub use session::{CaptureOutcome, CaptureSession, SceneSource};
pub mod trigger;
