// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for one-shot scans
//!
//! Each command runs exactly one acquisition cycle and exits. The process exit
//! status reflects whether a code was shown.

use qrscan::Config;
use qrscan::app::{self, ImageSource, PlainSurface, Presentation, ResultPresenter};
use qrscan::backends::{DialogPicker, FilePicker, PathPicker};
use qrscan::terminal::TerminalSurface;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Load the config from `path` or the default location
pub fn load_config(path: Option<&Path>) -> Config {
    match path {
        Some(path) => Config::load_from(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Failed to load configuration, using defaults");
            Config::default()
        }),
        None => Config::load(),
    }
}

/// Capture with the external camera and decode
pub fn camera(config: &Config, plain: bool) -> Result<(), Box<dyn std::error::Error>> {
    // The camera path never consults the picker
    run_once(config, Arc::new(PathPicker::default()), ImageSource::Camera, plain)
}

/// Pick (or take the given) image file and decode
pub fn gallery(
    config: &Config,
    path: Option<PathBuf>,
    plain: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let picker: Arc<dyn FilePicker> = match path {
        Some(path) => Arc::new(PathPicker::new(Some(path))),
        None => Arc::new(DialogPicker::with_title("Select an image")),
    };
    run_once(config, picker, ImageSource::Gallery, plain)
}

fn run_once(
    config: &Config,
    picker: Arc<dyn FilePicker>,
    source: ImageSource,
    plain: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let presenter = if plain {
        ResultPresenter::new(Arc::new(PlainSurface), Arc::new(PlainSurface))
    } else {
        ResultPresenter::new(Arc::new(TerminalSurface), Arc::new(TerminalSurface))
    };
    let session = app::session_from_config(config, picker, presenter);

    // Create async runtime for the cycle
    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(session.run_cycle(source));
    drop(rt);
    debug!(cycle = report.token.value(), transitions = ?report.transitions, "Cycle finished");

    match report.presentation {
        Presentation::Dialog(_) => Ok(()),
        Presentation::InvariantViolation => Err("internal error: decode without image".into()),
        _ => std::process::exit(1),
    }
}

/// Print the config path and values; optionally persist them
pub fn show_config(
    config: &Config,
    path: Option<&Path>,
    write: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Config::default_path()?,
    };

    println!("Config file: {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);

    if write {
        config.save_to(&path)?;
        println!("Saved: {}", path.display());
    }

    Ok(())
}
