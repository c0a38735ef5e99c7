// SPDX-License-Identifier: GPL-3.0-only

//! Camera capture through an external program
//!
//! The camera tool runs as a separate process and writes one still image to
//! the staging path. We only look at its exit status and at the file it left.

use super::ActivityResult;
use crate::config::Config;
use crate::constants::acquisition::OUTPUT_PLACEHOLDER;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tracing::{debug, info};

/// A capability that writes one captured still image to `destination`
#[async_trait]
pub trait CameraCapability: Send + Sync {
    async fn capture(&self, destination: &Path) -> ActivityResult<()>;
}

/// Camera capability backed by a configured command line
#[derive(Debug, Clone)]
pub struct CommandCamera {
    command: Vec<String>,
}

impl CommandCamera {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.camera_command.clone())
    }
}

/// Split a command into program and arguments with `{output}` replaced by `output`
///
/// If no argument carries the placeholder the path is appended.
pub fn command_line(command: &[String], output: &Path) -> Option<(String, Vec<String>)> {
    let (program, args) = command.split_first()?;
    let output = output.to_string_lossy();

    let mut substituted = false;
    let mut args: Vec<String> = args
        .iter()
        .map(|arg| {
            if arg.contains(OUTPUT_PLACEHOLDER) {
                substituted = true;
                arg.replace(OUTPUT_PLACEHOLDER, &output)
            } else {
                arg.clone()
            }
        })
        .collect();
    if !substituted {
        args.push(output.into_owned());
    }

    Some((program.clone(), args))
}

#[async_trait]
impl CameraCapability for CommandCamera {
    async fn capture(&self, destination: &Path) -> ActivityResult<()> {
        let Some((program, args)) = command_line(&self.command, destination) else {
            return ActivityResult::Failed("camera command is empty".into());
        };

        info!(program = %program, destination = %destination.display(), "Launching camera");

        let status = tokio::process::Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match status {
            Ok(output) => output,
            Err(e) => {
                debug!(program = %program, error = %e, "Failed to launch camera");
                return ActivityResult::Failed(format!("failed to launch {}: {}", program, e));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!(status = %output.status, stderr = %stderr.trim(), "Camera exited unsuccessfully");
            return ActivityResult::Cancelled;
        }

        match tokio::fs::metadata(destination).await {
            Ok(meta) if meta.len() > 0 => {
                debug!(bytes = meta.len(), "Camera wrote capture");
                ActivityResult::Success(())
            }
            Ok(_) => {
                debug!("Camera exited successfully but wrote an empty file");
                ActivityResult::Cancelled
            }
            Err(e) => {
                debug!(error = %e, "Camera exited successfully but wrote nothing");
                ActivityResult::Cancelled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_destination(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("qrscan-capture-{}-{}.jpg", tag, std::process::id()))
    }

    #[tokio::test]
    async fn test_missing_program_fails() {
        let camera = CommandCamera::new(vec!["qrscan-no-such-camera-tool".into()]);
        let result = camera.capture(&temp_destination("missing")).await;
        assert!(matches!(result, ActivityResult::Failed(_)));
    }

    #[tokio::test]
    async fn test_empty_command_fails() {
        let camera = CommandCamera::new(Vec::new());
        let result = camera.capture(&temp_destination("empty")).await;
        assert!(matches!(result, ActivityResult::Failed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_exit_without_file_is_cancelled() {
        let destination = temp_destination("nofile");
        let _ = std::fs::remove_file(&destination);
        let camera = CommandCamera::new(vec!["true".into()]);
        assert_eq!(camera.capture(&destination).await, ActivityResult::Cancelled);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_writing_file_succeeds() {
        let destination = temp_destination("written");
        let camera = CommandCamera::new(vec![
            "sh".into(),
            "-c".into(),
            "printf data > \"$0\"".into(),
            "{output}".into(),
        ]);
        assert_eq!(camera.capture(&destination).await, ActivityResult::Success(()));
        let _ = std::fs::remove_file(&destination);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_cancelled() {
        let camera = CommandCamera::new(vec!["false".into()]);
        assert_eq!(
            camera.capture(&temp_destination("false")).await,
            ActivityResult::Cancelled
        );
    }
}
