// SPDX-License-Identifier: MPL-2.0

//! Private storage for the staged camera capture

use crate::constants::{APP_DIR_NAME, acquisition::STAGING_FILE_NAME};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory owned by this application for staging captures
///
/// Uses the override when given, otherwise `<data_local_dir>/qrscan`,
/// falling back to the system temp dir.
pub fn staging_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

/// Resolve the staging file, creating its directory
///
/// The same path is returned on every call; each camera capture overwrites it.
pub async fn staging_path(override_dir: Option<&Path>) -> std::io::Result<PathBuf> {
    let dir = staging_dir(override_dir);
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(STAGING_FILE_NAME);
    debug!(path = %path.display(), "Resolved staging file");
    Ok(path)
}

/// Remove the previous capture before a new camera run
pub async fn clear_staging_file(path: &Path) -> std::io::Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_staging_path_is_stable_and_creates_dir() {
        let dir = std::env::temp_dir().join(format!("qrscan-storage-{}", std::process::id()));
        let first = staging_path(Some(&dir)).await.unwrap();
        let second = staging_path(Some(&dir)).await.unwrap();
        assert_eq!(first, second);
        assert!(dir.is_dir());
        assert_eq!(first.file_name().unwrap(), STAGING_FILE_NAME);

        tokio::fs::write(&first, b"old").await.unwrap();
        clear_staging_file(&first).await.unwrap();
        assert!(!first.exists());
        // Clearing twice is fine
        clear_staging_file(&first).await.unwrap();

        let _ = std::fs::remove_dir_all(&dir);
    }
}
