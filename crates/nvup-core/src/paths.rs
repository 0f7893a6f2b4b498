//! Filesystem locations.
//!
//! The core holds no database or config file; the only paths it cares
//! about are the download directory for installer payloads and the data
//! root used by the single-instance lock.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Subdirectory name for downloaded installers.
const DOWNLOAD_SUBDIR: &str = "Driver Updates";

/// Application data directory name.
const APP_DIR: &str = "nvup";

/// Error resolving or creating a filesystem location.
#[derive(Debug, Error)]
pub enum PathError {
    /// The platform provides no suitable base directory.
    #[error("no {purpose} directory available on this platform")]
    NoBaseDir {
        /// What we were looking for.
        purpose: &'static str,
    },

    /// Creating the directory failed.
    #[error("failed to create {path}: {source}")]
    Create {
        /// The directory we tried to create.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Resolve the download directory for installer payloads.
///
/// `override_dir` wins when set; otherwise a fixed subdirectory under the
/// user's documents folder (falling back to the data dir on platforms
/// without one). The directory is not created here; see
/// [`ensure_directory`].
pub fn resolve_download_dir(override_dir: Option<&Path>) -> Result<PathBuf, PathError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    dirs::document_dir()
        .or_else(dirs::data_dir)
        .map(|base| base.join(DOWNLOAD_SUBDIR))
        .ok_or(PathError::NoBaseDir {
            purpose: "document",
        })
}

/// Application data root, used for the single-instance lock file.
pub fn data_root() -> Result<PathBuf, PathError> {
    dirs::data_dir()
        .map(|base| base.join(APP_DIR))
        .ok_or(PathError::NoBaseDir { purpose: "data" })
}

/// Lazily create a directory (and parents) if missing.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    std::fs::create_dir_all(path).map_err(|source| PathError::Create {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_dir_wins() {
        let dir = resolve_download_dir(Some(Path::new("/tmp/override"))).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/override"));
    }

    #[test]
    fn ensure_directory_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        ensure_directory(&nested).unwrap();
        assert!(nested.is_dir());
        // Idempotent
        ensure_directory(&nested).unwrap();
    }
}
