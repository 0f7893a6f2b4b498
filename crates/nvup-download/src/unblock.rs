//! Removal of the Windows mark-of-the-web on downloaded installers.
//!
//! Windows attaches a `Zone.Identifier` alternate data stream to files
//! downloaded from the internet, which triggers an extra security prompt
//! when the installer runs. Removing it is best-effort: a failure is
//! logged and the download still succeeds.

use std::path::Path;

/// Strip the `Zone.Identifier` stream from a downloaded file, if present.
#[cfg(windows)]
pub async fn clear_download_mark(path: &Path) {
    let mut stream = path.as_os_str().to_os_string();
    stream.push(":Zone.Identifier");
    if let Err(err) = tokio::fs::remove_file(&stream).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(
                target: "nvup.download",
                path = %path.display(),
                error = %err,
                "could not remove Zone.Identifier stream"
            );
        }
    }
}

/// No mark-of-the-web exists outside Windows.
#[cfg(not(windows))]
pub async fn clear_download_mark(_path: &Path) {}
