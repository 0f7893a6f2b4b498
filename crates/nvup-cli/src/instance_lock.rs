//! Single-instance pid lock.
//!
//! Two concurrent instances would race on the same download path and
//! double-launch installers, so the second one must stand down. The lock
//! is a pid file under the data directory; a stale file left by a dead
//! process is reclaimed.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use nvup_core::paths::{data_root, ensure_directory};

const LOCK_FILE_NAME: &str = "nvup.pid";

/// Held for the lifetime of the process; removing the pid file on drop.
pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Try to acquire the lock. `Ok(None)` means another live instance
    /// holds it and this process should exit quietly.
    pub fn acquire() -> Result<Option<Self>> {
        let dir = data_root().context("could not resolve data directory")?;
        ensure_directory(&dir).context("could not create data directory")?;
        Self::acquire_in(&dir)
    }

    fn acquire_in(dir: &Path) -> Result<Option<Self>> {
        let path = dir.join(LOCK_FILE_NAME);

        for _ in 0..2 {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    write!(file, "{}", std::process::id())
                        .context("could not write pid lock")?;
                    return Ok(Some(Self { path }));
                }
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    if Self::holder_is_alive(&path) {
                        return Ok(None);
                    }
                    tracing::debug!(
                        target: "nvup.cli",
                        path = %path.display(),
                        "removing stale instance lock"
                    );
                    // Stale lock from a dead process; remove and retry once.
                    let _ = std::fs::remove_file(&path);
                }
                Err(err) => {
                    return Err(err).context("could not create pid lock");
                }
            }
        }
        Ok(None)
    }

    fn holder_is_alive(path: &Path) -> bool {
        let Ok(contents) = std::fs::read_to_string(path) else {
            // Unreadable lock: assume held rather than stealing it.
            return true;
        };
        let Ok(pid) = contents.trim().parse::<u32>() else {
            return false;
        };
        process_alive(pid)
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(target_os = "linux")]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

/// Without a portable liveness check, an existing lock is assumed held.
#[cfg(not(target_os = "linux"))]
fn process_alive(_pid: u32) -> bool {
    true
}
