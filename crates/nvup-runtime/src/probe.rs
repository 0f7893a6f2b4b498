//! Installed-driver detection.
//!
//! Runs `nvidia-smi` and reads the driver version from its output. A
//! missing binary or a non-zero exit means no usable driver, which is a
//! normal outcome and not an error. The command runs under a bounded
//! timeout so a wedged tool cannot stall the update check.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use nvup_core::{DriverProbe, ProbeError};

/// Driver probe built on the vendor's enumeration tool.
pub struct SystemDriverProbe {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for SystemDriverProbe {
    fn default() -> Self {
        Self {
            program: "nvidia-smi".to_string(),
            args: vec![
                "--query-gpu=driver_version".to_string(),
                "--format=csv,noheader".to_string(),
            ],
            timeout: Duration::from_secs(30),
        }
    }
}

impl SystemDriverProbe {
    /// Create a probe with the default `nvidia-smi` invocation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the probed command, for tests or unusual installs.
    #[must_use]
    pub fn with_command(
        mut self,
        program: impl Into<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Self {
        self.program = program.into();
        self.args = args.into_iter().collect();
        self
    }

    /// Override the probe timeout. Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl DriverProbe for SystemDriverProbe {
    async fn installed_version(&self) -> Result<Option<String>, ProbeError> {
        let output_future = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            // Timing out drops the future; the child must not outlive it.
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, output_future).await {
            Err(_) => {
                return Err(ProbeError::Timeout {
                    seconds: self.timeout.as_secs(),
                });
            }
            Ok(Err(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(
                    target: "nvup.probe",
                    program = %self.program,
                    "probe command not found, treating as no driver"
                );
                return Ok(None);
            }
            Ok(Err(err)) => {
                return Err(ProbeError::Launch {
                    message: err.to_string(),
                });
            }
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            tracing::debug!(
                target: "nvup.probe",
                code = ?output.status.code(),
                "probe command failed, treating as no driver"
            );
            return Ok(None);
        }

        let stdout = String::from_utf8(output.stdout).map_err(|err| ProbeError::Output {
            message: err.to_string(),
        })?;
        let first_line = stdout.lines().next().unwrap_or("").trim();
        Ok(normalize_driver_version(first_line))
    }
}

/// Normalize a reported driver version to the display form.
///
/// `nvidia-smi` already reports the display form (`552.44`) and that is
/// passed through unchanged. Registry-style quads (`31.0.15.5244`) are
/// collapsed by taking the last five digits and splitting off the final
/// two: `31.0.15.5244` becomes `552.44`.
fn normalize_driver_version(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parts: Vec<&str> = trimmed.split('.').collect();
    let is_registry_quad = parts.len() == 4
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()));
    if !is_registry_quad {
        return Some(trimmed.to_string());
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 5 {
        return None;
    }
    let tail = &digits[digits.len() - 5..];
    Some(format!("{}.{}", &tail[..3], &tail[3..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_form_passes_through() {
        assert_eq!(
            normalize_driver_version("552.44"),
            Some("552.44".to_string())
        );
        assert_eq!(
            normalize_driver_version("  551.86\n"),
            Some("551.86".to_string())
        );
    }

    #[test]
    fn registry_quad_is_collapsed() {
        assert_eq!(
            normalize_driver_version("31.0.15.5244"),
            Some("552.44".to_string())
        );
        assert_eq!(
            normalize_driver_version("30.0.15.1179"),
            Some("511.79".to_string())
        );
    }

    #[test]
    fn empty_output_is_none() {
        assert_eq!(normalize_driver_version(""), None);
        assert_eq!(normalize_driver_version("   "), None);
    }

    #[test]
    fn non_version_text_passes_through_for_the_parser_to_reject() {
        // The version comparator downstream rejects unparsable text.
        assert_eq!(
            normalize_driver_version("N/A"),
            Some("N/A".to_string())
        );
    }

    #[cfg(unix)]
    mod process {
        use super::*;

        #[tokio::test]
        async fn reads_version_from_command_output() {
            let probe =
                SystemDriverProbe::new().with_command("echo", vec!["552.44".to_string()]);
            assert_eq!(
                probe.installed_version().await.unwrap(),
                Some("552.44".to_string())
            );
        }

        #[tokio::test]
        async fn missing_binary_means_no_driver() {
            let probe = SystemDriverProbe::new()
                .with_command("/nonexistent/nvidia-smi-missing", Vec::new());
            assert_eq!(probe.installed_version().await.unwrap(), None);
        }

        #[tokio::test]
        async fn failing_command_means_no_driver() {
            let probe = SystemDriverProbe::new()
                .with_command("sh", vec!["-c".to_string(), "exit 1".to_string()]);
            assert_eq!(probe.installed_version().await.unwrap(), None);
        }

        #[tokio::test]
        async fn slow_command_times_out() {
            let probe = SystemDriverProbe::new()
                .with_command("sh", vec!["-c".to_string(), "sleep 5".to_string()])
                .with_timeout(Duration::from_millis(100));
            assert!(matches!(
                probe.installed_version().await,
                Err(ProbeError::Timeout { .. })
            ));
        }

        #[tokio::test]
        async fn timed_out_child_is_killed() {
            let dir = tempfile::tempdir().unwrap();
            let marker = dir.path().join("marker");
            let script = format!("sleep 0.3; echo done > {}", marker.display());

            let probe = SystemDriverProbe::new()
                .with_command("sh", vec!["-c".to_string(), script])
                .with_timeout(Duration::from_millis(50));
            assert!(matches!(
                probe.installed_version().await,
                Err(ProbeError::Timeout { .. })
            ));

            // Give a surviving child ample time to write the marker.
            tokio::time::sleep(Duration::from_millis(500)).await;
            assert!(
                !marker.exists(),
                "child process outlived the timed-out probe"
            );
        }
    }
}
