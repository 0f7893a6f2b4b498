//! Installed-driver probe port.

use async_trait::async_trait;

use crate::error::ProbeError;

/// Port for looking up the installed driver version.
///
/// Implementations run whatever platform-specific enumeration mechanism is
/// available, filter to the target vendor's *display* driver (excluding
/// audio or peripheral devices that share the vendor name), and return the
/// version in dotted display form (e.g. "552.44").
///
/// `Ok(None)` means no matching driver is installed; that is a normal
/// outcome, not an error. Implementations must bound their own runtime
/// with a timeout so a wedged enumeration never hangs the check cycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DriverProbe: Send + Sync {
    /// Return the installed display-driver version, if any.
    async fn installed_version(&self) -> Result<Option<String>, ProbeError>;
}
