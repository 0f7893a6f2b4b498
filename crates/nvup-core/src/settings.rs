//! Runtime configuration.
//!
//! The original design baked the catalog URL selection in at compile time;
//! here it is an explicit runtime setting so the console variant and any
//! future surfaces share one code path.

use std::path::PathBuf;
use std::time::Duration;

/// Which catalog query profile to ask for.
///
/// The catalog service keys its lookup on a product-series identifier;
/// these two cover the supported desktop and notebook GPU profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogProfile {
    /// Desktop GeForce series.
    #[default]
    Desktop,
    /// Notebook GeForce series.
    Notebook,
}

impl CatalogProfile {
    /// The fixed catalog query URL for this profile.
    ///
    /// Asks for exactly one result (the newest entry) in WHQL/DCH form.
    #[must_use]
    pub const fn query_url(self) -> &'static str {
        match self {
            Self::Desktop => {
                "https://gfwsl.geforce.com/services_toolkit/services/com/nvidia/services/AjaxDriverService.php?func=DriverManualLookup&psid=127&pfid=995&osID=135&languageCode=1033&isWHQL=1&dch=1&upCRD=0&qnf=0&numberOfResults=1"
            }
            Self::Notebook => {
                "https://gfwsl.geforce.com/services_toolkit/services/com/nvidia/services/AjaxDriverService.php?func=DriverManualLookup&psid=131&pfid=1028&osID=135&languageCode=1033&isWHQL=1&dch=1&upCRD=0&qnf=0&numberOfResults=1"
            }
        }
    }
}

/// Configuration for the update tracker.
///
/// Use the builder-style methods to customize:
///
/// ```
/// use std::time::Duration;
/// use nvup_core::settings::{CatalogProfile, Settings};
///
/// let settings = Settings::new()
///     .with_profile(CatalogProfile::Notebook)
///     .with_catalog_timeout(Duration::from_secs(20));
/// ```
#[derive(Debug, Clone)]
pub struct Settings {
    /// Catalog query profile.
    pub profile: CatalogProfile,
    /// Override for the download directory; `None` resolves the default
    /// under the user's document storage.
    pub download_dir: Option<PathBuf>,
    /// Bounded timeout for the installed-version lookup.
    pub probe_timeout: Duration,
    /// Bounded timeout for the catalog fetch.
    pub catalog_timeout: Duration,
    /// Minimum interval between progress events.
    pub progress_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            profile: CatalogProfile::default(),
            download_dir: None,
            probe_timeout: Duration::from_secs(30),
            catalog_timeout: Duration::from_secs(30),
            progress_interval: Duration::from_secs(2),
        }
    }
}

impl Settings {
    /// Create settings with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the catalog query profile.
    #[must_use]
    pub const fn with_profile(mut self, profile: CatalogProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Override the download directory.
    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    /// Set the probe timeout.
    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set the catalog fetch timeout.
    #[must_use]
    pub const fn with_catalog_timeout(mut self, timeout: Duration) -> Self {
        self.catalog_timeout = timeout;
        self
    }

    /// Set the minimum interval between progress events.
    #[must_use]
    pub const fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_have_distinct_query_urls() {
        assert_ne!(
            CatalogProfile::Desktop.query_url(),
            CatalogProfile::Notebook.query_url()
        );
        assert!(CatalogProfile::Desktop.query_url().contains("numberOfResults=1"));
    }

    #[test]
    fn builder_overrides_defaults() {
        let settings = Settings::new()
            .with_profile(CatalogProfile::Notebook)
            .with_download_dir("/tmp/drivers")
            .with_catalog_timeout(Duration::from_secs(5));
        assert_eq!(settings.profile, CatalogProfile::Notebook);
        assert_eq!(settings.download_dir.as_deref().unwrap().to_str(), Some("/tmp/drivers"));
        assert_eq!(settings.catalog_timeout, Duration::from_secs(5));
        assert_eq!(settings.progress_interval, Duration::from_secs(2));
    }
}
