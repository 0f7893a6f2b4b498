//! Public configuration for the catalog client.

use std::time::Duration;

use nvup_core::CatalogProfile;

/// Configuration for the catalog client.
///
/// Use the builder pattern methods to customize the client.
///
/// # Example
///
/// ```
/// use nvup_catalog::CatalogClientConfig;
/// use nvup_core::CatalogProfile;
/// use std::time::Duration;
///
/// let config = CatalogClientConfig::for_profile(CatalogProfile::Notebook)
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Full lookup URL, including the product/platform query parameters.
    pub(crate) query_url: String,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Request timeout
    pub(crate) timeout: Duration,
    /// Maximum number of retry attempts for transient errors
    pub(crate) max_retries: u8,
    /// Base delay for exponential backoff
    pub(crate) retry_base_delay: Duration,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            query_url: CatalogProfile::default().query_url().to_string(),
            user_agent: concat!("nvup/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(500),
        }
    }
}

impl CatalogClientConfig {
    /// Create a new configuration with default settings (desktop profile).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration querying for the given hardware profile.
    #[must_use]
    pub fn for_profile(profile: CatalogProfile) -> Self {
        Self::default().with_query_url(profile.query_url())
    }

    /// Override the full lookup URL.
    #[must_use]
    pub fn with_query_url(mut self, url: impl Into<String>) -> Self {
        self.query_url = url.into();
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum number of retry attempts for transient errors.
    ///
    /// Defaults to 3 retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the base delay for exponential backoff retries.
    ///
    /// Defaults to 500ms.
    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}
