//! The catalog client: one lookup returning the latest driver.

use async_trait::async_trait;
use nvup_core::{CatalogClient, CatalogError, DriverInfo};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::LookupResponse;

/// Default catalog client using the reqwest HTTP backend.
pub type DefaultCatalogClient = HttpCatalogClient<ReqwestBackend>;

/// Catalog client generic over an HTTP backend.
///
/// Use `DefaultCatalogClient` in production; the generic parameter
/// exists so tests can substitute a canned backend.
pub struct HttpCatalogClient<B: HttpBackend> {
    backend: B,
    query_url: String,
}

impl DefaultCatalogClient {
    /// Create a new client with the given configuration.
    #[must_use]
    pub fn new(config: &CatalogClientConfig) -> Self {
        Self {
            backend: ReqwestBackend::new(config),
            query_url: config.query_url.clone(),
        }
    }
}

impl<B: HttpBackend> HttpCatalogClient<B> {
    /// Create a client with a custom backend, for testing.
    #[cfg(test)]
    pub(crate) fn with_backend(backend: B, query_url: impl Into<String>) -> Self {
        Self {
            backend,
            query_url: query_url.into(),
        }
    }

    fn parse_query_url(&self) -> Result<Url, CatalogError> {
        Url::parse(&self.query_url)
            .map_err(|err| CatalogError::network(format!("invalid catalog URL: {err}")))
    }
}

#[async_trait]
impl<B: HttpBackend> CatalogClient for HttpCatalogClient<B> {
    async fn latest_driver(&self) -> Result<DriverInfo, CatalogError> {
        let url = self.parse_query_url()?;
        tracing::debug!(target: "nvup.catalog", url = %url, "querying driver catalog");

        let response: LookupResponse = self.backend.get_json(&url).await?;
        let entry = response
            .ids
            .into_iter()
            .next()
            .ok_or_else(|| CatalogError::malformed("catalog returned an empty IDS array"))?;

        let info = entry.download_info;
        if info.version.trim().is_empty() {
            return Err(CatalogError::malformed("catalog entry has no version"));
        }

        let download_url = Url::parse(&info.download_url).map_err(|_| {
            CatalogError::InvalidDownloadUrl {
                url: info.download_url.clone(),
            }
        })?;
        if !matches!(download_url.scheme(), "http" | "https") {
            return Err(CatalogError::InvalidDownloadUrl {
                url: info.download_url,
            });
        }

        tracing::info!(
            target: "nvup.catalog",
            version = %info.version,
            "catalog lookup succeeded"
        );
        Ok(DriverInfo {
            version: info.version,
            download_url: download_url.to_string(),
        })
    }
}
