//! Wire models for the `AjaxDriverService` lookup response.
//!
//! Only the fields the update check needs are modelled; the service
//! returns far more metadata than this.

use serde::Deserialize;

/// Top-level lookup response. The first `IDS` entry carries the latest
/// matching driver.
#[derive(Debug, Deserialize)]
pub(crate) struct LookupResponse {
    #[serde(rename = "IDS", default)]
    pub ids: Vec<LookupEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LookupEntry {
    #[serde(rename = "downloadInfo")]
    pub download_info: DownloadInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadInfo {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "DownloadURL")]
    pub download_url: String,
}
