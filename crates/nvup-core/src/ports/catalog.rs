//! Remote catalog port.

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::update::DriverInfo;

/// Port for fetching the latest catalog entry for the tracked driver.
///
/// The implementation owns the query URL, timeout, and payload-shape
/// validation; the core only sees a [`DriverInfo`] or a [`CatalogError`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch the latest available driver metadata.
    async fn latest_driver(&self) -> Result<DriverInfo, CatalogError>;
}
