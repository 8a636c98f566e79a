//! Options provider seam.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::ids::OptionId;
use crate::vehicle::{Level, VehicleOption};

/// Supplies the options of one level under a given parent.
///
/// Implementations must return options whose `parent_id` equals `parent`
/// (`None` for brands). The selector trusts this and does not re-check.
/// Timeouts and retries, if any, are the provider's business.
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    async fn fetch_options(
        &self,
        level: Level,
        parent: Option<&OptionId>,
    ) -> Result<Vec<VehicleOption>, FetchError>;
}

#[async_trait]
impl<P: OptionsProvider + ?Sized> OptionsProvider for std::sync::Arc<P> {
    async fn fetch_options(
        &self,
        level: Level,
        parent: Option<&OptionId>,
    ) -> Result<Vec<VehicleOption>, FetchError> {
        (**self).fetch_options(level, parent).await
    }
}
