//! Options provider backed by an in-memory vehicle tree.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fitment_core::selector::OptionsProvider;
use fitment_core::vehicle::{Level, VehicleOption};
use fitment_core::{FetchError, OptionId};

use crate::tree::VehicleTree;

/// Serves options straight from a [`VehicleTree`].
///
/// An optional artificial latency makes loading states visible in demos and
/// lets tests exercise out-of-order completion.
#[derive(Debug, Clone)]
pub struct StaticOptionsProvider {
    tree: Arc<VehicleTree>,
    latency: Duration,
}

impl StaticOptionsProvider {
    pub fn new(tree: VehicleTree) -> Self {
        Self {
            tree: Arc::new(tree),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn tree(&self) -> &VehicleTree {
        &self.tree
    }
}

#[async_trait]
impl OptionsProvider for StaticOptionsProvider {
    async fn fetch_options(
        &self,
        level: Level,
        parent: Option<&OptionId>,
    ) -> Result<Vec<VehicleOption>, FetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.tree
            .children(level, parent)
            .map(<[VehicleOption]>::to_vec)
            .ok_or_else(|| match parent {
                Some(p) => FetchError::NotFound(format!("no {} under {}", level, p)),
                None => FetchError::NotFound(format!("{} needs a parent", level)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::SAMPLE_TREE;
    use fitment_core::prelude::*;

    fn provider() -> StaticOptionsProvider {
        StaticOptionsProvider::new(VehicleTree::from_json(SAMPLE_TREE).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_each_level() {
        let p = provider();
        let brands = p.fetch_options(Level::Brand, None).await.unwrap();
        assert_eq!(brands.len(), 2);

        let models = p.fetch_options(Level::Model, Some(&brands[0].id)).await.unwrap();
        assert_eq!(models[0].id.as_str(), "bmw-3");

        let years = p.fetch_options(Level::Year, Some(&models[0].id)).await.unwrap();
        let labels: Vec<_> = years.iter().map(|y| y.display_label.as_str()).collect();
        assert_eq!(labels, vec!["2015", "2016"]);
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let err = provider()
            .fetch_options(Level::Model, Some(&"tesla".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_drives_full_cascade() {
        let mut selector = Selector::new(Arc::new(provider()));
        selector.reload_and_wait(Level::Brand).await.unwrap();
        selector.select_and_load(Level::Brand, "bmw").await.unwrap();
        selector.select_and_load(Level::Model, "bmw-3").await.unwrap();
        let pending = selector.select_named(Level::Year, "2015").unwrap().unwrap();
        selector.apply(pending.await);
        selector.select_named(Level::Engine, "320d").unwrap();

        assert!(selector.is_complete());
        assert_eq!(selector.selection().describe(), "BMW / 3 Series / 2015 / 320d");
    }
}
