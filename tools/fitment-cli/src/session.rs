//! A selector session wired to the configured provider and observers.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use fitment_core::selector::{LevelStatus, PendingFetch, Resolution, Selector};
use fitment_core::vehicle::{Level, VehicleSelection};
use fitment_core::SessionId;
use fitment_data::{PolicyProvider, StaticOptionsProvider};
use fitment_observability::{LoggingObserver, MetricsObserver, SelectorMetrics};

use crate::context::Context;
use crate::output::Output;

pub type CliProvider = PolicyProvider<StaticOptionsProvider>;

/// One browsing session.
pub struct Session {
    pub selector: Selector<CliProvider>,
    metrics: Arc<MetricsObserver>,
    output: Output,
}

impl Session {
    /// Open a session over the configured vehicle tree and load the brands.
    pub async fn open(ctx: &Context, vehicles: Option<&str>) -> Result<Self> {
        let tree = ctx.load_tree(vehicles)?;
        let provider = ctx.provider(tree)?;

        let session_id = SessionId::generate();
        let metrics = Arc::new(MetricsObserver::new(&session_id));
        let logging = Arc::new(LoggingObserver::new(ctx.logger(session_id.clone())));
        ctx.output.debug(&format!("Session {}", session_id));

        let selector = Selector::new(Arc::new(provider))
            .with_observer(logging)
            .with_observer(metrics.clone());

        let mut session = Self {
            selector,
            metrics,
            output: ctx.output.clone(),
        };
        let pending = session.selector.start()?;
        session.wait(pending).await;
        Ok(session)
    }

    /// Await a fetch behind a spinner and apply it.
    pub async fn wait(&mut self, pending: PendingFetch) -> Resolution {
        let level = pending.ticket().level;
        let spinner = self
            .output
            .spinner(&format!("Loading {} options...", level.display_name()));
        let resolved = pending.await;
        spinner.finish_and_clear();
        self.selector.apply(resolved)
    }

    /// Choose `name` at `level`, waiting for the next level's options.
    ///
    /// Fails when the name is not among the loaded options or the next
    /// level cannot be loaded.
    pub async fn choose(&mut self, level: Level, name: &str) -> Result<()> {
        self.ensure_loaded(level)?;
        let pending = self.selector.select_named(level, name).map_err(|e| {
            let known: Vec<&str> = self
                .selector
                .options_for(level)
                .iter()
                .map(|o| o.display_label.as_str())
                .collect();
            anyhow!("{} (known: {})", e, known.join(", "))
        })?;

        if let Some(pending) = pending {
            if let Resolution::Failed { level, reason } = self.wait(pending).await {
                bail!("Failed to load {} options: {}", level.display_name(), reason);
            }
        }
        Ok(())
    }

    /// Walk the cascade with one name per level, Brand first.
    pub async fn choose_path<S: AsRef<str>>(&mut self, names: &[S]) -> Result<VehicleSelection> {
        for (level, name) in Level::ALL.into_iter().zip(names) {
            self.choose(level, name.as_ref()).await?;
        }
        Ok(self.selector.current_selection())
    }

    fn ensure_loaded(&self, level: Level) -> Result<()> {
        match self.selector.status_for(level) {
            LevelStatus::Error(reason) => {
                bail!("{} options unavailable: {}", level.display_name(), reason)
            }
            status if self.selector.options_for(level).is_empty() => {
                bail!("No {} options ({})", level.display_name(), status.as_str())
            }
            _ => Ok(()),
        }
    }

    pub fn metrics(&self) -> SelectorMetrics {
        self.metrics.snapshot()
    }
}
