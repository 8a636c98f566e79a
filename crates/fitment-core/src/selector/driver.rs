//! Async driver owning a selector state and an options provider.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::error::{FetchError, SelectorError};
use crate::ids::OptionId;
use crate::selector::observer::{SelectorObserver, SelectorTrace};
use crate::selector::provider::OptionsProvider;
use crate::selector::state::{FetchTicket, LevelStatus, LevelView, Resolution, SelectorState};
use crate::vehicle::{Level, VehicleOption, VehicleSelection};

/// A fetch that finished, ready to hand back to [`Selector::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFetch {
    pub ticket: FetchTicket,
    pub outcome: Result<Vec<VehicleOption>, FetchError>,
    /// Time spent in the provider.
    pub elapsed: Duration,
}

/// An in-flight options fetch.
///
/// Await it and pass the result to [`Selector::apply`]. Dropping it is
/// harmless: the level just stays `Loading` until the next reload.
pub struct PendingFetch {
    ticket: FetchTicket,
    future: BoxFuture<'static, ResolvedFetch>,
}

impl PendingFetch {
    pub fn ticket(&self) -> &FetchTicket {
        &self.ticket
    }
}

impl Future for PendingFetch {
    type Output = ResolvedFetch;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.poll_unpin(cx)
    }
}

impl fmt::Debug for PendingFetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFetch")
            .field("ticket", &self.ticket)
            .finish_non_exhaustive()
    }
}

/// One browsing session's vehicle selector.
///
/// All mutation goes through `&mut self`, so calls are serialized by the
/// borrow checker. Fetches run outside the selector: `select` hands back a
/// [`PendingFetch`], and the result is applied later in whatever order the
/// futures complete. Superseded results are discarded.
pub struct Selector<P> {
    state: SelectorState,
    provider: Arc<P>,
    observers: Vec<Arc<dyn SelectorObserver>>,
}

impl<P: OptionsProvider + 'static> Selector<P> {
    /// Create a selector in the initial empty state.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            state: SelectorState::new(),
            provider,
            observers: Vec::new(),
        }
    }

    /// Register an observer.
    pub fn with_observer(mut self, observer: Arc<dyn SelectorObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn SelectorObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &SelectorState {
        &self.state
    }

    pub fn selection(&self) -> &VehicleSelection {
        self.state.selection()
    }

    /// Owned snapshot of the selection.
    pub fn current_selection(&self) -> VehicleSelection {
        self.state.selection().clone()
    }

    pub fn options_for(&self, level: Level) -> &[VehicleOption] {
        self.state.options_for(level)
    }

    pub fn status_for(&self, level: Level) -> &LevelStatus {
        self.state.status_for(level)
    }

    pub fn view(&self, level: Level) -> LevelView<'_> {
        self.state.view(level)
    }

    pub fn is_complete(&self) -> bool {
        self.state.is_complete()
    }

    /// Begin loading the brand list.
    pub fn start(&mut self) -> Result<PendingFetch, SelectorError> {
        self.reload(Level::Brand)
    }

    /// Choose an option at `level`.
    ///
    /// Deeper levels are reset and, unless `level` is the engine, the next
    /// level's fetch is returned.
    pub fn select(
        &mut self,
        level: Level,
        option_id: impl Into<OptionId>,
    ) -> Result<Option<PendingFetch>, SelectorError> {
        let option_id = option_id.into();
        let ticket = self.state.select(level, option_id.clone())?;
        tracing::debug!(%level, option = %option_id, "vehicle option selected");
        self.notify(SelectorTrace::Selected { level, option_id });
        Ok(ticket.map(|t| self.issue(t)))
    }

    /// Choose an option by id or display label.
    pub fn select_named(
        &mut self,
        level: Level,
        name: &str,
    ) -> Result<Option<PendingFetch>, SelectorError> {
        let option_id = self
            .state
            .options_for(level)
            .iter()
            .find(|o| o.is_named(name))
            .map(|o| o.id.clone())
            .unwrap_or_else(|| OptionId::new(name));
        self.select(level, option_id)
    }

    /// Re-issue the fetch for `level` with a fresh token.
    pub fn reload(&mut self, level: Level) -> Result<PendingFetch, SelectorError> {
        let ticket = self.state.reload(level)?;
        Ok(self.issue(ticket))
    }

    /// Reset to the initial empty state, invalidating every fetch in flight.
    pub fn clear(&mut self) {
        self.state.clear();
        tracing::debug!("vehicle selection cleared");
        self.notify(SelectorTrace::Cleared);
    }

    /// Apply a finished fetch if it is still current.
    pub fn apply(&mut self, resolved: ResolvedFetch) -> Resolution {
        let ResolvedFetch {
            ticket,
            outcome,
            elapsed,
        } = resolved;
        let resolution = self.state.resolve(&ticket, outcome);

        let trace = match &resolution {
            Resolution::Applied { level, options } => {
                tracing::debug!(%level, token = ticket.token, options, "options applied");
                SelectorTrace::FetchApplied {
                    level: *level,
                    token: ticket.token,
                    options: *options,
                    elapsed,
                }
            }
            Resolution::Failed { level, reason } => {
                tracing::warn!(%level, token = ticket.token, %reason, "options fetch failed");
                SelectorTrace::FetchFailed {
                    level: *level,
                    token: ticket.token,
                    reason: reason.clone(),
                    elapsed,
                }
            }
            Resolution::Stale { level, token } => {
                tracing::debug!(%level, token, current = self.state.token_for(*level), "stale options discarded");
                SelectorTrace::StaleDiscarded {
                    level: *level,
                    token: *token,
                    elapsed,
                }
            }
        };
        self.notify(trace);
        resolution
    }

    /// Select and wait for the next level's options.
    pub async fn select_and_load(
        &mut self,
        level: Level,
        option_id: impl Into<OptionId>,
    ) -> Result<Option<Resolution>, SelectorError> {
        match self.select(level, option_id)? {
            Some(pending) => {
                let resolved = pending.await;
                Ok(Some(self.apply(resolved)))
            }
            None => Ok(None),
        }
    }

    /// Reload a level and wait for its options.
    pub async fn reload_and_wait(&mut self, level: Level) -> Result<Resolution, SelectorError> {
        let resolved = self.reload(level)?.await;
        Ok(self.apply(resolved))
    }

    fn issue(&self, ticket: FetchTicket) -> PendingFetch {
        tracing::debug!(level = %ticket.level, token = ticket.token, parent = ?ticket.parent_id, "options fetch issued");
        self.notify(SelectorTrace::FetchIssued {
            level: ticket.level,
            token: ticket.token,
            parent_id: ticket.parent_id.clone(),
        });

        let provider = Arc::clone(&self.provider);
        let request = ticket.clone();
        let future = async move {
            let started = Instant::now();
            let outcome = provider
                .fetch_options(request.level, request.parent_id.as_ref())
                .await;
            ResolvedFetch {
                ticket: request,
                outcome,
                elapsed: started.elapsed(),
            }
        }
        .boxed();

        PendingFetch { ticket, future }
    }

    fn notify(&self, trace: SelectorTrace) {
        for observer in &self.observers {
            observer.on_trace(&trace);
        }
    }
}

impl<P> fmt::Debug for Selector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish_non_exhaustive()
    }
}
