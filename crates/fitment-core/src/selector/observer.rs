//! Observation hooks for the selector.

use std::time::Duration;

use crate::ids::OptionId;
use crate::vehicle::Level;

/// Something that happened inside a [`Selector`](super::Selector).
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorTrace {
    /// An option was chosen.
    Selected { level: Level, option_id: OptionId },
    /// The whole selection was reset.
    Cleared,
    /// An options fetch was started.
    FetchIssued {
        level: Level,
        token: u64,
        parent_id: Option<OptionId>,
    },
    /// A fetch result was applied to its level.
    FetchApplied {
        level: Level,
        token: u64,
        options: usize,
        elapsed: Duration,
    },
    /// A fetch failed and the level is now in error.
    FetchFailed {
        level: Level,
        token: u64,
        reason: String,
        elapsed: Duration,
    },
    /// A fetch resolved after being superseded and was dropped.
    StaleDiscarded {
        level: Level,
        token: u64,
        elapsed: Duration,
    },
}

impl SelectorTrace {
    pub fn name(&self) -> &'static str {
        match self {
            SelectorTrace::Selected { .. } => "selected",
            SelectorTrace::Cleared => "cleared",
            SelectorTrace::FetchIssued { .. } => "fetch_issued",
            SelectorTrace::FetchApplied { .. } => "fetch_applied",
            SelectorTrace::FetchFailed { .. } => "fetch_failed",
            SelectorTrace::StaleDiscarded { .. } => "stale_discarded",
        }
    }

    /// The level the event concerns, if any.
    pub fn level(&self) -> Option<Level> {
        match self {
            SelectorTrace::Cleared => None,
            SelectorTrace::Selected { level, .. }
            | SelectorTrace::FetchIssued { level, .. }
            | SelectorTrace::FetchApplied { level, .. }
            | SelectorTrace::FetchFailed { level, .. }
            | SelectorTrace::StaleDiscarded { level, .. } => Some(*level),
        }
    }
}

/// Observer for selector events.
pub trait SelectorObserver: Send + Sync {
    /// Called after the selector applied a transition.
    fn on_trace(&self, trace: &SelectorTrace);
}
