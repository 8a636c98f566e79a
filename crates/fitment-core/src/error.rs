//! Fitment error types.

use thiserror::Error;

use crate::ids::OptionId;
use crate::vehicle::Level;

/// Errors returned synchronously by the selection cascade.
///
/// Fetch failures are not in here: they are recorded as the level's
/// status and never returned from a transition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The option is not in the currently loaded list for the level.
    #[error("Invalid option for {level}: {option_id}")]
    InvalidOption { level: Level, option_id: OptionId },

    /// A level was reloaded while the level above it has no selection.
    #[error("Cannot load {0}: parent level is not selected")]
    ParentNotSelected(Level),

    /// An option's parent does not match the selection above it.
    #[error("Broken selection chain at {level}: {option_id} is not a child of the selection above")]
    BrokenChain { level: Level, option_id: OptionId },
}

/// Errors produced by an options provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The provider did not answer in time.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The parent id is unknown to the provider.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or backend failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with data it could not decode.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl FetchError {
    /// Whether retrying the same request can plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Timeout(_) | FetchError::Transport(_))
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Decode(e.to_string())
    }
}
