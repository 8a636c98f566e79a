//! Selector module.
//!
//! Contains the Brand → Model → Year → Engine cascade: the pure state and
//! transition function, the provider seam, and the async driver.

mod driver;
mod observer;
mod provider;
mod state;

pub use driver::{PendingFetch, ResolvedFetch, Selector};
pub use observer::{SelectorObserver, SelectorTrace};
pub use provider::OptionsProvider;
pub use state::{
    reduce, FetchTicket, LevelStatus, LevelView, Resolution, SelectorEvent, SelectorState,
    Transition,
};
