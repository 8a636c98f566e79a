//! Vehicle fitment engine for the auto-parts storefront.
//!
//! This crate provides the pieces a catalog page needs to answer
//! "does this part fit my car?":
//!
//! - **Vehicle**: Levels, selectable options, and the prefix-shaped selection
//! - **Selector**: The Brand → Model → Year → Engine cascade with race-safe option loading
//! - **Compat**: Compatibility descriptors and the matcher producing verdicts
//! - **Catalog**: Filtering and badge ordering of catalog items for a selection
//!
//! # Example
//!
//! ```rust,ignore
//! use fitment_core::prelude::*;
//!
//! let mut selector = Selector::new(provider);
//! let pending = selector.start()?;
//! selector.apply(pending.await);
//!
//! if let Some(pending) = selector.select(Level::Brand, OptionId::new("bmw"))? {
//!     selector.apply(pending.await);
//! }
//!
//! let results = filter(&items, selector.selection(), FilterMode::ShowAllWithBadges);
//! for entry in &results.items {
//!     println!("{} [{}]", entry.item.name, entry.verdict.compatibility.badge());
//! }
//! ```

pub mod error;
pub mod ids;

pub mod catalog;
pub mod compat;
pub mod selector;
pub mod vehicle;


pub use error::{FetchError, SelectorError};
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{FetchError, SelectorError};
    pub use crate::ids::*;

    // Vehicle
    pub use crate::vehicle::{Level, VehicleOption, VehicleSelection};

    // Selector
    pub use crate::selector::{
        reduce, FetchTicket, LevelStatus, LevelView, OptionsProvider, PendingFetch, Resolution,
        ResolvedFetch, Selector, SelectorEvent, SelectorObserver, SelectorState, SelectorTrace,
        Transition,
    };

    // Compat
    pub use crate::compat::{
        evaluate, evaluate_fitment, Compatibility, CompatibilityClause, CompatibilityDescriptor,
        FitmentData, LevelCheck, MatchReason, MatchVerdict, YearRange,
    };

    // Catalog
    pub use crate::catalog::{
        filter, CatalogItem, CompatibilityField, FilterMode, FilterResults, FilterSummary,
        FilteredItem, Fitment,
    };
}
