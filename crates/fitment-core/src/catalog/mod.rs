//! Catalog items and compatibility filtering.

mod filter;
mod item;

pub use filter::{filter, FilterMode, FilterResults, FilterSummary, FilteredItem};
pub use item::{CatalogItem, CompatibilityField, Fitment};
