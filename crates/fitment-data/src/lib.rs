//! Data access for the vehicle selector.
//!
//! This crate provides:
//! - `VehicleTree` - In-memory Brand → Model → Year → Engine tree, loadable from JSON
//! - `StaticOptionsProvider` - `OptionsProvider` backed by a `VehicleTree`
//! - `PolicyProvider` - Per-level timeout/retry wrapper around any provider
//! - `TimeoutConfig`, `RetryPolicy` - Fetch policies
//! - `read_catalog` - Catalog file loading

mod catalog;
mod error;
mod policy;
mod provider;
mod retry;
mod timeout;
mod tree;

pub use catalog::*;
pub use error::*;
pub use policy::*;
pub use provider::*;
pub use retry::*;
pub use timeout::*;
pub use tree::*;
