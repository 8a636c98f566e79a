//! Vehicle module.
//!
//! Contains the selection levels, selectable options, and the vehicle selection.

mod level;
mod option;
mod selection;

pub use level::Level;
pub use option::VehicleOption;
pub use selection::VehicleSelection;
