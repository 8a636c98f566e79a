//! Compatibility module.
//!
//! Contains compatibility descriptors and the matcher that turns a
//! (selection, descriptor) pair into a verdict.

mod descriptor;
mod matcher;

pub use descriptor::{CompatibilityClause, CompatibilityDescriptor, YearRange};
pub use matcher::{
    evaluate, evaluate_fitment, Compatibility, FitmentData, LevelCheck, MatchReason, MatchVerdict,
};
