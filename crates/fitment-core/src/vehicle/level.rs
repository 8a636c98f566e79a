//! Selection levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One step of the vehicle cascade.
///
/// Levels are totally ordered: `Brand < Model < Year < Engine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Vehicle make.
    Brand,
    /// Model of the make.
    Model,
    /// Model year.
    Year,
    /// Engine variant.
    Engine,
}

impl Level {
    /// All levels, shallowest first.
    pub const ALL: [Level; 4] = [Level::Brand, Level::Model, Level::Year, Level::Engine];

    /// Number of levels in the cascade.
    pub const COUNT: usize = 4;

    /// Zero-based depth of this level.
    pub fn index(self) -> usize {
        match self {
            Level::Brand => 0,
            Level::Model => 1,
            Level::Year => 2,
            Level::Engine => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The level below this one, if any.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The level above this one, if any.
    pub fn parent(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Levels strictly deeper than this one.
    pub fn deeper(self) -> impl Iterator<Item = Level> {
        Self::ALL.into_iter().skip(self.index() + 1)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Brand => "brand",
            Level::Model => "model",
            Level::Year => "year",
            Level::Engine => "engine",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Level::Brand => "Brand",
            Level::Model => "Model",
            Level::Year => "Year",
            Level::Engine => "Engine",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brand" | "make" => Ok(Level::Brand),
            "model" => Ok(Level::Model),
            "year" => Ok(Level::Year),
            "engine" => Ok(Level::Engine),
            other => Err(format!("unknown level: {}", other)),
        }
    }
}
