//! Selectable vehicle options.

use crate::ids::OptionId;
use serde::{Deserialize, Serialize};

/// A selectable value at one level (a brand, a model, a year, an engine).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleOption {
    /// Identifier, unique among siblings.
    pub id: OptionId,
    /// Label shown to the shopper.
    pub display_label: String,
    /// Id of the option one level up; `None` for brands.
    #[serde(default)]
    pub parent_id: Option<OptionId>,
}

impl VehicleOption {
    /// Create a top-level option (a brand).
    pub fn root(id: impl Into<OptionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_label: label.into(),
            parent_id: None,
        }
    }

    /// Create an option nested under `parent`.
    pub fn child(parent: &OptionId, id: impl Into<OptionId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_label: label.into(),
            parent_id: Some(parent.clone()),
        }
    }

    /// Whether a free-form name refers to this option.
    ///
    /// Compares against both the id and the label, ignoring case and
    /// surrounding whitespace.
    pub fn is_named(&self, name: &str) -> bool {
        let name = normalize(name);
        !name.is_empty()
            && (name == normalize(self.id.as_str()) || name == normalize(&self.display_label))
    }

    /// Interpret the option as a model year.
    ///
    /// Reads the label first and falls back to the id, taking the first
    /// whitespace-separated token, so `"2015"` and `"2015 г."` both read as 2015.
    /// Ids are opaque and only consulted when the label carries no year.
    pub fn as_year(&self) -> Option<i32> {
        [self.display_label.as_str(), self.id.as_str()]
            .into_iter()
            .find_map(|raw| raw.split_whitespace().next()?.parse::<i32>().ok())
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
