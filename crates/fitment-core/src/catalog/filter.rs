//! Filtering catalog items for a vehicle selection.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::catalog::Fitment;
use crate::compat::{evaluate_fitment, Compatibility, MatchVerdict};
use crate::vehicle::VehicleSelection;

/// How non-matching items are presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Keep only confirmed fits, in catalog order.
    #[serde(alias = "strict")]
    StrictCompatibleOnly,
    /// Keep everything, grouped compatible / partial / incompatible.
    #[default]
    #[serde(alias = "all")]
    ShowAllWithBadges,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::StrictCompatibleOnly => "strict",
            FilterMode::ShowAllWithBadges => "all",
        }
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" | "strict_compatible_only" => Ok(FilterMode::StrictCompatibleOnly),
            "all" | "badges" | "show_all_with_badges" => Ok(FilterMode::ShowAllWithBadges),
            other => Err(format!("unknown filter mode: {}", other)),
        }
    }
}

/// An item with its verdict.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredItem<'a, T> {
    pub item: &'a T,
    pub verdict: MatchVerdict,
    /// Index of the item in the input.
    pub position: usize,
}

/// Verdict counts over every evaluated item, including hidden ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub total: usize,
    pub compatible: usize,
    pub partial_unknown: usize,
    pub incompatible: usize,
}

impl FilterSummary {
    fn record(&mut self, compatibility: Compatibility) {
        self.total += 1;
        match compatibility {
            Compatibility::Compatible => self.compatible += 1,
            Compatibility::PartialUnknown => self.partial_unknown += 1,
            Compatibility::Incompatible => self.incompatible += 1,
        }
    }

    pub fn count(&self, compatibility: Compatibility) -> usize {
        match compatibility {
            Compatibility::Compatible => self.compatible,
            Compatibility::PartialUnknown => self.partial_unknown,
            Compatibility::Incompatible => self.incompatible,
        }
    }
}

/// Filter output container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResults<'a, T> {
    pub mode: FilterMode,
    pub items: Vec<FilteredItem<'a, T>>,
    pub summary: FilterSummary,
}

impl<'a, T> FilterResults<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Items with the given verdict, in result order.
    pub fn with_compatibility(
        &self,
        compatibility: Compatibility,
    ) -> impl Iterator<Item = &FilteredItem<'a, T>> {
        self.items
            .iter()
            .filter(move |i| i.verdict.compatibility == compatibility)
    }
}

/// Match every item against `selection` and arrange them for display.
///
/// Strict mode is a stable filter. Badge mode is a stable partition into
/// compatible, partial and incompatible groups; items never swap places
/// within a group.
pub fn filter<'a, T: Fitment>(
    items: &'a [T],
    selection: &VehicleSelection,
    mode: FilterMode,
) -> FilterResults<'a, T> {
    let mut summary = FilterSummary::default();
    let mut groups: [Vec<FilteredItem<'a, T>>; 3] = [Vec::new(), Vec::new(), Vec::new()];

    for (position, item) in items.iter().enumerate() {
        let verdict = evaluate_fitment(selection, item.fitment());
        let compatibility = verdict.compatibility;
        summary.record(compatibility);

        if mode == FilterMode::StrictCompatibleOnly && compatibility != Compatibility::Compatible {
            continue;
        }
        groups[group_index(compatibility)].push(FilteredItem {
            item,
            verdict,
            position,
        });
    }

    tracing::debug!(
        mode = mode.as_str(),
        total = summary.total,
        compatible = summary.compatible,
        partial = summary.partial_unknown,
        incompatible = summary.incompatible,
        "catalog filtered"
    );

    FilterResults {
        mode,
        items: groups.into_iter().flatten().collect(),
        summary,
    }
}

fn group_index(compatibility: Compatibility) -> usize {
    match compatibility {
        Compatibility::Compatible => 0,
        Compatibility::PartialUnknown => 1,
        Compatibility::Incompatible => 2,
    }
}
