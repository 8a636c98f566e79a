//! Compatibility descriptors attached to catalog items.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inclusive model-year range; `to = None` is open-ended.
///
/// On the wire it is a `[from, to]` pair, e.g. `[2012, 2019]` or `[2020, null]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(i32, Option<i32>)", into = "(i32, Option<i32>)")]
pub struct YearRange {
    pub from: i32,
    pub to: Option<i32>,
}

impl YearRange {
    pub fn new(from: i32, to: Option<i32>) -> Self {
        Self { from, to }
    }

    pub fn closed(from: i32, to: i32) -> Self {
        Self { from, to: Some(to) }
    }

    pub fn open(from: i32) -> Self {
        Self { from, to: None }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.from && self.to.map_or(true, |to| year <= to)
    }

    /// A range is well formed unless `from > to`.
    pub fn is_valid(&self) -> bool {
        self.to.map_or(true, |to| self.from <= to)
    }
}

impl From<(i32, Option<i32>)> for YearRange {
    fn from((from, to): (i32, Option<i32>)) -> Self {
        Self { from, to }
    }
}

impl From<YearRange> for (i32, Option<i32>) {
    fn from(range: YearRange) -> Self {
        (range.from, range.to)
    }
}

impl fmt::Display for YearRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(to) => write!(f, "{}-{}", self.from, to),
            None => write!(f, "{}+", self.from),
        }
    }
}

/// One exclusion rule. Empty lists are wildcards.
///
/// The clause excludes a vehicle when every level it constrains is chosen
/// and matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompatibilityClause {
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub year_ranges: Vec<YearRange>,
    pub engines: Vec<String>,
}

impl CompatibilityClause {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn makes<I, S>(mut self, makes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.makes = makes.into_iter().map(Into::into).collect();
        self
    }

    pub fn models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn year_range(mut self, range: YearRange) -> Self {
        self.year_ranges.push(range);
        self
    }

    pub fn engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engines = engines.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the clause constrains anything at all.
    pub fn is_empty(&self) -> bool {
        self.makes.is_empty()
            && self.models.is_empty()
            && self.year_ranges.is_empty()
            && self.engines.is_empty()
    }
}

/// Which vehicles a catalog item fits.
///
/// Empty `models`, `year_ranges` or `engines` mean "any". `makes` empty
/// without the universal flag carries no make constraint either.
/// `excludes` always win over the include lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompatibilityDescriptor {
    /// Fits every vehicle (still subject to `excludes`).
    pub universal: bool,
    pub makes: Vec<String>,
    pub models: Vec<String>,
    pub year_ranges: Vec<YearRange>,
    pub engines: Vec<String>,
    pub excludes: Vec<CompatibilityClause>,
}

impl CompatibilityDescriptor {
    /// A universal-fit descriptor.
    pub fn universal() -> Self {
        Self {
            universal: true,
            ..Self::default()
        }
    }

    /// A descriptor fitting the given makes.
    pub fn for_makes<I, S>(makes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            makes: makes.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_year_range(mut self, range: YearRange) -> Self {
        self.year_ranges.push(range);
        self
    }

    pub fn with_engines<I, S>(mut self, engines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engines = engines.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluding(mut self, clause: CompatibilityClause) -> Self {
        self.excludes.push(clause);
        self
    }

    /// Shape problems in the descriptor; empty when it is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        check_ranges("yearRanges", &self.year_ranges, &mut problems);
        check_names("makes", &self.makes, &mut problems);
        check_names("models", &self.models, &mut problems);
        check_names("engines", &self.engines, &mut problems);

        for (i, clause) in self.excludes.iter().enumerate() {
            let scope = format!("excludes[{}]", i);
            if clause.is_empty() {
                problems.push(format!("{}: clause constrains nothing", scope));
                continue;
            }
            check_ranges(&format!("{}.yearRanges", scope), &clause.year_ranges, &mut problems);
            check_names(&format!("{}.makes", scope), &clause.makes, &mut problems);
            check_names(&format!("{}.models", scope), &clause.models, &mut problems);
            check_names(&format!("{}.engines", scope), &clause.engines, &mut problems);
        }
        problems
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn check_ranges(field: &str, ranges: &[YearRange], problems: &mut Vec<String>) {
    for range in ranges.iter().filter(|r| !r.is_valid()) {
        problems.push(format!("{}: range {} has from > to", field, range));
    }
}

fn check_names(field: &str, names: &[String], problems: &mut Vec<String>) {
    if names.iter().any(|n| n.trim().is_empty()) {
        problems.push(format!("{}: blank entry", field));
    }
}
