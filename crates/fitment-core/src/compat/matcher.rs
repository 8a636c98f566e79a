//! Matching a vehicle selection against a compatibility descriptor.
//!
//! The include pass walks the chosen levels shallowest first and stops at
//! the first mismatch. Unchosen levels never cause a mismatch; they only make
//! the verdict `PartialUnknown` when the descriptor constrains them.
//! Excludes run afterwards and can only turn a verdict into `Incompatible`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::compat::descriptor::{CompatibilityClause, CompatibilityDescriptor, YearRange};
use crate::vehicle::{Level, VehicleOption, VehicleSelection};

/// Tri-state fit outcome.
///
/// Ordered by display group: compatible items first, incompatible last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    Compatible,
    PartialUnknown,
    Incompatible,
}

impl Compatibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Compatibility::Compatible => "compatible",
            Compatibility::PartialUnknown => "partial_unknown",
            Compatibility::Incompatible => "incompatible",
        }
    }

    /// Badge text for listings.
    pub fn badge(&self) -> &'static str {
        match self {
            Compatibility::Compatible => "Fits your vehicle",
            Compatibility::PartialUnknown => "Check fitment",
            Compatibility::Incompatible => "Does not fit",
        }
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a verdict came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MatchReason {
    /// Nothing is chosen yet.
    NoSelection,
    /// The item fits any vehicle.
    UniversalFit,
    /// Every chosen level matched and nothing constrained is left unchosen.
    AllSelectedMatched,
    /// The descriptor constrains a level that is not chosen yet.
    AwaitingSelection(Level),
    /// The chosen year could not be read as a number.
    UndecidableYear(String),
    /// A chosen level is not covered by the descriptor.
    Mismatch(Level),
    /// An exclude clause (by index) matched the selection.
    Excluded(usize),
    /// The item has compatibility data that failed shape checks.
    MalformedDescriptor(Vec<String>),
}

impl fmt::Display for MatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchReason::NoSelection => write!(f, "no selection"),
            MatchReason::UniversalFit => write!(f, "universal fit"),
            MatchReason::AllSelectedMatched => write!(f, "all selected levels match"),
            MatchReason::AwaitingSelection(level) => write!(f, "select a {} to confirm", level),
            MatchReason::UndecidableYear(raw) => write!(f, "year '{}' is not a number", raw),
            MatchReason::Mismatch(level) => write!(f, "{} does not match", level),
            MatchReason::Excluded(i) => write!(f, "excluded by rule #{}", i + 1),
            MatchReason::MalformedDescriptor(problems) => {
                write!(f, "malformed compatibility data: {}", problems.join("; "))
            }
        }
    }
}

/// One evaluated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCheck {
    pub level: Level,
    pub matched: bool,
    /// Exclude clause index, or `None` for the include pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clause: Option<usize>,
}

impl LevelCheck {
    fn include(level: Level, matched: bool) -> Self {
        Self {
            level,
            matched,
            clause: None,
        }
    }
}

/// Full matcher output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchVerdict {
    pub compatibility: Compatibility,
    pub reason: MatchReason,
    /// Levels evaluated, in evaluation order.
    pub checks: Vec<LevelCheck>,
}

impl MatchVerdict {
    fn new(compatibility: Compatibility, reason: MatchReason, checks: Vec<LevelCheck>) -> Self {
        Self {
            compatibility,
            reason,
            checks,
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.compatibility == Compatibility::Compatible
    }

    pub fn is_incompatible(&self) -> bool {
        self.compatibility == Compatibility::Incompatible
    }

    /// Levels that matched in the include pass.
    pub fn matched_levels(&self) -> Vec<Level> {
        self.checks
            .iter()
            .filter(|c| c.matched && c.clause.is_none())
            .map(|c| c.level)
            .collect()
    }
}

/// Compatibility data as found on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitmentData<'a> {
    /// No compatibility data; treated as universal fit.
    Missing,
    Descriptor(&'a CompatibilityDescriptor),
    /// Data present but unreadable; carries a description of the problem.
    Unreadable(&'a str),
}

/// Evaluate an item's compatibility data, whatever shape it is in.
pub fn evaluate_fitment(selection: &VehicleSelection, data: FitmentData<'_>) -> MatchVerdict {
    match data {
        FitmentData::Descriptor(descriptor) => evaluate(selection, descriptor),
        FitmentData::Missing => evaluate(selection, &CompatibilityDescriptor::universal()),
        FitmentData::Unreadable(problem) => MatchVerdict::new(
            Compatibility::PartialUnknown,
            MatchReason::MalformedDescriptor(vec![problem.to_string()]),
            Vec::new(),
        ),
    }
}

/// Decide whether the item described by `descriptor` fits `selection`.
///
/// Pure: the same inputs always give the same verdict.
pub fn evaluate(selection: &VehicleSelection, descriptor: &CompatibilityDescriptor) -> MatchVerdict {
    let problems = descriptor.validate();
    if !problems.is_empty() {
        return MatchVerdict::new(
            Compatibility::PartialUnknown,
            MatchReason::MalformedDescriptor(problems),
            Vec::new(),
        );
    }

    if selection.is_empty() {
        return MatchVerdict::new(
            Compatibility::PartialUnknown,
            MatchReason::NoSelection,
            Vec::new(),
        );
    }

    let mut verdict = include_pass(selection, descriptor);
    if verdict.is_incompatible() {
        return verdict;
    }

    for (index, clause) in descriptor.excludes.iter().enumerate() {
        if let Some(levels) = exclusion_hits(selection, clause) {
            verdict
                .checks
                .extend(levels.into_iter().map(|level| LevelCheck {
                    level,
                    matched: true,
                    clause: Some(index),
                }));
            verdict.compatibility = Compatibility::Incompatible;
            verdict.reason = MatchReason::Excluded(index);
            return verdict;
        }
    }

    verdict
}

fn include_pass(selection: &VehicleSelection, descriptor: &CompatibilityDescriptor) -> MatchVerdict {
    if descriptor.universal {
        let checks = selection
            .iter()
            .map(|(level, _)| LevelCheck::include(level, true))
            .collect();
        return MatchVerdict::new(Compatibility::Compatible, MatchReason::UniversalFit, checks);
    }

    let rules = Rules::include(descriptor);
    let mut checks = Vec::new();
    let mut undecided = None;
    let mut awaiting = None;

    for level in Level::ALL {
        match selection.get(level) {
            Some(option) => match rules.test(level, option) {
                LevelTest::Unconstrained | LevelTest::Match => {
                    checks.push(LevelCheck::include(level, true));
                }
                LevelTest::Mismatch => {
                    checks.push(LevelCheck::include(level, false));
                    return MatchVerdict::new(
                        Compatibility::Incompatible,
                        MatchReason::Mismatch(level),
                        checks,
                    );
                }
                LevelTest::Undecidable => {
                    checks.push(LevelCheck::include(level, false));
                    undecided.get_or_insert_with(|| option.display_label.clone());
                }
            },
            None => {
                if awaiting.is_none() && rules.constrains(level) {
                    awaiting = Some(level);
                }
            }
        }
    }

    let (compatibility, reason) = match (undecided, awaiting) {
        (Some(raw), _) => (Compatibility::PartialUnknown, MatchReason::UndecidableYear(raw)),
        (None, Some(level)) => (Compatibility::PartialUnknown, MatchReason::AwaitingSelection(level)),
        (None, None) => (Compatibility::Compatible, MatchReason::AllSelectedMatched),
    };
    MatchVerdict::new(compatibility, reason, checks)
}

/// Levels of `clause` that matched, when the clause fires.
///
/// A clause fires only when every level it constrains is chosen and matches.
fn exclusion_hits(selection: &VehicleSelection, clause: &CompatibilityClause) -> Option<Vec<Level>> {
    let rules = Rules::exclude(clause);
    let mut hits = Vec::new();
    for level in Level::ALL.into_iter().filter(|l| rules.constrains(*l)) {
        let option = selection.get(level)?;
        match rules.test(level, option) {
            LevelTest::Match => hits.push(level),
            _ => return None,
        }
    }
    if hits.is_empty() {
        None
    } else {
        Some(hits)
    }
}

enum LevelTest {
    Unconstrained,
    Match,
    Mismatch,
    Undecidable,
}

/// Per-level constraints shared by the include and exclude passes.
struct Rules<'a> {
    makes: &'a [String],
    models: &'a [String],
    years: &'a [YearRange],
    engines: &'a [String],
}

impl<'a> Rules<'a> {
    fn include(descriptor: &'a CompatibilityDescriptor) -> Self {
        Self {
            makes: &descriptor.makes,
            models: &descriptor.models,
            years: &descriptor.year_ranges,
            engines: &descriptor.engines,
        }
    }

    fn exclude(clause: &'a CompatibilityClause) -> Self {
        Self {
            makes: &clause.makes,
            models: &clause.models,
            years: &clause.year_ranges,
            engines: &clause.engines,
        }
    }

    fn constrains(&self, level: Level) -> bool {
        match level {
            Level::Brand => !self.makes.is_empty(),
            Level::Model => !self.models.is_empty(),
            Level::Year => !self.years.is_empty(),
            Level::Engine => !self.engines.is_empty(),
        }
    }

    fn test(&self, level: Level, option: &VehicleOption) -> LevelTest {
        if !self.constrains(level) {
            return LevelTest::Unconstrained;
        }
        let matched = match level {
            Level::Brand => names_match(self.makes, option),
            Level::Model => names_match(self.models, option),
            Level::Engine => names_match(self.engines, option),
            Level::Year => match option.as_year() {
                Some(year) => self.years.iter().any(|r| r.contains(year)),
                None => return LevelTest::Undecidable,
            },
        };
        if matched {
            LevelTest::Match
        } else {
            LevelTest::Mismatch
        }
    }
}

fn names_match(names: &[String], option: &VehicleOption) -> bool {
    names.iter().any(|name| option.is_named(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bmw_2012_2019() -> CompatibilityDescriptor {
        CompatibilityDescriptor::for_makes(["BMW"]).with_year_range(YearRange::closed(2012, 2019))
    }

    fn sel(names: &[&str]) -> VehicleSelection {
        VehicleSelection::from_names(names).unwrap()
    }

    #[test]
    fn test_full_match_with_empty_models() {
        let v = evaluate(&sel(&["BMW", "3 Series", "2015"]), &bmw_2012_2019());
        assert_eq!(v.compatibility, Compatibility::Compatible);
        assert_eq!(v.reason, MatchReason::AllSelectedMatched);
        assert_eq!(v.matched_levels(), vec![Level::Brand, Level::Model, Level::Year]);
    }

    #[test]
    fn test_make_mismatch_is_decisive() {
        let v = evaluate(&sel(&["Audi"]), &bmw_2012_2019());
        assert_eq!(v.compatibility, Compatibility::Incompatible);
        assert_eq!(v.reason, MatchReason::Mismatch(Level::Brand));
        assert_eq!(v.checks, vec![LevelCheck::include(Level::Brand, false)]);
    }

    #[test]
    fn test_exclude_overrides_compatible() {
        let d = bmw_2012_2019().excluding(CompatibilityClause::new().engines(["320d"]));
        let v = evaluate(&sel(&["BMW", "3 Series", "2015", "320d"]), &d);
        assert_eq!(v.compatibility, Compatibility::Incompatible);
        assert_eq!(v.reason, MatchReason::Excluded(0));
        assert_eq!(v.checks.last().unwrap().clause, Some(0));

        let v = evaluate(&sel(&["BMW", "3 Series", "2015", "330i"]), &d);
        assert_eq!(v.compatibility, Compatibility::Compatible);
    }

    #[test]
    fn test_empty_selection_is_partial() {
        for d in [bmw_2012_2019(), CompatibilityDescriptor::universal()] {
            let v = evaluate(&VehicleSelection::empty(), &d);
            assert_eq!(v.compatibility, Compatibility::PartialUnknown);
            assert_eq!(v.reason, MatchReason::NoSelection);
        }
    }

    #[test]
    fn test_brand_only_awaits_year() {
        let v = evaluate(&sel(&["BMW"]), &bmw_2012_2019());
        assert_eq!(v.compatibility, Compatibility::PartialUnknown);
        assert_eq!(v.reason, MatchReason::AwaitingSelection(Level::Year));
    }

    #[test]
    fn test_brand_only_with_make_only_descriptor() {
        let v = evaluate(&sel(&["bmw"]), &CompatibilityDescriptor::for_makes(["BMW"]));
        assert_eq!(v.compatibility, Compatibility::Compatible);
    }

    #[test]
    fn test_model_not_listed() {
        let d = bmw_2012_2019().with_models(["5 Series"]);
        let v = evaluate(&sel(&["BMW", "3 Series"]), &d);
        assert_eq!(v.reason, MatchReason::Mismatch(Level::Model));
    }

    #[test]
    fn test_year_outside_every_range() {
        let d = bmw_2012_2019().with_year_range(YearRange::open(2022));
        assert!(evaluate(&sel(&["BMW", "3 Series", "2020"]), &d).is_incompatible());
        assert!(evaluate(&sel(&["BMW", "3 Series", "2023"]), &d).is_compatible());
    }

    #[test]
    fn test_engine_membership() {
        let d = bmw_2012_2019().with_engines(["320d", "318d"]);
        assert!(evaluate(&sel(&["BMW", "3 Series", "2015", "318D"]), &d).is_compatible());
        let v = evaluate(&sel(&["BMW", "3 Series", "2015", "330i"]), &d);
        assert_eq!(v.reason, MatchReason::Mismatch(Level::Engine));
    }

    #[test]
    fn test_unparsable_year_is_undecidable() {
        let v = evaluate(&sel(&["BMW", "3 Series", "facelift"]), &bmw_2012_2019());
        assert_eq!(v.compatibility, Compatibility::PartialUnknown);
        assert_eq!(v.reason, MatchReason::UndecidableYear("facelift".into()));
        assert_eq!(
            v.checks,
            vec![
                LevelCheck::include(Level::Brand, true),
                LevelCheck::include(Level::Model, true),
                LevelCheck::include(Level::Year, false),
            ]
        );
        assert!(v.matched_levels().iter().all(|l| *l != Level::Year));
    }

    #[test]
    fn test_numeric_option_ids_are_not_years() {
        let bmw = VehicleOption::root("7", "BMW");
        let model = VehicleOption::child(&bmw.id, "31", "3 Series");
        let year = VehicleOption::child(&model.id, "1042", "2015");
        let s = VehicleSelection::from_path(vec![bmw, model, year]).unwrap();

        let v = evaluate(&s, &bmw_2012_2019());
        assert_eq!(v.compatibility, Compatibility::Compatible);
        assert_eq!(v.reason, MatchReason::AllSelectedMatched);
    }

    #[test]
    fn test_universal_still_subject_to_excludes() {
        let d = CompatibilityDescriptor::universal()
            .excluding(CompatibilityClause::new().makes(["Lada"]));
        assert_eq!(
            evaluate(&sel(&["BMW"]), &d).reason,
            MatchReason::UniversalFit
        );
        assert_eq!(evaluate(&sel(&["Dacia", "Logan"]), &d).compatibility, Compatibility::Compatible);
        assert_eq!(evaluate(&sel(&["LADA", "Niva"]), &d).reason, MatchReason::Excluded(0));
    }

    #[test]
    fn test_exclude_needs_every_constrained_level() {
        let d = bmw_2012_2019().excluding(
            CompatibilityClause::new()
                .models(["3 Series"])
                .year_range(YearRange::closed(2015, 2016)),
        );
        // Year not chosen yet: the clause cannot fire.
        let v = evaluate(&sel(&["BMW", "3 Series"]), &d);
        assert_eq!(v.compatibility, Compatibility::PartialUnknown);
        // Both levels chosen and matching.
        assert!(evaluate(&sel(&["BMW", "3 Series", "2015"]), &d).is_incompatible());
        // Model matches, year does not.
        assert!(evaluate(&sel(&["BMW", "3 Series", "2018"]), &d).is_compatible());
    }

    #[test]
    fn test_exclude_upgrades_nothing() {
        let d = bmw_2012_2019().excluding(CompatibilityClause::new().makes(["Audi"]));
        let v = evaluate(&sel(&["Audi"]), &d);
        assert_eq!(v.reason, MatchReason::Mismatch(Level::Brand));
    }

    #[test]
    fn test_malformed_descriptor_is_permissive() {
        let d = CompatibilityDescriptor::for_makes(["Audi"])
            .with_year_range(YearRange::closed(2020, 2010));
        let v = evaluate(&sel(&["BMW"]), &d);
        assert_eq!(v.compatibility, Compatibility::PartialUnknown);
        assert!(matches!(v.reason, MatchReason::MalformedDescriptor(_)));
        assert!(v.checks.is_empty());
    }

    #[test]
    fn test_missing_data_is_universal() {
        let v = evaluate_fitment(&sel(&["BMW"]), FitmentData::Missing);
        assert_eq!(v.compatibility, Compatibility::Compatible);
        let v = evaluate_fitment(&sel(&["BMW"]), FitmentData::Unreadable("expected a map"));
        assert_eq!(v.compatibility, Compatibility::PartialUnknown);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let d = bmw_2012_2019().excluding(CompatibilityClause::new().engines(["320d"]));
        let s = sel(&["BMW", "3 Series", "2015", "320d"]);
        assert_eq!(evaluate(&s, &d), evaluate(&s, &d));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(MatchReason::AwaitingSelection(Level::Year).to_string(), "select a year to confirm");
        assert_eq!(MatchReason::Excluded(0).to_string(), "excluded by rule #1");
    }
}
