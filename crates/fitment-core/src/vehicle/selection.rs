//! The chosen vehicle.

use crate::error::SelectorError;
use crate::ids::OptionId;
use crate::vehicle::{Level, VehicleOption};
use serde::{Deserialize, Serialize};

/// Up to one chosen option per level.
///
/// Stored as a prefix of the level chain, so a deeper level can only be
/// chosen when every shallower level is: `Year` without `Model` cannot be
/// represented. Each option's `parent_id` matches the option above it.
///
/// Values are immutable; the selector produces a new selection per change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<VehicleOption>", into = "Vec<VehicleOption>")]
pub struct VehicleSelection {
    chosen: Vec<VehicleOption>,
}

impl VehicleSelection {
    /// The empty selection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a selection from options ordered Brand first.
    ///
    /// Fails when the path is longer than the cascade or a parent link is broken.
    pub fn from_path(path: Vec<VehicleOption>) -> Result<Self, SelectorError> {
        let mut selection = Self::empty();
        for option in path {
            selection = selection.extended(option)?;
        }
        Ok(selection)
    }

    /// Build an ad hoc selection where each name is both id and label.
    ///
    /// Handy when the caller knows the vehicle by name and has no option tree,
    /// e.g. `["BMW", "3 Series", "2015"]`.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, SelectorError> {
        let mut parent: Option<OptionId> = None;
        let mut path = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let option = match &parent {
                None => VehicleOption::root(name, name),
                Some(p) => VehicleOption::child(p, name, name),
            };
            parent = Some(option.id.clone());
            path.push(option);
        }
        Self::from_path(path)
    }

    /// The option chosen at `level`, if any.
    pub fn get(&self, level: Level) -> Option<&VehicleOption> {
        self.chosen.get(level.index())
    }

    pub fn brand(&self) -> Option<&VehicleOption> {
        self.get(Level::Brand)
    }

    pub fn model(&self) -> Option<&VehicleOption> {
        self.get(Level::Model)
    }

    pub fn year(&self) -> Option<&VehicleOption> {
        self.get(Level::Year)
    }

    pub fn engine(&self) -> Option<&VehicleOption> {
        self.get(Level::Engine)
    }

    /// Number of chosen levels.
    pub fn depth(&self) -> usize {
        self.chosen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chosen.is_empty()
    }

    /// True iff all four levels are chosen.
    pub fn is_complete(&self) -> bool {
        self.chosen.len() == Level::COUNT
    }

    pub fn is_selected(&self, level: Level) -> bool {
        level.index() < self.chosen.len()
    }

    /// The deepest chosen level.
    pub fn deepest(&self) -> Option<Level> {
        self.chosen.len().checked_sub(1).and_then(Level::from_index)
    }

    /// Chosen levels with their options, shallowest first.
    pub fn iter(&self) -> impl Iterator<Item = (Level, &VehicleOption)> {
        Level::ALL.into_iter().zip(self.chosen.iter())
    }

    /// The selection keeping only levels strictly above `level`.
    pub fn truncated(&self, level: Level) -> Self {
        Self {
            chosen: self.chosen.iter().take(level.index()).cloned().collect(),
        }
    }

    /// The selection with `option` chosen at the next free level.
    pub fn extended(&self, option: VehicleOption) -> Result<Self, SelectorError> {
        let level = Level::from_index(self.chosen.len()).ok_or_else(|| {
            SelectorError::BrokenChain {
                level: Level::Engine,
                option_id: option.id.clone(),
            }
        })?;

        let expected_parent = self.chosen.last().map(|o| &o.id);
        if option.parent_id.as_ref() != expected_parent {
            return Err(SelectorError::BrokenChain {
                level,
                option_id: option.id,
            });
        }

        let mut chosen = self.chosen.clone();
        chosen.push(option);
        Ok(Self { chosen })
    }

    /// The parent id a fetch for `level` should use.
    ///
    /// `Ok(None)` for brands; an error when the level above is not chosen.
    pub fn parent_for(&self, level: Level) -> Result<Option<OptionId>, SelectorError> {
        match level.parent() {
            None => Ok(None),
            Some(parent) => self
                .get(parent)
                .map(|o| Some(o.id.clone()))
                .ok_or(SelectorError::ParentNotSelected(level)),
        }
    }

    /// Labels joined for display, e.g. "BMW / 3 Series / 2015".
    pub fn describe(&self) -> String {
        if self.chosen.is_empty() {
            return "any vehicle".to_string();
        }
        self.chosen
            .iter()
            .map(|o| o.display_label.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

impl TryFrom<Vec<VehicleOption>> for VehicleSelection {
    type Error = SelectorError;

    fn try_from(path: Vec<VehicleOption>) -> Result<Self, Self::Error> {
        Self::from_path(path)
    }
}

impl From<VehicleSelection> for Vec<VehicleOption> {
    fn from(selection: VehicleSelection) -> Self {
        selection.chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection() {
        let s = VehicleSelection::empty();
        assert!(s.is_empty());
        assert!(!s.is_complete());
        assert_eq!(s.deepest(), None);
        assert_eq!(s.describe(), "any vehicle");
    }

    #[test]
    fn test_from_names() {
        let s = VehicleSelection::from_names(&["BMW", "3 Series", "2015", "320d"]).unwrap();
        assert!(s.is_complete());
        assert_eq!(s.deepest(), Some(Level::Engine));
        assert_eq!(s.model().unwrap().display_label, "3 Series");
        assert_eq!(s.describe(), "BMW / 3 Series / 2015 / 320d");
    }

    #[test]
    fn test_broken_chain_rejected() {
        let bmw = VehicleOption::root("bmw", "BMW");
        let a4 = VehicleOption::child(&OptionId::new("audi"), "a4", "A4");
        let err = VehicleSelection::from_path(vec![bmw, a4]).unwrap_err();
        assert!(matches!(err, SelectorError::BrokenChain { level: Level::Model, .. }));
    }

    #[test]
    fn test_too_deep_rejected() {
        assert!(VehicleSelection::from_names(&["a", "b", "c", "d", "e"]).is_err());
    }

    #[test]
    fn test_truncated() {
        let s = VehicleSelection::from_names(&["BMW", "3 Series", "2015"]).unwrap();
        let t = s.truncated(Level::Model);
        assert_eq!(t.depth(), 1);
        assert!(t.is_selected(Level::Brand));
        assert!(!t.is_selected(Level::Model));
        // original is untouched
        assert_eq!(s.depth(), 3);
    }

    #[test]
    fn test_parent_for() {
        let s = VehicleSelection::from_names(&["BMW"]).unwrap();
        assert_eq!(s.parent_for(Level::Brand), Ok(None));
        assert_eq!(s.parent_for(Level::Model), Ok(Some(OptionId::new("BMW"))));
        assert_eq!(
            s.parent_for(Level::Year),
            Err(SelectorError::ParentNotSelected(Level::Year))
        );
    }

    #[test]
    fn test_serde_validates_chain() {
        let s = VehicleSelection::from_names(&["BMW", "3 Series"]).unwrap();
        let json = serde_json::to_string(&s).unwrap();
        let back: VehicleSelection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);

        let broken = r#"[{"id":"bmw","displayLabel":"BMW"},{"id":"a4","displayLabel":"A4","parentId":"audi"}]"#;
        assert!(serde_json::from_str::<VehicleSelection>(broken).is_err());
    }
}
