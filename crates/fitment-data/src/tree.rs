//! In-memory vehicle tree.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use fitment_core::vehicle::{Level, VehicleOption};
use fitment_core::OptionId;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Vehicle tree document, nested Brand → Model → Year → Engine.
///
/// ```json
/// { "brands": [ { "id": "bmw", "name": "BMW", "models": [
///     { "id": "bmw-3", "name": "3 Series", "years": [
///         { "year": 2015, "engines": [ { "id": "bmw-3-320d", "name": "320d" } ] } ] } ] } ] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default)]
    pub brands: Vec<BrandNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub models: Vec<ModelNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub years: Vec<YearNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearNode {
    pub year: i32,
    #[serde(default)]
    pub engines: Vec<EngineNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineNode {
    pub id: String,
    pub name: String,
}

/// Indexed vehicle options, keyed by parent.
///
/// Year options get the id `"{model_id}:{year}"` and the year as label.
#[derive(Debug, Clone, Default)]
pub struct VehicleTree {
    roots: Vec<VehicleOption>,
    children: HashMap<OptionId, Vec<VehicleOption>>,
    levels: HashMap<OptionId, Level>,
}

impl VehicleTree {
    /// Build a tree from a parsed document, checking ids.
    pub fn from_document(doc: TreeDocument) -> Result<Self, DataError> {
        let mut builder = TreeBuilder::default();

        for brand in doc.brands {
            let brand_id = builder.add(Level::Brand, None, &brand.id, &brand.name)?;
            for model in brand.models {
                let model_id = builder.add(Level::Model, Some(&brand_id), &model.id, &model.name)?;
                for year in model.years {
                    let id = format!("{}:{}", model_id, year.year);
                    let year_id =
                        builder.add(Level::Year, Some(&model_id), &id, &year.year.to_string())?;
                    for engine in year.engines {
                        builder.add(Level::Engine, Some(&year_id), &engine.id, &engine.name)?;
                    }
                }
            }
        }

        Ok(builder.tree)
    }

    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let doc: TreeDocument = serde_json::from_str(json)?;
        Self::from_document(doc)
    }

    /// Read and parse a tree file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DataError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
        Self::from_json(&json)
    }

    /// Options at `level` below `parent`.
    ///
    /// `None` when the parent is unknown or sits at the wrong level.
    pub fn children(&self, level: Level, parent: Option<&OptionId>) -> Option<&[VehicleOption]> {
        match (level.parent(), parent) {
            (None, None) => Some(self.roots.as_slice()),
            (Some(expected), Some(parent)) => {
                if self.levels.get(parent) != Some(&expected) {
                    return None;
                }
                Some(self.children.get(parent).map_or(&[][..], Vec::as_slice))
            }
            _ => None,
        }
    }

    pub fn brands(&self) -> &[VehicleOption] {
        &self.roots
    }

    /// Level of a known option id.
    pub fn level_of(&self, id: &OptionId) -> Option<Level> {
        self.levels.get(id).copied()
    }

    /// Number of options at every level.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[derive(Default)]
struct TreeBuilder {
    tree: VehicleTree,
    seen: HashSet<OptionId>,
}

impl TreeBuilder {
    fn add(
        &mut self,
        level: Level,
        parent: Option<&OptionId>,
        id: &str,
        label: &str,
    ) -> Result<OptionId, DataError> {
        if id.trim().is_empty() || label.trim().is_empty() {
            return Err(DataError::InvalidTree(format!(
                "{} under {} has a blank id or name",
                level,
                parent.map_or("root", OptionId::as_str)
            )));
        }
        let option = match parent {
            None => VehicleOption::root(id, label),
            Some(p) => VehicleOption::child(p, id, label),
        };
        if !self.seen.insert(option.id.clone()) {
            return Err(DataError::InvalidTree(format!("duplicate id: {}", option.id)));
        }

        let id = option.id.clone();
        self.tree.levels.insert(id.clone(), level);
        match parent {
            None => self.tree.roots.push(option),
            Some(p) => self.tree.children.entry(p.clone()).or_default().push(option),
        }
        Ok(id)
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_TREE: &str = r#"{
    "brands": [
        { "id": "bmw", "name": "BMW", "models": [
            { "id": "bmw-3", "name": "3 Series", "years": [
                { "year": 2015, "engines": [
                    { "id": "bmw-3-2015-320d", "name": "320d" },
                    { "id": "bmw-3-2015-330i", "name": "330i" }
                ] },
                { "year": 2016 }
            ] }
        ] },
        { "id": "audi", "name": "Audi" }
    ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_levels() {
        let tree = VehicleTree::from_json(SAMPLE_TREE).unwrap();
        assert_eq!(tree.brands().len(), 2);
        assert_eq!(tree.len(), 7);

        let models = tree.children(Level::Model, Some(&"bmw".into())).unwrap();
        assert_eq!(models[0].display_label, "3 Series");
        assert_eq!(models[0].parent_id, Some(OptionId::new("bmw")));

        let years = tree.children(Level::Year, Some(&"bmw-3".into())).unwrap();
        assert_eq!(years[0].id.as_str(), "bmw-3:2015");
        assert_eq!(years[0].as_year(), Some(2015));

        let engines = tree.children(Level::Engine, Some(&years[0].id)).unwrap();
        assert_eq!(engines.len(), 2);
    }

    #[test]
    fn test_leaf_without_children_is_empty() {
        let tree = VehicleTree::from_json(SAMPLE_TREE).unwrap();
        assert_eq!(tree.children(Level::Model, Some(&"audi".into())), Some(&[][..]));
    }

    #[test]
    fn test_wrong_level_or_unknown_parent() {
        let tree = VehicleTree::from_json(SAMPLE_TREE).unwrap();
        assert!(tree.children(Level::Year, Some(&"bmw".into())).is_none());
        assert!(tree.children(Level::Model, Some(&"tesla".into())).is_none());
        assert!(tree.children(Level::Model, None).is_none());
        assert!(tree.children(Level::Brand, Some(&"bmw".into())).is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let json = r#"{"brands": [{"id": "bmw", "name": "BMW"}, {"id": "bmw", "name": "BMW again"}]}"#;
        let err = VehicleTree::from_json(json).unwrap_err();
        assert!(matches!(err, DataError::InvalidTree(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn test_blank_name_rejected() {
        let json = r#"{"brands": [{"id": "bmw", "name": " "}]}"#;
        assert!(matches!(
            VehicleTree::from_json(json),
            Err(DataError::InvalidTree(_))
        ));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            VehicleTree::from_json("{"),
            Err(DataError::Json(_))
        ));
    }
}
