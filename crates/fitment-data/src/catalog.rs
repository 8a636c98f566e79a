//! Catalog file loading.

use std::path::Path;

use fitment_core::catalog::CatalogItem;
use serde::Deserialize;

use crate::error::DataError;

/// Either a bare array of items or `{ "items": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Items(Vec<CatalogItem>),
    Wrapped { items: Vec<CatalogItem> },
}

pub fn parse_catalog(json: &str) -> Result<Vec<CatalogItem>, DataError> {
    let doc: CatalogDocument = serde_json::from_str(json)?;
    Ok(match doc {
        CatalogDocument::Items(items) | CatalogDocument::Wrapped { items } => items,
    })
}

/// Read a catalog file. Items with unreadable compatibility data are kept.
pub fn read_catalog(path: impl AsRef<Path>) -> Result<Vec<CatalogItem>, DataError> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| DataError::io(path, e))?;
    let items = parse_catalog(&json)?;
    tracing::debug!(path = %path.display(), items = items.len(), "catalog loaded");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitment_core::catalog::Fitment;
    use fitment_core::compat::FitmentData;

    #[test]
    fn test_parse_array_and_wrapped() {
        let array = r#"[{"id": "p1", "sku": "A", "name": "Pads"}]"#;
        let wrapped = r#"{"items": [{"id": "p1", "sku": "A", "name": "Pads"}]}"#;
        assert_eq!(parse_catalog(array).unwrap(), parse_catalog(wrapped).unwrap());
    }

    #[test]
    fn test_bad_descriptor_keeps_item() {
        let json = r#"[
            {"id": "p1", "sku": "A", "name": "Pads", "compatibility": {"makes": "BMW"}},
            {"id": "p2", "sku": "B", "name": "Disc", "compatibility": {"makes": ["BMW"]}}
        ]"#;
        let items = parse_catalog(json).unwrap();
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0].fitment(), FitmentData::Unreadable(_)));
        assert!(matches!(items[1].fitment(), FitmentData::Descriptor(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = read_catalog("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, DataError::Io { .. }));
    }
}
