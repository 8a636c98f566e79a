//! Catalog items carrying compatibility data.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::compat::{CompatibilityDescriptor, FitmentData};
use crate::ids::PartId;

/// Anything that can be matched against a vehicle.
pub trait Fitment {
    fn fitment(&self) -> FitmentData<'_>;
}

/// Compatibility data as read from the catalog store.
///
/// Reading never fails: data that does not parse as a descriptor is kept as
/// `Unreadable` so the item is still listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompatibilityField {
    #[default]
    Missing,
    Present(CompatibilityDescriptor),
    Unreadable(String),
}

impl CompatibilityField {
    pub fn as_fitment(&self) -> FitmentData<'_> {
        match self {
            CompatibilityField::Missing => FitmentData::Missing,
            CompatibilityField::Present(d) => FitmentData::Descriptor(d),
            CompatibilityField::Unreadable(problem) => FitmentData::Unreadable(problem),
        }
    }
}

impl From<CompatibilityDescriptor> for CompatibilityField {
    fn from(descriptor: CompatibilityDescriptor) -> Self {
        CompatibilityField::Present(descriptor)
    }
}

impl<'de> Deserialize<'de> for CompatibilityField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(serde_json::Value::Null) => CompatibilityField::Missing,
            Some(value) => match serde_json::from_value(value) {
                Ok(descriptor) => CompatibilityField::Present(descriptor),
                Err(e) => CompatibilityField::Unreadable(e.to_string()),
            },
        })
    }
}

impl Serialize for CompatibilityField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CompatibilityField::Missing => serializer.serialize_none(),
            CompatibilityField::Present(d) => d.serialize(serializer),
            CompatibilityField::Unreadable(problem) => serializer.serialize_str(problem),
        }
    }
}

/// A part listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique part identifier.
    pub id: PartId,
    /// Stock keeping unit.
    pub sku: String,
    /// Part name.
    pub name: String,
    /// Part manufacturer (e.g., "Bosch").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Price in stotinki.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<i64>,
    /// Which vehicles the part fits.
    #[serde(default)]
    pub compatibility: CompatibilityField,
}

impl CatalogItem {
    /// Create an item without compatibility data.
    pub fn new(id: impl Into<PartId>, sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            name: name.into(),
            manufacturer: None,
            price_cents: None,
            compatibility: CompatibilityField::Missing,
        }
    }

    pub fn with_compatibility(mut self, descriptor: CompatibilityDescriptor) -> Self {
        self.compatibility = descriptor.into();
        self
    }
}

impl Fitment for CatalogItem {
    fn fitment(&self) -> FitmentData<'_> {
        self.compatibility.as_fitment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_with_descriptor() {
        let json = r#"{"id":"p1","sku":"BRK-1","name":"Brake pads","compatibility":{"makes":["BMW"]}}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert!(matches!(item.fitment(), FitmentData::Descriptor(d) if d.makes == vec!["BMW"]));
    }

    #[test]
    fn test_missing_compatibility() {
        let json = r#"{"id":"p2","sku":"WIP-1","name":"Wiper"}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.fitment(), FitmentData::Missing);

        let json = r#"{"id":"p2","sku":"WIP-1","name":"Wiper","compatibility":null}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.fitment(), FitmentData::Missing);
    }

    #[test]
    fn test_unreadable_compatibility_keeps_item() {
        let json = r#"{"id":"p3","sku":"FLT-1","name":"Oil filter","compatibility":{"yearRanges":"2010-2015"}}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert!(matches!(item.fitment(), FitmentData::Unreadable(_)));
    }
}
