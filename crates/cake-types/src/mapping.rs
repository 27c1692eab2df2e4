//! The property mapping a single layer contributes.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::{MappingDefect, PropertyError};
use crate::name::PropertyName;
use crate::property::Property;

/// The named properties one layer contributes to a cake.
///
/// Keys are unique within a mapping and order within a mapping carries no
/// meaning. The builder methods never fail: an invalid name or a repeated
/// key is recorded as a [`MappingDefect`] and the mapping becomes
/// malformed. The compositor rejects malformed mappings before merging.
#[derive(Clone, Default)]
pub struct LayerMapping {
    entries: BTreeMap<PropertyName, Property>,
    defects: Vec<MappingDefect>,
}

impl LayerMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a property, failing on an invalid name or a repeated key.
    pub fn insert(&mut self, name: &str, property: Property) -> Result<(), MappingDefect> {
        let name = PropertyName::new(name).map_err(|err| match err {
            PropertyError::InvalidName { name, reason } => MappingDefect::InvalidName { name, reason },
            other => MappingDefect::InvalidName {
                name: name.to_string(),
                reason: other.to_string(),
            },
        })?;
        if self.entries.contains_key(&name) {
            return Err(MappingDefect::DuplicateKey(name.into()));
        }
        self.entries.insert(name, property);
        Ok(())
    }

    /// Builder form of [`Self::insert`]. Defects are recorded, not returned.
    pub fn with(mut self, name: &str, property: Property) -> Self {
        if let Err(defect) = self.insert(name, property) {
            self.defects.push(defect);
        }
        self
    }

    /// Add a method.
    pub fn method<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, PropertyError> + 'static,
    {
        self.with(name, Property::method(f))
    }

    /// Add an accessor.
    pub fn accessor<F>(self, name: &str, f: F) -> Self
    where
        F: Fn() -> Result<Value, PropertyError> + 'static,
    {
        self.with(name, Property::accessor(f))
    }

    /// Returns `true` if no defects were recorded while building.
    pub fn is_well_formed(&self) -> bool {
        self.defects.is_empty()
    }

    /// Defects recorded while building, in the order they occurred.
    pub fn defects(&self) -> &[MappingDefect] {
        &self.defects
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.entries.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Property names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &PropertyName> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PropertyName, &Property)> {
        self.entries.iter()
    }

    /// Consume the mapping, yielding its entries or every recorded defect.
    pub fn into_entries(self) -> Result<BTreeMap<PropertyName, Property>, Vec<MappingDefect>> {
        if self.defects.is_empty() {
            Ok(self.entries)
        } else {
            Err(self.defects)
        }
    }
}

impl fmt::Debug for LayerMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayerMapping")
            .field("keys", &self.entries.keys().collect::<Vec<_>>())
            .field("defects", &self.defects)
            .finish()
    }
}
