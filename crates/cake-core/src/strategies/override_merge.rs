use cake_types::{Cake, LayerMapping, PropertyTable};

use crate::config::Discipline;
use crate::strategies::{CombineStrategy, Combined, Rejection};

/// Right-biased merge: every name in the lower layer takes the lower
/// layer's behavior; names only in the upper cake are kept unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverrideStrategy;

impl CombineStrategy for OverrideStrategy {
    fn discipline(&self) -> Discipline {
        Discipline::Override
    }

    fn combine(&self, upper: Option<&Cake>, lower: LayerMapping) -> Result<Combined, Rejection> {
        let entries = lower.into_entries().map_err(Rejection::Malformed)?;
        let mut table: PropertyTable = upper.map(|c| c.properties().clone()).unwrap_or_default();
        let mut added = Vec::new();
        let mut overridden = Vec::new();

        for (name, property) in entries {
            if table.contains_key(&name) {
                overridden.push(name.clone());
            } else {
                added.push(name.clone());
            }
            table.insert(name, property);
        }

        Ok(Combined {
            table,
            added,
            overridden,
        })
    }
}
