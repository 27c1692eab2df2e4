use cake_types::{Cake, LayerMapping, PropertyName, PropertyTable};

use crate::config::{ConflictReport, Discipline};
use crate::strategies::{CombineStrategy, Combined, Rejection};

/// Trait-style merge: the cake beneath is sealed before the layer is
/// applied, and any name the layer shares with it is a conflict.
///
/// Conflicting names are never dropped silently.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisjointStrategy {
    report: ConflictReport,
}

impl DisjointStrategy {
    pub fn new(report: ConflictReport) -> Self {
        Self { report }
    }
}

impl CombineStrategy for DisjointStrategy {
    fn discipline(&self) -> Discipline {
        Discipline::Disjoint
    }

    fn combine(&self, upper: Option<&Cake>, lower: LayerMapping) -> Result<Combined, Rejection> {
        let entries = lower.into_entries().map_err(Rejection::Malformed)?;
        let conflicts: Vec<PropertyName> = match upper {
            Some(upper) => {
                let shared = entries.keys().filter(|name| upper.contains(name.as_str()));
                match self.report {
                    ConflictReport::First => shared.take(1).cloned().collect(),
                    ConflictReport::All => shared.cloned().collect(),
                }
            }
            None => Vec::new(),
        };
        if !conflicts.is_empty() {
            return Err(Rejection::Conflict(conflicts));
        }

        let mut table: PropertyTable = upper.map(|c| c.properties().clone()).unwrap_or_default();
        let mut added = Vec::new();
        for (name, property) in entries {
            added.push(name.clone());
            table.insert(name, property);
        }

        Ok(Combined {
            table,
            added,
            overridden: Vec::new(),
        })
    }
}
