//! Combine strategies: how one layer's mapping is merged onto the cake
//! beneath it.

pub mod disjoint;
pub mod override_merge;

pub use disjoint::DisjointStrategy;
pub use override_merge::OverrideStrategy;

use cake_types::{Cake, LayerMapping, MappingDefect, PropertyName, PropertyTable};

use crate::config::{ConflictReport, Discipline};

/// The result of merging one layer.
#[derive(Debug)]
pub struct Combined {
    /// The merged property table, ready to be sealed.
    pub table: PropertyTable,
    /// Names this layer introduced.
    pub added: Vec<PropertyName>,
    /// Names this layer replaced.
    pub overridden: Vec<PropertyName>,
}

/// Why a strategy refused to merge a layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Rejection {
    /// The mapping carried defects; nothing was merged.
    Malformed(Vec<MappingDefect>),
    /// Names the layer shares with the cake beneath it.
    Conflict(Vec<PropertyName>),
}

/// Merges a layer's mapping onto the sealed cake beneath it.
///
/// `upper` is `None` for the bottom layer. A malformed mapping is rejected
/// whole.
pub trait CombineStrategy {
    fn discipline(&self) -> Discipline;

    fn combine(&self, upper: Option<&Cake>, lower: LayerMapping) -> Result<Combined, Rejection>;
}

/// Build the strategy for a configured discipline.
pub fn for_discipline(discipline: Discipline, report: ConflictReport) -> Box<dyn CombineStrategy> {
    match discipline {
        Discipline::Override => Box::new(OverrideStrategy),
        Discipline::Disjoint => Box::new(DisjointStrategy::new(report)),
    }
}
