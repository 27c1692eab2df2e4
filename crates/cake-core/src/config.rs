use serde::{Deserialize, Serialize};

/// How a layer's property names relate to the names beneath it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Discipline {
    /// Later layers silently replace earlier properties of the same name.
    #[default]
    Override,
    /// Every layer's names must be disjoint from everything beneath it.
    Disjoint,
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::Disjoint => "disjoint",
        }
    }
}

/// How many conflicting names a disjoint composition reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictReport {
    /// Stop at the first conflicting name, in name order.
    First,
    /// Report every conflicting name of the offending layer.
    #[default]
    All,
}

/// Configuration for the compositor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ComposeConfig {
    /// Combine discipline applied to every layer.
    pub discipline: Discipline,
    /// Conflict reporting under the disjoint discipline.
    pub conflict_report: ConflictReport,
    /// When `false`, a layer contributing no properties is malformed.
    pub allow_empty_layers: bool,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            discipline: Discipline::Override,
            conflict_report: ConflictReport::All,
            allow_empty_layers: true,
        }
    }
}

impl ComposeConfig {
    /// Class-style composition: later layers override earlier ones.
    pub fn class() -> Self {
        Self::default()
    }

    /// Trait-style composition: layer names must be disjoint.
    pub fn traits() -> Self {
        Self {
            discipline: Discipline::Disjoint,
            ..Default::default()
        }
    }
}
