use std::fmt;

use thiserror::Error;

/// Errors that abort a composition. Composition is all-or-nothing: when
/// one of these is returned no cake was produced.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A layer produced a malformed mapping, or failed while producing it.
    #[error("layer {index} ('{layer}') could not be constructed: {reason}")]
    Construction {
        index: usize,
        layer: String,
        reason: String,
    },

    /// Under the disjoint discipline, a layer contributed names already
    /// present in the cake beneath it.
    #[error("layer {index} ('{layer}') conflicts with earlier layers on: {}", .keys.join(", "))]
    Conflict {
        index: usize,
        layer: String,
        keys: Vec<String>,
    },

    /// A layer broke the two-phase protocol.
    #[error("protocol misuse by layer {index} ('{layer}'): {reason}")]
    ProtocolMisuse {
        index: usize,
        layer: String,
        reason: String,
    },
}

impl ComposeError {
    /// The position of the offending layer.
    pub fn layer_index(&self) -> usize {
        match self {
            Self::Construction { index, .. }
            | Self::Conflict { index, .. }
            | Self::ProtocolMisuse { index, .. } => *index,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl PartialEq for ComposeError {
    fn eq(&self, other: &Self) -> bool {
        // Compare by display representation for test convenience.
        fmt::format(format_args!("{self}")) == fmt::format(format_args!("{other}"))
    }
}

impl Eq for ComposeError {}

/// Convenience alias used throughout the compositor crate.
pub type Result<T> = std::result::Result<T, ComposeError>;
