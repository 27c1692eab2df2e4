use thiserror::Error;

/// Errors raised while dispatching a property through a cake.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PropertyError {
    #[error("invalid property name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("no such property: {0}")]
    NotFound(String),

    /// A late-bound self/super handle was used before the compositor
    /// delivered the layer's binding.
    #[error("layer binding used before it was delivered: {0}")]
    Unbound(String),

    /// The layer is the bottom of the cake and has nothing beneath it.
    #[error("layer {0} has no super")]
    NoSuper(usize),

    #[error("the composite was dropped before the call was dispatched")]
    Dropped,

    #[error("bad argument to '{name}': {reason}")]
    BadArgument { name: String, reason: String },

    #[error("type mismatch in '{context}': expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// A behavior reported its own failure.
    #[error("{0}")]
    Failed(String),
}

/// A structural defect found in a layer mapping.
///
/// Defects make a mapping malformed; the compositor refuses to merge a
/// malformed mapping.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum MappingDefect {
    #[error("invalid property name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("duplicate property '{0}' within one layer")]
    DuplicateKey(String),
}
