//! Foundation types for layer cakes.
//!
//! A *cake* is a single composite object built from an ordered list of
//! layers. This crate provides the vocabulary shared by the compositor and
//! by every layer: validated property names, property behaviors, the
//! per-layer property mapping, and the sealed composite itself.
//!
//! # Key Types
//!
//! - [`PropertyName`] — Validated name of a property contributed by a layer
//! - [`Property`] — A method or accessor behavior, cheap to clone
//! - [`LayerMapping`] — The set of properties one layer contributes
//! - [`Cake`] — A sealed, immutable composite with shared identity
//! - [`PropertyError`] — Errors raised while dispatching through a cake

pub mod cake;
pub mod error;
pub mod mapping;
pub mod name;
pub mod property;

pub use cake::{Cake, PropertyTable, WeakCake, TO_STRING};
pub use error::{MappingDefect, PropertyError};
pub use mapping::LayerMapping;
pub use name::PropertyName;
pub use property::{expect_number, Property, PropertyKind};
pub use serde_json::Value;
