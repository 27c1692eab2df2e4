//! Late self/super binding.
//!
//! A layer hands out its behaviors before the cake exists. Those behaviors
//! capture a [`LateBinding`], which the compositor fills with the layer's
//! [`Binding`] once every layer has been merged.

use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

use cake_types::{Cake, PropertyError, Value, WeakCake};

use crate::layer::LayerFault;

/// The self/super pair delivered to one layer in phase two.
#[derive(Clone)]
pub struct Binding {
    this: WeakCake,
    supr: Option<Cake>,
    index: usize,
}

impl Binding {
    pub fn new(this: WeakCake, supr: Option<Cake>, index: usize) -> Self {
        Self { this, supr, index }
    }

    /// The final cake. Identical for every layer of one composition.
    pub fn this(&self) -> Result<Cake, PropertyError> {
        self.this.upgrade().ok_or(PropertyError::Dropped)
    }

    /// The cake as it was before this layer was merged.
    pub fn supr(&self) -> Result<Cake, PropertyError> {
        self.supr.clone().ok_or(PropertyError::NoSuper(self.index))
    }

    pub fn supr_opt(&self) -> Option<&Cake> {
        self.supr.as_ref()
    }

    /// Position of the layer this binding belongs to.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` if `cake` is this binding's self.
    pub fn is_self(&self, cake: &Cake) -> bool {
        self.this.refers_to(cake)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("index", &self.index)
            .field("this", &self.this)
            .field("supr", &self.supr)
            .finish()
    }
}

/// A cell, shared by a layer's behaviors, that receives the layer's
/// [`Binding`] exactly once.
#[derive(Clone, Default)]
pub struct LateBinding {
    slot: Rc<OnceCell<Binding>>,
}

impl LateBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver the binding. A second delivery is a protocol misuse.
    pub fn bind(&self, binding: Binding) -> Result<(), LayerFault> {
        let index = binding.index;
        self.slot.set(binding).map_err(|_| {
            LayerFault::Misuse(format!(
                "binding for layer {index} delivered to a cell that was already bound"
            ))
        })
    }

    pub fn is_bound(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn binding(&self) -> Result<&Binding, PropertyError> {
        self.slot
            .get()
            .ok_or_else(|| PropertyError::Unbound("self/super requested during phase one".into()))
    }

    /// The final cake.
    pub fn this(&self) -> Result<Cake, PropertyError> {
        self.binding()?.this()
    }

    /// The cake beneath this layer.
    pub fn supr(&self) -> Result<Cake, PropertyError> {
        self.binding()?.supr()
    }

    /// Dispatch through self, seeing every layer's contribution.
    pub fn call_self(&self, name: &str, args: &[Value]) -> Result<Value, PropertyError> {
        self.this()?.call(name, args)
    }

    /// Dispatch through super, seeing only the layers beneath this one.
    pub fn call_super(&self, name: &str, args: &[Value]) -> Result<Value, PropertyError> {
        self.supr()?.call(name, args)
    }
}

impl fmt::Debug for LateBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LateBinding")
            .field("binding", &self.slot.get())
            .finish()
    }
}
