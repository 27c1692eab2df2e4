use std::fmt;

use cake_types::LayerMapping;
use thiserror::Error;

use crate::binding::{Binding, LateBinding};

// ---------------------------------------------------------------------------
// LayerFault
// ---------------------------------------------------------------------------

/// A failure reported by a layer producer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayerFault {
    /// The producer could not build a valid mapping.
    #[error("malformed mapping: {0}")]
    Malformed(String),
    /// The producer was driven outside the two-phase protocol.
    #[error("{0}")]
    Misuse(String),
}

// ---------------------------------------------------------------------------
// LayerProducer trait
// ---------------------------------------------------------------------------

/// One layer of a cake, driven through two phases.
///
/// In phase one the compositor calls [`produce`](Self::produce) to obtain
/// the layer's properties. The producer does not know self or super yet.
/// After every layer has been merged, phase two calls
/// [`resume`](Self::resume) with the layer's [`Binding`]. `resume` consumes
/// the producer, so it runs at most once.
pub trait LayerProducer {
    /// Human-readable name used in errors and reports.
    fn name(&self) -> &str {
        "anonymous"
    }

    /// Phase one: contribute this layer's properties.
    fn produce(&mut self) -> Result<LayerMapping, LayerFault>;

    /// Phase two: receive self and super.
    fn resume(self: Box<Self>, binding: Binding) -> Result<(), LayerFault>;
}

// ---------------------------------------------------------------------------
// FnLayer
// ---------------------------------------------------------------------------

/// A layer built from a closure that receives a [`LateBinding`] up front.
///
/// The closure runs in phase one; its behaviors capture the late binding
/// and resolve self/super through it once phase two has delivered them.
pub struct FnLayer<F> {
    name: String,
    build: Option<F>,
    late: LateBinding,
}

impl<F> FnLayer<F> {
    pub fn new(name: impl Into<String>, build: F) -> Self
    where
        F: FnOnce(&LateBinding) -> LayerMapping,
    {
        Self {
            name: name.into(),
            build: Some(build),
            late: LateBinding::new(),
        }
    }
}

impl<F> LayerProducer for FnLayer<F>
where
    F: FnOnce(&LateBinding) -> LayerMapping,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn produce(&mut self) -> Result<LayerMapping, LayerFault> {
        let build = self
            .build
            .take()
            .ok_or_else(|| LayerFault::Misuse("layer was produced twice".into()))?;
        Ok(build(&self.late))
    }

    fn resume(self: Box<Self>, binding: Binding) -> Result<(), LayerFault> {
        if self.build.is_some() {
            return Err(LayerFault::Misuse("layer resumed before it was produced".into()));
        }
        self.late.bind(binding)
    }
}

impl<F> fmt::Debug for FnLayer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLayer")
            .field("name", &self.name)
            .field("produced", &self.build.is_none())
            .field("late", &self.late)
            .finish()
    }
}

/// Box a closure-built layer.
///
/// ```
/// use cake_core::{layer, make_class_cake};
/// use cake_types::{LayerMapping, Value};
///
/// let base = layer("base", |_late| LayerMapping::new().method("getX", |_| Ok(Value::from(3))));
/// let cake = make_class_cake(vec![base]).unwrap();
/// assert_eq!(cake.call("getX", &[]).unwrap(), Value::from(3));
/// ```
pub fn layer<F>(name: impl Into<String>, build: F) -> Box<dyn LayerProducer>
where
    F: FnOnce(&LateBinding) -> LayerMapping + 'static,
{
    Box::new(FnLayer::new(name, build))
}

// ---------------------------------------------------------------------------
// TwoPhaseLayer
// ---------------------------------------------------------------------------

type Resume = Box<dyn FnOnce(Binding)>;
type Start = Box<dyn FnOnce() -> (LayerMapping, Resume)>;

enum Phase {
    Ready(Start),
    Suspended(Resume),
    Spent,
}

/// A layer written as an explicit suspension: a start closure returns the
/// mapping together with the continuation that will receive the binding.
pub struct TwoPhaseLayer {
    name: String,
    phase: Phase,
}

impl TwoPhaseLayer {
    pub fn new<S, R>(name: impl Into<String>, start: S) -> Self
    where
        S: FnOnce() -> (LayerMapping, R) + 'static,
        R: FnOnce(Binding) + 'static,
    {
        let start: Start = Box::new(move || {
            let (mapping, resume) = start();
            (mapping, Box::new(resume) as Resume)
        });
        Self {
            name: name.into(),
            phase: Phase::Ready(start),
        }
    }

    /// Returns `true` while the layer waits for its binding.
    pub fn is_suspended(&self) -> bool {
        matches!(self.phase, Phase::Suspended(_))
    }
}

impl LayerProducer for TwoPhaseLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce(&mut self) -> Result<LayerMapping, LayerFault> {
        match std::mem::replace(&mut self.phase, Phase::Spent) {
            Phase::Ready(start) => {
                let (mapping, resume) = start();
                self.phase = Phase::Suspended(resume);
                Ok(mapping)
            }
            Phase::Suspended(resume) => {
                self.phase = Phase::Suspended(resume);
                Err(LayerFault::Misuse("layer was produced twice".into()))
            }
            Phase::Spent => Err(LayerFault::Misuse("layer was already spent".into())),
        }
    }

    fn resume(self: Box<Self>, binding: Binding) -> Result<(), LayerFault> {
        match self.phase {
            Phase::Suspended(resume) => {
                resume(binding);
                Ok(())
            }
            Phase::Ready(_) => Err(LayerFault::Misuse("layer resumed before it was produced".into())),
            Phase::Spent => Err(LayerFault::Misuse("layer was already spent".into())),
        }
    }
}

impl fmt::Debug for TwoPhaseLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let phase = match self.phase {
            Phase::Ready(_) => "ready",
            Phase::Suspended(_) => "suspended",
            Phase::Spent => "spent",
        };
        f.debug_struct("TwoPhaseLayer")
            .field("name", &self.name)
            .field("phase", &phase)
            .finish()
    }
}
