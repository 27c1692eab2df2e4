use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PropertyError;

type MethodFn = dyn Fn(&[Value]) -> Result<Value, PropertyError>;
type AccessorFn = dyn Fn() -> Result<Value, PropertyError>;

/// The kind of behavior a property carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyKind {
    Method,
    Accessor,
}

/// A behavior contributed by a layer.
///
/// Cloning a property clones a handle to the same behavior, so the same
/// closure can appear in a super snapshot and in the final cake.
#[derive(Clone)]
pub enum Property {
    /// Callable with positional arguments.
    Method(Rc<MethodFn>),
    /// Read without arguments.
    Accessor(Rc<AccessorFn>),
}

impl Property {
    /// Wrap a closure as a method.
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, PropertyError> + 'static,
    {
        Self::Method(Rc::new(f))
    }

    /// Wrap a closure as an accessor.
    pub fn accessor<F>(f: F) -> Self
    where
        F: Fn() -> Result<Value, PropertyError> + 'static,
    {
        Self::Accessor(Rc::new(f))
    }

    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Method(_) => PropertyKind::Method,
            Self::Accessor(_) => PropertyKind::Accessor,
        }
    }

    /// Invoke the behavior. `name` is only used for error reporting.
    ///
    /// Accessors reject any arguments.
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Value, PropertyError> {
        match self {
            Self::Method(f) => f(args),
            Self::Accessor(f) if args.is_empty() => f(),
            Self::Accessor(_) => Err(PropertyError::BadArgument {
                name: name.to_string(),
                reason: format!("accessor takes no arguments, got {}", args.len()),
            }),
        }
    }

    /// Returns `true` if both handles point at the same behavior.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Method(a), Self::Method(b)) => Rc::ptr_eq(a, b),
            (Self::Accessor(a), Self::Accessor(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Method(_) => f.write_str("Property::Method(..)"),
            Self::Accessor(_) => f.write_str("Property::Accessor(..)"),
        }
    }
}

/// Read a value as a number, naming `context` in the error.
pub fn expect_number(value: &Value, context: &str) -> Result<f64, PropertyError> {
    value.as_f64().ok_or_else(|| PropertyError::TypeMismatch {
        context: context.to_string(),
        expected: "number".into(),
        found: value_kind(value).into(),
    })
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
