//! The sealed composite.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::error::PropertyError;
use crate::name::PropertyName;
use crate::property::Property;

/// Conventional name of the property that renders a cake as text.
pub const TO_STRING: &str = "toString";

/// Properties of a cake, keyed by name.
pub type PropertyTable = BTreeMap<PropertyName, Property>;

struct CakeInner {
    properties: PropertyTable,
    layers: usize,
}

/// A sealed composite built from one or more layers.
///
/// A cake is immutable once sealed. Cloning a cake clones a handle, so
/// every clone has the same identity (see [`Cake::ptr_eq`]). The compositor
/// seals one cake per intermediate stage; those earlier cakes are the
/// super snapshots handed to later layers.
#[derive(Clone)]
pub struct Cake {
    inner: Rc<CakeInner>,
}

/// A non-owning handle to a cake.
///
/// Layers hold the final cake through this handle so that a cake does not
/// keep itself alive through its own behaviors.
#[derive(Clone, Default)]
pub struct WeakCake {
    inner: Weak<CakeInner>,
}

impl Cake {
    /// Seal a property table built from `layers` layers.
    pub fn seal(properties: PropertyTable, layers: usize) -> Self {
        Self {
            inner: Rc::new(CakeInner { properties, layers }),
        }
    }

    /// A cake with no layers and no properties.
    pub fn empty() -> Self {
        Self::seal(PropertyTable::new(), 0)
    }

    /// Dispatch `name` with positional arguments.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value, PropertyError> {
        self.property(name)
            .ok_or_else(|| PropertyError::NotFound(name.to_string()))?
            .invoke(name, args)
    }

    /// Read an accessor, or call a method without arguments.
    pub fn get(&self, name: &str) -> Result<Value, PropertyError> {
        self.call(name, &[])
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.inner.properties.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.properties.contains_key(name)
    }

    /// Property names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &PropertyName> {
        self.inner.properties.keys()
    }

    pub fn properties(&self) -> &PropertyTable {
        &self.inner.properties
    }

    pub fn len(&self) -> usize {
        self.inner.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.properties.is_empty()
    }

    /// Number of layers merged to produce this cake.
    pub fn layer_count(&self) -> usize {
        self.inner.layers
    }

    pub fn downgrade(&self) -> WeakCake {
        WeakCake {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns `true` if both handles refer to the same cake.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Render through the cake's `toString` property.
    ///
    /// String results are returned as-is; any other value is rendered as
    /// JSON text.
    pub fn render(&self) -> Result<String, PropertyError> {
        match self.call(TO_STRING, &[])? {
            Value::String(s) => Ok(s),
            other => Ok(other.to_string()),
        }
    }
}

impl WeakCake {
    /// Recover the cake if it is still alive.
    pub fn upgrade(&self) -> Option<Cake> {
        self.inner.upgrade().map(|inner| Cake { inner })
    }

    /// Returns `true` if this handle refers to `cake`.
    pub fn refers_to(&self, cake: &Cake) -> bool {
        Weak::ptr_eq(&self.inner, &Rc::downgrade(&cake.inner))
    }
}

impl fmt::Display for Cake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Ok(text) => f.write_str(&text),
            Err(_) => {
                let keys: Vec<&str> = self.keys().map(PropertyName::as_str).collect();
                write!(f, "[cake {}]", keys.join(", "))
            }
        }
    }
}

impl fmt::Debug for Cake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cake")
            .field("layers", &self.inner.layers)
            .field("keys", &self.inner.properties.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl fmt::Debug for WeakCake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakCake")
            .field("alive", &(self.inner.strong_count() > 0))
            .finish()
    }
}
