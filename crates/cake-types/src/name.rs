//! Property name validation.
//!
//! Valid property names:
//! - Must be non-empty
//! - Must not contain whitespace or control characters
//! - Must not start with an ASCII digit

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PropertyError;

/// The validated name of a property contributed by a layer.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropertyName(String);

impl PropertyName {
    /// Validate and wrap a property name.
    ///
    /// ```
    /// use cake_types::PropertyName;
    ///
    /// assert!(PropertyName::new("getX").is_ok());
    /// assert!(PropertyName::new("").is_err());
    /// assert!(PropertyName::new("get X").is_err());
    /// ```
    pub fn new(name: impl Into<String>) -> Result<Self, PropertyError> {
        let name = name.into();
        validate_property_name(&name)?;
        Ok(Self(name))
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validate a property name, returning `Ok(())` if valid.
pub fn validate_property_name(name: &str) -> Result<(), PropertyError> {
    let invalid = |reason: &str| PropertyError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    };

    if name.is_empty() {
        return Err(invalid("property name must not be empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("must not contain whitespace"));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid("must not contain control characters"));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid("must not start with a digit"));
    }
    Ok(())
}

impl TryFrom<String> for PropertyName {
    type Error = PropertyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PropertyName {
    type Error = PropertyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PropertyName> for String {
    fn from(name: PropertyName) -> Self {
        name.0
    }
}

impl Borrow<str> for PropertyName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PropertyName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
