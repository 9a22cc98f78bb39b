//! Multi-select picklist values.
//!
//! A multi-select field stores its selections as one string joined by `;`.
//! [`Picklist`] keeps the selections as an ordered set of unique tokens and
//! converts to and from that string.

use crate::value::Value;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Separator between serialized picklist values.
pub const SEPARATOR: char = ';';

/// An ordered set of unique picklist values.
///
/// Insertion order is preserved; adding a value already present, or removing
/// one that is absent, does nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Picklist {
    values: Vec<String>,
}

impl Picklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a serialized picklist, optionally trimming whitespace around each value.
    ///
    /// Empty tokens are dropped, so `""` parses to an empty picklist.
    pub fn from_str_with(s: &str, trim: bool) -> Self {
        s.split(SEPARATOR)
            .map(|part| if trim { part.trim() } else { part })
            .filter(|part| !part.is_empty())
            .collect()
    }

    /// All values, in insertion order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn into_values(self) -> Vec<String> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    /// Add a value if not already present.
    pub fn add(&mut self, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        if !self.contains(&value) {
            self.values.push(value);
        }
        self
    }

    /// Remove a value if present.
    pub fn remove(&mut self, value: &str) -> &mut Self {
        if let Some(index) = self.position(value) {
            self.values.remove(index);
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    fn position(&self, value: &str) -> Option<usize> {
        self.values.iter().position(|v| v == value)
    }
}

impl<S: Into<String>> FromIterator<S> for Picklist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Picklist::new();
        for value in iter {
            list.add(value);
        }
        list
    }
}

impl<S: Into<String>> From<Vec<S>> for Picklist {
    fn from(values: Vec<S>) -> Self {
        values.into_iter().collect()
    }
}

impl fmt::Display for Picklist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}

/// Parses with whitespace trimming; use [`Picklist::from_str_with`] to keep it.
impl FromStr for Picklist {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_str_with(s, true))
    }
}

impl From<Picklist> for Value {
    fn from(list: Picklist) -> Self {
        Value::Text(list.to_string())
    }
}

impl From<&Picklist> for Value {
    fn from(list: &Picklist) -> Self {
        Value::Text(list.to_string())
    }
}

impl Serialize for Picklist {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Picklist {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| Self::from_str_with(&s, true)).unwrap_or_default())
    }
}
