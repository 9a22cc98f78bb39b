//! Template arguments.

use crate::value::Value;
use std::collections::BTreeMap;

/// Named and positional arguments for a [`QueryTemplate`](crate::QueryTemplate).
///
/// Named arguments fill `:name` / `::name` placeholders; positional arguments
/// fill `?` placeholders in template order.
///
/// # Example
///
/// ```ignore
/// use sfutils::Arguments;
///
/// let args = Arguments::new().set("status", "Active").push(10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    named: BTreeMap<String, Value>,
    positional: Vec<Value>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a named argument, replacing any previous value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Append a positional argument.
    pub fn push(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.named.insert(name.into(), value.into())
    }

    pub fn push_positional(&mut self, value: impl Into<Value>) {
        self.positional.push(value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn named(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty() && self.positional.is_empty()
    }

    /// Merge local arguments over `self`.
    ///
    /// A local named argument overrides a global one of the same name.
    /// Positional arguments are global ones followed by local ones.
    pub fn merged<'a>(&'a self, local: &'a Arguments) -> MergedArguments<'a> {
        MergedArguments {
            global: self,
            local,
        }
    }
}

/// A borrowed overlay of local arguments over global ones.
#[derive(Debug, Clone, Copy)]
pub struct MergedArguments<'a> {
    global: &'a Arguments,
    local: &'a Arguments,
}

impl<'a> MergedArguments<'a> {
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.local
            .named
            .get(name)
            .or_else(|| self.global.named.get(name))
    }

    /// The positional argument at `index` (zero-based).
    pub fn positional(&self, index: usize) -> Option<&'a Value> {
        let global = &self.global.positional;
        if index < global.len() {
            global.get(index)
        } else {
            self.local.positional.get(index - global.len())
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Arguments {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Arguments {
    fn from(map: BTreeMap<K, V>) -> Self {
        map.into_iter().collect()
    }
}

impl<V: Into<Value>> From<Vec<V>> for Arguments {
    fn from(values: Vec<V>) -> Self {
        Self {
            named: BTreeMap::new(),
            positional: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<()> for Arguments {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<&Arguments> for Arguments {
    fn from(args: &Arguments) -> Self {
        args.clone()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            named: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            positional: Vec::new(),
        }
    }
}
