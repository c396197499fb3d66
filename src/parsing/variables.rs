//! Scoped variable contexts

use super::placeholder::PlaceholderResolver;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::borrow::Cow;

/// Ordered name → value mapping visible to placeholder substitution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableContext {
    values: IndexMap<String, String>,
}

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable, replacing any previous value
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Build the context for the include site referencing `refid`.
    ///
    /// Each declared value is resolved against `self` (the inherited scope)
    /// before it is stored, so a declaration can see outer variables but not
    /// its siblings. Declaring a name twice is an error. With no declarations
    /// the inherited context is returned as is.
    pub fn derive<'a>(
        &'a self,
        refid: &str,
        declared: &[(String, String)],
        resolver: &PlaceholderResolver,
    ) -> Result<Cow<'a, VariableContext>> {
        if declared.is_empty() {
            return Ok(Cow::Borrowed(self));
        }

        let mut local: IndexMap<&str, String> = IndexMap::with_capacity(declared.len());
        for (name, raw_value) in declared {
            let value = resolver.resolve(raw_value, self)?.into_owned();
            if local.insert(name.as_str(), value).is_some() {
                return Err(Error::DuplicateProperty {
                    name: name.clone(),
                    refid: refid.to_string(),
                });
            }
        }

        let mut derived = self.clone();
        for (name, value) in local {
            derived.values.insert(name.to_string(), value);
        }
        Ok(Cow::Owned(derived))
    }
}

impl FromIterator<(String, String)> for VariableContext {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
