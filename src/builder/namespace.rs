//! Namespace qualification

use crate::error::{Error, Result};

/// The namespace of the mapper currently being built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(namespace: &str) -> Result<Self> {
        if namespace.trim().is_empty() {
            return Err(Error::MissingNamespace);
        }
        Ok(Self(namespace.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Qualify `base` with this namespace.
    ///
    /// A reference that already contains a `.` points into another namespace
    /// and is returned unchanged. A definition may repeat its own namespace
    /// prefix but must not otherwise contain a `.`.
    pub fn apply(&self, base: &str, is_reference: bool) -> Result<String> {
        if is_reference {
            if base.contains('.') {
                return Ok(base.to_string());
            }
        } else {
            if base
                .strip_prefix(self.0.as_str())
                .is_some_and(|rest| rest.starts_with('.'))
            {
                return Ok(base.to_string());
            }
            if base.contains('.') {
                return Err(Error::InvalidId {
                    id: base.to_string(),
                    namespace: self.0.clone(),
                });
            }
        }
        Ok(format!("{}.{}", self.0, base))
    }

    /// Qualify each entry of a comma-separated reference list
    pub fn apply_list(&self, references: &str) -> Result<Vec<String>> {
        references
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| self.apply(r, true))
            .collect()
    }
}
