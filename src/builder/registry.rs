//! Registries of one configuration load

use super::statement::CompiledUnit;
use crate::error::{Error, Result};
use crate::mapping::{CompiledStatement, KeyGeneratorStrategy, SELECT_KEY_SUFFIX};
use crate::xml::Element;
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// A registered `<sql>` fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub id: String,
    pub database_id: Option<String>,
    pub element: Element,
}

/// Read-only lookup of fragments by qualified id
pub trait FragmentRegistry {
    fn fragment(&self, id: &str) -> Option<&Element>;
}

impl FragmentRegistry for IndexMap<String, Element> {
    fn fragment(&self, id: &str) -> Option<&Element> {
        self.get(id)
    }
}

/// Fragments, compiled statements and key generators, keyed by qualified id
#[derive(Debug, Default)]
pub struct Registry {
    fragments: IndexMap<String, Fragment>,
    statements: IndexMap<String, CompiledStatement>,
    key_generators: IndexMap<String, KeyGeneratorStrategy>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_fragment(&mut self, fragment: Fragment) -> Result<()> {
        if self.fragments.contains_key(&fragment.id) {
            return Err(Error::DuplicateFragment { id: fragment.id });
        }
        self.fragments.insert(fragment.id.clone(), fragment);
        Ok(())
    }

    pub fn fragment_entry(&self, id: &str) -> Option<&Fragment> {
        self.fragments.get(id)
    }

    pub fn statement(&self, id: &str) -> Option<&CompiledStatement> {
        self.statements.get(id)
    }

    pub fn has_statement(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    /// Statements in registration order
    pub fn statements(&self) -> impl Iterator<Item = &CompiledStatement> {
        self.statements.values()
    }

    pub fn key_generator(&self, id: &str) -> Option<&KeyGeneratorStrategy> {
        self.key_generators.get(id)
    }

    /// Register a compiled statement together with its key probes.
    ///
    /// Every id is checked before anything is inserted, so a failing unit
    /// leaves the registry untouched. A dialect-tagged statement replaces an
    /// untagged one registered under the same id, along with its probe.
    pub fn commit(&mut self, unit: CompiledUnit) -> Result<()> {
        let statement_id = unit.statement.id.as_str();
        let probe_id = format!("{statement_id}{SELECT_KEY_SUFFIX}");
        let replaces = unit.statement.database_id.is_some()
            && self
                .statements
                .get(statement_id)
                .is_some_and(|existing| existing.database_id.is_none());

        let mut seen = HashSet::new();
        let ids = unit
            .probes
            .iter()
            .map(|(probe, _)| probe.id.as_str())
            .chain(std::iter::once(statement_id));
        for id in ids {
            let replaceable = replaces && (id == statement_id || id == probe_id);
            if (self.statements.contains_key(id) && !replaceable) || !seen.insert(id) {
                return Err(Error::DuplicateStatement { id: id.to_string() });
            }
        }

        if replaces {
            debug!(statement = %statement_id, "dialect variant replaces untagged statement");
            self.statements.shift_remove(&probe_id);
            self.key_generators.shift_remove(&probe_id);
        }
        for (probe, strategy) in unit.probes {
            self.key_generators.insert(probe.id.clone(), strategy);
            self.statements.insert(probe.id.clone(), probe);
        }
        self.statements
            .insert(unit.statement.id.clone(), unit.statement);
        Ok(())
    }
}

impl FragmentRegistry for Registry {
    fn fragment(&self, id: &str) -> Option<&Element> {
        self.fragments.get(id).map(|f| &f.element)
    }
}
