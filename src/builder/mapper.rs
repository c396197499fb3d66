//! Mapper documents and batch loading
//!
//! Mappers are loaded as one batch. Fragments register as soon as their
//! mapper is added; statements are compiled right away when possible. A
//! statement that includes a fragment not registered yet is deferred, and
//! `finish` retries deferred statements until a full pass makes no progress.

use super::namespace::Namespace;
use super::registry::{Fragment, Registry};
use super::selection::database_id_matches;
use super::statement::{CompiledUnit, StatementCompiler};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::mapping::SqlCommandKind;
use crate::xml::{self, Element};
use tracing::{debug, warn};

const FRAGMENT: &str = "sql";

/// A statement waiting for its compile attempt
#[derive(Debug)]
struct WorkItem {
    resource: String,
    namespace: Namespace,
    element: Element,
    required_database_id: Option<String>,
}

/// A statement that failed with a recoverable error
#[derive(Debug)]
struct Deferred {
    item: WorkItem,
    error: Error,
}

/// Loads a batch of mapper documents into a `Registry`
#[derive(Debug)]
pub struct MapperLoader {
    config: Configuration,
    registry: Registry,
    pending: Vec<Deferred>,
}

impl MapperLoader {
    pub fn new(config: Configuration) -> Self {
        Self {
            config,
            registry: Registry::new(),
            pending: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Number of statements currently deferred
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Parse and add one mapper document
    pub fn add_mapper(&mut self, resource: &str, input: &str) -> Result<()> {
        let root = xml::parse_document(input)?;
        self.add_document(resource, &root)
    }

    /// Add an already parsed `<mapper>` element
    pub fn add_document(&mut self, resource: &str, root: &Element) -> Result<()> {
        if root.name != "mapper" {
            return Err(Error::XmlError {
                message: format!("expected <mapper> root element, found <{}>", root.name),
                span: None,
            });
        }
        let namespace = Namespace::new(root.attr("namespace").unwrap_or_default())?;
        debug!(resource, namespace = namespace.as_str(), "loading mapper");

        for required in self.passes() {
            self.register_fragments(&namespace, root, required.as_deref())?;
        }

        for required in self.passes() {
            for element in root
                .elements()
                .filter(|e| SqlCommandKind::from_tag(&e.name).is_some())
            {
                let item = WorkItem {
                    resource: resource.to_string(),
                    namespace: namespace.clone(),
                    element: element.clone(),
                    required_database_id: required.clone(),
                };
                if let Err(deferred) = self.attempt(item)? {
                    self.pending.push(deferred);
                }
            }
        }
        Ok(())
    }

    /// Retry deferred statements to a fixpoint and return the registry.
    ///
    /// Statements still failing when a pass makes no progress are reported
    /// together as `Error::Unresolved`.
    pub fn finish(mut self) -> Result<Registry> {
        let mut round = 0;
        while !self.pending.is_empty() {
            round += 1;
            let before = self.pending.len();
            debug!(round, pending = before, "retrying deferred statements");

            for deferred in std::mem::take(&mut self.pending) {
                if let Err(deferred) = self.attempt(deferred.item)? {
                    self.pending.push(deferred);
                }
            }

            if self.pending.len() == before {
                break;
            }
        }

        if self.pending.is_empty() {
            return Ok(self.registry);
        }

        let failures: Vec<Error> = self.pending.into_iter().map(|d| d.error).collect();
        warn!(count = failures.len(), "unresolved statements remain");
        Err(Error::Unresolved { failures })
    }

    /// Try to compile and register one statement.
    ///
    /// `Ok(Err(deferred))` hands the item back, with its error, for a later retry.
    fn attempt(&mut self, item: WorkItem) -> Result<std::result::Result<(), Deferred>> {
        match self.compile(&item) {
            Ok(Some(unit)) => {
                self.registry.commit(unit)?;
                Ok(Ok(()))
            }
            Ok(None) => Ok(Ok(())),
            Err(error) if error.is_incomplete() => {
                debug!(resource = %item.resource, "deferring statement: {error}");
                Ok(Err(Deferred { item, error }))
            }
            Err(e) => Err(e),
        }
    }

    fn compile(&self, item: &WorkItem) -> Result<Option<CompiledUnit>> {
        StatementCompiler::new(&self.config, &self.registry, &item.namespace, &item.resource)
            .compile(&item.element, item.required_database_id.as_deref())
    }

    fn register_fragments(
        &mut self,
        namespace: &Namespace,
        root: &Element,
        required_database_id: Option<&str>,
    ) -> Result<()> {
        for element in root.elements_named(FRAGMENT) {
            let id = namespace.apply(element.required_attr("id")?, false)?;
            let database_id = element.attr("databaseId");
            let previous = self
                .registry
                .fragment_entry(&id)
                .map(|f| f.database_id.as_deref());
            if !database_id_matches(previous, database_id, required_database_id) {
                continue;
            }
            debug!(fragment = %id, ?database_id, "registering fragment");
            self.registry.add_fragment(Fragment {
                id,
                database_id: database_id.map(str::to_string),
                element: element.clone(),
            })?;
        }
        Ok(())
    }

    /// Active dialect first, then no dialect
    fn passes(&self) -> Vec<Option<String>> {
        match &self.config.database_id {
            Some(active) => vec![Some(active.clone()), None],
            None => vec![None],
        }
    }
}

/// Load a batch of `(resource, document)` pairs in one go
pub fn load<I, R, D>(config: Configuration, mappers: I) -> Result<Registry>
where
    I: IntoIterator<Item = (R, D)>,
    R: AsRef<str>,
    D: AsRef<str>,
{
    let mut loader = MapperLoader::new(config);
    for (resource, document) in mappers {
        loader.add_mapper(resource.as_ref(), document.as_ref())?;
    }
    loader.finish()
}
