//! Per-statement compilation
//!
//! Order of work for one statement element:
//! 1. `databaseId` variant selection (cheap, before anything is copied)
//! 2. include expansion
//! 3. `<selectKey>` probe extraction and compilation
//! 4. key generator choice
//! 5. SQL source creation by the statement's language driver

use super::attrs::{bool_attr, enum_attr, int_attr, list_attr};
use super::include::IncludeExpander;
use super::namespace::Namespace;
use super::registry::Registry;
use super::select_key::KeyProbeExtractor;
use super::selection::database_id_matches;
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::mapping::{CompiledStatement, KeyGeneratorStrategy, SqlCommandKind, SELECT_KEY_SUFFIX};
use crate::parsing::PlaceholderResolver;
use crate::xml::Element;
use tracing::{debug, trace};

/// A compiled statement and the key probes derived from it.
///
/// Nothing is registered until the whole unit is committed.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    pub statement: CompiledStatement,
    pub probes: Vec<(CompiledStatement, KeyGeneratorStrategy)>,
}

/// Compiles statement elements of one mapper against the current registry
pub struct StatementCompiler<'a> {
    pub(crate) config: &'a Configuration,
    pub(crate) registry: &'a Registry,
    pub(crate) namespace: &'a Namespace,
    pub(crate) resource: &'a str,
    resolver: PlaceholderResolver,
}

impl<'a> StatementCompiler<'a> {
    pub fn new(
        config: &'a Configuration,
        registry: &'a Registry,
        namespace: &'a Namespace,
        resource: &'a str,
    ) -> Self {
        Self {
            config,
            registry,
            namespace,
            resource,
            resolver: config.placeholder_resolver(),
        }
    }

    /// Compile one statement element.
    ///
    /// Returns `Ok(None)` when the element is not the variant selected for
    /// `required_database_id`. Errors carry the statement's qualified id.
    pub fn compile(
        &self,
        node: &Element,
        required_database_id: Option<&str>,
    ) -> Result<Option<CompiledUnit>> {
        let id = node.required_attr("id")?;
        self.compile_statement(node, id, required_database_id)
            .map_err(|e| {
                let qualified = self
                    .namespace
                    .apply(id, false)
                    .unwrap_or_else(|_| id.to_string());
                e.in_statement(qualified)
            })
    }

    fn compile_statement(
        &self,
        node: &Element,
        id: &str,
        required_database_id: Option<&str>,
    ) -> Result<Option<CompiledUnit>> {
        let database_id = node.attr("databaseId");
        let qualified_id = self.namespace.apply(id, false)?;
        let previous = self
            .registry
            .statement(&qualified_id)
            .map(|s| s.database_id.as_deref());
        if !database_id_matches(previous, database_id, required_database_id) {
            trace!(statement = %qualified_id, ?database_id, ?required_database_id, "skipping variant");
            return Ok(None);
        }

        let command = SqlCommandKind::from_tag(&node.name).ok_or_else(|| {
            Error::UnknownStatementKind {
                tag: node.name.clone(),
            }
        })?;
        let is_select = command == SqlCommandKind::Select;
        let flush_cache = bool_attr(node, "flushCache", !is_select);
        let use_cache = bool_attr(node, "useCache", is_select);
        let result_ordered = bool_attr(node, "resultOrdered", false);

        let expanded = IncludeExpander::new(self.namespace, self.registry, &self.resolver)
            .expand(node, &self.config.variables)?;

        let parameter_type = node.attr("parameterType");
        let (lang, driver) = self.config.languages.resolve(node.attr("lang"))?;

        // Probes are compiled from the expanded tree and removed from it
        let extracted =
            KeyProbeExtractor::new(self).extract(id, &expanded, parameter_type, lang, driver)?;

        let key_statement_id = self
            .namespace
            .apply(&format!("{id}{SELECT_KEY_SUFFIX}"), true)?;
        // Only this unit's probes count; a registered probe may belong to a variant being replaced
        let key_generator = match extracted.strategy_for(&key_statement_id) {
            Some(strategy) => strategy.clone(),
            None => {
                let default = self.config.use_generated_keys && command == SqlCommandKind::Insert;
                if bool_attr(node, "useGeneratedKeys", default) {
                    KeyGeneratorStrategy::AutoGenerated
                } else {
                    KeyGeneratorStrategy::None
                }
            }
        };

        let sql_source = driver.create_sql_source(self.config, &extracted.residual, parameter_type)?;

        let statement = CompiledStatement {
            id: qualified_id,
            resource: self.resource.to_string(),
            command,
            statement_type: enum_attr(node, "statementType")?.unwrap_or_default(),
            fetch_size: int_attr(node, "fetchSize")?,
            timeout: int_attr(node, "timeout")?,
            parameter_map: node
                .attr("parameterMap")
                .map(|map| self.namespace.apply(map, true))
                .transpose()?,
            parameter_type: parameter_type.map(str::to_string),
            result_maps: node
                .attr("resultMap")
                .map(|maps| self.namespace.apply_list(maps))
                .transpose()?
                .unwrap_or_default(),
            result_type: node.attr("resultType").map(str::to_string),
            result_set_type: enum_attr(node, "resultSetType")?
                .or(self.config.default_result_set_type),
            flush_cache,
            use_cache,
            result_ordered,
            key_generator,
            key_properties: list_attr(node, "keyProperty"),
            key_columns: list_attr(node, "keyColumn"),
            database_id: database_id.map(str::to_string),
            lang: lang.to_string(),
            result_sets: list_attr(node, "resultSets"),
            sql_source,
        };

        debug!(
            statement = %statement.id,
            command = %statement.command,
            key_generator = %statement.key_generator,
            probes = extracted.probes.len(),
            "compiled statement"
        );

        Ok(Some(CompiledUnit {
            statement,
            probes: extracted.probes,
        }))
    }
}
