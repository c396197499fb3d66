//! `<selectKey>` probe extraction
//!
//! Each accepted `<selectKey>` child becomes its own select statement named
//! `<parent id>!selectKey`, paired with a key generator that runs it before
//! or after the parent. The probes are then cut out of the parent body.

use super::attrs::{enum_attr, list_attr};
use super::selection::database_id_matches;
use super::statement::StatementCompiler;
use crate::error::Result;
use crate::mapping::{CompiledStatement, KeyGeneratorStrategy, SqlCommandKind, SELECT_KEY_SUFFIX};
use crate::scripting::LanguageDriver;
use crate::xml::{Element, Node};
use tracing::debug;

const SELECT_KEY: &str = "selectKey";

/// Probes compiled from one statement and the body left after removing them
#[derive(Debug)]
pub struct ExtractedProbes {
    pub residual: Element,
    pub probes: Vec<(CompiledStatement, KeyGeneratorStrategy)>,
}

impl ExtractedProbes {
    /// Key generator registered for a probe id within this extraction
    pub fn strategy_for(&self, probe_id: &str) -> Option<&KeyGeneratorStrategy> {
        self.probes
            .iter()
            .find(|(probe, _)| probe.id == probe_id)
            .map(|(_, strategy)| strategy)
    }
}

pub struct KeyProbeExtractor<'c, 'a> {
    compiler: &'c StatementCompiler<'a>,
}

impl<'c, 'a> KeyProbeExtractor<'c, 'a> {
    pub fn new(compiler: &'c StatementCompiler<'a>) -> Self {
        Self { compiler }
    }

    /// Compile every accepted `<selectKey>` of `statement`.
    ///
    /// Probes are selected like statements: first against the active dialect,
    /// then against no dialect.
    pub fn extract(
        &self,
        parent_id: &str,
        statement: &Element,
        parameter_type: Option<&str>,
        lang: &str,
        driver: &dyn LanguageDriver,
    ) -> Result<ExtractedProbes> {
        let nodes: Vec<&Element> = statement.elements_named(SELECT_KEY).collect();
        let mut probes: Vec<(CompiledStatement, KeyGeneratorStrategy)> = Vec::new();

        if !nodes.is_empty() {
            let probe_id = self
                .compiler
                .namespace
                .apply(&format!("{parent_id}{SELECT_KEY_SUFFIX}"), false)?;
            let passes = [self.compiler.config.database_id.as_deref(), None];
            let passes = if passes[0].is_some() { &passes[..] } else { &passes[1..] };

            for &required in passes {
                for node in &nodes {
                    let previous = probes
                        .iter()
                        .rev()
                        .find(|(probe, _)| probe.id == probe_id)
                        .map(|(probe, _)| probe.database_id.as_deref())
                        .or_else(|| {
                            self.compiler
                                .registry
                                .statement(&probe_id)
                                .map(|s| s.database_id.as_deref())
                        });
                    if database_id_matches(previous, node.attr("databaseId"), required) {
                        let probe = self.compile_probe(&probe_id, node, parameter_type, lang, driver)?;
                        probes.push(probe);
                    }
                }
            }
        }

        let residual = Element {
            name: statement.name.clone(),
            attributes: statement.attributes.clone(),
            children: statement
                .children
                .iter()
                .filter(|child| !matches!(child, Node::Element(e) if e.name == SELECT_KEY))
                .cloned()
                .collect(),
        };

        Ok(ExtractedProbes { residual, probes })
    }

    fn compile_probe(
        &self,
        probe_id: &str,
        node: &Element,
        parameter_type: Option<&str>,
        lang: &str,
        driver: &dyn LanguageDriver,
    ) -> Result<(CompiledStatement, KeyGeneratorStrategy)> {
        let run_before = node.attr("order").unwrap_or("AFTER") == "BEFORE";
        let sql_source = driver.create_sql_source(self.compiler.config, node, parameter_type)?;

        let statement = CompiledStatement {
            id: probe_id.to_string(),
            resource: self.compiler.resource.to_string(),
            command: SqlCommandKind::Select,
            statement_type: enum_attr(node, "statementType")?.unwrap_or_default(),
            fetch_size: None,
            timeout: None,
            parameter_map: None,
            parameter_type: parameter_type.map(str::to_string),
            result_maps: Vec::new(),
            result_type: node.attr("resultType").map(str::to_string),
            result_set_type: None,
            flush_cache: false,
            use_cache: false,
            result_ordered: false,
            key_generator: KeyGeneratorStrategy::None,
            key_properties: list_attr(node, "keyProperty"),
            key_columns: list_attr(node, "keyColumn"),
            database_id: node.attr("databaseId").map(str::to_string),
            lang: lang.to_string(),
            result_sets: Vec::new(),
            sql_source,
        };

        debug!(probe = %probe_id, run_before, "compiled key probe");

        let strategy = KeyGeneratorStrategy::ProbeStatement {
            statement_id: probe_id.to_string(),
            run_before,
        };
        Ok((statement, strategy))
    }
}
