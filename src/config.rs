//! Load-wide settings
//!
//! A `Configuration` is assembled once (from CLI flags or by an embedding
//! application) and only read while mappers are compiled.

use crate::mapping::ResultSetType;
use crate::parsing::{PlaceholderOptions, PlaceholderResolver, UnresolvedPolicy, VariableContext};
use crate::scripting::LanguageRegistry;

#[derive(Debug, Clone, Default)]
pub struct Configuration {
    /// Global variables seeding every include expansion
    pub variables: VariableContext,
    /// Active dialect; selects `databaseId`-tagged variants
    pub database_id: Option<String>,
    /// Default for `useGeneratedKeys` on insert statements
    pub use_generated_keys: bool,
    pub default_result_set_type: Option<ResultSetType>,
    pub shrink_whitespaces_in_sql: bool,
    pub placeholders: PlaceholderOptions,
    pub languages: LanguageRegistry,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name, value);
        self
    }

    pub fn with_database_id(mut self, database_id: impl Into<String>) -> Self {
        self.database_id = Some(database_id.into());
        self
    }

    pub fn with_use_generated_keys(mut self, enabled: bool) -> Self {
        self.use_generated_keys = enabled;
        self
    }

    pub fn with_default_result_set_type(mut self, result_set_type: ResultSetType) -> Self {
        self.default_result_set_type = Some(result_set_type);
        self
    }

    pub fn with_shrink_whitespaces_in_sql(mut self, enabled: bool) -> Self {
        self.shrink_whitespaces_in_sql = enabled;
        self
    }

    pub fn with_unresolved_policy(mut self, policy: UnresolvedPolicy) -> Self {
        self.placeholders.unresolved = policy;
        self
    }

    /// Enable `${name<separator>fallback}` default values
    pub fn with_default_value_separator(mut self, separator: impl Into<String>) -> Self {
        self.placeholders.default_value_separator = Some(separator.into());
        self
    }

    pub fn placeholder_resolver(&self) -> PlaceholderResolver {
        PlaceholderResolver::new(self.placeholders.clone())
    }
}
