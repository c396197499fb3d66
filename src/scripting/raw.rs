//! Driver that only accepts static SQL

use super::{is_dynamic, LanguageDriver, SqlSource, StaticSql};
use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::xml::Element;

#[derive(Debug, Clone, Copy, Default)]
pub struct RawLanguageDriver;

impl LanguageDriver for RawLanguageDriver {
    fn create_sql_source(
        &self,
        config: &Configuration,
        script: &Element,
        _parameter_type: Option<&str>,
    ) -> Result<SqlSource> {
        if is_dynamic(script) {
            return Err(Error::DynamicContentNotAllowed {
                id: script.attr("id").unwrap_or(&script.name).to_string(),
            });
        }
        StaticSql::build(&script.text(), config.shrink_whitespaces_in_sql).map(SqlSource::Static)
    }
}
