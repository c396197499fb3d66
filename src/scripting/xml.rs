//! Default language driver

use super::{is_dynamic, LanguageDriver, SqlSource, StaticSql};
use crate::config::Configuration;
use crate::error::Result;
use crate::xml::Element;

/// Keeps bodies with dynamic tags or `${}` tokens for execution time and
/// resolves everything else to static SQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlLanguageDriver;

impl LanguageDriver for XmlLanguageDriver {
    fn create_sql_source(
        &self,
        config: &Configuration,
        script: &Element,
        _parameter_type: Option<&str>,
    ) -> Result<SqlSource> {
        if is_dynamic(script) {
            return Ok(SqlSource::Dynamic {
                root: script.clone(),
            });
        }
        StaticSql::build(&script.text(), config.shrink_whitespaces_in_sql).map(SqlSource::Static)
    }
}
