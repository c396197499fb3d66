//! Static SQL with `#{}` parameter markers

use crate::error::{Error, Result};
use crate::parsing::TokenParser;
use indexmap::IndexMap;

const PARAMETER: TokenParser<'static> = TokenParser::new("#{", "}");

/// One `#{property, option=value, ...}` marker, in order of appearance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMapping {
    pub property: String,
    /// Options such as `javaType`, `jdbcType`, `mode`, `typeHandler`
    pub options: IndexMap<String, String>,
}

/// SQL text ready for a prepared statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticSql {
    pub sql: String,
    pub parameters: Vec<ParameterMapping>,
}

impl StaticSql {
    /// Replace every `#{}` marker in `text` with `?`, recording its mapping
    pub fn build(text: &str, shrink_whitespace: bool) -> Result<Self> {
        let mut parameters = Vec::new();
        let sql = PARAMETER.parse(text, |expression| {
            parameters.push(parse_parameters(expression)?);
            Ok("?".to_string())
        })?;

        let sql = if shrink_whitespace {
            sql.split_whitespace().collect::<Vec<_>>().join(" ")
        } else {
            sql
        };

        Ok(Self { sql, parameters })
    }
}

/// Parse the inside of a `#{...}` marker
pub fn parse_parameters(expression: &str) -> Result<ParameterMapping> {
    let invalid = |reason: &str| Error::InvalidParameter {
        expression: expression.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = expression.split(',');
    let property = parts.next().unwrap_or_default().trim();
    if property.is_empty() {
        return Err(invalid("missing property name"));
    }

    let mut options = IndexMap::new();
    for part in parts {
        let (key, value) = part
            .split_once('=')
            .ok_or_else(|| invalid("options must be written as name=value"))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(invalid("option name is empty"));
        }
        options.insert(key.to_string(), value.trim().to_string());
    }

    Ok(ParameterMapping {
        property: property.to_string(),
        options,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_become_question_marks() {
        let sql = StaticSql::build("insert into t (a, b) values (#{a}, #{b, jdbcType=VARCHAR})", false)
            .unwrap();
        assert_eq!(sql.sql, "insert into t (a, b) values (?, ?)");
        assert_eq!(sql.parameters.len(), 2);
        assert_eq!(sql.parameters[1].property, "b");
        assert_eq!(sql.parameters[1].options.get("jdbcType").map(String::as_str), Some("VARCHAR"));
    }

    #[test]
    fn shrinks_whitespace_on_request() {
        let sql = StaticSql::build("\n  select *\n    from t\n", true).unwrap();
        assert_eq!(sql.sql, "select * from t");
    }

    #[test]
    fn rejects_malformed_markers() {
        assert!(StaticSql::build("#{}", false).is_err());
        assert!(StaticSql::build("#{a, jdbcType}", false).is_err());
    }
}
