//! SQL source factories
//!
//! A `LanguageDriver` turns the expanded body of a statement into a
//! `SqlSource`. Drivers are registered under a string tag and chosen per
//! statement with the `lang` attribute; `xml` is the default.

mod raw;
mod static_sql;
mod xml;

pub use raw::RawLanguageDriver;
pub use static_sql::{parse_parameters, ParameterMapping, StaticSql};
pub use xml::XmlLanguageDriver;

use crate::config::Configuration;
use crate::error::{Error, Result};
use crate::parsing::TokenParser;
use crate::xml::{Element, Node};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Tag of the driver used when a statement has no `lang` attribute
pub const DEFAULT_LANG: &str = "xml";

/// Bindable SQL template produced by a language driver
#[derive(Debug, Clone, PartialEq)]
pub enum SqlSource {
    /// Fully resolved SQL with `?` markers and their parameter mappings
    Static(StaticSql),
    /// Body still containing dynamic tags or `${}` tokens, kept for execution time
    Dynamic { root: Element },
}

impl SqlSource {
    pub fn is_dynamic(&self) -> bool {
        matches!(self, SqlSource::Dynamic { .. })
    }
}

/// Factory turning a statement body into a `SqlSource`
pub trait LanguageDriver: fmt::Debug + Send + Sync {
    fn create_sql_source(
        &self,
        config: &Configuration,
        script: &Element,
        parameter_type: Option<&str>,
    ) -> Result<SqlSource>;
}

/// Dispatch table from `lang` tag to driver
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    drivers: IndexMap<String, Arc<dyn LanguageDriver>>,
    default_lang: String,
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        let mut registry = Self {
            drivers: IndexMap::new(),
            default_lang: DEFAULT_LANG.to_string(),
        };
        registry.register(DEFAULT_LANG, XmlLanguageDriver);
        registry.register("raw", RawLanguageDriver);
        registry
    }
}

impl LanguageRegistry {
    pub fn register(&mut self, lang: impl Into<String>, driver: impl LanguageDriver + 'static) {
        self.drivers.insert(lang.into(), Arc::new(driver));
    }

    pub fn set_default(&mut self, lang: impl Into<String>) {
        self.default_lang = lang.into();
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }

    /// Driver for `lang`, or the default driver when `lang` is `None`
    pub fn resolve(&self, lang: Option<&str>) -> Result<(&str, &dyn LanguageDriver)> {
        let lang = lang.unwrap_or(&self.default_lang);
        self.drivers
            .get_key_value(lang)
            .map(|(name, driver)| (name.as_str(), driver.as_ref()))
            .ok_or_else(|| Error::UnknownLanguage {
                lang: lang.to_string(),
            })
    }
}

/// Whether a script body needs execution-time evaluation: it has child
/// elements (dynamic tags) or an unescaped `${` token in its text.
pub(crate) fn is_dynamic(script: &Element) -> bool {
    const VARIABLE: TokenParser<'static> = TokenParser::new("${", "}");

    script.children.iter().any(|child| match child {
        Node::Element(_) => true,
        Node::Text(text) | Node::CData(text) => VARIABLE.contains_unescaped(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_resolves_builtin_drivers() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.resolve(None).unwrap().0, "xml");
        assert_eq!(registry.resolve(Some("raw")).unwrap().0, "raw");
        assert!(matches!(
            registry.resolve(Some("velocity")),
            Err(Error::UnknownLanguage { .. })
        ));
    }

    #[test]
    fn dynamic_detection() {
        let plain = Element::new("select").with_text("select 1");
        let escaped = Element::new("select").with_text(r"select '\${x}'");
        let variable = Element::new("select").with_text("select ${col}");
        let tagged = Element::new("select").with_child(Element::new("where"));
        assert!(!is_dynamic(&plain));
        assert!(!is_dynamic(&escaped));
        assert!(is_dynamic(&variable));
        assert!(is_dynamic(&tagged));
    }
}
