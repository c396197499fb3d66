//! `${name}` placeholder substitution

use super::token::TokenParser;
use super::variables::VariableContext;
use crate::error::{Error, Result};
use std::borrow::Cow;

const PLACEHOLDER: TokenParser<'static> = TokenParser::new("${", "}");

/// What to do with a placeholder whose name is not in scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Keep `${name}` in the output so a later stage can resolve it
    #[default]
    PassThrough,
    /// Fail with `Error::UnresolvedPlaceholder`
    Fail,
}

/// Placeholder resolution settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaceholderOptions {
    pub unresolved: UnresolvedPolicy,
    /// Separator enabling `${name:fallback}`; disabled when `None`
    pub default_value_separator: Option<String>,
}

/// Resolves `${name}` tokens against a `VariableContext`
#[derive(Debug, Clone, Default)]
pub struct PlaceholderResolver {
    options: PlaceholderOptions,
}

impl PlaceholderResolver {
    pub fn new(options: PlaceholderOptions) -> Self {
        Self { options }
    }

    /// Substitute every placeholder in `text`.
    ///
    /// Text without an opening `${` is returned borrowed and untouched.
    pub fn resolve<'t>(&self, text: &'t str, variables: &VariableContext) -> Result<Cow<'t, str>> {
        if !PLACEHOLDER.has_token(text) {
            return Ok(Cow::Borrowed(text));
        }
        PLACEHOLDER
            .parse(text, |expression| self.lookup(expression, variables))
            .map(Cow::Owned)
    }

    fn lookup(&self, expression: &str, variables: &VariableContext) -> Result<String> {
        if let Some(separator) = self.options.default_value_separator.as_deref() {
            if let Some((key, fallback)) = expression.split_once(separator) {
                return Ok(variables.get(key).unwrap_or(fallback).to_string());
            }
        }

        if let Some(value) = variables.get(expression) {
            return Ok(value.to_string());
        }

        match self.options.unresolved {
            UnresolvedPolicy::PassThrough => Ok(format!("${{{expression}}}")),
            UnresolvedPolicy::Fail => Err(Error::UnresolvedPlaceholder {
                name: expression.to_string(),
            }),
        }
    }
}
