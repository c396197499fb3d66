//! Error types for sqlmapper

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for sqlmapper operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sqlmapper
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("Variable {name} defined twice in the same include definition (refid '{refid}')")]
    #[diagnostic(code(sqlmapper::duplicate_property))]
    DuplicateProperty { name: String, refid: String },

    #[error("Could not find SQL fragment to include with refid '{refid}'")]
    #[diagnostic(
        code(sqlmapper::fragment_not_found),
        help("fragments defined in mappers loaded later are retried before this becomes fatal")
    )]
    FragmentNotFound { refid: String },

    #[error("Cyclic include detected: {}", .chain.join(" -> "))]
    #[diagnostic(code(sqlmapper::cyclic_include))]
    CyclicInclude { chain: Vec<String> },

    #[error("Mapped statements collection already contains value for '{id}'")]
    #[diagnostic(code(sqlmapper::duplicate_statement))]
    DuplicateStatement { id: String },

    #[error("SQL fragments collection already contains value for '{id}'")]
    #[diagnostic(code(sqlmapper::duplicate_fragment))]
    DuplicateFragment { id: String },

    #[error("No value for placeholder '${{{name}}}'")]
    #[diagnostic(code(sqlmapper::unresolved_placeholder))]
    UnresolvedPlaceholder { name: String },

    #[error("Dots are not allowed in element names, please remove it from '{id}' (namespace '{namespace}')")]
    #[diagnostic(code(sqlmapper::invalid_id))]
    InvalidId { id: String, namespace: String },

    #[error("Mapper's namespace cannot be empty")]
    #[diagnostic(code(sqlmapper::missing_namespace))]
    MissingNamespace,

    #[error("<{element}> is missing required attribute '{attribute}'")]
    #[diagnostic(code(sqlmapper::missing_attribute))]
    MissingAttribute { element: String, attribute: String },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>: {reason}")]
    #[diagnostic(code(sqlmapper::invalid_attribute))]
    InvalidAttribute {
        element: String,
        attribute: String,
        value: String,
        reason: String,
    },

    #[error("<{tag}> is not a statement element (expected select, insert, update, delete or flush)")]
    #[diagnostic(code(sqlmapper::unknown_statement_kind))]
    UnknownStatementKind { tag: String },

    #[error("No language driver registered for lang '{lang}'")]
    #[diagnostic(code(sqlmapper::unknown_language))]
    UnknownLanguage { lang: String },

    #[error("Dynamic content is not allowed when using the raw language (in '{id}')")]
    #[diagnostic(code(sqlmapper::dynamic_content))]
    DynamicContentNotAllowed { id: String },

    #[error("Invalid parameter expression '#{{{expression}}}': {reason}")]
    #[diagnostic(code(sqlmapper::invalid_parameter))]
    InvalidParameter { expression: String, reason: String },

    #[error("XML error: {message}")]
    #[diagnostic(code(sqlmapper::xml_error))]
    XmlError {
        message: String,
        #[label("here")]
        span: Option<(usize, usize)>,
    },

    #[error("IO error: {0}")]
    #[diagnostic(code(sqlmapper::io_error))]
    IoError(#[from] std::io::Error),

    #[error("Error compiling statement '{id}': {source}")]
    #[diagnostic(code(sqlmapper::statement_error))]
    Statement { id: String, source: Box<Error> },

    #[error("{} statement(s) could not be resolved", .failures.len())]
    #[diagnostic(code(sqlmapper::unresolved))]
    Unresolved {
        #[related]
        failures: Vec<Error>,
    },
}

impl Error {
    /// Whether this failure may disappear once more mappers are loaded.
    pub fn is_incomplete(&self) -> bool {
        match self {
            Error::FragmentNotFound { .. } => true,
            Error::Statement { source, .. } => source.is_incomplete(),
            _ => false,
        }
    }

    /// Attach the id of the statement being compiled.
    pub fn in_statement(self, id: impl Into<String>) -> Error {
        match self {
            Error::Statement { .. } => self,
            other => Error::Statement {
                id: id.into(),
                source: Box::new(other),
            },
        }
    }
}

/// Format an XML error with the offending line of the mapper source.
///
/// `offset` is a byte offset into `input`; offsets past the end point at the
/// last line.
pub fn format_xml_error(input: &str, offset: usize, message: &str) -> String {
    let mut offset = offset.min(input.len());
    while !input.is_char_boundary(offset) {
        offset -= 1;
    }
    let before = &input[..offset];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = before.matches('\n').count() + 1;
    let col = before[line_start..].chars().count() + 1;
    let line_content = input[line_start..].lines().next().unwrap_or("");

    let pointer = " ".repeat(col - 1) + "^";

    format!(
        "XML error at line {}, column {}:\n  |\n{:>3} | {}\n  | {}\n  = {}",
        line, col, line, line_content, pointer, message
    )
}
