//! Compiled statement descriptors
//!
//! These are the outputs of the builder. Type names stay as written in the
//! mapper; resolving them is left to whatever executes the statements.

use crate::scripting::SqlSource;
use std::fmt;
use std::str::FromStr;

/// Suffix appended to a parent statement id to name its key probe
pub const SELECT_KEY_SUFFIX: &str = "!selectKey";

/// Kind of SQL command, implied by the statement's tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlCommandKind {
    Select,
    Insert,
    Update,
    Delete,
    Flush,
}

impl SqlCommandKind {
    /// Command kind for a statement tag, if the tag is a statement at all
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "select" => Some(Self::Select),
            "insert" => Some(Self::Insert),
            "update" => Some(Self::Update),
            "delete" => Some(Self::Delete),
            "flush" => Some(Self::Flush),
            _ => None,
        }
    }
}

impl fmt::Display for SqlCommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Flush => "FLUSH",
        };
        f.write_str(name)
    }
}

/// How the statement is handed to the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatementType {
    Statement,
    #[default]
    Prepared,
    Callable,
}

impl FromStr for StatementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STATEMENT" => Ok(Self::Statement),
            "PREPARED" => Ok(Self::Prepared),
            "CALLABLE" => Ok(Self::Callable),
            _ => Err("expected one of STATEMENT, PREPARED, CALLABLE".to_string()),
        }
    }
}

/// Cursor type requested for result sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSetType {
    Default,
    ForwardOnly,
    ScrollInsensitive,
    ScrollSensitive,
}

impl FromStr for ResultSetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DEFAULT" => Ok(Self::Default),
            "FORWARD_ONLY" => Ok(Self::ForwardOnly),
            "SCROLL_INSENSITIVE" => Ok(Self::ScrollInsensitive),
            "SCROLL_SENSITIVE" => Ok(Self::ScrollSensitive),
            _ => Err(
                "expected one of DEFAULT, FORWARD_ONLY, SCROLL_INSENSITIVE, SCROLL_SENSITIVE"
                    .to_string(),
            ),
        }
    }
}

/// Strategy used to obtain generated keys for a statement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyGeneratorStrategy {
    #[default]
    None,
    /// Keys assigned by the driver and read back after the insert
    AutoGenerated,
    /// A derived select statement run before or after the main statement
    ProbeStatement {
        statement_id: String,
        run_before: bool,
    },
}

impl fmt::Display for KeyGeneratorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("none"),
            Self::AutoGenerated => f.write_str("auto-generated"),
            Self::ProbeStatement {
                statement_id,
                run_before,
            } => {
                let order = if *run_before { "before" } else { "after" };
                write!(f, "probe {statement_id} ({order})")
            }
        }
    }
}

/// A fully compiled, registered statement
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// Namespace-qualified id
    pub id: String,
    /// Mapper resource the statement came from
    pub resource: String,
    pub command: SqlCommandKind,
    pub statement_type: StatementType,
    pub fetch_size: Option<i32>,
    pub timeout: Option<i32>,
    pub parameter_map: Option<String>,
    pub parameter_type: Option<String>,
    pub result_maps: Vec<String>,
    pub result_type: Option<String>,
    pub result_set_type: Option<ResultSetType>,
    pub flush_cache: bool,
    pub use_cache: bool,
    pub result_ordered: bool,
    pub key_generator: KeyGeneratorStrategy,
    pub key_properties: Vec<String>,
    pub key_columns: Vec<String>,
    pub database_id: Option<String>,
    pub lang: String,
    pub result_sets: Vec<String>,
    pub sql_source: SqlSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_kind_from_tag() {
        assert_eq!(SqlCommandKind::from_tag("insert"), Some(SqlCommandKind::Insert));
        assert_eq!(SqlCommandKind::from_tag("sql"), None);
        assert_eq!(SqlCommandKind::Flush.to_string(), "FLUSH");
    }

    #[test]
    fn enum_attributes_parse_exact_names() {
        assert_eq!("CALLABLE".parse::<StatementType>(), Ok(StatementType::Callable));
        assert!("prepared".parse::<StatementType>().is_err());
        assert_eq!(
            "SCROLL_INSENSITIVE".parse::<ResultSetType>(),
            Ok(ResultSetType::ScrollInsensitive)
        );
    }

    #[test]
    fn probe_strategy_display() {
        let strategy = KeyGeneratorStrategy::ProbeStatement {
            statement_id: "ns.insert!selectKey".to_string(),
            run_before: true,
        };
        assert_eq!(strategy.to_string(), "probe ns.insert!selectKey (before)");
    }
}
