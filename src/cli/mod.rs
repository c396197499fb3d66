//! CLI argument parsing, mapper discovery and output rendering

use crate::config::Configuration;
use crate::mapping::CompiledStatement;
use crate::parsing::UnresolvedPolicy;
use crate::scripting::SqlSource;
use clap::{Args, Parser, Subcommand};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// sqlmapper - compile XML SQL mapper files
#[derive(Parser, Debug)]
#[command(name = "sqlmapper")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile mapper files and print the resulting statements
    Compile {
        #[command(flatten)]
        options: LoadOptions,

        /// Files, directories or glob patterns of mapper XML files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Compile mapper files and report errors only
    Check {
        #[command(flatten)]
        options: LoadOptions,

        /// Files, directories or glob patterns of mapper XML files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Settings shared by every command that loads mappers
#[derive(Args, Debug, Clone, Default)]
pub struct LoadOptions {
    /// Active database dialect used to select databaseId variants
    #[arg(long)]
    pub database_id: Option<String>,

    /// Global variable available to ${} placeholders in fragments
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,

    /// Use generated keys for insert statements by default
    #[arg(long)]
    pub use_generated_keys: bool,

    /// Fail on ${} placeholders that have no value instead of keeping them
    #[arg(long)]
    pub strict_placeholders: bool,

    /// Allow ${name:default} fallbacks in placeholders
    #[arg(long)]
    pub default_values: bool,

    /// Collapse whitespace in static SQL
    #[arg(long)]
    pub shrink_whitespace: bool,
}

impl LoadOptions {
    pub fn to_configuration(&self) -> Configuration {
        let mut config = Configuration::new()
            .with_use_generated_keys(self.use_generated_keys)
            .with_shrink_whitespaces_in_sql(self.shrink_whitespace);
        for (name, value) in &self.variables {
            config = config.with_variable(name, value);
        }
        if let Some(database_id) = &self.database_id {
            config = config.with_database_id(database_id);
        }
        if self.strict_placeholders {
            config = config.with_unresolved_policy(UnresolvedPolicy::Fail);
        }
        if self.default_values {
            config = config.with_default_value_separator(":");
        }
        config
    }
}

fn parse_variable(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    if name.trim().is_empty() {
        return Err("variable name is empty".to_string());
    }
    Ok((name.trim().to_string(), value.to_string()))
}

/// Discover mapper XML files in the given paths
pub fn discover_files(paths: &[PathBuf]) -> crate::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in walkdir::WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if path.is_file() && is_xml(path) {
                    files.push(path.to_path_buf());
                }
            }
        } else if let Ok(matches) = glob::glob(&path.to_string_lossy()) {
            files.extend(
                matches
                    .filter_map(|p| p.ok())
                    .filter(|p| p.is_file() && is_xml(p)),
            );
        }
    }

    Ok(files)
}

fn is_xml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "xml")
}

/// Human-readable summary of one compiled statement
pub fn render_statement(statement: &CompiledStatement) -> String {
    let mut out = String::new();
    let _ = write!(out, "{} [{}]", statement.id, statement.command);
    if let Some(database_id) = &statement.database_id {
        let _ = write!(out, " databaseId={database_id}");
    }
    let _ = writeln!(out, " key={}", statement.key_generator);

    match &statement.sql_source {
        SqlSource::Static(sql) => {
            let _ = writeln!(out, "  sql: {}", sql.sql.trim());
            if !sql.parameters.is_empty() {
                let names: Vec<&str> = sql.parameters.iter().map(|p| p.property.as_str()).collect();
                let _ = writeln!(out, "  parameters: {}", names.join(", "));
            }
        }
        SqlSource::Dynamic { root } => {
            let body: String = root.children.iter().map(ToString::to_string).collect();
            let _ = writeln!(out, "  dynamic: {}", body.trim());
        }
    }
    out
}
