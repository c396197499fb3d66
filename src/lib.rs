//! sqlmapper - compiles XML SQL mapper definitions into bindable statements
//!
//! A mapper declares reusable `<sql>` fragments and statements
//! (`<select>`, `<insert>`, `<update>`, `<delete>`, `<flush>`) that pull
//! fragments in with `<include refid="..."/>`. Loading a batch of mappers
//! expands every include, compiles `<selectKey>` probes into their own
//! statements, picks each statement's key generator and hands the remaining
//! body to a language driver.

pub mod builder;
pub mod cli;
pub mod config;
pub mod error;
pub mod mapping;
pub mod parsing;
pub mod scripting;
pub mod xml;

pub use builder::{load, MapperLoader, Registry};
pub use config::Configuration;
pub use error::{Error, Result};
pub use mapping::{CompiledStatement, KeyGeneratorStrategy, SqlCommandKind};
pub use scripting::SqlSource;

/// Compile a single mapper document with the given configuration
pub fn compile_mapper(config: Configuration, resource: &str, input: &str) -> Result<Registry> {
    load(config, [(resource, input)])
}
