//! Mapper compilation pipeline
//!
//! - `namespace` - namespace qualification of ids and references
//! - `selection` - `databaseId` variant selection
//! - `registry` - fragments, statements and key generators of one load
//! - `include` - `<include>` expansion with scoped `${}` substitution
//! - `select_key` - extraction and compilation of `<selectKey>` probes
//! - `statement` - per-statement compilation
//! - `mapper` - mapper documents and the deferred-retry worklist

mod attrs;
pub mod include;
pub mod mapper;
pub mod namespace;
pub mod registry;
pub mod select_key;
pub mod selection;
pub mod statement;

pub use include::IncludeExpander;
pub use mapper::{load, MapperLoader};
pub use namespace::Namespace;
pub use registry::{Fragment, FragmentRegistry, Registry};
pub use select_key::KeyProbeExtractor;
pub use selection::database_id_matches;
pub use statement::{CompiledUnit, StatementCompiler};
