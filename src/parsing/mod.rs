//! Text-level template machinery
//!
//! - `token` - generic open/close token scanner
//! - `placeholder` - `${name}` substitution against a variable context
//! - `variables` - scoped variable contexts built per include site

pub mod placeholder;
pub mod token;
pub mod variables;

pub use placeholder::{PlaceholderOptions, PlaceholderResolver, UnresolvedPolicy};
pub use token::TokenParser;
pub use variables::VariableContext;
