//! EBNF front-end for the gramtab grammar compiler.
//!
//! ## Architecture
//!
//! - [`tree`]: arena-backed syntax tree with explicit reference counts
//! - [`parser`]: recursive-descent parser over the lexer's [`Reader`]
//! - [`canon`]: literal deduplication turning the tree into a shared DAG
//! - [`error`]: the single-fault parse error type
//!
//! ## Pipeline
//!
//! ```text
//! source text -> parse -> Tree -> canonicalize -> shared DAG
//! ```
//!
//! [`Reader`]: gramtab_lexer::Reader

pub mod canon;
pub mod error;
pub mod parser;
pub mod tree;

pub use canon::canonicalize;
pub use error::ParseError;
pub use parser::parse;
pub use tree::{Node, NodeId, NodeKind, Tree};
