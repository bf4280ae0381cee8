//! Table construction and emission for the gramtab grammar compiler.
//!
//! This crate turns a canonicalized parse DAG into the flat parsing
//! table the downstream interpreter walks, and renders that table as
//! either a C or a NASM source/header pair.
//!
//! ## Architecture
//!
//! - [`table`]: the back-end-agnostic table model, the numbering/layout
//!   pass, and branch resolution
//! - [`emit`]: the two text back-ends formatting a finished [`Table`]
//!
//! ## Pipeline
//!
//! ```text
//! Tree -> canonicalize -> layout (ids, names, offsets) -> Table -> .h/.c or .inc/.nasm
//! ```

pub mod emit;
pub mod table;

use std::fmt;

use gramtab_parser::Tree;

pub use emit::{emit_c, emit_nasm};
pub use table::layout::{layout, Layout};
pub use table::{build, Table};

/// An error raised while building the parsing table.
#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
    /// An identifier reference that matches no declared production.
    UnknownProduction { name: String },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProduction { name } => write!(f, "production '{name}' not found"),
        }
    }
}

impl std::error::Error for CodegenError {}

/// Run the whole lowering pipeline: canonicalize the tree, assign ids,
/// names, and branch offsets, and resolve branches into a [`Table`].
pub fn lower(tree: &mut Tree) -> Result<Table, CodegenError> {
    gramtab_parser::canonicalize(tree);
    let layout = layout(tree);
    build(tree, &layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codegen_error_display() {
        let err = CodegenError::UnknownProduction { name: "b".into() };
        assert_eq!(err.to_string(), "production 'b' not found");
    }
}
