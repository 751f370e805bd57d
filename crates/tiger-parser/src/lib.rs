//! Tiger Parser
//!
//! Consumes the token stream from `tiger-lexer` and builds a single
//! rooted tree of markup nodes. Element aliasing and attribute rewriting
//! are applied as nodes are built; media and vector elements keep their
//! abstract names so the serializer can resolve them structurally.

pub mod node;
pub mod parser;
pub mod resolve;

pub use node::{Node, NodeKind};
pub use parser::Parser;

/// Parse error with position information.
///
/// The tree builder itself is permissive and never fails; every parse
/// error originates in the lexer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("parse error at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl From<tiger_lexer::LexError> for ParseError {
    fn from(e: tiger_lexer::LexError) -> Self {
        Self {
            message: format!("{} (near `{}`)", e.message, e.context),
            line: e.line,
            column: e.column,
        }
    }
}
