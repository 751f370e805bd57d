//! Tiger Lexer
//!
//! Tokenizes Tiger source (a constrained JSX-like markup dialect) into a
//! flat, ordered token stream. Handles opening/closing tags with quoted
//! and unquoted attribute values, self-closing tags, fragment delimiters
//! (`<>` / `</>`), brace comments (`{/* ... */}`), and trimmed text runs.
//!
//! # Example
//!
//! ```
//! use tiger_lexer::Scanner;
//!
//! let tokens = Scanner::tokenize("").unwrap();
//! assert!(tokens.is_empty());
//! ```

pub mod scanner;
pub mod token;

pub use scanner::Scanner;
pub use token::{Span, Token, TokenKind};

/// Lexer error with position information and a window of the
/// surrounding source for context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("syntax error at line {line}, column {column}: {message} (near `{context}`)")]
pub struct LexError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
}
