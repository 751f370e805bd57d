//! Tiger Code Generator
//!
//! Renders the markup tree from `tiger-parser` into an indented HTML
//! string, resolving media and vector elements structurally on the way
//! out.
//!
//! ```text
//! source → tokenize → parse → serialize → HTML
//! ```
//!
//! The whole pipeline is exposed as [`compile`]; external content reads
//! (vector `src` inlining) go through the [`ContentSource`] seam.

pub mod content;
pub mod html;
pub mod resolve;

pub use content::{ContentSource, FsContentSource};

use tiger_parser::Parser;

/// Compilation error: the pipeline fails only on lexical/structural
/// problems in the source, reported with line/column context.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct CompileError(#[from] pub tiger_parser::ParseError);

/// Compile one Tiger source string into an HTML string.
pub fn compile(source: &str) -> Result<String, CompileError> {
    compile_with(source, &FsContentSource)
}

/// Compile with an explicit content source for external reads.
/// Deterministic given the same source and content.
pub fn compile_with(
    source: &str,
    content: &dyn ContentSource,
) -> Result<String, CompileError> {
    let root = Parser::parse(source)?;
    Ok(html::serialize_with(&root, content))
}
