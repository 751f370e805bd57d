/// A position in source text, tracking line and column for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Token classification for Tiger source.
///
/// Data-carrying variants embed their payload directly. Attribute order
/// on `TagOpen` is the order written in the source.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `<name attr="value" ...>` — also emitted for the open half of a
    /// self-closing tag.
    TagOpen {
        name: String,
        attributes: Vec<(String, String)>,
    },
    /// `</name>` — also emitted synthetically after a self-closing tag.
    TagClose(String),
    /// A trimmed, non-empty run of text between tags.
    Text(String),
    /// `{/* ... */}` with the inner text trimmed.
    Comment(String),
    /// `<>`
    FragmentOpen,
    /// `</>`
    FragmentClose,
}

/// A token produced by the Tiger lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Elements serialized without children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &["img", "input", "br", "hr"];

/// Check if a tag name is a void element.
pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}
