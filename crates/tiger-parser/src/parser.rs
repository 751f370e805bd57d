//! Tree builder for Tiger token streams.
//!
//! Uses an explicit stack of currently-open nodes, seeded with the root.
//! Matching of closing tags is purely structural: a `TagClose` pops the
//! stack regardless of its name, and an unmatched closer at root level
//! is tolerated. This permissive behavior is deliberate and pinned by
//! tests below.

use crate::node::Node;
use crate::resolve;
use crate::ParseError;
use tiger_lexer::{Scanner, Token, TokenKind};

/// Tiger document parser.
pub struct Parser;

impl Parser {
    /// Tokenize and parse source into the root node of the markup tree.
    pub fn parse(source: &str) -> Result<Node, ParseError> {
        let tokens = Scanner::tokenize(source)?;
        Ok(Self::build(&tokens))
    }

    /// Build a tree from an already-tokenized stream. Infallible: the
    /// builder tolerates structural irregularities by design.
    pub fn build(tokens: &[Token]) -> Node {
        let mut root = Node::root();
        // Indices into the chain of open nodes; the borrow checker rules
        // out a stack of &mut, so we re-walk the index path per token.
        let mut stack: Vec<usize> = Vec::new();
        // Number of open vector-family elements, so `text` inside a
        // vector subtree keeps its SVG meaning instead of aliasing to p.
        let mut vector_depth = 0usize;

        for token in tokens {
            match &token.kind {
                TokenKind::Comment(text) => {
                    append(&mut root, &stack, Node::comment(text.clone()));
                }
                TokenKind::Text(text) => {
                    append(&mut root, &stack, Node::text(text.clone()));
                }
                TokenKind::TagOpen { name, attributes } => {
                    let node = resolve_element(name, attributes.clone(), vector_depth > 0);
                    if resolve::is_vector_family(name) {
                        vector_depth += 1;
                    }
                    let index = append(&mut root, &stack, node);
                    stack.push(index);
                }
                // Both closer kinds pop structurally; either may close a
                // vector-family element in malformed-but-tolerated input,
                // so both maintain the vector depth.
                TokenKind::TagClose(_) | TokenKind::FragmentClose => {
                    // Unmatched closers are tolerated, not fatal.
                    if let Some(index) = stack.pop() {
                        let closed = node_at(&root, &stack, index);
                        if closed
                            .tag()
                            .is_some_and(resolve::is_vector_family)
                        {
                            vector_depth = vector_depth.saturating_sub(1);
                        }
                    }
                }
                TokenKind::FragmentOpen => {
                    let index = append(&mut root, &stack, Node::fragment());
                    stack.push(index);
                }
            }
        }

        root
    }
}

/// Append a child under the node addressed by `stack`, returning the
/// child's index within its parent.
fn append(root: &mut Node, stack: &[usize], child: Node) -> usize {
    let mut parent = root;
    for &index in stack {
        parent = &mut parent.children[index];
    }
    parent.children.push(child);
    parent.children.len() - 1
}

/// The node at `index` under the parent addressed by `stack`.
fn node_at<'a>(root: &'a Node, stack: &[usize], index: usize) -> &'a Node {
    let mut parent = root;
    for &i in stack {
        parent = &parent.children[i];
    }
    &parent.children[index]
}

/// Resolve a raw opening tag into an element node: rewrite attributes,
/// retag `text` via `as`, and alias abstract element names. Media and
/// vector elements keep their raw names for structural resolution at
/// serialization.
fn resolve_element(name: &str, raw: Vec<(String, String)>, in_vector: bool) -> Node {
    let mut attributes = resolve::rewrite_attributes(name, raw);

    if name == "media" || resolve::is_vector_family(name) {
        return Node::element(name, attributes);
    }

    if name == "text" {
        if in_vector {
            // SVG text element, resolved by the serializer.
            return Node::element(name, attributes);
        }
        let tag = match attributes.iter().position(|(k, _)| k == "as") {
            Some(index) => {
                let (_, value) = attributes.remove(index);
                if resolve::is_text_as_tag(&value) {
                    value
                } else {
                    // Unlisted `as` values are ignored; the directive
                    // attribute is still consumed.
                    "p".to_string()
                }
            }
            None => "p".to_string(),
        };
        return Node::element(tag, attributes);
    }

    match resolve::alias(name) {
        Some(concrete) => Node::element(concrete, attributes),
        None => Node::element(name, attributes),
    }
}
