//! HTML serializer.
//!
//! Walks the markup tree and renders indented HTML. Indentation is two
//! spaces per depth level and purely cosmetic. The walk is a pure
//! function of the tree and the supplied [`ContentSource`].

use crate::content::{ContentSource, FsContentSource};
use crate::resolve;
use tiger_lexer::token::is_void_element;
use tiger_parser::{Node, NodeKind};

/// Serialize a tree using the filesystem for external content.
pub fn serialize(root: &Node) -> String {
    serialize_with(root, &FsContentSource)
}

/// Serialize a tree, reading external vector content through `content`.
pub fn serialize_with(root: &Node, content: &dyn ContentSource) -> String {
    let mut out = String::new();
    render_children(root, content, &mut out, 0);
    out
}

fn render_children(node: &Node, content: &dyn ContentSource, out: &mut String, depth: usize) {
    for child in &node.children {
        render_node(child, content, out, depth);
    }
}

fn render_node(node: &Node, content: &dyn ContentSource, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);

    match &node.kind {
        NodeKind::Text(text) => {
            out.push_str(&indent);
            out.push_str(text);
            out.push('\n');
        }
        NodeKind::Comment(text) => {
            out.push_str(&format!("{indent}<!-- {text} -->\n"));
        }
        // A fragment contributes its children with no wrapping tag.
        NodeKind::Fragment | NodeKind::Root => {
            render_children(node, content, out, depth);
        }
        NodeKind::Element(tag) if tag == "media" => {
            render_media(node, content, out, depth);
        }
        NodeKind::Element(tag) if resolve::is_vector_element(node) => {
            render_vector(tag, node, content, out, depth);
        }
        NodeKind::Element(tag) => {
            let attrs = attr_string(&node.attributes);

            if is_void_element(tag) {
                // Children are suppressed even if present.
                out.push_str(&format!("{indent}<{tag}{attrs} />\n"));
                return;
            }

            out.push_str(&format!("{indent}<{tag}{attrs}>\n"));
            render_children(node, content, out, depth + 1);
            out.push_str(&format!("{indent}</{tag}>\n"));
        }
    }
}

/// Render a media element as its type-selected wrapper with presence
/// booleans and responsive-source handling applied.
fn render_media(node: &Node, content: &dyn ContentSource, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    let tag = resolve::media_tag(node);

    let mut attrs = String::new();
    for (key, value) in resolve::media_attributes(node) {
        match value {
            Some(value) => attrs.push_str(&format!(" {key}=\"{value}\"")),
            None => attrs.push_str(&format!(" {key}")),
        }
    }

    out.push_str(&format!("{indent}<{tag}{attrs}>\n"));
    render_children(node, content, out, depth + 1);
    out.push_str(&format!("{indent}</{tag}>\n"));
}

/// Render a vector-family element as its concrete SVG tag, splicing the
/// inner markup of an external file when `src` is present.
fn render_vector(
    name: &str,
    node: &Node,
    content: &dyn ContentSource,
    out: &mut String,
    depth: usize,
) {
    let indent = "  ".repeat(depth);
    let tag = resolve::vector_tag(name);
    let attrs = attr_string(&resolve::vector_attributes(name, node));

    if let Some(src) = node.attr("src") {
        match content.read_text(src) {
            Ok(external) => {
                out.push_str(&format!("{indent}<{tag}{attrs}>\n"));
                out.push_str(&format!(
                    "{indent}  {}\n",
                    resolve::extract_inner_markup(&external)
                ));
                out.push_str(&format!("{indent}</{tag}>\n"));
                return;
            }
            Err(e) => {
                // Non-fatal: the element renders without injected content.
                log::warn!("failed to load vector source `{src}`: {e}");
            }
        }
    }

    out.push_str(&format!("{indent}<{tag}{attrs}>\n"));
    render_children(node, content, out, depth + 1);
    out.push_str(&format!("{indent}</{tag}>\n"));
}

fn attr_string(attributes: &[(String, String)]) -> String {
    attributes
        .iter()
        .map(|(key, value)| format!(" {key}=\"{value}\""))
        .collect()
}
