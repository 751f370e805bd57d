/// Structural classification of a markup node.
///
/// The structural kinds form a closed set; element names stay open-ended
/// and are resolved through the tables in [`crate::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Fragment,
    Comment(String),
    Text(String),
    Element(String),
}

/// A node in the markup tree.
///
/// Only `Text`/`Comment` nodes carry payload text, and they have empty
/// `children` and `attributes`; every other node's content lives in
/// `children` and `attributes`. Child order equals document order.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn root() -> Self {
        Self::new(NodeKind::Root)
    }

    pub fn fragment() -> Self {
        Self::new(NodeKind::Fragment)
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Comment(text.into()))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(text.into()))
    }

    pub fn element(tag: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        Self {
            kind: NodeKind::Element(tag.into()),
            attributes,
            children: Vec::new(),
        }
    }

    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// The element tag name, if this node is an element.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element(tag) => Some(tag),
            _ => None,
        }
    }

    /// Look up an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}
