//! Serialization-time resolution for media and vector elements.
//!
//! The tables here decide the concrete output tag and the final
//! attribute set for the two element subsystems whose shape depends on
//! attributes rather than a fixed alias.

use tiger_parser::Node;

/// Concrete wrapper element per media `type`.
const MEDIA_TYPES: &[(&str, &str)] = &[
    ("image", "picture"),
    ("video", "video"),
    ("audio", "audio"),
];

/// Attributes emitted as valueless presence attributes on media
/// elements.
const MEDIA_BOOLEANS: &[&str] = &["controls", "autoplay", "loop", "muted"];

/// Vector element names mapped to their concrete SVG tag.
const VECTOR_TAGS: &[(&str, &str)] = &[
    ("vector", "svg"),
    ("path", "path"),
    ("circle", "circle"),
    ("rect", "rect"),
    ("line", "line"),
    ("polyline", "polyline"),
    ("polygon", "polygon"),
    ("g", "g"),
    ("defs", "defs"),
    ("gradient", "linearGradient"),
    ("stop", "stop"),
    ("animate", "animate"),
    ("animateTransform", "animateTransform"),
    ("use", "use"),
    ("symbol", "symbol"),
    ("mask", "mask"),
    ("clipPath", "clipPath"),
    ("text", "text"),
    ("tspan", "tspan"),
];

/// Geometry attributes whose plain-number values get a `px` suffix.
const GEOMETRY_ATTRS: &[&str] = &[
    "width", "height", "x", "y", "cx", "cy", "r", "strokeWidth",
];

pub const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// The concrete wrapper tag for a media node (`type` defaults to
/// `image`).
pub fn media_tag(node: &Node) -> &'static str {
    let media_type = node.attr("type").unwrap_or("image");
    MEDIA_TYPES
        .iter()
        .find(|(name, _)| *name == media_type)
        .map_or("picture", |(_, tag)| *tag)
}

/// Final attribute set for a media element: `type` dropped (it chose
/// the wrapper), booleans turned into presence attributes, and the
/// plain `src` dropped when `srcset` supplies responsive sources.
pub fn media_attributes(node: &Node) -> Vec<(String, Option<String>)> {
    let drop_src = node.attr("type").unwrap_or("image") == "image" && node.attr("srcset").is_some();

    node.attributes
        .iter()
        .filter_map(|(key, value)| match key.as_str() {
            "type" => None,
            "src" if drop_src => None,
            k if MEDIA_BOOLEANS.contains(&k) => Some((key.clone(), None)),
            _ => Some((key.clone(), Some(value.clone()))),
        })
        .collect()
}

/// The concrete SVG tag for a vector-family element name.
pub fn vector_tag(name: &str) -> &'static str {
    VECTOR_TAGS
        .iter()
        .find(|(abstract_name, _)| *abstract_name == name)
        .map_or("svg", |(_, tag)| *tag)
}

pub fn is_vector_element(node: &Node) -> bool {
    node.tag()
        .is_some_and(|tag| VECTOR_TAGS.iter().any(|(name, _)| *name == tag))
}

/// Final attribute set for a vector element: numeric geometry values
/// suffixed with `px`, comma-separated `viewBox` renormalized to
/// spaces, the external `src` dropped (its content is spliced
/// separately), and the SVG namespace added on the outermost `vector`.
pub fn vector_attributes(name: &str, node: &Node) -> Vec<(String, String)> {
    let mut attributes: Vec<(String, String)> = node
        .attributes
        .iter()
        .filter_map(|(key, value)| match key.as_str() {
            "src" => None,
            k if GEOMETRY_ATTRS.contains(&k) && value.parse::<f64>().is_ok() => {
                Some((key.clone(), format!("{value}px")))
            }
            "viewBox" if !value.contains(' ') => {
                Some((key.clone(), value.split(',').collect::<Vec<_>>().join(" ")))
            }
            _ => Some((key.clone(), value.clone())),
        })
        .collect();

    if name == "vector" {
        attributes.push(("xmlns".to_string(), SVG_NAMESPACE.to_string()));
    }

    attributes
}

/// Extract the inner markup of the root element of an external vector
/// file. Falls back to the whole trimmed content when no root tag can
/// be recognized.
pub fn extract_inner_markup(content: &str) -> &str {
    let trimmed = content.trim();
    if let Some(open_end) = trimmed.find('>') {
        if trimmed.starts_with('<') {
            if let Some(close_start) = trimmed.rfind("</") {
                if close_start > open_end {
                    return trimmed[open_end + 1..close_start].trim();
                }
            }
        }
    }
    trimmed
}
