//! Parse-time resolution tables: element aliasing and attribute
//! rewriting. The tables live outside the control flow so new element
//! kinds and rewrite rules stay additive.

/// Abstract element categories and their default concrete tag.
///
/// `media` and the vector family are deliberately absent: their concrete
/// tag depends on attributes and is chosen at serialization.
const ELEMENT_ALIASES: &[(&str, &str)] = &[
    ("view", "div"),
    ("text", "p"),
    ("link", "a"),
    ("button", "button"),
    ("form", "form"),
    ("list", "ul"),
    ("table", "table"),
];

/// Tags a `text` element may be retagged to via its `as` attribute.
const TEXT_AS_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "strong", "em",
];

/// Elements whose `bind` attribute becomes an `onclick` handler.
const BUTTON_FAMILY: &[&str] = &["button", "input"];

/// Element names of the vector subsystem. Their concrete SVG tag is
/// resolved by the serializer.
const VECTOR_FAMILY: &[&str] = &[
    "vector", "path", "circle", "rect", "line", "polyline", "polygon", "g", "defs", "gradient",
    "stop", "animate", "animateTransform", "use", "symbol", "mask", "clipPath", "tspan",
];

/// Look up the default concrete tag for an abstract element name.
pub fn alias(name: &str) -> Option<&'static str> {
    ELEMENT_ALIASES
        .iter()
        .find(|(abstract_name, _)| *abstract_name == name)
        .map(|(_, concrete)| *concrete)
}

pub fn is_text_as_tag(tag: &str) -> bool {
    TEXT_AS_TAGS.contains(&tag)
}

pub fn is_button_family(tag: &str) -> bool {
    BUTTON_FAMILY.contains(&tag)
}

pub fn is_vector_family(tag: &str) -> bool {
    VECTOR_FAMILY.contains(&tag)
}

/// Rewrite source attributes to their output form. First match wins,
/// independently per attribute key; order is preserved.
pub fn rewrite_attributes(
    tag: &str,
    attributes: Vec<(String, String)>,
) -> Vec<(String, String)> {
    attributes
        .into_iter()
        .map(|(key, value)| match key.as_str() {
            "className" => ("class".to_string(), value),
            "to" => ("href".to_string(), value),
            "bind" if is_button_family(tag) => {
                ("onclick".to_string(), format!("({value})()"))
            }
            k if k.starts_with("on") && k.len() > 2 => {
                (format!("data-event-{}", k[2..].to_lowercase()), value)
            }
            _ => (key, value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_class_name_rewrite() {
        assert_eq!(
            rewrite_attributes("view", attrs(&[("className", "box")])),
            attrs(&[("class", "box")])
        );
    }

    #[test]
    fn test_to_rewrite() {
        assert_eq!(
            rewrite_attributes("link", attrs(&[("to", "/home")])),
            attrs(&[("href", "/home")])
        );
    }

    #[test]
    fn test_bind_on_button() {
        assert_eq!(
            rewrite_attributes("button", attrs(&[("bind", "handleClick")])),
            attrs(&[("onclick", "(handleClick)()")])
        );
    }

    #[test]
    fn test_bind_on_input() {
        assert_eq!(
            rewrite_attributes("input", attrs(&[("bind", "submit")])),
            attrs(&[("onclick", "(submit)()")])
        );
    }

    #[test]
    fn test_bind_outside_button_family_passes_through() {
        assert_eq!(
            rewrite_attributes("view", attrs(&[("bind", "x")])),
            attrs(&[("bind", "x")])
        );
    }

    #[test]
    fn test_event_attribute_rewrite() {
        assert_eq!(
            rewrite_attributes("view", attrs(&[("onMouseOver", "hover()")])),
            attrs(&[("data-event-mouseover", "hover()")])
        );
    }

    #[test]
    fn test_order_preserved() {
        let rewritten = rewrite_attributes(
            "link",
            attrs(&[("className", "a"), ("to", "/x"), ("id", "b")]),
        );
        assert_eq!(rewritten, attrs(&[("class", "a"), ("href", "/x"), ("id", "b")]));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(alias("view"), Some("div"));
        assert_eq!(alias("text"), Some("p"));
        assert_eq!(alias("link"), Some("a"));
        assert_eq!(alias("list"), Some("ul"));
        assert_eq!(alias("media"), None);
        assert_eq!(alias("vector"), None);
        assert_eq!(alias("span"), None);
    }

    #[test]
    fn test_vector_family() {
        assert!(is_vector_family("vector"));
        assert!(is_vector_family("gradient"));
        assert!(is_vector_family("clipPath"));
        assert!(!is_vector_family("view"));
    }
}
