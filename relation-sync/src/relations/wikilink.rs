//! Wikilink codec for `[[path]]` and `[[path|alias]]`.

use super::normalize::CanonicalValue;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Note file extension stripped when formatting links
pub const NOTE_EXTENSION: &str = ".md";

static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\[([^\]|]+)(?:\|([^\]]+))?\]\]$").unwrap());

/// A parsed wikilink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReference {
    /// The text the link was parsed from
    pub raw: String,
    pub target_path: String,
    /// Alias if given, otherwise the last path segment
    pub display: String,
}

impl LinkReference {
    /// The explicit alias, if the raw text carried one.
    pub fn alias(&self) -> Option<&str> {
        WIKILINK_RE
            .captures(&self.raw)
            .and_then(|caps| caps.get(2))
            .map(|m| m.as_str().trim())
            .filter(|a| !a.is_empty())
    }
}

pub fn is_link(text: &str) -> bool {
    WIKILINK_RE.is_match(text)
}

/// Parse a wikilink. Returns `None` for anything that is not one.
pub fn parse(text: &str) -> Option<LinkReference> {
    let caps = WIKILINK_RE.captures(text)?;
    let target_path = caps.get(1)?.as_str().trim().to_string();
    let alias = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|a| !a.is_empty());

    let display = match alias {
        Some(alias) => alias.to_string(),
        None => target_path
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or(&target_path)
            .to_string(),
    };

    Some(LinkReference {
        raw: text.to_string(),
        target_path,
        display,
    })
}

/// Format a note path as a wikilink, dropping the `.md` extension.
pub fn format(path: &str, alias: Option<&str>) -> String {
    let clean = path.strip_suffix(NOTE_EXTENSION).unwrap_or(path);
    match alias {
        Some(alias) if !alias.is_empty() => format!("[[{}|{}]]", clean, alias),
        _ => format!("[[{}]]", clean),
    }
}

/// Parse the string elements of a list; non-strings and non-links are dropped.
pub fn parse_list(values: &[CanonicalValue]) -> Vec<LinkReference> {
    values
        .iter()
        .filter_map(CanonicalValue::as_str)
        .filter_map(parse)
        .collect()
}

/// True for a non-empty list whose every element is a wikilink string.
pub fn is_relation_value(value: &CanonicalValue) -> bool {
    match value.as_list() {
        Some(items) if !items.is_empty() => items
            .iter()
            .all(|item| item.as_str().map(is_link).unwrap_or(false)),
        _ => false,
    }
}

/// Comparison key for a link entry: lowercase target path, or the lowercase raw text.
pub fn normalized_target(text: &str) -> String {
    match parse(text) {
        Some(link) => link.target_path.to_lowercase(),
        None => text.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_link() {
        assert!(is_link("[[Project X]]"));
        assert!(is_link("[[Foo/Bar|Baz]]"));
        assert!(!is_link("Project X"));
        assert!(!is_link("[[]]"));
        assert!(!is_link("see [[Project X]]"));
        assert!(!is_link("[[Project X]] and more"));
    }

    #[test]
    fn test_parse_with_alias() {
        let link = parse("[[Foo/Bar|Baz]]").unwrap();
        assert_eq!(link.target_path, "Foo/Bar");
        assert_eq!(link.display, "Baz");
        assert_eq!(link.alias(), Some("Baz"));
        assert_eq!(link.raw, "[[Foo/Bar|Baz]]");
    }

    #[test]
    fn test_parse_display_falls_back_to_last_segment() {
        let link = parse("[[ projects/Alpha ]]").unwrap();
        assert_eq!(link.target_path, "projects/Alpha");
        assert_eq!(link.display, "Alpha");
        assert_eq!(link.alias(), None);

        let link = parse("[[Alpha| ]]").unwrap();
        assert_eq!(link.display, "Alpha");
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert!(parse("Alpha").is_none());
        assert!(parse("[[Alpha").is_none());
    }

    #[test]
    fn test_format() {
        assert_eq!(format("notes/Alpha.md", None), "[[notes/Alpha]]");
        assert_eq!(format("notes/Alpha", Some("A")), "[[notes/Alpha|A]]");
        assert_eq!(format("Alpha.md.md", None), "[[Alpha.md]]");
    }

    #[test]
    fn test_round_trip() {
        for text in ["[[Alpha]]", "[[Foo/Bar|Baz]]", "[[deep/er/path|Shown Name]]"] {
            let link = parse(text).unwrap();
            let again = parse(&format(&link.target_path, link.alias())).unwrap();
            assert_eq!(again.target_path, link.target_path);
            assert_eq!(again.display, link.display);
        }
    }

    #[test]
    fn test_parse_list_drops_unparsable() {
        let values = vec![
            CanonicalValue::from("[[A]]"),
            CanonicalValue::Number(1.0),
            CanonicalValue::from("plain"),
            CanonicalValue::from("[[B|Bee]]"),
        ];
        let links = parse_list(&values);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].target_path, "A");
        assert_eq!(links[1].display, "Bee");
    }

    #[test]
    fn test_is_relation_value() {
        assert!(is_relation_value(&CanonicalValue::List(vec!["[[A]]".into()])));
        assert!(!is_relation_value(&CanonicalValue::List(vec![])));
        assert!(!is_relation_value(&CanonicalValue::List(vec!["[[A]]".into(), "B".into()])));
        assert!(!is_relation_value(&CanonicalValue::from("[[A]]")));
    }

    #[test]
    fn test_normalized_target() {
        assert_eq!(normalized_target("[[Projects/Alpha|A]]"), "projects/alpha");
        assert_eq!(normalized_target("Alpha"), "alpha");
    }
}
