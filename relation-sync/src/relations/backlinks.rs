//! Back-link transforms applied inside a mutator's read-modify-write.
//!
//! Both functions are pure over the frontmatter map and report whether they
//! changed it. Entries are compared by lowercase link target; entries that
//! are not wikilinks never match.

use super::wikilink;
use crate::vault::Frontmatter;
use serde_json::Value;

fn link_key(text: &str) -> Option<String> {
    wikilink::parse(text).map(|link| link.target_path.to_lowercase())
}

fn is_same_target(item: &Value, key: &Option<String>) -> bool {
    match (item.as_str(), key) {
        (Some(text), Some(_)) => link_key(text) == *key,
        _ => false,
    }
}

/// Add `back_link` to the list under `property`.
///
/// Absent or null property: created as a one-element list. List: appended
/// unless an entry already points at the same target. Any other type: left
/// untouched.
pub fn add_back_link(frontmatter: &mut Frontmatter, property: &str, back_link: &str) -> bool {
    let key = link_key(back_link);

    match frontmatter.get_mut(property) {
        None | Some(Value::Null) => {
            frontmatter.insert(
                property.to_string(),
                Value::Array(vec![Value::String(back_link.to_string())]),
            );
            true
        }
        Some(Value::Array(items)) => {
            if items.iter().any(|item| is_same_target(item, &key)) {
                return false;
            }
            items.push(Value::String(back_link.to_string()));
            true
        }
        Some(_) => false,
    }
}

/// Remove every entry of the list under `property` that points at `back_link`'s target.
pub fn remove_back_link(frontmatter: &mut Frontmatter, property: &str, back_link: &str) -> bool {
    let key = link_key(back_link);

    let Some(Value::Array(items)) = frontmatter.get_mut(property) else {
        return false;
    };
    let before = items.len();
    items.retain(|item| !is_same_target(item, &key));
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fm(value: Value) -> Frontmatter {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_add_creates_list() {
        let mut frontmatter = Frontmatter::new();
        assert!(add_back_link(&mut frontmatter, "tasks", "[[tasks/Write docs]]"));
        assert_eq!(frontmatter["tasks"], json!(["[[tasks/Write docs]]"]));

        let mut frontmatter = fm(json!({ "tasks": null }));
        assert!(add_back_link(&mut frontmatter, "tasks", "[[A]]"));
        assert_eq!(frontmatter["tasks"], json!(["[[A]]"]));
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut frontmatter = Frontmatter::new();
        add_back_link(&mut frontmatter, "backlinked", "[[A]]");
        assert!(!add_back_link(&mut frontmatter, "backlinked", "[[A]]"));
        assert!(!add_back_link(&mut frontmatter, "backlinked", "[[a|Alias]]"));
        assert_eq!(frontmatter["backlinked"], json!(["[[A]]"]));
    }

    #[test]
    fn test_add_appends_to_existing_list() {
        let mut frontmatter = fm(json!({ "related": ["[[B]]", 4] }));
        assert!(add_back_link(&mut frontmatter, "related", "[[A]]"));
        assert_eq!(frontmatter["related"], json!(["[[B]]", 4, "[[A]]"]));
    }

    #[test]
    fn test_add_never_coerces_scalar() {
        let mut frontmatter = fm(json!({ "related": "[[B]]" }));
        assert!(!add_back_link(&mut frontmatter, "related", "[[A]]"));
        assert_eq!(frontmatter["related"], json!("[[B]]"));
    }

    #[test]
    fn test_remove_every_match() {
        let mut frontmatter = fm(json!({ "related": ["[[A]]", "[[B]]", "[[a|again]]", "A"] }));
        assert!(remove_back_link(&mut frontmatter, "related", "[[A]]"));
        assert_eq!(frontmatter["related"], json!(["[[B]]", "A"]));
    }

    #[test]
    fn test_remove_noop_cases() {
        let mut frontmatter = fm(json!({ "related": "[[A]]" }));
        assert!(!remove_back_link(&mut frontmatter, "related", "[[A]]"));
        assert!(!remove_back_link(&mut frontmatter, "missing", "[[A]]"));
        let mut frontmatter = fm(json!({ "related": ["[[B]]"] }));
        assert!(!remove_back_link(&mut frontmatter, "related", "[[A]]"));
        assert_eq!(frontmatter["related"], json!(["[[B]]"]));
    }
}
