//! YAML frontmatter blocks: split, parse, render.
//!
//! Frontmatter is parsed with serde_yaml and held as a JSON map so the
//! relation engine sees the same value shapes for every store. The body is
//! kept byte for byte.

use crate::vault::Frontmatter;
use serde_json::Value;

const DELIMITER: &str = "---";

/// Split content into (frontmatter_yaml, body). No block gives `(None, content)`.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let start = if content.starts_with('\u{feff}') { '\u{feff}'.len_utf8() } else { 0 };
    let mut lines = content[start..].split_inclusive('\n');

    let Some(first) = lines.next() else {
        return (None, content);
    };
    if first.trim_end() != DELIMITER {
        return (None, content);
    }

    let yaml_start = start + first.len();
    let mut offset = yaml_start;
    for line in lines {
        let trimmed = line.trim_end();
        if trimmed == DELIMITER || trimmed == "..." {
            let yaml = &content[yaml_start..offset];
            let body = &content[offset + line.len()..];
            return (Some(yaml), body);
        }
        offset += line.len();
    }

    // Unterminated block: treat everything as body
    (None, content)
}

/// Parse a YAML block into a frontmatter map. An empty block is an empty map.
pub fn parse_frontmatter(yaml: &str) -> Result<Frontmatter, String> {
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::new());
    }
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| format!("invalid YAML: {}", e))?;
    let json_value: Value =
        serde_json::to_value(yaml_value).map_err(|e| format!("unsupported YAML value: {}", e))?;

    match json_value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Frontmatter::new()),
        other => Err(format!("frontmatter must be a mapping, found {}", other)),
    }
}

/// Parse a complete note into (frontmatter, body)
pub fn parse_note(content: &str) -> Result<(Frontmatter, &str), String> {
    match split_frontmatter(content) {
        (Some(yaml), body) => Ok((parse_frontmatter(yaml)?, body)),
        (None, body) => Ok((Frontmatter::new(), body)),
    }
}

/// Render frontmatter and body back into note content.
///
/// An empty map with an empty body renders as an empty file.
pub fn render_note(frontmatter: &Frontmatter, body: &str) -> Result<String, String> {
    if frontmatter.is_empty() {
        return Ok(body.to_string());
    }
    let yaml = serde_yaml::to_string(frontmatter)
        .map_err(|e| format!("Failed to serialize frontmatter: {}", e))?;
    Ok(format!("{}\n{}{}\n{}", DELIMITER, yaml, DELIMITER, body))
}
