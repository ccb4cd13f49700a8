//! View configuration: bidi rules and rollup specs.
//!
//! Loaded from a RON file, or parsed from the host's flat option map where
//! each rule is spread over numbered keys (`bidi1_column`, `bidi1_reverse`,
//! `rollup2_target`, ...).

use super::columns::property_name;
use crate::error::ConfigError;
use relation_sync_types::{AggregationType, BidiRule, RelationDetection, RollupSpec, ViewConfig};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;

/// Load a view config from a RON file. A missing file yields the default config.
pub fn load_view_config(path: &Path) -> Result<ViewConfig, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("[CONFIG] No view config at {}, using defaults", path.display());
            return Ok(ViewConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let config = ron::from_str::<ViewConfig>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        "[CONFIG] Loaded view config from {} ({} bidi rule(s), {} rollup(s))",
        path.display(),
        config.bidi.len(),
        config.rollups.len()
    );
    Ok(config)
}

fn count_option(options: &BTreeMap<String, String>, key: &str) -> usize {
    match options.get(key).map(|v| v.trim()) {
        None | Some("") => 0,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("[CONFIG] Ignoring non-numeric {} = {:?}", key, raw);
            0
        }),
    }
}

fn text_option<'a>(options: &'a BTreeMap<String, String>, key: &str) -> Option<&'a str> {
    options
        .get(key)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

/// Parse the host's flat view options.
///
/// Numbered entries missing either required key are skipped. Rollups default
/// to the `count` aggregation and the name `Rollup <n>`.
pub fn from_options(options: &BTreeMap<String, String>) -> ViewConfig {
    let relation_detection = match text_option(options, "relationDetection") {
        Some("manual") => RelationDetection::Manual,
        _ => RelationDetection::Auto,
    };

    let mut bidi = Vec::new();
    for i in 1..=count_option(options, "bidiCount") {
        let column = text_option(options, &format!("bidi{}_column", i));
        let reverse = text_option(options, &format!("bidi{}_reverse", i));
        match (column, reverse) {
            (Some(column), Some(reverse)) => bidi.push(BidiRule::new(column, reverse)),
            _ => log::debug!("[CONFIG] Bidi sync {} is incomplete, skipping", i),
        }
    }

    let mut rollups = Vec::new();
    for i in 1..=count_option(options, "rollupCount") {
        let relation = text_option(options, &format!("rollup{}_relation", i));
        let target = text_option(options, &format!("rollup{}_target", i));
        let (Some(relation), Some(target)) = (relation, target) else {
            log::debug!("[CONFIG] Rollup {} is incomplete, skipping", i);
            continue;
        };

        let aggregation = match text_option(options, &format!("rollup{}_aggregation", i)) {
            None => AggregationType::default(),
            Some(raw) => AggregationType::from_str(raw).unwrap_or_else(|_| {
                log::warn!("[CONFIG] Unknown aggregation {:?} for rollup {}, using count", raw, i);
                AggregationType::default()
            }),
        };
        let display_name = text_option(options, &format!("rollup{}_name", i))
            .map(str::to_string)
            .unwrap_or_else(|| format!("Rollup {}", i));

        rollups.push(RollupSpec {
            id: format!("rollup_{}", i),
            display_name,
            relation_property_id: relation.to_string(),
            target_property: target.to_string(),
            aggregation,
        });
    }

    ViewConfig {
        relation_detection,
        bidi,
        rollups,
    }
}

/// `(option key, label)` pairs for the aggregation picker, in display order.
pub fn aggregation_options() -> Vec<(String, &'static str)> {
    AggregationType::iter()
        .map(|aggregation| (aggregation.to_string(), aggregation.label()))
        .collect()
}

/// First rule watching `property_id`.
///
/// A rule's column may be stored as the full id (`note.project`) or the bare
/// property name (`project`); both match.
pub fn find_bidi_rule<'a>(rules: &'a [BidiRule], property_id: &str) -> Option<&'a BidiRule> {
    let name = property_name(property_id);
    rules.iter().find(|rule| {
        rule.source_column == property_id
            || rule.source_column == name
            || format!("note.{}", rule.source_column) == property_id
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_options_bidi() {
        let config = from_options(&options(&[
            ("bidiCount", "3"),
            ("bidi1_column", "note.project"),
            ("bidi1_reverse", "tasks"),
            ("bidi2_column", "people"),
            ("bidi3_reverse", "orphan"),
        ]));
        assert_eq!(config.bidi, vec![BidiRule::new("note.project", "tasks")]);
        assert_eq!(config.relation_detection, RelationDetection::Auto);
    }

    #[test]
    fn test_from_options_rollups() {
        let config = from_options(&options(&[
            ("relationDetection", "manual"),
            ("rollupCount", "2"),
            ("rollup1_relation", "note.tasks"),
            ("rollup1_target", "note.estimate"),
            ("rollup1_aggregation", "sum"),
            ("rollup1_name", "Hours"),
            ("rollup2_relation", "note.tasks"),
            ("rollup2_target", "note.done"),
            // Beyond the count, ignored
            ("rollup3_relation", "note.x"),
            ("rollup3_target", "note.y"),
        ]));

        assert_eq!(config.relation_detection, RelationDetection::Manual);
        assert_eq!(config.rollups.len(), 2);
        assert_eq!(config.rollups[0].id, "rollup_1");
        assert_eq!(config.rollups[0].display_name, "Hours");
        assert_eq!(config.rollups[0].aggregation, AggregationType::Sum);
        assert_eq!(config.rollups[1].display_name, "Rollup 2");
        assert_eq!(config.rollups[1].aggregation, AggregationType::Count);
    }

    #[test]
    fn test_from_options_bad_values() {
        let config = from_options(&options(&[
            ("bidiCount", "many"),
            ("bidi1_column", "note.project"),
            ("bidi1_reverse", "tasks"),
            ("rollupCount", "1"),
            ("rollup1_relation", "note.tasks"),
            ("rollup1_target", "note.estimate"),
            ("rollup1_aggregation", "median"),
        ]));
        assert!(config.bidi.is_empty());
        assert_eq!(config.rollups[0].aggregation, AggregationType::Count);
        assert_eq!(from_options(&BTreeMap::new()), ViewConfig::default());
    }

    #[test]
    fn test_aggregation_options() {
        let options = aggregation_options();
        assert_eq!(options.len(), 10);
        assert_eq!(options[0], ("count".to_string(), "Count (all links)"));
        assert_eq!(options[9].0, "percent_not_empty");
    }

    #[test]
    fn test_find_bidi_rule() {
        let rules = vec![
            BidiRule::new("note.project", "tasks"),
            BidiRule::new("people", "mentioned_in"),
        ];
        let reverse = |id: &str| find_bidi_rule(&rules, id).map(|r| r.reverse_property.clone());
        assert_eq!(reverse("note.project").as_deref(), Some("tasks"));
        assert_eq!(reverse("note.people").as_deref(), Some("mentioned_in"));
        assert!(find_bidi_rule(&rules, "note.projects").is_none());
        assert!(find_bidi_rule(&[], "note.project").is_none());
    }

    #[test]
    fn test_load_view_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.ron");

        assert_eq!(load_view_config(&path).unwrap(), ViewConfig::default());

        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"(
                bidi: [(source_column: "project", reverse_property: "tasks")],
                rollups: [(
                    id: "rollup_1",
                    display_name: "Hours",
                    relation_property_id: "note.tasks",
                    target_property: "note.estimate",
                    aggregation: Sum,
                )],
            )"#
        )
        .unwrap();

        let config = load_view_config(&path).unwrap();
        assert_eq!(config.relation_detection, RelationDetection::Auto);
        assert_eq!(config.bidi, vec![BidiRule::new("project", "tasks")]);
        assert_eq!(config.rollups[0].aggregation, AggregationType::Sum);

        std::fs::write(&path, "(bidi: [oops])").unwrap();
        assert!(matches!(load_view_config(&path), Err(ConfigError::Parse { .. })));
    }
}
