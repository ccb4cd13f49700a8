//! Shared types for relation-sync view configuration and column metadata.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// =====================================================
// Bidirectional sync
// =====================================================

/// Keeps a relation column and a reverse property on the linked notes in step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidiRule {
    /// Column the rule watches: a full property id (`note.project`) or a bare name (`project`)
    pub source_column: String,
    /// Frontmatter property written on every linked note
    pub reverse_property: String,
}

impl BidiRule {
    pub fn new(source_column: impl Into<String>, reverse_property: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            reverse_property: reverse_property.into(),
        }
    }
}

// =====================================================
// Rollups
// =====================================================

/// How a rollup folds the values reached through a relation column.
///
/// String forms (`count_values`, `percent_true`, ...) are the keys used by
/// the host's flat view options.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum AggregationType {
    #[default]
    Count,
    CountValues,
    Sum,
    Average,
    Min,
    Max,
    List,
    Unique,
    PercentTrue,
    PercentNotEmpty,
}

impl AggregationType {
    /// Human label shown in option pickers.
    pub fn label(self) -> &'static str {
        match self {
            AggregationType::Count => "Count (all links)",
            AggregationType::CountValues => "Count Values (non-empty)",
            AggregationType::Sum => "Sum",
            AggregationType::Average => "Average",
            AggregationType::Min => "Min",
            AggregationType::Max => "Max",
            AggregationType::List => "List (all values)",
            AggregationType::Unique => "Unique (deduplicated)",
            AggregationType::PercentTrue => "Percent True",
            AggregationType::PercentNotEmpty => "Percent Not Empty",
        }
    }
}

/// A computed column aggregating a property of the notes behind a relation column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupSpec {
    /// Column id the computed values are stored under (`rollup_1`, ...)
    pub id: String,
    pub display_name: String,
    /// Relation column whose links are followed
    pub relation_property_id: String,
    /// Property read from each linked note
    pub target_property: String,
    #[serde(default)]
    pub aggregation: AggregationType,
}

// =====================================================
// View configuration
// =====================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RelationDetection {
    /// Classify columns heuristically
    #[default]
    Auto,
    /// Relation columns are picked by the user
    Manual,
}

/// Per-view settings consumed read-only by the relation engine.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub relation_detection: RelationDetection,
    #[serde(default)]
    pub bidi: Vec<BidiRule>,
    #[serde(default)]
    pub rollups: Vec<RollupSpec>,
}

// =====================================================
// Column metadata
// =====================================================

/// What the table layer needs to know about one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub property_id: String,
    pub display_name: String,
    pub is_relation: bool,
    /// Folder the relation picker should browse, when the column is a relation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation_folder_filter: Option<String>,
    #[serde(default)]
    pub is_rollup: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollup: Option<RollupSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_aggregation_option_keys() {
        assert_eq!(
            AggregationType::from_str("count_values").unwrap(),
            AggregationType::CountValues
        );
        assert_eq!(AggregationType::PercentNotEmpty.to_string(), "percent_not_empty");
        assert!(AggregationType::from_str("median").is_err());
        assert_eq!(AggregationType::iter().count(), 10);
    }
}
