//! Rollup plumbing. The aggregation itself is supplied by the caller.

use super::columns::{property_name, TableRow};
use super::normalize::CanonicalValue;
use super::wikilink::{self, LinkReference};
use crate::vault::{FrontmatterMutator, NoteHandle, NoteResolver};
use relation_sync_types::{AggregationType, RollupSpec};

/// Values reached through one row's relation cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RollupInput {
    /// Number of links in the relation cell, resolved or not
    pub link_count: usize,
    /// Linked notes that resolved and could be read
    pub notes: Vec<NoteHandle>,
    /// `target_property` of each linked note, null when absent
    pub values: Vec<CanonicalValue>,
}

/// Folds the values gathered for a rollup cell.
pub trait RollupAggregator: Send + Sync {
    fn aggregate(&self, aggregation: AggregationType, input: &RollupInput) -> CanonicalValue;
}

/// Follow the row's relation links and read `target_property` from each linked note.
pub fn gather_rollup_input(
    row: &TableRow,
    spec: &RollupSpec,
    resolver: &dyn NoteResolver,
    reader: &dyn FrontmatterMutator,
) -> RollupInput {
    let cell = row.get(&spec.relation_property_id);
    let links: Vec<LinkReference> = match cell {
        CanonicalValue::String(s) => wikilink::parse(s).into_iter().collect(),
        other => other.as_list().map(wikilink::parse_list).unwrap_or_default(),
    };
    let key = property_name(&spec.target_property);

    let mut input = RollupInput {
        link_count: links.len(),
        ..Default::default()
    };
    for link in links {
        let Some(target) = resolver.resolve_link(&link.target_path, &row.note) else {
            continue;
        };
        match reader.read_frontmatter(&target) {
            Ok(frontmatter) => {
                input
                    .values
                    .push(frontmatter.get(key).map(CanonicalValue::from).unwrap_or_default());
                input.notes.push(target);
            }
            Err(e) => log::warn!("[RELATIONS] Rollup {} could not read {}: {}", spec.id, target, e),
        }
    }
    input
}

/// Compute every rollup for every row and store the results under each spec's id.
pub fn apply_rollups(
    rows: &mut [TableRow],
    specs: &[RollupSpec],
    resolver: &dyn NoteResolver,
    reader: &dyn FrontmatterMutator,
    aggregator: &dyn RollupAggregator,
) {
    for row in rows.iter_mut() {
        for spec in specs {
            let input = gather_rollup_input(row, spec, resolver, reader);
            let value = aggregator.aggregate(spec.aggregation, &input);
            row.set(spec.id.clone(), value);
        }
    }
}
