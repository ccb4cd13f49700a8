//! Relation engine: value normalization, wikilinks, column classification,
//! link diffing, and back-link sync.

pub mod backlinks;
pub mod classify;
pub mod columns;
pub mod diff;
pub mod edit;
pub mod normalize;
pub mod rollup;
pub mod sync;
pub mod view_config;
pub mod wikilink;

pub use classify::{classify, ColumnSample};
pub use columns::{base_folder, describe_columns, TableRow, ViewOptionsContext};
pub use diff::{diff, SyncDiff};
pub use edit::RelationEditService;
pub use normalize::{normalize, CanonicalValue, HostValue};
pub use rollup::{apply_rollups, RollupAggregator, RollupInput};
pub use sync::{SyncCoordinator, SyncDirection, SyncReport, TargetFailure};
pub use wikilink::LinkReference;
