//! Name resolution and routing: decides which accountant bucket owns each
//! payment row.

pub mod cluster;
pub mod consolidate;
pub mod exclusion;
pub mod extract;
pub mod materialize;
pub mod normalize;
pub mod overrides;
pub mod pipeline;
pub mod types;

pub use pipeline::{Router, route_batch};
pub use types::{
    BucketCount, ExcludedRecord, FieldValue, Record, RouteSource, RoutedRecord, RoutingOutcome,
    TITLE_PREFIX, UNRESOLVED,
};
