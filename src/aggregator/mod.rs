//! Per-Host Aggregator and Function Occurrence Builder (§4.2, §4.3).

pub mod host;
pub mod occurrences;

pub use host::{aggregate_host, HostAggregate};
pub use occurrences::build_occurrences;
