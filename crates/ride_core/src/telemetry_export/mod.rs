//! Parquet export of marketplace telemetry for offline analysis.

mod completed_rides;
mod snapshot_counts;
mod utils;

pub use completed_rides::write_completed_rides_parquet;
pub use snapshot_counts::write_snapshot_counts_parquet;
