use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, UInt64Array};
use arrow::datatypes::Schema;

use crate::telemetry::MarketSnapshots;

use super::utils::{u64_field, write_record_batch};

pub fn write_snapshot_counts_parquet<P: AsRef<Path>>(
    path: P,
    snapshots: &MarketSnapshots,
) -> Result<(), Box<dyn Error>> {
    let len = snapshots.snapshots.len();
    let mut timestamps = Vec::with_capacity(len);
    let mut riders_waiting = Vec::with_capacity(len);
    let mut riders_in_transit = Vec::with_capacity(len);
    let mut riders_completed = Vec::with_capacity(len);
    let mut riders_cancelled = Vec::with_capacity(len);
    let mut drivers_idle = Vec::with_capacity(len);
    let mut drivers_en_route = Vec::with_capacity(len);
    let mut drivers_on_ride = Vec::with_capacity(len);
    let mut requests_bidding = Vec::with_capacity(len);
    let mut rides_in_progress = Vec::with_capacity(len);
    let mut rides_completed = Vec::with_capacity(len);

    for snapshot in &snapshots.snapshots {
        timestamps.push(snapshot.timestamp_ms);
        riders_waiting.push(snapshot.counts.riders_waiting as u64);
        riders_in_transit.push(snapshot.counts.riders_in_transit as u64);
        riders_completed.push(snapshot.counts.riders_completed as u64);
        riders_cancelled.push(snapshot.counts.riders_cancelled as u64);
        drivers_idle.push(snapshot.counts.drivers_idle as u64);
        drivers_en_route.push(snapshot.counts.drivers_en_route as u64);
        drivers_on_ride.push(snapshot.counts.drivers_on_ride as u64);
        requests_bidding.push(snapshot.counts.requests_bidding as u64);
        rides_in_progress.push(snapshot.counts.rides_in_progress as u64);
        rides_completed.push(snapshot.counts.rides_completed as u64);
    }

    let schema = Schema::new(vec![
        u64_field("timestamp_ms"),
        u64_field("riders_waiting"),
        u64_field("riders_in_transit"),
        u64_field("riders_completed"),
        u64_field("riders_cancelled"),
        u64_field("drivers_idle"),
        u64_field("drivers_en_route"),
        u64_field("drivers_on_ride"),
        u64_field("requests_bidding"),
        u64_field("rides_in_progress"),
        u64_field("rides_completed"),
    ]);

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(UInt64Array::from(timestamps)),
        Arc::new(UInt64Array::from(riders_waiting)),
        Arc::new(UInt64Array::from(riders_in_transit)),
        Arc::new(UInt64Array::from(riders_completed)),
        Arc::new(UInt64Array::from(riders_cancelled)),
        Arc::new(UInt64Array::from(drivers_idle)),
        Arc::new(UInt64Array::from(drivers_en_route)),
        Arc::new(UInt64Array::from(drivers_on_ride)),
        Arc::new(UInt64Array::from(requests_bidding)),
        Arc::new(UInt64Array::from(rides_in_progress)),
        Arc::new(UInt64Array::from(rides_completed)),
    ];

    write_record_batch(path, schema, arrays)
}
