//! Telemetry snapshot system: capture per-state counts and positions on
//! a configured interval.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::DispatchClock;
use crate::ecs::{Driver, Position, Ride, RideRequest, Rider};
use crate::telemetry::{
    DriverSnapshot, MarketCounts, MarketSnapshot, MarketSnapshots, RiderSnapshot, SnapshotConfig,
};

pub fn capture_snapshot_system(
    clock: Res<DispatchClock>,
    config: Res<SnapshotConfig>,
    mut snapshots: ResMut<MarketSnapshots>,
    riders: Query<(Entity, &Rider, &Position)>,
    drivers: Query<(Entity, &Driver, &Position)>,
    requests: Query<&RideRequest>,
    rides: Query<&Ride>,
) {
    let now = clock.now();

    let mut counts = MarketCounts::default();
    let mut rider_snapshots = Vec::new();
    for (entity, rider, position) in riders.iter() {
        counts.add_rider(rider.state);
        rider_snapshots.push(RiderSnapshot {
            entity,
            cell: position.0,
            state: rider.state,
        });
    }
    let mut driver_snapshots = Vec::new();
    for (entity, driver, position) in drivers.iter() {
        counts.add_driver(driver.state);
        driver_snapshots.push(DriverSnapshot {
            entity,
            cell: position.0,
            state: driver.state,
        });
    }
    for request in requests.iter() {
        counts.add_request(request.state);
    }
    for ride in rides.iter() {
        counts.add_ride(ride.state);
    }

    snapshots.snapshots.push_back(MarketSnapshot {
        timestamp_ms: now,
        counts,
        riders: rider_snapshots,
        drivers: driver_snapshots,
    });
    while snapshots.snapshots.len() > config.max_snapshots {
        snapshots.snapshots.pop_front();
    }
    snapshots.last_snapshot_at = Some(now);
}
