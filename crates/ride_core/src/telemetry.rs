//! Telemetry / KPIs: completed-ride records, marketplace totals, and
//! interval-gated state snapshots.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};
use h3o::CellIndex;

use crate::ecs::{DriverState, RequestState, RideState, RiderState};
use crate::pricing::VehicleType;

/// Why a request never produced a ride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestRefusalReason {
    OutsideServiceArea,
    RestrictedZone,
}

/// One completed ride, recorded when the driver reaches dropoff.
/// Timestamps are dispatch ms; use the helper methods for derived KPIs.
#[derive(Debug, Clone)]
pub struct CompletedRideRecord {
    pub ride_entity: Entity,
    pub request_entity: Entity,
    pub rider_entity: Entity,
    pub driver_entity: Entity,
    pub vehicle: VehicleType,
    pub city: Option<String>,
    pub fare: f64,
    pub commission: f64,
    pub driver_earnings: f64,
    pub loyalty_points: u64,
    pub requested_at: u64,
    pub assigned_at: u64,
    pub pickup_at: u64,
    pub completed_at: u64,
}

impl CompletedRideRecord {
    /// Time from request open to winning-bid assignment.
    pub fn time_to_assign(&self) -> u64 {
        self.assigned_at.saturating_sub(self.requested_at)
    }

    /// Time from assignment to pickup.
    pub fn time_to_pickup(&self) -> u64 {
        self.pickup_at.saturating_sub(self.assigned_at)
    }

    /// Time from pickup to dropoff.
    pub fn ride_duration(&self) -> u64 {
        self.completed_at.saturating_sub(self.pickup_at)
    }
}

/// Collects marketplace telemetry. Insert as a resource to record outcomes.
#[derive(Debug, Default, Resource)]
pub struct MarketTelemetry {
    pub completed_rides: Vec<CompletedRideRecord>,
    pub riders_completed_total: u64,
    pub riders_cancelled_total: u64,
    pub requests_expired_total: u64,
    pub requests_refused_out_of_zone: u64,
    pub requests_refused_restricted: u64,
    pub fares_total: f64,
    pub platform_revenue_total: f64,
    pub loyalty_points_total: u64,
}

impl MarketTelemetry {
    pub fn record_refusal(&mut self, reason: RequestRefusalReason) {
        match reason {
            RequestRefusalReason::OutsideServiceArea => self.requests_refused_out_of_zone += 1,
            RequestRefusalReason::RestrictedZone => self.requests_refused_restricted += 1,
        }
    }
}

/// Snapshot of one rider for export.
#[derive(Debug, Clone)]
pub struct RiderSnapshot {
    pub entity: Entity,
    pub cell: CellIndex,
    pub state: RiderState,
}

/// Snapshot of one driver for export.
#[derive(Debug, Clone)]
pub struct DriverSnapshot {
    pub entity: Entity,
    pub cell: CellIndex,
    pub state: DriverState,
}

/// Aggregated counts at a point in time.
#[derive(Debug, Clone, Default)]
pub struct MarketCounts {
    pub riders_idle: usize,
    pub riders_requesting: usize,
    pub riders_waiting: usize,
    pub riders_in_transit: usize,
    pub riders_completed: usize,
    pub riders_cancelled: usize,
    pub drivers_idle: usize,
    pub drivers_en_route: usize,
    pub drivers_on_ride: usize,
    pub drivers_off_duty: usize,
    pub requests_bidding: usize,
    pub requests_assigned: usize,
    pub requests_fulfilled: usize,
    pub requests_expired: usize,
    pub requests_cancelled: usize,
    pub rides_en_route_to_pickup: usize,
    pub rides_in_progress: usize,
    pub rides_completed: usize,
    pub rides_cancelled: usize,
}

impl MarketCounts {
    pub fn add_rider(&mut self, state: RiderState) {
        match state {
            RiderState::Idle => self.riders_idle += 1,
            RiderState::Requesting => self.riders_requesting += 1,
            RiderState::Waiting => self.riders_waiting += 1,
            RiderState::InTransit => self.riders_in_transit += 1,
            RiderState::Completed => self.riders_completed += 1,
            RiderState::Cancelled => self.riders_cancelled += 1,
        }
    }

    pub fn add_driver(&mut self, state: DriverState) {
        match state {
            DriverState::Idle => self.drivers_idle += 1,
            DriverState::EnRoute => self.drivers_en_route += 1,
            DriverState::OnRide => self.drivers_on_ride += 1,
            DriverState::OffDuty => self.drivers_off_duty += 1,
        }
    }

    pub fn add_request(&mut self, state: RequestState) {
        match state {
            RequestState::Bidding => self.requests_bidding += 1,
            RequestState::Assigned => self.requests_assigned += 1,
            RequestState::Fulfilled => self.requests_fulfilled += 1,
            RequestState::Expired => self.requests_expired += 1,
            RequestState::Cancelled => self.requests_cancelled += 1,
        }
    }

    pub fn add_ride(&mut self, state: RideState) {
        match state {
            RideState::EnRouteToPickup => self.rides_en_route_to_pickup += 1,
            RideState::InProgress => self.rides_in_progress += 1,
            RideState::Completed => self.rides_completed += 1,
            RideState::Cancelled => self.rides_cancelled += 1,
        }
    }
}

/// Snapshot of marketplace state at a specific timestamp (dispatch ms).
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub timestamp_ms: u64,
    pub counts: MarketCounts,
    pub riders: Vec<RiderSnapshot>,
    pub drivers: Vec<DriverSnapshot>,
}

/// Snapshot capture configuration.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SnapshotConfig {
    pub interval_ms: u64,
    pub max_snapshots: usize,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            max_snapshots: 10_000,
        }
    }
}

/// Rolling snapshot buffer.
#[derive(Debug, Default, Resource)]
pub struct MarketSnapshots {
    pub snapshots: VecDeque<MarketSnapshot>,
    pub last_snapshot_at: Option<u64>,
}
