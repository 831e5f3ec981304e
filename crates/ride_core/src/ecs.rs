use bevy_ecs::prelude::{Component, Entity};
use h3o::CellIndex;

use crate::pricing::VehicleType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiderState {
    Idle,
    Requesting,
    Waiting,
    InTransit,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Rider {
    pub state: RiderState,
    /// Request entity currently open for this rider, if any.
    pub active_request: Option<Entity>,
    /// Loyalty points accumulated across completed rides.
    pub loyalty_points: u64,
}

impl Rider {
    pub fn idle() -> Self {
        Self {
            state: RiderState::Idle,
            active_request: None,
            loyalty_points: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    EnRoute,
    OnRide,
    OffDuty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Driver {
    pub state: DriverState,
    pub vehicle: VehicleType,
    /// Request this driver won and is serving, if any.
    pub assigned_request: Option<Entity>,
}

impl Driver {
    pub fn idle(vehicle: VehicleType) -> Self {
        Self {
            state: DriverState::Idle,
            vehicle,
            assigned_request: None,
        }
    }
}

/// Running counters used by commission volume tiers and bid scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Component)]
pub struct DriverStats {
    pub monthly_completed_rides: u32,
    pub bids_placed: u32,
    pub total_earnings: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Bidding,
    Assigned,
    Fulfilled,
    Expired,
    Cancelled,
}

/// A rider's open ask: pickup, dropoff, and the fare the bidding runs against.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct RideRequest {
    pub state: RequestState,
    pub rider: Entity,
    pub pickup: CellIndex,
    pub dropoff: CellIndex,
    pub vehicle: VehicleType,
    /// Asking fare shown to bidding drivers; raised on each reopen.
    pub base_fare: f64,
    /// High-demand multiplier applied at open time (>= 1.0).
    pub zone_multiplier: f64,
    /// Fare of the winning bid, set on assignment.
    pub agreed_fare: Option<f64>,
    pub winning_driver: Option<Entity>,
    pub opened_at: u64,
    pub reopen_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RideState {
    EnRouteToPickup,
    InProgress,
    Completed,
    Cancelled,
}

/// An assigned ride, spawned when a bid wins; carries lifecycle timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Ride {
    pub state: RideState,
    pub request: Entity,
    pub rider: Entity,
    pub driver: Entity,
    pub pickup: CellIndex,
    pub dropoff: CellIndex,
    pub vehicle: VehicleType,
    pub fare: f64,
    pub requested_at: u64,
    pub assigned_at: u64,
    pub pickup_at: Option<u64>,
    pub dropoff_at: Option<u64>,
    pub cancelled_at: Option<u64>,
}

/// A future-dated booking; converted into a live request when due.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct ScheduledRide {
    pub rider: Entity,
    pub pickup: CellIndex,
    pub dropoff: CellIndex,
    pub vehicle: VehicleType,
    pub pickup_time_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Component)]
pub struct Position(pub CellIndex);
