//! Scenario setup: configure the marketplace world for a run.
//!
//! `ScenarioParams` holds every tunable; `build_scenario` turns it into a
//! populated ECS world with riders, drivers, zones, pending requests and
//! scheduled bookings, plus the events that set the run in motion.

mod build;
mod params;

pub use build::build_scenario;
pub use params::{
    BidRadius, BidWindowConfig, DispatchEndTimeMs, DriverBidConfig, PendingRequest,
    PendingRequests, RiderCancelConfig, ScenarioParams, VehicleMix,
};
