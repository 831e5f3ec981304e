//! Metrics extraction from finished marketplace runs.
//!
//! Pulls telemetry and driver stats out of a world and condenses them
//! into one comparable result row per run.

use bevy_ecs::prelude::World;
use ride_core::ecs::DriverStats;
use ride_core::telemetry::MarketTelemetry;

/// Aggregated metrics from a single scenario run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MarketplaceResult {
    /// Riders whose requests reached a terminal state.
    pub total_riders: usize,
    /// Drivers present in the world.
    pub total_drivers: usize,
    /// Number of completed rides.
    pub completed_rides: usize,
    /// Riders who cancelled while waiting for pickup.
    pub cancelled_riders: usize,
    /// Requests that expired with no usable bids.
    pub expired_requests: usize,
    /// Requests refused at open time (zone checks).
    pub refused_requests: usize,
    /// Conversion rate (completed / total resolved).
    pub conversion_rate: f64,
    /// Total platform revenue from commissions.
    pub platform_revenue: f64,
    /// Total driver payouts (sum of all driver earnings).
    pub driver_payouts: f64,
    /// Total fares collected from riders.
    pub total_fares_collected: f64,
    /// Loyalty points issued to riders.
    pub loyalty_points_issued: u64,
    /// Average time from request open to assignment, in ms.
    pub avg_time_to_assign_ms: f64,
    pub median_time_to_assign_ms: f64,
    pub p90_time_to_assign_ms: f64,
    /// Average time from assignment to pickup, in ms.
    pub avg_time_to_pickup_ms: f64,
    pub median_time_to_pickup_ms: f64,
    pub p90_time_to_pickup_ms: f64,
}

impl MarketplaceResult {
    /// Calculate (avg, median, p90) from a vector of values.
    fn calculate_stats(values: &[u64]) -> (f64, f64, f64) {
        if values.is_empty() {
            return (0.0, 0.0, 0.0);
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();

        let avg = sorted.iter().sum::<u64>() as f64 / sorted.len() as f64;
        let median = if sorted.len() % 2 == 0 {
            (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) as f64 / 2.0
        } else {
            sorted[sorted.len() / 2] as f64
        };
        let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
        let p90 = sorted[p90_idx.min(sorted.len() - 1)] as f64;

        (avg, median, p90)
    }
}

/// Extract metrics from a finished marketplace world.
pub fn extract_metrics(world: &mut World) -> MarketplaceResult {
    let (
        completed_rides,
        cancelled_riders,
        expired_requests,
        refused_requests,
        platform_revenue,
        total_fares_collected,
        loyalty_points_issued,
        assign_values,
        pickup_values,
    ) = {
        let telemetry = world
            .get_resource::<MarketTelemetry>()
            .expect("MarketTelemetry resource not found");

        let assign_values: Vec<u64> = telemetry
            .completed_rides
            .iter()
            .map(|r| r.time_to_assign())
            .collect();
        let pickup_values: Vec<u64> = telemetry
            .completed_rides
            .iter()
            .map(|r| r.time_to_pickup())
            .collect();

        (
            telemetry.completed_rides.len(),
            telemetry.riders_cancelled_total as usize,
            telemetry.requests_expired_total as usize,
            (telemetry.requests_refused_out_of_zone + telemetry.requests_refused_restricted)
                as usize,
            telemetry.platform_revenue_total,
            telemetry.fares_total,
            telemetry.loyalty_points_total,
            assign_values,
            pickup_values,
        )
    };

    let (driver_payouts, total_drivers) = {
        let stats: Vec<&DriverStats> = world.query::<&DriverStats>().iter(world).collect();
        let payouts: f64 = stats.iter().map(|s| s.total_earnings).sum();
        (payouts, stats.len())
    };

    let total_resolved = completed_rides + cancelled_riders + expired_requests + refused_requests;
    let conversion_rate = if total_resolved > 0 {
        completed_rides as f64 / total_resolved as f64
    } else {
        0.0
    };

    let (avg_assign, median_assign, p90_assign) =
        MarketplaceResult::calculate_stats(&assign_values);
    let (avg_pickup, median_pickup, p90_pickup) =
        MarketplaceResult::calculate_stats(&pickup_values);

    MarketplaceResult {
        total_riders: total_resolved,
        total_drivers,
        completed_rides,
        cancelled_riders,
        expired_requests,
        refused_requests,
        conversion_rate,
        platform_revenue,
        driver_payouts,
        total_fares_collected,
        loyalty_points_issued,
        avg_time_to_assign_ms: avg_assign,
        median_time_to_assign_ms: median_assign,
        p90_time_to_assign_ms: p90_assign,
        avg_time_to_pickup_ms: avg_pickup,
        median_time_to_pickup_ms: median_pickup,
        p90_time_to_pickup_ms: p90_pickup,
    }
}
