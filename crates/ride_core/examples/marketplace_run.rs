//! Run a mid-size marketplace scenario and print the headline KPIs.

use bevy_ecs::prelude::World;
use ride_core::runner::{dispatch_schedule, run_until_empty};
use ride_core::scenario::{build_scenario, ScenarioParams};
use ride_core::telemetry::MarketTelemetry;

fn main() {
    let mut world = World::new();
    let params = ScenarioParams::default()
        .with_seed(42)
        .with_scheduled_rides(40, 30 * 60 * 1000);
    build_scenario(&mut world, params);

    let mut schedule = dispatch_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, 2_000_000);

    let telemetry = world.resource::<MarketTelemetry>();
    println!("steps processed:       {steps}");
    println!("completed rides:       {}", telemetry.completed_rides.len());
    println!("riders cancelled:      {}", telemetry.riders_cancelled_total);
    println!("requests expired:      {}", telemetry.requests_expired_total);
    println!(
        "requests refused:      {} (out of zone) / {} (restricted)",
        telemetry.requests_refused_out_of_zone, telemetry.requests_refused_restricted
    );
    println!("fares collected:       {:.0} PKR", telemetry.fares_total);
    println!(
        "platform revenue:      {:.0} PKR",
        telemetry.platform_revenue_total
    );
    println!("loyalty points issued: {}", telemetry.loyalty_points_total);

    if !telemetry.completed_rides.is_empty() {
        let avg_assign_ms: f64 = telemetry
            .completed_rides
            .iter()
            .map(|r| r.time_to_assign() as f64)
            .sum::<f64>()
            / telemetry.completed_rides.len() as f64;
        println!("avg time to assign:    {:.1}s", avg_assign_ms / 1000.0);
    }
}
