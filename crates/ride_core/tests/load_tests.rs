//! Heavy scenarios, excluded from the default test run.
//! Run with: cargo test -p ride_core --release -- --ignored

use bevy_ecs::prelude::World;
use ride_core::runner::{dispatch_schedule, run_until_empty};
use ride_core::scenario::{build_scenario, ScenarioParams};
use ride_core::telemetry::MarketTelemetry;

#[test]
#[ignore]
fn large_marketplace_converges() {
    let mut world = World::new();
    let params = ScenarioParams {
        num_riders: 2_000,
        num_drivers: 600,
        ..Default::default()
    }
    .with_seed(1)
    .with_request_window_hours(2)
    .with_scheduled_rides(200, 60 * 60 * 1000);
    build_scenario(&mut world, params);

    let mut schedule = dispatch_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, 5_000_000);
    assert!(steps < 5_000_000, "runner did not converge");

    let telemetry = world.resource::<MarketTelemetry>();
    let resolved = telemetry.completed_rides.len() as u64
        + telemetry.riders_cancelled_total
        + telemetry.requests_expired_total
        + telemetry.requests_refused_out_of_zone
        + telemetry.requests_refused_restricted;
    assert_eq!(resolved, 2_000, "every rider should reach a terminal state");
    // A healthy supply level should complete most requests.
    assert!(
        telemetry.completed_rides.len() > 1_000,
        "completed only {} of 2000",
        telemetry.completed_rides.len()
    );
    assert!(telemetry.platform_revenue_total > 0.0);
}

#[test]
#[ignore]
fn sustained_run_is_reproducible_at_scale() {
    let run = |seed: u64| -> (usize, f64) {
        let mut world = World::new();
        let params = ScenarioParams {
            num_riders: 500,
            num_drivers: 150,
            ..Default::default()
        }
        .with_seed(seed);
        build_scenario(&mut world, params);
        let mut schedule = dispatch_schedule();
        run_until_empty(&mut world, &mut schedule, 2_000_000);
        let telemetry = world.resource::<MarketTelemetry>();
        (telemetry.completed_rides.len(), telemetry.fares_total)
    };

    assert_eq!(run(7), run(7));
}
