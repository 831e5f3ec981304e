mod support;

use ride_core::commission::{CommissionBook, CommissionRate, CommissionRule};
use ride_core::ecs::{Driver, DriverState, DriverStats, Ride, RideState, Rider, RiderState};
use ride_core::pricing::VehicleType;
use ride_core::runner::{dispatch_schedule, run_until_empty};
use ride_core::scenario::RiderCancelConfig;
use ride_core::telemetry::MarketTelemetry;
use ride_core::test_helpers::{test_cell, test_distant_cell};

use support::entities::{queue_request, spawn_idle_driver, spawn_rider};
use support::world::TestWorldBuilder;

#[test]
fn one_ride_end_to_end_settles_cleanly() {
    let mut world = TestWorldBuilder::new()
        .with_seed(11)
        .with_commission_book(CommissionBook::new(vec![CommissionRule::for_city(
            "Karachi",
            CommissionRate::Percentage(12.0),
        )]))
        .build();
    let rider = spawn_rider(&mut world, test_cell());
    let driver = spawn_idle_driver(&mut world, VehicleType::Car, test_cell());
    queue_request(
        &mut world,
        rider,
        test_cell(),
        test_distant_cell(),
        VehicleType::Car,
        1_000,
    );

    let mut schedule = dispatch_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, 10_000);
    assert!(steps < 10_000, "runner did not converge");

    let ride = *world.query::<&Ride>().single(&world);
    assert_eq!(ride.state, RideState::Completed);
    assert_eq!(ride.driver, driver);
    assert_eq!(ride.rider, rider);

    let telemetry = world.resource::<MarketTelemetry>();
    assert_eq!(telemetry.completed_rides.len(), 1);
    let record = &telemetry.completed_rides[0];
    assert_eq!(record.city.as_deref(), Some("Karachi"));
    assert!(record.requested_at <= record.assigned_at);
    assert!(record.assigned_at <= record.pickup_at);
    assert!(record.pickup_at <= record.completed_at);

    // Settlement arithmetic: 12% commission, remainder to the driver.
    assert!((record.commission - record.fare * 0.12).abs() < 1e-9);
    assert!((record.fare - record.commission - record.driver_earnings).abs() < 1e-9);

    let stats = *world.entity(driver).get::<DriverStats>().expect("stats");
    assert_eq!(stats.monthly_completed_rides, 1);
    assert!((stats.total_earnings - record.driver_earnings).abs() < 1e-9);

    let rider_component = *world.entity(rider).get::<Rider>().expect("rider");
    assert_eq!(rider_component.state, RiderState::Completed);
    assert_eq!(rider_component.loyalty_points, record.loyalty_points);
    assert!(record.loyalty_points > 0);
}

#[test]
fn two_concurrent_requests_complete_with_two_drivers() {
    let mut world = TestWorldBuilder::new().with_seed(13).build();
    let rider_a = spawn_rider(&mut world, test_cell());
    let rider_b = spawn_rider(&mut world, test_cell());
    let driver_a = spawn_idle_driver(&mut world, VehicleType::Bike, test_cell());
    let driver_b = spawn_idle_driver(&mut world, VehicleType::Bike, test_cell());
    queue_request(
        &mut world,
        rider_a,
        test_cell(),
        test_distant_cell(),
        VehicleType::Bike,
        1_000,
    );
    queue_request(
        &mut world,
        rider_b,
        test_cell(),
        test_distant_cell(),
        VehicleType::Bike,
        2_000,
    );

    let mut schedule = dispatch_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, 20_000);
    assert!(steps < 20_000, "runner did not converge");

    let rides: Vec<Ride> = world.query::<&Ride>().iter(&world).copied().collect();
    assert_eq!(rides.len(), 2, "expected two completed rides");
    for ride in &rides {
        assert_eq!(ride.state, RideState::Completed);
    }
    // Each driver served exactly one of the two requests.
    let mut drivers: Vec<_> = rides.iter().map(|r| r.driver).collect();
    drivers.sort();
    let mut expected = vec![driver_a, driver_b];
    expected.sort();
    assert_eq!(drivers, expected);

    let telemetry = world.resource::<MarketTelemetry>();
    assert_eq!(telemetry.completed_rides.len(), 2);
    assert_eq!(telemetry.riders_completed_total, 2);
}

#[test]
fn impatient_rider_cancels_a_slow_pickup() {
    // Driver is far from the pickup and crawls at 1 km/h, so the pickup
    // ETA dwarfs the rider's 60-second patience.
    let mut world = TestWorldBuilder::new()
        .with_seed(17)
        .with_speed_kmh(1.0)
        .with_rider_cancel_config(RiderCancelConfig {
            min_wait_secs: 60,
            max_wait_secs: 60,
            seed: 17,
        })
        .build();
    let rider = spawn_rider(&mut world, test_cell());
    let driver = spawn_idle_driver(&mut world, VehicleType::Car, test_distant_cell());
    queue_request(
        &mut world,
        rider,
        test_cell(),
        test_cell(),
        VehicleType::Car,
        1_000,
    );

    let mut schedule = dispatch_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, 10_000);
    assert!(steps < 10_000, "runner did not converge");

    let ride = *world.query::<&Ride>().single(&world);
    assert_eq!(ride.state, RideState::Cancelled);
    assert!(ride.cancelled_at.is_some());
    assert_eq!(ride.pickup_at, None);

    assert_eq!(
        world.entity(rider).get::<Rider>().expect("rider").state,
        RiderState::Cancelled
    );
    // The driver is released for future work.
    let driver_component = *world.entity(driver).get::<Driver>().expect("driver");
    assert_eq!(driver_component.state, DriverState::Idle);
    assert_eq!(driver_component.assigned_request, None);

    let telemetry = world.resource::<MarketTelemetry>();
    assert_eq!(telemetry.riders_cancelled_total, 1);
    assert_eq!(telemetry.completed_rides.len(), 0);
}

#[test]
fn same_seed_produces_identical_settlements() {
    let run = |seed: u64| -> Vec<(f64, f64, u64)> {
        let mut world = TestWorldBuilder::new().with_seed(seed).build();
        let rider = spawn_rider(&mut world, test_cell());
        spawn_idle_driver(&mut world, VehicleType::Car, test_cell());
        queue_request(
            &mut world,
            rider,
            test_cell(),
            test_distant_cell(),
            VehicleType::Car,
            1_000,
        );
        let mut schedule = dispatch_schedule();
        run_until_empty(&mut world, &mut schedule, 10_000);
        world
            .resource::<MarketTelemetry>()
            .completed_rides
            .iter()
            .map(|r| (r.fare, r.commission, r.completed_at))
            .collect()
    };

    let first = run(99);
    let second = run(99);
    assert!(!first.is_empty());
    assert_eq!(first, second);
}
