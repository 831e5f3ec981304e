use bevy_ecs::prelude::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bidding::BidScoreConfig;
use crate::clock::{DispatchClock, EventKind, EventSubject};
use crate::commission::{CommissionBook, CommissionRate, CommissionRule, VolumeDiscount};
use crate::ecs::{Driver, Position, Rider, ScheduledRide};
use crate::geo::{random_cell_in_bounds, random_destination, GeoIndex, SpatialIndex};
use crate::loyalty::LoyaltyConfig;
use crate::pricing::PricingConfig;
use crate::scenario::params::{
    BidRadius, BidWindowConfig, DispatchEndTimeMs, DriverBidConfig, PendingRequest,
    PendingRequests, RiderCancelConfig, ScenarioParams,
};
use crate::speed::SpeedModel;
use crate::telemetry::{MarketSnapshots, MarketTelemetry, SnapshotConfig};
use crate::zones::{ServiceZone, ZoneBook};

/// Entity count above which the spatial index is worth maintaining.
const SPATIAL_INDEX_THRESHOLD: usize = 200;

/// Default commission schedule when the scenario does not provide one:
/// a flat platform percentage with two volume tiers.
fn default_commission_book() -> CommissionBook {
    CommissionBook::new(vec![CommissionRule::global(CommissionRate::Percentage(
        15.0,
    ))
    .with_volume_discounts(vec![
        VolumeDiscount {
            min_monthly_rides: 50,
            discount_percent: 2.5,
        },
        VolumeDiscount {
            min_monthly_rides: 100,
            discount_percent: 5.0,
        },
    ])])
}

/// City zone covering the scenario bounding box, so every sampled pickup
/// resolves to a commission city.
fn default_zone_book(params: &ScenarioParams) -> ZoneBook {
    ZoneBook::new(vec![ServiceZone::city(
        "Karachi",
        vec![
            (params.lat_min, params.lng_min),
            (params.lat_min, params.lng_max),
            (params.lat_max, params.lng_max),
            (params.lat_max, params.lng_min),
        ],
    )])
}

pub fn build_scenario(world: &mut World, params: ScenarioParams) {
    let epoch_ms = params.epoch_ms.unwrap_or(0);
    let mut clock = DispatchClock::default();
    clock.set_epoch_ms(epoch_ms);
    world.insert_resource(clock);

    world.insert_resource(MarketTelemetry::default());
    world.insert_resource(SnapshotConfig::default());
    world.insert_resource(MarketSnapshots::default());

    let total_entities = params.num_riders + params.num_drivers;
    if total_entities > SPATIAL_INDEX_THRESHOLD {
        world.insert_resource(SpatialIndex::new());
    }

    let seed = params.seed.unwrap_or(0);
    world.insert_resource(BidRadius(params.bid_radius));
    world.insert_resource(params.bid_window_config.unwrap_or_default());
    world.insert_resource(params.driver_bid_config.unwrap_or_else(|| DriverBidConfig {
        seed: seed.wrapping_add(0xb1d_beef),
        ..Default::default()
    }));
    world.insert_resource(params.bid_score_config.unwrap_or_else(BidScoreConfig::default));
    world.insert_resource(
        params
            .rider_cancel_config
            .unwrap_or_else(|| RiderCancelConfig {
                seed: seed.wrapping_add(0xcafe_babe),
                ..Default::default()
            }),
    );
    world.insert_resource(params.pricing_config.unwrap_or_default());
    world.insert_resource(params.loyalty_config.unwrap_or_else(LoyaltyConfig::default));
    world.insert_resource(
        params
            .commission_book
            .clone()
            .unwrap_or_else(default_commission_book),
    );
    let zone_book = params
        .zone_book
        .clone()
        .unwrap_or_else(|| default_zone_book(&params));
    world.insert_resource(zone_book);
    world.insert_resource(SpeedModel::new(params.seed.map(|s| s ^ 0x5eed_cafe)));
    if let Some(end_ms) = params.dispatch_end_time_ms {
        world.insert_resource(DispatchEndTimeMs(end_ms));
    }

    let geo = GeoIndex::default();
    let mut rng = StdRng::seed_from_u64(seed);

    // Drivers start idle at random positions with a sampled vehicle mix.
    for _ in 0..params.num_drivers {
        let cell = match random_cell_in_bounds(
            &mut rng,
            params.lat_min,
            params.lat_max,
            params.lng_min,
            params.lng_max,
        ) {
            Ok(cell) => cell,
            Err(_) => continue,
        };
        let vehicle = params.vehicle_mix.sample(&mut rng);
        world.spawn((
            Driver::idle(vehicle),
            crate::ecs::DriverStats::default(),
            Position(cell),
        ));
    }

    // Riders: the first block requests within the window, the remainder
    // become future-dated bookings.
    let scheduled_count = params.scheduled_ride_count.min(params.num_riders);
    let immediate_count = params.num_riders - scheduled_count;

    let mut pending = Vec::with_capacity(immediate_count);
    for i in 0..params.num_riders {
        let pickup = match random_cell_in_bounds(
            &mut rng,
            params.lat_min,
            params.lat_max,
            params.lng_min,
            params.lng_max,
        ) {
            Ok(cell) => cell,
            Err(_) => continue,
        };
        let dropoff = random_destination(
            &mut rng,
            pickup,
            &geo,
            params.min_trip_cells,
            params.max_trip_cells,
            params.lat_min,
            params.lat_max,
            params.lng_min,
            params.lng_max,
        );
        let vehicle = params.vehicle_mix.sample(&mut rng);
        let rider_entity = world.spawn((Rider::idle(), Position(pickup))).id();

        if i < immediate_count {
            let request_time_ms = if params.request_window_ms > 0 {
                rng.gen_range(0..=params.request_window_ms)
            } else {
                0
            };
            pending.push(PendingRequest {
                rider: rider_entity,
                pickup,
                dropoff,
                vehicle,
                request_time_ms,
            });
        } else {
            let pickup_time_ms = params.request_window_ms
                + if params.scheduled_horizon_ms > 0 {
                    rng.gen_range(0..=params.scheduled_horizon_ms)
                } else {
                    0
                };
            let booking = world
                .spawn(ScheduledRide {
                    rider: rider_entity,
                    pickup,
                    dropoff,
                    vehicle,
                    pickup_time_ms,
                })
                .id();
            world.resource_mut::<DispatchClock>().schedule_at(
                pickup_time_ms,
                EventKind::ScheduledRideDue,
                Some(EventSubject::Booking(booking)),
            );
        }
    }

    // Requests open in time order; the queue front must match the next
    // RequestOpened event.
    pending.sort_by_key(|request| request.request_time_ms);
    let mut queue = PendingRequests::default();
    for request in pending {
        world.resource_mut::<DispatchClock>().schedule_at(
            request.request_time_ms,
            EventKind::RequestOpened,
            None,
        );
        queue.0.push_back(request);
    }
    world.insert_resource(queue);
}
