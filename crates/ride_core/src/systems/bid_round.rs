//! BidRound system: idle drivers near the pickup decide stochastically
//! whether to bid, and at what discount against the asking fare.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bidding::{Bid, Bids};
use crate::clock::{CurrentEvent, DispatchClock, EventKind, EventSubject};
use crate::ecs::{Driver, DriverState, DriverStats, Position, RequestState, RideRequest};
use crate::geo::{distance_km_between_cells, grid_disk_cached, SpatialIndex};
use crate::scenario::{BidRadius, BidWindowConfig, DriverBidConfig};

/// Logistic acceptance from score, seeded per driver/request/round.
fn logit_bids_stochastic(score: f64, seed: u64) -> bool {
    let probability = 1.0 / (1.0 + (-score).exp());
    let mut rng = StdRng::seed_from_u64(seed);
    rng.gen::<f64>() < probability
}

fn round_seed(config_seed: u64, driver: Entity, request: Entity, now_ms: u64) -> u64 {
    config_seed
        .wrapping_add(driver.index() as u64)
        .wrapping_add((request.index() as u64).wrapping_mul(0x9e37_79b9))
        .wrapping_add(now_ms)
}

#[allow(clippy::too_many_arguments)]
pub fn bid_round_system(
    mut clock: ResMut<DispatchClock>,
    event: Res<CurrentEvent>,
    bid_config: Option<Res<DriverBidConfig>>,
    bid_radius: Option<Res<BidRadius>>,
    window_config: Option<Res<BidWindowConfig>>,
    spatial_index: Option<Res<SpatialIndex>>,
    mut requests: Query<(&RideRequest, &mut Bids)>,
    mut drivers: Query<(Entity, &Driver, &mut DriverStats, &Position)>,
) {
    if event.0.kind != EventKind::BidRound {
        return;
    }
    let Some(EventSubject::Request(request_entity)) = event.0.subject else {
        return;
    };
    let Ok((request, mut bids)) = requests.get_mut(request_entity) else {
        return;
    };
    if request.state != RequestState::Bidding {
        return;
    }

    let config = bid_config.as_deref().copied().unwrap_or_default();
    let window = window_config.as_deref().copied().unwrap_or_default();
    let radius = bid_radius
        .as_deref()
        .map(|r| r.0)
        .unwrap_or(BidRadius::default().0);
    let now = clock.now();

    // Candidate set: from the spatial index when available, otherwise a
    // full scan filtered by grid distance.
    let candidates: Vec<Entity> = match spatial_index.as_deref() {
        Some(index) => {
            let disk = grid_disk_cached(request.pickup, radius);
            index.get_drivers_in_cells(&disk)
        }
        None => drivers
            .iter()
            .filter(|(_, _, _, position)| {
                request
                    .pickup
                    .grid_distance(position.0)
                    .is_ok_and(|dist| dist >= 0 && dist <= radius as i32)
            })
            .map(|(entity, _, _, _)| entity)
            .collect(),
    };

    for driver_entity in candidates {
        let Ok((_, driver, mut stats, position)) = drivers.get_mut(driver_entity) else {
            continue;
        };
        if driver.state != DriverState::Idle
            || driver.vehicle != request.vehicle
            || bids.has_bid_from(driver_entity)
        {
            continue;
        }

        let pickup_km = distance_km_between_cells(position.0, request.pickup);
        let score = config.base_score
            + request.base_fare * config.fare_weight
            + pickup_km * config.pickup_distance_penalty;

        let seed = round_seed(config.seed, driver_entity, request_entity, now);
        if !logit_bids_stochastic(score, seed) {
            continue;
        }

        let max_discount = config.max_discount_percent.max(config.min_discount_percent);
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(0xb1d));
        let discount = rng.gen_range(config.min_discount_percent..=max_discount);
        let amount = (request.base_fare * (1.0 - discount / 100.0)).max(0.0);

        stats.bids_placed += 1;
        bids.0.push(Bid {
            driver: driver_entity,
            amount,
            placed_at: now,
        });
    }

    // Keep rounds firing until the current window closes.
    let window_close_ms =
        request.opened_at + (request.reopen_count as u64 + 1) * window.window_secs * 1_000;
    let next_round_ms = now + window.round_interval_secs.max(1) * 1_000;
    if next_round_ms < window_close_ms {
        clock.schedule_at(
            next_round_ms,
            EventKind::BidRound,
            Some(EventSubject::Request(request_entity)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::ecs::Rider;
    use crate::pricing::VehicleType;
    use crate::test_helpers::{test_cell, test_distant_cell};

    fn eager_bid_config() -> DriverBidConfig {
        DriverBidConfig {
            seed: 42,
            base_score: 50.0, // High score so every candidate bids.
            ..Default::default()
        }
    }

    fn reluctant_bid_config() -> DriverBidConfig {
        DriverBidConfig {
            seed: 42,
            base_score: -50.0,
            fare_weight: 0.0,
            ..Default::default()
        }
    }

    fn spawn_request(world: &mut World, rider: Entity, vehicle: VehicleType) -> Entity {
        world
            .spawn((
                RideRequest {
                    state: RequestState::Bidding,
                    rider,
                    pickup: test_cell(),
                    dropoff: test_distant_cell(),
                    vehicle,
                    base_fare: 500.0,
                    zone_multiplier: 1.0,
                    agreed_fare: None,
                    winning_driver: None,
                    opened_at: 0,
                    reopen_count: 0,
                },
                Bids::default(),
            ))
            .id()
    }

    fn run_bid_round(world: &mut World, request_entity: Entity) {
        world.resource_mut::<DispatchClock>().schedule_at_secs(
            1,
            EventKind::BidRound,
            Some(EventSubject::Request(request_entity)),
        );
        let event = world
            .resource_mut::<DispatchClock>()
            .pop_next()
            .expect("bid round event");
        world.insert_resource(CurrentEvent(event));

        let mut schedule = Schedule::default();
        schedule.add_systems(bid_round_system);
        schedule.run(world);
    }

    #[test]
    fn idle_matching_driver_places_a_bid() {
        let mut world = World::new();
        world.insert_resource(DispatchClock::default());
        world.insert_resource(eager_bid_config());
        world.insert_resource(BidRadius(2));
        world.insert_resource(BidWindowConfig::default());

        let rider = world.spawn(Rider::idle()).id();
        let request_entity = spawn_request(&mut world, rider, VehicleType::Car);
        let driver_entity = world
            .spawn((
                Driver::idle(VehicleType::Car),
                DriverStats::default(),
                Position(test_cell()),
            ))
            .id();

        run_bid_round(&mut world, request_entity);

        let bids = world.entity(request_entity).get::<Bids>().expect("bids");
        assert_eq!(bids.0.len(), 1);
        assert_eq!(bids.0[0].driver, driver_entity);
        assert!(bids.0[0].amount > 0.0);
        // Discount bounds: default -10%..=15% of 500.
        assert!(bids.0[0].amount >= 425.0 && bids.0[0].amount <= 550.0);

        let stats = world
            .entity(driver_entity)
            .get::<DriverStats>()
            .expect("stats");
        assert_eq!(stats.bids_placed, 1);

        // A follow-up round is scheduled while the window is open.
        let next = world
            .resource_mut::<DispatchClock>()
            .pop_next()
            .expect("next round");
        assert_eq!(next.kind, EventKind::BidRound);
    }

    #[test]
    fn wrong_vehicle_and_busy_drivers_do_not_bid() {
        let mut world = World::new();
        world.insert_resource(DispatchClock::default());
        world.insert_resource(eager_bid_config());
        world.insert_resource(BidRadius(2));
        world.insert_resource(BidWindowConfig::default());

        let rider = world.spawn(Rider::idle()).id();
        let request_entity = spawn_request(&mut world, rider, VehicleType::Car);
        world.spawn((
            Driver::idle(VehicleType::Bike),
            DriverStats::default(),
            Position(test_cell()),
        ));
        let mut busy = Driver::idle(VehicleType::Car);
        busy.state = DriverState::OnRide;
        world.spawn((busy, DriverStats::default(), Position(test_cell())));

        run_bid_round(&mut world, request_entity);

        let bids = world.entity(request_entity).get::<Bids>().expect("bids");
        assert!(bids.0.is_empty());
    }

    #[test]
    fn reluctant_driver_declines() {
        let mut world = World::new();
        world.insert_resource(DispatchClock::default());
        world.insert_resource(reluctant_bid_config());
        world.insert_resource(BidRadius(2));
        world.insert_resource(BidWindowConfig::default());

        let rider = world.spawn(Rider::idle()).id();
        let request_entity = spawn_request(&mut world, rider, VehicleType::Car);
        world.spawn((
            Driver::idle(VehicleType::Car),
            DriverStats::default(),
            Position(test_cell()),
        ));

        run_bid_round(&mut world, request_entity);

        let bids = world.entity(request_entity).get::<Bids>().expect("bids");
        assert!(bids.0.is_empty());
    }

    #[test]
    fn driver_does_not_bid_twice_on_one_request() {
        let mut world = World::new();
        world.insert_resource(DispatchClock::default());
        world.insert_resource(eager_bid_config());
        world.insert_resource(BidRadius(2));
        world.insert_resource(BidWindowConfig::default());

        let rider = world.spawn(Rider::idle()).id();
        let request_entity = spawn_request(&mut world, rider, VehicleType::Car);
        world.spawn((
            Driver::idle(VehicleType::Car),
            DriverStats::default(),
            Position(test_cell()),
        ));

        run_bid_round(&mut world, request_entity);
        // Second round at a later time.
        let second = world
            .resource_mut::<DispatchClock>()
            .pop_next()
            .expect("second round event");
        world.insert_resource(CurrentEvent(second));
        let mut schedule = Schedule::default();
        schedule.add_systems(bid_round_system);
        schedule.run(&mut world);

        let bids = world.entity(request_entity).get::<Bids>().expect("bids");
        assert_eq!(bids.0.len(), 1);
    }

    #[test]
    fn no_round_is_scheduled_after_window_close() {
        let mut world = World::new();
        world.insert_resource(DispatchClock::default());
        world.insert_resource(reluctant_bid_config());
        world.insert_resource(BidRadius(2));
        world.insert_resource(BidWindowConfig {
            window_secs: 1,
            round_interval_secs: 5,
            ..Default::default()
        });

        let rider = world.spawn(Rider::idle()).id();
        let request_entity = spawn_request(&mut world, rider, VehicleType::Car);

        run_bid_round(&mut world, request_entity);
        assert!(world.resource::<DispatchClock>().is_empty());
    }
}
