//! BidWindowClosed system: pick the winning bid by priority score and
//! assign the ride, or reopen the request at a raised asking fare.

use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::bidding::{select_winning_bid, BidScoreConfig, Bids};
use crate::clock::{CurrentEvent, DispatchClock, EventKind, EventSubject};
use crate::ecs::{
    Driver, DriverState, DriverStats, Position, RequestState, Ride, RideRequest, RideState, Rider,
    RiderState,
};
use crate::geo::distance_km_between_cells;
use crate::pricing::round_to_nearest_ten;
use crate::scenario::{BidWindowConfig, RiderCancelConfig};
use crate::speed::SpeedModel;
use crate::telemetry::MarketTelemetry;

#[allow(clippy::too_many_arguments)]
pub fn bid_window_closed_system(
    mut commands: Commands,
    mut clock: ResMut<DispatchClock>,
    event: Res<CurrentEvent>,
    window_config: Option<Res<BidWindowConfig>>,
    score_config: Option<Res<BidScoreConfig>>,
    cancel_config: Option<Res<RiderCancelConfig>>,
    mut speed: ResMut<SpeedModel>,
    mut telemetry: ResMut<MarketTelemetry>,
    mut requests: Query<(Entity, &mut RideRequest, &mut Bids)>,
    mut drivers: Query<(&mut Driver, &mut DriverStats, &Position)>,
    mut riders: Query<&mut Rider>,
) {
    if event.0.kind != EventKind::BidWindowClosed {
        return;
    }
    let Some(EventSubject::Request(request_entity)) = event.0.subject else {
        return;
    };
    let Ok((_, mut request, mut bids)) = requests.get_mut(request_entity) else {
        return;
    };
    if request.state != RequestState::Bidding {
        return;
    }

    let window = window_config.as_deref().copied().unwrap_or_default();
    let scoring = score_config.as_deref().copied().unwrap_or_default();
    let now = clock.now();

    // Bids from drivers who went busy since placing them are dead.
    let candidates: Vec<_> = bids
        .0
        .iter()
        .filter_map(|bid| {
            let (driver, stats, _) = drivers.get(bid.driver).ok()?;
            (driver.state == DriverState::Idle).then(|| (*bid, stats.bids_placed))
        })
        .collect();

    let winner = select_winning_bid(request.base_fare, &candidates, &scoring);

    let Some(winning_bid) = winner else {
        request.reopen_count += 1;
        if request.reopen_count > window.max_reopens {
            request.state = RequestState::Expired;
            telemetry.requests_expired_total += 1;
            if let Ok(mut rider) = riders.get_mut(request.rider) {
                rider.state = RiderState::Cancelled;
                rider.active_request = None;
            }
            return;
        }
        // The rider raises the ask and the next bidding window opens
        // immediately after the failed one.
        request.base_fare =
            round_to_nearest_ten(request.base_fare * (1.0 + window.reopen_raise_percent / 100.0));
        bids.0.clear();
        clock.schedule_in_secs(
            window.round_interval_secs.min(window.window_secs),
            EventKind::BidRound,
            Some(EventSubject::Request(request_entity)),
        );
        clock.schedule_in_secs(
            window.window_secs,
            EventKind::BidWindowClosed,
            Some(EventSubject::Request(request_entity)),
        );
        return;
    };

    request.state = RequestState::Assigned;
    request.agreed_fare = Some(winning_bid.amount);
    request.winning_driver = Some(winning_bid.driver);

    let pickup_km = {
        let Ok((mut driver, _, position)) = drivers.get_mut(winning_bid.driver) else {
            return;
        };
        driver.state = DriverState::EnRoute;
        driver.assigned_request = Some(request_entity);
        distance_km_between_cells(position.0, request.pickup)
    };
    if let Ok(mut rider) = riders.get_mut(request.rider) {
        rider.state = RiderState::Waiting;
    }

    let ride_entity = commands
        .spawn(Ride {
            state: RideState::EnRouteToPickup,
            request: request_entity,
            rider: request.rider,
            driver: winning_bid.driver,
            pickup: request.pickup,
            dropoff: request.dropoff,
            vehicle: request.vehicle,
            fare: winning_bid.amount,
            requested_at: request.opened_at,
            assigned_at: now,
            pickup_at: None,
            dropoff_at: None,
            cancelled_at: None,
        })
        .id();

    let pickup_eta_ms = speed.travel_ms(request.vehicle, pickup_km);
    clock.schedule_in(
        pickup_eta_ms,
        EventKind::RideStarted,
        Some(EventSubject::Ride(ride_entity)),
    );

    // Sample the rider's patience; the cancel event is ignored once the
    // ride has started.
    let cancel = cancel_config.as_deref().copied().unwrap_or_default();
    let max_wait = cancel.max_wait_secs.max(cancel.min_wait_secs);
    let seed = cancel.seed.wrapping_add(request.rider.index() as u64);
    let mut rng = StdRng::seed_from_u64(seed);
    let wait_secs = rng.gen_range(cancel.min_wait_secs..=max_wait);
    clock.schedule_in_secs(
        wait_secs,
        EventKind::RiderCancel,
        Some(EventSubject::Ride(ride_entity)),
    );
}
