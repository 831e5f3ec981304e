//! RequestOpened system: pop the next pending request, validate its
//! pickup against the service zones, price it, and open bidding.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::bidding::Bids;
use crate::clock::{CurrentEvent, DispatchClock, EventKind, EventSubject};
use crate::ecs::{RequestState, RideRequest, Rider, RiderState};
use crate::geo::distance_km_between_cells;
use crate::pricing::{estimate_fare, PricingConfig};
use crate::scenario::{BidWindowConfig, PendingRequests};
use crate::telemetry::{MarketTelemetry, RequestRefusalReason};
use crate::zones::ZoneBook;

#[allow(clippy::too_many_arguments)]
pub fn request_opened_system(
    mut commands: Commands,
    mut clock: ResMut<DispatchClock>,
    event: Res<CurrentEvent>,
    mut pending: ResMut<PendingRequests>,
    mut telemetry: ResMut<MarketTelemetry>,
    zones: Res<ZoneBook>,
    pricing: Res<PricingConfig>,
    window_config: Option<Res<BidWindowConfig>>,
    mut riders: Query<&mut Rider>,
) {
    if event.0.kind != EventKind::RequestOpened {
        return;
    }

    let Some(request) = pending.0.pop_front() else {
        return;
    };
    let Ok(mut rider) = riders.get_mut(request.rider) else {
        return;
    };

    // Pickups outside every active city zone, or inside a restricted
    // zone, are refused before any bidding starts.
    if zones.city_for(request.pickup).is_none() {
        telemetry.record_refusal(RequestRefusalReason::OutsideServiceArea);
        rider.state = RiderState::Cancelled;
        return;
    }
    if zones.is_restricted(request.pickup) {
        telemetry.record_refusal(RequestRefusalReason::RestrictedZone);
        rider.state = RiderState::Cancelled;
        return;
    }

    let distance_km = distance_km_between_cells(request.pickup, request.dropoff);
    let zone_multiplier = zones.demand_multiplier(request.pickup);
    let base_fare = estimate_fare(&pricing, request.vehicle, distance_km, zone_multiplier);

    let opened_at = clock.now();
    let request_entity = commands
        .spawn((
            RideRequest {
                state: RequestState::Bidding,
                rider: request.rider,
                pickup: request.pickup,
                dropoff: request.dropoff,
                vehicle: request.vehicle,
                base_fare,
                zone_multiplier,
                agreed_fare: None,
                winning_driver: None,
                opened_at,
                reopen_count: 0,
            },
            Bids::default(),
            crate::ecs::Position(request.pickup),
        ))
        .id();

    rider.state = RiderState::Requesting;
    rider.active_request = Some(request_entity);

    let config = window_config.as_deref().copied().unwrap_or_default();
    clock.schedule_in_secs(
        config.round_interval_secs.min(config.window_secs),
        EventKind::BidRound,
        Some(EventSubject::Request(request_entity)),
    );
    clock.schedule_in_secs(
        config.window_secs,
        EventKind::BidWindowClosed,
        Some(EventSubject::Request(request_entity)),
    );
}
