//! RiderCancel system: a waiting rider gives up before pickup. Ignored
//! once the ride has started.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, DispatchClock, EventKind, EventSubject};
use crate::ecs::{
    Driver, DriverState, RequestState, Ride, RideRequest, RideState, Rider, RiderState,
};
use crate::telemetry::MarketTelemetry;

#[allow(clippy::too_many_arguments)]
pub fn rider_cancel_system(
    clock: Res<DispatchClock>,
    event: Res<CurrentEvent>,
    mut telemetry: ResMut<MarketTelemetry>,
    mut rides: Query<&mut Ride>,
    mut requests: Query<&mut RideRequest>,
    mut riders: Query<&mut Rider>,
    mut drivers: Query<&mut Driver>,
) {
    if event.0.kind != EventKind::RiderCancel {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut ride) = rides.get_mut(ride_entity) else {
        return;
    };
    if ride.state != RideState::EnRouteToPickup {
        return;
    }

    ride.state = RideState::Cancelled;
    ride.cancelled_at = Some(clock.now());

    if let Ok(mut request) = requests.get_mut(ride.request) {
        request.state = RequestState::Cancelled;
    }
    if let Ok(mut rider) = riders.get_mut(ride.rider) {
        rider.state = RiderState::Cancelled;
        rider.active_request = None;
    }
    if let Ok(mut driver) = drivers.get_mut(ride.driver) {
        driver.state = DriverState::Idle;
        driver.assigned_request = None;
    }

    telemetry.riders_cancelled_total += 1;
}
