//! RideStarted system: the driver reaches the pickup and the trip begins.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, DispatchClock, EventKind, EventSubject};
use crate::ecs::{Driver, DriverState, Ride, RideState, Rider, RiderState};
use crate::geo::distance_km_between_cells;
use crate::speed::SpeedModel;

pub fn ride_started_system(
    mut clock: ResMut<DispatchClock>,
    event: Res<CurrentEvent>,
    mut speed: ResMut<SpeedModel>,
    mut rides: Query<&mut Ride>,
    mut riders: Query<&mut Rider>,
    mut drivers: Query<&mut Driver>,
) {
    if event.0.kind != EventKind::RideStarted {
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

    ride.state = RideState::InProgress;
    ride.pickup_at = Some(clock.now());

    if let Ok(mut rider) = riders.get_mut(ride.rider) {
        rider.state = RiderState::InTransit;
    }
    if let Ok(mut driver) = drivers.get_mut(ride.driver) {
        driver.state = DriverState::OnRide;
    }

    let trip_km = distance_km_between_cells(ride.pickup, ride.dropoff);
    let trip_ms = speed.travel_ms(ride.vehicle, trip_km);
    clock.schedule_in(
        trip_ms,
        EventKind::RideCompleted,
        Some(EventSubject::Ride(ride_entity)),
    );
}
