//! ScheduledRideDue system: a future-dated booking reaches its pickup
//! time and becomes a live request.

use bevy_ecs::prelude::{Commands, Query, Res, ResMut};

use crate::clock::{CurrentEvent, DispatchClock, EventKind, EventSubject};
use crate::ecs::ScheduledRide;
use crate::scenario::{PendingRequest, PendingRequests};

pub fn scheduled_ride_due_system(
    mut commands: Commands,
    mut clock: ResMut<DispatchClock>,
    event: Res<CurrentEvent>,
    mut pending: ResMut<PendingRequests>,
    bookings: Query<&ScheduledRide>,
) {
    if event.0.kind != EventKind::ScheduledRideDue {
        return;
    }
    let Some(EventSubject::Booking(booking_entity)) = event.0.subject else {
        return;
    };
    let Ok(booking) = bookings.get(booking_entity) else {
        return;
    };

    let now = clock.now();
    pending.0.push_back(PendingRequest {
        rider: booking.rider,
        pickup: booking.pickup,
        dropoff: booking.dropoff,
        vehicle: booking.vehicle,
        request_time_ms: now,
    });
    clock.schedule_at(now, EventKind::RequestOpened, None);

    // The booking is consumed; the request entity takes over from here.
    commands.entity(booking_entity).despawn();
}
