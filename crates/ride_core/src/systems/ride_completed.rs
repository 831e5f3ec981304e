//! RideCompleted system: settle the fare. Commission is resolved from
//! the pickup city and the driver's monthly volume, the driver keeps the
//! remainder, and the rider earns loyalty points.

use bevy_ecs::prelude::{Query, Res, ResMut, Without};

use crate::clock::{CurrentEvent, DispatchClock, EventKind, EventSubject};
use crate::commission::CommissionBook;
use crate::ecs::{
    Driver, DriverState, DriverStats, Position, RequestState, Ride, RideRequest, RideState, Rider,
    RiderState,
};
use crate::loyalty::LoyaltyConfig;
use crate::telemetry::{CompletedRideRecord, MarketTelemetry};
use crate::zones::ZoneBook;

#[allow(clippy::too_many_arguments)]
pub fn ride_completed_system(
    clock: Res<DispatchClock>,
    event: Res<CurrentEvent>,
    commissions: Res<CommissionBook>,
    loyalty: Res<LoyaltyConfig>,
    zones: Res<ZoneBook>,
    mut telemetry: ResMut<MarketTelemetry>,
    mut rides: Query<&mut Ride>,
    mut requests: Query<&mut RideRequest>,
    mut riders: Query<(&mut Rider, Option<&mut Position>)>,
    mut drivers: Query<(&mut Driver, &mut DriverStats, &mut Position), Without<Rider>>,
) {
    if event.0.kind != EventKind::RideCompleted {
        return;
    }
    let Some(EventSubject::Ride(ride_entity)) = event.0.subject else {
        return;
    };
    let Ok(mut ride) = rides.get_mut(ride_entity) else {
        return;
    };
    if ride.state != RideState::InProgress {
        return;
    }

    let now = clock.now();
    ride.state = RideState::Completed;
    ride.dropoff_at = Some(now);

    if let Ok(mut request) = requests.get_mut(ride.request) {
        request.state = RequestState::Fulfilled;
    }

    let city = zones.city_for(ride.pickup).map(str::to_owned);

    // Volume tier is judged on the month's rides before this one.
    let (commission, driver_earnings) = match drivers.get_mut(ride.driver) {
        Ok((mut driver, mut stats, mut position)) => {
            let commission = commissions.commission_for(
                ride.fare,
                city.as_deref(),
                ride.vehicle,
                stats.monthly_completed_rides,
            );
            let earnings = ride.fare - commission;
            stats.monthly_completed_rides += 1;
            stats.total_earnings += earnings;
            driver.state = DriverState::Idle;
            driver.assigned_request = None;
            position.0 = ride.dropoff;
            (commission, earnings)
        }
        Err(_) => (0.0, 0.0),
    };

    let points = loyalty.points_for_fare(ride.fare);
    if let Ok((mut rider, position)) = riders.get_mut(ride.rider) {
        rider.state = RiderState::Completed;
        rider.active_request = None;
        rider.loyalty_points += points;
        if let Some(mut position) = position {
            position.0 = ride.dropoff;
        }
    }

    telemetry.riders_completed_total += 1;
    telemetry.fares_total += ride.fare;
    telemetry.platform_revenue_total += commission;
    telemetry.loyalty_points_total += points;
    telemetry.completed_rides.push(CompletedRideRecord {
        ride_entity,
        request_entity: ride.request,
        rider_entity: ride.rider,
        driver_entity: ride.driver,
        vehicle: ride.vehicle,
        city,
        fare: ride.fare,
        commission,
        driver_earnings,
        loyalty_points: points,
        requested_at: ride.requested_at,
        assigned_at: ride.assigned_at,
        pickup_at: ride.pickup_at.unwrap_or(ride.assigned_at),
        completed_at: now,
    });
}
