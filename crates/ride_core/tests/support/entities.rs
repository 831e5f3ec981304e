#![allow(dead_code)]

use bevy_ecs::prelude::{Entity, World};
use h3o::CellIndex;

use ride_core::clock::{DispatchClock, EventKind};
use ride_core::ecs::{Driver, DriverStats, Position, Rider};
use ride_core::pricing::VehicleType;
use ride_core::scenario::{PendingRequest, PendingRequests};

pub fn spawn_idle_driver(world: &mut World, vehicle: VehicleType, cell: CellIndex) -> Entity {
    world
        .spawn((Driver::idle(vehicle), DriverStats::default(), Position(cell)))
        .id()
}

pub fn spawn_rider(world: &mut World, cell: CellIndex) -> Entity {
    world.spawn((Rider::idle(), Position(cell))).id()
}

/// Queue a pending request and schedule its `RequestOpened` event.
pub fn queue_request(
    world: &mut World,
    rider: Entity,
    pickup: CellIndex,
    dropoff: CellIndex,
    vehicle: VehicleType,
    request_time_ms: u64,
) {
    world
        .resource_mut::<PendingRequests>()
        .0
        .push_back(PendingRequest {
            rider,
            pickup,
            dropoff,
            vehicle,
            request_time_ms,
        });
    world.resource_mut::<DispatchClock>().schedule_at(
        request_time_ms,
        EventKind::RequestOpened,
        None,
    );
}
