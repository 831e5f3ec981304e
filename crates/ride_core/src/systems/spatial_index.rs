//! Spatial index maintenance: keep cell → entity maps in sync with
//! entity positions after every step.

use bevy_ecs::prelude::{Entity, Query, ResMut};

use crate::ecs::{Driver, Position, Rider};
use crate::geo::SpatialIndex;

pub fn update_spatial_index_riders_system(
    index: Option<ResMut<SpatialIndex>>,
    riders: Query<(Entity, &Rider, &Position)>,
) {
    let Some(mut index) = index else {
        return;
    };
    for (entity, _, position) in riders.iter() {
        match index.get_rider_cell(entity) {
            Some(old_cell) => index.update_rider_position(entity, old_cell, position.0),
            None => index.insert_rider(entity, position.0),
        }
    }
}

pub fn update_spatial_index_drivers_system(
    index: Option<ResMut<SpatialIndex>>,
    drivers: Query<(Entity, &Driver, &Position)>,
) {
    let Some(mut index) = index else {
        return;
    };
    for (entity, _, position) in drivers.iter() {
        match index.get_driver_cell(entity) {
            Some(old_cell) => index.update_driver_position(entity, old_cell, position.0),
            None => index.insert_driver(entity, position.0),
        }
    }
}
