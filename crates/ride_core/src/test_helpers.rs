//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication
//! across test files. The test geography is central Karachi.

use bevy_ecs::prelude::World;
use h3o::{CellIndex, LatLng, Resolution};

use crate::zones::{ServiceZone, ZoneBook};

/// A standard test location used across test files for consistency:
/// Saddar, Karachi, at resolution 9.
pub const TEST_LAT: f64 = 24.8607;
pub const TEST_LNG: f64 = 67.0011;

/// Get the test cell as a `CellIndex`.
///
/// # Panics
///
/// Panics if the test coordinates are invalid (should never happen).
pub fn test_cell() -> CellIndex {
    LatLng::new(TEST_LAT, TEST_LNG)
        .expect("test coordinates should be valid")
        .to_cell(Resolution::Nine)
}

/// Get a neighbor cell of the test cell for testing purposes.
///
/// # Panics
///
/// Panics if no neighbor can be found (should never happen).
pub fn test_neighbor_cell() -> CellIndex {
    test_cell()
        .grid_disk::<Vec<_>>(1)
        .into_iter()
        .find(|c| *c != test_cell())
        .expect("test cell should have neighbors")
}

/// Get a distant cell from the test cell for testing trip destinations.
///
/// # Panics
///
/// Panics if no distant cell can be found (should never happen).
pub fn test_distant_cell() -> CellIndex {
    test_cell()
        .grid_disk::<Vec<_>>(8)
        .into_iter()
        .find(|c| {
            test_cell()
                .grid_distance(*c)
                .map(|d| d == 8)
                .unwrap_or(false)
        })
        .expect("test cell should have distant neighbors")
}

/// Zone book with a single active city polygon around the test cell.
pub fn test_zone_book() -> ZoneBook {
    ZoneBook::new(vec![ServiceZone::city(
        "Karachi",
        vec![(24.75, 66.90), (24.75, 67.25), (25.05, 67.25), (25.05, 66.90)],
    )])
}

/// Create a basic test world with essential resources.
///
/// This is a convenience function for tests that need a minimal world
/// setup. For full scenarios, use `build_scenario`.
pub fn create_test_world() -> World {
    let mut world = World::new();
    world.insert_resource(crate::clock::DispatchClock::default());
    world.insert_resource(crate::telemetry::MarketTelemetry::default());
    world.insert_resource(crate::telemetry::SnapshotConfig::default());
    world.insert_resource(crate::telemetry::MarketSnapshots::default());
    world.insert_resource(crate::pricing::PricingConfig::default());
    world.insert_resource(crate::loyalty::LoyaltyConfig::default());
    world.insert_resource(crate::commission::CommissionBook::default());
    world.insert_resource(test_zone_book());
    world.insert_resource(crate::speed::SpeedModel::fixed(Some(1), 30.0));
    world.insert_resource(crate::scenario::PendingRequests::default());
    world.insert_resource(crate::scenario::BidRadius(4));
    world.insert_resource(crate::scenario::BidWindowConfig::default());
    world.insert_resource(crate::scenario::DriverBidConfig::default());
    world.insert_resource(crate::scenario::RiderCancelConfig::default());
    world.insert_resource(crate::bidding::BidScoreConfig::default());
    world
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_is_inside_the_test_city() {
        let book = test_zone_book();
        assert_eq!(book.city_for(test_cell()), Some("Karachi"));
    }

    #[test]
    fn test_cells_are_distinct() {
        assert_ne!(test_cell(), test_neighbor_cell());
        assert_ne!(test_cell(), test_distant_cell());
        assert_ne!(test_neighbor_cell(), test_distant_cell());
    }
}
