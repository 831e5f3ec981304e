//! Fare estimation: per-vehicle rate table, distance-based formula,
//! rounding to the nearest 10 currency units (PKR).

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    Bike,
    Rickshaw,
    Car,
    CarAc,
}

impl VehicleType {
    pub const ALL: [VehicleType; 4] = [
        VehicleType::Bike,
        VehicleType::Rickshaw,
        VehicleType::Car,
        VehicleType::CarAc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Bike => "bike",
            VehicleType::Rickshaw => "rickshaw",
            VehicleType::Car => "car",
            VehicleType::CarAc => "car_ac",
        }
    }
}

/// Rate entry for one vehicle type, in PKR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleRate {
    pub base_fare: f64,
    pub per_km_rate: f64,
    pub minimum_fare: f64,
}

/// Fare table for all vehicle types.
#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
pub struct PricingConfig {
    pub bike: VehicleRate,
    pub rickshaw: VehicleRate,
    pub car: VehicleRate,
    pub car_ac: VehicleRate,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            bike: VehicleRate {
                base_fare: 80.0,
                per_km_rate: 22.0,
                minimum_fare: 100.0,
            },
            rickshaw: VehicleRate {
                base_fare: 120.0,
                per_km_rate: 32.0,
                minimum_fare: 150.0,
            },
            car: VehicleRate {
                base_fare: 200.0,
                per_km_rate: 52.0,
                minimum_fare: 250.0,
            },
            car_ac: VehicleRate {
                base_fare: 260.0,
                per_km_rate: 65.0,
                minimum_fare: 320.0,
            },
        }
    }
}

impl PricingConfig {
    pub fn rate(&self, vehicle: VehicleType) -> VehicleRate {
        match vehicle {
            VehicleType::Bike => self.bike,
            VehicleType::Rickshaw => self.rickshaw,
            VehicleType::Car => self.car,
            VehicleType::CarAc => self.car_ac,
        }
    }

    pub fn set_rate(&mut self, vehicle: VehicleType, rate: VehicleRate) {
        match vehicle {
            VehicleType::Bike => self.bike = rate,
            VehicleType::Rickshaw => self.rickshaw = rate,
            VehicleType::Car => self.car = rate,
            VehicleType::CarAc => self.car_ac = rate,
        }
    }
}

/// Round to the nearest multiple of 10 currency units.
pub fn round_to_nearest_ten(amount: f64) -> f64 {
    (amount / 10.0).round() * 10.0
}

/// Estimate the asking fare for a trip.
///
/// Formula: `round10(max(minimum_fare, (base + distance_km * per_km) * zone_multiplier))`.
/// Multipliers below 1.0 are clamped; high-demand zones only raise fares.
pub fn estimate_fare(
    config: &PricingConfig,
    vehicle: VehicleType,
    distance_km: f64,
    zone_multiplier: f64,
) -> f64 {
    let rate = config.rate(vehicle);
    let multiplier = zone_multiplier.max(1.0);
    let raw = (rate.base_fare + distance_km.max(0.0) * rate.per_km_rate) * multiplier;
    round_to_nearest_ten(raw.max(rate.minimum_fare))
}
