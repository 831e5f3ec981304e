//! Rider loyalty points: accrual per completed ride, redemption value.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Resource, Serialize, Deserialize)]
pub struct LoyaltyConfig {
    /// Points granted per full `fare_unit` of fare.
    pub points_per_fare_unit: u64,
    /// Fare slice (PKR) that earns `points_per_fare_unit`.
    pub fare_unit: f64,
    /// Currency value of one point at redemption.
    pub redeem_value_per_point: f64,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        Self {
            points_per_fare_unit: 1,
            fare_unit: 100.0,
            redeem_value_per_point: 2.0,
        }
    }
}

impl LoyaltyConfig {
    /// Points earned for a fare: full fare units only, no fractional points.
    pub fn points_for_fare(&self, fare: f64) -> u64 {
        if self.fare_unit <= 0.0 || fare <= 0.0 {
            return 0;
        }
        (fare / self.fare_unit).floor() as u64 * self.points_per_fare_unit
    }

    pub fn redemption_value(&self, points: u64) -> f64 {
        points as f64 * self.redeem_value_per_point
    }
}
