//! Commission resolution: priority-ordered rule lookup by city and
//! vehicle type, with volume-based discounts for high-output drivers.

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::pricing::VehicleType;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CommissionRate {
    /// Percentage of the fare (0-100).
    Percentage(f64),
    /// Flat amount per completed ride.
    Fixed(f64),
}

/// One discount tier; the highest qualifying tier applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeDiscount {
    pub min_monthly_rides: u32,
    pub discount_percent: f64,
}

/// A commission row. `None` in `city` or `vehicle` means the rule applies
/// to all cities or all vehicle types respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommissionRule {
    pub city: Option<String>,
    pub vehicle: Option<VehicleType>,
    pub rate: CommissionRate,
    pub volume_discounts: Vec<VolumeDiscount>,
}

impl CommissionRule {
    pub fn global(rate: CommissionRate) -> Self {
        Self {
            city: None,
            vehicle: None,
            rate,
            volume_discounts: Vec::new(),
        }
    }

    pub fn for_city(city: impl Into<String>, rate: CommissionRate) -> Self {
        Self {
            city: Some(city.into()),
            vehicle: None,
            rate,
            volume_discounts: Vec::new(),
        }
    }

    pub fn for_city_vehicle(
        city: impl Into<String>,
        vehicle: VehicleType,
        rate: CommissionRate,
    ) -> Self {
        Self {
            city: Some(city.into()),
            vehicle: Some(vehicle),
            rate,
            volume_discounts: Vec::new(),
        }
    }

    pub fn with_volume_discounts(mut self, tiers: Vec<VolumeDiscount>) -> Self {
        self.volume_discounts = tiers;
        self
    }

    /// Specificity rank: lower is more specific and wins resolution.
    fn specificity(&self, city: Option<&str>, vehicle: VehicleType) -> Option<u8> {
        let city_match = match (&self.city, city) {
            (Some(rule_city), Some(city)) => {
                if rule_city.eq_ignore_ascii_case(city) {
                    Some(true)
                } else {
                    return None;
                }
            }
            (Some(_), None) => return None,
            (None, _) => Some(false),
        }?;
        let vehicle_match = match self.vehicle {
            Some(rule_vehicle) => {
                if rule_vehicle == vehicle {
                    true
                } else {
                    return None;
                }
            }
            None => false,
        };
        Some(match (city_match, vehicle_match) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        })
    }

    /// Discount percent for a driver's monthly volume: highest qualifying tier.
    fn volume_discount_percent(&self, monthly_rides: u32) -> f64 {
        self.volume_discounts
            .iter()
            .filter(|tier| monthly_rides >= tier.min_monthly_rides)
            .map(|tier| tier.discount_percent)
            .fold(0.0, f64::max)
    }
}

/// All commission rules known to the platform.
#[derive(Debug, Clone, Default, Resource)]
pub struct CommissionBook {
    rules: Vec<CommissionRule>,
}

impl CommissionBook {
    pub fn new(rules: Vec<CommissionRule>) -> Self {
        Self { rules }
    }

    pub fn push(&mut self, rule: CommissionRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[CommissionRule] {
        &self.rules
    }

    /// Resolve the applicable rule for (city, vehicle), most specific
    /// first: city+vehicle, then city-only, then vehicle-only, then the
    /// global default. Among equally specific rules the first wins.
    pub fn resolve(&self, city: Option<&str>, vehicle: VehicleType) -> Option<&CommissionRule> {
        self.rules
            .iter()
            .filter_map(|rule| rule.specificity(city, vehicle).map(|rank| (rank, rule)))
            .min_by_key(|(rank, _)| *rank)
            .map(|(_, rule)| rule)
    }

    /// Platform cut of a completed ride's fare, clamped to [0, fare].
    /// No matching rule means no commission.
    pub fn commission_for(
        &self,
        fare: f64,
        city: Option<&str>,
        vehicle: VehicleType,
        monthly_rides: u32,
    ) -> f64 {
        let Some(rule) = self.resolve(city, vehicle) else {
            return 0.0;
        };
        let discount = rule.volume_discount_percent(monthly_rides);
        let amount = match rule.rate {
            CommissionRate::Percentage(percent) => {
                let effective = (percent - discount).max(0.0);
                fare * effective / 100.0
            }
            CommissionRate::Fixed(flat) => flat * (1.0 - discount / 100.0).max(0.0),
        };
        amount.clamp(0.0, fare.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> CommissionBook {
        CommissionBook::new(vec![
            CommissionRule::global(CommissionRate::Percentage(15.0)),
            CommissionRule::for_city("Karachi", CommissionRate::Percentage(12.0)),
            CommissionRule::for_city_vehicle(
                "Karachi",
                VehicleType::Bike,
                CommissionRate::Percentage(8.0),
            ),
            CommissionRule {
                city: None,
                vehicle: Some(VehicleType::Rickshaw),
                rate: CommissionRate::Fixed(30.0),
                volume_discounts: Vec::new(),
            },
        ])
    }

    #[test]
    fn city_vehicle_rule_beats_city_rule() {
        let book = book();
        let rule = book
            .resolve(Some("Karachi"), VehicleType::Bike)
            .expect("rule");
        assert_eq!(rule.rate, CommissionRate::Percentage(8.0));
    }

    #[test]
    fn city_rule_beats_vehicle_and_global() {
        let book = book();
        let rule = book
            .resolve(Some("Karachi"), VehicleType::Car)
            .expect("rule");
        assert_eq!(rule.rate, CommissionRate::Percentage(12.0));
    }

    #[test]
    fn vehicle_rule_beats_global_outside_listed_cities() {
        let book = book();
        let rule = book
            .resolve(Some("Lahore"), VehicleType::Rickshaw)
            .expect("rule");
        assert_eq!(rule.rate, CommissionRate::Fixed(30.0));
    }

    #[test]
    fn global_rule_is_the_fallback() {
        let book = book();
        let rule = book.resolve(None, VehicleType::CarAc).expect("rule");
        assert_eq!(rule.rate, CommissionRate::Percentage(15.0));
    }

    #[test]
    fn city_match_is_case_insensitive() {
        let book = book();
        let rule = book
            .resolve(Some("karachi"), VehicleType::Car)
            .expect("rule");
        assert_eq!(rule.rate, CommissionRate::Percentage(12.0));
    }

    #[test]
    fn empty_book_charges_nothing() {
        let book = CommissionBook::default();
        assert_eq!(
            book.commission_for(500.0, Some("Karachi"), VehicleType::Car, 0),
            0.0
        );
    }

    #[test]
    fn percentage_commission_with_volume_discount() {
        let book = CommissionBook::new(vec![CommissionRule::global(CommissionRate::Percentage(
            20.0,
        ))
        .with_volume_discounts(vec![
            VolumeDiscount {
                min_monthly_rides: 50,
                discount_percent: 5.0,
            },
            VolumeDiscount {
                min_monthly_rides: 100,
                discount_percent: 10.0,
            },
        ])]);

        // Below every tier: full 20%.
        assert_eq!(book.commission_for(1000.0, None, VehicleType::Car, 10), 200.0);
        // First tier: 15%.
        assert_eq!(book.commission_for(1000.0, None, VehicleType::Car, 60), 150.0);
        // Highest qualifying tier: 10%.
        assert_eq!(
            book.commission_for(1000.0, None, VehicleType::Car, 150),
            100.0
        );
    }

    #[test]
    fn fixed_commission_discounts_proportionally_and_clamps_to_fare() {
        let book = CommissionBook::new(vec![CommissionRule::global(CommissionRate::Fixed(100.0))
            .with_volume_discounts(vec![VolumeDiscount {
                min_monthly_rides: 30,
                discount_percent: 25.0,
            }])]);

        assert_eq!(book.commission_for(1000.0, None, VehicleType::Bike, 40), 75.0);
        // Fixed cut can never exceed the fare itself.
        assert_eq!(book.commission_for(50.0, None, VehicleType::Bike, 0), 50.0);
    }
}
