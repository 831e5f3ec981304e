//! Travel-time estimation: seeded per-vehicle speed sampling.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::pricing::VehicleType;

/// Samples an average speed for a leg from a per-vehicle range; used to
/// schedule pickup and completion events.
#[derive(Resource)]
pub struct SpeedModel {
    rng: StdRng,
    bike_kmh: (f64, f64),
    rickshaw_kmh: (f64, f64),
    car_kmh: (f64, f64),
}

impl SpeedModel {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            bike_kmh: (20.0, 35.0),
            rickshaw_kmh: (15.0, 28.0),
            car_kmh: (22.0, 45.0),
        }
    }

    /// Collapse all ranges to a single fixed speed (deterministic tests).
    pub fn fixed(seed: Option<u64>, kmh: f64) -> Self {
        let mut model = Self::new(seed);
        model.bike_kmh = (kmh, kmh);
        model.rickshaw_kmh = (kmh, kmh);
        model.car_kmh = (kmh, kmh);
        model
    }

    pub fn sample_kmh(&mut self, vehicle: VehicleType) -> f64 {
        let (min, max) = match vehicle {
            VehicleType::Bike => self.bike_kmh,
            VehicleType::Rickshaw => self.rickshaw_kmh,
            VehicleType::Car | VehicleType::CarAc => self.car_kmh,
        };
        self.rng.gen_range(min..=max).max(1.0)
    }

    /// Travel time for a leg in milliseconds, never below one second.
    pub fn travel_ms(&mut self, vehicle: VehicleType, distance_km: f64) -> u64 {
        let kmh = self.sample_kmh(vehicle);
        let hours = distance_km.max(0.0) / kmh;
        ((hours * 3_600_000.0) as u64).max(crate::clock::ONE_SEC_MS)
    }
}
