use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};
use h3o::CellIndex;

use crate::commission::CommissionBook;
use crate::loyalty::LoyaltyConfig;
use crate::pricing::{PricingConfig, VehicleType};
use crate::zones::ZoneBook;

/// Default bounding box: Karachi, Pakistan (approx).
const DEFAULT_LAT_MIN: f64 = 24.78;
const DEFAULT_LAT_MAX: f64 = 25.05;
const DEFAULT_LNG_MIN: f64 = 66.90;
const DEFAULT_LNG_MAX: f64 = 67.28;

/// Default time window for ride requests: 1 hour (dispatch ms).
const DEFAULT_REQUEST_WINDOW_MS: u64 = 60 * 60 * 1000;

/// Max H3 grid distance (cells) from the pickup within which drivers are
/// invited to bid. 0 = same cell only.
#[derive(Debug, Clone, Copy, Resource)]
pub struct BidRadius(pub u32);

impl Default for BidRadius {
    fn default() -> Self {
        Self(12)
    }
}

/// Dispatch end time in milliseconds. When set, the runner stops
/// processing events once the next event would be at or after this
/// timestamp.
#[derive(Debug, Clone, Copy, Resource)]
pub struct DispatchEndTimeMs(pub u64);

/// Bid window: how long a request collects bids, how often bid rounds
/// fire, and what happens when a window closes empty.
#[derive(Debug, Clone, Copy, Resource)]
pub struct BidWindowConfig {
    pub window_secs: u64,
    pub round_interval_secs: u64,
    /// How many times an unanswered request reopens before expiring.
    pub max_reopens: u32,
    /// Asking-fare raise applied on each reopen, in percent.
    pub reopen_raise_percent: f64,
}

impl Default for BidWindowConfig {
    fn default() -> Self {
        Self {
            window_secs: 30,
            round_interval_secs: 5,
            max_reopens: 2,
            reopen_raise_percent: 10.0,
        }
    }
}

/// Driver bidding behavior: stochastic logit decision plus the sampled
/// bid amount relative to the asking fare.
#[derive(Debug, Clone, Copy, Resource)]
pub struct DriverBidConfig {
    /// Seed for RNG (for reproducibility).
    pub seed: u64,
    /// Base willingness score before factors are applied.
    pub base_score: f64,
    /// Weight for fare attractiveness (higher fare increases bidding).
    pub fare_weight: f64,
    /// Penalty per km of pickup distance.
    pub pickup_distance_penalty: f64,
    /// Lowest sampled discount against the asking fare, in percent
    /// (negative means bidding above it).
    pub min_discount_percent: f64,
    /// Highest sampled discount against the asking fare, in percent.
    pub max_discount_percent: f64,
}

impl Default for DriverBidConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            base_score: 0.5,
            fare_weight: 0.004,
            pickup_distance_penalty: -0.6,
            min_discount_percent: -10.0,
            max_discount_percent: 15.0,
        }
    }
}

/// Rider cancel window while waiting for pickup (seconds).
/// Uses a uniform distribution between min_wait_secs and max_wait_secs.
#[derive(Debug, Clone, Copy, Resource)]
pub struct RiderCancelConfig {
    pub min_wait_secs: u64,
    pub max_wait_secs: u64,
    /// Seed for RNG (for reproducibility).
    pub seed: u64,
}

impl Default for RiderCancelConfig {
    fn default() -> Self {
        Self {
            min_wait_secs: 300,
            max_wait_secs: 2400,
            seed: 0,
        }
    }
}

/// Relative weights for sampling vehicle types in the fleet and demand.
#[derive(Debug, Clone, Copy)]
pub struct VehicleMix {
    pub bike: u32,
    pub rickshaw: u32,
    pub car: u32,
    pub car_ac: u32,
}

impl Default for VehicleMix {
    fn default() -> Self {
        Self {
            bike: 4,
            rickshaw: 3,
            car: 2,
            car_ac: 1,
        }
    }
}

impl VehicleMix {
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> VehicleType {
        let total = self.bike + self.rickshaw + self.car + self.car_ac;
        if total == 0 {
            return VehicleType::Car;
        }
        let roll = rng.gen_range(0..total);
        if roll < self.bike {
            VehicleType::Bike
        } else if roll < self.bike + self.rickshaw {
            VehicleType::Rickshaw
        } else if roll < self.bike + self.rickshaw + self.car {
            VehicleType::Car
        } else {
            VehicleType::CarAc
        }
    }
}

/// A request waiting to be opened when its `RequestOpened` event fires.
#[derive(Debug, Clone, Copy)]
pub struct PendingRequest {
    pub rider: Entity,
    pub pickup: CellIndex,
    pub dropoff: CellIndex,
    pub vehicle: VehicleType,
    pub request_time_ms: u64,
}

/// FIFO of pending requests, ordered by request time.
#[derive(Debug, Default, Resource)]
pub struct PendingRequests(pub VecDeque<PendingRequest>);

/// Parameters for building a marketplace scenario.
#[derive(Debug, Clone)]
pub struct ScenarioParams {
    pub num_riders: usize,
    pub num_drivers: usize,
    pub seed: Option<u64>,
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
    pub request_window_ms: u64,
    pub min_trip_cells: u32,
    pub max_trip_cells: u32,
    pub bid_radius: u32,
    /// Riders whose requests are future-dated bookings instead of
    /// immediate requests.
    pub scheduled_ride_count: usize,
    /// How far past the request window scheduled pickups may land.
    pub scheduled_horizon_ms: u64,
    /// Optional epoch for time-of-day context. If None, defaults to 0.
    pub epoch_ms: Option<i64>,
    pub vehicle_mix: VehicleMix,
    /// Optional overrides; defaults are used when None.
    pub pricing_config: Option<PricingConfig>,
    pub commission_book: Option<CommissionBook>,
    pub zone_book: Option<ZoneBook>,
    pub loyalty_config: Option<LoyaltyConfig>,
    pub bid_window_config: Option<BidWindowConfig>,
    pub driver_bid_config: Option<DriverBidConfig>,
    pub bid_score_config: Option<crate::bidding::BidScoreConfig>,
    pub rider_cancel_config: Option<RiderCancelConfig>,
    /// Optional dispatch end time in ms. If set, runner stops when the
    /// next event >= this time.
    pub dispatch_end_time_ms: Option<u64>,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_riders: 400,
            num_drivers: 120,
            seed: None,
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lng_min: DEFAULT_LNG_MIN,
            lng_max: DEFAULT_LNG_MAX,
            request_window_ms: DEFAULT_REQUEST_WINDOW_MS,
            min_trip_cells: 5,
            max_trip_cells: 40,
            bid_radius: 12,
            scheduled_ride_count: 0,
            scheduled_horizon_ms: 30 * 60 * 1000,
            epoch_ms: None,
            vehicle_mix: VehicleMix::default(),
            pricing_config: None,
            commission_book: None,
            zone_book: None,
            loyalty_config: None,
            bid_window_config: None,
            driver_bid_config: None,
            bid_score_config: None,
            rider_cancel_config: None,
            dispatch_end_time_ms: None,
        }
    }
}

impl ScenarioParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the request time window in hours (riders request uniformly in [0, hours]).
    pub fn with_request_window_hours(mut self, hours: u64) -> Self {
        self.request_window_ms = hours * 60 * 60 * 1000;
        self
    }

    /// Invite drivers within this H3 grid distance of the pickup to bid.
    pub fn with_bid_radius(mut self, radius: u32) -> Self {
        self.bid_radius = radius;
        self
    }

    /// Trip length in H3 cells: min..=max.
    pub fn with_trip_cells(mut self, min_cells: u32, max_cells: u32) -> Self {
        self.min_trip_cells = min_cells;
        self.max_trip_cells = max_cells;
        self
    }

    /// Turn this many riders into future-dated bookings.
    pub fn with_scheduled_rides(mut self, count: usize, horizon_ms: u64) -> Self {
        self.scheduled_ride_count = count;
        self.scheduled_horizon_ms = horizon_ms;
        self
    }

    pub fn with_epoch_ms(mut self, epoch_ms: i64) -> Self {
        self.epoch_ms = Some(epoch_ms);
        self
    }

    pub fn with_pricing_config(mut self, pricing_config: PricingConfig) -> Self {
        self.pricing_config = Some(pricing_config);
        self
    }

    pub fn with_commission_book(mut self, commission_book: CommissionBook) -> Self {
        self.commission_book = Some(commission_book);
        self
    }

    pub fn with_zone_book(mut self, zone_book: ZoneBook) -> Self {
        self.zone_book = Some(zone_book);
        self
    }

    pub fn with_loyalty_config(mut self, loyalty_config: LoyaltyConfig) -> Self {
        self.loyalty_config = Some(loyalty_config);
        self
    }

    pub fn with_bid_window_config(mut self, config: BidWindowConfig) -> Self {
        self.bid_window_config = Some(config);
        self
    }

    pub fn with_driver_bid_config(mut self, config: DriverBidConfig) -> Self {
        self.driver_bid_config = Some(config);
        self
    }

    pub fn with_bid_score_config(mut self, config: crate::bidding::BidScoreConfig) -> Self {
        self.bid_score_config = Some(config);
        self
    }

    pub fn with_rider_cancel_config(mut self, config: RiderCancelConfig) -> Self {
        self.rider_cancel_config = Some(config);
        self
    }

    /// Set dispatch end time in ms. Runner stops when the next event is
    /// at or after this time.
    pub fn with_dispatch_end_time_ms(mut self, end_ms: u64) -> Self {
        self.dispatch_end_time_ms = Some(end_ms);
        self
    }
}
