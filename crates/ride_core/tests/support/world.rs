#![allow(dead_code)]

use bevy_ecs::prelude::World;
use ride_core::bidding::BidScoreConfig;
use ride_core::clock::DispatchClock;
use ride_core::commission::CommissionBook;
use ride_core::geo::SpatialIndex;
use ride_core::loyalty::LoyaltyConfig;
use ride_core::pricing::PricingConfig;
use ride_core::scenario::{
    BidRadius, BidWindowConfig, DriverBidConfig, PendingRequests, RiderCancelConfig,
};
use ride_core::speed::SpeedModel;
use ride_core::telemetry::{MarketSnapshots, MarketTelemetry, SnapshotConfig};
use ride_core::test_helpers::test_zone_book;
use ride_core::zones::ZoneBook;

/// Builder configuration for reproducible test worlds.
#[derive(Clone, Debug)]
pub struct TestWorldConfig {
    pub seed: u64,
    pub bid_radius: u32,
    pub zone_book: Option<ZoneBook>,
    pub pricing_config: PricingConfig,
    pub commission_book: Option<CommissionBook>,
    pub loyalty_config: LoyaltyConfig,
    pub bid_window_config: BidWindowConfig,
    pub driver_bid_config: Option<DriverBidConfig>,
    pub bid_score_config: BidScoreConfig,
    pub rider_cancel_config: Option<RiderCancelConfig>,
    pub speed_kmh: f64,
    pub use_spatial_index: bool,
}

impl Default for TestWorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            bid_radius: 8,
            zone_book: None,
            pricing_config: PricingConfig::default(),
            commission_book: None,
            loyalty_config: LoyaltyConfig::default(),
            bid_window_config: BidWindowConfig::default(),
            driver_bid_config: None,
            bid_score_config: BidScoreConfig::default(),
            rider_cancel_config: None,
            speed_kmh: 30.0,
            use_spatial_index: false,
        }
    }
}

/// Helper that populates the ECS world with all shared resources used in
/// integration tests.
#[derive(Debug, Default)]
pub struct TestWorldBuilder {
    config: TestWorldConfig,
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn with_bid_radius(mut self, radius: u32) -> Self {
        self.config.bid_radius = radius;
        self
    }

    pub fn with_zone_book(mut self, zone_book: ZoneBook) -> Self {
        self.config.zone_book = Some(zone_book);
        self
    }

    pub fn with_pricing_config(mut self, pricing_config: PricingConfig) -> Self {
        self.config.pricing_config = pricing_config;
        self
    }

    pub fn with_commission_book(mut self, commission_book: CommissionBook) -> Self {
        self.config.commission_book = Some(commission_book);
        self
    }

    pub fn with_loyalty_config(mut self, loyalty_config: LoyaltyConfig) -> Self {
        self.config.loyalty_config = loyalty_config;
        self
    }

    pub fn with_bid_window_config(mut self, config: BidWindowConfig) -> Self {
        self.config.bid_window_config = config;
        self
    }

    pub fn with_driver_bid_config(mut self, config: DriverBidConfig) -> Self {
        self.config.driver_bid_config = Some(config);
        self
    }

    pub fn with_bid_score_config(mut self, config: BidScoreConfig) -> Self {
        self.config.bid_score_config = config;
        self
    }

    pub fn with_rider_cancel_config(mut self, config: RiderCancelConfig) -> Self {
        self.config.rider_cancel_config = Some(config);
        self
    }

    pub fn with_speed_kmh(mut self, kmh: f64) -> Self {
        self.config.speed_kmh = kmh;
        self
    }

    pub fn enable_spatial_index(mut self, enabled: bool) -> Self {
        self.config.use_spatial_index = enabled;
        self
    }

    /// Build the ECS world with the configured resources.
    pub fn build(self) -> World {
        let TestWorldConfig {
            seed,
            bid_radius,
            zone_book,
            pricing_config,
            commission_book,
            loyalty_config,
            bid_window_config,
            driver_bid_config,
            bid_score_config,
            rider_cancel_config,
            speed_kmh,
            use_spatial_index,
        } = self.config;

        let mut world = World::new();
        world.insert_resource(DispatchClock::default());
        world.insert_resource(MarketTelemetry::default());
        world.insert_resource(SnapshotConfig::default());
        world.insert_resource(MarketSnapshots::default());
        world.insert_resource(PendingRequests::default());
        world.insert_resource(BidRadius(bid_radius));
        world.insert_resource(bid_window_config);
        world.insert_resource(bid_score_config);
        world.insert_resource(driver_bid_config.unwrap_or_else(|| DriverBidConfig {
            seed: seed.wrapping_add(0xb1d_beef),
            // Eager by default so flows are deterministic in tests.
            base_score: 25.0,
            ..Default::default()
        }));
        world.insert_resource(rider_cancel_config.unwrap_or_else(|| RiderCancelConfig {
            // Patient riders by default so short test trips always finish
            // before the sampled cancel fires.
            min_wait_secs: 1_800,
            max_wait_secs: 3_600,
            seed: seed.wrapping_add(0xcafe_babe),
        }));
        world.insert_resource(pricing_config);
        world.insert_resource(loyalty_config);
        world.insert_resource(commission_book.unwrap_or_default());
        world.insert_resource(zone_book.unwrap_or_else(test_zone_book));
        world.insert_resource(SpeedModel::fixed(Some(seed), speed_kmh));
        if use_spatial_index {
            world.insert_resource(SpatialIndex::new());
        }
        world
    }
}
