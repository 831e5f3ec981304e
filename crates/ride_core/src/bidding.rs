//! Bid negotiation: drivers answer an open request with priced bids and
//! the winner is picked by a priority score over bid discount and driver
//! bidding activity.

use bevy_ecs::prelude::{Component, Entity, Resource};

/// One driver's offer on a request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bid {
    pub driver: Entity,
    pub amount: f64,
    pub placed_at: u64,
}

/// Bids accumulated on a request entity, in placement order.
#[derive(Debug, Clone, Default, Component)]
pub struct Bids(pub Vec<Bid>);

impl Bids {
    pub fn has_bid_from(&self, driver: Entity) -> bool {
        self.0.iter().any(|bid| bid.driver == driver)
    }
}

/// Weights for the bid priority score.
#[derive(Debug, Clone, Copy, Resource)]
pub struct BidScoreConfig {
    /// Weight on the bid's discount percentage against the asking fare.
    pub discount_weight: f64,
    /// Weight on the driver's lifetime bid count.
    pub activity_weight: f64,
    /// Cap applied to the bid count so activity cannot dominate price.
    pub activity_cap: u32,
}

impl Default for BidScoreConfig {
    fn default() -> Self {
        Self {
            discount_weight: 1.0,
            activity_weight: 0.25,
            activity_cap: 20,
        }
    }
}

/// Percentage the bid undercuts the asking fare; negative when above it.
pub fn discount_percent(base_fare: f64, amount: f64) -> f64 {
    if base_fare <= 0.0 {
        return 0.0;
    }
    (base_fare - amount) / base_fare * 100.0
}

/// Priority score: linear combination of discount percentage and the
/// (capped) number of bids the driver has placed. Higher wins.
pub fn priority_score(base_fare: f64, bid: &Bid, driver_bids_placed: u32, config: &BidScoreConfig) -> f64 {
    let activity = driver_bids_placed.min(config.activity_cap) as f64;
    config.discount_weight * discount_percent(base_fare, bid.amount)
        + config.activity_weight * activity
}

/// Select the winning bid from `(bid, driver_bids_placed)` candidates.
///
/// Highest priority score wins; ties resolve to the earliest bid, then
/// the lowest amount. Returns `None` for an empty candidate set.
pub fn select_winning_bid(
    base_fare: f64,
    candidates: &[(Bid, u32)],
    config: &BidScoreConfig,
) -> Option<Bid> {
    candidates
        .iter()
        .map(|(bid, bids_placed)| (priority_score(base_fare, bid, *bids_placed, config), bid))
        .max_by(|(score_a, bid_a), (score_b, bid_b)| {
            score_a
                .partial_cmp(score_b)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| bid_b.placed_at.cmp(&bid_a.placed_at))
                .then_with(|| {
                    bid_b
                        .amount
                        .partial_cmp(&bid_a.amount)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        })
        .map(|(_, bid)| *bid)
}
